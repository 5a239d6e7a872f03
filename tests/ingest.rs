mod common;

use covterm::error::CovtermError;
use covterm::model::RawLine;

/// Load a dump from disk with its supplied totals intact.
#[test]
fn load_report_from_fixture() {
    let report = common::foo_suite();

    let totals = report.totals.unwrap();
    assert_eq!(totals.classes, 1);
    assert_eq!(totals.executable_lines, 5);

    let files = report.root.files();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].path, "Foo.php");
    assert_eq!(files[0].lines[&3], RawLine::Unmeasured);
    assert_eq!(files[0].classes[0].methods.len(), 2);
}

#[test]
fn load_report_tallies_missing_totals() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dump.json");
    std::fs::write(
        &path,
        r#"{ "root": { "kind": "directory", "path": "src", "children": [
            { "kind": "file", "path": "a.php", "lines": { "1": 3, "2": 0, "3": null },
              "classes": [ { "name": "A", "package": "tools", "methods": [
                  { "name": "run", "start_line": 1, "end_line": 2,
                    "executable_lines": 2, "executed_lines": 1 },
                  { "name": "noop", "start_line": 3, "end_line": 3,
                    "executable_lines": 0, "executed_lines": 0 } ] } ] }
        ] } }"#,
    )
    .unwrap();

    let totals = covterm::ingest::load_report(&path).unwrap().totals.unwrap();
    assert_eq!(totals.executable_lines, 2);
    assert_eq!(totals.executed_lines, 1);
    assert_eq!(totals.methods, 1);
    assert_eq!(totals.tested_methods, 0);
    assert_eq!(totals.classes, 1);
    assert_eq!(totals.tested_classes, 0);
}

#[test]
fn load_report_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = covterm::ingest::load_report(&dir.path().join("none.json")).unwrap_err();
    assert!(matches!(err, CovtermError::Io(_)));
}

#[test]
fn load_events_from_fixture() {
    let events = covterm::ingest::load_events(&common::fixture("events_foo.jsonl")).unwrap();
    assert_eq!(events.len(), 6);
}
