//! Turns a suite report into the final text output.

use std::collections::HashMap;

use chrono::{Local, NaiveDateTime};
use clap::ValueEnum;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::aggregate::aggregate_class;
use crate::classify::{classify_file, malformed_lines};
use crate::config::ReportConfig;
use crate::error::CovtermError;
use crate::index::ClassIndex;
use crate::layout::{MarkerStyle, TextLayout};
use crate::model::{ClassStat, FileNode, FileReport, SuiteReport};
use crate::source::{split_lines, SourceReader};

pub const TITLE: &str = "Code Coverage Report:";
pub const SUMMARY_TITLE: &str = "Code Coverage Report Summary:";

/// When a class's annotated source listing is shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SourceListing {
    /// For every displayed class.
    Always,
    /// Only for classes with at least one method below 100%.
    #[default]
    UnlessFullyCovered,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderPolicy {
    pub source_listing: SourceListing,
    pub marker_style: MarkerStyle,
}

pub struct ReportRenderer {
    config: ReportConfig,
    policy: RenderPolicy,
    layout: TextLayout,
}

impl ReportRenderer {
    pub fn new(config: ReportConfig, policy: RenderPolicy) -> Self {
        let layout = TextLayout::new(config.use_color, config.thresholds());
        Self {
            config,
            policy,
            layout,
        }
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Render with the current local time in the header.
    pub fn render_now(&self, report: &SuiteReport, sources: &dyn SourceReader) -> String {
        self.render(report, sources, Local::now().naive_local())
    }

    pub fn render(
        &self,
        report: &SuiteReport,
        sources: &dyn SourceReader,
        generated_at: NaiveDateTime,
    ) -> String {
        let totals = report.totals();

        if self.config.show_only_summary {
            return self.layout.summary_block(&[SUMMARY_TITLE], &totals);
        }

        let date = generated_at.format("  %Y-%m-%d %H:%M:%S").to_string();
        let mut sections = vec![self
            .layout
            .summary_block(&[TITLE, date.as_str(), "", " Summary:"], &totals)];

        let mut nodes: HashMap<&str, &FileNode> = HashMap::new();
        let mut index = ClassIndex::new();
        for file in report.root.files() {
            log_malformed_lines(file);
            for class in &file.classes {
                index.insert(aggregate_class(&file.path, class));
            }
            nodes.entry(file.path.as_str()).or_insert(file);
        }

        // Sources are read on first use, only for classes that get a listing.
        let mut listed: HashMap<&str, FileReport> = HashMap::new();
        for class in index.into_sorted() {
            if class.statements_covered == 0 && !self.config.show_uncovered_files {
                continue;
            }
            let file = match nodes.get(class.file.as_str()) {
                Some(&node) if self.shows_listing(&class) => Some(
                    &*listed
                        .entry(node.path.as_str())
                        .or_insert_with(|| build_file_report(node, sources)),
                ),
                _ => None,
            };
            sections.push(self.class_section(&class, file));
        }

        sections.join("\n")
    }

    fn shows_listing(&self, class: &ClassStat) -> bool {
        match self.policy.source_listing {
            SourceListing::Always => true,
            SourceListing::UnlessFullyCovered => !class.is_fully_covered(),
        }
    }

    fn class_section(&self, class: &ClassStat, file: Option<&FileReport>) -> String {
        let mut out = self.layout.class_header(class);
        for method in &class.methods {
            out.push_str(&self.layout.method_line(method));
        }

        if let Some(listing) =
            file.and_then(|f| self.layout.source_listing(f, self.policy.marker_style))
        {
            out.push('\n');
            out.push_str(&listing);
        }
        out
    }
}

fn log_malformed_lines(file: &FileNode) {
    for line in malformed_lines(&file.lines) {
        let err = CovtermError::MalformedCoverageRecord {
            path: file.path.clone(),
            line,
        };
        debug!("{err}, treating as not executable");
    }
}

/// Read and classify one file. An unreadable source leaves `source_lines`
/// empty; the file's classes still count.
fn build_file_report(file: &FileNode, sources: &dyn SourceReader) -> FileReport {
    match sources.read_source(&file.path) {
        Ok(text) => {
            let source_lines = split_lines(&text);
            let records = classify_file(&file.lines, source_lines.len() as u32);
            FileReport {
                path: file.path.clone(),
                source_lines: Some(source_lines),
                records,
            }
        }
        Err(source) => {
            let err = CovtermError::SourceUnreadable {
                path: file.path.clone(),
                source,
            };
            warn!("{err}, omitting its source listing");
            FileReport {
                path: file.path.clone(),
                source_lines: None,
                records: Vec::new(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::io;

    use crate::model::{ClassNode, MethodNode, RawLine, ReportNode};

    fn method(name: &str, start: u32, end: u32, executable: u64, executed: u64) -> MethodNode {
        MethodNode {
            name: name.into(),
            start_line: start,
            end_line: end,
            executable_lines: executable,
            executed_lines: executed,
            ccn: 1.0,
            crap: 2.0,
        }
    }

    fn file(path: &str, class: &str, methods: Vec<MethodNode>) -> ReportNode {
        let mut node = FileNode::new(path);
        node.lines.insert(2, RawLine::Tests(vec!["t".into()]));
        node.lines.insert(3, RawLine::Tests(vec![]));
        node.classes.push(ClassNode {
            name: class.into(),
            namespace: String::new(),
            package: String::new(),
            methods,
        });
        ReportNode::File(node)
    }

    fn report(children: Vec<ReportNode>) -> SuiteReport {
        SuiteReport::from_root(ReportNode::Directory {
            path: "src".into(),
            children,
        })
    }

    fn sources(paths: &[&str]) -> HashMap<String, String> {
        paths
            .iter()
            .map(|p| (p.to_string(), "a\nb\nc\n".to_string()))
            .collect()
    }

    fn at() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2024-01-02 03:04:05", "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn renderer(config: ReportConfig, policy: RenderPolicy) -> ReportRenderer {
        ReportRenderer::new(config, policy)
    }

    #[test]
    fn test_header_with_timestamp() {
        let r = renderer(ReportConfig::default(), RenderPolicy::default());
        let out = r.render(&report(vec![]), &sources(&[]), at());
        let lines: Vec<_> = out.lines().map(str::trim_end).collect();
        assert_eq!(lines[0], TITLE);
        assert_eq!(lines[1], "  2024-01-02 03:04:05");
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], " Summary:");
        assert!(lines[4].starts_with("  Classes:"));
        assert!(out.ends_with('\n'));
    }

    #[test]
    fn test_classes_sorted_across_files() {
        let r = renderer(ReportConfig::default(), RenderPolicy::default());
        let suite = report(vec![
            file("b.php", "Zed", vec![method("z", 1, 3, 2, 1)]),
            file("a.php", "Alpha", vec![method("a", 1, 3, 2, 1)]),
        ]);
        let out = r.render(&suite, &sources(&["a.php", "b.php"]), at());
        let alpha = out.find("Alpha (Methods:").unwrap();
        let zed = out.find("Zed (Methods:").unwrap();
        assert!(alpha < zed);
    }

    #[test]
    fn test_hides_classes_without_covered_statements() {
        let config = ReportConfig {
            show_uncovered_files: false,
            ..Default::default()
        };
        let r = renderer(config, RenderPolicy::default());
        let suite = report(vec![
            file("a.php", "Tested", vec![method("a", 1, 3, 2, 1)]),
            file("b.php", "Untested", vec![method("b", 1, 3, 2, 0)]),
        ]);
        let out = r.render(&suite, &sources(&["a.php", "b.php"]), at());
        assert!(out.contains("Tested (Methods:"));
        assert!(!out.contains("Untested"));
    }

    #[test]
    fn test_listing_skipped_for_fully_covered_class() {
        let r = renderer(ReportConfig::default(), RenderPolicy::default());
        let suite = report(vec![file("a.php", "Done", vec![method("a", 1, 3, 2, 2)])]);
        let out = r.render(&suite, &sources(&["a.php"]), at());
        assert!(out.contains("Done (Methods: 100.00% (1/1)"));
        assert!(!out.contains("[1] a"));
    }

    #[test]
    fn test_listing_always_policy() {
        let policy = RenderPolicy {
            source_listing: SourceListing::Always,
            ..Default::default()
        };
        let r = renderer(ReportConfig::default(), policy);
        let suite = report(vec![file("a.php", "Done", vec![method("a", 1, 3, 2, 2)])]);
        let out = r.render(&suite, &sources(&["a.php"]), at());
        assert!(out.contains("[1] a"));
        assert!(out.contains("[2] b"));
        assert!(out.contains("[3] c"));
    }

    #[test]
    fn test_unreadable_source_keeps_class_section() {
        let r = renderer(ReportConfig::default(), RenderPolicy::default());
        let suite = report(vec![
            file("missing.php", "Lost", vec![method("gone", 1, 3, 2, 1)]),
            file("a.php", "Kept", vec![method("a", 1, 3, 2, 1)]),
        ]);
        let out = r.render(&suite, &sources(&["a.php"]), at());

        assert!(out.contains("Lost (Methods: 0.00% (0/1) | Lines: 50.00% (1/2))"));
        assert!(out.contains("  - [1:3] gone"));
        assert!(out.contains("Kept (Methods:"));
        // Only the readable file is listed.
        assert_eq!(out.matches("[1] a").count(), 1);
        assert!(out.contains("  Lines:    50.00% (2/4)"));
    }

    struct RecordingReader {
        files: HashMap<String, String>,
        reads: RefCell<Vec<String>>,
    }

    impl SourceReader for RecordingReader {
        fn read_source(&self, path: &str) -> io::Result<String> {
            self.reads.borrow_mut().push(path.to_string());
            self.files.read_source(path)
        }
    }

    #[test]
    fn test_reads_only_listed_sources() {
        let config = ReportConfig {
            show_uncovered_files: false,
            ..Default::default()
        };
        let r = renderer(config, RenderPolicy::default());
        let mut open = FileNode::new("open.php");
        for name in ["First", "Second"] {
            open.classes.push(ClassNode {
                name: name.into(),
                namespace: String::new(),
                package: String::new(),
                methods: vec![method("m", 1, 3, 2, 1)],
            });
        }
        let suite = report(vec![
            file("done.php", "Done", vec![method("a", 1, 3, 2, 2)]),
            file("hidden.php", "Hidden", vec![method("b", 1, 3, 2, 0)]),
            ReportNode::File(FileNode::new("classless.php")),
            ReportNode::File(open),
        ]);
        let reader = RecordingReader {
            files: sources(&["done.php", "open.php"]),
            reads: RefCell::new(Vec::new()),
        };

        let out = r.render(&suite, &reader, at());

        assert_eq!(*reader.reads.borrow(), ["open.php"]);
        assert_eq!(out.matches("[1] a").count(), 2);
        assert!(!out.contains("Hidden"));
    }

    #[test]
    fn test_duplicate_class_last_file_wins() {
        let r = renderer(ReportConfig::default(), RenderPolicy::default());
        let suite = report(vec![
            file("first.php", "Dup", vec![method("one", 1, 3, 2, 1)]),
            file("second.php", "Dup", vec![method("two", 1, 3, 2, 1)]),
        ]);
        let out = r.render(&suite, &sources(&["first.php", "second.php"]), at());
        assert_eq!(out.matches("Dup (Methods:").count(), 1);
        assert!(out.contains("] two"));
        assert!(!out.contains("] one"));
    }

    #[test]
    fn test_summary_only() {
        let config = ReportConfig {
            show_only_summary: true,
            ..Default::default()
        };
        let r = renderer(config, RenderPolicy::default());
        let suite = report(vec![file("a.php", "Alpha", vec![method("a", 1, 3, 2, 1)])]);
        let out = r.render(&suite, &sources(&["a.php"]), at());

        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0].trim_end(), SUMMARY_TITLE);
        assert!(!out.contains("Alpha"));
    }
}
