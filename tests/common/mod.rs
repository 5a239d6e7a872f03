#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::NaiveDateTime;
use covterm::config::ReportConfig;
use covterm::model::SuiteReport;
use covterm::render::{RenderPolicy, ReportRenderer};
use covterm::source::SourceReader;

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// The `Foo` suite dump, as the engine would hand it over.
pub fn foo_suite() -> SuiteReport {
    covterm::ingest::load_report(&fixture("foo_suite.json")).unwrap()
}

/// Sources keyed by the paths used in the fixtures.
pub fn foo_sources() -> HashMap<String, String> {
    HashMap::from([(
        "Foo.php".to_string(),
        include_str!("../fixtures/Foo.php").to_string(),
    )])
}

pub fn fixed_time() -> NaiveDateTime {
    NaiveDateTime::parse_from_str("2024-05-06 07:08:09", "%Y-%m-%d %H:%M:%S").unwrap()
}

pub fn render(report: &SuiteReport, config: ReportConfig) -> String {
    render_with(report, config, &foo_sources())
}

pub fn render_with(
    report: &SuiteReport,
    config: ReportConfig,
    sources: &dyn SourceReader,
) -> String {
    ReportRenderer::new(config, RenderPolicy::default()).render(report, sources, fixed_time())
}
