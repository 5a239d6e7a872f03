use std::path::Path;

use crate::error::{CovtermError, Result};
use crate::listener::LifecycleEvent;
use crate::model::SuiteReport;

/// Read an engine's JSON dump. Totals missing from the dump are tallied from
/// the tree.
pub fn load_report(path: &Path) -> Result<SuiteReport> {
    let content = std::fs::read(path)?;
    parse_report(&content)
}

pub fn parse_report(content: &[u8]) -> Result<SuiteReport> {
    let mut report: SuiteReport = serde_json::from_slice(content)?;
    if report.totals.is_none() {
        report.totals = Some(report.totals());
    }
    Ok(report)
}

/// Read a JSON-lines log of lifecycle events. Blank lines are ignored.
pub fn load_events(path: &Path) -> Result<Vec<LifecycleEvent>> {
    let text = std::fs::read_to_string(path)?;
    parse_events(&text)
}

pub fn parse_events(text: &str) -> Result<Vec<LifecycleEvent>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line).map_err(|e| {
                CovtermError::Parse(format!("event log line {}: {e}", i + 1))
            })
        })
        .collect()
}
