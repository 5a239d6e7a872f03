//! Per-line coverage classification.

use std::collections::BTreeMap;

use crate::model::{CoverageRecord, LineStatus, RawLine};

/// Classify one raw line entry. Absent, `null` and malformed entries are all
/// treated as not executable.
#[must_use]
pub fn classify(raw: Option<&RawLine>) -> LineStatus {
    match raw {
        None | Some(RawLine::Unmeasured) | Some(RawLine::Malformed(_)) => LineStatus::Uncoverable,
        Some(RawLine::Hits(0)) => LineStatus::Uncovered,
        Some(RawLine::Hits(hits)) => LineStatus::Covered { hits: *hits },
        Some(RawLine::Tests(tests)) if tests.is_empty() => LineStatus::Uncovered,
        Some(RawLine::Tests(tests)) => LineStatus::Covered {
            hits: tests.len() as u64,
        },
    }
}

/// One record per line in `1..=line_count`.
#[must_use]
pub fn classify_file(lines: &BTreeMap<u32, RawLine>, line_count: u32) -> Vec<CoverageRecord> {
    (1..=line_count)
        .map(|line_number| CoverageRecord {
            line_number,
            status: classify(lines.get(&line_number)),
        })
        .collect()
}

/// Line numbers whose entries had an unexpected shape.
#[must_use]
pub fn malformed_lines(lines: &BTreeMap<u32, RawLine>) -> Vec<u32> {
    lines
        .iter()
        .filter(|(_, raw)| matches!(raw, RawLine::Malformed(_)))
        .map(|(line, _)| *line)
        .collect()
}
