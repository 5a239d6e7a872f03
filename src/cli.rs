//! Command handler functions for the covterm CLI.
//!
//! Each `cmd_*` function returns its output as a `String`, making them easy
//! to test without capturing stdout.

use std::path::Path;

use anyhow::{Context, Result};

use crate::config::Settings;
use crate::engine::SnapshotEngine;
use crate::error::CovtermError;
use crate::ingest;
use crate::listener::CoverageListener;
use crate::render::ReportRenderer;
use crate::source::SourceReader;

/// Render a report dump.
pub fn cmd_report(
    input: &Path,
    settings: &Settings,
    use_color: bool,
    sources: &dyn SourceReader,
) -> Result<String> {
    let report = ingest::load_report(input)
        .with_context(|| format!("Failed to load coverage report {}", input.display()))?;

    let mut config = settings.report.clone();
    config.use_color = use_color;
    let renderer = ReportRenderer::new(config, settings.render);
    Ok(renderer.render_now(&report, sources))
}

/// Replay a recorded event log against a snapshot engine and return what the
/// listener writes at the end of the run.
pub fn cmd_replay(
    events: &Path,
    snapshot: &Path,
    settings: &Settings,
    use_color: bool,
    sources: Box<dyn SourceReader>,
) -> Result<String> {
    let events = ingest::load_events(events)
        .with_context(|| format!("Failed to load event log {}", events.display()))?;

    let engine = match SnapshotEngine::open(snapshot) {
        Ok(engine) => engine,
        Err(err @ CovtermError::MeasurementUnavailable(_)) => return Ok(format!("{err}\n")),
        Err(err) => {
            return Err(err)
                .with_context(|| format!("Failed to load snapshot {}", snapshot.display()))
        }
    };

    let mut listener = CoverageListener::new(engine, settings, use_color, sources, Vec::new());
    for event in events {
        listener.handle(event)?;
    }
    let out = listener.finish()?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}
