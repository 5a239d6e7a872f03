//! Test-run lifecycle handling: measurement around each test case, one
//! report per suite, and a single buffered write when the run ends.

use std::io::{self, Write};

use serde::Deserialize;
use tracing::{info, warn};

use crate::config::Settings;
use crate::engine::{CoverageEngine, TestResource};
use crate::error::{CovtermError, Result};
use crate::render::ReportRenderer;
use crate::source::SourceReader;

/// Events emitted by the test runner, in the order it emits them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LifecycleEvent {
    BeforeSuite { spec_count: usize },
    BeforeTestCase { resource: TestResource },
    AfterTestCase,
    /// `result` is the runner's exit status for the suite; 0 means passed.
    AfterSuite { result: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gate {
    /// No suite has started yet.
    Idle,
    Enabled,
    Disabled { spec_count: usize },
}

/// Owns the engine for the whole run. Call [`CoverageListener::finish`] when
/// the run ends; if it is dropped instead, pending output is still written.
pub struct CoverageListener<E: CoverageEngine, W: Write> {
    engine: E,
    renderer: ReportRenderer,
    sources: Box<dyn SourceReader>,
    max_specs: usize,
    report_failed_suites: bool,
    gate: Gate,
    measuring: bool,
    pending: Vec<String>,
    out: Option<W>,
}

impl<E: CoverageEngine, W: Write> CoverageListener<E, W> {
    pub fn new(
        engine: E,
        settings: &Settings,
        use_color: bool,
        sources: Box<dyn SourceReader>,
        out: W,
    ) -> Self {
        let mut config = settings.report.clone();
        config.use_color = use_color;
        Self {
            engine,
            renderer: ReportRenderer::new(config, settings.render),
            sources,
            max_specs: settings.max_specs,
            report_failed_suites: settings.report_failed_suites,
            gate: Gate::Idle,
            measuring: false,
            pending: Vec::new(),
            out: Some(out),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.gate == Gate::Enabled
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn handle(&mut self, event: LifecycleEvent) -> Result<()> {
        match event {
            LifecycleEvent::BeforeSuite { spec_count } => {
                self.on_before_suite(spec_count);
                Ok(())
            }
            LifecycleEvent::BeforeTestCase { resource } => self.on_before_test_case(&resource),
            LifecycleEvent::AfterTestCase => self.on_after_test_case(),
            LifecycleEvent::AfterSuite { result } => self.on_after_suite(result),
        }
    }

    pub fn on_before_suite(&mut self, spec_count: usize) {
        if spec_count > self.max_specs {
            info!(spec_count, max_specs = self.max_specs, "suite too large, coverage disabled");
            self.gate = Gate::Disabled { spec_count };
        } else {
            self.gate = Gate::Enabled;
        }
    }

    pub fn on_before_test_case(&mut self, resource: &TestResource) -> Result<()> {
        if !self.is_enabled() {
            return Ok(());
        }
        self.stop_measuring()?;
        self.engine.start(resource)?;
        self.measuring = true;
        Ok(())
    }

    pub fn on_after_test_case(&mut self) -> Result<()> {
        if !self.is_enabled() {
            return Ok(());
        }
        self.stop_measuring()
    }

    pub fn on_after_suite(&mut self, result: i32) -> Result<()> {
        if !self.is_enabled() {
            return Ok(());
        }
        self.stop_measuring()?;

        if result != 0 && !self.report_failed_suites {
            info!(result, "suite failed, skipping coverage report");
            return Ok(());
        }

        let report = self.engine.report()?;
        let rendered = self.renderer.render_now(&report, &*self.sources);
        self.pending.push(rendered);
        Ok(())
    }

    /// Write everything buffered during the run and hand back the writer.
    pub fn finish(mut self) -> Result<W> {
        let mut out = self
            .out
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "listener already finished"))?;
        self.shutdown(&mut out)?;
        Ok(out)
    }

    fn stop_measuring(&mut self) -> Result<()> {
        if self.measuring {
            self.measuring = false;
            self.engine.stop()?;
        }
        Ok(())
    }

    fn shutdown(&mut self, out: &mut W) -> Result<()> {
        if let Err(err) = self.stop_measuring() {
            warn!("failed to stop measurement: {err}");
        }

        for report in self.pending.drain(..) {
            writeln!(out, "{report}")?;
        }
        if let Gate::Disabled { spec_count } = self.gate {
            let message = CovtermError::SuiteTooLarge {
                count: spec_count,
                max: self.max_specs,
            };
            writeln!(out, "{message}")?;
        }
        out.flush()?;
        Ok(())
    }
}

impl<E: CoverageEngine, W: Write> Drop for CoverageListener<E, W> {
    fn drop(&mut self) {
        if let Some(mut out) = self.out.take() {
            if let Err(err) = self.shutdown(&mut out) {
                warn!("failed to write coverage output: {err}");
            }
        }
    }
}
