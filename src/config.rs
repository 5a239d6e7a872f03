//! Report settings, loaded from an optional TOML file and then overridden
//! from the command line.

use std::path::Path;

use serde::Deserialize;

use crate::error::{CovtermError, Result};
use crate::render::RenderPolicy;
use crate::threshold::{Thresholds, DEFAULT_HIGH_LOWER_BOUND, DEFAULT_LOW_UPPER_BOUND};

/// Suites with more specs than this are not measured.
pub const DEFAULT_MAX_SPECS: usize = 1;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    pub low_upper_bound: f64,
    pub high_lower_bound: f64,
    pub show_uncovered_files: bool,
    pub show_only_summary: bool,
    /// Decided by terminal detection, never by the config file.
    #[serde(skip)]
    pub use_color: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            low_upper_bound: DEFAULT_LOW_UPPER_BOUND,
            high_lower_bound: DEFAULT_HIGH_LOWER_BOUND,
            show_uncovered_files: true,
            show_only_summary: false,
            use_color: false,
        }
    }
}

impl ReportConfig {
    #[must_use]
    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            low_upper_bound: self.low_upper_bound,
            high_lower_bound: self.high_lower_bound,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub max_specs: usize,
    /// Render a report even when the suite finished with a failure.
    pub report_failed_suites: bool,
    pub report: ReportConfig,
    pub render: RenderPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_specs: DEFAULT_MAX_SPECS,
            report_failed_suites: true,
            report: ReportConfig::default(),
            render: RenderPolicy::default(),
        }
    }
}

impl Settings {
    /// Parse settings from TOML text and validate them.
    pub fn from_toml(text: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn validate(&self) -> Result<()> {
        let low = self.report.low_upper_bound;
        let high = self.report.high_lower_bound;
        for (name, value) in [("low_upper_bound", low), ("high_lower_bound", high)] {
            if !(0.0..=100.0).contains(&value) {
                return Err(CovtermError::Config(format!(
                    "{name} must be between 0 and 100, got {value}"
                )));
            }
        }
        if low > high {
            return Err(CovtermError::Config(format!(
                "low_upper_bound ({low}) must not exceed high_lower_bound ({high})"
            )));
        }
        Ok(())
    }
}
