//! Coverage tiers used to pick a display color.

use crate::model::percent;

/// Upper bound (inclusive) of the low tier, in percent.
pub const DEFAULT_LOW_UPPER_BOUND: f64 = 35.0;
/// Lower bound (inclusive) of the high tier, in percent.
pub const DEFAULT_HIGH_LOWER_BOUND: f64 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub low_upper_bound: f64,
    pub high_lower_bound: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            low_upper_bound: DEFAULT_LOW_UPPER_BOUND,
            high_lower_bound: DEFAULT_HIGH_LOWER_BOUND,
        }
    }
}

impl Thresholds {
    #[must_use]
    pub fn classify_percent(&self, pct: f64) -> Tier {
        if pct >= self.high_lower_bound {
            Tier::High
        } else if pct > self.low_upper_bound {
            Tier::Medium
        } else {
            Tier::Low
        }
    }

    /// An empty total counts as 0%, which lands in the low tier.
    #[must_use]
    pub fn tier(&self, covered: u64, total: u64) -> Tier {
        self.classify_percent(percent(covered, total))
    }
}
