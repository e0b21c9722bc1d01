//! Threshold evaluation.

use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_UTILIZATION_CRITICAL, DEFAULT_UTILIZATION_WARNING};
use crate::severity::Severity;

/// Map a value onto a severity using an exclusive upper bound on both
/// thresholds: `value == critical` is still a warning.
#[must_use]
pub fn evaluate(value: f64, warning: f64, critical: f64) -> Severity {
    if value > critical {
        Severity::Critical
    } else if value > warning {
        Severity::Warning
    } else {
        Severity::Ok
    }
}

/// A warning/critical threshold pair. Missing keys take the utilization
/// defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Thresholds {
    /// Values above this are at least a warning.
    pub warning: f64,
    /// Values above this are critical.
    pub critical: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::new(DEFAULT_UTILIZATION_WARNING, DEFAULT_UTILIZATION_CRITICAL)
    }
}

impl Thresholds {
    /// Create a threshold pair.
    #[must_use]
    pub const fn new(warning: f64, critical: f64) -> Self {
        Self { warning, critical }
    }

    /// Evaluate a value against this pair.
    #[must_use]
    pub fn evaluate(&self, value: f64) -> Severity {
        evaluate(value, self.warning, self.critical)
    }

    /// Whether the pair is usable: finite, non-negative and ordered.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.warning.is_finite()
            && self.critical.is_finite()
            && self.warning >= 0.0
            && self.warning <= self.critical
    }
}

/// Session capacity heuristic: each ensemble member is assumed to carry a
/// fixed number of iSCSI sessions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionLimits {
    /// Sessions supported per ensemble member.
    pub per_ensemble_member: u64,
    /// Fraction of the maximum at which to warn.
    pub warning_ratio: f64,
}

impl Default for SessionLimits {
    fn default() -> Self {
        // 250 volumes * 4 active sessions per node
        Self {
            per_ensemble_member: 1000,
            warning_ratio: 0.9,
        }
    }
}

impl SessionLimits {
    /// Threshold pair for a cluster with `ensemble_count` members.
    #[must_use]
    pub fn thresholds(&self, ensemble_count: usize) -> Thresholds {
        let max_sessions = (ensemble_count as u64).saturating_mul(self.per_ensemble_member) as f64;
        Thresholds::new(max_sessions * self.warning_ratio, max_sessions)
    }

    /// Whether the ratio lies in `(0, 1]`.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.warning_ratio > 0.0 && self.warning_ratio <= 1.0
    }
}
