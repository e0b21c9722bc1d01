//! Status aggregation.
//!
//! Every metric a run looks at becomes a [`Reading`]. [`aggregate`] folds the
//! readings into an [`AggregateStatus`]: the worst severity seen plus the
//! readings in their original order, with out-of-range values marked.

use serde::Serialize;

use crate::severity::Severity;

/// Appended to the display value of every reading that is not OK.
pub const MARKER: char = '*';

/// A labelled value and the severity it produced, before aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reading {
    /// Field label.
    pub label: String,
    /// Display value.
    pub value: String,
    /// Severity of this value (OK for informational fields).
    pub severity: Severity,
    /// Whether the field belongs in the single-line summary.
    pub summary: bool,
}

impl Reading {
    /// An informational field; always OK.
    pub fn info(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::checked(label, value, Severity::Ok)
    }

    /// A field that was evaluated to `severity`.
    pub fn checked(label: impl Into<String>, value: impl Into<String>, severity: Severity) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            severity,
            summary: false,
        }
    }

    /// Include this field in the single-line summary.
    #[must_use]
    pub fn in_summary(mut self) -> Self {
        self.summary = true;
        self
    }
}

/// A reading after aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    /// Field label.
    pub label: String,
    /// Display value, ending with [`MARKER`] when the severity is not OK.
    pub display: String,
    /// Severity of this field.
    pub severity: Severity,
    /// Whether the field belongs in the single-line summary.
    #[serde(skip)]
    pub summary: bool,
}

/// Overall outcome of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateStatus {
    /// Worst severity across all results.
    pub severity: Severity,
    /// Results in the order they were supplied.
    pub results: Vec<CheckResult>,
}

impl AggregateStatus {
    /// Look up a result by label.
    #[must_use]
    pub fn get(&self, label: &str) -> Option<&CheckResult> {
        self.results.iter().find(|r| r.label == label)
    }

    /// Results that belong in the single-line summary.
    pub fn summary(&self) -> impl Iterator<Item = &CheckResult> {
        self.results.iter().filter(|r| r.summary)
    }
}

/// Fold readings into an overall status.
///
/// Order is preserved; the overall severity is the maximum of all reading
/// severities and does not depend on order. No readings means OK.
pub fn aggregate(readings: impl IntoIterator<Item = Reading>) -> AggregateStatus {
    let mut severity = Severity::Ok;
    let mut results = Vec::new();

    for reading in readings {
        severity = severity.worst(reading.severity);

        let mut display = reading.value;
        if reading.severity.is_problem() {
            display.push(MARKER);
        }

        results.push(CheckResult {
            label: reading.label,
            display,
            severity: reading.severity,
            summary: reading.summary,
        });
    }

    AggregateStatus { severity, results }
}
