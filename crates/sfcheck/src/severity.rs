//! Check severities and their plugin exit codes.

use serde::{Deserialize, Serialize};

/// Outcome of a check, ordered from best to worst.
///
/// Combining severities always keeps the greater value, including the
/// out-of-band `Unknown` and `Dependent` states.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Everything within thresholds
    #[default]
    Ok = 0,
    /// Above the warning threshold
    Warning = 1,
    /// Above the critical threshold
    Critical = 2,
    /// State could not be determined
    Unknown = 3,
    /// Depends on another failing check; never produced by aggregation
    Dependent = 4,
}

impl Severity {
    /// Process exit code for this severity.
    #[must_use]
    pub const fn exit_code(self) -> i32 {
        self as i32
    }

    /// Plain upper-case name (`OK`, `WARNING`, ...).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Warning => "WARNING",
            Self::Critical => "CRITICAL",
            Self::Unknown => "UNKNOWN",
            Self::Dependent => "DEPENDENT",
        }
    }

    /// Label shown in the exit state row of the table.
    #[must_use]
    pub const fn display_label(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Warning => "*Warning",
            Self::Critical => "*Critical",
            Self::Unknown => "*Unknown",
            Self::Dependent => "*Dependent",
        }
    }

    /// Whether this severity needs attention.
    #[must_use]
    pub const fn is_problem(self) -> bool {
        !matches!(self, Self::Ok)
    }

    /// The worse of two severities.
    #[must_use]
    pub fn worst(self, other: Self) -> Self {
        self.max(other)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
