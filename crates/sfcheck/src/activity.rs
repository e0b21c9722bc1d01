//! Disk activity tracking.
//!
//! Compares the cluster's cumulative read + write byte counter with the
//! value saved by the previous run to tell whether any I/O happened in
//! between. The baseline lives in one small file per cluster.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::CheckError;
use crate::severity::Severity;

/// Outcome of a disk activity comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityCheck {
    /// `Yes`, `No` or `n/a`.
    pub label: &'static str,
    /// Severity of the comparison.
    pub severity: Severity,
    /// Value to persist as the next baseline.
    pub stored: String,
}

fn parse_counter(value: &str) -> Option<u128> {
    value.trim().parse().ok()
}

/// Compare the current cumulative byte count with the previous baseline.
///
/// - no baseline: `n/a`, UNKNOWN
/// - current is zero: `No`, CRITICAL (counters missing or reset)
/// - current equals baseline: `No`, WARNING (stalled I/O)
/// - otherwise: `Yes`, OK
///
/// The current value always becomes the new baseline.
#[must_use]
pub fn check_activity(previous: Option<&str>, current: &str) -> ActivityCheck {
    let stored = current.trim().to_string();

    let Some(previous) = previous else {
        return ActivityCheck {
            label: "n/a",
            severity: Severity::Unknown,
            stored,
        };
    };

    let current_value = parse_counter(current);
    let (label, severity) = if current_value == Some(0) {
        ("No", Severity::Critical)
    } else if same_counter(previous, current) {
        ("No", Severity::Warning)
    } else {
        ("Yes", Severity::Ok)
    };

    ActivityCheck {
        label,
        severity,
        stored,
    }
}

fn same_counter(previous: &str, current: &str) -> bool {
    match (parse_counter(previous), parse_counter(current)) {
        (Some(a), Some(b)) => a == b,
        _ => previous.trim() == current.trim(),
    }
}

/// Directory of per-cluster disk activity baselines.
#[derive(Debug, Clone)]
pub struct ActivityStore {
    dir: PathBuf,
}

impl ActivityStore {
    /// Create a store rooted at `dir`. The directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Baseline file for a cluster identity.
    #[must_use]
    pub fn path_for(&self, identity: &str) -> PathBuf {
        let safe: String = identity
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("cluster-{safe}.txt"))
    }

    /// Read the saved baseline, `None` when there is none yet or the file
    /// is empty.
    pub fn load(&self, identity: &str) -> Result<Option<String>, CheckError> {
        let path = self.path_for(identity);
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let value = content.lines().next().unwrap_or_default().trim();
                if value.is_empty() {
                    debug!(path = %path.display(), "Disk activity baseline is empty");
                    return Ok(None);
                }
                debug!(path = %path.display(), value, "Loaded disk activity baseline");
                Ok(Some(value.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(CheckError::State { path, source }),
        }
    }

    /// Replace the baseline. The new file is written next to the old one
    /// and renamed over it, so readers see either the old or the new value.
    pub fn save(&self, identity: &str, value: &str) -> Result<(), CheckError> {
        let path = self.path_for(identity);
        let state_err = |source| CheckError::State {
            path: path.clone(),
            source,
        };

        std::fs::create_dir_all(&self.dir).map_err(state_err)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir).map_err(state_err)?;
        tmp.write_all(value.as_bytes()).map_err(state_err)?;
        tmp.persist(&path).map_err(|e| state_err(e.error))?;

        debug!(path = %path.display(), value, "Saved disk activity baseline");
        Ok(())
    }

    /// Load the baseline, compare, and persist the current value.
    pub fn track(&self, identity: &str, current: &str) -> Result<ActivityCheck, CheckError> {
        let previous = self.load(identity)?;
        let check = check_activity(previous.as_deref(), current);
        self.save(identity, &check.stored)?;

        info!(
            cluster = identity,
            previous = previous.as_deref().unwrap_or("none"),
            current = %check.stored,
            activity = check.label,
            severity = %check.severity,
            "Disk activity checked"
        );
        Ok(check)
    }
}
