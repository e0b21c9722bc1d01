//! Check configuration.
//!
//! Defaults match the calibrated thresholds; a TOML file can override any
//! of them:
//!
//! ```toml
//! state_dir = "/var/lib/sfcheck"
//!
//! [checks]
//! utilization = true
//! sessions = true
//! disk_activity = false
//!
//! [utilization]
//! warning = 80.0
//! critical = 90.0
//!
//! [sessions]
//! per_ensemble_member = 1000
//! warning_ratio = 0.9
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CheckError;
use crate::threshold::{SessionLimits, Thresholds};

/// Default utilization warning threshold (percent).
pub const DEFAULT_UTILIZATION_WARNING: f64 = 80.0;

/// Default utilization critical threshold (percent).
pub const DEFAULT_UTILIZATION_CRITICAL: f64 = 90.0;

/// Which checks raise alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnabledChecks {
    /// Alert on cluster space utilization.
    pub utilization: bool,
    /// Alert on the number of iSCSI sessions.
    pub sessions: bool,
    /// Alert when no disk activity happened since the last run.
    pub disk_activity: bool,
}

impl Default for EnabledChecks {
    fn default() -> Self {
        Self {
            utilization: true,
            sessions: true,
            disk_activity: false,
        }
    }
}

/// Complete check configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CheckConfig {
    /// Enabled checks.
    pub checks: EnabledChecks,
    /// Utilization thresholds in percent.
    pub utilization: Thresholds,
    /// iSCSI session capacity heuristic.
    pub sessions: SessionLimits,
    /// Directory holding disk activity baselines.
    pub state_dir: PathBuf,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            checks: EnabledChecks::default(),
            utilization: Thresholds::default(),
            sessions: SessionLimits::default(),
            state_dir: std::env::temp_dir(),
        }
    }
}

impl CheckConfig {
    /// Parse configuration from TOML text and validate it.
    pub fn from_toml(text: &str) -> Result<Self, CheckError> {
        let config: Self = toml::from_str(text)
            .map_err(|e| CheckError::Configuration(format!("invalid configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, CheckError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            CheckError::Configuration(format!("unable to read {}: {e}", path.display()))
        })?;
        let config = Self::from_toml(&text)?;
        debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Load from `path` when given, otherwise use defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, CheckError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Reject thresholds that cannot be evaluated meaningfully.
    pub fn validate(&self) -> Result<(), CheckError> {
        if !self.utilization.is_valid() {
            return Err(CheckError::Configuration(format!(
                "utilization warning ({}) must be a non-negative number not above critical ({})",
                self.utilization.warning, self.utilization.critical
            )));
        }
        if !self.sessions.is_valid() {
            return Err(CheckError::Configuration(format!(
                "sessions warning_ratio ({}) must be in (0, 1]",
                self.sessions.warning_ratio
            )));
        }
        if self.sessions.per_ensemble_member == 0 {
            return Err(CheckError::Configuration(
                "sessions per_ensemble_member must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CheckConfig::default();
        assert!(config.checks.utilization);
        assert!(config.checks.sessions);
        assert!(!config.checks.disk_activity);
        assert_eq!(config.utilization, Thresholds::new(80.0, 90.0));
        assert_eq!(config.sessions.per_ensemble_member, 1000);
        config.validate().unwrap();
    }

    #[test]
    fn test_empty_file_is_default() {
        let config = CheckConfig::from_toml("").unwrap();
        assert_eq!(config, CheckConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = CheckConfig::from_toml(
            r#"
            state_dir = "/var/lib/sfcheck"

            [checks]
            disk_activity = true

            [utilization]
            warning = 70.0
            critical = 85.0
            "#,
        )
        .unwrap();

        assert!(config.checks.disk_activity);
        assert!(config.checks.sessions);
        assert_eq!(config.utilization, Thresholds::new(70.0, 85.0));
        assert_eq!(config.state_dir, PathBuf::from("/var/lib/sfcheck"));
        assert_eq!(config.sessions, SessionLimits::default());
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let err = CheckConfig::from_toml("[utilization]\nwarning = 95.0\ncritical = 90.0\n")
            .unwrap_err();
        assert!(matches!(err, CheckError::Configuration(_)));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = CheckConfig::from_toml("[checks]\nlatency = true\n").unwrap_err();
        assert!(err.to_string().contains("invalid configuration"));
    }

    #[test]
    fn test_bad_ratio_rejected() {
        let err = CheckConfig::from_toml("[sessions]\nwarning_ratio = 0.0\n").unwrap_err();
        assert!(err.to_string().contains("warning_ratio"));
    }

    #[test]
    fn test_single_key_per_section() {
        let config = CheckConfig::from_toml("[utilization]\nwarning = 70.0\n").unwrap();
        assert_eq!(config.utilization, Thresholds::new(70.0, 90.0));

        let config = CheckConfig::from_toml("[utilization]\ncritical = 95.0\n").unwrap();
        assert_eq!(config.utilization, Thresholds::new(80.0, 95.0));

        let config = CheckConfig::from_toml("[sessions]\nwarning_ratio = 0.8\n").unwrap();
        assert_eq!(config.sessions.per_ensemble_member, 1000);
        assert!((config.sessions.warning_ratio - 0.8).abs() < f64::EPSILON);

        let config = CheckConfig::from_toml("[sessions]\nper_ensemble_member = 500\n").unwrap();
        assert_eq!(config.sessions.per_ensemble_member, 500);
        assert!((config.sessions.warning_ratio - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn test_single_key_still_validated() {
        let err = CheckConfig::from_toml("[utilization]\nwarning = 95.0\n").unwrap_err();
        assert!(err.to_string().contains("utilization warning"));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = CheckConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, CheckError::Configuration(_)));
    }
}
