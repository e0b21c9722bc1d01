//! Error types for a check run.

use std::path::PathBuf;

use element::{FailureClass, SourceError};
use thiserror::Error;

use crate::severity::Severity;

/// Errors that abort a check run. Every variant is reported as UNKNOWN.
#[derive(Debug, Error)]
pub enum CheckError {
    /// Bad argument, configuration file or unresolvable target.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The metric source failed.
    #[error("{class} error: {0}", class = .0.class())]
    Source(#[source] SourceError),

    /// The disk activity baseline could not be read or written.
    #[error(
        "unable to read or write {} (check permissions or disable the disk activity check): {source}",
        .path.display()
    )]
    State {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<SourceError> for CheckError {
    /// Source-side configuration problems (bad endpoint, client setup) are
    /// configuration errors, not connectivity failures.
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::Config(message) => Self::Configuration(message),
            other => Self::Source(other),
        }
    }
}

impl CheckError {
    /// Severity reported for this error.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        Severity::Unknown
    }

    /// Source failure class, if the metric source failed.
    #[must_use]
    pub fn failure_class(&self) -> Option<FailureClass> {
        match self {
            Self::Source(e) => Some(e.class()),
            _ => None,
        }
    }
}
