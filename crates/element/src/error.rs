//! Error types for metric sources.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while fetching data from a metric source.
#[derive(Error, Debug)]
pub enum SourceError {
    /// HTTP request failed before a response was received
    /// (unreachable host, TLS failure, timeout).
    #[error("unable to reach {endpoint}: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The endpoint rejected the supplied credentials.
    #[error("credentials rejected by {endpoint} (HTTP {status})")]
    Unauthorized { endpoint: String, status: u16 },

    /// The endpoint answered with a non-success HTTP status.
    #[error("HTTP {status} from {endpoint}: {message}")]
    Http {
        endpoint: String,
        status: u16,
        message: String,
    },

    /// The API returned a JSON-RPC error object.
    #[error("{method} failed: {name} ({code}): {message}")]
    Rpc {
        method: String,
        code: i64,
        name: String,
        message: String,
    },

    /// The response could not be interpreted.
    #[error("invalid response to {method}: {reason}")]
    InvalidResponse { method: String, reason: String },

    /// Invalid endpoint or client configuration.
    #[error("invalid source configuration: {0}")]
    Config(String),

    /// Snapshot file could not be read or written.
    #[error("snapshot {}: {source}", .path.display())]
    SnapshotIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Snapshot file is not valid YAML for a snapshot document.
    #[error("snapshot {} is malformed: {source}", .path.display())]
    SnapshotFormat {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Snapshot does not contain the requested data.
    #[error("snapshot {} has no {section} section", .path.display())]
    SnapshotMissing { path: PathBuf, section: &'static str },
}

/// Coarse classification of a [`SourceError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Endpoint unreachable, TLS failure or credentials rejected.
    Connectivity,
    /// Response missing expected fields or unparsable.
    Protocol,
}

impl FailureClass {
    /// Get display name for this class.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Connectivity => "connectivity",
            Self::Protocol => "protocol",
        }
    }
}

impl std::fmt::Display for FailureClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SourceError {
    /// Classify this error as a connectivity or protocol failure.
    #[must_use]
    pub fn class(&self) -> FailureClass {
        match self {
            Self::Transport { source, .. } if source.is_decode() => FailureClass::Protocol,
            Self::Transport { .. }
            | Self::Unauthorized { .. }
            | Self::Config(_)
            | Self::SnapshotIo { .. } => FailureClass::Connectivity,
            Self::Http { .. }
            | Self::Rpc { .. }
            | Self::InvalidResponse { .. }
            | Self::SnapshotFormat { .. }
            | Self::SnapshotMissing { .. } => FailureClass::Protocol,
        }
    }

    pub(crate) fn invalid(method: &str, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            method: method.to_string(),
            reason: reason.into(),
        }
    }
}
