//! Check target: which endpoint to ask and what kind of check to run.

use std::net::IpAddr;

use serde::Serialize;
use tracing::debug;

use crate::error::CheckError;

/// Kind of check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Cluster-wide check against the MVIP.
    #[value(alias = "mvip")]
    Cluster,
    /// Single node check against a node's management address.
    Node,
}

impl Mode {
    /// Get display name for this mode.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cluster => "cluster",
            Self::Node => "node",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Endpoint being checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// IP address or hostname as given.
    pub host: String,
    /// Management port.
    pub port: u16,
    /// Kind of check.
    pub mode: Mode,
}

impl Target {
    /// Create a target.
    pub fn new(host: impl Into<String>, port: u16, mode: Mode) -> Self {
        Self {
            host: host.into(),
            port,
            mode,
        }
    }

    /// Make sure the host is an IP address or a resolvable name.
    ///
    /// Returns the first address the host maps to.
    pub async fn resolve(&self) -> Result<IpAddr, CheckError> {
        let host = self.host.trim();
        if host.is_empty() {
            return Err(CheckError::Configuration("no host given".into()));
        }

        let literal = host.trim_start_matches('[').trim_end_matches(']');
        if let Ok(ip) = literal.parse::<IpAddr>() {
            return Ok(ip);
        }

        let mut addrs = tokio::net::lookup_host((host, self.port))
            .await
            .map_err(|e| {
                CheckError::Configuration(format!("unable to resolve hostname {host}: {e}"))
            })?;

        let addr = addrs.next().ok_or_else(|| {
            CheckError::Configuration(format!("unable to resolve hostname {host}"))
        })?;

        debug!(host, ip = %addr.ip(), "Resolved target");
        Ok(addr.ip())
    }
}
