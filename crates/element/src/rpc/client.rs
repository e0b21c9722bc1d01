//! Element JSON-RPC client implementation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use super::models::{
    ForceParams, ForcedClusterStateResult, GetClusterInfoResult, GetClusterStatsResult,
    GetClusterVersionInfoResult, ListActiveNodesResult, ListActiveVolumesResult,
    ListDrivesResult, ListIscsiSessionsResult, NodeClusterStateResult, RpcEnvelope, RpcRequest,
    TestConnectMvipResult,
};
use crate::error::SourceError;
use crate::source::{
    ClusterInfo, ClusterStats, ClusterVersion, Drive, MetricSource, NodeClusterState, NodeState,
};

/// Default API version in the endpoint path.
pub const DEFAULT_API_VERSION: &str = "9.0";

/// Default HTTPS port of the management endpoint.
pub const DEFAULT_PORT: u16 = 443;

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Longest HTTP error body kept in an error message.
const MAX_ERROR_BODY: usize = 256;

/// Connection options for [`ElementRpc`].
#[derive(Debug, Clone)]
pub struct RpcOptions {
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Accept self-signed or otherwise invalid TLS certificates.
    pub accept_invalid_certs: bool,
}

impl Default for RpcOptions {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            accept_invalid_certs: false,
        }
    }
}

/// Method parameters for calls that take none.
#[derive(Debug, Serialize)]
struct NoParams {}

/// JSON-RPC client for an Element cluster or node management endpoint.
pub struct ElementRpc {
    /// HTTP client.
    client: Client,
    /// Full JSON-RPC endpoint URL.
    url: Url,
    /// API user.
    username: String,
    /// API password.
    password: String,
    /// Next request ID.
    next_id: AtomicU64,
}

impl ElementRpc {
    /// Build the JSON-RPC endpoint URL for a host.
    ///
    /// IPv6 literals are bracketed automatically.
    pub fn endpoint(host: &str, port: u16, api_version: &str) -> Result<Url, SourceError> {
        let host = if host.contains(':') && !host.starts_with('[') {
            format!("[{host}]")
        } else {
            host.to_string()
        };

        Url::parse(&format!("https://{host}:{port}/json-rpc/{api_version}"))
            .map_err(|e| SourceError::Config(format!("invalid endpoint {host}:{port}: {e}")))
    }

    /// Create a new client.
    ///
    /// # Arguments
    /// * `url` - JSON-RPC endpoint, usually from [`ElementRpc::endpoint`]
    /// * `username` / `password` - cluster admin credentials
    /// * `options` - timeout and TLS settings
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(
        url: Url,
        username: impl Into<String>,
        password: impl Into<String>,
        options: RpcOptions,
    ) -> Result<Self, SourceError> {
        if options.accept_invalid_certs {
            warn!(url = %url, "TLS certificate verification disabled");
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .danger_accept_invalid_certs(options.accept_invalid_certs)
            .build()
            .map_err(|e| SourceError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url,
            username: username.into(),
            password: password.into(),
            next_id: AtomicU64::new(1),
        })
    }

    /// The endpoint this client talks to.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Call a JSON-RPC method and decode its `result`.
    pub async fn call<P, R>(&self, method: &str, params: P) -> Result<R, SourceError>
    where
        P: Serialize + Send,
        R: DeserializeOwned,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(method, id, url = %self.url, "JSON-RPC request");

        let response = self
            .client
            .post(self.url.clone())
            .basic_auth(&self.username, Some(&self.password))
            .json(&RpcRequest { method, params, id })
            .send()
            .await
            .map_err(|source| self.transport(source))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(SourceError::Unauthorized {
                endpoint: self.url.to_string(),
                status: status.as_u16(),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|source| self.transport(source))?;

        if !status.is_success() {
            let mut message = text;
            if message.len() > MAX_ERROR_BODY {
                let mut end = MAX_ERROR_BODY;
                while !message.is_char_boundary(end) {
                    end -= 1;
                }
                message.truncate(end);
            }
            return Err(SourceError::Http {
                endpoint: self.url.to_string(),
                status: status.as_u16(),
                message,
            });
        }

        Self::decode(method, &text)
    }

    /// Decode a JSON-RPC response body.
    fn decode<R: DeserializeOwned>(method: &str, text: &str) -> Result<R, SourceError> {
        let envelope: RpcEnvelope = serde_json::from_str(text).map_err(|e| {
            warn!(method, error = %e, "Response is not a JSON-RPC document");
            SourceError::invalid(method, format!("body is not JSON-RPC: {e}"))
        })?;

        if let Some(err) = envelope.error {
            return Err(SourceError::Rpc {
                method: method.to_string(),
                code: err.code,
                name: err.name,
                message: err.message,
            });
        }

        let result = envelope
            .result
            .ok_or_else(|| SourceError::invalid(method, "response has no result"))?;

        serde_json::from_value(result).map_err(|e| {
            warn!(method, error = %e, "Unexpected result shape");
            SourceError::invalid(method, e.to_string())
        })
    }

    fn transport(&self, source: reqwest::Error) -> SourceError {
        SourceError::Transport {
            endpoint: self.url.to_string(),
            source,
        }
    }
}

fn count(items: usize) -> u64 {
    u64::try_from(items).unwrap_or(u64::MAX)
}

#[async_trait]
impl MetricSource for ElementRpc {
    fn name(&self) -> &'static str {
        "rpc"
    }

    async fn cluster_info(&self) -> Result<ClusterInfo, SourceError> {
        let result: GetClusterInfoResult = self.call("GetClusterInfo", NoParams {}).await?;
        Ok(result.cluster_info.into())
    }

    async fn cluster_version(&self) -> Result<ClusterVersion, SourceError> {
        let result: GetClusterVersionInfoResult =
            self.call("GetClusterVersionInfo", NoParams {}).await?;
        Ok(result.into())
    }

    async fn cluster_stats(&self) -> Result<ClusterStats, SourceError> {
        let result: GetClusterStatsResult = self.call("GetClusterStats", NoParams {}).await?;
        Ok(result.cluster_stats.into())
    }

    async fn iscsi_session_count(&self) -> Result<u64, SourceError> {
        let result: ListIscsiSessionsResult = self.call("ListISCSISessions", NoParams {}).await?;
        Ok(count(result.sessions.len()))
    }

    async fn drives(&self) -> Result<Vec<Drive>, SourceError> {
        let result: ListDrivesResult = self.call("ListDrives", NoParams {}).await?;
        Ok(result.drives.into_iter().map(Drive::from).collect())
    }

    async fn node_states(&self) -> Result<Vec<NodeState>, SourceError> {
        let result: ForcedClusterStateResult = self
            .call("GetClusterState", ForceParams { force: true })
            .await?;
        Ok(result.nodes.into_iter().map(NodeState::from).collect())
    }

    async fn active_node_count(&self) -> Result<u64, SourceError> {
        let result: ListActiveNodesResult = self.call("ListActiveNodes", NoParams {}).await?;
        Ok(count(result.nodes.len()))
    }

    async fn active_volume_count(&self) -> Result<u64, SourceError> {
        let result: ListActiveVolumesResult =
            self.call("ListActiveVolumes", NoParams {}).await?;
        Ok(count(result.volumes.len()))
    }

    async fn node_cluster_state(&self) -> Result<NodeClusterState, SourceError> {
        let result: NodeClusterStateResult = self.call("GetClusterState", NoParams {}).await?;
        Ok(result.into())
    }

    async fn node_mvip(&self) -> Result<Option<String>, SourceError> {
        let result: TestConnectMvipResult = self.call("TestConnectMvip", NoParams {}).await?;
        Ok(result
            .details
            .and_then(|d| d.mvip)
            .filter(|mvip| !mvip.is_empty()))
    }
}
