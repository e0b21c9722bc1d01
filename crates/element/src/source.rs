//! Metric source trait and the cluster data it yields.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SourceError;

/// Cluster identity and layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterInfo {
    /// Cluster name.
    pub name: String,
    /// Management virtual IP.
    pub mvip: String,
    /// Node currently hosting the MVIP.
    #[serde(default)]
    pub mvip_node_id: Option<u64>,
    /// Storage virtual IP.
    pub svip: String,
    /// Node currently hosting the SVIP.
    #[serde(default)]
    pub svip_node_id: Option<u64>,
    /// Encryption-at-rest state (e.g. "enabled", "disabled").
    pub encryption_at_rest_state: String,
    /// Replication count (2 = double helix).
    pub rep_count: u32,
    /// Cluster unique ID (used in IQNs).
    pub unique_id: String,
    /// Addresses of the ensemble members.
    pub ensemble: Vec<String>,
}

/// Software version of the cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterVersion {
    /// Element OS version.
    pub cluster_version: String,
    /// Highest API version supported.
    pub api_version: String,
}

/// Cumulative cluster I/O statistics and current utilization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterStats {
    /// Total bytes read since cluster creation.
    pub read_bytes: u64,
    /// Total bytes written since cluster creation.
    pub write_bytes: u64,
    /// Total read operations.
    pub read_ops: u64,
    /// Total write operations.
    pub write_ops: u64,
    /// Average read latency in microseconds.
    pub read_latency_usec: u64,
    /// Average write latency in microseconds.
    pub write_latency_usec: u64,
    /// Average overall latency in microseconds.
    pub latency_usec: u64,
    /// Average I/O size in bytes.
    pub average_io_size: u64,
    /// Cluster utilization percentage.
    pub cluster_utilization: f64,
}

impl ClusterStats {
    /// Cumulative read + write bytes.
    #[must_use]
    pub const fn total_bytes(&self) -> u64 {
        self.read_bytes.saturating_add(self.write_bytes)
    }

    /// Cumulative read + write operations.
    #[must_use]
    pub const fn total_ops(&self) -> u64 {
        self.read_ops.saturating_add(self.write_ops)
    }
}

/// Cluster membership state reported by one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeState {
    /// Node ID.
    pub node_id: u64,
    /// Node state (e.g. "Active"); `None` when the node is not in a cluster.
    #[serde(default)]
    pub state: Option<String>,
    /// Name of the cluster the node belongs to.
    #[serde(default)]
    pub cluster: Option<String>,
}

/// A drive and where it lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Drive {
    /// Drive ID.
    pub drive_id: u64,
    /// Owning node.
    pub node_id: u64,
    /// Drive type ("volume", "block", "unknown").
    pub drive_type: String,
    /// Drive status ("active", "available", "failed", ...).
    pub status: String,
}

/// Cluster state as seen from a single node's management endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeClusterState {
    /// Node state (e.g. "Active", "Available", "Pending").
    pub state: String,
    /// Cluster name, when the node has joined one.
    #[serde(default)]
    pub cluster: Option<String>,
}

/// Source of cluster metrics.
///
/// Cluster-scoped operations are answered by the cluster MVIP, node-scoped
/// ones by a single node's management address.
#[async_trait]
pub trait MetricSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Cluster identity and ensemble.
    async fn cluster_info(&self) -> Result<ClusterInfo, SourceError>;

    /// Cluster software version.
    async fn cluster_version(&self) -> Result<ClusterVersion, SourceError>;

    /// Cumulative I/O statistics and utilization.
    async fn cluster_stats(&self) -> Result<ClusterStats, SourceError>;

    /// Number of active iSCSI sessions.
    async fn iscsi_session_count(&self) -> Result<u64, SourceError>;

    /// All drives in the cluster.
    async fn drives(&self) -> Result<Vec<Drive>, SourceError>;

    /// Membership state of every node.
    async fn node_states(&self) -> Result<Vec<NodeState>, SourceError>;

    /// Number of active nodes.
    async fn active_node_count(&self) -> Result<u64, SourceError>;

    /// Number of active volumes.
    async fn active_volume_count(&self) -> Result<u64, SourceError>;

    /// Cluster state of the node being queried (node endpoint).
    async fn node_cluster_state(&self) -> Result<NodeClusterState, SourceError>;

    /// MVIP reachable from the node being queried, if any (node endpoint).
    async fn node_mvip(&self) -> Result<Option<String>, SourceError>;
}
