//! Element JSON-RPC request and response models.
//!
//! Field names follow the Element API reference; only the fields the probe
//! reads are modelled.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::source::{ClusterInfo, ClusterStats, ClusterVersion, Drive, NodeClusterState, NodeState};

// ============================================================================
// JSON-RPC envelope
// ============================================================================

/// JSON-RPC request body.
#[derive(Debug, Serialize)]
pub struct RpcRequest<'a, P> {
    /// API method name.
    pub method: &'a str,
    /// Method parameters.
    pub params: P,
    /// Request ID.
    pub id: u64,
}

/// JSON-RPC response body, before the result is interpreted.
#[derive(Debug, Deserialize)]
pub struct RpcEnvelope {
    /// Method result.
    #[serde(default)]
    pub result: Option<Value>,
    /// Error object, present when the call failed.
    #[serde(default)]
    pub error: Option<RpcErrorBody>,
}

/// JSON-RPC error object.
#[derive(Debug, Deserialize)]
pub struct RpcErrorBody {
    /// Numeric error code.
    #[serde(default)]
    pub code: i64,
    /// Symbolic error name (e.g. `xUnknownAPIMethod`).
    #[serde(default)]
    pub name: String,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
}

/// Parameters for `GetClusterState` when asking every node.
#[derive(Debug, Serialize)]
pub struct ForceParams {
    /// Query all nodes instead of the receiving one.
    pub force: bool,
}

// ============================================================================
// Cluster methods
// ============================================================================

/// `GetClusterInfo` result.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetClusterInfoResult {
    pub cluster_info: WireClusterInfo,
}

/// Cluster info as returned by the API.
#[derive(Debug, Deserialize)]
pub struct WireClusterInfo {
    pub name: String,
    pub mvip: String,
    #[serde(rename = "mvipNodeID", default)]
    pub mvip_node_id: Option<u64>,
    pub svip: String,
    #[serde(rename = "svipNodeID", default)]
    pub svip_node_id: Option<u64>,
    #[serde(rename = "encryptionAtRestState", default)]
    pub encryption_at_rest_state: String,
    #[serde(rename = "repCount")]
    pub rep_count: u32,
    #[serde(rename = "uniqueID", default)]
    pub unique_id: String,
    pub ensemble: Vec<String>,
}

impl From<WireClusterInfo> for ClusterInfo {
    fn from(wire: WireClusterInfo) -> Self {
        Self {
            name: wire.name,
            mvip: wire.mvip,
            mvip_node_id: wire.mvip_node_id,
            svip: wire.svip,
            svip_node_id: wire.svip_node_id,
            encryption_at_rest_state: wire.encryption_at_rest_state,
            rep_count: wire.rep_count,
            unique_id: wire.unique_id,
            ensemble: wire.ensemble,
        }
    }
}

/// `GetClusterVersionInfo` result.
#[derive(Debug, Deserialize)]
pub struct GetClusterVersionInfoResult {
    #[serde(rename = "clusterVersion")]
    pub cluster_version: String,
    #[serde(rename = "clusterAPIVersion", default)]
    pub cluster_api_version: String,
}

impl From<GetClusterVersionInfoResult> for ClusterVersion {
    fn from(wire: GetClusterVersionInfoResult) -> Self {
        Self {
            cluster_version: wire.cluster_version,
            api_version: wire.cluster_api_version,
        }
    }
}

/// `GetClusterStats` result.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetClusterStatsResult {
    pub cluster_stats: WireClusterStats,
}

/// Cluster statistics as returned by the API.
#[derive(Debug, Deserialize)]
pub struct WireClusterStats {
    #[serde(rename = "readBytes")]
    pub read_bytes: u64,
    #[serde(rename = "writeBytes")]
    pub write_bytes: u64,
    #[serde(rename = "readOps", default)]
    pub read_ops: u64,
    #[serde(rename = "writeOps", default)]
    pub write_ops: u64,
    #[serde(rename = "readLatencyUSec", default)]
    pub read_latency_usec: u64,
    #[serde(rename = "writeLatencyUSec", default)]
    pub write_latency_usec: u64,
    #[serde(rename = "latencyUSec", default)]
    pub latency_usec: u64,
    #[serde(rename = "averageIOPSize", default)]
    pub average_iop_size: u64,
    #[serde(rename = "clusterUtilization")]
    pub cluster_utilization: f64,
}

impl From<WireClusterStats> for ClusterStats {
    fn from(wire: WireClusterStats) -> Self {
        Self {
            read_bytes: wire.read_bytes,
            write_bytes: wire.write_bytes,
            read_ops: wire.read_ops,
            write_ops: wire.write_ops,
            read_latency_usec: wire.read_latency_usec,
            write_latency_usec: wire.write_latency_usec,
            latency_usec: wire.latency_usec,
            average_io_size: wire.average_iop_size,
            cluster_utilization: wire.cluster_utilization,
        }
    }
}

/// `ListISCSISessions` result. Sessions are only counted.
#[derive(Debug, Deserialize)]
pub struct ListIscsiSessionsResult {
    pub sessions: Vec<Value>,
}

/// `ListActiveNodes` result. Nodes are only counted.
#[derive(Debug, Deserialize)]
pub struct ListActiveNodesResult {
    pub nodes: Vec<Value>,
}

/// `ListActiveVolumes` result. Volumes are only counted.
#[derive(Debug, Deserialize)]
pub struct ListActiveVolumesResult {
    pub volumes: Vec<Value>,
}

/// `ListDrives` result.
#[derive(Debug, Deserialize)]
pub struct ListDrivesResult {
    pub drives: Vec<WireDrive>,
}

/// Drive as returned by the API.
#[derive(Debug, Deserialize)]
pub struct WireDrive {
    #[serde(rename = "driveID")]
    pub drive_id: u64,
    #[serde(rename = "nodeID")]
    pub node_id: u64,
    #[serde(rename = "type", default)]
    pub drive_type: String,
    #[serde(default)]
    pub status: String,
}

impl From<WireDrive> for Drive {
    fn from(wire: WireDrive) -> Self {
        Self {
            drive_id: wire.drive_id,
            node_id: wire.node_id,
            drive_type: wire.drive_type,
            status: wire.status,
        }
    }
}

/// `GetClusterState` with `force=true`: one entry per node.
#[derive(Debug, Deserialize)]
pub struct ForcedClusterStateResult {
    pub nodes: Vec<WireNodeResult>,
}

/// One node's answer inside a forced `GetClusterState`.
#[derive(Debug, Deserialize)]
pub struct WireNodeResult {
    #[serde(rename = "nodeID")]
    pub node_id: u64,
    #[serde(default)]
    pub result: Option<WireNodeClusterState>,
}

/// Node cluster state body.
#[derive(Debug, Deserialize)]
pub struct WireNodeClusterState {
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub cluster: Option<String>,
}

impl From<WireNodeResult> for NodeState {
    fn from(wire: WireNodeResult) -> Self {
        let (state, cluster) = wire
            .result
            .map(|r| (r.state, r.cluster))
            .unwrap_or_default();
        Self {
            node_id: wire.node_id,
            state,
            cluster,
        }
    }
}

// ============================================================================
// Node methods
// ============================================================================

/// `GetClusterState` result on a node endpoint.
#[derive(Debug, Deserialize)]
pub struct NodeClusterStateResult {
    pub state: String,
    #[serde(default)]
    pub cluster: Option<String>,
}

impl From<NodeClusterStateResult> for NodeClusterState {
    fn from(wire: NodeClusterStateResult) -> Self {
        Self {
            state: wire.state,
            cluster: wire.cluster.filter(|c| !c.is_empty()),
        }
    }
}

/// `TestConnectMvip` result.
#[derive(Debug, Deserialize)]
pub struct TestConnectMvipResult {
    #[serde(default)]
    pub details: Option<MvipDetails>,
}

/// Details block of `TestConnectMvip`.
#[derive(Debug, Deserialize)]
pub struct MvipDetails {
    #[serde(default)]
    pub mvip: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serialization() {
        let req = RpcRequest {
            method: "GetClusterState",
            params: ForceParams { force: true },
            id: 7,
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            json!({"method": "GetClusterState", "params": {"force": true}, "id": 7})
        );
    }

    #[test]
    fn test_cluster_info_conversion() {
        let wire: GetClusterInfoResult = serde_json::from_value(json!({
            "clusterInfo": {
                "name": "sf-prod",
                "mvip": "10.0.0.10",
                "mvipNodeID": 1,
                "svip": "10.0.1.10",
                "svipNodeID": 2,
                "encryptionAtRestState": "disabled",
                "repCount": 2,
                "uniqueID": "abcd",
                "ensemble": ["10.0.2.1", "10.0.2.2", "10.0.2.3"],
                "attributes": {}
            }
        }))
        .unwrap();

        let info = ClusterInfo::from(wire.cluster_info);
        assert_eq!(info.name, "sf-prod");
        assert_eq!(info.mvip_node_id, Some(1));
        assert_eq!(info.ensemble.len(), 3);
    }

    #[test]
    fn test_forced_state_node_without_cluster() {
        let wire: ForcedClusterStateResult = serde_json::from_value(json!({
            "nodes": [
                {"nodeID": 1, "result": {"state": "Active", "cluster": "sf-prod"}},
                {"nodeID": 2, "result": {}}
            ]
        }))
        .unwrap();

        let states: Vec<NodeState> = wire.nodes.into_iter().map(NodeState::from).collect();
        assert_eq!(states[0].state.as_deref(), Some("Active"));
        assert_eq!(states[1].state, None);
        assert_eq!(states[1].cluster, None);
    }

    #[test]
    fn test_error_envelope() {
        let env: RpcEnvelope = serde_json::from_value(json!({
            "error": {"code": 500, "name": "xUnknownAPIMethod", "message": "Unknown method"},
            "id": 1
        }))
        .unwrap();
        assert!(env.result.is_none());
        assert_eq!(env.error.unwrap().name, "xUnknownAPIMethod");
    }
}
