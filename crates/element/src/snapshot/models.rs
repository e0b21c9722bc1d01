//! Snapshot document: captured answers to the metric source queries.

use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::SourceError;
use crate::source::{
    ClusterInfo, ClusterStats, ClusterVersion, Drive, MetricSource, NodeClusterState, NodeState,
};

/// Captured cluster data. Every section is optional; a query against a
/// missing section fails with [`SourceError::SnapshotMissing`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_info: Option<ClusterInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<ClusterVersion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<ClusterStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iscsi_sessions: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drives: Option<Vec<Drive>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_states: Option<Vec<NodeState>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_nodes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_volumes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<NodeSnapshot>,
}

/// Node endpoint answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    /// `GetClusterState` on the node.
    pub cluster_state: NodeClusterState,
    /// MVIP reported by `TestConnectMvip`.
    #[serde(default)]
    pub mvip: Option<String>,
}

impl Snapshot {
    /// Capture every cluster-scoped section from a live source.
    pub async fn capture_cluster(source: &dyn MetricSource) -> Result<Self, SourceError> {
        Ok(Self {
            cluster_info: Some(source.cluster_info().await?),
            version: Some(source.cluster_version().await?),
            stats: Some(source.cluster_stats().await?),
            iscsi_sessions: Some(source.iscsi_session_count().await?),
            drives: Some(source.drives().await?),
            node_states: Some(source.node_states().await?),
            active_nodes: Some(source.active_node_count().await?),
            active_volumes: Some(source.active_volume_count().await?),
            node: None,
        })
    }

    /// Capture the node-scoped section from a live source.
    ///
    /// The MVIP is only asked for when the node reports itself active.
    pub async fn capture_node(source: &dyn MetricSource) -> Result<Self, SourceError> {
        let cluster_state = source.node_cluster_state().await?;
        let mvip = if cluster_state.state == "Active" {
            source.node_mvip().await?
        } else {
            None
        };

        Ok(Self {
            node: Some(NodeSnapshot {
                cluster_state,
                mvip,
            }),
            ..Self::default()
        })
    }

    /// Parse a snapshot from YAML text.
    pub fn from_yaml(path: &Path, text: &str) -> Result<Self, SourceError> {
        serde_yaml::from_str(text).map_err(|source| SourceError::SnapshotFormat {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write the snapshot as YAML, replacing `path` atomically.
    pub fn save(&self, path: &Path) -> Result<(), SourceError> {
        let io_err = |source| SourceError::SnapshotIo {
            path: path.to_path_buf(),
            source,
        };

        let yaml = serde_yaml::to_string(self).map_err(|source| SourceError::SnapshotFormat {
            path: path.to_path_buf(),
            source,
        })?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(io_err)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
        tmp.write_all(yaml.as_bytes()).map_err(io_err)?;
        tmp.persist(path).map_err(|e| io_err(e.error))?;

        info!(path = %path.display(), "Snapshot saved");
        Ok(())
    }
}
