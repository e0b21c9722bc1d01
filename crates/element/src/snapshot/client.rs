//! Snapshot-backed metric source.
//!
//! Answers every query from a YAML document captured earlier with
//! `sfcheck --record`, so checks can run without a reachable cluster.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use super::models::{NodeSnapshot, Snapshot};
use crate::error::SourceError;
use crate::source::{
    ClusterInfo, ClusterStats, ClusterVersion, Drive, MetricSource, NodeClusterState, NodeState,
};

/// Metric source reading from a snapshot file.
#[derive(Debug, Clone)]
pub struct SnapshotSource {
    /// Snapshot file the data came from.
    path: PathBuf,
    /// Parsed snapshot.
    snapshot: Snapshot,
}

impl SnapshotSource {
    /// Load a snapshot file.
    ///
    /// # Errors
    /// Returns [`SourceError::SnapshotIo`] if the file cannot be read and
    /// [`SourceError::SnapshotFormat`] if it is not a snapshot document.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref().to_path_buf();
        let text = fs::read_to_string(&path)
            .await
            .map_err(|source| SourceError::SnapshotIo {
                path: path.clone(),
                source,
            })?;

        let snapshot = Snapshot::from_yaml(&path, &text)?;
        debug!(path = %path.display(), "Snapshot loaded");

        Ok(Self { path, snapshot })
    }

    /// Wrap an in-memory snapshot.
    #[must_use]
    pub fn from_snapshot(path: impl Into<PathBuf>, snapshot: Snapshot) -> Self {
        Self {
            path: path.into(),
            snapshot,
        }
    }

    /// The loaded snapshot.
    #[must_use]
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    fn section<T: Clone>(&self, value: Option<&T>, section: &'static str) -> Result<T, SourceError> {
        value.cloned().ok_or_else(|| SourceError::SnapshotMissing {
            path: self.path.clone(),
            section,
        })
    }

    fn node(&self) -> Result<&NodeSnapshot, SourceError> {
        self.snapshot
            .node
            .as_ref()
            .ok_or_else(|| SourceError::SnapshotMissing {
                path: self.path.clone(),
                section: "node",
            })
    }
}

#[async_trait]
impl MetricSource for SnapshotSource {
    fn name(&self) -> &'static str {
        "snapshot"
    }

    async fn cluster_info(&self) -> Result<ClusterInfo, SourceError> {
        self.section(self.snapshot.cluster_info.as_ref(), "cluster_info")
    }

    async fn cluster_version(&self) -> Result<ClusterVersion, SourceError> {
        self.section(self.snapshot.version.as_ref(), "version")
    }

    async fn cluster_stats(&self) -> Result<ClusterStats, SourceError> {
        self.section(self.snapshot.stats.as_ref(), "stats")
    }

    async fn iscsi_session_count(&self) -> Result<u64, SourceError> {
        self.section(self.snapshot.iscsi_sessions.as_ref(), "iscsi_sessions")
    }

    async fn drives(&self) -> Result<Vec<Drive>, SourceError> {
        self.section(self.snapshot.drives.as_ref(), "drives")
    }

    async fn node_states(&self) -> Result<Vec<NodeState>, SourceError> {
        self.section(self.snapshot.node_states.as_ref(), "node_states")
    }

    async fn active_node_count(&self) -> Result<u64, SourceError> {
        self.section(self.snapshot.active_nodes.as_ref(), "active_nodes")
    }

    async fn active_volume_count(&self) -> Result<u64, SourceError> {
        self.section(self.snapshot.active_volumes.as_ref(), "active_volumes")
    }

    async fn node_cluster_state(&self) -> Result<NodeClusterState, SourceError> {
        Ok(self.node()?.cluster_state.clone())
    }

    async fn node_mvip(&self) -> Result<Option<String>, SourceError> {
        Ok(self.node()?.mvip.clone())
    }
}
