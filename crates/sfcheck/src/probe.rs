//! Collection and evaluation.
//!
//! A run first collects a complete sample from the metric source. Any source
//! failure aborts the run before a single reading is produced, so a report
//! never mixes live values with missing ones. The sample is then turned into
//! ordered readings and aggregated.

use std::collections::BTreeMap;

use element::{
    ClusterInfo, ClusterStats, ClusterVersion, Drive, MetricSource, NodeClusterState, NodeState,
};
use tracing::{debug, info};

use crate::activity::ActivityStore;
use crate::aggregate::{aggregate, Reading};
use crate::config::CheckConfig;
use crate::error::CheckError;
use crate::report::Report;
use crate::severity::Severity;
use crate::target::{Mode, Target};

/// Node state that means "serving in a cluster".
const ACTIVE: &str = "Active";

/// Everything a cluster-mode run looks at.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterSample {
    pub info: ClusterInfo,
    pub version: ClusterVersion,
    pub stats: ClusterStats,
    pub sessions: u64,
    pub drives: Vec<Drive>,
    pub nodes: Vec<NodeState>,
    pub active_nodes: u64,
    pub active_volumes: u64,
}

impl ClusterSample {
    /// Query every cluster-scoped operation, stopping at the first failure.
    pub async fn collect(source: &dyn MetricSource) -> Result<Self, CheckError> {
        debug!(source = source.name(), "Collecting cluster sample");
        Ok(Self {
            stats: source.cluster_stats().await?,
            sessions: source.iscsi_session_count().await?,
            info: source.cluster_info().await?,
            version: source.cluster_version().await?,
            drives: source.drives().await?,
            nodes: source.node_states().await?,
            active_nodes: source.active_node_count().await?,
            active_volumes: source.active_volume_count().await?,
        })
    }
}

/// Everything a node-mode run looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSample {
    pub state: NodeClusterState,
    /// Only asked for when the node is active.
    pub mvip: Option<String>,
}

impl NodeSample {
    /// Query the node endpoint, stopping at the first failure.
    pub async fn collect(source: &dyn MetricSource) -> Result<Self, CheckError> {
        debug!(source = source.name(), "Collecting node sample");
        let state = source.node_cluster_state().await?;
        let mvip = if state.state == ACTIVE {
            source.node_mvip().await?
        } else {
            None
        };
        Ok(Self { state, mvip })
    }
}

/// Run the check for `target` against `source`.
pub async fn run(
    source: &dyn MetricSource,
    target: &Target,
    config: &CheckConfig,
) -> Result<Report, CheckError> {
    let readings = match target.mode {
        Mode::Cluster => {
            let sample = ClusterSample::collect(source).await?;
            let store = config
                .checks
                .disk_activity
                .then(|| ActivityStore::new(&config.state_dir));
            cluster_readings(&target.host, &sample, config, store.as_ref())?
        }
        Mode::Node => {
            let sample = NodeSample::collect(source).await?;
            node_readings(&target.host, &sample)
        }
    };

    let status = aggregate(readings);
    info!(
        host = %target.host,
        mode = %target.mode,
        severity = %status.severity,
        results = status.results.len(),
        "Check complete"
    );
    Ok(Report::new(target.mode, status))
}

/// Build the cluster-mode readings in display order.
///
/// The disk activity baseline is keyed by the cluster MVIP so the same
/// cluster reached by name or by address shares one baseline.
pub fn cluster_readings(
    host: &str,
    sample: &ClusterSample,
    config: &CheckConfig,
    activity: Option<&ActivityStore>,
) -> Result<Vec<Reading>, CheckError> {
    let stats = &sample.stats;
    let info = &sample.info;

    let disk_activity = match activity {
        Some(store) => {
            let identity = if info.mvip.is_empty() { host } else { info.mvip.as_str() };
            let check = store.track(identity, &stats.total_bytes().to_string())?;
            Reading::checked("Disk Activity", check.label, check.severity)
        }
        None => Reading::info("Disk Activity", "n/a"),
    };

    let utilization = format_number(stats.cluster_utilization);
    let utilization = if config.checks.utilization {
        let severity = config.utilization.evaluate(stats.cluster_utilization);
        Reading::checked("Utilization %", utilization, severity)
    } else {
        Reading::info("Utilization %", utilization)
    };

    let sessions = if config.checks.sessions {
        let severity = config
            .sessions
            .thresholds(info.ensemble.len())
            .evaluate(sample.sessions as f64);
        Reading::checked("iSCSI Sessions", sample.sessions.to_string(), severity)
    } else {
        Reading::info("iSCSI Sessions", sample.sessions.to_string())
    };

    let mut readings = vec![
        Reading::info("Cluster", host).in_summary(),
        Reading::info("Version", &sample.version.cluster_version).in_summary(),
        disk_activity.in_summary(),
        Reading::info("Read Bytes", stats.read_bytes.to_string()).in_summary(),
        Reading::info("Write Bytes", stats.write_bytes.to_string()).in_summary(),
        utilization.in_summary(),
        sessions.in_summary(),
        Reading::info("Cluster Name", &info.name).in_summary(),
        Reading::info("Ensemble Members", info.ensemble.join(" ")).in_summary(),
        Reading::info("MVIP", &info.mvip),
        Reading::info("SVIP", &info.svip),
        Reading::info("Helix Protection", helix(info.rep_count)),
        Reading::info("Encryption", &info.encryption_at_rest_state),
        Reading::info("Active Nodes", sample.active_nodes.to_string()),
        Reading::info("Active Volumes", sample.active_volumes.to_string()),
    ];

    for node in &sample.nodes {
        readings.push(Reading::info(format!("Node {}", node.node_id), node_state(node)));
    }
    for (node_id, summary) in drive_summary(&sample.drives) {
        readings.push(Reading::info(format!("Node {node_id} Drives"), summary));
    }

    readings.extend([
        Reading::info("Total Bytes", stats.total_bytes().to_string()),
        Reading::info("Percent Read Bytes", percent(stats.read_bytes, stats.total_bytes())),
        Reading::info("Percent Write Bytes", percent(stats.write_bytes, stats.total_bytes())),
        Reading::info("Read Ops", stats.read_ops.to_string()),
        Reading::info("Write Ops", stats.write_ops.to_string()),
        Reading::info("Total Ops", stats.total_ops().to_string()),
        Reading::info("Percent Read Ops", percent(stats.read_ops, stats.total_ops())),
        Reading::info("Percent Write Ops", percent(stats.write_ops, stats.total_ops())),
        Reading::info("Read Latency", stats.read_latency_usec.to_string()),
        Reading::info("Write Latency", stats.write_latency_usec.to_string()),
        Reading::info("Cluster Latency", stats.latency_usec.to_string()),
        Reading::info("Average IO Size", stats.average_io_size.to_string()),
    ]);

    Ok(readings)
}

/// Build the node-mode readings in display order.
pub fn node_readings(host: &str, sample: &NodeSample) -> Vec<Reading> {
    let state = &sample.state;

    if state.state != ACTIVE {
        return vec![
            Reading::info("Node", host).in_summary(),
            Reading::checked("Node Status", &state.state, Severity::Unknown).in_summary(),
            Reading::info("Cluster Name", "n/a").in_summary(),
            Reading::info("MVIP", "n/a").in_summary(),
        ];
    }

    let cluster = state.cluster.as_deref().unwrap_or("n/a");
    let mvip = match &sample.mvip {
        Some(mvip) => Reading::info("MVIP", mvip),
        None => Reading::checked("MVIP", "n/a Not in Cluster", Severity::Warning),
    };

    vec![
        Reading::info("Node", host).in_summary(),
        Reading::info("Node Status", &state.state).in_summary(),
        Reading::info("Cluster Name", cluster).in_summary(),
        mvip.in_summary(),
    ]
}

fn helix(rep_count: u32) -> String {
    match rep_count {
        2 => "double".to_string(),
        n => format!("unknown (rep count {n})"),
    }
}

fn node_state(node: &NodeState) -> String {
    match (&node.state, &node.cluster) {
        (Some(state), Some(cluster)) => format!("{state} ({cluster})"),
        (Some(state), None) => state.clone(),
        (None, _) => "not in cluster".to_string(),
    }
}

/// Per node, drive counts by `type status`, nodes and keys in order.
fn drive_summary(drives: &[Drive]) -> BTreeMap<u64, String> {
    let mut counts: BTreeMap<u64, BTreeMap<String, usize>> = BTreeMap::new();
    for drive in drives {
        *counts
            .entry(drive.node_id)
            .or_default()
            .entry(format!("{} {}", drive.drive_type, drive.status))
            .or_default() += 1;
    }

    counts
        .into_iter()
        .map(|(node_id, kinds)| {
            let summary = kinds
                .into_iter()
                .map(|(kind, count)| format!("{kind}: {count}"))
                .collect::<Vec<_>>()
                .join(", ");
            (node_id, summary)
        })
        .collect()
}

/// `part` as a percentage of `total`, two decimals; `n/a` when total is zero.
fn percent(part: u64, total: u64) -> String {
    if total == 0 {
        return "n/a".to_string();
    }
    format!("{:.2}", part as f64 / total as f64 * 100.0)
}

/// Whole numbers print without a fraction.
fn format_number(value: f64) -> String {
    format!("{value}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent() {
        assert_eq!(percent(1, 4), "25.00");
        assert_eq!(percent(2, 3), "66.67");
        assert_eq!(percent(0, 0), "n/a");
    }

    #[test]
    fn test_helix() {
        assert_eq!(helix(2), "double");
        assert_eq!(helix(3), "unknown (rep count 3)");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(85.0), "85");
        assert_eq!(format_number(0.5), "0.5");
    }

    #[test]
    fn test_node_state() {
        let node = NodeState {
            node_id: 1,
            state: Some("Active".into()),
            cluster: Some("sf-lab".into()),
        };
        assert_eq!(node_state(&node), "Active (sf-lab)");

        let node = NodeState {
            node_id: 2,
            state: None,
            cluster: None,
        };
        assert_eq!(node_state(&node), "not in cluster");
    }

    #[test]
    fn test_drive_summary() {
        let drive = |drive_id, node_id, drive_type: &str, status: &str| Drive {
            drive_id,
            node_id,
            drive_type: drive_type.into(),
            status: status.into(),
        };
        let drives = [
            drive(1, 2, "block", "active"),
            drive(2, 1, "volume", "active"),
            drive(3, 1, "block", "active"),
            drive(4, 1, "block", "active"),
            drive(5, 1, "block", "failed"),
        ];

        let summary: Vec<_> = drive_summary(&drives).into_iter().collect();
        assert_eq!(
            summary,
            [
                (1, "block active: 2, block failed: 1, volume active: 1".to_string()),
                (2, "block active: 1".to_string()),
            ]
        );
    }

    #[test]
    fn test_inactive_node() {
        let sample = NodeSample {
            state: NodeClusterState {
                state: "Available".into(),
                cluster: None,
            },
            mvip: None,
        };
        let status = aggregate(node_readings("10.0.3.1", &sample));
        assert_eq!(status.severity, Severity::Unknown);
        assert_eq!(status.get("Node Status").unwrap().display, "Available*");
        assert_eq!(status.get("MVIP").unwrap().display, "n/a");
    }

    #[test]
    fn test_active_node_without_mvip() {
        let sample = NodeSample {
            state: NodeClusterState {
                state: "Active".into(),
                cluster: Some("sf-lab".into()),
            },
            mvip: None,
        };
        let status = aggregate(node_readings("10.0.3.1", &sample));
        assert_eq!(status.severity, Severity::Warning);
        assert_eq!(status.get("MVIP").unwrap().display, "n/a Not in Cluster*");
        assert_eq!(status.get("Cluster Name").unwrap().display, "sf-lab");
    }
}
