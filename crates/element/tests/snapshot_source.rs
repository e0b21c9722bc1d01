//! Tests for the snapshot-backed metric source.

use element::{FailureClass, MetricSource, NodeClusterState, NodeSnapshot, Snapshot, SnapshotSource, SourceError};

const CLUSTER_YAML: &str = r"
cluster_info:
  name: sf-lab
  mvip: 10.0.0.10
  mvip_node_id: 1
  svip: 10.0.1.10
  svip_node_id: 1
  encryption_at_rest_state: disabled
  rep_count: 2
  unique_id: x1y2
  ensemble: [10.0.2.1, 10.0.2.2, 10.0.2.3]
version:
  cluster_version: 10.1.0.83
  api_version: '10.1'
stats:
  read_bytes: 500
  write_bytes: 700
  read_ops: 5
  write_ops: 7
  read_latency_usec: 100
  write_latency_usec: 200
  latency_usec: 150
  average_io_size: 4096
  cluster_utilization: 85.0
iscsi_sessions: 950
drives:
  - {drive_id: 1, node_id: 1, drive_type: block, status: active}
  - {drive_id: 2, node_id: 1, drive_type: volume, status: failed}
";

fn write_snapshot(text: &str) -> tempfile::NamedTempFile {
    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(file.path(), text).unwrap();
    file
}

#[tokio::test]
async fn test_reads_sections() {
    let file = write_snapshot(CLUSTER_YAML);
    let source = SnapshotSource::open(file.path()).await.unwrap();

    let info = source.cluster_info().await.unwrap();
    assert_eq!(info.name, "sf-lab");
    assert_eq!(info.ensemble.len(), 3);

    assert_eq!(source.iscsi_session_count().await.unwrap(), 950);
    assert_eq!(source.cluster_version().await.unwrap().api_version, "10.1");
    assert_eq!(source.drives().await.unwrap()[1].status, "failed");
    assert_eq!(source.cluster_stats().await.unwrap().total_bytes(), 1_200);
}

#[tokio::test]
async fn test_missing_section_is_protocol() {
    let file = write_snapshot(CLUSTER_YAML);
    let source = SnapshotSource::open(file.path()).await.unwrap();

    let err = source.active_volume_count().await.unwrap_err();
    assert!(matches!(
        err,
        SourceError::SnapshotMissing {
            section: "active_volumes",
            ..
        }
    ));
    assert_eq!(err.class(), FailureClass::Protocol);

    let err = source.node_cluster_state().await.unwrap_err();
    assert!(matches!(err, SourceError::SnapshotMissing { section: "node", .. }));
}

#[tokio::test]
async fn test_missing_file_is_connectivity() {
    let dir = tempfile::tempdir().unwrap();
    let err = SnapshotSource::open(dir.path().join("absent.yaml"))
        .await
        .unwrap_err();
    assert_eq!(err.class(), FailureClass::Connectivity);
}

#[tokio::test]
async fn test_malformed_file_is_protocol() {
    let file = write_snapshot("stats: [not, a, map]\n");
    let err = SnapshotSource::open(file.path()).await.unwrap_err();
    assert!(matches!(err, SourceError::SnapshotFormat { .. }));
    assert_eq!(err.class(), FailureClass::Protocol);
}

#[tokio::test]
async fn test_capture_and_save() {
    let file = write_snapshot(CLUSTER_YAML);
    let mut snapshot = SnapshotSource::open(file.path())
        .await
        .unwrap()
        .snapshot()
        .clone();
    snapshot.node_states = Some(vec![]);
    snapshot.active_nodes = Some(3);
    snapshot.active_volumes = Some(12);

    let live = SnapshotSource::from_snapshot("memory", snapshot);
    let captured = Snapshot::capture_cluster(&live).await.unwrap();
    assert_eq!(captured.active_volumes, Some(12));
    assert!(captured.node.is_none());

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("nested").join("capture.yaml");
    captured.save(&out).unwrap();

    let reopened = SnapshotSource::open(&out).await.unwrap();
    assert_eq!(reopened.snapshot(), &captured);
}

#[tokio::test]
async fn test_capture_node_skips_mvip_when_inactive() {
    let snapshot = Snapshot {
        node: Some(NodeSnapshot {
            cluster_state: NodeClusterState {
                state: "Available".into(),
                cluster: None,
            },
            mvip: Some("10.0.0.10".into()),
        }),
        ..Snapshot::default()
    };
    let live = SnapshotSource::from_snapshot("memory", snapshot);

    let captured = Snapshot::capture_node(&live).await.unwrap();
    let node = captured.node.unwrap();
    assert_eq!(node.cluster_state.state, "Available");
    assert_eq!(node.mvip, None);
}
