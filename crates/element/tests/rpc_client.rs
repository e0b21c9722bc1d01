//! Integration tests for the JSON-RPC metric source against a mock endpoint.

use element::{ElementRpc, FailureClass, MetricSource, RpcOptions, SourceError};
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RPC_PATH: &str = "/json-rpc/9.0";

/// "admin:secret" in base64.
const BASIC_AUTH: &str = "Basic YWRtaW46c2VjcmV0";

fn client_for(server: &MockServer) -> ElementRpc {
    let url = Url::parse(&format!("{}{RPC_PATH}", server.uri())).unwrap();
    ElementRpc::new(url, "admin", "secret", RpcOptions::default()).unwrap()
}

async fn mount_result(server: &MockServer, rpc_method: &str, result: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .and(body_partial_json(json!({ "method": rpc_method })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "result": result,
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_cluster_stats_sends_basic_auth() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .and(header("authorization", BASIC_AUTH))
        .and(body_partial_json(json!({"method": "GetClusterStats", "params": {}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "result": {
                "clusterStats": {
                    "readBytes": 1_000,
                    "writeBytes": 2_000,
                    "readOps": 10,
                    "writeOps": 30,
                    "readLatencyUSec": 120,
                    "writeLatencyUSec": 340,
                    "latencyUSec": 250,
                    "averageIOPSize": 4096,
                    "clusterUtilization": 42.5,
                    "timestamp": "2017-12-04T10:00:00Z"
                }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let stats = client_for(&server).cluster_stats().await.unwrap();
    assert_eq!(stats.read_bytes, 1_000);
    assert_eq!(stats.write_bytes, 2_000);
    assert_eq!(stats.total_bytes(), 3_000);
    assert_eq!(stats.average_io_size, 4096);
    assert!((stats.cluster_utilization - 42.5).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_session_and_inventory_counts() {
    let server = MockServer::start().await;
    mount_result(&server, "ListISCSISessions", json!({"sessions": [{}, {}, {}]})).await;
    mount_result(&server, "ListActiveNodes", json!({"nodes": [{}, {}, {}, {}]})).await;
    mount_result(&server, "ListActiveVolumes", json!({"volumes": []})).await;

    let client = client_for(&server);
    assert_eq!(client.iscsi_session_count().await.unwrap(), 3);
    assert_eq!(client.active_node_count().await.unwrap(), 4);
    assert_eq!(client.active_volume_count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_forced_cluster_state() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .and(body_partial_json(
            json!({"method": "GetClusterState", "params": {"force": true}}),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "result": {"nodes": [
                {"nodeID": 1, "result": {"state": "Active", "cluster": "sf-prod"}},
                {"nodeID": 5, "result": {"state": "Available"}}
            ]}
        })))
        .mount(&server)
        .await;

    let states = client_for(&server).node_states().await.unwrap();
    assert_eq!(states.len(), 2);
    assert_eq!(states[0].cluster.as_deref(), Some("sf-prod"));
    assert_eq!(states[1].state.as_deref(), Some("Available"));
    assert_eq!(states[1].cluster, None);
}

#[tokio::test]
async fn test_node_mvip_missing_details() {
    let server = MockServer::start().await;
    mount_result(&server, "TestConnectMvip", json!({"details": {}, "result": "Failed"})).await;

    let mvip = client_for(&server).node_mvip().await.unwrap();
    assert_eq!(mvip, None);
}

#[tokio::test]
async fn test_unauthorized_is_connectivity() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&server)
        .await;

    let err = client_for(&server).cluster_info().await.unwrap_err();
    assert!(matches!(err, SourceError::Unauthorized { status: 401, .. }));
    assert_eq!(err.class(), FailureClass::Connectivity);
}

#[tokio::test]
async fn test_rpc_error_is_protocol() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "error": {"code": 500, "name": "xUnknownAPIMethod", "message": "Unknown method"}
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).cluster_version().await.unwrap_err();
    match &err {
        SourceError::Rpc { method, name, .. } => {
            assert_eq!(method, "GetClusterVersionInfo");
            assert_eq!(name, "xUnknownAPIMethod");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.class(), FailureClass::Protocol);
}

#[tokio::test]
async fn test_missing_result_is_protocol() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1})))
        .mount(&server)
        .await;

    let err = client_for(&server).cluster_stats().await.unwrap_err();
    assert!(matches!(err, SourceError::InvalidResponse { .. }));
    assert_eq!(err.class(), FailureClass::Protocol);
}

#[tokio::test]
async fn test_missing_field_is_protocol() {
    let server = MockServer::start().await;
    mount_result(&server, "GetClusterStats", json!({"clusterStats": {"readBytes": 5}})).await;

    let err = client_for(&server).cluster_stats().await.unwrap_err();
    assert_eq!(err.class(), FailureClass::Protocol);
    assert!(err.to_string().contains("GetClusterStats"));
}

#[tokio::test]
async fn test_server_error_status_is_protocol() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    let err = client_for(&server).drives().await.unwrap_err();
    assert!(matches!(err, SourceError::Http { status: 500, .. }));
    assert_eq!(err.class(), FailureClass::Protocol);
}

#[tokio::test]
async fn test_unreachable_endpoint_is_connectivity() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let url = Url::parse(&format!("http://127.0.0.1:{port}{RPC_PATH}")).unwrap();
    let options = RpcOptions {
        timeout_secs: 5,
        ..RpcOptions::default()
    };
    let client = ElementRpc::new(url, "admin", "secret", options).unwrap();

    let err = client.cluster_info().await.unwrap_err();
    assert!(matches!(err, SourceError::Transport { .. }));
    assert_eq!(err.class(), FailureClass::Connectivity);
}
