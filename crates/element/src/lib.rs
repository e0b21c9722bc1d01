//! Read-only access to Element (SolidFire) storage clusters.
//!
//! This crate provides the data side of the `sfcheck` health probe: a
//! [`MetricSource`] trait describing the handful of cluster and node queries
//! the probe needs, and two interchangeable implementations of it.
//!
//! - [`ElementRpc`] speaks JSON-RPC over HTTPS to a cluster MVIP or to a
//!   single node's management address.
//! - [`SnapshotSource`] replays a YAML snapshot previously captured from a
//!   live cluster, which is handy for offline runs and tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use element::{ElementRpc, MetricSource, RpcOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), element::SourceError> {
//!     let endpoint = ElementRpc::endpoint("10.0.0.10", 443, "9.0")?;
//!     let source = ElementRpc::new(endpoint, "admin", "secret", RpcOptions::default())?;
//!
//!     let stats = source.cluster_stats().await?;
//!     println!("utilization: {}%", stats.cluster_utilization);
//!     Ok(())
//! }
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod rpc;
pub mod snapshot;
mod source;

pub use error::{FailureClass, SourceError};
pub use rpc::{ElementRpc, RpcOptions};
pub use snapshot::{NodeSnapshot, Snapshot, SnapshotSource};
pub use source::{
    ClusterInfo, ClusterStats, ClusterVersion, Drive, MetricSource, NodeClusterState, NodeState,
};
