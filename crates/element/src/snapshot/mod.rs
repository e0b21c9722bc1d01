//! Offline metric source backed by a YAML snapshot.
//!
//! Implements the [`MetricSource`](crate::MetricSource) trait from a file,
//! and captures such files from any other source.

mod client;
mod models;

pub use client::SnapshotSource;
pub use models::{NodeSnapshot, Snapshot};
