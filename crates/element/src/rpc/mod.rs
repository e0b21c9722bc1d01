//! Element JSON-RPC metric source.
//!
//! Implements the [`MetricSource`](crate::MetricSource) trait over the
//! Element management API (`/json-rpc/<version>`).

mod client;
pub mod models;

pub use client::{ElementRpc, RpcOptions, DEFAULT_API_VERSION, DEFAULT_PORT};
