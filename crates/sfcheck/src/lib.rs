//! Health check for Element storage clusters, in monitoring-plugin style.
//!
//! A run collects a sample from an [`element::MetricSource`], evaluates it
//! against [`config::CheckConfig`] thresholds, folds every reading into an
//! [`aggregate::AggregateStatus`] and renders a [`report::Report`]. The
//! overall [`severity::Severity`] becomes the process exit code:
//! OK=0, WARNING=1, CRITICAL=2, UNKNOWN=3.

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod activity;
pub mod aggregate;
pub mod config;
pub mod error;
pub mod probe;
pub mod report;
pub mod severity;
pub mod target;
pub mod threshold;

pub use activity::{check_activity, ActivityCheck, ActivityStore};
pub use aggregate::{aggregate, AggregateStatus, CheckResult, Reading};
pub use config::CheckConfig;
pub use error::CheckError;
pub use probe::run;
pub use report::{render_error, OutputFormat, Report};
pub use severity::Severity;
pub use target::{Mode, Target};
pub use threshold::{evaluate, SessionLimits, Thresholds};
