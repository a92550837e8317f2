//! Monitoring and observability (`spec.md` §6).
//!
//! Grounded on `bog-core/src/monitoring/metrics.rs` and
//! `bog-core/src/monitoring/server.rs`. `alert_rules`/`alerts` are
//! Huginn/position-limit-specific teacher modules with no counterpart here
//! and are not carried forward.

pub mod metrics;
pub mod server;

pub use metrics::{MetricsRegistry, PipelineMetrics};
pub use server::{MetricsServer, MetricsServerConfig};
