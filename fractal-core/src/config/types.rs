//! Runtime configuration structures.
//!
//! Grounded on `bog-core/src/config/types.rs`'s `#[serde(default = "fn")]`
//! pattern: every field the operator is likely to leave alone gets a
//! default function instead of requiring the TOML/env source to set it.
//! The teacher's `HuginnConfig`/`LighterConfig`/`AlertRulesConfig` have no
//! counterpart here (Huginn market data and live Lighter execution are out
//! of scope per `spec.md` Non-goals); `RiskConfig`/`MetricsConfig` are kept
//! and re-themed.

use serde::{Deserialize, Serialize};

/// Top-level pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub ingest: IngestConfig,
    pub windows: WindowConfig,
    pub risk: RiskConfig,
    pub execution: ExecutionConfig,
    pub metrics: MetricsConfig,
    pub monitoring: MonitoringConfig,
}

/// Tick source configuration. `kafka_servers` is accepted for forward
/// compatibility with a real market-data feed but is otherwise unused —
/// this pipeline drives its synthetic generator instead (`spec.md` Non-goals
/// excludes live market-data ingestion).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    #[serde(default = "default_kafka_servers")]
    pub kafka_servers: String,

    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,
}

/// Rolling-window sizes to maintain per symbol (`spec.md` §2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_window_sizes")]
    pub sizes: Vec<usize>,
}

/// Risk-gate thresholds (`spec.md` §5), mirroring `risk::RiskLimits`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    #[serde(default = "default_initial_capital")]
    pub initial_capital: f64,

    #[serde(default = "default_per_position_fraction")]
    pub per_position_fraction: f64,

    #[serde(default = "default_aggregate_exposure_fraction")]
    pub aggregate_exposure_fraction: f64,

    #[serde(default = "default_capital_adequacy_fraction")]
    pub capital_adequacy_fraction: f64,

    /// Risk score above which a pattern is counted as an anomaly
    /// (`spec.md` §9 supplement, from `real_time_fractal_consumer.py`'s
    /// `anomaly_threshold`).
    #[serde(default = "default_anomaly_threshold")]
    pub anomaly_threshold: f64,
}

/// Execution worker pool configuration (`spec.md` §4.7/§5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    #[serde(default = "default_worker_pool_size")]
    pub worker_pool_size: usize,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub json_logs: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { log_level: default_log_level(), json_logs: false }
    }
}

/// Prometheus HTTP server configuration (`spec.md` §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    #[serde(default = "default_metrics_addr")]
    pub metrics_addr: String,

    #[serde(default = "default_metrics_path")]
    pub metrics_path: String,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self { metrics_addr: default_metrics_addr(), metrics_path: default_metrics_path() }
    }
}

fn default_kafka_servers() -> String {
    "localhost:9092".to_string()
}

fn default_symbols() -> Vec<String> {
    vec!["EURUSD".to_string(), "GBPUSD".to_string(), "USDJPY".to_string()]
}

fn default_window_sizes() -> Vec<usize> {
    crate::window::WINDOW_SIZES.to_vec()
}

fn default_initial_capital() -> f64 {
    1_000_000.0
}

fn default_per_position_fraction() -> f64 {
    0.05
}

fn default_aggregate_exposure_fraction() -> f64 {
    0.80
}

fn default_capital_adequacy_fraction() -> f64 {
    0.95
}

fn default_anomaly_threshold() -> f64 {
    2.0
}

fn default_worker_pool_size() -> usize {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_metrics_addr() -> String {
    "127.0.0.1:9090".to_string()
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}
