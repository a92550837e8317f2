//! Runtime configuration (`spec.md` §6 ambient config).
//!
//! Grounded on `bog-core/src/config/mod.rs`'s `Config::validate()` using
//! `anyhow::bail!` for each invariant. The teacher additionally carries a
//! compile-time feature-flag configuration tier (`constants`, `profiles`)
//! for hot-path strategy/risk constants with zero runtime overhead; this
//! pipeline has no const-generic hot path to protect, so every setting here
//! is plain runtime TOML/env configuration, loaded once at startup.

pub mod types;

pub use types::*;

use anyhow::Result;
use std::path::Path;

impl Config {
    /// Load configuration from a TOML file, falling back to defaults for
    /// any field the file omits.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `./config/default.toml`.
    pub fn load_default() -> Result<Self> {
        Self::load("config/default.toml")
    }

    pub fn validate(&self) -> Result<()> {
        if self.windows.sizes.is_empty() {
            anyhow::bail!("windows.sizes must not be empty");
        }
        if self.windows.sizes.iter().any(|&n| n < 10) {
            anyhow::bail!("windows.sizes entries must be >= 10 (fractal_dimension needs N >= 10)");
        }

        if self.risk.initial_capital <= 0.0 {
            anyhow::bail!("risk.initial_capital must be positive");
        }
        if !(0.0..=1.0).contains(&self.risk.per_position_fraction) {
            anyhow::bail!("risk.per_position_fraction must be in [0.0, 1.0]");
        }
        if !(0.0..=1.0).contains(&self.risk.aggregate_exposure_fraction) {
            anyhow::bail!("risk.aggregate_exposure_fraction must be in [0.0, 1.0]");
        }
        if !(0.0..=1.0).contains(&self.risk.capital_adequacy_fraction) {
            anyhow::bail!("risk.capital_adequacy_fraction must be in [0.0, 1.0]");
        }
        if self.risk.anomaly_threshold < 0.0 {
            anyhow::bail!("risk.anomaly_threshold must be non-negative");
        }

        if self.execution.worker_pool_size == 0 {
            anyhow::bail!("execution.worker_pool_size must be at least 1");
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.metrics.log_level.as_str()) {
            anyhow::bail!("invalid log level '{}', must be one of: {:?}", self.metrics.log_level, valid_log_levels);
        }

        if self.monitoring.metrics_addr.parse::<std::net::SocketAddr>().is_err() {
            anyhow::bail!("monitoring.metrics_addr '{}' is not a valid socket address", self.monitoring.metrics_addr);
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ingest: IngestConfig { kafka_servers: "localhost:9092".to_string(), symbols: default_symbols() },
            windows: WindowConfig { sizes: crate::window::WINDOW_SIZES.to_vec() },
            risk: RiskConfig {
                initial_capital: 1_000_000.0,
                per_position_fraction: 0.05,
                aggregate_exposure_fraction: 0.80,
                capital_adequacy_fraction: 0.95,
                anomaly_threshold: 2.0,
            },
            execution: ExecutionConfig { worker_pool_size: 10 },
            metrics: MetricsConfig::default(),
            monitoring: MonitoringConfig::default(),
        }
    }
}

fn default_symbols() -> Vec<String> {
    vec!["EURUSD".to_string(), "GBPUSD".to_string(), "USDJPY".to_string()]
}

impl From<&RiskConfig> for crate::risk::RiskLimits {
    fn from(cfg: &RiskConfig) -> Self {
        crate::risk::RiskLimits {
            per_position_fraction: cfg.per_position_fraction,
            aggregate_exposure_fraction: cfg.aggregate_exposure_fraction,
            capital_adequacy_fraction: cfg.capital_adequacy_fraction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn empty_window_sizes_rejected() {
        let mut config = Config::default();
        config.windows.sizes.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn out_of_range_fraction_rejected() {
        let mut config = Config::default();
        config.risk.per_position_fraction = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn invalid_log_level_rejected() {
        let mut config = Config::default();
        config.metrics.log_level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn risk_config_converts_to_risk_limits() {
        let config = Config::default();
        let limits = crate::risk::RiskLimits::from(&config.risk);
        assert_eq!(limits.per_position_fraction, config.risk.per_position_fraction);
    }
}
