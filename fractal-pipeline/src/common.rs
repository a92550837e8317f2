//! Shared CLI parsing and setup code for the pipeline binary.
//!
//! Grounded on `bog-bins/src/common.rs`'s `CommonArgs` + `init_logging`
//! shape; CPU-pinning/real-time-priority setup has no counterpart (this
//! pipeline has no const-generic hot path to pin).

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// CLI arguments for the fractal pattern pipeline (`spec.md` §6 ambient config).
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct CommonArgs {
    /// Comma-separated symbols to stream ticks for.
    #[arg(long, value_delimiter = ',', default_value = "EURUSD,GBPUSD,USDJPY")]
    pub symbols: Vec<String>,

    /// Kafka bootstrap servers. Accepted for forward compatibility with a
    /// real market-data feed; this pipeline drives its own synthetic
    /// generator regardless of this value (`spec.md` Non-goals).
    #[arg(long, default_value = "localhost:9092")]
    pub kafka_servers: String,

    /// Starting cash for the simulated portfolio.
    #[arg(long, default_value_t = 1_000_000.0)]
    pub initial_capital: f64,

    /// Number of execution worker tasks to run concurrently.
    #[arg(long, default_value_t = 10)]
    pub worker_pool_size: usize,

    /// Address the Prometheus metrics server binds to.
    #[arg(long, default_value = "127.0.0.1:9090")]
    pub metrics_addr: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON instead of human-readable text.
    #[arg(long)]
    pub json_logs: bool,
}

/// Initialize `tracing` with an `EnvFilter`, optionally as JSON.
pub fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().with_target(false)).init();
    }

    Ok(())
}

/// Log a periodic throughput/portfolio snapshot (`spec.md` §6 supplement,
/// grounded on `real_time_fractal_consumer.py`'s periodic stats print).
pub fn log_stats(ticks_processed: u64, patterns_detected: u64, signals_emitted: u64, portfolio_value: f64) {
    tracing::info!(
        ticks_processed,
        patterns_detected,
        signals_emitted,
        portfolio_value,
        "pipeline stats"
    );
}
