//! Fractal pattern pipeline binary: streams synthetic ticks, detects
//! patterns, derives signals, and executes qualifying ones against a
//! simulated portfolio (`spec.md` §1-§6).
//!
//! Grounded on `bog-bins`'s single-binary-owns-the-loop shape
//! (`CommonArgs::parse` -> `init_logging` -> build engine -> run ->
//! `print_stats`), generalized to an async multi-stage pipeline with a
//! spawned metrics server and a priority-queued worker pool.

mod common;
mod generator;

use anyhow::Result;
use clap::Parser;
use common::{init_logging, log_stats, CommonArgs};
use dashmap::DashMap;
use fractal_core::prelude::*;
use generator::{now_us, TickGenerator};
use parking_lot::Mutex as PLMutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    let args = CommonArgs::parse();
    init_logging(&args.log_level, args.json_logs)?;

    tracing::info!(symbols = ?args.symbols, kafka_servers = %args.kafka_servers, "starting fractal pattern pipeline");

    let shutdown = ShutdownSignal::new();
    {
        let shutdown = shutdown.clone();
        ctrlc::set_handler(move || {
            tracing::info!("shutdown signal received");
            shutdown.shutdown();
        })?;
    }

    let metrics_registry = Arc::new(MetricsRegistry::new()?);
    let pipeline_metrics = metrics_registry.pipeline();

    let metrics_addr = args.metrics_addr.parse()?;
    let server = MetricsServer::new(MetricsServerConfig { listen_addr: metrics_addr, ..Default::default() }, metrics_registry.clone());
    let metrics_task = tokio::spawn(async move {
        if let Err(e) = server.serve().await {
            tracing::error!(error = %e, "metrics server exited with error");
        }
    });

    let portfolio = Arc::new(PLMutex::new(Portfolio::new(args.initial_capital)));
    let last_price: Arc<DashMap<String, f64>> = Arc::new(DashMap::new());
    let risk_gate = RiskGate::new(RiskLimits::default());

    let execution_engine = Arc::new(ExecutionEngine::new(
        portfolio.clone(),
        last_price.clone(),
        risk_gate,
        Box::new(NormalSlippage::new()),
        pipeline_metrics.clone(),
    ));

    let mut worker_handles = Vec::with_capacity(args.worker_pool_size);
    for _ in 0..args.worker_pool_size {
        let engine = execution_engine.clone();
        let shutdown = shutdown.clone();
        worker_handles.push(tokio::spawn(async move {
            engine.run_worker(shutdown).await;
        }));
    }

    let ticks_processed = Arc::new(AtomicU64::new(0));
    let patterns_detected = Arc::new(AtomicU64::new(0));
    let signals_emitted = Arc::new(AtomicU64::new(0));

    let ingest_task = {
        let symbols = args.symbols.clone();
        let shutdown = shutdown.clone();
        let last_price = last_price.clone();
        let execution_engine = execution_engine.clone();
        let metrics = pipeline_metrics.clone();
        let ticks_processed = ticks_processed.clone();
        let patterns_detected = patterns_detected.clone();
        let signals_emitted = signals_emitted.clone();
        let anomaly_threshold = 2.0;

        tokio::spawn(async move {
            let mut window_store = WindowStore::with_default_sizes();
            let mut processor = SignalProcessor::new();
            let mut rng = rand::thread_rng();
            let start = now_us();

            let mut generators: Vec<TickGenerator> = symbols
                .iter()
                .enumerate()
                .map(|(i, symbol)| TickGenerator::new(symbol, 1.0 + i as f32 * 0.3, start))
                .collect();

            loop {
                if shutdown.is_shutting_down() {
                    break;
                }

                for generator in generators.iter_mut() {
                    let tick = generator.next_tick(&mut rng);
                    if tick.validate().is_err() {
                        metrics.execution_errors.inc();
                        continue;
                    }

                    ticks_processed.fetch_add(1, Ordering::Relaxed);
                    last_price.insert(tick.symbol.clone(), tick.price as f64);

                    let snapshots = window_store.accept(
                        &tick.symbol,
                        tick.timestamp_us,
                        tick.price as f64,
                        tick.volatility as f64,
                    );

                    for snapshot in snapshots {
                        let pattern = Pattern::detect(&tick.symbol, &snapshot);
                        patterns_detected.fetch_add(1, Ordering::Relaxed);
                        metrics.patterns_detected.inc();

                        if pattern.risk_score > anomaly_threshold {
                            metrics.anomaly_alerts.inc();
                            tracing::warn!(symbol = %tick.symbol, risk_score = pattern.risk_score, "anomalous pattern risk score");
                        }

                        if let Some(signal) = processor.process(pattern) {
                            signals_emitted.fetch_add(1, Ordering::Relaxed);
                            metrics.fractal_signals.inc();
                            let order = Order::from_signal(&signal, now_us());
                            execution_engine.submit(order);
                        }
                    }
                }

                tokio::time::sleep(Duration::from_micros(100)).await;
            }
        })
    };

    let stats_task = {
        let shutdown = shutdown.clone();
        let portfolio = portfolio.clone();
        let metrics = pipeline_metrics.clone();
        let ticks_processed = ticks_processed.clone();
        let patterns_detected = patterns_detected.clone();
        let signals_emitted = signals_emitted.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(Duration::from_secs(5)) => {}
                    _ = shutdown.notified() => break,
                }
                if shutdown.is_shutting_down() {
                    break;
                }
                let value = portfolio.lock().portfolio_value();
                metrics.portfolio_value.set(value);
                let exposure = portfolio.lock().aggregate_exposure();
                metrics.risk_exposure_fraction.set(exposure / value.max(1.0));
                log_stats(
                    ticks_processed.load(Ordering::Relaxed),
                    patterns_detected.load(Ordering::Relaxed),
                    signals_emitted.load(Ordering::Relaxed),
                    value,
                );
            }
        })
    };

    while !shutdown.is_shutting_down() {
        tokio::select! {
            _ = shutdown.notified() => {}
            _ = tokio::time::sleep(Duration::from_millis(200)) => {}
        }
    }
    ingest_task.abort();
    stats_task.abort();
    for handle in worker_handles {
        let _ = handle.await;
    }
    metrics_task.abort();

    let final_value = portfolio.lock().portfolio_value();
    tracing::info!(
        ticks_processed = ticks_processed.load(Ordering::Relaxed),
        patterns_detected = patterns_detected.load(Ordering::Relaxed),
        signals_emitted = signals_emitted.load(Ordering::Relaxed),
        final_portfolio_value = final_value,
        total_trades = portfolio.lock().total_trades(),
        "pipeline shut down"
    );

    Ok(())
}
