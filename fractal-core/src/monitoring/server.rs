//! HTTP server for Prometheus metrics export (`spec.md` §6).
//!
//! Grounded on `bog-core/src/monitoring/server.rs`: a one-connection-per-task
//! hyper 1.x server exposing `/metrics`, `/health`, and `/`.

use super::MetricsRegistry;
use anyhow::{Context, Result};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use prometheus::{Encoder, TextEncoder};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone)]
pub struct MetricsServerConfig {
    pub listen_addr: SocketAddr,
    pub metrics_path: String,
}

impl Default for MetricsServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:9090".parse().expect("valid default socket address"),
            metrics_path: "/metrics".to_string(),
        }
    }
}

pub struct MetricsServer {
    config: MetricsServerConfig,
    registry: Arc<MetricsRegistry>,
}

impl MetricsServer {
    pub fn new(config: MetricsServerConfig, registry: Arc<MetricsRegistry>) -> Self {
        Self { config, registry }
    }

    /// Serve `/metrics`, `/health`, and `/` until the process exits. Intended
    /// to be spawned as its own tokio task alongside the pipeline stages.
    pub async fn serve(self) -> Result<()> {
        let listener = TcpListener::bind(&self.config.listen_addr)
            .await
            .context("failed to bind metrics server")?;

        info!(addr = %self.config.listen_addr, path = %self.config.metrics_path, "metrics server listening");

        let registry = self.registry.clone();
        let metrics_path = self.config.metrics_path.clone();

        loop {
            let (stream, remote_addr) = match listener.accept().await {
                Ok(conn) => conn,
                Err(e) => {
                    error!(error = %e, "failed to accept metrics connection");
                    continue;
                }
            };

            let registry = registry.clone();
            let metrics_path = metrics_path.clone();

            tokio::spawn(async move {
                let io = TokioIo::new(stream);
                let service = service_fn(move |req: Request<hyper::body::Incoming>| {
                    let registry = registry.clone();
                    let metrics_path = metrics_path.clone();
                    async move { handle_request(req, registry, metrics_path).await }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    debug!(peer = %remote_addr, error = %err, "metrics connection closed with error");
                }
            });
        }
    }

    /// Render the current metrics text without opening a socket, for tests.
    pub fn serve_metrics_once(&self) -> Result<String> {
        encode_metrics(&self.registry)
    }
}

async fn handle_request(
    req: Request<hyper::body::Incoming>,
    registry: Arc<MetricsRegistry>,
    metrics_path: String,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    let path = req.uri().path();
    debug!(method = %req.method(), path, "metrics server request");

    if path == "/health" || path == "/healthz" {
        return Ok(Response::builder()
            .status(StatusCode::OK)
            .body(Full::new(Bytes::from("OK")))
            .unwrap());
    }

    if path == metrics_path {
        return Ok(match encode_metrics(&registry) {
            Ok(text) => Response::builder()
                .status(StatusCode::OK)
                .header("Content-Type", "text/plain; version=0.0.4")
                .body(Full::new(Bytes::from(text)))
                .unwrap(),
            Err(e) => {
                error!(error = %e, "failed to encode metrics");
                Response::builder()
                    .status(StatusCode::INTERNAL_SERVER_ERROR)
                    .body(Full::new(Bytes::from(format!("error: {e}"))))
                    .unwrap()
            }
        });
    }

    if path == "/" {
        let help = format!(
            "Fractal pattern pipeline metrics\n\nEndpoints:\n  {metrics_path} - Prometheus metrics\n  /health - Health check\n"
        );
        return Ok(Response::builder().status(StatusCode::OK).body(Full::new(Bytes::from(help))).unwrap());
    }

    warn!(path, "unknown metrics endpoint requested");
    Ok(Response::builder().status(StatusCode::NOT_FOUND).body(Full::new(Bytes::from("Not Found"))).unwrap())
}

fn encode_metrics(registry: &MetricsRegistry) -> Result<String> {
    let encoder = TextEncoder::new();
    let metric_families = registry.registry().gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).context("failed to encode metrics")?;
    String::from_utf8(buffer).context("invalid UTF-8 in metrics")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_listens_on_9090() {
        let config = MetricsServerConfig::default();
        assert_eq!(config.metrics_path, "/metrics");
        assert_eq!(config.listen_addr.port(), 9090);
    }

    #[test]
    fn serve_metrics_once_includes_help_and_type() {
        let registry = Arc::new(MetricsRegistry::new().expect("metrics registry"));
        registry.pipeline().trades_executed.inc();
        registry.pipeline().portfolio_value.set(1_000_000.0);

        let server = MetricsServer::new(MetricsServerConfig::default(), registry);
        let text = server.serve_metrics_once().expect("encode");

        assert!(text.contains("fractal_trades_executed_total"));
        assert!(text.contains("fractal_portfolio_value"));
        assert!(text.contains("TYPE"));
        assert!(text.contains("HELP"));
    }
}
