//! Prometheus exposition format and the HTTP endpoints.
//!
//! The server answers three paths: the metrics path with the current
//! registry generation in text format 0.0.4, `/health` with the JSON health
//! report, and 404 for anything else.
//!
//! ## Example
//!
//! ```rust,no_run
//! use bdx_sdk::prometheus::{PrometheusConfig, PrometheusExporter};
//! use bdx_sdk::{HealthState, MetricRegistry};
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let config = PrometheusConfig::builder()
//!         .listen_addr("0.0.0.0:8080")
//!         .metrics_path("/metrics")
//!         .build();
//!
//!     let exporter = PrometheusExporter::new(config, MetricRegistry::new(), HealthState::new());
//!     let server = exporter.start_server().await?;
//!
//!     // Metrics available at http://localhost:8080/metrics
//!     tokio::signal::ctrl_c().await?;
//!     server.abort();
//!     Ok(())
//! }
//! ```

use std::convert::Infallible;
use std::fmt::Write as _;
use std::io;
use std::net::SocketAddr;

use bdx_types::MetricSample;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::registry::Generation;
use crate::{HealthState, MetricRegistry};

const TEXT_FORMAT: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Configuration for the metrics endpoint.
#[derive(Debug, Clone)]
pub struct PrometheusConfig {
    /// Address to listen on (e.g., "0.0.0.0:8080")
    pub listen_addr: String,
    /// Path for metrics endpoint (e.g., "/metrics")
    pub metrics_path: String,
    /// Path for the JSON health report (e.g., "/health")
    pub health_path: String,
}

impl Default for PrometheusConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            metrics_path: "/metrics".to_string(),
            health_path: "/health".to_string(),
        }
    }
}

impl PrometheusConfig {
    /// Create a new builder for PrometheusConfig.
    pub fn builder() -> PrometheusConfigBuilder {
        PrometheusConfigBuilder::default()
    }
}

/// Builder for PrometheusConfig.
#[derive(Debug, Default)]
pub struct PrometheusConfigBuilder {
    listen_addr: Option<String>,
    metrics_path: Option<String>,
    health_path: Option<String>,
}

impl PrometheusConfigBuilder {
    /// Set the listen address.
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.listen_addr = Some(addr.into());
        self
    }

    /// Set the metrics path.
    pub fn metrics_path(mut self, path: impl Into<String>) -> Self {
        self.metrics_path = Some(path.into());
        self
    }

    /// Set the health path.
    pub fn health_path(mut self, path: impl Into<String>) -> Self {
        self.health_path = Some(path.into());
        self
    }

    /// Build the PrometheusConfig.
    pub fn build(self) -> PrometheusConfig {
        let defaults = PrometheusConfig::default();
        PrometheusConfig {
            listen_addr: self.listen_addr.unwrap_or(defaults.listen_addr),
            metrics_path: self.metrics_path.unwrap_or(defaults.metrics_path),
            health_path: self.health_path.unwrap_or(defaults.health_path),
        }
    }
}

/// Serves a registry and a health state over HTTP.
#[derive(Debug, Clone)]
pub struct PrometheusExporter {
    config: PrometheusConfig,
    registry: MetricRegistry,
    health: HealthState,
}

/// A running server.
#[derive(Debug)]
pub struct ServerHandle {
    local_addr: SocketAddr,
    task: JoinHandle<()>,
}

impl ServerHandle {
    /// Address the listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting connections.
    pub fn abort(&self) {
        self.task.abort();
    }
}

impl PrometheusExporter {
    /// Create an exporter over shared state.
    pub fn new(config: PrometheusConfig, registry: MetricRegistry, health: HealthState) -> Self {
        Self {
            config,
            registry,
            health,
        }
    }

    /// Current metrics in exposition format.
    pub fn render(&self) -> String {
        format_exposition(&self.registry.snapshot())
    }

    /// Bind the listener and spawn the accept loop.
    ///
    /// Binding happens before this returns, so an address already in use is
    /// reported to the caller instead of inside the task.
    pub async fn start_server(&self) -> io::Result<ServerHandle> {
        let addr: SocketAddr = self
            .config
            .listen_addr
            .parse()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        info!("Serving metrics on http://{}{}", local_addr, self.config.metrics_path);

        let exporter = self.clone();
        let task = tokio::spawn(async move {
            if let Err(e) = exporter.accept_loop(listener).await {
                error!("Metrics server error: {}", e);
            }
        });

        Ok(ServerHandle { local_addr, task })
    }

    async fn accept_loop(self, listener: TcpListener) -> io::Result<()> {
        loop {
            let (stream, peer) = listener.accept().await?;
            let io = TokioIo::new(stream);
            let exporter = self.clone();

            tokio::spawn(async move {
                let service = service_fn(move |req: Request<hyper::body::Incoming>| {
                    let exporter = exporter.clone();
                    async move { Ok::<_, Infallible>(exporter.route(req.uri().path())) }
                });

                if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                    debug!("Connection from {} ended with error: {}", peer, e);
                }
            });
        }
    }

    /// Response for a request path.
    pub fn route(&self, path: &str) -> Response<Full<Bytes>> {
        if path == self.config.metrics_path {
            response(StatusCode::OK, TEXT_FORMAT, self.render())
        } else if path == self.config.health_path {
            response(
                StatusCode::OK,
                "application/json",
                self.health.report().to_json(),
            )
        } else {
            response(StatusCode::NOT_FOUND, "text/plain", "Not Found".to_string())
        }
    }
}

fn response(status: StatusCode, content_type: &'static str, body: String) -> Response<Full<Bytes>> {
    let mut resp = Response::new(Full::new(Bytes::from(body)));
    *resp.status_mut() = status;
    resp.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    resp
}

/// Format a generation in text exposition format.
///
/// Every family gets `# HELP` and `# TYPE` lines, even when it has no
/// samples. Label keys are written in the family's schema order.
pub fn format_exposition(generation: &Generation) -> String {
    let mut output = String::new();

    for (family, samples) in generation.iter() {
        let name = family.name();
        let _ = writeln!(output, "# HELP {} {}", name, family.help());
        let _ = writeln!(output, "# TYPE {} gauge", name);

        for sample in samples {
            let _ = writeln!(
                output,
                "{}{} {}",
                name,
                format_labels(sample),
                format_value(sample.value)
            );
        }
    }

    output
}

fn format_labels(sample: &MetricSample) -> String {
    let keys = sample.family.label_keys();
    if keys.is_empty() {
        return String::new();
    }
    let pairs: Vec<String> = keys
        .iter()
        .map(|k| format!("{}=\"{}\"", k, escape_label_value(sample.get(k).unwrap_or(""))))
        .collect();
    format!("{{{}}}", pairs.join(","))
}

/// Sample value as Prometheus expects it: `NaN`, `+Inf`, `-Inf` or a float.
fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "+Inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        value.to_string()
    }
}

/// Escape a label value for Prometheus format.
/// Backslash, double-quote, and newline must be escaped.
fn escape_label_value(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use bdx_types::{HealthSnapshot, MetricFamily};
    use http_body_util::BodyExt;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn create_test_generation() -> Generation {
        vec![
            MetricSample::new(MetricFamily::Temperature, 23.5).label("name", "S1"),
            MetricSample::new(MetricFamily::Humidity, 70.2).label("name", "S1"),
            MetricSample::new(MetricFamily::Cdu, 1.0)
                .label("name", "CDU_1.1")
                .label("type", "alarm")
                .label("item", "cdu_1.1_data_hall")
                .label("status", "active")
                .label("metrix_type", ""),
            MetricSample::new(MetricFamily::LastCollectTimestamp, 1703160000.0),
        ]
        .into_iter()
        .collect()
    }

    fn exporter() -> PrometheusExporter {
        let registry = MetricRegistry::new();
        registry.publish(create_test_generation());
        PrometheusExporter::new(PrometheusConfig::default(), registry, HealthState::new())
    }

    async fn body_text(resp: Response<Full<Bytes>>) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_format_exposition_samples() {
        let output = format_exposition(&create_test_generation());

        assert!(output.contains("bdx_temperature{name=\"S1\"} 23.5\n"));
        assert!(output.contains("bdx_humidity{name=\"S1\"} 70.2\n"));
        assert!(output.contains(
            "bdx_cdu{name=\"CDU_1.1\",type=\"alarm\",item=\"cdu_1.1_data_hall\",status=\"active\",metrix_type=\"\"} 1\n"
        ));
        assert!(output.contains("bdx_last_collect_timestamp_seconds 1703160000\n"));
    }

    #[test]
    fn test_format_includes_help_and_type_for_every_family() {
        let output = format_exposition(&Generation::new());

        for family in MetricFamily::ALL {
            assert!(output.contains(&format!("# HELP {} ", family.name())));
            assert!(output.contains(&format!("# TYPE {} gauge\n", family.name())));
        }
    }

    #[test]
    fn test_escape_label_value() {
        assert_eq!(escape_label_value("simple"), "simple");
        assert_eq!(escape_label_value("with\"quote"), "with\\\"quote");
        assert_eq!(escape_label_value("with\\backslash"), "with\\\\backslash");
        assert_eq!(escape_label_value("with\nnewline"), "with\\nnewline");
    }

    #[test]
    fn test_format_value_special_cases() {
        assert_eq!(format_value(1.0), "1");
        assert_eq!(format_value(-0.25), "-0.25");
        assert_eq!(format_value(f64::NAN), "NaN");
        assert_eq!(format_value(f64::INFINITY), "+Inf");
        assert_eq!(format_value(f64::NEG_INFINITY), "-Inf");
    }

    #[test]
    fn test_prometheus_config_builder() {
        let config = PrometheusConfig::builder()
            .listen_addr("127.0.0.1:9100")
            .metrics_path("/custom-metrics")
            .build();

        assert_eq!(config.listen_addr, "127.0.0.1:9100");
        assert_eq!(config.metrics_path, "/custom-metrics");
        assert_eq!(config.health_path, "/health");
    }

    #[tokio::test]
    async fn test_route_metrics_health_and_not_found() {
        let exporter = exporter();

        let metrics = exporter.route("/metrics");
        assert_eq!(metrics.status(), StatusCode::OK);
        assert_eq!(metrics.headers()[CONTENT_TYPE], TEXT_FORMAT);
        assert!(body_text(metrics).await.contains("bdx_temperature{name=\"S1\"} 23.5"));

        let health = exporter.route("/health");
        assert_eq!(health.status(), StatusCode::OK);
        assert_eq!(health.headers()[CONTENT_TYPE], "application/json");
        assert!(body_text(health).await.contains("\"status\":\"unhealthy\""));

        assert_eq!(exporter.route("/other").status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_server_answers_over_tcp() {
        let health = HealthState::new();
        health.replace(HealthSnapshot {
            last_collect_ms: Some(1_703_160_000_000),
            last_success: true,
            sources: Default::default(),
        });
        let config = PrometheusConfig::builder().listen_addr("127.0.0.1:0").build();
        let exporter = PrometheusExporter::new(config, MetricRegistry::new(), health);

        let server = exporter.start_server().await.unwrap();
        let mut stream = tokio::net::TcpStream::connect(server.local_addr()).await.unwrap();
        stream
            .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut raw = String::new();
        stream.read_to_string(&mut raw).await.unwrap();

        assert!(raw.starts_with("HTTP/1.1 200 OK"));
        assert!(raw.contains("\"status\":\"healthy\""));
        assert!(raw.contains("\"last_collect\":\"2023-12-21T12:00:00Z\""));
        server.abort();
    }

    #[tokio::test]
    async fn test_bind_failure_is_reported() {
        let config = PrometheusConfig::builder().listen_addr("not an address").build();
        let exporter = PrometheusExporter::new(config, MetricRegistry::new(), HealthState::new());
        assert!(exporter.start_server().await.is_err());
    }
}
