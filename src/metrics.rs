use actix_web::{dev::Server, App, HttpServer};
use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, register_int_gauge, HistogramVec,
    IntCounterVec, IntGauge,
};
use std::net::SocketAddr;

lazy_static! {
    pub static ref TOOL_EXECUTION_TIME: HistogramVec = register_histogram_vec!(
        "stainless_service_tool_execution_time_seconds",
        "time of running external tool binaries in seconds",
        &["tool"],
        vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 30.0, 45.0, 60.0],
    )
    .unwrap();
    pub static ref TOOLS_IN_QUEUE: IntGauge = register_int_gauge!(
        "stainless_service_tools_in_queue",
        "number of tool runs waiting for a free slot",
    )
    .unwrap();
    pub static ref REQUESTS: IntCounterVec = register_int_counter_vec!(
        "stainless_service_requests",
        "number of processed requests",
        &["endpoint", "status"],
    )
    .unwrap();
}

pub fn count_request(endpoint: &str, success: bool) {
    let status = if success { "ok" } else { "fail" };
    REQUESTS.with_label_values(&[endpoint, status]).inc();
}

/// Decrements the wrapped gauge when dropped.
pub struct GaugeGuard<'a>(&'a IntGauge);

impl<'a> GaugeGuard<'a> {
    pub fn inc(gauge: &'a IntGauge) -> Self {
        gauge.inc();
        Self(gauge)
    }
}

impl Drop for GaugeGuard<'_> {
    fn drop(&mut self) {
        self.0.dec();
    }
}

#[derive(Clone)]
pub struct Metrics {
    metrics_middleware: PrometheusMetrics,
    http_middleware: PrometheusMetrics,
}

impl Metrics {
    pub fn new(endpoint: &str) -> anyhow::Result<Self> {
        let registry = prometheus::default_registry();
        let metrics_middleware = PrometheusMetricsBuilder::new("stainless_service_metrics")
            .registry(registry.clone())
            .endpoint(endpoint)
            .build()
            .map_err(|err| anyhow::anyhow!("cannot build metrics endpoint: {err}"))?;
        // note: http middleware has no endpoint
        let http_middleware = PrometheusMetricsBuilder::new("stainless_service")
            .registry(registry.clone())
            .build()
            .map_err(|err| anyhow::anyhow!("cannot build http metrics: {err}"))?;

        Ok(Self {
            metrics_middleware,
            http_middleware,
        })
    }

    pub fn middleware(&self) -> &PrometheusMetrics {
        &self.http_middleware
    }

    pub fn run_server(&self, addr: SocketAddr) -> std::io::Result<Server> {
        let metrics_middleware = self.metrics_middleware.clone();
        let server = HttpServer::new(move || App::new().wrap(metrics_middleware.clone()))
            .bind(addr)?
            .run();
        Ok(server)
    }
}
