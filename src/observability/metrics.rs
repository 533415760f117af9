use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGaugeVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the static `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE
        .get_or_init(|| async {
            info!("Initializing Metrics ...");
            Metrics::new()
        })
        .await
}

#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Cache metrics
    pub cache_hits: IntCounterVec,
    pub token_expiry_unix: IntGaugeVec,

    // Refresh metrics
    pub refresh_attempts: IntCounterVec,
    pub refresh_failures: IntCounterVec,
    pub refresh_duration: HistogramVec,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("pgtokenagent".into()), None).unwrap();

        let metrics: Arc<Metrics> = Arc::new(Self {
            cache_hits: IntCounterVec::new(Opts::new("cache_hits_total", "Tokens served from the cache"), &["source"]).unwrap(),
            token_expiry_unix: IntGaugeVec::new(Opts::new("token_expiry_unix_seconds", "Expiry of the cached token"), &["source"]).unwrap(),

            refresh_attempts: IntCounterVec::new(Opts::new("refresh_attempts_total", "Source fetch attempts"), &["source"]).unwrap(),
            refresh_failures: IntCounterVec::new(Opts::new("refresh_failures_total", "Source fetch failures"), &["source"]).unwrap(),
            refresh_duration: HistogramVec::new(HistogramOpts::new("refresh_duration_seconds", "Source fetch duration seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]), &["source"]).unwrap(),

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.cache_hits.clone())).unwrap();
        reg.register(Box::new(metrics.token_expiry_unix.clone())).unwrap();
        reg.register(Box::new(metrics.refresh_attempts.clone())).unwrap();
        reg.register(Box::new(metrics.refresh_failures.clone())).unwrap();
        reg.register(Box::new(metrics.refresh_duration.clone())).unwrap();

        metrics
    }

    /// Prometheus text exposition, for embedding services to serve from
    /// whatever endpoint they own.
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        encoder
            .encode(&metric_families, &mut buffer)
            .expect("Failed to encode metrics");

        String::from_utf8(buffer).expect("Failed to convert bytes to string")
    }
}
