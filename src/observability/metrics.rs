use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::Arc;
use tokio::sync::OnceCell;

// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the static `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    // no logging here, the first call can happen before a subscriber exists
    METRICS_INSTANCE.get_or_init(|| async { Metrics::new() }).await
}

#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Resolution metrics
    pub token_resolutions: IntCounterVec,

    // Local cache metrics
    pub cache_hits: IntCounter,
    pub cache_read_failures: IntCounter,
    pub cache_write_failures: IntCounter,

    // Provisioning metrics
    pub provisioning_requests: IntCounter,
    pub provisioning_failures: IntCounterVec,
    pub provisioning_duration: Histogram,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("wavefront_provisioner".into()), None).unwrap();

        let metrics: Arc<Metrics> = Arc::new(Self {
            token_resolutions: IntCounterVec::new(Opts::new("token_resolutions_total", "Token resolutions by outcome"),&["outcome"],).unwrap(),

            // Cache
            cache_hits: IntCounter::new("cache_hits_total", "Tokens served from the local token file").unwrap(),
            cache_read_failures: IntCounter::new("cache_read_failures_total", "Unreadable local token file").unwrap(),
            cache_write_failures: IntCounter::new("cache_write_failures_total", "Failed writes of the local token file").unwrap(),

            // Provisioning
            provisioning_requests: IntCounter::new("provisioning_requests_total", "Account provisioning requests").unwrap(),
            provisioning_failures: IntCounterVec::new(Opts::new("provisioning_failures_total", "Provisioning failures by reason"),&["reason"],).unwrap(),
            provisioning_duration: Histogram::with_opts(HistogramOpts::new("provisioning_duration_seconds", "Provisioning request duration seconds").buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0])).unwrap(),

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.token_resolutions.clone())).unwrap();
        reg.register(Box::new(metrics.cache_hits.clone())).unwrap();
        reg.register(Box::new(metrics.cache_read_failures.clone())).unwrap();
        reg.register(Box::new(metrics.cache_write_failures.clone())).unwrap();
        reg.register(Box::new(metrics.provisioning_requests.clone())).unwrap();
        reg.register(Box::new(metrics.provisioning_failures.clone())).unwrap();
        reg.register(Box::new(metrics.provisioning_duration.clone())).unwrap();

        metrics
    }

    /// Prometheus text exposition of the registry
    pub fn encode_text(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
