use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};

/// Buckets for call latency, in seconds. The store call dominates.
const LATENCY_BUCKETS: &[f64] = &[0.001, 0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("failed to register metric: {0}")]
    Registration(#[from] prometheus::Error),

    #[error("failed to encode metrics: {0}")]
    Encoding(String),
}

/// Request metrics served on `/metrics`:
/// `consumer_requests_total{method,outcome}` and
/// `consumer_request_duration_seconds{method}`.
pub struct RequestMetrics {
    registry: Registry,
    requests_total: IntCounterVec,
    request_duration: HistogramVec,
}

impl RequestMetrics {
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let requests_total = IntCounterVec::new(
            Opts::new("consumer_requests_total", "Inbound calls by method and outcome"),
            &["method", "outcome"],
        )?;
        registry.register(Box::new(requests_total.clone()))?;

        let request_duration = HistogramVec::new(
            HistogramOpts::new(
                "consumer_request_duration_seconds",
                "Time spent handling an inbound call",
            )
            .buckets(LATENCY_BUCKETS.to_vec()),
            &["method"],
        )?;
        registry.register(Box::new(request_duration.clone()))?;

        Ok(Self {
            registry,
            requests_total,
            request_duration,
        })
    }

    pub fn record(&self, method: &str, outcome: &str) {
        self.requests_total.with_label_values(&[method, outcome]).inc();
    }

    pub fn observe_duration(&self, method: &str, seconds: f64) {
        self.request_duration.with_label_values(&[method]).observe(seconds);
    }

    pub fn request_count(&self, method: &str, outcome: &str) -> u64 {
        self.requests_total.with_label_values(&[method, outcome]).get()
    }

    /// Prometheus text exposition of everything in the registry.
    pub fn encode_text(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder
            .encode(&self.registry.gather(), &mut buffer)
            .map_err(|e| MetricsError::Encoding(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| MetricsError::Encoding(e.to_string()))
    }
}
