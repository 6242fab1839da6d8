//! Prometheus metrics for the serving path.

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

/// Metric handles plus the registry they are exported from.
pub struct Metrics {
    registry: Registry,
    predictions: IntCounterVec,
    model_loads: IntCounterVec,
    history_entries: IntGauge,
    inference_seconds: Histogram,
}

impl Metrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let predictions = IntCounterVec::new(
            Opts::new("flight_delay_predictions_total", "Predict requests by outcome"),
            &["outcome"],
        )?;
        let model_loads = IntCounterVec::new(
            Opts::new("flight_delay_model_loads_total", "Model load attempts by outcome"),
            &["outcome"],
        )?;
        let history_entries = IntGauge::new(
            "flight_delay_history_entries",
            "Predictions held in the history log",
        )?;
        let inference_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "flight_delay_inference_seconds",
                "Time spent serving a predict request",
            )
            .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1]),
        )?;

        registry.register(Box::new(predictions.clone()))?;
        registry.register(Box::new(model_loads.clone()))?;
        registry.register(Box::new(history_entries.clone()))?;
        registry.register(Box::new(inference_seconds.clone()))?;

        Ok(Self {
            registry,
            predictions,
            model_loads,
            history_entries,
            inference_seconds,
        })
    }

    pub fn record_prediction(&self, outcome: &str) {
        self.predictions.with_label_values(&[outcome]).inc();
    }

    pub fn record_model_load(&self, outcome: &str) {
        self.model_loads.with_label_values(&[outcome]).inc();
    }

    pub fn set_history_entries(&self, n: usize) {
        self.history_entries.set(n as i64);
    }

    pub fn observe_inference(&self, seconds: f64) {
        self.inference_seconds.observe(seconds);
    }

    /// Encode all metrics in the Prometheus text format.
    pub fn render(&self) -> prometheus::Result<Vec<u8>> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_contains_recorded_values() {
        let metrics = Metrics::new().unwrap();
        metrics.record_prediction("ok");
        metrics.record_prediction("ok");
        metrics.record_model_load("deserialization_error");
        metrics.set_history_entries(2);
        metrics.observe_inference(0.0002);

        let text = String::from_utf8(metrics.render().unwrap()).unwrap();
        assert!(text.contains(r#"flight_delay_predictions_total{outcome="ok"} 2"#));
        assert!(text.contains(r#"flight_delay_model_loads_total{outcome="deserialization_error"} 1"#));
        assert!(text.contains("flight_delay_history_entries 2"));
        assert!(text.contains("flight_delay_inference_seconds_count 1"));
    }

    #[test]
    fn test_registries_are_independent() {
        let a = Metrics::new().unwrap();
        let b = Metrics::new().unwrap();
        a.record_prediction("ok");

        let text = String::from_utf8(b.render().unwrap()).unwrap();
        assert!(!text.contains(r#"outcome="ok"} 1"#));
    }
}
