use prometheus_client::metrics::counter::Counter;
use prometheus_client::registry::Registry;

/// Admission decision counters.
#[derive(Clone, Debug, Default)]
pub struct AdmissionMetrics {
    pub allowed: Counter,
    pub denied: Counter,
    pub invalid: Counter,
}

impl AdmissionMetrics {
    pub fn register(prom: &mut Registry) -> Self {
        let metrics = Self::default();
        prom.register(
            "allowed",
            "Admission requests that were allowed",
            metrics.allowed.clone(),
        );
        prom.register(
            "denied",
            "Admission requests that were denied",
            metrics.denied.clone(),
        );
        prom.register(
            "invalid",
            "Admission requests that could not be handled",
            metrics.invalid.clone(),
        );
        metrics
    }
}
