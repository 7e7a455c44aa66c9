//! Metric reporting injected into components at construction.

/// Counter names emitted by the event store.
pub const PUSH_TOTAL: &str = "eventstore_push_total";
pub const EVENTS_PUSHED_TOTAL: &str = "eventstore_events_pushed_total";
pub const PRECONDITION_FAILED_TOTAL: &str = "eventstore_precondition_failed_total";
pub const CONCURRENCY_CONFLICT_TOTAL: &str = "eventstore_concurrency_conflict_total";

/// Sink for counters.
pub trait Reporter: Send + Sync {
    /// Adds `value` to the counter `name` with the given labels.
    fn add_count(&self, name: &'static str, value: u64, labels: &[(&'static str, String)]);
}

/// Reporter that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReporter;

impl Reporter for NoopReporter {
    fn add_count(&self, _name: &'static str, _value: u64, _labels: &[(&'static str, String)]) {}
}

/// Reporter forwarding to the `metrics` facade.
///
/// Whatever recorder the host installed (e.g. a Prometheus exporter)
/// receives the counters.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsReporter;

impl Reporter for MetricsReporter {
    fn add_count(&self, name: &'static str, value: u64, labels: &[(&'static str, String)]) {
        let labels = labels.to_vec();
        metrics::counter!(name, &labels).increment(value);
    }
}
