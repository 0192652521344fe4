use metrics::{Counter, Gauge, Histogram};
use metrics_derive::Metrics;

/// Metrics for the [`SwapEngine`](super::SwapEngine).
#[derive(Metrics)]
#[metrics(scope = "swaps")]
pub struct SwapMetrics {
    /// Number of flows that completed every step.
    pub completed_flows: Counter,
    /// Number of flows aborted by a failed step.
    pub failed_flows: Counter,
    /// Number of individually confirmed steps.
    pub confirmed_steps: Counter,
    /// Flows currently holding a wallet lock.
    pub active_flows: Gauge,
    /// Wall-clock duration of a full flow, in seconds.
    pub flow_duration: Histogram,
}
