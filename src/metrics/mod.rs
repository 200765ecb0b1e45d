//! Multicall metrics.
use metrics::Counter;
use metrics_derive::Metrics;

/// Metrics for batches dispatched through the aggregator.
#[derive(Metrics)]
#[metrics(scope = "multicall")]
pub struct BatchMetrics {
    /// Number of read batches executed.
    pub reads: Counter,
    /// Number of write batches sent.
    pub sends: Counter,
    /// Number of sub-calls dispatched.
    pub calls: Counter,
    /// Number of sub-calls that failed in tolerant reads.
    pub failed_calls: Counter,
    /// Number of write batches rejected by their dry run.
    pub dry_run_failures: Counter,
}
