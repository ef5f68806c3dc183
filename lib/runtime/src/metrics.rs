use vise::{Buckets, Counter, Gauge, Histogram, Metrics};

/// Channel runtime metrics.
#[derive(Debug, Metrics)]
#[metrics(prefix = "playout")]
pub struct PlayoutMetrics {
    /// Block plans accepted by the sink.
    pub feeds_issued: Counter,
    /// Feed attempts refused with queue back-pressure.
    pub queue_full_retries: Counter,
    /// Blocks whose ready-by deadline passed before the feed decision.
    pub ready_by_misses: Counter,
    /// Feed decisions made after the block's start time.
    pub late_decisions: Counter,
    pub sessions_started: Counter,
    pub sessions_ended: Counter,
    /// Observed completion drift (seconds) against the scheduled block end.
    #[metrics(buckets = Buckets::LATENCIES)]
    pub block_delta_seconds: Histogram,
    /// Session-level runway against the furthest delivered block end.
    pub runway_ms: Gauge,
    /// Bytes discarded by the TS ring buffer in live mode.
    pub ring_dropped_bytes: Counter,
}

#[vise::register]
pub(crate) static PLAYOUT_METRICS: vise::Global<PlayoutMetrics> = vise::Global::new();
