use vise::{Counter, Gauge, Metrics};

/// Horizon maintenance metrics.
#[derive(Debug, Metrics)]
#[metrics(prefix = "horizon")]
pub struct HorizonMetrics {
    /// Milliseconds of execution-ready data ahead of the playhead.
    pub window_depth_ms: Gauge,
    /// Broadcast days planned and locked since start.
    pub days_planned: Counter,
    /// Extension passes that failed planning.
    pub extension_failures: Counter,
}

#[vise::register]
pub(crate) static HORIZON_METRICS: vise::Global<HorizonMetrics> = vise::Global::new();
