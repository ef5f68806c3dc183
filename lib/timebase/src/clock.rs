//! Clock abstraction.
//!
//! Every timing decision in the core (runway, feed-ahead due/miss, session
//! drift, join-in-progress offsets) reads from an injected [`MasterClock`].
//! No code path on the pacing path may call the OS wall clock directly;
//! tests inject a [`SteppedClock`] and advance it explicitly.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Injected time source. UTC is the schedule authority; deadlines are
/// computed in the monotonic domain.
pub trait MasterClock: Send + Sync {
    /// Milliseconds since the Unix epoch, UTC.
    fn now_utc_ms(&self) -> i64;

    /// Monotonic nanoseconds. Only differences are meaningful.
    fn monotonic_ns(&self) -> u64;
}

/// The immutable (UTC, monotonic) pair captured once at session start.
///
/// All per-session deadlines are derived from this anchor; execution
/// overruns never shift it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionEpoch {
    pub utc_ms: i64,
    pub monotonic_ns: u64,
}

impl SessionEpoch {
    pub fn capture(clock: &dyn MasterClock) -> Self {
        Self {
            utc_ms: clock.now_utc_ms(),
            monotonic_ns: clock.monotonic_ns(),
        }
    }

    /// Monotonic deadline for an offset relative to the epoch.
    pub fn deadline_monotonic_ns(&self, offset_ns: u64) -> u64 {
        self.monotonic_ns + offset_ns
    }
}

/// Production clock backed by the operating system.
#[derive(Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MasterClock for SystemClock {
    fn now_utc_ms(&self) -> i64 {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(d) => d.as_millis() as i64,
            // Pre-epoch system clocks only occur on misconfigured hosts;
            // still return a well-defined negative value.
            Err(e) => -(e.duration().as_millis() as i64),
        }
    }

    fn monotonic_ns(&self) -> u64 {
        self.origin.elapsed().as_nanos() as u64
    }
}

/// Deterministic clock for tests: time moves only when advanced.
///
/// `advance_ms` moves the UTC and monotonic domains together, mirroring a
/// healthy host. The two can be skewed independently for drift scenarios.
#[derive(Debug)]
pub struct SteppedClock {
    utc_ms: AtomicI64,
    monotonic_ns: AtomicU64,
}

impl SteppedClock {
    pub fn new(start_utc_ms: i64) -> Self {
        Self {
            utc_ms: AtomicI64::new(start_utc_ms),
            monotonic_ns: AtomicU64::new(0),
        }
    }

    pub fn advance_ms(&self, delta_ms: i64) {
        assert!(delta_ms >= 0, "stepped clock only moves forward");
        self.utc_ms.fetch_add(delta_ms, Ordering::SeqCst);
        self.monotonic_ns
            .fetch_add(delta_ms as u64 * 1_000_000, Ordering::SeqCst);
    }

    pub fn advance_monotonic_ns(&self, delta_ns: u64) {
        self.monotonic_ns.fetch_add(delta_ns, Ordering::SeqCst);
    }
}

impl MasterClock for SteppedClock {
    fn now_utc_ms(&self) -> i64 {
        self.utc_ms.load(Ordering::SeqCst)
    }

    fn monotonic_ns(&self) -> u64 {
        self.monotonic_ns.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stepped_clock_moves_only_when_advanced() {
        let clock = SteppedClock::new(100_000);
        assert_eq!(clock.now_utc_ms(), 100_000);
        assert_eq!(clock.now_utc_ms(), 100_000);
        clock.advance_ms(5_000);
        assert_eq!(clock.now_utc_ms(), 105_000);
        assert_eq!(clock.monotonic_ns(), 5_000_000_000);
    }

    #[test]
    fn session_epoch_is_immutable_after_capture() {
        let clock = SteppedClock::new(200_000);
        let epoch = SessionEpoch::capture(&clock);
        clock.advance_ms(30_000);
        assert_eq!(epoch.utc_ms, 200_000);
        assert_eq!(epoch.monotonic_ns, 0);
        assert_eq!(epoch.deadline_monotonic_ns(1_000), 1_000);
    }

    #[test]
    fn system_clock_monotonic_never_retreats() {
        let clock = SystemClock::new();
        let a = clock.monotonic_ns();
        let b = clock.monotonic_ns();
        assert!(b >= a);
    }
}
