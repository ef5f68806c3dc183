//! Bounded ring buffer for TS bytes between the sink reader and fan-out.
//!
//! Live-mode semantics: the producer never blocks. When full, the oldest
//! chunks are dropped and accounted; the consumer blocks on a condition
//! variable until data arrives or the buffer closes.

use crate::metrics::PLAYOUT_METRICS;
use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};
use std::time::Duration;

pub const DEFAULT_RING_BUFFER_MAX_BYTES: usize = 8 * 1024 * 1024;
pub const MIN_RING_BUFFER_BYTES: usize = 64 * 1024;

#[derive(Debug, Default)]
struct RingState {
    chunks: VecDeque<Vec<u8>>,
    current_bytes: usize,
    dropped_bytes: u64,
    high_water_mark: usize,
    closed: bool,
}

/// Single-producer single-consumer byte ring with drop-oldest overflow.
#[derive(Debug)]
pub struct TsRingBuffer {
    max_bytes: usize,
    state: Mutex<RingState>,
    not_empty: Condvar,
}

impl TsRingBuffer {
    pub fn new(max_bytes: usize) -> Self {
        Self {
            max_bytes: max_bytes.max(MIN_RING_BUFFER_BYTES),
            state: Mutex::new(RingState::default()),
            not_empty: Condvar::new(),
        }
    }

    /// Append a chunk. Never blocks; over capacity the oldest chunks are
    /// dropped, keeping at least the newest.
    pub fn put(&self, data: Vec<u8>) {
        if data.is_empty() {
            return;
        }
        let mut state = self.state.lock().expect("ring lock poisoned");
        if state.closed {
            return;
        }
        state.current_bytes += data.len();
        state.chunks.push_back(data);
        while state.current_bytes > self.max_bytes && state.chunks.len() > 1 {
            let old = state.chunks.pop_front().expect("len checked");
            state.current_bytes -= old.len();
            state.dropped_bytes += old.len() as u64;
            PLAYOUT_METRICS.ring_dropped_bytes.inc_by(old.len() as u64);
        }
        if state.current_bytes > state.high_water_mark {
            state.high_water_mark = state.current_bytes;
        }
        self.not_empty.notify_one();
    }

    /// Block until a chunk is available, the buffer closes, or `timeout`
    /// elapses. `None` on close or timeout.
    pub fn get(&self, timeout: Option<Duration>) -> Option<Vec<u8>> {
        let mut state = self.state.lock().expect("ring lock poisoned");
        while !state.closed && state.chunks.is_empty() {
            match timeout {
                Some(limit) => {
                    let (next, wait) = self
                        .not_empty
                        .wait_timeout(state, limit)
                        .expect("ring lock poisoned");
                    state = next;
                    if wait.timed_out() && state.chunks.is_empty() {
                        return None;
                    }
                }
                None => {
                    state = self.not_empty.wait(state).expect("ring lock poisoned");
                }
            }
        }
        let chunk = state.chunks.pop_front()?;
        state.current_bytes -= chunk.len();
        Some(chunk)
    }

    /// Signal no more data and unblock the consumer.
    pub fn close(&self) {
        let mut state = self.state.lock().expect("ring lock poisoned");
        state.closed = true;
        self.not_empty.notify_all();
    }

    pub fn current_bytes(&self) -> usize {
        self.state.lock().expect("ring lock poisoned").current_bytes
    }

    pub fn dropped_bytes(&self) -> u64 {
        self.state.lock().expect("ring lock poisoned").dropped_bytes
    }

    pub fn high_water_mark(&self) -> usize {
        self.state.lock().expect("ring lock poisoned").high_water_mark
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().expect("ring lock poisoned").closed
    }
}

impl Default for TsRingBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_RING_BUFFER_MAX_BYTES)
    }
}
