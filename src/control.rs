//! Shared mutable state between the worker pool and the control loop.

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::http::MarkerSet;

/// Best-effort snapshot of the tunable knobs. The three fields are read with
/// independent relaxed loads; a worker may observe at most one stale value.
#[derive(Debug, Clone, Copy)]
pub struct TuningSnapshot {
    pub think_time: f64,
    pub desired_concurrency: i64,
    pub open_loop: bool,
}

/// One reporting interval's worth of counters and samples, drained atomically.
#[derive(Debug)]
pub struct StatsBatch {
    pub errors: u64,
    pub marker_hits: [u64; 2],
    pub latencies: Vec<f64>,
    pub reset_at: Instant,
    pub wall_clock: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct IntervalStats {
    errors: u64,
    marker_hits: [u64; 2],
    latencies: Vec<f64>,
}

/// The single point of truth shared by every worker and the control loop.
///
/// Tunables are relaxed atomics written only by the reconfiguration listener.
/// Interval statistics live behind one mutex, taken once per request by the
/// recording worker and once per tick by the drain; the lock is never held
/// across an await point.
#[derive(Debug)]
pub struct SharedControl {
    think_time_bits: AtomicU64,
    desired_concurrency: AtomicI64,
    open_loop: AtomicBool,
    request_budget: AtomicI64,
    open_queuing: AtomicU64,
    running: AtomicBool,
    interval: Mutex<IntervalStats>,
}

impl SharedControl {
    #[must_use]
    pub fn new(
        think_time: f64,
        desired_concurrency: i64,
        open_loop: bool,
        request_budget: Option<i64>,
    ) -> Self {
        Self {
            think_time_bits: AtomicU64::new(think_time.to_bits()),
            desired_concurrency: AtomicI64::new(desired_concurrency),
            open_loop: AtomicBool::new(open_loop),
            request_budget: AtomicI64::new(request_budget.unwrap_or(i64::MAX)),
            open_queuing: AtomicU64::new(0),
            running: AtomicBool::new(true),
            interval: Mutex::new(IntervalStats::default()),
        }
    }

    #[must_use]
    pub fn tuning(&self) -> TuningSnapshot {
        TuningSnapshot {
            think_time: f64::from_bits(self.think_time_bits.load(Ordering::Relaxed)),
            desired_concurrency: self.desired_concurrency.load(Ordering::Relaxed),
            open_loop: self.open_loop.load(Ordering::Relaxed),
        }
    }

    pub fn set_think_time(&self, seconds: f64) {
        self.think_time_bits
            .store(seconds.to_bits(), Ordering::Relaxed);
    }

    pub fn set_desired_concurrency(&self, count: i64) {
        self.desired_concurrency.store(count, Ordering::Relaxed);
    }

    pub fn set_open_loop(&self, open: bool) {
        self.open_loop.store(open, Ordering::Relaxed);
    }

    /// Reserves one send from the request budget. Best-effort: the budget is
    /// decremented unconditionally and a send is permitted while the
    /// pre-decrement value was positive.
    #[must_use]
    pub fn try_acquire_send(&self) -> bool {
        self.request_budget.fetch_sub(1, Ordering::Relaxed) > 0
    }

    #[must_use]
    pub fn budget_remaining(&self) -> i64 {
        self.request_budget.load(Ordering::Relaxed)
    }

    /// Records one completed request under the shared lock. The latency is
    /// appended unconditionally, including for failed or timed-out sends.
    pub fn record(&self, failed: bool, markers: MarkerSet, elapsed: Duration) {
        let mut stats = self
            .interval
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if failed {
            stats.errors += 1;
        }
        if markers.has_first() {
            stats.marker_hits[0] += 1;
        }
        if markers.has_second() {
            stats.marker_hits[1] += 1;
        }
        stats.latencies.push(elapsed.as_secs_f64());
    }

    /// Drains and resets the interval counters and the sample sequence,
    /// returning their pre-reset values plus the reset timestamp.
    #[must_use]
    pub fn drain(&self) -> StatsBatch {
        let mut stats = self
            .interval
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let drained = std::mem::take(&mut *stats);
        StatsBatch {
            errors: drained.errors,
            marker_hits: drained.marker_hits,
            latencies: drained.latencies,
            reset_at: Instant::now(),
            wall_clock: Utc::now(),
        }
    }

    /// Counts an open-loop arrival that was already due. Cumulative for the
    /// process lifetime; never reset.
    pub fn note_open_queuing(&self) {
        self.open_queuing.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn open_queuing_total(&self) -> u64 {
        self.open_queuing.load(Ordering::Relaxed)
    }

    /// Terminal: once stopped, never runs again.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }
}
