//! Per-interval report lines on the diagnostic stream.

use std::time::Instant;

use crate::control::{SharedControl, StatsBatch};
use crate::stats;

const MS_PER_SECOND: f64 = 1000.0;
const PERCENT: f64 = 100.0;
const MICROS_PER_SECOND: f64 = 1_000_000.0;

/// Drains the shared statistics once per tick and prints one line per
/// interval. Intervals are disjoint and contiguous: the previous drain's
/// timestamp is this interval's start.
pub struct Reporter {
    last_report: Instant,
    total_requests: u64,
}

impl Reporter {
    #[must_use]
    pub fn new(start: Instant) -> Self {
        Self {
            last_report: start,
            total_requests: 0,
        }
    }

    #[must_use]
    pub fn total_requests(&self) -> u64 {
        self.total_requests
    }

    pub fn tick(&mut self, control: &SharedControl) {
        let mut batch = control.drain();
        let elapsed = batch
            .reset_at
            .duration_since(self.last_report)
            .as_secs_f64();
        self.last_report = batch.reset_at;
        self.total_requests += batch.latencies.len() as u64;

        let line = format_report(
            &mut batch,
            elapsed,
            self.total_requests,
            control.open_queuing_total(),
        );
        eprintln!("{}", line);
    }
}

/// Renders one report line. The `latency95`/`latency99` labels are kept for
/// output compatibility even though the cutoffs select the top 10% and top
/// 2% of samples.
fn format_report(
    batch: &mut StatsBatch,
    elapsed_seconds: f64,
    total_requests: u64,
    open_queuing: u64,
) -> String {
    stats::sort_samples(&mut batch.latencies);
    let quartiles = stats::quartiles(&batch.latencies);
    let tails = stats::tail_stats(&batch.latencies);
    let mean = stats::mean(&batch.latencies);

    let sample_count = batch.latencies.len() as f64;
    let throughput = sample_count / elapsed_seconds;
    let first_rate = batch.marker_hits[0] as f64 / sample_count;
    let second_rate = batch.marker_hits[1] as f64 / sample_count;
    let timestamp = batch.wall_clock.timestamp_micros() as f64 / MICROS_PER_SECOND;

    format!(
        "[{:.6}] latency={:.0}:{:.0}:{:.0}:{:.0}:{:.0}:({:.0})ms latency95={:.0}ms latency99={:.0}ms throughput={:.0}rps rr={:.2}% cr={:.2}% errors={} total={} openqueuing={}",
        timestamp,
        quartiles.min * MS_PER_SECOND,
        quartiles.q1 * MS_PER_SECOND,
        quartiles.median * MS_PER_SECOND,
        quartiles.q3 * MS_PER_SECOND,
        quartiles.max * MS_PER_SECOND,
        mean * MS_PER_SECOND,
        tails.p95 * MS_PER_SECOND,
        tails.p99 * MS_PER_SECOND,
        throughput,
        first_rate * PERCENT,
        second_rate * PERCENT,
        batch.errors,
        total_requests,
        open_queuing,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::classify_body;
    use chrono::Utc;
    use std::time::Duration;

    fn batch_with(latencies: Vec<f64>, errors: u64, marker_hits: [u64; 2]) -> StatsBatch {
        StatsBatch {
            errors,
            marker_hits,
            latencies,
            reset_at: Instant::now(),
            wall_clock: Utc::now(),
        }
    }

    #[test]
    fn report_line_for_known_samples() {
        let mut batch = batch_with(vec![0.3, 0.1, 0.4, 0.2], 1, [2, 1]);
        let line = format_report(&mut batch, 2.0, 4, 7);
        assert!(line.starts_with('['));
        assert!(line.contains(
            "latency=100:150:250:350:400:(250)ms latency95=400ms latency99=400ms \
             throughput=2rps rr=50.00% cr=25.00% errors=1 total=4 openqueuing=7"
        ));
    }

    #[test]
    fn empty_interval_reports_nan_statistics() {
        let mut batch = batch_with(Vec::new(), 0, [0, 0]);
        let line = format_report(&mut batch, 1.0, 0, 0);
        assert!(line.contains("latency=NaN:NaN:NaN:NaN:NaN:(NaN)ms"));
        assert!(line.contains("latency95=NaNms latency99=NaNms"));
        assert!(line.contains("throughput=0rps"));
        assert!(line.contains("rr=NaN% cr=NaN%"));
        assert!(line.contains("errors=0 total=0 openqueuing=0"));
    }

    #[test]
    fn total_requests_accumulates_across_drains_without_double_counting() {
        let control = SharedControl::new(0.0, 1, false, None);
        control.record(false, classify_body(b"ok"), Duration::from_millis(10));
        control.record(false, classify_body(b"ok"), Duration::from_millis(20));
        control.record(true, classify_body(b"ok"), Duration::from_millis(30));

        let mut reporter = Reporter::new(Instant::now());
        reporter.tick(&control);
        assert_eq!(reporter.total_requests(), 3);

        // No new samples between drains: the second batch is empty and the
        // cumulative counter does not move.
        reporter.tick(&control);
        assert_eq!(reporter.total_requests(), 3);
    }
}
