//! Windowed latency statistics: quartiles, tail medians, arithmetic mean.
//!
//! All functions operate on latency samples in seconds and yield `f64::NAN`
//! for every statistic of an empty sample set.

/// Five-number summary of a sorted sample sequence.
#[derive(Debug, Clone, Copy)]
pub struct Quartiles {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Tail latency medians.
///
/// The published labels are `latency95`/`latency99`, but the underlying
/// cutoffs are the medians of the top 10% and top 2% of sorted samples.
#[derive(Debug, Clone, Copy)]
pub struct TailStats {
    pub p95: f64,
    pub p99: f64,
}

/// Median of a sorted slice: the middle element, or the mean of the two
/// middle elements when the length is even. NaN when empty.
#[must_use]
pub fn median(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return f64::NAN;
    }
    let mid = (n - 1) / 2;
    if (n - 1) % 2 == 0 {
        sorted.get(mid).copied().unwrap_or(f64::NAN)
    } else {
        match (sorted.get(mid), sorted.get(mid + 1)) {
            (Some(low), Some(high)) => (low + high) / 2.0,
            _ => f64::NAN,
        }
    }
}

/// Quartiles of a sorted slice. Q1 is the median of the lower half
/// `[0, n/2)`, Q3 the median of the upper half `[n/2, n)`.
#[must_use]
pub fn quartiles(sorted: &[f64]) -> Quartiles {
    let n = sorted.len();
    if n == 0 {
        return Quartiles {
            min: f64::NAN,
            q1: f64::NAN,
            median: f64::NAN,
            q3: f64::NAN,
            max: f64::NAN,
        };
    }
    Quartiles {
        min: sorted.first().copied().unwrap_or(f64::NAN),
        q1: median(sorted.get(..n / 2).unwrap_or_default()),
        median: median(sorted),
        q3: median(sorted.get(n / 2..).unwrap_or_default()),
        max: sorted.last().copied().unwrap_or(f64::NAN),
    }
}

/// Tail statistics of a sorted slice: medians of the slices starting at
/// sample indices `90*n/100` and `98*n/100`.
#[must_use]
pub fn tail_stats(sorted: &[f64]) -> TailStats {
    let n = sorted.len();
    if n == 0 {
        return TailStats {
            p95: f64::NAN,
            p99: f64::NAN,
        };
    }
    TailStats {
        p95: median(sorted.get(90 * n / 100..).unwrap_or_default()),
        p99: median(sorted.get(98 * n / 100..).unwrap_or_default()),
    }
}

/// Arithmetic mean; NaN when empty.
#[must_use]
pub fn mean(samples: &[f64]) -> f64 {
    let sum: f64 = samples.iter().sum();
    sum / samples.len() as f64
}

/// Sorts samples ascending in place. NaN never enters the sample buffer, so
/// total ordering over the finite values is enough.
pub fn sort_samples(samples: &mut [f64]) {
    samples.sort_unstable_by(f64::total_cmp);
}
