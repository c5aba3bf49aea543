//! Ring buffer of samples with on-demand summary statistics.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::buffer::ring::Ring;
use crate::error::{Result, ensure_capacity, or_panic};

/// Summary of the samples currently held by a [`MetricsBuffer`].
///
/// Percentiles use the nearest-rank method. All fields are zero for an empty buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricStats {
    pub count: usize,
    pub sum: f64,
    pub average: f64,
    pub min: f64,
    pub max: f64,
    pub p50: f64,
    pub p95: f64,
    pub p99: f64,
}

/// Fixed-capacity window of `f64` samples; the oldest sample is dropped when full.
pub struct MetricsBuffer {
    inner: RwLock<Ring<f64>>,
}

impl MetricsBuffer {
    /// # Panics
    ///
    /// Panics if `capacity` is 0.
    pub fn new(capacity: usize) -> Self {
        or_panic(Self::try_new(capacity))
    }

    pub fn try_new(capacity: usize) -> Result<Self> {
        ensure_capacity("capacity", capacity)?;
        Ok(Self {
            inner: RwLock::new(Ring::with_capacity(capacity)),
        })
    }

    /// Record one sample.
    pub fn record(&self, value: f64) {
        self.inner.write().push_overwrite(value);
    }

    /// Compute statistics over the current samples.
    ///
    /// Sorts a copy of the samples; NaN sorts after every number.
    pub fn stats(&self) -> MetricStats {
        let mut sorted: Vec<f64> = self.inner.read().iter().copied().collect();
        if sorted.is_empty() {
            return MetricStats::default();
        }
        sorted.sort_by(f64::total_cmp);

        let count = sorted.len();
        let sum: f64 = sorted.iter().sum();

        MetricStats {
            count,
            sum,
            average: sum / count as f64,
            min: sorted[0],
            max: sorted[count - 1],
            p50: nearest_rank(&sorted, 50.0),
            p95: nearest_rank(&sorted, 95.0),
            p99: nearest_rank(&sorted, 99.0),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.read().capacity()
    }

    pub fn clear(&self) {
        self.inner.write().clear();
    }
}

/// Value at rank `ceil(p / 100 * n)` of a sorted, non-empty slice.
fn nearest_rank(sorted: &[f64], percentile: f64) -> f64 {
    let n = sorted.len();
    let rank = ((percentile / 100.0) * n as f64).ceil() as usize;
    sorted[rank.clamp(1, n) - 1]
}

impl std::fmt::Debug for MetricsBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("MetricsBuffer")
            .field("len", &inner.len())
            .field("capacity", &inner.capacity())
            .finish()
    }
}
