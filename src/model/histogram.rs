//! Majority voting over jittery DPI measurements.

use std::collections::BTreeMap;
use std::fmt;

/// A bucket of the histogram: rounded DPI and how many samples fell in it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DpiBucket {
    /// Nearest multiple of ten
    pub key: u32,
    /// Number of samples in the bucket
    pub count: u32,
}

/// Counts density samples per ten-DPI bucket.
///
/// Measurements jitter by a few units because page and image sizes are
/// rounded; bucketing to the nearest ten absorbs that before voting.
#[derive(Debug, Clone, Default)]
pub struct DpiHistogram {
    buckets: BTreeMap<u32, u32>,
}

impl DpiHistogram {
    /// Create an empty histogram.
    pub fn new() -> Self {
        Self::default()
    }

    /// Round a value to its bucket key, halves away from zero.
    pub fn bucket_of(value: u32) -> u32 {
        (value.saturating_add(5) / 10) * 10
    }

    /// Count one more sample in the bucket of `value`.
    pub fn increment(&mut self, value: u32) {
        *self.buckets.entry(Self::bucket_of(value)).or_insert(0) += 1;
    }

    /// Count of the bucket `value` rounds to (0 if absent).
    pub fn get(&self, value: u32) -> u32 {
        self.buckets
            .get(&Self::bucket_of(value))
            .copied()
            .unwrap_or(0)
    }

    /// The bucket with the highest count, `(0, 0)` when empty.
    ///
    /// Buckets are visited in ascending key order and only a strictly
    /// greater count replaces the current best, so ties go to the lowest DPI.
    pub fn best(&self) -> DpiBucket {
        let mut best = DpiBucket::default();
        for (&key, &count) in &self.buckets {
            if count > best.count {
                best = DpiBucket { key, count };
            }
        }
        best
    }

    /// Whether no samples were counted.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

impl fmt::Display for DpiHistogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .buckets
            .iter()
            .map(|(key, count)| format!("DPI({})={}", key, count))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increment() {
        let mut histogram = DpiHistogram::new();
        assert_eq!(histogram.get(200), 0);

        histogram.increment(100);
        assert_eq!(histogram.get(100), 1);
        assert_eq!(histogram.get(200), 0);

        histogram.increment(198);
        assert_eq!(histogram.get(100), 1);
        assert_eq!(histogram.get(200), 1);

        histogram.increment(102);
        assert_eq!(histogram.get(100), 2);
        assert_eq!(histogram.get(200), 1);
    }

    #[test]
    fn test_nearby_values_accumulate() {
        let mut histogram = DpiHistogram::new();
        histogram.increment(96);
        histogram.increment(102);
        histogram.increment(104);
        assert_eq!(histogram.get(100), 3);
        assert_eq!(histogram.best(), DpiBucket { key: 100, count: 3 });
    }

    #[test]
    fn test_bucket_rounding() {
        assert_eq!(DpiHistogram::bucket_of(0), 0);
        assert_eq!(DpiHistogram::bucket_of(4), 0);
        assert_eq!(DpiHistogram::bucket_of(5), 10);
        assert_eq!(DpiHistogram::bucket_of(295), 300);
        assert_eq!(DpiHistogram::bucket_of(304), 300);
        assert_eq!(DpiHistogram::bucket_of(u32::MAX), (u32::MAX / 10) * 10);
    }

    #[test]
    fn test_best_empty() {
        let histogram = DpiHistogram::new();
        assert!(histogram.is_empty());
        assert_eq!(histogram.best(), DpiBucket { key: 0, count: 0 });
    }

    #[test]
    fn test_best() {
        let mut histogram = DpiHistogram::new();
        for value in [98, 99, 101, 102, 103, 200, 200] {
            histogram.increment(value);
        }
        assert_eq!(histogram.best(), DpiBucket { key: 100, count: 5 });
    }

    #[test]
    fn test_best_tie_goes_to_lowest_bucket() {
        let mut histogram = DpiHistogram::new();
        for value in [600, 600, 300, 300] {
            histogram.increment(value);
        }
        assert_eq!(histogram.best(), DpiBucket { key: 300, count: 2 });
    }

    #[test]
    fn test_display() {
        let mut histogram = DpiHistogram::new();
        histogram.increment(300);
        histogram.increment(150);
        assert_eq!(histogram.to_string(), "DPI(150)=1; DPI(300)=1");
    }
}
