//! Statistics
//!
//! Counters are owned by the caller (one per worker thread, typically) and
//! merged at the end of a pass. Nothing here is global.

use crate::pbrt;
use num_traits::{Num, ToPrimitive, Zero};
use std::fmt;
use std::ops::AddAssign;

/// Distribution statistic.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct StatsDistribution<T>
where
    T: Num + Default + Copy + Clone,
{
    /// Sum of all values.
    sum: T,

    /// Count of all values.
    count: u64,

    /// Minimum value.
    min: Option<T>,

    /// Maximum value.
    max: Option<T>,
}

impl<T> StatsDistribution<T>
where
    T: Num + Zero + PartialOrd + AddAssign + Default + Copy + Clone + ToPrimitive,
{
    /// Create an empty distribution.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate another distribution.
    ///
    /// * `distrib` - The other distribution.
    pub fn accumulate(&mut self, distrib: &Self) {
        self.sum += distrib.sum;
        self.count += distrib.count;

        self.min = match (self.min, distrib.min) {
            (Some(a), Some(b)) => Some(pbrt::min(a, b)),
            (a, b) => a.or(b),
        };
        self.max = match (self.max, distrib.max) {
            (Some(a), Some(b)) => Some(pbrt::max(a, b)),
            (a, b) => a.or(b),
        };
    }

    /// Report a sample value.
    ///
    /// * `val`  - Sample value.
    pub fn report(&mut self, val: T) {
        self.sum += val;
        self.count += 1;
        self.min = Some(self.min.map_or(val, |v| pbrt::min(v, val)));
        self.max = Some(self.max.map_or(val, |v| pbrt::max(v, val)));
    }

    /// Number of samples.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Sum of samples.
    pub fn sum(&self) -> T {
        self.sum
    }

    /// Smallest sample.
    pub fn min(&self) -> Option<T> {
        self.min
    }

    /// Largest sample.
    pub fn max(&self) -> Option<T> {
        self.max
    }

    /// Mean of the samples, 0 when there are none.
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum.to_f64().unwrap_or(0.0) / self.count as f64
        }
    }

    /// Clear stats.
    pub fn clear(&mut self) {
        self.sum = T::zero();
        self.count = 0;
        self.min = None;
        self.max = None;
    }
}

/// Event counts of tracking walks through a medium.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct TrackingStats {
    /// Tentative collisions accepted as real (scattering or absorption).
    pub real_collisions: u64,

    /// Tentative collisions rejected as null collisions.
    pub null_collisions: u64,

    /// Walks that left the medium segment.
    pub escapes: u64,

    /// Tentative collisions per walk.
    pub steps: StatsDistribution<u64>,
}

impl TrackingStats {
    /// Create empty counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of tentative collisions.
    pub fn collisions(&self) -> u64 {
        self.real_collisions + self.null_collisions
    }

    /// Fraction of tentative collisions that were null, 0 when there were
    /// none.
    pub fn null_ratio(&self) -> f64 {
        let total = self.collisions();
        if total == 0 {
            0.0
        } else {
            self.null_collisions as f64 / total as f64
        }
    }

    /// Adds the counts of another context.
    ///
    /// * `other` - The other context.
    pub fn merge(&mut self, other: &Self) {
        self.real_collisions += other.real_collisions;
        self.null_collisions += other.null_collisions;
        self.escapes += other.escapes;
        self.steps.accumulate(&other.steps);
    }

    /// Logs the counters at info level.
    ///
    /// * `name` - Label for the report.
    pub fn report(&self, name: &str) {
        info!("{}: {}", name, self);
    }

    /// Clear all counters.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl fmt::Display for TrackingStats {
    /// Formats the value using the given formatter.
    ///
    /// * `f` - Formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "walks {}, real collisions {}, null collisions {} ({:.2}%), escapes {}, steps/walk mean {:.3} max {}",
            self.steps.count(),
            self.real_collisions,
            self.null_collisions,
            100.0 * self.null_ratio(),
            self.escapes,
            self.steps.mean(),
            self.steps.max().unwrap_or(0)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distribution_report_and_accumulate() {
        let mut a = StatsDistribution::<u64>::new();
        a.report(3);
        a.report(1);
        let mut b = StatsDistribution::<u64>::new();
        b.report(8);
        a.accumulate(&b);
        assert_eq!(a.count(), 3);
        assert_eq!(a.sum(), 12);
        assert_eq!(a.min(), Some(1));
        assert_eq!(a.max(), Some(8));
        assert_eq!(a.mean(), 4.0);
        a.clear();
        assert_eq!(a.min(), None);
        assert_eq!(a.mean(), 0.0);
    }

    #[test]
    fn accumulate_into_empty() {
        let mut a = StatsDistribution::<f64>::new();
        let mut b = StatsDistribution::<f64>::new();
        b.report(-2.5);
        a.accumulate(&b);
        assert_eq!(a.min(), Some(-2.5));
        assert_eq!(a.max(), Some(-2.5));
    }

    #[test]
    fn tracking_merge() {
        let mut a = TrackingStats::new();
        a.real_collisions = 2;
        a.null_collisions = 6;
        a.steps.report(8);
        let mut b = TrackingStats::new();
        b.escapes = 1;
        b.steps.report(0);
        a.merge(&b);
        assert_eq!(a.collisions(), 8);
        assert_eq!(a.null_ratio(), 0.75);
        assert_eq!(a.escapes, 1);
        assert_eq!(a.steps.count(), 2);
        assert!(a.to_string().contains("escapes 1"));
        a.clear();
        assert_eq!(a, TrackingStats::default());
    }
}
