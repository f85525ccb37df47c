//! Running statistics kept per touch sequence
//!
//! [`RangeAccumulator`] tracks the extremes of a scalar stream and [`Latch`]
//! is a one-way boolean that remembers whether a condition was ever observed.

use serde::{Deserialize, Serialize};

/// Minimum and maximum of every value seen so far.
///
/// Starts out empty with sentinel bounds (`i32::MAX`, `i32::MIN`); use
/// [`RangeAccumulator::bounds`] to read it, which returns `None` until the
/// first update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeAccumulator {
    min: i32,
    max: i32,
}

impl Default for RangeAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl RangeAccumulator {
    pub fn new() -> Self {
        Self {
            min: i32::MAX,
            max: i32::MIN,
        }
    }

    /// Widen the range to include `value`
    pub fn update(&mut self, value: i32) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    /// `(min, max)`, or `None` if nothing was recorded
    pub fn bounds(&self) -> Option<(i32, i32)> {
        if self.is_empty() {
            None
        } else {
            Some((self.min, self.max))
        }
    }

    pub fn to_span(&self) -> Option<Span> {
        self.bounds().map(|(min, max)| Span { min, max })
    }
}

/// Serializable snapshot of a non-empty range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub min: i32,
    pub max: i32,
}

/// Sticky flag: once set it stays set for the lifetime of its owner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Latch(bool);

impl Latch {
    /// `latch = latch || current`
    pub fn observe(&mut self, current: bool) {
        self.0 |= current;
    }

    pub fn get(&self) -> bool {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_range_has_no_bounds() {
        let range = RangeAccumulator::new();
        assert!(range.is_empty());
        assert_eq!(range.bounds(), None);
        assert_eq!(range.to_span(), None);
    }

    #[test]
    fn test_single_update_sets_both_bounds() {
        let mut range = RangeAccumulator::new();
        range.update(42);
        assert_eq!(range.bounds(), Some((42, 42)));
    }

    #[test]
    fn test_bounds_contain_value_and_never_regress() {
        let mut range = RangeAccumulator::new();
        let values = [17, 3, 25, -4, 25, 0, 100, 50];
        let mut prev: Option<(i32, i32)> = None;

        for v in values {
            range.update(v);
            let (min, max) = range.bounds().unwrap();
            assert!(min <= v && v <= max);
            if let Some((pmin, pmax)) = prev {
                assert!(min <= pmin, "min regressed: {} -> {}", pmin, min);
                assert!(max >= pmax, "max regressed: {} -> {}", pmax, max);
            }
            prev = Some((min, max));
        }

        assert_eq!(range.bounds(), Some((-4, 100)));
    }

    #[test]
    fn test_latch_is_one_way() {
        let mut latch = Latch::default();
        assert!(!latch.get());

        latch.observe(false);
        assert!(!latch.get());

        latch.observe(true);
        assert!(latch.get());

        latch.observe(false);
        latch.observe(false);
        assert!(latch.get());
    }
}
