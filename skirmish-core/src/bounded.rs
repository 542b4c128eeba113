//! Saturating bounded numeric values.
//!
//! Health, mana, skill reload counters, and the defensive chance stats all
//! share the same contract: an integer that never leaves its `[min, max]`
//! range, with mutation operators that report how much actually changed.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error type for bounded value construction.
#[derive(Debug, Error)]
pub enum BoundedError {
    #[error("invalid range: min {min} is greater than max {max}")]
    InvalidRange { min: i32, max: i32 },
}

/// An integer clamped to `[min, max]` with saturating arithmetic.
///
/// `add` and `subtract` return the delta actually applied, so callers can
/// report real healing done or real mana drained rather than the requested
/// amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundedValue {
    min: i32,
    current: i32,
    max: i32,
}

impl BoundedValue {
    /// Create a bounded value. The seed is clamped into range; a min above
    /// max is a configuration error.
    pub fn new(min: i32, max: i32, seed: i32) -> Result<Self, BoundedError> {
        if min > max {
            return Err(BoundedError::InvalidRange { min, max });
        }
        Ok(Self {
            min,
            current: seed.clamp(min, max),
            max,
        })
    }

    /// A `0..max` pool starting full (health, mana).
    pub fn full(max: i32) -> Result<Self, BoundedError> {
        Self::new(0, max, max)
    }

    /// A `0..max` counter starting empty (skill reload).
    pub fn empty(max: i32) -> Result<Self, BoundedError> {
        Self::new(0, max, 0)
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn current(&self) -> i32 {
        self.current
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    /// Add up to `amount` (negative amounts are treated as 0). Returns the
    /// delta actually applied.
    pub fn add(&mut self, amount: i32) -> i32 {
        let applied = (self.max - self.current).min(amount.max(0));
        self.current += applied;
        applied
    }

    /// Remove up to `amount` (negative amounts are treated as 0). Returns
    /// the delta actually removed.
    pub fn subtract(&mut self, amount: i32) -> i32 {
        let removed = (self.current - self.min).min(amount.max(0));
        self.current -= removed;
        removed
    }

    /// Clamp-assign the current value.
    pub fn set(&mut self, value: i32) {
        self.current = value.clamp(self.min, self.max);
    }

    /// Set current to max.
    pub fn fill(&mut self) {
        self.current = self.max;
    }

    /// Set current to min.
    pub fn drain(&mut self) {
        self.current = self.min;
    }

    pub fn is_full(&self) -> bool {
        self.current == self.max
    }

    pub fn is_empty(&self) -> bool {
        self.current == self.min
    }

    /// Current value as a fraction of max. Meaningful for `0..max` pools.
    pub fn ratio(&self) -> f32 {
        if self.max == self.min {
            return 0.0;
        }
        (self.current - self.min) as f32 / (self.max - self.min) as f32
    }
}

impl fmt::Display for BoundedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.current, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_range() {
        assert!(BoundedValue::new(10, 5, 7).is_err());
        assert!(BoundedValue::new(5, 5, 5).is_ok());
    }

    #[test]
    fn test_seed_clamped() {
        let v = BoundedValue::new(0, 10, 25).unwrap();
        assert_eq!(v.current(), 10);
        let v = BoundedValue::new(3, 10, -4).unwrap();
        assert_eq!(v.current(), 3);
    }

    #[test]
    fn test_add_reports_applied_delta() {
        let mut v = BoundedValue::new(0, 100, 40).unwrap();
        assert_eq!(v.add(70), 60);
        assert_eq!(v.current(), 100);
        assert_eq!(v.add(1), 0);
    }

    #[test]
    fn test_subtract_reports_removed_delta() {
        let mut v = BoundedValue::new(0, 100, 40).unwrap();
        assert_eq!(v.subtract(70), 40);
        assert_eq!(v.current(), 0);
        assert_eq!(v.subtract(5), 0);
    }

    #[test]
    fn test_negative_amounts_are_noops() {
        let mut v = BoundedValue::new(0, 100, 50).unwrap();
        assert_eq!(v.add(-10), 0);
        assert_eq!(v.subtract(-10), 0);
        assert_eq!(v.current(), 50);
    }

    #[test]
    fn test_delta_equals_observed_change() {
        let mut v = BoundedValue::new(0, 30, 12).unwrap();
        for n in [0, 5, 100, 3, -2] {
            let before = v.current();
            let applied = v.add(n);
            assert_eq!(applied, v.current() - before);
            assert!(v.current() <= v.max());

            let before = v.current();
            let removed = v.subtract(n);
            assert_eq!(removed, before - v.current());
            assert!(v.current() >= v.min());
        }
    }

    #[test]
    fn test_ratio() {
        let mut v = BoundedValue::full(100).unwrap();
        v.subtract(60);
        assert!((v.ratio() - 0.4).abs() < f32::EPSILON);
    }
}
