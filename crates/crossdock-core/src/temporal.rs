//! # Effective Periods & Day Ranges
//!
//! Date-interval algebra used by rate and pricing rows. All intervals are
//! half-open `[from, until)`: the start day is inclusive, the end day is
//! exclusive, so the boundary day is never double-counted and a same-day
//! assign/remove accrues zero storage days.
//!
//! [`EffectivePeriod`] is the open-endable form used on configuration rows
//! (a missing `until` means "valid indefinitely"); [`DayRange`] is the
//! bounded form used during accrual segmentation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A bounded half-open day range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DayRange {
    /// Create a day range, rejecting empty or inverted ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyDayRange`] when `end <= start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        if end <= start {
            return Err(ValidationError::EmptyDayRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Inclusive start day.
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Exclusive end day.
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of whole days covered by the range. Always at least 1.
    pub fn days(&self) -> u32 {
        (self.end - self.start).num_days() as u32
    }

    /// Intersection with another range, or `None` when disjoint.
    pub fn intersect(&self, other: &DayRange) -> Option<DayRange> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        DayRange::new(start, end).ok()
    }

    /// Whether a day falls inside the range.
    pub fn contains(&self, day: NaiveDate) -> bool {
        day >= self.start && day < self.end
    }
}

impl std::fmt::Display for DayRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// The validity interval of a rate or pricing row: `[from, until)` with an
/// optional open end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectivePeriod {
    /// Inclusive first day of validity.
    pub effective_from: NaiveDate,
    /// Exclusive first day the row is no longer valid. `None` = open-ended.
    pub effective_until: Option<NaiveDate>,
}

impl EffectivePeriod {
    /// Create a bounded period.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyPeriod`] when `until <= from`.
    pub fn bounded(from: NaiveDate, until: NaiveDate) -> Result<Self, ValidationError> {
        if until <= from {
            return Err(ValidationError::EmptyPeriod { from, until });
        }
        Ok(Self {
            effective_from: from,
            effective_until: Some(until),
        })
    }

    /// Create an open-ended period valid from `from` indefinitely.
    pub fn open_ended(from: NaiveDate) -> Self {
        Self {
            effective_from: from,
            effective_until: None,
        }
    }

    /// Create a period from raw parts, validating bounded ones.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyPeriod`] when a bounded period is
    /// empty or inverted.
    pub fn new(from: NaiveDate, until: Option<NaiveDate>) -> Result<Self, ValidationError> {
        match until {
            Some(until) => Self::bounded(from, until),
            None => Ok(Self::open_ended(from)),
        }
    }

    /// Whether a reference day falls inside the period.
    pub fn contains(&self, day: NaiveDate) -> bool {
        day >= self.effective_from
            && self.effective_until.map(|until| day < until).unwrap_or(true)
    }

    /// Whether two periods share at least one day.
    ///
    /// This is the write-time non-overlap check: two rows for the same key
    /// may not have overlapping periods.
    pub fn overlaps(&self, other: &EffectivePeriod) -> bool {
        let start = self.effective_from.max(other.effective_from);
        let end = match (self.effective_until, other.effective_until) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (Some(a), None) => Some(a),
            (None, Some(b)) => Some(b),
            (None, None) => None,
        };
        match end {
            Some(end) => start < end,
            // Both open-ended: they always overlap from the later start on.
            None => true,
        }
    }

    /// Clip the period to a bounded day range, or `None` when disjoint.
    pub fn intersect_range(&self, range: &DayRange) -> Option<DayRange> {
        let start = self.effective_from.max(range.start());
        let end = match self.effective_until {
            Some(until) => until.min(range.end()),
            None => range.end(),
        };
        DayRange::new(start, end).ok()
    }
}

impl std::fmt::Display for EffectivePeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.effective_until {
            Some(until) => write!(f, "[{}, {})", self.effective_from, until),
            None => write!(f, "[{}, ∞)", self.effective_from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn day_range_rejects_empty() {
        assert!(DayRange::new(d(2026, 3, 1), d(2026, 3, 1)).is_err());
        assert!(DayRange::new(d(2026, 3, 2), d(2026, 3, 1)).is_err());
    }

    #[test]
    fn day_range_counts_half_open_days() {
        let r = DayRange::new(d(2026, 3, 1), d(2026, 3, 11)).unwrap();
        assert_eq!(r.days(), 10);
        assert!(r.contains(d(2026, 3, 1)));
        assert!(r.contains(d(2026, 3, 10)));
        assert!(!r.contains(d(2026, 3, 11)));
    }

    #[test]
    fn day_range_intersection() {
        let a = DayRange::new(d(2026, 3, 1), d(2026, 3, 10)).unwrap();
        let b = DayRange::new(d(2026, 3, 5), d(2026, 3, 20)).unwrap();
        let i = a.intersect(&b).unwrap();
        assert_eq!(i.start(), d(2026, 3, 5));
        assert_eq!(i.end(), d(2026, 3, 10));

        let c = DayRange::new(d(2026, 3, 10), d(2026, 3, 12)).unwrap();
        // Touching at the boundary day is disjoint (half-open ends).
        assert!(a.intersect(&c).is_none());
    }

    #[test]
    fn period_rejects_empty() {
        assert!(EffectivePeriod::bounded(d(2026, 1, 1), d(2026, 1, 1)).is_err());
        assert!(EffectivePeriod::bounded(d(2026, 1, 2), d(2026, 1, 1)).is_err());
    }

    #[test]
    fn period_containment_half_open() {
        let p = EffectivePeriod::bounded(d(2026, 1, 1), d(2026, 2, 1)).unwrap();
        assert!(p.contains(d(2026, 1, 1)));
        assert!(p.contains(d(2026, 1, 31)));
        assert!(!p.contains(d(2026, 2, 1)));
        assert!(!p.contains(d(2025, 12, 31)));
    }

    #[test]
    fn open_ended_contains_far_future() {
        let p = EffectivePeriod::open_ended(d(2026, 1, 1));
        assert!(p.contains(d(2030, 6, 15)));
        assert!(!p.contains(d(2025, 12, 31)));
    }

    #[test]
    fn adjacent_periods_do_not_overlap() {
        let a = EffectivePeriod::bounded(d(2026, 1, 1), d(2026, 2, 1)).unwrap();
        let b = EffectivePeriod::bounded(d(2026, 2, 1), d(2026, 3, 1)).unwrap();
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn overlapping_periods_detected() {
        let a = EffectivePeriod::bounded(d(2026, 1, 1), d(2026, 2, 1)).unwrap();
        let b = EffectivePeriod::bounded(d(2026, 1, 31), d(2026, 3, 1)).unwrap();
        assert!(a.overlaps(&b));

        let open = EffectivePeriod::open_ended(d(2026, 1, 15));
        assert!(a.overlaps(&open));
        assert!(open.overlaps(&a));

        let later_open = EffectivePeriod::open_ended(d(2026, 6, 1));
        assert!(!a.overlaps(&later_open));
        assert!(open.overlaps(&later_open));
    }

    #[test]
    fn intersect_range_clips_open_end() {
        let p = EffectivePeriod::open_ended(d(2026, 1, 10));
        let r = DayRange::new(d(2026, 1, 1), d(2026, 1, 20)).unwrap();
        let clipped = p.intersect_range(&r).unwrap();
        assert_eq!(clipped.start(), d(2026, 1, 10));
        assert_eq!(clipped.end(), d(2026, 1, 20));
    }
}
