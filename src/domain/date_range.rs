//! Inclusive query date range.

use chrono::{Duration, NaiveDate};

pub const DEFAULT_LOOKBACK_DAYS: i64 = 365;
/// Upper bound accepted for `lookback_days` (about a century).
pub const MAX_LOOKBACK_DAYS: i64 = 36_500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// `[end - days, end]`, or `None` when the start falls outside the
    /// representable calendar.
    pub fn trailing(end: NaiveDate, days: i64) -> Option<Self> {
        let start = Duration::try_days(days).and_then(|d| end.checked_sub_signed(d))?;
        Some(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_default_year() {
        let end = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
        let range = DateRange::trailing(end, DEFAULT_LOOKBACK_DAYS).unwrap();

        assert_eq!(range.start, NaiveDate::from_ymd_opt(2024, 6, 30).unwrap());
        assert_eq!(range.end, end);
    }

    #[test]
    fn trailing_out_of_range_is_none() {
        let end = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();

        assert!(DateRange::trailing(end, 999_999_999_999).is_none());
        assert!(DateRange::trailing(end, i64::MAX).is_none());
        assert!(DateRange::trailing(end, MAX_LOOKBACK_DAYS).is_some());
    }

    #[test]
    fn contains_is_inclusive() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        );

        assert!(range.contains(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()));
        assert!(range.contains(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()));
        assert!(!range.contains(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()));
    }
}
