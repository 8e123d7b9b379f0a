//! Daily to weekly/monthly OHLC resampling.
//!
//! Weeks start on Monday and are labelled by the Sunday that closes them.
//! Months are labelled by their last calendar day. Periods that contain no
//! trading day produce no bar.

use crate::domain::error::ScreenerError;
use crate::domain::ohlcv::DailyBar;
use crate::domain::price_series::PriceSeries;
use chrono::{Datelike, Duration, NaiveDate};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    Day,
    Week,
    Month,
}

impl Period {
    /// The label date of the period containing `date`.
    pub fn period_end(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Period::Day => date,
            Period::Week => {
                let days_to_sunday = 6 - date.weekday().num_days_from_monday() as i64;
                date + Duration::days(days_to_sunday)
            }
            Period::Month => last_day_of_month(date),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Day => write!(f, "day"),
            Period::Week => write!(f, "week"),
            Period::Month => write!(f, "month"),
        }
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "day" | "d" | "daily" => Ok(Period::Day),
            "week" | "w" | "weekly" => Ok(Period::Week),
            "month" | "m" | "monthly" => Ok(Period::Month),
            other => Err(format!("unknown period '{other}' (expected day, week or month)")),
        }
    }
}

fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    let (y, m) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    // The first of any month always exists.
    NaiveDate::from_ymd_opt(y, m, 1)
        .map(|first| first - Duration::days(1))
        .unwrap_or(date)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResampledBar {
    pub period_end: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
    /// Number of daily bars merged into this one.
    pub days: usize,
}

impl ResampledBar {
    fn start(period_end: NaiveDate, bar: &DailyBar) -> Self {
        Self {
            period_end,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
            days: 1,
        }
    }

    fn merge(&mut self, bar: &DailyBar) {
        self.high = self.high.max(bar.high);
        self.low = self.low.min(bar.low);
        self.close = bar.close;
        self.volume += bar.volume;
        self.days += 1;
    }
}

#[derive(Debug, Clone)]
pub struct ResampledSeries {
    pub period: Period,
    pub bars: Vec<ResampledBar>,
}

impl ResampledSeries {
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }
}

pub fn resample(series: &PriceSeries, period: Period) -> Result<ResampledSeries, ScreenerError> {
    if series.is_empty() {
        return Err(ScreenerError::EmptySeries);
    }

    let mut bars: Vec<ResampledBar> = Vec::new();

    // Input is sorted, so each period is one contiguous run.
    for daily in series.bars() {
        let key = period.period_end(daily.date);
        match bars.last_mut() {
            Some(current) if current.period_end == key => current.merge(daily),
            _ => bars.push(ResampledBar::start(key, daily)),
        }
    }

    Ok(ResampledSeries { period, bars })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn bar(date: NaiveDate, open: f64, high: f64, low: f64, close: f64) -> DailyBar {
        DailyBar {
            date,
            open,
            high,
            low,
            close,
            volume: 100,
        }
    }

    #[test]
    fn week_end_is_sunday() {
        // 2024-03-04 is a Monday.
        assert_eq!(Period::Week.period_end(date(2024, 3, 4)), date(2024, 3, 10));
        assert_eq!(Period::Week.period_end(date(2024, 3, 8)), date(2024, 3, 10));
        assert_eq!(Period::Week.period_end(date(2024, 3, 10)), date(2024, 3, 10));
        assert_eq!(Period::Week.period_end(date(2024, 3, 11)), date(2024, 3, 17));
    }

    #[test]
    fn month_end_handles_lengths() {
        assert_eq!(Period::Month.period_end(date(2024, 2, 5)), date(2024, 2, 29));
        assert_eq!(Period::Month.period_end(date(2023, 2, 5)), date(2023, 2, 28));
        assert_eq!(Period::Month.period_end(date(2024, 12, 2)), date(2024, 12, 31));
        assert_eq!(Period::Month.period_end(date(2024, 4, 30)), date(2024, 4, 30));
    }

    #[test]
    fn period_from_str() {
        assert_eq!("week".parse::<Period>(), Ok(Period::Week));
        assert_eq!("M".parse::<Period>(), Ok(Period::Month));
        assert_eq!("daily".parse::<Period>(), Ok(Period::Day));
        assert!("hour".parse::<Period>().is_err());
    }

    #[test]
    fn resample_empty_fails() {
        let series = PriceSeries::new("2330", vec![]).unwrap();
        assert!(matches!(
            resample(&series, Period::Week),
            Err(ScreenerError::EmptySeries)
        ));
    }

    #[test]
    fn weekly_ohlc_aggregation() {
        let bars = vec![
            bar(date(2024, 3, 4), 10.0, 12.0, 9.0, 11.0),
            bar(date(2024, 3, 5), 11.0, 15.0, 10.0, 14.0),
            bar(date(2024, 3, 6), 14.0, 14.5, 8.0, 9.0),
            bar(date(2024, 3, 11), 9.0, 10.0, 8.5, 9.5),
        ];
        let series = PriceSeries::new("2330", bars).unwrap();
        let weekly = resample(&series, Period::Week).unwrap();

        assert_eq!(weekly.len(), 2);
        let first = &weekly.bars[0];
        assert_eq!(first.period_end, date(2024, 3, 10));
        assert!((first.open - 10.0).abs() < f64::EPSILON);
        assert!((first.high - 15.0).abs() < f64::EPSILON);
        assert!((first.low - 8.0).abs() < f64::EPSILON);
        assert!((first.close - 9.0).abs() < f64::EPSILON);
        assert_eq!(first.volume, 300);
        assert_eq!(first.days, 3);

        assert_eq!(weekly.bars[1].period_end, date(2024, 3, 17));
        assert_eq!(weekly.bars[1].days, 1);
    }

    #[test]
    fn empty_weeks_are_skipped() {
        let bars = vec![
            bar(date(2024, 1, 2), 1.0, 1.0, 1.0, 1.0),
            // Three weeks without trading (e.g. Lunar New Year halt).
            bar(date(2024, 1, 29), 2.0, 2.0, 2.0, 2.0),
        ];
        let series = PriceSeries::new("2330", bars).unwrap();
        let weekly = resample(&series, Period::Week).unwrap();

        assert_eq!(weekly.len(), 2);
        assert_eq!(weekly.bars[0].period_end, date(2024, 1, 7));
        assert_eq!(weekly.bars[1].period_end, date(2024, 2, 4));
    }

    #[test]
    fn partial_month_yields_one_bar() {
        let bars = vec![
            bar(date(2024, 5, 6), 100.0, 103.0, 99.0, 102.0),
            bar(date(2024, 5, 7), 102.0, 104.0, 101.0, 103.0),
            bar(date(2024, 5, 8), 103.0, 108.0, 100.0, 101.0),
            bar(date(2024, 5, 9), 101.0, 102.0, 97.0, 98.0),
            bar(date(2024, 5, 10), 98.0, 100.0, 96.0, 99.5),
        ];
        let series = PriceSeries::new("2330", bars).unwrap();
        let monthly = resample(&series, Period::Month).unwrap();

        assert_eq!(monthly.len(), 1);
        let m = &monthly.bars[0];
        assert_eq!(m.period_end, date(2024, 5, 31));
        assert!((m.open - 100.0).abs() < f64::EPSILON);
        assert!((m.close - 99.5).abs() < f64::EPSILON);
        assert!((m.high - 108.0).abs() < f64::EPSILON);
        assert!((m.low - 96.0).abs() < f64::EPSILON);
    }

    #[test]
    fn day_period_is_identity() {
        let bars = vec![
            bar(date(2024, 5, 6), 100.0, 103.0, 99.0, 102.0),
            bar(date(2024, 5, 7), 102.0, 104.0, 101.0, 103.0),
        ];
        let series = PriceSeries::new("2330", bars).unwrap();
        let daily = resample(&series, Period::Day).unwrap();

        assert_eq!(daily.len(), 2);
        assert_eq!(daily.closes(), vec![102.0, 103.0]);
    }

    proptest! {
        #[test]
        fn weekly_bars_bounded_by_weeks_spanned(
            offsets in prop::collection::btree_set(0i64..400, 1..120),
            seed in 1.0f64..500.0,
        ) {
            let start = date(2023, 1, 2);
            let bars: Vec<DailyBar> = offsets
                .iter()
                .enumerate()
                .map(|(i, &off)| {
                    let base = seed + i as f64;
                    bar(start + Duration::days(off), base, base + 2.0, base - 2.0, base + 1.0)
                })
                .collect();
            let distinct_weeks: HashSet<_> = bars
                .iter()
                .map(|b| Period::Week.period_end(b.date))
                .collect();

            let series = PriceSeries::new("P", bars).unwrap();
            let weekly = resample(&series, Period::Week).unwrap();

            prop_assert!(weekly.len() <= distinct_weeks.len());
            for b in &weekly.bars {
                prop_assert!(b.high >= b.low);
            }
            prop_assert_eq!(weekly.bars.iter().map(|b| b.days).sum::<usize>(), series.len());
        }
    }
}
