//! Rule-based screening of a single security.
//!
//! Every enabled criterion must hold; disabled criteria are vacuously true.

use crate::domain::flow::InstitutionalFlow;
use crate::domain::indicator::{IndicatorSet, IndicatorType, MA_LONG, MA_SHORT};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Securities with fewer daily bars never reach evaluation.
pub const MIN_SCREEN_BARS: usize = MA_LONG + 1;

const RECENT_VOLUME_DAYS: usize = 5;
const BASE_VOLUME_DAYS: usize = 20;

/// `min_volume_ratio` at or below this value switches the volume filter off.
pub const VOLUME_RATIO_ACTIVATION: f64 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ScreenCriteria {
    pub ma20_up: bool,
    pub ma100_up: bool,
    pub min_foreign_buy_days: usize,
    pub min_volume_ratio: f64,
}

impl Default for ScreenCriteria {
    fn default() -> Self {
        Self {
            ma20_up: false,
            ma100_up: false,
            min_foreign_buy_days: 0,
            min_volume_ratio: 0.0,
        }
    }
}

impl ScreenCriteria {
    pub fn volume_ratio_active(&self) -> bool {
        self.min_volume_ratio > VOLUME_RATIO_ACTIVATION
    }

    pub fn needs_flows(&self) -> bool {
        self.min_foreign_buy_days > 0
    }

    /// Indicator types the enabled criteria read.
    pub fn required_indicators(&self) -> Vec<IndicatorType> {
        let mut types = Vec::new();
        if self.ma20_up {
            types.push(IndicatorType::Ma(MA_SHORT));
        }
        if self.ma100_up {
            types.push(IndicatorType::Ma(MA_LONG));
        }
        if self.volume_ratio_active() {
            types.push(IndicatorType::VolumeMa(RECENT_VOLUME_DAYS));
            types.push(IndicatorType::VolumeMa(BASE_VOLUME_DAYS));
        }
        types
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScreenResult {
    pub security_id: String,
    pub last_close: f64,
    pub pass: bool,
}

pub fn evaluate(
    indicators: &IndicatorSet,
    flows: &[InstitutionalFlow],
    criteria: &ScreenCriteria,
) -> bool {
    if criteria.ma20_up && !ma_rising(indicators, MA_SHORT) {
        return false;
    }
    if criteria.ma100_up && !ma_rising(indicators, MA_LONG) {
        return false;
    }
    if criteria.min_foreign_buy_days > 0
        && !foreign_buy_streak(&indicators.dates, flows, criteria.min_foreign_buy_days)
    {
        return false;
    }
    if criteria.volume_ratio_active() && !volume_surge(indicators, criteria.min_volume_ratio) {
        return false;
    }
    true
}

/// MA(n) on the last date strictly above MA(n) on the date before.
pub fn ma_rising(indicators: &IndicatorSet, period: usize) -> bool {
    let ma = IndicatorType::Ma(period);
    match (indicators.value_back(ma, 0), indicators.value_back(ma, 1)) {
        (Some(latest), Some(previous)) => latest > previous,
        _ => false,
    }
}

/// Net foreign buying on each of the last `days` trading dates.
///
/// `dates` are the price series dates. A trading date without a flow record
/// fails the streak, so stale or gapped flow data never passes.
pub fn foreign_buy_streak(dates: &[NaiveDate], flows: &[InstitutionalFlow], days: usize) -> bool {
    if days == 0 {
        return true;
    }
    if dates.len() < days {
        return false;
    }
    let foreign_by_date: HashMap<NaiveDate, i64> =
        flows.iter().map(|f| (f.date, f.foreign_net)).collect();
    dates[dates.len() - days..]
        .iter()
        .all(|d| foreign_by_date.get(d).is_some_and(|&net| net > 0))
}

/// Mean volume of the last 5 days against the 20 days before them.
pub fn volume_ratio(indicators: &IndicatorSet) -> Option<f64> {
    let recent = indicators.value_back(IndicatorType::VolumeMa(RECENT_VOLUME_DAYS), 0)?;
    let base = indicators.value_back(
        IndicatorType::VolumeMa(BASE_VOLUME_DAYS),
        RECENT_VOLUME_DAYS,
    )?;
    if base > 0.0 { Some(recent / base) } else { None }
}

fn volume_surge(indicators: &IndicatorSet, min_ratio: f64) -> bool {
    volume_ratio(indicators).is_some_and(|ratio| ratio > min_ratio)
}
