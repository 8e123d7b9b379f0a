//! Technical indicators over a price series.
//!
//! - `IndicatorPoint`: A single dated value, flagged invalid during warmup
//! - `IndicatorType`: Indicator identity + window (serves as HashMap key)
//! - `IndicatorSeries`: A time series of indicator values
//! - `IndicatorSet`: All indicators computed for one security

pub mod sma;

use crate::domain::error::ScreenerError;
use crate::domain::price_series::PriceSeries;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fmt;

pub const MA_SHORT: usize = 20;
pub const MA_LONG: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub valid: bool,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    /// Simple moving average of closing price.
    Ma(usize),
    /// Simple moving average of volume.
    VolumeMa(usize),
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Ma(period) => write!(f, "MA{}", period),
            IndicatorType::VolumeMa(period) => write!(f, "VOL{}", period),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Value `offset` positions before the last one, if defined.
    pub fn value_back(&self, offset: usize) -> Option<f64> {
        let idx = self.values.len().checked_sub(offset + 1)?;
        let point = &self.values[idx];
        point.valid.then_some(point.value)
    }

    pub fn valid_count(&self) -> usize {
        self.values.iter().filter(|p| p.valid).count()
    }
}

/// Indicators computed for one security, keyed by type.
#[derive(Debug, Clone, Default)]
pub struct IndicatorSet {
    pub dates: Vec<NaiveDate>,
    pub series: HashMap<IndicatorType, IndicatorSeries>,
}

impl IndicatorSet {
    pub fn compute(
        series: &PriceSeries,
        types: &[IndicatorType],
    ) -> Result<IndicatorSet, ScreenerError> {
        if series.is_empty() {
            return Err(ScreenerError::EmptySeries);
        }

        let mut computed = HashMap::new();
        for ind_type in types {
            if computed.contains_key(ind_type) {
                continue;
            }
            let result = match *ind_type {
                IndicatorType::Ma(n) => sma::calculate_ma(series, n),
                IndicatorType::VolumeMa(n) => sma::calculate_volume_ma(series, n),
            };
            computed.insert(*ind_type, result);
        }

        Ok(IndicatorSet {
            dates: series.dates(),
            series: computed,
        })
    }

    pub fn get(&self, ind_type: IndicatorType) -> Option<&IndicatorSeries> {
        self.series.get(&ind_type)
    }

    /// Value of `ind_type` `offset` positions before the most recent date.
    pub fn value_back(&self, ind_type: IndicatorType, offset: usize) -> Option<f64> {
        self.get(ind_type)?.value_back(offset)
    }

    /// Indicator values on `date`, keyed by display name ("MA20", "VOL10").
    pub fn on_date(&self, date: NaiveDate) -> HashMap<String, f64> {
        let Ok(idx) = self.dates.binary_search(&date) else {
            return HashMap::new();
        };
        self.series
            .iter()
            .filter_map(|(t, s)| {
                let p = s.values.get(idx)?;
                p.valid.then(|| (t.to_string(), p.value))
            })
            .collect()
    }
}
