//! Per-security daily price store indexed by trading date.

use crate::domain::error::ScreenerError;
use crate::domain::ohlcv::DailyBar;
use chrono::NaiveDate;
use std::collections::HashMap;

/// Daily bars of one security, strictly increasing by date.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    code: String,
    bars: Vec<DailyBar>,
    date_index: HashMap<NaiveDate, usize>,
}

impl PriceSeries {
    /// Sorts `bars` ascending by date. Two bars on the same date are rejected.
    pub fn new(code: impl Into<String>, mut bars: Vec<DailyBar>) -> Result<Self, ScreenerError> {
        let code = code.into();
        bars.sort_by_key(|b| b.date);

        if let Some(pair) = bars.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(ScreenerError::DuplicateDate {
                code,
                date: pair[0].date,
            });
        }

        let date_index = bars
            .iter()
            .enumerate()
            .map(|(i, bar)| (bar.date, i))
            .collect();

        Ok(Self {
            code,
            bars,
            date_index,
        })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn bars(&self) -> &[DailyBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn get_bar(&self, date: NaiveDate) -> Option<&DailyBar> {
        self.date_index.get(&date).map(|&i| &self.bars[i])
    }

    pub fn get_bar_index(&self, date: NaiveDate) -> Option<usize> {
        self.date_index.get(&date).copied()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume as f64).collect()
    }

    pub fn last(&self) -> Option<&DailyBar> {
        self.bars.last()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.bars.last().map(|b| b.close)
    }
}
