//! Chart payload handed to the presentation layer.
//!
//! Moving averages are taken over the resampled closes, so a weekly chart
//! shows a 20-week MA rather than a 20-day MA.

use crate::domain::error::ScreenerError;
use crate::domain::indicator::sma::rolling_mean;
use crate::domain::indicator::{MA_LONG, MA_SHORT};
use crate::domain::price_series::PriceSeries;
use crate::domain::resample::{resample, Period, ResampledBar};

#[derive(Debug, Clone)]
pub struct ChartRow {
    pub bar: ResampledBar,
    pub ma20: Option<f64>,
    pub ma100: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct ChartData {
    pub code: String,
    pub period: Period,
    pub rows: Vec<ChartRow>,
}

impl ChartData {
    pub fn build(series: &PriceSeries, period: Period) -> Result<Self, ScreenerError> {
        let resampled = resample(series, period)?;
        let closes = resampled.closes();
        let ma20 = rolling_mean(&closes, MA_SHORT);
        let ma100 = rolling_mean(&closes, MA_LONG);

        let rows = resampled
            .bars
            .into_iter()
            .zip(ma20.into_iter().zip(ma100))
            .map(|(bar, (ma20, ma100))| ChartRow { bar, ma20, ma100 })
            .collect();

        Ok(ChartData {
            code: series.code().to_string(),
            period,
            rows,
        })
    }
}
