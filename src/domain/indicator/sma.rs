//! Simple moving average.
//!
//! SMA(n)[i] = sum(X[i-j] for j in 0..n) / n
//! Warmup: first (n-1) positions are undefined.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::price_series::PriceSeries;

/// Trailing mean of `window` values at every position.
///
/// Output has the same length as `values`. A zero window is never defined.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                return None;
            }
            let start = i + 1 - window;
            let sum: f64 = values[start..=i].iter().sum();
            Some(sum / window as f64)
        })
        .collect()
}

fn to_series(
    series: &PriceSeries,
    indicator_type: IndicatorType,
    means: Vec<Option<f64>>,
) -> IndicatorSeries {
    let values = series
        .bars()
        .iter()
        .zip(means)
        .map(|(bar, mean)| IndicatorPoint {
            date: bar.date,
            valid: mean.is_some(),
            value: mean.unwrap_or(0.0),
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}

pub fn calculate_ma(series: &PriceSeries, period: usize) -> IndicatorSeries {
    let means = rolling_mean(&series.closes(), period);
    to_series(series, IndicatorType::Ma(period), means)
}

pub fn calculate_volume_ma(series: &PriceSeries, period: usize) -> IndicatorSeries {
    let means = rolling_mean(&series.volumes(), period);
    to_series(series, IndicatorType::VolumeMa(period), means)
}
