//! Configuration validation.
//!
//! Validates all config fields before a screen or chart run.

use crate::domain::date_range::{DEFAULT_LOOKBACK_DAYS, MAX_LOOKBACK_DAYS};
use crate::domain::error::ScreenerError;
use crate::domain::resample::Period;
use crate::domain::universe::parse_codes;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::PriceDataset;
use chrono::NaiveDate;

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    validate_source(config)?;
    validate_dataset(config)?;
    validate_lookback(config)?;
    validate_end_date(config)?;
    validate_retries(config)?;
    Ok(())
}

pub fn validate_screen_config(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    validate_foreign_buy_days(config)?;
    validate_volume_ratio(config)?;
    validate_codes(config)?;
    Ok(())
}

pub fn validate_chart_config(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    if let Some(value) = config.get_string("chart", "period") {
        value
            .parse::<Period>()
            .map_err(|reason| ScreenerError::ConfigInvalid {
                section: "chart".to_string(),
                key: "period".to_string(),
                reason,
            })?;
    }
    Ok(())
}

fn validate_source(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    let source = config
        .get_string("data", "source")
        .unwrap_or_else(|| "csv".to_string());
    match source.to_lowercase().as_str() {
        "csv" => Ok(()),
        "finmind" => {
            let token = config.get_string("data", "token").unwrap_or_default();
            if token.trim().is_empty() {
                return Err(ScreenerError::ConfigMissing {
                    section: "data".to_string(),
                    key: "token".to_string(),
                });
            }
            Ok(())
        }
        other => Err(ScreenerError::ConfigInvalid {
            section: "data".to_string(),
            key: "source".to_string(),
            reason: format!("unknown source '{other}' (expected csv or finmind)"),
        }),
    }
}

fn validate_dataset(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    if let Some(value) = config.get_string("data", "dataset") {
        value
            .parse::<PriceDataset>()
            .map_err(|reason| ScreenerError::ConfigInvalid {
                section: "data".to_string(),
                key: "dataset".to_string(),
                reason,
            })?;
    }
    Ok(())
}

fn validate_lookback(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    let value = config.get_int("data", "lookback_days", DEFAULT_LOOKBACK_DAYS);
    if value <= 0 {
        return Err(ScreenerError::ConfigInvalid {
            section: "data".to_string(),
            key: "lookback_days".to_string(),
            reason: "lookback_days must be positive".to_string(),
        });
    }
    if value > MAX_LOOKBACK_DAYS {
        return Err(ScreenerError::ConfigInvalid {
            section: "data".to_string(),
            key: "lookback_days".to_string(),
            reason: format!("lookback_days must be at most {MAX_LOOKBACK_DAYS}"),
        });
    }
    Ok(())
}

fn validate_end_date(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    if let Some(value) = config.get_string("data", "end_date") {
        NaiveDate::parse_from_str(&value, "%Y-%m-%d").map_err(|_| {
            ScreenerError::ConfigInvalid {
                section: "data".to_string(),
                key: "end_date".to_string(),
                reason: "invalid date format (expected YYYY-MM-DD)".to_string(),
            }
        })?;
    }
    Ok(())
}

fn validate_retries(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    let value = config.get_int("data", "retries", 0);
    if value < 0 {
        return Err(ScreenerError::ConfigInvalid {
            section: "data".to_string(),
            key: "retries".to_string(),
            reason: "retries must be non-negative".to_string(),
        });
    }
    Ok(())
}

fn validate_foreign_buy_days(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    let value = config.get_int("screen", "min_foreign_buy_days", 0);
    if value < 0 {
        return Err(ScreenerError::ConfigInvalid {
            section: "screen".to_string(),
            key: "min_foreign_buy_days".to_string(),
            reason: "min_foreign_buy_days must be non-negative".to_string(),
        });
    }
    Ok(())
}

fn validate_volume_ratio(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    let value = config.get_double("screen", "min_volume_ratio", 0.0);
    if value < 0.0 || !value.is_finite() {
        return Err(ScreenerError::ConfigInvalid {
            section: "screen".to_string(),
            key: "min_volume_ratio".to_string(),
            reason: "min_volume_ratio must be a non-negative number".to_string(),
        });
    }
    Ok(())
}

fn validate_codes(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    if let Some(codes) = config.get_string("universe", "codes") {
        parse_codes(&codes).map_err(|e| ScreenerError::ConfigInvalid {
            section: "universe".to_string(),
            key: "codes".to_string(),
            reason: e.to_string(),
        })?;
    }
    Ok(())
}
