//! Core domain types and logic.

pub mod ohlcv;
pub mod price_series;
pub mod flow;
pub mod date_range;
pub mod resample;
pub mod indicator;
pub mod screening;
pub mod universe;
pub mod chart;
pub mod settings;
pub mod config_validation;
pub mod error;
