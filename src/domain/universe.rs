//! Batch screening over a universe of securities.
//!
//! Parses code lists from configuration, fetches each security, drops those
//! without enough history and keeps the ones that pass the screen. Fetch
//! and evaluation errors skip the security; none of them abort the batch.

use crate::domain::date_range::DateRange;
use crate::domain::error::ScreenerError;
use crate::domain::flow::InstitutionalFlow;
use crate::domain::indicator::{IndicatorSet, IndicatorType};
use crate::domain::price_series::PriceSeries;
use crate::domain::screening::{evaluate, ScreenCriteria, ScreenResult, MIN_SCREEN_BARS};
use crate::ports::data_port::{DataPort, PriceDataset};
use std::collections::HashSet;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in code list")]
    EmptyToken,

    #[error("duplicate code: {0}")]
    DuplicateCode(String),
}

pub fn parse_codes(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut codes = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let code = trimmed.to_uppercase();
        if !seen.insert(code.clone()) {
            return Err(UniverseError::DuplicateCode(code));
        }
        codes.push(code);
    }

    Ok(codes)
}

/// Everything the screen needs for one security.
#[derive(Debug, Clone)]
pub struct SecurityData {
    pub series: PriceSeries,
    pub flows: Vec<InstitutionalFlow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedCode {
    pub code: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    NoData,
    InsufficientBars { bars: usize },
}

impl SkipReason {
    fn from_error(err: &ScreenerError) -> Self {
        match err {
            ScreenerError::InsufficientHistory { bars, .. } => {
                SkipReason::InsufficientBars { bars: *bars }
            }
            _ => SkipReason::NoData,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScreenReport {
    /// Passing securities, in input order.
    pub results: Vec<ScreenResult>,
    pub skipped: Vec<SkippedCode>,
    pub evaluated: usize,
}

pub fn screen_universe<F>(codes: &[String], mut fetch: F, criteria: &ScreenCriteria) -> ScreenReport
where
    F: FnMut(&str) -> Option<SecurityData>,
{
    let mut report = ScreenReport::default();
    let types = criteria.required_indicators();

    for code in codes {
        let Some(data) = fetch(code) else {
            warn!(code = %code, "skipping: no data");
            report.skipped.push(SkippedCode {
                code: code.clone(),
                reason: SkipReason::NoData,
            });
            continue;
        };

        match screen_security(code, &data, criteria, &types) {
            Ok(result) => {
                report.evaluated += 1;
                if result.pass {
                    report.results.push(result);
                }
            }
            Err(e) => {
                log_skip(code, &e);
                report.skipped.push(SkippedCode {
                    code: code.clone(),
                    reason: SkipReason::from_error(&e),
                });
            }
        }
    }

    info!(
        total = codes.len(),
        evaluated = report.evaluated,
        passed = report.results.len(),
        skipped = report.skipped.len(),
        "screen complete"
    );

    report
}

/// Evaluates one fetched security.
///
/// Fails with `InsufficientHistory` below `MIN_SCREEN_BARS` daily bars.
pub fn screen_security(
    code: &str,
    data: &SecurityData,
    criteria: &ScreenCriteria,
    types: &[IndicatorType],
) -> Result<ScreenResult, ScreenerError> {
    let bars = data.series.len();
    if bars < MIN_SCREEN_BARS {
        return Err(ScreenerError::InsufficientHistory {
            code: code.to_string(),
            bars,
            minimum: MIN_SCREEN_BARS,
        });
    }

    let indicators = IndicatorSet::compute(&data.series, types)?;
    let last_close = data.series.last_close().ok_or(ScreenerError::EmptySeries)?;
    let pass = evaluate(&indicators, &data.flows, criteria);
    debug!(code, bars, last_close, pass, "evaluated");

    Ok(ScreenResult {
        security_id: code.to_string(),
        last_close,
        pass,
    })
}

fn log_skip(code: &str, err: &ScreenerError) {
    if err.is_skippable() {
        warn!(code, error = %err, "skipping");
    } else {
        error!(code, error = %err, "skipping after failure");
    }
}

/// Loads one security from a data port.
pub fn fetch_security(
    data_port: &dyn DataPort,
    code: &str,
    dataset: PriceDataset,
    range: DateRange,
    with_flows: bool,
) -> Result<SecurityData, ScreenerError> {
    let bars = data_port.fetch_price_history(code, dataset, range.start, range.end)?;
    let series = PriceSeries::new(code, bars)?;

    let flows = if with_flows {
        data_port.fetch_institutional_flows(code, range.start, range.end)?
    } else {
        Vec::new()
    };

    Ok(SecurityData { series, flows })
}

pub fn screen_with_port(
    data_port: &dyn DataPort,
    codes: &[String],
    dataset: PriceDataset,
    range: DateRange,
    criteria: &ScreenCriteria,
) -> ScreenReport {
    info!(
        codes = codes.len(),
        start = %range.start,
        end = %range.end,
        dataset = %dataset,
        "screening universe"
    );
    let with_flows = criteria.needs_flows();
    screen_universe(
        codes,
        |code| match fetch_security(data_port, code, dataset, range, with_flows) {
            Ok(data) => Some(data),
            Err(e) => {
                log_skip(code, &e);
                None
            }
        },
        criteria,
    )
}
