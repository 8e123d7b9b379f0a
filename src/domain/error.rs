//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for twscreener.
#[derive(Debug, thiserror::Error)]
pub enum ScreenerError {
    #[error("series is empty")]
    EmptySeries,

    #[error("insufficient history for {code}: have {bars} bars, need {minimum}")]
    InsufficientHistory {
        code: String,
        bars: usize,
        minimum: usize,
    },

    #[error("no {dataset} data for {code}")]
    NotFound { code: String, dataset: String },

    #[error("duplicate bar for {code} on {date}")]
    DuplicateDate { code: String, date: NaiveDate },

    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error("api error: {reason}")]
    Api { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ScreenerError {
    /// Errors a batch run skips over instead of reporting.
    pub fn is_skippable(&self) -> bool {
        matches!(
            self,
            ScreenerError::NotFound { .. }
                | ScreenerError::InsufficientHistory { .. }
                | ScreenerError::EmptySeries
        )
    }
}

impl From<&ScreenerError> for std::process::ExitCode {
    fn from(err: &ScreenerError) -> Self {
        let code: u8 = match err {
            ScreenerError::Io(_) => 1,
            ScreenerError::ConfigParse { .. }
            | ScreenerError::ConfigMissing { .. }
            | ScreenerError::ConfigInvalid { .. } => 2,
            ScreenerError::DataSource { .. }
            | ScreenerError::Api { .. }
            | ScreenerError::DuplicateDate { .. } => 3,
            ScreenerError::EmptySeries
            | ScreenerError::NotFound { .. }
            | ScreenerError::InsufficientHistory { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
