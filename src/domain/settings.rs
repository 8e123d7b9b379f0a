//! Resolved run settings.

use crate::domain::date_range::DateRange;
use crate::ports::data_port::PriceDataset;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    Csv { dir: PathBuf },
    FinMind { token: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSettings {
    pub source: SourceKind,
    pub dataset: PriceDataset,
    pub range: DateRange,
    /// Extra attempts after a failed fetch.
    pub retries: u32,
}
