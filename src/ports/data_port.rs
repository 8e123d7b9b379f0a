//! Market data access port trait.

use crate::domain::error::ScreenerError;
use crate::domain::flow::InstitutionalFlow;
use crate::domain::ohlcv::DailyBar;
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

/// Which daily price table to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PriceDataset {
    Raw,
    /// Back-adjusted for dividends and splits.
    #[default]
    Adjusted,
}

impl PriceDataset {
    pub fn dataset_name(&self) -> &'static str {
        match self {
            PriceDataset::Raw => "TaiwanStockPrice",
            PriceDataset::Adjusted => "TaiwanStockPriceAdj",
        }
    }
}

impl fmt::Display for PriceDataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dataset_name())
    }
}

impl FromStr for PriceDataset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "raw" => Ok(PriceDataset::Raw),
            "adjusted" | "adj" => Ok(PriceDataset::Adjusted),
            other => Err(format!("unknown dataset '{other}' (expected raw or adjusted)")),
        }
    }
}

pub const FLOW_DATASET: &str = "TaiwanStockInstitutionalInvestorsBuySell";

pub trait DataPort {
    /// Daily bars in `[start_date, end_date]`. No rows is `NotFound`.
    fn fetch_price_history(
        &self,
        code: &str,
        dataset: PriceDataset,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<DailyBar>, ScreenerError>;

    /// Per-date institutional net flows in `[start_date, end_date]`.
    fn fetch_institutional_flows(
        &self,
        code: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<InstitutionalFlow>, ScreenerError>;
}
