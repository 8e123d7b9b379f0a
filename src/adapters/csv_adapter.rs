//! CSV file data adapter.
//!
//! Layout under `base_path`:
//! - `<code>.csv`: `date,open,high,low,close,volume`
//! - `<code>_flows.csv`: `date,foreign_net,trust_net,dealer_net`
//!
//! Both price datasets read the same file; CSV exports are expected to be
//! adjusted (or not) already.

use crate::domain::date_range::DateRange;
use crate::domain::error::ScreenerError;
use crate::domain::flow::InstitutionalFlow;
use crate::domain::ohlcv::DailyBar;
use crate::ports::data_port::{DataPort, PriceDataset, FLOW_DATASET};
use chrono::NaiveDate;
use serde::Deserialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub struct CsvAdapter {
    base_path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct PriceRow {
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: i64,
}

#[derive(Debug, Deserialize)]
struct FlowRow {
    date: NaiveDate,
    foreign_net: i64,
    trust_net: i64,
    dealer_net: i64,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn price_path(&self, code: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", code))
    }

    fn flow_path(&self, code: &str) -> PathBuf {
        self.base_path.join(format!("{}_flows.csv", code))
    }

    /// Reads every row of `path`. A missing file is `NotFound`.
    fn read_rows<T: for<'de> Deserialize<'de>>(
        path: &Path,
        code: &str,
        dataset: &str,
    ) -> Result<Vec<T>, ScreenerError> {
        let mut rdr = match csv::Reader::from_path(path) {
            Ok(rdr) => rdr,
            Err(e) => {
                if let csv::ErrorKind::Io(io) = e.kind() {
                    if io.kind() == ErrorKind::NotFound {
                        return Err(ScreenerError::NotFound {
                            code: code.to_string(),
                            dataset: dataset.to_string(),
                        });
                    }
                }
                return Err(ScreenerError::DataSource {
                    reason: format!("failed to read {}: {}", path.display(), e),
                });
            }
        };

        rdr.deserialize::<T>()
            .map(|row| {
                row.map_err(|e| ScreenerError::DataSource {
                    reason: format!("CSV parse error in {}: {}", path.display(), e),
                })
            })
            .collect()
    }
}

impl DataPort for CsvAdapter {
    fn fetch_price_history(
        &self,
        code: &str,
        dataset: PriceDataset,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<DailyBar>, ScreenerError> {
        let rows: Vec<PriceRow> =
            Self::read_rows(&self.price_path(code), code, dataset.dataset_name())?;
        let range = DateRange::new(start_date, end_date);

        let mut bars: Vec<DailyBar> = rows
            .into_iter()
            .filter(|r| range.contains(r.date))
            .map(|r| DailyBar::new(r.date, r.open, r.high, r.low, r.close, r.volume))
            .collect();

        if bars.is_empty() {
            return Err(ScreenerError::NotFound {
                code: code.to_string(),
                dataset: dataset.dataset_name().to_string(),
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }

    fn fetch_institutional_flows(
        &self,
        code: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<InstitutionalFlow>, ScreenerError> {
        let rows: Vec<FlowRow> = Self::read_rows(&self.flow_path(code), code, FLOW_DATASET)?;
        let range = DateRange::new(start_date, end_date);

        let mut flows: Vec<InstitutionalFlow> = rows
            .into_iter()
            .filter(|r| range.contains(r.date))
            .map(|r| InstitutionalFlow {
                date: r.date,
                foreign_net: r.foreign_net,
                trust_net: r.trust_net,
                dealer_net: r.dealer_net,
            })
            .collect();

        if flows.is_empty() {
            return Err(ScreenerError::NotFound {
                code: code.to_string(),
                dataset: FLOW_DATASET.to_string(),
            });
        }

        flows.sort_by_key(|f| f.date);
        Ok(flows)
    }
}
