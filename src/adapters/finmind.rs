//! FinMind open-data API adapter.
//!
//! Payload decoding is always available; the HTTP client needs the `finmind`
//! feature.

use crate::domain::error::ScreenerError;
use crate::domain::flow::{aggregate_flows, FlowRecord, InstitutionalFlow, InvestorCategory};
use crate::domain::ohlcv::DailyBar;
use chrono::NaiveDate;
use serde::Deserialize;

pub const API_URL: &str = "https://api.finmindtrade.com/api/v4/data";

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    msg: Option<String>,
    data: Option<Vec<T>>,
}

#[derive(Debug, Deserialize)]
struct PriceItem {
    date: NaiveDate,
    open: f64,
    max: f64,
    min: f64,
    close: f64,
    #[serde(rename = "Trading_Volume", default)]
    trading_volume: i64,
}

#[derive(Debug, Deserialize)]
struct FlowItem {
    date: NaiveDate,
    name: String,
    #[serde(default)]
    buy: i64,
    #[serde(default)]
    sell: i64,
}

fn decode<T: for<'de> Deserialize<'de>>(
    body: &str,
    code: &str,
    dataset: &str,
) -> Result<Vec<T>, ScreenerError> {
    let envelope: Envelope<T> =
        serde_json::from_str(body).map_err(|e| ScreenerError::Api {
            reason: format!("malformed {dataset} response: {e}"),
        })?;

    let Some(data) = envelope.data else {
        return Err(ScreenerError::Api {
            reason: envelope.msg.unwrap_or_else(|| "unknown error".to_string()),
        });
    };

    if data.is_empty() {
        return Err(ScreenerError::NotFound {
            code: code.to_string(),
            dataset: dataset.to_string(),
        });
    }

    Ok(data)
}

/// Decodes a daily price response; `max`/`min` carry high/low.
pub fn parse_price_payload(
    body: &str,
    code: &str,
    dataset: &str,
) -> Result<Vec<DailyBar>, ScreenerError> {
    let items: Vec<PriceItem> = decode(body, code, dataset)?;
    let mut bars: Vec<DailyBar> = items
        .into_iter()
        .map(|i| DailyBar::new(i.date, i.open, i.max, i.min, i.close, i.trading_volume))
        .collect();
    bars.sort_by_key(|b| b.date);
    Ok(bars)
}

/// Decodes an institutional buy/sell response into per-date net flows.
pub fn parse_flow_payload(
    body: &str,
    code: &str,
    dataset: &str,
) -> Result<Vec<InstitutionalFlow>, ScreenerError> {
    let items: Vec<FlowItem> = decode(body, code, dataset)?;
    let records: Vec<FlowRecord> = items
        .into_iter()
        .filter_map(|i| {
            let category = InvestorCategory::from_name(&i.name)?;
            Some(FlowRecord {
                date: i.date,
                category,
                buy: i.buy,
                sell: i.sell,
            })
        })
        .collect();
    Ok(aggregate_flows(&records))
}

#[cfg(feature = "finmind")]
mod client {
    use super::*;
    use crate::ports::data_port::{DataPort, PriceDataset, FLOW_DATASET};
    use std::time::Duration;
    use tracing::debug;

    pub struct FinMindAdapter {
        token: String,
        client: reqwest::blocking::Client,
        base_url: String,
    }

    impl FinMindAdapter {
        pub fn new(token: impl Into<String>) -> Result<Self, ScreenerError> {
            let client = reqwest::blocking::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .map_err(|e| ScreenerError::Api {
                    reason: format!("failed to build HTTP client: {e}"),
                })?;

            Ok(Self {
                token: token.into(),
                client,
                base_url: API_URL.to_string(),
            })
        }

        pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
            self.base_url = base_url.into();
            self
        }

        fn get(
            &self,
            dataset: &str,
            code: &str,
            start_date: NaiveDate,
            end_date: NaiveDate,
        ) -> Result<String, ScreenerError> {
            debug!(dataset, code, %start_date, %end_date, "finmind request");
            let response = self
                .client
                .get(&self.base_url)
                .query(&[
                    ("dataset", dataset.to_string()),
                    ("data_id", code.to_string()),
                    ("start_date", start_date.format("%Y-%m-%d").to_string()),
                    ("end_date", end_date.format("%Y-%m-%d").to_string()),
                    ("token", self.token.clone()),
                ])
                .send()
                .map_err(|e| ScreenerError::Api {
                    reason: format!("request failed: {e}"),
                })?;

            // Error bodies still carry the JSON envelope with `msg`.
            response.text().map_err(|e| ScreenerError::Api {
                reason: format!("failed to read response: {e}"),
            })
        }
    }

    impl DataPort for FinMindAdapter {
        fn fetch_price_history(
            &self,
            code: &str,
            dataset: PriceDataset,
            start_date: NaiveDate,
            end_date: NaiveDate,
        ) -> Result<Vec<DailyBar>, ScreenerError> {
            let name = dataset.dataset_name();
            let body = self.get(name, code, start_date, end_date)?;
            parse_price_payload(&body, code, name)
        }

        fn fetch_institutional_flows(
            &self,
            code: &str,
            start_date: NaiveDate,
            end_date: NaiveDate,
        ) -> Result<Vec<InstitutionalFlow>, ScreenerError> {
            let body = self.get(FLOW_DATASET, code, start_date, end_date)?;
            parse_flow_payload(&body, code, FLOW_DATASET)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn new_builds_client_with_default_url() {
            let adapter = FinMindAdapter::new("token").unwrap();
            assert_eq!(adapter.base_url, API_URL);

            let adapter = adapter.with_base_url("http://127.0.0.1:9/api");
            assert_eq!(adapter.base_url, "http://127.0.0.1:9/api");
        }

        #[test]
        fn unreachable_host_is_api_error() {
            let adapter = FinMindAdapter::new("token")
                .unwrap()
                .with_base_url("http://127.0.0.1:9/api");
            let day = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();

            let result = adapter.fetch_price_history("2330", PriceDataset::Raw, day, day);

            assert!(matches!(result, Err(ScreenerError::Api { .. })));
        }
    }
}

#[cfg(feature = "finmind")]
pub use client::FinMindAdapter;
