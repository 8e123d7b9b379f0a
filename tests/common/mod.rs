#![allow(dead_code)]

use chrono::NaiveDate;
use std::cell::RefCell;
use std::collections::HashMap;
use twscreener::domain::chart::ChartData;
use twscreener::domain::error::ScreenerError;
pub use twscreener::domain::flow::InstitutionalFlow;
pub use twscreener::domain::ohlcv::DailyBar;
use twscreener::domain::screening::ScreenResult;
use twscreener::ports::data_port::{DataPort, PriceDataset};
use twscreener::ports::report_port::ReportPort;

pub struct MockDataPort {
    pub prices: HashMap<String, Vec<DailyBar>>,
    pub flows: HashMap<String, Vec<InstitutionalFlow>>,
    pub errors: HashMap<String, String>,
    pub price_calls: RefCell<Vec<String>>,
    pub flow_calls: RefCell<Vec<String>>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            prices: HashMap::new(),
            flows: HashMap::new(),
            errors: HashMap::new(),
            price_calls: RefCell::new(Vec::new()),
            flow_calls: RefCell::new(Vec::new()),
        }
    }

    pub fn with_bars(mut self, code: &str, bars: Vec<DailyBar>) -> Self {
        self.prices.insert(code.to_string(), bars);
        self
    }

    pub fn with_flows(mut self, code: &str, flows: Vec<InstitutionalFlow>) -> Self {
        self.flows.insert(code.to_string(), flows);
        self
    }

    pub fn with_error(mut self, code: &str, reason: &str) -> Self {
        self.errors.insert(code.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_price_history(
        &self,
        code: &str,
        dataset: PriceDataset,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<DailyBar>, ScreenerError> {
        self.price_calls.borrow_mut().push(code.to_string());
        if let Some(reason) = self.errors.get(code) {
            return Err(ScreenerError::DataSource {
                reason: reason.clone(),
            });
        }
        let bars: Vec<DailyBar> = self
            .prices
            .get(code)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.date >= start_date && b.date <= end_date)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        if bars.is_empty() {
            return Err(ScreenerError::NotFound {
                code: code.to_string(),
                dataset: dataset.dataset_name().to_string(),
            });
        }
        Ok(bars)
    }

    fn fetch_institutional_flows(
        &self,
        code: &str,
        _start_date: NaiveDate,
        _end_date: NaiveDate,
    ) -> Result<Vec<InstitutionalFlow>, ScreenerError> {
        self.flow_calls.borrow_mut().push(code.to_string());
        self.flows
            .get(code)
            .cloned()
            .ok_or_else(|| ScreenerError::NotFound {
                code: code.to_string(),
                dataset: "flows".to_string(),
            })
    }
}

/// Captures whatever the pipeline reports.
#[derive(Default)]
pub struct MemoryReport {
    pub screens: RefCell<Vec<Vec<ScreenResult>>>,
    pub charts: RefCell<Vec<ChartData>>,
}

impl ReportPort for MemoryReport {
    fn write_screen(&self, results: &[ScreenResult]) -> Result<(), ScreenerError> {
        self.screens.borrow_mut().push(results.to_vec());
        Ok(())
    }

    fn write_chart(&self, chart: &ChartData) -> Result<(), ScreenerError> {
        self.charts.borrow_mut().push(chart.clone());
        Ok(())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// One bar per calendar day with closes rising by `step`.
pub fn generate_bars(start_date: &str, count: usize, start_price: f64, step: f64) -> Vec<DailyBar> {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    (0..count)
        .map(|i| {
            let close = start_price + step * i as f64;
            DailyBar {
                date: start + chrono::Duration::days(i as i64),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1000,
            }
        })
        .collect()
}

pub fn generate_flows(start_date: &str, foreign: &[i64]) -> Vec<InstitutionalFlow> {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    foreign
        .iter()
        .enumerate()
        .map(|(i, &f)| InstitutionalFlow {
            date: start + chrono::Duration::days(i as i64),
            foreign_net: f,
            trust_net: 0,
            dealer_net: 0,
        })
        .collect()
}
