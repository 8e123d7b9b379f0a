//! Caching and retrying decorator over any [`DataPort`].
//!
//! Results are cached per (code, dataset, start, end). Failed fetches are
//! retried up to `retries` more times unless the source reported `NotFound`.
//! Errors are never cached.

use crate::domain::error::ScreenerError;
use crate::domain::flow::InstitutionalFlow;
use crate::domain::ohlcv::DailyBar;
use crate::ports::data_port::{DataPort, PriceDataset, FLOW_DATASET};
use chrono::NaiveDate;
use std::cell::RefCell;
use std::collections::HashMap;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub code: String,
    pub dataset: &'static str,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

pub struct CachedDataPort<P: DataPort> {
    inner: P,
    retries: u32,
    prices: RefCell<HashMap<CacheKey, Vec<DailyBar>>>,
    flows: RefCell<HashMap<CacheKey, Vec<InstitutionalFlow>>>,
}

impl<P: DataPort> CachedDataPort<P> {
    pub fn new(inner: P, retries: u32) -> Self {
        Self {
            inner,
            retries,
            prices: RefCell::new(HashMap::new()),
            flows: RefCell::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    pub fn cached_entries(&self) -> usize {
        self.prices.borrow().len() + self.flows.borrow().len()
    }

    fn with_retry<T>(
        &self,
        key: &CacheKey,
        mut fetch: impl FnMut() -> Result<T, ScreenerError>,
    ) -> Result<T, ScreenerError> {
        let mut attempt = 0;
        loop {
            match fetch() {
                Ok(v) => return Ok(v),
                Err(e @ ScreenerError::NotFound { .. }) => return Err(e),
                Err(e) if attempt < self.retries => {
                    attempt += 1;
                    warn!(
                        code = %key.code,
                        dataset = key.dataset,
                        attempt,
                        error = %e,
                        "fetch failed, retrying"
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl<P: DataPort> DataPort for CachedDataPort<P> {
    fn fetch_price_history(
        &self,
        code: &str,
        dataset: PriceDataset,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<DailyBar>, ScreenerError> {
        let key = CacheKey {
            code: code.to_string(),
            dataset: dataset.dataset_name(),
            start: start_date,
            end: end_date,
        };
        if let Some(hit) = self.prices.borrow().get(&key) {
            debug!(code, dataset = key.dataset, "cache hit");
            return Ok(hit.clone());
        }

        let bars = self.with_retry(&key, || {
            self.inner
                .fetch_price_history(code, dataset, start_date, end_date)
        })?;
        self.prices.borrow_mut().insert(key, bars.clone());
        Ok(bars)
    }

    fn fetch_institutional_flows(
        &self,
        code: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<InstitutionalFlow>, ScreenerError> {
        let key = CacheKey {
            code: code.to_string(),
            dataset: FLOW_DATASET,
            start: start_date,
            end: end_date,
        };
        if let Some(hit) = self.flows.borrow().get(&key) {
            debug!(code, dataset = key.dataset, "cache hit");
            return Ok(hit.clone());
        }

        let flows = self.with_retry(&key, || {
            self.inner
                .fetch_institutional_flows(code, start_date, end_date)
        })?;
        self.flows.borrow_mut().insert(key, flows.clone());
        Ok(flows)
    }
}
