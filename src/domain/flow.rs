//! Institutional investor net flows.
//!
//! Raw buy/sell rows are reported per investor category; they are folded into
//! one [`InstitutionalFlow`] per trading date with net = buy - sell.

use chrono::NaiveDate;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstitutionalFlow {
    pub date: NaiveDate,
    pub foreign_net: i64,
    pub trust_net: i64,
    pub dealer_net: i64,
}

impl InstitutionalFlow {
    pub fn total_net(&self) -> i64 {
        self.foreign_net + self.trust_net + self.dealer_net
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvestorCategory {
    Foreign,
    Trust,
    Dealer,
}

impl InvestorCategory {
    /// Maps an investor name as published by the exchange feed.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Foreign_Investor" | "Foreign_Dealer_Self" => Some(InvestorCategory::Foreign),
            "Investment_Trust" => Some(InvestorCategory::Trust),
            "Dealer_self" | "Dealer_Hedging" | "Dealer" => Some(InvestorCategory::Dealer),
            _ => None,
        }
    }
}

/// One buy/sell row for a single investor category.
#[derive(Debug, Clone)]
pub struct FlowRecord {
    pub date: NaiveDate,
    pub category: InvestorCategory,
    pub buy: i64,
    pub sell: i64,
}

/// Sums net buying per category and date. Output is ascending by date.
pub fn aggregate_flows(records: &[FlowRecord]) -> Vec<InstitutionalFlow> {
    let mut by_date: BTreeMap<NaiveDate, InstitutionalFlow> = BTreeMap::new();

    for rec in records {
        let entry = by_date.entry(rec.date).or_insert(InstitutionalFlow {
            date: rec.date,
            foreign_net: 0,
            trust_net: 0,
            dealer_net: 0,
        });
        let net = rec.buy - rec.sell;
        match rec.category {
            InvestorCategory::Foreign => entry.foreign_net += net,
            InvestorCategory::Trust => entry.trust_net += net,
            InvestorCategory::Dealer => entry.dealer_net += net,
        }
    }

    by_date.into_values().collect()
}
