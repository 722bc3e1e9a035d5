//! Core data types for quarterly financial statements.
//!
//! This module defines the fundamental data structures:
//!
//! - [`MetricSlot`] - One of the seven tracked financial figures
//! - [`QuarterRecord`] - All figures of one company for one quarter
//! - [`CompanyMetric`] - One point of a single-metric time series
//! - [`CompanyCategory`] - A company together with its category

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::IngestError;
use crate::quarter::{Quarter, QuarterKey};

/// Category assigned when a file name carries no category segment.
pub const UNKNOWN_CATEGORY: &str = "unknown";

/// The closed set of financial figures a row label can map to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricSlot {
    /// Market capitalization.
    Capitalization,
    /// Revenue.
    Revenue,
    /// Net profit.
    NetProfit,
    /// EBITDA.
    Ebitda,
    /// Debt.
    Debt,
    /// Price-to-earnings ratio.
    Pe,
    /// Return on equity, in percent.
    Roe,
}

impl MetricSlot {
    /// Every slot, in storage column order.
    pub const ALL: [Self; 7] = [
        Self::Capitalization,
        Self::Revenue,
        Self::NetProfit,
        Self::Ebitda,
        Self::Debt,
        Self::Pe,
        Self::Roe,
    ];

    /// Returns the storage column name.
    #[must_use]
    pub const fn column(&self) -> &'static str {
        match self {
            Self::Capitalization => "capitalization",
            Self::Revenue => "revenue",
            Self::NetProfit => "net_profit",
            Self::Ebitda => "ebitda",
            Self::Debt => "debt",
            Self::Pe => "pe",
            Self::Roe => "roe",
        }
    }

    /// Returns a human-readable name for reports and charts.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Capitalization => "Market Cap",
            Self::Revenue => "Revenue",
            Self::NetProfit => "Net Profit",
            Self::Ebitda => "EBITDA",
            Self::Debt => "Debt",
            Self::Pe => "P/E Ratio",
            Self::Roe => "ROE (%)",
        }
    }

    /// Returns the unit suffix used when rendering values.
    #[must_use]
    pub const fn unit(&self) -> &'static str {
        match self {
            Self::Roe => "%",
            _ => "",
        }
    }
}

impl fmt::Display for MetricSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for MetricSlot {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|slot| slot.column() == s)
            .ok_or_else(|| IngestError::InvalidParameter(format!("unknown metric: {s}")))
    }
}

/// All tracked figures of one company for one quarter.
///
/// Identity is `(year, quarter, company)`; `category` travels with the record
/// but is not part of it. Every figure is optional: `None` means "not
/// reported" and is distinct from a reported zero.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuarterRecord {
    /// Calendar year.
    pub year: i32,
    /// Quarter within the year.
    pub quarter: Quarter,
    /// Company name.
    pub company: String,
    /// Company category.
    pub category: String,
    /// Market capitalization.
    pub capitalization: Option<f64>,
    /// Revenue.
    pub revenue: Option<f64>,
    /// Net profit.
    pub net_profit: Option<f64>,
    /// EBITDA.
    pub ebitda: Option<f64>,
    /// Debt.
    pub debt: Option<f64>,
    /// Price-to-earnings ratio.
    pub pe: Option<f64>,
    /// Return on equity.
    pub roe: Option<f64>,
}

impl QuarterRecord {
    /// Creates an empty record with its identity filled in.
    #[must_use]
    pub fn new(key: QuarterKey, company: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            year: key.year,
            quarter: key.quarter,
            company: company.into(),
            category: category.into(),
            capitalization: None,
            revenue: None,
            net_profit: None,
            ebitda: None,
            debt: None,
            pe: None,
            roe: None,
        }
    }

    /// Returns the `(year, quarter)` part of the identity.
    #[must_use]
    pub const fn key(&self) -> QuarterKey {
        QuarterKey::new(self.year, self.quarter)
    }

    /// Returns the value stored in `slot`.
    #[must_use]
    pub const fn get(&self, slot: MetricSlot) -> Option<f64> {
        match slot {
            MetricSlot::Capitalization => self.capitalization,
            MetricSlot::Revenue => self.revenue,
            MetricSlot::NetProfit => self.net_profit,
            MetricSlot::Ebitda => self.ebitda,
            MetricSlot::Debt => self.debt,
            MetricSlot::Pe => self.pe,
            MetricSlot::Roe => self.roe,
        }
    }

    /// Stores `value` in `slot`, replacing whatever was there.
    pub fn set(&mut self, slot: MetricSlot, value: f64) {
        let field = match slot {
            MetricSlot::Capitalization => &mut self.capitalization,
            MetricSlot::Revenue => &mut self.revenue,
            MetricSlot::NetProfit => &mut self.net_profit,
            MetricSlot::Ebitda => &mut self.ebitda,
            MetricSlot::Debt => &mut self.debt,
            MetricSlot::Pe => &mut self.pe,
            MetricSlot::Roe => &mut self.roe,
        };
        *field = Some(value);
    }

    /// Builder-style variant of [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, slot: MetricSlot, value: f64) -> Self {
        self.set(slot, value);
        self
    }

    /// Returns true if no figure is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        MetricSlot::ALL.iter().all(|slot| self.get(*slot).is_none())
    }

    /// Merges `incoming` into `self` with upsert semantics.
    ///
    /// Every figure present in `incoming` replaces the stored one; absent
    /// figures leave the stored value untouched. Identity and category are
    /// not modified.
    pub fn merge_from(&mut self, incoming: &Self) {
        for slot in MetricSlot::ALL {
            if let Some(value) = incoming.get(slot) {
                self.set(slot, value);
            }
        }
    }
}

/// One point of a single-metric time series.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompanyMetric {
    /// Calendar year.
    pub year: i32,
    /// Quarter within the year.
    pub quarter: Quarter,
    /// Company name.
    pub company: String,
    /// Metric value, `None` when the quarter exists but the figure was never reported.
    pub value: Option<f64>,
}

/// A company together with the category it was imported under.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyCategory {
    /// Company name.
    pub company: String,
    /// Company category.
    pub category: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> QuarterKey {
        QuarterKey::new(2023, Quarter::Q1)
    }

    #[test]
    fn test_new_record_is_empty() {
        let record = QuarterRecord::new(key(), "ACME", "Tech");
        assert!(record.is_empty());
        assert_eq!(record.key(), key());
    }

    #[test]
    fn test_reported_zero_is_not_empty() {
        let record = QuarterRecord::new(key(), "ACME", "Tech").with(MetricSlot::Debt, 0.0);
        assert!(!record.is_empty());
        assert_eq!(record.debt, Some(0.0));
    }

    #[test]
    fn test_merge_keeps_existing_when_absent() {
        let mut stored = QuarterRecord::new(key(), "ACME", "Tech")
            .with(MetricSlot::Revenue, 10.0)
            .with(MetricSlot::Pe, 5.0);
        let incoming = QuarterRecord::new(key(), "ACME", "Other").with(MetricSlot::Pe, 6.5);

        stored.merge_from(&incoming);

        assert_eq!(stored.revenue, Some(10.0));
        assert_eq!(stored.pe, Some(6.5));
        assert_eq!(stored.category, "Tech");
    }

    #[test]
    fn test_metric_slot_names() {
        for slot in MetricSlot::ALL {
            assert_eq!(slot.column().parse::<MetricSlot>().unwrap(), slot);
        }
        assert_eq!(MetricSlot::Roe.unit(), "%");
        assert_eq!(MetricSlot::Pe.display_name(), "P/E Ratio");
        assert!("market_cap".parse::<MetricSlot>().is_err());
    }

    #[test]
    fn test_record_serializes_column_names() {
        let record = QuarterRecord::new(key(), "ACME", "Tech").with(MetricSlot::NetProfit, 1.5);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["net_profit"], 1.5);
        assert_eq!(json["quarter"], "Q1");
        assert!(json["roe"].is_null());

        let slot = serde_json::to_value(MetricSlot::Ebitda).unwrap();
        assert_eq!(slot, "ebitda");
    }
}
