//! Storage contract for quarterly records.
//!
//! This module defines the [`FinancialStore`] trait: the upsert-with-merge
//! write path the importer relies on, plus the read interface consumed by
//! reporting front ends.

use async_trait::async_trait;

use crate::{
    error::Result,
    quarter::QuarterKey,
    types::{CompanyCategory, CompanyMetric, MetricSlot, QuarterRecord},
};

/// Trait for persisting and querying quarterly records.
///
/// Records are keyed uniquely on `(year, quarter, company)`. Implementations
/// are responsible for making each [`upsert`](Self::upsert) atomic; no
/// multi-record atomicity is expected.
#[async_trait]
pub trait FinancialStore: Send + Sync {
    /// Inserts `record` or merges it into the stored one.
    ///
    /// On conflict every figure present in `record` replaces the stored value
    /// and every absent figure keeps the stored value. The category is written
    /// on insert only.
    async fn upsert(&self, record: &QuarterRecord) -> Result<()>;

    /// Retrieves the stored record for `company` in `key`.
    ///
    /// Returns `Ok(None)` if nothing is stored under that identity.
    async fn get(&self, company: &str, key: QuarterKey) -> Result<Option<QuarterRecord>>;

    /// Returns one metric as a time series.
    ///
    /// Rows are ordered by year, then quarter number, then company. An empty
    /// `companies` slice selects every company.
    async fn metric_series(
        &self,
        metric: MetricSlot,
        companies: &[String],
    ) -> Result<Vec<CompanyMetric>>;

    /// Returns distinct non-empty company names in lexical order.
    async fn companies(&self) -> Result<Vec<String>>;

    /// Returns distinct categories in lexical order.
    async fn categories(&self) -> Result<Vec<String>>;

    /// Returns every company with its category, ordered by company.
    async fn companies_with_categories(&self) -> Result<Vec<CompanyCategory>>;

    /// Removes every record of `company`.
    ///
    /// Returns the number of records removed, or
    /// [`IngestError::InvalidParameter`](crate::IngestError::InvalidParameter)
    /// if the company is unknown. A store that keeps no records knows no
    /// company and always returns the error. The company's note and color
    /// are left in place.
    async fn delete_company(&self, company: &str) -> Result<usize>;

    /// Returns the note stored for `company`, if any.
    async fn company_note(&self, company: &str) -> Result<Option<String>>;

    /// Stores `note` for `company`, replacing any previous note.
    ///
    /// The company name is trimmed and must not be blank; the note is stored
    /// as given.
    async fn set_company_note(&self, company: &str, note: &str) -> Result<()>;

    /// Removes the note of `company`. Returns whether one was stored.
    async fn delete_company_note(&self, company: &str) -> Result<bool>;

    /// Returns the color stored for `company`, or
    /// [`DEFAULT_COMPANY_COLOR`](crate::DEFAULT_COMPANY_COLOR).
    async fn company_color(&self, company: &str) -> Result<String>;

    /// Stores `color` for `company`.
    ///
    /// A blank color stores [`DEFAULT_COMPANY_COLOR`](crate::DEFAULT_COMPANY_COLOR).
    async fn set_company_color(&self, company: &str, color: &str) -> Result<()>;

    /// Removes the color of `company`. Returns whether one was stored.
    async fn delete_company_color(&self, company: &str) -> Result<bool>;

    /// Clears all stored data, notes and colors included.
    async fn clear(&self) -> Result<()>;
}
