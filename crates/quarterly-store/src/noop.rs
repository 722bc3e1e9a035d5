//! No-op store implementation.

use async_trait::async_trait;
use quarterly_core::{
    CompanyCategory, CompanyMetric, DEFAULT_COMPANY_COLOR, FinancialStore, IngestError,
    MetricSlot, QuarterKey, QuarterRecord, Result,
};
use tracing::trace;

/// A store that accepts every write and remembers nothing.
///
/// All reads return empty results and all writes return `Ok(())`. Deleting a
/// company fails as it would for any unknown company.
/// Backs dry-run imports, where parsing is exercised end to end without
/// touching a database.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStore;

impl NoopStore {
    /// Create a new no-op store.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FinancialStore for NoopStore {
    async fn upsert(&self, record: &QuarterRecord) -> Result<()> {
        trace!(
            company = %record.company,
            key = %record.key(),
            "NoopStore: upsert called, doing nothing"
        );
        Ok(())
    }

    async fn get(&self, _company: &str, _key: QuarterKey) -> Result<Option<QuarterRecord>> {
        trace!("NoopStore: get called, returning None");
        Ok(None)
    }

    async fn metric_series(
        &self,
        _metric: MetricSlot,
        _companies: &[String],
    ) -> Result<Vec<CompanyMetric>> {
        trace!("NoopStore: metric_series called, returning nothing");
        Ok(Vec::new())
    }

    async fn companies(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    async fn categories(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    async fn companies_with_categories(&self) -> Result<Vec<CompanyCategory>> {
        Ok(Vec::new())
    }

    async fn delete_company(&self, company: &str) -> Result<usize> {
        trace!("NoopStore: delete_company called, nothing stored");
        Err(IngestError::InvalidParameter(format!(
            "company not found: {company}"
        )))
    }

    async fn company_note(&self, _company: &str) -> Result<Option<String>> {
        Ok(None)
    }

    async fn set_company_note(&self, _company: &str, _note: &str) -> Result<()> {
        trace!("NoopStore: set_company_note called, doing nothing");
        Ok(())
    }

    async fn delete_company_note(&self, _company: &str) -> Result<bool> {
        Ok(false)
    }

    async fn company_color(&self, _company: &str) -> Result<String> {
        Ok(DEFAULT_COMPANY_COLOR.to_string())
    }

    async fn set_company_color(&self, _company: &str, _color: &str) -> Result<()> {
        trace!("NoopStore: set_company_color called, doing nothing");
        Ok(())
    }

    async fn delete_company_color(&self, _company: &str) -> Result<bool> {
        Ok(false)
    }

    async fn clear(&self) -> Result<()> {
        trace!("NoopStore: clear called, doing nothing");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarterly_core::Quarter;

    #[tokio::test]
    async fn test_noop_store_forgets_writes() {
        let store = NoopStore::new();
        let key = QuarterKey::new(2023, Quarter::Q1);
        let record = QuarterRecord::new(key, "ACME", "Tech").with(MetricSlot::Revenue, 1.0);

        assert!(store.upsert(&record).await.is_ok());
        assert!(store.get("ACME", key).await.unwrap().is_none());
        assert!(store.metric_series(MetricSlot::Revenue, &[]).await.unwrap().is_empty());
        assert!(store.companies().await.unwrap().is_empty());
        assert!(store.clear().await.is_ok());
    }

    #[tokio::test]
    async fn test_noop_store_knows_no_company() {
        let store = NoopStore::new();

        let err = store.delete_company("ACME").await.unwrap_err();
        assert!(matches!(err, IngestError::InvalidParameter(_)));

        store.set_company_note("ACME", "note").await.unwrap();
        store.set_company_color("ACME", "#ffffff").await.unwrap();
        assert_eq!(store.company_note("ACME").await.unwrap(), None);
        assert_eq!(store.company_color("ACME").await.unwrap(), DEFAULT_COMPANY_COLOR);
        assert!(!store.delete_company_note("ACME").await.unwrap());
        assert!(!store.delete_company_color("ACME").await.unwrap());
    }
}
