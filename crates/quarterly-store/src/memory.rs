//! In-memory store implementation.

use async_trait::async_trait;
use quarterly_core::{
    CompanyCategory, CompanyMetric, DEFAULT_COMPANY_COLOR, FinancialStore, IngestError,
    MetricSlot, QuarterKey, QuarterRecord, Result, color_or_default, company_name,
};
use std::collections::{BTreeSet, HashMap};
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// Identity of a stored record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RecordKey {
    company: String,
    key: QuarterKey,
}

impl RecordKey {
    fn of(record: &QuarterRecord) -> Self {
        Self {
            company: record.company.clone(),
            key: record.key(),
        }
    }
}

/// Note and color of one company.
#[derive(Debug, Clone, Default)]
struct CompanyMeta {
    note: Option<String>,
    color: Option<String>,
}

impl CompanyMeta {
    const fn is_empty(&self) -> bool {
        self.note.is_none() && self.color.is_none()
    }
}

/// Simple in-memory store for testing and development.
///
/// Records are kept in a `RwLock`-protected `HashMap` and are lost when the
/// store is dropped. Merge semantics match [`SqliteStore`](crate::SqliteStore).
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: RwLock<HashMap<RecordKey, QuarterRecord>>,
    meta: RwLock<HashMap<String, CompanyMeta>>,
}

impl InMemoryStore {
    /// Create a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Returns true if nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Apply `clear` to one company's annotations, dropping the entry once
    /// nothing is left. Returns whether a value was removed.
    async fn clear_meta(
        &self,
        company: &str,
        clear: impl FnOnce(&mut CompanyMeta) -> Option<String>,
    ) -> Result<bool> {
        let company = company_name(company)?;
        let mut meta = self.meta.write().await;
        let Some(entry) = meta.get_mut(company) else {
            return Ok(false);
        };
        let removed = clear(entry).is_some();
        if entry.is_empty() {
            meta.remove(company);
        }
        Ok(removed)
    }
}

#[async_trait]
impl FinancialStore for InMemoryStore {
    #[instrument(
        skip(self, record),
        fields(company = %record.company, year = record.year, quarter = %record.quarter)
    )]
    async fn upsert(&self, record: &QuarterRecord) -> Result<()> {
        let mut records = self.records.write().await;
        records
            .entry(RecordKey::of(record))
            .and_modify(|stored| stored.merge_from(record))
            .or_insert_with(|| record.clone());
        debug!("Upserted quarter record");
        Ok(())
    }

    #[instrument(skip(self), fields(key = %key))]
    async fn get(&self, company: &str, key: QuarterKey) -> Result<Option<QuarterRecord>> {
        let lookup = RecordKey {
            company: company.to_string(),
            key,
        };
        Ok(self.records.read().await.get(&lookup).cloned())
    }

    #[instrument(skip(self, companies), fields(metric = %metric, companies = companies.len()))]
    async fn metric_series(
        &self,
        metric: MetricSlot,
        companies: &[String],
    ) -> Result<Vec<CompanyMetric>> {
        let records = self.records.read().await;
        let mut series: Vec<CompanyMetric> = records
            .values()
            .filter(|r| companies.is_empty() || companies.contains(&r.company))
            .map(|r| CompanyMetric {
                year: r.year,
                quarter: r.quarter,
                company: r.company.clone(),
                value: r.get(metric),
            })
            .collect();

        series.sort_by(|a, b| {
            (a.year, a.quarter, &a.company).cmp(&(b.year, b.quarter, &b.company))
        });
        debug!("Found {} {} points", series.len(), metric);
        Ok(series)
    }

    async fn companies(&self) -> Result<Vec<String>> {
        let records = self.records.read().await;
        let companies: BTreeSet<&str> = records
            .keys()
            .map(|k| k.company.as_str())
            .filter(|c| !c.is_empty())
            .collect();
        Ok(companies.into_iter().map(str::to_string).collect())
    }

    async fn categories(&self) -> Result<Vec<String>> {
        let records = self.records.read().await;
        let categories: BTreeSet<&str> = records
            .values()
            .map(|r| r.category.as_str())
            .filter(|c| !c.is_empty())
            .collect();
        Ok(categories.into_iter().map(str::to_string).collect())
    }

    async fn companies_with_categories(&self) -> Result<Vec<CompanyCategory>> {
        let records = self.records.read().await;
        let pairs: BTreeSet<(&str, &str)> = records
            .values()
            .filter(|r| !r.company.is_empty())
            .map(|r| (r.company.as_str(), r.category.as_str()))
            .collect();
        Ok(pairs
            .into_iter()
            .map(|(company, category)| CompanyCategory {
                company: company.to_string(),
                category: category.to_string(),
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn delete_company(&self, company: &str) -> Result<usize> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|k, _| k.company != company);
        let deleted = before - records.len();

        if deleted == 0 {
            return Err(IngestError::InvalidParameter(format!(
                "company not found: {company}"
            )));
        }

        debug!("Deleted {} records", deleted);
        Ok(deleted)
    }

    async fn company_note(&self, company: &str) -> Result<Option<String>> {
        let company = company_name(company)?;
        let meta = self.meta.read().await;
        Ok(meta.get(company).and_then(|m| m.note.clone()))
    }

    #[instrument(skip(self, note))]
    async fn set_company_note(&self, company: &str, note: &str) -> Result<()> {
        let company = company_name(company)?;
        let mut meta = self.meta.write().await;
        meta.entry(company.to_string()).or_default().note = Some(note.to_string());
        Ok(())
    }

    async fn delete_company_note(&self, company: &str) -> Result<bool> {
        self.clear_meta(company, |m| m.note.take()).await
    }

    async fn company_color(&self, company: &str) -> Result<String> {
        let company = company_name(company)?;
        let meta = self.meta.read().await;
        Ok(meta
            .get(company)
            .and_then(|m| m.color.clone())
            .unwrap_or_else(|| DEFAULT_COMPANY_COLOR.to_string()))
    }

    #[instrument(skip(self))]
    async fn set_company_color(&self, company: &str, color: &str) -> Result<()> {
        let company = company_name(company)?;
        let mut meta = self.meta.write().await;
        meta.entry(company.to_string()).or_default().color =
            Some(color_or_default(color).to_string());
        Ok(())
    }

    async fn delete_company_color(&self, company: &str) -> Result<bool> {
        self.clear_meta(company, |m| m.color.take()).await
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<()> {
        self.records.write().await.clear();
        self.meta.write().await.clear();
        debug!("Cleared all records");
        Ok(())
    }
}
