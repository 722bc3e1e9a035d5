//! SQLite-based store implementation.

use async_trait::async_trait;
use chrono::Utc;
use quarterly_core::{
    CompanyCategory, CompanyMetric, DEFAULT_COMPANY_COLOR, FinancialStore, IngestError,
    MetricSlot, Quarter, QuarterKey, QuarterRecord, Result, color_or_default, company_name,
};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, instrument};

const RECORD_COLUMNS: &str = "year, quarter, company, category, capitalization, revenue, \
                              net_profit, ebitda, debt, pe, roe";

/// SQLite-backed store for quarterly records.
///
/// Records live in a `company_financials` table keyed on
/// `(year, quarter, company)`. Each upsert is a single statement, so it is
/// atomic on its own; nothing groups several upserts together. Notes and
/// colors live in `company_meta`, one row per annotated company.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a store at the given path.
    ///
    /// # Arguments
    /// * `path` - Path to the SQLite database file
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or schema creation fails.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| IngestError::Store(e.to_string()))?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Create an in-memory store.
    ///
    /// Useful for testing; data is lost when the store is dropped.
    ///
    /// # Errors
    /// Returns an error if schema creation fails.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| IngestError::Store(e.to_string()))?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema.
    fn initialize_schema(&self) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| IngestError::Store(e.to_string()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS company_financials (
                year INTEGER NOT NULL,
                quarter TEXT NOT NULL,
                company TEXT NOT NULL,
                category TEXT NOT NULL,
                capitalization REAL,
                revenue REAL,
                net_profit REAL,
                ebitda REAL,
                debt REAL,
                pe REAL,
                roe REAL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (year, quarter, company)
            )",
            [],
        )
        .map_err(|e| IngestError::Store(e.to_string()))?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_company_financials_company
             ON company_financials(company)",
            [],
        )
        .map_err(|e| IngestError::Store(e.to_string()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS company_meta (
                company TEXT PRIMARY KEY,
                note TEXT,
                color TEXT
            )",
            [],
        )
        .map_err(|e| IngestError::Store(e.to_string()))?;

        debug!("SQLite store schema initialized");
        Ok(())
    }

    /// Build a record from a row selected with [`RECORD_COLUMNS`].
    fn record_from_row(row: &Row<'_>) -> rusqlite::Result<QuarterRecord> {
        Ok(QuarterRecord {
            year: row.get(0)?,
            quarter: Self::quarter_from_row(row, 1)?,
            company: row.get(2)?,
            category: row.get(3)?,
            capitalization: row.get(4)?,
            revenue: row.get(5)?,
            net_profit: row.get(6)?,
            ebitda: row.get(7)?,
            debt: row.get(8)?,
            pe: row.get(9)?,
            roe: row.get(10)?,
        })
    }

    /// Read a quarter label column.
    fn quarter_from_row(row: &Row<'_>, idx: usize) -> rusqlite::Result<Quarter> {
        let label: String = row.get(idx)?;
        label
            .parse::<Quarter>()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    }

    /// Run a query returning a single text column.
    fn query_strings(&self, sql: &str) -> Result<Vec<String>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| IngestError::Store(e.to_string()))?;

        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| IngestError::Store(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| IngestError::Store(e.to_string()))?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| IngestError::Store(e.to_string()))
    }

    /// Read one `company_meta` column. `column` is `note` or `color`.
    fn meta_value(&self, company: &str, column: &str) -> Result<Option<String>> {
        let company = company_name(company)?;
        let conn = self
            .conn
            .lock()
            .map_err(|e| IngestError::Store(e.to_string()))?;

        let value = conn
            .query_row(
                &format!("SELECT {column} FROM company_meta WHERE company = ?1"),
                params![company],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()
            .map_err(|e| IngestError::Store(e.to_string()))?;

        Ok(value.flatten())
    }

    fn set_meta_value(&self, company: &str, column: &str, value: &str) -> Result<()> {
        let company = company_name(company)?;
        let conn = self
            .conn
            .lock()
            .map_err(|e| IngestError::Store(e.to_string()))?;

        conn.execute(
            &format!(
                "INSERT INTO company_meta (company, {column}) VALUES (?1, ?2)
                 ON CONFLICT (company) DO UPDATE SET {column} = excluded.{column}"
            ),
            params![company, value],
        )
        .map_err(|e| IngestError::Store(e.to_string()))?;

        Ok(())
    }

    /// Null one `company_meta` column; rows left with nothing are removed.
    fn clear_meta_value(&self, company: &str, column: &str) -> Result<bool> {
        let company = company_name(company)?;
        let conn = self
            .conn
            .lock()
            .map_err(|e| IngestError::Store(e.to_string()))?;

        let cleared = conn
            .execute(
                &format!(
                    "UPDATE company_meta SET {column} = NULL
                     WHERE company = ?1 AND {column} IS NOT NULL"
                ),
                params![company],
            )
            .map_err(|e| IngestError::Store(e.to_string()))?;

        conn.execute(
            "DELETE FROM company_meta
             WHERE company = ?1 AND note IS NULL AND color IS NULL",
            params![company],
        )
        .map_err(|e| IngestError::Store(e.to_string()))?;

        Ok(cleared > 0)
    }
}

#[async_trait]
impl FinancialStore for SqliteStore {
    #[instrument(
        skip(self, record),
        fields(company = %record.company, year = record.year, quarter = %record.quarter)
    )]
    async fn upsert(&self, record: &QuarterRecord) -> Result<()> {
        let updated_at = Utc::now().to_rfc3339();

        let conn = self
            .conn
            .lock()
            .map_err(|e| IngestError::Store(e.to_string()))?;

        conn.execute(
            "INSERT INTO company_financials
             (year, quarter, company, category, capitalization, revenue, net_profit, ebitda, debt, pe, roe, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
             ON CONFLICT (year, quarter, company) DO UPDATE SET
                capitalization = COALESCE(excluded.capitalization, company_financials.capitalization),
                revenue = COALESCE(excluded.revenue, company_financials.revenue),
                net_profit = COALESCE(excluded.net_profit, company_financials.net_profit),
                ebitda = COALESCE(excluded.ebitda, company_financials.ebitda),
                debt = COALESCE(excluded.debt, company_financials.debt),
                pe = COALESCE(excluded.pe, company_financials.pe),
                roe = COALESCE(excluded.roe, company_financials.roe),
                updated_at = excluded.updated_at
             WHERE (excluded.capitalization IS NOT NULL
                    AND excluded.capitalization IS NOT company_financials.capitalization)
                OR (excluded.revenue IS NOT NULL
                    AND excluded.revenue IS NOT company_financials.revenue)
                OR (excluded.net_profit IS NOT NULL
                    AND excluded.net_profit IS NOT company_financials.net_profit)
                OR (excluded.ebitda IS NOT NULL
                    AND excluded.ebitda IS NOT company_financials.ebitda)
                OR (excluded.debt IS NOT NULL
                    AND excluded.debt IS NOT company_financials.debt)
                OR (excluded.pe IS NOT NULL
                    AND excluded.pe IS NOT company_financials.pe)
                OR (excluded.roe IS NOT NULL
                    AND excluded.roe IS NOT company_financials.roe)",
            params![
                record.year,
                record.quarter.as_str(),
                record.company,
                record.category,
                record.capitalization,
                record.revenue,
                record.net_profit,
                record.ebitda,
                record.debt,
                record.pe,
                record.roe,
                updated_at
            ],
        )
        .map_err(|e| IngestError::Store(e.to_string()))?;

        debug!("Upserted quarter record");
        Ok(())
    }

    #[instrument(skip(self), fields(key = %key))]
    async fn get(&self, company: &str, key: QuarterKey) -> Result<Option<QuarterRecord>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| IngestError::Store(e.to_string()))?;

        let record = conn
            .query_row(
                &format!(
                    "SELECT {RECORD_COLUMNS} FROM company_financials
                     WHERE company = ?1 AND year = ?2 AND quarter = ?3"
                ),
                params![company, key.year, key.quarter.as_str()],
                Self::record_from_row,
            )
            .optional()
            .map_err(|e| IngestError::Store(e.to_string()))?;

        Ok(record)
    }

    #[instrument(skip(self, companies), fields(metric = %metric, companies = companies.len()))]
    async fn metric_series(
        &self,
        metric: MetricSlot,
        companies: &[String],
    ) -> Result<Vec<CompanyMetric>> {
        // The column name comes from a closed enum, never from user input.
        let filter = if companies.is_empty() {
            String::new()
        } else {
            let placeholders: Vec<String> =
                (1..=companies.len()).map(|i| format!("?{i}")).collect();
            format!("WHERE company IN ({})", placeholders.join(","))
        };
        let sql = format!(
            "SELECT year, quarter, company, {column}
             FROM company_financials
             {filter}
             ORDER BY year,
                CASE quarter
                    WHEN 'Q1' THEN 1
                    WHEN 'Q2' THEN 2
                    WHEN 'Q3' THEN 3
                    WHEN 'Q4' THEN 4
                END,
                company",
            column = metric.column(),
        );

        let conn = self
            .conn
            .lock()
            .map_err(|e| IngestError::Store(e.to_string()))?;

        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| IngestError::Store(e.to_string()))?;

        let rows = stmt
            .query_map(params_from_iter(companies.iter()), |row| {
                Ok(CompanyMetric {
                    year: row.get(0)?,
                    quarter: Self::quarter_from_row(row, 1)?,
                    company: row.get(2)?,
                    value: row.get(3)?,
                })
            })
            .map_err(|e| IngestError::Store(e.to_string()))?;

        let series = rows
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| IngestError::Store(e.to_string()))?;

        debug!("Found {} {} points", series.len(), metric);
        Ok(series)
    }

    #[instrument(skip(self))]
    async fn companies(&self) -> Result<Vec<String>> {
        self.query_strings(
            "SELECT DISTINCT company FROM company_financials
             WHERE company IS NOT NULL AND company != ''
             ORDER BY company",
        )
    }

    #[instrument(skip(self))]
    async fn categories(&self) -> Result<Vec<String>> {
        self.query_strings(
            "SELECT DISTINCT category FROM company_financials
             WHERE category IS NOT NULL AND category != ''
             ORDER BY category",
        )
    }

    #[instrument(skip(self))]
    async fn companies_with_categories(&self) -> Result<Vec<CompanyCategory>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| IngestError::Store(e.to_string()))?;

        let mut stmt = conn
            .prepare(
                "SELECT DISTINCT company, category FROM company_financials
                 WHERE company != ''
                 ORDER BY company, category",
            )
            .map_err(|e| IngestError::Store(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                Ok(CompanyCategory {
                    company: row.get(0)?,
                    category: row.get(1)?,
                })
            })
            .map_err(|e| IngestError::Store(e.to_string()))?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| IngestError::Store(e.to_string()))
    }

    #[instrument(skip(self))]
    async fn delete_company(&self, company: &str) -> Result<usize> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| IngestError::Store(e.to_string()))?;

        let deleted = conn
            .execute(
                "DELETE FROM company_financials WHERE company = ?1",
                params![company],
            )
            .map_err(|e| IngestError::Store(e.to_string()))?;

        if deleted == 0 {
            return Err(IngestError::InvalidParameter(format!(
                "company not found: {company}"
            )));
        }

        debug!("Deleted {} records", deleted);
        Ok(deleted)
    }

    async fn company_note(&self, company: &str) -> Result<Option<String>> {
        self.meta_value(company, "note")
    }

    #[instrument(skip(self, note))]
    async fn set_company_note(&self, company: &str, note: &str) -> Result<()> {
        self.set_meta_value(company, "note", note)?;
        debug!("Saved company note");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_company_note(&self, company: &str) -> Result<bool> {
        self.clear_meta_value(company, "note")
    }

    async fn company_color(&self, company: &str) -> Result<String> {
        Ok(self
            .meta_value(company, "color")?
            .unwrap_or_else(|| DEFAULT_COMPANY_COLOR.to_string()))
    }

    #[instrument(skip(self))]
    async fn set_company_color(&self, company: &str, color: &str) -> Result<()> {
        self.set_meta_value(company, "color", color_or_default(color))?;
        debug!("Saved company color");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_company_color(&self, company: &str) -> Result<bool> {
        self.clear_meta_value(company, "color")
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| IngestError::Store(e.to_string()))?;

        conn.execute("DELETE FROM company_financials", [])
            .map_err(|e| IngestError::Store(e.to_string()))?;
        conn.execute("DELETE FROM company_meta", [])
            .map_err(|e| IngestError::Store(e.to_string()))?;

        debug!("Cleared all records");
        Ok(())
    }
}
