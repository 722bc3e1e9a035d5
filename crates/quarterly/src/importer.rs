//! Import orchestration: parse a source tree, then upsert what it yields.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use quarterly_core::{FinancialStore, IngestError, QuarterRecord, Result};
use quarterly_csv::parse_tree;

/// Counters describing one import run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Source files that parsed.
    pub files_parsed: usize,
    /// Source files that were skipped.
    pub files_failed: usize,
    /// Records produced by the parser.
    pub records_parsed: usize,
    /// Records the store accepted.
    pub records_written: usize,
    /// Records the store rejected.
    pub records_failed: usize,
}

/// Writes parsed records into a [`FinancialStore`].
///
/// Each record is an independent upsert: a rejected record is logged and
/// counted, and the run moves on. Cancellation is honoured between two
/// upserts, which leaves the store holding a valid partial import.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use quarterly::{Importer, SqliteStore};
///
/// let importer = Importer::new(Arc::new(SqliteStore::new("financials.db")?));
/// let summary = importer.run("exports/").await?;
/// println!("{} records written", summary.records_written);
/// ```
pub struct Importer {
    store: Arc<dyn FinancialStore>,
    cancel: Option<watch::Receiver<bool>>,
}

impl std::fmt::Debug for Importer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Importer")
            .field("store", &"configured")
            .field("cancellable", &self.cancel.is_some())
            .finish()
    }
}

impl Importer {
    /// Create an importer writing to `store`.
    #[must_use]
    pub fn new(store: Arc<dyn FinancialStore>) -> Self {
        Self {
            store,
            cancel: None,
        }
    }

    /// Stop writing once `cancel` turns `true`.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Returns the store records are written to.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn FinancialStore> {
        &self.store
    }

    /// Parse every source file under `root`, then upsert the records.
    ///
    /// Parsing completes on the calling thread before the first write.
    ///
    /// # Errors
    /// Returns [`IngestError::RootUnreadable`] if the tree cannot be walked,
    /// or [`IngestError::Cancelled`] if cancellation was requested.
    pub async fn run(&self, root: impl AsRef<Path>) -> Result<ImportSummary> {
        let report = parse_tree(root.as_ref())?;

        let mut summary = ImportSummary {
            files_parsed: report.files_parsed,
            files_failed: report.failures.len(),
            records_parsed: report.records.len(),
            ..Default::default()
        };

        let (written, failed) = self.write(&report.records).await?;
        summary.records_written = written;
        summary.records_failed = failed;

        info!(
            files_parsed = summary.files_parsed,
            files_failed = summary.files_failed,
            records_processed = summary.records_parsed,
            records_written = summary.records_written,
            records_failed = summary.records_failed,
            "Data import completed"
        );
        Ok(summary)
    }

    /// Upsert `records` one by one.
    ///
    /// Returns `(written, failed)`.
    ///
    /// # Errors
    /// Returns [`IngestError::Cancelled`] if cancellation was requested
    /// before all records were written.
    pub async fn write(&self, records: &[QuarterRecord]) -> Result<(usize, usize)> {
        let mut written = 0usize;
        let mut failed = 0usize;

        for record in records {
            if self.is_cancelled() {
                warn!(written, remaining = records.len() - written - failed, "Import cancelled");
                return Err(IngestError::Cancelled);
            }

            match self.store.upsert(record).await {
                Ok(()) => written += 1,
                Err(e) => {
                    warn!(
                        company = %record.company,
                        year = record.year,
                        quarter = %record.quarter,
                        error = %e,
                        "Failed to save quarter data"
                    );
                    failed += 1;
                }
            }
        }

        debug!(written, failed, "Finished writing records");
        Ok((written, failed))
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|rx| *rx.borrow())
    }
}
