#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/quarterly/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Quarterly financial statement ingestion.
//!
//! This crate ties the pieces together: it re-exports the core types, the
//! CSV parser and the storage backends, and provides an [`Importer`] that
//! walks an export tree and upserts every record it finds.
//!
//! # Features
//!
//! - `sqlite` - SQLite-backed persistent store (default)
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use quarterly::{Importer, MetricSlot, SqliteStore};
//!
//! #[tokio::main]
//! async fn main() -> quarterly::Result<()> {
//!     let store = Arc::new(SqliteStore::new("financials.db")?);
//!     let summary = Importer::new(store.clone()).run("exports/").await?;
//!     println!("{} records written", summary.records_written);
//!
//!     let revenue = store.metric_series(MetricSlot::Revenue, &[]).await?;
//!     println!("{} revenue points", revenue.len());
//!     Ok(())
//! }
//! ```

/// Environment-driven configuration.
pub mod config;
/// Import orchestration.
pub mod importer;

// Core types and traits
pub use quarterly_core::*;

// Parser
pub use quarterly_csv::{ParseReport, parse_file, parse_tree};

// Stores
pub use quarterly_store::{InMemoryStore, NoopStore};
#[cfg(feature = "sqlite")]
pub use quarterly_store::SqliteStore;

pub use config::{Config, LogFormat};
pub use importer::{ImportSummary, Importer};
