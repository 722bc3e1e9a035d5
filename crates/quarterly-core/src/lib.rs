#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/quarterly/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core types and the storage contract for quarterly financial statements.
//!
//! This crate provides the foundational abstractions shared by the parser and
//! the storage backends:
//!
//! - [`QuarterRecord`](types::QuarterRecord) - One company, one quarter, seven optional figures
//! - [`MetricSlot`](types::MetricSlot) - The closed vocabulary of tracked figures
//! - [`QuarterKey`](quarter::QuarterKey) - Totally ordered `(year, quarter)` pair
//! - [`FinancialStore`](store::FinancialStore) - Upsert-with-merge storage abstraction

/// Error types for ingestion and storage.
pub mod error;
/// Per-company notes and colors.
pub mod meta;
/// Quarter and quarter-key definitions.
pub mod quarter;
/// Storage trait.
pub mod store;
/// Core data types (records, metric slots, series points).
pub mod types;

// Re-export commonly used items at crate root
pub use error::{FileError, IngestError, Result};
pub use meta::{DEFAULT_COMPANY_COLOR, color_or_default, company_name};
pub use quarter::{InvalidQuarter, Quarter, QuarterKey};
pub use store::FinancialStore;
pub use types::{CompanyCategory, CompanyMetric, MetricSlot, QuarterRecord, UNKNOWN_CATEGORY};
