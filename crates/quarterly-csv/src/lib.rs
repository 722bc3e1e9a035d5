#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/quarterly/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Extraction of quarterly figures from statement exports.
//!
//! The pipeline, leaf first:
//!
//! - [`normalize_value`] - Raw cell text to a number, or "no data"
//! - [`resolve_quarter`] - Header token to a [`QuarterKey`](quarterly_core::QuarterKey)
//! - [`classify_label`] - Row label to a [`MetricSlot`](quarterly_core::MetricSlot)
//! - [`extract_identity`] - File name to company and category
//! - [`parse_tree`] / [`parse_file`] - Files to [`QuarterRecord`](quarterly_core::QuarterRecord)s
//!
//! # Example
//!
//! ```no_run
//! use quarterly_csv::parse_tree;
//!
//! fn main() -> quarterly_core::Result<()> {
//!     let report = parse_tree("exports/")?;
//!     for failure in &report.failures {
//!         eprintln!("skipped: {failure}");
//!     }
//!     println!("{} records", report.records.len());
//!     Ok(())
//! }
//! ```

/// Row label classification.
pub mod classify;
/// Company identity from file names.
pub mod identity;
/// Cell value normalization.
pub mod normalize;
/// Header token resolution.
pub mod quarter;
/// Directory walking and record assembly.
pub mod walker;

pub use classify::{SKIPPED_LABELS, classify_label, is_skipped_label};
pub use identity::{FileIdentity, extract_identity};
pub use normalize::normalize_value;
pub use quarter::{resolve_quarter, split_quarter_token};
pub use walker::{
    DELIMITER, ParseReport, RawTable, assemble, is_source_file, parse_file, parse_tree, read_table,
};
