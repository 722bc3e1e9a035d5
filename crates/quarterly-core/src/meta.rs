//! Per-company annotations kept alongside the quarterly figures.

use crate::error::{IngestError, Result};

/// Color reported for a company that has none stored.
pub const DEFAULT_COMPANY_COLOR: &str = "#000000";

/// Returns `company` trimmed, rejecting names that are blank.
///
/// # Errors
/// Returns [`IngestError::InvalidParameter`] for an empty or blank name.
pub fn company_name(company: &str) -> Result<&str> {
    let trimmed = company.trim();
    if trimmed.is_empty() {
        return Err(IngestError::InvalidParameter(
            "company name is required".to_string(),
        ));
    }
    Ok(trimmed)
}

/// Returns `color` trimmed, or [`DEFAULT_COMPANY_COLOR`] when it is blank.
#[must_use]
pub fn color_or_default(color: &str) -> &str {
    match color.trim() {
        "" => DEFAULT_COMPANY_COLOR,
        trimmed => trimmed,
    }
}
