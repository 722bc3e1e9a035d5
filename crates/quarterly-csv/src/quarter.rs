//! Column header resolution.

use quarterly_core::{Quarter, QuarterKey};

/// Shortest header token that can carry a year and a quarter label.
const MIN_TOKEN_LEN: usize = 6;

/// Header tokens that are never quarters.
const NON_QUARTER_TOKENS: [&str; 2] = ["", "LTM"];

/// Splits a header token into a year and a raw quarter label.
///
/// The first four bytes must parse as an integer year. Byte 4 is a
/// separator and the label is everything after it, taken verbatim, except
/// when byte 4 is itself the `Q` marker (`2023Q1`), in which case the marker
/// is kept as part of the label. Tokens shorter than six bytes are rejected.
///
/// The label is not validated here; see [`resolve_quarter`].
#[must_use]
pub fn split_quarter_token(token: &str) -> Option<(i32, &str)> {
    if token.len() < MIN_TOKEN_LEN {
        return None;
    }

    let year = token.get(..4)?.parse::<i32>().ok()?;
    let label_start = if matches!(token.as_bytes()[4], b'Q' | b'q') { 4 } else { 5 };
    let label = token.get(label_start..)?;

    Some((year, label))
}

/// Resolves a header token into a [`QuarterKey`].
///
/// Blank and `LTM` tokens are skipped, as is anything whose label is not one
/// of `Q1`..`Q4`.
///
/// # Example
/// ```
/// use quarterly_core::{Quarter, QuarterKey};
/// use quarterly_csv::resolve_quarter;
///
/// assert_eq!(resolve_quarter("2023Q1"), Some(QuarterKey::new(2023, Quarter::Q1)));
/// assert_eq!(resolve_quarter("2024-Q3"), Some(QuarterKey::new(2024, Quarter::Q3)));
/// assert_eq!(resolve_quarter("LTM"), None);
/// ```
#[must_use]
pub fn resolve_quarter(token: &str) -> Option<QuarterKey> {
    let token = token.trim();
    if NON_QUARTER_TOKENS.contains(&token) {
        return None;
    }

    let (year, label) = split_quarter_token(token)?;
    let quarter = label.parse::<Quarter>().ok()?;
    Some(QuarterKey::new(year, quarter))
}
