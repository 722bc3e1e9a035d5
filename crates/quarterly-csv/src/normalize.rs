//! Cell value normalization.

/// Cell contents that mean "no data" rather than a number.
const SENTINELS: [&str; 3] = ["", "-", "0.00"];

/// Turns a raw cell into a number.
///
/// Surrounding whitespace is trimmed, a decimal comma becomes a decimal
/// point, internal whitespace (thousands separators, including non-breaking
/// spaces) and quote characters are removed, and a trailing percent sign is
/// dropped. The literal sentinels `""`, `"-"` and `"0.00"` yield `None`, as
/// does anything that does not parse as a finite decimal number.
///
/// A plain `"0"` is *not* a sentinel and yields `Some(0.0)`.
///
/// # Example
/// ```
/// use quarterly_csv::normalize_value;
///
/// assert_eq!(normalize_value("1 234,56"), Some(1234.56));
/// assert_eq!(normalize_value("12,5%"), Some(12.5));
/// assert_eq!(normalize_value("-"), None);
/// ```
#[must_use]
pub fn normalize_value(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '"')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    let cleaned = cleaned.strip_suffix('%').unwrap_or(&cleaned);

    if SENTINELS.contains(&cleaned) {
        return None;
    }

    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}
