//! Company identity from file names.

use std::path::Path;

use quarterly_core::UNKNOWN_CATEGORY;

/// Company name and category recovered from a source file name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileIdentity {
    /// Company name.
    pub company: String,
    /// Company category, [`UNKNOWN_CATEGORY`] when the name has none.
    pub category: String,
}

/// Derives company and category from the file stem.
///
/// The stem is the file name up to its last `.`, so a bare `.csv` has an
/// empty stem. The stem is split on `_`: the first segment is the company and the second
/// the category; further segments are ignored. A stem without `_` is the
/// company alone, with category `"unknown"`. No case folding or trimming is
/// applied.
///
/// # Example
/// ```
/// use quarterly_csv::extract_identity;
///
/// let identity = extract_identity("reports/ACME_Tech_2023.csv");
/// assert_eq!(identity.company, "ACME");
/// assert_eq!(identity.category, "Tech");
/// ```
#[must_use]
pub fn extract_identity(path: impl AsRef<Path>) -> FileIdentity {
    let name = path
        .as_ref()
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = match name.rfind('.') {
        Some(dot) => name[..dot].to_string(),
        None => name,
    };

    let mut segments = stem.split('_');
    if let (Some(company), Some(category)) = (segments.next(), segments.next()) {
        return FileIdentity {
            company: company.to_string(),
            category: category.to_string(),
        };
    }

    FileIdentity {
        company: stem,
        category: UNKNOWN_CATEGORY.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_company_and_category() {
        let identity = extract_identity("ACME_Tech_2023.csv");
        assert_eq!(identity.company, "ACME");
        assert_eq!(identity.category, "Tech");
    }

    #[test]
    fn test_missing_category() {
        let identity = extract_identity("/data/2023/ACME.csv");
        assert_eq!(identity.company, "ACME");
        assert_eq!(identity.category, "unknown");
    }

    #[test]
    fn test_no_normalization() {
        let identity = extract_identity("acme corp _Tech.CSV");
        assert_eq!(identity.company, "acme corp ");
        assert_eq!(identity.category, "Tech");

        let identity = extract_identity("_Tech.csv");
        assert_eq!(identity.company, "");
        assert_eq!(identity.category, "Tech");
    }

    #[test]
    fn test_only_last_extension_removed() {
        let identity = extract_identity("Сбербанк_Банки.backup.csv");
        assert_eq!(identity.company, "Сбербанк");
        assert_eq!(identity.category, "Банки.backup");
    }

    #[test]
    fn test_bare_extension_has_empty_company() {
        let identity = extract_identity("/data/.csv");
        assert_eq!(identity.company, "");
        assert_eq!(identity.category, "unknown");
    }
}
