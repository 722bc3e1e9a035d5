//! Environment-driven configuration.

use std::path::PathBuf;
use std::str::FromStr;

use quarterly_core::{IngestError, Result};

/// Default SQLite database file.
pub const DEFAULT_DATABASE_PATH: &str = "financials.db";
/// Default log filter when `RUST_LOG` is not set.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Output format for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl FromStr for LogFormat {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(IngestError::InvalidParameter(format!(
                "unknown log format: {other}"
            ))),
        }
    }
}

/// Runtime settings for the `quarterly` binary.
///
/// Read from the process environment, after loading a `.env` file from the
/// working directory if one exists. Empty variables count as unset.
///
/// | Variable        | Default         |
/// |-----------------|-----------------|
/// | `CSV_PATH`      | none            |
/// | `DATABASE_PATH` | `financials.db` |
/// | `LOG_LEVEL`     | `info`          |
/// | `LOG_FORMAT`    | `text`          |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Root directory of the statement exports.
    pub csv_path: Option<PathBuf>,
    /// SQLite database file.
    pub database_path: PathBuf,
    /// Fallback log filter directive.
    pub log_level: String,
    /// Log line format.
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            csv_path: None,
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_format: LogFormat::default(),
        }
    }
}

impl Config {
    /// Load configuration from `.env` and the process environment.
    ///
    /// # Errors
    /// Returns [`IngestError::InvalidParameter`] for an unrecognized `LOG_FORMAT`.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    /// Returns [`IngestError::InvalidParameter`] for an unrecognized `LOG_FORMAT`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Ok(Self {
            csv_path: var("CSV_PATH").map(PathBuf::from),
            database_path: var("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            log_level: var("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_format: var("LOG_FORMAT")
                .map(|v| v.parse())
                .transpose()?
                .unwrap_or(defaults.log_format),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.database_path, PathBuf::from("financials.db"));
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("CSV_PATH", "/data/exports"),
            ("DATABASE_PATH", "/var/lib/fin.db"),
            ("LOG_LEVEL", "debug"),
            ("LOG_FORMAT", "JSON"),
        ]))
        .unwrap();

        assert_eq!(config.csv_path, Some(PathBuf::from("/data/exports")));
        assert_eq!(config.database_path, PathBuf::from("/var/lib/fin.db"));
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_empty_values_are_unset() {
        let config =
            Config::from_lookup(lookup(&[("CSV_PATH", ""), ("DATABASE_PATH", "  ")])).unwrap();
        assert_eq!(config.csv_path, None);
        assert_eq!(config.database_path, PathBuf::from(DEFAULT_DATABASE_PATH));
    }

    #[test]
    fn test_invalid_log_format() {
        let err = Config::from_lookup(lookup(&[("LOG_FORMAT", "xml")])).unwrap_err();
        assert!(matches!(err, IngestError::InvalidParameter(_)));
    }
}
