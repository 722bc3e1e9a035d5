//! Calendar quarter definitions.
//!
//! This module defines [`Quarter`] for the four reporting periods of a year and
//! [`QuarterKey`], the `(year, quarter)` pair every record is keyed by.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the four reporting periods of a year.
///
/// Variants are declared in calendar order, so the derived ordering is
/// `Q1 < Q2 < Q3 < Q4`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Quarter {
    /// January through March.
    Q1,
    /// April through June.
    Q2,
    /// July through September.
    Q3,
    /// October through December.
    Q4,
}

impl Quarter {
    /// All quarters in calendar order.
    pub const ALL: [Self; 4] = [Self::Q1, Self::Q2, Self::Q3, Self::Q4];

    /// Returns the quarter number (1-4).
    #[must_use]
    pub const fn number(&self) -> u8 {
        match self {
            Self::Q1 => 1,
            Self::Q2 => 2,
            Self::Q3 => 3,
            Self::Q4 => 4,
        }
    }

    /// Returns the canonical label (`"Q1"` .. `"Q4"`).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Q1 => "Q1",
            Self::Q2 => "Q2",
            Self::Q3 => "Q3",
            Self::Q4 => "Q4",
        }
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a label is not one of `Q1`..`Q4`.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("not a quarter label: {0:?}")]
pub struct InvalidQuarter(pub String);

impl FromStr for Quarter {
    type Err = InvalidQuarter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Q1" | "q1" => Ok(Self::Q1),
            "Q2" | "q2" => Ok(Self::Q2),
            "Q3" | "q3" => Ok(Self::Q3),
            "Q4" | "q4" => Ok(Self::Q4),
            other => Err(InvalidQuarter(other.to_string())),
        }
    }
}

/// A `(year, quarter)` pair.
///
/// Ordered by year, then by quarter number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QuarterKey {
    /// Calendar year.
    pub year: i32,
    /// Quarter within the year.
    pub quarter: Quarter,
}

impl QuarterKey {
    /// Creates a new key.
    #[must_use]
    pub const fn new(year: i32, quarter: Quarter) -> Self {
        Self { year, quarter }
    }
}

impl fmt::Display for QuarterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.year, self.quarter)
    }
}
