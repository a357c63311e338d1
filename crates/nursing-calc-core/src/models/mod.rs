//! Domain models for the nursing-calc system.

mod age;
mod bilirubin;
mod compatibility;
mod fluids;
mod medication;
mod vitals;

pub use age::*;
pub use bilirubin::*;
pub use compatibility::*;
pub use fluids::*;
pub use medication::*;
pub use vitals::*;

use thiserror::Error;

/// Failure to parse a categorical input supplied as text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unrecognised {kind}: {value:?}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Lowercase and drop whitespace so "IV / IM" and "iv/im" compare equal.
pub(crate) fn squash(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// An inclusive numeric range.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NormalRange {
    pub low: f64,
    pub high: f64,
}

impl NormalRange {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Where a value sits relative to the range. Both ends are inside.
    pub fn position(&self, value: f64) -> RangePosition {
        if value < self.low {
            RangePosition::Below
        } else if value > self.high {
            RangePosition::Above
        } else {
            RangePosition::Within
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.position(value) == RangePosition::Within
    }

    /// Multiply both ends, e.g. a per-kg range by body weight.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            low: self.low * factor,
            high: self.high * factor,
        }
    }
}

/// Result of comparing a value against a [`NormalRange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum RangePosition {
    Below,
    Within,
    Above,
}
