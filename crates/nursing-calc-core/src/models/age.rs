//! Gestational and corrected age models.

use serde::{Deserialize, Serialize};

/// Days in a full-term (40 week) pregnancy.
pub const FULL_TERM_DAYS: u32 = 40 * 7;

/// Gestational age at birth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GestationalAge {
    /// 22..=42
    pub weeks: u32,
    /// 0..=6
    pub days: u32,
}

impl GestationalAge {
    pub const MIN_WEEKS: u32 = 22;
    pub const MAX_WEEKS: u32 = 42;

    /// Whether weeks and days fall in the accepted entry range.
    pub fn is_valid(&self) -> bool {
        (Self::MIN_WEEKS..=Self::MAX_WEEKS).contains(&self.weeks) && self.days <= 6
    }

    pub fn total_days(&self) -> u32 {
        self.weeks * 7 + self.days
    }
}

/// A duration expressed as whole weeks plus remaining days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeksAndDays {
    pub weeks: u32,
    pub days: u32,
}

impl WeeksAndDays {
    pub fn from_days(total_days: u32) -> Self {
        Self {
            weeks: total_days / 7,
            days: total_days % 7,
        }
    }

    pub fn total_days(&self) -> u32 {
        self.weeks * 7 + self.days
    }
}

/// Age for developmental assessment of a preterm infant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdjustedAge {
    /// Infant has reached term-equivalent age; chronological age minus prematurity
    CorrectedAge(WeeksAndDays),
    /// Not yet term-equivalent; gestational age at birth plus chronological age
    PostMenstrualAge(WeeksAndDays),
}

impl AdjustedAge {
    pub fn value(&self) -> WeeksAndDays {
        match self {
            AdjustedAge::CorrectedAge(age) | AdjustedAge::PostMenstrualAge(age) => *age,
        }
    }
}

/// Chronological and adjusted age of a preterm infant on a given date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeAssessment {
    pub gestational_age: GestationalAge,
    pub chronological_days: u32,
    pub chronological: WeeksAndDays,
    pub adjusted: AdjustedAge,
}
