//! Fluid and feed volume models.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{squash, ParseEnumError};

/// Rehydration added on top of maintenance fluids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Rehydration {
    /// Maintenance only
    #[default]
    None,
    /// 3% dehydration: +30 mL/kg/day
    ThreePercent,
    /// 5% dehydration: +50 mL/kg/day
    FivePercent,
}

impl Rehydration {
    pub fn ml_per_kg_per_day(&self) -> f64 {
        match self {
            Rehydration::None => 0.0,
            Rehydration::ThreePercent => 30.0,
            Rehydration::FivePercent => 50.0,
        }
    }
}

impl FromStr for Rehydration {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match squash(s).as_str() {
            "none" | "maintenance" | "maintenanceonly" | "0%" => Ok(Rehydration::None),
            "3%" | "3" | "three" => Ok(Rehydration::ThreePercent),
            "5%" | "5" | "five" => Ok(Rehydration::FivePercent),
            _ => Err(ParseEnumError::new("rehydration", s)),
        }
    }
}

/// Daily fluid requirement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FluidRequirement {
    pub maintenance_ml_per_day: f64,
    pub rehydration_ml_per_day: f64,
    pub total_ml_per_day: f64,
    pub total_ml_per_hour: f64,
}

/// Neonatal feeding interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedInterval {
    TwoHourly,
    ThreeHourly,
}

impl FeedInterval {
    pub fn feeds_per_day(&self) -> u32 {
        match self {
            FeedInterval::TwoHourly => 12,
            FeedInterval::ThreeHourly => 8,
        }
    }
}

impl FromStr for FeedInterval {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match squash(s).as_str() {
            "2-hourly" | "2hourly" | "q2h" | "2" => Ok(FeedInterval::TwoHourly),
            "3-hourly" | "3hourly" | "q3h" | "3" => Ok(FeedInterval::ThreeHourly),
            _ => Err(ParseEnumError::new("feed interval", s)),
        }
    }
}

/// Feed volumes for a neonate on a given day of life.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeedPlan {
    pub ml_per_kg_per_day: f64,
    pub total_feed_ml_per_day: f64,
    pub feeds_per_day: u32,
    pub per_feed_ml: f64,
    /// Reference IV volume at 100 mL/kg/day; not combined with feeds
    pub iv_fluid_ml_per_day: f64,
}
