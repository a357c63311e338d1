//! Maintenance fluids and neonatal feed volumes.

use crate::models::{FeedInterval, FeedPlan, FluidRequirement, Rehydration};

use super::{invalid, require_positive, CalcResult};

/// Reference IV volume for neonates, mL/kg/day.
const NEONATAL_IV_ML_PER_KG_PER_DAY: f64 = 100.0;

/// Holliday-Segar daily maintenance volume in mL.
///
/// 100 mL/kg for the first 10 kg, 50 mL/kg for the next 10 kg and 20 mL/kg above that.
pub fn maintenance_fluid(weight_kg: f64) -> CalcResult<f64> {
    let weight_kg = require_positive("weight_kg", weight_kg)?;
    let volume = if weight_kg <= 10.0 {
        weight_kg * 100.0
    } else if weight_kg <= 20.0 {
        1000.0 + (weight_kg - 10.0) * 50.0
    } else {
        1500.0 + (weight_kg - 20.0) * 20.0
    };
    Ok(volume)
}

/// Maintenance plus any rehydration, with the hourly infusion rate.
pub fn fluid_requirement(weight_kg: f64, rehydration: Rehydration) -> CalcResult<FluidRequirement> {
    let maintenance = maintenance_fluid(weight_kg)?;
    let rehydration_volume = weight_kg * rehydration.ml_per_kg_per_day();
    let total = maintenance + rehydration_volume;

    tracing::debug!(weight_kg, ?rehydration, total, "Computed fluid requirement");

    Ok(FluidRequirement {
        maintenance_ml_per_day: maintenance,
        rehydration_ml_per_day: rehydration_volume,
        total_ml_per_day: total,
        total_ml_per_hour: total / 24.0,
    })
}

/// Enteral feed target by day of life, mL/kg/day.
///
/// Day 1 is the day of birth. Day 4 onwards stays at full feeds.
pub fn feed_ml_per_kg_per_day(day_of_life: u32) -> CalcResult<f64> {
    match day_of_life {
        0 => Err(invalid("day_of_life starts at 1".into())),
        1 => Ok(60.0),
        2 => Ok(90.0),
        3 => Ok(120.0),
        _ => Ok(150.0),
    }
}

/// Daily and per-feed volumes for a neonate.
pub fn neonatal_feeds(
    weight_kg: f64,
    day_of_life: u32,
    interval: FeedInterval,
) -> CalcResult<FeedPlan> {
    let weight_kg = require_positive("weight_kg", weight_kg)?;
    let rate = feed_ml_per_kg_per_day(day_of_life)?;
    let feeds_per_day = interval.feeds_per_day();
    let total = weight_kg * rate;

    Ok(FeedPlan {
        ml_per_kg_per_day: rate,
        total_feed_ml_per_day: total,
        feeds_per_day,
        per_feed_ml: total / f64::from(feeds_per_day),
        iv_fluid_ml_per_day: weight_kg * NEONATAL_IV_ML_PER_KG_PER_DAY,
    })
}
