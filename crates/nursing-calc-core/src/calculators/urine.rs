//! Urine output adequacy.

use crate::models::{UrineAgeGroup, UrineOutputAssessment, UrineOutputVerdict};

use super::{require_non_negative, require_positive, CalcResult};

/// Hourly output per kg from a 24 hour collection.
pub fn urine_output_rate(weight_kg: f64, urine_ml_24h: f64) -> CalcResult<f64> {
    let weight_kg = require_positive("weight_kg", weight_kg)?;
    let urine_ml_24h = require_non_negative("urine_ml_24h", urine_ml_24h)?;
    Ok(urine_ml_24h / weight_kg / 24.0)
}

/// Output is adequate only when strictly above the age group's threshold.
pub fn assess_urine_output(
    weight_kg: f64,
    urine_ml_24h: f64,
    age_group: UrineAgeGroup,
) -> CalcResult<UrineOutputAssessment> {
    let rate = urine_output_rate(weight_kg, urine_ml_24h)?;
    let threshold = age_group.adequate_above();
    let verdict = if rate > threshold {
        UrineOutputVerdict::Adequate
    } else {
        UrineOutputVerdict::Low
    };

    tracing::debug!(rate, ?age_group, ?verdict, "Assessed urine output");

    Ok(UrineOutputAssessment {
        ml_per_kg_per_hour: rate,
        age_group,
        threshold,
        verdict,
    })
}
