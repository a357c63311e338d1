use super::{require_non_negative, require_positive, CalcResult};

/// Body mass index, kg/m².
pub fn body_mass_index(weight_kg: f64, height_cm: f64) -> CalcResult<f64> {
    let weight_kg = require_non_negative("weight_kg", weight_kg)?;
    let height_m = require_positive("height_cm", height_cm)? / 100.0;
    Ok(weight_kg / (height_m * height_m))
}
