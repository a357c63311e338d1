//! Vital sign range checking with fever compensation.

use crate::models::{
    BloodPressureCheck, HeartRateCheck, NormalRange, RespiratoryRateCheck, VitalSignsInput,
    VitalsAssessment,
};
use crate::reference::VitalSignBands;

use super::{invalid, CalcResult};

/// Body temperature above which heart rate is compensated, °C.
pub const FEVER_THRESHOLD_C: f64 = 37.0;

/// Systolic pressure ceiling for all ages, mmHg.
const SBP_HIGH: f64 = 120.0;

/// Classifies observations against age-banded reference ranges.
#[derive(Debug, Clone, Copy)]
pub struct VitalSignsEvaluator<'a> {
    bands: &'a VitalSignBands,
}

impl<'a> VitalSignsEvaluator<'a> {
    pub fn new(bands: &'a VitalSignBands) -> Self {
        Self { bands }
    }

    /// Check every supplied observation.
    ///
    /// Heart and respiratory rates are only checked when the age falls in a band.
    /// Systolic pressure has its own age formula and is checked whenever supplied.
    /// Negative readings and non-finite ages or temperatures are rejected.
    pub fn classify(&self, input: &VitalSignsInput) -> CalcResult<VitalsAssessment> {
        validate(input)?;

        let band = self.bands.band_for(input.age_years).copied();
        if band.is_none() {
            tracing::debug!(age_years = input.age_years, "Age outside every vital sign band");
        }

        let heart_rate = band.zip(input.heart_rate).map(|(band, raw)| {
            let compensation = fever_compensation(input.temperature_c);
            let adjusted = raw.saturating_sub(compensation);
            HeartRateCheck {
                raw,
                adjusted,
                compensation,
                normal_range: band.heart_rate,
                verdict: band.heart_rate.position(f64::from(adjusted)).into(),
            }
        });

        let respiratory_rate = band
            .zip(input.respiratory_rate)
            .map(|(band, value)| RespiratoryRateCheck {
                value,
                normal_range: band.respiratory_rate,
                verdict: band.respiratory_rate.position(f64::from(value)).into(),
            });

        let systolic_bp = sbp_range(input.age_years)
            .zip(input.systolic_bp)
            .map(|(range, value)| BloodPressureCheck {
                value,
                normal_range: range,
                verdict: range.position(f64::from(value)).into(),
            });

        Ok(VitalsAssessment {
            band,
            heart_rate,
            respiratory_rate,
            systolic_bp,
        })
    }
}

fn validate(input: &VitalSignsInput) -> CalcResult<()> {
    if !input.age_years.is_finite() {
        return Err(invalid(format!("age_years must be finite (got {})", input.age_years)));
    }
    if let Some(t) = input.temperature_c {
        if !(t.is_finite() && t > 0.0) {
            return Err(invalid(format!("temperature_c must be greater than zero (got {})", t)));
        }
    }
    let readings = [
        ("heart_rate", input.heart_rate),
        ("respiratory_rate", input.respiratory_rate),
        ("systolic_bp", input.systolic_bp),
    ];
    for (field, value) in readings {
        if let Some(v) = value.filter(|v| *v < 0) {
            return Err(invalid(format!("{} must not be negative (got {})", field, v)));
        }
    }
    Ok(())
}

/// Beats per minute to subtract from a febrile heart rate.
///
/// 10 bpm per degree above 37 °C, truncated toward zero.
pub fn fever_compensation(temperature_c: Option<f64>) -> i32 {
    match temperature_c {
        Some(t) if t > FEVER_THRESHOLD_C => ((t - FEVER_THRESHOLD_C) * 10.0) as i32,
        _ => 0,
    }
}

/// Normal systolic pressure for an age in years: (age × 2 + 70)-120 under 10, 90-120 after.
pub fn sbp_range(age_years: f64) -> Option<NormalRange> {
    if !(age_years >= 0.0) {
        return None;
    }
    let low = if age_years < 10.0 {
        age_years * 2.0 + 70.0
    } else {
        90.0
    };
    Some(NormalRange::new(low, SBP_HIGH))
}
