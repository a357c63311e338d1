//! Vital sign reference bands and assessment results.

use serde::{Deserialize, Serialize};

use super::{NormalRange, RangePosition};

/// Normal heart and respiratory rate ranges for an age band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VitalSignBand {
    /// Inclusive lower bound in years
    pub age_low_years: f64,
    /// Exclusive upper bound in years; `None` means unbounded
    #[serde(default)]
    pub age_high_years: Option<f64>,
    /// Beats per minute
    pub heart_rate: NormalRange,
    /// Breaths per minute
    pub respiratory_rate: NormalRange,
}

impl VitalSignBand {
    pub fn new(
        age_low_years: f64,
        age_high_years: Option<f64>,
        heart_rate: (f64, f64),
        respiratory_rate: (f64, f64),
    ) -> Self {
        Self {
            age_low_years,
            age_high_years,
            heart_rate: NormalRange::new(heart_rate.0, heart_rate.1),
            respiratory_rate: NormalRange::new(respiratory_rate.0, respiratory_rate.1),
        }
    }

    /// Half-open membership: low ≤ age < high.
    pub fn contains(&self, age_years: f64) -> bool {
        age_years >= self.age_low_years && self.age_high_years.map_or(true, |high| age_years < high)
    }
}

/// Observations to check. Absent values are not checked.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VitalSignsInput {
    pub age_years: f64,
    pub heart_rate: Option<i32>,
    pub respiratory_rate: Option<i32>,
    pub systolic_bp: Option<i32>,
    /// Measured temperature in °C, if febrile
    pub temperature_c: Option<f64>,
}

impl VitalSignsInput {
    pub fn new(age_years: f64) -> Self {
        Self {
            age_years,
            ..Self::default()
        }
    }

    /// Age entered in months for infants under one year.
    pub fn from_age_months(age_months: f64) -> Self {
        Self::new(age_months / 12.0)
    }

    pub fn heart_rate(mut self, bpm: i32) -> Self {
        self.heart_rate = Some(bpm);
        self
    }

    pub fn respiratory_rate(mut self, per_min: i32) -> Self {
        self.respiratory_rate = Some(per_min);
        self
    }

    pub fn systolic_bp(mut self, mmhg: i32) -> Self {
        self.systolic_bp = Some(mmhg);
        self
    }

    pub fn temperature(mut self, celsius: f64) -> Self {
        self.temperature_c = Some(celsius);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeartRateVerdict {
    Bradycardia,
    Normal,
    Tachycardia,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RespiratoryRateVerdict {
    Bradypnea,
    Normal,
    Tachypnea,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BloodPressureVerdict {
    Hypotension,
    Normal,
    Hypertension,
}

impl From<RangePosition> for HeartRateVerdict {
    fn from(position: RangePosition) -> Self {
        match position {
            RangePosition::Below => HeartRateVerdict::Bradycardia,
            RangePosition::Within => HeartRateVerdict::Normal,
            RangePosition::Above => HeartRateVerdict::Tachycardia,
        }
    }
}

impl From<RangePosition> for RespiratoryRateVerdict {
    fn from(position: RangePosition) -> Self {
        match position {
            RangePosition::Below => RespiratoryRateVerdict::Bradypnea,
            RangePosition::Within => RespiratoryRateVerdict::Normal,
            RangePosition::Above => RespiratoryRateVerdict::Tachypnea,
        }
    }
}

impl From<RangePosition> for BloodPressureVerdict {
    fn from(position: RangePosition) -> Self {
        match position {
            RangePosition::Below => BloodPressureVerdict::Hypotension,
            RangePosition::Within => BloodPressureVerdict::Normal,
            RangePosition::Above => BloodPressureVerdict::Hypertension,
        }
    }
}

/// Heart rate check with fever compensation applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeartRateCheck {
    pub raw: i32,
    /// Raw rate minus fever compensation; this is what was compared
    pub adjusted: i32,
    pub compensation: i32,
    pub normal_range: NormalRange,
    pub verdict: HeartRateVerdict,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RespiratoryRateCheck {
    pub value: i32,
    pub normal_range: NormalRange,
    pub verdict: RespiratoryRateVerdict,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BloodPressureCheck {
    pub value: i32,
    pub normal_range: NormalRange,
    pub verdict: BloodPressureVerdict,
}

/// Outcome of a vital signs check.
///
/// A `None` check means the reading was not supplied or the age matched no band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VitalsAssessment {
    pub band: Option<VitalSignBand>,
    pub heart_rate: Option<HeartRateCheck>,
    pub respiratory_rate: Option<RespiratoryRateCheck>,
    pub systolic_bp: Option<BloodPressureCheck>,
}

impl VitalsAssessment {
    /// Age matched none of the reference bands.
    pub fn is_out_of_range(&self) -> bool {
        self.band.is_none()
    }
}

/// Patient age grouping for urine output thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UrineAgeGroup {
    /// Under 28 days
    Neonate,
    /// 28 days and older
    Pediatric,
}

impl UrineAgeGroup {
    pub fn from_age_days(age_days: u32) -> Self {
        if age_days < 28 {
            UrineAgeGroup::Neonate
        } else {
            UrineAgeGroup::Pediatric
        }
    }

    /// Output must exceed this many mL/kg/hr to be adequate.
    pub fn adequate_above(&self) -> f64 {
        match self {
            UrineAgeGroup::Neonate => 0.5,
            UrineAgeGroup::Pediatric => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UrineOutputVerdict {
    Adequate,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UrineOutputAssessment {
    pub ml_per_kg_per_hour: f64,
    pub age_group: UrineAgeGroup,
    pub threshold: f64,
    pub verdict: UrineOutputVerdict,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_is_half_open() {
        let band = VitalSignBand::new(1.0, Some(6.0), (75.0, 130.0), (20.0, 30.0));
        assert!(band.contains(1.0));
        assert!(band.contains(5.99));
        assert!(!band.contains(6.0));
        assert!(!band.contains(0.5));
    }

    #[test]
    fn test_unbounded_band() {
        let band = VitalSignBand::new(15.0, None, (60.0, 100.0), (12.0, 20.0));
        assert!(band.contains(15.0));
        assert!(band.contains(90.0));
    }

    #[test]
    fn test_input_from_months() {
        let input = VitalSignsInput::from_age_months(3.0).heart_rate(150);
        assert_eq!(input.age_years, 0.25);
        assert_eq!(input.heart_rate, Some(150));
        assert_eq!(input.respiratory_rate, None);
    }

    #[test]
    fn test_urine_age_group_boundary() {
        assert_eq!(UrineAgeGroup::from_age_days(27), UrineAgeGroup::Neonate);
        assert_eq!(UrineAgeGroup::from_age_days(28), UrineAgeGroup::Pediatric);
    }
}
