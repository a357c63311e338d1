//! Age-banded heart and respiratory rate reference ranges.

use serde::{Deserialize, Serialize};

use crate::models::VitalSignBand;

use super::{ReferenceError, ReferenceResult};

/// Ascending, non-overlapping vital sign bands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalSignBands {
    pub bands: Vec<VitalSignBand>,
}

impl Default for VitalSignBands {
    fn default() -> Self {
        Self::defaults()
    }
}

impl VitalSignBands {
    /// First band with low ≤ age < high.
    pub fn band_for(&self, age_years: f64) -> Option<&VitalSignBand> {
        self.bands.iter().find(|band| band.contains(age_years))
    }

    pub(crate) fn validate(&self) -> ReferenceResult<()> {
        let last = self.bands.len().saturating_sub(1);
        for (i, band) in self.bands.iter().enumerate() {
            match band.age_high_years {
                Some(high) if !(band.age_low_years < high) => {
                    return Err(ReferenceError::invalid(
                        "vital_signs",
                        format!("band {}-{} years is empty", band.age_low_years, high),
                    ));
                }
                None if i != last => {
                    return Err(ReferenceError::invalid(
                        "vital_signs",
                        format!("only the last band may be open-ended (band {} is)", i),
                    ));
                }
                _ => {}
            }
            for range in [band.heart_rate, band.respiratory_rate] {
                if !(range.low <= range.high) {
                    return Err(ReferenceError::invalid(
                        "vital_signs",
                        format!("range {}-{} is not ordered", range.low, range.high),
                    ));
                }
            }
        }
        for pair in self.bands.windows(2) {
            if let Some(prev_high) = pair[0].age_high_years {
                if pair[1].age_low_years < prev_high {
                    return Err(ReferenceError::invalid(
                        "vital_signs",
                        format!("band starting at {} years overlaps the previous band", pair[1].age_low_years),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Default bands from birth into adulthood.
    pub fn defaults() -> Self {
        let band = VitalSignBand::new;
        Self {
            bands: vec![
                band(0.0, Some(3.0 / 12.0), (90.0, 180.0), (30.0, 60.0)),
                band(3.0 / 12.0, Some(6.0 / 12.0), (80.0, 160.0), (30.0, 60.0)),
                band(6.0 / 12.0, Some(1.0), (80.0, 140.0), (25.0, 45.0)),
                band(1.0, Some(6.0), (75.0, 130.0), (20.0, 30.0)),
                band(6.0, Some(10.0), (70.0, 110.0), (16.0, 24.0)),
                band(10.0, Some(15.0), (60.0, 100.0), (14.0, 20.0)),
                band(15.0, None, (60.0, 100.0), (12.0, 20.0)),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let bands = VitalSignBands::defaults();
        bands.validate().unwrap();
        assert_eq!(bands.bands.len(), 7);
    }

    #[test]
    fn test_band_boundaries() {
        let bands = VitalSignBands::defaults();
        assert_eq!(bands.band_for(0.0).unwrap().heart_rate.low, 90.0);
        assert_eq!(bands.band_for(0.25).unwrap().heart_rate.low, 80.0);
        assert_eq!(bands.band_for(1.0).unwrap().heart_rate.low, 75.0);
        assert_eq!(bands.band_for(5.99).unwrap().heart_rate.low, 75.0);
        assert_eq!(bands.band_for(6.0).unwrap().heart_rate.low, 70.0);
        assert_eq!(bands.band_for(15.0).unwrap().respiratory_rate.low, 12.0);
        assert_eq!(bands.band_for(250.0).unwrap().respiratory_rate.low, 12.0);
    }

    #[test]
    fn test_negative_age_has_no_band() {
        let bands = VitalSignBands::defaults();
        assert!(bands.band_for(-0.1).is_none());
        assert!(bands.band_for(f64::NAN).is_none());
    }

    #[test]
    fn test_open_band_must_be_last() {
        let mut bands = VitalSignBands::defaults();
        bands.bands[2].age_high_years = None;
        assert!(bands.validate().is_err());
    }

    #[test]
    fn test_overlap_rejected() {
        let mut bands = VitalSignBands::defaults();
        bands.bands[4].age_low_years = 5.0;
        assert!(bands.validate().is_err());
    }
}
