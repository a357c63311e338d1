//! Bilirubin threshold tables (µmol/L by hours of life).

use serde::{Deserialize, Serialize};

use crate::models::{AgeBand, BilirubinThresholdRow, RiskCategory, TcbThresholdRow};

use super::{ReferenceError, ReferenceResult};

/// TcB screening and SB treatment tables for both risk categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BilirubinTables {
    pub tcb_high_risk: Vec<TcbThresholdRow>,
    pub tcb_normal_risk: Vec<TcbThresholdRow>,
    pub sb_high_risk: Vec<BilirubinThresholdRow>,
    pub sb_normal_risk: Vec<BilirubinThresholdRow>,
}

impl Default for BilirubinTables {
    fn default() -> Self {
        Self::defaults()
    }
}

impl BilirubinTables {
    pub fn tcb_rows(&self, risk: RiskCategory) -> &[TcbThresholdRow] {
        match risk {
            RiskCategory::HighRisk => &self.tcb_high_risk,
            RiskCategory::NormalRisk => &self.tcb_normal_risk,
        }
    }

    pub fn sb_rows(&self, risk: RiskCategory) -> &[BilirubinThresholdRow] {
        match risk {
            RiskCategory::HighRisk => &self.sb_high_risk,
            RiskCategory::NormalRisk => &self.sb_normal_risk,
        }
    }

    /// TcB band containing `age_hours`, if any.
    pub fn tcb_band(&self, risk: RiskCategory, age_hours: f64) -> Option<&TcbThresholdRow> {
        find_band(self.tcb_rows(risk), age_hours)
    }

    /// SB band containing `age_hours`, if any.
    pub fn sb_band(&self, risk: RiskCategory, age_hours: f64) -> Option<&BilirubinThresholdRow> {
        find_band(self.sb_rows(risk), age_hours)
    }

    pub(crate) fn validate(&self) -> ReferenceResult<()> {
        validate_bands("tcb_high_risk", &self.tcb_high_risk)?;
        validate_bands("tcb_normal_risk", &self.tcb_normal_risk)?;
        validate_bands("sb_high_risk", &self.sb_high_risk)?;
        validate_bands("sb_normal_risk", &self.sb_normal_risk)?;
        validate_thresholds("sb_high_risk", &self.sb_high_risk)?;
        validate_thresholds("sb_normal_risk", &self.sb_normal_risk)?;
        Ok(())
    }

    /// Default tables. Normal-risk infants have no bands before 25 hours.
    pub fn defaults() -> Self {
        let tcb = TcbThresholdRow::new;
        let sb = BilirubinThresholdRow::new;

        Self {
            tcb_high_risk: vec![
                tcb(0.0, 12.0, 80.0),
                tcb(13.0, 24.0, 120.0),
                tcb(25.0, 36.0, 140.0),
                tcb(37.0, 48.0, 160.0),
                tcb(49.0, 72.0, 180.0),
                tcb(73.0, 96.0, 200.0),
                tcb(97.0, 120.0, 200.0),
                tcb(121.0, 168.0, 220.0),
                tcb(169.0, 336.0, 240.0),
            ],
            tcb_normal_risk: vec![
                tcb(25.0, 36.0, 160.0),
                tcb(37.0, 48.0, 180.0),
                tcb(49.0, 72.0, 200.0),
                tcb(73.0, 96.0, 220.0),
                tcb(97.0, 120.0, 220.0),
                tcb(121.0, 168.0, 240.0),
                tcb(169.0, 336.0, 250.0),
            ],
            sb_high_risk: vec![
                sb(0.0, 12.0, None, [100.0, 150.0, 175.0, 200.0]),
                sb(13.0, 24.0, None, [150.0, 200.0, 225.0, 250.0]),
                sb(25.0, 36.0, Some(135.0), [175.0, 225.0, 250.0, 275.0]),
                sb(37.0, 48.0, Some(160.0), [200.0, 250.0, 275.0, 300.0]),
                sb(49.0, 72.0, Some(185.0), [225.0, 275.0, 300.0, 325.0]),
                sb(73.0, 96.0, Some(210.0), [250.0, 300.0, 325.0, 350.0]),
                sb(97.0, 120.0, Some(210.0), [250.0, 300.0, 325.0, 350.0]),
                sb(121.0, 168.0, Some(235.0), [275.0, 325.0, 350.0, 375.0]),
                sb(169.0, 336.0, Some(260.0), [300.0, 325.0, 350.0, 375.0]),
            ],
            sb_normal_risk: vec![
                sb(25.0, 36.0, Some(160.0), [200.0, 250.0, 275.0, 300.0]),
                sb(37.0, 48.0, Some(185.0), [225.0, 300.0, 325.0, 350.0]),
                sb(49.0, 72.0, Some(210.0), [250.0, 300.0, 325.0, 350.0]),
                sb(73.0, 96.0, Some(235.0), [275.0, 325.0, 350.0, 375.0]),
                sb(97.0, 120.0, Some(235.0), [275.0, 350.0, 375.0, 400.0]),
                sb(121.0, 168.0, Some(260.0), [300.0, 350.0, 375.0, 400.0]),
                sb(169.0, 336.0, Some(285.0), [325.0, 375.0, 400.0, 425.0]),
            ],
        }
    }
}

/// Binary search for the band with low ≤ age ≤ high. Rows must be ascending and disjoint.
pub(crate) fn find_band<T: AgeBand>(rows: &[T], age: f64) -> Option<&T> {
    let idx = rows.partition_point(|row| row.age_low() <= age);
    idx.checked_sub(1)
        .map(|i| &rows[i])
        .filter(|row| age <= row.age_high())
}

fn validate_bands<T: AgeBand>(table: &'static str, rows: &[T]) -> ReferenceResult<()> {
    for row in rows {
        if !(row.age_low() >= 0.0 && row.age_low() <= row.age_high()) {
            return Err(ReferenceError::invalid(
                table,
                format!("band {}-{} h is not ordered", row.age_low(), row.age_high()),
            ));
        }
    }
    for pair in rows.windows(2) {
        if pair[1].age_low() <= pair[0].age_high() {
            return Err(ReferenceError::invalid(
                table,
                format!(
                    "band starting at {} h overlaps or precedes band ending at {} h",
                    pair[1].age_low(),
                    pair[0].age_high()
                ),
            ));
        }
    }
    Ok(())
}

/// Treatment thresholds must escalate so a higher SB never maps to a lower tier.
fn validate_thresholds(table: &'static str, rows: &[BilirubinThresholdRow]) -> ReferenceResult<()> {
    for row in rows {
        let ordered = row.single_therapy <= row.double_therapy
            && row.double_therapy <= row.intense_therapy
            && row.intense_therapy <= row.exchange
            && row.stop_phototherapy.map_or(true, |stop| stop < row.double_therapy);
        if !ordered {
            return Err(ReferenceError::invalid(
                table,
                format!(
                    "thresholds for {}-{} h do not escalate",
                    row.age_low_hours, row.age_high_hours
                ),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        BilirubinTables::defaults().validate().unwrap();
    }

    #[test]
    fn test_band_lookup_inclusive_ends() {
        let tables = BilirubinTables::defaults();
        let band = tables.sb_band(RiskCategory::HighRisk, 25.0).unwrap();
        assert_eq!(band.age_low_hours, 25.0);
        let band = tables.sb_band(RiskCategory::HighRisk, 36.0).unwrap();
        assert_eq!(band.age_high_hours, 36.0);
        let band = tables.sb_band(RiskCategory::HighRisk, 37.0).unwrap();
        assert_eq!(band.age_low_hours, 37.0);
    }

    #[test]
    fn test_band_lookup_misses() {
        let tables = BilirubinTables::defaults();
        // Normal-risk tables start at 25 hours
        assert!(tables.sb_band(RiskCategory::NormalRisk, 10.0).is_none());
        assert!(tables.tcb_band(RiskCategory::NormalRisk, 24.0).is_none());
        // Fractional hours between integer bands match nothing
        assert!(tables.sb_band(RiskCategory::HighRisk, 12.5).is_none());
        assert!(tables.sb_band(RiskCategory::HighRisk, 337.0).is_none());
        assert!(tables.sb_band(RiskCategory::HighRisk, -1.0).is_none());
        assert!(tables.sb_band(RiskCategory::HighRisk, f64::NAN).is_none());
    }

    #[test]
    fn test_overlapping_bands_rejected() {
        let mut tables = BilirubinTables::defaults();
        tables.tcb_high_risk[1].age_low_hours = 12.0;
        assert!(matches!(
            tables.validate(),
            Err(ReferenceError::Invalid { table: "tcb_high_risk", .. })
        ));
    }

    #[test]
    fn test_non_escalating_thresholds_rejected() {
        let mut tables = BilirubinTables::defaults();
        tables.sb_normal_risk[0].intense_therapy = 400.0;
        assert!(matches!(
            tables.validate(),
            Err(ReferenceError::Invalid { table: "sb_normal_risk", .. })
        ));
    }
}
