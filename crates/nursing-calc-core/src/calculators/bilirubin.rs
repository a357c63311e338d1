//! Neonatal jaundice: TcB screening and serum bilirubin treatment tiers.

use chrono::{DateTime, TimeZone};

use crate::models::{
    BilirubinThresholdRow, PhototherapyTier, RiskCategory, RiskFactor, SbClassification,
    TcbScreening,
};
use crate::reference::BilirubinTables;

use super::{invalid, require_non_negative, CalcResult};

/// Classifies bilirubin results against a set of threshold tables.
#[derive(Debug, Clone, Copy)]
pub struct BilirubinEngine<'a> {
    tables: &'a BilirubinTables,
}

impl<'a> BilirubinEngine<'a> {
    pub fn new(tables: &'a BilirubinTables) -> Self {
        Self { tables }
    }

    /// Whether a TcB reading is above the screening threshold for its age band.
    ///
    /// An age outside every band returns `false`: no band means no recommendation.
    /// Use [`BilirubinEngine::screen_tcb`] to tell that apart from a normal reading.
    pub fn tcb_exceeds_threshold(&self, age_hours: f64, risk: RiskCategory, tcb: f64) -> bool {
        self.tables
            .tcb_band(risk, age_hours)
            .is_some_and(|band| tcb > band.threshold)
    }

    /// Screen a TcB reading, reporting the matched threshold.
    pub fn screen_tcb(
        &self,
        age_hours: f64,
        risk: RiskCategory,
        tcb: f64,
    ) -> CalcResult<TcbScreening> {
        check_age(age_hours)?;
        let tcb = require_non_negative("tcb", tcb)?;

        let threshold = self.tables.tcb_band(risk, age_hours).map(|band| band.threshold);
        if threshold.is_none() {
            tracing::debug!(age_hours, %risk, "TcB age outside every band");
        }

        Ok(TcbScreening {
            exceeds_threshold: threshold.is_some_and(|t| tcb > t),
            threshold,
            risk,
        })
    }

    /// Classify a serum bilirubin into a treatment tier.
    pub fn classify_sb(
        &self,
        age_hours: f64,
        sb: f64,
        on_phototherapy: bool,
        risk: RiskCategory,
    ) -> CalcResult<SbClassification> {
        check_age(age_hours)?;
        let sb = require_non_negative("sb", sb)?;

        let band = self.tables.sb_band(risk, age_hours).copied();
        let tier = match &band {
            Some(band) => sb_tier(band, sb, on_phototherapy),
            None => PhototherapyTier::OutOfRange,
        };

        tracing::debug!(age_hours, sb, on_phototherapy, %risk, ?tier, "Classified SB");

        Ok(SbClassification {
            tier,
            on_phototherapy,
            risk,
            band,
        })
    }
}

/// Inpatients may stop at or below the stop threshold; outpatients below the single
/// threshold keep monitoring. Everything else escalates on strict `<`.
fn sb_tier(band: &BilirubinThresholdRow, sb: f64, on_phototherapy: bool) -> PhototherapyTier {
    if on_phototherapy {
        if band.stop_phototherapy.is_some_and(|stop| sb <= stop) {
            return PhototherapyTier::StopPhototherapy;
        }
    } else if sb < band.single_therapy {
        return PhototherapyTier::ContinueMonitoring;
    }

    if sb < band.double_therapy {
        PhototherapyTier::SingleTherapy
    } else if sb < band.intense_therapy {
        PhototherapyTier::DoubleTherapy
    } else if sb < band.exchange {
        PhototherapyTier::IntenseTherapy
    } else {
        PhototherapyTier::ExchangeIndicated
    }
}

fn check_age(age_hours: f64) -> CalcResult<()> {
    if age_hours.is_finite() {
        Ok(())
    } else {
        Err(invalid(format!("age_hours must be finite (got {})", age_hours)))
    }
}

/// Age in hours between birth and now.
pub fn hours_of_life<Tz: TimeZone>(birth: &DateTime<Tz>, now: &DateTime<Tz>) -> CalcResult<f64> {
    let elapsed = now.clone().signed_duration_since(birth.clone());
    if elapsed.num_seconds() < 0 {
        return Err(invalid("current time is before birth".into()));
    }
    Ok(elapsed.num_seconds() as f64 / 3600.0)
}

/// Suggested risk category for the selected risk factors.
pub fn suggest_risk_category(risk_factors: &[RiskFactor]) -> RiskCategory {
    RiskCategory::suggest(risk_factors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone, Utc};

    fn engine() -> BilirubinEngine<'static> {
        BilirubinEngine::new(&crate::reference::ReferenceTables::builtin().bilirubin)
    }

    #[test]
    fn test_tcb_threshold() {
        let engine = engine();
        // High-risk 25-36h threshold is 140
        assert!(engine.tcb_exceeds_threshold(30.0, RiskCategory::HighRisk, 141.0));
        assert!(!engine.tcb_exceeds_threshold(30.0, RiskCategory::HighRisk, 140.0));
        // Band edges are inclusive
        assert!(engine.tcb_exceeds_threshold(36.0, RiskCategory::HighRisk, 141.0));
        assert!(engine.tcb_exceeds_threshold(25.0, RiskCategory::HighRisk, 141.0));
    }

    #[test]
    fn test_tcb_outside_bands_is_false() {
        let engine = engine();
        assert!(!engine.tcb_exceeds_threshold(10.0, RiskCategory::NormalRisk, 500.0));
        assert!(!engine.tcb_exceeds_threshold(400.0, RiskCategory::HighRisk, 500.0));
        assert!(!engine.tcb_exceeds_threshold(12.5, RiskCategory::HighRisk, 500.0));

        let screen = engine.screen_tcb(10.0, RiskCategory::NormalRisk, 500.0).unwrap();
        assert!(!screen.exceeds_threshold);
        assert!(screen.is_out_of_range());
    }

    #[test]
    fn test_screen_tcb_reports_threshold() {
        let screen = engine().screen_tcb(40.0, RiskCategory::NormalRisk, 190.0).unwrap();
        assert_eq!(screen.threshold, Some(180.0));
        assert!(screen.exceeds_threshold);
    }

    #[test]
    fn test_screen_tcb_rejects_negative() {
        assert!(engine().screen_tcb(40.0, RiskCategory::NormalRisk, -1.0).is_err());
        assert!(engine().screen_tcb(f64::NAN, RiskCategory::NormalRisk, 100.0).is_err());
    }

    #[test]
    fn test_outpatient_below_single_continues_monitoring() {
        // High-risk 25-36h: single 175
        let result = engine()
            .classify_sb(30.0, 160.0, false, RiskCategory::HighRisk)
            .unwrap();
        assert_eq!(result.tier, PhototherapyTier::ContinueMonitoring);
        assert_eq!(result.display_color(), "lightgreen");
    }

    #[test]
    fn test_outpatient_cascade() {
        let engine = engine();
        let tier = |sb| {
            engine
                .classify_sb(30.0, sb, false, RiskCategory::HighRisk)
                .unwrap()
                .tier
        };
        // single 175, double 225, intense 250, exchange 275
        assert_eq!(tier(175.0), PhototherapyTier::SingleTherapy);
        assert_eq!(tier(224.9), PhototherapyTier::SingleTherapy);
        assert_eq!(tier(225.0), PhototherapyTier::DoubleTherapy);
        assert_eq!(tier(250.0), PhototherapyTier::IntenseTherapy);
        assert_eq!(tier(275.0), PhototherapyTier::ExchangeIndicated);
    }

    #[test]
    fn test_inpatient_stop_is_inclusive() {
        let engine = engine();
        // High-risk 25-36h: stop 135
        let at_stop = engine
            .classify_sb(30.0, 135.0, true, RiskCategory::HighRisk)
            .unwrap();
        assert_eq!(at_stop.tier, PhototherapyTier::StopPhototherapy);

        let above_stop = engine
            .classify_sb(30.0, 136.0, true, RiskCategory::HighRisk)
            .unwrap();
        assert_eq!(above_stop.tier, PhototherapyTier::SingleTherapy);
        assert_eq!(above_stop.summary(), "Continue single blue phototherapy");
    }

    #[test]
    fn test_inpatient_without_stop_threshold() {
        // High-risk 0-12h has no stop threshold
        let result = engine()
            .classify_sb(6.0, 20.0, true, RiskCategory::HighRisk)
            .unwrap();
        assert_eq!(result.tier, PhototherapyTier::SingleTherapy);
    }

    #[test]
    fn test_sb_out_of_range() {
        let engine = engine();
        let result = engine
            .classify_sb(20.0, 300.0, false, RiskCategory::NormalRisk)
            .unwrap();
        assert_eq!(result.tier, PhototherapyTier::OutOfRange);
        assert_eq!(result.band, None);

        let gap = engine
            .classify_sb(12.5, 300.0, false, RiskCategory::HighRisk)
            .unwrap();
        assert_eq!(gap.tier, PhototherapyTier::OutOfRange);
    }

    #[test]
    fn test_sb_rejects_invalid() {
        assert!(engine()
            .classify_sb(30.0, -5.0, false, RiskCategory::HighRisk)
            .is_err());
        assert!(engine()
            .classify_sb(30.0, f64::INFINITY, false, RiskCategory::HighRisk)
            .is_err());
    }

    #[test]
    fn test_hours_of_life() {
        let birth = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 2, 20, 30, 0).unwrap();
        assert_eq!(hours_of_life(&birth, &now), Ok(36.5));
        assert_eq!(hours_of_life(&birth, &birth), Ok(0.0));
        assert!(hours_of_life(&now, &birth).is_err());
    }

    #[test]
    fn test_hours_of_life_with_offset() {
        let tz = FixedOffset::east_opt(8 * 3600).unwrap();
        let birth = tz.with_ymd_and_hms(2024, 3, 1, 23, 0, 0).unwrap();
        let now = tz.with_ymd_and_hms(2024, 3, 2, 1, 0, 0).unwrap();
        assert_eq!(hours_of_life(&birth, &now), Ok(2.0));
    }

    #[test]
    fn test_suggest_risk_category() {
        assert_eq!(suggest_risk_category(&[]), RiskCategory::NormalRisk);
        assert_eq!(
            suggest_risk_category(&[RiskFactor::AboIncompatibility, RiskFactor::Asphyxia]),
            RiskCategory::HighRisk
        );
    }
}
