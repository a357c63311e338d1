//! Dose verification and dispensing volumes.

use crate::models::{
    DoseAssessment, DoseOrder, DoseStatus, DoseWarning, MedicationRule, RangePosition, Severity,
};

use super::{invalid, require_non_negative, require_positive, CalcResult};

/// Verify an ordered dose against a medication rule.
///
/// Every check runs independently, so contradictory warnings (below range and over a
/// cap) are all reported. Doses exactly on a range boundary are within range.
pub fn verify_dose(
    rule: &MedicationRule,
    order: &DoseOrder,
    severity: Severity,
) -> CalcResult<DoseAssessment> {
    let weight_kg = require_positive("weight_kg", order.weight_kg)?;
    let dose = require_non_negative("dose_ordered", order.dose_ordered)?;
    if order.frequency_per_day == 0 {
        return Err(invalid("frequency_per_day must be at least 1".into()));
    }

    let frequency = f64::from(order.frequency_per_day);
    let daily_total = order.daily_total();
    let Some(per_kg_per_day) = order.per_kg_per_day() else {
        return Err(invalid(format!("weight_kg must be greater than zero (got {})", weight_kg)));
    };
    let applied = rule.range_for(severity);

    let mut warnings = Vec::new();

    if let Some((range, _)) = applied {
        match range.position(per_kg_per_day) {
            RangePosition::Below => warnings.push(DoseWarning::BelowRecommendedRange),
            RangePosition::Above => warnings.push(DoseWarning::AboveRecommendedRange),
            RangePosition::Within => {}
        }
    }

    if rule.max_per_day.is_some_and(|max| daily_total > max) {
        warnings.push(DoseWarning::ExceedsMaximumDailyDose);
    }

    if rule.max_per_dose.is_some_and(|max| dose > max) {
        warnings.push(DoseWarning::ExceedsMaximumPerDose);
    }

    let status = if warnings.is_empty() {
        DoseStatus::WithinRange
    } else {
        DoseStatus::OutsideLimits
    };

    tracing::debug!(
        medication = %rule.name,
        route = %rule.route,
        per_kg_per_day,
        warnings = warnings.len(),
        "Verified dose"
    );

    Ok(DoseAssessment {
        status,
        warnings,
        range_basis: applied.map(|(_, basis)| basis),
        recommended_per_kg_per_day: applied.map(|(range, _)| range),
        recommended_per_day: applied.map(|(range, _)| range.scaled(weight_kg)),
        recommended_per_dose: applied.map(|(range, _)| range.scaled(weight_kg / frequency)),
        ordered_per_dose: dose,
        ordered_per_day: daily_total,
        ordered_per_kg_per_day: per_kg_per_day,
        unit: rule.unit.clone(),
        notes: rule.notes.clone(),
    })
}

/// Concentration of a stock preparation, per mL.
pub fn concentration_per_ml(strength: f64, volume_ml: f64) -> CalcResult<f64> {
    let strength = require_positive("strength", strength)?;
    let volume_ml = require_positive("volume_ml", volume_ml)?;
    Ok(strength / volume_ml)
}

/// Volume of stock to draw up for one ordered dose.
///
/// `strength` is the amount of drug contained in `volume_ml` of the preparation
/// (e.g. 250 mg in 5 mL).
pub fn volume_to_dispense(ordered_dose: f64, strength: f64, volume_ml: f64) -> CalcResult<f64> {
    let ordered_dose = require_non_negative("ordered_dose", ordered_dose)?;
    let concentration = concentration_per_ml(strength, volume_ml)?;
    Ok(ordered_dose / concentration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculators::CalcError;
    use crate::models::{DoseRange, DosingFrequency, MedicationCategory, Route};

    fn cephalexin() -> MedicationRule {
        MedicationRule::new("Cephalexin", Route::Oral, MedicationCategory::Antibiotics, "mg")
            .with_usual(25.0, 50.0)
            .with_severe(100.0, 150.0)
            .with_max_per_day(6000.0)
    }

    fn ciprofloxacin() -> MedicationRule {
        MedicationRule::new("Ciprofloxacin", Route::Oral, MedicationCategory::Antibiotics, "mg")
            .with_usual(20.0, 30.0)
            .with_severe(40.0, 40.0)
            .with_max_per_dose(750.0)
            .with_max_per_day(1500.0)
    }

    #[test]
    fn test_within_range() {
        // 10kg, 125mg Q8H = 37.5 mg/kg/day
        let order = DoseOrder::new(10.0, 125.0, DosingFrequency::Q8H);
        let result = verify_dose(&cephalexin(), &order, Severity::Usual).unwrap();

        assert!(result.is_within_range());
        assert!(result.warnings.is_empty());
        assert_eq!(result.ordered_per_day, 375.0);
        assert_eq!(result.ordered_per_kg_per_day, 37.5);
        assert_eq!(result.recommended_per_day, Some(DoseRange::new(250.0, 500.0)));
        assert_eq!(result.range_basis, Some(Severity::Usual));
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        // 10kg, 125mg Q12H = 25 mg/kg/day, exactly the low end
        let low = DoseOrder::new(10.0, 125.0, DosingFrequency::Q12H);
        assert!(verify_dose(&cephalexin(), &low, Severity::Usual)
            .unwrap()
            .is_within_range());

        // 10kg, 250mg Q12H = 50 mg/kg/day, exactly the high end
        let high = DoseOrder::new(10.0, 250.0, DosingFrequency::Q12H);
        assert!(verify_dose(&cephalexin(), &high, Severity::Usual)
            .unwrap()
            .is_within_range());
    }

    #[test]
    fn test_below_and_above() {
        let below = DoseOrder::new(10.0, 50.0, DosingFrequency::Q12H);
        let result = verify_dose(&cephalexin(), &below, Severity::Usual).unwrap();
        assert_eq!(result.warnings, vec![DoseWarning::BelowRecommendedRange]);
        assert_eq!(result.status, DoseStatus::OutsideLimits);

        let above = DoseOrder::new(10.0, 500.0, DosingFrequency::Q6H);
        let result = verify_dose(&cephalexin(), &above, Severity::Usual).unwrap();
        assert_eq!(result.warnings, vec![DoseWarning::AboveRecommendedRange]);
    }

    #[test]
    fn test_severe_range_applied() {
        // 10kg, 300mg Q6H = 120 mg/kg/day: above usual, within severe
        let order = DoseOrder::new(10.0, 300.0, DosingFrequency::Q6H);
        let usual = verify_dose(&cephalexin(), &order, Severity::Usual).unwrap();
        assert_eq!(usual.warnings, vec![DoseWarning::AboveRecommendedRange]);

        let severe = verify_dose(&cephalexin(), &order, Severity::Severe).unwrap();
        assert!(severe.is_within_range());
        assert_eq!(severe.range_basis, Some(Severity::Severe));
        assert_eq!(severe.recommended_per_dose, Some(DoseRange::new(250.0, 375.0)));
    }

    #[test]
    fn test_caps_reported_independently() {
        // 60kg, 1000mg Q12H = 33.3 mg/kg/day, and both caps are exceeded
        let order = DoseOrder::new(60.0, 1000.0, DosingFrequency::Q12H);
        let result = verify_dose(&ciprofloxacin(), &order, Severity::Usual).unwrap();
        assert_eq!(
            result.warnings,
            vec![
                DoseWarning::AboveRecommendedRange,
                DoseWarning::ExceedsMaximumDailyDose,
                DoseWarning::ExceedsMaximumPerDose,
            ]
        );
    }

    #[test]
    fn test_below_range_and_over_cap_both_reported() {
        // 100kg, 800mg Q12H = 16 mg/kg/day (below 20) but 800mg > 750mg per dose
        // and 1600mg > 1500mg per day
        let order = DoseOrder::new(100.0, 800.0, DosingFrequency::Q12H);
        let result = verify_dose(&ciprofloxacin(), &order, Severity::Usual).unwrap();
        assert_eq!(
            result.warnings,
            vec![
                DoseWarning::BelowRecommendedRange,
                DoseWarning::ExceedsMaximumDailyDose,
                DoseWarning::ExceedsMaximumPerDose,
            ]
        );
    }

    #[test]
    fn test_rule_without_range_checks_caps_only() {
        let rule = MedicationRule::new("Oseltamivir", Route::Oral, MedicationCategory::Antivirals, "mg")
            .with_max_per_dose(75.0);
        let order = DoseOrder::new(40.0, 75.0, DosingFrequency::Q12H);
        let result = verify_dose(&rule, &order, Severity::Usual).unwrap();
        assert!(result.is_within_range());
        assert_eq!(result.range_basis, None);
        assert_eq!(result.recommended_per_day, None);

        let over = DoseOrder::new(40.0, 90.0, DosingFrequency::Q12H);
        let result = verify_dose(&rule, &over, Severity::Usual).unwrap();
        assert_eq!(result.warnings, vec![DoseWarning::ExceedsMaximumPerDose]);
    }

    #[test]
    fn test_invalid_orders() {
        let rule = cephalexin();
        let zero_weight = DoseOrder::new(0.0, 125.0, DosingFrequency::Q8H);
        assert!(matches!(
            verify_dose(&rule, &zero_weight, Severity::Usual),
            Err(CalcError::InvalidInput(_))
        ));

        let negative_dose = DoseOrder::new(10.0, -1.0, DosingFrequency::Q8H);
        assert!(verify_dose(&rule, &negative_dose, Severity::Usual).is_err());

        let no_frequency = DoseOrder {
            weight_kg: 10.0,
            dose_ordered: 125.0,
            frequency_per_day: 0,
        };
        assert!(verify_dose(&rule, &no_frequency, Severity::Usual).is_err());
    }

    #[test]
    fn test_warning_wording() {
        assert_eq!(DoseWarning::BelowRecommendedRange.to_string(), "Below recommended range");
        assert_eq!(DoseWarning::ExceedsMaximumPerDose.to_string(), "Exceeds maximum per dose");
    }

    #[test]
    fn test_volume_to_dispense() {
        // 250mg in 5mL, 125mg ordered = 2.5mL
        assert_eq!(volume_to_dispense(125.0, 250.0, 5.0), Ok(2.5));
        assert_eq!(concentration_per_ml(250.0, 5.0), Ok(50.0));
    }

    #[test]
    fn test_volume_to_dispense_guards_division() {
        assert!(volume_to_dispense(125.0, 0.0, 5.0).is_err());
        assert!(volume_to_dispense(125.0, 250.0, 0.0).is_err());
        assert!(volume_to_dispense(125.0, -250.0, 5.0).is_err());
        assert!(volume_to_dispense(-1.0, 250.0, 5.0).is_err());
    }
}
