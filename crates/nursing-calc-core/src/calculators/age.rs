//! Chronological, corrected and post-menstrual age.

use chrono::NaiveDate;

use crate::models::{AdjustedAge, AgeAssessment, GestationalAge, WeeksAndDays, FULL_TERM_DAYS};

use super::{invalid, CalcResult};

/// Whole days from date of birth to the current date.
pub fn chronological_age(date_of_birth: NaiveDate, current: NaiveDate) -> CalcResult<u32> {
    let days = current.signed_duration_since(date_of_birth).num_days();
    u32::try_from(days).map_err(|_| {
        invalid(format!(
            "current date {} is before date of birth {}",
            current, date_of_birth
        ))
    })
}

/// Corrected age once the infant reaches term-equivalent, post-menstrual age before that.
pub fn corrected_age(
    gestational_age: GestationalAge,
    chronological_days: u32,
) -> CalcResult<AdjustedAge> {
    if !gestational_age.is_valid() {
        return Err(invalid(format!(
            "gestational age {}+{} is outside {}-{} weeks, 0-6 days",
            gestational_age.weeks,
            gestational_age.days,
            GestationalAge::MIN_WEEKS,
            GestationalAge::MAX_WEEKS
        )));
    }

    let prematurity = i64::from(FULL_TERM_DAYS) - i64::from(gestational_age.total_days());
    let corrected = i64::from(chronological_days) - prematurity;

    match u32::try_from(corrected) {
        Ok(days) => Ok(AdjustedAge::CorrectedAge(WeeksAndDays::from_days(days))),
        Err(_) => Ok(AdjustedAge::PostMenstrualAge(WeeksAndDays::from_days(
            gestational_age.total_days() + chronological_days,
        ))),
    }
}

/// Chronological and adjusted age on `current` for an infant born on `date_of_birth`.
pub fn assess_age(
    date_of_birth: NaiveDate,
    current: NaiveDate,
    gestational_age: GestationalAge,
) -> CalcResult<AgeAssessment> {
    let chronological_days = chronological_age(date_of_birth, current)?;
    let adjusted = corrected_age(gestational_age, chronological_days)?;

    tracing::debug!(chronological_days, ?adjusted, "Assessed age");

    Ok(AgeAssessment {
        gestational_age,
        chronological_days,
        chronological: WeeksAndDays::from_days(chronological_days),
        adjusted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_chronological_age() {
        assert_eq!(chronological_age(date(2024, 1, 1), date(2024, 1, 1)), Ok(0));
        assert_eq!(chronological_age(date(2024, 1, 1), date(2024, 3, 1)), Ok(60));
        assert!(chronological_age(date(2024, 1, 2), date(2024, 1, 1)).is_err());
    }

    #[test]
    fn test_corrected_age_after_term() {
        // 32 weeks: 56 days premature; 100 days old = 44 days corrected
        let ga = GestationalAge { weeks: 32, days: 0 };
        assert_eq!(
            corrected_age(ga, 100),
            Ok(AdjustedAge::CorrectedAge(WeeksAndDays { weeks: 6, days: 2 }))
        );
    }

    #[test]
    fn test_post_menstrual_age_before_term() {
        // 30+3 weeks, 20 days old: PMA 213 + 20 = 233 days = 33+2
        let ga = GestationalAge { weeks: 30, days: 3 };
        assert_eq!(
            corrected_age(ga, 20),
            Ok(AdjustedAge::PostMenstrualAge(WeeksAndDays { weeks: 33, days: 2 }))
        );
    }

    #[test]
    fn test_exactly_term_equivalent() {
        let ga = GestationalAge { weeks: 36, days: 0 };
        assert_eq!(
            corrected_age(ga, 28),
            Ok(AdjustedAge::CorrectedAge(WeeksAndDays { weeks: 0, days: 0 }))
        );
    }

    #[test]
    fn test_post_term_infant() {
        // 41 weeks is 7 days past term, so corrected age is ahead of chronological
        let ga = GestationalAge { weeks: 41, days: 0 };
        assert_eq!(
            corrected_age(ga, 0),
            Ok(AdjustedAge::CorrectedAge(WeeksAndDays { weeks: 1, days: 0 }))
        );
    }

    #[test]
    fn test_invalid_gestational_age() {
        assert!(corrected_age(GestationalAge { weeks: 20, days: 0 }, 10).is_err());
        assert!(corrected_age(GestationalAge { weeks: 30, days: 9 }, 10).is_err());
    }

    #[test]
    fn test_assess_age() {
        let ga = GestationalAge { weeks: 28, days: 0 };
        let assessment = assess_age(date(2024, 1, 1), date(2024, 2, 5), ga).unwrap();
        assert_eq!(assessment.chronological_days, 35);
        assert_eq!(assessment.chronological, WeeksAndDays { weeks: 5, days: 0 });
        assert_eq!(
            assessment.adjusted,
            AdjustedAge::PostMenstrualAge(WeeksAndDays { weeks: 33, days: 0 })
        );
    }
}
