//! Medication formulary with keyed lookup and fuzzy name search.

use serde::{Deserialize, Serialize};
use strsim::{jaro_winkler, normalized_levenshtein};

use crate::models::{MedicationCategory, MedicationRule, Route};

use super::{ReferenceError, ReferenceResult};

/// Minimum similarity for a fuzzy search hit.
const MIN_SEARCH_SCORE: f64 = 0.75;

/// Reference dosing rules, in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Formulary {
    pub medications: Vec<MedicationRule>,
}

/// A search hit with its similarity score (0.0 - 1.0).
#[derive(Debug, Clone, PartialEq)]
pub struct FormularyMatch<'a> {
    pub rule: &'a MedicationRule,
    pub score: f64,
}

impl Default for Formulary {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Formulary {
    pub fn new(medications: Vec<MedicationRule>) -> Self {
        Self { medications }
    }

    /// Look up a rule by (route, category, name).
    pub fn find(
        &self,
        route: Route,
        category: MedicationCategory,
        name: &str,
    ) -> Option<&MedicationRule> {
        self.medications
            .iter()
            .find(|rule| rule.is_keyed_by(route, category, name))
    }

    /// Categories present for a route, in first-seen order.
    pub fn categories(&self, route: Route) -> Vec<MedicationCategory> {
        let mut categories = Vec::new();
        for rule in self.medications.iter().filter(|r| r.route == route) {
            if !categories.contains(&rule.category) {
                categories.push(rule.category);
            }
        }
        categories
    }

    /// Rules within one (route, category) group.
    pub fn medications_in(
        &self,
        route: Route,
        category: MedicationCategory,
    ) -> impl Iterator<Item = &MedicationRule> {
        self.medications
            .iter()
            .filter(move |rule| rule.route == route && rule.category == category)
    }

    /// Free-text search over medication names, best match first.
    pub fn search(&self, query: &str, route: Option<Route>, limit: usize) -> Vec<FormularyMatch<'_>> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }

        let mut matches: Vec<FormularyMatch<'_>> = self
            .medications
            .iter()
            .filter(|rule| route.map_or(true, |r| rule.route == r))
            .map(|rule| FormularyMatch {
                rule,
                score: score_name(&rule.name, &query),
            })
            .filter(|m| m.score >= MIN_SEARCH_SCORE)
            .collect();

        matches.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.rule.name.cmp(&b.rule.name))
        });
        matches.truncate(limit);
        matches
    }

    pub(crate) fn validate(&self) -> ReferenceResult<()> {
        for (i, rule) in self.medications.iter().enumerate() {
            for range in [rule.usual_range, rule.severe_range].into_iter().flatten() {
                if !(range.low >= 0.0 && range.low <= range.high) {
                    return Err(ReferenceError::invalid(
                        "formulary",
                        format!("{} ({}): range {}-{} is not ordered", rule.name, rule.route, range.low, range.high),
                    ));
                }
            }
            for cap in [rule.max_per_dose, rule.max_per_day].into_iter().flatten() {
                if !(cap > 0.0) {
                    return Err(ReferenceError::invalid(
                        "formulary",
                        format!("{} ({}): cap {} must be positive", rule.name, rule.route, cap),
                    ));
                }
            }
            let duplicate = self.medications[..i]
                .iter()
                .any(|other| other.is_keyed_by(rule.route, rule.category, &rule.name));
            if duplicate {
                return Err(ReferenceError::invalid(
                    "formulary",
                    format!("duplicate entry {} / {} / {}", rule.route, rule.category, rule.name),
                ));
            }
        }
        Ok(())
    }

    /// Default pediatric formulary.
    pub fn defaults() -> Self {
        use MedicationCategory::{Antibiotics, Antivirals, Others};
        use Route::{Oral, Parenteral};

        let rule = MedicationRule::new;

        Self::new(vec![
            // Oral antibiotics
            rule("Amoxicillin", Oral, Antibiotics, "mg")
                .with_usual(50.0, 50.0)
                .with_severe(80.0, 90.0)
                .with_max_per_day(4000.0),
            rule("Amoxicillin-Clavulanate (Augmentin)", Oral, Antibiotics, "mg")
                .with_usual(50.0, 50.0)
                .with_severe(80.0, 90.0)
                .with_max_per_day(4000.0),
            rule("Cephalexin", Oral, Antibiotics, "mg")
                .with_usual(25.0, 50.0)
                .with_severe(100.0, 150.0)
                .with_max_per_day(6000.0),
            rule("Ciprofloxacin", Oral, Antibiotics, "mg")
                .with_usual(20.0, 30.0)
                .with_severe(40.0, 40.0)
                .with_max_per_dose(750.0)
                .with_max_per_day(1500.0),
            rule("Clarithromycin", Oral, Antibiotics, "mg")
                .with_usual(15.0, 15.0)
                .with_max_per_dose(500.0)
                .with_max_per_day(1000.0),
            rule("Cloxacillin", Oral, Antibiotics, "mg")
                .with_usual(50.0, 100.0)
                .with_max_per_dose(1000.0)
                .with_max_per_day(6000.0),
            rule("Metronidazole", Oral, Antibiotics, "mg")
                .with_usual(20.0, 50.0)
                .with_max_per_day(2250.0),
            rule("Vancomycin (C. difficile)", Oral, Antibiotics, "mg")
                .with_usual(10.0, 10.0)
                .with_max_per_dose(500.0)
                .with_max_per_day(2000.0),
            // Oral antivirals
            rule("Acyclovir", Oral, Antivirals, "mg")
                .with_usual(80.0, 80.0)
                .with_max_per_dose(800.0)
                .with_max_per_day(4000.0),
            rule("Oseltamivir", Oral, Antivirals, "mg").with_max_per_dose(75.0),
            // Oral others
            rule("Omeprazole", Oral, Others, "mg")
                .with_usual(0.8, 0.8)
                .with_max_per_dose(40.0)
                .with_notes("Give 30 minutes before meals for best effect."),
            rule("Nifedipine", Oral, Others, "mg")
                .with_usual(1.0, 2.0)
                .with_max_per_dose(10.0)
                .with_max_per_day(120.0)
                .with_notes("Also max 3 mg/kg/day."),
            rule("Aspirin (Antiplatelet)", Oral, Others, "mg")
                .with_usual(1.0, 5.0)
                .with_notes("Once daily antiplatelet dosing."),
            rule("Aspirin (Anti-inflammatory)", Oral, Others, "mg")
                .with_usual(80.0, 100.0)
                .with_notes("Divide Q6–8H."),
            rule("Prednisolone", Oral, Others, "mg")
                .with_usual(1.0, 2.0)
                .with_max_per_day(60.0),
            rule("Sodium Valproate", Oral, Others, "mg")
                .with_usual(10.0, 15.0)
                .with_severe(60.0, 60.0)
                .with_notes("Given BD or TDS."),
            rule("Salbutamol MDI", Oral, Others, "puffs")
                .with_notes("0.2–0.3 puffs/kg/dose (min 2, max 8 puffs)."),
            rule("Salbutamol Nebuliser (0.5%)", Oral, Others, "mL")
                .with_notes("0.03 mL/kg/dose, max 2 mL."),
            // IV / IM antibiotics
            rule("Cefazolin", Parenteral, Antibiotics, "mg")
                .with_usual(25.0, 50.0)
                .with_severe(100.0, 150.0)
                .with_max_per_day(12000.0),
            rule("Ceftriaxone", Parenteral, Antibiotics, "mg")
                .with_usual(50.0, 75.0)
                .with_severe(100.0, 100.0)
                .with_max_per_dose(2000.0)
                .with_max_per_day(4000.0),
            rule("Cloxacillin", Parenteral, Antibiotics, "mg")
                .with_usual(100.0, 100.0)
                .with_severe(200.0, 300.0)
                .with_max_per_dose(2000.0)
                .with_max_per_day(12000.0),
            rule("Gentamicin", Parenteral, Antibiotics, "mg").with_usual(5.0, 7.5),
            rule("Metronidazole", Parenteral, Antibiotics, "mg")
                .with_usual(22.5, 40.0)
                .with_max_per_day(4000.0),
            rule("Vancomycin", Parenteral, Antibiotics, "mg")
                .with_usual(30.0, 60.0)
                .with_max_per_dose(500.0)
                .with_max_per_day(2000.0),
            // IV / IM antivirals
            rule("Acyclovir", Parenteral, Antivirals, "mg").with_usual(30.0, 30.0),
            // IV / IM others
            rule("Omeprazole", Parenteral, Others, "mg")
                .with_usual(1.0, 1.0)
                .with_max_per_dose(40.0),
            rule("Hydrocortisone", Parenteral, Others, "mg")
                .with_usual(16.0, 16.0)
                .with_max_per_dose(100.0)
                .with_max_per_day(400.0),
        ])
    }
}

/// Score how well a medication name matches a lowercase query.
fn score_name(name: &str, query: &str) -> f64 {
    let name_lower = name.to_lowercase();

    if name_lower == query {
        return 1.0;
    }
    if name_lower.contains(query) {
        return 0.95;
    }

    // Names carry brand or indication in parentheses, so compare word by word too
    let word_similarity = name_lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| fuzzy_match(query, word))
        .fold(0.0, f64::max);

    fuzzy_match(query, &name_lower).max(word_similarity)
}

/// Combined Jaro-Winkler and Levenshtein similarity.
fn fuzzy_match(a: &str, b: &str) -> f64 {
    let jw = jaro_winkler(a, b);
    let lev = normalized_levenshtein(a, b);

    // Jaro-Winkler rewards shared prefixes, which is how drug names are usually misspelt
    jw * 0.6 + lev * 0.4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        Formulary::defaults().validate().unwrap();
    }

    #[test]
    fn test_find_by_key() {
        let formulary = Formulary::defaults();

        let oral = formulary
            .find(Route::Oral, MedicationCategory::Antibiotics, "cloxacillin")
            .unwrap();
        assert_eq!(oral.max_per_dose, Some(1000.0));

        let iv = formulary
            .find(Route::Parenteral, MedicationCategory::Antibiotics, "Cloxacillin")
            .unwrap();
        assert_eq!(iv.max_per_dose, Some(2000.0));

        assert!(formulary
            .find(Route::Oral, MedicationCategory::Antivirals, "Cloxacillin")
            .is_none());
    }

    #[test]
    fn test_categories_in_display_order() {
        let formulary = Formulary::defaults();
        assert_eq!(
            formulary.categories(Route::Parenteral),
            vec![
                MedicationCategory::Antibiotics,
                MedicationCategory::Antivirals,
                MedicationCategory::Others
            ]
        );
        assert_eq!(
            formulary
                .medications_in(Route::Oral, MedicationCategory::Antivirals)
                .count(),
            2
        );
    }

    #[test]
    fn test_search_brand_in_name() {
        let formulary = Formulary::defaults();
        let hits = formulary.search("augmentin", None, 5);
        assert_eq!(hits[0].rule.name, "Amoxicillin-Clavulanate (Augmentin)");
    }

    #[test]
    fn test_search_typo() {
        let formulary = Formulary::defaults();
        let hits = formulary.search("amoxicilin", Some(Route::Oral), 5);
        assert!(!hits.is_empty());
        assert!(hits[0].rule.name.starts_with("Amoxicillin"));
        assert!(hits.iter().all(|h| h.rule.route == Route::Oral));
    }

    #[test]
    fn test_search_route_filter_and_limit() {
        let formulary = Formulary::defaults();
        let hits = formulary.search("acyclovir", Some(Route::Parenteral), 5);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].rule.route, Route::Parenteral);

        let hits = formulary.search("acyclovir", None, 1);
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_search_no_match() {
        let formulary = Formulary::defaults();
        assert!(formulary.search("zzzzqqq", None, 5).is_empty());
        assert!(formulary.search("   ", None, 5).is_empty());
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let mut formulary = Formulary::defaults();
        let copy = formulary.medications[0].clone();
        formulary.medications.push(copy);
        assert!(matches!(
            formulary.validate(),
            Err(ReferenceError::Invalid { table: "formulary", .. })
        ));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let formulary = Formulary::new(vec![MedicationRule::new(
            "Test",
            Route::Oral,
            MedicationCategory::Others,
            "mg",
        )
        .with_usual(10.0, 5.0)]);
        assert!(formulary.validate().is_err());
    }

    #[test]
    fn test_fuzzy_match() {
        assert!(fuzzy_match("cephalexin", "cephalexin") > 0.99);
        assert!(fuzzy_match("vancomycin", "vancomicin") > 0.85);
        assert!(fuzzy_match("gentamicin", "omeprazole") < 0.5);
    }
}
