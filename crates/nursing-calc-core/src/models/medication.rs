//! Formulary and dose-order models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{squash, NormalRange, ParseEnumError};

/// Dose range in units per kg per day.
pub type DoseRange = NormalRange;

/// Route grouping used to organise the formulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Route {
    /// Oral
    #[serde(rename = "PO")]
    Oral,
    /// Intravenous or intramuscular
    #[serde(rename = "IV/IM")]
    Parenteral,
}

impl Route {
    pub fn as_str(&self) -> &'static str {
        match self {
            Route::Oral => "PO",
            Route::Parenteral => "IV/IM",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Route {
    type Err = ParseEnumError;

    /// Canonicalize spoken or abbreviated routes ("orally", "IV / IM", "intramuscular").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match squash(s).as_str() {
            "po" | "oral" | "orally" | "bymouth" | "enteral" => Ok(Route::Oral),
            "iv" | "im" | "iv/im" | "ivim" | "intravenous" | "intravenously"
            | "intramuscular" | "intramuscularly" | "parenteral" => Ok(Route::Parenteral),
            _ => Err(ParseEnumError::new("route", s)),
        }
    }
}

/// Therapeutic grouping within a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MedicationCategory {
    Antibiotics,
    Antivirals,
    Others,
}

impl MedicationCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MedicationCategory::Antibiotics => "Antibiotics",
            MedicationCategory::Antivirals => "Antivirals",
            MedicationCategory::Others => "Others",
        }
    }
}

impl fmt::Display for MedicationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MedicationCategory {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match squash(s).as_str() {
            "antibiotic" | "antibiotics" => Ok(MedicationCategory::Antibiotics),
            "antiviral" | "antivirals" => Ok(MedicationCategory::Antivirals),
            "other" | "others" => Ok(MedicationCategory::Others),
            _ => Err(ParseEnumError::new("medication category", s)),
        }
    }
}

/// Which recommended range the prescriber is dosing against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    /// Usual / mild to moderate illness
    Usual,
    Severe,
}

impl FromStr for Severity {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match squash(s).as_str() {
            "usual" | "mild" | "moderate" | "mild-moderate" | "mild–moderate"
            | "usual/mild-moderate" | "usual/mild–moderate" => Ok(Severity::Usual),
            "severe" | "high" => Ok(Severity::Severe),
            _ => Err(ParseEnumError::new("severity", s)),
        }
    }
}

/// Reference dosing rule for one medication on one route.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicationRule {
    /// Display name, unique within (route, category)
    pub name: String,
    pub route: Route,
    pub category: MedicationCategory,
    /// Dose unit (e.g., "mg", "mL", "puffs")
    pub unit: String,
    /// Usual range per kg per day
    #[serde(default)]
    pub usual_range: Option<DoseRange>,
    /// Range for severe illness per kg per day
    #[serde(default)]
    pub severe_range: Option<DoseRange>,
    /// Cap on a single administration
    #[serde(default)]
    pub max_per_dose: Option<f64>,
    /// Cap on the daily total
    #[serde(default)]
    pub max_per_day: Option<f64>,
    /// Free-text administration notes
    #[serde(default)]
    pub notes: Option<String>,
}

impl MedicationRule {
    /// Create a rule with no ranges or caps.
    pub fn new(name: &str, route: Route, category: MedicationCategory, unit: &str) -> Self {
        Self {
            name: name.to_string(),
            route,
            category,
            unit: unit.to_string(),
            usual_range: None,
            severe_range: None,
            max_per_dose: None,
            max_per_day: None,
            notes: None,
        }
    }

    pub fn with_usual(mut self, low: f64, high: f64) -> Self {
        self.usual_range = Some(DoseRange::new(low, high));
        self
    }

    pub fn with_severe(mut self, low: f64, high: f64) -> Self {
        self.severe_range = Some(DoseRange::new(low, high));
        self
    }

    pub fn with_max_per_dose(mut self, max: f64) -> Self {
        self.max_per_dose = Some(max);
        self
    }

    pub fn with_max_per_day(mut self, max: f64) -> Self {
        self.max_per_day = Some(max);
        self
    }

    pub fn with_notes(mut self, notes: &str) -> Self {
        self.notes = Some(notes.to_string());
        self
    }

    /// Pick the range to dose against.
    ///
    /// Severe illness uses the severe range when the rule has one and falls back
    /// to the usual range otherwise. Returns the basis actually applied.
    pub fn range_for(&self, severity: Severity) -> Option<(DoseRange, Severity)> {
        match (severity, self.severe_range) {
            (Severity::Severe, Some(range)) => Some((range, Severity::Severe)),
            _ => self.usual_range.map(|range| (range, Severity::Usual)),
        }
    }

    /// Check if this rule is keyed by (route, category, name). Name match ignores case.
    pub fn is_keyed_by(&self, route: Route, category: MedicationCategory, name: &str) -> bool {
        self.route == route && self.category == category && self.name.eq_ignore_ascii_case(name)
    }
}

/// Standard dosing intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DosingFrequency {
    Q24H,
    Q12H,
    Q8H,
    Q6H,
}

impl DosingFrequency {
    /// Administrations per day.
    pub fn per_day(&self) -> u32 {
        match self {
            DosingFrequency::Q24H => 1,
            DosingFrequency::Q12H => 2,
            DosingFrequency::Q8H => 3,
            DosingFrequency::Q6H => 4,
        }
    }
}

impl FromStr for DosingFrequency {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match squash(s).as_str() {
            "q24h" | "od" | "daily" => Ok(DosingFrequency::Q24H),
            "q12h" | "bd" | "bid" => Ok(DosingFrequency::Q12H),
            "q8h" | "tds" | "tid" => Ok(DosingFrequency::Q8H),
            "q6h" | "qds" | "qid" => Ok(DosingFrequency::Q6H),
            _ => Err(ParseEnumError::new("dosing frequency", s)),
        }
    }
}

/// A prescribed dose to verify.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DoseOrder {
    pub weight_kg: f64,
    /// Amount per administration, in the rule's unit
    pub dose_ordered: f64,
    pub frequency_per_day: u32,
}

impl DoseOrder {
    pub fn new(weight_kg: f64, dose_ordered: f64, frequency: DosingFrequency) -> Self {
        Self {
            weight_kg,
            dose_ordered,
            frequency_per_day: frequency.per_day(),
        }
    }

    pub fn daily_total(&self) -> f64 {
        self.dose_ordered * f64::from(self.frequency_per_day)
    }

    /// Daily total per kg; `None` unless weight is positive.
    pub fn per_kg_per_day(&self) -> Option<f64> {
        (self.weight_kg > 0.0).then(|| self.daily_total() / self.weight_kg)
    }
}

/// A single dose-safety finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DoseWarning {
    BelowRecommendedRange,
    AboveRecommendedRange,
    ExceedsMaximumDailyDose,
    ExceedsMaximumPerDose,
}

impl fmt::Display for DoseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DoseWarning::BelowRecommendedRange => "Below recommended range",
            DoseWarning::AboveRecommendedRange => "Above recommended range",
            DoseWarning::ExceedsMaximumDailyDose => "Exceeds maximum daily dose",
            DoseWarning::ExceedsMaximumPerDose => "Exceeds maximum per dose",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DoseStatus {
    /// No warnings raised
    WithinRange,
    /// At least one warning raised
    OutsideLimits,
}

/// Outcome of verifying a [`DoseOrder`] against a [`MedicationRule`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoseAssessment {
    pub status: DoseStatus,
    pub warnings: Vec<DoseWarning>,
    /// Range basis applied; `None` when the rule has no range at all
    pub range_basis: Option<Severity>,
    /// Recommended range per kg per day
    pub recommended_per_kg_per_day: Option<DoseRange>,
    /// Recommended daily total for this patient's weight
    pub recommended_per_day: Option<DoseRange>,
    /// Recommended amount per administration
    pub recommended_per_dose: Option<DoseRange>,
    pub ordered_per_dose: f64,
    pub ordered_per_day: f64,
    pub ordered_per_kg_per_day: f64,
    pub unit: String,
    pub notes: Option<String>,
}

impl DoseAssessment {
    pub fn is_within_range(&self) -> bool {
        self.status == DoseStatus::WithinRange
    }
}
