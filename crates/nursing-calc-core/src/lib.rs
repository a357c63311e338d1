//! Nursing-Calc Core Library
//!
//! Bedside calculation engine for pediatric and neonatal nursing.
//!
//! # Architecture
//!
//! ```text
//!   ReferenceTables (builtin | JSON file)
//!         │
//!         ├── Formulary ─────────────► verify_dose, volume_to_dispense
//!         ├── BilirubinTables ───────► BilirubinEngine (TcB screen, SB tier)
//!         ├── VitalSignBands ────────► VitalSignsEvaluator
//!         └── CompatibilityMatrix ───► CompatibilityChecker
//!
//!   Table-free: fluids/feeds, corrected age, urine output, BMI
//! ```
//!
//! # Core Principle
//!
//! **Every calculator is pure.** Results are typed values with verdicts and warnings;
//! presentation and session state belong to the caller.
//!
//! # Modules
//!
//! - [`models`]: Domain types (MedicationRule, DoseOrder, threshold rows, verdicts)
//! - [`reference`]: Reference tables, built-in defaults and JSON loading
//! - [`calculators`]: The calculators themselves

pub mod calculators;
pub mod models;
pub mod reference;

// Re-export commonly used types
pub use calculators::{
    BilirubinEngine, CalcError, CalcResult, CompatibilityChecker, VitalSignsEvaluator,
};
pub use models::{
    AdjustedAge, CompatibilityVerdict, DoseAssessment, DoseOrder, MedicationRule,
    PhototherapyTier, RiskCategory, Severity, VitalSignsInput, VitalsAssessment,
};
pub use reference::{ReferenceError, ReferenceTables};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::borrow::Cow;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate};

use models::{
    FeedInterval, GestationalAge, MedicationCategory, ParseEnumError, Rehydration, RiskFactor,
    Route, UrineAgeGroup,
};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum NursingCalcError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Reference data error: {0}")]
    ReferenceData(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<CalcError> for NursingCalcError {
    fn from(e: CalcError) -> Self {
        match e {
            CalcError::InvalidInput(reason) => NursingCalcError::InvalidInput(reason),
        }
    }
}

impl From<ParseEnumError> for NursingCalcError {
    fn from(e: ParseEnumError) -> Self {
        NursingCalcError::InvalidInput(e.to_string())
    }
}

impl From<chrono::ParseError> for NursingCalcError {
    fn from(e: chrono::ParseError) -> Self {
        NursingCalcError::InvalidInput(format!("Unparseable date: {}", e))
    }
}

impl From<ReferenceError> for NursingCalcError {
    fn from(e: ReferenceError) -> Self {
        NursingCalcError::ReferenceData(e.to_string())
    }
}

impl From<serde_json::Error> for NursingCalcError {
    fn from(e: serde_json::Error) -> Self {
        NursingCalcError::SerializationError(e.to_string())
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Calculator over the built-in reference tables.
#[uniffi::export]
pub fn builtin_calculator() -> Arc<NursingCalculator> {
    Arc::new(NursingCalculator {
        tables: Cow::Borrowed(ReferenceTables::builtin()),
    })
}

/// Calculator over reference tables supplied as JSON.
#[uniffi::export]
pub fn calculator_from_json(json: String) -> Result<Arc<NursingCalculator>, NursingCalcError> {
    let tables = ReferenceTables::from_json(&json)?;
    Ok(Arc::new(NursingCalculator {
        tables: Cow::Owned(tables),
    }))
}

/// Calculator over reference tables read from a JSON file.
#[uniffi::export]
pub fn calculator_from_file(path: String) -> Result<Arc<NursingCalculator>, NursingCalcError> {
    let tables = ReferenceTables::load(&path)?;
    Ok(Arc::new(NursingCalculator {
        tables: Cow::Owned(tables),
    }))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Immutable calculator handle for FFI. Safe to share across threads.
#[derive(uniffi::Object)]
pub struct NursingCalculator {
    tables: Cow<'static, ReferenceTables>,
}

#[uniffi::export]
impl NursingCalculator {
    // =========================================================================
    // Reference Data
    // =========================================================================

    /// Export the active tables as editable JSON.
    pub fn export_reference_json(&self) -> Result<String, NursingCalcError> {
        Ok(self.tables.to_json()?)
    }

    // =========================================================================
    // Formulary & Dosing
    // =========================================================================

    /// Categories available for a route.
    pub fn list_categories(&self, route: String) -> Result<Vec<String>, NursingCalcError> {
        let route: Route = route.parse()?;
        Ok(self
            .tables
            .formulary
            .categories(route)
            .into_iter()
            .map(|c| c.to_string())
            .collect())
    }

    /// Medication names within a route and category.
    pub fn list_medications(
        &self,
        route: String,
        category: String,
    ) -> Result<Vec<String>, NursingCalcError> {
        let route: Route = route.parse()?;
        let category: MedicationCategory = category.parse()?;
        Ok(self
            .tables
            .formulary
            .medications_in(route, category)
            .map(|rule| rule.name.clone())
            .collect())
    }

    /// Get a medication rule.
    pub fn get_medication(
        &self,
        route: String,
        category: String,
        name: String,
    ) -> Result<Option<FfiMedicationRule>, NursingCalcError> {
        let route: Route = route.parse()?;
        let category: MedicationCategory = category.parse()?;
        Ok(self
            .tables
            .formulary
            .find(route, category, &name)
            .map(|rule| rule.clone().into()))
    }

    /// Search medications by name.
    pub fn search_formulary(
        &self,
        query: String,
        route: Option<String>,
        limit: u32,
    ) -> Result<Vec<FfiFormularyMatch>, NursingCalcError> {
        let route = route.map(|r| r.parse::<Route>()).transpose()?;
        Ok(self
            .tables
            .formulary
            .search(&query, route, limit as usize)
            .into_iter()
            .map(|m| FfiFormularyMatch {
                rule: m.rule.clone().into(),
                score: m.score,
            })
            .collect())
    }

    /// Verify an ordered dose. `frequency` is Q24H/Q12H/Q8H/Q6H, `severity` usual or severe.
    #[allow(clippy::too_many_arguments)]
    pub fn verify_dose(
        &self,
        route: String,
        category: String,
        medication: String,
        weight_kg: f64,
        dose_ordered: f64,
        frequency: String,
        severity: String,
    ) -> Result<FfiDoseAssessment, NursingCalcError> {
        let route: Route = route.parse()?;
        let category: MedicationCategory = category.parse()?;
        let rule = self
            .tables
            .formulary
            .find(route, category, &medication)
            .ok_or_else(|| {
                NursingCalcError::NotFound(format!("{} / {} / {}", route, category, medication))
            })?;
        let order = DoseOrder::new(weight_kg, dose_ordered, frequency.parse()?);
        let assessment = calculators::verify_dose(rule, &order, severity.parse()?)?;
        Ok(assessment.into())
    }

    /// Volume to draw up for one dose of a `strength`-in-`volume_ml` preparation.
    pub fn volume_to_dispense(
        &self,
        ordered_dose: f64,
        strength: f64,
        volume_ml: f64,
    ) -> Result<f64, NursingCalcError> {
        Ok(calculators::volume_to_dispense(ordered_dose, strength, volume_ml)?)
    }

    // =========================================================================
    // Fluids & Feeds
    // =========================================================================

    /// Maintenance plus rehydration ("none", "3%", "5%").
    pub fn fluid_requirement(
        &self,
        weight_kg: f64,
        rehydration: String,
    ) -> Result<FfiFluidRequirement, NursingCalcError> {
        let rehydration: Rehydration = rehydration.parse()?;
        let requirement = calculators::fluid_requirement(weight_kg, rehydration)?;
        Ok(FfiFluidRequirement {
            maintenance_ml_per_day: requirement.maintenance_ml_per_day,
            rehydration_ml_per_day: requirement.rehydration_ml_per_day,
            total_ml_per_day: requirement.total_ml_per_day,
            total_ml_per_hour: requirement.total_ml_per_hour,
        })
    }

    /// Neonatal feed volumes ("2-hourly" or "3-hourly").
    pub fn neonatal_feeds(
        &self,
        weight_kg: f64,
        day_of_life: u32,
        interval: String,
    ) -> Result<FfiFeedPlan, NursingCalcError> {
        let interval: FeedInterval = interval.parse()?;
        let plan = calculators::neonatal_feeds(weight_kg, day_of_life, interval)?;
        Ok(FfiFeedPlan {
            ml_per_kg_per_day: plan.ml_per_kg_per_day,
            total_feed_ml_per_day: plan.total_feed_ml_per_day,
            feeds_per_day: plan.feeds_per_day,
            per_feed_ml: plan.per_feed_ml,
            iv_fluid_ml_per_day: plan.iv_fluid_ml_per_day,
        })
    }

    // =========================================================================
    // Bilirubin
    // =========================================================================

    /// Keys of the selectable risk factors.
    pub fn risk_factors(&self) -> Vec<String> {
        RiskFactor::ALL.iter().map(|f| f.to_string()).collect()
    }

    /// "High-Risk" when any factor is selected, "Normal-Risk" otherwise.
    pub fn suggest_risk_category(
        &self,
        risk_factors: Vec<String>,
    ) -> Result<String, NursingCalcError> {
        let factors = risk_factors
            .iter()
            .map(|f| f.parse::<RiskFactor>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(calculators::suggest_risk_category(&factors).to_string())
    }

    /// Hours between two RFC 3339 timestamps.
    pub fn hours_of_life(&self, birth: String, now: String) -> Result<f64, NursingCalcError> {
        let birth = DateTime::parse_from_rfc3339(&birth)?;
        let now = DateTime::parse_from_rfc3339(&now)?;
        Ok(calculators::hours_of_life(&birth, &now)?)
    }

    /// Whether a TcB reading calls for a serum bilirubin. False outside every age band.
    pub fn tcb_exceeds_threshold(
        &self,
        age_hours: f64,
        risk: String,
        tcb: f64,
    ) -> Result<bool, NursingCalcError> {
        let risk: RiskCategory = risk.parse()?;
        Ok(self.bilirubin().tcb_exceeds_threshold(age_hours, risk, tcb))
    }

    /// TcB screen with the matched threshold.
    pub fn screen_tcb(
        &self,
        age_hours: f64,
        risk: String,
        tcb: f64,
    ) -> Result<FfiTcbScreening, NursingCalcError> {
        let risk: RiskCategory = risk.parse()?;
        let screening = self.bilirubin().screen_tcb(age_hours, risk, tcb)?;
        Ok(FfiTcbScreening {
            exceeds_threshold: screening.exceeds_threshold,
            threshold: screening.threshold,
            out_of_range: screening.is_out_of_range(),
        })
    }

    /// Serum bilirubin treatment tier.
    pub fn classify_sb(
        &self,
        age_hours: f64,
        sb: f64,
        on_phototherapy: bool,
        risk: String,
    ) -> Result<FfiSbClassification, NursingCalcError> {
        let risk: RiskCategory = risk.parse()?;
        let classification = self
            .bilirubin()
            .classify_sb(age_hours, sb, on_phototherapy, risk)?;
        Ok(FfiSbClassification {
            tier: format!("{:?}", classification.tier),
            summary: classification.summary().to_string(),
            color: classification.display_color().to_string(),
            severity: classification.tier.severity(),
        })
    }

    // =========================================================================
    // Age
    // =========================================================================

    /// Chronological and adjusted age. Dates are ISO 8601 (YYYY-MM-DD).
    pub fn assess_age(
        &self,
        date_of_birth: String,
        current_date: String,
        gestational_weeks: u32,
        gestational_days: u32,
    ) -> Result<FfiAgeAssessment, NursingCalcError> {
        let dob: NaiveDate = date_of_birth.parse()?;
        let current: NaiveDate = current_date.parse()?;
        let ga = GestationalAge {
            weeks: gestational_weeks,
            days: gestational_days,
        };
        let assessment = calculators::assess_age(dob, current, ga)?;
        let (kind, adjusted) = match assessment.adjusted {
            AdjustedAge::CorrectedAge(age) => ("CorrectedAge", age),
            AdjustedAge::PostMenstrualAge(age) => ("PostMenstrualAge", age),
        };
        Ok(FfiAgeAssessment {
            chronological_days: assessment.chronological_days,
            chronological_weeks: assessment.chronological.weeks,
            chronological_remaining_days: assessment.chronological.days,
            adjusted_kind: kind.to_string(),
            adjusted_weeks: adjusted.weeks,
            adjusted_days: adjusted.days,
        })
    }

    // =========================================================================
    // Compatibility
    // =========================================================================

    /// Drugs in the compatibility matrix, in display order.
    pub fn compatibility_drugs(&self) -> Vec<String> {
        self.compatibility().drugs().to_vec()
    }

    /// Y-site compatibility of two drugs.
    pub fn check_compatibility(&self, drug_a: String, drug_b: String) -> FfiCompatibilityResult {
        let result = self.compatibility().check(&drug_a, &drug_b);
        FfiCompatibilityResult {
            drug_a: result.drug_a,
            drug_b: result.drug_b,
            verdict: result.verdict.to_string(),
            class: format!("{:?}", result.class),
            source: format!("{:?}", result.source),
        }
    }

    // =========================================================================
    // Vitals, Urine, BMI
    // =========================================================================

    /// Check vital signs against the age band.
    pub fn classify_vitals(
        &self,
        input: FfiVitalSignsInput,
    ) -> Result<FfiVitalsAssessment, NursingCalcError> {
        let evaluator = VitalSignsEvaluator::new(&self.tables.vital_signs);
        Ok(evaluator.classify(&input.into())?.into())
    }

    /// Urine output adequacy; the age group follows from `age_days`.
    pub fn assess_urine_output(
        &self,
        weight_kg: f64,
        urine_ml_24h: f64,
        age_days: u32,
    ) -> Result<FfiUrineOutput, NursingCalcError> {
        let group = UrineAgeGroup::from_age_days(age_days);
        let assessment = calculators::assess_urine_output(weight_kg, urine_ml_24h, group)?;
        Ok(FfiUrineOutput {
            ml_per_kg_per_hour: assessment.ml_per_kg_per_hour,
            age_group: format!("{:?}", assessment.age_group),
            threshold: assessment.threshold,
            verdict: format!("{:?}", assessment.verdict),
        })
    }

    /// Body mass index, kg/m².
    pub fn body_mass_index(&self, weight_kg: f64, height_cm: f64) -> Result<f64, NursingCalcError> {
        Ok(calculators::body_mass_index(weight_kg, height_cm)?)
    }
}

impl NursingCalculator {
    fn bilirubin(&self) -> BilirubinEngine<'_> {
        BilirubinEngine::new(&self.tables.bilirubin)
    }

    fn compatibility(&self) -> CompatibilityChecker<'_> {
        CompatibilityChecker::new(&self.tables.compatibility)
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe medication rule.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMedicationRule {
    pub name: String,
    pub route: String,
    pub category: String,
    pub unit: String,
    pub usual_low: Option<f64>,
    pub usual_high: Option<f64>,
    pub severe_low: Option<f64>,
    pub severe_high: Option<f64>,
    pub max_per_dose: Option<f64>,
    pub max_per_day: Option<f64>,
    pub notes: Option<String>,
}

impl From<MedicationRule> for FfiMedicationRule {
    fn from(rule: MedicationRule) -> Self {
        Self {
            name: rule.name,
            route: rule.route.to_string(),
            category: rule.category.to_string(),
            unit: rule.unit,
            usual_low: rule.usual_range.map(|r| r.low),
            usual_high: rule.usual_range.map(|r| r.high),
            severe_low: rule.severe_range.map(|r| r.low),
            severe_high: rule.severe_range.map(|r| r.high),
            max_per_dose: rule.max_per_dose,
            max_per_day: rule.max_per_day,
            notes: rule.notes,
        }
    }
}

/// FFI-safe formulary search hit.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiFormularyMatch {
    pub rule: FfiMedicationRule,
    pub score: f64,
}

/// FFI-safe dose assessment.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDoseAssessment {
    pub within_range: bool,
    pub warnings: Vec<String>,
    pub range_basis: Option<String>,
    pub recommended_low_per_day: Option<f64>,
    pub recommended_high_per_day: Option<f64>,
    pub recommended_low_per_dose: Option<f64>,
    pub recommended_high_per_dose: Option<f64>,
    pub ordered_per_day: f64,
    pub ordered_per_kg_per_day: f64,
    pub unit: String,
    pub notes: Option<String>,
}

impl From<DoseAssessment> for FfiDoseAssessment {
    fn from(assessment: DoseAssessment) -> Self {
        Self {
            within_range: assessment.is_within_range(),
            warnings: assessment.warnings.iter().map(|w| w.to_string()).collect(),
            range_basis: assessment.range_basis.map(|b| format!("{:?}", b)),
            recommended_low_per_day: assessment.recommended_per_day.map(|r| r.low),
            recommended_high_per_day: assessment.recommended_per_day.map(|r| r.high),
            recommended_low_per_dose: assessment.recommended_per_dose.map(|r| r.low),
            recommended_high_per_dose: assessment.recommended_per_dose.map(|r| r.high),
            ordered_per_day: assessment.ordered_per_day,
            ordered_per_kg_per_day: assessment.ordered_per_kg_per_day,
            unit: assessment.unit,
            notes: assessment.notes,
        }
    }
}

/// FFI-safe fluid requirement.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiFluidRequirement {
    pub maintenance_ml_per_day: f64,
    pub rehydration_ml_per_day: f64,
    pub total_ml_per_day: f64,
    pub total_ml_per_hour: f64,
}

/// FFI-safe feed plan.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiFeedPlan {
    pub ml_per_kg_per_day: f64,
    pub total_feed_ml_per_day: f64,
    pub feeds_per_day: u32,
    pub per_feed_ml: f64,
    pub iv_fluid_ml_per_day: f64,
}

/// FFI-safe TcB screen.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiTcbScreening {
    pub exceeds_threshold: bool,
    pub threshold: Option<f64>,
    pub out_of_range: bool,
}

/// FFI-safe SB classification.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSbClassification {
    pub tier: String,
    pub summary: String,
    pub color: String,
    /// 0 (no treatment) to 4 (exchange); absent when out of range
    pub severity: Option<u8>,
}

/// FFI-safe age assessment.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAgeAssessment {
    pub chronological_days: u32,
    pub chronological_weeks: u32,
    pub chronological_remaining_days: u32,
    /// "CorrectedAge" or "PostMenstrualAge"
    pub adjusted_kind: String,
    pub adjusted_weeks: u32,
    pub adjusted_days: u32,
}

/// FFI-safe compatibility result.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCompatibilityResult {
    pub drug_a: String,
    pub drug_b: String,
    pub verdict: String,
    pub class: String,
    pub source: String,
}

/// FFI-safe vital signs input.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiVitalSignsInput {
    pub age_years: f64,
    pub heart_rate: Option<i32>,
    pub respiratory_rate: Option<i32>,
    pub systolic_bp: Option<i32>,
    pub temperature_c: Option<f64>,
}

impl From<FfiVitalSignsInput> for VitalSignsInput {
    fn from(input: FfiVitalSignsInput) -> Self {
        VitalSignsInput {
            age_years: input.age_years,
            heart_rate: input.heart_rate,
            respiratory_rate: input.respiratory_rate,
            systolic_bp: input.systolic_bp,
            temperature_c: input.temperature_c,
        }
    }
}

/// FFI-safe vital signs assessment. Verdicts are absent when not checked.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiVitalsAssessment {
    pub age_out_of_range: bool,
    pub heart_rate_verdict: Option<String>,
    pub adjusted_heart_rate: Option<i32>,
    pub fever_compensation: Option<i32>,
    pub respiratory_rate_verdict: Option<String>,
    pub systolic_bp_verdict: Option<String>,
    pub systolic_bp_low: Option<f64>,
    pub systolic_bp_high: Option<f64>,
}

impl From<VitalsAssessment> for FfiVitalsAssessment {
    fn from(assessment: VitalsAssessment) -> Self {
        Self {
            age_out_of_range: assessment.is_out_of_range(),
            heart_rate_verdict: assessment.heart_rate.map(|c| format!("{:?}", c.verdict)),
            adjusted_heart_rate: assessment.heart_rate.map(|c| c.adjusted),
            fever_compensation: assessment.heart_rate.map(|c| c.compensation),
            respiratory_rate_verdict: assessment
                .respiratory_rate
                .map(|c| format!("{:?}", c.verdict)),
            systolic_bp_verdict: assessment.systolic_bp.map(|c| format!("{:?}", c.verdict)),
            systolic_bp_low: assessment.systolic_bp.map(|c| c.normal_range.low),
            systolic_bp_high: assessment.systolic_bp.map(|c| c.normal_range.high),
        }
    }
}

/// FFI-safe urine output assessment.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiUrineOutput {
    pub ml_per_kg_per_hour: f64,
    pub age_group: String,
    pub threshold: f64,
    pub verdict: String,
}
