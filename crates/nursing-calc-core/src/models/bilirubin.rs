//! Neonatal jaundice models: risk categories, threshold rows and SB tiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{squash, ParseEnumError};

/// Infant risk category selecting which threshold tables apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskCategory {
    HighRisk,
    NormalRisk,
}

impl RiskCategory {
    /// Suggest a category from the selected risk factors.
    ///
    /// Any factor at all suggests high risk. The caller may override the suggestion.
    pub fn suggest(risk_factors: &[RiskFactor]) -> Self {
        if risk_factors.is_empty() {
            RiskCategory::NormalRisk
        } else {
            RiskCategory::HighRisk
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RiskCategory::HighRisk => "High-Risk",
            RiskCategory::NormalRisk => "Normal-Risk",
        })
    }
}

impl FromStr for RiskCategory {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match squash(s).as_str() {
            "high" | "high-risk" | "highrisk" => Ok(RiskCategory::HighRisk),
            "normal" | "normal-risk" | "normalrisk" => Ok(RiskCategory::NormalRisk),
            _ => Err(ParseEnumError::new("risk category", s)),
        }
    }
}

/// High-risk criteria for neonatal hyperbilirubinaemia.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskFactor {
    /// Visible jaundice within 24 hours of age
    JaundiceWithin24Hours,
    /// G6PD deficiency and other hemolytic conditions
    HemolyticCondition,
    AboIncompatibility,
    RhesusIncompatibility,
    /// Serum bilirubin rising faster than 103 µmol/L per day
    RapidlyRisingBilirubin,
    /// Late preterm (35–36 weeks)
    LatePreterm,
    /// Apgar ≤ 5 at 1 and 5 minutes
    Asphyxia,
    /// Sibling with severe jaundice needing exchange transfusion
    FamilyHistoryOfExchange,
    /// Inadequate breastfeeding plus weight loss ≥ 10%
    InadequateBreastfeeding,
    /// Birth weight 2000–2500 g
    LowBirthWeight,
    /// Mother's blood group and antibody titres unknown
    MaternalBloodGroupUnknown,
    /// Exclusive breastfeeding with ≥ 10% loss before regaining birth weight
    ExclusiveBreastfeedingWeightLoss,
}

impl RiskFactor {
    pub const ALL: [RiskFactor; 12] = [
        RiskFactor::JaundiceWithin24Hours,
        RiskFactor::HemolyticCondition,
        RiskFactor::AboIncompatibility,
        RiskFactor::RhesusIncompatibility,
        RiskFactor::RapidlyRisingBilirubin,
        RiskFactor::LatePreterm,
        RiskFactor::Asphyxia,
        RiskFactor::FamilyHistoryOfExchange,
        RiskFactor::InadequateBreastfeeding,
        RiskFactor::LowBirthWeight,
        RiskFactor::MaternalBloodGroupUnknown,
        RiskFactor::ExclusiveBreastfeedingWeightLoss,
    ];

    /// Stable key used in JSON and across the FFI.
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskFactor::JaundiceWithin24Hours => "jaundice_within_24_hours",
            RiskFactor::HemolyticCondition => "hemolytic_condition",
            RiskFactor::AboIncompatibility => "abo_incompatibility",
            RiskFactor::RhesusIncompatibility => "rhesus_incompatibility",
            RiskFactor::RapidlyRisingBilirubin => "rapidly_rising_bilirubin",
            RiskFactor::LatePreterm => "late_preterm",
            RiskFactor::Asphyxia => "asphyxia",
            RiskFactor::FamilyHistoryOfExchange => "family_history_of_exchange",
            RiskFactor::InadequateBreastfeeding => "inadequate_breastfeeding",
            RiskFactor::LowBirthWeight => "low_birth_weight",
            RiskFactor::MaternalBloodGroupUnknown => "maternal_blood_group_unknown",
            RiskFactor::ExclusiveBreastfeedingWeightLoss => "exclusive_breastfeeding_weight_loss",
        }
    }
}

impl fmt::Display for RiskFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskFactor {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = squash(s).replace('-', "_");
        RiskFactor::ALL
            .into_iter()
            .find(|factor| factor.as_str() == key)
            .ok_or_else(|| ParseEnumError::new("risk factor", s))
    }
}

/// TcB screening threshold for one age band (inclusive on both ends).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TcbThresholdRow {
    pub age_low_hours: f64,
    pub age_high_hours: f64,
    /// µmol/L; a reading above this needs a serum bilirubin
    pub threshold: f64,
}

impl TcbThresholdRow {
    pub fn new(age_low_hours: f64, age_high_hours: f64, threshold: f64) -> Self {
        Self {
            age_low_hours,
            age_high_hours,
            threshold,
        }
    }
}

/// Serum bilirubin treatment thresholds for one age band (inclusive on both ends).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BilirubinThresholdRow {
    pub age_low_hours: f64,
    pub age_high_hours: f64,
    /// Ceiling at or below which phototherapy may stop
    #[serde(default)]
    pub stop_phototherapy: Option<f64>,
    pub single_therapy: f64,
    pub double_therapy: f64,
    pub intense_therapy: f64,
    pub exchange: f64,
}

impl BilirubinThresholdRow {
    pub fn new(
        age_low_hours: f64,
        age_high_hours: f64,
        stop_phototherapy: Option<f64>,
        [single_therapy, double_therapy, intense_therapy, exchange]: [f64; 4],
    ) -> Self {
        Self {
            age_low_hours,
            age_high_hours,
            stop_phototherapy,
            single_therapy,
            double_therapy,
            intense_therapy,
            exchange,
        }
    }
}

/// Age band bounds shared by the TcB and SB tables.
pub trait AgeBand {
    fn age_low(&self) -> f64;
    fn age_high(&self) -> f64;
}

impl AgeBand for TcbThresholdRow {
    fn age_low(&self) -> f64 {
        self.age_low_hours
    }
    fn age_high(&self) -> f64 {
        self.age_high_hours
    }
}

impl AgeBand for BilirubinThresholdRow {
    fn age_low(&self) -> f64 {
        self.age_low_hours
    }
    fn age_high(&self) -> f64 {
        self.age_high_hours
    }
}

/// Treatment tier for a serum bilirubin result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhototherapyTier {
    /// Outpatient, below the single-phototherapy threshold
    ContinueMonitoring,
    /// Inpatient, at or below the stop threshold
    StopPhototherapy,
    SingleTherapy,
    DoubleTherapy,
    IntenseTherapy,
    ExchangeIndicated,
    /// Age outside every band in the table
    OutOfRange,
}

impl PhototherapyTier {
    /// Escalation rank, 0 (no treatment) to 4 (exchange). `None` for [`PhototherapyTier::OutOfRange`].
    pub fn severity(&self) -> Option<u8> {
        match self {
            PhototherapyTier::ContinueMonitoring | PhototherapyTier::StopPhototherapy => Some(0),
            PhototherapyTier::SingleTherapy => Some(1),
            PhototherapyTier::DoubleTherapy => Some(2),
            PhototherapyTier::IntenseTherapy => Some(3),
            PhototherapyTier::ExchangeIndicated => Some(4),
            PhototherapyTier::OutOfRange => None,
        }
    }

    /// Background colour name conventionally used to render the tier.
    pub fn display_color(&self) -> &'static str {
        match self {
            PhototherapyTier::ContinueMonitoring => "lightgreen",
            PhototherapyTier::StopPhototherapy => "lightblue",
            PhototherapyTier::SingleTherapy => "khaki",
            PhototherapyTier::DoubleTherapy => "orange",
            PhototherapyTier::IntenseTherapy => "tomato",
            PhototherapyTier::ExchangeIndicated => "red",
            PhototherapyTier::OutOfRange => "lightgray",
        }
    }
}

/// Result of classifying a serum bilirubin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SbClassification {
    pub tier: PhototherapyTier,
    pub on_phototherapy: bool,
    pub risk: RiskCategory,
    /// The band the age fell into, if any
    pub band: Option<BilirubinThresholdRow>,
}

impl SbClassification {
    pub fn display_color(&self) -> &'static str {
        self.tier.display_color()
    }

    /// Short clinical wording. Single therapy reads "continue" for inpatients and "start" otherwise.
    pub fn summary(&self) -> &'static str {
        match (self.tier, self.on_phototherapy) {
            (PhototherapyTier::ContinueMonitoring, _) => "Continue monitoring (outpatient)",
            (PhototherapyTier::StopPhototherapy, _) => "Stop phototherapy",
            (PhototherapyTier::SingleTherapy, true) => "Continue single blue phototherapy",
            (PhototherapyTier::SingleTherapy, false) => "Start single blue phototherapy",
            (PhototherapyTier::DoubleTherapy, _) => "Double blue phototherapy",
            (PhototherapyTier::IntenseTherapy, _) => "Intense phototherapy",
            (PhototherapyTier::ExchangeIndicated, _) => "Exchange transfusion indicated",
            (PhototherapyTier::OutOfRange, _) => "Age out of range",
        }
    }
}

/// Result of a TcB screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TcbScreening {
    /// Serum bilirubin is recommended
    pub exceeds_threshold: bool,
    /// Threshold of the matched band; `None` when no band matched
    pub threshold: Option<f64>,
    pub risk: RiskCategory,
}

impl TcbScreening {
    /// No band matched, so no recommendation was actually made.
    pub fn is_out_of_range(&self) -> bool {
        self.threshold.is_none()
    }
}
