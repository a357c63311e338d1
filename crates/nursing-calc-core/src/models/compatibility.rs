//! Y-site compatibility models.

use std::fmt;

use serde::{Deserialize, Serialize};

const DILUENT_PREFIX: &str = "Compatible if diluent is ";

/// Compatibility verdict for a drug pair.
///
/// Stored as its reference wording ("Not compatible", "Compatible if diluent is NaCl 0.9%", ...)
/// so institution tables stay readable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CompatibilityVerdict {
    /// Both selections are the same drug
    SameDrug,
    Compatible,
    /// Compatible only when made up in the named diluent
    CompatibleIfDiluent(String),
    NotCompatible,
    NoInformation,
    /// Wording that matches none of the known forms
    Other(String),
}

impl CompatibilityVerdict {
    /// Coarse class used to decide how to present the verdict.
    pub fn class(&self) -> CompatibilityClass {
        match self {
            CompatibilityVerdict::SameDrug
            | CompatibilityVerdict::Compatible
            | CompatibilityVerdict::CompatibleIfDiluent(_) => CompatibilityClass::Compatible,
            CompatibilityVerdict::NotCompatible => CompatibilityClass::Incompatible,
            CompatibilityVerdict::NoInformation => CompatibilityClass::Unknown,
            CompatibilityVerdict::Other(text) => classify_text(text),
        }
    }
}

/// "Not compatible" wins over "Compatible"; anything else is unknown.
fn classify_text(text: &str) -> CompatibilityClass {
    if text.contains("Not compatible") {
        CompatibilityClass::Incompatible
    } else if text.contains("Compatible") {
        CompatibilityClass::Compatible
    } else {
        CompatibilityClass::Unknown
    }
}

impl From<String> for CompatibilityVerdict {
    fn from(text: String) -> Self {
        let trimmed = text.trim();
        if let Some(diluent) = trimmed.strip_prefix(DILUENT_PREFIX) {
            return CompatibilityVerdict::CompatibleIfDiluent(diluent.trim().to_string());
        }
        match trimmed {
            "Same drug" => CompatibilityVerdict::SameDrug,
            "Compatible" => CompatibilityVerdict::Compatible,
            "Not compatible" => CompatibilityVerdict::NotCompatible,
            "No information" => CompatibilityVerdict::NoInformation,
            _ => CompatibilityVerdict::Other(trimmed.to_string()),
        }
    }
}

impl From<&str> for CompatibilityVerdict {
    fn from(text: &str) -> Self {
        CompatibilityVerdict::from(text.to_string())
    }
}

impl From<CompatibilityVerdict> for String {
    fn from(verdict: CompatibilityVerdict) -> Self {
        verdict.to_string()
    }
}

impl fmt::Display for CompatibilityVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompatibilityVerdict::SameDrug => f.write_str("Same drug"),
            CompatibilityVerdict::Compatible => f.write_str("Compatible"),
            CompatibilityVerdict::CompatibleIfDiluent(diluent) => {
                write!(f, "{}{}", DILUENT_PREFIX, diluent)
            }
            CompatibilityVerdict::NotCompatible => f.write_str("Not compatible"),
            CompatibilityVerdict::NoInformation => f.write_str("No information"),
            CompatibilityVerdict::Other(text) => f.write_str(text),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompatibilityClass {
    Compatible,
    Incompatible,
    Unknown,
}

/// One entry of the compatibility matrix, keyed by ordered pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrugPair {
    pub drug_a: String,
    pub drug_b: String,
    pub verdict: CompatibilityVerdict,
}

impl DrugPair {
    pub fn new(drug_a: &str, drug_b: &str, verdict: impl Into<CompatibilityVerdict>) -> Self {
        Self {
            drug_a: drug_a.to_string(),
            drug_b: drug_b.to_string(),
            verdict: verdict.into(),
        }
    }
}

/// Where a verdict came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LookupSource {
    /// Same drug selected twice; the matrix was not consulted
    SameDrug,
    /// Entry for (drug_a, drug_b)
    Direct,
    /// Entry for (drug_b, drug_a), used because the direct entry is absent
    Reversed,
    /// Neither entry present
    NotListed,
}

/// Result of a compatibility check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityResult {
    pub drug_a: String,
    pub drug_b: String,
    pub verdict: CompatibilityVerdict,
    pub class: CompatibilityClass,
    pub source: LookupSource,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_wordings() {
        assert_eq!(CompatibilityVerdict::from("Compatible"), CompatibilityVerdict::Compatible);
        assert_eq!(CompatibilityVerdict::from("Not compatible"), CompatibilityVerdict::NotCompatible);
        assert_eq!(CompatibilityVerdict::from("No information"), CompatibilityVerdict::NoInformation);
        assert_eq!(
            CompatibilityVerdict::from("Compatible if diluent is NaCl 0.9%"),
            CompatibilityVerdict::CompatibleIfDiluent("NaCl 0.9%".into())
        );
    }

    #[test]
    fn test_display_restores_wording() {
        let verdict = CompatibilityVerdict::CompatibleIfDiluent("D5W".into());
        assert_eq!(verdict.to_string(), "Compatible if diluent is D5W");
    }

    #[test]
    fn test_classes() {
        assert_eq!(CompatibilityVerdict::SameDrug.class(), CompatibilityClass::Compatible);
        assert_eq!(
            CompatibilityVerdict::CompatibleIfDiluent("NaCl 0.9%".into()).class(),
            CompatibilityClass::Compatible
        );
        assert_eq!(CompatibilityVerdict::NotCompatible.class(), CompatibilityClass::Incompatible);
        assert_eq!(CompatibilityVerdict::NoInformation.class(), CompatibilityClass::Unknown);
    }

    #[test]
    fn test_unrecognised_wording_classified_by_content() {
        let verdict = CompatibilityVerdict::from("Not compatible at high concentration");
        assert!(matches!(verdict, CompatibilityVerdict::Other(_)));
        assert_eq!(verdict.class(), CompatibilityClass::Incompatible);

        let verdict = CompatibilityVerdict::from("Compatible for 4 hours");
        assert_eq!(verdict.class(), CompatibilityClass::Compatible);

        let verdict = CompatibilityVerdict::from("Variable");
        assert_eq!(verdict.class(), CompatibilityClass::Unknown);
    }

    #[test]
    fn test_serde_uses_wording() {
        let pair = DrugPair::new("Amikacin", "Ampicillin", "Compatible if diluent is NaCl 0.9%");
        let json = serde_json::to_string(&pair).unwrap();
        assert!(json.contains("\"Compatible if diluent is NaCl 0.9%\""));
        let back: DrugPair = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pair);
    }
}
