//! Y-site compatibility matrix.

use serde::{Deserialize, Serialize};

use crate::models::{CompatibilityVerdict, DrugPair};

use super::{ReferenceError, ReferenceResult};

/// Drug list and pairwise verdicts keyed by ordered pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityMatrix {
    /// Drugs offered for selection, in display order
    pub drugs: Vec<String>,
    pub pairs: Vec<DrugPair>,
}

impl Default for CompatibilityMatrix {
    fn default() -> Self {
        Self::defaults()
    }
}

impl CompatibilityMatrix {
    /// Verdict recorded for exactly (drug_a, drug_b), if any.
    pub fn entry(&self, drug_a: &str, drug_b: &str) -> Option<&CompatibilityVerdict> {
        self.pairs
            .iter()
            .find(|pair| pair.drug_a == drug_a && pair.drug_b == drug_b)
            .map(|pair| &pair.verdict)
    }

    pub fn contains_drug(&self, drug: &str) -> bool {
        self.drugs.iter().any(|d| d == drug)
    }

    /// Pairs whose reverse entry exists with a different verdict.
    pub fn asymmetric_pairs(&self) -> Vec<(&str, &str)> {
        self.pairs
            .iter()
            .filter(|pair| {
                self.entry(&pair.drug_b, &pair.drug_a)
                    .is_some_and(|reverse| *reverse != pair.verdict)
            })
            .map(|pair| (pair.drug_a.as_str(), pair.drug_b.as_str()))
            .collect()
    }

    pub(crate) fn validate(&self) -> ReferenceResult<()> {
        for (i, pair) in self.pairs.iter().enumerate() {
            for drug in [&pair.drug_a, &pair.drug_b] {
                if !self.contains_drug(drug) {
                    return Err(ReferenceError::invalid(
                        "compatibility",
                        format!("pair references unlisted drug {:?}", drug),
                    ));
                }
            }
            if pair.drug_a == pair.drug_b {
                return Err(ReferenceError::invalid(
                    "compatibility",
                    format!("self-pair for {:?}", pair.drug_a),
                ));
            }
            let duplicate = self.pairs[..i]
                .iter()
                .any(|other| other.drug_a == pair.drug_a && other.drug_b == pair.drug_b);
            if duplicate {
                return Err(ReferenceError::invalid(
                    "compatibility",
                    format!("duplicate pair {:?} / {:?}", pair.drug_a, pair.drug_b),
                ));
            }
        }

        for (a, b) in self.asymmetric_pairs() {
            tracing::warn!(drug_a = a, drug_b = b, "Compatibility matrix disagrees with its reverse entry");
        }
        Ok(())
    }

    /// Default pediatric Y-site matrix.
    pub fn defaults() -> Self {
        const PARACETAMOL: &str = "Acetaminophen (Paracetamol)";
        const ACYCLOVIR: &str = "Acyclovir";
        const AMIKACIN: &str = "Amikacin";
        const CO_AMOXICLAV: &str = "Amoxicillin/Clavulanate (Co-amoxiclav)";
        const AMPICILLIN: &str = "Ampicillin";
        const UNASYN: &str = "Ampicillin/Sulbactam (Unasyn)";

        const NOT_COMPATIBLE: &str = "Not compatible";
        const COMPATIBLE: &str = "Compatible";
        const IN_SALINE: &str = "Compatible if diluent is NaCl 0.9%";
        const NO_INFO: &str = "No information";

        let rows: [(&str, [(&str, &str); 5]); 6] = [
            (
                PARACETAMOL,
                [
                    (ACYCLOVIR, NOT_COMPATIBLE),
                    (AMIKACIN, NO_INFO),
                    (CO_AMOXICLAV, NO_INFO),
                    (AMPICILLIN, NO_INFO),
                    (UNASYN, NO_INFO),
                ],
            ),
            (
                ACYCLOVIR,
                [
                    (PARACETAMOL, NOT_COMPATIBLE),
                    (AMIKACIN, COMPATIBLE),
                    (CO_AMOXICLAV, NO_INFO),
                    (AMPICILLIN, COMPATIBLE),
                    (UNASYN, NOT_COMPATIBLE),
                ],
            ),
            (
                AMIKACIN,
                [
                    (PARACETAMOL, NO_INFO),
                    (ACYCLOVIR, COMPATIBLE),
                    (CO_AMOXICLAV, NO_INFO),
                    (AMPICILLIN, IN_SALINE),
                    (UNASYN, IN_SALINE),
                ],
            ),
            (
                CO_AMOXICLAV,
                [
                    (PARACETAMOL, NO_INFO),
                    (ACYCLOVIR, NO_INFO),
                    (AMIKACIN, NO_INFO),
                    (AMPICILLIN, NO_INFO),
                    (UNASYN, NO_INFO),
                ],
            ),
            (
                AMPICILLIN,
                [
                    (PARACETAMOL, NO_INFO),
                    (ACYCLOVIR, COMPATIBLE),
                    (AMIKACIN, IN_SALINE),
                    (CO_AMOXICLAV, NO_INFO),
                    (UNASYN, NO_INFO),
                ],
            ),
            (
                UNASYN,
                [
                    (PARACETAMOL, NO_INFO),
                    (ACYCLOVIR, NOT_COMPATIBLE),
                    (AMIKACIN, IN_SALINE),
                    (CO_AMOXICLAV, NO_INFO),
                    (AMPICILLIN, NO_INFO),
                ],
            ),
        ];

        Self {
            drugs: rows.iter().map(|(drug, _)| drug.to_string()).collect(),
            pairs: rows
                .iter()
                .flat_map(|(drug_a, entries)| {
                    entries
                        .iter()
                        .map(move |(drug_b, verdict)| DrugPair::new(drug_a, drug_b, *verdict))
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid_and_symmetric() {
        let matrix = CompatibilityMatrix::defaults();
        matrix.validate().unwrap();
        assert_eq!(matrix.drugs.len(), 6);
        assert_eq!(matrix.pairs.len(), 30);
        assert!(matrix.asymmetric_pairs().is_empty());
    }

    #[test]
    fn test_entry_lookup() {
        let matrix = CompatibilityMatrix::defaults();
        assert_eq!(
            matrix.entry("Amikacin", "Ampicillin"),
            Some(&CompatibilityVerdict::CompatibleIfDiluent("NaCl 0.9%".into()))
        );
        assert_eq!(matrix.entry("Amikacin", "Vancomycin"), None);
    }

    #[test]
    fn test_asymmetry_detected() {
        let mut matrix = CompatibilityMatrix::defaults();
        let pair = matrix
            .pairs
            .iter_mut()
            .find(|p| p.drug_a == "Acyclovir" && p.drug_b == "Amikacin")
            .unwrap();
        pair.verdict = CompatibilityVerdict::NotCompatible;

        let asymmetric = matrix.asymmetric_pairs();
        assert_eq!(asymmetric.len(), 2);
        assert!(asymmetric.contains(&("Acyclovir", "Amikacin")));
        // Asymmetry is reported, not rejected
        assert!(matrix.validate().is_ok());
    }

    #[test]
    fn test_unlisted_drug_rejected() {
        let mut matrix = CompatibilityMatrix::defaults();
        matrix
            .pairs
            .push(DrugPair::new("Amikacin", "Vancomycin", "Compatible"));
        assert!(matrix.validate().is_err());
    }
}
