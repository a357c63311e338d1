//! Y-site compatibility lookup.

use crate::models::{CompatibilityResult, CompatibilityVerdict, LookupSource};
use crate::reference::CompatibilityMatrix;

/// Looks up drug pairs in a compatibility matrix.
#[derive(Debug, Clone, Copy)]
pub struct CompatibilityChecker<'a> {
    matrix: &'a CompatibilityMatrix,
}

impl<'a> CompatibilityChecker<'a> {
    pub fn new(matrix: &'a CompatibilityMatrix) -> Self {
        Self { matrix }
    }

    /// Drugs available for selection.
    pub fn drugs(&self) -> &'a [String] {
        &self.matrix.drugs
    }

    /// Check a pair, falling back to the reverse entry when the direct one is absent.
    pub fn check(&self, drug_a: &str, drug_b: &str) -> CompatibilityResult {
        let (verdict, source) = if drug_a == drug_b {
            (CompatibilityVerdict::SameDrug, LookupSource::SameDrug)
        } else if let Some(verdict) = self.matrix.entry(drug_a, drug_b) {
            (verdict.clone(), LookupSource::Direct)
        } else if let Some(verdict) = self.matrix.entry(drug_b, drug_a) {
            (verdict.clone(), LookupSource::Reversed)
        } else {
            (CompatibilityVerdict::NoInformation, LookupSource::NotListed)
        };

        tracing::debug!(drug_a, drug_b, %verdict, ?source, "Checked compatibility");

        CompatibilityResult {
            drug_a: drug_a.to_string(),
            drug_b: drug_b.to_string(),
            class: verdict.class(),
            verdict,
            source,
        }
    }

    pub fn compatibility(&self, drug_a: &str, drug_b: &str) -> CompatibilityVerdict {
        self.check(drug_a, drug_b).verdict
    }
}
