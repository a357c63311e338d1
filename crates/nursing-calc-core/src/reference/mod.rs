//! Reference tables: the clinical thresholds the calculators evaluate against.
//!
//! Built-in defaults are constructed once per process and shared. Institutions can
//! export them with [`ReferenceTables::to_json`], edit the thresholds, and load the
//! result with [`ReferenceTables::load`]. Loaded tables are validated before use.

mod bilirubin;
mod compatibility;
mod formulary;
mod vitals;

pub use bilirubin::*;
pub use compatibility::*;
pub use formulary::*;
pub use vitals::*;

use std::path::Path;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reference data errors.
#[derive(Error, Debug)]
pub enum ReferenceError {
    #[error("Failed to read reference data {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid {table} table: {reason}")]
    Invalid { table: &'static str, reason: String },
}

impl ReferenceError {
    pub(crate) fn invalid(table: &'static str, reason: String) -> Self {
        ReferenceError::Invalid { table, reason }
    }
}

pub type ReferenceResult<T> = Result<T, ReferenceError>;

static BUILTIN: OnceLock<ReferenceTables> = OnceLock::new();

/// Every table the calculators consult.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceTables {
    pub formulary: Formulary,
    pub bilirubin: BilirubinTables,
    pub vital_signs: VitalSignBands,
    pub compatibility: CompatibilityMatrix,
}

impl Default for ReferenceTables {
    fn default() -> Self {
        Self::defaults()
    }
}

impl ReferenceTables {
    /// Freshly constructed default tables.
    pub fn defaults() -> Self {
        Self {
            formulary: Formulary::defaults(),
            bilirubin: BilirubinTables::defaults(),
            vital_signs: VitalSignBands::defaults(),
            compatibility: CompatibilityMatrix::defaults(),
        }
    }

    /// Process-wide default tables, built on first use.
    pub fn builtin() -> &'static ReferenceTables {
        BUILTIN.get_or_init(Self::defaults)
    }

    /// Parse and validate tables from JSON.
    pub fn from_json(json: &str) -> ReferenceResult<Self> {
        let tables: ReferenceTables = serde_json::from_str(json)?;
        tables.validate()?;
        tracing::info!(
            medications = tables.formulary.medications.len(),
            vital_sign_bands = tables.vital_signs.bands.len(),
            compatibility_pairs = tables.compatibility.pairs.len(),
            "Loaded reference tables"
        );
        Ok(tables)
    }

    /// Read, parse and validate tables from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> ReferenceResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ReferenceError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Export as pretty JSON, e.g. as a template for local thresholds.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Check every table's structural invariants.
    pub fn validate(&self) -> ReferenceResult<()> {
        self.formulary.validate()?;
        self.bilirubin.validate()?;
        self.vital_signs.validate()?;
        self.compatibility.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_is_shared() {
        let a = ReferenceTables::builtin();
        let b = ReferenceTables::builtin();
        assert!(std::ptr::eq(a, b));
        assert_eq!(*a, ReferenceTables::defaults());
    }

    #[test]
    fn test_json_export_reloads() {
        let json = ReferenceTables::defaults().to_json().unwrap();
        let tables = ReferenceTables::from_json(&json).unwrap();
        assert_eq!(tables, ReferenceTables::defaults());
    }

    #[test]
    fn test_malformed_json() {
        let result = ReferenceTables::from_json("{ \"formulary\": ");
        assert!(matches!(result, Err(ReferenceError::Json(_))));
    }

    #[test]
    fn test_invalid_tables_rejected_on_load() {
        let mut tables = ReferenceTables::defaults();
        tables.vital_signs.bands.swap(0, 1);
        let json = tables.to_json().unwrap();
        assert!(matches!(
            ReferenceTables::from_json(&json),
            Err(ReferenceError::Invalid { table: "vital_signs", .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        let result = ReferenceTables::load("/nonexistent/reference.json");
        assert!(matches!(result, Err(ReferenceError::Io { .. })));
    }
}
