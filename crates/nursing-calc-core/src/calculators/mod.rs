//! Clinical calculators.
//!
//! Every calculator is a pure function of its inputs and, where it needs one, a
//! borrowed reference table. Invalid input comes back as [`CalcError::InvalidInput`];
//! an age outside every band or an unlisted drug pair is a normal result, not an error.

mod age;
mod bilirubin;
mod bmi;
mod compatibility;
mod dosing;
mod fluids;
mod urine;
mod vitals;

pub use age::*;
pub use bilirubin::*;
pub use bmi::*;
pub use compatibility::*;
pub use dosing::*;
pub use fluids::*;
pub use urine::*;
pub use vitals::*;

use thiserror::Error;

/// Calculator errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalcError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type CalcResult<T> = Result<T, CalcError>;

fn invalid(reason: String) -> CalcError {
    tracing::warn!(%reason, "Rejected calculator input");
    CalcError::InvalidInput(reason)
}

/// Require a finite value strictly above zero.
fn require_positive(field: &str, value: f64) -> CalcResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(invalid(format!("{} must be greater than zero (got {})", field, value)))
    }
}

/// Require a finite value at or above zero.
fn require_non_negative(field: &str, value: f64) -> CalcResult<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(invalid(format!("{} must not be negative (got {})", field, value)))
    }
}
