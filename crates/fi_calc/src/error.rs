//! Errors returned by the calculations.

use thiserror::Error;

/// An input combination the calculation cannot work with.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CalcError {
    /// A value that must be strictly positive was not.
    #[error("{name} must be greater than zero, got {value}")]
    NonPositive {
        /// Parameter name.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// A value that must not be negative was.
    #[error("{name} must not be negative, got {value}")]
    Negative {
        /// Parameter name.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// The current age is past the retirement age.
    #[error("current_age ({current_age}) is greater than retirement_age ({retirement_age})")]
    AgeOrder {
        /// Current age.
        current_age: u32,
        /// Target retirement age.
        retirement_age: u32,
    },

    /// The target is never reached with the given inputs.
    #[error("financial independence is not reached within {years} years")]
    Unreachable {
        /// Horizon searched.
        years: u32,
    },
}

pub(crate) fn positive(name: &'static str, value: f64) -> Result<f64, CalcError> {
    if value > 0.0 {
        Ok(value)
    } else {
        Err(CalcError::NonPositive { name, value })
    }
}

pub(crate) fn non_negative(name: &'static str, value: f64) -> Result<f64, CalcError> {
    if value >= 0.0 {
        Ok(value)
    } else {
        Err(CalcError::Negative { name, value })
    }
}
