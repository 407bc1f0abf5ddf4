//! Error types for the soil-data crate.
//!
//! Every variant describes a problem with the caller's input. Validation
//! errors are terminal for a request: nothing downstream runs once one is
//! raised.

use thiserror::Error;

/// Errors raised while turning untrusted request input into a [`SoilSample`].
///
/// [`SoilSample`]: crate::types::SoilSample
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// The request body was not a JSON object
    #[error("Request body must be a JSON object, got {found}")]
    NotAnObject { found: &'static str },

    /// A field held a JSON type that can never be a number (bool, array, object)
    #[error("Invalid type for {field}: expected a number, got {found}")]
    InvalidType {
        field: &'static str,
        found: &'static str,
    },

    /// A string field could not be parsed as a finite number
    #[error("Invalid value for {field}: {value:?} is not a finite number")]
    NotANumber { field: &'static str, value: String },

    /// A nutrient amount below zero (or not finite)
    #[error("Value for {field} must be a finite number >= 0, got {value}")]
    Negative { field: &'static str, value: f64 },

    /// A numeric field parsed fine but lies outside its allowed range
    #[error("Value for {field} out of range: {value} (allowed {min}..={max})")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// `location` was present but not a string
    #[error("Invalid type for location: expected a string, got {found}")]
    InvalidLocation { found: &'static str },
}

impl ValidationError {
    /// Name of the offending input field, if the error concerns one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ValidationError::NotAnObject { .. } => None,
            ValidationError::InvalidType { field, .. }
            | ValidationError::NotANumber { field, .. }
            | ValidationError::Negative { field, .. }
            | ValidationError::OutOfRange { field, .. } => Some(field),
            ValidationError::InvalidLocation { .. } => Some("location"),
        }
    }
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, ValidationError>;
