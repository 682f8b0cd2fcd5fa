//! Field-level failure types.
//!
//! Every way a single field can fail to resolve is a [`FieldError`] variant.
//! Its `Display` output is the message surfaced in the error record, and
//! [`FieldError::kind`] maps it onto the coarse [`ErrorKind`] taxonomy.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message recorded for a required field that is absent from the input.
pub const MISSING_REQUIRED_MESSAGE: &str = "Required field is missing";

/// Coarse classification of a field problem.
///
/// # Examples
///
/// ```
/// use query_schema_core::{ErrorKind, FieldError};
///
/// assert_eq!(FieldError::ExpectedNumber.kind(), ErrorKind::TypeMismatch);
/// assert_eq!(FieldError::AlphaNotSupported.kind(), ErrorKind::ValidationFailed);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Input absent and the field is required.
    MissingRequired,
    /// Value present but could not be parsed into the field's type.
    TypeMismatch,
    /// Value parsed but failed a field-specific check.
    ValidationFailed,
}

/// Failure produced while resolving one field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// The field is required but no input was given.
    #[error("Required field is missing")]
    Missing,
    /// A string or boolean field received several values.
    #[error("Expected a single value")]
    ExpectedSingleValue,
    /// A number, color or date field received several values.
    #[error("Expected a single value, but got an array of values")]
    UnexpectedArray,
    #[error("Expected a number")]
    ExpectedNumber,
    /// Color parsed but carries a non-opaque alpha channel.
    #[error("Invalid color, alpha channel is not supported")]
    AlphaNotSupported,
    #[error("Invalid color, expected color string, like #f00 or #ff0000, # can be omitted")]
    InvalidColor,
    #[error("Invalid date, expected date string, like 2021-01-01 00:00:00")]
    InvalidDate,
    /// Rejected by a validator or an array override parser.
    #[error("{0}")]
    Invalid(String),
    /// A validator or override parser panicked; carries the panic message.
    #[error("{0}")]
    Panicked(String),
}

impl FieldError {
    /// Creates a validation failure with a custom message.
    ///
    /// # Examples
    ///
    /// ```
    /// use query_schema_core::FieldError;
    ///
    /// let err = FieldError::invalid("too large");
    /// assert_eq!(err.to_string(), "too large");
    /// ```
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }

    /// Returns the coarse classification of this failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Missing => ErrorKind::MissingRequired,
            Self::ExpectedSingleValue
            | Self::UnexpectedArray
            | Self::ExpectedNumber
            | Self::InvalidColor
            | Self::InvalidDate => ErrorKind::TypeMismatch,
            Self::AlphaNotSupported | Self::Invalid(_) | Self::Panicked(_) => {
                ErrorKind::ValidationFailed
            }
        }
    }
}
