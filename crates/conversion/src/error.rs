//! Conversion error types.

use machine_crds::mapi::PlatformType;
use thiserror::Error;

use crate::diagnostics::{ErrorList, FieldError};

/// Result of a conversion call.
pub type ConversionResult<T> = Result<Converted<T>, ConversionError>;

/// A successful conversion and the warnings raised while producing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Converted<T> {
    /// Converted object
    pub value: T,
    /// Fields that were dropped or overridden, for operator visibility
    pub warnings: Vec<String>,
}

impl<T> Converted<T> {
    /// Map the converted value, keeping the warnings.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Converted<U> {
        Converted {
            value: f(self.value),
            warnings: self.warnings,
        }
    }
}

/// Errors that can occur while converting a machine or machine set.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// The provider configuration could not be decoded at all
    #[error("{0}")]
    Decode(FieldError),

    /// One or more fields cannot be represented in Cluster API
    #[error("{errors}")]
    Invalid {
        /// Field errors, in the order they were raised
        errors: ErrorList,
        /// Warnings raised before and alongside the errors
        warnings: Vec<String>,
    },

    /// No converter exists for the platform
    #[error("unsupported platform: {0:?}")]
    UnsupportedPlatform(PlatformType),
}

impl ConversionError {
    /// Field errors carried by this error, in the order they were raised.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            ConversionError::Decode(err) => std::slice::from_ref(err),
            ConversionError::Invalid { errors, .. } => errors.as_slice(),
            ConversionError::UnsupportedPlatform(_) => &[],
        }
    }

    /// Warnings collected before the conversion failed.
    pub fn warnings(&self) -> &[String] {
        match self {
            ConversionError::Invalid { warnings, .. } => warnings,
            _ => &[],
        }
    }
}
