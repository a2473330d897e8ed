//! Field errors and warnings
//!
//! Conversion never stops at the first problem. Every step records what it
//! could not convert into a [`Diagnostics`] accumulator, keyed by the path of
//! the offending field in the *source* object so that operators can find it
//! in the resource they are editing.
//!
//! Rendering follows Kubernetes field errors, e.g.
//! `spec.providerSpec.value.ami.arn: Invalid value: "arn:aws:...": unable to
//! convert AMI ARN reference. Not supported in CAPI`.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::error::{ConversionError, ConversionResult, Converted};

/// Dotted path to a field, built as conversion descends into a structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath(String);

impl FieldPath {
    /// Path rooted at `name`.
    pub fn new(name: &str) -> Self {
        FieldPath(name.to_string())
    }

    /// Path rooted at several nested names: `from_names(&["spec", "taints"])`.
    pub fn from_names(names: &[&str]) -> Self {
        names
            .iter()
            .fold(FieldPath::default(), |path, name| path.child(name))
    }

    /// Path to the field `name` below this one.
    pub fn child(&self, name: &str) -> Self {
        if self.0.is_empty() {
            FieldPath(name.to_string())
        } else {
            FieldPath(format!("{}.{}", self.0, name))
        }
    }

    /// Path to element `index` of the list at this path.
    pub fn index(&self, index: usize) -> Self {
        FieldPath(format!("{}[{}]", self.0, index))
    }

    /// Path to entry `key` of the map at this path.
    pub fn key(&self, key: &str) -> Self {
        FieldPath(format!("{}[{}]", self.0, key))
    }

    /// Rendered path, e.g. `spec.providerSpec.value.tags[0]`.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of a field error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldErrorType {
    /// The value is set but cannot be converted
    Invalid,
    /// A value must be set
    Required,
    /// The field must not be set
    Forbidden,
    /// The value is outside a fixed set
    NotSupported,
    /// Conversion failed for a reason unrelated to the input
    Internal,
}

impl FieldErrorType {
    fn as_str(self) -> &'static str {
        match self {
            FieldErrorType::Invalid => "Invalid value",
            FieldErrorType::Required => "Required value",
            FieldErrorType::Forbidden => "Forbidden",
            FieldErrorType::NotSupported => "Unsupported value",
            FieldErrorType::Internal => "Internal error",
        }
    }
}

/// A problem with one field of the source object.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    /// Kind of problem
    pub error_type: FieldErrorType,
    /// Rendered [`FieldPath`] of the field
    pub field: String,
    /// Offending value, for `Invalid` and `NotSupported`
    pub bad_value: Option<Value>,
    /// Human readable explanation
    pub detail: String,
}

impl FieldError {
    /// The field holds a value that cannot be converted.
    pub fn invalid(path: &FieldPath, value: impl Serialize, detail: impl Into<String>) -> Self {
        FieldError {
            error_type: FieldErrorType::Invalid,
            field: path.to_string(),
            bad_value: Some(to_value(value)),
            detail: detail.into(),
        }
    }

    /// A value must be provided.
    pub fn required(path: &FieldPath, detail: impl Into<String>) -> Self {
        FieldError {
            error_type: FieldErrorType::Required,
            field: path.to_string(),
            bad_value: None,
            detail: detail.into(),
        }
    }

    /// The field must be left unset.
    pub fn forbidden(path: &FieldPath, detail: impl Into<String>) -> Self {
        FieldError {
            error_type: FieldErrorType::Forbidden,
            field: path.to_string(),
            bad_value: None,
            detail: detail.into(),
        }
    }

    /// The value is not one of `supported`.
    pub fn not_supported(path: &FieldPath, value: impl Serialize, supported: &[&str]) -> Self {
        let quoted: Vec<String> = supported.iter().map(|v| format!("{v:?}")).collect();
        FieldError {
            error_type: FieldErrorType::NotSupported,
            field: path.to_string(),
            bad_value: Some(to_value(value)),
            detail: format!("supported values: {}", quoted.join(", ")),
        }
    }

    /// Conversion itself failed at `path`.
    pub fn internal(path: &FieldPath, detail: impl Into<String>) -> Self {
        FieldError {
            error_type: FieldErrorType::Internal,
            field: path.to_string(),
            bad_value: None,
            detail: detail.into(),
        }
    }
}

fn to_value(value: impl Serialize) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.error_type.as_str())?;
        if let Some(value) = &self.bad_value {
            write!(f, ": {value}")?;
        }
        if !self.detail.is_empty() {
            write!(f, ": {}", self.detail)?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldError {}

/// Ordered list of field errors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorList(Vec<FieldError>);

impl ErrorList {
    /// Empty list.
    pub fn new() -> Self {
        ErrorList(Vec::new())
    }

    /// Append an error.
    pub fn push(&mut self, err: FieldError) {
        self.0.push(err);
    }

    /// Whether no error was recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of errors, duplicates included.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Errors in the order they were raised.
    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.0.iter()
    }

    /// Errors as a slice.
    pub fn as_slice(&self) -> &[FieldError] {
        &self.0
    }
}

impl Extend<FieldError> for ErrorList {
    fn extend<I: IntoIterator<Item = FieldError>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl FromIterator<FieldError> for ErrorList {
    fn from_iter<I: IntoIterator<Item = FieldError>>(iter: I) -> Self {
        ErrorList(iter.into_iter().collect())
    }
}

impl IntoIterator for ErrorList {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ErrorList {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// One error renders as itself, several as `[e1, e2]` with repeated
/// messages shown once.
impl fmt::Display for ErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut messages: Vec<String> = Vec::with_capacity(self.0.len());
        for err in &self.0 {
            let message = err.to_string();
            if !messages.contains(&message) {
                messages.push(message);
            }
        }

        match messages.as_slice() {
            [] => Ok(()),
            [single] => f.write_str(single),
            many => write!(f, "[{}]", many.join(", ")),
        }
    }
}

impl std::error::Error for ErrorList {}

/// Errors and warnings collected over one conversion call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    /// Fields that cannot be converted
    pub errors: ErrorList,
    /// Fields that were dropped or overridden, rendered like field errors
    pub warnings: Vec<String>,
}

impl Diagnostics {
    /// No errors and no warnings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a field error.
    pub fn error(&mut self, err: FieldError) {
        self.errors.push(err);
    }

    /// Record a free form warning.
    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Record a field that is ignored, rendered like an `Invalid` field error.
    pub fn warn_field(&mut self, path: &FieldPath, value: impl Serialize, detail: &str) {
        self.warnings
            .push(FieldError::invalid(path, value, detail).to_string());
    }

    /// Append everything from `other`.
    pub fn merge(&mut self, other: Diagnostics) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Whether any field error was recorded.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Turn the accumulated diagnostics into a conversion result for `value`.
    pub fn into_result<T>(self, value: T) -> ConversionResult<T> {
        if self.errors.is_empty() {
            Ok(Converted {
                value,
                warnings: self.warnings,
            })
        } else {
            Err(ConversionError::Invalid {
                errors: self.errors,
                warnings: self.warnings,
            })
        }
    }
}
