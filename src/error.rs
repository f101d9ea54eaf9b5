//! Error types shared by the library and the CLI.
//!
//! Internally, functions return `Res<T>` and attach context with `anyhow`. At the boundary of a
//! public operation the error is tagged with an `ErrorType` through `IntoResult::pub_result` so
//! that callers can decide how to report it (inline on a form field, or as a notification).

use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};

/// Internal result type.
pub(crate) type Res<T> = std::result::Result<T, anyhow::Error>;

/// Public result type.
pub type Result<T> = std::result::Result<T, Error>;

/// The broad category of a failure.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// The configuration directory or file is missing or invalid.
    Config,
    /// User input was rejected before any side effect took place.
    Validation,
    /// The local category store failed.
    Storage,
    /// The remote API could not be reached.
    Transport,
    /// The remote API answered with a non-success status.
    Rejected,
    /// Anything else.
    Service,
}

serde_plain::derive_display_from_serialize!(ErrorType);
serde_plain::derive_fromstr_from_deserialize!(ErrorType);

/// The public error. It wraps an `anyhow::Error` and remembers what kind of failure it was.
pub struct Error {
    error_type: ErrorType,
    inner: anyhow::Error,
}

impl Error {
    pub fn new(error_type: ErrorType, inner: impl Into<anyhow::Error>) -> Self {
        Self {
            error_type,
            inner: inner.into(),
        }
    }

    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }

    /// Returns the `ValidationError` at the root of this error, if there is one.
    pub fn validation(&self) -> Option<&ValidationError> {
        self.inner.downcast_ref::<ValidationError>()
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} error: {:?}", self.error_type, self.inner)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#}", self.inner)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.inner.source()
    }
}

impl From<ValidationError> for Error {
    fn from(value: ValidationError) -> Self {
        Error::new(ErrorType::Validation, value)
    }
}

/// Converts an internal result into a public one, tagging the error with `error_type`.
pub(crate) trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| Error::new(error_type, e))
    }
}

/// Input problems that are reported inline on the offending field.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum ValidationError {
    /// The amount field was left empty.
    EmptyAmount,
    /// The amount is not a number, or it is zero or negative. Holds the offending text.
    InvalidAmount(String),
    /// No category was selected (the category list is empty).
    EmptyCategory,
    /// A new category was submitted without a name.
    EmptyCategoryName,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::EmptyAmount => write!(f, "Please enter an amount"),
            ValidationError::InvalidAmount(text) => {
                write!(f, "Please enter a valid amount greater than zero, got '{text}'")
            }
            ValidationError::EmptyCategory => write!(f, "Please select a category"),
            ValidationError::EmptyCategoryName => write!(f, "Category name is required"),
        }
    }
}

impl std::error::Error for ValidationError {}
