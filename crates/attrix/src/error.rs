use attrix_config::ConfigError;
use attrix_core::{ValidationError, ValidationErrorKind};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,

    /// Label of the schema field the error is reported against, if any.
    pub field_label: Option<String>,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
            field_label: None,
        }
    }

    /// Attach the origin a validation failure surfaced from.
    #[must_use]
    pub fn from_validation(err: ValidationError, origin: ErrorOrigin) -> Self {
        let message = err.to_string();
        let field_label = err.field_label().map(ToString::to_string);

        Self {
            kind: ErrorKind::Validation(err.kind()),
            origin,
            message,
            field_label,
        }
    }

    /// Validation kind, when this error is a validation failure.
    #[must_use]
    pub const fn validation_kind(&self) -> Option<ValidationErrorKind> {
        match self.kind {
            ErrorKind::Validation(kind) => Some(kind),
            _ => None,
        }
    }
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        Self::from_validation(err, ErrorOrigin::Validate)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorKind::Config, ErrorOrigin::Config, err.to_string())
    }
}

///
/// ErrorKind
/// Public error taxonomy for callers.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    /// User-correctable input problem; surface and block submission.
    Validation(ValidationErrorKind),

    /// A schema fetch for the active asset type is still outstanding.
    SchemaPending,

    /// The edit operation is not available in the current mode.
    Unsupported,

    /// Host configuration could not be loaded.
    Config,
}

///
/// ErrorOrigin
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorOrigin {
    Config,
    Editor,
    Payload,
    Serialize,
    Validate,
}
