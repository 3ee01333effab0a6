use derive_more::Display;
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// ValidationErrorKind
///
/// Flat, wire-stable classification of every validation failure.
/// The `Display` form doubles as the message-catalog lookup tag.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
#[remain::sorted]
pub enum ValidationErrorKind {
    #[display("boolean")]
    Boolean,
    #[display("date")]
    Date,
    #[display("duplicate_key")]
    DuplicateKey,
    #[display("key_required")]
    KeyRequired,
    #[display("number")]
    Number,
    #[display("required")]
    Required,
}

impl ValidationErrorKind {
    /// Whether this kind is reported against a specific schema field.
    #[must_use]
    pub const fn is_field_level(self) -> bool {
        matches!(
            self,
            Self::Boolean | Self::Date | Self::Number | Self::Required
        )
    }
}

///
/// ValidationError
///
/// Recoverable, user-facing failure of a validate/serialize pass.
/// Nothing is ever partially applied when one of these is returned.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ValidationError {
    #[error("attribute key is required")]
    KeyRequired,

    #[error("duplicate attribute key '{key}'")]
    DuplicateKey { key: String },

    #[error("field '{field_label}' is required")]
    Required { field_label: String },

    #[error("field '{field_label}' must be a number")]
    Number { field_label: String },

    #[error("field '{field_label}' must be 'true' or 'false'")]
    Boolean { field_label: String },

    #[error("field '{field_label}' must be a calendar date")]
    Date { field_label: String },
}

impl ValidationError {
    #[must_use]
    pub const fn kind(&self) -> ValidationErrorKind {
        match self {
            Self::KeyRequired => ValidationErrorKind::KeyRequired,
            Self::DuplicateKey { .. } => ValidationErrorKind::DuplicateKey,
            Self::Required { .. } => ValidationErrorKind::Required,
            Self::Number { .. } => ValidationErrorKind::Number,
            Self::Boolean { .. } => ValidationErrorKind::Boolean,
            Self::Date { .. } => ValidationErrorKind::Date,
        }
    }

    /// Label of the schema field that failed, for field-level kinds.
    #[must_use]
    pub fn field_label(&self) -> Option<&str> {
        match self {
            Self::Required { field_label }
            | Self::Number { field_label }
            | Self::Boolean { field_label }
            | Self::Date { field_label } => Some(field_label),
            Self::KeyRequired | Self::DuplicateKey { .. } => None,
        }
    }
}

///
/// TESTS
///
