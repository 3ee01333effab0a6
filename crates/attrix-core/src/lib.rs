//! Typed attribute schema engine.
//!
//! An asset type declares an ordered set of typed fields; each asset stores a
//! sparse key/value document for them. The pipeline is:
//!
//! raw field rows → [`schema::parse_schema`] → [`mode::SchemaMode`] →
//! [`reconcile::reconcile`] with the rows from [`document::deserialize`] →
//! user edits → [`validate::validate_mode`] → [`document::serialize`].
//!
//! Every operation is a pure function over its inputs and allocates fresh
//! output.

pub mod alias;
pub mod document;
pub mod entry;
pub mod error;
pub mod key;
pub mod mode;
pub mod payload;
pub mod reconcile;
pub mod schema;
pub mod unit;
pub mod validate;

mod coerce;

pub use error::{ValidationError, ValidationErrorKind};

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        alias::{AliasGroup, AliasResolver},
        document::{AttributeDocument, deserialize, serialize},
        entry::{AttributeEntry, FieldBinding},
        error::{ValidationError, ValidationErrorKind},
        key::slugify,
        mode::SchemaMode,
        reconcile::reconcile,
        schema::{FieldDefinition, FieldSchema, FieldType, RawFieldRow, parse_schema},
        unit::UnitId,
        validate::{validate, validate_keys, validate_mode},
    };
}
