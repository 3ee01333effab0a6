//! ## Crate layout
//! - `core`: schema parsing, reconciliation, validation and the document codec.
//! - `config`: TOML host configuration (orphan policy, alias groups).
//! - `editor`: edit-session host tracking schema fetches for one asset.
//! - `error`: public error type with a kind + origin taxonomy.
//!
//! The `prelude` module exposes the surface a host needs to run an edit
//! session end to end.

pub use attrix_config as config;
pub use attrix_core as core;

pub mod editor;
pub mod error;

pub use error::{Error, ErrorKind, ErrorOrigin};

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

use attrix_core::payload::{self, FieldDefinitionPayload, FieldDraft};

/// Build field-definition payloads from schema-editor drafts.
pub fn field_payload(drafts: &[FieldDraft]) -> Result<Vec<FieldDefinitionPayload>, Error> {
    payload::build_field_payload(drafts)
        .map_err(|err| Error::from_validation(err, ErrorOrigin::Payload))
}

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        Error, ErrorKind, ErrorOrigin,
        config::AttrixConfig,
        editor::{AttributeEditor, SchemaTicket},
        field_payload,
    };
    pub use attrix_core::prelude::*;
    pub use attrix_core::payload::{FieldDefinitionPayload, FieldDraft};
}
