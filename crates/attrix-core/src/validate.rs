//! Schema and structural validation of attribute rows.
//!
//! Every check is fail-fast and deterministic: fields are visited in schema
//! order and the first failure wins.

use crate::{
    coerce,
    entry::AttributeEntry,
    error::ValidationError,
    key,
    mode::SchemaMode,
    schema::{FieldDefinition, FieldSchema, FieldType},
};
use std::collections::HashSet;

/// Validate rows against the checks that apply to `mode`.
pub fn validate_mode(entries: &[AttributeEntry], mode: &SchemaMode) -> Result<(), ValidationError> {
    match mode {
        SchemaMode::SchemaBound(schema) => validate(entries, schema),
        SchemaMode::FreeForm => validate_keys(entries),
    }
}

/// Check each schema field's required/type constraints.
pub fn validate(entries: &[AttributeEntry], schema: &FieldSchema) -> Result<(), ValidationError> {
    for field in schema {
        let value = entries
            .iter()
            .find(|entry| key::keys_match(&entry.key, &field.key))
            .map_or("", |entry| entry.value.trim());

        validate_field(field, value)?;
    }

    Ok(())
}

/// Structural checks for free-form rows: every non-blank row needs a key,
/// and keys must be unique case-insensitively.
pub fn validate_keys(entries: &[AttributeEntry]) -> Result<(), ValidationError> {
    let kept: Vec<&AttributeEntry> = entries.iter().filter(|entry| !entry.is_blank()).collect();

    if kept.iter().any(|entry| entry.key.trim().is_empty()) {
        return Err(ValidationError::KeyRequired);
    }

    let mut seen = HashSet::with_capacity(kept.len());
    for entry in kept {
        let key = entry.key.trim();
        if !seen.insert(key::fold_key(key)) {
            return Err(ValidationError::DuplicateKey {
                key: key.to_string(),
            });
        }
    }

    Ok(())
}

fn validate_field(field: &FieldDefinition, value: &str) -> Result<(), ValidationError> {
    let field_label = || field.display_label().to_string();

    if value.is_empty() {
        if field.required {
            return Err(ValidationError::Required {
                field_label: field_label(),
            });
        }

        return Ok(());
    }

    match field.field_type {
        FieldType::Text => Ok(()),
        FieldType::Number => coerce::parse_number(value)
            .map(|_| ())
            .ok_or_else(|| ValidationError::Number {
                field_label: field_label(),
            }),
        FieldType::Boolean => coerce::parse_boolean(value)
            .map(|_| ())
            .ok_or_else(|| ValidationError::Boolean {
                field_label: field_label(),
            }),
        FieldType::Date => {
            if coerce::is_date(value) {
                Ok(())
            } else {
                Err(ValidationError::Date {
                    field_label: field_label(),
                })
            }
        }
    }
}

///
/// TESTS
///
