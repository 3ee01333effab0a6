//! Merge stored attribute rows with the active schema.

use crate::{
    entry::AttributeEntry,
    key,
    mode::SchemaMode,
    schema::FieldSchema,
};
use tracing::debug;

/// Produce the editable row set for `mode`.
///
/// In schema mode the output has exactly one row per field, in schema
/// order; existing values are carried over by case-insensitive key match
/// and all metadata is stamped from the current definition. Rows with no
/// matching field are dropped. In free-form mode the rows pass through
/// with schema metadata stripped.
#[must_use]
pub fn reconcile(existing: &[AttributeEntry], mode: &SchemaMode) -> Vec<AttributeEntry> {
    match mode {
        SchemaMode::SchemaBound(schema) => reconcile_schema(existing, schema),
        SchemaMode::FreeForm => existing
            .iter()
            .cloned()
            .map(AttributeEntry::into_free_form)
            .collect(),
    }
}

/// Keys of existing rows that reconciliation against `mode` would drop.
#[must_use]
pub fn orphaned_keys(existing: &[AttributeEntry], mode: &SchemaMode) -> Vec<String> {
    let Some(schema) = mode.schema() else {
        return Vec::new();
    };

    orphans(existing, schema)
        .map(|entry| entry.key.clone())
        .collect()
}

/// Existing rows that reconciliation against `mode` would drop.
#[must_use]
pub fn orphaned_entries(existing: &[AttributeEntry], mode: &SchemaMode) -> Vec<AttributeEntry> {
    let Some(schema) = mode.schema() else {
        return Vec::new();
    };

    orphans(existing, schema).cloned().collect()
}

fn reconcile_schema(existing: &[AttributeEntry], schema: &FieldSchema) -> Vec<AttributeEntry> {
    let rows: Vec<AttributeEntry> = schema
        .iter()
        .map(|field| {
            let value = existing
                .iter()
                .find(|entry| key::keys_match(&entry.key, &field.key))
                .map(|entry| entry.value.clone())
                .unwrap_or_default();

            AttributeEntry::bound(field, value)
        })
        .collect();

    let dropped = orphans(existing, schema).count();
    if dropped > 0 {
        debug!(dropped, fields = schema.len(), "reconcile dropped orphaned entries");
    }

    rows
}

fn orphans<'a>(
    existing: &'a [AttributeEntry],
    schema: &'a FieldSchema,
) -> impl Iterator<Item = &'a AttributeEntry> {
    existing
        .iter()
        .filter(|entry| !entry.is_blank() && !schema.contains(&entry.key))
}

///
/// TESTS
///
