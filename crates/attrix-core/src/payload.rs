//! Field-definition payloads produced when an asset type's schema is edited.

use crate::{
    entry::AttributeEntry,
    error::ValidationError,
    key,
    schema::{FieldDefinition, FieldType},
    unit::UnitId,
};
use convert_case::{Case, Casing};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

///
/// FieldDraft
///
/// One editable row of the schema editor. `key` is set for fields that
/// already exist; new fields get their key from the label on save.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct FieldDraft {
    pub key: Option<String>,
    pub label: String,
    pub field_type: FieldType,
    pub required: bool,
    pub unit_id: Option<UnitId>,
    pub active: bool,
}

impl FieldDraft {
    #[must_use]
    pub fn new(label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            label: label.into(),
            field_type,
            active: true,
            ..Self::default()
        }
    }
}

impl From<&FieldDefinition> for FieldDraft {
    fn from(field: &FieldDefinition) -> Self {
        Self {
            key: Some(field.key.clone()),
            label: field.label.clone(),
            field_type: field.field_type,
            required: field.required,
            unit_id: field.unit_id,
            active: true,
        }
    }
}

///
/// FieldDefinitionPayload
///
/// Wire shape the asset-type collaborator accepts for one field.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct FieldDefinitionPayload {
    pub name: String,
    pub label: String,
    pub input_type: FieldType,
    pub required: bool,
    pub unit_id: Option<UnitId>,
    pub active: bool,
}

/// Turn schema-editor drafts into field-definition payloads.
///
/// Drafts with a blank label are dropped. Remaining drafts keep their
/// existing key or derive one from the label; an empty derived key is
/// `KeyRequired` and a case-insensitive collision is `DuplicateKey`.
pub fn build_field_payload(
    drafts: &[FieldDraft],
) -> Result<Vec<FieldDefinitionPayload>, ValidationError> {
    let mut seen = HashSet::with_capacity(drafts.len());
    let mut payload = Vec::with_capacity(drafts.len());

    for draft in drafts {
        let label = draft.label.trim();
        if label.is_empty() {
            continue;
        }

        let name = match draft.key.as_deref().map(str::trim) {
            Some(existing) if !existing.is_empty() => existing.to_string(),
            _ => key::slugify(label),
        };
        if name.is_empty() {
            return Err(ValidationError::KeyRequired);
        }
        if !seen.insert(key::fold_key(&name)) {
            return Err(ValidationError::DuplicateKey { key: name });
        }

        payload.push(FieldDefinitionPayload {
            name,
            label: label.to_string(),
            input_type: draft.field_type,
            required: draft.required,
            unit_id: draft.unit_id,
            active: draft.active,
        });
    }

    Ok(payload)
}

/// Seed schema drafts from free-form rows, so an asset type can adopt the
/// attributes its assets already carry. Keys are kept; labels are the
/// title-cased key.
#[must_use]
pub fn drafts_from_entries(entries: &[AttributeEntry]) -> Vec<FieldDraft> {
    let mut seen = HashSet::new();

    entries
        .iter()
        .filter(|entry| !entry.key.trim().is_empty())
        .filter(|entry| seen.insert(key::fold_key(entry.key.trim())))
        .map(|entry| {
            let key = entry.key.trim();

            FieldDraft {
                key: Some(key.to_string()),
                label: key.to_case(Case::Title),
                field_type: entry.field_type(),
                required: false,
                unit_id: entry.unit_id,
                active: true,
            }
        })
        .collect()
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn derives_names_from_labels() {
        let drafts = vec![
            FieldDraft::new("Çalışma Şekli", FieldType::Text),
            FieldDraft::new("   ", FieldType::Number),
            FieldDraft {
                required: true,
                unit_id: UnitId::new(3),
                ..FieldDraft::new("Weight (kg)", FieldType::Number)
            },
        ];

        let payload = build_field_payload(&drafts).expect("payload should build");

        assert_eq!(payload.len(), 2);
        assert_eq!(payload[0].name, "calisma_sekli");
        assert_eq!(payload[1].name, "weight_kg");
        assert_eq!(
            serde_json::to_value(&payload[1]).expect("payload should serialize"),
            json!({
                "name": "weight_kg",
                "label": "Weight (kg)",
                "input_type": "number",
                "required": true,
                "unit_id": 3,
                "active": true,
            })
        );
    }

    #[test]
    fn existing_keys_are_immutable() {
        let drafts = vec![FieldDraft {
            key: Some("renk".to_string()),
            ..FieldDraft::new("Colour", FieldType::Text)
        }];

        let payload = build_field_payload(&drafts).expect("payload should build");
        assert_eq!(payload[0].name, "renk");
        assert_eq!(payload[0].label, "Colour");
    }

    #[test]
    fn symbol_only_label_needs_a_key() {
        let drafts = vec![FieldDraft::new("!!!", FieldType::Text)];

        assert_eq!(
            build_field_payload(&drafts),
            Err(ValidationError::KeyRequired)
        );
    }

    #[test]
    fn colliding_labels_are_duplicates() {
        let drafts = vec![
            FieldDraft::new("Renk", FieldType::Text),
            FieldDraft::new("renk!!", FieldType::Text),
        ];

        assert_eq!(
            build_field_payload(&drafts),
            Err(ValidationError::DuplicateKey {
                key: "renk".to_string()
            })
        );
    }

    #[test]
    fn drafts_seeded_from_free_form_rows() {
        let rows = vec![
            AttributeEntry::new("serial_number", "X"),
            AttributeEntry::new("SERIAL_NUMBER", "Y"),
            AttributeEntry::new("", "orphan"),
            AttributeEntry::new("weight", "3").with_unit(UnitId::new(2)),
        ];

        let drafts = drafts_from_entries(&rows);

        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].key.as_deref(), Some("serial_number"));
        assert_eq!(drafts[0].label, "Serial Number");
        assert_eq!(drafts[1].unit_id, UnitId::new(2));
    }
}
