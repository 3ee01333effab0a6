//! Field schemas declared by asset types.
//!
//! Raw field rows arrive from collaborators in slightly different shapes
//! (`input_type` vs `data_type`, `unit_id` vs `unitId`, numbers as strings).
//! [`RawFieldRow::from_json`] is the single place those variants are
//! recognized; everything after it works on canonical [`FieldDefinition`]s.

use crate::{key, unit::UnitId};
use derive_more::{Deref, Display, IntoIterator};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::{debug, warn};

///
/// FieldType
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    #[default]
    #[display("text")]
    Text,
    #[display("number")]
    Number,
    #[display("boolean")]
    Boolean,
    #[display("date")]
    Date,
}

impl FieldType {
    /// Parse a type tag, treating anything unrecognized as `Text`.
    #[must_use]
    pub fn parse_lenient(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "number" => Self::Number,
            "boolean" => Self::Boolean,
            "date" => Self::Date,
            _ => Self::Text,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Date => "date",
        }
    }
}

///
/// RawFieldRow
///
/// One field row as delivered by the asset-type collaborator, after
/// variant field names have been folded onto one canonical shape.
///

#[derive(Clone, Debug, PartialEq)]
pub struct RawFieldRow {
    pub id: i64,
    pub name: String,
    pub label: String,
    pub input_type: Option<String>,
    pub required: bool,
    pub unit_id: Option<Value>,
    pub sort_order: i64,
    pub active: bool,
}

impl Default for RawFieldRow {
    fn default() -> Self {
        Self {
            id: 0,
            name: String::new(),
            label: String::new(),
            input_type: None,
            required: false,
            unit_id: None,
            sort_order: 0,
            active: true,
        }
    }
}

impl RawFieldRow {
    #[must_use]
    pub fn new(id: i64, name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            label: label.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_type(mut self, tag: impl Into<String>) -> Self {
        self.input_type = Some(tag.into());
        self
    }

    #[must_use]
    pub const fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    #[must_use]
    pub fn with_unit(mut self, unit_id: u64) -> Self {
        self.unit_id = Some(Value::from(unit_id));
        self
    }

    #[must_use]
    pub const fn with_sort_order(mut self, sort_order: i64) -> Self {
        self.sort_order = sort_order;
        self
    }

    #[must_use]
    pub const fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Normalize one JSON row. Non-object input yields `None`.
    #[must_use]
    pub fn from_json(row: &Value) -> Option<Self> {
        let obj = row.as_object()?;

        Some(Self {
            id: pick(obj, &["id"]).and_then(json_i64).unwrap_or_default(),
            name: pick(obj, &["name", "key"])
                .and_then(json_text)
                .unwrap_or_default(),
            label: pick(obj, &["label"]).and_then(json_text).unwrap_or_default(),
            input_type: pick(obj, &["input_type", "data_type", "inputType", "dataType"])
                .and_then(json_text),
            required: pick(obj, &["required"]).is_some_and(json_truthy),
            unit_id: pick(obj, &["unit_id", "unitId"]).cloned(),
            sort_order: pick(obj, &["sort_order", "sortOrder"])
                .and_then(json_i64)
                .unwrap_or_default(),
            // only an explicit `false` deactivates a row
            active: pick(obj, &["active"]) != Some(&Value::Bool(false)),
        })
    }
}

// First non-null value among the recognized spellings of one field.
fn pick<'a>(obj: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .filter_map(|name| obj.get(*name))
        .find(|value| !value.is_null())
}

fn json_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[expect(clippy::cast_possible_truncation)]
fn json_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn json_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => matches!(s.trim(), "true" | "1"),
        _ => false,
    }
}

///
/// FieldDefinition
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct FieldDefinition {
    pub id: i64,
    pub key: String,
    pub label: String,
    pub field_type: FieldType,
    pub required: bool,
    pub unit_id: Option<UnitId>,
    pub sort_order: i64,
}

impl FieldDefinition {
    /// Label shown in error messages; falls back to the key.
    #[must_use]
    pub fn display_label(&self) -> &str {
        if self.label.trim().is_empty() {
            &self.key
        } else {
            &self.label
        }
    }

    fn from_row(row: &RawFieldRow) -> Self {
        let key = row.name.trim().to_string();
        let label = match row.label.trim() {
            "" => row.name.trim().to_string(),
            label => label.to_string(),
        };

        Self {
            id: row.id,
            key,
            label,
            field_type: row
                .input_type
                .as_deref()
                .map(FieldType::parse_lenient)
                .unwrap_or_default(),
            required: row.required,
            unit_id: row.unit_id.as_ref().and_then(UnitId::from_json),
            sort_order: row.sort_order,
        }
    }
}

///
/// FieldSchema
///
/// Ordered, validated field list for one asset type. Keys are unique
/// case-insensitively and the order is the authoritative edit order.
///

#[derive(Clone, Debug, Default, Deref, Eq, IntoIterator, PartialEq)]
#[into_iterator(owned, ref)]
pub struct FieldSchema {
    fields: Vec<FieldDefinition>,
}

impl FieldSchema {
    /// Build a schema from definitions already in edit order.
    ///
    /// Definitions with an empty key, or a key already seen
    /// case-insensitively, are dropped.
    #[must_use]
    pub fn from_definitions(definitions: impl IntoIterator<Item = FieldDefinition>) -> Self {
        let mut seen = HashSet::new();
        let mut fields = Vec::new();

        for field in definitions {
            if field.key.is_empty() {
                warn!(field_id = field.id, label = %field.label, "dropping field with empty key");
                continue;
            }
            if !seen.insert(key::fold_key(&field.key)) {
                warn!(field_id = field.id, key = %field.key, "dropping field with duplicate key");
                continue;
            }

            fields.push(field);
        }

        Self { fields }
    }

    /// Case-insensitive lookup by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| key::keys_match(&f.key, key))
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    #[must_use]
    pub fn into_fields(self) -> Vec<FieldDefinition> {
        self.fields
    }
}

/// Parse raw field rows into the authoritative schema.
///
/// Inactive rows are discarded, the rest are ordered by `(sort_order, id)`,
/// normalized, and rows with an empty or already-seen key are dropped.
#[must_use]
pub fn parse_schema(rows: &[RawFieldRow]) -> FieldSchema {
    let mut active: Vec<&RawFieldRow> = rows.iter().filter(|row| row.active).collect();
    active.sort_by_key(|row| (row.sort_order, row.id));

    let schema = FieldSchema::from_definitions(
        active.into_iter().map(FieldDefinition::from_row),
    );
    debug!(rows = rows.len(), fields = schema.len(), "parsed field schema");

    schema
}

/// Parse a JSON array of raw field rows; anything else is an empty schema.
#[must_use]
pub fn parse_schema_json(rows: &Value) -> FieldSchema {
    let rows: Vec<RawFieldRow> = rows
        .as_array()
        .map(|rows| rows.iter().filter_map(RawFieldRow::from_json).collect())
        .unwrap_or_default();

    parse_schema(&rows)
}

///
/// TESTS
///
