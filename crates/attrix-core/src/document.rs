//! Conversion between editable rows and the persisted attribute document.
//!
//! The document is a flat JSON object mapping each key either to a bare
//! scalar or, when a unit is attached, to `{ "value": scalar, "unit_id": id }`.
//! "No attributes" is persisted as `null`, never as `{}`.

use crate::{
    coerce,
    entry::AttributeEntry,
    error::ValidationError,
    mode::SchemaMode,
    schema::FieldType,
    unit::UnitId,
    validate,
};
use derive_more::Deref;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

const VALUE_FIELD: &str = "value";
const UNIT_FIELD: &str = "unit_id";
const UNIT_FIELD_CAMEL: &str = "unitId";

///
/// AttributeDocument
///
/// Non-empty attribute document as stored on an asset record.
///

#[derive(Clone, Debug, Default, Deref, Deserialize, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AttributeDocument(Map<String, Value>);

impl AttributeDocument {
    #[must_use]
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }

    /// JSON form of an optional document; `None` becomes `null`.
    #[must_use]
    pub fn to_json(document: Option<&Self>) -> Value {
        document.map_or(Value::Null, |doc| Value::Object(doc.0.clone()))
    }
}

impl From<Map<String, Value>> for AttributeDocument {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<AttributeDocument> for Value {
    fn from(document: AttributeDocument) -> Self {
        Self::Object(document.0)
    }
}

/// Serialize editable rows into the persisted document.
///
/// Keys are trimmed and blank rows dropped; the structural key checks run
/// in every mode. Values are typed by the schema field when one matches,
/// otherwise by the row's own binding.
pub fn serialize(
    entries: &[AttributeEntry],
    mode: &SchemaMode,
) -> Result<Option<AttributeDocument>, ValidationError> {
    let rows: Vec<AttributeEntry> = entries
        .iter()
        .filter(|entry| !entry.is_blank())
        .map(|entry| AttributeEntry {
            key: entry.key.trim().to_string(),
            ..entry.clone()
        })
        .collect();

    validate::validate_keys(&rows)?;

    if rows.is_empty() {
        return Ok(None);
    }

    let mut document = Map::with_capacity(rows.len());
    for entry in rows {
        let field_type = mode
            .schema()
            .and_then(|schema| schema.get(&entry.key))
            .map_or_else(|| entry.field_type(), |field| field.field_type);
        let scalar = to_scalar(&entry.value, field_type);

        let stored = match entry.unit_id {
            Some(unit_id) => {
                let mut wrapped = Map::with_capacity(2);
                wrapped.insert(VALUE_FIELD.to_string(), scalar);
                wrapped.insert(UNIT_FIELD.to_string(), Value::from(unit_id.get()));
                Value::Object(wrapped)
            }
            None => scalar,
        };

        document.insert(entry.key, stored);
    }

    Ok(Some(AttributeDocument(document)))
}

/// Read a stored document back into free-form rows.
///
/// Anything other than a JSON object yields no rows. Values are rendered as
/// text; unit references that are not positive integers are ignored, and a
/// usable `unitId` wins over `unit_id`.
#[must_use]
pub fn deserialize(document: &Value) -> Vec<AttributeEntry> {
    let Some(document) = document.as_object() else {
        return Vec::new();
    };

    document
        .iter()
        .map(|(key, stored)| {
            let (value, unit_id) = match stored {
                Value::Object(wrapped) => (
                    wrapped.get(VALUE_FIELD).map(render).unwrap_or_default(),
                    wrapped
                        .get(UNIT_FIELD_CAMEL)
                        .and_then(UnitId::from_json)
                        .or_else(|| wrapped.get(UNIT_FIELD).and_then(UnitId::from_json)),
                ),
                bare => (render(bare), None),
            };

            AttributeEntry::new(key.clone(), value).with_unit(unit_id)
        })
        .collect()
}

// Values that do not parse as their field type are kept as text so a
// round trip never loses them.
fn to_scalar(value: &str, field_type: FieldType) -> Value {
    let value = value.trim();
    if value.is_empty() {
        return Value::Null;
    }

    let typed = match field_type {
        FieldType::Number => number_value(value),
        FieldType::Boolean => coerce::parse_boolean(value).map(Value::Bool),
        FieldType::Text | FieldType::Date => None,
    };

    typed.unwrap_or_else(|| Value::String(value.to_string()))
}

// Integers are written as JSON integers so `10` stays `10`. Integral values
// an f64 cannot hold exactly stay as text.
#[expect(clippy::cast_possible_truncation)]
fn number_value(text: &str) -> Option<Value> {
    // 2^53
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;

    if let Ok(n) = text.parse::<i64>() {
        return Some(Value::from(n));
    }
    if let Ok(n) = text.parse::<u64>() {
        return Some(Value::from(n));
    }

    let n = coerce::parse_number(text)?;
    if n.fract() != 0.0 {
        return Number::from_f64(n).map(Value::Number);
    }
    if n.abs() <= MAX_EXACT {
        return Some(Value::from(n as i64));
    }

    None
}

fn render(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => render_number(n),
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

// Integral floats render without a trailing `.0`.
fn render_number(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if !n.is_i64() && !n.is_u64() && f.fract() == 0.0 && f.abs() < 1e15 => {
            format!("{f:.0}")
        }
        _ => n.to_string(),
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{RawFieldRow, parse_schema};
    use serde_json::json;

    fn unit(id: u64) -> Option<UnitId> {
        UnitId::new(id)
    }

    fn doc_json(result: Result<Option<AttributeDocument>, ValidationError>) -> Value {
        let document = result.expect("serialize should succeed");
        AttributeDocument::to_json(document.as_ref())
    }

    #[test]
    fn blank_rows_collapse_to_null() {
        let rows = vec![AttributeEntry::new("", ""), AttributeEntry::new("  ", "   ")];

        assert_eq!(doc_json(serialize(&rows, &SchemaMode::FreeForm)), Value::Null);
        assert_eq!(doc_json(serialize(&[], &SchemaMode::FreeForm)), Value::Null);
    }

    #[test]
    fn unit_wrapped_number() {
        let mode = SchemaMode::from(parse_schema(&[
            RawFieldRow::new(1, "weight", "Weight").with_type("number").with_unit(3),
        ]));
        let rows = vec![AttributeEntry::new("weight", "10").with_unit(unit(3))];

        let document = doc_json(serialize(&rows, &mode));
        assert_eq!(document, json!({ "weight": { "value": 10, "unit_id": 3 } }));

        let back = deserialize(&document);
        assert_eq!(back, vec![AttributeEntry::new("weight", "10").with_unit(unit(3))]);
    }

    #[test]
    fn scalars_follow_field_type() {
        let mode = SchemaMode::from(parse_schema(&[
            RawFieldRow::new(1, "count", "Count").with_type("number"),
            RawFieldRow::new(2, "ratio", "Ratio").with_type("number"),
            RawFieldRow::new(3, "on", "On").with_type("boolean"),
            RawFieldRow::new(4, "off", "Off").with_type("boolean"),
            RawFieldRow::new(5, "since", "Since").with_type("date"),
            RawFieldRow::new(6, "note", "Note"),
            RawFieldRow::new(7, "empty", "Empty").with_type("number"),
        ]));
        let rows = vec![
            AttributeEntry::new("count", " 3 "),
            AttributeEntry::new("ratio", "0.25"),
            AttributeEntry::new("on", "true"),
            AttributeEntry::new("off", "false"),
            AttributeEntry::new("since", "2024-01-02"),
            AttributeEntry::new("note", "  hello "),
            AttributeEntry::new("empty", " "),
        ];

        assert_eq!(
            doc_json(serialize(&rows, &mode)),
            json!({
                "count": 3,
                "ratio": 0.25,
                "on": true,
                "off": false,
                "since": "2024-01-02",
                "note": "hello",
                "empty": null,
            })
        );
    }

    #[test]
    fn free_form_keeps_text() {
        let rows = vec![AttributeEntry::new(" size ", "42")];

        assert_eq!(
            doc_json(serialize(&rows, &SchemaMode::FreeForm)),
            json!({ "size": "42" })
        );
    }

    #[test]
    fn structural_checks_run_in_schema_mode() {
        let mode = SchemaMode::from(parse_schema(&[RawFieldRow::new(1, "a", "A")]));

        let err = serialize(&[AttributeEntry::new("", "x")], &mode)
            .expect_err("keyless row should fail");
        assert_eq!(err, ValidationError::KeyRequired);

        let err = serialize(
            &[AttributeEntry::new("a", "1"), AttributeEntry::new(" A ", "2")],
            &mode,
        )
        .expect_err("duplicate rows should fail");
        assert!(matches!(err, ValidationError::DuplicateKey { .. }));
    }

    #[test]
    fn deserialize_handles_legacy_and_odd_shapes() {
        let rows = deserialize(&json!({
            "brand": "Acme",
            "count": 4,
            "ratio": 2.5,
            "whole": 7.0,
            "flag": false,
            "none": null,
            "camel": { "value": "x", "unitId": 5 },
            "snake": { "value": 1, "unit_id": 6 },
            "bad_unit": { "value": "y", "unit_id": "kg" },
            "no_value": { "unit_id": 2 },
            "nested": { "value": { "a": 1 } },
            "list": [1, 2],
        }));

        let triples: Vec<(&str, &str, Option<UnitId>)> = rows
            .iter()
            .map(|e| (e.key.as_str(), e.value.as_str(), e.unit_id))
            .collect();

        assert_eq!(
            triples,
            vec![
                ("brand", "Acme", None),
                ("count", "4", None),
                ("ratio", "2.5", None),
                ("whole", "7", None),
                ("flag", "false", None),
                ("none", "", None),
                ("camel", "x", unit(5)),
                ("snake", "1", unit(6)),
                ("bad_unit", "y", None),
                ("no_value", "", unit(2)),
                ("nested", r#"{"a":1}"#, None),
                ("list", "[1,2]", None),
            ]
        );
    }

    #[test]
    fn mistyped_values_are_kept_as_text() {
        let mode = SchemaMode::from(parse_schema(&[
            RawFieldRow::new(1, "n", "N").with_type("number"),
            RawFieldRow::new(2, "b", "B").with_type("boolean"),
            RawFieldRow::new(3, "huge", "Huge").with_type("number"),
        ]));
        let rows = vec![
            AttributeEntry::new("n", "abc"),
            AttributeEntry::new("b", "yes"),
            AttributeEntry::new("huge", "1e400"),
        ];

        let document = doc_json(serialize(&rows, &mode));
        assert_eq!(document, json!({ "n": "abc", "b": "yes", "huge": "1e400" }));

        let values: Vec<String> = deserialize(&document).into_iter().map(|e| e.value).collect();
        assert_eq!(values, vec!["abc", "yes", "1e400"]);
    }

    #[test]
    fn large_integers_keep_every_digit() {
        let mode = SchemaMode::from(parse_schema(&[
            RawFieldRow::new(1, "id", "Id").with_type("number"),
            RawFieldRow::new(2, "big", "Big").with_type("number"),
        ]));
        let rows = vec![
            AttributeEntry::new("id", "9007199254740993"),
            AttributeEntry::new("big", "123456789012345678901234567890"),
        ];

        let document = doc_json(serialize(&rows, &mode));
        assert_eq!(document["id"], json!(9_007_199_254_740_993_i64));

        let values: Vec<String> = deserialize(&document).into_iter().map(|e| e.value).collect();
        assert_eq!(
            values,
            vec!["9007199254740993", "123456789012345678901234567890"]
        );
    }

    #[test]
    fn unusable_camel_unit_falls_back_to_snake() {
        let rows = deserialize(&json!({
            "w": { "value": 1, "unitId": "kg", "unit_id": 3 },
            "v": { "value": 2, "unitId": 4, "unit_id": 5 },
            "u": { "value": 3, "unitId": null, "unit_id": 6 },
        }));

        let units: Vec<Option<UnitId>> = rows.iter().map(|e| e.unit_id).collect();
        assert_eq!(units, vec![unit(3), unit(4), unit(6)]);
    }

    #[test]
    fn deserialize_non_object_is_empty() {
        assert!(deserialize(&Value::Null).is_empty());
        assert!(deserialize(&json!([{ "a": 1 }])).is_empty());
        assert!(deserialize(&json!("text")).is_empty());
    }

    #[test]
    fn unit_without_value_round_trips() {
        let rows = vec![AttributeEntry::new("depth", "").with_unit(unit(4))];
        let document = doc_json(serialize(&rows, &SchemaMode::FreeForm));

        assert_eq!(document, json!({ "depth": { "value": null, "unit_id": 4 } }));
        assert_eq!(deserialize(&document), rows);
    }
}
