use crate::{
    schema::{FieldDefinition, FieldType},
    unit::UnitId,
};
use serde::{Deserialize, Serialize};

///
/// FieldBinding
///
/// Denormalized copy of the field definition an entry currently matches.
/// Drives editing affordances only and is never persisted.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct FieldBinding {
    pub label: String,
    pub field_type: FieldType,
    pub required: bool,
}

impl From<&FieldDefinition> for FieldBinding {
    fn from(field: &FieldDefinition) -> Self {
        Self {
            label: field.label.clone(),
            field_type: field.field_type,
            required: field.required,
        }
    }
}

///
/// AttributeEntry
///
/// One editable attribute row. Values are always held as text in memory
/// and only typed at validation or serialization time.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct AttributeEntry {
    pub key: String,
    pub value: String,
    pub unit_id: Option<UnitId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binding: Option<FieldBinding>,
}

impl AttributeEntry {
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            unit_id: None,
            binding: None,
        }
    }

    #[must_use]
    pub const fn with_unit(mut self, unit_id: Option<UnitId>) -> Self {
        self.unit_id = unit_id;
        self
    }

    #[must_use]
    pub fn with_binding(mut self, binding: FieldBinding) -> Self {
        self.binding = Some(binding);
        self
    }

    /// Schema-bound row for `field`, carrying `value`.
    #[must_use]
    pub fn bound(field: &FieldDefinition, value: impl Into<String>) -> Self {
        Self {
            key: field.key.clone(),
            value: value.into(),
            unit_id: field.unit_id,
            binding: Some(FieldBinding::from(field)),
        }
    }

    #[must_use]
    pub const fn is_schema_bound(&self) -> bool {
        self.binding.is_some()
    }

    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.binding.as_ref().map(|b| b.label.as_str())
    }

    /// Declared type of the bound field, `Text` for free-form rows.
    #[must_use]
    pub fn field_type(&self) -> FieldType {
        self.binding
            .as_ref()
            .map(|b| b.field_type)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn is_required(&self) -> bool {
        self.binding.as_ref().is_some_and(|b| b.required)
    }

    /// A row with no key, no value and no unit carries nothing.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.key.trim().is_empty() && self.value.trim().is_empty() && self.unit_id.is_none()
    }

    /// Drop schema metadata, keeping only what the document stores.
    #[must_use]
    pub fn into_free_form(self) -> Self {
        Self {
            binding: None,
            ..self
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_ignores_whitespace_but_not_units() {
        assert!(AttributeEntry::new("  ", " ").is_blank());
        assert!(!AttributeEntry::new("", "x").is_blank());
        assert!(!AttributeEntry::new("", "").with_unit(UnitId::new(2)).is_blank());
    }

    #[test]
    fn free_form_rows_default_to_text() {
        let entry = AttributeEntry::new("color", "red");
        assert_eq!(entry.field_type(), FieldType::Text);
        assert!(!entry.is_schema_bound());
        assert!(!entry.is_required());
        assert_eq!(entry.label(), None);
    }
}
