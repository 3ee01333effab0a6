use crate::schema::FieldSchema;

///
/// SchemaMode
///
/// Whether an edit session is driven by an asset type's schema or is
/// free-form. Derived once from the schema and passed explicitly to the
/// reconciler, validator and serializer.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum SchemaMode {
    SchemaBound(FieldSchema),

    #[default]
    FreeForm,
}

impl SchemaMode {
    /// A schema with at least one active field is strict; anything else is
    /// free-form.
    #[must_use]
    pub fn from_schema(schema: FieldSchema) -> Self {
        if schema.is_empty() {
            Self::FreeForm
        } else {
            Self::SchemaBound(schema)
        }
    }

    #[must_use]
    pub const fn schema(&self) -> Option<&FieldSchema> {
        match self {
            Self::SchemaBound(schema) => Some(schema),
            Self::FreeForm => None,
        }
    }

    #[must_use]
    pub const fn is_schema_bound(&self) -> bool {
        matches!(self, Self::SchemaBound(_))
    }
}

impl From<FieldSchema> for SchemaMode {
    fn from(schema: FieldSchema) -> Self {
        Self::from_schema(schema)
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{RawFieldRow, parse_schema};

    #[test]
    fn empty_schema_is_free_form() {
        assert_eq!(
            SchemaMode::from_schema(FieldSchema::default()),
            SchemaMode::FreeForm
        );

        let inactive_only = parse_schema(&[RawFieldRow::new(1, "a", "A").with_active(false)]);
        assert!(!SchemaMode::from(inactive_only).is_schema_bound());
    }

    #[test]
    fn non_empty_schema_is_bound() {
        let mode = SchemaMode::from(parse_schema(&[RawFieldRow::new(1, "a", "A")]));
        assert!(mode.is_schema_bound());
        assert_eq!(mode.schema().map(|schema| schema.len()), Some(1));
    }
}
