//! Canonical-field access over the generic attribute rows.
//!
//! A few well-known fields (brand, model, serial number) are surfaced as
//! first-class inputs while still living inside the same attribute rows.
//! Rows are matched by key or label against a list of spelling variants,
//! after stripping everything but letters and digits and lowercasing.

use crate::{entry::AttributeEntry, key, mode::SchemaMode};
use serde::{Deserialize, Serialize};

pub const BRAND: &str = "brand";
pub const MODEL: &str = "model";
pub const SERIAL: &str = "serial";

///
/// AliasGroup
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct AliasGroup {
    pub canonical: String,
    pub variants: Vec<String>,
}

impl AliasGroup {
    #[must_use]
    pub fn new<I, S>(canonical: impl Into<String>, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            canonical: canonical.into(),
            variants: variants.into_iter().map(Into::into).collect(),
        }
    }

    /// Variants plus the canonical key itself.
    fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.canonical.as_str()).chain(self.variants.iter().map(String::as_str))
    }
}

///
/// AliasResolver
///
/// The set of canonical fields one call site exposes.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AliasResolver {
    groups: Vec<AliasGroup>,
}

impl Default for AliasResolver {
    fn default() -> Self {
        Self::standard()
    }
}

impl AliasResolver {
    #[must_use]
    pub const fn new(groups: Vec<AliasGroup>) -> Self {
        Self { groups }
    }

    /// Brand, model and serial number with their common spellings.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(vec![
            AliasGroup::new(BRAND, ["marka", "manufacturer", "make"]),
            AliasGroup::new(MODEL, ["model_no", "model_name", "model_adi"]),
            AliasGroup::new(
                SERIAL,
                [
                    "serial_no",
                    "serial_number",
                    "sn",
                    "seri_no",
                    "seri_numarasi",
                ],
            ),
        ])
    }

    #[must_use]
    pub fn groups(&self) -> &[AliasGroup] {
        &self.groups
    }

    #[must_use]
    pub fn group(&self, canonical: &str) -> Option<&AliasGroup> {
        self.groups
            .iter()
            .find(|group| key::keys_match(&group.canonical, canonical))
    }

    /// Value of the canonical field, or empty when no row matches or the
    /// canonical key is unknown.
    #[must_use]
    pub fn get(&self, entries: &[AttributeEntry], canonical: &str) -> String {
        self.group(canonical)
            .map(|group| pick(entries, group.names()))
            .unwrap_or_default()
    }

    /// Write the canonical field through its aliases. Unknown canonical keys
    /// are written under their own name.
    #[must_use]
    pub fn set(
        &self,
        entries: &[AttributeEntry],
        canonical: &str,
        value: &str,
        mode: &SchemaMode,
    ) -> Vec<AttributeEntry> {
        match self.group(canonical) {
            Some(group) => upsert(entries, &group.canonical, group.names(), value, mode),
            None => upsert(entries, canonical, [canonical], value, mode),
        }
    }
}

/// Value of the first row whose key or label matches any alias.
#[must_use]
pub fn pick<I, S>(entries: &[AttributeEntry], aliases: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let aliases = normalize_all(aliases);

    find_index(entries, &aliases)
        .map(|index| entries[index].value.clone())
        .unwrap_or_default()
}

/// Replace the value of the first row matching any alias, or append a new
/// row under `canonical`. Metadata for an appended row comes from the
/// schema field with the canonical key, if there is one.
///
/// Never deletes or renames rows.
#[must_use]
pub fn upsert<I, S>(
    entries: &[AttributeEntry],
    canonical: &str,
    aliases: I,
    value: &str,
    mode: &SchemaMode,
) -> Vec<AttributeEntry>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let aliases = normalize_all(aliases);
    let mut rows = entries.to_vec();

    if let Some(index) = find_index(entries, &aliases) {
        rows[index].value = value.to_string();
        return rows;
    }

    let appended = match mode.schema().and_then(|schema| schema.get(canonical)) {
        Some(field) => AttributeEntry::bound(field, value),
        None => AttributeEntry::new(canonical, value),
    };
    rows.push(appended);

    rows
}

fn find_index(entries: &[AttributeEntry], aliases: &[String]) -> Option<usize> {
    entries.iter().position(|entry| {
        let matches = |text: &str| {
            let text = normalize(text);
            !text.is_empty() && aliases.contains(&text)
        };

        matches(entry.key.as_str()) || entry.label().is_some_and(matches)
    })
}

fn normalize_all<I, S>(aliases: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    aliases
        .into_iter()
        .map(|alias| normalize(alias.as_ref()))
        .filter(|alias| !alias.is_empty())
        .collect()
}

fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        entry::FieldBinding,
        schema::{FieldType, RawFieldRow, parse_schema},
        unit::UnitId,
    };

    #[test]
    fn pick_matches_normalized_keys() {
        let rows = vec![
            AttributeEntry::new("color", "red"),
            AttributeEntry::new("Serial-No", "SN-001"),
        ];

        assert_eq!(pick(&rows, ["serial_no", "serial"]), "SN-001");
        assert_eq!(pick(&rows, ["brand"]), "");
    }

    #[test]
    fn pick_matches_labels() {
        let row = AttributeEntry::new("f_17", "Acme").with_binding(FieldBinding {
            label: "Marka".to_string(),
            field_type: FieldType::Text,
            required: false,
        });

        assert_eq!(AliasResolver::standard().get(&[row], BRAND), "Acme");
    }

    #[test]
    fn pick_returns_first_matching_row() {
        let rows = vec![
            AttributeEntry::new("make", "First"),
            AttributeEntry::new("brand", "Second"),
        ];

        assert_eq!(AliasResolver::standard().get(&rows, BRAND), "First");
    }

    #[test]
    fn upsert_replaces_only_the_value() {
        let rows = vec![
            AttributeEntry::new("Seri No", "old").with_unit(UnitId::new(1)),
            AttributeEntry::new("color", "red"),
        ];

        let next = AliasResolver::standard().set(&rows, SERIAL, "new", &SchemaMode::FreeForm);

        assert_eq!(next.len(), 2);
        assert_eq!(next[0].key, "Seri No");
        assert_eq!(next[0].value, "new");
        assert_eq!(next[0].unit_id, UnitId::new(1));
        assert_eq!(rows[0].value, "old", "input rows are not mutated");
    }

    #[test]
    fn upsert_appends_with_schema_metadata() {
        let mode = SchemaMode::from(parse_schema(&[
            RawFieldRow::new(1, "model", "Model").with_required(true).with_unit(2),
        ]));

        let next = AliasResolver::standard().set(&[], MODEL, "X200", &mode);

        assert_eq!(next.len(), 1);
        assert_eq!(next[0].key, "model");
        assert_eq!(next[0].unit_id, UnitId::new(2));
        assert_eq!(next[0].label(), Some("Model"));
        assert!(next[0].is_required());
    }

    #[test]
    fn upsert_appends_generic_row_without_schema() {
        let next = upsert(&[], "brand", ["brand", "marka"], "Acme", &SchemaMode::FreeForm);

        assert_eq!(next, vec![AttributeEntry::new("brand", "Acme")]);
    }

    #[test]
    fn custom_groups_are_parameters() {
        let resolver = AliasResolver::new(vec![AliasGroup::new("plate", ["plaka", "license"])]);
        let rows = vec![AttributeEntry::new("Plaka", "34 ABC 12")];

        assert_eq!(resolver.get(&rows, "plate"), "34 ABC 12");
        assert_eq!(resolver.get(&rows, BRAND), "");
    }
}
