//! Edit-session host for one asset's attributes.
//!
//! The session owns the asset's rows while a user edits them and tracks the
//! asset-type schema fetch. Saving is refused while a fetch is outstanding,
//! and a fetch superseded by a newer one is discarded (last write wins).

use crate::error::{Error, ErrorKind, ErrorOrigin};
use attrix_config::AttrixConfig;
use attrix_core::{
    alias::{AliasGroup, AliasResolver},
    document::{self, AttributeDocument},
    entry::AttributeEntry,
    key,
    mode::SchemaMode,
    reconcile,
    schema::{self, RawFieldRow},
    validate,
};
use serde_json::{Map, Value};
use tracing::{debug, warn};

///
/// SchemaTicket
///
/// Handle for one schema fetch. Only the most recently issued ticket can
/// apply its result.
///

#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct SchemaTicket(u64);

///
/// AttributeEditor
///

#[derive(Clone, Debug)]
pub struct AttributeEditor {
    mode: SchemaMode,
    entries: Vec<AttributeEntry>,
    stored: Map<String, Value>,
    stored_entries: Vec<AttributeEntry>,
    hidden: Vec<AttributeEntry>,
    aliases: AliasResolver,
    keep_orphaned: bool,
    issued: u64,
    pending: Option<u64>,
}

impl AttributeEditor {
    /// Open a session over a stored attribute document, in free-form mode.
    #[must_use]
    pub fn open(stored: &Value, config: &AttrixConfig) -> Self {
        let entries = document::deserialize(stored);
        debug!(entries = entries.len(), "opened attribute editor");

        Self {
            mode: SchemaMode::FreeForm,
            stored_entries: entries.clone(),
            entries,
            stored: stored.as_object().cloned().unwrap_or_default(),
            hidden: Vec::new(),
            aliases: alias_resolver(config),
            keep_orphaned: config.editor.keep_orphaned,
            issued: 0,
            pending: None,
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[AttributeEntry] {
        &self.entries
    }

    #[must_use]
    pub const fn mode(&self) -> &SchemaMode {
        &self.mode
    }

    #[must_use]
    pub const fn is_schema_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Mark a schema fetch as outstanding. Any earlier ticket is superseded.
    pub fn begin_schema_fetch(&mut self) -> SchemaTicket {
        self.issued += 1;
        self.pending = Some(self.issued);
        debug!(ticket = self.issued, "schema fetch started");

        SchemaTicket(self.issued)
    }

    /// Apply a fetched schema. Returns `false` when the ticket was superseded
    /// and the result discarded.
    pub fn apply_schema(&mut self, ticket: SchemaTicket, rows: &[RawFieldRow]) -> bool {
        if self.pending != Some(ticket.0) {
            warn!(ticket = ticket.0, latest = self.issued, "discarding superseded schema");
            return false;
        }

        let mode = SchemaMode::from_schema(schema::parse_schema(rows));
        let basis = self.reconcile_basis();

        self.entries = reconcile::reconcile(&basis, &mode);
        self.hidden = reconcile::orphaned_entries(&basis, &mode);
        self.mode = mode;
        self.pending = None;
        debug!(
            ticket = ticket.0,
            schema_bound = self.mode.is_schema_bound(),
            entries = self.entries.len(),
            "applied schema"
        );

        true
    }

    /// [`apply_schema`](Self::apply_schema) for a JSON array of raw rows.
    pub fn apply_schema_json(&mut self, ticket: SchemaTicket, rows: &Value) -> bool {
        let rows: Vec<RawFieldRow> = rows
            .as_array()
            .map(|rows| rows.iter().filter_map(RawFieldRow::from_json).collect())
            .unwrap_or_default();

        self.apply_schema(ticket, &rows)
    }

    /// Abandon a failed fetch; the current mode is kept.
    pub fn cancel_schema_fetch(&mut self, ticket: SchemaTicket) {
        if self.pending == Some(ticket.0) {
            self.pending = None;
        }
    }

    /// Set a row's value by case-insensitive key. New rows may only be added
    /// in free-form mode.
    pub fn set_value(&mut self, key: &str, value: impl Into<String>) -> Result<(), Error> {
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|entry| key::keys_match(&entry.key, key))
        {
            entry.value = value.into();
            return Ok(());
        }

        self.insert_entry(AttributeEntry::new(key, value))
    }

    pub fn insert_entry(&mut self, entry: AttributeEntry) -> Result<(), Error> {
        self.require_free_form("insert")?;
        self.entries.push(entry.into_free_form());

        Ok(())
    }

    /// Remove every row with the given key. Returns whether any was removed.
    pub fn remove_entry(&mut self, key: &str) -> Result<bool, Error> {
        self.require_free_form("remove")?;

        let before = self.entries.len();
        self.entries.retain(|entry| !key::keys_match(&entry.key, key));

        Ok(self.entries.len() != before)
    }

    /// Canonical field value read through the configured aliases.
    #[must_use]
    pub fn alias(&self, canonical: &str) -> String {
        self.aliases.get(&self.entries, canonical)
    }

    pub fn set_alias(&mut self, canonical: &str, value: &str) {
        self.entries = self.aliases.set(&self.entries, canonical, value, &self.mode);
    }

    /// Keys of session rows that the current schema does not present for
    /// editing.
    #[must_use]
    pub fn orphaned_keys(&self) -> Vec<String> {
        self.hidden.iter().map(|entry| entry.key.clone()).collect()
    }

    pub fn validate(&self) -> Result<(), Error> {
        validate::validate_mode(&self.entries, &self.mode).map_err(Error::from)
    }

    /// Validate and serialize the session into the document to persist.
    pub fn save(&self) -> Result<Option<AttributeDocument>, Error> {
        if let Some(ticket) = self.pending {
            warn!(ticket, "save attempted while schema fetch is outstanding");
            return Err(Error::new(
                ErrorKind::SchemaPending,
                ErrorOrigin::Editor,
                "schema for the selected asset type is still loading",
            ));
        }

        self.validate()?;

        let document = document::serialize(&self.entries, &self.mode)
            .map_err(|err| Error::from_validation(err, ErrorOrigin::Serialize))?;

        if !self.keep_orphaned {
            return Ok(document);
        }

        Ok(self.merge_orphans(document))
    }

    // Carry hidden rows into the saved document. Rows still as they were
    // loaded keep their stored JSON verbatim.
    fn merge_orphans(&self, document: Option<AttributeDocument>) -> Option<AttributeDocument> {
        let mut merged = document.map(AttributeDocument::into_inner).unwrap_or_default();

        for entry in &self.hidden {
            let taken = merged.keys().any(|existing| key::keys_match(existing, &entry.key));
            if taken {
                continue;
            }
            if let Some((key, value)) = self.orphan_value(entry) {
                merged.insert(key, value);
            }
        }

        if merged.is_empty() {
            None
        } else {
            Some(AttributeDocument::from(merged))
        }
    }

    fn orphan_value(&self, entry: &AttributeEntry) -> Option<(String, Value)> {
        if self.stored_entries.contains(entry)
            && let Some(value) = self.stored.get(&entry.key)
        {
            return Some((entry.key.clone(), value.clone()));
        }

        let document = document::serialize(std::slice::from_ref(entry), &SchemaMode::FreeForm)
            .ok()
            .flatten()?;

        document.into_inner().into_iter().next()
    }

    // Rows to reconcile a new schema against: the current rows first, then
    // rows a previous schema hid from the editor.
    fn reconcile_basis(&self) -> Vec<AttributeEntry> {
        let mut basis = self.entries.clone();

        for entry in &self.hidden {
            if !basis.iter().any(|row| key::keys_match(&row.key, &entry.key)) {
                basis.push(entry.clone());
            }
        }

        basis
    }

    fn require_free_form(&self, action: &str) -> Result<(), Error> {
        if self.mode.is_schema_bound() {
            return Err(Error::new(
                ErrorKind::Unsupported,
                ErrorOrigin::Editor,
                format!("cannot {action} attribute rows while a schema is active"),
            ));
        }

        Ok(())
    }
}

/// Alias resolver for a host configuration; no groups means the standard set.
#[must_use]
pub fn alias_resolver(config: &AttrixConfig) -> AliasResolver {
    if config.aliases.is_empty() {
        return AliasResolver::standard();
    }

    AliasResolver::new(
        config
            .aliases
            .iter()
            .map(|group| AliasGroup::new(group.canonical.trim(), group.variants.iter().cloned()))
            .collect(),
    )
}

///
/// TESTS
///
