// Roster store: in-memory record collection with explicit persistence

use crate::record::{self, Record};
use crate::storage::KeyValueStorage;
use eyre::{Context, Result};
use std::fmt;
use tracing::{debug, info, warn};

/// Where the in-memory collection came from when the store was opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// A valid persisted collection was adopted
    Persisted,
    /// Nothing was persisted under the key; defaults were loaded
    Empty,
    /// Persisted value could not be used; defaults were loaded
    Invalid,
    /// Store was created empty without consulting storage
    Fresh,
}

impl fmt::Display for LoadSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadSource::Persisted => write!(f, "Loaded from storage"),
            LoadSource::Empty => write!(f, "Storage empty, loaded default data"),
            LoadSource::Invalid => write!(f, "Storage invalid, loaded default data"),
            LoadSource::Fresh => write!(f, "Started with an empty roster"),
        }
    }
}

/// Owns the record collection and persists it through a key-value storage
///
/// Records are kept in insertion order. Ids are assigned by `create` as
/// max(existing ids, 0) + 1. Nothing is written to storage until `save`.
pub struct Store<T: Record, S: KeyValueStorage> {
    storage: S,
    key: String,
    records: Vec<T>,
    source: LoadSource,
}

impl<T: Record, S: KeyValueStorage> Store<T, S> {
    /// Open a store and hydrate it from `T::storage_key()`
    pub fn open(storage: S) -> Self {
        Self::open_with_key(storage, T::storage_key())
    }

    /// Open a store and hydrate it from a custom key
    pub fn open_with_key(storage: S, key: impl Into<String>) -> Self {
        let mut store = Self::empty_with_key(storage, key);
        store.hydrate();
        store
    }

    /// Store with an empty collection; storage is not read
    pub fn empty(storage: S) -> Self {
        Self::empty_with_key(storage, T::storage_key())
    }

    fn empty_with_key(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            records: Vec::new(),
            source: LoadSource::Fresh,
        }
    }

    /// Read the persisted value and run `load` on it
    fn hydrate(&mut self) {
        let raw = match self.storage.get_item(&self.key) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key = %self.key, error = ?e, "Failed to read storage, treating as empty");
                None
            }
        };

        let raw = match raw {
            Some(raw) if !raw.trim().is_empty() => raw,
            _ => {
                self.load(None);
                return;
            }
        };

        match serde_json::from_str::<Vec<T>>(&raw) {
            Ok(records) => {
                self.load(Some(records));
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "Persisted value is not a record list, loading defaults");
                self.load_defaults(LoadSource::Invalid);
            }
        }
    }

    /// Replace the collection with `persisted` when it is valid, else with the defaults
    ///
    /// Returns the adopted records; `source()` tells which case applied.
    /// Ownership of `persisted` moves into the store, and the default dataset is a
    /// fresh copy, so the collection never aliases another buffer.
    pub fn load(&mut self, persisted: Option<Vec<T>>) -> &[T] {
        match persisted {
            Some(records) if record::is_valid_collection(&records) => {
                self.records = records;
                self.source = LoadSource::Persisted;
                info!(key = %self.key, count = self.records.len(), "Loaded roster from storage");
            }
            Some(records) => {
                warn!(
                    key = %self.key,
                    count = records.len(),
                    "Persisted records break id or field invariants, loading defaults"
                );
                self.load_defaults(LoadSource::Invalid)
            }
            None => self.load_defaults(LoadSource::Empty),
        }
        &self.records
    }

    fn load_defaults(&mut self, source: LoadSource) {
        self.records = T::default_dataset();
        self.source = source;
        info!(key = %self.key, count = self.records.len(), ?source, "Loaded default roster");
    }

    // ========================================================================
    // CRUD
    // ========================================================================

    /// Append a new record with the next id and return it
    pub fn create(&mut self, fields: T::Fields) -> T {
        let id = record::next_id(&self.records);
        let record = T::from_fields(id, fields);
        self.records.push(record.clone());
        debug!(id, "create: appended");
        record
    }

    /// Replace the record with `id` in place; false if there is none
    pub fn update(&mut self, id: u64, fields: T::Fields) -> bool {
        match self.records.iter().position(|r| r.id() == id) {
            Some(index) => {
                self.records[index] = T::from_fields(id, fields);
                debug!(id, index, "update: replaced");
                true
            }
            None => {
                debug!(id, "update: no such record");
                false
            }
        }
    }

    /// Remove every record with `id`; absent ids are ignored
    pub fn delete(&mut self, id: u64) {
        let before = self.records.len();
        self.records.retain(|r| r.id() != id);
        debug!(id, removed = before - self.records.len(), "delete: done");
    }

    /// Look up a record by id
    pub fn get(&self, id: u64) -> Option<&T> {
        self.records.iter().find(|r| r.id() == id)
    }

    /// Current records in insertion order
    pub fn list(&self) -> &[T] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Write the whole collection under the store key, overwriting the old value
    pub fn save(&mut self) -> Result<()> {
        let json = serde_json::to_string(&self.records).context("Failed to serialize records")?;
        self.storage
            .set_item(&self.key, &json)
            .with_context(|| format!("Failed to save roster under {}", self.key))?;
        info!(key = %self.key, count = self.records.len(), "Saved roster");
        Ok(())
    }

    /// Remove the persisted value and go back to the default dataset
    pub fn reset(&mut self) -> Result<()> {
        self.storage
            .remove_item(&self.key)
            .with_context(|| format!("Failed to remove {} from storage", self.key))?;
        self.load(None);
        info!(key = %self.key, "Reset roster to default data");
        Ok(())
    }

    /// How the collection was last loaded
    pub fn source(&self) -> LoadSource {
        self.source
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Give the storage back, dropping the in-memory collection
    pub fn into_storage(self) -> S {
        self.storage
    }
}
