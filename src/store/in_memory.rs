//! InMemoryRecordStore - BTreeMap-backed record store.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use std::time::SystemTime;

use super::{RecordStore, Versioned};
use crate::error::CatalogError;
use crate::record::{Record, RecordDraft};

struct StoreState {
    records: BTreeMap<u64, Versioned<Record>>,
    next_id: u64,
}

/// In-memory record store.
///
/// Ids are assigned under the write lock, so assignment order equals
/// insertion order and ids are never reused. Clone-friendly via Arc; clones
/// share the same records.
#[derive(Clone)]
pub struct InMemoryRecordStore {
    state: Arc<RwLock<StoreState>>,
}

impl Default for InMemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRecordStore {
    /// Create a new empty store. The first record gets id 1.
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(StoreState {
                records: BTreeMap::new(),
                next_id: 1,
            })),
        }
    }
}

impl RecordStore for InMemoryRecordStore {
    fn create(&self, draft: RecordDraft) -> Result<Record, CatalogError> {
        let mut state = self
            .state
            .write()
            .map_err(|_| CatalogError::LockPoisoned("create"))?;

        let id = state.next_id;
        state.next_id += 1;

        let record = Record::from_draft(id, draft, SystemTime::now());
        state.records.insert(
            id,
            Versioned {
                data: record.clone(),
                version: 1,
            },
        );

        Ok(record)
    }

    fn get_versioned(&self, id: u64) -> Result<Option<Versioned<Record>>, CatalogError> {
        let state = self
            .state
            .read()
            .map_err(|_| CatalogError::LockPoisoned("read"))?;
        Ok(state.records.get(&id).cloned())
    }

    fn update_versioned(
        &self,
        id: u64,
        draft: RecordDraft,
        expected_version: u64,
    ) -> Result<Versioned<Record>, CatalogError> {
        let mut state = self
            .state
            .write()
            .map_err(|_| CatalogError::LockPoisoned("update"))?;

        let stored = state
            .records
            .get_mut(&id)
            .ok_or(CatalogError::NotFound(id))?;

        if stored.version != expected_version {
            return Err(CatalogError::ConcurrencyConflict {
                id,
                expected: expected_version,
                actual: stored.version,
            });
        }

        stored.data = stored.data.revised(draft, SystemTime::now());
        stored.version += 1;

        Ok(stored.clone())
    }

    fn delete(&self, id: u64) -> Result<bool, CatalogError> {
        let mut state = self
            .state
            .write()
            .map_err(|_| CatalogError::LockPoisoned("delete"))?;
        Ok(state.records.remove(&id).is_some())
    }

    fn list_snapshot(&self) -> Result<Vec<Record>, CatalogError> {
        let state = self
            .state
            .read()
            .map_err(|_| CatalogError::LockPoisoned("snapshot"))?;
        Ok(state
            .records
            .values()
            .map(|stored| stored.data.clone())
            .collect())
    }

    fn len(&self) -> Result<usize, CatalogError> {
        let state = self
            .state
            .read()
            .map_err(|_| CatalogError::LockPoisoned("read"))?;
        Ok(state.records.len())
    }
}
