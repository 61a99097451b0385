//! Record Store - the thread-safe owner of every catalog record.
//!
//! The store assigns ids, stamps creation and update times, and hands out
//! copies. Callers never lock anything themselves.
//!
//! ## Example
//!
//! ```ignore
//! use record_catalog::{InMemoryRecordStore, RecordDraft, RecordStore};
//!
//! let store = InMemoryRecordStore::new();
//! let record = store.create(RecordDraft::new("1984", "George Orwell", "Dystopia"))?;
//! assert!(store.update(record.id, RecordDraft::new("1984", "G. Orwell", "Dystopia"))?);
//! assert!(store.delete(record.id)?);
//! ```

mod in_memory;

use crate::error::CatalogError;
use crate::record::{Record, RecordDraft};

pub use in_memory::InMemoryRecordStore;

/// A versioned wrapper around stored data for optimistic concurrency control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versioned<T> {
    pub data: T,
    pub version: u64,
}

/// Abstract keyed storage for records.
///
/// A missing id is never an error: lookups return `None`, and `update` /
/// `delete` return `false`. The only failure is a broken storage primitive.
pub trait RecordStore: Send + Sync {
    /// Assign the next id and the current time, insert, and return the copy.
    fn create(&self, draft: RecordDraft) -> Result<Record, CatalogError>;

    /// Get a record by id.
    fn get(&self, id: u64) -> Result<Option<Record>, CatalogError> {
        Ok(self.get_versioned(id)?.map(|stored| stored.data))
    }

    /// Get a record together with its current version.
    fn get_versioned(&self, id: u64) -> Result<Option<Versioned<Record>>, CatalogError>;

    /// Replace the record's fields, keeping `id` and `created_at`.
    ///
    /// Returns `false` if the id is absent or another writer changed the
    /// record between observation and replacement.
    fn update(&self, id: u64, draft: RecordDraft) -> Result<bool, CatalogError> {
        Ok(self.replace(id, draft)?.is_some())
    }

    /// Like `update`, but returns the record exactly as this call committed
    /// it. `None` covers the same cases as `update` returning `false`.
    fn replace(&self, id: u64, draft: RecordDraft) -> Result<Option<Record>, CatalogError> {
        let Some(current) = self.get_versioned(id)? else {
            return Ok(None);
        };

        match self.update_versioned(id, draft, current.version) {
            Ok(stored) => Ok(Some(stored.data)),
            Err(CatalogError::NotFound(_)) => Ok(None),
            Err(CatalogError::ConcurrencyConflict {
                expected, actual, ..
            }) => {
                tracing::debug!(id, expected, actual, "update lost to a concurrent writer");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Conditionally replace the record if its version still equals
    /// `expected_version`.
    fn update_versioned(
        &self,
        id: u64,
        draft: RecordDraft,
        expected_version: u64,
    ) -> Result<Versioned<Record>, CatalogError>;

    /// Remove a record. Returns true if it existed.
    fn delete(&self, id: u64) -> Result<bool, CatalogError>;

    /// Point-in-time copy of every record, ordered by id.
    fn list_snapshot(&self) -> Result<Vec<Record>, CatalogError>;

    /// Number of stored records.
    fn len(&self) -> Result<usize, CatalogError>;

    fn is_empty(&self) -> Result<bool, CatalogError> {
        Ok(self.len()? == 0)
    }
}
