//! Catalog - the single entry point shared by every caller.
//!
//! A `Catalog` is built once at start-up and handed out by reference (usually
//! `Arc<Catalog>`). Reads go through the admission gate; single-record CRUD
//! and bulk import go straight to the store.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use record_catalog::{Catalog, CatalogConfig, QuerySpec, RecordDraft};
//!
//! let catalog = Arc::new(Catalog::new(CatalogConfig::from_env()));
//! let record = catalog.create(RecordDraft::new("1984", "George Orwell", "Dystopia"))?;
//! let page = catalog.query(&QuerySpec::default().search("orwell"))?;
//! assert_eq!(page.total_count, 1);
//! ```

use std::io::BufRead;

use crate::config::CatalogConfig;
use crate::error::CatalogError;
use crate::gate::{AdmissionGate, GateStats};
use crate::import::{self, ImportError, ImportSummary};
#[cfg(feature = "emitter")]
use crate::notify::{Change, ChangeNotifier};
use crate::query::{self, DistinctField, PagedResult, QuerySpec};
use crate::record::{Record, RecordDraft};
use crate::store::{InMemoryRecordStore, RecordStore};

pub struct Catalog<S = InMemoryRecordStore> {
    store: S,
    gate: AdmissionGate,
    config: CatalogConfig,
    #[cfg(feature = "emitter")]
    notifier: ChangeNotifier,
}

impl Catalog<InMemoryRecordStore> {
    /// Create an empty catalog over a fresh in-memory store.
    pub fn new(config: CatalogConfig) -> Self {
        Self::with_store(InMemoryRecordStore::new(), config)
    }
}

impl Default for Catalog<InMemoryRecordStore> {
    fn default() -> Self {
        Self::new(CatalogConfig::default())
    }
}

impl<S: RecordStore> Catalog<S> {
    pub fn with_store(store: S, config: CatalogConfig) -> Self {
        Self {
            store,
            gate: AdmissionGate::new(config.gate_capacity),
            config,
            #[cfg(feature = "emitter")]
            notifier: ChangeNotifier::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn gate_stats(&self) -> GateStats {
        self.gate.stats()
    }

    /// Validate and store a new record.
    pub fn create(&self, draft: RecordDraft) -> Result<Record, CatalogError> {
        draft.validate()?;
        let record = self.store.create(draft)?;
        #[cfg(feature = "emitter")]
        self.notifier.created(&record);
        Ok(record)
    }

    pub fn get(&self, id: u64) -> Result<Option<Record>, CatalogError> {
        self.store.get(id)
    }

    /// Validate and replace a record's fields. `false` when the id is
    /// unknown or a concurrent writer got there first.
    pub fn update(&self, id: u64, draft: RecordDraft) -> Result<bool, CatalogError> {
        draft.validate()?;
        let Some(record) = self.store.replace(id, draft)? else {
            return Ok(false);
        };
        #[cfg(feature = "emitter")]
        self.notifier.updated(&record);
        #[cfg(not(feature = "emitter"))]
        let _ = record;
        Ok(true)
    }

    pub fn delete(&self, id: u64) -> Result<bool, CatalogError> {
        let deleted = self.store.delete(id)?;
        #[cfg(feature = "emitter")]
        if deleted {
            self.notifier.deleted(id);
        }
        Ok(deleted)
    }

    /// Evaluate a query against a fresh snapshot, holding a gate slot for
    /// the duration.
    ///
    /// Returns `CatalogError::RateLimited` if no slot frees up within the
    /// configured timeout; the evaluator is not run in that case.
    pub fn query(&self, spec: &QuerySpec) -> Result<PagedResult<Record>, CatalogError> {
        let _permit = self.gate.acquire(self.config.query_timeout())?;
        let snapshot = self.store.list_snapshot()?;
        Ok(query::evaluate(&snapshot, spec)?)
    }

    /// Import comma-separated rows. Bypasses the admission gate; every
    /// imported row is announced like a single create.
    pub fn import_bulk<R: BufRead>(&self, reader: R) -> Result<ImportSummary, ImportError> {
        let summary = import::import_with(reader, |draft| {
            let record = self.store.create(draft)?;
            #[cfg(feature = "emitter")]
            self.notifier.created(&record);
            Ok(record)
        })?;
        tracing::info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            "bulk import completed"
        );
        Ok(summary)
    }

    /// Sorted distinct categories or authors.
    pub fn list_distinct(&self, field: DistinctField) -> Result<Vec<String>, CatalogError> {
        let snapshot = self.store.list_snapshot()?;
        Ok(query::distinct(&snapshot, field))
    }

    /// Register a listener for committed creates, updates and deletes.
    #[cfg(feature = "emitter")]
    pub fn on_change<F>(&self, listener: F)
    where
        F: Fn(Change) + Send + Sync + Clone + 'static,
    {
        self.notifier.on_change(listener);
    }

    /// Load the demonstration records. Returns how many were added.
    pub fn seed_samples(&self) -> Result<usize, CatalogError> {
        let samples = sample_drafts();
        let count = samples.len();
        for draft in samples {
            self.create(draft)?;
        }
        Ok(count)
    }
}

fn sample_drafts() -> Vec<RecordDraft> {
    vec![
        RecordDraft::new("1984", "George Orwell", "Dystopia")
            .with_description("Dystopian novel by George Orwell, published in 1949.")
            .with_publication_year(1949)
            .with_external_code("978-5-17-080115-9"),
        RecordDraft::new("Crime and Punishment", "Fyodor Dostoevsky", "Novel")
            .with_description("Psychological and philosophical novel by Fyodor Dostoevsky.")
            .with_publication_year(1866)
            .with_external_code("978-5-17-085554-1"),
        RecordDraft::new("The Master and Margarita", "Mikhail Bulgakov", "Fantasy")
            .with_description(
                "Novel by Mikhail Bulgakov, written from the late 1920s until the author's death.",
            )
            .with_publication_year(1967)
            .with_external_code("978-5-17-103233-8"),
        RecordDraft::new(
            "Harry Potter and the Philosopher's Stone",
            "J. K. Rowling",
            "Fantasy",
        )
        .with_description("The first novel in the series about the young wizard Harry Potter.")
        .with_publication_year(1997)
        .with_external_code("978-5-389-07435-4"),
        RecordDraft::new("War and Peace", "Leo Tolstoy", "Epic novel")
            .with_description(
                "Leo Tolstoy's epic of Russian society during the Napoleonic wars of 1805-1812.",
            )
            .with_publication_year(1869)
            .with_external_code("978-5-389-06556-7"),
    ]
}
