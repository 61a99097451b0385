mod catalog;
mod config;
mod error;
pub mod gate;
pub mod import;
pub mod query;
mod record;
mod store;

#[cfg(feature = "emitter")]
pub mod notify;

#[cfg(feature = "http")]
pub mod http;

pub use catalog::Catalog;
pub use config::{CatalogConfig, DEFAULT_QUERY_TIMEOUT_MS, ENV_GATE_CAPACITY, ENV_QUERY_TIMEOUT_MS};
pub use error::CatalogError;
pub use gate::{AdmissionError, AdmissionGate, GateStats, Permit};
pub use import::{ImportError, ImportSummary};
pub use query::{DistinctField, PagedResult, QueryError, QuerySpec, SortKey};
pub use record::{
    Record, RecordDraft, ValidationError, MAX_AUTHOR_LEN, MAX_CATEGORY_LEN,
    MAX_DESCRIPTION_LEN, MAX_EXTERNAL_CODE_LEN, MAX_PUBLICATION_YEAR, MAX_TITLE_LEN,
    MIN_PUBLICATION_YEAR,
};
pub use store::{InMemoryRecordStore, RecordStore, Versioned};

#[cfg(feature = "emitter")]
pub use notify::{Change, ChangeNotifier};
