use std::fmt;
use std::time::Duration;

use crate::gate::AdmissionError;
use crate::import::ImportError;
use crate::query::QueryError;
use crate::record::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    LockPoisoned(&'static str),
    ConcurrencyConflict {
        id: u64,
        expected: u64,
        actual: u64,
    },
    NotFound(u64),
    Validation(ValidationError),
    InvalidQuery(QueryError),
    RateLimited {
        capacity: usize,
        waited: Duration,
    },
    Import(ImportError),
}

impl CatalogError {
    /// HTTP-style status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            CatalogError::LockPoisoned(_) => 500,
            CatalogError::ConcurrencyConflict { .. } => 409,
            CatalogError::NotFound(_) => 404,
            CatalogError::Validation(_) => 400,
            CatalogError::InvalidQuery(_) => 400,
            CatalogError::RateLimited { .. } => 429,
            CatalogError::Import(_) => 400,
        }
    }
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::LockPoisoned(operation) => {
                write!(f, "catalog lock poisoned during {}", operation)
            }
            CatalogError::ConcurrencyConflict {
                id,
                expected,
                actual,
            } => write!(
                f,
                "concurrent write detected for record {} (expected version {}, got {})",
                id, expected, actual
            ),
            CatalogError::NotFound(id) => write!(f, "record not found: {}", id),
            CatalogError::Validation(err) => write!(f, "validation failed: {}", err),
            CatalogError::InvalidQuery(err) => write!(f, "invalid query: {}", err),
            CatalogError::RateLimited { capacity, waited } => write!(
                f,
                "rate limit exceeded: {} concurrent queries in flight, waited {:?}",
                capacity, waited
            ),
            CatalogError::Import(err) => write!(f, "import failed: {}", err),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::Validation(err) => Some(err),
            CatalogError::InvalidQuery(err) => Some(err),
            CatalogError::Import(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for CatalogError {
    fn from(err: ValidationError) -> Self {
        CatalogError::Validation(err)
    }
}

impl From<QueryError> for CatalogError {
    fn from(err: QueryError) -> Self {
        CatalogError::InvalidQuery(err)
    }
}

impl From<AdmissionError> for CatalogError {
    fn from(err: AdmissionError) -> Self {
        match err {
            AdmissionError::Denied { capacity, waited } => {
                CatalogError::RateLimited { capacity, waited }
            }
            AdmissionError::Poisoned => CatalogError::LockPoisoned("admission"),
        }
    }
}

impl From<ImportError> for CatalogError {
    fn from(err: ImportError) -> Self {
        CatalogError::Import(err)
    }
}
