//! Catalog integration tests.
//!
//! Exercises the public surface end to end:
//! - Concurrent create / update / delete against one shared catalog
//! - Query laws (pagination, filter conjunction, idempotence)
//! - Bulk import with partial failures
//! - Admission gate denials

mod queries;
#[cfg(feature = "emitter")]
mod notifications;
#[cfg(feature = "http")]
mod http;
