//! Change notifications for committed mutations.
//!
//! Listeners run on the emitter's own threads after the store change is
//! visible, so a slow listener never holds up a writer.

use std::sync::Mutex;

use event_emitter_rs::EventEmitter;

use crate::record::Record;

pub const RECORD_CREATED: &str = "record.created";
pub const RECORD_UPDATED: &str = "record.updated";
pub const RECORD_DELETED: &str = "record.deleted";

/// A committed change, as delivered to [`ChangeNotifier::on_change`]
/// listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Created(Record),
    Updated(Record),
    Deleted(u64),
}

pub struct ChangeNotifier {
    emitter: Mutex<EventEmitter>,
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self {
            emitter: Mutex::new(EventEmitter::new()),
        }
    }

    /// Register a listener for every change kind.
    pub fn on_change<F>(&self, listener: F)
    where
        F: Fn(Change) + Send + Sync + Clone + 'static,
    {
        let Ok(mut emitter) = self.emitter.lock() else {
            tracing::warn!("change notifier poisoned; listener dropped");
            return;
        };
        let created = listener.clone();
        emitter.on(RECORD_CREATED, move |record: Record| created(Change::Created(record)));
        let updated = listener.clone();
        emitter.on(RECORD_UPDATED, move |record: Record| updated(Change::Updated(record)));
        emitter.on(RECORD_DELETED, move |id: u64| listener(Change::Deleted(id)));
    }

    pub fn created(&self, record: &Record) {
        self.emit(RECORD_CREATED, record.clone());
    }

    pub fn updated(&self, record: &Record) {
        self.emit(RECORD_UPDATED, record.clone());
    }

    pub fn deleted(&self, id: u64) {
        self.emit(RECORD_DELETED, id);
    }

    fn emit<T: serde::Serialize>(&self, event: &str, value: T) {
        match self.emitter.lock() {
            Ok(mut emitter) => {
                let _ = emitter.emit(event, value);
            }
            Err(_) => tracing::warn!(event, "change notifier poisoned; event dropped"),
        }
    }
}
