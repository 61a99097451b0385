//! Change notifications fired by committed mutations.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use record_catalog::{
    Catalog, CatalogConfig, CatalogError, Change, InMemoryRecordStore, Record, RecordDraft,
    RecordStore, Versioned,
};

use crate::support::draft;

#[test]
fn committed_changes_reach_listeners() {
    let catalog = Catalog::new(CatalogConfig::default());
    let (tx, rx) = mpsc::channel();
    let tx = Arc::new(Mutex::new(tx));

    catalog.on_change(move |change| {
        let _ = tx.lock().unwrap().send(change);
    });

    let record = catalog.create(draft("Dune", "Frank Herbert", "SF")).unwrap();
    let created = rx.recv_timeout(Duration::from_secs(2)).unwrap();
    assert_eq!(created, Change::Created(record.clone()));

    assert!(catalog.update(record.id, draft("Dune Messiah", "Frank Herbert", "SF")).unwrap());
    match rx.recv_timeout(Duration::from_secs(2)).unwrap() {
        Change::Updated(updated) => {
            assert_eq!(updated.title, "Dune Messiah");
            assert!(updated.updated_at.is_some());
        }
        other => panic!("unexpected change: {other:?}"),
    }

    assert!(catalog.delete(record.id).unwrap());
    assert_eq!(
        rx.recv_timeout(Duration::from_secs(2)).unwrap(),
        Change::Deleted(record.id)
    );
}

#[test]
fn failed_mutations_stay_silent() {
    let catalog = Catalog::new(CatalogConfig::default());
    let (tx, rx) = mpsc::channel();
    let tx = Arc::new(Mutex::new(tx));

    catalog.on_change(move |change| {
        let _ = tx.lock().unwrap().send(change);
    });

    assert!(!catalog.delete(99).unwrap());
    assert!(!catalog.update(99, draft("x", "y", "z")).unwrap());
    assert!(catalog.create(draft("", "y", "z")).is_err());

    assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
}

#[test]
fn imported_rows_are_announced_as_creates() {
    let catalog = Catalog::new(CatalogConfig::default());
    let (tx, rx) = mpsc::channel();
    let tx = Arc::new(Mutex::new(tx));

    catalog.on_change(move |change| {
        let _ = tx.lock().unwrap().send(change);
    });

    let csv = "Title,Author,Category\nDune,Frank Herbert,SF\n,Nobody,Void\nEmma,Jane Austen,Novel\n";
    let summary = catalog.import_bulk(csv.as_bytes()).unwrap();
    assert_eq!(summary.succeeded, 2);

    let mut titles: Vec<String> = (0..2)
        .map(|_| match rx.recv_timeout(Duration::from_secs(2)).unwrap() {
            Change::Created(record) => record.title,
            other => panic!("unexpected change: {other:?}"),
        })
        .collect();
    titles.sort();
    assert_eq!(titles, vec!["Dune", "Emma"]);
    assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
}

/// Store whose every successful versioned update is immediately followed by
/// a rival writer's update to the same record.
#[derive(Clone, Default)]
struct RivalWriterStore {
    inner: InMemoryRecordStore,
}

impl RecordStore for RivalWriterStore {
    fn create(&self, draft: RecordDraft) -> Result<Record, CatalogError> {
        self.inner.create(draft)
    }

    fn get_versioned(&self, id: u64) -> Result<Option<Versioned<Record>>, CatalogError> {
        self.inner.get_versioned(id)
    }

    fn update_versioned(
        &self,
        id: u64,
        draft: RecordDraft,
        expected_version: u64,
    ) -> Result<Versioned<Record>, CatalogError> {
        let committed = self.inner.update_versioned(id, draft, expected_version)?;
        self.inner
            .update_versioned(id, draft_for("Rival", "Someone Else"), committed.version)?;
        Ok(committed)
    }

    fn delete(&self, id: u64) -> Result<bool, CatalogError> {
        self.inner.delete(id)
    }

    fn list_snapshot(&self) -> Result<Vec<Record>, CatalogError> {
        self.inner.list_snapshot()
    }

    fn len(&self) -> Result<usize, CatalogError> {
        self.inner.len()
    }
}

fn draft_for(title: &str, author: &str) -> RecordDraft {
    draft(title, author, "SF")
}

#[test]
fn update_announces_the_version_it_committed() {
    let catalog = Catalog::with_store(RivalWriterStore::default(), CatalogConfig::default());
    let record = catalog.create(draft_for("Dune", "Frank Herbert")).unwrap();

    let (tx, rx) = mpsc::channel();
    let tx = Arc::new(Mutex::new(tx));
    catalog.on_change(move |change| {
        let _ = tx.lock().unwrap().send(change);
    });

    assert!(catalog.update(record.id, draft_for("Dune Messiah", "Frank Herbert")).unwrap());

    match rx.recv_timeout(Duration::from_secs(2)).unwrap() {
        Change::Updated(updated) => {
            assert_eq!(updated.title, "Dune Messiah");
            assert_eq!(updated.author, "Frank Herbert");
        }
        other => panic!("unexpected change: {other:?}"),
    }
    // The rival's write is what the store holds now.
    assert_eq!(catalog.get(record.id).unwrap().unwrap().title, "Rival");
}
