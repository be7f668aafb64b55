// Integration tests for the snapshot store
// Covers change detection, ordering, path validation and corrupt entries

use japi_core::errors::JapiError;
use japi_core::fingerprint::FingerprintCodec;
use japi_core::key::{Depth, EntityKey};
use japi_core::logging_facility::init_test_capture;
use japi_core_types::schema::FIELD_KEY;
use tracing::Level;
use japi_store::history::{FINGERPRINT_FILE, PAYLOAD_FILE};
use japi_store::timestamp::ManualClock;
use japi_store::{RecordOutcome, SnapshotStore, StoreConfig, Timestamp};
use serde_json::json;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn setup_store(start_ms: u64) -> (TempDir, SnapshotStore, Arc<ManualClock>) {
    let dir = TempDir::new().expect("Failed to create temp store directory");
    let clock = Arc::new(ManualClock::new(start_ms));
    let store = SnapshotStore::with_clock(StoreConfig::new(dir.path()), clock.clone());
    (dir, store, clock)
}

fn login_key() -> EntityKey {
    EntityKey::new("proj1", "pkgA", "login", "postLogin", "v1")
}

fn container_names(store: &SnapshotStore, key: &EntityKey) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(store.resolver().history_dir(key).unwrap())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn count_files(dir: &Path) -> usize {
    fs::read_dir(dir).map(|rd| rd.count()).unwrap_or(0)
}

#[test]
fn test_end_to_end_create_unchanged_modify() {
    // Given: an empty root
    let (_dir, store, clock) = setup_store(1_700_000_000_000);
    let key = login_key();
    let v1 = json!({"params": ["user"]});

    // When: the payload is recorded at t1
    let first = store.record_version(&key, &v1).unwrap();

    // Then: one container named t1 holds the payload and fingerprint
    assert!(matches!(first, RecordOutcome::Created { .. }));
    assert_eq!(container_names(&store, &key), vec!["1700000000000"]);
    let container = store
        .resolver()
        .history_dir(&key)
        .unwrap()
        .join("1700000000000");
    let (bytes, fingerprint) = FingerprintCodec.encode(&v1).unwrap();
    assert_eq!(fs::read(container.join(PAYLOAD_FILE)).unwrap(), bytes);
    assert_eq!(
        fs::read_to_string(container.join(FINGERPRINT_FILE)).unwrap(),
        first.fingerprint().as_str()
    );
    assert_eq!(&fingerprint, first.fingerprint());

    // When: the same payload is recorded at t2
    clock.set(1_700_000_000_100);
    let second = store.record_version(&key, &v1).unwrap();

    // Then: nothing new is written
    assert!(matches!(second, RecordOutcome::Unchanged { .. }));
    assert_eq!(container_names(&store, &key).len(), 1);

    // When: a changed payload is recorded at t3
    clock.set(1_700_000_000_200);
    let third = store
        .record_version(&key, &json!({"params": ["user", "pwd"]}))
        .unwrap();

    // Then: a second container exists and latest holds the new payload
    assert!(matches!(third, RecordOutcome::Modified { .. }));
    assert_eq!(
        container_names(&store, &key),
        vec!["1700000000000", "1700000000200"]
    );
    let latest = store.latest(&key).unwrap().unwrap();
    assert_eq!(latest.payload_json().unwrap(), json!({"params": ["user", "pwd"]}));
}

#[test]
fn test_history_is_newest_first() {
    // Given: three distinct payloads recorded at t1 < t2 < t3
    let (_dir, store, clock) = setup_store(1_700_000_000_000);
    let key = login_key();
    for (i, ms) in [1_700_000_000_000u64, 1_700_000_001_000, 1_700_000_002_000]
        .iter()
        .enumerate()
    {
        clock.set(*ms);
        store.record_version(&key, &json!({"rev": i})).unwrap();
    }

    // When: history is listed
    let history = store.history(&key).unwrap();

    // Then: entries come back as t3, t2, t1
    let stamps: Vec<u64> = history.iter().map(|e| e.timestamp.as_millis()).collect();
    assert_eq!(
        stamps,
        vec![1_700_000_002_000, 1_700_000_001_000, 1_700_000_000_000]
    );
}

#[test]
fn test_reordered_object_keys_are_unchanged() {
    // Given: a recorded payload
    let (_dir, store, _clock) = setup_store(1_700_000_000_000);
    let key = login_key();
    store
        .record_version(&key, &json!({"a": 1, "b": {"x": true, "y": null}}))
        .unwrap();

    // When: the same content is recorded with keys in another order
    let outcome = store
        .record_version(&key, &json!({"b": {"y": null, "x": true}, "a": 1}))
        .unwrap();

    // Then: no new entry is written
    assert!(!outcome.is_write());
}

#[test]
fn test_same_millisecond_change_gets_later_timestamp() {
    // Given: a frozen clock
    let (_dir, store, _clock) = setup_store(1_700_000_000_000);
    let key = login_key();

    // When: two different payloads are recorded in the same millisecond
    let a = store.record_version(&key, &json!({"rev": 1})).unwrap();
    let b = store.record_version(&key, &json!({"rev": 2})).unwrap();

    // Then: the second gets a strictly later timestamp and is latest
    assert!(b.timestamp() > a.timestamp());
    assert_eq!(
        store.latest(&key).unwrap().unwrap().timestamp,
        Timestamp::from_millis(1_700_000_000_001)
    );
}

#[test]
fn test_invalid_segments_rejected_without_fs_mutation() {
    let (dir, store, _clock) = setup_store(1_700_000_000_000);
    let bad_keys = [
        EntityKey::new("", "pkgA", "login", "postLogin", "v1"),
        EntityKey::new("proj1", "  ", "login", "postLogin", "v1"),
        EntityKey::new("proj1", "pkgA", "a/b", "postLogin", "v1"),
        EntityKey::new("proj1", "pkgA", "login", "..", "v1"),
        EntityKey::new("proj1", "pkgA", "login", "postLogin", "."),
        EntityKey::new("proj1", "pkgA", "login", "postLogin", "v\\1"),
    ];

    for key in &bad_keys {
        // When: recording under an illegal key
        let err = store.record_version(key, &json!({"a": 1})).unwrap_err();

        // Then: the error names the offending level and nothing was created
        assert!(
            matches!(err, JapiError::InvalidSegment { .. }),
            "expected InvalidSegment for {}, got {:?}",
            key,
            err
        );
        assert_eq!(count_files(dir.path()), 0, "fs mutated for {}", key);
    }
}

#[test]
fn test_invalid_segment_reports_level() {
    let (_dir, store, _clock) = setup_store(1_700_000_000_000);
    let key = EntityKey::new("proj1", "pkgA", "login", "", "v1");

    match store.record_version(&key, &json!({})).unwrap_err() {
        JapiError::InvalidSegment { level, .. } => assert_eq!(level, Depth::Action),
        other => panic!("expected InvalidSegment, got {:?}", other),
    }
}

#[test]
fn test_corrupt_newest_entry_is_skipped() {
    // Given: two entries, the newer one with its fingerprint removed
    let (_dir, store, clock) = setup_store(1_700_000_000_000);
    let key = login_key();
    store.record_version(&key, &json!({"rev": 1})).unwrap();
    clock.advance(10);
    store.record_version(&key, &json!({"rev": 2})).unwrap();
    let newest = store.latest(&key).unwrap().unwrap();
    fs::remove_file(newest.container.join(FINGERPRINT_FILE)).unwrap();

    // When: latest is queried
    let latest = store.latest(&key).unwrap().unwrap();

    // Then: the older valid entry is returned
    assert_eq!(latest.payload_json().unwrap(), json!({"rev": 1}));

    // And: recording rev 1 again is unchanged, rev 2 again is a modification
    clock.advance(10);
    assert!(!store.record_version(&key, &json!({"rev": 1})).unwrap().is_write());
    assert!(store.record_version(&key, &json!({"rev": 2})).unwrap().is_write());
}

#[test]
fn test_unreadable_newest_entry_is_skipped() {
    // Given: the newest container has a directory where info.txt should be
    let (_dir, store, clock) = setup_store(1_700_000_000_000);
    let key = login_key();
    store.record_version(&key, &json!({"rev": 1})).unwrap();
    clock.advance(10);
    store.record_version(&key, &json!({"rev": 2})).unwrap();
    let newest = store.latest(&key).unwrap().unwrap();
    fs::remove_file(newest.container.join(PAYLOAD_FILE)).unwrap();
    fs::create_dir(newest.container.join(PAYLOAD_FILE)).unwrap();

    // When: latest is queried
    let latest = store.latest(&key).unwrap().unwrap();

    // Then: the older entry is returned and the key can still be recorded
    assert_eq!(latest.payload_json().unwrap(), json!({"rev": 1}));
    clock.advance(10);
    let outcome = store.record_version(&key, &json!({"rev": 2})).unwrap();
    assert!(matches!(outcome, RecordOutcome::Modified { .. }));
    assert!(outcome.timestamp() > newest.timestamp);
    assert_eq!(container_names(&store, &key).len(), 3);
}

#[test]
fn test_corrupt_entry_logged_as_warning() {
    let capture = init_test_capture();
    let (_dir, store, _clock) = setup_store(1_700_000_000_000);
    let key = EntityKey::new("corruptlog", "pkgA", "login", "postLogin", "v1");

    // Given: an entry whose fingerprint was removed
    store.record_version(&key, &json!({"rev": 1})).unwrap();
    let entry = store.latest(&key).unwrap().unwrap();
    fs::remove_file(entry.container.join(FINGERPRINT_FILE)).unwrap();

    // When: latest is queried
    assert!(store.latest(&key).unwrap().is_none());

    // Then: a warn-level corrupt_entry event names the key
    let events = capture.events_with(FIELD_KEY, &key.to_string());
    assert!(events
        .iter()
        .any(|e| e.event.as_deref() == Some("corrupt_entry") && e.level == Level::WARN));
}

#[test]
fn test_only_corrupt_entries_treated_as_empty_history() {
    // Given: a single entry whose payload was tampered with
    let (_dir, store, clock) = setup_store(1_700_000_000_000);
    let key = login_key();
    store.record_version(&key, &json!({"rev": 1})).unwrap();
    let entry = store.latest(&key).unwrap().unwrap();
    fs::write(entry.container.join(PAYLOAD_FILE), b"{\"rev\":99}").unwrap();

    // When: the same payload is recorded again
    clock.advance(10);
    let outcome = store.record_version(&key, &json!({"rev": 1})).unwrap();

    // Then: it is written as a first snapshot; the corrupt entry is kept
    assert!(matches!(outcome, RecordOutcome::Created { .. }));
    assert_eq!(container_names(&store, &key).len(), 2);
}

#[test]
fn test_unserializable_payload_writes_nothing() {
    use std::collections::HashMap;

    let (dir, store, _clock) = setup_store(1_700_000_000_000);
    let mut payload = HashMap::new();
    payload.insert(vec![1u8], "non-string key");

    let err = store.record_version(&login_key(), &payload).unwrap_err();
    assert!(matches!(err, JapiError::PayloadUnserializable { .. }));
    assert_eq!(count_files(dir.path()), 0);
}

#[test]
fn test_missing_root_is_created() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("nested").join(".japi-client");
    let store = SnapshotStore::open(StoreConfig::new(&root));

    store.record_version(&login_key(), &json!({"a": 1})).unwrap();

    assert!(store
        .resolver()
        .resolve(&login_key(), Depth::Version)
        .unwrap()
        .is_dir());
}

#[test]
fn test_record_events_logged() {
    let capture = init_test_capture();
    let (_dir, store, clock) = setup_store(1_700_000_000_000);
    let key = EntityKey::new("logproj", "pkgA", "login", "postLogin", "v1");

    store.record_version(&key, &json!({"rev": 1})).unwrap();
    clock.advance(1);
    store.record_version(&key, &json!({"rev": 1})).unwrap();
    clock.advance(1);
    store.record_version(&key, &json!({"rev": 2})).unwrap();

    assert_eq!(
        capture.event_names_with(FIELD_KEY, &key.to_string()),
        vec!["first_created", "modified"]
    );
}

#[test]
fn test_concurrent_writers_keep_distinct_entries() {
    // Given: one store shared by several threads with a frozen clock
    let (_dir, store, _clock) = setup_store(1_700_000_000_000);
    let store = Arc::new(store);
    let key = login_key();

    // When: each thread records a different payload
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = store.clone();
            let key = key.clone();
            std::thread::spawn(move || store.record_version(&key, &json!({"writer": i})).unwrap())
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    // Then: every payload has its own container with a distinct timestamp
    let history = store.history(&key).unwrap();
    assert_eq!(history.len(), 8);
    let mut stamps: Vec<_> = history.iter().map(|e| e.timestamp).collect();
    stamps.dedup();
    assert_eq!(stamps.len(), 8);
}
