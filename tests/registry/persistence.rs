//! Persistence Tests
//!
//! Disk-backed registries reopened from the same data directory.

use crate::common::*;
use vexdb::backing::{COLLECTIONS_DIR, COLLECTION_CONFIG_FILE};
use vexdb::{CollectionRegistry, RegistryConfig, StorageMode, CONFIG_FILE_NAME};

#[test]
fn open_writes_default_config() {
    let test = TestRegistry::new();
    let path = test.dir.path().join(CONFIG_FILE_NAME);

    assert!(path.exists());
    let config = RegistryConfig::from_file(&path).unwrap();
    assert_eq!(config.storage_mode().unwrap(), StorageMode::Disk);
    assert_eq!(test.registry.backing_kind(), "disk");
}

#[test]
fn ready_collections_survive_reopen() {
    let mut test = TestRegistry::new();
    test.registry
        .create_collection("kept", config_standard().with_shard_number(2))
        .unwrap();
    test.registry.create_collection("gone", config_small()).unwrap();
    test.registry.drop_collection("gone").unwrap();

    test.reopen();

    assert!(test.registry.collection_exists("kept"));
    assert!(!test.registry.collection_exists("gone"));
    assert_eq!(test.registry.list_collections(), vec!["kept".to_string()]);

    let kept = test.registry.get_collection("kept").unwrap();
    assert_eq!(kept.value.state, CollectionState::Ready);
    assert_eq!(kept.value.config.shard_number, 2);
    assert_eq!(kept.value.config.vectors.size, 384);
}

#[test]
fn creation_time_survives_reopen() {
    let mut test = TestRegistry::new();
    let created = test
        .registry
        .create_collection("dated", config_small())
        .unwrap();
    let (accepted, ready) = (created.value.created_at, created.value.last_modified_at);

    test.reopen();

    // Storage is stamped while the create call is between Creating and Ready.
    let reopened = test.registry.get_collection("dated").unwrap().value;
    assert!(reopened.created_at >= accepted);
    assert!(reopened.created_at <= ready);
}

#[test]
fn reopened_collection_can_be_dropped_and_recreated() {
    let mut test = TestRegistry::new();
    test.registry.create_collection("a", config_small()).unwrap();
    test.reopen();

    test.registry.drop_collection("a").unwrap();
    assert!(!test
        .dir
        .path()
        .join(COLLECTIONS_DIR)
        .join("a")
        .exists());

    test.registry.create_collection("a", config_small()).unwrap();
    test.reopen();
    assert!(test.registry.collection_exists("a"));
}

#[test]
fn corrupt_collection_is_skipped_on_open() {
    let mut test = TestRegistry::new();
    test.registry.create_collection("good", config_small()).unwrap();
    test.registry.create_collection("bad", config_small()).unwrap();

    let bad_config = test
        .dir
        .path()
        .join(COLLECTIONS_DIR)
        .join("bad")
        .join(COLLECTION_CONFIG_FILE);
    std::fs::write(&bad_config, b"{ not json").unwrap();

    test.reopen();
    assert!(test.registry.collection_exists("good"));
    assert!(!test.registry.collection_exists("bad"));
}

#[test]
fn memory_storage_forgets_on_reopen() {
    let dir = tempfile::tempdir().unwrap();
    RegistryConfig::in_memory()
        .write_to_file(&dir.path().join(CONFIG_FILE_NAME))
        .unwrap();

    let registry = CollectionRegistry::open(dir.path()).unwrap();
    assert_eq!(registry.backing_kind(), "memory");
    registry.create_collection("volatile", config_small()).unwrap();
    assert!(registry.shutdown(std::time::Duration::from_secs(1)));

    let registry = CollectionRegistry::open(dir.path()).unwrap();
    assert!(!registry.collection_exists("volatile"));
    assert!(registry.is_empty());
}

#[test]
fn bad_storage_value_fails_open() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(CONFIG_FILE_NAME), "storage = \"tape\"\n").unwrap();

    let err = CollectionRegistry::open(dir.path()).err().unwrap();
    assert!(matches!(err, RegistryError::Config(_)));
}
