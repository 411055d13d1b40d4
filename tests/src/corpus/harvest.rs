use super::{fixture_contracts, spawn_mirror};
use std::time::Duration;
use sysprobe_corpus::harvest::harvest;
use sysprobe_corpus::mirror::MirrorClient;
use sysprobe_corpus::store::CorpusStore;
use sysprobe_utils::errors::{CorpusError, FetchError};

#[tokio::test]
async fn test_harvest_walks_every_page() {
    let mirror = spawn_mirror(fixture_contracts()).await;
    let client = MirrorClient::new(&mirror.base_url, Duration::from_secs(5)).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let mut store = CorpusStore::open(dir.path()).unwrap();

    let report = harvest(&client, &mut store, 10, 2).await.unwrap();
    assert_eq!(report.pages, 3);
    assert_eq!(report.stored, 5);
    assert_eq!(report.skipped, 1);
    assert_eq!(store.len(), 5);
    assert_eq!(store.lowest_contract_id(), Some("0.0.1001"));

    let address = format!("0x{:040x}", 1001);
    assert_eq!(
        store.load_address(&address).unwrap(),
        hex::decode("63189a554c610167f1").unwrap()
    );
    let entry = store.get(&address).unwrap();
    assert_eq!(entry.contract_id, "0.0.1001");
    assert_eq!(entry.size, 9);
}

#[tokio::test]
async fn test_harvest_respects_page_limit_and_resumes() {
    let mirror = spawn_mirror(fixture_contracts()).await;
    let client = MirrorClient::new(&mirror.base_url, Duration::from_secs(5)).unwrap();
    let dir = tempfile::tempdir().unwrap();

    let mut store = CorpusStore::open(dir.path()).unwrap();
    let report = harvest(&client, &mut store, 1, 2).await.unwrap();
    assert_eq!(report.pages, 1);
    assert_eq!(report.stored, 2);
    drop(store);

    // resumes below 0.0.1005 from the persisted index
    let mut store = CorpusStore::open(dir.path()).unwrap();
    assert_eq!(store.lowest_contract_id(), Some("0.0.1005"));
    let report = harvest(&client, &mut store, 10, 2).await.unwrap();
    assert_eq!(report.pages, 2);
    assert_eq!(report.stored, 3);
    assert_eq!(report.skipped, 1);
    assert_eq!(store.len(), 5);
}

#[tokio::test]
async fn test_harvest_fails_when_listing_is_unreachable() {
    let client = MirrorClient::new("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let mut store = CorpusStore::open(dir.path()).unwrap();
    assert!(harvest(&client, &mut store, 1, 2).await.is_err());
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_store_write_failure_is_not_a_cache_error() {
    let mirror = spawn_mirror(fixture_contracts()).await;
    let client = MirrorClient::new(&mirror.base_url, Duration::from_secs(5)).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("corpus");
    let mut store = CorpusStore::open(&root).unwrap();

    // the corpus root turns into a plain file, so no bytecode file can be written
    std::fs::remove_dir_all(&root).unwrap();
    std::fs::write(&root, "not a directory").unwrap();

    let err = harvest(&client, &mut store, 1, 2).await.unwrap_err();
    assert!(
        matches!(err, FetchError::Store(CorpusError::Io { .. })),
        "got {err:?}"
    );
    assert!(err.to_string().starts_with("corpus store error"));
}
