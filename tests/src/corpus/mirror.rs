use super::{fixture_contracts, spawn_mirror};
use std::time::Duration;
use sysprobe_corpus::cache::ResponseCache;
use sysprobe_corpus::mirror::MirrorClient;
use sysprobe_utils::errors::FetchError;

fn client(base_url: &str) -> MirrorClient {
    MirrorClient::new(base_url, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_contract_by_id_and_address() {
    let mirror = spawn_mirror(fixture_contracts()).await;
    let client = client(&mirror.base_url);

    let by_id = client.contract("0.0.1001").await.unwrap();
    assert_eq!(by_id.contract_id, "0.0.1001");
    assert_eq!(by_id.code().unwrap(), "0x63189a554c610167f1");

    let by_address = client.contract(&by_id.evm_address).await.unwrap();
    assert_eq!(by_address, by_id);
    assert_eq!(
        by_address.code_bytes().unwrap(),
        hex::decode("63189a554c610167f1").unwrap()
    );
}

#[tokio::test]
async fn test_code_fallback_and_missing_code() {
    let mirror = spawn_mirror(fixture_contracts()).await;
    let client = client(&mirror.base_url);

    let init_only = client.contract("0.0.1006").await.unwrap();
    assert_eq!(init_only.code().unwrap(), "0x6080");

    let empty = client.contract("0.0.1002").await.unwrap();
    assert!(matches!(empty.code(), Err(FetchError::MissingBytecode(_))));
}

#[tokio::test]
async fn test_unknown_contract_is_status_error() {
    let mirror = spawn_mirror(fixture_contracts()).await;
    let err = client(&mirror.base_url)
        .contract("0.0.42")
        .await
        .unwrap_err();
    match err {
        FetchError::Status { status, url, body } => {
            assert_eq!(status, 404);
            assert!(url.ends_with("/api/v1/contracts/0.0.42"));
            assert!(body.contains("Not found"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_cache_serves_repeat_requests() {
    let mirror = spawn_mirror(fixture_contracts()).await;
    let dir = tempfile::tempdir().unwrap();

    let cached = client(&mirror.base_url).with_cache(ResponseCache::open(dir.path()).unwrap());
    let first = cached.contract("0.0.1003").await.unwrap();
    let second = cached.contract("0.0.1003").await.unwrap();
    assert_eq!(first, second);
    assert_eq!(mirror.contract_hits(), 1);

    // a fresh client over the same directory still hits the cache
    let reopened = client(&mirror.base_url).with_cache(ResponseCache::open(dir.path()).unwrap());
    reopened.contract("0.0.1003").await.unwrap();
    assert_eq!(mirror.contract_hits(), 1);

    // errors are never cached
    assert!(cached.contract("0.0.42").await.is_err());
    assert!(cached.contract("0.0.42").await.is_err());
    assert_eq!(mirror.contract_hits(), 3);
}

#[tokio::test]
async fn test_listing_pagination() {
    let mirror = spawn_mirror(fixture_contracts()).await;
    let client = client(&mirror.base_url);

    let first = client
        .contracts_page(&client.contracts_url(4, None))
        .await
        .unwrap();
    let ids: Vec<&str> = first.contracts.iter().map(|c| c.contract_id.as_str()).collect();
    assert_eq!(ids, ["0.0.1006", "0.0.1005", "0.0.1004", "0.0.1003"]);
    assert!(first.contracts.iter().all(|c| c.runtime_bytecode.is_none()));

    let next = first.links.next.as_deref().unwrap();
    let second = client.contracts_page(&client.resolve(next)).await.unwrap();
    let ids: Vec<&str> = second.contracts.iter().map(|c| c.contract_id.as_str()).collect();
    assert_eq!(ids, ["0.0.1002", "0.0.1001"]);
    assert!(second.links.next.is_none());

    let below = client
        .contracts_page(&client.contracts_url(10, Some("0.0.1002")))
        .await
        .unwrap();
    assert_eq!(below.contracts.len(), 1);
}
