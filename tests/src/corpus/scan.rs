use super::{fixture_contracts, spawn_mirror};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;
use sysprobe_core::catalog::{Selector, SelectorCatalog};
use sysprobe_corpus::config::ScanConfig;
use sysprobe_corpus::harvest::harvest;
use sysprobe_corpus::mirror::MirrorClient;
use sysprobe_corpus::network::Network;
use sysprobe_corpus::scan::{ScanOptions, scan_corpus};
use sysprobe_corpus::store::CorpusStore;

async fn harvested_store(dir: &std::path::Path) -> CorpusStore {
    let mirror = spawn_mirror(fixture_contracts()).await;
    let client = MirrorClient::new(&mirror.base_url, Duration::from_secs(5)).unwrap();
    let mut store = CorpusStore::open(dir).unwrap();
    harvest(&client, &mut store, 10, 3).await.unwrap();
    store
}

#[tokio::test]
async fn test_scan_ranks_selectors() {
    let dir = tempfile::tempdir().unwrap();
    let store = harvested_store(dir.path()).await;
    let catalog = Arc::new(SelectorCatalog::token_service());

    let config = ScanConfig {
        workers: 3,
        ..ScanConfig::for_network(Network::Testnet)
    };
    let outcome = scan_corpus(
        &store,
        Arc::clone(&catalog),
        ScanOptions::from(&config),
        Arc::new(AtomicBool::new(false)),
    )
    .await
    .unwrap();

    assert!(outcome.failures.is_empty());
    assert_eq!(outcome.stats.total_contracts, 5);
    // 1001, the padded-address 1003 and 1005
    assert_eq!(outcome.stats.matching_contracts, 3);

    let ranked = outcome.stats.rank(&catalog);
    let rows: Vec<(&str, String, u64)> = ranked
        .iter()
        .map(|r| (r.name, r.selector.to_string(), r.count))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("ABI_ID_CRYPTO_TRANSFER", "189a554c".to_string(), 2),
            ("ABI_ID_ASSOCIATE_TOKEN", "49146bde".to_string(), 2),
            ("ABI_ID_CREATE_FUNGIBLE_TOKEN_V3", "0fb65bf3".to_string(), 1),
        ]
    );
}

#[tokio::test]
async fn test_reference_settings() {
    let dir = tempfile::tempdir().unwrap();
    let store = harvested_store(dir.path()).await;
    let catalog = Arc::new(SelectorCatalog::token_service());

    let outcome = scan_corpus(
        &store,
        Arc::clone(&catalog),
        ScanOptions::from(&ScanConfig::reference(Network::Testnet)),
        Arc::new(AtomicBool::new(false)),
    )
    .await
    .unwrap();

    assert_eq!(outcome.stats.total_contracts, 5);
    assert_eq!(outcome.stats.matching_contracts, 2);
    assert_eq!(outcome.stats.selector_counts.len(), 2);
    assert_eq!(
        outcome.stats.selector_counts[&Selector::from_u32(0x189a554c)],
        1
    );
    assert!(
        !outcome
            .stats
            .selector_counts
            .contains_key(&Selector::from_u32(0x49146bde))
    );
}
