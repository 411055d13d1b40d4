/// Module for scanning a whole corpus in parallel.
///
/// Entries are dealt round-robin to `workers` blocking tasks. Each task owns a private
/// `AggregateStats` shard; shards are merged once all tasks finish. A shared stop flag is
/// checked between contracts.
use crate::config::ScanConfig;
use crate::store::{CorpusEntry, CorpusStore, INDEX_FILE, load_bytecode};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use sysprobe_core::aggregate::{AggregateStats, TallyPolicy};
use sysprobe_core::catalog::SelectorCatalog;
use sysprobe_core::decoder::decode;
use sysprobe_core::detection::{AddressMatch, DetectionResult, detect_system_contract_call};
use sysprobe_utils::errors::CorpusError;
use tokio::task::JoinSet;

/// Knobs for a corpus scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    pub workers: usize,
    pub address_match: AddressMatch,
    pub tally: TallyPolicy,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self::from(&ScanConfig::default())
    }
}

impl From<&ScanConfig> for ScanOptions {
    fn from(config: &ScanConfig) -> Self {
        Self {
            workers: config.workers,
            address_match: config.address_match,
            tally: config.tally,
        }
    }
}

/// A corpus record that could not be scanned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanFailure {
    /// Contract address, or `index.jsonl:<line>` for an unparsable index line
    pub address: String,
    pub reason: String,
}

/// Result of a corpus scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanOutcome {
    pub stats: AggregateStats,
    /// Unreadable entries and index lines, sorted by address; they do not count towards
    /// `total_contracts`
    pub failures: Vec<ScanFailure>,
    /// True if the stop flag ended the scan early
    pub stopped: bool,
}

impl ScanOutcome {
    fn merge(&mut self, other: Self) {
        self.stats.merge(other.stats);
        self.failures.extend(other.failures);
        self.stopped |= other.stopped;
    }
}

/// Decodes and runs the system-contract detector on one contract.
pub fn analyze(bytes: &[u8], catalog: &SelectorCatalog, policy: AddressMatch) -> DetectionResult {
    detect_system_contract_call(&decode(bytes), catalog, policy)
}

fn scan_shard(
    root: &Path,
    entries: &[CorpusEntry],
    catalog: &SelectorCatalog,
    options: ScanOptions,
    stop: &AtomicBool,
) -> ScanOutcome {
    let mut outcome = ScanOutcome::default();
    for entry in entries {
        if stop.load(Ordering::Relaxed) {
            outcome.stopped = true;
            break;
        }
        match load_bytecode(root, entry) {
            Ok(bytes) => {
                let result = analyze(&bytes, catalog, options.address_match);
                if result.is_match() {
                    tracing::debug!(
                        "{} calls the system contract with {} selector(s)",
                        entry.address,
                        result.matched_selectors.len()
                    );
                }
                outcome.stats.accumulate_with(&result, options.tally);
            }
            Err(e) => {
                tracing::warn!("skipping {}: {}", entry.address, e);
                outcome.failures.push(ScanFailure {
                    address: entry.address.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }
    outcome
}

/// Scans every entry of `store`.
pub async fn scan_corpus(
    store: &CorpusStore,
    catalog: Arc<SelectorCatalog>,
    options: ScanOptions,
    stop: Arc<AtomicBool>,
) -> Result<ScanOutcome, CorpusError> {
    let workers = options.workers.max(1);
    let mut shards: Vec<Vec<CorpusEntry>> = vec![Vec::new(); workers];
    for (i, entry) in store.entries().enumerate() {
        shards[i % workers].push(entry.clone());
    }
    tracing::info!(
        "scanning {} contracts with {} workers",
        store.len(),
        workers.min(store.len().max(1))
    );

    let mut tasks = JoinSet::new();
    for shard in shards.into_iter().filter(|s| !s.is_empty()) {
        let root = store.root().to_path_buf();
        let catalog = Arc::clone(&catalog);
        let stop = Arc::clone(&stop);
        tasks.spawn_blocking(move || scan_shard(&root, &shard, &catalog, options, &stop));
    }

    let mut outcome = ScanOutcome::default();
    outcome
        .failures
        .extend(store.malformed().iter().map(|record| ScanFailure {
            address: format!("{INDEX_FILE}:{}", record.line),
            reason: record.reason.clone(),
        }));
    while let Some(joined) = tasks.join_next().await {
        let shard = joined.map_err(|e| CorpusError::Worker(e.to_string()))?;
        outcome.merge(shard);
    }
    outcome.failures.sort_by(|a, b| a.address.cmp(&b.address));

    tracing::info!(
        "scan finished: {} contracts, {} matching, {} unreadable",
        outcome.stats.total_contracts,
        outcome.stats.matching_contracts,
        outcome.failures.len()
    );
    Ok(outcome)
}
