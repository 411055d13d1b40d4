/// Module for the `scan` subcommand, which aggregates selector usage over the corpus.
///
/// Output is a total line, a matching-contracts line, then one `NAME selector count` line per
/// selector, most frequent first. Ctrl-C stops the workers and reports what was scanned.
use super::ConfigArgs;
use async_trait::async_trait;
use clap::Args;
use serde::Serialize;
use std::error::Error;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use sysprobe_core::aggregate::{RankedSelector, TallyPolicy};
use sysprobe_core::catalog::SelectorCatalog;
use sysprobe_core::detection::AddressMatch;
use sysprobe_corpus::scan::{ScanFailure, ScanOptions, scan_corpus};
use sysprobe_corpus::store::CorpusStore;

/// Arguments for the `scan` subcommand.
#[derive(Args)]
pub struct ScanArgs {
    /// Worker tasks, each with its own stats shard
    #[arg(long)]
    workers: Option<usize>,

    /// Match only the short address literal 0x0167
    #[arg(long)]
    strict_address: bool,

    /// Count selectors only in contracts that call the system contract
    #[arg(long)]
    matching_only: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Serialize)]
struct ScanReport<'a> {
    total_contracts: u64,
    matching_contracts: u64,
    selectors: Vec<RankedSelector>,
    failures: &'a [ScanFailure],
    stopped: bool,
}

#[async_trait]
impl super::Command for ScanArgs {
    async fn execute(self) -> Result<(), Box<dyn Error>> {
        let mut config = self.config.resolve()?;
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if self.strict_address {
            config.address_match = AddressMatch::Exact;
        }
        if self.matching_only {
            config.tally = TallyPolicy::MatchingOnly;
        }
        config.validate()?;

        let store = CorpusStore::open(&config.corpus_dir)?;
        let catalog = Arc::new(SelectorCatalog::token_service());
        let stop = Arc::new(AtomicBool::new(false));

        let flag = Arc::clone(&stop);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupted, stopping workers");
                flag.store(true, Ordering::Relaxed);
            }
        });

        let outcome = scan_corpus(
            &store,
            Arc::clone(&catalog),
            ScanOptions::from(&config),
            stop,
        )
        .await?;
        let ranking = outcome.stats.rank(&catalog);

        if self.json {
            let report = ScanReport {
                total_contracts: outcome.stats.total_contracts,
                matching_contracts: outcome.stats.matching_contracts,
                selectors: ranking,
                failures: &outcome.failures,
                stopped: outcome.stopped,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }

        println!("Total: {}", outcome.stats.total_contracts);
        println!(
            "Unique contracts with at least 1 system contract call: {}",
            outcome.stats.matching_contracts
        );
        println!();
        for ranked in &ranking {
            println!("{} {} {}", ranked.name, ranked.selector, ranked.count);
        }
        if outcome.stopped {
            tracing::warn!("scan was interrupted; totals are partial");
        }
        Ok(())
    }
}
