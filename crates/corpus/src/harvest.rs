//! Populates a corpus from a mirror node's contract listing.

use crate::mirror::MirrorClient;
use crate::store::CorpusStore;
use serde::Serialize;
use sysprobe_utils::errors::FetchError;

/// Totals of one harvest run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HarvestReport {
    pub pages: usize,
    pub stored: usize,
    /// Contracts skipped because their record could not be fetched or had no bytecode
    pub skipped: usize,
}

/// Walks up to `pages` listing pages newest-first and stores every contract's bytecode.
///
/// Resumes below the lowest contract id already in the store. A contract that cannot be
/// fetched is logged and skipped; a failed listing request or a store write error ends the run.
pub async fn harvest(
    client: &MirrorClient,
    store: &mut CorpusStore,
    pages: usize,
    page_size: usize,
) -> Result<HarvestReport, FetchError> {
    let mut report = HarvestReport::default();
    let mut next = Some(client.contracts_url(page_size, store.lowest_contract_id()));

    while report.pages < pages {
        let Some(url) = next.take() else {
            tracing::info!("listing exhausted after {} pages", report.pages);
            break;
        };
        tracing::info!("fetching contract page {}: {}", report.pages + 1, url);
        let page = client.contracts_page(&url).await?;
        report.pages += 1;

        for summary in &page.contracts {
            let key = summary.key();
            let fetched = client
                .contract(key)
                .await
                .and_then(|record| record.code().map(str::to_string).map(|code| (record, code)));
            match fetched {
                Ok((record, code)) => {
                    let contract_id = if record.contract_id.is_empty() {
                        &summary.contract_id
                    } else {
                        &record.contract_id
                    };
                    let entry = store
                        .insert(contract_id, key, &code)
                        .map_err(FetchError::Store)?;
                    tracing::debug!("stored {} ({} bytes) as {}", key, entry.size, entry.hash);
                    report.stored += 1;
                }
                Err(e) => {
                    tracing::warn!("skipping contract {}: {}", key, e);
                    report.skipped += 1;
                }
            }
        }

        next = page.links.next.as_deref().map(|n| client.resolve(n));
    }

    Ok(report)
}
