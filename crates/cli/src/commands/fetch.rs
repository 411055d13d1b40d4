/// Module for the `fetch` subcommand, which harvests contract bytecode into the corpus.
use super::ConfigArgs;
use async_trait::async_trait;
use clap::Args;
use std::error::Error;
use sysprobe_corpus::harvest::harvest;
use sysprobe_corpus::mirror::MirrorClient;
use sysprobe_corpus::store::CorpusStore;

/// Arguments for the `fetch` subcommand.
#[derive(Args)]
pub struct FetchArgs {
    /// Listing pages to walk
    #[arg(long)]
    pages: Option<usize>,

    /// Contracts per listing page
    #[arg(long)]
    page_size: Option<usize>,

    #[command(flatten)]
    config: ConfigArgs,
}

#[async_trait]
impl super::Command for FetchArgs {
    async fn execute(self) -> Result<(), Box<dyn Error>> {
        let config = self.config.resolve()?;
        let client = MirrorClient::from_config(&config)?;
        let mut store = CorpusStore::open(&config.corpus_dir)?;

        let report = harvest(
            &client,
            &mut store,
            self.pages.unwrap_or(config.pages),
            self.page_size.unwrap_or(config.page_size),
        )
        .await?;

        println!(
            "{} pages, {} contracts stored, {} skipped; corpus {} now holds {}",
            report.pages,
            report.stored,
            report.skipped,
            store.root().display(),
            store.len()
        );
        Ok(())
    }
}
