/// Module for the `selectors` subcommand, which lists the token-service selector catalog.
use async_trait::async_trait;
use clap::Args;
use std::error::Error;
use sysprobe_core::catalog::{Selector, SelectorCatalog};

/// Arguments for the `selectors` subcommand.
#[derive(Args)]
pub struct SelectorsArgs {
    /// Only list the token-creation selectors
    #[arg(long)]
    creation: bool,

    /// Print the selector of a Solidity signature instead, e.g. "transfer(address,uint256)"
    #[arg(long, conflicts_with = "creation")]
    hash: Option<String>,
}

#[async_trait]
impl super::Command for SelectorsArgs {
    async fn execute(self) -> Result<(), Box<dyn Error>> {
        let catalog = SelectorCatalog::token_service();

        if let Some(signature) = &self.hash {
            let selector = Selector::from_signature(signature);
            match catalog.lookup(&selector) {
                Some(name) => println!("{selector} {name}"),
                None => println!("{selector}"),
            }
            return Ok(());
        }

        for entry in catalog.entries() {
            if self.creation && !catalog.is_token_creation(&entry.selector) {
                continue;
            }
            println!("{} {} {}", entry.name, entry.selector, entry.signature);
        }
        Ok(())
    }
}
