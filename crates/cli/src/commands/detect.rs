/// Module for the `detect` subcommand, which checks one contract for calls to the
/// token-service system contract.
use async_trait::async_trait;
use clap::Args;
use std::error::Error;
use sysprobe_core::catalog::SelectorCatalog;
use sysprobe_core::detection::{AddressMatch, detect_system_contract_call};

/// Arguments for the `detect` subcommand.
#[derive(Args)]
pub struct DetectArgs {
    /// Input bytecode as a hex string (0x...) or file path prefixed with @
    input: String,

    /// Read an @file as binary bytecode instead of hex text
    #[arg(long)]
    raw: bool,

    /// Match only the short address literal 0x0167, ignoring zero-padded forms
    #[arg(long)]
    strict_address: bool,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

#[async_trait]
impl super::Command for DetectArgs {
    async fn execute(self) -> Result<(), Box<dyn Error>> {
        let (instructions, _, _) = super::read_input(&self.input, self.raw)?;
        let catalog = SelectorCatalog::token_service();
        let policy = if self.strict_address {
            AddressMatch::Exact
        } else {
            AddressMatch::Normalized
        };
        let result = detect_system_contract_call(&instructions, &catalog, policy);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
            return Ok(());
        }

        println!("CALL opcode:      {}", result.has_call);
        println!("address literal:  {}", result.has_address_literal);
        println!("selectors:        {}", result.matched_selectors.len());
        for selector in &result.matched_selectors {
            println!(
                "  {} {}",
                selector,
                catalog.lookup(selector).unwrap_or_default()
            );
        }
        println!("system call:      {}", result.is_match());
        Ok(())
    }
}
