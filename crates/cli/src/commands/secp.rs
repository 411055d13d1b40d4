/// Module for the `secp` subcommand, which looks for token creation with a secp256k1 key.
///
/// The bytecode comes from the mirror node (by contract id or EVM address) or from a local
/// hex string or file given with `--code`.
use super::ConfigArgs;
use async_trait::async_trait;
use clap::Args;
use std::error::Error;
use sysprobe_core::catalog::SelectorCatalog;
use sysprobe_core::detection::{AddressMatch, detect_secp_token_creation};
use sysprobe_corpus::mirror::MirrorClient;
use sysprobe_utils::errors::FetchError;

/// Arguments for the `secp` subcommand.
#[derive(Args)]
pub struct SecpArgs {
    /// Contract id (0.0.N) or EVM address to fetch from the mirror node
    #[arg(required_unless_present = "code", conflicts_with = "code")]
    contract: Option<String>,

    /// Local bytecode as a hex string (0x...) or file path prefixed with @
    #[arg(long)]
    code: Option<String>,

    /// Read an @file as binary bytecode instead of hex text
    #[arg(long)]
    raw: bool,

    /// Match only the short address literal 0x0167
    #[arg(long)]
    strict_address: bool,

    #[command(flatten)]
    config: ConfigArgs,
}

#[async_trait]
impl super::Command for SecpArgs {
    async fn execute(self) -> Result<(), Box<dyn Error>> {
        let instructions = match (&self.code, &self.contract) {
            (Some(code), _) => super::read_input(code, self.raw)?.0,
            (None, Some(contract)) => {
                let config = self.config.resolve()?;
                let client = MirrorClient::from_config(&config)?;
                match client.contract(contract).await.and_then(|r| r.decode()) {
                    Ok((instructions, info)) => {
                        tracing::debug!("fetched {} bytes of bytecode for {}", info.byte_length, contract);
                        instructions
                    }
                    Err(FetchError::MissingBytecode(_)) => {
                        println!("No bytecode found for the specified contract ID/contract EVM address.");
                        return Ok(());
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            (None, None) => return Err("a contract id or --code is required".into()),
        };

        let policy = if self.strict_address {
            AddressMatch::Exact
        } else {
            AddressMatch::Normalized
        };
        let catalog = SelectorCatalog::token_service();
        let flags = detect_secp_token_creation(&instructions, &catalog, policy);
        tracing::debug!("secp flags: {:?}", flags);

        let advisories = flags.advisories();
        if advisories.is_empty() {
            println!("No token creation with a secp256k1 key detected.");
        }
        for advisory in advisories {
            println!("{advisory}");
        }
        Ok(())
    }
}
