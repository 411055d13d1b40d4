use async_trait::async_trait;
use clap::{Args, Subcommand};
use std::error::Error;
use std::path::PathBuf;
use sysprobe_core::decoder::{DecodeInfo, Instruction, decode_bytecode, decode_raw_file};
use sysprobe_corpus::config::ScanConfig;
use sysprobe_corpus::network::Network;
use sysprobe_utils::errors::{ConfigError, DecodeError};

pub mod decode;
pub mod detect;
pub mod fetch;
pub mod scan;
pub mod secp;
pub mod selectors;

#[derive(Subcommand)]
pub enum Cmd {
    /// Decode bytecode to an instruction listing
    Decode(decode::DecodeArgs),

    /// Detect calls to the token-service system contract
    Detect(detect::DetectArgs),

    /// Check a contract for secp256k1-keyed token creation
    Secp(secp::SecpArgs),

    /// Harvest contract bytecode from a mirror node into the corpus
    Fetch(fetch::FetchArgs),

    /// Scan the corpus and rank system-contract selectors
    Scan(scan::ScanArgs),

    /// List the selector catalog
    Selectors(selectors::SelectorsArgs),
}

#[async_trait]
pub trait Command {
    async fn execute(self) -> Result<(), Box<dyn Error>>;
}

#[async_trait]
impl Command for Cmd {
    async fn execute(self) -> Result<(), Box<dyn Error>> {
        match self {
            Cmd::Decode(args) => args.execute().await,
            Cmd::Detect(args) => args.execute().await,
            Cmd::Secp(args) => args.execute().await,
            Cmd::Fetch(args) => args.execute().await,
            Cmd::Scan(args) => args.execute().await,
            Cmd::Selectors(args) => args.execute().await,
        }
    }
}

/// Decodes a hex string (`0x...`) or a file path prefixed with `@`.
///
/// `@` files hold hex text unless `raw` is set, in which case they are read as binary.
pub fn read_input(
    input: &str,
    raw: bool,
) -> Result<(Vec<Instruction>, DecodeInfo, Vec<u8>), DecodeError> {
    match input.strip_prefix('@') {
        Some(path) if raw => decode_raw_file(path),
        Some(path) => decode_bytecode(path, true),
        None => decode_bytecode(input, false),
    }
}

/// Config-file and network options shared by the commands that touch a mirror node or corpus.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// JSON config file; flags below override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Network whose mirror node is queried (mainnet, testnet, previewnet)
    #[arg(long)]
    pub network: Option<Network>,

    /// Mirror node base URL, overriding the network default
    #[arg(long)]
    pub mirror_url: Option<String>,

    /// Corpus directory
    #[arg(long)]
    pub corpus_dir: Option<PathBuf>,

    /// Response cache directory
    #[arg(long, conflicts_with = "no_cache")]
    pub cache_dir: Option<PathBuf>,

    /// Do not read or write the response cache
    #[arg(long)]
    pub no_cache: bool,
}

impl ConfigArgs {
    /// Builds the effective config: file (or network preset), then flag overrides.
    pub fn resolve(&self) -> Result<ScanConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => {
                let mut config = ScanConfig::from_file(path)?;
                if let Some(network) = self.network {
                    config.network = network;
                }
                config
            }
            None => ScanConfig::for_network(self.network.unwrap_or_default()),
        };

        if let Some(url) = &self.mirror_url {
            config.mirror_url = Some(url.clone());
        }
        if let Some(dir) = &self.corpus_dir {
            config.corpus_dir = dir.clone();
        }
        if let Some(dir) = &self.cache_dir {
            config.cache_dir = Some(dir.clone());
        }
        if self.no_cache {
            config.cache_dir = None;
        }

        config.validate()?;
        tracing::debug!("effective config: {:?}", config);
        Ok(config)
    }
}
