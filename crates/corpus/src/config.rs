//! Scan configuration and settings

use crate::network::Network;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use sysprobe_core::aggregate::TallyPolicy;
use sysprobe_core::detection::AddressMatch;
use sysprobe_utils::errors::ConfigError;

/// Settings shared by the fetch, secp and scan commands.
///
/// Every field has a default, so a config file only needs the keys it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Network whose mirror node is queried
    pub network: Network,

    /// Explicit mirror node base URL, overriding the network default
    pub mirror_url: Option<String>,

    /// Root of the on-disk bytecode corpus
    pub corpus_dir: PathBuf,

    /// Directory for cached mirror node responses (disabled when `None`)
    pub cache_dir: Option<PathBuf>,

    /// Number of scan workers, each owning a private stats shard
    pub workers: usize,

    /// Contracts requested per listing page
    pub page_size: usize,

    /// Listing pages fetched per harvest run
    pub pages: usize,

    /// Timeout for a single HTTP request, in seconds
    pub request_timeout_secs: u64,

    /// How push operands are compared with the system-contract address
    pub address_match: AddressMatch,

    /// Which contracts contribute selector counts
    pub tally: TallyPolicy,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::for_network(Network::default())
    }
}

impl ScanConfig {
    /// Defaults for `network`: corpus under `.<network>`, cache under `.<network>-cache`.
    pub fn for_network(network: Network) -> Self {
        Self {
            network,
            mirror_url: None,
            corpus_dir: PathBuf::from(format!(".{network}")),
            cache_dir: Some(PathBuf::from(format!(".{network}-cache"))),
            workers: std::thread::available_parallelism().map_or(4, |n| n.get()),
            page_size: 100,
            pages: 20,
            request_timeout_secs: 30,
            address_match: AddressMatch::Normalized,
            tally: TallyPolicy::AllMatches,
        }
    }

    /// Settings that reproduce the reference report byte for byte: exact address matching
    /// and selector counts taken only from matching contracts.
    pub fn reference(network: Network) -> Self {
        Self {
            address_match: AddressMatch::Exact,
            tally: TallyPolicy::MatchingOnly,
            ..Self::for_network(network)
        }
    }

    /// Loads a JSON config file. Absent keys take the preset of the file's `network`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;

        let overrides: Value = serde_json::from_str(&text)?;
        let config: Self = match overrides.as_object() {
            Some(keys) => {
                let network = match keys.get("network") {
                    Some(value) => Network::deserialize(value)?,
                    None => Network::default(),
                };
                let mut merged = serde_json::to_value(Self::for_network(network))?;
                if let Some(base) = merged.as_object_mut() {
                    base.extend(keys.clone());
                }
                serde_json::from_value(merged)?
            }
            None => serde_json::from_value(overrides)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        Ok(())
    }

    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Mirror node base URL without trailing slash.
    pub fn mirror_base_url(&self) -> String {
        self.mirror_url
            .clone()
            .unwrap_or_else(|| self.network.mirror_node_url())
            .trim_end_matches('/')
            .to_string()
    }
}
