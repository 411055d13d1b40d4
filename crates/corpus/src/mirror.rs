/// Module for the mirror node REST client.
///
/// Only two endpoints are used: `/api/v1/contracts/{id}` for a single contract's bytecode and
/// the paginated `/api/v1/contracts` listing. All failures surface as `FetchError` values; the
/// client never retries.
use crate::cache::ResponseCache;
use crate::config::ScanConfig;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use sysprobe_core::decoder::{
    DecodeInfo, Instruction, SourceType, decode_with_info, input_to_bytes,
};
use sysprobe_utils::errors::FetchError;

/// A contract as returned by the mirror node. Listing pages omit the bytecode fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ContractRecord {
    pub contract_id: String,
    pub evm_address: String,
    /// Init (creation) bytecode
    pub bytecode: Option<String>,
    /// Deployed runtime bytecode
    pub runtime_bytecode: Option<String>,
}

fn non_empty(code: &Option<String>) -> Option<&str> {
    code.as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty() && *c != "0x")
}

impl ContractRecord {
    /// Identifier used for requests: the EVM address when known, else the `shard.realm.num` id.
    pub fn key(&self) -> &str {
        if self.evm_address.is_empty() {
            &self.contract_id
        } else {
            &self.evm_address
        }
    }

    /// Hex code to analyse: runtime bytecode, falling back to init bytecode when the runtime
    /// field is missing or the empty `0x`.
    pub fn code(&self) -> Result<&str, FetchError> {
        non_empty(&self.runtime_bytecode)
            .or_else(|| non_empty(&self.bytecode))
            .ok_or_else(|| FetchError::MissingBytecode(self.key().to_string()))
    }

    /// Decoded bytes of `code()`.
    pub fn code_bytes(&self) -> Result<Vec<u8>, FetchError> {
        Ok(input_to_bytes(self.code()?, false)?)
    }

    /// Instruction stream and metadata of `code()`.
    pub fn decode(&self) -> Result<(Vec<Instruction>, DecodeInfo), FetchError> {
        let bytes = self.code_bytes()?;
        Ok(decode_with_info(&bytes, SourceType::MirrorNode))
    }
}

/// Pagination links of a listing page.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Links {
    pub next: Option<String>,
}

/// One page of the contract listing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContractPage {
    pub contracts: Vec<ContractRecord>,
    pub links: Links,
}

/// Async client for a mirror node.
#[derive(Debug, Clone)]
pub struct MirrorClient {
    http: reqwest::Client,
    base_url: String,
    cache: Option<ResponseCache>,
}

impl MirrorClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            cache: None,
        })
    }

    /// Builds a client for the configured network, with a response cache if one is set.
    pub fn from_config(config: &ScanConfig) -> Result<Self, FetchError> {
        let client = Self::new(config.mirror_base_url(), config.request_timeout())?;
        match &config.cache_dir {
            Some(dir) => Ok(client.with_cache(
                ResponseCache::open(dir).map_err(FetchError::Cache)?,
            )),
            None => Ok(client),
        }
    }

    pub fn with_cache(mut self, cache: ResponseCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches one contract by id or EVM address, consulting the cache first.
    pub async fn contract(&self, id: &str) -> Result<ContractRecord, FetchError> {
        let url = format!("{}/api/v1/contracts/{}", self.base_url, id);

        if let Some(cache) = &self.cache {
            if let Some(body) = cache.get(&url).map_err(FetchError::Cache)? {
                return Ok(serde_json::from_str(&body)?);
            }
        }

        let body = self.get_text(&url).await?;
        let record: ContractRecord = serde_json::from_str(&body)?;
        if let Some(cache) = &self.cache {
            cache.put(&url, &body).map_err(FetchError::Cache)?;
        }
        Ok(record)
    }

    /// URL of the first listing page, newest first, optionally below a contract id.
    pub fn contracts_url(&self, page_size: usize, below: Option<&str>) -> String {
        let mut url = format!(
            "{}/api/v1/contracts?limit={}&order=desc",
            self.base_url, page_size
        );
        if let Some(id) = below {
            url.push_str(&format!("&contract.id=lt:{id}"));
        }
        url
    }

    /// Turns a `links.next` path into an absolute URL.
    pub fn resolve(&self, next: &str) -> String {
        if next.starts_with("http://") || next.starts_with("https://") {
            next.to_string()
        } else {
            format!("{}{}", self.base_url, next)
        }
    }

    /// Fetches one listing page. Listing pages are never cached.
    pub async fn contracts_page(&self, url: &str) -> Result<ContractPage, FetchError> {
        self.get_json(url).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let body = self.get_text(url).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        tracing::debug!("GET {}", url);
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
                body,
            });
        }
        Ok(response.text().await?)
    }
}
