use thiserror::Error;

/// Custom error type for turning textual or file input into bytecode.
///
/// Decoding itself never fails; only the boundary that resolves hex strings and files does.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("hex decode failed: {0}")]
    HexDecode(#[from] hex::FromHexError),

    #[error("could not read file '{path}': {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("file '{path}' is not hex text; read it as raw bytecode instead")]
    NotHexText { path: String },
}

/// Error type for parsing a 4-byte function selector.
#[derive(Debug, Error, PartialEq)]
pub enum SelectorError {
    #[error("selector must be 4 bytes, got {0}")]
    InvalidLength(usize),
    #[error("invalid selector hex: {0}")]
    HexDecode(#[from] hex::FromHexError),
}

/// Errors raised while talking to a mirror node.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure (connection refused, timeout, TLS, ...).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The mirror node answered with a non-success status.
    #[error("unexpected status {status} from {url}: {body}")]
    Status {
        status: u16,
        url: String,
        body: String,
    },
    /// The contract record carries neither runtime nor init bytecode.
    #[error("no bytecode found for contract {0}")]
    MissingBytecode(String),
    #[error("malformed response: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed bytecode: {0}")]
    Decode(#[from] DecodeError),
    /// The response cache could not be read or written.
    #[error("cache error: {0}")]
    Cache(#[source] CorpusError),
    /// Fetched bytecode could not be written to the corpus.
    #[error("corpus store error: {0}")]
    Store(#[source] CorpusError),
}

/// Errors from the on-disk corpus store and response cache.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("io error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed index record: {0}")]
    Json(#[from] serde_json::Error),
    #[error("bytecode input error: {0}")]
    Decode(#[from] DecodeError),
    #[error("no corpus entry for {0}")]
    UnknownEntry(String),
    #[error("bytecode file '{path}' hashes to {actual}, index says {expected}")]
    HashMismatch {
        path: String,
        expected: String,
        actual: String,
    },
    #[error("scan worker failed: {0}")]
    Worker(String),
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unknown network '{0}', expected mainnet, testnet or previewnet")]
    UnknownNetwork(String),
    #[error("workers must be at least 1")]
    NoWorkers,
}
