//! On-disk cache of mirror node responses, one JSON file per request key.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use sysprobe_core::decoder::keccak256;
use sysprobe_utils::errors::CorpusError;

/// Response bodies keyed by request, stored as `<keccak(key)>.json`.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    dir: PathBuf,
}

impl ResponseCache {
    /// Opens (and creates if needed) the cache directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, CorpusError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| io_error(&dir, e))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir
            .join(format!("{}.json", hex::encode(keccak256(key.as_bytes()))))
    }

    /// Cached body for `key`, or `None` on a miss.
    pub fn get(&self, key: &str) -> Result<Option<String>, CorpusError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(body) => {
                tracing::debug!("cache hit for {}", key);
                Ok(Some(body))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(&path, e)),
        }
    }

    pub fn put(&self, key: &str, body: &str) -> Result<(), CorpusError> {
        let path = self.path_for(key);
        fs::write(&path, body).map_err(|e| io_error(&path, e))
    }
}

pub(crate) fn io_error(path: &Path, source: std::io::Error) -> CorpusError {
    CorpusError::Io {
        path: path.display().to_string(),
        source,
    }
}
