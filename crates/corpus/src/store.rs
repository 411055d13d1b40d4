/// Module for the on-disk bytecode corpus.
///
/// Layout:
/// ```text
/// <root>/index.jsonl                 one CorpusEntry per line, later lines win per address
/// <root>/<hh>/0x<keccak>.bytecode    hex text, hh = first byte of the hash
/// ```
/// Identical bytecode deployed at several addresses is stored once.
use crate::cache::io_error;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use sysprobe_core::decoder::{SourceType, bytecode_info, input_to_bytes, normalize_hex_string};
use sysprobe_utils::errors::CorpusError;

/// Name of the index file under the corpus root.
pub const INDEX_FILE: &str = "index.jsonl";

/// Index record of one stored contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusEntry {
    pub address: String,
    pub contract_id: String,
    /// `0x`-prefixed keccak-256 of the bytecode
    pub hash: String,
    /// Bytecode length in bytes
    pub size: usize,
    pub fetched_at: DateTime<Utc>,
}

/// An `index.jsonl` line that could not be parsed, e.g. one cut short by an interrupted write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedRecord {
    /// 1-based line number in the index
    pub line: usize,
    pub reason: String,
}

/// Directory-backed corpus.
#[derive(Debug)]
pub struct CorpusStore {
    root: PathBuf,
    entries: IndexMap<String, CorpusEntry>,
    malformed: Vec<MalformedRecord>,
}

impl CorpusStore {
    /// Opens the corpus at `root`, creating the directory and reading the index if present.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, CorpusError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| io_error(&root, e))?;

        let index_path = root.join(INDEX_FILE);
        let mut entries = IndexMap::new();
        let mut malformed = Vec::new();
        match fs::read_to_string(&index_path) {
            Ok(text) => {
                for (n, line) in text.lines().enumerate() {
                    if line.trim().is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<CorpusEntry>(line) {
                        Ok(entry) => {
                            entries.insert(entry.address.clone(), entry);
                        }
                        Err(e) => {
                            tracing::warn!("skipping malformed index line {}: {}", n + 1, e);
                            malformed.push(MalformedRecord {
                                line: n + 1,
                                reason: e.to_string(),
                            });
                        }
                    }
                }
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(io_error(&index_path, e)),
        }

        tracing::debug!(
            "opened corpus {} with {} entries ({} malformed lines)",
            root.display(),
            entries.len(),
            malformed.len()
        );
        Ok(Self {
            root,
            entries,
            malformed,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Stores hex bytecode for a contract, replacing any earlier entry for `address`.
    pub fn insert(
        &mut self,
        contract_id: &str,
        address: &str,
        code: &str,
    ) -> Result<CorpusEntry, CorpusError> {
        let normalized = normalize_hex_string(code)?;
        let bytes = input_to_bytes(&normalized, false)?;
        let info = bytecode_info(&bytes, SourceType::Corpus);
        let hash = format!("0x{}", hex::encode(info.keccak_hash));

        let path = bytecode_path(&self.root, &hash);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| io_error(dir, e))?;
        }
        fs::write(&path, format!("0x{normalized}")).map_err(|e| io_error(&path, e))?;

        let entry = CorpusEntry {
            address: address.to_string(),
            contract_id: contract_id.to_string(),
            hash,
            size: info.byte_length,
            fetched_at: Utc::now(),
        };
        self.append_index(&entry)?;
        self.entries.insert(entry.address.clone(), entry.clone());
        Ok(entry)
    }

    fn append_index(&self, entry: &CorpusEntry) -> Result<(), CorpusError> {
        let index_path = self.root.join(INDEX_FILE);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&index_path)
            .map_err(|e| io_error(&index_path, e))?;
        let line = serde_json::to_string(entry)?;
        writeln!(file, "{line}").map_err(|e| io_error(&index_path, e))
    }

    /// Entries in first-insertion order.
    pub fn entries(&self) -> impl Iterator<Item = &CorpusEntry> {
        self.entries.values()
    }

    /// Index lines skipped on open.
    pub fn malformed(&self) -> &[MalformedRecord] {
        &self.malformed
    }

    pub fn get(&self, address: &str) -> Option<&CorpusEntry> {
        self.entries.get(address)
    }

    /// Reads the bytecode of a stored entry.
    pub fn load(&self, entry: &CorpusEntry) -> Result<Vec<u8>, CorpusError> {
        load_bytecode(&self.root, entry)
    }

    /// Reads the bytecode stored for `address`.
    pub fn load_address(&self, address: &str) -> Result<Vec<u8>, CorpusError> {
        let entry = self
            .get(address)
            .ok_or_else(|| CorpusError::UnknownEntry(address.to_string()))?;
        self.load(entry)
    }

    /// Numerically lowest `shard.realm.num` contract id, the resume point for harvesting.
    pub fn lowest_contract_id(&self) -> Option<&str> {
        self.entries
            .values()
            .filter_map(|e| contract_id_key(&e.contract_id).map(|k| (k, e.contract_id.as_str())))
            .min()
            .map(|(_, id)| id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn bytecode_path(root: &Path, hash: &str) -> PathBuf {
    let digits = hash.trim_start_matches("0x");
    let prefix = digits.get(..2).unwrap_or("00");
    root.join(prefix).join(format!("{hash}.bytecode"))
}

/// Reads an entry's bytecode file relative to `root` and checks it against the entry's hash.
pub fn load_bytecode(root: &Path, entry: &CorpusEntry) -> Result<Vec<u8>, CorpusError> {
    let path = bytecode_path(root, &entry.hash);
    let text = fs::read_to_string(&path).map_err(|e| io_error(&path, e))?;
    let bytes = input_to_bytes(&text, false)?;

    let actual = format!(
        "0x{}",
        hex::encode(bytecode_info(&bytes, SourceType::Corpus).keccak_hash)
    );
    if actual != entry.hash {
        return Err(CorpusError::HashMismatch {
            path: path.display().to_string(),
            expected: entry.hash.clone(),
            actual,
        });
    }
    Ok(bytes)
}

fn contract_id_key(id: &str) -> Option<(u64, u64, u64)> {
    let mut parts = id.split('.').map(|p| p.parse::<u64>().ok());
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(Some(shard)), Some(Some(realm)), Some(Some(num)), None) => Some((shard, realm, num)),
        _ => None,
    }
}
