//! sysprobe's single entry-point for turning byte-sequences into instruction streams.
//!
//! The decoder walks the bytecode once, left to right. A `PUSHn` opcode swallows the next `n`
//! bytes as its operand, so literal payloads are never re-read as opcodes. Unknown bytes and a
//! truncated trailing push degrade gracefully instead of failing: `decode` is total.

use crate::Opcode;
use hex::FromHex;
use std::{fmt, fs, path::Path};
use sysprobe_utils::errors::DecodeError;
use tiny_keccak::{Hasher, Keccak};

/// Represents a single decoded instruction.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Instruction {
    /// the instruction's program counter (in bytes)
    pub pc: usize,
    /// the decoded opcode
    pub opcode: Opcode,
    /// operand bytes for `PUSH1..PUSH32`; shorter than declared only at end of stream
    pub imm: Option<Vec<u8>>,
}

/// Metadata about the decoded bytecode blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeInfo {
    /// number of bytes
    pub byte_length: usize,
    /// a 32-byte Keccak-256 hash of the raw bytes
    pub keccak_hash: [u8; 32],
    /// input from the variants of SourceType
    pub source: SourceType,
}

/// Source type of the bytecode input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceType {
    HexString,
    /// file holding hex text
    File,
    /// file holding binary bytecode, read as-is
    RawFile,
    /// bytecode file of the on-disk corpus
    Corpus,
    /// contract record fetched from a mirror node
    MirrorNode,
}

/// Normalizes hex strings by removing whitespace, 0x prefix, and ensuring even length
pub fn normalize_hex_string(input: &str) -> Result<String, DecodeError> {
    let stripped: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    let clean = stripped
        .strip_prefix("0x")
        .or_else(|| stripped.strip_prefix("0X"))
        .unwrap_or(&stripped);

    if let Some((index, c)) = clean.char_indices().find(|(_, c)| !c.is_ascii_hexdigit()) {
        return Err(DecodeError::HexDecode(
            hex::FromHexError::InvalidHexCharacter { c, index },
        ));
    }

    // Ensure even length by padding with leading zero if necessary
    let clean = clean.to_ascii_lowercase();
    Ok(if clean.len() % 2 == 1 {
        format!("0{clean}")
    } else {
        clean
    })
}

/// Normalizes input into a byte vector from a hex string or a hex-text file.
///
/// Files are always read as hex text. Binary bytecode must go through `read_raw_file`; a file
/// that is not UTF-8 text is rejected rather than guessed at.
pub fn input_to_bytes(input: &str, is_file: bool) -> Result<Vec<u8>, DecodeError> {
    if !is_file {
        let normalized = normalize_hex_string(input)?;
        return Vec::from_hex(&normalized).map_err(DecodeError::HexDecode);
    }

    let path = Path::new(input);
    let raw = fs::read(path).map_err(|e| DecodeError::FileRead {
        path: path.display().to_string(),
        source: e,
    })?;
    let text = String::from_utf8(raw).map_err(|_| DecodeError::NotHexText {
        path: path.display().to_string(),
    })?;
    let normalized = normalize_hex_string(&text)?;
    Vec::from_hex(&normalized).map_err(DecodeError::HexDecode)
}

/// Reads a file of binary bytecode without any hex interpretation.
pub fn read_raw_file(path: &str) -> Result<Vec<u8>, DecodeError> {
    fs::read(path).map_err(|e| DecodeError::FileRead {
        path: path.to_string(),
        source: e,
    })
}

/// Decodes raw EVM bytecode into an ordered instruction stream.
///
/// The sum of `byte_size()` over the result always equals `bytes.len()`. Calling it twice on
/// the same input yields identical output; the input is only borrowed.
///
/// # Examples
/// ```rust
/// use sysprobe_core::{Opcode, decoder::decode};
///
/// let ins = decode(&[0x60, 0x01, 0x61, 0x01, 0x67, 0xf1]);
/// assert_eq!(ins.len(), 3);
/// assert_eq!(ins[1].imm_hex().as_deref(), Some("0167"));
/// assert_eq!(ins[2].opcode, Opcode::CALL);
/// ```
pub fn decode(bytes: &[u8]) -> Vec<Instruction> {
    let mut instructions = Vec::with_capacity(bytes.len() / 2);
    let mut pc = 0;

    while pc < bytes.len() {
        let (opcode, width) = Opcode::parse(bytes[pc]);
        let start = pc + 1;

        let imm = match opcode {
            Opcode::PUSH(_) => {
                let end = start.saturating_add(width).min(bytes.len());
                if end - start < width {
                    tracing::debug!(
                        "truncated {} at pc {:#x}: {} of {} operand bytes",
                        opcode,
                        pc,
                        end - start,
                        width
                    );
                }
                Some(bytes[start..end].to_vec())
            }
            _ => None,
        };

        let consumed = 1 + imm.as_ref().map_or(0, Vec::len);
        instructions.push(Instruction { pc, opcode, imm });
        pc += consumed;
    }

    instructions
}

/// Length and keccak-256 of a bytecode blob.
pub fn bytecode_info(bytes: &[u8], source: SourceType) -> DecodeInfo {
    DecodeInfo {
        byte_length: bytes.len(),
        keccak_hash: keccak256(bytes),
        source,
    }
}

/// Decodes bytecode and computes metadata about the blob.
pub fn decode_with_info(bytes: &[u8], source: SourceType) -> (Vec<Instruction>, DecodeInfo) {
    let instructions = decode(bytes);
    let info = bytecode_info(bytes, source);
    tracing::debug!(
        "decoded {} bytes into {} instructions (keccak 0x{})",
        info.byte_length,
        instructions.len(),
        hex::encode(info.keccak_hash)
    );
    (instructions, info)
}

/// Decodes a hex string or hex-text file into instructions, metadata and the raw bytes.
pub fn decode_bytecode(
    input: &str,
    is_file: bool,
) -> Result<(Vec<Instruction>, DecodeInfo, Vec<u8>), DecodeError> {
    let bytes = input_to_bytes(input, is_file)?;
    let source = if is_file {
        SourceType::File
    } else {
        SourceType::HexString
    };
    let (instructions, info) = decode_with_info(&bytes, source);
    Ok((instructions, info, bytes))
}

/// Decodes a binary bytecode file.
pub fn decode_raw_file(path: &str) -> Result<(Vec<Instruction>, DecodeInfo, Vec<u8>), DecodeError> {
    let bytes = read_raw_file(path)?;
    let (instructions, info) = decode_with_info(&bytes, SourceType::RawFile);
    Ok((instructions, info, bytes))
}

/// Keccak-256 of `bytes`.
pub fn keccak256(bytes: &[u8]) -> [u8; 32] {
    let mut keccak = Keccak::v256();
    keccak.update(bytes);
    let mut hash = [0u8; 32];
    keccak.finalize(&mut hash);
    hash
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // pc: six-digit hex, opcode left-padded to 8 chars, then optional imm
        match self.imm_hex() {
            Some(imm) => write!(f, "{:06x}  {:<8} {}", self.pc, self.opcode.to_string(), imm),
            None => write!(f, "{:06x}  {}", self.pc, self.opcode),
        }
    }
}

impl Instruction {
    /// Returns the number of bytes this instruction occupies in bytecode.
    ///
    /// A truncated trailing push only counts the operand bytes that were actually present.
    #[inline]
    pub fn byte_size(&self) -> usize {
        1 + self.imm.as_ref().map_or(0, Vec::len)
    }

    /// Returns the mnemonic, e.g. `PUSH4` or `UNKNOWN_0x0c`.
    pub fn mnemonic(&self) -> String {
        self.opcode.to_string()
    }

    /// Operand as lowercase hex without prefix, two characters per consumed byte.
    pub fn imm_hex(&self) -> Option<String> {
        self.imm.as_deref().map(hex::encode)
    }

    /// Returns true if the push operand is shorter than the opcode declares.
    pub fn is_truncated(&self) -> bool {
        self.imm
            .as_ref()
            .is_some_and(|imm| imm.len() < self.opcode.push_width())
    }
}
