/// Module for detecting system-contract usage in decoded instruction streams.
///
/// Both detectors are whole-function co-occurrence heuristics: they report whether a `CALL`,
/// the reserved address literal and catalogued selectors appear anywhere in the stream, not
/// whether they meet at one call site or on one execution path.
///
/// # Usage
/// ```rust
/// use sysprobe_core::catalog::SelectorCatalog;
/// use sysprobe_core::decoder::decode;
/// use sysprobe_core::detection::{AddressMatch, detect_system_contract_call};
///
/// let catalog = SelectorCatalog::token_service();
/// let bytes = hex::decode("63189a554c6001610167f1").unwrap();
/// let result = detect_system_contract_call(&decode(&bytes), &catalog, AddressMatch::Normalized);
/// assert!(result.is_match());
/// ```
pub mod secp;
pub mod system_call;

pub use secp::{Advisory, SecpFlags, detect_secp_token_creation};
pub use system_call::{DetectionResult, detect_system_contract_call};

use crate::catalog::{Selector, SelectorCatalog};
use crate::decoder::Instruction;
use serde::{Deserialize, Serialize};

/// How a push operand is compared with the reserved address literal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressMatch {
    /// Compare numeric values: leading zero bytes are ignored, so `PUSH20 0x00..0167`
    /// matches as well as `PUSH2 0x0167`.
    #[default]
    Normalized,
    /// Compare the operand bytes as emitted; only the short form `0167` matches.
    Exact,
}

impl AddressMatch {
    /// Returns true if `operand` denotes `address` under this policy.
    pub fn matches(self, operand: &[u8], address: &[u8]) -> bool {
        match self {
            Self::Exact => operand == address,
            Self::Normalized => trim_leading_zeros(operand) == trim_leading_zeros(address),
        }
    }
}

fn trim_leading_zeros(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    &bytes[start..]
}

/// Iterates over the operands of literal-push instructions.
fn push_operands(instructions: &[Instruction]) -> impl Iterator<Item = &[u8]> {
    instructions
        .iter()
        .filter(|ins| ins.opcode.is_push())
        .filter_map(|ins| ins.imm.as_deref())
}

/// True iff some instruction is exactly `CALL`. `CALLCODE`, `DELEGATECALL` and `STATICCALL`
/// are not counted.
pub fn has_call(instructions: &[Instruction]) -> bool {
    instructions.iter().any(|ins| ins.opcode.is_call())
}

/// True iff some push operand denotes the catalog's system-contract address.
pub fn has_address_literal(
    instructions: &[Instruction],
    catalog: &SelectorCatalog,
    policy: AddressMatch,
) -> bool {
    let address = catalog.system_contract_address();
    push_operands(instructions).any(|operand| policy.matches(operand, address))
}

/// Every 4-byte push operand present in the catalog, in scan order, duplicates kept.
pub fn matched_selectors(instructions: &[Instruction], catalog: &SelectorCatalog) -> Vec<Selector> {
    push_operands(instructions)
        .filter_map(Selector::from_slice)
        .filter(|sel| catalog.contains(sel))
        .collect()
}
