//! Heuristic for token creation with a secp256k1 admin key.
//!
//! The four flags are reported independently; `advisories` composes them the way the report
//! prints them.

use super::{AddressMatch, has_address_literal, has_call, matched_selectors};
use crate::Opcode;
use crate::catalog::SelectorCatalog;
use crate::decoder::Instruction;
use serde::{Deserialize, Serialize};
use std::fmt;

/// `KeyValueType.SECP256K1` tag as pushed by `PUSH1`.
pub const SECP256K1_KEY_TYPE: u8 = 0x03;

/// Independent flags raised by the secp256k1 token-creation scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecpFlags {
    pub address_literal: bool,
    pub call_opcode: bool,
    /// A token-creation selector from the catalog's fixed subset is pushed.
    pub token_creation_with_fees: bool,
    /// `PUSH1 0x03` appears.
    pub key_type_literal: bool,
}

/// Human-readable findings composed from `SecpFlags`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Advisory {
    /// Address literal and `CALL` both present.
    AddressUsage,
    /// A token-creation selector is present.
    CreationMethodUsage,
    /// Key-type literal, address literal and creation selector are all present.
    KeyTypeUsage,
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AddressUsage => f.write_str(
                "Usage of system contract address 0x167 detected. \
                 Calls to this address may have been made.",
            ),
            Self::CreationMethodUsage => f.write_str(
                "Usage of a token creation selector detected. \
                 Calls using this method may have been made.",
            ),
            Self::KeyTypeUsage => f.write_str(
                "Possible usage of KeyValueType.SECP256K1 detected. \
                 Token creation calls with this key type may have been made.",
            ),
        }
    }
}

impl SecpFlags {
    /// Advisories in report order.
    pub fn advisories(&self) -> Vec<Advisory> {
        let mut out = Vec::new();
        if self.address_literal && self.call_opcode {
            out.push(Advisory::AddressUsage);
        }
        if self.token_creation_with_fees {
            out.push(Advisory::CreationMethodUsage);
        }
        if self.key_type_literal && self.address_literal && self.token_creation_with_fees {
            out.push(Advisory::KeyTypeUsage);
        }
        out
    }
}

/// Scans `instructions` for the secp256k1 token-creation pattern.
pub fn detect_secp_token_creation(
    instructions: &[Instruction],
    catalog: &SelectorCatalog,
    policy: AddressMatch,
) -> SecpFlags {
    let token_creation_with_fees = matched_selectors(instructions, catalog)
        .iter()
        .any(|sel| catalog.is_token_creation(sel));
    let key_type_literal = instructions.iter().any(|ins| {
        ins.opcode == Opcode::PUSH(1) && ins.imm.as_deref() == Some(&[SECP256K1_KEY_TYPE][..])
    });

    SecpFlags {
        address_literal: has_address_literal(instructions, catalog, policy),
        call_opcode: has_call(instructions),
        token_creation_with_fees,
        key_type_literal,
    }
}
