use super::{AddressMatch, has_address_literal, has_call, matched_selectors};
use crate::catalog::{Selector, SelectorCatalog};
use crate::decoder::Instruction;
use serde::{Deserialize, Serialize};

/// Outcome of the system-contract call heuristic for one contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionResult {
    /// A plain `CALL` appears somewhere in the code.
    pub has_call: bool,
    /// A push operand denotes the system-contract address.
    pub has_address_literal: bool,
    /// Catalogued selectors pushed by the code, in scan order with duplicates.
    pub matched_selectors: Vec<Selector>,
}

impl DetectionResult {
    /// Composite verdict: call, address literal and at least one known selector all co-occur.
    ///
    /// The three conditions are not tied to one call site.
    pub fn is_match(&self) -> bool {
        self.has_call && self.has_address_literal && !self.matched_selectors.is_empty()
    }
}

/// Scans `instructions` for a call to the catalog's system contract.
pub fn detect_system_contract_call(
    instructions: &[Instruction],
    catalog: &SelectorCatalog,
    policy: AddressMatch,
) -> DetectionResult {
    let result = DetectionResult {
        has_call: has_call(instructions),
        has_address_literal: has_address_literal(instructions, catalog, policy),
        matched_selectors: matched_selectors(instructions, catalog),
    };
    tracing::debug!(
        "call={} address={} selectors={}",
        result.has_call,
        result.has_address_literal,
        result.matched_selectors.len()
    );
    result
}
