use super::random_bytecode;
use sysprobe_core::catalog::{Selector, SelectorCatalog};
use sysprobe_core::decoder::decode;
use sysprobe_core::detection::{
    AddressMatch, Advisory, DetectionResult, detect_secp_token_creation,
    detect_system_contract_call,
};

fn detect(hex_code: &str, policy: AddressMatch) -> DetectionResult {
    let catalog = SelectorCatalog::token_service();
    detect_system_contract_call(&decode(&hex::decode(hex_code).unwrap()), &catalog, policy)
}

#[test]
fn test_address_and_call_without_selector() {
    let ins = decode(&hex::decode("6001610167f1").unwrap());
    assert_eq!(ins.len(), 3);

    let result = detect("6001610167f1", AddressMatch::Normalized);
    assert!(result.has_call);
    assert!(result.has_address_literal);
    assert!(result.matched_selectors.is_empty());
    assert!(!result.is_match());
}

#[test]
fn test_selector_address_and_call() {
    let result = detect("63189a554c6001610167f1", AddressMatch::Normalized);
    assert_eq!(result.matched_selectors, vec![Selector::from_u32(0x189a554c)]);
    assert!(result.is_match());
    assert_eq!(result.matched_selectors[0].to_string(), "189a554c");
}

#[test]
fn test_only_plain_call_counts() {
    // CALLCODE, DELEGATECALL, STATICCALL
    for op in ["f2", "f4", "fa"] {
        let result = detect(&format!("63189a554c610167{op}"), AddressMatch::Normalized);
        assert!(!result.has_call, "opcode {op}");
        assert!(!result.is_match());
    }
}

#[test]
fn test_padded_address_needs_normalization() {
    // PUSH20 0x00..0167
    let code = format!("73{}0167 63189a554c f1", "00".repeat(18)).replace(' ', "");
    assert!(detect(&code, AddressMatch::Normalized).is_match());
    assert!(!detect(&code, AddressMatch::Exact).has_address_literal);
}

#[test]
fn test_selector_bytes_inside_wider_push_do_not_match() {
    // PUSH5 0x00189a554c
    let result = detect("6400189a554c610167f1", AddressMatch::Normalized);
    assert!(result.matched_selectors.is_empty());
}

#[test]
fn test_selector_bytes_inside_operand_are_not_opcodes() {
    // PUSH32 whose operand contains 63189a554c and f1
    let operand = format!("63189a554c610167f1{}", "00".repeat(23));
    let result = detect(&format!("7f{operand}"), AddressMatch::Normalized);
    assert!(!result.has_call);
    assert!(!result.has_address_literal);
    assert!(result.matched_selectors.is_empty());
}

#[test]
fn test_detectors_leave_input_untouched() {
    let catalog = SelectorCatalog::token_service();
    for seed in 0..50 {
        let bytes = random_bytecode(seed, 200);
        let ins = decode(&bytes);
        let snapshot = ins.clone();
        let first = detect_system_contract_call(&ins, &catalog, AddressMatch::Normalized);
        let _ = detect_secp_token_creation(&ins, &catalog, AddressMatch::Normalized);
        assert_eq!(ins, snapshot);
        assert_eq!(
            first,
            detect_system_contract_call(&ins, &catalog, AddressMatch::Normalized)
        );
    }
}

#[test]
fn test_secp_advisories() {
    let catalog = SelectorCatalog::token_service();
    // PUSH1 0x03, PUSH4 createFungibleToken, PUSH2 0x0167, CALL
    let ins = decode(&hex::decode("6003630fb65bf3610167f1").unwrap());
    let flags = detect_secp_token_creation(&ins, &catalog, AddressMatch::Normalized);
    assert_eq!(
        flags.advisories(),
        vec![
            Advisory::AddressUsage,
            Advisory::CreationMethodUsage,
            Advisory::KeyTypeUsage
        ]
    );

    // non-creation selector: address usage only
    let ins = decode(&hex::decode("600363189a554c610167f1").unwrap());
    let flags = detect_secp_token_creation(&ins, &catalog, AddressMatch::Normalized);
    assert_eq!(flags.advisories(), vec![Advisory::AddressUsage]);
    assert!(flags.key_type_literal);
}
