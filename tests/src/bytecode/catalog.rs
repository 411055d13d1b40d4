use sysprobe_core::catalog::{Selector, SelectorCatalog, TOKEN_SERVICE_ADDRESS};

#[test]
fn test_lookup_is_total_and_idempotent() {
    let catalog = SelectorCatalog::token_service();
    for (selector, name) in catalog.enumerate() {
        assert_eq!(catalog.lookup(&selector), Some(name));
        assert_eq!(catalog.lookup(&selector), catalog.lookup(&selector));
        assert!(catalog.contains(&selector));
    }

    // ERC-20 transfer is not a token-service selector
    let absent = Selector::from_u32(0xa9059cbb);
    assert_eq!(catalog.lookup(&absent), None);
    assert!(!catalog.contains(&absent));
}

#[test]
fn test_catalog_shape() {
    let catalog = SelectorCatalog::token_service();
    assert_eq!(catalog.len(), 63);
    assert_eq!(catalog.system_contract_address(), &TOKEN_SERVICE_ADDRESS[..]);
    assert_eq!(catalog.token_creation_selectors().len(), 4);
    for selector in catalog.token_creation_selectors() {
        assert!(catalog.contains(selector));
    }

    let positions: Vec<usize> = catalog
        .enumerate()
        .filter_map(|(s, _)| catalog.position(&s))
        .collect();
    assert_eq!(positions, (0..catalog.len()).collect::<Vec<_>>());
}

#[test]
fn test_selector_text() {
    let selector: Selector = "0x189A554C".parse().unwrap();
    assert_eq!(selector, Selector::from_u32(0x189a554c));
    assert_eq!(selector.to_string(), "189a554c");
    assert!("189a55".parse::<Selector>().is_err());
    assert_eq!(
        serde_json::to_string(&selector).unwrap(),
        "\"189a554c\""
    );
}
