use storefront_harness::inventory::price::{PriceParseResult, parse_price, prices_equal};

// ============================================================================
// parse_price
// ============================================================================

#[test]
fn parses_dollar_prefixed_price() {
    assert_eq!(
        parse_price(Some("$29.99")),
        PriceParseResult::Parsed { value: 29.99 }
    );
}

#[test]
fn parses_bare_number() {
    assert_eq!(parse_price(Some("7.99")).value(), Some(7.99));
}

#[test]
fn surrounding_whitespace_is_ignored() {
    assert_eq!(parse_price(Some("  $ 15.99 \n")).value(), Some(15.99));
}

#[test]
fn absent_text_is_missing() {
    assert_eq!(parse_price(None), PriceParseResult::Missing);
}

#[test]
fn blank_text_is_missing() {
    assert_eq!(parse_price(Some("")), PriceParseResult::Missing);
    assert_eq!(parse_price(Some("   ")), PriceParseResult::Missing);
}

#[test]
fn non_numeric_text_is_malformed() {
    assert_eq!(
        parse_price(Some("$abc")),
        PriceParseResult::Malformed { raw: "$abc".into() }
    );
    assert_eq!(
        parse_price(Some(" free ")),
        PriceParseResult::Malformed { raw: "free".into() }
    );
}

#[test]
fn lone_currency_symbol_is_malformed() {
    assert!(matches!(
        parse_price(Some("$")),
        PriceParseResult::Malformed { .. }
    ));
}

#[test]
fn malformed_has_no_value() {
    assert_eq!(parse_price(Some("N/A")).value(), None);
    assert_eq!(parse_price(None).value(), None);
}

// ============================================================================
// prices_equal
// ============================================================================

#[test]
fn prices_within_tolerance_are_equal() {
    assert!(prices_equal(9.99, 9.9905));
    assert!(prices_equal(0.1 + 0.2, 0.3));
}

#[test]
fn prices_a_cent_apart_differ() {
    assert!(!prices_equal(9.99, 10.00));
}
