use std::io;
use std::sync::{Arc, Mutex};

use storefront_harness::error::ValidationError;
use storefront_harness::inventory::validator::{
    ItemSnapshot, PricedItem, TieFlags, cheapest, most_expensive, validate,
};

fn storefront() -> ItemSnapshot {
    ItemSnapshot::from_pairs([
        ("Sauce Labs Backpack", Some("$29.99")),
        ("Sauce Labs Bike Light", Some("$9.99")),
        ("Sauce Labs Bolt T-Shirt", Some("$15.99")),
        ("Sauce Labs Fleece Jacket", Some("$49.99")),
        ("Sauce Labs Onesie", Some("$7.99")),
        ("Test.allTheThings() T-Shirt (Red)", Some("$15.99")),
    ])
}

// ============================================================================
// validate
// ============================================================================

#[test]
fn clean_catalog_has_single_extremes() {
    let report = validate(&storefront());

    assert!(!report.has_missing_prices());
    assert_eq!(report.lowest_price_items, vec!["Sauce Labs Onesie"]);
    assert_eq!(report.highest_price_items, vec!["Sauce Labs Fleece Jacket"]);
    assert_eq!(report.has_tie, TieFlags::default());
}

#[test]
fn tie_and_missing_price_are_both_reported() {
    let snapshot = ItemSnapshot::from_pairs([
        ("A", Some("$10.00")),
        ("B", Some("$10.00")),
        ("C", None),
    ]);

    let report = validate(&snapshot);
    assert_eq!(report.missing_items, vec!["C"]);
    assert_eq!(report.lowest_price_items, vec!["A", "B"]);
    assert_eq!(report.highest_price_items, vec!["A", "B"]);
    assert_eq!(
        report.has_tie,
        TieFlags {
            low: true,
            high: true
        }
    );
}

#[test]
fn malformed_prices_count_as_missing() {
    let snapshot = ItemSnapshot::from_pairs([
        ("Good", Some("$5.00")),
        ("Garbled", Some("$abc")),
        ("Blank", Some("  ")),
    ]);

    let report = validate(&snapshot);
    assert_eq!(report.missing_items, vec!["Garbled", "Blank"]);
    assert_eq!(report.lowest_price_items, vec!["Good"]);
}

#[test]
fn empty_snapshot_yields_empty_report() {
    let report = validate(&ItemSnapshot::default());

    assert!(report.missing_items.is_empty());
    assert!(report.lowest_price_items.is_empty());
    assert!(report.highest_price_items.is_empty());
    assert_eq!(report.has_tie, TieFlags::default());
}

#[test]
fn missing_items_never_appear_in_extreme_groups() {
    let snapshot = ItemSnapshot::from_pairs([
        ("X", None),
        ("Y", Some("$3.00")),
        ("Z", Some("oops")),
        ("W", Some("$8.00")),
    ]);

    let report = validate(&snapshot);
    for missing in &report.missing_items {
        assert!(!report.lowest_price_items.contains(missing));
        assert!(!report.highest_price_items.contains(missing));
    }
    assert_eq!(report.lowest_price_items, vec!["Y"]);
    assert_eq!(report.highest_price_items, vec!["W"]);
}

#[test]
fn single_item_is_both_cheapest_and_most_expensive() {
    let report = validate(&ItemSnapshot::from_pairs([("Only", Some("$1.00"))]));

    assert_eq!(report.lowest_price_items, vec!["Only"]);
    assert_eq!(report.highest_price_items, vec!["Only"]);
    assert!(!report.has_tie.low);
    assert!(!report.has_tie.high);
}

#[test]
fn prices_within_epsilon_tie() {
    let snapshot = ItemSnapshot::from_pairs([("P", Some("$4.9999")), ("Q", Some("$5.0000"))]);

    let report = validate(&snapshot);
    assert!(report.has_tie.low);
    assert_eq!(report.lowest_price_items, vec!["P", "Q"]);
}

// ============================================================================
// cheapest / most_expensive
// ============================================================================

#[test]
fn picks_extremes_with_prices() {
    let snapshot = storefront();

    assert_eq!(
        cheapest(&snapshot).unwrap(),
        PricedItem {
            name: "Sauce Labs Onesie".into(),
            price: 7.99
        }
    );
    assert_eq!(
        most_expensive(&snapshot).unwrap(),
        PricedItem {
            name: "Sauce Labs Fleece Jacket".into(),
            price: 49.99
        }
    );
}

#[test]
fn ties_resolve_to_first_in_snapshot_order() {
    let snapshot = ItemSnapshot::from_pairs([
        ("Second", Some("$2.00")),
        ("First", Some("$1.00")),
        ("Also First", Some("$1.00")),
        ("Top", Some("$9.00")),
        ("Also Top", Some("$9.00")),
    ]);

    assert_eq!(cheapest(&snapshot).unwrap().name, "First");
    assert_eq!(most_expensive(&snapshot).unwrap().name, "Top");
}

#[test]
fn selection_refuses_snapshot_with_missing_prices() {
    let snapshot = ItemSnapshot::from_pairs([("A", Some("$10.00")), ("C", None)]);

    assert_eq!(
        cheapest(&snapshot),
        Err(ValidationError::MissingPrices(vec!["C".into()]))
    );
    assert_eq!(
        most_expensive(&snapshot),
        Err(ValidationError::MissingPrices(vec!["C".into()]))
    );
}

#[test]
fn selection_on_empty_snapshot_fails() {
    assert_eq!(
        cheapest(&ItemSnapshot::default()),
        Err(ValidationError::NoValidPrices)
    );
}

#[test]
fn duplicate_names_keep_their_own_price() {
    let snapshot = ItemSnapshot::from_pairs([("Dup", Some("$5.00")), ("Dup", Some("$1.00"))]);

    assert_eq!(cheapest(&snapshot).unwrap().price, 1.0);
    assert_eq!(most_expensive(&snapshot).unwrap().price, 5.0);
}

#[test]
fn snapshot_reads_from_json_list() {
    let json = r#"[{"name": "A", "raw_price": "$1.00"}, {"name": "B"}]"#;
    let snapshot: ItemSnapshot = serde_json::from_str(json).unwrap();

    assert_eq!(snapshot.len(), 2);
    assert_eq!(validate(&snapshot).missing_items, vec!["B"]);
}

// ============================================================================
// Tie warnings
// ============================================================================

/// Log sink shared with a scoped `tracing` subscriber.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.0.lock().unwrap())
            .lines()
            .map(str::to_string)
            .collect()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn with_captured_logs<T>(f: impl FnOnce() -> T) -> (T, Vec<String>) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    let value = tracing::subscriber::with_default(subscriber, f);
    (value, logs.lines())
}

fn tied_at_top() -> ItemSnapshot {
    ItemSnapshot::from_pairs([("A", Some("$10")), ("B", Some("$10")), ("C", Some("$5"))])
}

#[test]
fn tie_at_top_is_reported_and_first_item_wins() {
    let report = validate(&tied_at_top());
    assert_eq!(report.highest_price_items, vec!["A", "B"]);
    assert_eq!(report.lowest_price_items, vec!["C"]);
    assert_eq!(report.has_tie, TieFlags { low: false, high: true });

    assert_eq!(cheapest(&tied_at_top()).unwrap().name, "C");
    assert_eq!(
        most_expensive(&tied_at_top()).unwrap(),
        PricedItem {
            name: "A".to_string(),
            price: 10.0
        }
    );
}

#[test]
fn picking_from_a_tie_logs_one_warning_naming_the_group() {
    let (picked, lines) = with_captured_logs(|| most_expensive(&tied_at_top()));
    assert_eq!(picked.unwrap().name, "A");

    let warnings: Vec<&String> = lines.iter().filter(|l| l.contains("WARN")).collect();
    assert_eq!(warnings.len(), 1, "{:?}", lines);
    assert!(warnings[0].contains("highest price: A, B"), "{}", warnings[0]);
}

#[test]
fn unique_extreme_logs_no_warning() {
    let (picked, lines) = with_captured_logs(|| cheapest(&tied_at_top()));
    assert_eq!(picked.unwrap().name, "C");
    assert!(lines.iter().all(|l| !l.contains("WARN")), "{:?}", lines);
}
