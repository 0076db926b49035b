use std::sync::Arc;

use storefront_harness::browser::automation::PageAutomation;
use storefront_harness::browser::events::PageEvent;
use storefront_harness::monitor::classifier::ErrorClassifier;
use storefront_harness::monitor::network::{FailedRequest, NetworkMonitor};

mod common;

use crate::common::{ScriptedPage, classifier, response};

fn monitor() -> NetworkMonitor {
    NetworkMonitor::new(Arc::new(classifier()))
}

// ============================================================================
// Recording rules
// ============================================================================

#[test]
fn server_error_is_recorded() {
    let mut m = monitor();
    m.observe(&response("POST", "https://shop.test/api/checkout", 500));

    assert_eq!(
        m.ledger(),
        &[FailedRequest {
            url: "https://shop.test/api/checkout".into(),
            status: 500,
            message: "Request failed: POST https://shop.test/api/checkout".into(),
        }]
    );
}

#[test]
fn ignorable_error_response_is_skipped() {
    let mut m = monitor();
    m.observe(&response("GET", "https://shop.test/favicon.ico", 404));
    m.observe(&response("GET", "https://www.analytics.example/collect", 503));

    assert!(m.ledger().is_empty());
}

#[test]
fn successful_and_redirect_responses_are_skipped() {
    let mut m = monitor();
    m.observe(&response("GET", "https://shop.test/inventory.html", 200));
    m.observe(&response("GET", "https://shop.test/", 302));
    m.observe(&response("GET", "https://shop.test/edge", 399));

    assert!(m.ledger().is_empty());
}

#[test]
fn status_400_is_the_threshold() {
    let mut m = monitor();
    m.observe(&response("GET", "https://shop.test/bad", 400));
    assert_eq!(m.ledger().len(), 1);
}

#[test]
fn page_error_is_recorded_with_status_zero() {
    let mut m = monitor();
    m.observe(&PageEvent::PageError {
        url: "https://shop.test/cart.html".into(),
        message: "TypeError: x is undefined".into(),
    });

    let ledger = m.ledger();
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].status, 0);
    assert_eq!(ledger[0].message, "TypeError: x is undefined");
}

#[test]
fn ignorable_page_error_is_skipped() {
    let mut m = monitor();
    m.observe(&PageEvent::PageError {
        url: "https://shop.test/".into(),
        message: "analytics blocked by client".into(),
    });
    assert!(m.ledger().is_empty());
}

#[test]
fn requests_and_console_messages_are_never_recorded() {
    let mut m = NetworkMonitor::new(Arc::new(ErrorClassifier::empty()));
    m.observe(&PageEvent::Request {
        method: "GET".into(),
        url: "https://shop.test/api/checkout".into(),
    });
    m.observe(&PageEvent::Console {
        kind: "error".into(),
        text: "Failed to load resource: 500".into(),
    });
    assert!(m.ledger().is_empty());
}

// ============================================================================
// Ledger lifecycle
// ============================================================================

#[test]
fn report_and_clear_returns_ledger_and_empties_it() {
    let mut m = monitor();
    m.observe(&response("GET", "https://shop.test/a", 500));

    let taken = m.report_and_clear();
    assert_eq!(taken.len(), 1);
    assert!(m.ledger().is_empty());
    assert!(m.report_and_clear().is_empty());
}

#[test]
fn attached_monitor_records_in_emission_order() {
    let (mut page, handle) = ScriptedPage::new();
    let mut m = NetworkMonitor::attach(&mut page, Arc::new(classifier()));

    handle.emit(response("GET", "https://shop.test/first", 500));
    handle.emit(response("GET", "https://shop.test/favicon.ico", 404));
    handle.emit(response("GET", "https://shop.test/second", 502));
    page.flush_events().unwrap();
    handle.emit(response("GET", "https://shop.test/third", 404));
    page.flush_events().unwrap();
    m.collect();

    let urls: Vec<&str> = m.ledger().iter().map(|r| r.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            "https://shop.test/first",
            "https://shop.test/second",
            "https://shop.test/third"
        ]
    );
}

#[test]
fn events_before_subscription_are_still_delivered() {
    let (mut page, handle) = ScriptedPage::new();
    handle.emit(response("GET", "https://shop.test/early", 500));

    let mut m = NetworkMonitor::attach(&mut page, Arc::new(classifier()));
    m.collect();
    assert_eq!(m.ledger().len(), 1);
}

#[test]
fn failed_request_display_format() {
    let request = FailedRequest {
        url: "https://shop.test/api".into(),
        status: 503,
        message: "Request failed: GET https://shop.test/api".into(),
    };
    assert_eq!(
        request.to_string(),
        "URL: https://shop.test/api, Status: 503, Error: Request failed: GET https://shop.test/api"
    );
}
