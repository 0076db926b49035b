use crate::report::report_model::TestSuiteReport;

// ============================================================================
// Console reporter
// ============================================================================

/// Format a test suite report for terminal output.
///
/// Produces output like:
/// ```text
/// === Test Suite: Storefront ===
///
/// ✓ PASS  login_valid (1.2s)
/// ✗ FAIL  checkout_process (4.8s)
///     [FAIL] Assertion failed: Cart should contain 2 items, found 1
///     [NET]  URL: https://shop.test/api/cart, Status: 500, Error: Request failed: POST https://shop.test/api/cart
///
/// === Results: 1 passed, 1 failed (2 total) ===
/// ```
pub fn format_console_report(report: &TestSuiteReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== Test Suite: {} ===\n\n", report.suite_name));

    for outcome in &report.outcomes {
        let marker = if outcome.passed {
            "\u{2713} PASS"
        } else {
            "\u{2717} FAIL"
        };

        out.push_str(&format!(
            "{}  {} ({:.1}s)\n",
            marker,
            outcome.name,
            outcome.duration_ms as f64 / 1000.0
        ));

        if let Some(ref failure) = outcome.failure {
            out.push_str(&format!("    [FAIL] {}\n", failure));
        }

        // Network anomalies are shown for passing tests too
        for request in &outcome.failed_requests {
            out.push_str(&format!("    [NET]  {}\n", request));
        }
    }

    // Summary line
    out.push_str(&format!(
        "\n=== Results: {} passed, {} failed ({} total)",
        report.passed, report.failed, report.total
    ));

    if let Some(ms) = report.duration_ms {
        let secs = ms as f64 / 1000.0;
        out.push_str(&format!(" in {:.1}s", secs));
    }

    out.push_str(" ===\n");

    let network_failures = report.failed_request_count();
    if network_failures > 0 {
        out.push_str(&format!(
            "{} network failure(s) recorded\n",
            network_failures
        ));
    }

    out
}
