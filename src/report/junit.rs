use crate::report::report_model::{TestOutcome, TestSuiteReport};

// ============================================================================
// JUnit XML reporter
// ============================================================================

const CLASSNAME: &str = "storefront-harness";

/// Generate a JUnit XML report for CI systems (Jenkins, GitHub Actions, GitLab CI).
///
/// Failed network requests go to `<system-out>` so a failure can be triaged
/// from the CI page alone:
/// ```xml
/// <?xml version="1.0" encoding="UTF-8"?>
/// <testsuite name="Storefront" tests="2" failures="1" time="6.000">
///   <testcase name="login_valid" classname="storefront-harness" time="1.200" />
///   <testcase name="checkout_process" classname="storefront-harness" time="4.800">
///     <failure message="Assertion failed: ..." type="programming">...</failure>
///     <system-out>URL: ..., Status: 500, Error: ...</system-out>
///   </testcase>
/// </testsuite>
/// ```
pub fn generate_junit_xml(report: &TestSuiteReport) -> String {
    let time_attr = report
        .duration_ms
        .map(|ms| format!(" time=\"{:.3}\"", ms as f64 / 1000.0))
        .unwrap_or_default();

    let mut cases = String::new();
    for outcome in &report.outcomes {
        cases.push_str(&format_case(outcome));
    }

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<testsuite name=\"{name}\" tests=\"{tests}\" failures=\"{failures}\"{time}>\n{cases}</testsuite>\n",
        name = escape_xml(&report.suite_name),
        tests = report.total,
        failures = report.failed,
        time = time_attr,
        cases = cases,
    )
}

fn format_case(outcome: &TestOutcome) -> String {
    let open = format!(
        "  <testcase name=\"{}\" classname=\"{}\" time=\"{:.3}\"",
        escape_xml(&outcome.name),
        CLASSNAME,
        outcome.duration_ms as f64 / 1000.0
    );

    if outcome.passed && outcome.failed_requests.is_empty() {
        return format!("{} />\n", open);
    }

    let mut body = String::new();
    if !outcome.passed {
        let message = outcome.failure.as_deref().unwrap_or("test failed");
        let kind = outcome
            .failure_kind
            .and_then(|k| serde_json::to_value(k).ok())
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_else(|| "failure".to_string());
        body.push_str(&format!(
            "    <failure message=\"{message}\" type=\"{kind}\">{message}</failure>\n",
            message = escape_xml(message),
            kind = escape_xml(&kind),
        ));
    }

    if !outcome.failed_requests.is_empty() {
        let lines: Vec<String> = outcome
            .failed_requests
            .iter()
            .map(|r| r.to_string())
            .collect();
        body.push_str(&format!(
            "    <system-out>{}</system-out>\n",
            escape_xml(&lines.join("\n"))
        ));
    }

    format!("{}>\n{}  </testcase>\n", open, body)
}

/// Escape XML special characters.
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
