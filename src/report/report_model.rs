use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, HarnessError};
use crate::monitor::network::FailedRequest;

/// Verdict for a single test, plus its network diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestOutcome {
    pub name: String,
    pub passed: bool,

    /// What failed, if anything (assertion, validation or automation detail)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_kind: Option<ErrorKind>,

    /// Non-ignorable network failures observed while the test ran
    #[serde(default)]
    pub failed_requests: Vec<FailedRequest>,

    pub duration_ms: u128,
}

impl TestOutcome {
    pub fn passed(name: &str, failed_requests: Vec<FailedRequest>, duration_ms: u128) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            failure: None,
            failure_kind: None,
            failed_requests,
            duration_ms,
        }
    }

    pub fn failed(
        name: &str,
        error: &HarnessError,
        failed_requests: Vec<FailedRequest>,
        duration_ms: u128,
    ) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            failure: Some(error.to_string()),
            failure_kind: Some(error.kind()),
            failed_requests,
            duration_ms,
        }
    }

    /// A test that failed without a typed error (e.g. it panicked).
    pub fn aborted(
        name: &str,
        reason: String,
        failed_requests: Vec<FailedRequest>,
        duration_ms: u128,
    ) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            failure: Some(reason),
            failure_kind: Some(ErrorKind::Programming),
            failed_requests,
            duration_ms,
        }
    }
}

// ============================================================================
// Test suite report - aggregates multiple TestOutcome instances
// ============================================================================

/// Aggregated report for a suite of test runs.
///
/// Built from a `Vec<TestOutcome>` via `from_outcomes()`. Consumed by
/// console, HTML, and JUnit reporters to produce human-readable output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSuiteReport {
    /// Name of the test suite
    pub suite_name: String,

    /// Total number of tests
    pub total: usize,

    /// Number of passing tests
    pub passed: usize,

    /// Number of failing tests
    pub failed: usize,

    /// Total execution duration in milliseconds (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u128>,

    /// Individual test outcomes
    pub outcomes: Vec<TestOutcome>,
}

impl TestSuiteReport {
    /// Build a suite report from a list of outcomes.
    ///
    /// Automatically computes total, passed, and failed counts.
    pub fn from_outcomes(suite_name: &str, outcomes: Vec<TestOutcome>) -> Self {
        let total = outcomes.len();
        let passed = outcomes.iter().filter(|o| o.passed).count();
        let failed = total - passed;
        Self {
            suite_name: suite_name.to_string(),
            total,
            passed,
            failed,
            duration_ms: None,
            outcomes,
        }
    }

    /// Set the total execution duration.
    pub fn with_duration(mut self, duration_ms: u128) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Whether all tests in the suite passed.
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Number of network failures across all tests.
    pub fn failed_request_count(&self) -> usize {
        self.outcomes.iter().map(|o| o.failed_requests.len()).sum()
    }
}
