use std::sync::Arc;

use tracing::{debug, error};

use crate::browser::automation::PageAutomation;
use crate::error::HarnessError;
use crate::lifecycle::env::HarnessEnv;
use crate::monitor::network::{FailedRequest, NetworkMonitor};
use crate::retry::executor::{RetryExecutor, RetryOutcome};

/// Everything one test owns: its browsing context, its monitor and a retry
/// executor. Never shared between tests.
///
/// The context is closed by [`TestUnit::teardown`], or by `Drop` if the test
/// unwinds before teardown runs.
pub struct TestUnit {
    name: String,
    page: Box<dyn PageAutomation>,
    monitor: NetworkMonitor,
    retry: RetryExecutor,
    env: Arc<HarnessEnv>,
    closed: bool,
}

impl TestUnit {
    /// Wrap a freshly created context and attach a monitor to it.
    pub fn new(name: &str, mut page: Box<dyn PageAutomation>, env: Arc<HarnessEnv>) -> Self {
        let monitor = NetworkMonitor::attach(page.as_mut(), Arc::clone(&env.classifier));
        Self {
            name: name.to_string(),
            page,
            monitor,
            retry: RetryExecutor::new(env.retry),
            env,
            closed: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn env(&self) -> &HarnessEnv {
        &self.env
    }

    /// Direct access to the page, without retry.
    pub fn page(&mut self) -> &mut dyn PageAutomation {
        self.page.as_mut()
    }

    /// Failures recorded so far.
    pub fn failed_requests(&mut self) -> &[FailedRequest] {
        self.monitor.collect();
        self.monitor.ledger()
    }

    /// Run an arbitrary page action under the retry policy.
    pub fn with_retry<F>(
        &mut self,
        description: &str,
        mut action: F,
    ) -> Result<RetryOutcome, HarnessError>
    where
        F: FnMut(&mut dyn PageAutomation) -> Result<(), HarnessError>,
    {
        let outcome = self
            .retry
            .run(self.page.as_mut(), description, |page| action(page));
        self.monitor.collect();
        outcome
    }

    pub fn navigate(&mut self, url: &str) -> Result<RetryOutcome, HarnessError> {
        let outcome = self.retry.navigate(self.page.as_mut(), url);
        self.monitor.collect();
        outcome
    }

    pub fn click(
        &mut self,
        selector: &str,
        description: &str,
    ) -> Result<RetryOutcome, HarnessError> {
        let outcome = self.retry.click(self.page.as_mut(), selector, description);
        self.monitor.collect();
        outcome
    }

    pub fn fill(
        &mut self,
        selector: &str,
        value: &str,
        description: &str,
    ) -> Result<RetryOutcome, HarnessError> {
        let outcome = self.retry.fill(self.page.as_mut(), selector, value, description);
        self.monitor.collect();
        outcome
    }

    /// Flush pending events, surface the ledger and close the context.
    pub fn teardown(&mut self) -> Vec<FailedRequest> {
        if self.closed {
            return Vec::new();
        }

        if let Err(e) = self.page.flush_events() {
            debug!("Could not flush pending events: {}", e);
        }
        self.monitor.collect();
        let ledger = self.monitor.report_and_clear();

        self.close_context();
        ledger
    }

    fn close_context(&mut self) {
        if self.closed {
            return;
        }
        debug!("Closing browser context");
        if let Err(e) = self.page.close() {
            error!("Failed to close browser context: {}", e);
        }
        self.closed = true;
    }
}

impl Drop for TestUnit {
    fn drop(&mut self) {
        self.close_context();
    }
}
