use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Instant;

use tracing::{error, info, info_span};

use crate::browser::automation::SharedEngine;
use crate::error::{AutomationError, HarnessError};
use crate::lifecycle::env::HarnessEnv;
use crate::lifecycle::unit::TestUnit;
use crate::report::report_model::TestOutcome;
use crate::trace::logger::TraceLogger;

/// Body of a test: drives the unit's page and returns `Err` to fail.
pub type TestBody = Arc<dyn Fn(&mut TestUnit) -> Result<(), HarnessError> + Send + Sync>;

/// A named test body.
#[derive(Clone)]
pub struct TestCase {
    pub name: String,
    pub body: TestBody,
}

impl TestCase {
    pub fn new<F>(name: &str, body: F) -> Self
    where
        F: Fn(&mut TestUnit) -> Result<(), HarnessError> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            body: Arc::new(body),
        }
    }
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase").field("name", &self.name).finish()
    }
}

/// Suite-level lifecycle: one browser for the suite, one fresh context per
/// test.
pub struct TestSuite {
    engine: SharedEngine,
    env: Arc<HarnessEnv>,
    trace: TraceLogger,
}

impl TestSuite {
    /// Take ownership of an already launched engine.
    pub fn start(engine: SharedEngine, env: HarnessEnv) -> Self {
        info!("=== Starting Test Suite ===");
        Self {
            engine,
            env: Arc::new(env),
            trace: TraceLogger::disabled(),
        }
    }

    /// Append every outcome to `trace` as soon as its test finishes.
    pub fn with_trace(mut self, trace: TraceLogger) -> Self {
        self.trace = trace;
        self
    }

    pub fn env(&self) -> &HarnessEnv {
        &self.env
    }

    /// Run one test in its own browsing context.
    ///
    /// The context is closed whether the body succeeds, returns an error or
    /// panics; the failure ledger is collected before it closes.
    pub fn run_test<F>(&self, name: &str, body: F) -> TestOutcome
    where
        F: FnOnce(&mut TestUnit) -> Result<(), HarnessError>,
    {
        let outcome = self.run_in_context(name, body);
        self.trace.log(&outcome);
        outcome
    }

    fn run_in_context<F>(&self, name: &str, body: F) -> TestOutcome
    where
        F: FnOnce(&mut TestUnit) -> Result<(), HarnessError>,
    {
        let span = info_span!("test", name = %name);
        let _entered = span.enter();

        info!("--- Starting Test: {} ---", name);
        let start = Instant::now();

        let page = match self.engine.new_context(&self.env.context) {
            Ok(page) => page,
            Err(e) => {
                error!("Failed to create browser context and page: {}", e);
                let err = HarnessError::from(e);
                let duration_ms = start.elapsed().as_millis();
                return TestOutcome::failed(name, &err, Vec::new(), duration_ms);
            }
        };

        let mut unit = TestUnit::new(name, page, Arc::clone(&self.env));
        let result = panic::catch_unwind(AssertUnwindSafe(|| body(&mut unit)));
        let failed_requests = unit.teardown();
        drop(unit);

        let duration_ms = start.elapsed().as_millis();
        info!("--- Test Completed: {} ---", name);

        match result {
            Ok(Ok(())) => TestOutcome::passed(name, failed_requests, duration_ms),
            Ok(Err(err)) => {
                error!("Test '{}' failed: {}", name, err);
                TestOutcome::failed(name, &err, failed_requests, duration_ms)
            }
            Err(payload) => {
                let reason = panic_message(payload.as_ref());
                error!("Test '{}' panicked: {}", name, reason);
                TestOutcome::aborted(name, reason, failed_requests, duration_ms)
            }
        }
    }

    /// Run `cases` on up to `workers` threads. Outcomes keep `cases` order.
    pub fn run_all(&self, cases: &[TestCase], workers: usize) -> Vec<TestOutcome> {
        if cases.is_empty() {
            return Vec::new();
        }
        let workers = workers.clamp(1, cases.len());
        let counter = AtomicUsize::new(0);
        let next = &counter;

        let finished: Vec<(usize, TestOutcome)> = thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(move |_| {
                    scope.spawn(move || {
                        let mut done = Vec::new();
                        loop {
                            let index = next.fetch_add(1, Ordering::SeqCst);
                            let Some(case) = cases.get(index) else { break };
                            let outcome = self.run_test(&case.name, |unit| (case.body)(unit));
                            done.push((index, outcome));
                        }
                        done
                    })
                })
                .collect();

            handles
                .into_iter()
                .filter_map(|handle| handle.join().ok())
                .flatten()
                .collect()
        });

        let mut slots: Vec<Option<TestOutcome>> = cases.iter().map(|_| None).collect();
        for (index, outcome) in finished {
            slots[index] = Some(outcome);
        }

        slots
            .into_iter()
            .zip(cases)
            .map(|(slot, case)| {
                slot.unwrap_or_else(|| {
                    TestOutcome::aborted(&case.name, "worker thread died".into(), Vec::new(), 0)
                })
            })
            .collect()
    }

    /// Close the shared browser.
    pub fn finish(self) -> Result<(), AutomationError> {
        info!("Closing browser");
        let result = self.engine.close();
        info!("=== Test Suite Completed ===");
        result
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "test panicked".to_string()
    }
}
