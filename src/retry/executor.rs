use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{error, info, trace, warn};

use crate::browser::automation::PageAutomation;
use crate::error::{AutomationError, HarnessError};

/// How often and how patiently to retry a flaky action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,

    /// Fixed pause between attempts
    pub delay: Duration,

    /// Bound on the post-action network-idle wait
    pub idle_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_millis(1000),
            idle_timeout: Duration::from_millis(30_000),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RetryState {
    Idle,
    Attempting,
    Retrying,
    Succeeded,
    Exhausted,
}

/// Terminal result of a successful `run`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryOutcome {
    pub attempts: u32,
    pub state: RetryState,
}

/// Runs page actions with bounded, fixed-delay retry.
///
/// Only transient automation errors are retried. Every other failure
/// (validation, assertion, broken driver) is returned on the spot.
#[derive(Debug, Clone, Copy, Default)]
pub struct RetryExecutor {
    policy: RetryPolicy,
}

impl RetryExecutor {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// Run `action`, then wait for the network to settle. A failure of
    /// either counts as one failed attempt.
    pub fn run<P, F>(
        &self,
        page: &mut P,
        description: &str,
        mut action: F,
    ) -> Result<RetryOutcome, HarnessError>
    where
        P: PageAutomation + ?Sized,
        F: FnMut(&mut P) -> Result<(), HarnessError>,
    {
        let max_attempts = self.policy.max_attempts;
        if max_attempts == 0 {
            return Err(HarnessError::Programming(format!(
                "retry of '{}' requested with zero attempts",
                description
            )));
        }

        let mut state = RetryState::Idle;
        let mut attempts = 0;
        let mut last_error: Option<AutomationError> = None;

        loop {
            trace!("'{}' -> {:?}", description, state);
            state = match state {
                RetryState::Idle => RetryState::Attempting,

                RetryState::Attempting => {
                    let result = action(page).and_then(|()| {
                        page.wait_for_network_idle(self.policy.idle_timeout)
                            .map_err(HarnessError::from)
                    });
                    attempts += 1;

                    match result {
                        Ok(()) => RetryState::Succeeded,
                        Err(HarnessError::Automation(cause)) if cause.is_transient() => {
                            let next = if attempts >= max_attempts {
                                RetryState::Exhausted
                            } else {
                                warn!(
                                    "Attempt {} failed for '{}', retrying...: {}",
                                    attempts, description, cause
                                );
                                RetryState::Retrying
                            };
                            last_error = Some(cause);
                            next
                        }
                        Err(other) => return Err(other),
                    }
                }

                RetryState::Retrying => {
                    thread::sleep(self.policy.delay);
                    RetryState::Attempting
                }

                RetryState::Succeeded => {
                    return Ok(RetryOutcome { attempts, state });
                }

                RetryState::Exhausted => {
                    let Some(source) = last_error.take() else {
                        return Err(HarnessError::Programming(format!(
                            "'{}' exhausted without a recorded failure",
                            description
                        )));
                    };
                    error!(
                        "Failed to execute '{}' after {} attempts: {}",
                        description, attempts, source
                    );
                    return Err(HarnessError::ActionFailed {
                        description: description.to_string(),
                        attempts,
                        source,
                    });
                }
            };
        }
    }

    pub fn navigate<P>(&self, page: &mut P, url: &str) -> Result<RetryOutcome, HarnessError>
    where
        P: PageAutomation + ?Sized,
    {
        self.run(page, &format!("Navigate to {}", url), |p| {
            info!("Navigating to: {}", url);
            p.navigate(url).map_err(HarnessError::from)
        })
    }

    pub fn click<P>(
        &self,
        page: &mut P,
        selector: &str,
        description: &str,
    ) -> Result<RetryOutcome, HarnessError>
    where
        P: PageAutomation + ?Sized,
    {
        self.run(page, &format!("Click {}", description), |p| {
            info!("Action: Clicking {}", description);
            p.click(selector).map_err(HarnessError::from)
        })
    }

    pub fn fill<P>(
        &self,
        page: &mut P,
        selector: &str,
        value: &str,
        description: &str,
    ) -> Result<RetryOutcome, HarnessError>
    where
        P: PageAutomation + ?Sized,
    {
        self.run(page, &format!("Fill {}", description), |p| {
            info!("Action: Filling {}", description);
            p.fill(selector, value).map_err(HarnessError::from)
        })
    }
}
