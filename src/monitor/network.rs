use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::browser::automation::PageAutomation;
use crate::browser::events::{EventSource, PageEvent, event_channel};
use crate::monitor::classifier::ErrorClassifier;

/// A response with an error status, or an uncaught page error (status 0).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedRequest {
    pub url: String,
    pub status: u16,
    pub message: String,
}

impl fmt::Display for FailedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "URL: {}, Status: {}, Error: {}",
            self.url, self.status, self.message
        )
    }
}

/// Watches one browsing context and records failures that are not noise.
///
/// Never aborts, retries or touches the page. The ledger is an ordered,
/// filtered copy of the context's event stream and lives for one test.
pub struct NetworkMonitor {
    classifier: Arc<ErrorClassifier>,
    source: Option<EventSource>,
    ledger: Vec<FailedRequest>,
}

impl NetworkMonitor {
    /// Monitor that is fed by hand through [`NetworkMonitor::observe`].
    pub fn new(classifier: Arc<ErrorClassifier>) -> Self {
        Self {
            classifier,
            source: None,
            ledger: Vec::new(),
        }
    }

    /// Subscribe to `page`'s event stream for the rest of its lifetime.
    pub fn attach(page: &mut dyn PageAutomation, classifier: Arc<ErrorClassifier>) -> Self {
        let (sink, source) = event_channel();
        page.subscribe(sink);
        Self {
            classifier,
            source: Some(source),
            ledger: Vec::new(),
        }
    }

    /// Process every event delivered so far, oldest first.
    pub fn collect(&mut self) {
        let Some(source) = self.source.take() else {
            return;
        };
        for event in source.try_iter() {
            self.observe(&event);
        }
        self.source = Some(source);
    }

    /// Classify a single event and record it if it is a real failure.
    pub fn observe(&mut self, event: &PageEvent) {
        match event {
            PageEvent::Request { method, url } => {
                if self.classifier.is_ignorable(url) {
                    debug!("Ignoring request to: {}", url);
                } else {
                    debug!("Request: {} {}", method, url);
                }
            }

            PageEvent::Response {
                method,
                url,
                status,
            } => {
                if *status < 400 || self.classifier.is_ignorable(url) {
                    return;
                }
                let message = format!("Request failed: {} {}", method, url);
                warn!("Response error: {} - Status: {}", message, status);
                self.ledger.push(FailedRequest {
                    url: url.clone(),
                    status: *status,
                    message,
                });
            }

            PageEvent::Console { kind, text } => {
                if !self.classifier.is_ignorable(text) {
                    debug!("Browser Console [{}]: {}", kind, text);
                }
            }

            PageEvent::PageError { url, message } => {
                if self.classifier.is_ignorable(message) {
                    debug!("Ignoring page error: {}", message);
                    return;
                }
                error!("Page Error: {}", message);
                self.ledger.push(FailedRequest {
                    url: url.clone(),
                    status: 0,
                    message: message.clone(),
                });
            }
        }
    }

    pub fn ledger(&self) -> &[FailedRequest] {
        &self.ledger
    }

    /// Hand the ledger over and start an empty one.
    pub fn take_ledger(&mut self) -> Vec<FailedRequest> {
        std::mem::take(&mut self.ledger)
    }

    /// Log the ledger as the test's diagnostic output and clear it.
    pub fn report_and_clear(&mut self) -> Vec<FailedRequest> {
        let ledger = self.take_ledger();
        if !ledger.is_empty() {
            warn!("Network issues encountered during test:");
            for request in &ledger {
                warn!("  - {}", request);
            }
        }
        ledger
    }
}
