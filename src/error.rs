use std::path::PathBuf;

use thiserror::Error;

/// Failures reported by the browser automation layer.
#[derive(Debug, Error)]
pub enum AutomationError {
    /// Navigation did not complete (DNS hiccup, aborted load, HTTP layer error)
    #[error("Navigation to '{url}' failed: {reason}")]
    Navigation { url: String, reason: String },

    /// Element was missing, detached, hidden or otherwise not actionable
    #[error("Element '{selector}' not actionable: {reason}")]
    Element { selector: String, reason: String },

    /// A bounded wait ran out
    #[error("Timed out after {timeout_ms}ms waiting for {waiting_for}")]
    Timeout { waiting_for: String, timeout_ms: u64 },

    /// Driver executed the command but reported a failure
    #[error("Driver command '{command}' failed: {error}")]
    Command { command: String, error: String },

    /// Driver process could not be started
    #[error("Failed to spawn browser driver '{script}' (is Node.js installed?): {source}")]
    Spawn {
        script: String,
        #[source]
        source: std::io::Error,
    },

    /// Pipe to the driver process broke or returned nothing
    #[error("Driver I/O: {0}")]
    DriverIo(String),

    /// Driver returned something that is not valid protocol JSON
    #[error("JSON error ({context}): {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Context was already closed
    #[error("Browsing context is closed")]
    ContextClosed,
}

impl AutomationError {
    /// Whether a retry of the same action has a chance of succeeding.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            AutomationError::Navigation { .. }
                | AutomationError::Element { .. }
                | AutomationError::Timeout { .. }
                | AutomationError::Command { .. }
        )
    }
}

/// Price validation failures. Never retried.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("Items with missing or malformed prices: {}", .0.join(", "))]
    MissingPrices(Vec<String>),

    #[error("No items with a valid price")]
    NoValidPrices,
}

/// Startup configuration failures. Fatal for the whole run.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unable to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid value for '{key}': {reason}")]
    Invalid { key: String, reason: String },

    #[error("Ignore pattern '{pattern}' is not a valid regex: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("No password found for user: {0}")]
    UnknownUser(String),
}

/// Coarse classification used by the retry loop and the reporters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    TransientAutomation,
    Automation,
    Validation,
    Configuration,
    Programming,
}

/// Every failure a test unit can end with.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error(transparent)]
    Automation(#[from] AutomationError),

    /// All retry attempts of an action failed; carries the last cause
    #[error("Failed to execute '{description}' after {attempts} attempt(s): {source}")]
    ActionFailed {
        description: String,
        attempts: u32,
        #[source]
        source: AutomationError,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Configuration(#[from] ConfigError),

    /// A test expectation did not hold
    #[error("Assertion failed: {0}")]
    Assertion(String),

    /// Misuse of the harness API
    #[error("Programming error: {0}")]
    Programming(String),
}

impl HarnessError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            HarnessError::Automation(e) if e.is_transient() => ErrorKind::TransientAutomation,
            HarnessError::Automation(_) | HarnessError::ActionFailed { .. } => {
                ErrorKind::Automation
            }
            HarnessError::Validation(_) => ErrorKind::Validation,
            HarnessError::Configuration(_) => ErrorKind::Configuration,
            HarnessError::Assertion(_) | HarnessError::Programming(_) => ErrorKind::Programming,
        }
    }
}

/// Fail the current test with `message` unless `condition` holds.
pub fn ensure(condition: bool, message: impl Into<String>) -> Result<(), HarnessError> {
    if condition {
        Ok(())
    } else {
        Err(HarnessError::Assertion(message.into()))
    }
}
