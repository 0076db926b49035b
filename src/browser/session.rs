use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::browser::automation::{BrowserEngine, ContextOptions, PageAutomation};
use crate::browser::events::{EventSink, PageEvent};
use crate::error::AutomationError;
use crate::inventory::validator::{ItemSnapshot, SnapshotItem};

// ============================================================================
// Wire protocol (NDJSON over the driver's stdin/stdout)
// ============================================================================

/// Request sent to the driver (one JSON line).
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum DriverRequest {
    Navigate {
        url: String,
    },
    Click {
        selector: String,
    },
    Fill {
        selector: String,
        value: String,
    },
    CurrentUrl,
    QueryText {
        selector: String,
    },
    QueryAttribute {
        selector: String,
        attribute: String,
    },
    QueryCount {
        selector: String,
    },
    Items {
        item_selector: String,
        name_selector: String,
        price_selector: String,
    },
    Reload,
    ClearCookies,
    WaitIdle {
        timeout_ms: u64,
    },
    Events,
    Quit,
}

impl DriverRequest {
    /// Command name as the driver knows it.
    pub fn name(&self) -> &'static str {
        match self {
            DriverRequest::Navigate { .. } => "navigate",
            DriverRequest::Click { .. } => "click",
            DriverRequest::Fill { .. } => "fill",
            DriverRequest::CurrentUrl => "current_url",
            DriverRequest::QueryText { .. } => "query_text",
            DriverRequest::QueryAttribute { .. } => "query_attribute",
            DriverRequest::QueryCount { .. } => "query_count",
            DriverRequest::Items { .. } => "items",
            DriverRequest::Reload => "reload",
            DriverRequest::ClearCookies => "clear_cookies",
            DriverRequest::WaitIdle { .. } => "wait_idle",
            DriverRequest::Events => "events",
            DriverRequest::Quit => "quit",
        }
    }
}

/// Failure category reported by the driver alongside `ok: false`.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Navigation,
    Element,
    Timeout,
    Other,
}

/// Response received from the driver (one JSON line).
#[derive(Debug, Default, Deserialize)]
pub struct DriverResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub kind: Option<FailureKind>,
    #[serde(default)]
    pub ready: Option<bool>,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub count: Option<u32>,
    #[serde(default)]
    pub items: Option<Vec<SnapshotItem>>,
    /// Events emitted since the previous response, oldest first
    #[serde(default)]
    pub events: Vec<PageEvent>,
}

impl DriverResponse {
    /// Turn an `ok: false` response into the matching automation error.
    pub fn into_failure(self, request: &DriverRequest) -> AutomationError {
        let reason = self.error.unwrap_or_else(|| "Unknown error".into());
        match (self.kind, request) {
            (Some(FailureKind::Navigation), DriverRequest::Navigate { url }) => {
                AutomationError::Navigation {
                    url: url.clone(),
                    reason,
                }
            }
            (Some(FailureKind::Navigation), DriverRequest::Reload) => {
                AutomationError::Navigation {
                    url: "(reload)".into(),
                    reason,
                }
            }
            (
                Some(FailureKind::Element),
                DriverRequest::Click { selector }
                | DriverRequest::Fill { selector, .. }
                | DriverRequest::QueryText { selector }
                | DriverRequest::QueryAttribute { selector, .. }
                | DriverRequest::QueryCount { selector },
            ) => AutomationError::Element {
                selector: selector.clone(),
                reason,
            },
            (Some(FailureKind::Timeout), DriverRequest::WaitIdle { timeout_ms }) => {
                AutomationError::Timeout {
                    waiting_for: "network idle".into(),
                    timeout_ms: *timeout_ms,
                }
            }
            (Some(FailureKind::Timeout), other) => AutomationError::Timeout {
                waiting_for: other.name().into(),
                timeout_ms: 0,
            },
            _ => AutomationError::Command {
                command: request.name().into(),
                error: reason,
            },
        }
    }
}

// ============================================================================
// Driver launch settings
// ============================================================================

/// How to start the Node.js driver.
#[derive(Debug, Clone, PartialEq)]
pub struct DriverSettings {
    pub node: String,
    pub script: String,
    pub headless: bool,
    pub slow_mo_ms: u64,
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self {
            node: "node".into(),
            script: "node/browser_driver.js".into(),
            headless: true,
            slow_mo_ms: 0,
        }
    }
}

/// A spawned driver process with line-oriented pipes.
struct DriverProcess {
    child: Child,
    stdin: ChildStdin,
    reader: BufReader<ChildStdout>,
    script: String,
}

impl DriverProcess {
    fn spawn(settings: &DriverSettings, args: &[String]) -> Result<Self, AutomationError> {
        let mut child = Command::new(&settings.node)
            .arg(&settings.script)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| AutomationError::Spawn {
                script: settings.script.clone(),
                source: e,
            })?;

        let stdin = child.stdin.take().ok_or_else(|| {
            AutomationError::DriverIo(format!("Failed to capture stdin of {}", settings.script))
        })?;
        let stdout = child.stdout.take().ok_or_else(|| {
            AutomationError::DriverIo(format!("Failed to capture stdout of {}", settings.script))
        })?;

        Ok(Self {
            child,
            stdin,
            reader: BufReader::new(stdout),
            script: settings.script.clone(),
        })
    }

    fn read_response(&mut self, context: &str) -> Result<DriverResponse, AutomationError> {
        let mut line = String::new();
        self.reader.read_line(&mut line).map_err(|e| {
            AutomationError::DriverIo(format!("Failed to read from {}: {}", self.script, e))
        })?;

        if line.trim().is_empty() {
            return Err(AutomationError::DriverIo(format!(
                "Empty response from {} (process may have died)",
                self.script
            )));
        }

        serde_json::from_str(line.trim()).map_err(|e| AutomationError::Json {
            context: context.to_string(),
            source: e,
        })
    }

    fn send(&mut self, request: &DriverRequest) -> Result<DriverResponse, AutomationError> {
        let json = serde_json::to_string(request).map_err(|e| AutomationError::Json {
            context: "DriverRequest".into(),
            source: e,
        })?;

        writeln!(self.stdin, "{}", json).map_err(|e| {
            AutomationError::DriverIo(format!("Failed to write to {}: {}", self.script, e))
        })?;
        self.stdin.flush().map_err(|e| {
            AutomationError::DriverIo(format!("Failed to flush {}: {}", self.script, e))
        })?;

        self.read_response("driver response")
    }

    fn shutdown(&mut self) {
        // Best-effort: the process may already be gone
        let _ = self.send(&DriverRequest::Quit);
        let _ = self.child.wait();
    }
}

// ============================================================================
// Engine: one Chromium for the whole suite
// ============================================================================

/// Chromium launched once by a `--serve` driver process.
///
/// Contexts connect to it through its websocket endpoint, each from its own
/// driver process, so workers never share a pipe.
pub struct NodeBrowserEngine {
    settings: DriverSettings,
    endpoint: String,
    server: Mutex<Option<DriverProcess>>,
}

impl NodeBrowserEngine {
    pub fn launch(settings: DriverSettings) -> Result<Self, AutomationError> {
        info!("Launching Chromium browser...");

        let mut args = vec!["--serve".to_string()];
        if !settings.headless {
            args.push("--headed".into());
        }
        if settings.slow_mo_ms > 0 {
            args.push(format!("--slow-mo={}", settings.slow_mo_ms));
        }

        let mut server = DriverProcess::spawn(&settings, &args)?;
        let ready = server.read_response("driver ready signal")?;

        let endpoint = match (ready.ok, ready.ready, ready.endpoint) {
            (true, Some(true), Some(endpoint)) => endpoint,
            _ => {
                server.shutdown();
                return Err(AutomationError::Command {
                    command: "launch".into(),
                    error: "Did not receive ready signal with endpoint from driver".into(),
                });
            }
        };

        info!("Browser launched successfully");
        debug!("Browser endpoint: {}", endpoint);

        Ok(Self {
            settings,
            endpoint,
            server: Mutex::new(Some(server)),
        })
    }
}

impl BrowserEngine for NodeBrowserEngine {
    fn new_context(
        &self,
        options: &ContextOptions,
    ) -> Result<Box<dyn PageAutomation>, AutomationError> {
        let mut args = vec![
            "--context".to_string(),
            self.endpoint.clone(),
            format!("--timeout={}", options.default_timeout.as_millis()),
        ];
        if options.ignore_https_errors {
            args.push("--ignore-https-errors".into());
        }

        let mut process = DriverProcess::spawn(&self.settings, &args)?;
        let ready = process.read_response("context ready signal")?;
        if !ready.ok || ready.ready != Some(true) {
            process.shutdown();
            return Err(AutomationError::Command {
                command: "new_context".into(),
                error: ready
                    .error
                    .unwrap_or_else(|| "Context driver did not become ready".into()),
            });
        }

        Ok(Box::new(NodeContext {
            process: Some(process),
            sink: None,
        }))
    }

    fn close(&self) -> Result<(), AutomationError> {
        let taken = match self.server.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(mut server) = taken {
            info!("Closing browser");
            server.shutdown();
        }
        Ok(())
    }
}

impl Drop for NodeBrowserEngine {
    fn drop(&mut self) {
        let _ = BrowserEngine::close(self);
    }
}

// ============================================================================
// Context: one driver process per test
// ============================================================================

/// A browsing context owned by a dedicated driver process.
pub struct NodeContext {
    process: Option<DriverProcess>,
    sink: Option<EventSink>,
}

impl NodeContext {
    fn process(&mut self) -> Result<&mut DriverProcess, AutomationError> {
        self.process.as_mut().ok_or(AutomationError::ContextClosed)
    }

    fn forward(&mut self, events: Vec<PageEvent>) {
        let Some(sink) = self.sink.as_ref() else { return };
        let delivered = events.into_iter().all(|event| sink.send(event).is_ok());
        if !delivered {
            warn!("Event subscriber went away; dropping further events");
            self.sink = None;
        }
    }

    /// Send a request, forward piggybacked events, and check `ok`.
    fn call(&mut self, request: DriverRequest) -> Result<DriverResponse, AutomationError> {
        let mut response = self.process()?.send(&request)?;
        let events = std::mem::take(&mut response.events);
        self.forward(events);

        if response.ok {
            Ok(response)
        } else {
            Err(response.into_failure(&request))
        }
    }
}

impl PageAutomation for NodeContext {
    fn navigate(&mut self, url: &str) -> Result<(), AutomationError> {
        self.call(DriverRequest::Navigate { url: url.into() })?;
        Ok(())
    }

    fn click(&mut self, selector: &str) -> Result<(), AutomationError> {
        self.call(DriverRequest::Click {
            selector: selector.into(),
        })?;
        Ok(())
    }

    fn fill(&mut self, selector: &str, value: &str) -> Result<(), AutomationError> {
        self.call(DriverRequest::Fill {
            selector: selector.into(),
            value: value.into(),
        })?;
        Ok(())
    }

    fn current_url(&mut self) -> Result<String, AutomationError> {
        let response = self.call(DriverRequest::CurrentUrl)?;
        response.url.ok_or_else(|| AutomationError::Command {
            command: "current_url".into(),
            error: "No URL in current_url response".into(),
        })
    }

    fn query_text(&mut self, selector: &str) -> Result<Option<String>, AutomationError> {
        let response = self.call(DriverRequest::QueryText {
            selector: selector.into(),
        })?;
        Ok(response.text)
    }

    fn query_attribute(
        &mut self,
        selector: &str,
        attribute: &str,
    ) -> Result<Option<String>, AutomationError> {
        let response = self.call(DriverRequest::QueryAttribute {
            selector: selector.into(),
            attribute: attribute.into(),
        })?;
        Ok(response.text)
    }

    fn query_count(&mut self, selector: &str) -> Result<u32, AutomationError> {
        let response = self.call(DriverRequest::QueryCount {
            selector: selector.into(),
        })?;
        Ok(response.count.unwrap_or(0))
    }

    fn item_snapshot(
        &mut self,
        item_selector: &str,
        name_selector: &str,
        price_selector: &str,
    ) -> Result<ItemSnapshot, AutomationError> {
        let response = self.call(DriverRequest::Items {
            item_selector: item_selector.into(),
            name_selector: name_selector.into(),
            price_selector: price_selector.into(),
        })?;
        Ok(ItemSnapshot::new(response.items.unwrap_or_default()))
    }

    fn reload(&mut self) -> Result<(), AutomationError> {
        self.call(DriverRequest::Reload)?;
        Ok(())
    }

    fn clear_cookies(&mut self) -> Result<(), AutomationError> {
        self.call(DriverRequest::ClearCookies)?;
        Ok(())
    }

    fn wait_for_network_idle(&mut self, timeout: Duration) -> Result<(), AutomationError> {
        self.call(DriverRequest::WaitIdle {
            timeout_ms: timeout.as_millis() as u64,
        })?;
        Ok(())
    }

    fn subscribe(&mut self, sink: EventSink) {
        self.sink = Some(sink);
    }

    fn flush_events(&mut self) -> Result<(), AutomationError> {
        self.call(DriverRequest::Events)?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), AutomationError> {
        if let Some(mut process) = self.process.take() {
            process.shutdown();
        }
        self.sink = None;
        Ok(())
    }
}

impl Drop for NodeContext {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
