#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use storefront_harness::browser::automation::{BrowserEngine, ContextOptions, PageAutomation};
use storefront_harness::browser::events::{EventSink, PageEvent};
use storefront_harness::config::credentials::CredentialStore;
use storefront_harness::config::settings::Credential;
use storefront_harness::error::AutomationError;
use storefront_harness::inventory::validator::ItemSnapshot;
use storefront_harness::lifecycle::env::HarnessEnv;
use storefront_harness::monitor::classifier::ErrorClassifier;
use storefront_harness::retry::executor::RetryPolicy;

pub const BASE_URL: &str = "https://shop.test";

pub const IGNORED_PATTERNS: &[&str] = &[".*401.*", ".*favicon.ico.*", ".*analytics.*"];

// ============================================================================
// Scripted page
// ============================================================================

/// A failure to inject into the next call of an operation.
#[derive(Debug, Clone, Copy)]
pub enum Fault {
    Navigation,
    Element,
    Timeout,
    Closed,
}

impl Fault {
    fn into_error(self, target: &str) -> AutomationError {
        match self {
            Fault::Navigation => AutomationError::Navigation {
                url: target.to_string(),
                reason: "net::ERR_CONNECTION_RESET".to_string(),
            },
            Fault::Element => AutomationError::Element {
                selector: target.to_string(),
                reason: "element is detached".to_string(),
            },
            Fault::Timeout => AutomationError::Timeout {
                waiting_for: target.to_string(),
                timeout_ms: 100,
            },
            Fault::Closed => AutomationError::ContextClosed,
        }
    }
}

#[derive(Default)]
pub struct PageState {
    pub calls: Vec<String>,
    pub faults: HashMap<&'static str, VecDeque<Fault>>,
    pub pending: Vec<PageEvent>,
    pub sink: Option<EventSink>,
    pub url: String,
    pub texts: HashMap<String, String>,
    pub attributes: HashMap<(String, String), String>,
    pub counts: HashMap<String, u32>,
    pub snapshots: HashMap<String, ItemSnapshot>,
    pub redirects: HashMap<String, String>,
    pub click_snapshots: HashMap<String, (String, ItemSnapshot)>,
    pub reload_url: Option<String>,
    pub closed: bool,
    pub close_calls: u32,
}

impl PageState {
    fn deliver(&mut self) {
        if let Some(sink) = &self.sink {
            for event in self.pending.drain(..) {
                let _ = sink.send(event);
            }
        }
    }
}

/// Test-side view of a [`ScriptedPage`], valid after the page is moved away.
#[derive(Clone, Default)]
pub struct PageHandle(Arc<Mutex<PageState>>);

impl PageHandle {
    pub fn state(&self) -> MutexGuard<'_, PageState> {
        self.0.lock().unwrap()
    }

    /// Fail the next calls of `op` with `faults`, in order.
    pub fn fail(&self, op: &'static str, faults: &[Fault]) {
        self.state()
            .faults
            .entry(op)
            .or_default()
            .extend(faults.iter().copied());
    }

    /// Queue an event; it reaches the subscriber on the next call or flush.
    pub fn emit(&self, event: PageEvent) {
        self.state().pending.push(event);
    }

    pub fn set_text(&self, selector: &str, text: &str) {
        self.state()
            .texts
            .insert(selector.to_string(), text.to_string());
    }

    pub fn set_count(&self, selector: &str, count: u32) {
        self.state().counts.insert(selector.to_string(), count);
    }

    pub fn set_attribute(&self, selector: &str, attribute: &str, value: &str) {
        self.state().attributes.insert(
            (selector.to_string(), attribute.to_string()),
            value.to_string(),
        );
    }

    /// Items returned for `item_selector`.
    pub fn set_snapshot(&self, item_selector: &str, snapshot: ItemSnapshot) {
        self.state()
            .snapshots
            .insert(item_selector.to_string(), snapshot);
    }

    /// Clicking `selector` moves the page to `url`.
    pub fn redirect_on_click(&self, selector: &str, url: &str) {
        self.state()
            .redirects
            .insert(selector.to_string(), url.to_string());
    }

    /// Clicking `selector` replaces the items behind `item_selector`.
    pub fn swap_snapshot_on_click(&self, selector: &str, item_selector: &str, snapshot: ItemSnapshot) {
        self.state().click_snapshots.insert(
            selector.to_string(),
            (item_selector.to_string(), snapshot),
        );
    }

    /// Reloading moves the page to `url`.
    pub fn redirect_on_reload(&self, url: &str) {
        self.state().reload_url = Some(url.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    /// Number of calls of `op` that reached the page.
    pub fn count(&self, op: &str) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|c| c.split(' ').next() == Some(op))
            .count()
    }

    pub fn is_closed(&self) -> bool {
        self.state().closed
    }

    pub fn close_calls(&self) -> u32 {
        self.state().close_calls
    }
}

/// In-memory [`PageAutomation`] with scripted faults and recorded calls.
pub struct ScriptedPage {
    handle: PageHandle,
}

impl ScriptedPage {
    pub fn new() -> (Self, PageHandle) {
        let handle = PageHandle::default();
        (
            Self {
                handle: handle.clone(),
            },
            handle,
        )
    }

    fn step(&self, op: &'static str, detail: &str) -> Result<MutexGuard<'_, PageState>, AutomationError> {
        let mut state = self.handle.state();
        if state.closed {
            return Err(AutomationError::ContextClosed);
        }
        state.calls.push(format!("{} {}", op, detail).trim_end().to_string());
        state.deliver();

        let fault = state.faults.get_mut(op).and_then(VecDeque::pop_front);
        match fault {
            Some(fault) => Err(fault.into_error(detail)),
            None => Ok(state),
        }
    }
}

impl PageAutomation for ScriptedPage {
    fn navigate(&mut self, url: &str) -> Result<(), AutomationError> {
        let mut state = self.step("navigate", url)?;
        state.url = url.to_string();
        Ok(())
    }

    fn click(&mut self, selector: &str) -> Result<(), AutomationError> {
        let mut state = self.step("click", selector)?;
        if let Some(url) = state.redirects.get(selector).cloned() {
            state.url = url;
        }
        if let Some((items, snapshot)) = state.click_snapshots.get(selector).cloned() {
            state.snapshots.insert(items, snapshot);
        }
        Ok(())
    }

    fn fill(&mut self, selector: &str, value: &str) -> Result<(), AutomationError> {
        self.step("fill", &format!("{} {}", selector, value)).map(|_| ())
    }

    fn current_url(&mut self) -> Result<String, AutomationError> {
        self.step("current_url", "").map(|s| s.url.clone())
    }

    fn query_text(&mut self, selector: &str) -> Result<Option<String>, AutomationError> {
        self.step("query_text", selector)
            .map(|s| s.texts.get(selector).cloned())
    }

    fn query_attribute(
        &mut self,
        selector: &str,
        attribute: &str,
    ) -> Result<Option<String>, AutomationError> {
        self.step("query_attribute", selector).map(|s| {
            s.attributes
                .get(&(selector.to_string(), attribute.to_string()))
                .cloned()
        })
    }

    fn query_count(&mut self, selector: &str) -> Result<u32, AutomationError> {
        self.step("query_count", selector)
            .map(|s| s.counts.get(selector).copied().unwrap_or(0))
    }

    fn item_snapshot(
        &mut self,
        item_selector: &str,
        _name_selector: &str,
        _price_selector: &str,
    ) -> Result<ItemSnapshot, AutomationError> {
        self.step("item_snapshot", item_selector)
            .map(|s| s.snapshots.get(item_selector).cloned().unwrap_or_default())
    }

    fn reload(&mut self) -> Result<(), AutomationError> {
        let mut state = self.step("reload", "")?;
        if let Some(url) = state.reload_url.clone() {
            state.url = url;
        }
        Ok(())
    }

    fn clear_cookies(&mut self) -> Result<(), AutomationError> {
        self.step("clear_cookies", "").map(|_| ())
    }

    fn wait_for_network_idle(&mut self, _timeout: Duration) -> Result<(), AutomationError> {
        self.step("wait_idle", "").map(|_| ())
    }

    fn subscribe(&mut self, sink: EventSink) {
        let mut state = self.handle.state();
        state.sink = Some(sink);
        state.deliver();
    }

    fn flush_events(&mut self) -> Result<(), AutomationError> {
        let mut state = self.handle.state();
        if state.closed {
            return Err(AutomationError::ContextClosed);
        }
        state.deliver();
        Ok(())
    }

    fn close(&mut self) -> Result<(), AutomationError> {
        let mut state = self.handle.state();
        state.close_calls += 1;
        state.closed = true;
        state.sink = None;
        Ok(())
    }
}

// ============================================================================
// Fake engine
// ============================================================================

type Setup = Box<dyn Fn(&PageHandle) + Send + Sync>;

/// Hands out [`ScriptedPage`]s and keeps a handle to each one.
pub struct FakeEngine {
    pages: Mutex<Vec<PageHandle>>,
    setup: Setup,
    refuse_contexts: bool,
    closed: Mutex<bool>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::with_setup(|_| {})
    }

    /// Run `setup` on every page before it is handed out.
    pub fn with_setup(setup: impl Fn(&PageHandle) + Send + Sync + 'static) -> Self {
        Self {
            pages: Mutex::new(Vec::new()),
            setup: Box::new(setup),
            refuse_contexts: false,
            closed: Mutex::new(false),
        }
    }

    /// An engine whose `new_context` always fails.
    pub fn refusing() -> Self {
        Self {
            refuse_contexts: true,
            ..Self::new()
        }
    }

    pub fn pages(&self) -> Vec<PageHandle> {
        self.pages.lock().unwrap().clone()
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.lock().unwrap()
    }
}

impl BrowserEngine for FakeEngine {
    fn new_context(
        &self,
        _options: &ContextOptions,
    ) -> Result<Box<dyn PageAutomation>, AutomationError> {
        if self.refuse_contexts {
            return Err(AutomationError::DriverIo("browser is gone".to_string()));
        }
        let (page, handle) = ScriptedPage::new();
        (self.setup)(&handle);
        self.pages.lock().unwrap().push(handle);
        Ok(Box::new(page))
    }

    fn close(&self) -> Result<(), AutomationError> {
        *self.closed.lock().unwrap() = true;
        Ok(())
    }
}

// ============================================================================
// Environment
// ============================================================================

pub fn fast_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        delay: Duration::from_millis(1),
        idle_timeout: Duration::from_millis(100),
    }
}

pub fn classifier() -> ErrorClassifier {
    ErrorClassifier::new(IGNORED_PATTERNS).unwrap()
}

pub fn test_env() -> HarnessEnv {
    let valid = Credential {
        username: "standard_user".to_string(),
        password: "secret_sauce".to_string(),
    };
    let invalid = Credential {
        username: "invalid_user".to_string(),
        password: "invalid_password".to_string(),
    };

    HarnessEnv {
        base_url: BASE_URL.to_string(),
        credentials: CredentialStore::default().with_user(&valid),
        valid,
        invalid,
        retry: fast_policy(3),
        context: ContextOptions::default(),
        classifier: Arc::new(classifier()),
    }
}

pub fn response(method: &str, url: &str, status: u16) -> PageEvent {
    PageEvent::Response {
        method: method.to_string(),
        url: url.to_string(),
        status,
    }
}
