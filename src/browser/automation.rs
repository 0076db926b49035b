use std::sync::Arc;
use std::time::Duration;

use crate::browser::events::EventSink;
use crate::error::AutomationError;
use crate::inventory::validator::ItemSnapshot;

/// Options applied to every new browsing context.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextOptions {
    /// Default timeout for navigation, actions and waits
    pub default_timeout: Duration,

    /// Accept self-signed certificates
    pub ignore_https_errors: bool,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            default_timeout: Duration::from_millis(30_000),
            ignore_https_errors: true,
        }
    }
}

/// One isolated browsing context with a single page.
///
/// Owned by exactly one test at a time. Cookies, storage and open handles
/// never outlive [`PageAutomation::close`].
pub trait PageAutomation: Send {
    fn navigate(&mut self, url: &str) -> Result<(), AutomationError>;

    fn click(&mut self, selector: &str) -> Result<(), AutomationError>;

    fn fill(&mut self, selector: &str, value: &str) -> Result<(), AutomationError>;

    fn current_url(&mut self) -> Result<String, AutomationError>;

    /// Text content of the first match, `None` when nothing matches.
    fn query_text(&mut self, selector: &str) -> Result<Option<String>, AutomationError>;

    fn query_attribute(
        &mut self,
        selector: &str,
        attribute: &str,
    ) -> Result<Option<String>, AutomationError>;

    fn query_count(&mut self, selector: &str) -> Result<u32, AutomationError>;

    /// Name and raw price text of every element matching `item_selector`.
    fn item_snapshot(
        &mut self,
        item_selector: &str,
        name_selector: &str,
        price_selector: &str,
    ) -> Result<ItemSnapshot, AutomationError>;

    fn reload(&mut self) -> Result<(), AutomationError>;

    fn clear_cookies(&mut self) -> Result<(), AutomationError>;

    /// Block until no requests are in flight, or fail after `timeout`.
    fn wait_for_network_idle(&mut self, timeout: Duration) -> Result<(), AutomationError>;

    /// Deliver every request/response/console/page-error event to `sink`,
    /// in emission order, from now until the context closes.
    fn subscribe(&mut self, sink: EventSink);

    /// Push any events the driver still buffers to the subscriber.
    fn flush_events(&mut self) -> Result<(), AutomationError>;

    fn close(&mut self) -> Result<(), AutomationError>;
}

/// Process-wide browser handle. Shared read-only by all workers.
pub trait BrowserEngine: Send + Sync {
    fn new_context(
        &self,
        options: &ContextOptions,
    ) -> Result<Box<dyn PageAutomation>, AutomationError>;

    fn close(&self) -> Result<(), AutomationError>;
}

pub type SharedEngine = Arc<dyn BrowserEngine>;
