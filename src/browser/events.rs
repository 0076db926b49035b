use std::sync::mpsc::{Receiver, Sender, channel};

use serde::{Deserialize, Serialize};

/// Something the page emitted while a context was open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PageEvent {
    Request {
        method: String,
        url: String,
    },
    Response {
        method: String,
        url: String,
        status: u16,
    },
    Console {
        #[serde(rename = "type")]
        kind: String,
        text: String,
    },
    PageError {
        url: String,
        message: String,
    },
}

/// Sending half handed to a context on subscription.
pub type EventSink = Sender<PageEvent>;

/// Receiving half kept by the subscriber.
pub type EventSource = Receiver<PageEvent>;

/// Create a connected sink/source pair. Delivery preserves send order.
pub fn event_channel() -> (EventSink, EventSource) {
    channel()
}
