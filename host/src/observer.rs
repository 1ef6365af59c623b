// ═══════════════════════════════════════════════════════════════════════
// Observers — where a game's events go after each applied action
//
// Every observer watches as one viewer. Events are redacted for that
// viewer on delivery; the canonical events never leave the game lock.
// ═══════════════════════════════════════════════════════════════════════

use conquest_engine::visibility::redact_event;
use conquest_engine::Event;
use std::sync::mpsc::{Sender, SyncSender};

pub type ObserverId = u64;

/// The receiving end has gone away. The observer is pruned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkClosed;

/// Destination for one observer's events. Must not block.
pub trait EventSink: Send {
    fn deliver(&self, event: Event) -> Result<(), SinkClosed>;
}

impl EventSink for Sender<Event> {
    fn deliver(&self, event: Event) -> Result<(), SinkClosed> {
        self.send(event).map_err(|_| SinkClosed)
    }
}

/// Bounded channels drop the observer when full rather than wait.
impl EventSink for SyncSender<Event> {
    fn deliver(&self, event: Event) -> Result<(), SinkClosed> {
        self.try_send(event).map_err(|_| SinkClosed)
    }
}

pub(crate) struct Observer {
    pub id: ObserverId,
    pub viewer: String,
    sink: Box<dyn EventSink>,
}

impl Observer {
    pub fn new(id: ObserverId, viewer: &str, sink: Box<dyn EventSink>) -> Self {
        Observer { id, viewer: viewer.to_string(), sink }
    }

    /// Deliver events in order, stopping at the first failure.
    pub fn deliver_all(&self, events: &[Event]) -> Result<(), SinkClosed> {
        events
            .iter()
            .try_for_each(|event| self.sink.deliver(redact_event(event, &self.viewer)))
    }
}
