use std::collections::HashMap;
use std::fmt;
use std::sync::{PoisonError, RwLock};

use crate::event::error::EventSystemError;
use crate::event::types::SystemEvent;
use crate::event::{Event, EventData, EventHandler};
use crate::kernel::context::Context;

/// Thread-safe publish/subscribe bus.
///
/// Handlers for one event name run sequentially, in subscription order, on
/// the publishing task. The first failing handler aborts the rest of that
/// publish. Subscriptions are never removed.
#[derive(Default)]
pub struct EventBus {
    handlers: RwLock<HashMap<String, Vec<EventHandler>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
        }
    }

    /// Append `handler` to the list for `event_name`.
    /// Subscribing the same handler twice makes it run twice per publish.
    pub fn subscribe(&self, event_name: impl Into<String>, handler: EventHandler) {
        let event_name = event_name.into();
        let mut handlers = self.handlers.write().unwrap_or_else(PoisonError::into_inner);
        let list = handlers.entry(event_name.clone()).or_default();
        list.push(handler);
        log::debug!("Subscribed handler #{} to '{}'", list.len(), event_name);
    }

    /// Publish an event and run every handler subscribed to `event_name`.
    ///
    /// The handler list is snapshotted under the read lock and the lock is
    /// released before any handler runs, so handlers may subscribe or
    /// publish on this bus themselves. Handlers subscribed during this call
    /// do not run for it.
    pub async fn publish(
        &self,
        ctx: &Context,
        event_name: &str,
        data: EventData,
    ) -> Result<(), EventSystemError> {
        let snapshot: Vec<EventHandler> = {
            let handlers = self.handlers.read().unwrap_or_else(PoisonError::into_inner);
            match handlers.get(event_name) {
                Some(list) => list.clone(),
                None => return Ok(()),
            }
        };

        log::debug!("Publishing '{}' to {} handler(s)", event_name, snapshot.len());
        let event = Event::new(event_name, data, ctx.clone());
        for handler in snapshot {
            if let Err(source) = handler.handle(&event).await {
                log::error!("Handler for '{}' failed: {}", event_name, source);
                return Err(EventSystemError::HandlerFailed {
                    event_name: event_name.to_string(),
                    source,
                });
            }
        }
        Ok(())
    }

    /// Publish one of the well-known [`SystemEvent`]s
    pub async fn publish_system(
        &self,
        ctx: &Context,
        event: SystemEvent,
    ) -> Result<(), EventSystemError> {
        let name = event.name();
        self.publish(ctx, name, event.into_data()).await
    }

    /// Number of handlers subscribed to `event_name`
    pub fn subscriber_count(&self, event_name: &str) -> usize {
        let handlers = self.handlers.read().unwrap_or_else(PoisonError::into_inner);
        handlers.get(event_name).map_or(0, Vec::len)
    }

    pub fn has_subscribers(&self, event_name: &str) -> bool {
        self.subscriber_count(event_name) > 0
    }

    /// Names of every event with at least one subscriber, sorted
    pub fn event_names(&self) -> Vec<String> {
        let handlers = self.handlers.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = handlers.keys().cloned().collect();
        names.sort();
        names
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handlers = self.handlers.read().unwrap_or_else(PoisonError::into_inner);
        let handler_count: usize = handlers.values().map(Vec::len).sum();
        f.debug_struct("EventBus")
            .field("event_names", &handlers.len())
            .field("handlers_count", &handler_count)
            .finish()
    }
}
