//! # Gorgo Core Event System
//!
//! In-process, synchronous publish/subscribe keyed by hierarchical event
//! names such as `plugin.started` or `request.completed`.
//!
//! - [`Event`]: a name, a string-keyed data map and the publisher's [`Context`].
//! - [`AsyncEventHandler`]: the handler contract. [`sync_event_handler`] and
//!   [`event_handler`] adapt plain closures.
//! - [`EventBus`](dispatcher::EventBus): ordered, fail-fast dispatch.
//! - [`SystemEvent`](types::SystemEvent): the well-known framework events.
pub mod dispatcher;
pub mod error;
pub mod types;

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;

use crate::kernel::context::Context;

/// Event payload: string keys to loosely typed values
pub type EventData = HashMap<String, serde_json::Value>;

/// Error a handler may return
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result returned by event handlers
pub type HandlerResult = Result<(), BoxError>;

/// Owned future returned by closure-based handlers
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A published event. Created fresh for every publish and dropped once
/// every handler has returned.
#[derive(Clone)]
pub struct Event {
    name: String,
    data: EventData,
    context: Context,
}

impl Event {
    pub fn new(name: impl Into<String>, data: EventData, context: Context) -> Self {
        Self {
            name: name.into(),
            data,
            context,
        }
    }

    /// Get the name of this event
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The event payload
    pub fn data(&self) -> &EventData {
        &self.data
    }

    /// Get a single payload value
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }

    /// Get a payload value as a string slice, if it is a JSON string
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(|v| v.as_str())
    }

    /// The context supplied by the publisher
    pub fn context(&self) -> &Context {
        &self.context
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("name", &self.name)
            .field("data", &self.data)
            .finish_non_exhaustive()
    }
}

/// Asynchronous event handler trait
#[async_trait]
pub trait AsyncEventHandler: Send + Sync {
    async fn handle(&self, event: &Event) -> HandlerResult;
}

/// Shared handler as stored by the bus
pub type EventHandler = Arc<dyn AsyncEventHandler>;

/// Handler backed by a synchronous closure
struct SyncHandler<F> {
    handler: F,
}

#[async_trait]
impl<F> AsyncEventHandler for SyncHandler<F>
where
    F: Fn(&Event) -> HandlerResult + Send + Sync,
{
    async fn handle(&self, event: &Event) -> HandlerResult {
        (self.handler)(event)
    }
}

/// Handler backed by a closure returning a boxed future
struct FutureHandler<F> {
    handler: F,
}

#[async_trait]
impl<F> AsyncEventHandler for FutureHandler<F>
where
    F: for<'a> Fn(&'a Event) -> BoxFuture<'a, HandlerResult> + Send + Sync,
{
    async fn handle(&self, event: &Event) -> HandlerResult {
        (self.handler)(event).await
    }
}

/// Wrap a synchronous closure as an [`EventHandler`]
pub fn sync_event_handler<F>(f: F) -> EventHandler
where
    F: Fn(&Event) -> HandlerResult + Send + Sync + 'static,
{
    Arc::new(SyncHandler { handler: f })
}

/// Wrap a closure returning a boxed future as an [`EventHandler`]
pub fn event_handler<F>(f: F) -> EventHandler
where
    F: for<'a> Fn(&'a Event) -> BoxFuture<'a, HandlerResult> + Send + Sync + 'static,
{
    Arc::new(FutureHandler { handler: f })
}

/// Re-export important types
pub use dispatcher::EventBus;
pub use error::EventSystemError;
pub use types::SystemEvent;

// Test module declaration
#[cfg(test)]
mod tests;
