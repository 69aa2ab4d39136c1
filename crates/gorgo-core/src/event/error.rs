//! # Gorgo Core Event System Errors
//!
//! Defines [`EventSystemError`], returned by
//! [`EventBus::publish`](crate::event::EventBus::publish) when a handler fails.
use thiserror::Error;

use crate::event::BoxError;

#[derive(Debug, Error)]
pub enum EventSystemError {
    /// A handler returned an error; remaining handlers were skipped.
    #[error("event handler failed for '{event_name}': {source}")]
    HandlerFailed {
        event_name: String,
        #[source]
        source: BoxError,
    },
}

impl EventSystemError {
    /// Name of the event whose publication failed
    pub fn event_name(&self) -> &str {
        match self {
            EventSystemError::HandlerFailed { event_name, .. } => event_name,
        }
    }
}
