use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tokio::sync::Notify;

#[derive(Default)]
struct CancelState {
    cancelled: AtomicBool,
    notify: Notify,
}

/// Cancellation-scoped value passed to lifecycle calls, hooks and event handlers.
///
/// The core never cancels anything itself: a `Context` only carries the
/// caller's intent (explicit cancellation or a deadline) and a few
/// request-scoped values. Plugins and handlers decide how to honour it.
/// Clones share the same cancellation state.
#[derive(Clone, Default)]
pub struct Context {
    cancel: Arc<CancelState>,
    deadline: Option<Instant>,
    values: Arc<HashMap<String, Arc<dyn Any + Send + Sync>>>,
}

impl Context {
    /// A context that is never cancelled and has no deadline
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a context whose deadline is `timeout` from now.
    /// An earlier existing deadline is kept. A timeout too large to
    /// represent adds no deadline.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self.clone(),
        }
    }

    /// Derive a context with the given deadline. An earlier existing deadline is kept.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(current) if current < deadline => current,
            _ => deadline,
        };
        Self {
            cancel: self.cancel.clone(),
            deadline: Some(deadline),
            values: self.values.clone(),
        }
    }

    /// Derive a context carrying an additional request-scoped value
    pub fn with_value<T: Any + Send + Sync>(&self, key: &str, value: T) -> Self {
        let mut values = (*self.values).clone();
        values.insert(key.to_string(), Arc::new(value));
        Self {
            cancel: self.cancel.clone(),
            deadline: self.deadline,
            values: Arc::new(values),
        }
    }

    /// Get a request-scoped value, if present and of type `T`
    pub fn value<T: Any + Send + Sync>(&self, key: &str) -> Option<&T> {
        self.values.get(key).and_then(|v| v.downcast_ref::<T>())
    }

    /// The deadline, if any
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Cancel this context and every clone of it
    pub fn cancel(&self) {
        self.cancel.cancelled.store(true, Ordering::SeqCst);
        self.cancel.notify.notify_waiters();
    }

    /// True once cancelled explicitly or once the deadline has passed
    pub fn is_cancelled(&self) -> bool {
        self.cancel.cancelled.load(Ordering::SeqCst)
            || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Resolves when the context is cancelled or its deadline passes.
    pub async fn cancelled(&self) {
        loop {
            // Register interest before checking the flag so a concurrent
            // cancel() cannot slip between the check and the wait.
            let notified = self.cancel.notify.notified();
            if self.is_cancelled() {
                return;
            }
            match self.deadline {
                Some(deadline) => {
                    let deadline = tokio::time::Instant::from_std(deadline);
                    if tokio::time::timeout_at(deadline, notified).await.is_err() {
                        return;
                    }
                }
                None => notified.await,
            }
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("cancelled", &self.cancel.cancelled.load(Ordering::SeqCst))
            .field("deadline", &self.deadline)
            .field("values", &self.values.len())
            .finish()
    }
}
