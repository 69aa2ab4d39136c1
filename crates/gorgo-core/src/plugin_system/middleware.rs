use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::event::BoxError;

/// Opaque request handler as seen by middleware. The request value belongs to
/// the HTTP layer; the core never inspects it.
pub type HandlerFn = Arc<dyn Fn(&mut dyn Any) -> Result<(), BoxError> + Send + Sync>;

/// A named "wrap a handler" function contributed by a plugin.
///
/// The plugin manager only collects these. Execution belongs to the external
/// HTTP composition layer, typically through [`compose`].
#[derive(Clone)]
pub struct Middleware {
    name: String,
    wrap: Arc<dyn Fn(HandlerFn) -> HandlerFn + Send + Sync>,
}

impl Middleware {
    pub fn new<F>(name: impl Into<String>, wrap: F) -> Self
    where
        F: Fn(HandlerFn) -> HandlerFn + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            wrap: Arc::new(wrap),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wrap `next` with this middleware
    pub fn apply(&self, next: HandlerFn) -> HandlerFn {
        (self.wrap)(next)
    }
}

impl fmt::Debug for Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Middleware")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Wrap `handler` so the first middleware in the slice runs outermost
pub fn compose(middleware: &[Middleware], handler: HandlerFn) -> HandlerFn {
    middleware
        .iter()
        .rev()
        .fold(handler, |next, m| m.apply(next))
}
