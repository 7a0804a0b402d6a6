//! The event handler registry.
//!
//! Handlers are bound to an event name and called with the event argument, in the order
//! events are received. They run inside the session loop, so a slow handler delays the
//! dispatch of the following events.
//!
//! Handlers can be registered at any time, including from another handler while the
//! session is running.
//!
//! #### Example :
//! ```rust
//! # use engineio_client::handler::Handlers;
//! # use serde_json::Value;
//! let handlers = Handlers::new();
//! handlers.on("chat", |data: Value| {
//!     println!("received chat message: {data}");
//! });
//! assert!(handlers.contains("chat"));
//! ```
use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, PoisonError, RwLock},
};

use serde_json::Value;

/// A handler bound to an event name.
///
/// It is implemented for any `Fn(Value)` closure.
pub trait EventHandler: Send + Sync + 'static {
    /// Call the handler with the event argument.
    fn call(&self, data: Value);
}

impl<F> EventHandler for F
where
    F: Fn(Value) + Send + Sync + 'static,
{
    #[inline]
    fn call(&self, data: Value) {
        self(data)
    }
}

pub(crate) type BoxedEventHandler = Arc<dyn EventHandler>;

/// A shared map of event names to handlers.
///
/// Cloning it is cheap and every clone refers to the same registry.
#[derive(Clone, Default)]
pub struct Handlers {
    inner: Arc<RwLock<HashMap<String, BoxedEventHandler>>>,
}

impl Handlers {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a handler to an event name. It replaces any handler previously bound to it.
    pub fn on(&self, event: impl Into<String>, handler: impl EventHandler) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(event.into(), Arc::new(handler));
    }

    /// Check if a handler is bound to this event name.
    pub fn contains(&self, event: &str) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(event)
    }

    /// Get the handler bound to an event name.
    ///
    /// The lock is released before the handler is returned so that handlers can register new handlers.
    pub(crate) fn get(&self, event: &str) -> Option<BoxedEventHandler> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(event)
            .cloned()
    }

    /// Call the handler bound to the event name. Returns false if there is none.
    pub(crate) fn dispatch(&self, event: &str, data: Value) -> bool {
        match self.get(event) {
            Some(handler) => {
                handler.call(data);
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for Handlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_set().entries(inner.keys()).finish()
    }
}
