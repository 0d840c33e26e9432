//! In-process, typed event bus.
//!
//! [`EventBus`] is a subscription registry keyed by event type. Listeners are
//! registered once at start-up with [`EventBus::listen`] and invoked
//! synchronously, in registration order, by [`EventBus::publish`]. The bus is
//! then shared via `Arc<EventBus>` across the application.

use std::any::{Any, TypeId};
use std::collections::HashMap;

/// Error type returned by listeners.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A domain event that can be published on the bus.
pub trait Event: Send + Sync + 'static {
    /// Dot-separated event name, e.g. `"user.created"`.
    const NAME: &'static str;
}

type Listener<E> = Box<dyn Fn(&E) -> Result<(), BoxError> + Send + Sync>;

/// A listener failed while handling a published event.
#[derive(Debug, thiserror::Error)]
#[error("Listener for {event} failed: {source}")]
pub struct ListenerError {
    /// Name of the event being dispatched.
    pub event: &'static str,
    /// Position of the failing listener in registration order.
    pub index: usize,
    #[source]
    pub source: BoxError,
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Typed publish/subscribe hub.
///
/// # Usage
///
/// ```rust
/// use roster_events::bus::{Event, EventBus};
///
/// struct Pinged;
/// impl Event for Pinged {
///     const NAME: &'static str = "pinged";
/// }
///
/// let mut bus = EventBus::new();
/// bus.listen(|_: &Pinged| Ok(()));
/// assert_eq!(bus.publish(&Pinged).unwrap(), 1);
/// ```
#[derive(Default)]
pub struct EventBus {
    listeners: HashMap<TypeId, Vec<Box<dyn Any + Send + Sync>>>,
}

impl EventBus {
    /// Create a bus with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for events of type `E`.
    pub fn listen<E, F>(&mut self, listener: F)
    where
        E: Event,
        F: Fn(&E) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        let boxed: Listener<E> = Box::new(listener);
        self.listeners
            .entry(TypeId::of::<E>())
            .or_default()
            .push(Box::new(boxed));
        tracing::debug!(event = E::NAME, "Listener registered");
    }

    /// Invoke every listener registered for `E`, in registration order.
    ///
    /// Returns the number of listeners invoked. The first listener error
    /// stops dispatch and is returned; later listeners do not run. Publishing
    /// an event nobody listens to is not an error.
    pub fn publish<E: Event>(&self, event: &E) -> Result<usize, ListenerError> {
        let Some(listeners) = self.listeners.get(&TypeId::of::<E>()) else {
            tracing::debug!(event = E::NAME, "No listeners for event");
            return Ok(0);
        };

        let mut invoked = 0;
        for (index, entry) in listeners.iter().enumerate() {
            let Some(listener) = entry.downcast_ref::<Listener<E>>() else {
                continue;
            };
            listener(event).map_err(|source| ListenerError {
                event: E::NAME,
                index,
                source,
            })?;
            invoked += 1;
        }

        tracing::debug!(event = E::NAME, invoked, "Event dispatched");
        Ok(invoked)
    }

    /// Number of listeners registered for `E`.
    pub fn listener_count<E: Event>(&self) -> usize {
        self.listeners
            .get(&TypeId::of::<E>())
            .map_or(0, Vec::len)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
