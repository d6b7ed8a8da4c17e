//! Keyed publisher
//!
//! A [`Publisher`] keeps one private [`Event`] per key, created on the first
//! registration for that key.

use crate::connection::Connection;
use crate::error::{EventError, EventResult};
use crate::event::{Event, Location};
use crate::slot::Callable;
use crate::sync::KeyedMap;
use ripple_log::debug;
use std::fmt;
use std::hash::Hash;

/// Routes publications to the slots registered under a key.
///
/// [`Publisher::publish`] copies the key's event while holding the map lock
/// and runs the copy after releasing it. Slots may therefore register or
/// publish again, even for the same key, but changes they make are only seen
/// by later publications.
///
/// # Examples
///
/// ```
/// use ripple_events::Publisher;
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use std::sync::Arc;
///
/// let total = Arc::new(AtomicU32::new(0));
/// let publisher: Publisher<&str, u32> = Publisher::new();
///
/// let sum = total.clone();
/// publisher.register("deposit", move |amount: &u32| {
///     sum.fetch_add(*amount, Ordering::SeqCst);
/// });
///
/// publisher.publish(&"deposit", &25);
/// publisher.publish(&"withdraw", &10);
/// assert_eq!(total.load(Ordering::SeqCst), 25);
/// ```
pub struct Publisher<K, A: ?Sized = ()> {
    events: KeyedMap<K, Event<A>>,
}

impl<K, A> Publisher<K, A>
where
    K: Eq + Hash,
    A: ?Sized + 'static,
{
    /// Create a publisher with no keys.
    pub fn new() -> Self {
        Self {
            events: KeyedMap::new(),
        }
    }

    /// Register `slot` under `key`, after the key's existing slots.
    pub fn register(&self, key: K, slot: impl Callable<A> + 'static) -> Connection {
        self.register_at(key, slot, Location::Back)
    }

    /// Register `slot` under `key` at the given location.
    pub fn register_at(
        &self,
        key: K,
        slot: impl Callable<A> + 'static,
        location: Location,
    ) -> Connection {
        self.events
            .with_or_default(key, |event| event.connect_at(slot, location))
    }

    /// Run the slots registered under `key`. Unknown keys are ignored.
    pub fn publish(&self, key: &K, args: &A) {
        match self.events.with(key, Event::clone) {
            Some(event) => event.emit(args),
            None => debug!(target: "ripple::publisher", "Publish to unregistered key ignored"),
        }
    }

    /// Like [`Publisher::publish`], but reports unknown keys.
    pub fn try_publish(&self, key: &K, args: &A) -> EventResult<()>
    where
        K: fmt::Debug,
    {
        let event = self
            .events
            .with(key, Event::clone)
            .ok_or_else(|| EventError::UnknownKey(format!("{key:?}")))?;
        event.emit(args);
        Ok(())
    }

    /// Remove the slots under `key` that share their slot with `connection`.
    ///
    /// Returns the number of entries removed.
    pub fn disconnect(&self, key: &K, connection: &Connection) -> usize {
        self.events
            .with(key, |event| event.disconnect(connection))
            .unwrap_or(0)
    }

    /// Drop the event for `key` and every slot registered under it.
    pub fn unregister(&self, key: &K) -> bool {
        self.events.remove(key).is_some()
    }

    /// Whether anything was ever registered under `key` (and not unregistered).
    pub fn contains(&self, key: &K) -> bool {
        self.events.contains_key(key)
    }

    /// Number of entries stored under `key`.
    pub fn slot_count(&self, key: &K) -> usize {
        self.events.with(key, Event::len).unwrap_or(0)
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no key is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every key.
    pub fn clear(&self) {
        self.events.clear();
    }
}

impl<K, A> Default for Publisher<K, A>
where
    K: Eq + Hash,
    A: ?Sized + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, A> fmt::Debug for Publisher<K, A>
where
    K: Eq + Hash,
    A: ?Sized + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Publisher")
            .field("keys", &self.len())
            .finish()
    }
}
