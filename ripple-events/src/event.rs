//! Multi-slot events
//!
//! An [`Event`] keeps three containers: slots connected at the front, slots
//! connected at the back and (with the `grouping` feature) ordered buckets of
//! grouped slots. Every [`Event::emit`] copies all of them under the lock,
//! releases it, and only then runs the slots, so a slot may connect,
//! disconnect or emit again without deadlocking. Structural changes made
//! during a sweep are picked up by the next one.
//!
//! Sweep order:
//!
//! 1. front slots, most recently front-connected first
//! 2. grouped slots, buckets in ascending key order
//! 3. back slots, in connection order

use crate::connection::Connection;
use crate::slot::{Callable, Entry, Slot};
use crate::sync::{Flag, Lock, Shareable, Shared};
use ripple_log::{debug, trace};
#[cfg(feature = "grouping")]
use std::collections::BTreeMap;
use std::collections::VecDeque;
use std::fmt;
#[cfg(not(feature = "grouping"))]
use std::marker::PhantomData;

/// Where a slot is inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Location {
    /// Run before every slot connected so far.
    Front,
    /// Run after every slot connected so far.
    #[default]
    Back,
}

/// Event configuration
#[derive(Debug, Clone)]
pub struct EventConfig {
    /// Name used in log output
    pub label: Option<String>,

    /// Whether the event starts enabled
    pub enabled: bool,

    /// Log connects, disconnects and sweeps of this event
    pub log_dispatch: bool,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            label: None,
            enabled: true,
            log_dispatch: true,
        }
    }
}

/// Event builder
#[derive(Debug, Default)]
pub struct EventBuilder {
    config: EventConfig,
}

impl EventBuilder {
    /// Create a builder with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the label shown in log output
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.config.label = Some(label.into());
        self
    }

    /// Start enabled or disabled
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.config.enabled = enabled;
        self
    }

    /// Enable/disable per-event logging
    pub fn log_dispatch(mut self, enabled: bool) -> Self {
        self.config.log_dispatch = enabled;
        self
    }

    /// Build the event
    pub fn build<A: ?Sized + 'static, G: Ord + Clone>(self) -> Event<A, G> {
        Event::with_config(self.config)
    }
}

struct Slots<A: ?Sized, G> {
    front: VecDeque<Entry<A>>,
    back: Vec<Entry<A>>,
    #[cfg(feature = "grouping")]
    groups: BTreeMap<G, VecDeque<Entry<A>>>,
    #[cfg(not(feature = "grouping"))]
    groups: PhantomData<fn() -> G>,
}

impl<A: ?Sized + 'static, G: Ord> Slots<A, G> {
    fn new() -> Self {
        Self {
            front: VecDeque::new(),
            back: Vec::new(),
            #[cfg(feature = "grouping")]
            groups: BTreeMap::new(),
            #[cfg(not(feature = "grouping"))]
            groups: PhantomData,
        }
    }

    fn push(&mut self, entry: Entry<A>, location: Location) {
        match location {
            Location::Front => self.front.push_front(entry),
            Location::Back => self.back.push(entry),
        }
    }

    #[cfg(feature = "grouping")]
    fn push_group(&mut self, group: G, entry: Entry<A>, location: Location) {
        let bucket = self.groups.entry(group).or_default();
        match location {
            Location::Front => bucket.push_front(entry),
            Location::Back => bucket.push_back(entry),
        }
    }

    /// Keep the entries matching `keep`, returning how many were dropped.
    fn retain(&mut self, keep: impl Fn(&Entry<A>) -> bool) -> usize {
        let before = self.len();
        self.front.retain(|entry| keep(entry));
        self.back.retain(|entry| keep(entry));
        self.retain_grouped(&keep);
        before - self.len()
    }

    #[cfg(feature = "grouping")]
    fn retain_grouped(&mut self, keep: &impl Fn(&Entry<A>) -> bool) {
        self.groups.retain(|_, bucket| {
            bucket.retain(|entry| keep(entry));
            !bucket.is_empty()
        });
    }

    #[cfg(not(feature = "grouping"))]
    fn retain_grouped(&mut self, _keep: &impl Fn(&Entry<A>) -> bool) {}

    fn clear(&mut self) {
        self.front.clear();
        self.back.clear();
        #[cfg(feature = "grouping")]
        self.groups.clear();
    }

    fn len(&self) -> usize {
        self.front.len() + self.grouped().count() + self.back.len()
    }

    /// Entries in sweep order.
    fn iter(&self) -> impl Iterator<Item = &Entry<A>> {
        self.front.iter().chain(self.grouped()).chain(self.back.iter())
    }

    #[cfg(feature = "grouping")]
    fn grouped(&self) -> impl Iterator<Item = &Entry<A>> {
        self.groups.values().flatten()
    }

    #[cfg(not(feature = "grouping"))]
    fn grouped(&self) -> impl Iterator<Item = &Entry<A>> {
        std::iter::empty()
    }
}

impl<A: ?Sized, G: Clone> Clone for Slots<A, G> {
    fn clone(&self) -> Self {
        Self {
            front: self.front.clone(),
            back: self.back.clone(),
            groups: self.groups.clone(),
        }
    }
}

/// Broadcasts a borrowed argument to every connected, unblocked slot.
///
/// `A` is the argument type passed to each slot as `&A`; `G` is the group
/// key type, ordered ascending at dispatch.
///
/// # Examples
///
/// ```
/// use ripple_events::{Event, Location};
/// use std::sync::{Arc, Mutex};
///
/// let order = Arc::new(Mutex::new(Vec::new()));
/// let event: Event<&str> = Event::new();
///
/// let log = order.clone();
/// event.connect(move |name: &&str| log.lock().unwrap().push(format!("back:{name}")));
/// let log = order.clone();
/// event.connect_at(move |name: &&str| log.lock().unwrap().push(format!("front:{name}")), Location::Front);
///
/// event.emit(&"save");
/// assert_eq!(*order.lock().unwrap(), ["front:save", "back:save"]);
/// ```
pub struct Event<A: ?Sized = (), G = u32> {
    slots: Lock<Slots<A, G>>,
    enabled: Flag,
    config: Shared<EventConfig>,
}

impl Event {
    /// Start building a configured event; the builder picks the types.
    pub fn builder() -> EventBuilder {
        EventBuilder::new()
    }
}

impl<A: ?Sized + 'static, G: Ord + Clone> Event<A, G> {
    /// Create an enabled event with the default configuration.
    pub fn new() -> Self {
        Self::with_config(EventConfig::default())
    }

    /// Create an event with a custom configuration.
    pub fn with_config(config: EventConfig) -> Self {
        Self {
            slots: Lock::new(Slots::new()),
            enabled: Flag::new(config.enabled),
            config: Shared::new(config),
        }
    }

    /// Label from the configuration, if any.
    pub fn label(&self) -> Option<&str> {
        self.config.label.as_deref()
    }

    /// Connect `slot` after every ungrouped slot connected so far.
    pub fn connect(&self, slot: impl Callable<A> + 'static) -> Connection {
        self.connect_slot(Slot::new(slot), Location::Back)
    }

    /// Connect `slot` at the given end of the ungrouped slots.
    pub fn connect_at(&self, slot: impl Callable<A> + 'static, location: Location) -> Connection {
        self.connect_slot(Slot::new(slot), location)
    }

    /// Connect `method` bound to a shared `owner`.
    pub fn connect_method<T>(
        &self,
        owner: Shared<T>,
        method: fn(&T, &A),
        location: Location,
    ) -> Connection
    where
        T: Shareable + 'static,
    {
        self.connect_slot(Slot::from_method(owner, method), location)
    }

    /// Connect an already wrapped [`Slot`].
    pub fn connect_slot(&self, slot: Slot<A>, location: Location) -> Connection {
        let entry = Entry::new(slot);
        let connection = entry.connection.clone();
        self.slots.lock().push(entry, location);

        if self.config.log_dispatch {
            debug!(target: "ripple::event", "Connected slot to '{}' at {:?}", self.name(), location);
        }
        connection
    }

    /// Connect `slot` into the bucket for `group`.
    ///
    /// Buckets run between the front and back slots, in ascending key order.
    /// Inside a bucket, `location` applies the same way it does to ungrouped
    /// slots: `Front` runs before the bucket's earlier slots, `Back` after.
    #[cfg(feature = "grouping")]
    pub fn connect_group(
        &self,
        group: G,
        slot: impl Callable<A> + 'static,
        location: Location,
    ) -> Connection {
        let entry = Entry::new(Slot::new(slot));
        let connection = entry.connection.clone();
        self.slots.lock().push_group(group, entry, location);

        if self.config.log_dispatch {
            debug!(target: "ripple::event", "Connected grouped slot to '{}' at {:?}", self.name(), location);
        }
        connection
    }

    /// Remove every entry that shares its slot with `connection`.
    ///
    /// The handle's own connected flag is not changed. Returns the number of
    /// entries removed; zero when nothing matched.
    pub fn disconnect(&self, connection: &Connection) -> usize {
        let removed = self.slots.lock().retain(|entry| !entry.matches(connection));

        if removed > 0 && self.config.log_dispatch {
            debug!(target: "ripple::event", "Removed {} slot(s) from '{}'", removed, self.name());
        }
        removed
    }

    /// Remove entries whose handle has been disconnected.
    ///
    /// Disconnected entries are otherwise kept and skipped at every sweep.
    pub fn compact(&self) -> usize {
        let removed = self.slots.lock().retain(|entry| entry.connection.connected());

        if removed > 0 && self.config.log_dispatch {
            debug!(target: "ripple::event", "Compacted {} disconnected slot(s) from '{}'", removed, self.name());
        }
        removed
    }

    /// Remove every entry. Outstanding handles keep their flags.
    pub fn clear(&self) {
        self.slots.lock().clear();

        if self.config.log_dispatch {
            debug!(target: "ripple::event", "Cleared '{}'", self.name());
        }
    }

    /// Allow sweeps again.
    pub fn enable(&self) {
        self.enabled.set(true);
    }

    /// Turn every sweep into a no-op until [`Event::enable`] is called.
    pub fn disable(&self) {
        self.enabled.set(false);
    }

    /// Whether sweeps currently run.
    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    /// Number of stored entries, including disconnected and blocked ones.
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    /// Whether no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run every connected, unblocked slot with `args`.
    ///
    /// Works on a snapshot taken when the sweep starts. Each handle's flags
    /// are read as its entry is reached. A panicking slot unwinds to the
    /// caller and the rest of the sweep does not run.
    pub fn emit(&self, args: &A) {
        if !self.enabled.get() {
            return;
        }

        let snapshot = self.slots.lock().clone();

        if self.config.log_dispatch {
            trace!(target: "ripple::event", "Emitting '{}' over {} slot(s)", self.name(), snapshot.len());
        }

        for entry in snapshot.iter() {
            if entry.is_live() {
                entry.invoke(args);
            }
        }
    }

    fn name(&self) -> &str {
        self.label().unwrap_or("<unnamed>")
    }
}

impl<A: ?Sized + 'static, G: Ord + Clone> Default for Event<A, G> {
    fn default() -> Self {
        Self::new()
    }
}

/// Copies the entries, the enabled flag and the configuration into an
/// independent event. Entries keep sharing their handles.
impl<A: ?Sized + 'static, G: Ord + Clone> Clone for Event<A, G> {
    fn clone(&self) -> Self {
        let slots = self.slots.lock().clone();
        Self {
            slots: Lock::new(slots),
            enabled: Flag::new(self.enabled.get()),
            config: Shared::clone(&self.config),
        }
    }
}

impl<A: ?Sized + 'static, G: Ord + Clone> fmt::Debug for Event<A, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("label", &self.label())
            .field("enabled", &self.is_enabled())
            .field("slots", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    fn counter() -> (Arc<AtomicU32>, impl Fn(&()) + Clone + Send + Sync + 'static) {
        let count = Arc::new(AtomicU32::new(0));
        let handle = count.clone();
        (count, move |_: &()| {
            handle.fetch_add(1, Ordering::SeqCst);
        })
    }

    fn recorder() -> (Arc<Mutex<Vec<&'static str>>>, impl Fn(&'static str) -> Box<dyn Fn(&()) + Send + Sync>) {
        let order = Arc::new(Mutex::new(Vec::new()));
        let log = order.clone();
        (order, move |name| {
            let log = log.clone();
            Box::new(move |_: &()| log.lock().unwrap().push(name))
        })
    }

    fn failing_slot(_: &()) {
        panic!("slot failed");
    }

    #[test]
    fn test_connect_and_emit() {
        let event: Event = Event::new();
        let (count, slot) = counter();

        event.emit(&());
        assert_eq!(count.load(Ordering::SeqCst), 0);

        event.connect(slot);
        event.emit(&());
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(event.len(), 1);
    }

    #[test]
    fn test_handle_disconnect_stops_slot() {
        let event: Event = Event::new();
        let (count, slot) = counter();
        let connection = event.connect(slot);

        event.emit(&());
        connection.disconnect();
        connection.disconnect();
        event.emit(&());

        assert_eq!(count.load(Ordering::SeqCst), 1);
        // Skipped, not pruned
        assert_eq!(event.len(), 1);
    }

    #[test]
    fn test_event_disconnect_removes_entry_only() {
        let event: Event = Event::new();
        let (count, slot) = counter();
        let connection = event.connect(slot.clone());
        event.connect(slot);

        assert_eq!(event.disconnect(&connection), 1);
        assert_eq!(event.disconnect(&connection), 0);
        assert_eq!(event.disconnect(&Connection::default()), 0);

        event.emit(&());
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(connection.connected());
    }

    #[test]
    fn test_blocking() {
        let event: Event = Event::new();
        let (count, slot) = counter();
        let connection = event.connect(slot);

        event.emit(&());
        assert_eq!(count.load(Ordering::SeqCst), 1);

        connection.set_blocking(true);
        event.emit(&());
        assert_eq!(count.load(Ordering::SeqCst), 1);

        connection.set_blocking(false);
        event.emit(&());
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_disable_and_enable() {
        let event: Event = Event::new();
        let (count, slot) = counter();
        for _ in 0..3 {
            event.connect(slot.clone());
        }

        event.disable();
        assert!(!event.is_enabled());
        event.emit(&());
        assert_eq!(count.load(Ordering::SeqCst), 0);

        event.enable();
        event.emit(&());
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_front_and_back_order() {
        let event: Event = Event::new();
        let (order, named) = recorder();

        event.connect_at(named("a"), Location::Front);
        event.connect_at(named("b"), Location::Front);
        event.connect_at(named("c"), Location::Back);

        event.emit(&());
        assert_eq!(*order.lock().unwrap(), ["b", "a", "c"]);
    }

    #[cfg(feature = "grouping")]
    #[test]
    fn test_groups_run_between_front_and_back() {
        let event: Event = Event::new();
        let (order, named) = recorder();

        event.connect(named("back"));
        event.connect_group(7, named("g7"), Location::Back);
        event.connect_group(2, named("g2-first"), Location::Back);
        event.connect_group(2, named("g2-second"), Location::Back);
        event.connect_at(named("front"), Location::Front);

        event.emit(&());
        assert_eq!(
            *order.lock().unwrap(),
            ["front", "g2-first", "g2-second", "g7", "back"]
        );
    }

    #[cfg(feature = "grouping")]
    #[test]
    fn test_group_location_is_honoured() {
        let event: Event<(), &'static str> = Event::new();
        let (order, named) = recorder();

        event.connect_group("x", named("first"), Location::Back);
        event.connect_group("x", named("head"), Location::Front);
        event.connect_group("x", named("tail"), Location::Back);

        event.emit(&());
        assert_eq!(*order.lock().unwrap(), ["head", "first", "tail"]);
    }

    #[cfg(feature = "grouping")]
    #[test]
    fn test_disconnect_from_group() {
        let event: Event = Event::new();
        let (count, slot) = counter();
        let grouped = event.connect_group(1, slot.clone(), Location::Back);
        event.connect_group(1, slot, Location::Back);

        assert_eq!(event.disconnect(&grouped), 1);
        event.emit(&());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_clear_keeps_handle_flags() {
        let event: Event = Event::new();
        let (count, slot) = counter();
        let connection = event.connect(slot);

        event.clear();
        event.emit(&());

        assert!(event.is_empty());
        assert!(connection.connected());
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_compact_prunes_disconnected() {
        let event: Event = Event::new();
        let (_count, slot) = counter();
        let first = event.connect(slot.clone());
        event.connect(slot.clone());
        let blocked = event.connect(slot);

        first.disconnect();
        blocked.set_blocking(true);

        assert_eq!(event.compact(), 1);
        assert_eq!(event.len(), 2);
    }

    #[test]
    fn test_clone_is_independent() {
        let event: Event = Event::new();
        let (count, slot) = counter();
        event.connect(slot.clone());
        event.disable();

        let copy = event.clone();
        assert!(!copy.is_enabled());
        copy.enable();
        copy.connect(slot);

        event.emit(&());
        assert_eq!(count.load(Ordering::SeqCst), 0);

        copy.emit(&());
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert_eq!(event.len(), 1);
    }

    #[test]
    fn test_clone_shares_handles() {
        let event: Event = Event::new();
        let (count, slot) = counter();
        let connection = event.connect(slot);
        let copy = event.clone();

        connection.disconnect();
        copy.emit(&());
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_connect_during_emit_waits_for_next_sweep() {
        let event: Arc<Event> = Arc::new(Event::new());
        let (count, slot) = counter();

        let inner = Arc::downgrade(&event);
        event.connect(move |_: &()| {
            if let Some(event) = inner.upgrade() {
                event.connect(slot.clone());
            }
        });

        event.emit(&());
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(event.len(), 2);

        event.emit(&());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_container_changes_during_emit_do_not_affect_sweep() {
        let event: Arc<Event> = Arc::new(Event::new());
        let (count, slot) = counter();
        let later = Arc::new(Mutex::new(Connection::default()));

        let inner = Arc::downgrade(&event);
        let target = later.clone();
        event.connect(move |_: &()| {
            if let Some(event) = inner.upgrade() {
                event.disconnect(&target.lock().unwrap());
                event.disable();
            }
        });
        *later.lock().unwrap() = event.connect(slot);

        event.emit(&());
        assert_eq!(count.load(Ordering::SeqCst), 1);

        event.enable();
        event.emit(&());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_handle_flag_read_when_entry_is_reached() {
        let event: Event = Event::new();
        let (count, slot) = counter();
        let later = Arc::new(Mutex::new(Connection::default()));

        let target = later.clone();
        event.connect(move |_: &()| target.lock().unwrap().disconnect());
        *later.lock().unwrap() = event.connect(slot);

        event.emit(&());
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_panicking_slot_aborts_sweep() {
        let event: Event = Event::new();
        let (count, slot) = counter();

        event.connect(slot.clone());
        let failing = event.connect(failing_slot);
        event.connect(slot);

        let result = panic::catch_unwind(AssertUnwindSafe(|| event.emit(&())));
        assert!(result.is_err());
        assert_eq!(count.load(Ordering::SeqCst), 1);

        failing.disconnect();
        event.emit(&());
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_builder() {
        let event: Event<u32> = Event::builder()
            .label("score")
            .enabled(false)
            .log_dispatch(false)
            .build();

        assert_eq!(event.label(), Some("score"));
        assert!(!event.is_enabled());
        assert_eq!(format!("{event:?}"), r#"Event { label: Some("score"), enabled: false, slots: 0 }"#);
    }

    #[test]
    fn test_connect_method() {
        struct Tally(AtomicU32);

        impl Tally {
            fn add(&self, amount: &u32) {
                self.0.fetch_add(*amount, Ordering::SeqCst);
            }
        }

        let tally = Shared::new(Tally(AtomicU32::new(0)));
        let event: Event<u32> = Event::new();
        event.connect_method(tally.clone(), Tally::add, Location::Back);

        event.emit(&4);
        event.emit(&6);
        assert_eq!(tally.0.load(Ordering::SeqCst), 10);
    }

    #[cfg(feature = "threadsafe")]
    #[test]
    fn test_concurrent_connect() {
        let event: Event = Event::new();
        let (count, slot) = counter();

        std::thread::scope(|scope| {
            for _ in 0..2 {
                let slot = slot.clone();
                let event = &event;
                scope.spawn(move || {
                    for _ in 0..5_000 {
                        event.connect(slot.clone());
                    }
                });
            }
        });

        event.emit(&());
        assert_eq!(count.load(Ordering::SeqCst), 10_000);
    }
}
