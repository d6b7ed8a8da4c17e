//! One-shot event queue
//!
//! Slots connected to an [`EventQueue`] run at most once: the next
//! [`EventQueue::emit`] pops them in FIFO order and drops them.

use crate::connection::Connection;
use crate::slot::{Callable, Entry, Slot};
use crate::sync::Lock;
use ripple_log::{debug, trace};
use std::collections::VecDeque;
use std::fmt;

/// FIFO of deferred, one-shot slots.
///
/// The lock is released around every slot, so a slot may queue further
/// slots; those run in the same drain because the queue is re-checked after
/// each pop. Blocking is ignored here: only the connected flag is consulted.
///
/// # Examples
///
/// ```
/// use ripple_events::EventQueue;
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use std::sync::Arc;
///
/// let hits = Arc::new(AtomicU32::new(0));
/// let queue: EventQueue = EventQueue::new();
///
/// let counter = hits.clone();
/// queue.connect(move |_: &()| {
///     counter.fetch_add(1, Ordering::SeqCst);
/// });
///
/// queue.emit(&());
/// queue.emit(&());
/// assert_eq!(hits.load(Ordering::SeqCst), 1);
/// ```
pub struct EventQueue<A: ?Sized = ()> {
    queue: Lock<VecDeque<Entry<A>>>,
}

impl<A: ?Sized + 'static> EventQueue<A> {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            queue: Lock::new(VecDeque::new()),
        }
    }

    /// Queue `slot` behind every slot queued so far.
    pub fn connect(&self, slot: impl Callable<A> + 'static) -> Connection {
        let entry = Entry::new(Slot::new(slot));
        let connection = entry.connection.clone();
        let pending = {
            let mut queue = self.queue.lock();
            queue.push_back(entry);
            queue.len()
        };

        debug!(target: "ripple::queue", "Queued slot ({} pending)", pending);
        connection
    }

    /// Drain the queue, running each connected slot once with `args`.
    ///
    /// Disconnected slots are dropped without running. A panicking slot
    /// unwinds to the caller; slots still queued stay queued.
    pub fn emit(&self, args: &A) {
        let mut fired = 0usize;
        let mut dropped = 0usize;

        while let Some(entry) = self.pop() {
            if entry.connection.connected() {
                entry.invoke(args);
                fired += 1;
            } else {
                dropped += 1;
            }
        }

        trace!(target: "ripple::queue", "Drained queue: {} fired, {} dropped", fired, dropped);
    }

    /// Drop every queued slot without running it.
    pub fn clear(&self) {
        self.queue.lock().clear();
    }

    /// Number of queued slots.
    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // The guard must be gone before the popped slot runs.
    fn pop(&self) -> Option<Entry<A>> {
        self.queue.lock().pop_front()
    }
}

impl<A: ?Sized + 'static> Default for EventQueue<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: ?Sized + 'static> fmt::Debug for EventQueue<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventQueue")
            .field("pending", &self.len())
            .finish()
    }
}
