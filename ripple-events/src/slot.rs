//! Slot definitions
//!
//! A [`Slot`] owns one callable. Containers store it next to its
//! [`Connection`] in an `Entry`; cloning an entry only bumps reference
//! counts, which is what makes per-sweep snapshots cheap.

use crate::connection::Connection;
use crate::sync::{Shareable, Shared};
use std::fmt;

/// Something that can be invoked with a borrowed argument.
///
/// Implemented for every `Fn(&A)` closure that satisfies [`Shareable`].
pub trait Callable<A: ?Sized>: Shareable {
    /// Invoke the callable.
    fn call(&self, args: &A);
}

impl<A: ?Sized, F> Callable<A> for F
where
    F: Fn(&A) + Shareable,
{
    fn call(&self, args: &A) {
        self(args)
    }
}

/// Owned, type-erased callable stored by an event.
pub struct Slot<A: ?Sized> {
    callable: Box<dyn Callable<A>>,
}

impl<A: ?Sized + 'static> Slot<A> {
    /// Wrap a closure or any other [`Callable`].
    pub fn new(callable: impl Callable<A> + 'static) -> Self {
        Self {
            callable: Box::new(callable),
        }
    }

    /// Bind `method` to a shared `owner`.
    ///
    /// The slot keeps `owner` alive for as long as it is stored.
    ///
    /// ```
    /// use ripple_events::{Shared, Slot};
    /// use std::sync::atomic::{AtomicU32, Ordering};
    ///
    /// struct Score(AtomicU32);
    ///
    /// impl Score {
    ///     fn add(&self, points: &u32) {
    ///         self.0.fetch_add(*points, Ordering::SeqCst);
    ///     }
    /// }
    ///
    /// let score = Shared::new(Score(AtomicU32::new(0)));
    /// let slot = Slot::from_method(score.clone(), Score::add);
    /// slot.invoke(&5);
    /// assert_eq!(score.0.load(Ordering::SeqCst), 5);
    /// ```
    pub fn from_method<T>(owner: Shared<T>, method: fn(&T, &A)) -> Self
    where
        T: Shareable + 'static,
    {
        Self::new(move |args: &A| method(&owner, args))
    }

    /// Call the wrapped callable.
    pub fn invoke(&self, args: &A) {
        self.callable.call(args);
    }
}

impl<A: ?Sized> fmt::Debug for Slot<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slot").finish_non_exhaustive()
    }
}

/// A slot together with the handle that controls it.
pub(crate) struct Entry<A: ?Sized> {
    pub(crate) connection: Connection,
    slot: Shared<Slot<A>>,
}

impl<A: ?Sized + 'static> Entry<A> {
    pub(crate) fn new(slot: Slot<A>) -> Self {
        let slot = Shared::new(slot);
        Self {
            connection: Connection::bind(&slot),
            slot,
        }
    }

    /// Whether a sweep should run this entry.
    pub(crate) fn is_live(&self) -> bool {
        self.connection.connected() && !self.connection.blocking()
    }

    pub(crate) fn matches(&self, connection: &Connection) -> bool {
        connection.shares_slot_with(&self.connection)
    }

    pub(crate) fn invoke(&self, args: &A) {
        self.slot.invoke(args);
    }
}

impl<A: ?Sized> Clone for Entry<A> {
    fn clone(&self) -> Self {
        Self {
            connection: self.connection.clone(),
            slot: Shared::clone(&self.slot),
        }
    }
}
