//! Connection handles
//!
//! A [`Connection`] is returned by every registration. All clones of one
//! handle share a single state cell, so disconnecting or blocking through any
//! clone is seen by every other clone and by the engine at its next sweep.
//!
//! Two removal mechanisms exist and are kept apart:
//!
//! - [`Connection::disconnect`] flips the shared flag. The entry stays in its
//!   container and is skipped by every later sweep.
//! - `Event::disconnect`, `Event::clear` and friends remove the entry from
//!   the container. The handle's flag is left untouched, so
//!   [`Connection::connected`] can still report `true` for a handle whose
//!   slot will never run again.

use crate::error::EventError;
use crate::sync::{Flag, Shareable, Shared, WeakShared};
use std::fmt;
use std::ops::Deref;
use std::ptr;

#[derive(Debug)]
struct ConnectionState {
    connected: Flag,
    blocking: Flag,
}

/// Shared handle to one slot registration.
///
/// `Connection::default()` is a placeholder that is permanently detached: it
/// reports `connected() == false` and never shares a slot with anything.
#[derive(Clone)]
pub struct Connection {
    state: Shared<ConnectionState>,
    slot: WeakShared<dyn Shareable>,
}

impl Connection {
    /// Bind a fresh, connected handle to the given slot storage.
    pub(crate) fn bind<S: Shareable + 'static>(slot: &Shared<S>) -> Self {
        let slot: WeakShared<dyn Shareable> = Shared::<S>::downgrade(slot);
        Self {
            state: Shared::new(ConnectionState {
                connected: Flag::new(true),
                blocking: Flag::new(false),
            }),
            slot,
        }
    }

    /// Whether the registration is still active.
    pub fn connected(&self) -> bool {
        self.state.connected.get()
    }

    /// Whether the slot is temporarily suppressed.
    pub fn blocking(&self) -> bool {
        self.state.blocking.get()
    }

    /// Suppress (`true`) or resume (`false`) the slot without disconnecting it.
    pub fn set_blocking(&self, block: bool) {
        self.state.blocking.set(block);
    }

    /// Mark the registration as inactive. Calling it again has no effect.
    pub fn disconnect(&self) {
        if self.state.connected.replace(false) {
            ripple_log::trace!(target: "ripple::connection", "Connection disconnected");
        }
    }

    /// Whether both handles refer to the same, still existing slot.
    ///
    /// A handle whose slot storage has been dropped shares nothing, not even
    /// with itself.
    pub fn shares_slot_with(&self, other: &Connection) -> bool {
        match (self.slot.upgrade(), other.slot.upgrade()) {
            (Some(mine), Some(theirs)) => {
                ptr::addr_eq(Shared::as_ptr(&mine), Shared::as_ptr(&theirs))
            }
            _ => false,
        }
    }

    /// Wrap this handle so it disconnects when dropped.
    pub fn scoped(self) -> ScopedConnection {
        ScopedConnection::new(self)
    }
}

impl Default for Connection {
    fn default() -> Self {
        let slot: WeakShared<dyn Shareable> = WeakShared::<()>::new();
        Self {
            state: Shared::new(ConnectionState {
                connected: Flag::new(false),
                blocking: Flag::new(false),
            }),
            slot,
        }
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("connected", &self.connected())
            .field("blocking", &self.blocking())
            .field("slot_alive", &(self.slot.strong_count() > 0))
            .finish()
    }
}

/// A [`Connection`] that disconnects exactly once, when it goes out of scope.
///
/// There is no `Default`: a scoped placeholder would disconnect nothing and
/// only hide mistakes.
#[must_use = "dropping a ScopedConnection disconnects it immediately"]
#[derive(Debug)]
pub struct ScopedConnection(Connection);

impl ScopedConnection {
    /// Take ownership of `connection`'s lifetime.
    pub fn new(connection: Connection) -> Self {
        Self(connection)
    }

    /// Give back the plain handle without disconnecting it.
    pub fn release(mut self) -> Connection {
        std::mem::take(&mut self.0)
    }
}

impl TryFrom<Connection> for ScopedConnection {
    type Error = EventError;

    /// Accept only handles that are still connected.
    fn try_from(connection: Connection) -> Result<Self, Self::Error> {
        if connection.connected() {
            Ok(Self(connection))
        } else {
            Err(EventError::Detached)
        }
    }
}

impl Deref for ScopedConnection {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        &self.0
    }
}

impl Drop for ScopedConnection {
    fn drop(&mut self) {
        self.0.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bound() -> (Shared<u8>, Connection) {
        let storage = Shared::new(0u8);
        let connection = Connection::bind(&storage);
        (storage, connection)
    }

    #[test]
    fn test_default_connection_is_detached() {
        let connection = Connection::default();
        assert!(!connection.connected());
        assert!(!connection.blocking());
        assert!(!connection.shares_slot_with(&connection));

        connection.set_blocking(true);
        assert!(connection.blocking());
    }

    #[test]
    fn test_clones_share_state() {
        let (_storage, connection) = bound();
        let copy = connection.clone();
        assert!(copy.connected());

        copy.set_blocking(true);
        assert!(connection.blocking());

        connection.disconnect();
        assert!(!copy.connected());
    }

    #[test]
    fn test_disconnect_is_idempotent() {
        let (_storage, connection) = bound();
        connection.disconnect();
        connection.disconnect();
        assert!(!connection.connected());
        assert!(!connection.blocking());
    }

    #[test]
    fn test_bind_erases_slot_type() {
        let closure = Shared::new(|_: &u32| {});
        let number = Shared::new(7u64);
        let first = Connection::bind(&closure);
        let second = Connection::bind(&number);

        assert!(first.connected());
        assert!(first.shares_slot_with(&first.clone()));
        assert!(!first.shares_slot_with(&second));
    }

    #[test]
    fn test_slot_identity() {
        let (storage, first) = bound();
        let (_other, second) = bound();
        let copy = first.clone();

        assert!(first.shares_slot_with(&copy));
        assert!(!first.shares_slot_with(&second));

        drop(storage);
        assert!(!first.shares_slot_with(&copy));
    }

    #[test]
    fn test_scoped_connection_disconnects_on_drop() {
        let (_storage, connection) = bound();
        {
            let scoped = connection.clone().scoped();
            assert!(scoped.connected());
        }
        assert!(!connection.connected());
    }

    #[test]
    fn test_scoped_connection_release() {
        let (_storage, connection) = bound();
        let released = ScopedConnection::new(connection.clone()).release();
        assert!(connection.connected());
        assert!(released.shares_slot_with(&connection));
    }

    #[test]
    fn test_scoped_connection_rejects_detached() {
        let result = ScopedConnection::try_from(Connection::default());
        assert_eq!(result.unwrap_err(), EventError::Detached);

        let (_storage, connection) = bound();
        assert!(ScopedConnection::try_from(connection).is_ok());
    }
}
