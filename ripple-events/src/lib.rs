//! Synchronous signal/slot events for Ripple
//!
//! This crate provides in-process, synchronous publish/subscribe primitives.
//!
//! ## Features
//!
//! - **Event** - Ordered multicast of a call to every connected slot
//! - **Connection** - Shared handle to disconnect or temporarily block a slot
//! - **EventQueue** - One-shot slots drained in FIFO order
//! - **Publisher** - Events multiplexed by key
//! - **Snapshot dispatch** - Slots may connect, disconnect or emit while being run
//!
//! ## Quick Start
//!
//! ```rust
//! use ripple_events::{Event, Location};
//! use std::sync::{Arc, Mutex};
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let event: Event<str> = Event::new();
//!
//! let log = seen.clone();
//! event.connect(move |name: &str| log.lock().unwrap().push(format!("back {name}")));
//! let log = seen.clone();
//! event.connect_at(
//!     move |name: &str| log.lock().unwrap().push(format!("front {name}")),
//!     Location::Front,
//! );
//!
//! event.emit("ripple");
//! assert_eq!(*seen.lock().unwrap(), ["front ripple", "back ripple"]);
//! ```
//!
//! ## Connections
//!
//! ```rust
//! use ripple_events::Event;
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use std::sync::Arc;
//!
//! let hits = Arc::new(AtomicU32::new(0));
//! let event: Event = Event::new();
//!
//! let counter = hits.clone();
//! let connection = event.connect(move |_: &()| {
//!     counter.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! connection.set_blocking(true);
//! event.emit(&());
//! connection.set_blocking(false);
//! event.emit(&());
//!
//! // Scoped connections disconnect when dropped.
//! drop(connection.scoped());
//! event.emit(&());
//!
//! assert_eq!(hits.load(Ordering::SeqCst), 1);
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use ripple_events::Event;
//!
//! let event: Event<u32> = Event::builder()
//!     .label("score")
//!     .enabled(false)
//!     .log_dispatch(false)
//!     .build();
//!
//! assert_eq!(event.label(), Some("score"));
//! assert!(!event.is_enabled());
//! ```
//!
//! ## Cargo features
//!
//! - `threadsafe` (default): types are `Send + Sync` and slots must be too.
//!   Without it the same API runs on `Rc`/`RefCell` and is single-threaded.
//! - `grouping` (default): enables [`Event::connect_group`].

pub(crate) mod sync;

mod connection;
mod error;
mod event;
mod publisher;
mod queue;
mod slot;

pub use connection::{Connection, ScopedConnection};
pub use error::{EventError, EventResult};
pub use event::{Event, EventBuilder, EventConfig, Location};
pub use publisher::Publisher;
pub use queue::EventQueue;
pub use slot::{Callable, Slot};
pub use sync::{Shareable, Shared};

/// Commonly used items.
pub mod prelude {
    pub use crate::{
        Callable, Connection, Event, EventConfig, EventError, EventQueue, EventResult, Location,
        Publisher, ScopedConnection, Shareable, Shared, Slot,
    };
}

#[cfg(all(test, feature = "threadsafe"))]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_types_are_thread_safe() {
        assert_send_sync::<Event<u32>>();
        assert_send_sync::<EventQueue<str>>();
        assert_send_sync::<Publisher<String, u32>>();
        assert_send_sync::<Connection>();
        assert_send_sync::<ScopedConnection>();
    }

    #[test]
    fn test_method_slots_through_root_exports() {
        use std::sync::atomic::{AtomicU32, Ordering};

        struct Meter(AtomicU32);

        impl Meter {
            fn add(&self, amount: &u32) {
                self.0.fetch_add(*amount, Ordering::SeqCst);
            }
        }

        let meter: Shared<Meter> = Shared::new(Meter(AtomicU32::new(0)));
        let event: Event<u32> = Event::new();
        event.connect_method(meter.clone(), Meter::add, Location::Back);

        event.emit(&4);
        assert_eq!(meter.0.load(Ordering::SeqCst), 4);
    }
}
