// Ripple - synchronous signals and slots for Rust
//
// This library provides ordered in-process events, one-shot event queues,
// keyed publishers and, behind the `timer` feature, countdown timers.

// Re-export the event engine
pub use ripple_events::*;

// Re-export the logging crate
pub use ripple_log;

// Re-export optional crates
#[cfg(feature = "timer")]
pub use ripple_timer;

#[cfg(feature = "timer")]
pub use ripple_timer::{Timer, TimerError, TimerManager, TimerResult};

/// Commonly used items.
pub mod prelude {
    pub use crate::{
        Callable,
        Connection,
        Event,
        EventBuilder,
        EventConfig,
        EventError,
        EventQueue,
        EventResult,
        Location,
        Publisher,
        ScopedConnection,
        Slot,
    };

    #[cfg(feature = "timer")]
    pub use crate::{Timer, TimerError, TimerManager, TimerResult};
}
