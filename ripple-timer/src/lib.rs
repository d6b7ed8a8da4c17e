//! Countdown and interval timers for Ripple.
//!
//! Timers are advanced explicitly by the caller (typically once per frame
//! or loop iteration) and report through [`ripple_events::Event`]s:
//!
//! - `on_trigger` when a countdown reaches zero
//! - `on_pause` / `on_resume` when the paused state changes
//!
//! ## Quick Start
//!
//! ```
//! use ripple_timer::TimerManager;
//! use std::time::Duration;
//!
//! let manager = TimerManager::new();
//! let heartbeat = manager.create(Duration::from_secs(1), true)?;
//! heartbeat.on_trigger().connect(|_: &()| println!("tick"));
//!
//! for _ in 0..3 {
//!     manager.update(Duration::from_millis(500));
//! }
//! assert_eq!(heartbeat.time_left(), Duration::from_millis(500));
//! # Ok::<(), ripple_timer::TimerError>(())
//! ```
//!
//! ## Delayed work
//!
//! ```
//! use ripple_timer::TimerManager;
//! use std::time::Duration;
//!
//! let handle = TimerManager::spawn_delayed(Duration::from_millis(10), || {
//!     println!("later");
//! });
//! handle.join().unwrap();
//! ```

pub mod error;
pub mod manager;
pub mod timer;

pub use error::{TimerError, TimerResult};
pub use manager::TimerManager;
pub use timer::Timer;
