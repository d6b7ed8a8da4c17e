//! Error types for timer operations.

use thiserror::Error;

/// Result type for timer operations.
pub type TimerResult<T> = Result<T, TimerError>;

/// Timer-specific errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimerError {
    /// Timers need a non-zero interval
    #[error("Timer interval must be greater than zero")]
    ZeroInterval,

    /// The manager owning the timer no longer exists
    #[error("Timer manager has been dropped")]
    ManagerDropped,
}
