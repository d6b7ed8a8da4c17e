//! Errors for the checked event APIs.
//!
//! Dispatch itself never fails: a panicking slot unwinds through the caller
//! of `emit`, and the unchecked APIs treat unknown keys as no-ops.

use thiserror::Error;

/// Errors returned by the checked variants of the event APIs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    /// No event has been registered under the key.
    #[error("no event registered for key {0}")]
    UnknownKey(String),

    /// The connection is not attached to a live registration.
    #[error("connection is not attached to any slot")]
    Detached,
}

/// Result type for event operations.
pub type EventResult<T> = Result<T, EventError>;
