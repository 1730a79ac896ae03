//! Error types for the button module.

use core::fmt::Debug;

use thiserror::Error;

use crate::event::{EventId, Reason};

/// Errors returned by the button task's public entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ButtonError {
    /// The event named a button this board does not have.
    #[error("button {index} out of range (board has {count})")]
    InvalidInstance { index: usize, count: usize },
}

/// Errors from posting to an event queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("event queue full")]
    Full,
    #[error("no event queue configured")]
    NotConfigured,
}

/// A state exited but no transition row matched its outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no transition from {state:?} on {event:?}/{reason:?} (data {data})")]
pub struct NoTransition<S: Debug> {
    pub state: S,
    pub event: EventId,
    pub data: u32,
    pub reason: Reason,
}
