//! Board-level button handling: per-button debounce state machines.
//!
//! Each physical button runs its own copy of a small table-driven state
//! machine (start, released, confirm-press, pressed, confirm-release, stuck).
//! A periodic tick advances every machine by one step; qualified changes are
//! posted as events to the owning module's queue.
//!
//! This crate is `no_std` so the same logic runs on the board and in the
//! host simulator.

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod debounce;
pub mod error;
pub mod event;
pub mod queue;
pub mod sme;
pub mod source;
pub mod states;
pub mod task;
pub mod timer;

pub use config::{Config, HaltPolicy, StuckChannel};
pub use error::{ButtonError, NoTransition, QueueError};
pub use event::{Event, EventId, Reason};
pub use queue::{EventQueue, EventSink};
pub use source::{BitSource, PatternSource};
pub use states::{Phase, State};
pub use task::ButtonTask;
pub use timer::{Clock, ManualClock, Millis};

/// Number of buttons on the default board.
pub const NUM_BUTTONS: usize = 8;
