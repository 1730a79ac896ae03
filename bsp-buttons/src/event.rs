//! Events exchanged between the button task, its states and the outside world.

/// Event identifiers understood by the button module.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EventId {
    /// No event. Never posted.
    None = 0,
    /// Periodic tick that drives the button task.
    ButtonTask = 1,
    /// Debounced press.
    ButtonPressed = 2,
    /// Debounced release.
    ButtonReleased = 3,
    /// Button held past the stuck timeout.
    ButtonStuck = 4,
    /// Stuck button let go.
    ButtonUnstuck = 5,
}

impl EventId {
    /// Whether this id may be posted to a queue.
    pub fn is_valid(self) -> bool {
        self != EventId::None
    }

    pub fn name(self) -> &'static str {
        match self {
            EventId::None => "none",
            EventId::ButtonTask => "task",
            EventId::ButtonPressed => "pressed",
            EventId::ButtonReleased => "released",
            EventId::ButtonStuck => "stuck",
            EventId::ButtonUnstuck => "unstuck",
        }
    }
}

/// An event id plus its data word. For button events the data is the
/// button (instance) index.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Event {
    pub id: EventId,
    pub data: u32,
}

impl Event {
    pub const fn new(id: EventId, data: u32) -> Self {
        Self { id, data }
    }

    /// The tick event the task alarm delivers.
    pub const fn task() -> Self {
        Self::new(EventId::ButtonTask, 0)
    }

    /// Instance index carried in the data word.
    pub fn instance(&self) -> usize {
        self.data as usize
    }
}

/// Why a state exited ("reason3"). Used together with the exit event to
/// select a transition row.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Reason {
    None = 0,
    /// A non-resting bit was seen on the input.
    TwitchNoted = 1,
    /// Eight consistent bits were accumulated.
    Debounced = 2,
    /// The state's timer ran out.
    Timeout = 3,
    /// A stuck button was released.
    ButtonUnstuck = 4,
}
