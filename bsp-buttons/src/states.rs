//! Button state functions and their transition table.
//!
//! ```text
//! start -> released -> confirm-press -> pressed -> confirm-release
//!             ^  ^           |             |  |          |
//!             |  +-- zeros / timeout ------+  |          |
//!             |                               v          |
//!             +------------- unstuck ------ stuck        |
//!             +------------------------------------------+
//! ```
//!
//! Every state runs in three phases: `Entry` once when it becomes active,
//! `Operate` once per tick until something of note happens, then `Exit`
//! once to report why it left. A record knocked back to `Entry` (e.g. by a
//! restart) re-runs the entry action of whatever state is active.

use log::{trace, warn};

use crate::config::{Config, StuckChannel};
use crate::debounce::{Level, ShiftAccumulator};
use crate::event::{Event, EventId, Reason};
use crate::queue::EventSink;
use crate::sme::{Exit, Machine, Transition};
use crate::source::BitSource;
use crate::timer::{Clock, StateTimer};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum State {
    Start,
    Released,
    ConfirmPress,
    Pressed,
    ConfirmRelease,
    Stuck,
}

impl State {
    pub fn name(self) -> &'static str {
        match self {
            State::Start => "start",
            State::Released => "released",
            State::ConfirmPress => "confirm-press",
            State::Pressed => "pressed",
            State::ConfirmRelease => "confirm-release",
            State::Stuck => "stuck",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    /// Run the entry action next. Also the resting value after an exit.
    #[default]
    Entry,
    Operate,
    Exit,
}

/// Everything one button's machine remembers between ticks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceRecord {
    pub(crate) active: Option<State>,
    pub(crate) phase: Phase,
    /// Event reported on exit ("reason1").
    pub(crate) event: EventId,
    /// Exit cause ("reason3").
    pub(crate) reason: Reason,
    pub(crate) shift: ShiftAccumulator,
    pub(crate) debounce_timer: StateTimer,
    pub(crate) stuck_timer: StateTimer,
    pub(crate) parked: bool,
}

impl InstanceRecord {
    pub const fn new() -> Self {
        Self {
            active: Some(State::Start),
            phase: Phase::Entry,
            event: EventId::None,
            reason: Reason::None,
            shift: ShiftAccumulator::new(),
            debounce_timer: StateTimer::new(),
            stuck_timer: StateTimer::new(),
            parked: false,
        }
    }

    pub fn active(&self) -> Option<State> {
        self.active
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn shift_bits(&self) -> u8 {
        self.shift.bits()
    }

    pub fn is_parked(&self) -> bool {
        self.parked
    }
}

impl Default for InstanceRecord {
    fn default() -> Self {
        Self::new()
    }
}

/// One button's view of the machine for a single step: its own record plus
/// the shared collaborators.
pub(crate) struct Stepper<'a, B, C> {
    pub index: usize,
    pub record: &'a mut InstanceRecord,
    pub source: &'a mut B,
    pub clock: &'a C,
    pub config: &'a Config,
}

impl<B: BitSource, C: Clock> Machine for Stepper<'_, B, C> {
    type State = State;

    fn step(&mut self, state: State, event: Event) -> Option<Exit> {
        let phase = self.record.phase;
        trace!("button {}: {} {:?}", self.index, state.name(), phase);
        let (next, exit) = match phase {
            Phase::Entry => {
                self.enter(state, event);
                (Phase::Operate, None)
            }
            Phase::Operate if self.operate(state) => (Phase::Exit, None),
            Phase::Operate => (Phase::Operate, None),
            Phase::Exit => (Phase::Entry, Some(self.exit(state, event))),
        };
        self.record.phase = next;
        exit
    }
}

impl<B: BitSource, C: Clock> Stepper<'_, B, C> {
    fn enter(&mut self, state: State, event: Event) {
        let record = &mut *self.record;
        match state {
            State::Start | State::Stuck => {
                record.event = event.id;
            }
            State::Released => {}
            State::ConfirmPress | State::ConfirmRelease => {
                record.event = event.id;
                record.reason = Reason::None;
                record.shift.seed();
                record
                    .debounce_timer
                    .arm(self.clock, self.config.debounce_window);
            }
            State::Pressed => {
                record.event = event.id;
                record.reason = Reason::None;
                record.stuck_timer.arm(self.clock, self.config.stuck_timeout);
            }
        }
    }

    /// Returns true once the state is ready to exit.
    fn operate(&mut self, state: State) -> bool {
        match state {
            State::Start => true,
            State::Released => self.source.sample(self.index),
            State::ConfirmPress | State::ConfirmRelease => self.confirm(),
            State::Pressed => self.pressed(),
            State::Stuck => {
                let channel = match self.config.stuck_channel {
                    StuckChannel::First => 0,
                    StuckChannel::Own => self.index,
                };
                !self.source.sample(channel)
            }
        }
    }

    fn confirm(&mut self) -> bool {
        let sample = self.source.sample(self.index);
        let record = &mut *self.record;
        match record.shift.shift(sample) {
            Level::Low => {
                record.event = EventId::ButtonReleased;
                record.reason = Reason::Debounced;
            }
            Level::High => {
                record.event = EventId::ButtonPressed;
                record.reason = Reason::Debounced;
            }
            Level::Bouncing if record.debounce_timer.expired(self.clock) => {
                record.reason = Reason::Timeout;
            }
            Level::Bouncing => return false,
        }
        true
    }

    fn pressed(&mut self) -> bool {
        let sample = self.source.sample(self.index);
        let record = &mut *self.record;
        if !sample {
            record.reason = Reason::TwitchNoted;
        } else if record.stuck_timer.expired(self.clock) {
            record.reason = Reason::Timeout;
        } else {
            return false;
        }
        true
    }

    fn exit(&mut self, state: State, event: Event) -> Exit {
        let data = self.index as u32;
        let record = &*self.record;
        let (id, reason) = match state {
            State::Start => (record.event, Reason::None),
            // The tick that provoked the exit is passed through.
            State::Released => (event.id, Reason::TwitchNoted),
            State::ConfirmPress | State::ConfirmRelease | State::Pressed => {
                (record.event, record.reason)
            }
            State::Stuck => (record.event, Reason::ButtonUnstuck),
        };
        Exit {
            event: Event::new(id, data),
            reason,
        }
    }
}

/// Transition that does nothing. Kept in the table as a hook for tracing.
pub fn null_transition(event: Event, reason: Reason, _sink: &mut dyn EventSink) {
    trace!(
        "transition: event {:?}, button {}, reason {:?}",
        event.id,
        event.data,
        reason
    );
}

/// Tell the world about a qualified change on a button.
///
/// The outward event is derived from the exit reason; nothing is posted if
/// no valid event results. A failed post is dropped.
pub fn notify_state_change(event: Event, reason: Reason, sink: &mut dyn EventSink) {
    let id = match reason {
        Reason::Debounced => match event.id {
            EventId::ButtonPressed | EventId::ButtonReleased => event.id,
            _ => EventId::None,
        },
        Reason::Timeout => EventId::ButtonStuck,
        Reason::ButtonUnstuck => EventId::ButtonUnstuck,
        Reason::None | Reason::TwitchNoted => EventId::None,
    };
    if !id.is_valid() {
        return;
    }
    let notification = Event::new(id, event.data);
    if let Err(err) = sink.post(notification) {
        warn!("button {}: dropped {} ({})", event.data, id.name(), err);
    }
}

const fn row(
    from: State,
    event: EventId,
    reason: Reason,
    to: State,
    action: crate::sme::Action,
) -> Transition<State> {
    Transition {
        from,
        event,
        data_mask: 0xFF,
        reason,
        to,
        action,
    }
}

/// Button transition table, searched in order.
#[rustfmt::skip]
pub static TRANSITIONS: [Transition<State>; 11] = [
    row(State::Start, EventId::ButtonTask, Reason::None, State::Released, null_transition),
    row(State::Released, EventId::ButtonTask, Reason::TwitchNoted, State::ConfirmPress, null_transition),
    row(State::ConfirmPress, EventId::ButtonPressed, Reason::Debounced, State::Pressed, notify_state_change),
    // Settled back to open; nothing changed as far as the world knows.
    row(State::ConfirmPress, EventId::ButtonReleased, Reason::Debounced, State::Released, null_transition),
    row(State::ConfirmPress, EventId::ButtonTask, Reason::Timeout, State::Released, null_transition),
    row(State::Pressed, EventId::ButtonTask, Reason::TwitchNoted, State::ConfirmRelease, null_transition),
    row(State::Pressed, EventId::ButtonTask, Reason::Timeout, State::Stuck, notify_state_change),
    row(State::ConfirmRelease, EventId::ButtonReleased, Reason::Debounced, State::Released, notify_state_change),
    row(State::ConfirmRelease, EventId::ButtonPressed, Reason::Debounced, State::Pressed, null_transition),
    row(State::ConfirmRelease, EventId::ButtonTask, Reason::Timeout, State::Released, null_transition),
    // Straight back to released; a second confirmation would only add delay.
    row(State::Stuck, EventId::ButtonTask, Reason::ButtonUnstuck, State::Released, notify_state_change),
];
