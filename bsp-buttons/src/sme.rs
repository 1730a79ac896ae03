//! Table-driven state machine engine.
//!
//! A machine is a set of states, each stepped one phase per call. When a
//! state reports an exit, the engine picks the first transition row whose
//! key matches the exit outputs, runs the row's action and hands back the
//! next state.

use core::fmt::Debug;

use crate::error::NoTransition;
use crate::event::{Event, EventId, Reason};
use crate::queue::EventSink;

/// Side effect run when a transition is taken.
pub type Action = fn(Event, Reason, &mut dyn EventSink);

/// One row of a transition table.
#[derive(Debug, Clone, Copy)]
pub struct Transition<S> {
    pub from: S,
    pub event: EventId,
    /// Event data must fit inside this mask for the row to match.
    pub data_mask: u32,
    pub reason: Reason,
    pub to: S,
    pub action: Action,
}

impl<S: PartialEq> Transition<S> {
    fn matches(&self, state: &S, exit: &Exit) -> bool {
        self.from == *state
            && self.event == exit.event.id
            && exit.event.data & !self.data_mask == 0
            && self.reason == exit.reason
    }
}

/// What a state reports when it leaves.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Exit {
    pub event: Event,
    pub reason: Reason,
}

/// A machine whose states can be stepped one phase at a time.
pub trait Machine {
    type State: Copy + PartialEq + Debug;

    /// Run one phase of `state`. Returns the exit outputs once the state's
    /// exit phase has run.
    fn step(&mut self, state: Self::State, event: Event) -> Option<Exit>;
}

/// Step `current` once and apply the transition table if it exited.
pub fn dispatch<M: Machine>(
    table: &[Transition<M::State>],
    machine: &mut M,
    current: M::State,
    event: Event,
    sink: &mut dyn EventSink,
) -> Result<M::State, NoTransition<M::State>> {
    let Some(exit) = machine.step(current, event) else {
        return Ok(current);
    };

    let row = table
        .iter()
        .find(|row| row.matches(&current, &exit))
        .ok_or(NoTransition {
            state: current,
            event: exit.event.id,
            data: exit.event.data,
            reason: exit.reason,
        })?;

    log::debug!(
        "button {}: {:?} -> {:?} ({:?}/{:?})",
        exit.event.data,
        current,
        row.to,
        exit.event.id,
        exit.reason
    );
    (row.action)(exit.event, exit.reason, sink);
    Ok(row.to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::EventQueue;

    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    enum Light {
        Off,
        On,
    }

    /// Exits on every call with a fixed reason.
    struct Toggle {
        reason: Reason,
        calls: usize,
    }

    impl Machine for Toggle {
        type State = Light;

        fn step(&mut self, _state: Light, event: Event) -> Option<Exit> {
            self.calls += 1;
            (self.calls % 2 == 0).then_some(Exit {
                event,
                reason: self.reason,
            })
        }
    }

    fn post_id(event: Event, _reason: Reason, sink: &mut dyn EventSink) {
        let _ = sink.post(event);
    }

    fn ignore(_event: Event, _reason: Reason, _sink: &mut dyn EventSink) {}

    const TABLE: [Transition<Light>; 3] = [
        Transition {
            from: Light::Off,
            event: EventId::ButtonTask,
            data_mask: 0xFF,
            reason: Reason::TwitchNoted,
            to: Light::On,
            action: post_id,
        },
        Transition {
            from: Light::Off,
            event: EventId::ButtonTask,
            data_mask: 0xFF,
            reason: Reason::TwitchNoted,
            to: Light::Off,
            action: ignore,
        },
        Transition {
            from: Light::On,
            event: EventId::ButtonTask,
            data_mask: 0xFF,
            reason: Reason::TwitchNoted,
            to: Light::Off,
            action: ignore,
        },
    ];

    #[test]
    fn state_kept_until_exit() {
        let mut machine = Toggle {
            reason: Reason::TwitchNoted,
            calls: 0,
        };
        let mut queue = EventQueue::<4>::new();
        let next = dispatch(&TABLE, &mut machine, Light::Off, Event::task(), &mut queue);
        assert_eq!(next, Ok(Light::Off));
        assert!(queue.is_empty());
    }

    #[test]
    fn first_matching_row_wins() {
        let mut machine = Toggle {
            reason: Reason::TwitchNoted,
            calls: 1,
        };
        let mut queue = EventQueue::<4>::new();
        let next = dispatch(&TABLE, &mut machine, Light::Off, Event::task(), &mut queue);
        assert_eq!(next, Ok(Light::On));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn unmatched_exit_is_reported() {
        let mut machine = Toggle {
            reason: Reason::Timeout,
            calls: 1,
        };
        let mut queue = EventQueue::<4>::new();
        let err = dispatch(&TABLE, &mut machine, Light::On, Event::task(), &mut queue)
            .unwrap_err();
        assert_eq!(err.state, Light::On);
        assert_eq!(err.reason, Reason::Timeout);
    }

    #[test]
    fn data_outside_mask_does_not_match() {
        let mut machine = Toggle {
            reason: Reason::TwitchNoted,
            calls: 1,
        };
        let mut queue = EventQueue::<4>::new();
        let event = Event::new(EventId::ButtonTask, 0x100);
        assert!(dispatch(&TABLE, &mut machine, Light::Off, event, &mut queue).is_err());
    }
}
