//! Clock, per-state timers and the periodic alarm that drives the task.

use core::cell::Cell;

use crate::event::EventId;

/// Milliseconds on the board's monotonic clock.
pub type Millis = u32;

/// Monotonic time source.
pub trait Clock {
    fn now(&self) -> Millis;
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now(&self) -> Millis {
        (**self).now()
    }
}

/// A clock advanced explicitly by its owner, e.g. a systick handler or the
/// host simulator.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Millis>,
}

impl ManualClock {
    pub const fn new() -> Self {
        Self { now: Cell::new(0) }
    }

    pub fn advance(&self, ms: Millis) {
        self.now.set(self.now.get().wrapping_add(ms));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Millis {
        self.now.get()
    }
}

/// One-shot timer owned by a single state of a single button.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct StateTimer {
    armed_at: Millis,
    duration: Millis,
}

impl StateTimer {
    pub const fn new() -> Self {
        Self {
            armed_at: 0,
            duration: 0,
        }
    }

    pub fn arm(&mut self, clock: &impl Clock, duration: Millis) {
        self.armed_at = clock.now();
        self.duration = duration;
    }

    pub fn expired(&self, clock: &impl Clock) -> bool {
        clock.now().wrapping_sub(self.armed_at) >= self.duration
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AlarmState {
    Enabled,
    Disabled,
}

/// Reloading software alarm. Fires its event every `reload` milliseconds
/// while enabled and once an event id has been assigned.
#[derive(Debug, Clone)]
pub struct TickAlarm {
    remaining: Millis,
    reload: Millis,
    event: Option<EventId>,
    state: AlarmState,
}

impl TickAlarm {
    pub const fn new(period: Millis) -> Self {
        Self {
            remaining: period,
            reload: period,
            event: None,
            state: AlarmState::Enabled,
        }
    }

    pub fn set_event(&mut self, event: EventId) {
        self.event = Some(event);
    }

    pub fn event(&self) -> Option<EventId> {
        self.event
    }

    pub fn enable(&mut self) {
        self.state = AlarmState::Enabled;
    }

    pub fn disable(&mut self) {
        self.state = AlarmState::Disabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.state == AlarmState::Enabled
    }

    /// Account for `elapsed` milliseconds. Returns the event to deliver if
    /// the alarm expired; the countdown then reloads, minus any overshoot.
    /// One call fires at most once, however many periods `elapsed` spans.
    pub fn poll(&mut self, elapsed: Millis) -> Option<EventId> {
        if !self.is_enabled() {
            return None;
        }
        if elapsed < self.remaining {
            self.remaining -= elapsed;
            return None;
        }
        let overshoot = elapsed - self.remaining;
        self.remaining = match overshoot.checked_rem(self.reload) {
            Some(carry) => self.reload - carry,
            None => 0,
        };
        self.event
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_timer_expires_after_duration() {
        let clock = ManualClock::new();
        let mut timer = StateTimer::new();
        timer.arm(&clock, 30);
        clock.advance(20);
        assert!(!timer.expired(&clock));
        clock.advance(10);
        assert!(timer.expired(&clock));
    }

    #[test]
    fn state_timer_survives_clock_wrap() {
        let clock = ManualClock::new();
        clock.advance(Millis::MAX - 5);
        let mut timer = StateTimer::new();
        timer.arm(&clock, 10);
        clock.advance(8);
        assert!(!timer.expired(&clock));
        clock.advance(2);
        assert!(timer.expired(&clock));
    }

    #[test]
    fn alarm_fires_every_period() {
        let mut alarm = TickAlarm::new(10);
        alarm.set_event(EventId::ButtonTask);
        let fired = (0..35).filter(|_| alarm.poll(1).is_some()).count();
        assert_eq!(fired, 3);
    }

    #[test]
    fn alarm_carries_overshoot_into_next_period() {
        let mut alarm = TickAlarm::new(10);
        alarm.set_event(EventId::ButtonTask);
        assert_eq!(alarm.poll(25), Some(EventId::ButtonTask));
        assert_eq!(alarm.poll(4), None);
        assert_eq!(alarm.poll(1), Some(EventId::ButtonTask));
        assert_eq!(alarm.poll(9), None);
        assert_eq!(alarm.poll(1), Some(EventId::ButtonTask));
    }

    #[test]
    fn alarm_is_silent_without_event_or_when_disabled() {
        let mut alarm = TickAlarm::new(10);
        assert_eq!(alarm.poll(10), None);

        alarm.set_event(EventId::ButtonTask);
        alarm.disable();
        assert_eq!(alarm.poll(10), None);

        alarm.enable();
        assert_eq!(alarm.poll(10), Some(EventId::ButtonTask));
    }
}
