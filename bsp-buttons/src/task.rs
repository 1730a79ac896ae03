//! The button task: one state machine per button, all advanced by the same
//! periodic alarm.

use log::{error, trace};

use crate::config::{Config, HaltPolicy};
use crate::error::ButtonError;
use crate::event::{Event, EventId};
use crate::queue::{EventSink, Unassigned};
use crate::sme::dispatch;
use crate::source::BitSource;
use crate::states::{InstanceRecord, State, Stepper, TRANSITIONS};
use crate::timer::{Clock, Millis, TickAlarm};

/// Drives `N` button machines from a shared bit source and clock.
///
/// Each call to [`run`](Self::run) advances every button by exactly one
/// step, highest index first. Buttons never touch each other's records.
pub struct ButtonTask<B, C, Q, const N: usize> {
    config: Config,
    records: [InstanceRecord; N],
    source: B,
    clock: C,
    queue: Option<Q>,
    alarm: TickAlarm,
}

impl<B, C, Q, const N: usize> ButtonTask<B, C, Q, N>
where
    B: BitSource,
    C: Clock,
    Q: EventSink,
{
    pub fn new(config: Config, source: B, clock: C) -> Self {
        Self {
            records: core::array::from_fn(|_| InstanceRecord::new()),
            alarm: TickAlarm::new(config.tick_period),
            config,
            source,
            clock,
            queue: None,
        }
    }

    /// Assign the queue that receives button notifications, and the event
    /// the task alarm delivers when it expires.
    pub fn set_queue(&mut self, task_event: EventId, queue: Q) {
        self.queue = Some(queue);
        self.alarm.set_event(task_event);
    }

    /// Periodic entry point. Advances every button by one step.
    pub fn run(&mut self, event: Event, extra: u32) {
        trace!("button task: {:?} extra {}", event.id, extra);
        for index in (0..N).rev() {
            self.step_instance(index, event);
        }
    }

    /// Advance a single button by one step.
    pub fn advance(&mut self, event: Event) -> Result<Option<State>, ButtonError> {
        let index = event.instance();
        if index >= N {
            return Err(ButtonError::InvalidInstance { index, count: N });
        }
        Ok(self.step_instance(index, event))
    }

    /// Account for elapsed time on the task alarm; runs the task if it
    /// fired. Returns whether a tick was run.
    pub fn service(&mut self, elapsed: Millis) -> bool {
        match self.alarm.poll(elapsed) {
            Some(id) => {
                self.run(Event::new(id, 0), 0);
                true
            }
            None => false,
        }
    }

    /// Re-enable the alarm and unpark halted buttons. Buttons whose machine
    /// failed restart from `Start` on their next step.
    pub fn resume(&mut self) {
        self.alarm.enable();
        for record in &mut self.records {
            record.parked = false;
        }
    }

    fn step_instance(&mut self, index: usize, mut event: Event) -> Option<State> {
        let record = &mut self.records[index];
        if record.parked {
            return None;
        }
        let current = *record.active.get_or_insert(State::Start);
        event.data = index as u32;

        let mut unassigned = Unassigned;
        let sink: &mut dyn EventSink = match self.queue.as_mut() {
            Some(queue) => queue,
            None => &mut unassigned,
        };
        let mut machine = Stepper {
            index,
            record,
            source: &mut self.source,
            clock: &self.clock,
            config: &self.config,
        };
        let next = match dispatch(&TRANSITIONS, &mut machine, current, event, sink) {
            Ok(next) => Some(next),
            Err(err) => {
                error!("button {}: {}", index, err);
                None
            }
        };

        let record = &mut self.records[index];
        record.active = next;
        if next.is_none() {
            match self.config.halt_policy {
                HaltPolicy::StopAll => {
                    error!("button task halted");
                    self.alarm.disable();
                }
                HaltPolicy::StopInstance => record.parked = true,
            }
        }
        next
    }

    pub fn state(&self, index: usize) -> Option<State> {
        self.records.get(index).and_then(InstanceRecord::active)
    }

    pub fn records(&self) -> &[InstanceRecord; N] {
        &self.records
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn alarm(&self) -> &TickAlarm {
        &self.alarm
    }

    pub fn queue(&self) -> Option<&Q> {
        self.queue.as_ref()
    }

    pub fn queue_mut(&mut self) -> Option<&mut Q> {
        self.queue.as_mut()
    }

    pub fn source(&self) -> &B {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut B {
        &mut self.source
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}
