//! Host-side board simulation: feeds a script into the button task and
//! records what comes out.

use bsp_buttons::{
    ButtonTask, Config, Event, EventId, EventQueue, ManualClock, Millis, PatternSource, State,
    NUM_BUTTONS,
};
use indicatif::ProgressBar;

use crate::script::{ActionKind, Script};

/// Room for a few ticks' worth of notifications; drained after every tick.
const QUEUE_DEPTH: usize = 16;

type Board<'c> =
    ButtonTask<PatternSource<NUM_BUTTONS>, &'c ManualClock, EventQueue<QUEUE_DEPTH>, NUM_BUTTONS>;

/// A notification posted by the button task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notification {
    pub at: Millis,
    pub event: Event,
}

/// Every button's state right after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub at: Millis,
    pub states: [Option<State>; NUM_BUTTONS],
}

#[derive(Debug, Default)]
pub struct Outcome {
    pub notifications: Vec<Notification>,
    pub timeline: Vec<Snapshot>,
    pub ticks: u64,
    /// Time at which the task alarm was disabled, if it was.
    pub halted_at: Option<Millis>,
}

/// Run `script` millisecond by millisecond until its end time or until the
/// task halts.
pub fn simulate(script: &Script, config: Config, progress: Option<&ProgressBar>) -> Outcome {
    let clock = ManualClock::new();
    let mut task: Board<'_> = ButtonTask::new(config, PatternSource::new(), &clock);
    task.set_queue(EventId::ButtonTask, EventQueue::new());

    let mut outcome = Outcome::default();
    let mut pending = script.actions.iter().peekable();

    for now in 0..=script.end {
        while let Some(action) = pending.next_if(|a| a.at <= now) {
            let source = task.source_mut();
            match action.kind {
                ActionKind::Press => source.press(action.button),
                ActionKind::Release => source.release(action.button),
                ActionKind::Noise(bits) => source.load(action.button, bits),
            }
            log::debug!("{} ms: button {} {:?}", now, action.button, action.kind);
        }

        clock.advance(1);
        if !task.service(1) {
            continue;
        }
        outcome.ticks += 1;
        if let Some(bar) = progress {
            bar.set_position(u64::from(now));
        }

        record(&mut task, now, &mut outcome);

        if !task.alarm().is_enabled() {
            log::error!("button task halted at {} ms", now);
            outcome.halted_at = Some(now);
            break;
        }
    }

    outcome
}

fn record(task: &mut Board<'_>, now: Millis, outcome: &mut Outcome) {
    if let Some(queue) = task.queue_mut() {
        outcome
            .notifications
            .extend(queue.drain().map(|event| Notification { at: now, event }));
    }
    outcome.timeline.push(Snapshot {
        at: now,
        states: core::array::from_fn(|index| task.state(index)),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::parse_script;

    fn events(outcome: &Outcome) -> Vec<(EventId, u32)> {
        outcome
            .notifications
            .iter()
            .map(|n| (n.event.id, n.event.data))
            .collect()
    }

    #[test]
    fn test_press_and_release() {
        let script = parse_script("@0 press 2\n@1000 release 2\n@2000 end\n").unwrap();
        let outcome = simulate(&script, Config::default(), None);
        assert_eq!(
            events(&outcome),
            vec![(EventId::ButtonPressed, 2), (EventId::ButtonReleased, 2)]
        );
        assert_eq!(outcome.halted_at, None);
        assert_eq!(outcome.ticks, 200);
    }

    #[test]
    fn test_notifications_are_time_stamped() {
        let script = parse_script("@0 press 0\n@500 end\n").unwrap();
        let outcome = simulate(&script, Config::default(), None);
        let pressed = outcome.notifications[0];
        assert_eq!(pressed.event.id, EventId::ButtonPressed);
        assert!(pressed.at > 0 && pressed.at < 500);
    }

    #[test]
    fn test_stuck_button() {
        let config = Config::default()
            .with_stuck_timeout(300)
            .with_stuck_channel(bsp_buttons::StuckChannel::Own);
        let script = parse_script("@0 press 1\n@1000 end\n").unwrap();
        let outcome = simulate(&script, config, None);
        assert_eq!(
            events(&outcome),
            vec![(EventId::ButtonPressed, 1), (EventId::ButtonStuck, 1)]
        );
        let last = outcome.timeline.last().unwrap();
        assert_eq!(last.states[1], Some(State::Stuck));
        assert_eq!(last.states[0], Some(State::Released));
    }

    #[test]
    fn test_noise_alone_never_presses() {
        let script = parse_script("@0 noise 4 0x5555555555555555\n@1500 end\n").unwrap();
        let outcome = simulate(&script, Config::default(), None);
        assert!(outcome.notifications.is_empty());
    }
}
