//! Timing calibration and policy switches for the button task.

use crate::timer::Millis;

/// Period of the task alarm that drives every button machine.
pub const TICK_PERIOD: Millis = 10;

/// How long a confirm state may accumulate bits before giving up.
/// Long enough to read 60 bits at the default tick rate.
pub const DEBOUNCE_WINDOW: Millis = 500 + 100;

/// How long a button may stay pressed before it is reported stuck.
pub const STUCK_TIMEOUT: Millis = 1000 * 30;

/// What the driver does when a button machine reaches a state with no
/// matching transition.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum HaltPolicy {
    /// Disable the task alarm, halting every button. This is the board's
    /// historical behavior.
    #[default]
    StopAll,
    /// Park only the failed button; the others keep running.
    StopInstance,
}

/// Which input channel the stuck state samples to detect release.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum StuckChannel {
    /// Always channel 0, regardless of which button is stuck. This matches
    /// the board's historical behavior and is suspected to be a defect.
    #[default]
    First,
    /// The stuck button's own channel.
    Own,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Config {
    pub tick_period: Millis,
    pub debounce_window: Millis,
    pub stuck_timeout: Millis,
    pub halt_policy: HaltPolicy,
    pub stuck_channel: StuckChannel,
}

impl Config {
    pub const fn new() -> Self {
        Self {
            tick_period: TICK_PERIOD,
            debounce_window: DEBOUNCE_WINDOW,
            stuck_timeout: STUCK_TIMEOUT,
            halt_policy: HaltPolicy::StopAll,
            stuck_channel: StuckChannel::First,
        }
    }

    pub const fn with_tick_period(mut self, period: Millis) -> Self {
        self.tick_period = period;
        self
    }

    pub const fn with_debounce_window(mut self, window: Millis) -> Self {
        self.debounce_window = window;
        self
    }

    pub const fn with_stuck_timeout(mut self, timeout: Millis) -> Self {
        self.stuck_timeout = timeout;
        self
    }

    pub const fn with_halt_policy(mut self, policy: HaltPolicy) -> Self {
        self.halt_policy = policy;
        self
    }

    pub const fn with_stuck_channel(mut self, channel: StuckChannel) -> Self {
        self.stuck_channel = channel;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_board_calibration() {
        let config = Config::default();
        assert_eq!(config.tick_period, 10);
        assert_eq!(config.debounce_window, 600);
        assert_eq!(config.stuck_timeout, 30_000);
        assert_eq!(config.halt_policy, HaltPolicy::StopAll);
        assert_eq!(config.stuck_channel, StuckChannel::First);
    }

    #[test]
    fn builders_override_fields() {
        let config = Config::new()
            .with_stuck_timeout(50)
            .with_halt_policy(HaltPolicy::StopInstance)
            .with_stuck_channel(StuckChannel::Own);
        assert_eq!(config.stuck_timeout, 50);
        assert_eq!(config.debounce_window, DEBOUNCE_WINDOW);
        assert_eq!(config.halt_policy, HaltPolicy::StopInstance);
        assert_eq!(config.stuck_channel, StuckChannel::Own);
    }
}
