//! Shift-register debounce.
//!
//! Every sample is shifted into an 8-bit history, newest bit in position 0.
//! The input is qualified once the whole history agrees: all ones is a
//! press, all zeros a release. Anything in between is still bouncing.

/// Outcome of shifting one sample into the accumulator.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Level {
    /// History is all ones.
    High,
    /// History is all zeros.
    Low,
    /// Mixed history, keep sampling.
    Bouncing,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct ShiftAccumulator {
    bits: u8,
}

impl ShiftAccumulator {
    pub const fn new() -> Self {
        Self { bits: 0 }
    }

    /// Reset the history for a fresh confirmation.
    ///
    /// The history is seeded with a single `1`, standing in for the twitch
    /// that led here. A press then needs 7 more ones, while a release needs
    /// 8 zeros to flush the seed.
    pub fn seed(&mut self) {
        self.bits = 1;
    }

    pub fn shift(&mut self, sample: bool) -> Level {
        self.bits = (self.bits << 1) | u8::from(sample);
        match self.bits {
            u8::MAX => Level::High,
            0 => Level::Low,
            _ => Level::Bouncing,
        }
    }

    pub fn bits(&self) -> u8 {
        self.bits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_after_seven_ones_past_seed() {
        let mut acc = ShiftAccumulator::new();
        acc.seed();
        for _ in 0..6 {
            assert_eq!(acc.shift(true), Level::Bouncing);
        }
        assert_eq!(acc.shift(true), Level::High);
        assert_eq!(acc.bits(), 0xFF);
    }

    #[test]
    fn release_after_eight_zeros_past_seed() {
        let mut acc = ShiftAccumulator::new();
        acc.seed();
        for _ in 0..7 {
            assert_eq!(acc.shift(false), Level::Bouncing);
        }
        assert_eq!(acc.shift(false), Level::Low);
    }

    #[test]
    fn newest_bit_lands_in_position_zero() {
        let mut acc = ShiftAccumulator::new();
        acc.seed();
        acc.shift(false);
        acc.shift(true);
        assert_eq!(acc.bits(), 0b101);
    }

    #[test]
    fn bouncing_input_never_qualifies() {
        let mut acc = ShiftAccumulator::new();
        acc.seed();
        for i in 0..64 {
            assert_eq!(acc.shift(i % 3 != 0), Level::Bouncing);
        }
    }

    #[test]
    fn history_keeps_only_eight_bits() {
        let mut acc = ShiftAccumulator::new();
        acc.seed();
        for _ in 0..7 {
            acc.shift(true);
        }
        // A single zero breaks the run; eight more ones are needed.
        assert_eq!(acc.shift(false), Level::Bouncing);
        for _ in 0..7 {
            assert_eq!(acc.shift(true), Level::Bouncing);
        }
        assert_eq!(acc.shift(true), Level::High);
    }
}
