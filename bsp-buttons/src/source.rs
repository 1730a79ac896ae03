//! Raw input bit sources.
//!
//! The button states consume one sample per operate step. On hardware the
//! sample is a pin read; in simulation it comes from a per-button backlog of
//! scripted bits.

/// Per-button source of raw samples.
pub trait BitSource {
    /// Next raw sample for button `index`. `true` means contact closed.
    fn sample(&mut self, index: usize) -> bool;
}

impl<T: BitSource + ?Sized> BitSource for &mut T {
    fn sample(&mut self, index: usize) -> bool {
        (**self).sample(index)
    }
}

/// Press pattern: a short bounce, then eight closed samples.
pub const CLEAN_PRESS: u64 = 0xFF9;
/// Release pattern: the 12-bit complement of [`CLEAN_PRESS`].
pub const CLEAN_RELEASE: u64 = !CLEAN_PRESS & PATTERN_MASK;

const PATTERN_BITS: u32 = 12;
const PATTERN_MASK: u64 = (1 << PATTERN_BITS) - 1;

/// Simulated buttons backed by queued bit patterns.
///
/// Bits are consumed LSB-first. When a button's backlog runs dry the source
/// reports the button's latched level (set by the last press or release).
#[derive(Debug, Clone)]
pub struct PatternSource<const N: usize> {
    backlog: [u64; N],
    latched: [bool; N],
}

impl<const N: usize> PatternSource<N> {
    pub const fn new() -> Self {
        Self {
            backlog: [0; N],
            latched: [false; N],
        }
    }

    /// Queue a bouncy press and latch the button closed.
    pub fn press(&mut self, index: usize) {
        self.append(index, CLEAN_PRESS);
        self.latched[index] = true;
    }

    /// Queue a bouncy release and latch the button open.
    pub fn release(&mut self, index: usize) {
        self.append(index, CLEAN_RELEASE);
        self.latched[index] = false;
    }

    /// Replace the backlog with raw bits, LSB first. The latched level is
    /// left alone.
    pub fn load(&mut self, index: usize, bits: u64) {
        self.backlog[index] = bits;
    }

    /// Set the level reported once the backlog is empty.
    pub fn latch(&mut self, index: usize, level: bool) {
        self.latched[index] = level;
    }

    pub fn is_latched(&self, index: usize) -> bool {
        self.latched[index]
    }

    pub fn backlog(&self, index: usize) -> u64 {
        self.backlog[index]
    }

    // A pending backlog gets the new pattern stacked on top, one pattern
    // width up. Appending to a long backlog overflows and wraps.
    fn append(&mut self, index: usize, pattern: u64) {
        let slot = &mut self.backlog[index];
        *slot = if *slot == 0 {
            pattern
        } else {
            slot.wrapping_add(pattern << PATTERN_BITS)
        };
    }
}

impl<const N: usize> Default for PatternSource<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> BitSource for PatternSource<N> {
    fn sample(&mut self, index: usize) -> bool {
        let slot = &mut self.backlog[index];
        let bit = *slot & 1 != 0;
        *slot >>= 1;
        if !bit && *slot == 0 {
            // Either a genuine zero or an exhausted stream; the latch decides.
            return self.latched[index];
        }
        bit
    }
}

/// Fixed level on every channel.
#[derive(Debug, Clone, Copy)]
pub struct Constant(pub bool);

impl BitSource for Constant {
    fn sample(&mut self, _index: usize) -> bool {
        self.0
    }
}

/// Samples produced by a closure. Handy for scripted test inputs.
#[cfg(test)]
pub(crate) struct FnSource<F>(pub F);

#[cfg(test)]
impl<F: FnMut(usize) -> bool> BitSource for FnSource<F> {
    fn sample(&mut self, index: usize) -> bool {
        (self.0)(index)
    }
}
