//! Text placement over time
//!
//! A reading that never moves burns into an OLED panel. [`Jiggle`] decides
//! when the text should jump to a new spot and [`XorShift32`] picks it.

use crate::config::JiggleConfig;

/// Small xorshift generator, good enough for picking screen positions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XorShift32 {
    state: u32,
}

impl XorShift32 {
    /// Seed the generator; a zero seed is replaced by a fixed constant
    pub const fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 0x9E37_79B9 } else { seed },
        }
    }

    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Value in `0..n`, or 0 when `n` is 0
    pub fn below(&mut self, n: u32) -> u32 {
        if n == 0 {
            return 0;
        }
        self.next_u32() % n
    }
}

/// Fold sampled noise bits into a seed
///
/// Each sample toggles one of the low 24 bits, cycling through them.
pub fn fold_seed(base: u32, samples: impl IntoIterator<Item = bool>) -> u32 {
    samples
        .into_iter()
        .enumerate()
        .fold(base, |seed, (i, bit)| seed ^ (u32::from(bit) << (i % 24)))
}

/// Decides when static text moves
#[derive(Debug, Clone, Copy)]
pub struct Jiggle {
    config: JiggleConfig,
    last_check_ms: u64,
    counter: u8,
}

impl Jiggle {
    pub fn new(config: JiggleConfig, now_ms: u64) -> Self {
        Self {
            config,
            last_check_ms: now_ms,
            counter: 0,
        }
    }

    /// Advance the clock; true when the text should move now
    ///
    /// One check happens per elapsed interval, and every `stride` checks
    /// the text moves. A stride of 0 never moves.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        if now_ms.saturating_sub(self.last_check_ms) < u64::from(self.config.interval_ms) {
            return false;
        }
        self.last_check_ms = now_ms;

        if self.config.stride == 0 {
            return false;
        }
        self.counter = self.counter.saturating_add(1);
        if self.counter >= self.config.stride {
            self.counter = 0;
            return true;
        }
        false
    }
}
