// ═══════════════════════════════════════════════════════════════════════
// Randomness — every die, shuffle and random pick goes through here
// so games can be replayed from a seed or scripted in tests.
// ═══════════════════════════════════════════════════════════════════════

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;

pub trait RandomSource: Send {
    /// One six-sided die, 1..=6.
    fn roll_die(&mut self) -> u8;

    /// Uniform index in `0..len`. `len` is never zero.
    fn pick(&mut self, len: usize) -> usize;

    /// Shuffle territory names in place.
    fn shuffle(&mut self, names: &mut [String]);
}

/// Deterministic source seeded from a `u64`.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: ChaCha8Rng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        SeededRandom { rng: ChaCha8Rng::seed_from_u64(seed) }
    }
}

impl RandomSource for SeededRandom {
    fn roll_die(&mut self) -> u8 {
        self.rng.gen_range(1..=6)
    }

    fn pick(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    fn shuffle(&mut self, names: &mut [String]) {
        names.shuffle(&mut self.rng);
    }
}

/// Replays queued dice and picks, then falls back to a seeded source.
/// Shuffles are left as identity so territory assignment follows map order.
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    dice: VecDeque<u8>,
    picks: VecDeque<usize>,
    fallback: SeededRandom,
}

impl ScriptedRandom {
    pub fn new(seed: u64) -> Self {
        ScriptedRandom {
            dice: VecDeque::new(),
            picks: VecDeque::new(),
            fallback: SeededRandom::new(seed),
        }
    }

    /// Queue die faces, consumed in order.
    pub fn with_dice(mut self, dice: &[u8]) -> Self {
        self.dice.extend(dice.iter().copied());
        self
    }

    /// Queue picks, consumed in order. Each is reduced modulo the range.
    pub fn with_picks(mut self, picks: &[usize]) -> Self {
        self.picks.extend(picks.iter().copied());
        self
    }

    pub fn push_dice(&mut self, dice: &[u8]) {
        self.dice.extend(dice.iter().copied());
    }

    pub fn push_picks(&mut self, picks: &[usize]) {
        self.picks.extend(picks.iter().copied());
    }
}

impl RandomSource for ScriptedRandom {
    fn roll_die(&mut self) -> u8 {
        match self.dice.pop_front() {
            Some(d) => d.clamp(1, 6),
            None => self.fallback.roll_die(),
        }
    }

    fn pick(&mut self, len: usize) -> usize {
        match self.picks.pop_front() {
            Some(p) => p % len,
            None => self.fallback.pick(len),
        }
    }

    fn shuffle(&mut self, _names: &mut [String]) {}
}
