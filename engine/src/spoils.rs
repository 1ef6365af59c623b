// ═══════════════════════════════════════════════════════════════════════
// Spoils — the shared pool and trade-in valuation
// ═══════════════════════════════════════════════════════════════════════

use crate::map::MapDef;
use crate::random::RandomSource;
use crate::types::{Spoil, SpoilColor};
use serde::{Deserialize, Serialize};

/// Bonus for one spoil of each color.
pub const RAINBOW_BONUS: u32 = 10;

/// Spoils not currently held by any player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpoilsPool {
    spoils: Vec<Spoil>,
}

impl SpoilsPool {
    /// One spoil per territory, colored red, green, blue, red, ... in map order.
    pub fn seed(map: &MapDef) -> Self {
        let spoils = map
            .territory_names()
            .zip(SpoilColor::ALL.iter().cycle())
            .map(|(territory, &color)| Spoil { territory: territory.to_string(), color })
            .collect();
        SpoilsPool { spoils }
    }

    pub fn len(&self) -> usize {
        self.spoils.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spoils.is_empty()
    }

    pub fn contains(&self, territory: &str) -> bool {
        self.spoils.iter().any(|s| s.territory == territory)
    }

    /// Remove and return a random spoil, or None if the pool is empty.
    pub fn take_random(&mut self, rng: &mut dyn RandomSource) -> Option<Spoil> {
        if self.spoils.is_empty() {
            return None;
        }
        let idx = rng.pick(self.spoils.len());
        Some(self.spoils.swap_remove(idx))
    }

    /// Remove the spoil naming `territory`, if it is in the pool.
    pub fn take(&mut self, territory: &str) -> Option<Spoil> {
        let idx = self.spoils.iter().position(|s| s.territory == territory)?;
        Some(self.spoils.swap_remove(idx))
    }

    /// Return a traded spoil to the pool.
    pub fn give_back(&mut self, spoil: Spoil) {
        self.spoils.push(spoil);
    }
}

/// Troop bonus for trading exactly these three colors, or None if they do
/// not form a set.
pub fn trade_bonus(colors: &[SpoilColor]) -> Option<u32> {
    let [a, b, c] = colors else {
        return None;
    };
    if a == b && b == c {
        Some(a.set_bonus())
    } else if a != b && b != c && a != c {
        Some(RAINBOW_BONUS)
    } else {
        None
    }
}

/// Whether some three spoils in `hand` form a valid set.
pub fn has_tradeable_set(hand: &[Spoil]) -> bool {
    let count = |color: SpoilColor| hand.iter().filter(|s| s.color == color).count();
    let counts = SpoilColor::ALL.map(count);
    counts.iter().any(|&n| n >= 3) || counts.iter().all(|&n| n >= 1)
}
