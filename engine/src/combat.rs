// ═══════════════════════════════════════════════════════════════════════
// Combat resolver — dice counts, rolls and pairwise loss comparison
// ═══════════════════════════════════════════════════════════════════════

use crate::random::RandomSource;
use serde::{Deserialize, Serialize};

pub const MAX_ATTACKER_DICE: u32 = 3;
pub const MAX_DEFENDER_DICE: u32 = 2;

/// Dice thrown and troops lost in one attack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatOutcome {
    /// Sorted highest first.
    pub attacker_dice: Vec<u8>,
    /// Sorted highest first.
    pub defender_dice: Vec<u8>,
    pub attacker_losses: u32,
    pub defender_losses: u32,
}

/// One troop always stays behind, so an attacker needs at least 2.
pub fn attacker_dice_count(from_troops: u32) -> u32 {
    from_troops.saturating_sub(1).min(MAX_ATTACKER_DICE)
}

pub fn defender_dice_count(to_troops: u32) -> u32 {
    to_troops.min(MAX_DEFENDER_DICE)
}

/// Roll `count` dice, highest first.
pub fn roll(rng: &mut dyn RandomSource, count: u32) -> Vec<u8> {
    let mut dice: Vec<u8> = (0..count).map(|_| rng.roll_die()).collect();
    dice.sort_unstable_by(|a, b| b.cmp(a));
    dice
}

/// Compare dice pairwise, highest against highest. Ties go to the defender
/// and unpaired dice do nothing. Returns (attacker losses, defender losses).
pub fn compare(attacker_dice: &[u8], defender_dice: &[u8]) -> (u32, u32) {
    let mut attacker = attacker_dice.to_vec();
    let mut defender = defender_dice.to_vec();
    attacker.sort_unstable_by(|a, b| b.cmp(a));
    defender.sort_unstable_by(|a, b| b.cmp(a));

    let mut attacker_losses = 0;
    let mut defender_losses = 0;
    for (a, d) in attacker.iter().zip(defender.iter()) {
        if a > d {
            defender_losses += 1;
        } else {
            attacker_losses += 1;
        }
    }
    (attacker_losses, defender_losses)
}

/// Resolve one attack from a territory holding `from_troops` against one
/// holding `to_troops`.
pub fn resolve(rng: &mut dyn RandomSource, from_troops: u32, to_troops: u32) -> CombatOutcome {
    let attacker_dice = roll(rng, attacker_dice_count(from_troops));
    let defender_dice = roll(rng, defender_dice_count(to_troops));
    let (attacker_losses, defender_losses) = compare(&attacker_dice, &defender_dice);
    CombatOutcome { attacker_dice, defender_dice, attacker_losses, defender_losses }
}
