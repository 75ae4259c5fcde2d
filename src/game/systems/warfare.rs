//! Battle resolution
//!
//! A skirmish is a single weighted roll: side A wins with probability
//! `a / (a + b)`. The winner inflicts a random casualty count on the loser and
//! pays a fraction of it in attrition. Resolution is pure; applying the
//! outcome to the world is the caller's job.

use serde::{Deserialize, Serialize};

use crate::core::config::BattleConfig;
use crate::core::dice::Dice;
use crate::core::types::Owner;
use crate::game::events::PeaceReason;

/// One side of a battle as seen at the moment it is fought
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Combatant {
    pub owner: Owner,
    pub military: u32,
    pub territories: usize,
}

/// Chance that a side with strength `a` beats one with strength `b`
pub fn win_probability(a: u32, b: u32) -> f64 {
    let total = a as f64 + b as f64;
    if total == 0.0 {
        0.5
    } else {
        a as f64 / total
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Skirmish {
    pub winner: Owner,
    pub loser: Owner,
    /// Units lost by side A and side B
    pub losses: (u32, u32),
    /// Military of both sides after the battle
    pub remaining: (u32, u32),
    /// Winner takes one territory from the loser
    pub capture: bool,
    /// Treasury hit when the player lost
    pub war_cost: Option<i64>,
}

pub fn resolve_skirmish(a: &Combatant, b: &Combatant, config: &BattleConfig, dice: &mut impl Dice) -> Skirmish {
    let p = win_probability(a.military, b.military);
    let a_wins = dice.roll() < p;

    let (a_loss, b_loss) = if a_wins {
        let c = dice.between(config.winner_casualties.min, config.winner_casualties.max) as u32;
        (c / config.winner_attrition_divisor, c)
    } else {
        let c = dice.between(config.loser_casualties.min, config.loser_casualties.max) as u32;
        (c, c / config.loser_attrition_divisor)
    };

    let (winner, loser) = if a_wins { (a, b) } else { (b, a) };
    let capture = loser.territories > 0 && dice.chance(config.capture_chance);

    let war_cost = (loser.owner == Owner::Player)
        .then(|| dice.between(config.war_cost.min, config.war_cost.max));

    Skirmish {
        winner: winner.owner,
        loser: loser.owner,
        losses: (a_loss, b_loss),
        remaining: (a.military.saturating_sub(a_loss), b.military.saturating_sub(b_loss)),
        capture,
        war_cost,
    }
}

/// How a war ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WarEnd {
    /// The side that could no longer fight
    pub broken: Owner,
    pub reason: PeaceReason,
}

/// Check both sides after a battle. Side A is checked first.
///
/// A side under the minimum viable military ends the war: with no
/// territories left it is defeated, otherwise it is forced into peace.
pub fn check_war_end(a: &Combatant, b: &Combatant, config: &BattleConfig) -> Option<WarEnd> {
    [a, b].into_iter().find(|side| side.military < config.min_viable_military).map(|side| WarEnd {
        broken: side.owner,
        reason: if side.territories == 0 {
            PeaceReason::Defeat
        } else {
            PeaceReason::ForcedPeace
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dice::ScriptedDice;
    use crate::core::types::NationId;

    const AI: Owner = Owner::Nation(NationId(0));

    fn side(owner: Owner, military: u32, territories: usize) -> Combatant {
        Combatant { owner, military, territories }
    }

    #[test]
    fn test_win_probability() {
        assert_eq!(win_probability(100, 25), 0.8);
        assert_eq!(win_probability(0, 0), 0.5);
        assert_eq!(win_probability(0, 10), 0.0);
    }

    #[test]
    fn test_stronger_side_wins_on_middle_roll() {
        // roll 0.5 < 0.8, casualties roll 0.0 -> 3, capture roll fails
        let mut dice = ScriptedDice::new([0.5, 0.0, 0.9]);
        let result = resolve_skirmish(
            &side(Owner::Player, 100, 1),
            &side(AI, 25, 2),
            &BattleConfig::default(),
            &mut dice,
        );
        assert_eq!(result.winner, Owner::Player);
        assert_eq!(result.losses, (1, 3));
        assert_eq!(result.remaining, (99, 22));
        assert!(!result.capture);
        assert_eq!(result.war_cost, None);
    }

    #[test]
    fn test_player_defeat_costs_money() {
        // roll 0.9 >= 0.5, casualties 0.999 -> 12, capture roll 0.1 succeeds, cost 0.0 -> 200
        let mut dice = ScriptedDice::new([0.9, 0.999, 0.1, 0.0]);
        let result = resolve_skirmish(
            &side(Owner::Player, 20, 2),
            &side(AI, 20, 1),
            &BattleConfig::default(),
            &mut dice,
        );
        assert_eq!(result.winner, AI);
        assert_eq!(result.losses, (12, 4));
        assert!(result.capture);
        assert_eq!(result.war_cost, Some(200));
    }

    #[test]
    fn test_no_capture_roll_without_territories() {
        let mut dice = ScriptedDice::new([0.0, 0.0]);
        let result = resolve_skirmish(&side(AI, 50, 1), &side(Owner::Player, 10, 0), &BattleConfig::default(), &mut dice);
        assert!(!result.capture);
        // battle, casualties, war cost
        assert_eq!(dice.rolls_taken(), 3);
    }

    #[test]
    fn test_casualties_saturate() {
        let mut dice = ScriptedDice::new([0.0, 0.999]);
        let result = resolve_skirmish(&side(Owner::Player, 4, 0), &side(AI, 0, 0), &BattleConfig::default(), &mut dice);
        assert_eq!(result.remaining.1, 0);
    }

    #[test]
    fn test_war_end() {
        let config = BattleConfig::default();
        assert_eq!(check_war_end(&side(Owner::Player, 30, 1), &side(AI, 30, 1), &config), None);
        assert_eq!(
            check_war_end(&side(Owner::Player, 9, 1), &side(AI, 5, 0), &config),
            Some(WarEnd { broken: Owner::Player, reason: PeaceReason::ForcedPeace })
        );
        assert_eq!(
            check_war_end(&side(Owner::Player, 30, 1), &side(AI, 5, 0), &config),
            Some(WarEnd { broken: AI, reason: PeaceReason::Defeat })
        );
    }
}
