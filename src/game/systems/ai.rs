//! Per-tick AI nation decisions
//!
//! Planning runs against one nation at a time and only touches that nation's
//! own record (treasury, population, army). Anything that affects another
//! party comes back as an `Intent` for the game to validate and apply.

use serde::{Deserialize, Serialize};

use crate::core::config::GameConfig;
use crate::core::dice::Dice;
use crate::core::types::Owner;
use crate::game::nation::{Nation, Relationship};
use crate::game::systems::economy::{apply_ai_economy, expansion_cost};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    DeclareWarOnPlayer,
    /// Carries the outcome of the auto-accept roll
    ProposeAlliance { accepted: bool },
    Expand,
    SeekTruce,
}

/// What a nation can see of the rest of the world when it plans
#[derive(Clone, Copy, Debug)]
pub struct PlanContext {
    pub player_military: u32,
    /// The nation borders at least one territory it could buy
    pub can_expand: bool,
    /// A truce proposal with the player is already open
    pub truce_pending: bool,
}

/// Run one AI tick for `nation`: economy first, then decisions in a fixed
/// order (war, alliance, expansion, truce seeking, military buildup).
pub fn plan_nation_turn(
    nation: &mut Nation,
    ctx: &PlanContext,
    config: &GameConfig,
    dice: &mut impl Dice,
) -> Vec<Intent> {
    let ai = &config.ai;
    let traits = nation.traits();
    let mut intents = Vec::new();

    apply_ai_economy(nation, &config.economy);

    // War: personality roll first, then the standing conditions and a second gate
    if dice.chance(traits.war_chance * ai.war_dampening)
        && !nation.is_at_war()
        && nation.military > ai.war_military_threshold
        && nation.money > ai.war_money_reserve
        && dice.chance(ai.war_second_gate)
        && nation.opinion < ai.war_opinion_ceiling
        && !nation.relations.is_allied_with(Owner::Player)
    {
        intents.push(Intent::DeclareWarOnPlayer);
    }

    // Alliance with the player
    if dice.chance(traits.alliance_chance * ai.alliance_dampening)
        && nation.relations.allies.len() < ai.alliance_cap
        && dice.chance(ai.alliance_second_gate)
        && !nation.relations.is_allied_with(Owner::Player)
        && !nation.relations.is_at_war_with(Owner::Player)
        && nation.opinion > ai.alliance_opinion_floor
        && is_open_to_alliance(nation.status)
    {
        let accepted = dice.chance(ai.alliance_auto_accept);
        intents.push(Intent::ProposeAlliance { accepted });
    }

    if ctx.can_expand
        && dice.chance(ai.expansion_chance)
        && nation.money >= expansion_cost(nation.territories.len(), &config.economy) * 2
    {
        intents.push(Intent::Expand);
    }

    if nation.relations.is_at_war_with(Owner::Player)
        && !ctx.truce_pending
        && (nation.military as f64) < ctx.player_military as f64 * ai.losing_ratio
        && dice.chance(ai.truce_seek_chance)
    {
        intents.push(Intent::SeekTruce);
    }

    if nation.money > config.economy.military_reserve {
        let units = dice.between(config.economy.build_units.min, config.economy.build_units.max);
        nation.military += units as u32;
        nation.money -= units * config.economy.unit_cost;
    }

    intents
}

/// Standing that allows an AI to propose an alliance: any non-hostile band
/// not held by a treaty override
fn is_open_to_alliance(status: Relationship) -> bool {
    !status.is_override() && !matches!(status, Relationship::Hostile | Relationship::Unfriendly)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dice::ScriptedDice;
    use crate::core::types::{NationId, TerritoryId};
    use crate::game::nation::{Personality, Relations};

    fn nation(personality: Personality, money: i64, military: u32, opinion: u8) -> Nation {
        Nation {
            id: NationId(0),
            name: "Stormkeep".into(),
            personality,
            money,
            population: 10_000,
            military,
            territories: vec![TerritoryId(0)],
            relations: Relations::default(),
            opinion,
            status: Relationship::from_opinion(opinion),
        }
    }

    fn ctx() -> PlanContext {
        PlanContext {
            player_military: 20,
            can_expand: false,
            truce_pending: false,
        }
    }

    #[test]
    fn test_economy_always_applies() {
        let mut n = nation(Personality::Neutral, 1000, 20, 50);
        let intents = plan_nation_turn(&mut n, &ctx(), &GameConfig::default(), &mut ScriptedDice::constant(0.999));
        assert!(intents.is_empty());
        assert_eq!(n.money, 1000 + 300 + 150);
        assert_eq!(n.population, 10_100);
        assert_eq!(n.military, 20);
    }

    #[test]
    fn test_hostile_aggressor_declares_war() {
        let mut n = nation(Personality::Aggressive, 9000, 40, 10);
        // war roll, second gate, then everything else fails
        let mut dice = ScriptedDice::new([0.01, 0.1]).with_fallback(0.999);
        let intents = plan_nation_turn(&mut n, &ctx(), &GameConfig::default(), &mut dice);
        assert_eq!(intents, vec![Intent::DeclareWarOnPlayer]);
    }

    #[test]
    fn test_war_needs_low_opinion() {
        let mut n = nation(Personality::Aggressive, 9000, 40, 50);
        let mut dice = ScriptedDice::new([0.01, 0.1]).with_fallback(0.999);
        let intents = plan_nation_turn(&mut n, &ctx(), &GameConfig::default(), &mut dice);
        assert!(intents.is_empty());
    }

    #[test]
    fn test_friendly_nation_proposes_alliance() {
        let mut n = nation(Personality::Peaceful, 1000, 20, 70);
        // war roll fails, alliance roll, second gate, auto-accept
        let mut dice = ScriptedDice::new([0.999, 0.01, 0.1, 0.2]).with_fallback(0.999);
        let intents = plan_nation_turn(&mut n, &ctx(), &GameConfig::default(), &mut dice);
        assert_eq!(intents, vec![Intent::ProposeAlliance { accepted: true }]);
    }

    #[test]
    fn test_buildup_spends_money() {
        let mut n = nation(Personality::Neutral, 5000, 20, 50);
        // war, alliance rolls fail; build roll 0.999 -> 5 units
        let mut dice = ScriptedDice::new([0.999, 0.999, 0.999]);
        plan_nation_turn(&mut n, &ctx(), &GameConfig::default(), &mut dice);
        assert_eq!(n.military, 25);
        assert_eq!(n.money, 5000 + 450 - 500);
    }

    #[test]
    fn test_losing_nation_seeks_truce() {
        let mut n = nation(Personality::Neutral, 100, 5, 20);
        n.relations.wars.push(Owner::Player);
        n.status = Relationship::War;
        let mut dice = ScriptedDice::new([0.999, 0.999, 0.01]);
        let intents = plan_nation_turn(&mut n, &ctx(), &GameConfig::default(), &mut dice);
        assert_eq!(intents, vec![Intent::SeekTruce]);
    }
}
