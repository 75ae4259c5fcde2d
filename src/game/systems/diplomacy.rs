//! AI answers to player diplomacy

use crate::core::config::{DiplomacyConfig, TruceConfig};
use crate::core::dice::Dice;
use crate::core::types::Owner;
use crate::game::nation::{Nation, Personality};

/// Chance an AI nation accepts a truce from `proposer`.
///
/// Losing nations (military ratio below the threshold), poor nations and
/// nations already at war with the proposer are more willing; personality
/// shifts the result either way.
pub fn truce_acceptance(target: &Nation, proposer: Owner, proposer_military: u32, config: &TruceConfig) -> f64 {
    let mut chance = config.base_acceptance;

    if proposer_military > 0 {
        let ratio = target.military as f64 / proposer_military as f64;
        if ratio < config.ratio_threshold {
            chance += config.ratio_bonus;
        }
    }
    if target.money < config.money_pressure_threshold {
        chance += config.money_pressure_bonus;
    }
    if target.relations.is_at_war_with(proposer) {
        chance += config.war_weariness_bonus;
    }
    match target.personality {
        Personality::Peaceful => chance += config.peaceful_bonus,
        Personality::Aggressive => chance -= config.aggressive_penalty,
        Personality::Neutral | Personality::Merchant => {}
    }

    chance
}

/// Chance an AI nation accepts the player's alliance proposal
pub fn alliance_acceptance(target: &Nation) -> f64 {
    target.traits().alliance_chance + (target.opinion as f64 - 50.0) / 100.0
}

/// Chance an AI nation accepts a trade offer from the player
pub fn trade_acceptance(target: &Nation, config: &DiplomacyConfig) -> f64 {
    if target.relations.is_at_war_with(Owner::Player) {
        return 0.0;
    }
    let mut chance = target.traits().trade_chance;
    if target.relations.is_allied_with(Owner::Player) {
        chance += config.allied_trade_bonus;
    }
    chance
}

/// In-character answer to a declaration of war
pub fn war_reply(personality: Personality, dice: &mut impl Dice) -> &'static str {
    let replies: &[&'static str] = match personality {
        Personality::Aggressive => &[
            "You dare challenge us? We accept your declaration!",
            "War it is! Prepare for battle!",
            "Your aggression will be met with force!",
        ],
        Personality::Peaceful => &[
            "This is unfortunate... we hoped for peace.",
            "Very well, if war is what you seek...",
            "We will defend ourselves, though we wished otherwise.",
        ],
        Personality::Neutral => &[
            "So be it. We are ready.",
            "War has been declared. We will respond.",
            "Your challenge is acknowledged.",
        ],
        Personality::Merchant => &[
            "This will hurt both our economies!",
            "War is bad for business, but we'll defend ourselves.",
            "A costly decision for both of us.",
        ],
    };
    replies[dice.pick(replies.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dice::ScriptedDice;
    use crate::core::types::NationId;
    use crate::game::nation::{Relations, Relationship};

    fn nation(personality: Personality, military: u32, money: i64, opinion: u8) -> Nation {
        Nation {
            id: NationId(0),
            name: "Ironhold".into(),
            personality,
            money,
            population: 9000,
            military,
            territories: vec![],
            relations: Relations::default(),
            opinion,
            status: Relationship::from_opinion(opinion),
        }
    }

    #[test]
    fn test_truce_acceptance_composite() {
        let config = TruceConfig::default();
        let mut n = nation(Personality::Peaceful, 10, 2000, 30);
        n.relations.wars.push(Owner::Player);
        // 0.4 + 0.3 (ratio 0.5) + 0.3 (poor) + 0.2 (war) + 0.2 (peaceful)
        let chance = truce_acceptance(&n, Owner::Player, 20, &config);
        assert!((chance - 1.4).abs() < 1e-9);

        let rich = nation(Personality::Aggressive, 50, 20_000, 30);
        let chance = truce_acceptance(&rich, Owner::Player, 20, &config);
        assert!((chance - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_truce_acceptance_zero_proposer_military() {
        let n = nation(Personality::Neutral, 10, 20_000, 50);
        let chance = truce_acceptance(&n, Owner::Player, 0, &TruceConfig::default());
        assert!((chance - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_alliance_acceptance_uses_opinion() {
        let n = nation(Personality::Neutral, 10, 0, 80);
        assert!((alliance_acceptance(&n) - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_trade_refused_at_war() {
        let mut n = nation(Personality::Merchant, 10, 0, 50);
        n.relations.wars.push(Owner::Player);
        assert_eq!(trade_acceptance(&n, &DiplomacyConfig::default()), 0.0);
    }

    #[test]
    fn test_war_reply_matches_personality() {
        let mut dice = ScriptedDice::new([0.0]);
        assert_eq!(war_reply(Personality::Merchant, &mut dice), "This will hurt both our economies!");
    }
}
