//! Nations: AI-controlled rivals and the player's own realm

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::types::{NationId, Owner, TerritoryId};

/// AI temperament; drives every probabilistic decision
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Personality {
    Peaceful,
    Neutral,
    Aggressive,
    Merchant,
}

/// Per-personality decision weights
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PersonalityTraits {
    pub war_chance: f64,
    pub alliance_chance: f64,
    pub trade_chance: f64,
    pub description: &'static str,
}

impl Personality {
    pub const ALL: [Personality; 4] = [
        Personality::Peaceful,
        Personality::Neutral,
        Personality::Aggressive,
        Personality::Merchant,
    ];

    pub fn traits(&self) -> PersonalityTraits {
        match self {
            Personality::Peaceful => PersonalityTraits {
                war_chance: 0.1,
                alliance_chance: 0.7,
                trade_chance: 0.8,
                description: "Prefers diplomacy and trade over conflict",
            },
            Personality::Neutral => PersonalityTraits {
                war_chance: 0.3,
                alliance_chance: 0.5,
                trade_chance: 0.6,
                description: "Balanced approach to diplomacy and warfare",
            },
            Personality::Aggressive => PersonalityTraits {
                war_chance: 0.6,
                alliance_chance: 0.2,
                trade_chance: 0.3,
                description: "Focused on military expansion and conquest",
            },
            Personality::Merchant => PersonalityTraits {
                war_chance: 0.15,
                alliance_chance: 0.6,
                trade_chance: 0.9,
                description: "Heavily focused on trade and economic growth",
            },
        }
    }
}

impl fmt::Display for Personality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Personality::Peaceful => "peaceful",
            Personality::Neutral => "neutral",
            Personality::Aggressive => "aggressive",
            Personality::Merchant => "merchant",
        };
        f.write_str(s)
    }
}

/// How an AI nation regards the player
///
/// The first five bands derive from opinion. `Allied`, `War` and `Truce`
/// reflect explicit treaty state and are not recomputed when opinion moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    Hostile,
    Unfriendly,
    Neutral,
    Friendly,
    VeryFriendly,
    Allied,
    War,
    Truce,
}

impl Relationship {
    pub fn from_opinion(opinion: u8) -> Self {
        match opinion {
            0..=19 => Relationship::Hostile,
            20..=39 => Relationship::Unfriendly,
            40..=59 => Relationship::Neutral,
            60..=79 => Relationship::Friendly,
            _ => Relationship::VeryFriendly,
        }
    }

    pub fn is_override(&self) -> bool {
        matches!(self, Relationship::Allied | Relationship::War | Relationship::Truce)
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Relationship::Hostile => "hostile",
            Relationship::Unfriendly => "unfriendly",
            Relationship::Neutral => "neutral",
            Relationship::Friendly => "friendly",
            Relationship::VeryFriendly => "very friendly",
            Relationship::Allied => "allied",
            Relationship::War => "war",
            Relationship::Truce => "truce",
        };
        f.write_str(s)
    }
}

/// Treaty lists of one party
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Relations {
    pub allies: Vec<Owner>,
    pub wars: Vec<Owner>,
}

impl Relations {
    pub fn is_allied_with(&self, other: Owner) -> bool {
        self.allies.contains(&other)
    }

    pub fn is_at_war_with(&self, other: Owner) -> bool {
        self.wars.contains(&other)
    }

    pub(crate) fn add_ally(&mut self, other: Owner) {
        self.wars.retain(|o| *o != other);
        if !self.allies.contains(&other) {
            self.allies.push(other);
        }
    }

    pub(crate) fn add_war(&mut self, other: Owner) {
        self.allies.retain(|o| *o != other);
        if !self.wars.contains(&other) {
            self.wars.push(other);
        }
    }

    pub(crate) fn remove_ally(&mut self, other: Owner) {
        self.allies.retain(|o| *o != other);
    }

    pub(crate) fn remove_war(&mut self, other: Owner) {
        self.wars.retain(|o| *o != other);
    }
}

/// An AI-controlled nation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Nation {
    pub id: NationId,
    pub name: String,
    pub personality: Personality,
    pub money: i64,
    pub population: u64,
    pub military: u32,
    pub territories: Vec<TerritoryId>,
    pub relations: Relations,
    /// Opinion of the player, 0-100
    pub opinion: u8,
    pub status: Relationship,
}

impl Nation {
    pub fn owner(&self) -> Owner {
        Owner::Nation(self.id)
    }

    pub fn traits(&self) -> PersonalityTraits {
        self.personality.traits()
    }

    /// Shift opinion by `delta`, clamped to 0-100.
    ///
    /// Status follows the new opinion unless an explicit treaty state holds it.
    pub fn adjust_opinion(&mut self, delta: i32) {
        self.opinion = (self.opinion as i32 + delta).clamp(0, 100) as u8;
        if !self.status.is_override() {
            self.status = Relationship::from_opinion(self.opinion);
        }
    }

    /// Drop any treaty override and fall back to the opinion band
    pub fn clear_override(&mut self) {
        self.status = Relationship::from_opinion(self.opinion);
    }

    pub fn is_at_war(&self) -> bool {
        !self.relations.wars.is_empty()
    }
}

/// The human player's nation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlayerNation {
    pub name: String,
    pub money: i64,
    pub population: u64,
    pub military: u32,
    /// Net income of the last turn
    pub income: i64,
    pub territories: Vec<TerritoryId>,
    pub relations: Relations,
    pub peace_count: u32,
    pub territories_captured: u32,
    pub wars_won: u32,
    pub wars_lost: u32,
}

impl PlayerNation {
    pub fn new(name: impl Into<String>, money: i64, population: u64, military: u32) -> Self {
        Self {
            name: name.into(),
            money,
            population,
            military,
            income: 0,
            territories: Vec::new(),
            relations: Relations::default(),
            peace_count: 0,
            territories_captured: 0,
            wars_won: 0,
            wars_lost: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nation(opinion: u8) -> Nation {
        Nation {
            id: NationId(0),
            name: "Valoria".into(),
            personality: Personality::Neutral,
            money: 5000,
            population: 8000,
            military: 20,
            territories: vec![],
            relations: Relations::default(),
            opinion,
            status: Relationship::from_opinion(opinion),
        }
    }

    #[test]
    fn test_opinion_bands() {
        assert_eq!(Relationship::from_opinion(0), Relationship::Hostile);
        assert_eq!(Relationship::from_opinion(19), Relationship::Hostile);
        assert_eq!(Relationship::from_opinion(20), Relationship::Unfriendly);
        assert_eq!(Relationship::from_opinion(50), Relationship::Neutral);
        assert_eq!(Relationship::from_opinion(60), Relationship::Friendly);
        assert_eq!(Relationship::from_opinion(80), Relationship::VeryFriendly);
        assert_eq!(Relationship::from_opinion(100), Relationship::VeryFriendly);
    }

    #[test]
    fn test_adjust_opinion_clamps() {
        let mut n = nation(10);
        n.adjust_opinion(-50);
        assert_eq!(n.opinion, 0);
        n.adjust_opinion(500);
        assert_eq!(n.opinion, 100);
        assert_eq!(n.status, Relationship::VeryFriendly);
    }

    #[test]
    fn test_override_survives_opinion_change() {
        let mut n = nation(50);
        n.status = Relationship::War;
        n.adjust_opinion(40);
        assert_eq!(n.status, Relationship::War);
        n.clear_override();
        assert_eq!(n.status, Relationship::VeryFriendly);
    }

    #[test]
    fn test_relations_exclusive() {
        let mut r = Relations::default();
        r.add_ally(Owner::Player);
        r.add_war(Owner::Player);
        assert!(r.is_at_war_with(Owner::Player));
        assert!(!r.is_allied_with(Owner::Player));
    }

    #[test]
    fn test_personality_table() {
        assert_eq!(Personality::Aggressive.traits().war_chance, 0.6);
        assert_eq!(Personality::Merchant.traits().trade_chance, 0.9);
    }
}
