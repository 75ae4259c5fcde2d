//! Read models and serialization

use serde::{Deserialize, Serialize};

use crate::core::types::{GameTime, Owner, TerritoryId, Turn};
use crate::game::nation::{Nation, PlayerNation};
use crate::game::territory::{SizeClass, Terrain};
use crate::game::truce::Truce;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarStats {
    pub active_wars: usize,
    pub military: u32,
    pub wars_won: u32,
    pub wars_lost: u32,
    pub territories_captured: u32,
    pub peace_count: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpansionStats {
    pub current_territories: usize,
    pub expandable_territories: usize,
    pub next_expansion_cost: i64,
    pub territory_value: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomyStats {
    pub money: i64,
    pub income: i64,
    pub expenses: i64,
    pub net: i64,
    pub population: u64,
    pub allies: usize,
}

/// Territory as the bridge sees it, without geometry
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TerritorySummary {
    pub id: TerritoryId,
    pub owner: Owner,
    pub size: SizeClass,
    pub terrain: Terrain,
    pub troops: u32,
    pub resources: u32,
    pub elevation: f64,
}

/// Serializable state for external consumers
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub time: GameTime,
    pub turn: Turn,
    pub player: PlayerNation,
    pub nations: Vec<Nation>,
    pub territories: Vec<TerritorySummary>,
    pub truces: Vec<Truce>,
    pub recent_events: Vec<String>,
    pub war: WarStats,
    pub expansion: ExpansionStats,
    pub economy: EconomyStats,
    pub total_events: usize,
}

impl GameSnapshot {
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn summary(&self) -> String {
        let mut out = format!(
            "Day {} ({}s of game time), {} events\n{}: ${} treasury, {} population, {} military, {} territories\n{} active wars, {} won, {} lost, {} peace treaties",
            self.turn,
            self.time / 1000,
            self.total_events,
            self.player.name,
            self.player.money,
            self.player.population,
            self.player.military,
            self.player.territories.len(),
            self.war.active_wars,
            self.war.wars_won,
            self.war.wars_lost,
            self.war.peace_count,
        );
        for n in &self.nations {
            out.push_str(&format!(
                "\n  {:<12} {:<10} ${:>6} mil {:>3} terr {:>2} opinion {:>3} ({})",
                n.name,
                n.personality.to_string(),
                n.money,
                n.military,
                n.territories.len(),
                n.opinion,
                n.status
            ));
        }
        out
    }
}
