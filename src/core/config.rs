//! Game configuration with documented constants
//!
//! All balance numbers live here. The defaults reproduce the pacing of the
//! browser game; every section can be overridden from a TOML file, and missing
//! keys fall back to the defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::{DominionError, Result};
use crate::worldgen::noise::NoiseParams;

/// Inclusive integer range, written `[min, max]` in TOML
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[i64; 2]", into = "[i64; 2]")]
pub struct Span {
    pub min: i64,
    pub max: i64,
}

impl Span {
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: i64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

impl From<[i64; 2]> for Span {
    fn from([min, max]: [i64; 2]) -> Self {
        Self { min, max }
    }
}

impl From<Span> for [i64; 2] {
    fn from(span: Span) -> Self {
        [span.min, span.max]
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub world: WorldConfig,
    pub nations: NationConfig,
    pub economy: EconomyConfig,
    pub ai: AiConfig,
    pub battle: BattleConfig,
    pub truce: TruceConfig,
    pub diplomacy: DiplomacyConfig,
    pub schedule: ScheduleConfig,
    pub events: EventConfig,
}

// === WORLD ===

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// World bound in map units
    pub width: f64,
    pub height: f64,
    /// Voronoi seed points scattered in the bound
    ///
    /// Degenerate cells are dropped, so the final territory count can be lower.
    pub territory_count: usize,
    /// Edge length of one ownership cell in map units
    ///
    /// 40 units over a 4000x2600 bound gives a 100x65 grid, roughly
    /// 36 cells per territory at the default territory count.
    pub cell_size: f64,
    /// Seed for the elevation noise
    pub seed: u64,
    pub noise: NoiseParams,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 4000.0,
            height: 2600.0,
            territory_count: 180,
            cell_size: 40.0,
            seed: 12345,
            noise: NoiseParams::default(),
        }
    }
}

// === NATIONS ===

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NationConfig {
    /// Requested number of AI nations (clamped to the available territories)
    pub ai_count: usize,
    pub starting_money: Span,
    pub starting_population: Span,
    pub starting_military: Span,
    /// Initial opinion of the player (0-100)
    pub starting_opinion: u8,

    pub player_name: String,
    pub player_money: i64,
    pub player_population: u64,
    pub player_military: u32,
}

impl Default for NationConfig {
    fn default() -> Self {
        Self {
            ai_count: 5,
            starting_money: Span::new(5000, 7999),
            starting_population: Span::new(8000, 12999),
            starting_military: Span::new(15, 29),
            starting_opinion: 50,
            player_name: "Player".to_string(),
            player_money: 5000,
            player_population: 10000,
            player_military: 20,
        }
    }
}

// === ECONOMY ===

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// AI income per tick: base + territories * per_territory
    pub ai_base_income: i64,
    pub ai_territory_income: i64,
    /// AI population growth per tick (fraction, floored)
    pub ai_growth_rate: f64,
    /// AI nations only build military above this treasury
    pub military_reserve: i64,
    /// Units bought per buildup
    pub build_units: Span,
    pub unit_cost: i64,

    /// Player income per turn:
    /// base + territories * per_territory + (population / 1000) * per_thousand + allies * per_ally
    pub player_base_income: i64,
    pub player_territory_income: i64,
    pub income_per_thousand_population: i64,
    pub ally_income: i64,
    /// Player expenses per turn: military * upkeep + territories * upkeep
    pub military_upkeep: i64,
    pub territory_upkeep: i64,
    pub player_population_growth: u64,

    /// Treasury below which the army starts disbanding
    pub bankruptcy_threshold: i64,
    pub bankruptcy_military_cut: u32,
    pub bankruptcy_military_floor: u32,

    /// Expansion cost: base * growth^(owned - 1)
    pub expansion_base_cost: i64,
    pub expansion_growth: f64,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            ai_base_income: 300,
            ai_territory_income: 150,
            ai_growth_rate: 0.01,
            military_reserve: 3000,
            build_units: Span::new(1, 5),
            unit_cost: 100,

            player_base_income: 500,
            player_territory_income: 200,
            income_per_thousand_population: 10,
            ally_income: 50,
            military_upkeep: 5,
            territory_upkeep: 50,
            player_population_growth: 100,

            bankruptcy_threshold: -5000,
            bankruptcy_military_cut: 10,
            bankruptcy_military_floor: 10,

            expansion_base_cost: 3000,
            expansion_growth: 1.5,
        }
    }
}

// === AI DECISIONS ===

/// AI decision gates
///
/// War and alliance decisions are double-gated: a personality roll scaled by
/// a dampening factor, then a second independent roll. The pairs are
/// balance knobs, not contracts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub war_dampening: f64,
    /// Minimum military before an AI considers war
    pub war_military_threshold: u32,
    /// Minimum treasury before an AI considers war
    pub war_money_reserve: i64,
    pub war_second_gate: f64,
    /// AI only declares war when its opinion of the player is below this
    pub war_opinion_ceiling: u8,

    pub alliance_dampening: f64,
    pub alliance_cap: usize,
    pub alliance_second_gate: f64,
    /// AI only proposes an alliance when its opinion is above this
    pub alliance_opinion_floor: u8,
    /// Probability the player side accepts an AI proposal on the non-interactive path
    pub alliance_auto_accept: f64,

    /// Per-tick chance an AI claims an adjacent unclaimed territory
    pub expansion_chance: f64,
    /// Per-tick chance a losing AI asks the player for a truce
    pub truce_seek_chance: f64,
    /// An AI counts as losing when its military is below this fraction of the player's
    pub losing_ratio: f64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            war_dampening: 0.1,
            war_military_threshold: 30,
            war_money_reserve: 5000,
            war_second_gate: 0.3,
            war_opinion_ceiling: 30,

            alliance_dampening: 0.05,
            alliance_cap: 2,
            alliance_second_gate: 0.2,
            alliance_opinion_floor: 60,
            alliance_auto_accept: 0.5,

            expansion_chance: 0.1,
            truce_seek_chance: 0.05,
            losing_ratio: 0.7,
        }
    }
}

// === BATTLE ===

/// Skirmish resolution
///
/// The winner of a skirmish inflicts `winner_casualties` on the loser and
/// loses a half of that itself. When side A loses it takes `loser_casualties`
/// and side B loses a third of that.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    pub winner_casualties: Span,
    pub loser_casualties: Span,
    pub winner_attrition_divisor: u32,
    pub loser_attrition_divisor: u32,
    /// Chance the winner captures one territory from the loser
    pub capture_chance: f64,
    /// Treasury loss when the player loses a skirmish
    pub war_cost: Span,
    /// Below this a side can no longer fight and the war ends
    pub min_viable_military: u32,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            winner_casualties: Span::new(3, 7),
            loser_casualties: Span::new(5, 12),
            winner_attrition_divisor: 2,
            loser_attrition_divisor: 3,
            capture_chance: 0.3,
            war_cost: Span::new(200, 699),
            min_viable_military: 10,
        }
    }
}

// === TRUCE ===

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TruceConfig {
    pub base_acceptance: f64,
    /// Target military / proposer military below this adds `ratio_bonus`
    pub ratio_threshold: f64,
    pub ratio_bonus: f64,
    /// Target treasury below this adds `money_pressure_bonus`
    pub money_pressure_threshold: i64,
    pub money_pressure_bonus: f64,
    pub war_weariness_bonus: f64,
    pub peaceful_bonus: f64,
    pub aggressive_penalty: f64,
    /// Opinion lost by the victim when a truce is broken
    pub break_opinion_penalty: i32,
    pub default_terms: String,
    /// Length of truces the AI asks for
    pub ai_proposal_turns: u32,
}

impl Default for TruceConfig {
    fn default() -> Self {
        Self {
            base_acceptance: 0.4,
            ratio_threshold: 0.7,
            ratio_bonus: 0.3,
            money_pressure_threshold: 10000,
            money_pressure_bonus: 0.3,
            war_weariness_bonus: 0.2,
            peaceful_bonus: 0.2,
            aggressive_penalty: 0.2,
            break_opinion_penalty: 30,
            default_terms: "Standard cease-fire agreement".to_string(),
            ai_proposal_turns: 10,
        }
    }
}

// === DIPLOMACY ===

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiplomacyConfig {
    pub war_opinion_penalty: i32,
    pub peace_opinion_bonus: i32,
    pub trade_opinion_bonus: i32,
    pub alliance_break_penalty: i32,
    pub trade_value: Span,
    /// Added to the trade acceptance chance of allies
    pub allied_trade_bonus: f64,
}

impl Default for DiplomacyConfig {
    fn default() -> Self {
        Self {
            war_opinion_penalty: -50,
            peace_opinion_bonus: 30,
            trade_opinion_bonus: 10,
            alliance_break_penalty: -20,
            trade_value: Span::new(1000, 2999),
            allied_trade_bonus: 0.2,
        }
    }
}

// === SCHEDULE ===

/// Cadences on the game clock, in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub ai_tick_ms: u64,
    pub turn_ms: u64,
    pub battle_ms: u64,
    pub truce_check_ms: u64,
    /// Delay before an AI answers a truce proposal
    pub truce_response_delay_ms: Span,
    /// Delay before an AI answers a declaration of war
    pub war_reply_delay_ms: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            ai_tick_ms: 10_000,
            turn_ms: 10_000,
            battle_ms: 15_000,
            truce_check_ms: 5_000,
            truce_response_delay_ms: Span::new(2_000, 4_999),
            war_reply_delay_ms: 2_000,
        }
    }
}

// === EVENTS ===

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    /// Size of the recent-events list shown to the player
    pub recent_cap: usize,
    /// Events kept in the history log before the oldest are dropped; 0 keeps all
    pub history_cap: usize,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            recent_cap: 10,
            history_cap: 5_000,
        }
    }
}

impl GameConfig {
    /// Parse a config from TOML text and validate it
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: GameConfig = toml::from_str(contents)?;
        config.validate().map_err(DominionError::InvalidConfig)?;
        Ok(config)
    }

    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.world.width <= 0.0 || self.world.height <= 0.0 {
            return Err(format!(
                "world bound must be positive, got {}x{}",
                self.world.width, self.world.height
            ));
        }
        if self.world.cell_size <= 0.0 {
            return Err(format!("cell_size must be positive, got {}", self.world.cell_size));
        }
        if self.world.territory_count == 0 {
            return Err("territory_count must be at least 1".into());
        }

        let spans = [
            ("nations.starting_money", self.nations.starting_money),
            ("nations.starting_population", self.nations.starting_population),
            ("nations.starting_military", self.nations.starting_military),
            ("economy.build_units", self.economy.build_units),
            ("battle.winner_casualties", self.battle.winner_casualties),
            ("battle.loser_casualties", self.battle.loser_casualties),
            ("battle.war_cost", self.battle.war_cost),
            ("diplomacy.trade_value", self.diplomacy.trade_value),
            ("schedule.truce_response_delay_ms", self.schedule.truce_response_delay_ms),
        ];
        for (name, span) in spans {
            if span.min > span.max {
                return Err(format!("{} is inverted: [{}, {}]", name, span.min, span.max));
            }
            if span.min < 0 {
                return Err(format!("{} must not be negative", name));
            }
        }

        let probabilities = [
            ("ai.war_dampening", self.ai.war_dampening),
            ("ai.war_second_gate", self.ai.war_second_gate),
            ("ai.alliance_dampening", self.ai.alliance_dampening),
            ("ai.alliance_second_gate", self.ai.alliance_second_gate),
            ("ai.alliance_auto_accept", self.ai.alliance_auto_accept),
            ("ai.expansion_chance", self.ai.expansion_chance),
            ("ai.truce_seek_chance", self.ai.truce_seek_chance),
            ("battle.capture_chance", self.battle.capture_chance),
            ("economy.ai_growth_rate", self.economy.ai_growth_rate),
        ];
        for (name, p) in probabilities {
            if !(0.0..=1.0).contains(&p) {
                return Err(format!("{} must be within [0, 1], got {}", name, p));
            }
        }

        if self.battle.winner_attrition_divisor == 0 || self.battle.loser_attrition_divisor == 0 {
            return Err("attrition divisors must be non-zero".into());
        }

        let cadences = [
            self.schedule.ai_tick_ms,
            self.schedule.turn_ms,
            self.schedule.battle_ms,
            self.schedule.truce_check_ms,
        ];
        if cadences.iter().any(|&ms| ms == 0) {
            return Err("schedule cadences must be non-zero".into());
        }

        if self.truce.ai_proposal_turns == 0 {
            return Err("truce.ai_proposal_turns must be at least 1".into());
        }

        if self.nations.starting_opinion > 100 {
            return Err(format!(
                "starting_opinion must be within [0, 100], got {}",
                self.nations.starting_opinion
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let config = GameConfig::from_toml_str(
            r#"
            [nations]
            ai_count = 8

            [battle]
            winner_casualties = [4, 9]
            "#,
        )
        .expect("partial config should parse");

        assert_eq!(config.nations.ai_count, 8);
        assert_eq!(config.battle.winner_casualties, Span::new(4, 9));
        assert_eq!(config.battle.loser_casualties, Span::new(5, 12));
        assert_eq!(config.schedule.ai_tick_ms, 10_000);
    }

    #[test]
    fn test_inverted_span_rejected() {
        let err = GameConfig::from_toml_str(
            r#"
            [battle]
            war_cost = [700, 200]
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, DominionError::InvalidConfig(_)));
    }

    #[test]
    fn test_probability_out_of_range_rejected() {
        let mut config = GameConfig::default();
        config.battle.capture_chance = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_cadence_rejected() {
        let mut config = GameConfig::default();
        config.schedule.battle_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_length_ai_truce_rejected() {
        let mut config = GameConfig::default();
        config.truce.ai_proposal_turns = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bundled_config_matches_defaults() {
        let config = GameConfig::from_toml_str(include_str!("../../data/game.toml")).unwrap();
        let defaults = GameConfig::default();
        assert_eq!(config.world.territory_count, defaults.world.territory_count);
        assert_eq!(config.battle.war_cost, defaults.battle.war_cost);
        assert_eq!(config.truce.default_terms, defaults.truce.default_terms);
        assert_eq!(config.schedule.truce_response_delay_ms, defaults.schedule.truce_response_delay_ms);
        assert_eq!(config.economy.bankruptcy_threshold, -5000);
        assert_eq!(config.events.history_cap, defaults.events.history_cap);
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = GameConfig::from_toml_str("[nations\nai_count = ").unwrap_err();
        assert!(matches!(err, DominionError::ConfigParse(_)));
    }
}
