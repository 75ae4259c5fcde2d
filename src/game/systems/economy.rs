//! Income, upkeep and expansion pricing

use serde::{Deserialize, Serialize};

use crate::core::config::EconomyConfig;
use crate::game::nation::{Nation, PlayerNation};

/// AI income per tick
pub fn ai_income(nation: &Nation, config: &EconomyConfig) -> i64 {
    config.ai_base_income + nation.territories.len() as i64 * config.ai_territory_income
}

/// Apply one tick of AI income and population growth
pub fn apply_ai_economy(nation: &mut Nation, config: &EconomyConfig) {
    nation.money += ai_income(nation, config);
    nation.population += (nation.population as f64 * config.ai_growth_rate).floor() as u64;
}

pub fn player_income(player: &PlayerNation, config: &EconomyConfig) -> i64 {
    config.player_base_income
        + player.territories.len() as i64 * config.player_territory_income
        + (player.population / 1000) as i64 * config.income_per_thousand_population
        + player.relations.allies.len() as i64 * config.ally_income
}

pub fn player_expenses(player: &PlayerNation, config: &EconomyConfig) -> i64 {
    player.military as i64 * config.military_upkeep + player.territories.len() as i64 * config.territory_upkeep
}

/// Price of the next territory for a realm that already owns `owned`
pub fn expansion_cost(owned: usize, config: &EconomyConfig) -> i64 {
    let exponent = owned as i32 - 1;
    (config.expansion_base_cost as f64 * config.expansion_growth.powi(exponent)).floor() as i64
}

/// What one turn did to the player's treasury
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnReport {
    pub income: i64,
    pub expenses: i64,
    /// Treasury went below zero this turn
    pub negative: bool,
    /// New military level if units were disbanded for lack of funds
    pub disbanded: Option<u32>,
}

impl TurnReport {
    pub fn net(&self) -> i64 {
        self.income - self.expenses
    }
}

/// Collect income, pay upkeep, grow population and handle bankruptcy
pub fn apply_player_turn(player: &mut PlayerNation, config: &EconomyConfig) -> TurnReport {
    let income = player_income(player, config);
    let expenses = player_expenses(player, config);

    player.money += income - expenses;
    player.income = income - expenses;
    player.population += config.player_population_growth;

    let negative = player.money < 0;
    let mut disbanded = None;
    if player.money < config.bankruptcy_threshold {
        let reduced = player
            .military
            .saturating_sub(config.bankruptcy_military_cut)
            .max(config.bankruptcy_military_floor);
        if reduced != player.military {
            player.military = reduced;
            disbanded = Some(reduced);
        }
    }

    TurnReport {
        income,
        expenses,
        negative,
        disbanded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{NationId, Owner, TerritoryId};

    #[test]
    fn test_expansion_cost_grows() {
        let config = EconomyConfig::default();
        assert_eq!(expansion_cost(1, &config), 3000);
        assert_eq!(expansion_cost(2, &config), 4500);
        assert_eq!(expansion_cost(3, &config), 6750);
        assert_eq!(expansion_cost(4, &config), 10125);
    }

    #[test]
    fn test_player_income_formula() {
        let config = EconomyConfig::default();
        let mut player = PlayerNation::new("P", 0, 10_500, 20);
        player.territories = vec![TerritoryId(0), TerritoryId(1)];
        player.relations.allies.push(Owner::Nation(NationId(0)));
        // 500 + 2*200 + 10*10 + 50
        assert_eq!(player_income(&player, &config), 1050);
        // 20*5 + 2*50
        assert_eq!(player_expenses(&player, &config), 200);
    }

    #[test]
    fn test_bankruptcy_disbands_to_floor() {
        let config = EconomyConfig::default();
        let mut player = PlayerNation::new("P", -9000, 1000, 15);
        let report = apply_player_turn(&mut player, &config);
        assert!(report.negative);
        assert_eq!(player.military, 10);
        assert_eq!(report.disbanded, Some(10));

        let report = apply_player_turn(&mut player, &config);
        assert_eq!(player.military, 10);
        assert_eq!(report.disbanded, None);
    }

    #[test]
    fn test_healthy_turn() {
        let config = EconomyConfig::default();
        let mut player = PlayerNation::new("P", 5000, 10_000, 20);
        player.territories = vec![TerritoryId(3)];
        let report = apply_player_turn(&mut player, &config);
        // income 500 + 200 + 100, expenses 100 + 50
        assert_eq!(report.net(), 650);
        assert_eq!(player.money, 5650);
        assert_eq!(player.population, 10_100);
        assert!(!report.negative);
    }
}
