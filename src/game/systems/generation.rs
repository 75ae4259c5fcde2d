//! Nation spawning and player placement

use crate::core::config::NationConfig;
use crate::core::dice::Dice;
use crate::core::types::{GameTime, NationId, Owner, TerritoryId};
use crate::game::events::{EventType, HistoryLog};
use crate::game::nation::{Nation, Personality, Relations, Relationship};
use crate::game::territory::SizeClass;
use crate::game::world::World;

pub const NATION_NAMES: [&str; 15] = [
    "Valoria",
    "Ashford",
    "Thornhaven",
    "Silvermere",
    "Ironhold",
    "Windcrest",
    "Stormkeep",
    "Goldspire",
    "Ravenwood",
    "Stonehearth",
    "Frostholm",
    "Emberfall",
    "Crystalvale",
    "Shadowpeak",
    "Brightwater",
];

/// Found up to `config.ai_count` AI nations on unclaimed tiny or small
/// territories.
///
/// When fewer candidates exist than requested the count is clamped and a
/// warning logged; spawning never fails.
pub fn spawn_ai_nations(
    world: &mut World,
    config: &NationConfig,
    dice: &mut impl Dice,
    history: &mut HistoryLog,
    time: GameTime,
) -> Vec<NationId> {
    let mut candidates: Vec<TerritoryId> = world
        .map
        .territories
        .iter()
        .filter(|t| !t.claimed && t.size.is_spawnable())
        .map(|t| t.id)
        .collect();

    let mut count = config.ai_count;
    if candidates.len() < count {
        tracing::warn!(
            available = candidates.len(),
            requested = count,
            "not enough territories for AI nations, clamping"
        );
        count = candidates.len();
    }

    dice.shuffle(&mut candidates);

    let mut spawned = Vec::with_capacity(count);
    for territory in candidates.into_iter().take(count) {
        let id = world.next_nation_id();
        let name = NATION_NAMES[id.0 as usize % NATION_NAMES.len()].to_string();
        let personality = Personality::ALL[dice.pick(Personality::ALL.len())];

        let nation = Nation {
            id,
            name,
            personality,
            money: dice.between(config.starting_money.min, config.starting_money.max),
            population: dice.between(config.starting_population.min, config.starting_population.max) as u64,
            military: dice.between(config.starting_military.min, config.starting_military.max) as u32,
            territories: Vec::new(),
            relations: Relations::default(),
            opinion: config.starting_opinion,
            status: Relationship::from_opinion(config.starting_opinion),
        };

        tracing::info!(nation = %nation.name, %personality, %territory, "AI nation founded");
        world.nations.push(nation);
        world.claim(territory, Owner::Nation(id));
        history.add_event(
            EventType::NationFounded { nation: id, territory },
            world.turn,
            time,
            vec![Owner::Nation(id)],
        );
        spawned.push(id);
    }

    spawned
}

/// Starting territory for the player: a random unclaimed medium territory,
/// else any unclaimed buyable one, else any unclaimed one.
pub fn pick_player_start(world: &World, dice: &mut impl Dice) -> Option<TerritoryId> {
    let unclaimed = || world.map.territories.iter().filter(|t| !t.claimed);

    let tiers: [Vec<TerritoryId>; 3] = [
        unclaimed().filter(|t| t.size == SizeClass::Medium).map(|t| t.id).collect(),
        unclaimed().filter(|t| t.size.is_expandable()).map(|t| t.id).collect(),
        unclaimed().map(|t| t.id).collect(),
    ];

    tiers
        .into_iter()
        .find(|tier| !tier.is_empty())
        .map(|tier| tier[dice.pick(tier.len())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::WorldConfig;
    use crate::core::dice::SeededDice;
    use crate::game::nation::PlayerNation;
    use crate::worldgen::map::generate_world;

    fn world(territories: usize) -> World {
        let config = WorldConfig {
            width: 800.0,
            height: 600.0,
            territory_count: territories,
            cell_size: 20.0,
            ..WorldConfig::default()
        };
        let map = generate_world(&config, &mut SeededDice::new(21)).unwrap();
        World::new(map, PlayerNation::new("Player", 5000, 10000, 20))
    }

    #[test]
    fn test_spawned_nations_claim_small_territories() {
        let mut w = world(60);
        let mut history = HistoryLog::new();
        let ids = spawn_ai_nations(&mut w, &NationConfig::default(), &mut SeededDice::new(1), &mut history, 0);
        assert_eq!(ids.len(), 5);
        for id in ids {
            let nation = w.get_nation(id).unwrap();
            assert_eq!(nation.territories.len(), 1);
            assert_eq!(nation.opinion, 50);
            assert!((5000..8000).contains(&nation.money));
            assert!((15..30).contains(&nation.military));
            let t = w.map.territory(nation.territories[0]).unwrap();
            assert!(t.size.is_spawnable());
            assert_eq!(t.owner, Owner::Nation(id));
        }
        assert!(w.invariant_violations().is_empty());
        assert_eq!(history.events.len(), 5);
    }

    #[test]
    fn test_spawn_clamps_to_available() {
        let mut w = world(3);
        let config = NationConfig { ai_count: 50, ..NationConfig::default() };
        let available = w
            .map
            .territories
            .iter()
            .filter(|t| t.size.is_spawnable())
            .count();
        let ids = spawn_ai_nations(&mut w, &config, &mut SeededDice::new(2), &mut HistoryLog::new(), 0);
        assert_eq!(ids.len(), available);
    }

    #[test]
    fn test_names_follow_list() {
        let mut w = world(60);
        spawn_ai_nations(&mut w, &NationConfig::default(), &mut SeededDice::new(3), &mut HistoryLog::new(), 0);
        let names: Vec<&str> = w.nations.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, &NATION_NAMES[..5]);
    }

    #[test]
    fn test_player_start_prefers_medium() {
        let w = world(40);
        let start = pick_player_start(&w, &mut SeededDice::new(4)).unwrap();
        let has_medium = w.map.territories.iter().any(|t| t.size == SizeClass::Medium);
        if has_medium {
            assert_eq!(w.map.territory(start).unwrap().size, SizeClass::Medium);
        }
    }
}
