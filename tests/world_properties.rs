//! Property tests over world state mutations

use dominion::core::config::WorldConfig;
use dominion::core::types::{NationId, Owner, TerritoryId};
use dominion::game::{Nation, Personality, PlayerNation, Relations, Relationship, World};
use dominion::worldgen::generate_world;
use dominion::SeededDice;
use proptest::prelude::*;

const NATIONS: u32 = 3;

fn world() -> World {
    let config = WorldConfig {
        width: 600.0,
        height: 400.0,
        territory_count: 20,
        cell_size: 20.0,
        seed: 3,
        ..WorldConfig::default()
    };
    let map = generate_world(&config, &mut SeededDice::new(17)).unwrap();
    let mut world = World::new(map, PlayerNation::new("Player", 5000, 10000, 20));
    for i in 0..NATIONS {
        world.nations.push(Nation {
            id: NationId(i),
            name: format!("Nation {}", i),
            personality: Personality::Neutral,
            money: 5000,
            population: 8000,
            military: 20,
            territories: vec![],
            relations: Relations::default(),
            opinion: 50,
            status: Relationship::Neutral,
        });
    }
    world
}

fn owner(i: u32) -> Owner {
    match i % (NATIONS + 2) {
        0 => Owner::Neutral,
        1 => Owner::Player,
        n => Owner::Nation(NationId(n - 2)),
    }
}

#[derive(Debug, Clone)]
enum Op {
    Transfer(u32, u32, u32),
    StartWar(u32, u32),
    EndWar(u32, u32),
    Ally(u32, u32),
    BreakAlliance(u32, u32),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u32..20, 0u32..5, 0u32..5).prop_map(|(t, a, b)| Op::Transfer(t, a, b)),
        (1u32..5, 1u32..5).prop_map(|(a, b)| Op::StartWar(a, b)),
        (1u32..5, 1u32..5).prop_map(|(a, b)| Op::EndWar(a, b)),
        (1u32..5, 1u32..5).prop_map(|(a, b)| Op::Ally(a, b)),
        (1u32..5, 1u32..5).prop_map(|(a, b)| Op::BreakAlliance(a, b)),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_world_stays_consistent(ops in prop::collection::vec(op(), 1..60)) {
        let mut w = world();
        for op in ops {
            match op {
                Op::Transfer(t, a, b) => {
                    w.transfer_territory(TerritoryId(t), owner(a), owner(b));
                }
                Op::StartWar(a, b) if a != b => w.start_war(owner(a), owner(b)),
                Op::EndWar(a, b) => w.end_war(owner(a), owner(b)),
                Op::Ally(a, b) if a != b => w.form_alliance(owner(a), owner(b)),
                Op::BreakAlliance(a, b) => w.break_alliance(owner(a), owner(b)),
                _ => {}
            }
        }
        let problems = w.invariant_violations();
        prop_assert!(problems.is_empty(), "{:?}", problems);
    }

    #[test]
    fn prop_opinion_stays_in_range(deltas in prop::collection::vec(-120i32..120, 1..40)) {
        let mut w = world();
        let nation = w.get_nation_mut(NationId(0)).unwrap();
        for d in deltas {
            nation.adjust_opinion(d);
            prop_assert!(nation.opinion <= 100);
            if !nation.status.is_override() {
                prop_assert_eq!(nation.status, Relationship::from_opinion(nation.opinion));
            }
        }
    }
}
