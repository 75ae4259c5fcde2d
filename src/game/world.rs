//! World - the simulation state container
//!
//! Holds the map, the AI nations, the player and the turn counter. Every
//! ownership or treaty change goes through the helpers here so that both
//! sides of a relation and both views of ownership (territory and cells)
//! always agree.

use serde::{Deserialize, Serialize};

use crate::core::types::{NationId, Owner, TerritoryId, Turn};
use crate::game::nation::{Nation, PlayerNation, Relations, Relationship};
use crate::worldgen::map::WorldMap;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct World {
    pub map: WorldMap,
    pub nations: Vec<Nation>,
    pub player: PlayerNation,
    pub turn: Turn,
}

impl World {
    pub fn new(map: WorldMap, player: PlayerNation) -> Self {
        Self {
            map,
            nations: Vec::new(),
            player,
            turn: 1,
        }
    }

    pub fn get_nation(&self, id: NationId) -> Option<&Nation> {
        self.nations.iter().find(|n| n.id == id)
    }

    pub fn get_nation_mut(&mut self, id: NationId) -> Option<&mut Nation> {
        self.nations.iter_mut().find(|n| n.id == id)
    }

    pub fn nation_ids(&self) -> Vec<NationId> {
        self.nations.iter().map(|n| n.id).collect()
    }

    /// Next unused nation id
    pub fn next_nation_id(&self) -> NationId {
        NationId(self.nations.iter().map(|n| n.id.0 + 1).max().unwrap_or(0))
    }

    pub fn exists(&self, owner: Owner) -> bool {
        match owner {
            Owner::Neutral => false,
            Owner::Player => true,
            Owner::Nation(id) => self.get_nation(id).is_some(),
        }
    }

    pub fn display_name(&self, owner: Owner) -> String {
        match owner {
            Owner::Neutral => "neutral".to_string(),
            Owner::Player => self.player.name.clone(),
            Owner::Nation(id) => self
                .get_nation(id)
                .map_or_else(|| id.to_string(), |n| n.name.clone()),
        }
    }

    pub fn relations(&self, owner: Owner) -> Option<&Relations> {
        match owner {
            Owner::Neutral => None,
            Owner::Player => Some(&self.player.relations),
            Owner::Nation(id) => self.get_nation(id).map(|n| &n.relations),
        }
    }

    pub fn relations_mut(&mut self, owner: Owner) -> Option<&mut Relations> {
        match owner {
            Owner::Neutral => None,
            Owner::Player => Some(&mut self.player.relations),
            Owner::Nation(id) => self.get_nation_mut(id).map(|n| &mut n.relations),
        }
    }

    pub fn military(&self, owner: Owner) -> Option<u32> {
        match owner {
            Owner::Neutral => None,
            Owner::Player => Some(self.player.military),
            Owner::Nation(id) => self.get_nation(id).map(|n| n.military),
        }
    }

    pub fn military_mut(&mut self, owner: Owner) -> Option<&mut u32> {
        match owner {
            Owner::Neutral => None,
            Owner::Player => Some(&mut self.player.military),
            Owner::Nation(id) => self.get_nation_mut(id).map(|n| &mut n.military),
        }
    }

    pub fn money(&self, owner: Owner) -> Option<i64> {
        match owner {
            Owner::Neutral => None,
            Owner::Player => Some(self.player.money),
            Owner::Nation(id) => self.get_nation(id).map(|n| n.money),
        }
    }

    pub fn territories_of(&self, owner: Owner) -> &[TerritoryId] {
        match owner {
            Owner::Neutral => &[],
            Owner::Player => &self.player.territories,
            Owner::Nation(id) => self
                .get_nation(id)
                .map_or(&[][..], |n| n.territories.as_slice()),
        }
    }

    fn territories_mut(&mut self, owner: Owner) -> Option<&mut Vec<TerritoryId>> {
        match owner {
            Owner::Neutral => None,
            Owner::Player => Some(&mut self.player.territories),
            Owner::Nation(id) => self.get_nation_mut(id).map(|n| &mut n.territories),
        }
    }

    pub fn at_war(&self, a: Owner, b: Owner) -> bool {
        self.relations(a).map_or(false, |r| r.is_at_war_with(b))
    }

    pub fn allied(&self, a: Owner, b: Owner) -> bool {
        self.relations(a).map_or(false, |r| r.is_allied_with(b))
    }

    /// Move a territory from `expected` to `new_owner`.
    ///
    /// Check-and-set: returns false without touching anything when the
    /// territory is missing, is no longer held by `expected`, or the new owner
    /// does not exist.
    pub fn transfer_territory(&mut self, id: TerritoryId, expected: Owner, new_owner: Owner) -> bool {
        let Some(territory) = self.map.territory(id) else {
            return false;
        };
        if territory.owner != expected || expected == new_owner {
            return false;
        }
        if new_owner.is_claimed() && !self.exists(new_owner) {
            return false;
        }

        if let Some(list) = self.territories_mut(expected) {
            list.retain(|t| *t != id);
        }
        if let Some(list) = self.territories_mut(new_owner) {
            if !list.contains(&id) {
                list.push(id);
            }
        }
        self.map.assign(id, new_owner);
        true
    }

    /// Claim an unclaimed territory
    pub fn claim(&mut self, id: TerritoryId, owner: Owner) -> bool {
        self.transfer_territory(id, Owner::Neutral, owner)
    }

    /// Put both sides at war. Any alliance between them is dissolved.
    pub fn start_war(&mut self, a: Owner, b: Owner) {
        if let Some(r) = self.relations_mut(a) {
            r.add_war(b);
        }
        if let Some(r) = self.relations_mut(b) {
            r.add_war(a);
        }
        self.set_player_status(a, b, Some(Relationship::War));
    }

    /// Clear the war between both sides. Statuses fall back to opinion.
    pub fn end_war(&mut self, a: Owner, b: Owner) {
        if let Some(r) = self.relations_mut(a) {
            r.remove_war(b);
        }
        if let Some(r) = self.relations_mut(b) {
            r.remove_war(a);
        }
        self.set_player_status(a, b, None);
    }

    pub fn form_alliance(&mut self, a: Owner, b: Owner) {
        if let Some(r) = self.relations_mut(a) {
            r.add_ally(b);
        }
        if let Some(r) = self.relations_mut(b) {
            r.add_ally(a);
        }
        self.set_player_status(a, b, Some(Relationship::Allied));
    }

    pub fn break_alliance(&mut self, a: Owner, b: Owner) {
        if let Some(r) = self.relations_mut(a) {
            r.remove_ally(b);
        }
        if let Some(r) = self.relations_mut(b) {
            r.remove_ally(a);
        }
        self.set_player_status(a, b, None);
    }

    /// Update the status a nation holds towards the player, if one side is the player
    fn set_player_status(&mut self, a: Owner, b: Owner, status: Option<Relationship>) {
        let nation = match (a, b) {
            (Owner::Player, Owner::Nation(id)) | (Owner::Nation(id), Owner::Player) => id,
            _ => return,
        };
        if let Some(n) = self.get_nation_mut(nation) {
            match status {
                Some(s) => n.status = s,
                None => n.clear_override(),
            }
        }
    }

    /// Human-readable list of broken invariants, empty when consistent
    pub fn invariant_violations(&self) -> Vec<String> {
        let mut problems = Vec::new();

        for t in &self.map.territories {
            if t.claimed != t.owner.is_claimed() {
                problems.push(format!("{} claimed flag disagrees with owner {}", t.id, t.owner));
            }
            for c in &t.cells {
                match self.map.cell(*c) {
                    Some(cell) if cell.owner != t.owner => problems.push(format!(
                        "{} owned by {} but cell {} owned by {}",
                        t.id, t.owner, c.0, cell.owner
                    )),
                    None => problems.push(format!("{} lists missing cell {}", t.id, c.0)),
                    _ => {}
                }
            }
            if t.owner.is_claimed() && !self.territories_of(t.owner).contains(&t.id) {
                problems.push(format!("{} missing from territory list of {}", t.id, t.owner));
            }
        }

        let mut parties: Vec<Owner> = vec![Owner::Player];
        parties.extend(self.nations.iter().map(|n| n.owner()));

        for owner in parties {
            for t in self.territories_of(owner) {
                if self.map.territory(*t).map(|t| t.owner) != Some(owner) {
                    problems.push(format!("{} lists {} it does not own", owner, t));
                }
            }
            if let Some(r) = self.relations(owner) {
                for other in &r.allies {
                    if r.wars.contains(other) {
                        problems.push(format!("{} both allied with and at war with {}", owner, other));
                    }
                    if !self.allied(*other, owner) {
                        problems.push(format!("alliance {} -> {} is one-sided", owner, other));
                    }
                }
                for other in &r.wars {
                    if !self.at_war(*other, owner) {
                        problems.push(format!("war {} -> {} is one-sided", owner, other));
                    }
                }
            }
        }

        for n in &self.nations {
            if n.opinion > 100 {
                problems.push(format!("{} opinion {} out of range", n.id, n.opinion));
            }
        }

        problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::WorldConfig;
    use crate::core::dice::SeededDice;
    use crate::game::nation::{Personality, Relations};
    use crate::worldgen::map::generate_world;

    fn world() -> World {
        let config = WorldConfig {
            width: 600.0,
            height: 400.0,
            territory_count: 20,
            cell_size: 20.0,
            ..WorldConfig::default()
        };
        let map = generate_world(&config, &mut SeededDice::new(8)).unwrap();
        let mut world = World::new(map, PlayerNation::new("Player", 5000, 10000, 20));
        world.nations.push(Nation {
            id: NationId(0),
            name: "Valoria".into(),
            personality: Personality::Neutral,
            money: 5000,
            population: 8000,
            military: 20,
            territories: vec![],
            relations: Relations::default(),
            opinion: 50,
            status: Relationship::Neutral,
        });
        world
    }

    #[test]
    fn test_transfer_is_check_and_set() {
        let mut w = world();
        let t = TerritoryId(0);
        let ai = Owner::Nation(NationId(0));
        assert!(w.claim(t, Owner::Player));
        assert!(!w.transfer_territory(t, ai, Owner::Player));
        assert!(w.transfer_territory(t, Owner::Player, ai));
        assert!(w.player.territories.is_empty());
        assert_eq!(w.territories_of(ai), &[t]);
        assert!(w.invariant_violations().is_empty());
    }

    #[test]
    fn test_transfer_to_unknown_nation_refused() {
        let mut w = world();
        assert!(!w.claim(TerritoryId(1), Owner::Nation(NationId(42))));
        assert!(!w.map.territories[1].claimed);
    }

    #[test]
    fn test_war_and_alliance_exclusive() {
        let mut w = world();
        let ai = Owner::Nation(NationId(0));
        w.form_alliance(Owner::Player, ai);
        assert_eq!(w.get_nation(NationId(0)).unwrap().status, Relationship::Allied);
        w.start_war(ai, Owner::Player);
        assert!(w.at_war(Owner::Player, ai));
        assert!(!w.allied(Owner::Player, ai));
        assert_eq!(w.get_nation(NationId(0)).unwrap().status, Relationship::War);
        w.end_war(Owner::Player, ai);
        assert!(!w.at_war(ai, Owner::Player));
        assert_eq!(w.get_nation(NationId(0)).unwrap().status, Relationship::Neutral);
        assert!(w.invariant_violations().is_empty());
    }
}
