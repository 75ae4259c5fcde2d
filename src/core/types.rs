//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::fmt;

/// Game turn counter ("Day N" in the event log)
pub type Turn = u32;

/// Milliseconds on the game clock
pub type GameTime = u64;

/// Unique identifier for AI nations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NationId(pub u32);

impl NationId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for NationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ai_{}", self.0)
    }
}

/// Unique identifier for territories (index into the territory list)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TerritoryId(pub u32);

impl fmt::Display for TerritoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Territory {}", self.0)
    }
}

/// Unique identifier for map cells (index into the cell list)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellId(pub u32);

/// Unique identifier for truces and truce proposals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TruceId(pub u32);

impl fmt::Display for TruceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "truce #{}", self.0)
    }
}

/// Who holds a cell or territory, or who sits on one side of a treaty
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Owner {
    #[default]
    Neutral,
    Player,
    Nation(NationId),
}

impl Owner {
    pub fn is_claimed(&self) -> bool {
        !matches!(self, Owner::Neutral)
    }

    pub fn nation(&self) -> Option<NationId> {
        match self {
            Owner::Nation(id) => Some(*id),
            _ => None,
        }
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Owner::Neutral => write!(f, "neutral"),
            Owner::Player => write!(f, "player"),
            Owner::Nation(id) => write!(f, "{}", id),
        }
    }
}

impl From<NationId> for Owner {
    fn from(id: NationId) -> Self {
        Owner::Nation(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nation_id_display_matches_wire_ids() {
        assert_eq!(NationId(3).to_string(), "ai_3");
        assert_eq!(Owner::Nation(NationId(0)).to_string(), "ai_0");
        assert_eq!(Owner::Player.to_string(), "player");
    }

    #[test]
    fn test_owner_claimed() {
        assert!(!Owner::Neutral.is_claimed());
        assert!(Owner::Player.is_claimed());
        assert!(Owner::from(NationId(1)).is_claimed());
        assert_eq!(Owner::Nation(NationId(7)).nation(), Some(NationId(7)));
        assert_eq!(Owner::Player.nation(), None);
    }

    #[test]
    fn test_owner_hash() {
        use std::collections::HashMap;
        let mut map: HashMap<Owner, &str> = HashMap::new();
        map.insert(Owner::Nation(NationId(1)), "Valoria");
        assert_eq!(map.get(&Owner::Nation(NationId(1))), Some(&"Valoria"));
        assert_eq!(map.get(&Owner::Player), None);
    }
}
