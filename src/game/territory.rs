//! Territories and the ownership grid beneath them

use geo_types::{Coord, Polygon};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::types::{CellId, Owner, TerritoryId};

/// A grid sample with an owner, adjacency to its 4-neighbours, and
/// membership in one territory
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Cell {
    pub id: CellId,
    pub col: u32,
    pub row: u32,
    /// Centre in map units
    pub center: Coord<f64>,
    pub elevation: f64,
    pub owner: Owner,
    pub neighbors: Vec<CellId>,
    pub territory: Option<TerritoryId>,
}

/// A claimable region of the map
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Territory {
    pub id: TerritoryId,
    pub site: Coord<f64>,
    pub polygon: Polygon<f64>,
    pub area: f64,
    /// Mean elevation of the member cells
    pub elevation: f64,
    pub terrain: Terrain,
    pub size: SizeClass,
    pub claimed: bool,
    pub owner: Owner,
    pub cells: Vec<CellId>,
    pub neighbors: Vec<TerritoryId>,
    pub troops: u32,
    pub resources: u32,
}

impl Territory {
    pub fn name(&self) -> String {
        self.id.to_string()
    }

    pub fn is_neighbor(&self, other: TerritoryId) -> bool {
        self.neighbors.contains(&other)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Terrain {
    Plains,
    Forest,
    Mountain,
    Desert,
    Coast,
}

impl Terrain {
    pub const ALL: [Terrain; 5] = [
        Terrain::Plains,
        Terrain::Forest,
        Terrain::Mountain,
        Terrain::Desert,
        Terrain::Coast,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Terrain::Plains => "plains",
            Terrain::Forest => "forest",
            Terrain::Mountain => "mountain",
            Terrain::Desert => "desert",
            Terrain::Coast => "coast",
        }
    }
}

impl fmt::Display for Terrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Territory size relative to the mean territory area
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeClass {
    Tiny,
    Small,
    Medium,
    Large,
    Huge,
}

impl SizeClass {
    /// Classify by the ratio of an area to the mean area
    pub fn from_area_ratio(ratio: f64) -> Self {
        if ratio < 0.5 {
            SizeClass::Tiny
        } else if ratio < 0.85 {
            SizeClass::Small
        } else if ratio < 1.25 {
            SizeClass::Medium
        } else if ratio < 1.8 {
            SizeClass::Large
        } else {
            SizeClass::Huge
        }
    }

    /// Starting territories for AI nations
    pub fn is_spawnable(&self) -> bool {
        matches!(self, SizeClass::Tiny | SizeClass::Small)
    }

    /// Huge territories cannot be bought
    pub fn is_expandable(&self) -> bool {
        !matches!(self, SizeClass::Huge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_class_thresholds() {
        assert_eq!(SizeClass::from_area_ratio(0.2), SizeClass::Tiny);
        assert_eq!(SizeClass::from_area_ratio(0.5), SizeClass::Small);
        assert_eq!(SizeClass::from_area_ratio(1.0), SizeClass::Medium);
        assert_eq!(SizeClass::from_area_ratio(1.25), SizeClass::Large);
        assert_eq!(SizeClass::from_area_ratio(2.4), SizeClass::Huge);
    }

    #[test]
    fn test_terrain_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Terrain::Coast).unwrap(), "\"coast\"");
        assert_eq!(Terrain::Mountain.to_string(), "mountain");
    }
}
