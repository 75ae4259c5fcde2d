//! World assembly: elevation grid + Voronoi territories

use geo::Contains;
use geo_types::{Coord, Point};
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::noise::generate_elevation;
use super::voronoi::{scatter_sites, voronoi_cells};
use super::GenerationError;
use crate::core::config::WorldConfig;
use crate::core::dice::Dice;
use crate::core::types::{CellId, Owner, TerritoryId};
use crate::game::territory::{Cell, SizeClass, Terrain, Territory};

/// The generated map: ownership grid and the territories laid over it
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorldMap {
    pub width: f64,
    pub height: f64,
    pub cell_size: f64,
    pub cols: u32,
    pub rows: u32,
    pub cells: Vec<Cell>,
    pub territories: Vec<Territory>,
}

impl WorldMap {
    pub fn territory(&self, id: TerritoryId) -> Option<&Territory> {
        self.territories.get(id.0 as usize)
    }

    pub fn territory_mut(&mut self, id: TerritoryId) -> Option<&mut Territory> {
        self.territories.get_mut(id.0 as usize)
    }

    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(id.0 as usize)
    }

    /// Cell under a map position
    pub fn cell_at(&self, x: f64, y: f64) -> Option<CellId> {
        if x < 0.0 || y < 0.0 {
            return None;
        }
        let col = (x / self.cell_size).floor() as u32;
        let row = (y / self.cell_size).floor() as u32;
        if col >= self.cols || row >= self.rows {
            return None;
        }
        Some(CellId(row * self.cols + col))
    }

    /// Territory whose polygon contains the point
    pub fn territory_at(&self, x: f64, y: f64) -> Option<TerritoryId> {
        let point = Point::new(x, y);
        self.territories
            .iter()
            .find(|t| t.polygon.contains(&point))
            .map(|t| t.id)
    }

    pub fn territories_owned_by(&self, owner: Owner) -> Vec<TerritoryId> {
        self.territories
            .iter()
            .filter(|t| t.owner == owner)
            .map(|t| t.id)
            .collect()
    }

    /// Whether any neighbour of `id` belongs to `owner`
    pub fn borders_owner(&self, id: TerritoryId, owner: Owner) -> bool {
        self.territory(id).map_or(false, |t| {
            t.neighbors
                .iter()
                .filter_map(|n| self.territory(*n))
                .any(|n| n.owner == owner)
        })
    }

    /// Unclaimed, non-huge territories bordering `owner`
    pub fn expandable_for(&self, owner: Owner) -> Vec<TerritoryId> {
        self.territories
            .iter()
            .filter(|t| !t.claimed && t.size.is_expandable())
            .filter(|t| self.borders_owner(t.id, owner))
            .map(|t| t.id)
            .collect()
    }

    /// Set the owner of a territory and every cell in it
    pub(crate) fn assign(&mut self, id: TerritoryId, owner: Owner) {
        let Some(territory) = self.territories.get_mut(id.0 as usize) else {
            return;
        };
        territory.owner = owner;
        territory.claimed = owner.is_claimed();
        for cell in &territory.cells {
            if let Some(c) = self.cells.get_mut(cell.0 as usize) {
                c.owner = owner;
            }
        }
    }
}

/// Generate a complete world from configuration.
///
/// Sites and territory attributes are drawn from `dice`; elevation comes from
/// the seeded noise, so two calls with the same seed and dice agree exactly.
pub fn generate_world(config: &WorldConfig, dice: &mut impl Dice) -> Result<WorldMap, GenerationError> {
    let (width, height, cell_size) = (config.width, config.height, config.cell_size);
    if !(width > 0.0 && height > 0.0 && cell_size > 0.0) {
        return Err(GenerationError::InvalidBounds { width, height });
    }

    let cols = (width / cell_size).ceil() as u32;
    let rows = (height / cell_size).ceil() as u32;

    // Sample noise in map units rather than grid steps
    let mut params = config.noise.clone();
    params.base_frequency *= cell_size;
    let samples = generate_elevation(config.seed as i64, cols, rows, &params)?;

    let sites = scatter_sites(config.territory_count, width, height, dice);
    let voronoi = voronoi_cells(&sites, width, height)?;

    // Survivors of the degenerate-cell filter are renumbered densely
    let mut renumber = vec![None; sites.len()];
    for (new_id, cell) in voronoi.iter().enumerate() {
        renumber[cell.site_index] = Some(TerritoryId(new_id as u32));
    }
    let kept_sites: Vec<Coord<f64>> = voronoi.iter().map(|c| c.site).collect();

    let memberships: Vec<Option<TerritoryId>> = samples
        .par_iter()
        .map(|s| {
            let center = cell_center(s.x, s.y, cell_size, width, height);
            kept_sites
                .iter()
                .enumerate()
                .min_by_key(|(_, site)| {
                    let dx = site.x - center.x;
                    let dy = site.y - center.y;
                    OrderedFloat(dx * dx + dy * dy)
                })
                .map(|(i, _)| TerritoryId(i as u32))
        })
        .collect();

    let mut cells: Vec<Cell> = samples
        .iter()
        .zip(memberships)
        .enumerate()
        .map(|(i, (s, territory))| Cell {
            id: CellId(i as u32),
            col: s.x,
            row: s.y,
            center: cell_center(s.x, s.y, cell_size, width, height),
            elevation: s.elevation,
            owner: Owner::Neutral,
            neighbors: Vec::new(),
            territory,
        })
        .collect();

    for cell in cells.iter_mut() {
        let (c, r) = (cell.col, cell.row);
        let mut neighbors = Vec::with_capacity(4);
        if r > 0 {
            neighbors.push(CellId((r - 1) * cols + c));
        }
        if c > 0 {
            neighbors.push(CellId(r * cols + c - 1));
        }
        if c + 1 < cols {
            neighbors.push(CellId(r * cols + c + 1));
        }
        if r + 1 < rows {
            neighbors.push(CellId((r + 1) * cols + c));
        }
        cell.neighbors = neighbors;
    }

    let count = voronoi.len();
    let mut members: Vec<Vec<CellId>> = vec![Vec::new(); count];
    let mut adjacency: Vec<BTreeSet<TerritoryId>> = vec![BTreeSet::new(); count];

    for cell in &cells {
        let Some(own) = cell.territory else { continue };
        members[own.0 as usize].push(cell.id);
        for n in &cell.neighbors {
            if let Some(other) = cells[n.0 as usize].territory {
                if other != own {
                    adjacency[own.0 as usize].insert(other);
                }
            }
        }
    }

    for (i, v) in voronoi.iter().enumerate() {
        for n in &v.neighbors {
            if let Some(other) = renumber[*n] {
                adjacency[i].insert(other);
            }
        }
    }
    // Voronoi neighbours are symmetric and cell borders are symmetric,
    // so the union needs no extra pass.

    let areas: Vec<f64> = voronoi.iter().map(|v| v.area()).collect();
    let mean_area = if count > 0 {
        areas.iter().sum::<f64>() / count as f64
    } else {
        0.0
    };

    let territories = voronoi
        .into_iter()
        .enumerate()
        .map(|(i, v)| {
            let id = TerritoryId(i as u32);
            let cell_ids = std::mem::take(&mut members[i]);
            let elevation = if cell_ids.is_empty() {
                let col = ((v.site.x / cell_size) as u32).min(cols.saturating_sub(1));
                let row = ((v.site.y / cell_size) as u32).min(rows.saturating_sub(1));
                cells
                    .get((row * cols + col) as usize)
                    .map_or(0.0, |c| c.elevation)
            } else {
                cell_ids
                    .iter()
                    .map(|c| cells[c.0 as usize].elevation)
                    .sum::<f64>()
                    / cell_ids.len() as f64
            };
            let area = areas[i];
            let size = if mean_area > 0.0 {
                SizeClass::from_area_ratio(area / mean_area)
            } else {
                SizeClass::Medium
            };

            Territory {
                id,
                site: v.site,
                polygon: v.polygon,
                area,
                elevation,
                terrain: Terrain::ALL[dice.pick(Terrain::ALL.len())],
                size,
                claimed: false,
                owner: Owner::Neutral,
                cells: cell_ids,
                neighbors: std::mem::take(&mut adjacency[i]).into_iter().collect(),
                troops: dice.between(0, 49) as u32,
                resources: dice.between(50, 99) as u32,
            }
        })
        .collect::<Vec<_>>();

    tracing::debug!(
        territories = territories.len(),
        cells = cells.len(),
        dropped = sites.len() - territories.len(),
        "world generated"
    );

    Ok(WorldMap {
        width,
        height,
        cell_size,
        cols,
        rows,
        cells,
        territories,
    })
}

fn cell_center(col: u32, row: u32, cell_size: f64, width: f64, height: f64) -> Coord<f64> {
    Coord {
        x: ((col as f64 + 0.5) * cell_size).min(width),
        y: ((row as f64 + 0.5) * cell_size).min(height),
    }
}
