//! Voronoi territory partition
//!
//! Each site's cell is the world rectangle clipped by the perpendicular
//! bisector half-plane against every other site. The result is always convex,
//! which keeps point-in-polygon lookups and area calculations trivial.

use geo::Area;
use geo_types::{Coord, LineString, Polygon};
use rayon::prelude::*;

use super::GenerationError;
use crate::core::dice::Dice;

/// Vertices closer than this are merged
const VERTEX_EPSILON: f64 = 1e-9;
/// Distance from a bisector within which a vertex counts as lying on it
const EDGE_EPSILON: f64 = 1e-6;
/// Cells with a smaller area are discarded
const MIN_AREA: f64 = 1e-9;

/// A clipped cell around one site
#[derive(Debug, Clone)]
pub struct VoronoiCell {
    /// Index of the site in the scattered input
    pub site_index: usize,
    pub site: Coord<f64>,
    pub polygon: Polygon<f64>,
    /// Site indices of cells sharing an edge with this one
    pub neighbors: Vec<usize>,
}

impl VoronoiCell {
    pub fn area(&self) -> f64 {
        self.polygon.unsigned_area()
    }
}

/// Scatter `count` sites uniformly over `[0, width) x [0, height)`
pub fn scatter_sites(count: usize, width: f64, height: f64, dice: &mut impl Dice) -> Vec<Coord<f64>> {
    (0..count)
        .map(|_| Coord {
            x: dice.roll() * width,
            y: dice.roll() * height,
        })
        .collect()
}

/// Partition the rectangle into one convex cell per site.
///
/// Degenerate cells (duplicate sites, slivers under the area floor) are
/// dropped; the survivors keep their original `site_index`.
pub fn voronoi_cells(
    sites: &[Coord<f64>],
    width: f64,
    height: f64,
) -> Result<Vec<VoronoiCell>, GenerationError> {
    if !(width > 0.0 && height > 0.0) || !width.is_finite() || !height.is_finite() {
        return Err(GenerationError::InvalidBounds { width, height });
    }

    let bound = vec![
        Coord { x: 0.0, y: 0.0 },
        Coord { x: width, y: 0.0 },
        Coord { x: width, y: height },
        Coord { x: 0.0, y: height },
    ];

    let rings: Vec<Option<Vec<Coord<f64>>>> = (0..sites.len())
        .into_par_iter()
        .map(|i| clip_cell(i, sites, &bound))
        .collect();

    let mut cells: Vec<VoronoiCell> = rings
        .into_iter()
        .enumerate()
        .filter_map(|(i, ring)| {
            let ring = ring?;
            let polygon = Polygon::new(LineString::from(ring), vec![]);
            if polygon.unsigned_area() < MIN_AREA {
                return None;
            }
            Some(VoronoiCell {
                site_index: i,
                site: sites[i],
                polygon,
                neighbors: Vec::new(),
            })
        })
        .collect();

    for a in 0..cells.len() {
        for b in (a + 1)..cells.len() {
            if shares_edge(&cells[a], &cells[b]) {
                let (ia, ib) = (cells[a].site_index, cells[b].site_index);
                cells[a].neighbors.push(ib);
                cells[b].neighbors.push(ia);
            }
        }
    }

    Ok(cells)
}

fn clip_cell(i: usize, sites: &[Coord<f64>], bound: &[Coord<f64>]) -> Option<Vec<Coord<f64>>> {
    let si = sites[i];
    let mut ring = bound.to_vec();

    for (j, &sj) in sites.iter().enumerate() {
        if j == i {
            continue;
        }
        let normal = sj - si;
        if normal.x.abs() < VERTEX_EPSILON && normal.y.abs() < VERTEX_EPSILON {
            // Coincident sites: the earlier one keeps the cell
            if j < i {
                return None;
            }
            continue;
        }
        let mid = Coord {
            x: (si.x + sj.x) * 0.5,
            y: (si.y + sj.y) * 0.5,
        };
        ring = clip_half_plane(&ring, mid, normal);
        if ring.len() < 3 {
            return None;
        }
    }

    Some(ring)
}

/// Signed side of `p` relative to the bisector through `mid` with `normal`.
/// Non-positive means the point is on the near side.
#[inline]
fn side(p: Coord<f64>, mid: Coord<f64>, normal: Coord<f64>) -> f64 {
    (p.x - mid.x) * normal.x + (p.y - mid.y) * normal.y
}

/// Sutherland-Hodgman against a single half-plane
fn clip_half_plane(ring: &[Coord<f64>], mid: Coord<f64>, normal: Coord<f64>) -> Vec<Coord<f64>> {
    let mut out: Vec<Coord<f64>> = Vec::with_capacity(ring.len() + 1);

    for k in 0..ring.len() {
        let current = ring[k];
        let next = ring[(k + 1) % ring.len()];
        let dc = side(current, mid, normal);
        let dn = side(next, mid, normal);

        if dc <= 0.0 {
            push_vertex(&mut out, current);
        }
        if (dc <= 0.0) != (dn <= 0.0) {
            let t = dc / (dc - dn);
            push_vertex(
                &mut out,
                Coord {
                    x: current.x + t * (next.x - current.x),
                    y: current.y + t * (next.y - current.y),
                },
            );
        }
    }

    if out.len() > 1 {
        let first = out[0];
        if let Some(&last) = out.last() {
            if near(first, last) {
                out.pop();
            }
        }
    }
    out
}

fn push_vertex(out: &mut Vec<Coord<f64>>, p: Coord<f64>) {
    if out.last().map_or(true, |&last| !near(last, p)) {
        out.push(p);
    }
}

#[inline]
fn near(a: Coord<f64>, b: Coord<f64>) -> bool {
    (a.x - b.x).abs() < VERTEX_EPSILON && (a.y - b.y).abs() < VERTEX_EPSILON
}

/// Two cells are neighbours when at least two distinct vertices of the first
/// lie on their common bisector.
fn shares_edge(a: &VoronoiCell, b: &VoronoiCell) -> bool {
    let normal = b.site - a.site;
    let len = (normal.x * normal.x + normal.y * normal.y).sqrt();
    if len < VERTEX_EPSILON {
        return false;
    }
    let mid = Coord {
        x: (a.site.x + b.site.x) * 0.5,
        y: (a.site.y + b.site.y) * 0.5,
    };

    let on_bisector: Vec<Coord<f64>> = a
        .polygon
        .exterior()
        .coords()
        .copied()
        .filter(|&p| (side(p, mid, normal) / len).abs() < EDGE_EPSILON)
        .collect();

    // The exterior ring repeats its first vertex at the end
    on_bisector
        .iter()
        .enumerate()
        .any(|(k, &p)| on_bisector[k + 1..].iter().any(|&q| !near(p, q)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dice::SeededDice;
    use geo::Contains;

    #[test]
    fn test_two_sites_split_rectangle() {
        let sites = vec![Coord { x: 25.0, y: 50.0 }, Coord { x: 75.0, y: 50.0 }];
        let cells = voronoi_cells(&sites, 100.0, 100.0).unwrap();
        assert_eq!(cells.len(), 2);
        assert!((cells[0].area() - 5000.0).abs() < 1e-6);
        assert!((cells[1].area() - 5000.0).abs() < 1e-6);
        assert_eq!(cells[0].neighbors, vec![1]);
        assert_eq!(cells[1].neighbors, vec![0]);
    }

    #[test]
    fn test_areas_cover_bound() {
        let mut dice = SeededDice::new(11);
        let sites = scatter_sites(40, 400.0, 260.0, &mut dice);
        let cells = voronoi_cells(&sites, 400.0, 260.0).unwrap();
        let total: f64 = cells.iter().map(|c| c.area()).sum();
        assert!((total - 400.0 * 260.0).abs() < 1e-3, "total area {}", total);
    }

    #[test]
    fn test_each_site_inside_own_cell() {
        let mut dice = SeededDice::new(5);
        let sites = scatter_sites(25, 300.0, 300.0, &mut dice);
        let cells = voronoi_cells(&sites, 300.0, 300.0).unwrap();
        for cell in &cells {
            assert!(cell.polygon.contains(&geo_types::Point::from(cell.site)));
        }
    }

    #[test]
    fn test_neighbors_are_symmetric() {
        let mut dice = SeededDice::new(3);
        let sites = scatter_sites(30, 500.0, 500.0, &mut dice);
        let cells = voronoi_cells(&sites, 500.0, 500.0).unwrap();
        for cell in &cells {
            assert!(!cell.neighbors.is_empty());
            for n in &cell.neighbors {
                let other = cells.iter().find(|c| c.site_index == *n).unwrap();
                assert!(other.neighbors.contains(&cell.site_index));
            }
        }
    }

    #[test]
    fn test_duplicate_site_dropped() {
        let sites = vec![
            Coord { x: 10.0, y: 10.0 },
            Coord { x: 10.0, y: 10.0 },
            Coord { x: 80.0, y: 80.0 },
        ];
        let cells = voronoi_cells(&sites, 100.0, 100.0).unwrap();
        let kept: Vec<usize> = cells.iter().map(|c| c.site_index).collect();
        assert_eq!(kept, vec![0, 2]);
    }

    #[test]
    fn test_invalid_bounds() {
        let err = voronoi_cells(&[], 0.0, 10.0).unwrap_err();
        assert!(matches!(err, GenerationError::InvalidBounds { .. }));
    }
}
