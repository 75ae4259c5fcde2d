//! Layered Perlin elevation
//!
//! Classic 2D lattice-gradient noise seeded from a small linear congruential
//! generator, summed over octaves with a ridge fold on the fine octaves and a
//! radial falloff that pushes the map edges down into sea.
//!
//! Output is bit-for-bit deterministic for a given (seed, width, height):
//! rows are computed in parallel but collected in row-major order.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::GenerationError;

const LCG_MULTIPLIER: i64 = 9301;
const LCG_INCREMENT: i64 = 49297;
const LCG_MODULUS: i64 = 233280;

/// Seeded permutation table, 256 entries duplicated to 512
#[derive(Clone)]
pub struct PermutationTable {
    p: [u8; 512],
}

impl PermutationTable {
    /// Build the table from a seed.
    ///
    /// The LCG state advances once per entry and entry `i` is
    /// `floor((state + i) / 233280 * 256)`. Values are masked into a byte so
    /// every lookup stays inside the table.
    pub fn from_seed(seed: i64) -> Self {
        let mut state = seed.rem_euclid(LCG_MODULUS);
        let mut p = [0u8; 512];
        for i in 0..256 {
            state = (state * LCG_MULTIPLIER + LCG_INCREMENT) % LCG_MODULUS;
            let r = (state + i as i64) as f64 / LCG_MODULUS as f64;
            let value = ((r * 256.0).floor() as i64 & 255) as u8;
            p[i] = value;
            p[i + 256] = value;
        }
        Self { p }
    }

    #[inline]
    fn at(&self, index: usize) -> usize {
        self.p[index & 511] as usize
    }

    /// Single-octave noise at (x, y), roughly in [-1, 1]
    pub fn noise(&self, x: f64, y: f64) -> f64 {
        let xf = x.floor();
        let yf = y.floor();
        let xi = (xf as i64 & 255) as usize;
        let yi = (yf as i64 & 255) as usize;
        let x = x - xf;
        let y = y - yf;
        let u = fade(x);
        let v = fade(y);

        let a = self.at(xi) + yi;
        let aa = self.at(a);
        let ab = self.at(a + 1);
        let b = self.at(xi + 1) + yi;
        let ba = self.at(b);
        let bb = self.at(b + 1);

        lerp(
            v,
            lerp(u, grad(aa, x, y), grad(ba, x - 1.0, y)),
            lerp(u, grad(ab, x, y - 1.0), grad(bb, x - 1.0, y - 1.0)),
        )
    }
}

impl std::fmt::Debug for PermutationTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermutationTable")
            .field("head", &&self.p[..8])
            .finish()
    }
}

#[inline]
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(t: f64, a: f64, b: f64) -> f64 {
    a + t * (b - a)
}

#[inline]
fn grad(hash: usize, x: f64, y: f64) -> f64 {
    let h = hash & 15;
    let u = if h < 8 { x } else { y };
    let v = if h < 4 {
        y
    } else if h == 12 || h == 14 {
        x
    } else {
        0.0
    };
    let u = if h & 1 == 0 { u } else { -u };
    let v = if h & 2 == 0 { v } else { -v };
    u + v
}

/// Octave layering parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseParams {
    pub octaves: u32,
    /// Frequency of the first octave, per grid step
    pub base_frequency: f64,
    /// Weight of the first octave
    pub amplitude: f64,
    /// Weight multiplier per octave
    pub persistence: f64,
    /// Frequency multiplier per octave
    pub lacunarity: f64,
    /// Octaves from this index on are folded into ridges: |2n| - 0.5
    pub fold_from_octave: u32,
    /// Radial falloff weight subtracted at the map edges
    pub falloff_strength: f64,
    /// Refuse grids larger than this many cells
    pub max_cells: usize,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            octaves: 6,
            base_frequency: 0.005,
            amplitude: 0.5,
            persistence: 0.5,
            lacunarity: 2.0,
            fold_from_octave: 3,
            falloff_strength: 0.5,
            max_cells: 4_000_000,
        }
    }
}

impl NoiseParams {
    /// Layered elevation at grid position (x, y) on a `width` x `height` grid
    pub fn elevation(&self, table: &PermutationTable, x: f64, y: f64, width: f64, height: f64) -> f64 {
        let mut freq = self.base_frequency;
        let mut amplitude = self.amplitude;
        let mut elevation = 0.0;

        for octave in 0..self.octaves {
            let mut n = table.noise(x * freq, y * freq);
            if octave >= self.fold_from_octave {
                n = (n * 2.0).abs() - 0.5;
            }
            elevation += n * amplitude;
            freq *= self.lacunarity;
            amplitude *= self.persistence;
        }

        let dx = x / width - 0.5;
        let dy = y / height - 0.5;
        elevation - (dx * dx + dy * dy) * self.falloff_strength
    }
}

/// One grid sample as sent over the worker protocol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapCell {
    pub x: u32,
    pub y: u32,
    pub elevation: f64,
    pub owner: Option<String>,
}

/// Row-major elevation grid with explicit parameters
pub fn generate_elevation(
    seed: i64,
    width: u32,
    height: u32,
    params: &NoiseParams,
) -> Result<Vec<MapCell>, GenerationError> {
    let cells = (width as usize)
        .checked_mul(height as usize)
        .filter(|&n| n <= params.max_cells)
        .ok_or(GenerationError::TooLarge {
            width,
            height,
            limit: params.max_cells,
        })?;

    if cells == 0 {
        return Ok(Vec::new());
    }

    let table = PermutationTable::from_seed(seed);
    let (w, h) = (width as f64, height as f64);

    let rows: Vec<Vec<MapCell>> = (0..height)
        .into_par_iter()
        .map(|y| {
            (0..width)
                .map(|x| MapCell {
                    x,
                    y,
                    elevation: params.elevation(&table, x as f64, y as f64, w, h),
                    owner: None,
                })
                .collect()
        })
        .collect();

    Ok(rows.concat())
}

/// Row-major elevation grid with the default layering
pub fn generate_map_data(seed: i64, width: u32, height: u32) -> Result<Vec<MapCell>, GenerationError> {
    generate_elevation(seed, width, height, &NoiseParams::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permutation_table_is_duplicated() {
        let table = PermutationTable::from_seed(42);
        for i in 0..256 {
            assert_eq!(table.p[i], table.p[i + 256]);
        }
    }

    #[test]
    fn test_noise_is_zero_on_lattice_points() {
        let table = PermutationTable::from_seed(7);
        for x in 0..5 {
            for y in 0..5 {
                assert_eq!(table.noise(x as f64, y as f64), 0.0);
            }
        }
    }

    #[test]
    fn test_noise_is_bounded() {
        let table = PermutationTable::from_seed(1234);
        for i in 0..400 {
            let x = i as f64 * 0.137;
            let y = i as f64 * 0.291;
            let n = table.noise(x, y);
            assert!((-2.0..=2.0).contains(&n), "noise {} out of range", n);
        }
    }

    #[test]
    fn test_small_grid_shape() {
        let cells = generate_map_data(42, 4, 4).unwrap();
        assert_eq!(cells.len(), 16);
        assert_eq!((cells[0].x, cells[0].y), (0, 0));
        assert_eq!((cells[5].x, cells[5].y), (1, 1));
        assert_eq!((cells[15].x, cells[15].y), (3, 3));
        assert!(cells.iter().all(|c| c.owner.is_none()));
    }

    #[test]
    fn test_origin_elevation_is_pure_falloff() {
        // (0, 0) sits on a lattice point for every octave, so only the
        // fold offsets and the falloff remain.
        let cells = generate_map_data(99, 10, 10).unwrap();
        let folded: f64 = [0.0625, 0.03125, 0.015625].iter().map(|a| -0.5 * a).sum();
        let expected = folded - 0.5 * 0.5;
        assert!((cells[0].elevation - expected).abs() < 1e-12);
    }

    #[test]
    fn test_too_large_rejected() {
        let err = generate_map_data(1, 5000, 5000).unwrap_err();
        assert!(matches!(err, GenerationError::TooLarge { .. }));
    }

    #[test]
    fn test_empty_grid() {
        assert!(generate_map_data(1, 0, 10).unwrap().is_empty());
    }

    #[test]
    fn test_map_cell_wire_shape() {
        let cell = MapCell { x: 1, y: 2, elevation: 0.25, owner: None };
        let json = serde_json::to_value(&cell).unwrap();
        assert_eq!(json["owner"], serde_json::Value::Null);
        assert_eq!(json["x"], 1);
    }
}
