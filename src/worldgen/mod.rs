//! Procedural world generation
//!
//! Two independent generators feed the game:
//! - `noise`: layered Perlin elevation over a rectangular grid, the payload of
//!   the worker protocol
//! - `voronoi`: seed scatter and half-plane clipping into convex territories
//!
//! `map` stitches both into a playable `WorldMap`; `worker` runs the noise path
//! off the simulation thread behind a request/response channel.

pub mod map;
pub mod noise;
pub mod voronoi;
pub mod worker;

use thiserror::Error;

pub use map::{generate_world, WorldMap};
pub use noise::{generate_elevation, generate_map_data, MapCell, NoiseParams, PermutationTable};
pub use voronoi::{scatter_sites, voronoi_cells, VoronoiCell};
pub use worker::{WorkerCommand, WorkerRequest, WorkerResponse, WorldWorker};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    #[error("map of {width}x{height} exceeds the limit of {limit} cells")]
    TooLarge { width: u32, height: u32, limit: usize },

    #[error("invalid world bounds {width}x{height}")]
    InvalidBounds { width: f64, height: f64 },

    #[error("worker failed: {0}")]
    WorkerFailed(String),

    #[error("worker channel closed")]
    WorkerClosed,
}
