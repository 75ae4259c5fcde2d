//! Dominion - procedural world generation and AI nation simulation
//!
//! - `worldgen`: Perlin elevation, Voronoi territories and the generation worker
//! - `game`: nations, diplomacy, wars, truces and the game clock
//! - `core`: ids, configuration, randomness and errors shared by both

pub mod core;
pub mod game;
pub mod worldgen;

pub use crate::core::{Dice, DominionError, GameConfig, Result, ScriptedDice, SeededDice};
pub use crate::game::{Command, Game, GameSnapshot};
