pub mod config;
pub mod dice;
pub mod error;
pub mod types;

pub use config::GameConfig;
pub use dice::{Dice, ScriptedDice, SeededDice};
pub use error::{DominionError, Result};
