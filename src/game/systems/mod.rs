//! Simulation systems
//!
//! Free functions over world state. Planning and resolution are kept apart:
//! systems compute what should happen from a read of the state and the dice,
//! and the `Game` applies the result.

pub mod ai;
pub mod diplomacy;
pub mod economy;
pub mod generation;
pub mod warfare;

pub use ai::{plan_nation_turn, Intent, PlanContext};
pub use diplomacy::{alliance_acceptance, trade_acceptance, truce_acceptance, war_reply};
pub use economy::{apply_player_turn, expansion_cost, TurnReport};
pub use generation::{pick_player_start, spawn_ai_nations, NATION_NAMES};
pub use warfare::{check_war_end, resolve_skirmish, win_probability, Combatant, Skirmish, WarEnd};
