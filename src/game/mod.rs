//! Nation simulation
//!
//! `state::Game` owns everything and is the only thing that mutates it. The
//! remaining modules are the data model (`territory`, `nation`, `truce`,
//! `world`), the history log (`events`), pure decision logic (`systems`) and
//! the presentation seam (`observer`, `output`).

pub mod commands;
pub mod events;
pub mod nation;
pub mod observer;
pub mod output;
pub mod scheduler;
pub mod state;
pub mod systems;
pub mod territory;
pub mod truce;
pub mod world;

pub use commands::{ActionError, Command, Outcome};
pub use events::{Event, EventType, HistoryLog, PeaceReason};
pub use nation::{Nation, Personality, PlayerNation, Relations, Relationship};
pub use observer::{Observer, RecentEvents, RecordingObserver, Severity, TracingObserver};
pub use output::{EconomyStats, ExpansionStats, GameSnapshot, WarStats};
pub use scheduler::{Scheduler, TimerId};
pub use state::{war_key, Game, ScheduledAction, WarKey};
pub use territory::{Cell, SizeClass, Terrain, Territory};
pub use truce::{Truce, TruceBook, TruceDuration, TruceStatus};
pub use world::World;
