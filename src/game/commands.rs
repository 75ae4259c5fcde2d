//! Player commands and their failure modes

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::{NationId, TerritoryId, TruceId};
use crate::game::observer::Severity;
use crate::game::truce::TruceDuration;

/// Everything the player can ask the game to do
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Command {
    DeclareWar(NationId),
    MakePeace(NationId),
    ProposeAlliance(NationId),
    BreakAlliance(NationId),
    ProposeTrade(NationId),
    Expand(TerritoryId),
    ProposeTruce {
        target: NationId,
        duration: TruceDuration,
        terms: Option<String>,
    },
    RespondToTruce {
        id: TruceId,
        accept: bool,
    },
    BreakTruce(TruceId),
}

/// Result of a valid command
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// State changed as asked
    Applied,
    /// The other party said no
    Declined,
    /// The command referred to something that does not exist
    Ignored,
}

/// Invalid player action. Nothing is mutated when one of these is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ActionError {
    #[error("The game has not started yet")]
    NotStarted,

    #[error("The game is already running")]
    AlreadyStarted,

    #[error("Already at war with {0}!")]
    AlreadyAtWar(String),

    #[error("Not at war with {0}!")]
    NotAtWar(String),

    #[error("Cannot declare war on an ally! Break alliance first.")]
    AlliedWithTarget,

    #[error("Already allied with {0}!")]
    AlreadyAllied(String),

    #[error("Cannot ally with a nation you are at war with!")]
    AtWarWithTarget,

    #[error("Not allied with {0}")]
    NotAllied(String),

    #[error("Need ${needed} to expand territory (have ${available})")]
    InsufficientFunds { needed: i64, available: i64 },

    #[error("{0} is not available for expansion")]
    TerritoryUnavailable(TerritoryId),

    #[error("{0} does not border your lands")]
    NotAdjacent(TerritoryId),

    #[error("No unclaimed territory available to start in")]
    NoStartingTerritory,

    #[error("You already have an active truce with {0}")]
    TruceExists(String),

    #[error("A truce proposal with {0} is already pending")]
    TrucePending(String),

    #[error("{0} is neither at war with you nor hostile")]
    TruceNotEligible(String),

    #[error("A truce must last at least one turn")]
    InvalidTruceDuration,

    #[error("{0} is not awaiting an answer")]
    TruceNotPending(TruceId),

    #[error("{0} is not active")]
    TruceNotActive(TruceId),

    #[error("{0} is not yours to answer")]
    NotYourTruce(TruceId),
}

impl ActionError {
    /// How loudly to surface the failure
    pub fn severity(&self) -> Severity {
        match self {
            ActionError::AlreadyAtWar(_)
            | ActionError::NotAtWar(_)
            | ActionError::AlreadyAllied(_)
            | ActionError::NotAllied(_)
            | ActionError::TrucePending(_)
            | ActionError::NotAdjacent(_) => Severity::Warning,
            _ => Severity::Error,
        }
    }
}
