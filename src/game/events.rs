//! Events and history logging

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::core::types::{GameTime, NationId, Owner, TerritoryId, TruceId, Turn};
use crate::game::world::World;

/// A recorded event
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Event {
    pub id: u32,
    pub turn: Turn,
    pub time: GameTime,
    pub event_type: EventType,
    pub participants: Vec<Owner>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeaceReason {
    Negotiated,
    /// A side fell below the minimum viable military
    ForcedPeace,
    /// A side lost its army and its last territory
    Defeat,
    Truce,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum EventType {
    NationFounded { nation: NationId, territory: TerritoryId },

    // Wars
    WarDeclared { aggressor: Owner, defender: Owner },
    WarReply { nation: NationId, message: String },
    Battle { side_a: Owner, side_b: Owner, winner: Owner, losses: (u32, u32) },
    TerritoryCaptured { from: Owner, to: Owner, territory: TerritoryId },
    WarCost { amount: i64 },
    PeaceSigned { a: Owner, b: Owner, reason: PeaceReason },

    // Diplomacy
    AllianceProposed { from: Owner, to: Owner },
    AllianceFormed { a: Owner, b: Owner },
    AllianceRejected { from: Owner, to: Owner },
    AllianceBroken { breaker: Owner, other: Owner },
    TradeCompleted { partner: NationId, value: i64 },
    TradeRejected { partner: NationId },

    // Territory
    TerritoryExpanded { owner: Owner, territory: TerritoryId, cost: i64 },

    // Truces
    TruceProposed { truce: TruceId, proposer: Owner, target: Owner },
    TruceAccepted { truce: TruceId, proposer: Owner, target: Owner },
    TruceRejected { truce: TruceId, proposer: Owner, target: Owner },
    TruceExpired { truce: TruceId, a: Owner, b: Owner },
    TruceBroken { truce: TruceId, breaker: Owner, victim: Owner },

    // Economy
    TurnBegan { turn: Turn },
    TreasuryNegative { money: i64 },
    MilitaryDisbanded { military: u32 },
}

impl EventType {
    /// Event-log line, worded from the player's point of view
    pub fn describe(&self, world: &World) -> String {
        let name = |o: &Owner| match o {
            Owner::Player => "you".to_string(),
            other => world.display_name(*other),
        };

        match self {
            EventType::NationFounded { nation, territory } => {
                format!("{} rose in {}", world.display_name(Owner::Nation(*nation)), territory)
            }
            EventType::WarDeclared { aggressor: Owner::Player, defender } => {
                format!("War declared on {}!", name(defender))
            }
            EventType::WarDeclared { aggressor, defender: Owner::Player } => {
                format!("{} has declared war on you!", name(aggressor))
            }
            EventType::WarDeclared { aggressor, defender } => {
                format!("{} declared war on {}", name(aggressor), name(defender))
            }
            EventType::WarReply { nation, message } => {
                format!("{}: {}", world.display_name(Owner::Nation(*nation)), message)
            }
            EventType::Battle { side_a, side_b, winner, losses } => {
                let (own, enemy) = match (side_a, side_b) {
                    (Owner::Player, other) => (Some(losses.0), (other, losses.1)),
                    (other, Owner::Player) => (Some(losses.1), (other, losses.0)),
                    (_, other) => (None, (other, losses.1)),
                };
                match own {
                    Some(_) if *winner == Owner::Player => format!(
                        "Victory in battle against {}! Enemy casualties: {}",
                        name(enemy.0),
                        enemy.1
                    ),
                    Some(own) => format!(
                        "Defeat in battle against {}! Your casualties: {}",
                        name(enemy.0),
                        own
                    ),
                    None => format!(
                        "{} won a battle between {} and {}",
                        name(winner),
                        name(side_a),
                        name(side_b)
                    ),
                }
            }
            EventType::TerritoryCaptured { from, to: Owner::Player, territory } => {
                format!("Captured {} from {}!", territory, name(from))
            }
            EventType::TerritoryCaptured { from, to, territory } => {
                format!("{} captured {} from {}", name(to), territory, name(from))
            }
            EventType::WarCost { amount } => format!("War costs: -${}", amount),
            EventType::PeaceSigned { a, b, reason } => {
                let other = if *a == Owner::Player { b } else { a };
                match reason {
                    PeaceReason::Negotiated => format!("Peace treaty signed with {}", name(other)),
                    PeaceReason::ForcedPeace => format!("Forced peace with {}", name(other)),
                    PeaceReason::Defeat => format!("{} has been defeated!", name(other)),
                    PeaceReason::Truce => format!("War with {} ended by truce", name(other)),
                }
            }
            EventType::AllianceProposed { from, to: Owner::Player } => {
                format!("{} proposes an alliance!", name(from))
            }
            EventType::AllianceProposed { from, to } => {
                format!("{} proposed an alliance to {}", name(from), name(to))
            }
            EventType::AllianceFormed { a, b } => {
                let other = if *a == Owner::Player { b } else { a };
                format!("Alliance formed with {}!", name(other))
            }
            EventType::AllianceRejected { to, .. } => {
                format!("{} rejected the alliance proposal", name(to))
            }
            EventType::AllianceBroken { breaker: Owner::Player, other } => {
                format!("You broke your alliance with {}", name(other))
            }
            EventType::AllianceBroken { breaker, .. } => {
                format!("{} broke the alliance", name(breaker))
            }
            EventType::TradeCompleted { partner, value } => format!(
                "Trade completed with {}! (+${})",
                world.display_name(Owner::Nation(*partner)),
                value
            ),
            EventType::TradeRejected { partner } => format!(
                "{} rejected your trade offer",
                world.display_name(Owner::Nation(*partner))
            ),
            EventType::TerritoryExpanded { owner: Owner::Player, territory, .. } => {
                format!("Expanded into {}!", territory)
            }
            EventType::TerritoryExpanded { owner, territory, .. } => {
                format!("{} expanded into {}", name(owner), territory)
            }
            EventType::TruceProposed { proposer: Owner::Player, target, .. } => {
                format!("You proposed a truce to {}", name(target))
            }
            EventType::TruceProposed { proposer, .. } => format!("{} proposed a truce", name(proposer)),
            EventType::TruceAccepted { proposer: Owner::Player, target, .. } => {
                format!("{} accepted your truce proposal!", name(target))
            }
            EventType::TruceAccepted { proposer, .. } => {
                format!("You accepted the truce with {}", name(proposer))
            }
            EventType::TruceRejected { proposer: Owner::Player, target, .. } => {
                format!("{} rejected your truce proposal", name(target))
            }
            EventType::TruceRejected { proposer, .. } => {
                format!("You rejected the truce with {}", name(proposer))
            }
            EventType::TruceExpired { a, b, .. } => {
                let other = if *a == Owner::Player { b } else { a };
                format!("Truce with {} has expired", name(other))
            }
            EventType::TruceBroken { breaker: Owner::Player, victim, .. } => format!(
                "You broke the truce with {}! Their opinion of you has decreased.",
                name(victim)
            ),
            EventType::TruceBroken { breaker, .. } => format!("{} broke the truce!", name(breaker)),
            EventType::TurnBegan { turn } => format!("Turn {} begins", turn),
            EventType::TreasuryNegative { money } => {
                format!("Warning: Treasury is negative! (${})", money)
            }
            EventType::MilitaryDisbanded { military } => {
                format!("Military reduced to {} due to lack of funds!", military)
            }
        }
    }
}

/// The history log
///
/// Keeps at most `cap` events, dropping the oldest first. A cap of 0 keeps
/// everything. Event ids keep counting across dropped events.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct HistoryLog {
    pub events: VecDeque<Event>,
    next_event_id: u32,
    cap: usize,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cap(cap: usize) -> Self {
        Self {
            cap,
            ..Self::default()
        }
    }

    pub fn add_event(
        &mut self,
        event_type: EventType,
        turn: Turn,
        time: GameTime,
        participants: Vec<Owner>,
    ) -> u32 {
        let id = self.next_event_id;
        self.next_event_id += 1;

        self.events.push_back(Event {
            id,
            turn,
            time,
            event_type,
            participants,
        });
        if self.cap > 0 && self.events.len() > self.cap {
            self.events.pop_front();
        }

        id
    }

    /// Events recorded since the start, including dropped ones
    pub fn total_recorded(&self) -> usize {
        self.next_event_id as usize
    }

    pub fn last(&self) -> Option<&Event> {
        self.events.back()
    }

    pub fn events_for_turn(&self, turn: Turn) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(move |e| e.turn == turn)
    }

    pub fn events_involving(&self, owner: Owner) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(move |e| e.participants.contains(&owner))
    }

    pub fn count(&self, pred: impl Fn(&EventType) -> bool) -> usize {
        self.events.iter().filter(|e| pred(&e.event_type)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cap_drops_oldest() {
        let mut log = HistoryLog::with_cap(3);
        for turn in 1..=5 {
            log.add_event(EventType::TurnBegan { turn }, turn, 0, vec![]);
        }
        assert_eq!(log.events.len(), 3);
        assert_eq!(log.events.front().map(|e| e.turn), Some(3));
        assert_eq!(log.last().map(|e| e.id), Some(4));
        assert_eq!(log.total_recorded(), 5);
    }

    #[test]
    fn test_zero_cap_keeps_everything() {
        let mut log = HistoryLog::new();
        for turn in 1..=50 {
            log.add_event(EventType::TurnBegan { turn }, turn, 0, vec![]);
        }
        assert_eq!(log.events.len(), 50);
        assert_eq!(log.count(|e| matches!(e, EventType::TurnBegan { .. })), 50);
    }
}
