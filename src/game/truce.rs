//! Truce state machine
//!
//! `Pending -> Active | Rejected`, `Active -> Expired | Broken`. Terminal
//! states never change again, so every transition below is a no-op on a
//! truce that is not in the expected source state.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::types::{Owner, TruceId, Turn};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TruceDuration {
    Turns(u32),
    Permanent,
}

impl fmt::Display for TruceDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TruceDuration::Turns(n) => write!(f, "{} turns", n),
            TruceDuration::Permanent => write!(f, "permanent peace"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TruceStatus {
    Pending,
    Active,
    Rejected,
    Expired,
    Broken,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Truce {
    pub id: TruceId,
    pub proposer: Owner,
    pub target: Owner,
    pub duration: TruceDuration,
    pub terms: String,
    pub proposed_turn: Turn,
    pub start_turn: Option<Turn>,
    /// `None` for permanent truces and for proposals not yet accepted
    pub end_turn: Option<Turn>,
    pub status: TruceStatus,
}

impl Truce {
    pub fn involves(&self, party: Owner) -> bool {
        self.proposer == party || self.target == party
    }

    pub fn between(&self, a: Owner, b: Owner) -> bool {
        (self.proposer == a && self.target == b) || (self.proposer == b && self.target == a)
    }

    /// The side that is not `party`
    pub fn counterpart(&self, party: Owner) -> Owner {
        if self.proposer == party {
            self.target
        } else {
            self.proposer
        }
    }

    pub fn is_due(&self, turn: Turn) -> bool {
        self.status == TruceStatus::Active && self.end_turn.map_or(false, |end| turn >= end)
    }
}

/// All truces and proposals ever made
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TruceBook {
    truces: Vec<Truce>,
    next_id: u32,
}

impl TruceBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: TruceId) -> Option<&Truce> {
        self.truces.iter().find(|t| t.id == id)
    }

    fn get_mut(&mut self, id: TruceId) -> Option<&mut Truce> {
        self.truces.iter_mut().find(|t| t.id == id)
    }

    pub fn all(&self) -> &[Truce] {
        &self.truces
    }

    pub fn active(&self) -> impl Iterator<Item = &Truce> {
        self.truces.iter().filter(|t| t.status == TruceStatus::Active)
    }

    pub fn pending(&self) -> impl Iterator<Item = &Truce> {
        self.truces.iter().filter(|t| t.status == TruceStatus::Pending)
    }

    pub fn active_between(&self, a: Owner, b: Owner) -> Option<&Truce> {
        self.active().find(|t| t.between(a, b))
    }

    pub fn pending_between(&self, a: Owner, b: Owner) -> Option<&Truce> {
        self.pending().find(|t| t.between(a, b))
    }

    pub fn active_for(&self, party: Owner) -> Vec<&Truce> {
        self.active().filter(|t| t.involves(party)).collect()
    }

    /// Record a new pending proposal
    pub fn propose(
        &mut self,
        proposer: Owner,
        target: Owner,
        duration: TruceDuration,
        terms: impl Into<String>,
        turn: Turn,
    ) -> TruceId {
        let id = TruceId(self.next_id);
        self.next_id += 1;
        self.truces.push(Truce {
            id,
            proposer,
            target,
            duration,
            terms: terms.into(),
            proposed_turn: turn,
            start_turn: None,
            end_turn: None,
            status: TruceStatus::Pending,
        });
        id
    }

    /// Activate a pending proposal at `turn`
    pub fn accept(&mut self, id: TruceId, turn: Turn) -> Option<&Truce> {
        let truce = self.get_mut(id)?;
        if truce.status != TruceStatus::Pending {
            return None;
        }
        truce.status = TruceStatus::Active;
        truce.start_turn = Some(turn);
        truce.end_turn = match truce.duration {
            // A span past the end of the turn counter never comes due
            TruceDuration::Turns(n) => turn.checked_add(n),
            TruceDuration::Permanent => None,
        };
        Some(&*truce)
    }

    pub fn reject(&mut self, id: TruceId) -> bool {
        match self.get_mut(id) {
            Some(t) if t.status == TruceStatus::Pending => {
                t.status = TruceStatus::Rejected;
                true
            }
            _ => false,
        }
    }

    /// Expire every active truce whose end turn has been reached.
    ///
    /// Returns only the truces that changed in this call, so a second call at
    /// the same turn returns nothing.
    pub fn expire_due(&mut self, turn: Turn) -> Vec<Truce> {
        let mut expired = Vec::new();
        for t in self.truces.iter_mut().filter(|t| t.is_due(turn)) {
            t.status = TruceStatus::Expired;
            expired.push(t.clone());
        }
        expired
    }

    pub fn break_truce(&mut self, id: TruceId) -> Option<Truce> {
        let truce = self.get_mut(id)?;
        if truce.status != TruceStatus::Active {
            return None;
        }
        truce.status = TruceStatus::Broken;
        Some(truce.clone())
    }

    /// Withdraw any open proposal between two parties
    pub fn cancel_pending_between(&mut self, a: Owner, b: Owner) -> usize {
        let mut cancelled = 0;
        for t in self
            .truces
            .iter_mut()
            .filter(|t| t.status == TruceStatus::Pending && t.between(a, b))
        {
            t.status = TruceStatus::Rejected;
            cancelled += 1;
        }
        cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::NationId;

    const AI: Owner = Owner::Nation(NationId(0));

    #[test]
    fn test_ten_turn_truce_expires_at_fifteen() {
        let mut book = TruceBook::new();
        let id = book.propose(Owner::Player, AI, TruceDuration::Turns(10), "cease-fire", 5);
        let truce = book.accept(id, 5).unwrap();
        assert_eq!(truce.end_turn, Some(15));

        assert!(book.expire_due(14).is_empty());
        let expired = book.expire_due(15);
        assert_eq!(expired.len(), 1);
        assert_eq!(book.get(id).unwrap().status, TruceStatus::Expired);
    }

    #[test]
    fn test_expiry_is_idempotent() {
        let mut book = TruceBook::new();
        let id = book.propose(Owner::Player, AI, TruceDuration::Turns(2), "", 1);
        book.accept(id, 1);
        assert_eq!(book.expire_due(3).len(), 1);
        assert!(book.expire_due(3).is_empty());
        assert!(book.expire_due(4).is_empty());
    }

    #[test]
    fn test_permanent_never_expires() {
        let mut book = TruceBook::new();
        let id = book.propose(AI, Owner::Player, TruceDuration::Permanent, "", 1);
        assert!(book.accept(id, 1).unwrap().end_turn.is_none());
        assert!(book.expire_due(u32::MAX).is_empty());
        assert!(book.active_between(Owner::Player, AI).is_some());
    }

    #[test]
    fn test_oversized_span_does_not_wrap() {
        let mut book = TruceBook::new();
        let id = book.propose(Owner::Player, AI, TruceDuration::Turns(u32::MAX), "", 3);
        assert!(book.accept(id, 3).unwrap().end_turn.is_none());
        assert!(book.expire_due(4).is_empty());
        assert_eq!(book.get(id).unwrap().status, TruceStatus::Active);
    }

    #[test]
    fn test_terminal_states_do_not_move() {
        let mut book = TruceBook::new();
        let id = book.propose(Owner::Player, AI, TruceDuration::Turns(5), "", 1);
        assert!(book.reject(id));
        assert!(book.accept(id, 2).is_none());
        assert!(book.break_truce(id).is_none());
        assert_eq!(book.get(id).unwrap().status, TruceStatus::Rejected);
    }

    #[test]
    fn test_break_active() {
        let mut book = TruceBook::new();
        let id = book.propose(Owner::Player, AI, TruceDuration::Turns(5), "", 1);
        book.accept(id, 1);
        let broken = book.break_truce(id).unwrap();
        assert_eq!(broken.status, TruceStatus::Broken);
        assert!(book.active_between(AI, Owner::Player).is_none());
    }
}
