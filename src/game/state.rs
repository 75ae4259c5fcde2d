//! Game - the single owner of simulation state
//!
//! Player commands arrive through `apply`; periodic work (AI ticks, turns,
//! battles, truce checks, delayed AI answers) fires from the scheduler while
//! the clock is advanced. Each command or timer runs to completion before the
//! next one starts.

use ahash::AHashMap;

use crate::core::config::GameConfig;
use crate::core::dice::{Dice, SeededDice};
use crate::core::error::Result;
use crate::core::types::{GameTime, NationId, Owner, TerritoryId, TruceId, Turn};
use crate::game::commands::{ActionError, Command, Outcome};
use crate::game::events::{EventType, HistoryLog, PeaceReason};
use crate::game::nation::{PlayerNation, Relationship};
use crate::game::observer::{Observer, Severity, TracingObserver};
use crate::game::output::{EconomyStats, ExpansionStats, GameSnapshot, TerritorySummary, WarStats};
use crate::game::scheduler::{Scheduler, TimerId};
use crate::game::systems::{
    self, alliance_acceptance, apply_player_turn, check_war_end, expansion_cost, plan_nation_turn,
    resolve_skirmish, trade_acceptance, truce_acceptance, war_reply, Combatant, Intent, PlanContext,
};
use crate::game::truce::{TruceBook, TruceDuration, TruceStatus};
use crate::game::world::World;
use crate::worldgen::map::generate_world;

/// Unordered pair of belligerents, stored with the lower `Owner` first.
/// The player sorts before every nation, so it is always side A.
pub type WarKey = (Owner, Owner);

pub fn war_key(a: Owner, b: Owner) -> WarKey {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScheduledAction {
    AiTick,
    NextTurn,
    TruceCheck,
    Battle(WarKey),
    TruceResponse(TruceId),
    WarReply(NationId),
}

const NOTIFY_MS: u64 = 3000;

pub struct Game<D: Dice = SeededDice, O: Observer = TracingObserver> {
    world: World,
    truces: TruceBook,
    history: HistoryLog,
    config: GameConfig,
    scheduler: Scheduler<ScheduledAction>,
    war_timers: AHashMap<WarKey, TimerId>,
    dice: D,
    observer: O,
    started: bool,
}

impl Game<SeededDice, TracingObserver> {
    /// Generate a world from `config` with seeded dice, logging to `tracing`
    pub fn seeded(config: GameConfig, seed: u64) -> Result<Self> {
        Self::new(config, SeededDice::new(seed), TracingObserver)
    }
}

impl<D: Dice, O: Observer> Game<D, O> {
    /// Generate a fresh world. Call `start` to place the player and spawn rivals.
    pub fn new(config: GameConfig, mut dice: D, observer: O) -> Result<Self> {
        config
            .validate()
            .map_err(crate::core::error::DominionError::InvalidConfig)?;
        let map = generate_world(&config.world, &mut dice)?;
        let n = &config.nations;
        let player = PlayerNation::new(n.player_name.clone(), n.player_money, n.player_population, n.player_military);
        let world = World::new(map, player);

        Ok(Self {
            world,
            truces: TruceBook::new(),
            history: HistoryLog::with_cap(config.events.history_cap),
            config,
            scheduler: Scheduler::new(),
            war_timers: AHashMap::new(),
            dice,
            observer,
            started: false,
        })
    }

    /// Resume from an already populated world. Periodic loops start immediately.
    pub fn from_world(world: World, config: GameConfig, dice: D, observer: O) -> Self {
        let mut game = Self {
            world,
            truces: TruceBook::new(),
            history: HistoryLog::with_cap(config.events.history_cap),
            config,
            scheduler: Scheduler::new(),
            war_timers: AHashMap::new(),
            dice,
            observer,
            started: false,
        };

        // Wars already in progress keep fighting
        let mut keys: Vec<WarKey> = Vec::new();
        for owner in std::iter::once(Owner::Player).chain(game.world.nations.iter().map(|n| n.owner())) {
            if let Some(r) = game.world.relations(owner) {
                keys.extend(r.wars.iter().map(|other| war_key(owner, *other)));
            }
        }
        keys.sort();
        keys.dedup();
        for key in keys {
            game.arm_battle_timer(key);
        }

        game.schedule_loops();
        game
    }

    /// Claim the player's starting territory, spawn the AI nations and start
    /// the clocks. Picks a starting territory when `start` is `None`.
    pub fn start(&mut self, start: Option<TerritoryId>) -> std::result::Result<TerritoryId, ActionError> {
        if self.started {
            return Err(ActionError::AlreadyStarted);
        }
        let territory = match start {
            Some(t) => t,
            None => systems::pick_player_start(&self.world, &mut self.dice).ok_or(ActionError::NoStartingTerritory)?,
        };
        if !self.world.claim(territory, Owner::Player) {
            return Err(ActionError::TerritoryUnavailable(territory));
        }
        self.world.player.income = self.economy_stats().net;

        let now = self.scheduler.now();
        let spawned = systems::spawn_ai_nations(
            &mut self.world,
            &self.config.nations,
            &mut self.dice,
            &mut self.history,
            now,
        );
        tracing::info!(nations = spawned.len(), %territory, "game started");

        self.schedule_loops();
        self.observer.render();
        Ok(territory)
    }

    fn schedule_loops(&mut self) {
        let s = &self.config.schedule;
        let (ai, turn, truce) = (s.ai_tick_ms, s.turn_ms, s.truce_check_ms);
        self.scheduler.schedule_every(turn, ScheduledAction::NextTurn);
        self.scheduler.schedule_every(ai, ScheduledAction::AiTick);
        self.scheduler.schedule_every(truce, ScheduledAction::TruceCheck);
        self.started = true;
    }

    // === ACCESSORS ===

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn truces(&self) -> &TruceBook {
        &self.truces
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    pub fn dice_mut(&mut self) -> &mut D {
        &mut self.dice
    }

    pub fn now(&self) -> GameTime {
        self.scheduler.now()
    }

    pub fn turn(&self) -> Turn {
        self.world.turn
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Whether a battle timer is running for the pair
    pub fn battle_scheduled(&self, a: Owner, b: Owner) -> bool {
        self.war_timers
            .get(&war_key(a, b))
            .map_or(false, |t| self.scheduler.is_scheduled(*t))
    }

    pub fn invariant_violations(&self) -> Vec<String> {
        let mut problems = self.world.invariant_violations();
        for (key, timer) in &self.war_timers {
            if !self.world.at_war(key.0, key.1) {
                problems.push(format!("battle timer left running for {} vs {}", key.0, key.1));
            }
            if !self.scheduler.is_scheduled(*timer) {
                problems.push(format!("stale battle timer for {} vs {}", key.0, key.1));
            }
        }
        problems
    }

    // === CLOCK ===

    /// Run every timer due up to `until`, then park the clock there
    pub fn run_until(&mut self, until: GameTime) {
        while let Some((_, action)) = self.scheduler.pop_due(until) {
            self.dispatch(action);
        }
        self.scheduler.set_now(until);
    }

    pub fn advance(&mut self, ms: GameTime) {
        let until = self.scheduler.now() + ms;
        self.run_until(until);
    }

    fn dispatch(&mut self, action: ScheduledAction) {
        match action {
            ScheduledAction::AiTick => self.ai_tick(),
            ScheduledAction::NextTurn => self.next_turn(),
            ScheduledAction::TruceCheck => self.check_truces(),
            ScheduledAction::Battle(key) => self.conduct_battle(key),
            ScheduledAction::TruceResponse(id) => self.ai_answer_truce(id),
            ScheduledAction::WarReply(nation) => self.send_war_reply(nation),
        }
    }

    // === EVENT PLUMBING ===

    fn record(&mut self, event_type: EventType, participants: Vec<Owner>) {
        let line = event_type.describe(&self.world);
        self.observer.log_event(&format!("Day {}: {}", self.world.turn, line));
        self.history
            .add_event(event_type, self.world.turn, self.scheduler.now(), participants);
    }

    fn notify(&mut self, message: &str, severity: Severity, duration_ms: u64) {
        self.observer.notify(message, severity, duration_ms);
    }

    fn name_of(&self, id: NationId) -> String {
        self.world.display_name(Owner::Nation(id))
    }

    // === PLAYER COMMANDS ===

    /// Run a player command. Invalid actions are reported to the observer
    /// and returned; nothing is changed in that case.
    pub fn apply(&mut self, command: Command) -> std::result::Result<Outcome, ActionError> {
        if !self.started {
            return Err(ActionError::NotStarted);
        }
        let result = match command {
            Command::DeclareWar(target) => self.declare_war(target),
            Command::MakePeace(target) => self.make_peace(target),
            Command::ProposeAlliance(target) => self.propose_alliance(target),
            Command::BreakAlliance(target) => self.break_alliance(target),
            Command::ProposeTrade(target) => self.propose_trade(target),
            Command::Expand(territory) => self.expand(territory),
            Command::ProposeTruce { target, duration, terms } => self.propose_truce(target, duration, terms),
            Command::RespondToTruce { id, accept } => self.respond_to_truce(id, accept),
            Command::BreakTruce(id) => self.break_truce(id),
        };

        match &result {
            Ok(Outcome::Ignored) => tracing::debug!("command referred to an unknown target"),
            Ok(_) => self.observer.render(),
            Err(e) => {
                let message = e.to_string();
                self.notify(&message, e.severity(), NOTIFY_MS);
            }
        }
        result
    }

    fn declare_war(&mut self, target: NationId) -> std::result::Result<Outcome, ActionError> {
        let them = Owner::Nation(target);
        if self.world.get_nation(target).is_none() {
            return Ok(Outcome::Ignored);
        }
        let name = self.name_of(target);
        if self.world.at_war(Owner::Player, them) {
            return Err(ActionError::AlreadyAtWar(name));
        }
        if self.world.allied(Owner::Player, them) {
            return Err(ActionError::AlliedWithTarget);
        }

        // Attacking during a truce breaks it first
        if let Some(id) = self.truces.active_between(Owner::Player, them).map(|t| t.id) {
            self.break_truce_unchecked(id);
        }

        self.begin_war(Owner::Player, them);
        let penalty = self.config.diplomacy.war_opinion_penalty;
        if let Some(n) = self.world.get_nation_mut(target) {
            n.adjust_opinion(penalty);
        }
        self.scheduler
            .schedule_in(self.config.schedule.war_reply_delay_ms, ScheduledAction::WarReply(target));

        self.notify(&format!("War declared on {}!", name), Severity::Error, 4000);
        Ok(Outcome::Applied)
    }

    fn make_peace(&mut self, target: NationId) -> std::result::Result<Outcome, ActionError> {
        if self.world.get_nation(target).is_none() {
            return Ok(Outcome::Ignored);
        }
        let name = self.name_of(target);
        if !self.end_war(Owner::Player, Owner::Nation(target), PeaceReason::Negotiated, None) {
            return Err(ActionError::NotAtWar(name));
        }
        self.notify(&format!("Peace restored with {}", name), Severity::Success, NOTIFY_MS);
        Ok(Outcome::Applied)
    }

    fn propose_alliance(&mut self, target: NationId) -> std::result::Result<Outcome, ActionError> {
        let them = Owner::Nation(target);
        let Some(nation) = self.world.get_nation(target) else {
            return Ok(Outcome::Ignored);
        };
        let name = nation.name.clone();
        if self.world.allied(Owner::Player, them) {
            return Err(ActionError::AlreadyAllied(name));
        }
        // Checked before any roll is taken
        if self.world.at_war(Owner::Player, them) {
            return Err(ActionError::AtWarWithTarget);
        }

        let chance = alliance_acceptance(nation);
        if self.dice.chance(chance) {
            self.world.form_alliance(Owner::Player, them);
            self.record(EventType::AllianceFormed { a: Owner::Player, b: them }, vec![Owner::Player, them]);
            self.notify(&format!("{} accepted your alliance!", name), Severity::Success, 4000);
            Ok(Outcome::Applied)
        } else {
            self.record(
                EventType::AllianceRejected { from: Owner::Player, to: them },
                vec![Owner::Player, them],
            );
            self.notify(&format!("{} rejected your proposal.", name), Severity::Error, NOTIFY_MS);
            Ok(Outcome::Declined)
        }
    }

    fn break_alliance(&mut self, target: NationId) -> std::result::Result<Outcome, ActionError> {
        let them = Owner::Nation(target);
        if self.world.get_nation(target).is_none() {
            return Ok(Outcome::Ignored);
        }
        if !self.world.allied(Owner::Player, them) {
            return Err(ActionError::NotAllied(self.name_of(target)));
        }
        self.world.break_alliance(Owner::Player, them);
        let penalty = self.config.diplomacy.alliance_break_penalty;
        if let Some(n) = self.world.get_nation_mut(target) {
            n.adjust_opinion(penalty);
        }
        self.record(
            EventType::AllianceBroken { breaker: Owner::Player, other: them },
            vec![Owner::Player, them],
        );
        Ok(Outcome::Applied)
    }

    fn propose_trade(&mut self, target: NationId) -> std::result::Result<Outcome, ActionError> {
        let Some(nation) = self.world.get_nation(target) else {
            return Ok(Outcome::Ignored);
        };
        let name = nation.name.clone();
        let chance = trade_acceptance(nation, &self.config.diplomacy);

        if self.dice.chance(chance) {
            let span = self.config.diplomacy.trade_value;
            let value = self.dice.between(span.min, span.max);
            self.world.player.money += value;
            let bonus = self.config.diplomacy.trade_opinion_bonus;
            if let Some(n) = self.world.get_nation_mut(target) {
                n.adjust_opinion(bonus);
            }
            self.record(
                EventType::TradeCompleted { partner: target, value },
                vec![Owner::Player, Owner::Nation(target)],
            );
            self.notify(&format!("Trade successful! +${}", value), Severity::Success, 4000);
            Ok(Outcome::Applied)
        } else {
            self.record(
                EventType::TradeRejected { partner: target },
                vec![Owner::Player, Owner::Nation(target)],
            );
            self.notify(&format!("{} rejected your trade.", name), Severity::Error, NOTIFY_MS);
            Ok(Outcome::Declined)
        }
    }

    fn expand(&mut self, territory: TerritoryId) -> std::result::Result<Outcome, ActionError> {
        let Some(t) = self.world.map.territory(territory) else {
            return Ok(Outcome::Ignored);
        };
        if t.claimed || !t.size.is_expandable() {
            return Err(ActionError::TerritoryUnavailable(territory));
        }
        if !self.world.map.borders_owner(territory, Owner::Player) {
            return Err(ActionError::NotAdjacent(territory));
        }
        let cost = expansion_cost(self.world.player.territories.len(), &self.config.economy);
        if self.world.player.money < cost {
            return Err(ActionError::InsufficientFunds {
                needed: cost,
                available: self.world.player.money,
            });
        }

        if !self.world.claim(territory, Owner::Player) {
            return Err(ActionError::TerritoryUnavailable(territory));
        }
        self.world.player.money -= cost;
        self.world.player.income = self.economy_stats().net;
        self.record(
            EventType::TerritoryExpanded { owner: Owner::Player, territory, cost },
            vec![Owner::Player],
        );
        let count = self.world.player.territories.len();
        self.notify(
            &format!("Territory claimed! Now controlling {} territories.", count),
            Severity::Success,
            4000,
        );
        Ok(Outcome::Applied)
    }

    fn propose_truce(
        &mut self,
        target: NationId,
        duration: TruceDuration,
        terms: Option<String>,
    ) -> std::result::Result<Outcome, ActionError> {
        let them = Owner::Nation(target);
        let Some(nation) = self.world.get_nation(target) else {
            return Ok(Outcome::Ignored);
        };
        let name = nation.name.clone();
        let hostile = nation.status == Relationship::Hostile;

        if duration == TruceDuration::Turns(0) {
            return Err(ActionError::InvalidTruceDuration);
        }
        if self.truces.active_between(Owner::Player, them).is_some() {
            return Err(ActionError::TruceExists(name));
        }
        if self.truces.pending_between(Owner::Player, them).is_some() {
            return Err(ActionError::TrucePending(name));
        }
        if !self.world.at_war(Owner::Player, them) && !hostile {
            return Err(ActionError::TruceNotEligible(name));
        }

        let terms = terms
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| self.config.truce.default_terms.clone());
        let id = self
            .truces
            .propose(Owner::Player, them, duration, terms, self.world.turn);
        let delay = self.config.schedule.truce_response_delay_ms;
        let delay = self.dice.between(delay.min, delay.max) as GameTime;
        self.scheduler.schedule_in(delay, ScheduledAction::TruceResponse(id));

        self.record(
            EventType::TruceProposed { truce: id, proposer: Owner::Player, target: them },
            vec![Owner::Player, them],
        );
        self.notify(&format!("Truce proposal sent to {}", name), Severity::Success, NOTIFY_MS);
        Ok(Outcome::Applied)
    }

    fn respond_to_truce(&mut self, id: TruceId, accept: bool) -> std::result::Result<Outcome, ActionError> {
        let Some(truce) = self.truces.get(id) else {
            return Ok(Outcome::Ignored);
        };
        if truce.status != TruceStatus::Pending {
            return Err(ActionError::TruceNotPending(id));
        }
        if truce.target != Owner::Player {
            return Err(ActionError::NotYourTruce(id));
        }

        if accept {
            self.accept_truce(id);
        } else {
            self.reject_truce(id);
        }
        Ok(Outcome::Applied)
    }

    fn break_truce(&mut self, id: TruceId) -> std::result::Result<Outcome, ActionError> {
        let Some(truce) = self.truces.get(id) else {
            return Ok(Outcome::Ignored);
        };
        if !truce.involves(Owner::Player) {
            return Err(ActionError::NotYourTruce(id));
        }
        if truce.status != TruceStatus::Active {
            return Err(ActionError::TruceNotActive(id));
        }
        self.break_truce_unchecked(id);
        Ok(Outcome::Applied)
    }

    // === WAR LIFECYCLE ===

    fn arm_battle_timer(&mut self, key: WarKey) {
        if self.war_timers.contains_key(&key) {
            return;
        }
        let timer = self
            .scheduler
            .schedule_every(self.config.schedule.battle_ms, ScheduledAction::Battle(key));
        self.war_timers.insert(key, timer);
    }

    fn begin_war(&mut self, aggressor: Owner, defender: Owner) {
        self.world.start_war(aggressor, defender);
        self.truces.cancel_pending_between(aggressor, defender);
        self.arm_battle_timer(war_key(aggressor, defender));
        tracing::info!(%aggressor, %defender, "war declared");
        self.record(
            EventType::WarDeclared { aggressor, defender },
            vec![aggressor, defender],
        );
    }

    /// The one way a war ends. Clears both war lists, stops the battle timer,
    /// applies the peace opinion bonus and updates player war statistics.
    /// Returns false when the parties were not at war.
    fn end_war(&mut self, a: Owner, b: Owner, reason: PeaceReason, loser: Option<Owner>) -> bool {
        if !self.world.at_war(a, b) {
            return false;
        }
        self.world.end_war(a, b);
        if let Some(timer) = self.war_timers.remove(&war_key(a, b)) {
            self.scheduler.cancel(timer);
        }

        let bonus = self.config.diplomacy.peace_opinion_bonus;
        for side in [a, b] {
            if let Owner::Nation(id) = side {
                if let Some(n) = self.world.get_nation_mut(id) {
                    n.adjust_opinion(bonus);
                }
            }
        }

        if a == Owner::Player || b == Owner::Player {
            let player = &mut self.world.player;
            player.peace_count += 1;
            match loser {
                Some(Owner::Player) => player.wars_lost += 1,
                Some(_) => player.wars_won += 1,
                None => {}
            }
        }

        tracing::info!(%a, %b, ?reason, "war ended");
        self.record(EventType::PeaceSigned { a, b, reason }, vec![a, b]);
        true
    }

    fn combatant(&self, owner: Owner) -> Option<Combatant> {
        Some(Combatant {
            owner,
            military: self.world.military(owner)?,
            territories: self.world.territories_of(owner).len(),
        })
    }

    fn conduct_battle(&mut self, key: WarKey) {
        let (a, b) = key;
        if !self.world.at_war(a, b) {
            if let Some(timer) = self.war_timers.remove(&key) {
                self.scheduler.cancel(timer);
            }
            return;
        }
        let (Some(side_a), Some(side_b)) = (self.combatant(a), self.combatant(b)) else {
            self.end_war(a, b, PeaceReason::Defeat, None);
            return;
        };

        let result = resolve_skirmish(&side_a, &side_b, &self.config.battle, &mut self.dice);
        tracing::debug!(?result, "battle resolved");

        if let Some(m) = self.world.military_mut(a) {
            *m = result.remaining.0;
        }
        if let Some(m) = self.world.military_mut(b) {
            *m = result.remaining.1;
        }
        self.record(
            EventType::Battle {
                side_a: a,
                side_b: b,
                winner: result.winner,
                losses: result.losses,
            },
            vec![a, b],
        );

        if result.capture {
            let taken = self.world.territories_of(result.loser).last().copied();
            if let Some(territory) = taken {
                if self.world.transfer_territory(territory, result.loser, result.winner) {
                    if result.winner == Owner::Player {
                        self.world.player.territories_captured += 1;
                    }
                    self.record(
                        EventType::TerritoryCaptured {
                            from: result.loser,
                            to: result.winner,
                            territory,
                        },
                        vec![result.winner, result.loser],
                    );
                }
            }
        }

        if let Some(cost) = result.war_cost {
            self.world.player.money -= cost;
            self.record(EventType::WarCost { amount: cost }, vec![Owner::Player]);
        }

        let (Some(after_a), Some(after_b)) = (self.combatant(a), self.combatant(b)) else {
            return;
        };
        if let Some(end) = check_war_end(&after_a, &after_b, &self.config.battle) {
            if end.broken == Owner::Player {
                let enemy = if a == Owner::Player { b } else { a };
                let name = self.world.display_name(enemy);
                self.notify(
                    &format!("Military too weak! Forced peace with {}.", name),
                    Severity::Warning,
                    NOTIFY_MS,
                );
            }
            self.end_war(a, b, end.reason, Some(end.broken));
        }
        self.observer.render();
    }

    fn send_war_reply(&mut self, nation: NationId) {
        let Some(personality) = self.world.get_nation(nation).map(|n| n.personality) else {
            return;
        };
        let message = war_reply(personality, &mut self.dice).to_string();
        self.record(
            EventType::WarReply { nation, message },
            vec![Owner::Nation(nation), Owner::Player],
        );
    }

    // === TRUCE LIFECYCLE ===

    fn ai_answer_truce(&mut self, id: TruceId) {
        let Some(truce) = self.truces.get(id) else {
            return;
        };
        if truce.status != TruceStatus::Pending || truce.proposer != Owner::Player {
            return;
        }
        let Some(nation) = truce.target.nation().and_then(|n| self.world.get_nation(n)) else {
            self.reject_truce(id);
            return;
        };

        let chance = truce_acceptance(nation, Owner::Player, self.world.player.military, &self.config.truce);
        if self.dice.chance(chance) {
            self.accept_truce(id);
        } else {
            self.reject_truce(id);
        }
    }

    fn accept_truce(&mut self, id: TruceId) {
        let Some(truce) = self.truces.accept(id, self.world.turn).cloned() else {
            return;
        };
        let (proposer, target) = (truce.proposer, truce.target);
        self.end_war(proposer, target, PeaceReason::Truce, None);

        for side in [proposer, target] {
            if let Some(n) = side.nation().and_then(|id| self.world.get_nation_mut(id)) {
                n.status = Relationship::Truce;
            }
        }
        tracing::info!(truce = %id, %proposer, %target, end_turn = ?truce.end_turn, "truce accepted");

        self.record(
            EventType::TruceAccepted { truce: id, proposer, target },
            vec![proposer, target],
        );
        if proposer == Owner::Player {
            let name = self.world.display_name(target);
            self.notify(&format!("{} accepted the truce!", name), Severity::Success, NOTIFY_MS);
        }
        self.observer.render();
    }

    fn reject_truce(&mut self, id: TruceId) {
        let Some(truce) = self.truces.get(id).cloned() else {
            return;
        };
        if !self.truces.reject(id) {
            return;
        }
        self.record(
            EventType::TruceRejected {
                truce: id,
                proposer: truce.proposer,
                target: truce.target,
            },
            vec![truce.proposer, truce.target],
        );
        if truce.proposer == Owner::Player {
            let name = self.world.display_name(truce.target);
            self.notify(&format!("{} rejected the truce", name), Severity::Error, NOTIFY_MS);
        }
    }

    fn break_truce_unchecked(&mut self, id: TruceId) {
        let Some(truce) = self.truces.break_truce(id) else {
            return;
        };
        let victim = truce.counterpart(Owner::Player);
        let penalty = self.config.truce.break_opinion_penalty;
        if let Some(n) = victim.nation().and_then(|n| self.world.get_nation_mut(n)) {
            n.adjust_opinion(-penalty);
            n.status = Relationship::Hostile;
        }
        tracing::info!(truce = %id, %victim, "truce broken");
        self.record(
            EventType::TruceBroken { truce: id, breaker: Owner::Player, victim },
            vec![Owner::Player, victim],
        );
        let name = self.world.display_name(victim);
        self.notify(
            &format!("Truce with {} broken! They are now hostile.", name),
            Severity::Warning,
            NOTIFY_MS,
        );
    }

    fn check_truces(&mut self) {
        for truce in self.truces.expire_due(self.world.turn) {
            for side in [truce.proposer, truce.target] {
                if let Some(n) = side.nation().and_then(|id| self.world.get_nation_mut(id)) {
                    if n.status == Relationship::Truce {
                        n.clear_override();
                    }
                }
            }
            self.record(
                EventType::TruceExpired { truce: truce.id, a: truce.proposer, b: truce.target },
                vec![truce.proposer, truce.target],
            );
            let other = self.world.display_name(truce.counterpart(Owner::Player));
            self.notify(&format!("Truce with {} has ended", other), Severity::Info, NOTIFY_MS);
        }
    }

    // === PERIODIC SYSTEMS ===

    fn next_turn(&mut self) {
        self.world.turn += 1;
        let report = apply_player_turn(&mut self.world.player, &self.config.economy);
        let turn = self.world.turn;
        self.record(EventType::TurnBegan { turn }, vec![Owner::Player]);
        if report.negative {
            let money = self.world.player.money;
            self.record(EventType::TreasuryNegative { money }, vec![Owner::Player]);
        }
        if let Some(military) = report.disbanded {
            self.record(EventType::MilitaryDisbanded { military }, vec![Owner::Player]);
        }
        self.observer.render();
    }

    fn ai_tick(&mut self) {
        for id in self.world.nation_ids() {
            let owner = Owner::Nation(id);
            let ctx = PlanContext {
                player_military: self.world.player.military,
                can_expand: !self.world.map.expandable_for(owner).is_empty(),
                truce_pending: self.truces.pending_between(owner, Owner::Player).is_some(),
            };
            let intents = match self.world.get_nation_mut(id) {
                Some(nation) => plan_nation_turn(nation, &ctx, &self.config, &mut self.dice),
                None => continue,
            };
            for intent in intents {
                self.resolve_intent(id, intent);
            }
        }
        self.observer.render();
    }

    /// Apply one AI intent after re-checking it against the current state
    fn resolve_intent(&mut self, id: NationId, intent: Intent) {
        let owner = Owner::Nation(id);
        let Some(name) = self.world.get_nation(id).map(|n| n.name.clone()) else {
            return;
        };

        match intent {
            Intent::DeclareWarOnPlayer => {
                if self.world.at_war(owner, Owner::Player)
                    || self.world.allied(owner, Owner::Player)
                    || self.truces.active_between(owner, Owner::Player).is_some()
                {
                    return;
                }
                self.begin_war(owner, Owner::Player);
                self.notify(&format!("{} declared war!", name), Severity::Error, 5000);
            }
            Intent::ProposeAlliance { accepted } => {
                if self.world.allied(owner, Owner::Player) || self.world.at_war(owner, Owner::Player) {
                    return;
                }
                self.record(
                    EventType::AllianceProposed { from: owner, to: Owner::Player },
                    vec![owner, Owner::Player],
                );
                self.notify(&format!("{} wants to ally with you", name), Severity::Info, 4000);
                if accepted {
                    self.world.form_alliance(owner, Owner::Player);
                    self.record(
                        EventType::AllianceFormed { a: owner, b: Owner::Player },
                        vec![owner, Owner::Player],
                    );
                }
            }
            Intent::Expand => {
                let Some(territory) = self.world.map.expandable_for(owner).first().copied() else {
                    return;
                };
                let owned = self.world.territories_of(owner).len();
                let cost = expansion_cost(owned, &self.config.economy);
                let affordable = self.world.money(owner).map_or(false, |m| m >= cost);
                if !affordable || !self.world.claim(territory, owner) {
                    return;
                }
                if let Some(n) = self.world.get_nation_mut(id) {
                    n.money -= cost;
                }
                self.record(EventType::TerritoryExpanded { owner, territory, cost }, vec![owner]);
            }
            Intent::SeekTruce => {
                if !self.world.at_war(owner, Owner::Player)
                    || self.truces.active_between(owner, Owner::Player).is_some()
                    || self.truces.pending_between(owner, Owner::Player).is_some()
                {
                    return;
                }
                let duration = TruceDuration::Turns(self.config.truce.ai_proposal_turns);
                let terms = self.config.truce.default_terms.clone();
                let truce = self.truces.propose(owner, Owner::Player, duration, terms, self.world.turn);
                self.record(
                    EventType::TruceProposed { truce, proposer: owner, target: Owner::Player },
                    vec![owner, Owner::Player],
                );
                self.notify(&format!("{} proposed a truce!", name), Severity::Info, NOTIFY_MS);
            }
        }
    }

    // === READ MODELS ===

    pub fn war_stats(&self) -> WarStats {
        let p = &self.world.player;
        WarStats {
            active_wars: p.relations.wars.len(),
            military: p.military,
            wars_won: p.wars_won,
            wars_lost: p.wars_lost,
            territories_captured: p.territories_captured,
            peace_count: p.peace_count,
        }
    }

    pub fn expansion_stats(&self) -> ExpansionStats {
        let owned = self.world.player.territories.len();
        ExpansionStats {
            current_territories: owned,
            expandable_territories: self.world.map.expandable_for(Owner::Player).len(),
            next_expansion_cost: expansion_cost(owned, &self.config.economy),
            territory_value: owned as i64 * 1000,
        }
    }

    pub fn economy_stats(&self) -> EconomyStats {
        let p = &self.world.player;
        let income = systems::economy::player_income(p, &self.config.economy);
        let expenses = systems::economy::player_expenses(p, &self.config.economy);
        EconomyStats {
            money: p.money,
            income,
            expenses,
            net: income - expenses,
            population: p.population,
            allies: p.relations.allies.len(),
        }
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let cap = self.config.events.recent_cap;
        let recent_events = self
            .history
            .events
            .iter()
            .rev()
            .take(cap)
            .map(|e| format!("Day {}: {}", e.turn, e.event_type.describe(&self.world)))
            .collect();

        GameSnapshot {
            time: self.scheduler.now(),
            turn: self.world.turn,
            player: self.world.player.clone(),
            nations: self.world.nations.clone(),
            territories: self
                .world
                .map
                .territories
                .iter()
                .map(|t| TerritorySummary {
                    id: t.id,
                    owner: t.owner,
                    size: t.size,
                    terrain: t.terrain,
                    troops: t.troops,
                    resources: t.resources,
                    elevation: t.elevation,
                })
                .collect(),
            truces: self.truces.all().to_vec(),
            recent_events,
            war: self.war_stats(),
            expansion: self.expansion_stats(),
            economy: self.economy_stats(),
            total_events: self.history.total_recorded(),
        }
    }
}
