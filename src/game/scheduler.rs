//! Discrete-event scheduler on the game clock
//!
//! Replaces wall-clock intervals and timeouts: every periodic or delayed
//! action is a timer in a min-heap keyed by due time. Timers fire in
//! (due, scheduling order) order, so two runs with the same inputs fire the
//! same actions in the same order.

use ahash::AHashMap;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::core::types::GameTime;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Entry {
    due: GameTime,
    seq: u64,
    timer: TimerId,
}

impl Ord for Entry {
    // Reversed: BinaryHeap is a max-heap
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

struct Timer<A> {
    action: A,
    interval: Option<GameTime>,
}

pub struct Scheduler<A: Clone> {
    now: GameTime,
    heap: BinaryHeap<Entry>,
    timers: AHashMap<TimerId, Timer<A>>,
    next_timer: u64,
    next_seq: u64,
}

impl<A: Clone> Default for Scheduler<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Clone> Scheduler<A> {
    pub fn new() -> Self {
        Self {
            now: 0,
            heap: BinaryHeap::new(),
            timers: AHashMap::new(),
            next_timer: 0,
            next_seq: 0,
        }
    }

    pub fn now(&self) -> GameTime {
        self.now
    }

    /// Move the clock forward without firing anything
    pub fn set_now(&mut self, now: GameTime) {
        self.now = self.now.max(now);
    }

    fn push(&mut self, due: GameTime, timer: TimerId) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry { due, seq, timer });
    }

    fn register(&mut self, action: A, interval: Option<GameTime>) -> TimerId {
        let id = TimerId(self.next_timer);
        self.next_timer += 1;
        self.timers.insert(id, Timer { action, interval });
        id
    }

    /// Fire `action` once, `delay` ms from now
    pub fn schedule_in(&mut self, delay: GameTime, action: A) -> TimerId {
        let id = self.register(action, None);
        self.push(self.now + delay, id);
        id
    }

    /// Fire `action` every `interval` ms, first after one interval
    pub fn schedule_every(&mut self, interval: GameTime, action: A) -> TimerId {
        let interval = interval.max(1);
        let id = self.register(action, Some(interval));
        self.push(self.now + interval, id);
        id
    }

    /// Cancel a timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        // Heap entries of cancelled timers are skipped when popped
        self.timers.remove(&id).is_some()
    }

    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.timers.contains_key(&id)
    }

    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Due time of the next live timer
    pub fn peek_due(&mut self) -> Option<GameTime> {
        while let Some(entry) = self.heap.peek() {
            if self.timers.contains_key(&entry.timer) {
                return Some(entry.due);
            }
            self.heap.pop();
        }
        None
    }

    /// Pop the next timer due at or before `until`, advancing the clock to it.
    ///
    /// Recurring timers are re-armed before returning.
    pub fn pop_due(&mut self, until: GameTime) -> Option<(TimerId, A)> {
        loop {
            let entry = *self.heap.peek()?;
            if entry.due > until {
                return None;
            }
            self.heap.pop();

            let Some(timer) = self.timers.get(&entry.timer) else {
                continue;
            };
            let action = timer.action.clone();
            let interval = timer.interval;

            self.now = self.now.max(entry.due);
            match interval {
                Some(every) => self.push(entry.due + every, entry.timer),
                None => {
                    self.timers.remove(&entry.timer);
                }
            }
            return Some((entry.timer, action));
        }
    }
}
