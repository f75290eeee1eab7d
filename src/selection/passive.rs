//! Passive clause queue with the age/weight ratio heuristic
//!
//! The queue alternates deterministically between popping the oldest
//! clause (breadth) and the lightest clause (greed) according to a
//! configured ratio. Penalties shift a clause's effective weight. Ties
//! break by clause id, so the whole saturation is deterministic.

use indexmap::IndexMap;

use crate::logic::clause::ClauseId;

#[derive(Debug, Clone, Copy)]
struct PassiveEntry {
    weight: u32,
    age: u32,
}

/// Priority queue over passive clauses.
#[derive(Debug, Default)]
pub struct PassiveQueue {
    /// Picks per cycle devoted to age (first) and weight (second)
    ratio: (u32, u32),
    tick: u32,
    /// Insertion-ordered so the oldest entry is always first
    entries: IndexMap<ClauseId, PassiveEntry>,
}

impl PassiveQueue {
    /// A queue alternating `ratio.0` age picks and `ratio.1` weight picks
    /// per cycle. A zero ratio on both sides degenerates to age order.
    pub fn new(ratio: (u32, u32)) -> Self {
        PassiveQueue {
            ratio,
            tick: 0,
            entries: IndexMap::new(),
        }
    }

    /// Enqueue a clause. `weight` should already include any penalty.
    pub fn push(&mut self, id: ClauseId, weight: u32, age: u32) {
        self.entries.insert(id, PassiveEntry { weight, age });
    }

    /// Remove a clause (backward simplification, orphan cancellation).
    pub fn remove(&mut self, id: ClauseId) -> bool {
        self.entries.shift_remove(&id).is_some()
    }

    pub fn contains(&self, id: ClauseId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ClauseId> + '_ {
        self.entries.keys().copied()
    }

    /// Pop the next given clause, alternating age and weight picks.
    pub fn pop(&mut self) -> Option<ClauseId> {
        if self.entries.is_empty() {
            return None;
        }

        let (age_picks, weight_picks) = self.ratio;
        let cycle = age_picks + weight_picks;
        let by_age = cycle == 0 || self.tick % cycle < age_picks;
        self.tick = self.tick.wrapping_add(1);

        let index = if by_age {
            // Oldest: smallest age, then smallest id
            self.entries
                .iter()
                .enumerate()
                .min_by_key(|&(_, (id, e))| (e.age, *id))
                .map(|(i, _)| i)
                .unwrap_or(0)
        } else {
            // Lightest: smallest weight, then smallest id
            self.entries
                .iter()
                .enumerate()
                .min_by_key(|&(_, (id, e))| (e.weight, *id))
                .map(|(i, _)| i)
                .unwrap_or(0)
        };

        self.entries.shift_remove_index(index).map(|(id, _)| id)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.tick = 0;
    }
}
