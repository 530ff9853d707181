//! Append-only bookkeeping of discovered automaton structure

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::hash::Hash;
use tracing::warn;

use crate::Interpretation;

/// Dense integer id of a discovered automaton state
pub type StateId = usize;

/// Bijection between opaque oracle states and dense ids.
///
/// Ids are handed out in encounter order starting at 0 and never rebound.
#[derive(Debug, Clone)]
pub struct StateIndex<S> {
    states: IndexSet<S>,
}

impl<S: Eq + Hash> StateIndex<S> {
    /// Create an empty index
    #[must_use]
    pub fn new() -> Self {
        Self {
            states: IndexSet::new(),
        }
    }

    /// Id of `state`, registering it if unseen. The flag is `true` for a fresh id.
    pub fn insert(&mut self, state: S) -> (StateId, bool) {
        self.states.insert_full(state)
    }

    /// Id of `state`, if it has been registered
    pub fn get(&self, state: &S) -> Option<StateId> {
        self.states.get_index_of(state)
    }

    /// The state registered under `id`
    #[must_use]
    pub fn state(&self, id: StateId) -> Option<&S> {
        self.states.get_index(id)
    }

    /// Number of registered states
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether no state is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl<S: Eq + Hash> Default for StateIndex<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// One recorded transition
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// Source state id
    pub from: StateId,
    /// Observed interpretation
    pub label: Interpretation,
    /// Destination state id
    pub to: StateId,
}

/// Partial transition function `(source, interpretation) -> destination`.
///
/// Entries are only ever added.
#[derive(Debug, Clone, Default)]
pub struct TransitionTable {
    entries: BTreeMap<(StateId, Interpretation), StateId>,
}

impl TransitionTable {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a transition; returns `true` if it was not known before.
    ///
    /// An existing entry is never altered.
    pub fn insert(&mut self, from: StateId, label: Interpretation, to: StateId) -> bool {
        match self.entries.entry((from, label)) {
            Entry::Vacant(slot) => {
                slot.insert(to);
                true
            }
            Entry::Occupied(slot) => {
                if *slot.get() != to {
                    warn!(
                        from,
                        label = %slot.key().1,
                        recorded = *slot.get(),
                        observed = to,
                        "oracle is not deterministic; keeping the recorded destination"
                    );
                }
                false
            }
        }
    }

    /// Destination recorded for `(from, label)`
    #[must_use]
    pub fn get(&self, from: StateId, label: &Interpretation) -> Option<StateId> {
        // BTreeMap lookups need an owned tuple key.
        self.entries.get(&(from, label.clone())).copied()
    }

    /// Number of recorded transitions
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(from, to)` pairs of every recorded transition
    pub fn edges(&self) -> impl Iterator<Item = (StateId, StateId)> + '_ {
        self.entries.iter().map(|((from, _), to)| (*from, *to))
    }

    /// Every recorded transition, ordered by source then label
    pub fn records(&self) -> impl Iterator<Item = TransitionRecord> + '_ {
        self.entries.iter().map(|((from, label), to)| TransitionRecord {
            from: *from,
            label: label.clone(),
            to: *to,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_is_first_seen_wins() {
        let mut index = StateIndex::new();
        assert_eq!(index.insert("q0"), (0, true));
        assert_eq!(index.insert("q1"), (1, true));
        assert_eq!(index.insert("q0"), (0, false));
        assert_eq!(index.get(&"q1"), Some(1));
        assert_eq!(index.state(1), Some(&"q1"));
        assert_eq!(index.get(&"q2"), None);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_transition_table_never_overwrites() {
        let mut table = TransitionTable::new();
        let a: Interpretation = ["a"].into_iter().collect();
        assert!(table.insert(0, a.clone(), 1));
        assert!(!table.insert(0, a.clone(), 1));
        assert!(!table.insert(0, a.clone(), 2));
        assert_eq!(table.get(0, &a), Some(1));
        assert_eq!(table.len(), 1);
        assert_eq!(table.edges().collect::<Vec<_>>(), vec![(0, 1)]);
    }
}
