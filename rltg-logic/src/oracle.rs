//! Deterministic automaton oracles
//!
//! An oracle computes successor states on demand instead of materialising a
//! transition table up front, which is how compiled temporal formulas are
//! usually explored. The oracle itself is pure; the live position of a run is
//! kept by an [`OracleCursor`].

use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use crate::Interpretation;

/// A deterministic automaton whose transitions are computed on demand.
///
/// Implementations must be deterministic: the same state and interpretation
/// always yield the same successor.
pub trait DfaOracle {
    /// Opaque automaton state; only equality and hashing are relied upon
    type State: Clone + Eq + Hash + Debug;

    /// The initial state
    fn initial_state(&self) -> Self::State;

    /// Successor of `state` when `interpretation` is observed
    fn successor(&self, state: &Self::State, interpretation: &Interpretation) -> Self::State;

    /// Whether `state` is accepting
    fn is_accepting(&self, state: &Self::State) -> bool;

    /// Whether `state` is the failure sink, from which no accepting state is reachable
    fn is_failure(&self, state: &Self::State) -> bool;
}

impl<D: DfaOracle + ?Sized> DfaOracle for Arc<D> {
    type State = D::State;

    fn initial_state(&self) -> Self::State {
        (**self).initial_state()
    }

    fn successor(&self, state: &Self::State, interpretation: &Interpretation) -> Self::State {
        (**self).successor(state, interpretation)
    }

    fn is_accepting(&self, state: &Self::State) -> bool {
        (**self).is_accepting(state)
    }

    fn is_failure(&self, state: &Self::State) -> bool {
        (**self).is_failure(state)
    }
}

/// Live position of a run over an oracle
#[derive(Debug, Clone)]
pub struct OracleCursor<D: DfaOracle> {
    oracle: D,
    current: D::State,
}

impl<D: DfaOracle> OracleCursor<D> {
    /// Create a cursor positioned at the oracle's initial state
    pub fn new(oracle: D) -> Self {
        let current = oracle.initial_state();
        Self { oracle, current }
    }

    /// The underlying oracle
    pub fn oracle(&self) -> &D {
        &self.oracle
    }

    /// Rewind to the initial state
    pub fn reset(&mut self) {
        self.current = self.oracle.initial_state();
    }

    /// The state the cursor is at
    pub fn current_state(&self) -> &D::State {
        &self.current
    }

    /// Move along the transition labelled `interpretation`, returning the new state
    pub fn advance(&mut self, interpretation: &Interpretation) -> D::State {
        self.current = self.oracle.successor(&self.current, interpretation);
        self.current.clone()
    }

    /// Whether the current state is accepting
    pub fn is_accepting_now(&self) -> bool {
        self.oracle.is_accepting(&self.current)
    }

    /// Whether the current state is the failure sink
    pub fn is_failure_now(&self) -> bool {
        self.oracle.is_failure(&self.current)
    }

    /// Whether `state` is the failure sink
    pub fn is_failure_state(&self, state: &D::State) -> bool {
        self.oracle.is_failure(state)
    }

    /// Whether the oracle accepts `word` when read from its initial state.
    ///
    /// Runs on a private position; the cursor itself does not move.
    pub fn accepts<'w, I>(&self, word: I) -> bool
    where
        I: IntoIterator<Item = &'w Interpretation>,
    {
        let mut state = self.oracle.initial_state();
        for interpretation in word {
            state = self.oracle.successor(&state, interpretation);
        }
        self.oracle.is_accepting(&state)
    }
}
