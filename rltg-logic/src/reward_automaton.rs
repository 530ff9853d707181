//! Potential-based reward shaping over a discovered automaton

use std::collections::{BTreeSet, VecDeque};

use rltg_core::potential_shaping;

use crate::StateId;

/// Shaping view of a partially discovered automaton.
///
/// The potential of a state is `0` on failure states, `base_reward` on
/// accepting states, and `gamma^d * base_reward` for any other state whose
/// shortest discovered path to an accepting state has `d` transitions and
/// avoids failure states. States with no such path have potential `0`.
///
/// The value is immutable; the simulator builds a new one whenever it learns
/// a new transition.
#[derive(Debug, Clone, PartialEq)]
pub struct RewardAutomaton {
    potentials: Vec<f64>,
    accepting: BTreeSet<StateId>,
    failure: BTreeSet<StateId>,
    base_reward: f64,
    gamma: f64,
}

impl RewardAutomaton {
    /// Compute potentials for states `0..num_states` connected by `edges`
    pub fn new<I>(
        num_states: usize,
        edges: I,
        accepting: &BTreeSet<StateId>,
        failure: &BTreeSet<StateId>,
        base_reward: f64,
        gamma: f64,
    ) -> Self
    where
        I: IntoIterator<Item = (StateId, StateId)>,
    {
        let mut predecessors: Vec<Vec<StateId>> = vec![Vec::new(); num_states];
        for (from, to) in edges {
            if from < num_states && to < num_states && from != to {
                predecessors[to].push(from);
            }
        }

        let mut potentials = vec![0.0; num_states];
        let mut visited = vec![false; num_states];
        let mut queue = VecDeque::new();

        for &s in accepting {
            if s < num_states && !failure.contains(&s) {
                potentials[s] = base_reward;
                visited[s] = true;
                queue.push_back(s);
            }
        }
        for &s in failure {
            if s < num_states {
                visited[s] = true;
            }
        }

        // Reverse BFS: the first time a state is reached is along a shortest path.
        while let Some(s) = queue.pop_front() {
            for &p in &predecessors[s] {
                if !visited[p] {
                    visited[p] = true;
                    potentials[p] = gamma * potentials[s];
                    queue.push_back(p);
                }
            }
        }

        Self {
            potentials,
            accepting: accepting.clone(),
            failure: failure.clone(),
            base_reward,
            gamma,
        }
    }

    /// Potential of state `q`, `None` if `q` is outside the snapshot
    #[must_use]
    pub fn potential(&self, q: StateId) -> Option<f64> {
        self.potentials.get(q).copied()
    }

    /// Shaping reward `gamma * phi(q') - phi(q)` for the transition `q -> q'`
    #[must_use]
    pub fn potential_reward(&self, q: StateId, q_prime: StateId) -> Option<f64> {
        Some(potential_shaping(
            self.gamma,
            self.potential(q)?,
            self.potential(q_prime)?,
        ))
    }

    /// Number of states covered by the snapshot
    #[must_use]
    pub fn num_states(&self) -> usize {
        self.potentials.len()
    }

    /// Accepting states known to the snapshot
    #[must_use]
    pub fn accepting_states(&self) -> &BTreeSet<StateId> {
        &self.accepting
    }

    /// Failure states known to the snapshot
    #[must_use]
    pub fn failure_states(&self) -> &BTreeSet<StateId> {
        &self.failure
    }

    /// Discount factor
    #[must_use]
    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    /// Potential of accepting states
    #[must_use]
    pub fn base_reward(&self) -> f64 {
        self.base_reward
    }
}
