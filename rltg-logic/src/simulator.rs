//! On-the-fly automaton simulation with incremental reward shaping
//!
//! [`PartialAutomatonSimulator`] follows a run of a [`DfaOracle`] while the
//! agent acts. Every state it meets gets a dense id, every transition it
//! observes is recorded, and after each newly learned transition the
//! [`RewardAutomaton`] is rebuilt so that shaping potentials reflect all the
//! structure discovered so far. That knowledge survives episode resets.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info};

use rltg_core::{RLError, Result};

use crate::{
    Alphabet, DfaOracle, Interpretation, OracleCursor, RewardAutomaton, StateId, StateIndex,
    Symbol, TransitionRecord, TransitionTable,
};

/// Reward shaping parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapingConfig {
    /// Potential of accepting states; failures are penalised by its negation
    pub base_reward: f64,
    /// Discount factor used by the potentials
    pub gamma: f64,
    /// Fraction of `base_reward` granted for a state change before any
    /// accepting state is known
    pub exploration_bonus: f64,
}

impl Default for ShapingConfig {
    fn default() -> Self {
        Self {
            base_reward: 10_000.0,
            gamma: 0.99,
            exploration_bonus: 1e-3,
        }
    }
}

impl ShapingConfig {
    /// Check that potentials order states as intended.
    ///
    /// Requires `0 <= gamma < 1`, a positive finite `base_reward` and a
    /// non-negative finite `exploration_bonus`.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.gamma) {
            return Err(RLError::InvalidConfig(format!(
                "gamma must be in [0, 1), got {}",
                self.gamma
            )));
        }
        if !(self.base_reward.is_finite() && self.base_reward > 0.0) {
            return Err(RLError::InvalidConfig(format!(
                "base_reward must be positive and finite, got {}",
                self.base_reward
            )));
        }
        if !(self.exploration_bonus.is_finite() && self.exploration_bonus >= 0.0) {
            return Err(RLError::InvalidConfig(format!(
                "exploration_bonus must be non-negative and finite, got {}",
                self.exploration_bonus
            )));
        }
        Ok(())
    }
}

/// Serializable export of the discovered automaton
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutomatonSnapshot {
    /// Number of discovered states
    pub num_states: usize,
    /// Initial state id
    pub initial: StateId,
    /// Recorded transitions, ordered by source then label
    pub transitions: Vec<TransitionRecord>,
    /// Discovered accepting states
    pub accepting: Vec<StateId>,
    /// Discovered failure states
    pub failure: Vec<StateId>,
}

/// Incrementally discovered automaton with potential-based shaping rewards
#[derive(Debug)]
pub struct PartialAutomatonSimulator<D: DfaOracle> {
    cursor: OracleCursor<D>,
    alphabet: Alphabet,
    config: ShapingConfig,
    index: StateIndex<D::State>,
    transitions: TransitionTable,
    accepting: BTreeSet<StateId>,
    failure: BTreeSet<StateId>,
    automaton: RewardAutomaton,
}

impl<D: DfaOracle> PartialAutomatonSimulator<D> {
    /// Id of the oracle's initial state
    pub const INITIAL_STATE: StateId = 0;

    /// Start simulating `oracle` over `alphabet`.
    ///
    /// Fails with [`RLError::InvalidConfig`] if `config` does not validate.
    pub fn new(oracle: D, alphabet: Alphabet, config: ShapingConfig) -> Result<Self> {
        config.validate()?;
        let cursor = OracleCursor::new(oracle);
        let mut index = StateIndex::new();
        index.insert(cursor.current_state().clone());

        let accepting = BTreeSet::new();
        let failure = BTreeSet::new();
        let transitions = TransitionTable::new();
        let automaton = RewardAutomaton::new(
            index.len(),
            transitions.edges(),
            &accepting,
            &failure,
            config.base_reward,
            config.gamma,
        );

        Ok(Self {
            cursor,
            alphabet,
            config,
            index,
            transitions,
            accepting,
            failure,
            automaton,
        })
    }

    /// Rewind the oracle to its initial state.
    ///
    /// Discovered states, ids and transitions are kept.
    pub fn reset(&mut self) {
        self.cursor.reset();
    }

    /// Advance on the observed symbols and return the shaping reward.
    ///
    /// Symbols outside the alphabet are ignored.
    pub fn make_transition<I, S>(&mut self, symbols: I) -> f64
    where
        I: IntoIterator<Item = S>,
        S: Into<Symbol>,
    {
        let interpretation = self.alphabet.interpretation(symbols);

        let old_state = self.cursor.current_state().clone();
        let new_state = self.cursor.advance(&interpretation);

        let old_id = self.register(old_state);
        let new_id = self.register(new_state.clone());
        self.record(old_id, interpretation, new_id, &new_state);

        if !self.automaton.accepting_states().is_empty() {
            // Both ids were registered before the rebuild, so they are in the snapshot.
            self.automaton
                .potential_reward(old_id, new_id)
                .unwrap_or_default()
        } else if self.cursor.is_failure_state(&new_state) {
            -self.config.base_reward
        } else if old_id != new_id {
            self.config.base_reward * self.config.exploration_bonus
        } else {
            0.0
        }
    }

    /// Shaping reward of the known transition `q -> q_prime`, without moving the oracle
    pub fn get_immediate_reward(&self, q: StateId, q_prime: StateId) -> Result<f64> {
        self.automaton.potential_reward(q, q_prime).ok_or_else(|| {
            let known = self.automaton.num_states();
            RLError::UnknownAutomatonState {
                id: if q >= known { q } else { q_prime },
                known,
            }
        })
    }

    /// Whether the oracle sits in the failure sink
    pub fn is_failed(&self) -> bool {
        self.cursor.is_failure_now()
    }

    /// Whether the oracle sits in an accepting state
    pub fn is_true(&self) -> bool {
        self.cursor.is_accepting_now()
    }

    /// Whether `word` is accepted from the initial state.
    ///
    /// Runs on a private position: the live run and the discovered structure
    /// are untouched.
    pub fn word_acceptance<W, I, S>(&self, word: W) -> bool
    where
        W: IntoIterator<Item = I>,
        I: IntoIterator<Item = S>,
        S: Into<Symbol>,
    {
        let word: Vec<Interpretation> = word
            .into_iter()
            .map(|symbols| self.alphabet.interpretation(symbols))
            .collect();
        self.cursor.accepts(&word)
    }

    /// Id of the oracle's current state, registering it if unseen
    pub fn get_cur_state(&mut self) -> StateId {
        let state = self.cursor.current_state().clone();
        self.register(state)
    }

    /// The oracle state the live run is in
    pub fn current_state(&self) -> &D::State {
        self.cursor.current_state()
    }

    /// Id of the oracle's current state, if already registered
    pub fn cur_state_id(&self) -> Option<StateId> {
        self.index.get(self.cursor.current_state())
    }

    /// Id assigned to `state`, if it has been seen
    pub fn state_id(&self, state: &D::State) -> Option<StateId> {
        self.index.get(state)
    }

    /// Recorded destination of `(from, label)`
    pub fn transition(&self, from: StateId, label: &Interpretation) -> Option<StateId> {
        self.transitions.get(from, label)
    }

    /// Number of discovered states
    pub fn num_states(&self) -> usize {
        self.index.len()
    }

    /// Number of recorded transitions
    pub fn num_transitions(&self) -> usize {
        self.transitions.len()
    }

    /// Discovered accepting states
    pub fn accepting_states(&self) -> &BTreeSet<StateId> {
        &self.accepting
    }

    /// Discovered failure states
    pub fn failure_states(&self) -> &BTreeSet<StateId> {
        &self.failure
    }

    /// Current shaping view
    pub fn reward_automaton(&self) -> &RewardAutomaton {
        &self.automaton
    }

    /// Alphabet the simulator reads
    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Shaping parameters
    pub fn config(&self) -> &ShapingConfig {
        &self.config
    }

    /// The underlying oracle
    pub fn oracle(&self) -> &D {
        self.cursor.oracle()
    }

    /// Export the discovered automaton
    pub fn snapshot(&self) -> AutomatonSnapshot {
        AutomatonSnapshot {
            num_states: self.index.len(),
            initial: Self::INITIAL_STATE,
            transitions: self.transitions.records().collect(),
            accepting: self.accepting.iter().copied().collect(),
            failure: self.failure.iter().copied().collect(),
        }
    }

    fn register(&mut self, state: D::State) -> StateId {
        let (id, fresh) = self.index.insert(state);
        if fresh {
            debug!(id, state = ?self.index.state(id), "discovered automaton state");
        }
        id
    }

    fn record(&mut self, from: StateId, label: Interpretation, to: StateId, to_state: &D::State) {
        if !self.transitions.insert(from, label.clone(), to) {
            return;
        }
        debug!(from, %label, to, "recorded automaton transition");

        if self.cursor.is_failure_state(to_state) {
            self.failure.insert(to);
        } else if self.cursor.oracle().is_accepting(to_state) && self.accepting.insert(to) {
            if self.accepting.len() == 1 {
                info!(state = to, "first accepting state discovered");
            } else {
                debug!(state = to, "accepting state discovered");
            }
        }

        self.automaton = RewardAutomaton::new(
            self.index.len(),
            self.transitions.edges(),
            &self.accepting,
            &self.failure,
            self.config.base_reward,
            self.config.gamma,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ExplicitDfa, Guard};
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use std::collections::HashMap;

    const BASE: f64 = 10_000.0;
    const GAMMA: f64 = 0.99;

    fn config() -> ShapingConfig {
        ShapingConfig {
            base_reward: BASE,
            gamma: GAMMA,
            ..ShapingConfig::default()
        }
    }

    fn simulator(symbols: &[&str], strict: bool) -> PartialAutomatonSimulator<ExplicitDfa> {
        PartialAutomatonSimulator::new(
            ExplicitDfa::sequence(symbols.iter().copied(), strict),
            Alphabet::new(symbols.iter().copied()),
            config(),
        )
        .unwrap()
    }

    fn label(symbols: &[&str]) -> Interpretation {
        symbols.iter().copied().collect()
    }

    #[test]
    fn test_ids_and_rewards_before_discovery() {
        let mut sim = simulator(&["a", "b", "c"], true);
        let nudge = BASE * 1e-3;

        let trace: [&[&str]; 3] = [&[], &["a"], &["a", "b"]];
        let rewards: Vec<f64> = trace
            .into_iter()
            .map(|symbols| sim.make_transition(symbols.iter().copied()))
            .collect();

        assert_eq!(rewards, vec![0.0, nudge, nudge]);
        assert_eq!(sim.get_cur_state(), 2);
        assert_eq!(sim.num_states(), 3);
        assert_eq!(sim.num_transitions(), 3);
        assert_eq!(sim.transition(0, &label(&[])), Some(0));
        assert_eq!(sim.transition(1, &label(&["a", "b"])), Some(2));
        assert!(sim.accepting_states().is_empty());
    }

    #[test]
    fn test_reset_keeps_discovered_structure() {
        let mut sim = simulator(&["a", "b", "c"], true);
        sim.make_transition(["a"]);
        sim.make_transition(["b"]);
        let before = sim.snapshot();

        sim.reset();
        assert_eq!(sim.get_cur_state(), 0);
        assert_eq!(sim.snapshot(), before);

        // Replaying the same trace reuses ids and adds nothing.
        assert_relative_eq!(sim.make_transition(["a"]), BASE * 1e-3);
        assert_eq!(sim.get_cur_state(), 1);
        sim.make_transition(["b"]);
        assert_eq!(sim.get_cur_state(), 2);
        assert_eq!(sim.snapshot(), before);
    }

    #[test]
    fn test_failure_penalty_persists_in_sink() {
        let mut sim = simulator(&["a", "b"], true);
        assert_relative_eq!(sim.make_transition(["b"]), -BASE);
        assert!(sim.is_failed());
        assert!(!sim.is_true());
        let sink = sim.get_cur_state();
        assert!(sim.failure_states().contains(&sink));

        let trace: [&[&str]; 3] = [&["a"], &[], &["a", "b"]];
        for symbols in trace {
            assert_relative_eq!(sim.make_transition(symbols.iter().copied()), -BASE);
            assert_eq!(sim.get_cur_state(), sink);
        }
    }

    #[test]
    fn test_self_loop_is_neutral_before_discovery() {
        let mut sim = simulator(&["a", "b"], false);
        assert_eq!(sim.make_transition(Vec::<Symbol>::new()), 0.0);
        assert_eq!(sim.make_transition(["b"]), 0.0);
        assert_eq!(sim.get_cur_state(), 0);
    }

    #[test]
    fn test_out_of_alphabet_symbols_are_ignored() {
        let mut sim = simulator(&["a", "b"], true);
        assert_eq!(sim.make_transition(["zzz"]), 0.0);
        assert_eq!(sim.get_cur_state(), 0);
        assert_eq!(sim.transition(0, &label(&[])), Some(0));
        assert_eq!(sim.transition(0, &label(&["zzz"])), None);
    }

    #[test]
    fn test_nudge_is_configurable() {
        let mut sim = PartialAutomatonSimulator::new(
            ExplicitDfa::sequence(["a", "b"], false),
            Alphabet::new(["a", "b"]),
            ShapingConfig {
                exploration_bonus: 1e-4,
                ..config()
            },
        )
        .unwrap();
        assert_relative_eq!(sim.make_transition(["a"]), 1.0);
    }

    #[test]
    fn test_potential_rewards_after_discovery() {
        let mut sim = simulator(&["a", "b"], false);
        assert_relative_eq!(sim.make_transition(["a"]), BASE * 1e-3);
        // Reaching the goal: gamma * phi(goal) - phi(1) with phi(1) = gamma * phi(goal).
        assert_relative_eq!(sim.make_transition(["b"]), 0.0, epsilon = 1e-9);
        assert!(sim.is_true());
        assert_eq!(sim.accepting_states().iter().copied().collect::<Vec<_>>(), vec![2]);

        sim.reset();
        // Progress along the shortest path is neutral, stalling is penalised.
        let stall = sim.make_transition(Vec::<Symbol>::new());
        assert_relative_eq!(stall, (GAMMA - 1.0) * GAMMA * GAMMA * BASE, epsilon = 1e-9);
        assert_relative_eq!(sim.make_transition(["a"]), 0.0, epsilon = 1e-9);
        assert_relative_eq!(sim.get_immediate_reward(0, 1).unwrap(), 0.0, epsilon = 1e-9);
        assert_relative_eq!(
            sim.get_immediate_reward(2, 2).unwrap(),
            (GAMMA - 1.0) * BASE,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_chain_potentials_with_failure_branch() {
        let mut b = ExplicitDfa::builder();
        let initial = b.state();
        let mid = b.state();
        let goal = b.state();
        let fail = b.state();
        b.edge(initial, Guard::atom("f"), fail)
            .edge(initial, Guard::atom("m"), mid)
            .edge(initial, Guard::True, initial)
            .edge(mid, Guard::atom("g"), goal)
            .edge(mid, Guard::True, mid)
            .edge(goal, Guard::True, goal)
            .accepting(goal)
            .sink(fail);
        let mut sim =
            PartialAutomatonSimulator::new(b.build().unwrap(), Alphabet::new(["f", "m", "g"]), config())
                .unwrap();

        sim.make_transition(["m"]);
        sim.make_transition(["g"]);
        sim.reset();
        sim.make_transition(["f"]);
        assert!(sim.is_failed());

        let (q0, q1, q2, q3) = (
            sim.state_id(&initial).unwrap(),
            sim.state_id(&mid).unwrap(),
            sim.state_id(&goal).unwrap(),
            sim.state_id(&fail).unwrap(),
        );
        assert_eq!((q0, q1, q2, q3), (0, 1, 2, 3));

        let ra = sim.reward_automaton();
        let phi = |q| ra.potential(q).unwrap();
        assert_relative_eq!(phi(q2), BASE);
        assert_eq!(phi(q3), 0.0);
        assert!(GAMMA * phi(q1) - phi(q0) <= GAMMA * phi(q2) - phi(q1) + 1e-9);
        assert!(phi(q2) > phi(q1) && phi(q1) >= phi(q3));

        // With potentials available the failure transition is scored by them.
        assert_relative_eq!(
            sim.get_immediate_reward(q0, q3).unwrap(),
            -phi(q0),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_out_of_range_shaping_is_rejected() {
        let rejected = [
            ShapingConfig { gamma: 1.0, ..config() },
            ShapingConfig { gamma: 1.5, ..config() },
            ShapingConfig { gamma: -0.1, ..config() },
            ShapingConfig { gamma: f64::NAN, ..config() },
            ShapingConfig { base_reward: 0.0, ..config() },
            ShapingConfig { base_reward: -1.0, ..config() },
            ShapingConfig { exploration_bonus: -1e-3, ..config() },
        ];
        for shaping in rejected {
            let result = PartialAutomatonSimulator::new(
                ExplicitDfa::sequence(["a", "b"], false),
                Alphabet::new(["a", "b"]),
                shaping,
            );
            assert!(
                matches!(result, Err(RLError::InvalidConfig(_))),
                "accepted {shaping:?}"
            );
        }

        let json: ShapingConfig = serde_json::from_str(r#"{"gamma": 1.0}"#).unwrap();
        assert!(json.validate().is_err());
        assert!(ShapingConfig::default().validate().is_ok());
    }

    #[test]
    fn test_accepting_potential_dominates() {
        let mut sim = simulator(&["a", "b"], false);
        sim.make_transition(["a"]);
        sim.make_transition(["b"]);

        let ra = sim.reward_automaton();
        let phi = |q| ra.potential(q).unwrap();
        assert!(phi(2) > phi(1) && phi(1) > phi(0) && phi(0) > 0.0);
    }

    #[test]
    fn test_unknown_ids_are_reported() {
        let sim = simulator(&["a"], false);
        assert!(matches!(
            sim.get_immediate_reward(0, 5),
            Err(RLError::UnknownAutomatonState { id: 5, known: 1 })
        ));
    }

    #[test]
    fn test_word_acceptance_is_pure() {
        let mut sim = simulator(&["a", "b"], true);
        sim.make_transition(["a"]);
        let cur = sim.get_cur_state();
        let transitions = sim.num_transitions();
        let states = sim.num_states();

        assert!(sim.word_acceptance([vec!["a"], vec![], vec!["b"]]));
        assert!(!sim.word_acceptance([vec!["b"], vec!["a"], vec!["b"]]));
        assert!(!sim.word_acceptance(Vec::<Vec<&str>>::new()));

        assert_eq!(sim.get_cur_state(), cur);
        assert_eq!(sim.num_transitions(), transitions);
        assert_eq!(sim.num_states(), states);
        assert!(!sim.is_failed());
    }

    #[test]
    fn test_snapshot_export() {
        let mut sim = simulator(&["a", "b"], true);
        sim.make_transition(["a"]);
        sim.make_transition(["a"]);
        sim.make_transition(["b"]);

        let snapshot = sim.snapshot();
        assert_eq!(snapshot.num_states, 3);
        assert_eq!(snapshot.initial, 0);
        assert_eq!(snapshot.accepting, vec![2]);
        assert!(snapshot.failure.is_empty());
        assert_eq!(
            snapshot.transitions,
            vec![
                TransitionRecord { from: 0, label: label(&["a"]), to: 1 },
                TransitionRecord { from: 1, label: label(&["a"]), to: 1 },
                TransitionRecord { from: 1, label: label(&["b"]), to: 2 },
            ]
        );

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["transitions"][2]["label"], serde_json::json!(["b"]));
    }

    #[derive(Debug, Clone)]
    enum Op {
        Step(u8),
        Reset,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![4 => any::<u8>().prop_map(Op::Step), 1 => Just(Op::Reset)]
    }

    const SYMBOLS: [&str; 4] = ["a", "b", "c", "x"];

    fn symbols_of(mask: u8) -> Vec<&'static str> {
        SYMBOLS
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, s)| *s)
            .collect()
    }

    proptest! {
        #[test]
        fn prop_ids_are_dense_and_stable(ops in prop::collection::vec(op(), 0..64)) {
            let mut sim = simulator(&["a", "b", "c"], true);
            let mut seen: HashMap<usize, StateId> = HashMap::new();
            seen.insert(0, 0);

            for op in ops {
                match op {
                    Op::Step(mask) => { sim.make_transition(symbols_of(mask)); }
                    Op::Reset => sim.reset(),
                }
                let state = *sim.current_state();
                let id = sim.get_cur_state();
                if let Some(prev) = seen.insert(state, id) {
                    prop_assert_eq!(prev, id);
                }
                for (state, id) in &seen {
                    prop_assert_eq!(sim.state_id(state), Some(*id));
                }
                let ids: BTreeSet<StateId> = seen.values().copied().collect();
                prop_assert_eq!(ids, (0..sim.num_states()).collect::<BTreeSet<_>>());
            }
        }

        #[test]
        fn prop_transitions_are_append_only(
            ops in prop::collection::vec(op(), 0..64),
            checkpoint in 0usize..64,
        ) {
            let mut sim = simulator(&["a", "b", "c"], true);
            let mut saved: Option<BTreeSet<TransitionRecord>> = None;

            for (i, op) in ops.into_iter().enumerate() {
                if i == checkpoint {
                    saved = Some(sim.snapshot().transitions.into_iter().collect());
                }
                match op {
                    Op::Step(mask) => { sim.make_transition(symbols_of(mask)); }
                    Op::Reset => sim.reset(),
                }
                if let Some(saved) = &saved {
                    let now: BTreeSet<TransitionRecord> =
                        sim.snapshot().transitions.into_iter().collect();
                    prop_assert!(saved.is_subset(&now));
                }
            }
        }
    }
}
