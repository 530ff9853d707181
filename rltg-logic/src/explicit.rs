//! Explicit DFAs with propositional guards
//!
//! Compiling temporal formulas into automata is out of scope for this crate;
//! `ExplicitDfa` is a hand-built oracle used by environments, demos and tests.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use rltg_core::{RLError, Result};

use crate::{DfaOracle, Interpretation, Symbol};

/// Propositional formula labelling a DFA edge
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Guard {
    /// Always holds
    True,
    /// Never holds
    False,
    /// Holds when the symbol is true
    Atom(Symbol),
    /// Negation
    Not(Box<Guard>),
    /// Conjunction (empty conjunction holds)
    And(Vec<Guard>),
    /// Disjunction (empty disjunction does not hold)
    Or(Vec<Guard>),
}

impl Guard {
    /// Guard on a single symbol
    pub fn atom(symbol: impl Into<Symbol>) -> Self {
        Self::Atom(symbol.into())
    }

    /// Negation of `self`
    #[must_use]
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Disjunction of the given symbols
    pub fn any_of<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Symbol>,
    {
        Self::Or(symbols.into_iter().map(Self::atom).collect())
    }

    /// Evaluate the guard against an interpretation
    #[must_use]
    pub fn evaluate(&self, interpretation: &Interpretation) -> bool {
        match self {
            Self::True => true,
            Self::False => false,
            Self::Atom(s) => interpretation.contains(s),
            Self::Not(g) => !g.evaluate(interpretation),
            Self::And(gs) => gs.iter().all(|g| g.evaluate(interpretation)),
            Self::Or(gs) => gs.iter().any(|g| g.evaluate(interpretation)),
        }
    }

    /// Symbols mentioned by the guard
    #[must_use]
    pub fn atoms(&self) -> BTreeSet<Symbol> {
        let mut out = BTreeSet::new();
        self.collect_atoms(&mut out);
        out
    }

    fn collect_atoms(&self, out: &mut BTreeSet<Symbol>) {
        match self {
            Self::True | Self::False => {}
            Self::Atom(s) => {
                out.insert(s.clone());
            }
            Self::Not(g) => g.collect_atoms(out),
            Self::And(gs) | Self::Or(gs) => gs.iter().for_each(|g| g.collect_atoms(out)),
        }
    }
}

/// DFA over states `0..n` with ordered, guarded edges.
///
/// The first edge of a state whose guard holds is taken. When none holds the
/// run moves to the sink if one is declared and stays put otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplicitDfa {
    initial: usize,
    accepting: BTreeSet<usize>,
    sink: Option<usize>,
    edges: Vec<Vec<(Guard, usize)>>,
}

impl ExplicitDfa {
    /// Start building a DFA
    #[must_use]
    pub fn builder() -> ExplicitDfaBuilder {
        ExplicitDfaBuilder::default()
    }

    /// DFA for "eventually `s1`, and after that eventually `s2`, ...".
    ///
    /// With `strict`, observing a later symbol of the sequence before the one
    /// currently awaited enters the sink.
    pub fn sequence<I, S>(symbols: I, strict: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Symbol>,
    {
        let symbols: Vec<Symbol> = symbols.into_iter().map(Into::into).collect();
        let k = symbols.len();
        let sink = strict.then_some(k + 1);

        let mut edges = Vec::with_capacity(k + 2);
        for (i, symbol) in symbols.iter().enumerate() {
            let mut out = vec![(Guard::Atom(symbol.clone()), i + 1)];
            if let Some(sink) = sink {
                let later = &symbols[i + 1..];
                if !later.is_empty() {
                    out.push((Guard::any_of(later.iter().cloned()), sink));
                }
            }
            out.push((Guard::True, i));
            edges.push(out);
        }
        edges.push(vec![(Guard::True, k)]);
        if let Some(sink) = sink {
            edges.push(vec![(Guard::True, sink)]);
        }

        Self {
            initial: 0,
            accepting: BTreeSet::from([k]),
            sink,
            edges,
        }
    }

    /// Number of states
    #[must_use]
    pub fn num_states(&self) -> usize {
        self.edges.len()
    }

    /// Symbols mentioned by any guard
    #[must_use]
    pub fn symbols(&self) -> BTreeSet<Symbol> {
        self.edges
            .iter()
            .flatten()
            .flat_map(|(guard, _)| guard.atoms())
            .collect()
    }
}

impl DfaOracle for ExplicitDfa {
    type State = usize;

    fn initial_state(&self) -> usize {
        self.initial
    }

    fn successor(&self, state: &usize, interpretation: &Interpretation) -> usize {
        if self.sink == Some(*state) {
            return *state;
        }
        self.edges
            .get(*state)
            .and_then(|out| out.iter().find(|(guard, _)| guard.evaluate(interpretation)))
            .map_or_else(|| self.sink.unwrap_or(*state), |(_, to)| *to)
    }

    fn is_accepting(&self, state: &usize) -> bool {
        self.accepting.contains(state)
    }

    fn is_failure(&self, state: &usize) -> bool {
        self.sink == Some(*state)
    }
}

/// Builder for [`ExplicitDfa`]
#[derive(Debug, Clone, Default)]
pub struct ExplicitDfaBuilder {
    num_states: usize,
    initial: usize,
    accepting: BTreeSet<usize>,
    sink: Option<usize>,
    edges: Vec<(usize, Guard, usize)>,
}

impl ExplicitDfaBuilder {
    /// Add a state and return its id
    pub fn state(&mut self) -> usize {
        self.num_states += 1;
        self.num_states - 1
    }

    /// Add an edge; edges of the same source are tried in insertion order
    pub fn edge(&mut self, from: usize, guard: Guard, to: usize) -> &mut Self {
        self.edges.push((from, guard, to));
        self
    }

    /// Set the initial state (defaults to 0)
    pub fn initial(&mut self, state: usize) -> &mut Self {
        self.initial = state;
        self
    }

    /// Mark a state as accepting
    pub fn accepting(&mut self, state: usize) -> &mut Self {
        self.accepting.insert(state);
        self
    }

    /// Declare the failure sink
    pub fn sink(&mut self, state: usize) -> &mut Self {
        self.sink = Some(state);
        self
    }

    /// Validate and build the DFA
    pub fn build(&self) -> Result<ExplicitDfa> {
        let n = self.num_states;
        if n == 0 {
            return Err(RLError::InvalidAutomaton("automaton has no states".into()));
        }
        let check = |what: &str, s: usize| {
            if s < n {
                Ok(())
            } else {
                Err(RLError::InvalidAutomaton(format!(
                    "{what} state {s} out of range (automaton has {n} states)"
                )))
            }
        };

        check("initial", self.initial)?;
        for &s in &self.accepting {
            check("accepting", s)?;
        }
        if let Some(sink) = self.sink {
            check("sink", sink)?;
            if self.accepting.contains(&sink) {
                return Err(RLError::InvalidAutomaton(format!(
                    "sink state {sink} cannot be accepting"
                )));
            }
        }

        let mut edges = vec![Vec::new(); n];
        for (from, guard, to) in &self.edges {
            check("source", *from)?;
            check("target", *to)?;
            edges[*from].push((guard.clone(), *to));
        }

        Ok(ExplicitDfa {
            initial: self.initial,
            accepting: self.accepting.clone(),
            sink: self.sink,
            edges,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OracleCursor;

    fn i(symbols: &[&str]) -> Interpretation {
        symbols.iter().copied().collect()
    }

    #[test]
    fn test_guard_evaluation() {
        let g = Guard::And(vec![Guard::atom("a"), Guard::atom("b").negate()]);
        assert!(g.evaluate(&i(&["a"])));
        assert!(!g.evaluate(&i(&["a", "b"])));
        assert!(Guard::And(vec![]).evaluate(&i(&[])));
        assert!(!Guard::Or(vec![]).evaluate(&i(&["a"])));
        assert_eq!(g.atoms().len(), 2);
    }

    #[test]
    fn test_lenient_sequence() {
        let dfa = ExplicitDfa::sequence(["a", "b"], false);
        assert_eq!(dfa.num_states(), 3);
        let cursor = OracleCursor::new(dfa);
        assert!(cursor.accepts(&[i(&["b"]), i(&["a"]), i(&[]), i(&["b"])]));
        assert!(!cursor.accepts(&[i(&["b"]), i(&["a"])]));
    }

    #[test]
    fn test_strict_sequence_fails_out_of_order() {
        let dfa = ExplicitDfa::sequence(["a", "b", "c"], true);
        assert_eq!(dfa.num_states(), 5);
        assert!(dfa.is_failure(&4));
        assert_eq!(dfa.successor(&0, &i(&["b"])), 4);
        assert_eq!(dfa.successor(&0, &i(&["a", "b"])), 1);
        assert_eq!(dfa.successor(&4, &i(&["a"])), 4);
        assert_eq!(dfa.successor(&3, &i(&["a"])), 3);
        assert!(dfa.is_accepting(&3));
        assert_eq!(dfa.symbols().len(), 3);
    }

    #[test]
    fn test_builder_validates_ids() {
        let mut b = ExplicitDfa::builder();
        let q0 = b.state();
        b.edge(q0, Guard::True, 3);
        assert!(matches!(b.build(), Err(RLError::InvalidAutomaton(_))));

        let mut b = ExplicitDfa::builder();
        let q0 = b.state();
        b.accepting(q0).sink(q0);
        assert!(b.build().is_err());

        assert!(ExplicitDfa::builder().build().is_err());
    }

    #[test]
    fn test_unmatched_input_goes_to_sink() {
        let mut b = ExplicitDfa::builder();
        let start = b.state();
        let done = b.state();
        let dead = b.state();
        b.edge(start, Guard::atom("go"), done)
            .edge(start, Guard::atom("wait"), start)
            .edge(done, Guard::True, done)
            .accepting(done)
            .sink(dead);
        let dfa = b.build().unwrap();

        assert_eq!(dfa.successor(&start, &i(&["wait"])), start);
        assert_eq!(dfa.successor(&start, &i(&[])), dead);
        assert_eq!(dfa.successor(&start, &i(&["go"])), done);
    }
}
