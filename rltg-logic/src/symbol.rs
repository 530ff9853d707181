//! Propositional symbols, interpretations and alphabets

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Atomic proposition name, e.g. `"r0"`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Create a new symbol
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Name of the symbol
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl From<String> for Symbol {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The set of symbols that hold at one timestep.
///
/// Two interpretations are equal iff their symbol sets are equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Interpretation(BTreeSet<Symbol>);

impl Interpretation {
    /// Interpretation where every symbol is false
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether `symbol` is true
    #[must_use]
    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.0.contains(symbol)
    }

    /// Whether the symbol named `name` is true
    #[must_use]
    pub fn holds(&self, name: &str) -> bool {
        self.0.iter().any(|s| s.as_str() == name)
    }

    /// Iterate over the true symbols in order
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.0.iter()
    }

    /// Number of true symbols
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no symbol is true
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<Symbol>> FromIterator<S> for Interpretation {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for Interpretation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, symbol) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{symbol}")?;
        }
        f.write_str("}")
    }
}

/// All interpretations over a fixed set of base symbols.
///
/// Logically the powerset of the base symbols; only the base symbols are stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alphabet {
    symbols: Vec<Symbol>,
}

impl Alphabet {
    /// Create an alphabet over the given base symbols (duplicates are merged)
    pub fn new<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Symbol>,
    {
        let set: BTreeSet<Symbol> = symbols.into_iter().map(Into::into).collect();
        Self {
            symbols: set.into_iter().collect(),
        }
    }

    /// Base symbols, sorted
    #[must_use]
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Number of interpretations (`2^n`), `None` if it does not fit in a `usize`
    #[must_use]
    pub fn num_interpretations(&self) -> Option<usize> {
        u32::try_from(self.symbols.len())
            .ok()
            .and_then(|n| 1_usize.checked_shl(n))
    }

    /// Whether every symbol of `interpretation` belongs to this alphabet
    #[must_use]
    pub fn contains(&self, interpretation: &Interpretation) -> bool {
        interpretation
            .iter()
            .all(|s| self.symbols.binary_search(s).is_ok())
    }

    /// Build an interpretation from observed symbols, dropping those outside the alphabet
    pub fn interpretation<I, S>(&self, symbols: I) -> Interpretation
    where
        I: IntoIterator<Item = S>,
        S: Into<Symbol>,
    {
        symbols
            .into_iter()
            .map(Into::into)
            .filter(|s| self.symbols.binary_search(s).is_ok())
            .collect()
    }

    /// Lazily enumerate every interpretation, starting with the empty one
    #[must_use]
    pub fn iter(&self) -> Interpretations<'_> {
        Interpretations {
            symbols: &self.symbols,
            selected: vec![false; self.symbols.len()],
            done: false,
        }
    }
}

/// Iterator over the powerset of an alphabet's symbols
#[derive(Debug, Clone)]
pub struct Interpretations<'a> {
    symbols: &'a [Symbol],
    selected: Vec<bool>,
    done: bool,
}

impl Iterator for Interpretations<'_> {
    type Item = Interpretation;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let item = self
            .symbols
            .iter()
            .zip(&self.selected)
            .filter(|(_, on)| **on)
            .map(|(s, _)| s.clone())
            .collect();

        // Binary counter over the selection mask; overflow means we wrapped around.
        let mut carry = true;
        for bit in &mut self.selected {
            if *bit {
                *bit = false;
            } else {
                *bit = true;
                carry = false;
                break;
            }
        }
        self.done = carry;

        Some(item)
    }
}
