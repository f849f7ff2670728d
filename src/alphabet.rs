use std::fmt::{Debug, Display};

use itertools::Itertools;

use crate::{math::OrderedSet, Show};

/// A symbol of an [`Alphabet`]. Symbols are opaque names, most of the time they consist of a
/// single character like `a` or `0`, but longer names are allowed as well.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(String);

impl Symbol {
    /// Creates a new symbol with the given name.
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self(name.into())
    }

    /// Returns the name of the symbol.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Symbol {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<char> for Symbol {
    fn from(value: char) -> Self {
        Self(value.to_string())
    }
}

impl From<&Symbol> for Symbol {
    fn from(value: &Symbol) -> Self {
        value.clone()
    }
}

impl Debug for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Show for Symbol {
    fn show(&self) -> String {
        self.0.clone()
    }
}

/// Labels the transitions of an [`crate::Nfa`]. A label is either a real [`Symbol`] or the
/// silent epsilon move. As epsilon is a separate variant, it can never be confused with a
/// symbol of the alphabet, even if that symbol happens to be called `ε`.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Label {
    /// The empty move, taking it does not consume any input.
    Epsilon,
    /// A move that consumes the given symbol.
    Symbol(Symbol),
}

impl Label {
    /// Returns `true` iff `self` is [`Label::Epsilon`].
    pub fn is_epsilon(&self) -> bool {
        matches!(self, Label::Epsilon)
    }

    /// Returns the symbol of a non-epsilon label.
    pub fn symbol(&self) -> Option<&Symbol> {
        match self {
            Label::Epsilon => None,
            Label::Symbol(sym) => Some(sym),
        }
    }
}

impl From<Symbol> for Label {
    fn from(value: Symbol) -> Self {
        Label::Symbol(value)
    }
}

impl From<&str> for Label {
    fn from(value: &str) -> Self {
        Label::Symbol(value.into())
    }
}

impl From<char> for Label {
    fn from(value: char) -> Self {
        Label::Symbol(value.into())
    }
}

impl Debug for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Label::Epsilon => write!(f, "ε"),
            Label::Symbol(sym) => write!(f, "{sym:?}"),
        }
    }
}

impl Show for Label {
    fn show(&self) -> String {
        format!("{self:?}")
    }
}

/// An alphabet is a finite, duplicate free collection of [`Symbol`]s. Iterating over an alphabet
/// always yields the symbols in their natural order, independent of the order in which they were
/// given.
///
/// # Example
/// ```
/// use finite_automaton::prelude::*;
/// let alphabet = Alphabet::from_iter(['b', 'a', 'b']);
/// assert_eq!(alphabet.size(), 2);
/// assert_eq!(alphabet.universe().next(), Some(&Symbol::from('a')));
/// ```
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Alphabet(OrderedSet<Symbol>);

impl Alphabet {
    /// Creates a new alphabet from the given symbols.
    pub fn new<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Symbol>,
    {
        Self(symbols.into_iter().map(Into::into).collect())
    }

    /// Creates an alphabet consisting of the first `size` lowercase letters, i.e. `a` to `z`.
    pub fn of_size(size: usize) -> Self {
        assert!(size <= 26, "Alphabet is too large");
        Self::new((0..size).map(|i| (b'a' + i as u8) as char))
    }

    /// Returns an iterator over all symbols in the alphabet.
    pub fn universe(&self) -> impl Iterator<Item = &Symbol> + '_ {
        self.0.iter()
    }

    /// Returns true if the given symbol is present in the alphabet.
    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.0.contains(symbol)
    }

    /// Returns the number of symbols in the alphabet.
    pub fn size(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the alphabet has no symbols.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<Symbol>> FromIterator<S> for Alphabet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self::new(iter)
    }
}

impl Debug for Alphabet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{{}}}", self.0.iter().join(", "))
    }
}
