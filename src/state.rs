use std::fmt::{Debug, Display};

use itertools::Itertools;

use crate::{math::OrderedSet, Show};

/// Names a single state of an [`crate::Nfa`]. States are immutable, cheap to compare and
/// ordered by their name.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct State(String);

impl State {
    /// Creates a new state with the given name.
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self(name.into())
    }

    /// Returns the name of the state.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&str> for State {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for State {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&State> for State {
    fn from(value: &State) -> Self {
        value.clone()
    }
}

impl Debug for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Show for State {
    fn show(&self) -> String {
        self.0.clone()
    }
}

/// The label that is used for the dead state, i.e. the empty [`StateSet`].
pub const DEAD_STATE_LABEL: &str = "φ";

/// A set of [`State`]s, which is treated as a single state of a [`crate::Dfa`].
///
/// Two state sets are equal iff they contain the same states, the order in which states were
/// added is irrelevant. Hashing and ordering are derived from the sorted sequence of members, so
/// a [`StateSet`] can be used directly as the key of a map.
///
/// The empty set plays a special role: it is the dead state (also called sink, denoted `φ`)
/// of the deterministic automaton. As the subset construction only ever produces non-empty
/// sets for states that are actually reachable, the dead state can never coincide with a set
/// containing some named state.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateSet(OrderedSet<State>);

impl StateSet {
    /// Returns the dead state, which is the empty set.
    pub fn dead() -> Self {
        Self::default()
    }

    /// Creates a set that contains only the given state.
    pub fn singleton<S: Into<State>>(state: S) -> Self {
        Self(OrderedSet::from_iter([state.into()]))
    }

    /// Returns `true` iff this is the dead state.
    pub fn is_dead(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of states in the set.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` iff the set is empty, which is the case precisely for the dead state.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` iff the given state is a member of `self`.
    pub fn contains(&self, state: &State) -> bool {
        self.0.contains(state)
    }

    /// Inserts a state, returns `true` if it was not present before.
    pub fn insert(&mut self, state: State) -> bool {
        self.0.insert(state)
    }

    /// Iterates over the members in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = &'_ State> + '_ {
        self.0.iter()
    }

    /// Returns `true` iff every member of `self` is also a member of `other`.
    pub fn is_subset(&self, other: &StateSet) -> bool {
        self.0.is_subset(&other.0)
    }

    /// Returns `true` iff `self` and the given collection of states have a common member.
    pub fn intersects<'a, I: IntoIterator<Item = &'a State>>(&self, other: I) -> bool {
        other.into_iter().any(|q| self.0.contains(q))
    }

    /// The canonical label of the set: the sorted names of all members joined by `", "`. The
    /// dead state is labelled with [`DEAD_STATE_LABEL`].
    pub fn label(&self) -> String {
        if self.is_dead() {
            DEAD_STATE_LABEL.to_string()
        } else {
            self.0.iter().map(State::name).join(", ")
        }
    }
}

impl Extend<State> for StateSet {
    fn extend<T: IntoIterator<Item = State>>(&mut self, iter: T) {
        self.0.extend(iter)
    }
}

impl<S: Into<State>> FromIterator<S> for StateSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl IntoIterator for StateSet {
    type Item = State;
    type IntoIter = std::collections::btree_set::IntoIter<State>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a StateSet {
    type Item = &'a State;
    type IntoIter = std::collections::btree_set::Iter<'a, State>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Debug for StateSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            write!(f, "∅")
        } else {
            write!(f, "{{{}}}", self.0.iter().join(", "))
        }
    }
}

impl Show for StateSet {
    fn show(&self) -> String {
        self.label()
    }
}
