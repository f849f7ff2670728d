use std::fmt::Debug;

use crate::{
    alphabet::{Alphabet, Symbol},
    math::{Map, OrderedMap, OrderedSet},
    state::StateSet,
    Show,
};

use super::RunError;

/// A deterministic finite automaton (DFA) as it is produced by the subset construction. Every state
/// is a [`StateSet`], i.e. a set of states of the [`crate::Nfa`] that was determinized.
///
/// The transition table is total: each state has precisely one successor for every symbol of the
/// alphabet. Symbols on which no state of the [`crate::Nfa`] could be reached lead to the dead state
/// (the empty [`StateSet`]), which in turn loops back to itself on every symbol. A state is
/// accepting iff it contains an accepting state of the [`crate::Nfa`].
#[derive(Clone, PartialEq, Eq)]
pub struct Dfa {
    alphabet: Alphabet,
    states: OrderedSet<StateSet>,
    transitions: Map<StateSet, OrderedMap<Symbol, StateSet>>,
    start: StateSet,
    accepting: OrderedSet<StateSet>,
}

impl Dfa {
    pub(crate) fn from_parts(
        alphabet: Alphabet,
        states: OrderedSet<StateSet>,
        transitions: Map<StateSet, OrderedMap<Symbol, StateSet>>,
        start: StateSet,
        accepting: OrderedSet<StateSet>,
    ) -> Self {
        Self {
            alphabet,
            states,
            transitions,
            start,
            accepting,
        }
    }

    /// Returns a reference to the alphabet.
    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Iterates over all states in ascending order. Note that the dead state, if present, comes
    /// first as it is the empty set.
    pub fn states(&self) -> impl Iterator<Item = &StateSet> + '_ {
        self.states.iter()
    }

    /// Returns the number of states.
    pub fn size(&self) -> usize {
        self.states.len()
    }

    /// Returns `true` iff the given set of states is a state of `self`.
    pub fn contains_state(&self, state: &StateSet) -> bool {
        self.states.contains(state)
    }

    /// Returns the start state.
    pub fn start(&self) -> &StateSet {
        &self.start
    }

    /// Iterates over the accepting states in ascending order.
    pub fn accepting(&self) -> impl Iterator<Item = &StateSet> + '_ {
        self.accepting.iter()
    }

    /// Returns `true` iff `state` is an accepting state of `self`.
    pub fn is_accepting(&self, state: &StateSet) -> bool {
        self.accepting.contains(state)
    }

    /// Returns the dead state if it is reachable.
    pub fn dead_state(&self) -> Option<&StateSet> {
        self.states.first().filter(|q| q.is_dead())
    }

    /// Returns the state that is reached from `state` on `symbol`. This is `None` only if `state`
    /// is not a state of `self` or `symbol` does not belong to the alphabet.
    pub fn successor(&self, state: &StateSet, symbol: &Symbol) -> Option<&StateSet> {
        self.transitions.get(state)?.get(symbol)
    }

    /// Iterates over all transitions as triples of origin, symbol and target, ordered by origin and
    /// then by symbol.
    pub fn transitions(&self) -> impl Iterator<Item = (&StateSet, &Symbol, &StateSet)> + '_ {
        self.states.iter().flat_map(move |q| {
            self.transitions
                .get(q)
                .into_iter()
                .flatten()
                .map(move |(a, p)| (q, a, p))
        })
    }

    /// Lists the states in the order in which they are presented to a user: the start state first,
    /// then all other states in ascending order, and finally the dead state.
    pub fn states_in_display_order(&self) -> Vec<&StateSet> {
        std::iter::once(&self.start)
            .chain(
                self.states
                    .iter()
                    .filter(|q| !q.is_dead() && **q != self.start),
            )
            .chain(self.dead_state().filter(|q| **q != self.start))
            .collect()
    }

    /// Reads the given word from the start state and returns the state that is reached.
    /// Returns an error if the word contains a symbol that is not in the alphabet.
    pub fn run<W, S>(&self, word: W) -> Result<&StateSet, RunError>
    where
        W: IntoIterator<Item = S>,
        S: Into<Symbol>,
    {
        let mut current = &self.start;
        for sym in word {
            let sym = sym.into();
            current = self
                .successor(current, &sym)
                .ok_or_else(|| RunError::UnknownSymbol(sym))?;
        }
        Ok(current)
    }

    /// Returns whether `self` accepts the given word, i.e. whether the state that is reached
    /// is accepting.
    ///
    /// # Example
    /// ```
    /// use finite_automaton::prelude::*;
    /// let nfa = Nfa::builder()
    ///     .with_states(["q0", "q1"])
    ///     .with_alphabet(['0', '1'])
    ///     .with_transitions([("q0", '0', "q0"), ("q0", '1', "q0"), ("q0", '1', "q1")])
    ///     .with_accepting(["q1"])
    ///     .into_nfa("q0");
    /// let dfa = nfa.determinize().unwrap();
    /// assert_eq!(dfa.accepts("0101".chars()), Ok(true));
    /// assert_eq!(dfa.accepts("0110".chars()), Ok(false));
    /// assert!(dfa.accepts("012".chars()).is_err());
    /// ```
    pub fn accepts<W, S>(&self, word: W) -> Result<bool, RunError>
    where
        W: IntoIterator<Item = S>,
        S: Into<Symbol>,
    {
        self.run(word).map(|q| self.is_accepting(q))
    }

    /// Returns a string representation of the transition table. The first column holds the
    /// states, decorated by `state_decorator` which receives the state and whether it is accepting.
    /// All other cells hold the canonical label of the respective successor.
    pub fn build_transition_table<SD>(&self, state_decorator: SD) -> String
    where
        SD: Fn(&StateSet, bool) -> String,
    {
        let mut builder = tabled::builder::Builder::default();
        builder.push_record(
            std::iter::once("State".to_string()).chain(self.alphabet.universe().map(Show::show)),
        );
        for q in self.states_in_display_order() {
            let mut row = vec![state_decorator(q, self.is_accepting(q))];
            for sym in self.alphabet.universe() {
                row.push(
                    self.successor(q, sym)
                        .map(Show::show)
                        .unwrap_or_else(|| "-".to_string()),
                );
            }
            builder.push_record(row);
        }

        builder
            .build()
            .with(tabled::settings::Style::rounded())
            .to_string()
    }

    /// Returns the transition table, where the start state is marked with `→` and accepting
    /// states are marked with `*`.
    pub fn transition_table(&self) -> String {
        self.build_transition_table(|q, accepting| {
            format!(
                "{}{}{}",
                if *q == self.start { "→ " } else { "" },
                if accepting { "*" } else { "" },
                q.show()
            )
        })
    }
}

impl Debug for Dfa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DFA\n{}", self.transition_table())
    }
}
