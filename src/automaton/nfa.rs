use std::fmt::{Debug, Display};

use itertools::Itertools;
use thiserror::Error;
use tracing::trace;

use crate::{
    alphabet::{Alphabet, Label, Symbol},
    determinization::{epsilon_closure, successor_set, SubsetConstruction},
    math::{Map, OrderedMap, OrderedSet},
    state::{State, StateSet},
    Dfa, Show,
};

use super::RunError;

/// The role in which an undeclared state was referenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateRole {
    /// The designated start state.
    Start,
    /// One of the accepting states.
    Accepting,
    /// The origin of a transition.
    TransitionOrigin,
    /// The target of a transition.
    TransitionTarget,
}

impl Display for StateRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StateRole::Start => write!(f, "start state"),
            StateRole::Accepting => write!(f, "accepting state"),
            StateRole::TransitionOrigin => write!(f, "transition origin"),
            StateRole::TransitionTarget => write!(f, "transition target"),
        }
    }
}

/// Abstracts the reasons for which an [`Nfa`] can be rejected as malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AutomatonError {
    /// A state is referenced that is not part of the declared states.
    #[error("invalid automaton: {role} `{state}` is not among the declared states")]
    InvalidAutomaton {
        /// The offending state.
        state: State,
        /// Where the state was referenced.
        role: StateRole,
    },
    /// A transition is labelled with a symbol that does not belong to the alphabet.
    #[error("invalid automaton: transition from `{origin}` reads `{symbol}`, which is not in the alphabet")]
    UndeclaredSymbol {
        /// The state from which the transition originates.
        origin: State,
        /// The symbol that is missing from the alphabet.
        symbol: Symbol,
    },
}

/// A nondeterministic finite automaton with epsilon transitions.
///
/// For every pair of state and [`Label`], the transition relation stores a (possibly empty) set
/// of target states. Absent entries simply mean that there is no transition. Epsilon moves are
/// kept apart from the moves on real symbols, so the alphabet never contains epsilon.
///
/// An [`Nfa`] is usually created through [`Nfa::builder`] or by loading a
/// [`crate::config::AutomatonDescription`].
///
/// # Example
/// ```
/// use finite_automaton::prelude::*;
/// let nfa = Nfa::builder()
///     .with_states(["q0", "q1"])
///     .with_alphabet(['a', 'b'])
///     .with_transitions([("q0", 'a', "q0"), ("q0", 'b', "q0"), ("q0", 'a', "q1")])
///     .with_accepting(["q1"])
///     .into_nfa("q0");
/// assert!(nfa.accepts("aba".chars()).unwrap());
/// assert!(!nfa.accepts("ab".chars()).unwrap());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Nfa {
    states: OrderedSet<State>,
    alphabet: Alphabet,
    labelled: Map<State, OrderedMap<Symbol, OrderedSet<State>>>,
    epsilon: Map<State, OrderedSet<State>>,
    start: State,
    accepting: OrderedSet<State>,
}

impl Nfa {
    /// Returns a new [`NfaBuilder`], which allows to assemble an automaton step by step.
    pub fn builder() -> NfaBuilder {
        NfaBuilder::default()
    }

    /// Returns the declared states.
    pub fn states(&self) -> impl Iterator<Item = &State> + '_ {
        self.states.iter()
    }

    /// Returns the number of declared states.
    pub fn size(&self) -> usize {
        self.states.len()
    }

    /// Returns a reference to the alphabet, which never contains epsilon.
    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Returns the designated start state.
    pub fn start(&self) -> &State {
        &self.start
    }

    /// Returns an iterator over the accepting states.
    pub fn accepting(&self) -> impl Iterator<Item = &State> + '_ {
        self.accepting.iter()
    }

    /// Returns `true` iff the given state is accepting.
    pub fn is_accepting(&self, state: &State) -> bool {
        self.accepting.contains(state)
    }

    /// Returns `true` iff the given state has been declared.
    pub fn contains_state(&self, state: &State) -> bool {
        self.states.contains(state)
    }

    /// Returns the states that can be reached from `state` by taking one transition labelled with `label`.
    pub fn successors<'a>(
        &'a self,
        state: &State,
        label: &Label,
    ) -> impl Iterator<Item = &'a State> + 'a {
        let targets = match label {
            Label::Epsilon => self.epsilon.get(state),
            Label::Symbol(sym) => self.labelled.get(state).and_then(|m| m.get(sym)),
        };
        targets.into_iter().flatten()
    }

    /// Returns the states that can be reached from `state` through a single epsilon move.
    pub fn epsilon_successors<'a>(&'a self, state: &State) -> impl Iterator<Item = &'a State> + 'a {
        self.epsilon.get(state).into_iter().flatten()
    }

    /// Returns the states that can be reached from `state` by reading `symbol`, without taking
    /// epsilon moves into account.
    pub fn symbol_successors<'a>(
        &'a self,
        state: &State,
        symbol: &Symbol,
    ) -> impl Iterator<Item = &'a State> + 'a {
        self.labelled
            .get(state)
            .and_then(|m| m.get(symbol))
            .into_iter()
            .flatten()
    }

    /// Iterates over all transitions as triples of origin, label and target. Epsilon transitions
    /// of a state are listed before its transitions on symbols.
    pub fn transitions(&self) -> impl Iterator<Item = (&State, Label, &State)> + '_ {
        let epsilon = self
            .epsilon
            .iter()
            .flat_map(|(q, targets)| targets.iter().map(move |p| (q, Label::Epsilon, p)));
        let labelled = self.labelled.iter().flat_map(|(q, edges)| {
            edges.iter().flat_map(move |(sym, targets)| {
                targets
                    .iter()
                    .map(move |p| (q, Label::Symbol(sym.clone()), p))
            })
        });
        epsilon
            .chain(labelled)
            .sorted_by(|l, r| (l.0, &l.1, l.2).cmp(&(r.0, &r.1, r.2)))
    }

    /// Returns `true` iff the automaton has at least one epsilon transition.
    pub fn has_epsilon_transitions(&self) -> bool {
        self.epsilon.values().any(|targets| !targets.is_empty())
    }

    /// Computes the epsilon closure of the given states, see [`epsilon_closure`].
    pub fn epsilon_closure<'a, I>(&'a self, states: I) -> StateSet
    where
        I: IntoIterator<Item = &'a State>,
    {
        epsilon_closure(self, states)
    }

    /// Verifies that every state which is referenced as start state, accepting state or endpoint
    /// of a transition has been declared, and that every transition reads a symbol of the alphabet.
    pub fn validate(&self) -> Result<(), AutomatonError> {
        let undeclared = |state: &State, role| AutomatonError::InvalidAutomaton {
            state: state.clone(),
            role,
        };

        if !self.states.contains(&self.start) {
            return Err(undeclared(&self.start, StateRole::Start));
        }
        if let Some(q) = self.accepting.iter().find(|q| !self.states.contains(q)) {
            return Err(undeclared(q, StateRole::Accepting));
        }
        for (origin, label, target) in self.transitions() {
            if !self.states.contains(origin) {
                return Err(undeclared(origin, StateRole::TransitionOrigin));
            }
            if !self.states.contains(target) {
                return Err(undeclared(target, StateRole::TransitionTarget));
            }
            if let Label::Symbol(symbol) = label {
                if !self.alphabet.contains(&symbol) {
                    return Err(AutomatonError::UndeclaredSymbol {
                        origin: origin.clone(),
                        symbol,
                    });
                }
            }
        }
        Ok(())
    }

    /// Converts `self` into an equivalent [`Dfa`] through the subset construction, see
    /// [`SubsetConstruction::execute`].
    pub fn determinize(&self) -> Result<Dfa, AutomatonError> {
        SubsetConstruction::execute(self)
    }

    /// Simulates the automaton on the given word. The word is accepted iff at least one of the
    /// states that can be reached by reading it (taking epsilon moves into account) is accepting.
    pub fn accepts<W, S>(&self, word: W) -> Result<bool, RunError>
    where
        W: IntoIterator<Item = S>,
        S: Into<Symbol>,
    {
        let mut current = self.epsilon_closure([&self.start]);
        for sym in word {
            let sym = sym.into();
            if !self.alphabet.contains(&sym) {
                return Err(RunError::UnknownSymbol(sym));
            }
            current = successor_set(self, &current, &sym);
            trace!("read {sym}, reached {current:?}");
        }
        Ok(current.intersects(&self.accepting))
    }
}

impl Debug for Nfa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "NFA over {:?} starting in {} accepting {}",
            self.alphabet,
            self.start,
            State::show_collection(&self.accepting)
        )?;
        for (origin, label, target) in self.transitions() {
            writeln!(f, "{origin} --{label:?}--> {target}")?;
        }
        Ok(())
    }
}

/// Helper struct for assembling an [`Nfa`]. States, symbols and transitions can be added in any
/// order; the builder performs no validation, this is done by [`Nfa::validate`] which in turn
/// is invoked by the subset construction and the loader.
#[derive(Debug, Clone, Default)]
pub struct NfaBuilder {
    states: OrderedSet<State>,
    alphabet: OrderedSet<Symbol>,
    labelled: Map<State, OrderedMap<Symbol, OrderedSet<State>>>,
    epsilon: Map<State, OrderedSet<State>>,
    accepting: OrderedSet<State>,
}

impl NfaBuilder {
    /// Declares the given states.
    pub fn with_states<I, Q>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = Q>,
        Q: Into<State>,
    {
        self.states.extend(states.into_iter().map(Into::into));
        self
    }

    /// Adds the given symbols to the alphabet.
    pub fn with_alphabet<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Symbol>,
    {
        self.alphabet.extend(symbols.into_iter().map(Into::into));
        self
    }

    /// Adds a single transition, the label may be [`Label::Epsilon`].
    pub fn add_transition<Q, L, P>(&mut self, origin: Q, label: L, target: P)
    where
        Q: Into<State>,
        L: Into<Label>,
        P: Into<State>,
    {
        let (origin, target) = (origin.into(), target.into());
        match label.into() {
            Label::Epsilon => {
                self.epsilon.entry(origin).or_default().insert(target);
            }
            Label::Symbol(sym) => {
                self.labelled
                    .entry(origin)
                    .or_default()
                    .entry(sym)
                    .or_default()
                    .insert(target);
            }
        }
    }

    /// Adds the given transitions, which are triples of origin, label and target.
    pub fn with_transitions<I, Q, L, P>(mut self, transitions: I) -> Self
    where
        I: IntoIterator<Item = (Q, L, P)>,
        Q: Into<State>,
        L: Into<Label>,
        P: Into<State>,
    {
        for (origin, label, target) in transitions {
            self.add_transition(origin, label, target);
        }
        self
    }

    /// Adds epsilon transitions, given as pairs of origin and target.
    pub fn with_epsilon_transitions<I, Q, P>(mut self, transitions: I) -> Self
    where
        I: IntoIterator<Item = (Q, P)>,
        Q: Into<State>,
        P: Into<State>,
    {
        for (origin, target) in transitions {
            self.add_transition(origin, Label::Epsilon, target);
        }
        self
    }

    /// Marks the given states as accepting.
    pub fn with_accepting<I, Q>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = Q>,
        Q: Into<State>,
    {
        self.accepting.extend(states.into_iter().map(Into::into));
        self
    }

    /// Finishes the construction with the given start state.
    pub fn into_nfa<Q: Into<State>>(self, start: Q) -> Nfa {
        Nfa {
            states: self.states,
            alphabet: Alphabet::new(self.alphabet),
            labelled: self.labelled,
            epsilon: self.epsilon,
            start: start.into(),
            accepting: self.accepting,
        }
    }
}
