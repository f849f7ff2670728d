//! Library for turning nondeterministic finite automata into deterministic ones.
//!
//! An [`Nfa`] consists of a finite set of named states, an [`Alphabet`] of symbols, a transition
//! relation that may assign any number of targets to a pair of state and [`Label`] (where
//! [`Label::Epsilon`] denotes a silent move), a designated start state and a set of accepting
//! states. The central operation is [`Nfa::determinize`] (or equivalently [`SubsetConstruction::execute`]),
//! which applies the classical subset construction and produces a [`Dfa`] whose states are
//! [`StateSet`]s, i.e. sets of states of the nondeterministic automaton.
//!
//! The produced [`Dfa`] is always complete: every discovered state has exactly one successor for
//! every symbol of the alphabet. Whenever no state of the [`Nfa`] can be reached, the successor is
//! the dead state, which is represented by the empty [`StateSet`] and loops back to itself on
//! every symbol.
//!
//! Automata can be loaded from a JSON description through [`config::AutomatonDescription`],
//! which also validates that every referenced state has been declared. Results can be printed as a
//! transition table, written back as a description or exported in the DOT format of graphviz.
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// The prelude is supposed to make using this package easier. Including everything, i.e.
/// `use finite_automaton::prelude::*;` should be enough to use the package.
pub mod prelude {
    pub use super::{
        alphabet::{Alphabet, Label, Symbol},
        automaton::{AutomatonError, Dfa, Nfa, NfaBuilder, RunError, StateRole},
        config::{AutomatonDescription, ConfigError},
        determinization::{epsilon_closure, SubsetConstruction},
        dot::Dottable,
        math,
        state::{State, StateSet},
        Show,
    };
}

/// Type aliases for the collections that are used throughout the crate.
pub mod math;

/// Symbols, alphabets and edge labels.
pub mod alphabet;
pub use alphabet::{Alphabet, Label, Symbol};

/// States of an [`Nfa`] and sets thereof, which are the states of a [`Dfa`].
pub mod state;
pub use state::{State, StateSet};

/// Defines the nondeterministic input automata and the deterministic result of the conversion.
pub mod automaton;
pub use automaton::{Dfa, Nfa};

/// Epsilon closure and the subset construction.
pub mod determinization;
pub use determinization::SubsetConstruction;

/// Loading automata from their JSON description.
pub mod config;

/// Export to the DOT format of graphviz.
pub mod dot;

/// Generation of random nondeterministic automata. This is feature gated behind the `random` feature.
#[cfg(feature = "random")]
pub mod random;

/// Helper trait which can be used to display states, symbols and such.
pub trait Show {
    /// Returns a human readable representation of `self`. For a state this is simply its name,
    /// for a set of states it is the canonical label, i.e. the sorted names joined by `", "`.
    fn show(&self) -> String;

    /// Show a collection of the thing, for a collection of states this should be {q0, q1, q2, ...}.
    fn show_collection<'a, I>(iter: I) -> String
    where
        Self: 'a,
        I: IntoIterator<Item = &'a Self>,
    {
        use itertools::Itertools;
        format!("{{{}}}", iter.into_iter().map(|x| x.show()).join(", "))
    }
}
