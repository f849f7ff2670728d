use thiserror::Error;

use crate::alphabet::Symbol;

mod nfa;
pub use nfa::{AutomatonError, Nfa, NfaBuilder, StateRole};

mod dfa;
pub use dfa::Dfa;

/// Errors that can occur when running a word through an automaton.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    /// The word contains a symbol that does not belong to the alphabet of the automaton.
    #[error("symbol `{0}` is not part of the alphabet")]
    UnknownSymbol(Symbol),
}
