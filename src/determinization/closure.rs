use crate::{
    automaton::Nfa,
    state::{State, StateSet},
};

/// Computes the epsilon closure of the given `states` in `nfa`, that is the smallest set which
/// contains all of `states` and is closed under taking epsilon transitions.
///
/// Every state enters the frontier at most once, so cycles of epsilon transitions are harmless.
/// Closing the empty set yields the empty set, and a state without epsilon transitions only
/// contributes itself.
///
/// # Example
/// ```
/// use finite_automaton::prelude::*;
/// let nfa = Nfa::builder()
///     .with_states(["q0", "q1", "q2"])
///     .with_epsilon_transitions([("q0", "q1"), ("q1", "q0")])
///     .into_nfa("q0");
/// let closure = epsilon_closure(&nfa, [nfa.start()]);
/// assert_eq!(closure, StateSet::from_iter(["q0", "q1"]));
/// ```
pub fn epsilon_closure<'a, I>(nfa: &'a Nfa, states: I) -> StateSet
where
    I: IntoIterator<Item = &'a State>,
{
    let mut closure = StateSet::default();
    let mut frontier: Vec<&'a State> = Vec::new();

    for q in states {
        if closure.insert(q.clone()) {
            frontier.push(q);
        }
    }

    while let Some(q) = frontier.pop() {
        for p in nfa.epsilon_successors(q) {
            if closure.insert(p.clone()) {
                frontier.push(p);
            }
        }
    }

    closure
}
