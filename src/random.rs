use tracing::debug;

use crate::{alphabet::Alphabet, automaton::Nfa, Label};

/// Generates a random [`Nfa`] with `states` states named `q0`, `q1`, ... over an alphabet
/// consisting of the first `symbols` lowercase letters. The state `q0` is the start state.
///
/// For every pair of states and every symbol, a transition is inserted with probability
/// `density`. Similarly, an epsilon transition between two distinct states is inserted with
/// probability `epsilon_probability`. Each state is accepting with probability one half.
pub fn generate_random_nfa(
    states: usize,
    symbols: usize,
    density: f64,
    epsilon_probability: f64,
) -> Nfa {
    generate_random_nfa_with(
        &mut fastrand::Rng::new(),
        states,
        symbols,
        density,
        epsilon_probability,
    )
}

/// Works as [`generate_random_nfa`], but draws from the given random number generator, which
/// makes the result reproducible when the generator is seeded.
pub fn generate_random_nfa_with(
    rng: &mut fastrand::Rng,
    states: usize,
    symbols: usize,
    density: f64,
    epsilon_probability: f64,
) -> Nfa {
    assert!(states > 0, "an automaton needs at least one state");
    let alphabet = Alphabet::of_size(symbols);
    let names = (0..states).map(|i| format!("q{i}")).collect::<Vec<_>>();

    let mut builder = Nfa::builder()
        .with_states(names.iter().map(String::as_str))
        .with_alphabet(alphabet.universe().cloned())
        .with_accepting(names.iter().filter(|_| rng.bool()).map(String::as_str));

    for origin in &names {
        for target in &names {
            for sym in alphabet.universe() {
                if rng.f64() < density {
                    builder.add_transition(origin.as_str(), sym.clone(), target.as_str());
                }
            }
            if origin != target && rng.f64() < epsilon_probability {
                builder.add_transition(origin.as_str(), Label::Epsilon, target.as_str());
            }
        }
    }

    let nfa = builder.into_nfa(names[0].as_str());
    debug!("generated random NFA\n{nfa:?}");
    nfa
}
