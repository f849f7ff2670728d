use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::{
    alphabet::Symbol,
    automaton::{AutomatonError, Dfa, Nfa},
    math::{Map, OrderedMap, OrderedSet, Set},
    state::StateSet,
};

use super::epsilon_closure;

/// Computes the state of the [`Dfa`] that is reached from `source` on `symbol`: the epsilon closure
/// of all states that some member of `source` can reach by reading `symbol`. If there are no such
/// states, the result is the dead state, as the closure of the empty set is empty.
pub(crate) fn successor_set(nfa: &Nfa, source: &StateSet, symbol: &Symbol) -> StateSet {
    epsilon_closure(nfa, source.iter().flat_map(|q| nfa.symbol_successors(q, symbol)))
}

/// Represents the subset construction applied to an [`Nfa`]. The states of the resulting [`Dfa`]
/// are sets of states of the [`Nfa`], see [`StateSet`].
///
/// All bookkeeping (the queue of states whose transitions still have to be computed, the set of
/// states that were seen so far and the transition table under construction) belongs to one run of
/// the construction and is consumed when the [`Dfa`] is produced.
pub struct SubsetConstruction<'a> {
    nfa: &'a Nfa,
    queue: VecDeque<StateSet>,
    seen: Set<StateSet>,
    discovered: OrderedSet<StateSet>,
    transitions: Map<StateSet, OrderedMap<Symbol, StateSet>>,
}

impl<'a> SubsetConstruction<'a> {
    /// Converts the given `nfa` into an equivalent [`Dfa`].
    ///
    /// The start state of the result is the epsilon closure of the start state of `nfa`. From there,
    /// states are explored in breadth-first order: for each symbol of the alphabet, the successor of a
    /// state is computed, and if it has not been seen before, it is queued for exploration. The order
    /// of exploration does not influence the result, since states are compared as sets.
    ///
    /// The resulting transition table is total. Whenever no state of `nfa` is reachable, the
    /// transition leads into the dead state, the empty [`StateSet`], which loops on every symbol.
    /// A state of the result is accepting iff it contains an accepting state of `nfa`.
    ///
    /// Before anything is computed, `nfa` is validated, so an [`AutomatonError`] is returned if it
    /// references states that were not declared, or symbols that are not in its alphabet.
    ///
    /// # Example
    /// ```
    /// use finite_automaton::prelude::*;
    /// let nfa = Nfa::builder()
    ///     .with_states(["q0", "q1", "q2"])
    ///     .with_alphabet(['a', 'b'])
    ///     .with_transitions([("q0", 'a', "q1"), ("q1", 'b', "q2")])
    ///     .with_accepting(["q2"])
    ///     .into_nfa("q0");
    /// let dfa = SubsetConstruction::execute(&nfa).unwrap();
    /// assert_eq!(dfa.size(), 4);
    /// assert_eq!(dfa.successor(dfa.start(), &Symbol::from('b')), Some(&StateSet::dead()));
    /// ```
    pub fn execute(nfa: &'a Nfa) -> Result<Dfa, AutomatonError> {
        nfa.validate()?;
        Ok(Self::new(nfa).run())
    }

    fn new(nfa: &'a Nfa) -> Self {
        Self {
            nfa,
            queue: VecDeque::with_capacity(nfa.size()),
            seen: Set::default(),
            discovered: OrderedSet::new(),
            transitions: Map::default(),
        }
    }

    fn enqueue(&mut self, state: StateSet) {
        if self.seen.insert(state.clone()) {
            trace!("discovered {state:?}");
            self.queue.push_back(state);
        }
    }

    fn run(mut self) -> Dfa {
        let nfa = self.nfa;
        let start = epsilon_closure(nfa, [nfa.start()]);
        debug!(
            "starting subset construction for NFA with {} states from {start:?}",
            nfa.size()
        );
        self.enqueue(start.clone());

        while let Some(source) = self.queue.pop_front() {
            let mut edges = OrderedMap::new();
            for symbol in nfa.alphabet().universe() {
                let target = successor_set(nfa, &source, symbol);
                trace!("{source:?} --{symbol}--> {target:?}");
                edges.insert(symbol.clone(), target.clone());
                self.enqueue(target);
            }
            self.transitions.insert(source.clone(), edges);
            self.discovered.insert(source);
        }

        let accepting: OrderedSet<StateSet> = self
            .discovered
            .iter()
            .filter(|set| set.intersects(nfa.accepting()))
            .cloned()
            .collect();

        debug!(
            "subset construction produced {} states of which {} are accepting",
            self.discovered.len(),
            accepting.len()
        );

        Dfa::from_parts(
            nfa.alphabet().clone(),
            self.discovered,
            self.transitions,
            start,
            accepting,
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    fn set(states: &[&str]) -> StateSet {
        states.iter().copied().collect()
    }

    fn sym(c: char) -> Symbol {
        Symbol::from(c)
    }

    fn assert_total(dfa: &Dfa) {
        for q in dfa.states() {
            for a in dfa.alphabet().universe() {
                let target = dfa
                    .successor(q, a)
                    .unwrap_or_else(|| panic!("no transition for {q:?} on {a}"));
                assert!(dfa.contains_state(target), "{target:?} was not discovered");
            }
        }
    }

    fn linear() -> Nfa {
        Nfa::builder()
            .with_states(["q0", "q1", "q2"])
            .with_alphabet(['a', 'b'])
            .with_transitions([("q0", 'a', "q1"), ("q1", 'b', "q2")])
            .with_accepting(["q2"])
            .into_nfa("q0")
    }

    fn with_epsilon() -> Nfa {
        Nfa::builder()
            .with_states(["q1", "q2", "q3"])
            .with_alphabet(['a', 'b'])
            .with_epsilon_transitions([("q1", "q2")])
            .with_transitions([
                ("q1", 'a', "q3"),
                ("q2", 'a', "q1"),
                ("q3", 'a', "q2"),
                ("q3", 'b', "q2"),
                ("q3", 'b', "q3"),
            ])
            .with_accepting(["q2"])
            .into_nfa("q1")
    }

    fn binary_transitions() -> Vec<(&'static str, Label, &'static str)> {
        vec![
            ("q0", Label::Epsilon, "q2"),
            ("q0", Label::from('1'), "q1"),
            ("q1", Label::from('0'), "q1"),
            ("q1", Label::from('0'), "q2"),
            ("q1", Label::from('1'), "q2"),
            ("q2", Label::from('0'), "q0"),
        ]
    }

    fn binary(transitions: Vec<(&'static str, Label, &'static str)>) -> Nfa {
        Nfa::builder()
            .with_states(["q0", "q1", "q2"])
            .with_alphabet(['1', '0'])
            .with_transitions(transitions)
            .with_accepting(["q0"])
            .into_nfa("q0")
    }

    #[test_log::test]
    fn linear_nfa() {
        let dfa = linear().determinize().unwrap();

        assert_eq!(dfa.start(), &set(&["q0"]));
        assert_eq!(
            dfa.states().cloned().collect::<Vec<_>>(),
            vec![StateSet::dead(), set(&["q0"]), set(&["q1"]), set(&["q2"])]
        );
        assert_eq!(dfa.successor(&set(&["q0"]), &sym('a')), Some(&set(&["q1"])));
        assert_eq!(dfa.successor(&set(&["q0"]), &sym('b')), Some(&StateSet::dead()));
        assert_eq!(dfa.successor(&set(&["q1"]), &sym('a')), Some(&StateSet::dead()));
        assert_eq!(dfa.successor(&set(&["q1"]), &sym('b')), Some(&set(&["q2"])));
        assert_eq!(dfa.successor(&set(&["q2"]), &sym('a')), Some(&StateSet::dead()));
        assert_eq!(dfa.successor(&set(&["q2"]), &sym('b')), Some(&StateSet::dead()));
        assert_eq!(
            dfa.accepting().cloned().collect::<Vec<_>>(),
            vec![set(&["q2"])]
        );
        assert_total(&dfa);
    }

    #[test_log::test]
    fn nfa_with_epsilon_transition() {
        let dfa = with_epsilon().determinize().unwrap();

        let (a, b) = (sym('a'), sym('b'));
        let start = set(&["q1", "q2"]);
        let all = set(&["q1", "q2", "q3"]);
        let tail = set(&["q2", "q3"]);
        let dead = StateSet::dead();

        assert_eq!(dfa.start(), &start);
        assert_eq!(dfa.size(), 4);
        assert_eq!(dfa.successor(&start, &a), Some(&all));
        assert_eq!(dfa.successor(&start, &b), Some(&dead));
        assert_eq!(dfa.successor(&all, &a), Some(&all));
        assert_eq!(dfa.successor(&all, &b), Some(&tail));
        assert_eq!(dfa.successor(&tail, &a), Some(&start));
        assert_eq!(dfa.successor(&tail, &b), Some(&tail));
        assert_eq!(dfa.successor(&dead, &a), Some(&dead));
        assert_eq!(dfa.successor(&dead, &b), Some(&dead));

        let accepting = dfa.accepting().cloned().collect::<Vec<_>>();
        assert_eq!(accepting, vec![start, all, tail]);
        for q in dfa.states() {
            assert_eq!(dfa.is_accepting(q), q.contains(&State::from("q2")));
        }
        assert_total(&dfa);
    }

    #[test_log::test]
    fn binary_alphabet() {
        let dfa = binary(binary_transitions()).determinize().unwrap();

        let (zero, one) = (sym('0'), sym('1'));
        let expected = [
            (set(&["q0", "q1", "q2"]), set(&["q0", "q1", "q2"]), set(&["q1", "q2"])),
            (set(&["q0", "q2"]), set(&["q0", "q2"]), set(&["q1"])),
            (set(&["q1"]), set(&["q1", "q2"]), set(&["q2"])),
            (set(&["q1", "q2"]), set(&["q0", "q1", "q2"]), set(&["q2"])),
            (set(&["q2"]), set(&["q0", "q2"]), StateSet::dead()),
            (StateSet::dead(), StateSet::dead(), StateSet::dead()),
        ];

        assert_eq!(dfa.start(), &set(&["q0", "q2"]));
        assert_eq!(dfa.size(), expected.len());
        for (source, on_zero, on_one) in &expected {
            assert_eq!(dfa.successor(source, &zero), Some(on_zero), "{source:?}");
            assert_eq!(dfa.successor(source, &one), Some(on_one), "{source:?}");
        }
        assert_eq!(
            dfa.accepting().collect::<Vec<_>>(),
            vec![&set(&["q0", "q1", "q2"]), &set(&["q0", "q2"])]
        );
        assert_total(&dfa);
    }

    #[test]
    fn transitions_of_undeclared_dead_label_are_rejected() {
        let mut transitions = binary_transitions();
        transitions.push(("φ", Label::from('0'), "φ"));
        let nfa = binary(transitions);
        assert_eq!(
            SubsetConstruction::execute(&nfa),
            Err(AutomatonError::InvalidAutomaton {
                state: State::from("φ"),
                role: StateRole::TransitionOrigin,
            })
        );
    }

    #[test]
    fn undeclared_start_state_is_rejected() {
        let nfa = Nfa::builder()
            .with_states(["q0"])
            .with_alphabet(['a'])
            .into_nfa("q1");
        assert!(matches!(
            nfa.determinize(),
            Err(AutomatonError::InvalidAutomaton {
                role: StateRole::Start,
                ..
            })
        ));
    }

    #[test]
    fn empty_alphabet_yields_single_state() {
        let nfa = Nfa::builder()
            .with_states(["q0", "q1"])
            .with_epsilon_transitions([("q0", "q1")])
            .with_accepting(["q1"])
            .into_nfa("q0");
        let dfa = nfa.determinize().unwrap();

        assert_eq!(dfa.size(), 1);
        assert_eq!(dfa.start(), &set(&["q0", "q1"]));
        assert_eq!(dfa.transitions().count(), 0);
        assert!(dfa.is_accepting(dfa.start()));
        assert!(dfa.accepts(Vec::<Symbol>::new()).unwrap());
    }

    #[test]
    fn complete_nfa_has_no_dead_state() {
        let nfa = Nfa::builder()
            .with_states(["q0", "q1"])
            .with_alphabet(['a'])
            .with_transitions([("q0", 'a', "q1"), ("q1", 'a', "q0")])
            .into_nfa("q0");
        let dfa = nfa.determinize().unwrap();
        assert_eq!(dfa.size(), 2);
        assert!(dfa.dead_state().is_none());
        assert_eq!(dfa.accepting().count(), 0);
    }

    #[test]
    fn state_named_like_dead_state_stays_distinct() {
        let nfa = Nfa::builder()
            .with_states(["φ", "q"])
            .with_alphabet(['a', 'b'])
            .with_transitions([("q", 'a', "φ")])
            .with_accepting(["φ"])
            .into_nfa("q");
        let dfa = nfa.determinize().unwrap();

        assert_eq!(dfa.size(), 3);
        let named = set(&["φ"]);
        assert!(dfa.is_accepting(&named));
        assert!(!dfa.is_accepting(&StateSet::dead()));
        assert_eq!(dfa.successor(&named, &sym('a')), Some(&StateSet::dead()));
    }

    #[test_log::test]
    fn result_does_not_depend_on_transition_order() {
        let reference = binary(binary_transitions()).determinize().unwrap();

        let mut transitions = binary_transitions();
        transitions.reverse();
        assert_eq!(binary(transitions.clone()).determinize().unwrap(), reference);

        for shift in 1..transitions.len() {
            transitions.rotate_left(shift);
            assert_eq!(binary(transitions.clone()).determinize().unwrap(), reference);
        }
    }

    #[test]
    fn conversions_can_run_on_independent_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Nfa>();
        assert_send_sync::<Dfa>();

        let handles = [linear(), with_epsilon()]
            .into_iter()
            .map(|nfa| std::thread::spawn(move || nfa.determinize().map(|dfa| dfa.size())))
            .collect::<Vec<_>>();
        let sizes = handles
            .into_iter()
            .map(|h| h.join().unwrap().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(sizes, vec![4, 4]);
    }

    #[cfg(feature = "random")]
    #[test_log::test]
    fn random_nfas_are_equivalent_to_their_determinization() {
        use itertools::Itertools;

        let mut rng = fastrand::Rng::with_seed(0x5eed);
        for _ in 0..25 {
            let nfa = crate::random::generate_random_nfa_with(&mut rng, 5, 2, 0.3, 0.2);
            let dfa = nfa.determinize().unwrap();
            assert_total(&dfa);

            for len in 0..=6 {
                for word in std::iter::repeat(dfa.alphabet().universe().cloned().collect_vec())
                    .take(len)
                    .multi_cartesian_product()
                {
                    assert_eq!(
                        nfa.accepts(word.iter()),
                        dfa.accepts(word.iter()),
                        "disagreement on {word:?}\n{nfa:?}"
                    );
                }
            }
        }
    }

    #[cfg(feature = "random")]
    #[test]
    fn shuffled_relation_gives_same_dfa() {
        let mut rng = fastrand::Rng::with_seed(7);
        for _ in 0..10 {
            let nfa = crate::random::generate_random_nfa_with(&mut rng, 6, 3, 0.25, 0.15);
            let mut transitions = nfa
                .transitions()
                .map(|(q, l, p)| (q.clone(), l, p.clone()))
                .collect::<Vec<_>>();
            rng.shuffle(&mut transitions);

            let shuffled = Nfa::builder()
                .with_states(nfa.states().cloned())
                .with_alphabet(nfa.alphabet().universe().cloned())
                .with_transitions(transitions)
                .with_accepting(nfa.accepting().cloned())
                .into_nfa(nfa.start().clone());

            assert_eq!(shuffled.determinize(), nfa.determinize());
        }
    }
}
