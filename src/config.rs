use std::{io::Read, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::{
    alphabet::{Label, Symbol},
    automaton::{AutomatonError, Dfa, Nfa},
    math::{OrderedMap, Set},
    state::State,
    Show,
};

/// The symbol which denotes an epsilon move in a description. It is only interpreted in the
/// transition keys; within the automaton it is represented by [`Label::Epsilon`].
pub const EPSILON_SYMBOL: &str = "ε";

/// Abstracts the errors that can occur when loading an [`AutomatonDescription`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The description could not be read.
    #[error("could not read automaton description: {0}")]
    Io(#[from] std::io::Error),
    /// The description is not well-formed JSON or lacks required fields.
    #[error("could not parse automaton description: {0}")]
    Json(#[from] serde_json::Error),
    /// A key of the transition map does not separate state and symbol by a comma.
    #[error("transition key `{0}` is not of the form `<state>,<symbol>`")]
    MalformedTransitionKey(String),
    /// Two states of an exported automaton share the same label, so a description would
    /// merge them.
    #[error("state label `{0}` is shared by multiple states")]
    AmbiguousLabel(String),
    /// The described automaton references undeclared states or symbols.
    #[error(transparent)]
    Invalid(#[from] AutomatonError),
}

/// The target(s) of an entry in the transition map. Deterministic automata are usually given with
/// a single target per entry, nondeterministic ones with a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Targets {
    /// Exactly one target state.
    Single(String),
    /// Any number of target states.
    Multiple(Vec<String>),
}

impl Targets {
    /// Iterates over the names of the target states.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        let (single, multiple) = match self {
            Targets::Single(q) => (Some(q.as_str()), None),
            Targets::Multiple(qs) => (None, Some(qs.iter().map(String::as_str))),
        };
        single.into_iter().chain(multiple.into_iter().flatten())
    }
}

/// The JSON description of a finite automaton.
///
/// ```json
/// {
///     "states": ["q0", "q1", "q2"],
///     "alphabet_list": ["a", "b"],
///     "transition_functions": {
///         "q0,a": ["q1"],
///         "q0,ε": ["q2"],
///         "q1,b": "q2"
///     },
///     "start_state": "q0",
///     "accept_states": ["q2"],
///     "test_cases": ["ab", "b"]
/// }
/// ```
///
/// Transition keys consist of a state and a symbol separated by the last comma in the key, so
/// state names may contain commas (which is the case for the canonical labels of a [`Dfa`]),
/// but symbols may not. The key `transition_function` is accepted as an alias. A symbol `ε`
/// in the alphabet is ignored, as epsilon is never part of the alphabet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomatonDescription {
    /// Names of all states.
    pub states: Vec<String>,
    /// Names of all symbols.
    pub alphabet_list: Vec<String>,
    /// Maps `"<state>,<symbol>"` to the target state(s).
    #[serde(alias = "transition_function")]
    pub transition_functions: OrderedMap<String, Targets>,
    /// Name of the start state.
    pub start_state: String,
    /// Names of the accepting states.
    pub accept_states: Vec<String>,
    /// Words that should be run through the automaton, every character is read as one symbol.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub test_cases: Vec<String>,
}

impl std::str::FromStr for AutomatonDescription {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(serde_json::from_str(s)?)
    }
}

impl AutomatonDescription {
    /// Parses a description from the given reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ConfigError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Reads and parses the description stored in the file at `path`.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        debug!("loading automaton description from {}", path.as_ref().display());
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// Serializes the description as pretty printed JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Builds the described [`Nfa`] and validates it. Fails if some referenced state was not
    /// declared, if a transition reads a symbol outside of the alphabet or if a transition key
    /// is malformed. Surrounding whitespace of all names is ignored.
    pub fn into_nfa(&self) -> Result<Nfa, ConfigError> {
        let mut builder = Nfa::builder()
            .with_states(self.states.iter().map(|q| q.trim()))
            .with_alphabet(
                self.alphabet_list
                    .iter()
                    .map(|sym| sym.trim())
                    .filter(|sym| {
                        if *sym == EPSILON_SYMBOL {
                            trace!("skipping epsilon in alphabet");
                            false
                        } else {
                            true
                        }
                    }),
            )
            .with_accepting(self.accept_states.iter().map(|q| q.trim()));

        for (key, targets) in &self.transition_functions {
            let (origin, label) = parse_transition_key(key)?;
            let mut any = false;
            for target in targets.iter() {
                builder.add_transition(origin.clone(), label.clone(), target.trim());
                any = true;
            }
            if !any {
                warn!("transition `{key}` has no targets");
            }
        }

        let nfa = builder.into_nfa(self.start_state.trim());
        nfa.validate()?;
        debug!(
            "loaded automaton with {} states over {:?}",
            nfa.size(),
            nfa.alphabet()
        );
        Ok(nfa)
    }

    /// Splits the test cases into words, each character of a test case is one symbol.
    pub fn test_words(&self) -> impl Iterator<Item = (&str, Vec<Symbol>)> + '_ {
        self.test_cases
            .iter()
            .map(|case| (case.as_str(), case.chars().map(Symbol::from).collect()))
    }
}

fn parse_transition_key(key: &str) -> Result<(State, Label), ConfigError> {
    let (origin, symbol) = key
        .rsplit_once(',')
        .ok_or_else(|| ConfigError::MalformedTransitionKey(key.to_string()))?;
    let (origin, symbol) = (origin.trim(), symbol.trim());
    if origin.is_empty() || symbol.is_empty() {
        return Err(ConfigError::MalformedTransitionKey(key.to_string()));
    }
    let label = if symbol == EPSILON_SYMBOL {
        Label::Epsilon
    } else {
        Label::from(symbol)
    };
    Ok((State::from(origin), label))
}

impl Dfa {
    /// Produces the description of `self` as a deterministic automaton. States are named by their
    /// canonical labels (see [`crate::StateSet::label`]) and every transition has a single target,
    /// so the description can be loaded again.
    ///
    /// Fails with [`ConfigError::AmbiguousLabel`] if two states have the same label, which
    /// happens for a state named `φ` next to the dead state or for state names containing `", "`.
    pub fn to_description(&self) -> Result<AutomatonDescription, ConfigError> {
        let mut labels = Set::default();
        let states = self
            .states_in_display_order()
            .into_iter()
            .map(|q| {
                let label = q.show();
                if labels.insert(label.clone()) {
                    Ok(label)
                } else {
                    Err(ConfigError::AmbiguousLabel(label))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(AutomatonDescription {
            states,
            alphabet_list: self.alphabet().universe().map(Show::show).collect(),
            transition_functions: self
                .transitions()
                .map(|(q, a, p)| (format!("{},{}", q.show(), a.show()), Targets::Single(p.show())))
                .collect(),
            start_state: self.start().show(),
            accept_states: self.accepting().map(Show::show).collect(),
            test_cases: vec![],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::*;

    const NFA_DESCRIPTION: &str = r#"{
        "states": ["q1", "q2", "q3"],
        "alphabet_list": ["a", "b", "ε"],
        "transition_functions": {
            "q1,ε": ["q2"],
            "q1,a": ["q3"],
            "q2,a": ["q1"],
            "q3,a": ["q2"],
            "q3,b": ["q2", "q3"]
        },
        "start_state": "q1",
        "accept_states": ["q2"]
    }"#;

    const DFA_DESCRIPTION: &str = r#"{
        "states": ["q1", "q2"],
        "alphabet_list": ["0", "1"],
        "transition_function": {
            "q1,0": "q1",
            "q1,1": "q2",
            "q2,0": "q1",
            "q2,1": "q2"
        },
        "start_state": "q1",
        "accept_states": ["q2"],
        "test_cases": ["0", "1", "01", "0101010"]
    }"#;

    #[test_log::test]
    fn load_nondeterministic_description() {
        let description: AutomatonDescription = NFA_DESCRIPTION.parse().unwrap();
        assert!(description.test_cases.is_empty());

        let nfa = description.into_nfa().unwrap();
        assert_eq!(nfa.size(), 3);
        assert_eq!(nfa.alphabet(), &Alphabet::new(['a', 'b']));
        assert!(nfa.has_epsilon_transitions());
        assert_eq!(
            nfa.successors(&State::from("q3"), &Label::from('b'))
                .collect::<Vec<_>>(),
            vec![&State::from("q2"), &State::from("q3")]
        );

        let dfa = nfa.determinize().unwrap();
        assert_eq!(dfa.start(), &StateSet::from_iter(["q1", "q2"]));
        assert_eq!(dfa.size(), 4);
    }

    #[test_log::test]
    fn load_deterministic_description_with_test_cases() {
        let description = AutomatonDescription::from_reader(DFA_DESCRIPTION.as_bytes()).unwrap();
        let dfa = description.into_nfa().unwrap().determinize().unwrap();

        let results = description
            .test_words()
            .map(|(case, word)| (case, dfa.accepts(word).unwrap()))
            .collect::<Vec<_>>();
        assert_eq!(
            results,
            vec![("0", false), ("1", true), ("01", true), ("0101010", false)]
        );
    }

    #[test]
    fn load_from_file() {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(DFA_DESCRIPTION.as_bytes()).unwrap();
        let description = AutomatonDescription::from_path(file.path()).unwrap();
        assert_eq!(description.start_state, "q1");

        assert!(matches!(
            AutomatonDescription::from_path("/this/path/does/not/exist.json"),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn reject_malformed_descriptions() {
        assert!(matches!(
            "{ \"states\": [] }".parse::<AutomatonDescription>(),
            Err(ConfigError::Json(_))
        ));

        let mut description: AutomatonDescription = DFA_DESCRIPTION.parse().unwrap();
        description
            .transition_functions
            .insert("q1".to_string(), Targets::Single("q2".to_string()));
        assert!(matches!(
            description.into_nfa(),
            Err(ConfigError::MalformedTransitionKey(key)) if key == "q1"
        ));

        let mut description: AutomatonDescription = DFA_DESCRIPTION.parse().unwrap();
        description.start_state = "q9".to_string();
        assert!(matches!(
            description.into_nfa(),
            Err(ConfigError::Invalid(AutomatonError::InvalidAutomaton {
                role: StateRole::Start,
                ..
            }))
        ));

        let mut description: AutomatonDescription = DFA_DESCRIPTION.parse().unwrap();
        description
            .transition_functions
            .insert("φ,0".to_string(), Targets::Single("φ".to_string()));
        assert!(matches!(
            description.into_nfa(),
            Err(ConfigError::Invalid(AutomatonError::InvalidAutomaton { .. }))
        ));
    }

    #[test]
    fn transition_keys() {
        assert_eq!(
            parse_transition_key("q0,a").unwrap(),
            (State::from("q0"), Label::from('a'))
        );
        assert_eq!(
            parse_transition_key("q1, q2,b").unwrap(),
            (State::from("q1, q2"), Label::from('b'))
        );
        assert_eq!(
            parse_transition_key("q0, ε").unwrap(),
            (State::from("q0"), Label::Epsilon)
        );
        assert!(parse_transition_key("q0a").is_err());
        assert!(parse_transition_key(",a").is_err());
    }

    #[test_log::test]
    fn description_of_dfa_can_be_loaded_again() {
        let description: AutomatonDescription = NFA_DESCRIPTION.parse().unwrap();
        let dfa = description.into_nfa().unwrap().determinize().unwrap();

        let exported = dfa.to_description().unwrap();
        assert_eq!(exported.start_state, "q1, q2");
        assert_eq!(exported.states.last().map(String::as_str), Some("φ"));
        assert_eq!(
            exported.transition_functions.get("q1, q2,a"),
            Some(&Targets::Single("q1, q2, q3".to_string()))
        );

        let json = exported.to_json().unwrap();
        let reloaded: AutomatonDescription = json.parse().unwrap();
        assert_eq!(reloaded, exported);

        // the reloaded automaton is deterministic, so determinizing it yields an isomorphic copy
        let copy = reloaded.into_nfa().unwrap().determinize().unwrap();
        assert_eq!(copy.size(), dfa.size());
        assert_eq!(copy.accepting().count(), dfa.accepting().count());
        for word in ["", "a", "b", "ab", "aab", "abab", "abba", "bbb"] {
            assert_eq!(copy.accepts(word.chars()), dfa.accepts(word.chars()), "{word}");
        }
    }

    #[test_log::test]
    fn names_are_trimmed() {
        let mut description: AutomatonDescription = DFA_DESCRIPTION.parse().unwrap();
        description.states = vec![" q1".to_string(), "q2 ".to_string()];
        description.start_state = "q1 ".to_string();
        description.accept_states = vec![" q2".to_string()];
        description
            .transition_functions
            .insert("q1, 1".to_string(), Targets::Single(" q2".to_string()));
        description
            .transition_functions
            .insert("q2,0".to_string(), Targets::Multiple(vec!["q1 ".to_string()]));

        let nfa = description.into_nfa().unwrap();
        assert!(nfa.contains_state(&State::from("q1")));
        assert!(nfa.is_accepting(&State::from("q2")));
        assert_eq!(nfa.start(), &State::from("q1"));
        assert_eq!(
            nfa.successors(&State::from("q1"), &Label::from('1'))
                .collect::<Vec<_>>(),
            vec![&State::from("q2")]
        );
        let dfa = nfa.determinize().unwrap();
        assert_eq!(dfa.accepts("01".chars()), Ok(true));
    }

    #[test_log::test]
    fn ambiguous_labels_are_not_exported() {
        let dfa = Nfa::builder()
            .with_states(["φ", "q"])
            .with_alphabet(['a', 'b'])
            .with_transitions([("q", 'a', "φ")])
            .with_accepting(["φ"])
            .into_nfa("q")
            .determinize()
            .unwrap();
        assert!(dfa.accepts("a".chars()).unwrap());
        assert!(!dfa.accepts("ab".chars()).unwrap());
        assert!(matches!(
            dfa.to_description(),
            Err(ConfigError::AmbiguousLabel(label)) if label == "φ"
        ));

        let dfa = Nfa::builder()
            .with_states(["p, q", "p", "q"])
            .with_alphabet(['a'])
            .with_transitions([("p, q", 'a', "p"), ("p, q", 'a', "q")])
            .into_nfa("p, q")
            .determinize()
            .unwrap();
        assert!(matches!(
            dfa.to_description(),
            Err(ConfigError::AmbiguousLabel(label)) if label == "p, q"
        ));
    }
}
