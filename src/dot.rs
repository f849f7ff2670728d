use std::{fmt::Display, hash::Hash};

use itertools::Itertools;

use crate::{
    math::{Map, OrderedMap},
    state::{State, StateSet},
    Dfa, Nfa, Show,
};

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Implemented by automata that can be exported in the DOT format of graphviz. Nodes are
/// identified by their position in [`Dottable::dot_states`], the names of the states only appear
/// in the node labels, so they need not be valid DOT identifiers.
pub trait Dottable {
    /// The type of the states that become nodes.
    type DotState: Eq + Hash;

    /// The name of the graph.
    fn dot_name(&self) -> Option<String>;

    /// The states in the order in which they should be emitted. The first state is the initial one.
    fn dot_states(&self) -> Vec<&Self::DotState>;

    /// Attributes of the node that represents `state`.
    fn dot_state_attributes(&self, state: &Self::DotState) -> Vec<DotStateAttribute>;

    /// All edges as triples of origin, target and attributes.
    fn dot_edges(&self) -> Vec<(&Self::DotState, &Self::DotState, Vec<DotTransitionAttribute>)>;

    /// Compute the graphviz representation, for more information on the DOT format,
    /// see the [graphviz documentation](https://graphviz.org/doc/info/lang.html).
    fn dot_representation(&self) -> String {
        let states = self.dot_states();
        let idents: Map<&Self::DotState, String> = states
            .iter()
            .enumerate()
            .map(|(i, q)| (*q, format!("s{i}")))
            .collect();

        let header = [
            format!(
                "digraph \"{}\" {{",
                escape(&self.dot_name().unwrap_or("A".to_string()))
            ),
            "rankdir=LR".to_string(),
            "init [label=\"\", shape=none, width=0]".to_string(),
        ]
        .into_iter()
        .chain((!states.is_empty()).then(|| "init -> s0".to_string()));

        let nodes = states.iter().map(|q| {
            format!(
                "{} [{}]",
                idents[*q],
                self.dot_state_attributes(q)
                    .into_iter()
                    .map(|attr| attr.to_string())
                    .join(", ")
            )
        });

        let edges = self
            .dot_edges()
            .into_iter()
            .filter_map(|(origin, target, attributes)| {
                Some(format!(
                    "{} -> {} [{}]",
                    idents.get(origin)?,
                    idents.get(target)?,
                    attributes.into_iter().map(|attr| attr.to_string()).join(", ")
                ))
            })
            .collect_vec();

        header
            .chain(nodes)
            .chain(edges)
            .chain(std::iter::once("}".to_string()))
            .join("\n")
    }

    /// Attempts to render the object to a PNG file with the given filename by invoking the `dot`
    /// executable. This method is only available on the `graphviz` crate feature and makes use
    /// of temporary files.
    #[cfg(feature = "graphviz")]
    fn render_to_file_name(&self, filename: &str) -> Result<(), std::io::Error> {
        use std::io::Write;
        use tracing::trace;

        let dot = self.dot_representation();
        trace!("writing dot representation\n{}", dot);
        let mut tempfile = tempfile::NamedTempFile::new()?;
        tempfile.write_all(dot.as_bytes())?;

        let output = std::process::Command::new("dot")
            .arg("-Tpng")
            .arg("-o")
            .arg(filename)
            .arg(tempfile.path())
            .output()?;
        if output.status.success() {
            return Ok(());
        }

        let mut message = format!("dot process exited with status: {}", output.status);
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            message = format!("{message}: {}", stderr.trim());
        }
        Err(std::io::Error::new(std::io::ErrorKind::Other, message))
    }
}

/// Groups transitions between the same pair of states, so that each pair is connected by a
/// single edge labelled with all symbols.
fn grouped_edges<'a, Q, I>(transitions: I) -> Vec<(&'a Q, &'a Q, Vec<DotTransitionAttribute>)>
where
    Q: Ord + 'a,
    I: IntoIterator<Item = (&'a Q, String, &'a Q)>,
{
    let mut grouped: OrderedMap<(&'a Q, &'a Q), Vec<String>> = OrderedMap::new();
    for (origin, label, target) in transitions {
        grouped.entry((origin, target)).or_default().push(label);
    }
    grouped
        .into_iter()
        .map(|((origin, target), labels)| {
            (
                origin,
                target,
                vec![DotTransitionAttribute::Label(labels.join(", "))],
            )
        })
        .collect()
}

/// Color of the dead state in the DOT output of a [`Dfa`].
const DEAD_STATE_COLOR: &str = "gray";

fn state_attributes(label: String, accepting: bool) -> Vec<DotStateAttribute> {
    let shape = if accepting { "doublecircle" } else { "circle" };
    vec![
        DotStateAttribute::Shape(shape.into()),
        DotStateAttribute::Label(label),
    ]
}

impl Dottable for Dfa {
    type DotState = StateSet;

    fn dot_name(&self) -> Option<String> {
        Some("DFA".into())
    }

    fn dot_states(&self) -> Vec<&StateSet> {
        self.states_in_display_order()
    }

    fn dot_state_attributes(&self, state: &StateSet) -> Vec<DotStateAttribute> {
        let mut attributes = state_attributes(state.show(), self.is_accepting(state));
        if state.is_dead() {
            attributes.push(DotStateAttribute::Color(DEAD_STATE_COLOR.into()));
        }
        attributes
    }

    fn dot_edges(&self) -> Vec<(&StateSet, &StateSet, Vec<DotTransitionAttribute>)> {
        grouped_edges(self.transitions().map(|(q, a, p)| (q, a.show(), p)))
    }
}

impl Dottable for Nfa {
    type DotState = State;

    fn dot_name(&self) -> Option<String> {
        Some("NFA".into())
    }

    fn dot_states(&self) -> Vec<&State> {
        std::iter::once(self.start())
            .chain(self.states().filter(|q| *q != self.start()))
            .collect()
    }

    fn dot_state_attributes(&self, state: &State) -> Vec<DotStateAttribute> {
        state_attributes(state.show(), self.is_accepting(state))
    }

    fn dot_edges(&self) -> Vec<(&State, &State, Vec<DotTransitionAttribute>)> {
        grouped_edges(self.transitions().map(|(q, l, p)| (q, l.show(), p)))
    }
}

/// Enum that abstracts attributes of nodes in the DOT format.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum DotStateAttribute {
    /// The label of a node
    Label(String),
    /// The shape of a node
    Shape(String),
    /// The color of a node
    Color(String),
}

impl Display for DotStateAttribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DotStateAttribute::Label(s) => write!(f, "label=\"{}\"", escape(s)),
            DotStateAttribute::Shape(s) => write!(f, "shape=\"{}\"", escape(s)),
            DotStateAttribute::Color(c) => write!(f, "color=\"{}\"", escape(c)),
        }
    }
}

/// Enum that abstracts attributes of edges in the DOT format.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum DotTransitionAttribute {
    /// The label of an edge
    Label(String),
}

impl Display for DotTransitionAttribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DotTransitionAttribute::Label(lbl) => write!(f, "label=\"{}\"", escape(lbl)),
        }
    }
}
