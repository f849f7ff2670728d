use finite_automaton::prelude::*;

use owo_colors::OwoColorize;
use tracing::{debug, error, info, trace};
use tracing_subscriber::{filter, prelude::*};

use clap::{Arg, ArgAction, ArgMatches, Command};

fn file_arg() -> Arg {
    Arg::new("file")
        .required(true)
        .index(1)
        .help("JSON file that describes the automaton")
}

fn cli() -> clap::Command {
    Command::new("nfa2dfa")
        .about("Converts nondeterministic finite automata into deterministic ones")
        .subcommand_required(true)
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbosity")
                .global(true)
                .num_args(0..=1)
                .require_equals(true)
                .value_parser(["warn", "info", "debug", "trace"])
                .default_missing_value("info"),
        )
        .subcommand(
            Command::new("convert")
                .about("reads an automaton description and prints the DFA obtained by the subset construction")
                .arg(file_arg())
                .arg(
                    Arg::new("format")
                        .short('f')
                        .long("format")
                        .value_parser(["table", "json", "dot"])
                        .default_value("table")
                        .help("Output format of the DFA"),
                )
                .arg(
                    Arg::new("color")
                        .long("color")
                        .action(ArgAction::SetTrue)
                        .help("Highlights the start state and accepting states in the table"),
                )
                .arg(
                    Arg::new("render")
                        .long("render")
                        .value_name("PNG")
                        .help("Additionally renders the DFA into the given PNG file using graphviz"),
                ),
        )
        .subcommand(
            Command::new("simulate")
                .about("converts the described automaton and runs all of its test cases")
                .arg(file_arg()),
        )
}

fn level_filter(verbosity: Option<&str>) -> filter::LevelFilter {
    match verbosity {
        Some("trace") => filter::LevelFilter::TRACE,
        Some("debug") => filter::LevelFilter::DEBUG,
        Some("warn") => filter::LevelFilter::WARN,
        _ => filter::LevelFilter::INFO,
    }
}

fn setup_logging(matches: &ArgMatches) {
    let level = level_filter(
        matches
            .try_get_one::<String>("verbosity")
            .ok()
            .flatten()
            .map(|m| m.as_str()),
    );

    let stderr_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(stderr_log.with_filter(level))
        .init();

    trace!("setup {level} logging");
}

fn load(sub_matches: &ArgMatches) -> Result<(AutomatonDescription, Dfa), ConfigError> {
    let path = sub_matches
        .get_one::<String>("file")
        .map(String::as_str)
        .unwrap_or_default();
    let description = AutomatonDescription::from_path(path)?;
    let nfa = description.into_nfa()?;
    debug!("read automaton with {} states", nfa.size());

    let start = std::time::Instant::now();
    let dfa = nfa.determinize()?;
    info!(
        "subset construction produced {} states in {}µs",
        dfa.size(),
        start.elapsed().as_micros()
    );
    Ok((description, dfa))
}

fn convert(sub_matches: &ArgMatches) -> Result<(), ConfigError> {
    let (_, dfa) = load(sub_matches)?;

    match sub_matches.get_one::<String>("format").map(String::as_str) {
        Some("json") => println!("{}", dfa.to_description()?.to_json()?),
        Some("dot") => println!("{}", dfa.dot_representation()),
        _ if sub_matches.get_flag("color") => println!(
            "{}",
            dfa.build_transition_table(|q, accepting| {
                let label = if q == dfa.start() {
                    format!("→ {}", q.show())
                } else {
                    q.show()
                };
                if accepting {
                    label.green().bold().to_string()
                } else if q.is_dead() {
                    label.dimmed().to_string()
                } else {
                    label
                }
            })
        ),
        _ => println!("{}", dfa.transition_table()),
    }

    if let Some(target) = sub_matches.get_one::<String>("render") {
        render(&dfa, target)?;
    }
    Ok(())
}

#[cfg(feature = "graphviz")]
fn render(dfa: &Dfa, target: &str) -> Result<(), ConfigError> {
    debug!("rendering DFA to {target}");
    Ok(dfa.render_to_file_name(target)?)
}

#[cfg(not(feature = "graphviz"))]
fn render(_dfa: &Dfa, _target: &str) -> Result<(), ConfigError> {
    tracing::warn!("rendering requires the `graphviz` feature, skipping");
    Ok(())
}

fn simulate(sub_matches: &ArgMatches) -> Result<(), ConfigError> {
    let (description, dfa) = load(sub_matches)?;
    if description.test_cases.is_empty() {
        info!("the description contains no test cases");
    }

    for (case, word) in description.test_words() {
        match dfa.accepts(word) {
            Ok(true) => println!("case `{case}` is accepted"),
            Ok(false) => println!("case `{case}` is not accepted"),
            Err(e) => println!("case `{case}` could not be run: {e}"),
        }
    }
    Ok(())
}

pub fn main() {
    let matches = cli().get_matches();

    setup_logging(&matches);

    let result = match matches.subcommand() {
        Some(("convert", sub_matches)) => convert(sub_matches),
        Some(("simulate", sub_matches)) => simulate(sub_matches),
        _ => unreachable!(),
    };

    if let Err(e) = result {
        error!("{e}");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
