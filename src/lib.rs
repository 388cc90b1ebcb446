pub use automaton::{Automaton, Edge, Kind, Label, State, StateId, Symbol, Traversal};
pub use config::{Config, Stage, Strategy};
pub use regex::ParseError;

/// States, edges and the traversal every other module builds on.
pub mod automaton;
/// Minimization by double reversal (Brzozowski).
pub mod brzozowski;
pub mod config;
/// Subset construction.
pub mod dfa;
/// Minimization by partition refinement.
pub mod partition;
/// Thompson construction of NFAs from patterns.
pub mod regex;

/// Runs the whole pipeline on `pattern` and returns its minimal DFA.
///
/// Every call builds its automata from scratch; nothing is shared between
/// calls.
pub fn convert(pattern: &str, strategy: Strategy) -> Result<Automaton, ParseError> {
    let nfa = regex::build(pattern)?;
    Ok(match strategy {
        Strategy::Partition => partition::minimize(&dfa::determinize(&nfa)),
        Strategy::Reversal => brzozowski::minimize(&nfa),
    })
}
