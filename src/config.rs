//! Command-line configuration for the `rex2dfa` binary.

use std::str::FromStr;
use thiserror::Error;

/// Which minimizer `convert` uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Partition refinement over the determinized automaton.
    #[default]
    Partition,
    /// Brzozowski's double reversal.
    Reversal,
}

/// How far down the pipeline the binary goes before printing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    Nfa,
    Dfa,
    #[default]
    Minimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unknown option `{0}`")]
    UnknownOption(String),
    #[error("bad value `{1}` for `{0}`")]
    BadValue(&'static str, String),
}

impl FromStr for Strategy {
    type Err = ConfigError;
    fn from_str(s: &str) -> Result<Strategy, ConfigError> {
        match s {
            "partition" => Ok(Strategy::Partition),
            "reversal" | "brzozowski" => Ok(Strategy::Reversal),
            _ => Err(ConfigError::BadValue("--strategy", s.to_string())),
        }
    }
}

impl FromStr for Stage {
    type Err = ConfigError;
    fn from_str(s: &str) -> Result<Stage, ConfigError> {
        match s {
            "nfa" => Ok(Stage::Nfa),
            "dfa" => Ok(Stage::Dfa),
            "min" | "minimal" => Ok(Stage::Minimal),
            _ => Err(ConfigError::BadValue("--stage", s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// --strategy=partition|reversal
    pub strategy: Strategy,

    /// --stage=nfa|dfa|min
    pub stage: Stage,

    /// --check: run both minimizers and report whether they agree
    pub check: bool,

    /// -h / --help
    pub help: bool,
}

pub const USAGE: &str = "\
usage: rex2dfa [--strategy=partition|reversal] [--stage=nfa|dfa|min] [--check]

Reads one pattern per line from stdin and prints the resulting automaton.";

impl Config {
    /// Parses arguments, not including the executable name.
    pub fn from_args<I: IntoIterator<Item = String>>(args: I) -> Result<Config, ConfigError> {
        let mut config = Config::default();
        for arg in args {
            match arg.split_once('=') {
                Some(("--strategy", value)) => config.strategy = value.parse()?,
                Some(("--stage", value)) => config.stage = value.parse()?,
                None if arg == "--check" => config.check = true,
                None if arg == "-h" || arg == "--help" => config.help = true,
                _ => return Err(ConfigError::UnknownOption(arg.clone())),
            }
        }
        Ok(config)
    }
}

/// A line of input as a pattern. `lines()` has already removed the `\n`;
/// this drops a trailing `\r` as well. Spaces are literal characters and stay.
pub fn pattern_of(line: &str) -> &str {
    line.strip_suffix('\r').unwrap_or(line)
}
