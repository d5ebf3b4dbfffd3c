pub mod analyzer;
pub mod cards;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod fees;
pub mod game;
pub mod header;
pub mod interpreter;
pub mod leaks;
pub mod lexer;
pub mod money;
pub mod outcome;
pub mod parser;
pub mod patterns;
pub mod record;
pub mod report;
pub mod seats;
pub mod showdown;
pub mod stats;
pub mod web;

pub use analyzer::{Analyzer, AnalyzerConfig, OutputFormat, TableKind};
pub use config::ParserConfig;
pub use diagnostics::{CollectingReporter, ParseReporter, TracingReporter};
pub use error::{BatchError, ConfigError, HandError, MissingField};
pub use game::{Action, ActionKind, Position, Street};
pub use money::Chips;
pub use outcome::PlayerOutcome;
pub use parser::{BatchOutcome, HandParser};
pub use record::{HandRecord, Player};
pub use stats::{PlayerStatsAccumulator, SharedAggregator, StatsAggregator};
