use std::fmt::{Display, Formatter};
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Failure while assembling one hand. The batch replaces the hand with a
/// placeholder record and moves on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HandError {
    #[error("hand text is empty")]
    Empty,
    #[error("button seat {seat} is not occupied")]
    VacantButton { seat: u32 },
    #[error("seat {seat} is declared twice")]
    DuplicateSeat { seat: u32 },
    #[error("player '{name}' is seated twice")]
    DuplicatePlayer { name: String },
}

/// A hand-history file that could not be turned into text.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{} is not valid UTF-8", .path.display())]
    Decode { path: PathBuf },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("subject alias must not be empty")]
    EmptySubject,
    #[error(transparent)]
    Pattern(#[from] regex::Error),
}

/// A field whose pattern was absent; the record carries its sentinel instead.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MissingField {
    HandId,
    Timestamp,
    TableName,
    Stakes,
    ButtonSeat,
    TotalPot,
}

impl Display for MissingField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            MissingField::HandId => "hand id",
            MissingField::Timestamp => "timestamp",
            MissingField::TableName => "table name",
            MissingField::Stakes => "stakes",
            MissingField::ButtonSeat => "button seat",
            MissingField::TotalPot => "total pot",
        })
    }
}
