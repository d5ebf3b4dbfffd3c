use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Caller-supplied settings shared by every hand in a batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParserConfig {
    /// Symbol printed before every amount (`$`, `€`, ...). Empty for bare chip counts.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Seated name (matched case-insensitively) of the player being analyzed.
    #[serde(default = "default_subject")]
    pub subject: String,
}

fn default_currency() -> String {
    "$".to_string()
}

fn default_subject() -> String {
    "Hero".to_string()
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            subject: default_subject(),
        }
    }
}

impl ParserConfig {
    pub fn new(currency: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            currency: currency.into(),
            subject: subject.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.subject.trim().is_empty() {
            return Err(ConfigError::EmptySubject);
        }
        Ok(())
    }

    pub fn is_subject(&self, name: &str) -> bool {
        name.eq_ignore_ascii_case(self.subject.trim())
    }
}
