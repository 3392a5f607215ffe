//! Opaque 21-character identifiers.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Length of every primary and foreign key.
pub const AP_ID_LENGTH: usize = 21;

/// Errors produced when parsing an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    /// The identifier does not have exactly [`AP_ID_LENGTH`] characters.
    #[error("Identifier must be {AP_ID_LENGTH} characters, got {0}")]
    InvalidLength(usize),

    /// The identifier contains a character outside `[A-Za-z0-9_-]`.
    #[error("Identifier contains invalid character {0:?}")]
    InvalidCharacter(char),
}

/// A fixed-length opaque string identifier.
///
/// Ids are never auto-incrementing integers; rows created by the
/// application and by data migrations both carry 21-character ids.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ApId(String);

impl ApId {
    /// Generate a random identifier.
    pub fn generate() -> Self {
        let id = rand::thread_rng()
            .sample_iter(rand::distributions::Alphanumeric)
            .take(AP_ID_LENGTH)
            .map(char::from)
            .collect();

        Self(id)
    }

    /// Parse and validate an identifier.
    pub fn parse(value: &str) -> Result<Self, IdError> {
        let length = value.chars().count();
        if length != AP_ID_LENGTH {
            return Err(IdError::InvalidLength(length));
        }

        if let Some(c) = value
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
        {
            return Err(IdError::InvalidCharacter(c));
        }

        Ok(Self(value.to_string()))
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ApId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ApId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ApId> for String {
    fn from(id: ApId) -> Self {
        id.0
    }
}

impl AsRef<str> for ApId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
