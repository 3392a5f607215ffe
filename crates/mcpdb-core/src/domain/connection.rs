//! Connection summary types.
//!
//! `app_connection` is owned by another part of the application. Pieces only
//! ever expose a summary of it; the credential `value` is never read here.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::id::ApId;

/// Health of a stored connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppConnectionStatus {
    #[default]
    Active,
    Missing,
    Error,
}

impl AppConnectionStatus {
    /// The value stored in the `status` column.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Missing => "MISSING",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for AppConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppConnectionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(Self::Active),
            "MISSING" => Ok(Self::Missing),
            "ERROR" => Ok(Self::Error),
            other => Err(format!("Unknown connection status: {other}")),
        }
    }
}

/// Non-sensitive view of an `app_connection` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConnectionSummary {
    pub id: ApId,
    pub display_name: String,
    pub piece_name: String,
    pub status: AppConnectionStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_column_value() {
        for status in [
            AppConnectionStatus::Active,
            AppConnectionStatus::Missing,
            AppConnectionStatus::Error,
        ] {
            assert_eq!(status.as_str().parse::<AppConnectionStatus>(), Ok(status));
        }
        assert!("active".parse::<AppConnectionStatus>().is_err());
    }
}
