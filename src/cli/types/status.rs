//! Match lifecycle and match-list kinds.

use crate::error::CricketError;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where a match is in its lifecycle. Ordering follows the lifecycle, so a
/// valid transition never decreases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Scheduled,
    Live,
    Completed,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "scheduled",
            MatchStatus::Live => "live",
            MatchStatus::Completed => "completed",
        }
    }

    /// Map a Cricbuzz `state` string onto the lifecycle.
    ///
    /// Anything that is neither upcoming nor finished counts as live
    /// (innings break, stumps, rain delay, ...).
    pub fn from_api_state(state: &str) -> Self {
        match state.trim().to_ascii_lowercase().as_str() {
            "preview" | "upcoming" | "toss" | "scheduled" => MatchStatus::Scheduled,
            "complete" | "completed" | "result" | "abandon" | "abandoned" | "no result" => {
                MatchStatus::Completed
            }
            _ => MatchStatus::Live,
        }
    }

    pub fn can_transition_to(&self, next: MatchStatus) -> bool {
        next >= *self
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchStatus {
    type Err = CricketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scheduled" => Ok(MatchStatus::Scheduled),
            "live" => Ok(MatchStatus::Live),
            "completed" => Ok(MatchStatus::Completed),
            other => Err(CricketError::InvalidParameter {
                name: "status".to_string(),
                reason: format!("expected scheduled, live or completed, got '{other}'"),
            }),
        }
    }
}

/// Which Cricbuzz match list to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum MatchListKind {
    Live,
    Recent,
    Upcoming,
}

impl MatchListKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchListKind::Live => "live",
            MatchListKind::Recent => "recent",
            MatchListKind::Upcoming => "upcoming",
        }
    }
}

impl fmt::Display for MatchListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for MatchStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for MatchStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: CricketError| FromSqlError::Other(Box::new(e)))
    }
}
