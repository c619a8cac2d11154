//! Error types for the Cricbuzz LiveStats core

use std::time::Duration;
use thiserror::Error;

#[cfg(test)]
mod tests;

pub type Result<T> = std::result::Result<T, CricketError>;

#[derive(Error, Debug)]
pub enum CricketError {
    #[error("API request to {endpoint} failed after {attempts} attempt(s): {reason}")]
    Api {
        endpoint: String,
        attempts: u32,
        reason: String,
    },

    #[error("API rate limit exceeded; next slot in {}ms", .retry_after.as_millis())]
    RateLimitExceeded { retry_after: Duration },

    #[error("Database connection unavailable: {message}")]
    Connection { message: String },

    #[error("Query failed: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Cannot delete {entity} {id}: referenced by {dependents} row(s)")]
    ForeignKeyViolation {
        entity: &'static str,
        id: i64,
        dependents: usize,
    },

    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Malformed response from {endpoint}: {reason}")]
    MalformedResponse { endpoint: String, reason: String },

    #[error("{entity} already exists: {key}")]
    AlreadyExists { entity: &'static str, key: String },

    #[error("Match {match_id} cannot move from {from} to {to}")]
    InvalidTransition {
        match_id: i64,
        from: String,
        to: String,
    },

    #[error("Statistics for completed match {match_id} are read-only")]
    RecordLocked { match_id: i64 },

    #[error("Unknown query: {id}")]
    UnknownQuery { id: String },

    #[error("{operation} timed out after {}ms", .after.as_millis())]
    Timeout {
        operation: String,
        after: Duration,
    },

    #[error("RAPIDAPI_KEY is not set")]
    MissingApiKey,

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

impl CricketError {
    /// Whether retrying the same action later has a reasonable chance of succeeding.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CricketError::Api { .. }
                | CricketError::Connection { .. }
                | CricketError::RateLimitExceeded { .. }
                | CricketError::Timeout { .. }
        )
    }

    /// Message safe to show an end user. Raw driver and network text stays in the logs.
    pub fn user_message(&self) -> String {
        let base = match self {
            CricketError::Api { endpoint, .. } => {
                format!("Could not load live data from Cricbuzz ({endpoint}).")
            }
            CricketError::RateLimitExceeded { retry_after } => format!(
                "The Cricbuzz API budget is used up for now; a slot frees in about {}s.",
                retry_after.as_secs().max(1)
            ),
            CricketError::Connection { .. } => "The database is busy or unreachable.".to_string(),
            CricketError::Query(_) => "The database rejected the request.".to_string(),
            CricketError::NotFound { entity, id } => format!("No {entity} with id {id}."),
            CricketError::ForeignKeyViolation {
                entity,
                id,
                dependents,
            } => format!(
                "{entity} {id} still has {dependents} statistics row(s); delete with cascade to remove them too."
            ),
            CricketError::InvalidParameter { name, reason } => {
                format!("Invalid value for '{name}': {reason}.")
            }
            CricketError::MalformedResponse { .. } => {
                "Cricbuzz returned data in an unexpected format.".to_string()
            }
            CricketError::AlreadyExists { entity, key } => format!("{entity} '{key}' already exists."),
            CricketError::InvalidTransition { match_id, from, to } => {
                format!("Match {match_id} is {from} and cannot go back to {to}.")
            }
            CricketError::RecordLocked { match_id } => {
                format!("Match {match_id} is completed; its statistics can no longer change.")
            }
            CricketError::UnknownQuery { id } => format!("There is no query named '{id}'."),
            CricketError::Timeout { operation, .. } => format!("{operation} took too long."),
            CricketError::MissingApiKey => {
                "No API key configured; set RAPIDAPI_KEY.".to_string()
            }
            CricketError::Config { message } => format!("Configuration problem: {message}."),
            CricketError::Json(_) | CricketError::Io(_) | CricketError::InvalidHeader(_) => {
                "An internal error occurred.".to_string()
            }
        };

        if self.is_retryable() {
            format!("{base} Please try again.")
        } else {
            base
        }
    }
}

impl From<r2d2::Error> for CricketError {
    fn from(err: r2d2::Error) -> Self {
        CricketError::Connection {
            message: err.to_string(),
        }
    }
}
