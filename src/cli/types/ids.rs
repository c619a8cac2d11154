//! ID types for Cricbuzz entities.

use crate::error::{CricketError, Result};
use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            pub fn new(id: i64) -> Self {
                Self(id)
            }

            pub fn as_i64(&self) -> i64 {
                self.0
            }

            /// Entity name used in error messages.
            pub const LABEL: &'static str = $label;
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = CricketError;

            fn from_str(s: &str) -> Result<Self> {
                s.trim()
                    .parse()
                    .map(Self)
                    .map_err(|e: std::num::ParseIntError| CricketError::InvalidParameter {
                        name: format!("{}_id", $label),
                        reason: e.to_string(),
                    })
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                self.0.to_sql()
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                i64::column_result(value).map(Self)
            }
        }
    };
}

entity_id!(
    /// Cricbuzz team id (`teamId`).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cricbuzz_stats::TeamId;
    ///
    /// let india = TeamId::new(2);
    /// assert_eq!(india.as_i64(), 2);
    /// assert_eq!(india.to_string(), "2");
    /// ```
    TeamId,
    "team"
);

entity_id!(
    /// Player id. API-synced players carry the Cricbuzz id; players created
    /// through the CRUD operations get a generated one.
    PlayerId,
    "player"
);

entity_id!(
    /// Cricbuzz match id (`matchId`).
    MatchId,
    "match"
);

entity_id!(
    /// Local venue id.
    VenueId,
    "venue"
);

entity_id!(
    /// Cricbuzz series id.
    SeriesId,
    "series"
);
