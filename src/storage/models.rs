//! Data models for the cricket database

use crate::cli::types::{MatchId, MatchStatus, PlayerId, PlayerRole, SeriesId, TeamId, VenueId};
use crate::error::{CricketError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::ValueRef;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub short_name: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub team_id: Option<TeamId>,
    pub country: Option<String>,
    pub role: Option<PlayerRole>,
    pub batting_style: Option<String>,
    pub bowling_style: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

/// Fields for a manually created player; the id is assigned on insert.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewPlayer {
    pub name: String,
    pub team_id: Option<TeamId>,
    pub country: Option<String>,
    pub role: Option<PlayerRole>,
    pub batting_style: Option<String>,
    pub bowling_style: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

impl NewPlayer {
    /// Trim text fields and check the required ones.
    pub(crate) fn normalized(&self) -> Result<NewPlayer> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(CricketError::InvalidParameter {
                name: "name".to_string(),
                reason: "must not be blank".to_string(),
            });
        }
        if self.role.is_none() {
            return Err(CricketError::InvalidParameter {
                name: "role".to_string(),
                reason: "is required".to_string(),
            });
        }
        Ok(NewPlayer {
            name: name.to_string(),
            country: trimmed(&self.country),
            batting_style: trimmed(&self.batting_style),
            bowling_style: trimmed(&self.bowling_style),
            ..self.clone()
        })
    }

    pub(crate) fn into_player(self, id: PlayerId) -> Player {
        Player {
            id,
            name: self.name,
            team_id: self.team_id,
            country: self.country,
            role: self.role,
            batting_style: self.batting_style,
            bowling_style: self.bowling_style,
            date_of_birth: self.date_of_birth,
        }
    }
}

fn trimmed(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Partial update. `None` leaves a field alone; for nullable fields
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerUpdate {
    pub name: Option<String>,
    pub team_id: Option<Option<TeamId>>,
    pub country: Option<Option<String>>,
    pub role: Option<PlayerRole>,
    pub batting_style: Option<Option<String>>,
    pub bowling_style: Option<Option<String>>,
    pub date_of_birth: Option<Option<NaiveDate>>,
}

impl PlayerUpdate {
    pub fn is_empty(&self) -> bool {
        *self == PlayerUpdate::default()
    }

    pub(crate) fn apply(&self, player: &mut Player) -> Result<()> {
        if let Some(name) = &self.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(CricketError::InvalidParameter {
                    name: "name".to_string(),
                    reason: "must not be blank".to_string(),
                });
            }
            player.name = name.to_string();
        }
        if let Some(team_id) = self.team_id {
            player.team_id = team_id;
        }
        if let Some(country) = &self.country {
            player.country = trimmed(country);
        }
        if let Some(role) = self.role {
            player.role = Some(role);
        }
        if let Some(style) = &self.batting_style {
            player.batting_style = trimmed(style);
        }
        if let Some(style) = &self.bowling_style {
            player.bowling_style = trimmed(style);
        }
        if let Some(dob) = self.date_of_birth {
            player.date_of_birth = dob;
        }
        Ok(())
    }
}

/// What to do with a player's statistics when the player is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeleteMode {
    /// Refuse while statistics reference the player.
    #[default]
    Restrict,
    /// Delete the statistics along with the player.
    Cascade,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerFilter {
    /// Case-insensitive substring of the name.
    pub name_contains: Option<String>,
    pub team_id: Option<TeamId>,
    pub role: Option<PlayerRole>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Venue {
    pub id: VenueId,
    pub name: String,
    pub city: Option<String>,
    pub country: Option<String>,
    pub capacity: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub id: SeriesId,
    pub name: String,
    pub host_country: Option<String>,
    pub match_type: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub total_matches: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match {
    pub id: MatchId,
    pub series_id: Option<SeriesId>,
    pub team1_id: TeamId,
    pub team2_id: TeamId,
    pub venue_id: Option<VenueId>,
    pub status: MatchStatus,
    pub format: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub winner_id: Option<TeamId>,
    pub win_margin: Option<String>,
    pub victory_type: Option<String>,
    pub toss_winner_id: Option<TeamId>,
    pub toss_decision: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BattingStat {
    pub match_id: MatchId,
    pub player_id: PlayerId,
    pub innings_no: i64,
    pub team_id: Option<TeamId>,
    pub runs: i64,
    pub balls: i64,
    pub fours: i64,
    pub sixes: i64,
    pub strike_rate: Option<f64>,
    pub batting_pos: Option<i64>,
    pub is_out: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BowlingStat {
    pub match_id: MatchId,
    pub player_id: PlayerId,
    pub innings_no: i64,
    pub team_id: Option<TeamId>,
    pub overs: f64,
    pub maidens: i64,
    pub runs: i64,
    pub wickets: i64,
    pub economy: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldingStat {
    pub match_id: MatchId,
    pub player_id: PlayerId,
    pub catches: i64,
    pub stumpings: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Partnership {
    pub match_id: MatchId,
    pub innings_no: i64,
    pub player1_id: PlayerId,
    pub player2_id: PlayerId,
    pub runs: i64,
    pub balls: Option<i64>,
    /// Gap in batting positions between the pair, when known.
    pub pair_pos_diff: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub tables: Vec<String>,
    pub players: i64,
    pub matches: i64,
}

/// One SQL value in a query result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl From<ValueRef<'_>> for Cell {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Cell::Null,
            ValueRef::Integer(i) => Cell::Integer(i),
            ValueRef::Real(f) => Cell::Real(f),
            ValueRef::Text(t) | ValueRef::Blob(t) => {
                Cell::Text(String::from_utf8_lossy(t).into_owned())
            }
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => f.write_str("NULL"),
            Cell::Integer(i) => write!(f, "{i}"),
            Cell::Real(r) => write!(f, "{r:.2}"),
            Cell::Text(t) => f.write_str(t),
        }
    }
}

/// Column names plus rows of cells, in result order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TabularResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl TabularResult {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cells of the named column, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<&Cell>> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().filter_map(|row| row.get(index)).collect())
    }

    /// Rows as JSON objects keyed by column name.
    pub fn to_json_rows(&self) -> Vec<serde_json::Map<String, serde_json::Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(row.iter().map(|cell| match cell {
                        Cell::Null => serde_json::Value::Null,
                        Cell::Integer(i) => serde_json::Value::from(*i),
                        Cell::Real(r) => serde_json::Value::from(*r),
                        Cell::Text(t) => serde_json::Value::from(t.as_str()),
                    }))
                    .collect()
            })
            .collect()
    }
}
