//! Cricket playing roles.

use crate::error::CricketError;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Playing role of a player.
///
/// Cricbuzz reports roles with several spellings ("Batting Allrounder",
/// "WK-Batsman", "Bowler"); `FromStr` folds them onto these four.
///
/// # Examples
///
/// ```rust
/// use cricbuzz_stats::PlayerRole;
///
/// let role: PlayerRole = "WK-Batsman".parse().unwrap();
/// assert_eq!(role, PlayerRole::WicketKeeper);
/// assert_eq!(role.to_string(), "Wicket-keeper");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerRole {
    Batsman,
    Bowler,
    AllRounder,
    WicketKeeper,
}

impl PlayerRole {
    pub const ALL: [PlayerRole; 4] = [
        PlayerRole::Batsman,
        PlayerRole::Bowler,
        PlayerRole::AllRounder,
        PlayerRole::WicketKeeper,
    ];

    /// Label stored in the `players.role` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerRole::Batsman => "Batsman",
            PlayerRole::Bowler => "Bowler",
            PlayerRole::AllRounder => "All-rounder",
            PlayerRole::WicketKeeper => "Wicket-keeper",
        }
    }
}

impl fmt::Display for PlayerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlayerRole {
    type Err = CricketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        // keeper check first: "WK-Batsman" is a keeper who bats
        if normalized.starts_with("wk") || normalized.contains("keeper") {
            Ok(PlayerRole::WicketKeeper)
        } else if normalized.contains("allrounder") {
            Ok(PlayerRole::AllRounder)
        } else if normalized.starts_with("bat") {
            Ok(PlayerRole::Batsman)
        } else if normalized.starts_with("bowl") {
            Ok(PlayerRole::Bowler)
        } else {
            Err(CricketError::InvalidParameter {
                name: "role".to_string(),
                reason: format!("unknown playing role '{}'", s.trim()),
            })
        }
    }
}

impl ToSql for PlayerRole {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for PlayerRole {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: CricketError| FromSqlError::Other(Box::new(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing_variants() {
        assert_eq!("Batsman".parse::<PlayerRole>().unwrap(), PlayerRole::Batsman);
        assert_eq!("batter".parse::<PlayerRole>().unwrap(), PlayerRole::Batsman);
        assert_eq!("Bowler".parse::<PlayerRole>().unwrap(), PlayerRole::Bowler);
        assert_eq!(
            "Batting Allrounder".parse::<PlayerRole>().unwrap(),
            PlayerRole::AllRounder
        );
        assert_eq!(
            "Bowling Allrounder".parse::<PlayerRole>().unwrap(),
            PlayerRole::AllRounder
        );
        assert_eq!("All-rounder".parse::<PlayerRole>().unwrap(), PlayerRole::AllRounder);
        assert_eq!("WK-Batsman".parse::<PlayerRole>().unwrap(), PlayerRole::WicketKeeper);
        assert_eq!(
            "Wicket-keeper".parse::<PlayerRole>().unwrap(),
            PlayerRole::WicketKeeper
        );
    }

    #[test]
    fn test_role_parsing_unknown() {
        assert!("Captain".parse::<PlayerRole>().is_err());
        assert!("".parse::<PlayerRole>().is_err());
    }

    #[test]
    fn test_role_display_round_trips() {
        for role in PlayerRole::ALL {
            assert_eq!(role.to_string().parse::<PlayerRole>().unwrap(), role);
        }
    }
}
