//! Create, read, update and delete operations on the cricket database

use super::models::*;
use super::schema::CricketDatabase;
use crate::cli::types::{MatchId, MatchStatus, PlayerId, SeriesId, TeamId, VenueId};
use crate::cricbuzz::types::MatchOutcome;
use crate::error::{CricketError, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row, ToSql};

const PLAYER_COLUMNS: &str =
    "player_id, name, team_id, country, role, batting_style, bowling_style, date_of_birth";

const MATCH_COLUMNS: &str = "match_id, series_id, team1_id, team2_id, venue_id, status, \
     match_format, start_time, description, winner_id, win_margin, victory_type, \
     toss_winner_id, toss_decision";

fn row_to_team(row: &Row) -> rusqlite::Result<Team> {
    Ok(Team {
        id: row.get(0)?,
        name: row.get(1)?,
        short_name: row.get(2)?,
        country: row.get(3)?,
    })
}

fn row_to_player(row: &Row) -> rusqlite::Result<Player> {
    Ok(Player {
        id: row.get(0)?,
        name: row.get(1)?,
        team_id: row.get(2)?,
        country: row.get(3)?,
        role: row.get(4)?,
        batting_style: row.get(5)?,
        bowling_style: row.get(6)?,
        date_of_birth: row.get(7)?,
    })
}

fn row_to_venue(row: &Row) -> rusqlite::Result<Venue> {
    Ok(Venue {
        id: row.get(0)?,
        name: row.get(1)?,
        city: row.get(2)?,
        country: row.get(3)?,
        capacity: row.get(4)?,
    })
}

fn row_to_series(row: &Row) -> rusqlite::Result<Series> {
    Ok(Series {
        id: row.get(0)?,
        name: row.get(1)?,
        host_country: row.get(2)?,
        match_type: row.get(3)?,
        start_date: row.get(4)?,
        end_date: row.get(5)?,
        total_matches: row.get(6)?,
    })
}

fn row_to_match(row: &Row) -> rusqlite::Result<Match> {
    Ok(Match {
        id: row.get(0)?,
        series_id: row.get(1)?,
        team1_id: row.get(2)?,
        team2_id: row.get(3)?,
        venue_id: row.get(4)?,
        status: row.get(5)?,
        format: row.get(6)?,
        start_time: row.get(7)?,
        description: row.get(8)?,
        winner_id: row.get(9)?,
        win_margin: row.get(10)?,
        victory_type: row.get(11)?,
        toss_winner_id: row.get(12)?,
        toss_decision: row.get(13)?,
    })
}

fn row_to_batting(row: &Row) -> rusqlite::Result<BattingStat> {
    Ok(BattingStat {
        match_id: row.get(0)?,
        player_id: row.get(1)?,
        innings_no: row.get(2)?,
        team_id: row.get(3)?,
        runs: row.get(4)?,
        balls: row.get(5)?,
        fours: row.get(6)?,
        sixes: row.get(7)?,
        strike_rate: row.get(8)?,
        batting_pos: row.get(9)?,
        is_out: row.get(10)?,
    })
}

fn row_to_bowling(row: &Row) -> rusqlite::Result<BowlingStat> {
    Ok(BowlingStat {
        match_id: row.get(0)?,
        player_id: row.get(1)?,
        innings_no: row.get(2)?,
        team_id: row.get(3)?,
        overs: row.get(4)?,
        maidens: row.get(5)?,
        runs: row.get(6)?,
        wickets: row.get(7)?,
        economy: row.get(8)?,
    })
}

fn fetch_player(conn: &Connection, id: PlayerId) -> Result<Option<Player>> {
    Ok(conn
        .query_row(
            &format!("SELECT {PLAYER_COLUMNS} FROM players WHERE player_id = ?1"),
            [id],
            row_to_player,
        )
        .optional()?)
}

fn player_exists(conn: &Connection, id: PlayerId) -> Result<bool> {
    Ok(conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM players WHERE player_id = ?1)",
        [id],
        |r| r.get(0),
    )?)
}

fn team_exists(conn: &Connection, id: TeamId) -> Result<bool> {
    Ok(conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM teams WHERE team_id = ?1)",
        [id],
        |r| r.get(0),
    )?)
}

fn require_team(conn: &Connection, id: TeamId) -> Result<()> {
    if team_exists(conn, id)? {
        Ok(())
    } else {
        Err(CricketError::NotFound {
            entity: TeamId::LABEL,
            id: id.as_i64(),
        })
    }
}

/// Fail with `AlreadyExists` when another player on `team_id` already uses
/// `name`, ignoring case. `except` skips the player being updated.
fn require_unique_name(
    conn: &Connection,
    name: &str,
    team_id: Option<TeamId>,
    except: Option<PlayerId>,
) -> Result<()> {
    let duplicate: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM players
                       WHERE name = ?1 COLLATE NOCASE AND team_id IS ?2
                         AND (?3 IS NULL OR player_id <> ?3))",
        params![name, team_id, except],
        |r| r.get(0),
    )?;
    if duplicate {
        return Err(CricketError::AlreadyExists {
            entity: PlayerId::LABEL,
            key: name.to_string(),
        });
    }
    Ok(())
}

/// Make `%`, `_` and `\` match literally inside a `LIKE ... ESCAPE '\'`.
fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn require_player(conn: &Connection, id: PlayerId) -> Result<()> {
    if player_exists(conn, id)? {
        Ok(())
    } else {
        Err(CricketError::NotFound {
            entity: PlayerId::LABEL,
            id: id.as_i64(),
        })
    }
}

fn match_status(conn: &Connection, id: MatchId) -> Result<Option<MatchStatus>> {
    Ok(conn
        .query_row(
            "SELECT status FROM matches WHERE match_id = ?1",
            [id],
            |r| r.get(0),
        )
        .optional()?)
}

fn require_match(conn: &Connection, id: MatchId) -> Result<MatchStatus> {
    match_status(conn, id)?.ok_or(CricketError::NotFound {
        entity: MatchId::LABEL,
        id: id.as_i64(),
    })
}

/// Stat rows for a completed match are append-only: a new row may be added,
/// an existing one may not change.
fn check_stat_writable(
    conn: &Connection,
    match_id: MatchId,
    exists_sql: &str,
    key: &[&dyn ToSql],
) -> Result<()> {
    let status = require_match(conn, match_id)?;
    if status == MatchStatus::Completed {
        let exists: bool = conn.query_row(exists_sql, key, |r| r.get(0))?;
        if exists {
            return Err(CricketError::RecordLocked {
                match_id: match_id.as_i64(),
            });
        }
    }
    Ok(())
}

fn count_player_dependents(conn: &Connection, id: PlayerId) -> Result<usize> {
    let count: i64 = conn.query_row(
        "SELECT (SELECT COUNT(*) FROM batting_stats WHERE player_id = ?1)
              + (SELECT COUNT(*) FROM bowling_stats WHERE player_id = ?1)
              + (SELECT COUNT(*) FROM fielding_stats WHERE player_id = ?1)
              + (SELECT COUNT(*) FROM partnerships WHERE player1_id = ?1 OR player2_id = ?1)",
        [id],
        |r| r.get(0),
    )?;
    Ok(count as usize)
}

fn count_team_dependents(conn: &Connection, id: TeamId) -> Result<usize> {
    let count: i64 = conn.query_row(
        "SELECT (SELECT COUNT(*) FROM players WHERE team_id = ?1)
              + (SELECT COUNT(*) FROM matches
                 WHERE team1_id = ?1 OR team2_id = ?1 OR winner_id = ?1 OR toss_winner_id = ?1)",
        [id],
        |r| r.get(0),
    )?;
    Ok(count as usize)
}

impl CricketDatabase {
    // ---------------------------------------------------------------------
    // Teams
    // ---------------------------------------------------------------------

    /// Insert a team; the id must be new.
    pub fn create_team(&self, team: &Team) -> Result<Team> {
        let name = team.name.trim();
        if name.is_empty() {
            return Err(CricketError::InvalidParameter {
                name: "name".to_string(),
                reason: "must not be blank".to_string(),
            });
        }
        self.transaction(|tx| {
            if team_exists(tx, team.id)? {
                return Err(CricketError::AlreadyExists {
                    entity: TeamId::LABEL,
                    key: team.id.to_string(),
                });
            }
            tx.execute(
                "INSERT INTO teams (team_id, name, short_name, country) VALUES (?1, ?2, ?3, ?4)",
                params![team.id, name, team.short_name, team.country],
            )?;
            Ok(Team {
                name: name.to_string(),
                ..team.clone()
            })
        })
    }

    /// Insert or refresh a team. Optional fields already stored are kept when
    /// the incoming value is missing.
    pub fn upsert_team(&self, team: &Team) -> Result<()> {
        self.execute(
            "INSERT INTO teams (team_id, name, short_name, country) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(team_id) DO UPDATE SET
                name = excluded.name,
                short_name = COALESCE(excluded.short_name, teams.short_name),
                country = COALESCE(excluded.country, teams.country)",
            params![team.id, team.name, team.short_name, team.country],
        )?;
        Ok(())
    }

    pub fn get_team(&self, id: TeamId) -> Result<Team> {
        self.acquire()?
            .query_row(
                "SELECT team_id, name, short_name, country FROM teams WHERE team_id = ?1",
                [id],
                row_to_team,
            )
            .optional()?
            .ok_or(CricketError::NotFound {
                entity: TeamId::LABEL,
                id: id.as_i64(),
            })
    }

    pub fn list_teams(&self) -> Result<Vec<Team>> {
        let conn = self.acquire()?;
        let mut stmt =
            conn.prepare("SELECT team_id, name, short_name, country FROM teams ORDER BY name")?;
        let teams = stmt
            .query_map([], row_to_team)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(teams)
    }

    /// Delete a team nothing refers to.
    pub fn delete_team(&self, id: TeamId) -> Result<()> {
        self.transaction(|tx| {
            require_team(tx, id)?;
            let dependents = count_team_dependents(tx, id)?;
            if dependents > 0 {
                return Err(CricketError::ForeignKeyViolation {
                    entity: TeamId::LABEL,
                    id: id.as_i64(),
                    dependents,
                });
            }
            tx.execute("DELETE FROM teams WHERE team_id = ?1", [id])?;
            Ok(())
        })
    }

    // ---------------------------------------------------------------------
    // Players
    // ---------------------------------------------------------------------

    pub fn get_player(&self, id: PlayerId) -> Result<Player> {
        let conn = self.acquire()?;
        fetch_player(&conn, id)?.ok_or(CricketError::NotFound {
            entity: PlayerId::LABEL,
            id: id.as_i64(),
        })
    }

    /// Create a player from user input.
    ///
    /// The name must be non-blank and a role given. A player with the same
    /// name (case-insensitive) on the same team is a duplicate.
    pub fn create_player(&self, new: &NewPlayer) -> Result<Player> {
        let new = new.normalized()?;
        self.transaction(|tx| {
            if let Some(team_id) = new.team_id {
                require_team(tx, team_id)?;
            }

            require_unique_name(tx, &new.name, new.team_id, None)?;

            tx.execute(
                "INSERT INTO players
                 (name, team_id, country, role, batting_style, bowling_style, date_of_birth, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    new.name,
                    new.team_id,
                    new.country,
                    new.role,
                    new.batting_style,
                    new.bowling_style,
                    new.date_of_birth,
                    Utc::now().timestamp()
                ],
            )?;
            let id = PlayerId::new(tx.last_insert_rowid());
            tracing::info!(player_id = %id, name = %new.name, "created player");
            Ok(new.clone().into_player(id))
        })
    }

    /// Apply a partial update and return the stored result.
    pub fn update_player(&self, id: PlayerId, update: &PlayerUpdate) -> Result<Player> {
        self.transaction(|tx| {
            let mut player = fetch_player(tx, id)?.ok_or(CricketError::NotFound {
                entity: PlayerId::LABEL,
                id: id.as_i64(),
            })?;
            if let Some(Some(team_id)) = update.team_id {
                require_team(tx, team_id)?;
            }
            update.apply(&mut player)?;
            require_unique_name(tx, &player.name, player.team_id, Some(id))?;

            tx.execute(
                "UPDATE players SET name = ?2, team_id = ?3, country = ?4, role = ?5,
                        batting_style = ?6, bowling_style = ?7, date_of_birth = ?8
                 WHERE player_id = ?1",
                params![
                    id,
                    player.name,
                    player.team_id,
                    player.country,
                    player.role,
                    player.batting_style,
                    player.bowling_style,
                    player.date_of_birth
                ],
            )?;
            Ok(player)
        })
    }

    /// Delete a player. With `Restrict`, fails while any statistics row
    /// refers to the player; with `Cascade`, removes those rows first.
    pub fn delete_player(&self, id: PlayerId, mode: DeleteMode) -> Result<()> {
        self.transaction(|tx| {
            require_player(tx, id)?;
            let dependents = count_player_dependents(tx, id)?;
            if dependents > 0 {
                match mode {
                    DeleteMode::Restrict => {
                        return Err(CricketError::ForeignKeyViolation {
                            entity: PlayerId::LABEL,
                            id: id.as_i64(),
                            dependents,
                        })
                    }
                    DeleteMode::Cascade => {
                        tx.execute("DELETE FROM batting_stats WHERE player_id = ?1", [id])?;
                        tx.execute("DELETE FROM bowling_stats WHERE player_id = ?1", [id])?;
                        tx.execute("DELETE FROM fielding_stats WHERE player_id = ?1", [id])?;
                        tx.execute(
                            "DELETE FROM partnerships WHERE player1_id = ?1 OR player2_id = ?1",
                            [id],
                        )?;
                        tracing::info!(player_id = %id, dependents, "removed player statistics");
                    }
                }
            }
            tx.execute("DELETE FROM players WHERE player_id = ?1", [id])?;
            Ok(())
        })
    }

    pub fn list_players(&self, filter: &PlayerFilter) -> Result<Vec<Player>> {
        let conn = self.acquire()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {PLAYER_COLUMNS} FROM players
             WHERE (?1 IS NULL OR name LIKE '%' || ?1 || '%' ESCAPE '\\')
               AND (?2 IS NULL OR team_id = ?2)
               AND (?3 IS NULL OR role = ?3)
             ORDER BY player_id"
        ))?;
        let players = stmt
            .query_map(
                params![
                    filter.name_contains.as_deref().map(escape_like),
                    filter.team_id,
                    filter.role
                ],
                row_to_player,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(players)
    }

    /// Insert or refresh a player from API data, keeping stored optional
    /// fields the API did not send.
    pub fn upsert_player(&self, player: &Player) -> Result<()> {
        let conn = self.acquire()?;
        if let Some(team_id) = player.team_id {
            require_team(&conn, team_id)?;
        }
        conn.execute(
            "INSERT INTO players
             (player_id, name, team_id, country, role, batting_style, bowling_style, date_of_birth, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(player_id) DO UPDATE SET
                name = excluded.name,
                team_id = COALESCE(excluded.team_id, players.team_id),
                country = COALESCE(excluded.country, players.country),
                role = COALESCE(excluded.role, players.role),
                batting_style = COALESCE(excluded.batting_style, players.batting_style),
                bowling_style = COALESCE(excluded.bowling_style, players.bowling_style),
                date_of_birth = COALESCE(excluded.date_of_birth, players.date_of_birth)",
            params![
                player.id,
                player.name,
                player.team_id,
                player.country,
                player.role,
                player.batting_style,
                player.bowling_style,
                player.date_of_birth,
                Utc::now().timestamp()
            ],
        )?;
        Ok(())
    }

    /// Insert a minimal player row if the id is unknown. Existing rows are
    /// left untouched. Returns whether a row was added.
    pub fn ensure_player(
        &self,
        id: PlayerId,
        name: &str,
        team_id: Option<TeamId>,
    ) -> Result<bool> {
        let conn = self.acquire()?;
        let team_id = match team_id {
            Some(team) if team_exists(&conn, team)? => Some(team),
            _ => None,
        };
        let added = conn.execute(
            "INSERT INTO players (player_id, name, team_id, created_at) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(player_id) DO NOTHING",
            params![id, name, team_id, Utc::now().timestamp()],
        )?;
        Ok(added > 0)
    }

    // ---------------------------------------------------------------------
    // Venues and series
    // ---------------------------------------------------------------------

    /// Find a venue by name, city and country, creating it if absent. A
    /// capacity is recorded when the stored one is missing.
    pub fn get_or_create_venue(
        &self,
        name: &str,
        city: Option<&str>,
        country: Option<&str>,
        capacity: Option<i64>,
    ) -> Result<VenueId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CricketError::InvalidParameter {
                name: "venue".to_string(),
                reason: "name must not be blank".to_string(),
            });
        }
        self.transaction(|tx| {
            let existing: Option<VenueId> = tx
                .query_row(
                    "SELECT venue_id FROM venues
                     WHERE name = ?1
                       AND COALESCE(city, '') = COALESCE(?2, '')
                       AND COALESCE(country, '') = COALESCE(?3, '')",
                    params![name, city, country],
                    |r| r.get(0),
                )
                .optional()?;

            match existing {
                Some(id) => {
                    if capacity.is_some() {
                        tx.execute(
                            "UPDATE venues SET capacity = COALESCE(capacity, ?2) WHERE venue_id = ?1",
                            params![id, capacity],
                        )?;
                    }
                    Ok(id)
                }
                None => {
                    tx.execute(
                        "INSERT INTO venues (name, city, country, capacity) VALUES (?1, ?2, ?3, ?4)",
                        params![name, city, country, capacity],
                    )?;
                    Ok(VenueId::new(tx.last_insert_rowid()))
                }
            }
        })
    }

    pub fn get_venue(&self, id: VenueId) -> Result<Venue> {
        self.acquire()?
            .query_row(
                "SELECT venue_id, name, city, country, capacity FROM venues WHERE venue_id = ?1",
                [id],
                row_to_venue,
            )
            .optional()?
            .ok_or(CricketError::NotFound {
                entity: VenueId::LABEL,
                id: id.as_i64(),
            })
    }

    pub fn list_venues(&self) -> Result<Vec<Venue>> {
        let conn = self.acquire()?;
        let mut stmt = conn.prepare(
            "SELECT venue_id, name, city, country, capacity FROM venues ORDER BY name, venue_id",
        )?;
        let venues = stmt
            .query_map([], row_to_venue)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(venues)
    }

    pub fn upsert_series(&self, series: &Series) -> Result<()> {
        self.execute(
            "INSERT INTO series
             (series_id, name, host_country, match_type, start_date, end_date, total_matches)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(series_id) DO UPDATE SET
                name = excluded.name,
                host_country = COALESCE(excluded.host_country, series.host_country),
                match_type = COALESCE(excluded.match_type, series.match_type),
                start_date = COALESCE(excluded.start_date, series.start_date),
                end_date = COALESCE(excluded.end_date, series.end_date),
                total_matches = COALESCE(excluded.total_matches, series.total_matches)",
            params![
                series.id,
                series.name,
                series.host_country,
                series.match_type,
                series.start_date,
                series.end_date,
                series.total_matches
            ],
        )?;
        Ok(())
    }

    pub fn get_series(&self, id: SeriesId) -> Result<Series> {
        self.acquire()?
            .query_row(
                "SELECT series_id, name, host_country, match_type, start_date, end_date, total_matches
                 FROM series WHERE series_id = ?1",
                [id],
                row_to_series,
            )
            .optional()?
            .ok_or(CricketError::NotFound {
                entity: SeriesId::LABEL,
                id: id.as_i64(),
            })
    }

    // ---------------------------------------------------------------------
    // Matches
    // ---------------------------------------------------------------------

    /// Insert or refresh a match. Status never moves backwards: if the stored
    /// status is further along, it is kept. Returns the status now stored.
    pub fn upsert_match(&self, m: &Match) -> Result<MatchStatus> {
        self.transaction(|tx| {
            require_team(tx, m.team1_id)?;
            require_team(tx, m.team2_id)?;
            let status = match match_status(tx, m.id)? {
                Some(stored) => stored.max(m.status),
                None => m.status,
            };

            tx.execute(
                "INSERT INTO matches
                 (match_id, series_id, team1_id, team2_id, venue_id, status, match_format,
                  match_date, start_time, description, winner_id, win_margin, victory_type,
                  toss_winner_id, toss_decision)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
                 ON CONFLICT(match_id) DO UPDATE SET
                    series_id = COALESCE(excluded.series_id, matches.series_id),
                    team1_id = excluded.team1_id,
                    team2_id = excluded.team2_id,
                    venue_id = COALESCE(excluded.venue_id, matches.venue_id),
                    status = excluded.status,
                    match_format = COALESCE(excluded.match_format, matches.match_format),
                    match_date = COALESCE(excluded.match_date, matches.match_date),
                    start_time = COALESCE(excluded.start_time, matches.start_time),
                    description = COALESCE(excluded.description, matches.description),
                    winner_id = COALESCE(excluded.winner_id, matches.winner_id),
                    win_margin = COALESCE(excluded.win_margin, matches.win_margin),
                    victory_type = COALESCE(excluded.victory_type, matches.victory_type),
                    toss_winner_id = COALESCE(excluded.toss_winner_id, matches.toss_winner_id),
                    toss_decision = COALESCE(excluded.toss_decision, matches.toss_decision)",
                params![
                    m.id,
                    m.series_id,
                    m.team1_id,
                    m.team2_id,
                    m.venue_id,
                    status,
                    m.format,
                    m.start_time.map(|t| t.date_naive()),
                    m.start_time,
                    m.description,
                    m.winner_id,
                    m.win_margin,
                    m.victory_type,
                    m.toss_winner_id,
                    m.toss_decision
                ],
            )?;
            Ok(status)
        })
    }

    pub fn get_match(&self, id: MatchId) -> Result<Match> {
        self.acquire()?
            .query_row(
                &format!("SELECT {MATCH_COLUMNS} FROM matches WHERE match_id = ?1"),
                [id],
                row_to_match,
            )
            .optional()?
            .ok_or(CricketError::NotFound {
                entity: MatchId::LABEL,
                id: id.as_i64(),
            })
    }

    /// Matches, newest first, optionally restricted to one status.
    pub fn list_matches(&self, status: Option<MatchStatus>) -> Result<Vec<Match>> {
        let conn = self.acquire()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {MATCH_COLUMNS} FROM matches
             WHERE (?1 IS NULL OR status = ?1)
             ORDER BY start_time DESC, match_id DESC"
        ))?;
        let matches = stmt
            .query_map([status], row_to_match)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(matches)
    }

    /// Move a match forward in its lifecycle.
    pub fn update_match_status(&self, id: MatchId, next: MatchStatus) -> Result<()> {
        self.transaction(|tx| {
            let current = require_match(tx, id)?;
            if !current.can_transition_to(next) {
                return Err(CricketError::InvalidTransition {
                    match_id: id.as_i64(),
                    from: current.to_string(),
                    to: next.to_string(),
                });
            }
            tx.execute(
                "UPDATE matches SET status = ?2 WHERE match_id = ?1",
                params![id, next],
            )?;
            Ok(())
        })
    }

    /// Merge match-centre results into a stored match. Status only moves
    /// forward; result fields already stored are kept when the update lacks
    /// them. Returns the status now stored.
    pub fn apply_match_outcome(&self, id: MatchId, outcome: &MatchOutcome) -> Result<MatchStatus> {
        self.transaction(|tx| {
            let status = require_match(tx, id)?.max(outcome.status);
            let known_team = |team: Option<TeamId>| -> Result<Option<TeamId>> {
                match team {
                    Some(t) if team_exists(tx, t)? => Ok(Some(t)),
                    _ => Ok(None),
                }
            };
            let winner_id = known_team(outcome.winner_id)?;
            let toss_winner_id = known_team(outcome.toss_winner_id)?;
            tx.execute(
                "UPDATE matches SET
                    status = ?2,
                    winner_id = COALESCE(?3, winner_id),
                    win_margin = COALESCE(?4, win_margin),
                    victory_type = COALESCE(?5, victory_type),
                    toss_winner_id = COALESCE(?6, toss_winner_id),
                    toss_decision = COALESCE(?7, toss_decision)
                 WHERE match_id = ?1",
                params![
                    id,
                    status,
                    winner_id,
                    outcome.win_margin,
                    outcome.victory_type,
                    toss_winner_id,
                    outcome.toss_decision
                ],
            )?;
            Ok(status)
        })
    }

    // ---------------------------------------------------------------------
    // Statistics
    // ---------------------------------------------------------------------

    pub fn record_batting(&self, stat: &BattingStat) -> Result<()> {
        self.transaction(|tx| {
            require_player(tx, stat.player_id)?;
            check_stat_writable(
                tx,
                stat.match_id,
                "SELECT EXISTS(SELECT 1 FROM batting_stats
                               WHERE match_id = ?1 AND player_id = ?2 AND innings_no = ?3)",
                params![stat.match_id, stat.player_id, stat.innings_no],
            )?;
            tx.execute(
                "INSERT INTO batting_stats
                 (match_id, player_id, innings_no, team_id, runs, balls, fours, sixes,
                  strike_rate, batting_pos, is_out)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                 ON CONFLICT(match_id, player_id, innings_no) DO UPDATE SET
                    team_id = excluded.team_id,
                    runs = excluded.runs,
                    balls = excluded.balls,
                    fours = excluded.fours,
                    sixes = excluded.sixes,
                    strike_rate = excluded.strike_rate,
                    batting_pos = excluded.batting_pos,
                    is_out = excluded.is_out",
                params![
                    stat.match_id,
                    stat.player_id,
                    stat.innings_no,
                    stat.team_id,
                    stat.runs,
                    stat.balls,
                    stat.fours,
                    stat.sixes,
                    stat.strike_rate,
                    stat.batting_pos,
                    stat.is_out
                ],
            )?;
            Ok(())
        })
    }

    pub fn record_bowling(&self, stat: &BowlingStat) -> Result<()> {
        self.transaction(|tx| {
            require_player(tx, stat.player_id)?;
            check_stat_writable(
                tx,
                stat.match_id,
                "SELECT EXISTS(SELECT 1 FROM bowling_stats
                               WHERE match_id = ?1 AND player_id = ?2 AND innings_no = ?3)",
                params![stat.match_id, stat.player_id, stat.innings_no],
            )?;
            tx.execute(
                "INSERT INTO bowling_stats
                 (match_id, player_id, innings_no, team_id, overs, maidens, runs, wickets, economy)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                 ON CONFLICT(match_id, player_id, innings_no) DO UPDATE SET
                    team_id = excluded.team_id,
                    overs = excluded.overs,
                    maidens = excluded.maidens,
                    runs = excluded.runs,
                    wickets = excluded.wickets,
                    economy = excluded.economy",
                params![
                    stat.match_id,
                    stat.player_id,
                    stat.innings_no,
                    stat.team_id,
                    stat.overs,
                    stat.maidens,
                    stat.runs,
                    stat.wickets,
                    stat.economy
                ],
            )?;
            Ok(())
        })
    }

    pub fn record_fielding(&self, stat: &FieldingStat) -> Result<()> {
        self.transaction(|tx| {
            require_player(tx, stat.player_id)?;
            check_stat_writable(
                tx,
                stat.match_id,
                "SELECT EXISTS(SELECT 1 FROM fielding_stats WHERE match_id = ?1 AND player_id = ?2)",
                params![stat.match_id, stat.player_id],
            )?;
            tx.execute(
                "INSERT INTO fielding_stats (match_id, player_id, catches, stumpings)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(match_id, player_id) DO UPDATE SET
                    catches = excluded.catches,
                    stumpings = excluded.stumpings",
                params![stat.match_id, stat.player_id, stat.catches, stat.stumpings],
            )?;
            Ok(())
        })
    }

    pub fn record_partnership(&self, p: &Partnership) -> Result<()> {
        self.transaction(|tx| {
            require_player(tx, p.player1_id)?;
            require_player(tx, p.player2_id)?;
            check_stat_writable(
                tx,
                p.match_id,
                "SELECT EXISTS(SELECT 1 FROM partnerships
                               WHERE match_id = ?1 AND innings_no = ?2
                                 AND player1_id = ?3 AND player2_id = ?4)",
                params![p.match_id, p.innings_no, p.player1_id, p.player2_id],
            )?;
            tx.execute(
                "INSERT INTO partnerships
                 (match_id, innings_no, player1_id, player2_id, runs, balls, pair_pos_diff)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(match_id, innings_no, player1_id, player2_id) DO UPDATE SET
                    runs = excluded.runs,
                    balls = excluded.balls,
                    pair_pos_diff = excluded.pair_pos_diff",
                params![
                    p.match_id,
                    p.innings_no,
                    p.player1_id,
                    p.player2_id,
                    p.runs,
                    p.balls,
                    p.pair_pos_diff
                ],
            )?;
            Ok(())
        })
    }

    pub fn batting_for_match(&self, match_id: MatchId) -> Result<Vec<BattingStat>> {
        let conn = self.acquire()?;
        let mut stmt = conn.prepare(
            "SELECT match_id, player_id, innings_no, team_id, runs, balls, fours, sixes,
                    strike_rate, batting_pos, is_out
             FROM batting_stats WHERE match_id = ?1
             ORDER BY innings_no, batting_pos, player_id",
        )?;
        let rows = stmt
            .query_map([match_id], row_to_batting)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn bowling_for_match(&self, match_id: MatchId) -> Result<Vec<BowlingStat>> {
        let conn = self.acquire()?;
        let mut stmt = conn.prepare(
            "SELECT match_id, player_id, innings_no, team_id, overs, maidens, runs, wickets, economy
             FROM bowling_stats WHERE match_id = ?1
             ORDER BY innings_no, id",
        )?;
        let rows = stmt
            .query_map([match_id], row_to_bowling)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    // ---------------------------------------------------------------------
    // Sync bookkeeping
    // ---------------------------------------------------------------------

    pub fn get_state(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .acquire()?
            .query_row("SELECT v FROM etl_state WHERE k = ?1", [key], |r| r.get(0))
            .optional()?)
    }

    pub fn set_state(&self, key: &str, value: &str) -> Result<()> {
        self.execute(
            "INSERT INTO etl_state (k, v) VALUES (?1, ?2)
             ON CONFLICT(k) DO UPDATE SET v = excluded.v",
            params![key, value],
        )?;
        Ok(())
    }
}
