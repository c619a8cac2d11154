//! Named, parameterized analytical queries.
//!
//! Every entry declares its parameters up front. `run` checks the supplied
//! values against those declarations before a connection is taken from the
//! pool, so a bad request never reaches SQLite. Parameters bind positionally:
//! the n-th declared parameter is `?n` in the SQL.

use super::models::TabularResult;
use super::schema::CricketDatabase;
use crate::error::{CricketError, Result};
use chrono::NaiveDate;
use rusqlite::types::{ToSql, ToSqlOutput};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParamKind {
    Integer,
    Real,
    Text,
    Date,
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ParamKind::Integer => "integer",
            ParamKind::Real => "real",
            ParamKind::Text => "text",
            ParamKind::Date => "date",
        })
    }
}

/// A supplied parameter value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Integer(i64),
    Real(f64),
    Text(String),
    Date(NaiveDate),
}

impl ParamValue {
    fn kind(&self) -> ParamKind {
        match self {
            ParamValue::Integer(_) => ParamKind::Integer,
            ParamValue::Real(_) => ParamKind::Real,
            ParamValue::Text(_) => ParamKind::Text,
            ParamValue::Date(_) => ParamKind::Date,
        }
    }
}

impl ToSql for ParamValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            ParamValue::Integer(i) => i.to_sql(),
            ParamValue::Real(r) => r.to_sql(),
            ParamValue::Text(t) => t.to_sql(),
            ParamValue::Date(d) => d.to_sql(),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Integer(i) => write!(f, "{i}"),
            ParamValue::Real(r) => write!(f, "{r}"),
            ParamValue::Text(t) => f.write_str(t),
            ParamValue::Date(d) => write!(f, "{d}"),
        }
    }
}

/// Compile-time default for a parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefaultValue {
    Integer(i64),
    Real(f64),
    Text(&'static str),
    Date { year: i32, month: u32, day: u32 },
}

impl DefaultValue {
    fn to_value(self) -> Option<ParamValue> {
        match self {
            DefaultValue::Integer(i) => Some(ParamValue::Integer(i)),
            DefaultValue::Real(r) => Some(ParamValue::Real(r)),
            DefaultValue::Text(t) => Some(ParamValue::Text(t.to_string())),
            DefaultValue::Date { year, month, day } => {
                NaiveDate::from_ymd_opt(year, month, day).map(ParamValue::Date)
            }
        }
    }
}

impl fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Integer(i) => write!(f, "{i}"),
            DefaultValue::Real(r) => write!(f, "{r}"),
            DefaultValue::Text(t) => f.write_str(t),
            DefaultValue::Date { year, month, day } => {
                write!(f, "{year:04}-{month:02}-{day:02}")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub default: Option<DefaultValue>,
    /// Smallest accepted integer value.
    pub min: Option<i64>,
    pub description: &'static str,
}

impl ParamSpec {
    /// Parse CLI text into this parameter's type.
    pub fn parse(&self, raw: &str) -> Result<ParamValue> {
        let raw = raw.trim();
        let invalid = |reason: String| CricketError::InvalidParameter {
            name: self.name.to_string(),
            reason,
        };
        match self.kind {
            ParamKind::Integer => raw
                .parse()
                .map(ParamValue::Integer)
                .map_err(|_| invalid(format!("expected an integer, got '{raw}'"))),
            ParamKind::Real => raw
                .parse()
                .map(ParamValue::Real)
                .map_err(|_| invalid(format!("expected a number, got '{raw}'"))),
            ParamKind::Date => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map(ParamValue::Date)
                .map_err(|_| invalid(format!("expected a YYYY-MM-DD date, got '{raw}'"))),
            ParamKind::Text if raw.is_empty() => Err(invalid("must not be empty".to_string())),
            ParamKind::Text => Ok(ParamValue::Text(raw.to_string())),
        }
    }

    /// Integers widen to reals; no other conversion is made.
    fn check(&self, value: &ParamValue) -> Result<ParamValue> {
        if let (ParamValue::Integer(i), Some(min)) = (value, self.min) {
            if *i < min {
                return Err(CricketError::InvalidParameter {
                    name: self.name.to_string(),
                    reason: format!("must be at least {min}, got {i}"),
                });
            }
        }
        match (self.kind, value) {
            (ParamKind::Real, ParamValue::Integer(i)) => Ok(ParamValue::Real(*i as f64)),
            (kind, value) if kind == value.kind() => Ok(value.clone()),
            (kind, value) => Err(CricketError::InvalidParameter {
                name: self.name.to_string(),
                reason: format!("expected {kind}, got {} '{value}'", value.kind()),
            }),
        }
    }
}

/// Supplied parameters by name.
pub type QueryParams = BTreeMap<String, ParamValue>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryDef {
    pub id: &'static str,
    pub description: &'static str,
    pub sql: &'static str,
    pub params: &'static [ParamSpec],
}

impl QueryDef {
    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Parse one `name=value` pair from the command line.
    pub fn parse_param(&self, name: &str, raw: &str) -> Result<(String, ParamValue)> {
        let spec = self.param(name).ok_or_else(|| self.unknown_param(name))?;
        Ok((spec.name.to_string(), spec.parse(raw)?))
    }

    fn unknown_param(&self, name: &str) -> CricketError {
        let known: Vec<&str> = self.params.iter().map(|p| p.name).collect();
        CricketError::InvalidParameter {
            name: name.to_string(),
            reason: if known.is_empty() {
                format!("query '{}' takes no parameters", self.id)
            } else {
                format!("not a parameter of '{}' (expected one of: {})", self.id, known.join(", "))
            },
        }
    }

    /// Resolve supplied values and defaults into positional bind values.
    pub fn bind(&self, supplied: &QueryParams) -> Result<Vec<ParamValue>> {
        if let Some(name) = supplied.keys().find(|name| self.param(name).is_none()) {
            return Err(self.unknown_param(name));
        }

        self.params
            .iter()
            .map(|spec| match supplied.get(spec.name) {
                Some(value) => spec.check(value),
                None => spec.default.and_then(DefaultValue::to_value).ok_or_else(|| {
                    CricketError::InvalidParameter {
                        name: spec.name.to_string(),
                        reason: "is required".to_string(),
                    }
                }),
            })
            .collect()
    }
}

/// All queries, in display order.
pub fn list_queries() -> &'static [QueryDef] {
    CATALOG
}

pub fn find_query(id: &str) -> Result<&'static QueryDef> {
    CATALOG
        .iter()
        .find(|q| q.id == id)
        .ok_or_else(|| CricketError::UnknownQuery { id: id.to_string() })
}

/// Validate `params` against query `id`, then execute it.
pub fn run(
    db: &CricketDatabase,
    id: &str,
    params: &QueryParams,
    row_limit: Option<usize>,
) -> Result<TabularResult> {
    let query = find_query(id)?;
    let values = query.bind(params)?;
    let refs: Vec<&dyn ToSql> = values.iter().map(|v| v as &dyn ToSql).collect();

    tracing::debug!(query = query.id, params = values.len(), "running catalog query");
    db.query(query.sql, &refs, row_limit)
}

/// A non-negative threshold.
const fn int(name: &'static str, default: i64, description: &'static str) -> ParamSpec {
    ParamSpec {
        name,
        kind: ParamKind::Integer,
        default: Some(DefaultValue::Integer(default)),
        min: Some(0),
        description,
    }
}

/// A row count or look-back window; zero or less is never meaningful.
const fn count(name: &'static str, default: i64, description: &'static str) -> ParamSpec {
    ParamSpec {
        min: Some(1),
        ..int(name, default, description)
    }
}

const fn real(name: &'static str, default: f64, description: &'static str) -> ParamSpec {
    ParamSpec {
        name,
        kind: ParamKind::Real,
        default: Some(DefaultValue::Real(default)),
        min: None,
        description,
    }
}

const fn text(name: &'static str, default: &'static str, description: &'static str) -> ParamSpec {
    ParamSpec {
        name,
        kind: ParamKind::Text,
        default: Some(DefaultValue::Text(default)),
        min: None,
        description,
    }
}

const fn date(
    name: &'static str,
    (year, month, day): (i32, u32, u32),
    description: &'static str,
) -> ParamSpec {
    ParamSpec {
        name,
        kind: ParamKind::Date,
        default: Some(DefaultValue::Date { year, month, day }),
        min: None,
        description,
    }
}

static CATALOG: &[QueryDef] = &[
    QueryDef {
        id: "players_by_country",
        description: "Players who represent a country, with their playing style",
        sql: "SELECT p.player_id, p.name AS full_name, p.role AS playing_role,
                     p.batting_style, p.bowling_style
              FROM players p
              JOIN teams t ON t.team_id = p.team_id
              WHERE COALESCE(p.country, t.country, t.name) = ?1
              ORDER BY p.name",
        params: &[text("country", "India", "Country name")],
    },
    QueryDef {
        id: "recent_matches",
        description: "Matches played in the last N days, most recent first",
        sql: "SELECT m.match_id, m.description AS match_description,
                     t1.name AS team1, t2.name AS team2,
                     v.name AS venue_name, v.city AS venue_city, m.match_date
              FROM matches m
              JOIN teams t1 ON t1.team_id = m.team1_id
              JOIN teams t2 ON t2.team_id = m.team2_id
              LEFT JOIN venues v ON v.venue_id = m.venue_id
              WHERE m.match_date >= date('now', printf('-%d days', ?1))
              ORDER BY m.match_date DESC, m.match_id DESC",
        params: &[count("days", 30, "Look-back window in days")],
    },
    QueryDef {
        id: "top_run_scorers",
        description: "Highest run scorers in a format, with average and hundreds",
        sql: "SELECT p.player_id, p.name, SUM(b.runs) AS total_runs,
                     CASE WHEN SUM(b.is_out = 1) > 0
                          THEN ROUND(CAST(SUM(b.runs) AS REAL) / SUM(b.is_out = 1), 2)
                     END AS batting_average,
                     SUM(b.runs >= 100) AS centuries
              FROM batting_stats b
              JOIN players p ON p.player_id = b.player_id
              JOIN matches m ON m.match_id = b.match_id
              WHERE UPPER(m.match_format) = UPPER(?1)
              GROUP BY p.player_id, p.name
              ORDER BY total_runs DESC, p.player_id
              LIMIT ?2",
        params: &[
            text("format", "ODI", "Match format (Test, ODI, T20)"),
            count("limit", 10, "Number of players"),
        ],
    },
    QueryDef {
        id: "big_venues",
        description: "Venues with at least the given seating capacity",
        sql: "SELECT venue_id, name AS venue_name, city, country, capacity
              FROM venues
              WHERE capacity >= ?1
              ORDER BY capacity DESC, venue_id",
        params: &[int("min_capacity", 50000, "Minimum capacity")],
    },
    QueryDef {
        id: "team_wins",
        description: "Total wins per team",
        sql: "SELECT t.team_id, t.name AS team_name, COUNT(*) AS total_wins
              FROM matches m
              JOIN teams t ON t.team_id = m.winner_id
              GROUP BY t.team_id, t.name
              ORDER BY total_wins DESC, t.name",
        params: &[],
    },
    QueryDef {
        id: "players_by_role",
        description: "Number of players in each playing role",
        sql: "SELECT COALESCE(role, 'Unknown') AS role, COUNT(*) AS player_count
              FROM players
              GROUP BY COALESCE(role, 'Unknown')
              ORDER BY player_count DESC, role",
        params: &[],
    },
    QueryDef {
        id: "highest_score_by_format",
        description: "Highest individual innings score in each format",
        sql: "SELECT m.match_format, MAX(b.runs) AS highest_score
              FROM batting_stats b
              JOIN matches m ON m.match_id = b.match_id
              WHERE m.match_format IS NOT NULL
              GROUP BY m.match_format
              ORDER BY highest_score DESC",
        params: &[],
    },
    QueryDef {
        id: "series_in_year",
        description: "Series that started in a given year",
        sql: "SELECT series_id, name AS series_name, host_country, match_type,
                     start_date, total_matches
              FROM series
              WHERE CAST(strftime('%Y', start_date) AS INTEGER) = ?1
              ORDER BY start_date, series_id",
        params: &[int("year", 2024, "Calendar year")],
    },
    QueryDef {
        id: "all_rounders",
        description: "Players past both a runs and a wickets threshold",
        sql: "SELECT p.player_id, p.name,
                     COALESCE(bat.total_runs, 0) AS total_runs,
                     COALESCE(bowl.total_wickets, 0) AS total_wickets
              FROM players p
              LEFT JOIN (SELECT player_id, SUM(runs) AS total_runs
                         FROM batting_stats GROUP BY player_id) bat
                     ON bat.player_id = p.player_id
              LEFT JOIN (SELECT player_id, SUM(wickets) AS total_wickets
                         FROM bowling_stats GROUP BY player_id) bowl
                     ON bowl.player_id = p.player_id
              WHERE COALESCE(bat.total_runs, 0) > ?1
                AND COALESCE(bowl.total_wickets, 0) > ?2
              ORDER BY total_runs DESC, total_wickets DESC",
        params: &[
            int("min_runs", 1000, "Runs strictly above"),
            int("min_wickets", 50, "Wickets strictly above"),
        ],
    },
    QueryDef {
        id: "last_completed_matches",
        description: "Most recent completed matches with winner and margin",
        sql: "SELECT m.match_id, m.description AS match_description,
                     t1.name AS team1, t2.name AS team2, w.name AS winning_team,
                     m.win_margin, m.victory_type, v.name AS venue_name, m.match_date
              FROM matches m
              JOIN teams t1 ON t1.team_id = m.team1_id
              JOIN teams t2 ON t2.team_id = m.team2_id
              LEFT JOIN teams w ON w.team_id = m.winner_id
              LEFT JOIN venues v ON v.venue_id = m.venue_id
              WHERE m.status = 'completed'
              ORDER BY m.match_date DESC, m.match_id DESC
              LIMIT ?1",
        params: &[count("limit", 20, "Number of matches")],
    },
    QueryDef {
        id: "format_comparison",
        description: "Runs per format for players who played several formats",
        sql: "SELECT p.player_id, p.name,
                     SUM(CASE WHEN UPPER(m.match_format) = 'TEST' THEN b.runs ELSE 0 END) AS test_runs,
                     SUM(CASE WHEN UPPER(m.match_format) = 'ODI' THEN b.runs ELSE 0 END) AS odi_runs,
                     SUM(CASE WHEN UPPER(m.match_format) LIKE 'T20%' THEN b.runs ELSE 0 END) AS t20_runs,
                     ROUND(AVG(b.runs), 2) AS overall_average
              FROM batting_stats b
              JOIN matches m ON m.match_id = b.match_id
              JOIN players p ON p.player_id = b.player_id
              GROUP BY p.player_id, p.name
              HAVING COUNT(DISTINCT UPPER(m.match_format)) >= ?1
              ORDER BY overall_average DESC",
        params: &[int("min_formats", 2, "Distinct formats played")],
    },
    QueryDef {
        id: "home_away_wins",
        description: "Wins per team split into home and away",
        sql: "SELECT t.team_id, t.name AS team_name,
                     SUM(CASE WHEN v.country = COALESCE(t.country, t.name) THEN 1 ELSE 0 END) AS home_wins,
                     SUM(CASE WHEN v.country IS NOT NULL
                               AND v.country <> COALESCE(t.country, t.name) THEN 1 ELSE 0 END) AS away_wins
              FROM matches m
              JOIN teams t ON t.team_id = m.winner_id
              JOIN venues v ON v.venue_id = m.venue_id
              GROUP BY t.team_id, t.name
              ORDER BY home_wins + away_wins DESC, t.name",
        params: &[],
    },
    QueryDef {
        id: "big_partnerships",
        description: "Partnerships of consecutive batters worth at least N runs",
        sql: "SELECT p1.name AS player1, p2.name AS player2, pt.runs AS partnership_runs,
                     pt.innings_no, pt.match_id
              FROM partnerships pt
              JOIN players p1 ON p1.player_id = pt.player1_id
              JOIN players p2 ON p2.player_id = pt.player2_id
              WHERE pt.runs >= ?1
                AND (pt.pair_pos_diff IS NULL OR pt.pair_pos_diff = 1)
              ORDER BY pt.runs DESC, pt.match_id",
        params: &[int("min_runs", 100, "Minimum partnership runs")],
    },
    QueryDef {
        id: "bowling_by_venue",
        description: "Bowler economy and wickets at each venue",
        sql: "SELECT p.name AS bowler_name, v.name AS venue_name,
                     ROUND(SUM(bs.runs) / (SUM(bs.overs) * 1.0), 2) AS avg_economy,
                     SUM(bs.wickets) AS total_wickets,
                     COUNT(DISTINCT bs.match_id) AS matches_played
              FROM bowling_stats bs
              JOIN matches m ON m.match_id = bs.match_id
              JOIN venues v ON v.venue_id = m.venue_id
              JOIN players p ON p.player_id = bs.player_id
              WHERE bs.overs >= ?1
              GROUP BY p.player_id, p.name, v.venue_id, v.name
              HAVING COUNT(DISTINCT bs.match_id) >= ?2
              ORDER BY avg_economy ASC",
        params: &[
            real("min_overs", 4.0, "Minimum overs in a spell"),
            int("min_matches", 3, "Minimum matches at the venue"),
        ],
    },
    QueryDef {
        id: "close_matches",
        description: "Matches won by a narrow margin",
        sql: "SELECT m.match_id, m.description AS match_description,
                     t1.name AS team1, t2.name AS team2, w.name AS winning_team,
                     m.win_margin, m.victory_type
              FROM matches m
              JOIN teams t1 ON t1.team_id = m.team1_id
              JOIN teams t2 ON t2.team_id = m.team2_id
              JOIN teams w ON w.team_id = m.winner_id
              WHERE (m.victory_type = 'runs' AND CAST(m.win_margin AS INTEGER) < ?1)
                 OR (m.victory_type = 'wickets' AND CAST(m.win_margin AS INTEGER) < ?2)
              ORDER BY m.match_date DESC, m.match_id DESC",
        params: &[
            int("max_run_margin", 50, "Run margins below this are close"),
            int("max_wicket_margin", 5, "Wicket margins below this are close"),
        ],
    },
    QueryDef {
        id: "yearly_batting",
        description: "Per-year batting averages for regular players",
        sql: "SELECT p.player_id, p.name,
                     CAST(strftime('%Y', m.match_date) AS INTEGER) AS year,
                     ROUND(AVG(b.runs), 2) AS avg_runs,
                     ROUND(AVG(b.strike_rate), 2) AS avg_strike_rate,
                     COUNT(DISTINCT b.match_id) AS matches_played
              FROM batting_stats b
              JOIN matches m ON m.match_id = b.match_id
              JOIN players p ON p.player_id = b.player_id
              WHERE CAST(strftime('%Y', m.match_date) AS INTEGER) >= ?1
              GROUP BY p.player_id, p.name, year
              HAVING COUNT(DISTINCT b.match_id) >= ?2
              ORDER BY p.name, year",
        params: &[
            int("since_year", 2020, "First year included"),
            int("min_matches", 5, "Minimum matches in the year"),
        ],
    },
    QueryDef {
        id: "toss_advantage",
        description: "How often the toss winner wins, by toss decision",
        sql: "SELECT toss_decision,
                     COUNT(*) AS total_matches,
                     SUM(CASE WHEN toss_winner_id = winner_id THEN 1 ELSE 0 END) AS toss_winner_wins,
                     ROUND(100.0 * SUM(CASE WHEN toss_winner_id = winner_id THEN 1 ELSE 0 END)
                           / COUNT(*), 2) AS win_percentage
              FROM matches
              WHERE toss_winner_id IS NOT NULL AND winner_id IS NOT NULL
              GROUP BY toss_decision
              ORDER BY toss_decision",
        params: &[],
    },
    QueryDef {
        id: "economical_bowlers",
        description: "Most economical regular bowlers in limited-overs cricket",
        sql: "SELECT p.player_id, p.name,
                     ROUND(SUM(bs.runs) / SUM(bs.overs), 2) AS economy_rate,
                     SUM(bs.wickets) AS total_wickets,
                     COUNT(DISTINCT bs.match_id) AS matches_played
              FROM bowling_stats bs
              JOIN matches m ON m.match_id = bs.match_id
              JOIN players p ON p.player_id = bs.player_id
              WHERE UPPER(m.match_format) IN ('ODI', 'T20', 'T20I')
              GROUP BY p.player_id, p.name
              HAVING COUNT(DISTINCT bs.match_id) >= ?1
                 AND SUM(bs.overs) / COUNT(DISTINCT bs.match_id) >= ?2
              ORDER BY economy_rate ASC",
        params: &[
            int("min_matches", 10, "Minimum matches bowled in"),
            real("min_overs_per_match", 2.0, "Minimum average overs per match"),
        ],
    },
    QueryDef {
        id: "consistent_batsmen",
        description: "Batters with the steadiest scores since a date (lowest variance)",
        sql: "SELECT p.player_id, p.name,
                     ROUND(AVG(b.runs), 2) AS avg_runs,
                     ROUND(AVG(b.runs * b.runs) - AVG(b.runs) * AVG(b.runs), 2) AS runs_variance,
                     COUNT(*) AS innings
              FROM batting_stats b
              JOIN matches m ON m.match_id = b.match_id
              JOIN players p ON p.player_id = b.player_id
              WHERE b.balls >= ?2 AND m.match_date >= ?1
              GROUP BY p.player_id, p.name
              ORDER BY runs_variance ASC, avg_runs DESC",
        params: &[
            date("since", (2022, 1, 1), "Only innings on or after this date"),
            int("min_balls", 10, "Minimum balls faced in an innings"),
        ],
    },
    QueryDef {
        id: "format_averages",
        description: "Matches and batting average per format for experienced players",
        sql: "SELECT p.player_id, p.name,
                     COUNT(DISTINCT CASE WHEN UPPER(m.match_format) = 'TEST' THEN m.match_id END) AS test_matches,
                     COUNT(DISTINCT CASE WHEN UPPER(m.match_format) = 'ODI' THEN m.match_id END) AS odi_matches,
                     COUNT(DISTINCT CASE WHEN UPPER(m.match_format) LIKE 'T20%' THEN m.match_id END) AS t20_matches,
                     ROUND(AVG(CASE WHEN UPPER(m.match_format) = 'TEST' THEN b.runs END), 2) AS test_avg,
                     ROUND(AVG(CASE WHEN UPPER(m.match_format) = 'ODI' THEN b.runs END), 2) AS odi_avg,
                     ROUND(AVG(CASE WHEN UPPER(m.match_format) LIKE 'T20%' THEN b.runs END), 2) AS t20_avg
              FROM batting_stats b
              JOIN matches m ON m.match_id = b.match_id
              JOIN players p ON p.player_id = b.player_id
              GROUP BY p.player_id, p.name
              HAVING COUNT(DISTINCT m.match_id) >= ?1
              ORDER BY p.name",
        params: &[int("min_matches", 20, "Minimum total matches")],
    },
    QueryDef {
        id: "head_to_head",
        description: "Head-to-head record for team pairs over recent years",
        sql: "SELECT ta.name AS team_a, tb.name AS team_b,
                     COUNT(*) AS matches_played,
                     SUM(CASE WHEN m.winner_id = pair.team_a THEN 1 ELSE 0 END) AS team_a_wins,
                     SUM(CASE WHEN m.winner_id = pair.team_b THEN 1 ELSE 0 END) AS team_b_wins
              FROM (SELECT match_id,
                           MIN(team1_id, team2_id) AS team_a,
                           MAX(team1_id, team2_id) AS team_b
                    FROM matches) pair
              JOIN matches m ON m.match_id = pair.match_id
              JOIN teams ta ON ta.team_id = pair.team_a
              JOIN teams tb ON tb.team_id = pair.team_b
              WHERE m.match_date >= date('now', printf('-%d years', ?1))
              GROUP BY pair.team_a, pair.team_b
              HAVING COUNT(*) >= ?2
              ORDER BY matches_played DESC, team_a, team_b",
        params: &[
            count("years", 3, "Look-back window in years"),
            int("min_matches", 5, "Minimum meetings"),
        ],
    },
    QueryDef {
        id: "recent_form",
        description: "Batting form over each player's most recent innings",
        sql: "WITH ranked AS (
                  SELECT b.player_id, b.runs, b.strike_rate,
                         ROW_NUMBER() OVER (PARTITION BY b.player_id
                                            ORDER BY m.match_date DESC, b.match_id DESC,
                                                     b.innings_no DESC) AS rn
                  FROM batting_stats b
                  JOIN matches m ON m.match_id = b.match_id
              )
              SELECT p.player_id, p.name,
                     ROUND(AVG(CASE WHEN r.rn <= 5 THEN r.runs END), 2) AS avg_last_5,
                     ROUND(AVG(r.runs), 2) AS avg_last_n,
                     ROUND(AVG(r.strike_rate), 2) AS avg_strike_rate,
                     SUM(r.runs >= 50) AS fifties
              FROM ranked r
              JOIN players p ON p.player_id = r.player_id
              WHERE r.rn <= ?1
              GROUP BY p.player_id, p.name
              ORDER BY avg_last_n DESC",
        params: &[count("innings", 10, "Innings considered per player")],
    },
    QueryDef {
        id: "best_partnerships",
        description: "Most productive batting pairs",
        sql: "SELECT p1.name AS player1, p2.name AS player2,
                     COUNT(*) AS partnerships,
                     ROUND(AVG(pt.runs), 2) AS avg_runs,
                     MAX(pt.runs) AS highest,
                     SUM(pt.runs >= 50) AS fifty_plus
              FROM partnerships pt
              JOIN players p1 ON p1.player_id = MIN(pt.player1_id, pt.player2_id)
              JOIN players p2 ON p2.player_id = MAX(pt.player1_id, pt.player2_id)
              GROUP BY p1.player_id, p2.player_id
              HAVING COUNT(*) >= ?1
              ORDER BY avg_runs DESC",
        params: &[int("min_partnerships", 5, "Minimum stands together")],
    },
];
