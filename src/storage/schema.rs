//! Database schema and pooled connection management

use super::models::{Cell, HealthReport, TabularResult};
use crate::config::DatabaseConfig;
use crate::error::{CricketError, Result};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, ToSql, Transaction};
use std::time::Duration;

pub type PooledConn = PooledConnection<SqliteConnectionManager>;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS teams (
    team_id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    short_name TEXT,
    country TEXT
);

CREATE TABLE IF NOT EXISTS players (
    player_id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    team_id INTEGER REFERENCES teams(team_id),
    country TEXT,
    role TEXT,
    batting_style TEXT,
    bowling_style TEXT,
    date_of_birth TEXT,
    created_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS venues (
    venue_id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    city TEXT,
    country TEXT,
    capacity INTEGER,
    UNIQUE (name, city, country)
);

CREATE TABLE IF NOT EXISTS series (
    series_id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    host_country TEXT,
    match_type TEXT,
    start_date TEXT,
    end_date TEXT,
    total_matches INTEGER
);

CREATE TABLE IF NOT EXISTS matches (
    match_id INTEGER PRIMARY KEY,
    series_id INTEGER REFERENCES series(series_id),
    team1_id INTEGER NOT NULL REFERENCES teams(team_id),
    team2_id INTEGER NOT NULL REFERENCES teams(team_id),
    venue_id INTEGER REFERENCES venues(venue_id),
    status TEXT NOT NULL DEFAULT 'scheduled',
    match_format TEXT,
    match_date TEXT,
    start_time TEXT,
    description TEXT,
    winner_id INTEGER REFERENCES teams(team_id),
    win_margin TEXT,
    victory_type TEXT,
    toss_winner_id INTEGER REFERENCES teams(team_id),
    toss_decision TEXT
);

CREATE TABLE IF NOT EXISTS batting_stats (
    id INTEGER PRIMARY KEY,
    match_id INTEGER NOT NULL REFERENCES matches(match_id),
    player_id INTEGER NOT NULL REFERENCES players(player_id),
    innings_no INTEGER NOT NULL,
    team_id INTEGER,
    runs INTEGER NOT NULL DEFAULT 0,
    balls INTEGER NOT NULL DEFAULT 0,
    fours INTEGER NOT NULL DEFAULT 0,
    sixes INTEGER NOT NULL DEFAULT 0,
    strike_rate REAL,
    batting_pos INTEGER,
    is_out INTEGER,
    UNIQUE (match_id, player_id, innings_no)
);

CREATE TABLE IF NOT EXISTS bowling_stats (
    id INTEGER PRIMARY KEY,
    match_id INTEGER NOT NULL REFERENCES matches(match_id),
    player_id INTEGER NOT NULL REFERENCES players(player_id),
    innings_no INTEGER NOT NULL,
    team_id INTEGER,
    overs REAL NOT NULL DEFAULT 0,
    maidens INTEGER NOT NULL DEFAULT 0,
    runs INTEGER NOT NULL DEFAULT 0,
    wickets INTEGER NOT NULL DEFAULT 0,
    economy REAL,
    UNIQUE (match_id, player_id, innings_no)
);

CREATE TABLE IF NOT EXISTS fielding_stats (
    id INTEGER PRIMARY KEY,
    match_id INTEGER NOT NULL REFERENCES matches(match_id),
    player_id INTEGER NOT NULL REFERENCES players(player_id),
    catches INTEGER NOT NULL DEFAULT 0,
    stumpings INTEGER NOT NULL DEFAULT 0,
    UNIQUE (match_id, player_id)
);

CREATE TABLE IF NOT EXISTS partnerships (
    id INTEGER PRIMARY KEY,
    match_id INTEGER NOT NULL REFERENCES matches(match_id),
    innings_no INTEGER NOT NULL,
    player1_id INTEGER NOT NULL REFERENCES players(player_id),
    player2_id INTEGER NOT NULL REFERENCES players(player_id),
    runs INTEGER NOT NULL DEFAULT 0,
    balls INTEGER,
    pair_pos_diff INTEGER,
    UNIQUE (match_id, innings_no, player1_id, player2_id)
);

CREATE TABLE IF NOT EXISTS etl_state (
    k TEXT PRIMARY KEY,
    v TEXT
);

CREATE INDEX IF NOT EXISTS idx_players_team ON players(team_id);
CREATE INDEX IF NOT EXISTS idx_matches_date ON matches(match_date);
CREATE INDEX IF NOT EXISTS idx_matches_status ON matches(status);
CREATE INDEX IF NOT EXISTS idx_batting_player ON batting_stats(player_id);
CREATE INDEX IF NOT EXISTS idx_bowling_player ON bowling_stats(player_id);
";

/// Pooled handle to the cricket database. Cloning shares the pool.
#[derive(Clone)]
pub struct CricketDatabase {
    pool: Pool<SqliteConnectionManager>,
    acquire_timeout: Duration,
}

impl CricketDatabase {
    /// Open (creating if needed) the database file named in `config` and make
    /// sure the schema exists.
    pub fn open(config: &DatabaseConfig) -> Result<Self> {
        if let Some(parent) = config.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let busy_timeout = config.busy_timeout;
        let manager = SqliteConnectionManager::file(&config.path)
            .with_init(move |c| configure_connection(c, busy_timeout));
        let db = Self::from_manager(manager, config.pool_size, config.acquire_timeout)?;
        tracing::debug!(path = %config.path.display(), "opened database");
        Ok(db)
    }

    /// Private in-memory database with a single pooled connection.
    pub fn open_in_memory() -> Result<Self> {
        let manager = SqliteConnectionManager::memory()
            .with_init(|c| configure_connection(c, Duration::from_secs(5)));
        Self::from_manager(manager, 1, Duration::from_secs(5))
    }

    fn from_manager(
        manager: SqliteConnectionManager,
        pool_size: u32,
        acquire_timeout: Duration,
    ) -> Result<Self> {
        let pool = Pool::builder()
            .max_size(pool_size.max(1))
            .connection_timeout(acquire_timeout)
            .build(manager)?;
        let db = Self {
            pool,
            acquire_timeout,
        };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Create tables and indexes if they do not exist.
    pub(crate) fn initialize_schema(&self) -> Result<()> {
        self.acquire()?.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Borrow a connection, waiting at most the configured acquire timeout.
    pub fn acquire(&self) -> Result<PooledConn> {
        self.pool
            .get_timeout(self.acquire_timeout)
            .map_err(|e| CricketError::Connection {
                message: format!(
                    "no connection available within {}ms: {e}",
                    self.acquire_timeout.as_millis()
                ),
            })
    }

    /// Run a statement, returning the number of rows changed.
    pub fn execute(&self, sql: &str, params: &[&dyn ToSql]) -> Result<usize> {
        Ok(self.acquire()?.execute(sql, params)?)
    }

    /// Run a query and collect at most `row_limit` rows.
    pub fn query(
        &self,
        sql: &str,
        params: &[&dyn ToSql],
        row_limit: Option<usize>,
    ) -> Result<TabularResult> {
        let conn = self.acquire()?;
        let mut stmt = conn.prepare(sql)?;
        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();

        let mut rows = stmt.query(params)?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            if row_limit.is_some_and(|limit| out.len() >= limit) {
                break;
            }
            let mut cells = Vec::with_capacity(columns.len());
            for i in 0..columns.len() {
                cells.push(Cell::from(row.get_ref(i)?));
            }
            out.push(cells);
        }

        Ok(TabularResult { columns, rows: out })
    }

    /// Run `f` inside a transaction on one connection. Commits when `f`
    /// returns `Ok`, rolls back otherwise.
    pub fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T>,
    {
        let mut conn = self.acquire()?;
        let tx = conn.transaction()?;
        let out = f(&tx)?;
        tx.commit()?;
        Ok(out)
    }

    /// Run blocking database work off the async runtime, bounded by `timeout`.
    ///
    /// On timeout the caller gets `Timeout` straight away; the blocking work
    /// itself runs to completion in the background.
    pub async fn call<T, F>(&self, timeout: Duration, f: F) -> Result<T>
    where
        F: FnOnce(&CricketDatabase) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.clone();
        let task = tokio::task::spawn_blocking(move || f(&db));
        match tokio::time::timeout(timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join)) => Err(CricketError::Connection {
                message: format!("database task failed: {join}"),
            }),
            Err(_) => Err(CricketError::Timeout {
                operation: "database call".to_string(),
                after: timeout,
            }),
        }
    }

    /// Check that a connection can be obtained and report what is stored.
    pub fn health(&self) -> Result<HealthReport> {
        let conn = self.acquire()?;
        let mut stmt = conn.prepare(
            "SELECT name FROM sqlite_master
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
             ORDER BY name",
        )?;
        let tables = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        let players = conn.query_row("SELECT COUNT(*) FROM players", [], |r| r.get(0))?;
        let matches = conn.query_row("SELECT COUNT(*) FROM matches", [], |r| r.get(0))?;

        Ok(HealthReport {
            tables,
            players,
            matches,
        })
    }
}

fn configure_connection(conn: &mut Connection, busy_timeout: Duration) -> rusqlite::Result<()> {
    conn.busy_timeout(busy_timeout)?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")
}
