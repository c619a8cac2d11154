//! CLI argument definitions and parsing.

pub mod types;

use crate::{
    config::{DB_PATH_ENV_VAR, REFRESH_SECS_ENV_VAR},
    storage::{DeleteMode, NewPlayer, PlayerUpdate},
};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use types::{MatchListKind, PlayerRole, TeamId};

#[derive(Debug, Parser)]
#[clap(
    name = "cricbuzz-stats",
    about = "Cricket statistics from the Cricbuzz API, stored in SQLite"
)]
pub struct CricbuzzCli {
    /// SQLite database file (or set `CRICBUZZ_DB_PATH`).
    #[clap(long, global = true, env = DB_PATH_ENV_VAR)]
    pub db: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run pre-built analytical queries
    Queries {
        #[clap(subcommand)]
        cmd: QueriesCmd,
    },

    /// Read and edit player records
    Players {
        #[clap(subcommand)]
        cmd: PlayersCmd,
    },

    /// Inspect stored teams
    Teams {
        #[clap(subcommand)]
        cmd: TeamsCmd,
    },

    /// Pull data from the Cricbuzz API into the database
    Sync {
        #[clap(subcommand)]
        cmd: SyncCmd,

        /// Output the sync report as JSON.
        #[clap(long)]
        json: bool,
    },

    /// Poll live matches until interrupted
    Live {
        /// Seconds between polls (or set `CRICBUZZ_REFRESH_SECS`).
        #[clap(long, env = REFRESH_SECS_ENV_VAR)]
        interval: Option<u64>,

        /// Stop after this many polls.
        #[clap(long)]
        rounds: Option<u32>,

        /// Output the poll summary as JSON.
        #[clap(long)]
        json: bool,
    },

    /// Show database health and sync bookkeeping
    Status {
        #[clap(long)]
        json: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum QueriesCmd {
    /// List the catalog
    List,

    /// Show one query's parameters and SQL
    Show { id: String },

    /// Run a query
    Run {
        id: String,

        /// Query parameter (repeatable): `--param format=ODI --param limit=5`.
        #[clap(long = "param", short = 'p')]
        params: Vec<String>,

        /// Return at most this many rows.
        #[clap(long)]
        limit: Option<usize>,

        /// Output rows as JSON objects.
        #[clap(long)]
        json: bool,
    },
}

/// Player fields shared by `create` and `update`.
#[derive(Debug, Args)]
pub struct PlayerFields {
    #[clap(long)]
    pub team_id: Option<TeamId>,

    #[clap(long)]
    pub country: Option<String>,

    /// Batsman, Bowler, All-rounder or Wicket-keeper.
    #[clap(long)]
    pub role: Option<PlayerRole>,

    #[clap(long)]
    pub batting_style: Option<String>,

    #[clap(long)]
    pub bowling_style: Option<String>,

    /// Date of birth as YYYY-MM-DD.
    #[clap(long)]
    pub dob: Option<chrono::NaiveDate>,
}

#[derive(Debug, Subcommand)]
pub enum PlayersCmd {
    /// List players, optionally filtered
    List {
        /// Name substring, case-insensitive.
        #[clap(long, short = 'n')]
        name: Option<String>,

        #[clap(long)]
        team_id: Option<TeamId>,

        #[clap(long)]
        role: Option<PlayerRole>,

        #[clap(long)]
        json: bool,
    },

    /// Show one player
    Get {
        id: i64,

        #[clap(long)]
        json: bool,
    },

    /// Add a player
    Create {
        #[clap(long)]
        name: String,

        #[clap(flatten)]
        fields: PlayerFields,

        #[clap(long)]
        json: bool,
    },

    /// Change supplied fields of a player
    Update {
        id: i64,

        #[clap(long)]
        name: Option<String>,

        #[clap(flatten)]
        fields: PlayerFields,

        /// Clear the team.
        #[clap(long, conflicts_with = "team_id")]
        clear_team: bool,

        /// Clear country, styles and date of birth.
        #[clap(long)]
        clear_details: bool,

        #[clap(long)]
        json: bool,
    },

    /// Delete a player
    Delete {
        id: i64,

        /// Also delete the player's statistics.
        #[clap(long)]
        cascade: bool,
    },

    /// Search Cricbuzz for players by name
    Search {
        name: String,

        #[clap(long)]
        json: bool,
    },

    /// Fetch a player's Cricbuzz profile and store it
    Profile {
        id: i64,

        #[clap(long)]
        json: bool,
    },

    /// Career batting and bowling tables from Cricbuzz
    Stats {
        id: i64,

        #[clap(long)]
        json: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum TeamsCmd {
    /// List stored teams
    List {
        #[clap(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum SyncCmd {
    /// International teams
    Teams,

    /// International series calendar
    Series,

    /// One team's squad
    Players { team_id: i64 },

    /// Live, recent or upcoming match lists
    Matches {
        #[clap(value_enum)]
        kind: MatchListKind,
    },

    /// One match's scorecard and result
    Scorecard { match_id: i64 },
}

impl PlayerFields {
    pub fn into_new_player(self, name: String) -> NewPlayer {
        NewPlayer {
            name,
            team_id: self.team_id,
            country: self.country,
            role: self.role,
            batting_style: self.batting_style,
            bowling_style: self.bowling_style,
            date_of_birth: self.dob,
        }
    }

    /// Supplied fields become updates; `clear_*` flags null their columns.
    pub fn into_update(
        self,
        name: Option<String>,
        clear_team: bool,
        clear_details: bool,
    ) -> PlayerUpdate {
        let or_clear = |value: Option<String>| match value {
            Some(v) => Some(Some(v)),
            None if clear_details => Some(None),
            None => None,
        };
        PlayerUpdate {
            name,
            team_id: match self.team_id {
                Some(team) => Some(Some(team)),
                None if clear_team => Some(None),
                None => None,
            },
            country: or_clear(self.country),
            role: self.role,
            batting_style: or_clear(self.batting_style),
            bowling_style: or_clear(self.bowling_style),
            date_of_birth: match self.dob {
                Some(dob) => Some(Some(dob)),
                None if clear_details => Some(None),
                None => None,
            },
        }
    }
}

pub fn delete_mode(cascade: bool) -> DeleteMode {
    if cascade {
        DeleteMode::Cascade
    } else {
        DeleteMode::Restrict
    }
}
