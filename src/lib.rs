//! Cricbuzz cricket statistics library
//!
//! Fetches live and reference cricket data from the Cricbuzz API (served
//! through RapidAPI), stores it in a normalized SQLite database, and answers
//! analytical questions through a catalog of parameterized queries.
//!
//! ## Features
//!
//! - **API Client**: response caching with per-endpoint TTLs, a sliding-window
//!   rate limiter, and retry with exponential backoff
//! - **Database Storage**: pooled SQLite connections and typed CRUD over
//!   teams, players, venues, series, matches and statistics
//! - **Query Catalog**: named analytical queries with typed, validated parameters
//! - **Sync**: match lists, squads and scorecards written through the data layer,
//!   plus a live poller
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cricbuzz_stats::storage::{catalog, CricketDatabase, ParamValue, QueryParams};
//!
//! # fn example() -> cricbuzz_stats::Result<()> {
//! let db = CricketDatabase::open_in_memory()?;
//!
//! let mut params = QueryParams::new();
//! params.insert("format".to_string(), ParamValue::Text("ODI".to_string()));
//! let top = catalog::run(&db, "top_run_scorers", &params, Some(5))?;
//!
//! for row in &top.rows {
//!     println!("{row:?}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Environment Configuration
//!
//! Network calls need a RapidAPI key:
//! ```bash
//! export RAPIDAPI_KEY=your-key
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod cricbuzz;
pub mod error;
pub mod storage;

// Re-export commonly used types
pub use cli::types::{
    MatchId, MatchListKind, MatchStatus, PlayerId, PlayerRole, SeriesId, TeamId, VenueId,
};
pub use error::{CricketError, Result};
