//! Database health and sync bookkeeping.

use super::common::print_json;
use super::sync::{API_CALLS_KEY, LAST_LIVE_SYNC_KEY};
use crate::{config::AppConfig, storage::CricketDatabase, Result};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    pub database: PathBuf,
    pub tables: Vec<String>,
    pub players: i64,
    pub matches: i64,
    pub last_live_sync: Option<String>,
    pub api_calls: u64,
    pub api_key_configured: bool,
}

pub fn status_report(db: &CricketDatabase, config: &AppConfig) -> Result<StatusReport> {
    let health = db.health()?;
    let api_calls = db
        .get_state(API_CALLS_KEY)?
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);

    Ok(StatusReport {
        database: config.database.path.clone(),
        tables: health.tables,
        players: health.players,
        matches: health.matches,
        last_live_sync: db.get_state(LAST_LIVE_SYNC_KEY)?,
        api_calls,
        api_key_configured: config.api.api_key.is_some(),
    })
}

pub fn handle_status(db: &CricketDatabase, config: &AppConfig, as_json: bool) -> Result<()> {
    let report = status_report(db, config)?;
    if as_json {
        return print_json(&report);
    }

    println!("Database:       {}", report.database.display());
    println!("Tables:         {}", report.tables.join(", "));
    println!("Players:        {}", report.players);
    println!("Matches:        {}", report.matches);
    println!(
        "Last live sync: {}",
        report.last_live_sync.as_deref().unwrap_or("never")
    );
    println!("API calls:      {}", report.api_calls);
    if !report.api_key_configured {
        println!("API key:        not set (export RAPIDAPI_KEY to sync)");
    }
    Ok(())
}
