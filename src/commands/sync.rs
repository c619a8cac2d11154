//! Pull reference data, match lists and scorecards from Cricbuzz into the
//! database.
//!
//! Every sync fetches first and writes second, so no pooled connection is
//! held while waiting on the network. Writes run on the blocking pool via
//! `CricketDatabase::call`.

use super::common::{AppContext, DB_CALL_TIMEOUT};
use crate::{
    cli::types::{MatchId, MatchListKind, MatchStatus, PlayerId, SeriesId, TeamId},
    cricbuzz::{types::MatchSummary, ScorecardRows, Transport},
    storage::{CricketDatabase, Player, Series},
    CricketError, Result,
};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::atomic::Ordering;

pub const LAST_LIVE_SYNC_KEY: &str = "last_live_sync";
pub const API_CALLS_KEY: &str = "api_calls";

/// Rows written by a sync.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub teams: usize,
    pub players: usize,
    pub venues: usize,
    pub series: usize,
    pub matches: usize,
    pub batting: usize,
    pub bowling: usize,
    pub fielding: usize,
    pub partnerships: usize,
    /// Stat rows left alone: locked by a completed match, or rejected by
    /// the database.
    pub skipped: usize,
}

impl SyncReport {
    pub fn merge(&mut self, other: &SyncReport) {
        self.teams += other.teams;
        self.players += other.players;
        self.venues += other.venues;
        self.series += other.series;
        self.matches += other.matches;
        self.batting += other.batting;
        self.bowling += other.bowling;
        self.fielding += other.fielding;
        self.partnerships += other.partnerships;
        self.skipped += other.skipped;
    }
}

/// Add the API calls made since the last record to the stored total.
pub async fn record_api_calls<T: Transport>(ctx: &AppContext<T>) -> Result<u64> {
    let now = ctx.api.calls_made();
    let delta = now.saturating_sub(ctx.recorded_calls.swap(now, Ordering::Relaxed));
    ctx.db
        .call(DB_CALL_TIMEOUT, move |db| {
            let stored = db
                .get_state(API_CALLS_KEY)?
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(0);
            let total = stored + delta;
            db.set_state(API_CALLS_KEY, &total.to_string())?;
            Ok(total)
        })
        .await
}

pub async fn sync_teams<T: Transport>(ctx: &AppContext<T>) -> Result<SyncReport> {
    let teams = ctx.api.international_teams().await?;
    let report = ctx
        .db
        .call(DB_CALL_TIMEOUT, move |db| {
            for team in &teams {
                db.upsert_team(team)?;
            }
            Ok(SyncReport {
                teams: teams.len(),
                ..SyncReport::default()
            })
        })
        .await?;
    record_api_calls(ctx).await?;
    tracing::info!(teams = report.teams, "synced teams");
    Ok(report)
}

/// Store the international series calendar.
pub async fn sync_series<T: Transport>(ctx: &AppContext<T>) -> Result<SyncReport> {
    let series = ctx.api.international_series().await?;
    let report = ctx
        .db
        .call(DB_CALL_TIMEOUT, move |db| {
            for summary in &series {
                db.upsert_series(&summary.to_series())?;
            }
            Ok(SyncReport {
                series: series.len(),
                ..SyncReport::default()
            })
        })
        .await?;
    record_api_calls(ctx).await?;
    tracing::info!(series = report.series, "synced series");
    Ok(report)
}

/// Sync one team's squad. The team itself must already be stored.
pub async fn sync_team_players<T: Transport>(
    ctx: &AppContext<T>,
    team_id: TeamId,
) -> Result<SyncReport> {
    ctx.db
        .call(DB_CALL_TIMEOUT, move |db| db.get_team(team_id).map(|_| ()))
        .await?;

    let squad = ctx.api.team_players(team_id).await?;
    let report = ctx
        .db
        .call(DB_CALL_TIMEOUT, move |db| {
            for p in &squad {
                db.upsert_player(&Player {
                    id: PlayerId::new(p.id),
                    name: p.name.clone(),
                    team_id: Some(team_id),
                    country: None,
                    role: p.role,
                    batting_style: p.batting_style.clone(),
                    bowling_style: p.bowling_style.clone(),
                    date_of_birth: None,
                })?;
            }
            Ok(SyncReport {
                players: squad.len(),
                ..SyncReport::default()
            })
        })
        .await?;
    record_api_calls(ctx).await?;
    tracing::info!(team_id = %team_id, players = report.players, "synced squad");
    Ok(report)
}

pub async fn sync_matches<T: Transport>(
    ctx: &AppContext<T>,
    kind: MatchListKind,
) -> Result<SyncReport> {
    let summaries = ctx.api.matches(kind).await?;
    let report = ctx
        .db
        .call(DB_CALL_TIMEOUT, move |db| {
            store_match_summaries(db, &summaries)
        })
        .await?;
    record_api_calls(ctx).await?;
    tracing::info!(kind = %kind, matches = report.matches, "synced match list");
    Ok(report)
}

/// Write teams, venues, series and matches from a match list.
pub fn store_match_summaries(
    db: &CricketDatabase,
    summaries: &[MatchSummary],
) -> Result<SyncReport> {
    let mut teams = HashSet::new();
    let mut venues = HashSet::new();
    let mut series = HashSet::new();
    let mut report = SyncReport::default();

    for summary in summaries {
        let info = &summary.info;

        for team in [&info.team1, &info.team2] {
            db.upsert_team(&team.to_team())?;
            teams.insert(team.team_id);
        }

        let venue_id = match &info.venue_info {
            Some(venue) => match venue.ground.as_deref().map(str::trim) {
                Some(ground) if !ground.is_empty() => {
                    let id = db.get_or_create_venue(
                        ground,
                        venue.city.as_deref(),
                        venue.country.as_deref(),
                        venue.capacity,
                    )?;
                    venues.insert(id);
                    Some(id)
                }
                _ => None,
            },
            None => None,
        };

        if let Some(series_id) = info.series_id {
            db.upsert_series(&Series {
                id: SeriesId::new(series_id),
                name: summary
                    .series_name
                    .clone()
                    .unwrap_or_else(|| format!("Series {series_id}")),
                host_country: None,
                match_type: info.match_format.clone(),
                start_date: None,
                end_date: None,
                total_matches: None,
            })?;
            series.insert(series_id);
        }

        let status = db.upsert_match(&info.to_match(venue_id))?;
        tracing::debug!(match_id = info.match_id, status = %status, "stored match");
        report.matches += 1;
    }

    report.teams = teams.len();
    report.venues = venues.len();
    report.series = series.len();
    Ok(report)
}

/// Fetch a match's scorecard and store its statistics. The match must
/// already be stored.
pub async fn sync_scorecard<T: Transport>(
    ctx: &AppContext<T>,
    match_id: MatchId,
) -> Result<SyncReport> {
    ctx.db
        .call(DB_CALL_TIMEOUT, move |db| db.get_match(match_id).map(|_| ()))
        .await?;

    let card = ctx.api.scorecard(match_id).await?;
    let rows = card.to_rows(match_id);
    if !card.scorecard.is_empty() && rows.batting.is_empty() && rows.bowling.is_empty() {
        tracing::warn!(
            match_id = %match_id,
            innings = card.scorecard.len(),
            "scorecard innings carried no player rows"
        );
    }
    let report = ctx
        .db
        .call(DB_CALL_TIMEOUT, move |db| store_scorecard(db, &rows))
        .await?;
    record_api_calls(ctx).await?;
    tracing::info!(
        match_id = %match_id,
        batting = report.batting,
        bowling = report.bowling,
        skipped = report.skipped,
        "synced scorecard"
    );
    Ok(report)
}

/// Count a write, or a skip when the row cannot be stored. Connection and
/// timeout failures still abort.
fn tally(
    kind: &'static str,
    result: Result<()>,
    written: &mut usize,
    skipped: &mut usize,
) -> Result<()> {
    match result {
        Ok(()) => *written += 1,
        Err(CricketError::RecordLocked { .. }) => *skipped += 1,
        Err(e) if is_row_rejection(&e) => {
            tracing::warn!(kind, error = %e, "skipped scorecard row");
            *skipped += 1;
        }
        Err(e) => return Err(e),
    }
    Ok(())
}

fn is_row_rejection(err: &CricketError) -> bool {
    match err {
        CricketError::NotFound { .. } => true,
        CricketError::Query(rusqlite::Error::SqliteFailure(e, _)) => {
            e.code == rusqlite::ErrorCode::ConstraintViolation
        }
        _ => false,
    }
}

pub fn store_scorecard(db: &CricketDatabase, rows: &ScorecardRows) -> Result<SyncReport> {
    let mut report = SyncReport::default();

    for player in &rows.players {
        if db.ensure_player(player.id, &player.name, player.team_id)? {
            report.players += 1;
        }
    }
    for stat in &rows.batting {
        tally("batting", db.record_batting(stat), &mut report.batting, &mut report.skipped)?;
    }
    for stat in &rows.bowling {
        tally("bowling", db.record_bowling(stat), &mut report.bowling, &mut report.skipped)?;
    }
    for stat in &rows.fielding {
        tally("fielding", db.record_fielding(stat), &mut report.fielding, &mut report.skipped)?;
    }
    for p in &rows.partnerships {
        tally(
            "partnership",
            db.record_partnership(p),
            &mut report.partnerships,
            &mut report.skipped,
        )?;
    }
    Ok(report)
}

/// Refresh result and toss details from the match centre. Returns the
/// status now stored.
pub async fn sync_match_result<T: Transport>(
    ctx: &AppContext<T>,
    match_id: MatchId,
) -> Result<MatchStatus> {
    let outcome = ctx.api.match_centre(match_id).await?.match_header.outcome();
    let status = ctx
        .db
        .call(DB_CALL_TIMEOUT, move |db| {
            db.apply_match_outcome(match_id, &outcome)
        })
        .await?;
    record_api_calls(ctx).await?;
    Ok(status)
}
