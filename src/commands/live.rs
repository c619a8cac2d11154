//! Periodic live-match polling.

use super::common::{AppContext, DB_CALL_TIMEOUT};
use super::sync::{sync_match_result, sync_matches, sync_scorecard, LAST_LIVE_SYNC_KEY};
use crate::{
    cli::types::{MatchId, MatchListKind, MatchStatus},
    cricbuzz::Transport,
    CricketError, Result,
};
use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeSet;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PollSummary {
    pub rounds: u32,
    /// Matches still being tracked after the last round.
    pub tracked: Vec<MatchId>,
    /// Matches seen to finish while polling.
    pub completed: Vec<MatchId>,
    pub errors: usize,
}

/// Poll live matches every `interval` for `rounds` rounds, or until the
/// future is dropped when `rounds` is `None`.
///
/// A round syncs the live match list, then the scorecard and result of
/// every live match. Failures inside a round are logged and counted; they
/// never stop the loop.
pub async fn poll_live<T: Transport>(
    ctx: &AppContext<T>,
    interval: Duration,
    rounds: Option<u32>,
) -> Result<PollSummary> {
    if interval.is_zero() {
        return Err(CricketError::InvalidParameter {
            name: "interval".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut tracked = BTreeSet::new();
    let mut summary = PollSummary::default();

    while rounds.map_or(true, |n| summary.rounds < n) {
        ticker.tick().await;
        summary.rounds += 1;
        poll_round(ctx, &mut tracked, &mut summary).await;
        tracing::info!(
            round = summary.rounds,
            tracked = tracked.len(),
            errors = summary.errors,
            "live poll round finished"
        );
    }

    summary.tracked = tracked.into_iter().collect();
    Ok(summary)
}

async fn poll_round<T: Transport>(
    ctx: &AppContext<T>,
    tracked: &mut BTreeSet<MatchId>,
    summary: &mut PollSummary,
) {
    if let Err(e) = sync_matches(ctx, MatchListKind::Live).await {
        tracing::warn!(error = %e, "live match list sync failed");
        summary.errors += 1;
    }

    match ctx
        .db
        .call(DB_CALL_TIMEOUT, |db| db.list_matches(Some(MatchStatus::Live)))
        .await
    {
        Ok(live) => tracked.extend(live.into_iter().map(|m| m.id)),
        Err(e) => {
            tracing::warn!(error = %e, "could not read live matches");
            summary.errors += 1;
        }
    }

    let ids: Vec<MatchId> = tracked.iter().copied().collect();
    for id in ids {
        if let Err(e) = sync_scorecard(ctx, id).await {
            tracing::warn!(match_id = %id, error = %e, "scorecard sync failed");
            summary.errors += 1;
        }
        match sync_match_result(ctx, id).await {
            Ok(MatchStatus::Completed) => {
                tracing::info!(match_id = %id, "match completed");
                tracked.remove(&id);
                summary.completed.push(id);
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(match_id = %id, error = %e, "match result sync failed");
                summary.errors += 1;
            }
        }
    }

    let now = Utc::now().to_rfc3339();
    if let Err(e) = ctx
        .db
        .call(DB_CALL_TIMEOUT, move |db| db.set_state(LAST_LIVE_SYNC_KEY, &now))
        .await
    {
        tracing::warn!(error = %e, "could not record live sync time");
        summary.errors += 1;
    }
}
