//! Command implementations for the Cricbuzz stats CLI

pub mod common;
pub mod live;
pub mod lookup;
pub mod players;
pub mod queries;
pub mod status;
pub mod sync;


pub use common::{AppContext, DB_CALL_TIMEOUT};
pub use live::{poll_live, PollSummary};
pub use lookup::{fetch_profile, player_stats, search_players, CareerStats};
pub use sync::{
    sync_match_result, sync_matches, sync_scorecard, sync_series, sync_team_players, sync_teams,
    SyncReport,
};

use crate::{
    cli::{types::TeamId, SyncCmd},
    cricbuzz::Transport,
    Result,
};
use std::time::Duration;

fn print_report(label: &str, report: &SyncReport, as_json: bool) -> Result<()> {
    if as_json {
        return common::print_json(report);
    }
    println!("Synced {label}:");
    let counts = [
        ("teams", report.teams),
        ("players", report.players),
        ("venues", report.venues),
        ("series", report.series),
        ("matches", report.matches),
        ("batting rows", report.batting),
        ("bowling rows", report.bowling),
        ("fielding rows", report.fielding),
        ("partnerships", report.partnerships),
        ("rows skipped", report.skipped),
    ];
    for (name, count) in counts.iter().filter(|(_, n)| *n > 0) {
        println!("  {name:<20} {count}");
    }
    Ok(())
}

/// Handle `sync <target>`.
pub async fn handle_sync<T: Transport>(
    ctx: &AppContext<T>,
    cmd: SyncCmd,
    as_json: bool,
) -> Result<()> {
    match cmd {
        SyncCmd::Teams => {
            let report = sync_teams(ctx).await?;
            print_report("international teams", &report, as_json)
        }
        SyncCmd::Series => {
            let report = sync_series(ctx).await?;
            print_report("international series", &report, as_json)
        }
        SyncCmd::Players { team_id } => {
            let report = sync_team_players(ctx, TeamId::new(team_id)).await?;
            print_report(&format!("squad of team {team_id}"), &report, as_json)
        }
        SyncCmd::Matches { kind } => {
            let report = sync_matches(ctx, kind).await?;
            print_report(&format!("{kind} matches"), &report, as_json)
        }
        SyncCmd::Scorecard { match_id } => {
            let match_id = crate::MatchId::new(match_id);
            let mut report = sync_scorecard(ctx, match_id).await?;
            let status = sync_match_result(ctx, match_id).await?;
            report.matches = 1;
            print_report(&format!("match {match_id} ({status})"), &report, as_json)
        }
    }
}

/// Handle `live`: poll until the round budget is spent or Ctrl-C.
pub async fn handle_live<T: Transport>(
    ctx: &AppContext<T>,
    interval: Duration,
    rounds: Option<u32>,
    as_json: bool,
) -> Result<()> {
    tracing::info!(
        interval_secs = interval.as_secs(),
        rounds = ?rounds,
        "starting live polling"
    );

    tokio::select! {
        summary = poll_live(ctx, interval, rounds) => {
            let summary = summary?;
            if as_json {
                common::print_json(&summary)?;
            } else {
                println!(
                    "Polled {} round(s): {} completed, {} still live, {} error(s)",
                    summary.rounds,
                    summary.completed.len(),
                    summary.tracked.len(),
                    summary.errors
                );
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupted, stopping live polling");
        }
    }
    Ok(())
}
