//! Player lookups answered by the Cricbuzz API: search, profile and career
//! tables. Profiles are stored as they are fetched.

use super::common::{print_json, render_table, AppContext, DB_CALL_TIMEOUT};
use super::players::players_table;
use super::sync::record_api_calls;
use crate::{
    cli::types::PlayerId,
    cricbuzz::{
        types::{PlayerSearchHit, StatsTable},
        Transport,
    },
    storage::{Cell, Player, TabularResult},
    CricketError, Result,
};
use serde::Serialize;

/// Batting and bowling career tables, one column per format.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CareerStats {
    pub player_id: PlayerId,
    pub batting: TabularResult,
    pub bowling: TabularResult,
}

/// Lay a stats table out with a `stat` column followed by one column per
/// format. Short rows are padded with nulls.
pub fn stats_table(table: &StatsTable) -> TabularResult {
    let formats: Vec<String> = table.headers.iter().skip(1).cloned().collect();
    let columns: Vec<String> = std::iter::once("stat".to_string())
        .chain(formats.iter().cloned())
        .collect();
    let rows = table
        .values
        .iter()
        .filter(|row| !row.values.is_empty())
        .map(|row| {
            (0..columns.len())
                .map(|i| {
                    row.values
                        .get(i)
                        .map(|v| Cell::Text(v.clone()))
                        .unwrap_or(Cell::Null)
                })
                .collect()
        })
        .collect();
    TabularResult { columns, rows }
}

pub async fn search_players<T: Transport>(
    ctx: &AppContext<T>,
    name: &str,
) -> Result<Vec<PlayerSearchHit>> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CricketError::InvalidParameter {
            name: "name".to_string(),
            reason: "must not be blank".to_string(),
        });
    }
    let hits = ctx.api.search_players(name).await?;
    record_api_calls(ctx).await?;
    tracing::debug!(query = name, hits = hits.len(), "player search");
    Ok(hits)
}

/// Fetch a profile and store it. Stored fields the profile lacks, such as
/// the team, are kept.
pub async fn fetch_profile<T: Transport>(ctx: &AppContext<T>, id: PlayerId) -> Result<Player> {
    let player = ctx.api.player_profile(id).await?.to_player();
    let stored = ctx
        .db
        .call(DB_CALL_TIMEOUT, move |db| {
            db.upsert_player(&player)?;
            db.get_player(player.id)
        })
        .await?;
    record_api_calls(ctx).await?;
    tracing::info!(player_id = %id, name = %stored.name, "stored player profile");
    Ok(stored)
}

pub async fn player_stats<T: Transport>(ctx: &AppContext<T>, id: PlayerId) -> Result<CareerStats> {
    let batting = ctx.api.player_batting(id).await?;
    let bowling = ctx.api.player_bowling(id).await?;
    record_api_calls(ctx).await?;
    Ok(CareerStats {
        player_id: id,
        batting: stats_table(&batting),
        bowling: stats_table(&bowling),
    })
}

pub async fn handle_search_players<T: Transport>(
    ctx: &AppContext<T>,
    name: &str,
    as_json: bool,
) -> Result<()> {
    let hits = search_players(ctx, name).await?;
    if as_json {
        return print_json(&hits);
    }
    let table = TabularResult {
        columns: vec!["id".to_string(), "name".to_string(), "team".to_string()],
        rows: hits
            .iter()
            .map(|hit| {
                vec![
                    Cell::Integer(hit.id),
                    Cell::Text(hit.name.clone()),
                    hit.team_name.clone().map(Cell::Text).unwrap_or(Cell::Null),
                ]
            })
            .collect(),
    };
    println!("{}", render_table(&table));
    println!("\n{} match(es)", hits.len());
    Ok(())
}

pub async fn handle_player_profile<T: Transport>(
    ctx: &AppContext<T>,
    id: PlayerId,
    as_json: bool,
) -> Result<()> {
    let player = fetch_profile(ctx, id).await?;
    if as_json {
        print_json(&player)
    } else {
        println!("{}", render_table(&players_table(std::slice::from_ref(&player))));
        Ok(())
    }
}

pub async fn handle_player_stats<T: Transport>(
    ctx: &AppContext<T>,
    id: PlayerId,
    as_json: bool,
) -> Result<()> {
    let stats = player_stats(ctx, id).await?;
    if as_json {
        return print_json(&stats);
    }
    println!("Batting\n{}", render_table(&stats.batting));
    println!("\nBowling\n{}", render_table(&stats.bowling));
    Ok(())
}
