//! Player and team record commands.

use super::common::{print_json, render_table};
use crate::{
    cli::types::PlayerId,
    storage::{
        Cell, CricketDatabase, DeleteMode, NewPlayer, Player, PlayerFilter, PlayerUpdate,
        TabularResult, Team,
    },
    Result,
};

fn opt_text(value: &Option<String>) -> Cell {
    value.clone().map(Cell::Text).unwrap_or(Cell::Null)
}

/// Lay players out as a table.
pub fn players_table(players: &[Player]) -> TabularResult {
    TabularResult {
        columns: ["id", "name", "team_id", "country", "role", "batting", "bowling"]
            .iter()
            .map(|c| c.to_string())
            .collect(),
        rows: players
            .iter()
            .map(|p| {
                vec![
                    Cell::Integer(p.id.as_i64()),
                    Cell::Text(p.name.clone()),
                    p.team_id
                        .map(|t| Cell::Integer(t.as_i64()))
                        .unwrap_or(Cell::Null),
                    opt_text(&p.country),
                    p.role
                        .map(|r| Cell::Text(r.to_string()))
                        .unwrap_or(Cell::Null),
                    opt_text(&p.batting_style),
                    opt_text(&p.bowling_style),
                ]
            })
            .collect(),
    }
}

pub fn teams_table(teams: &[Team]) -> TabularResult {
    TabularResult {
        columns: ["id", "name", "short_name", "country"]
            .iter()
            .map(|c| c.to_string())
            .collect(),
        rows: teams
            .iter()
            .map(|t| {
                vec![
                    Cell::Integer(t.id.as_i64()),
                    Cell::Text(t.name.clone()),
                    opt_text(&t.short_name),
                    opt_text(&t.country),
                ]
            })
            .collect(),
    }
}

fn print_player(player: &Player, as_json: bool) -> Result<()> {
    if as_json {
        print_json(player)
    } else {
        println!("{}", render_table(&players_table(std::slice::from_ref(player))));
        Ok(())
    }
}

pub fn handle_list_players(db: &CricketDatabase, filter: &PlayerFilter, as_json: bool) -> Result<()> {
    let players = db.list_players(filter)?;
    if as_json {
        print_json(&players)?;
    } else {
        println!("{}", render_table(&players_table(&players)));
        println!("\n{} player(s)", players.len());
    }
    Ok(())
}

pub fn handle_get_player(db: &CricketDatabase, id: PlayerId, as_json: bool) -> Result<()> {
    print_player(&db.get_player(id)?, as_json)
}

pub fn handle_create_player(db: &CricketDatabase, new: &NewPlayer, as_json: bool) -> Result<()> {
    let player = db.create_player(new)?;
    tracing::info!(player_id = %player.id, name = %player.name, "created player");
    print_player(&player, as_json)
}

pub fn handle_update_player(
    db: &CricketDatabase,
    id: PlayerId,
    update: &PlayerUpdate,
    as_json: bool,
) -> Result<()> {
    let player = db.update_player(id, update)?;
    tracing::info!(player_id = %id, "updated player");
    print_player(&player, as_json)
}

pub fn handle_delete_player(db: &CricketDatabase, id: PlayerId, mode: DeleteMode) -> Result<()> {
    db.delete_player(id, mode)?;
    tracing::info!(player_id = %id, ?mode, "deleted player");
    println!("Deleted player {id}");
    Ok(())
}

pub fn handle_list_teams(db: &CricketDatabase, as_json: bool) -> Result<()> {
    let teams = db.list_teams()?;
    if as_json {
        print_json(&teams)?;
    } else {
        println!("{}", render_table(&teams_table(&teams)));
    }
    Ok(())
}
