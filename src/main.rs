//! Entry point: parse CLI and dispatch to command handlers.

use clap::Parser;
use cricbuzz_stats::{
    cli::{delete_mode, Commands, CricbuzzCli, PlayersCmd, QueriesCmd, TeamsCmd},
    commands::{
        handle_live, handle_sync,
        lookup::{handle_player_profile, handle_player_stats, handle_search_players},
        players::{
            handle_create_player, handle_delete_player, handle_get_player, handle_list_players,
            handle_list_teams, handle_update_player,
        },
        queries::{handle_list_queries, handle_run_query, handle_show_query},
        status::handle_status,
        AppContext,
    },
    config::AppConfig,
    storage::{CricketDatabase, PlayerFilter},
    PlayerId, Result,
};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("cricbuzz_stats=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(app: CricbuzzCli) -> Result<()> {
    let mut config = AppConfig::from_env()?;
    if let Some(path) = app.db {
        config.database.path = path;
    }

    match app.command {
        Commands::Queries { cmd } => match cmd {
            QueriesCmd::List => handle_list_queries(),
            QueriesCmd::Show { id } => handle_show_query(&id)?,
            QueriesCmd::Run {
                id,
                params,
                limit,
                json,
            } => {
                let db = CricketDatabase::open(&config.database)?;
                handle_run_query(&db, &id, &params, limit, json)?
            }
        },

        Commands::Players { cmd } => match cmd {
            PlayersCmd::List {
                name,
                team_id,
                role,
                json,
            } => {
                let db = CricketDatabase::open(&config.database)?;
                let filter = PlayerFilter {
                    name_contains: name,
                    team_id,
                    role,
                };
                handle_list_players(&db, &filter, json)?
            }
            PlayersCmd::Get { id, json } => {
                let db = CricketDatabase::open(&config.database)?;
                handle_get_player(&db, PlayerId::new(id), json)?
            }
            PlayersCmd::Create { name, fields, json } => {
                let db = CricketDatabase::open(&config.database)?;
                handle_create_player(&db, &fields.into_new_player(name), json)?
            }
            PlayersCmd::Update {
                id,
                name,
                fields,
                clear_team,
                clear_details,
                json,
            } => {
                let db = CricketDatabase::open(&config.database)?;
                let update = fields.into_update(name, clear_team, clear_details);
                handle_update_player(&db, PlayerId::new(id), &update, json)?
            }
            PlayersCmd::Delete { id, cascade } => {
                let db = CricketDatabase::open(&config.database)?;
                handle_delete_player(&db, PlayerId::new(id), delete_mode(cascade))?
            }
            PlayersCmd::Search { name, json } => {
                let ctx = AppContext::new(config)?;
                handle_search_players(&ctx, &name, json).await?
            }
            PlayersCmd::Profile { id, json } => {
                let ctx = AppContext::new(config)?;
                handle_player_profile(&ctx, PlayerId::new(id), json).await?
            }
            PlayersCmd::Stats { id, json } => {
                let ctx = AppContext::new(config)?;
                handle_player_stats(&ctx, PlayerId::new(id), json).await?
            }
        },

        Commands::Teams {
            cmd: TeamsCmd::List { json },
        } => {
            let db = CricketDatabase::open(&config.database)?;
            handle_list_teams(&db, json)?
        }

        Commands::Sync { cmd, json } => {
            let ctx = AppContext::new(config)?;
            handle_sync(&ctx, cmd, json).await?
        }

        Commands::Live {
            interval,
            rounds,
            json,
        } => {
            let interval = interval
                .map(Duration::from_secs)
                .unwrap_or(config.refresh_interval);
            let ctx = AppContext::new(config)?;
            handle_live(&ctx, interval, rounds, json).await?
        }

        Commands::Status { json } => {
            let db = CricketDatabase::open(&config.database)?;
            handle_status(&db, &config, json)?
        }
    }

    Ok(())
}

/// Run the CLI.
#[tokio::main]
async fn main() {
    init_tracing();
    let app = CricbuzzCli::parse();

    if let Err(e) = run(app).await {
        tracing::debug!(error = ?e, "command failed");
        eprintln!("Error: {}", e.user_message());
        std::process::exit(1);
    }
}
