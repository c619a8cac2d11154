//! Query catalog commands.

use super::common::{print_json, render_table};
use crate::{
    storage::{
        catalog::{self, find_query},
        list_queries, CricketDatabase, QueryParams,
    },
    CricketError, Result,
};

/// Parse `name=value` pairs from the command line against query `id`.
pub fn parse_param_pairs(id: &str, pairs: &[String]) -> Result<QueryParams> {
    let query = find_query(id)?;
    pairs
        .iter()
        .map(|pair| {
            let (name, raw) = pair
                .split_once('=')
                .ok_or_else(|| CricketError::InvalidParameter {
                    name: pair.clone(),
                    reason: "expected name=value".to_string(),
                })?;
            query.parse_param(name.trim(), raw)
        })
        .collect()
}

pub fn handle_list_queries() {
    for query in list_queries() {
        println!("{:<24} {}", query.id, query.description);
    }
}

pub fn handle_show_query(id: &str) -> Result<()> {
    let query = find_query(id)?;
    println!("{}: {}", query.id, query.description);
    if query.params.is_empty() {
        println!("\nNo parameters.");
    } else {
        println!("\nParameters:");
        for p in query.params {
            let default = p
                .default
                .map(|d| format!(" (default {d})"))
                .unwrap_or_default();
            println!("  {:<12} {:<8} {}{}", p.name, p.kind, p.description, default);
        }
    }
    println!("\n{}", query.sql.trim());
    Ok(())
}

/// Run a catalog query and print the result as a table or JSON rows.
pub fn handle_run_query(
    db: &CricketDatabase,
    id: &str,
    pairs: &[String],
    limit: Option<usize>,
    as_json: bool,
) -> Result<()> {
    let params = parse_param_pairs(id, pairs)?;
    let result = catalog::run(db, id, &params, limit)?;

    if as_json {
        print_json(&result.to_json_rows())?;
    } else {
        println!("{}", render_table(&result));
        println!("\n{} row(s)", result.len());
    }
    Ok(())
}
