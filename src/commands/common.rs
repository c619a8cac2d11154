//! Shared context and output helpers for command handlers.

use crate::{
    config::AppConfig,
    cricbuzz::{ApiClient, ReqwestTransport, Transport},
    storage::{CricketDatabase, TabularResult},
    Result,
};
use serde::Serialize;
use std::sync::atomic::AtomicU64;
use std::time::Duration;

/// Upper bound for one blocking database job started from async code.
pub const DB_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Resources most commands need: the database pool and the API client.
pub struct AppContext<T = ReqwestTransport> {
    pub config: AppConfig,
    pub db: CricketDatabase,
    pub api: ApiClient<T>,
    /// API calls already added to the persisted counter.
    pub(crate) recorded_calls: AtomicU64,
}

impl AppContext<ReqwestTransport> {
    /// Open the database and build the production API client.
    pub fn new(config: AppConfig) -> Result<Self> {
        let db = CricketDatabase::open(&config.database)?;
        let api = ApiClient::from_config(config.api.clone())?;
        Ok(Self::from_parts(config, db, api))
    }
}

impl<T: Transport> AppContext<T> {
    /// Context over explicit parts.
    pub fn from_parts(config: AppConfig, db: CricketDatabase, api: ApiClient<T>) -> Self {
        Self {
            config,
            db,
            api,
            recorded_calls: AtomicU64::new(0),
        }
    }
}

/// Print a value as pretty JSON on stdout.
pub fn print_json<S: Serialize + ?Sized>(value: &S) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn pad_row(values: &[String], widths: &[usize]) -> String {
    values
        .iter()
        .zip(widths)
        .map(|(v, w)| format!("{v:<width$}", width = *w))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

/// Render a result as a plain-text table with padded columns.
pub fn render_table(result: &TabularResult) -> String {
    let cells: Vec<Vec<String>> = result
        .rows
        .iter()
        .map(|row| row.iter().map(|c| c.to_string()).collect())
        .collect();

    let widths: Vec<usize> = result
        .columns
        .iter()
        .enumerate()
        .map(|(i, name)| {
            cells
                .iter()
                .filter_map(|row| row.get(i))
                .map(|c| c.chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = Vec::with_capacity(cells.len() + 2);
    out.push(pad_row(&result.columns, &widths));
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push(pad_row(&rule, &widths));
    for row in &cells {
        out.push(pad_row(row, &widths));
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Cell;

    #[test]
    fn test_render_table_pads_columns() {
        let result = TabularResult {
            columns: vec!["name".to_string(), "total_runs".to_string()],
            rows: vec![
                vec![Cell::Text("Virat Kohli".to_string()), Cell::Integer(13848)],
                vec![Cell::Text("Rohit Sharma".to_string()), Cell::Null],
            ],
        };

        let table = render_table(&result);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "name          total_runs");
        assert_eq!(lines[1], "------------  ----------");
        assert_eq!(lines[2], "Virat Kohli   13848");
        assert_eq!(lines[3], "Rohit Sharma  NULL");
    }

    #[test]
    fn test_render_empty_result_keeps_header() {
        let result = TabularResult {
            columns: vec!["team_name".to_string()],
            rows: vec![],
        };
        assert_eq!(render_table(&result), "team_name\n---------");
    }
}
