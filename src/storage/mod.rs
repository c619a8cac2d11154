//! Storage layer for the cricket statistics database
//!
//! - `models`: Data structures
//! - `schema`: Pooled connections and schema management
//! - `queries`: Typed create/read/update/delete operations
//! - `catalog`: Named analytical queries with typed parameters

pub mod catalog;
pub mod models;
pub mod queries;
pub mod schema;


pub use catalog::{list_queries, ParamKind, ParamValue, QueryDef, QueryParams};
pub use models::*;
pub use schema::CricketDatabase;
