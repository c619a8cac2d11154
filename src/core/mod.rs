//! Core utilities shared by the API client
//!
//! - `cache`: TTL-aware in-memory response cache
//! - `http`: RapidAPI header construction
//! - `rate_limit`: per-key sliding-window request budget

pub mod cache;
pub mod http;
pub mod rate_limit;

pub use cache::{CacheStats, RequestKey, ResponseCache};
pub use http::rapidapi_header_map;
pub use rate_limit::RateLimiter;
