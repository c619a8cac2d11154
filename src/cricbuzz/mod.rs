//! Cricbuzz API access: endpoints, transport, client and payload types.

pub mod client;
pub mod endpoints;
pub mod scorecard;
pub mod transport;
pub mod types;

#[cfg(test)]
pub(crate) mod fake;

pub use client::ApiClient;
pub use endpoints::{Endpoint, Freshness};
pub use scorecard::{Scorecard, ScorecardRows};
pub use transport::{ReqwestTransport, Transport, TransportError};
