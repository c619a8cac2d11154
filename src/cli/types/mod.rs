//! Type-safe wrappers and enums for Cricbuzz data.

pub mod ids;
pub mod role;
pub mod status;

pub use ids::{MatchId, PlayerId, SeriesId, TeamId, VenueId};
pub use role::PlayerRole;
pub use status::{MatchListKind, MatchStatus};
