//! Cricbuzz endpoint catalogue and cache freshness classes.

use crate::cli::types::{MatchId, MatchListKind, PlayerId, TeamId};
use std::fmt;

/// Which TTL applies to an endpoint's cached responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Scores and match state; short TTL.
    Live,
    /// Teams, squads, profiles and series; long TTL.
    Static,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Matches(MatchListKind),
    MatchInfo(MatchId),
    Scorecard(MatchId),
    InternationalTeams,
    TeamPlayers(TeamId),
    PlayerProfile(PlayerId),
    PlayerBatting(PlayerId),
    PlayerBowling(PlayerId),
    PlayerSearch,
    InternationalSeries,
}

impl Endpoint {
    /// Path relative to the API base URL.
    pub fn path(&self) -> String {
        match self {
            Endpoint::Matches(kind) => format!("matches/v1/{}", kind.as_str()),
            Endpoint::MatchInfo(id) => format!("mcenter/v1/{id}"),
            Endpoint::Scorecard(id) => format!("mcenter/v1/{id}/scard"),
            Endpoint::InternationalTeams => "teams/v1/international".to_string(),
            Endpoint::TeamPlayers(id) => format!("teams/v1/{id}/players"),
            Endpoint::PlayerProfile(id) => format!("stats/v1/player/{id}"),
            Endpoint::PlayerBatting(id) => format!("stats/v1/player/{id}/batting"),
            Endpoint::PlayerBowling(id) => format!("stats/v1/player/{id}/bowling"),
            Endpoint::PlayerSearch => "stats/v1/player/search".to_string(),
            Endpoint::InternationalSeries => "series/v1/international".to_string(),
        }
    }

    pub fn freshness(&self) -> Freshness {
        match self {
            Endpoint::Matches(_) | Endpoint::MatchInfo(_) | Endpoint::Scorecard(_) => {
                Freshness::Live
            }
            _ => Freshness::Static,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
