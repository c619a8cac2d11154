//! Cached, rate-limited, retrying client for the Cricbuzz API.
//!
//! A `fetch` goes through three layers in order:
//!
//! 1. the response cache, keyed by endpoint and sorted query parameters; a
//!    fresh hit returns without touching the network or the request budget;
//! 2. the per-key rate limiter, consulted once for every attempt;
//! 3. the transport, retried with exponential backoff on timeouts, network
//!    failures and non-2xx statuses.
//!
//! Only successful responses are cached.

use super::endpoints::{Endpoint, Freshness};
use super::scorecard::Scorecard;
use super::transport::{ReqwestTransport, Transport, TransportError};
use super::types::{
    MatchCentre, MatchListResponse, MatchSummary, PlayerProfile, PlayerSearchHit,
    PlayerSearchResponse, SeriesListResponse, SeriesSummary, SquadPlayer, SquadResponse,
    StatsTable, TeamListResponse,
};
use crate::cli::types::{MatchId, MatchListKind, PlayerId, TeamId};
use crate::config::ApiConfig;
use crate::core::{rapidapi_header_map, CacheStats, RateLimiter, RequestKey, ResponseCache};
use crate::error::{CricketError, Result};
use crate::storage::models::Team;
use backon::{ExponentialBuilder, Retryable};
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Why one attempt failed. Only transport failures are retried; a spent
/// request budget ends the fetch immediately.
#[derive(Error, Debug)]
enum AttemptError {
    #[error(transparent)]
    Limited(CricketError),
    #[error(transparent)]
    Transport(TransportError),
}

impl AttemptError {
    fn is_transient(&self) -> bool {
        match self {
            AttemptError::Limited(_) => false,
            AttemptError::Transport(e) => e.is_transient(),
        }
    }
}

pub struct ApiClient<T = ReqwestTransport> {
    transport: T,
    config: ApiConfig,
    headers: Option<HeaderMap>,
    cache: Arc<ResponseCache>,
    limiter: Arc<RateLimiter>,
    calls_made: AtomicU64,
}

impl ApiClient<ReqwestTransport> {
    /// Client with the production transport.
    pub fn from_config(config: ApiConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(config.request_timeout)?;
        Self::new(transport, config)
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T, config: ApiConfig) -> Result<Self> {
        let cache = Arc::new(ResponseCache::new(config.cache_capacity));
        let limiter = Arc::new(RateLimiter::new(config.rate_limit.clone()));
        Self::with_shared(transport, config, cache, limiter)
    }

    /// Client that shares its cache and request budget with other clients.
    pub fn with_shared(
        transport: T,
        config: ApiConfig,
        cache: Arc<ResponseCache>,
        limiter: Arc<RateLimiter>,
    ) -> Result<Self> {
        let headers = rapidapi_header_map(config.api_key.as_deref(), &config.host)?;
        Ok(Self {
            transport,
            config,
            headers,
            cache,
            limiter,
            calls_made: AtomicU64::new(0),
        })
    }

    /// Number of HTTP attempts issued so far, retries included.
    pub fn calls_made(&self) -> u64 {
        self.calls_made.load(Ordering::Relaxed)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.cache
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn ttl(&self, endpoint: &Endpoint) -> Duration {
        match endpoint.freshness() {
            Freshness::Live => self.config.live_ttl,
            Freshness::Static => self.config.static_ttl,
        }
    }

    /// Fetch `endpoint` as raw JSON.
    pub async fn fetch(&self, endpoint: &Endpoint, params: &[(&str, &str)]) -> Result<Value> {
        let key = RequestKey::new(&endpoint.path(), params);
        if let Some(value) = self.cache.get_fresh(&key, self.ttl(endpoint)) {
            tracing::debug!(endpoint = %key.endpoint, "cache hit");
            return Ok(value);
        }

        let value = self.fetch_uncached(&key).await?;
        self.cache.put(key, value.clone());
        Ok(value)
    }

    /// `fetch` with an overall deadline covering every attempt and backoff.
    pub async fn fetch_with_timeout(
        &self,
        endpoint: &Endpoint,
        params: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<Value> {
        tokio::time::timeout(timeout, self.fetch(endpoint, params))
            .await
            .map_err(|_| CricketError::Timeout {
                operation: format!("fetch {endpoint}"),
                after: timeout,
            })?
    }

    /// Fetch and decode into `D`. A payload of the wrong shape is a
    /// `MalformedResponse`.
    pub async fn fetch_as<D: DeserializeOwned>(
        &self,
        endpoint: &Endpoint,
        params: &[(&str, &str)],
    ) -> Result<D> {
        let value = self.fetch(endpoint, params).await?;
        serde_json::from_value(value).map_err(|e| CricketError::MalformedResponse {
            endpoint: endpoint.path(),
            reason: e.to_string(),
        })
    }

    async fn fetch_uncached(&self, key: &RequestKey) -> Result<Value> {
        let headers = self.headers.as_ref().ok_or(CricketError::MissingApiKey)?;
        let api_key = self.config.api_key.as_deref().unwrap_or_default();
        let url = format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            key.endpoint
        );
        let url = url.as_str();

        let retry = &self.config.retry;
        let backoff = ExponentialBuilder::default()
            .with_min_delay(retry.initial_backoff)
            .with_max_delay(retry.max_backoff)
            .with_factor(2.0)
            .with_max_times(retry.max_attempts.saturating_sub(1) as usize);

        let attempts = AtomicU32::new(0);
        let attempts_ref = &attempts;

        let result = (|| async move {
            self.limiter
                .acquire(api_key)
                .await
                .map_err(AttemptError::Limited)?;
            let attempt = attempts_ref.fetch_add(1, Ordering::Relaxed) + 1;
            self.calls_made.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(endpoint = %key.endpoint, attempt, "GET");
            self.transport
                .get_json(url, &key.params, headers)
                .await
                .map_err(AttemptError::Transport)
        })
        .retry(backoff)
        .when(AttemptError::is_transient)
        .notify(|err: &AttemptError, delay: Duration| {
            tracing::warn!(
                endpoint = %key.endpoint,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "request failed; retrying"
            );
        })
        .await;

        match result {
            Ok(value) => Ok(value),
            Err(AttemptError::Limited(e)) => Err(e),
            Err(AttemptError::Transport(TransportError::Body(reason))) => {
                Err(CricketError::MalformedResponse {
                    endpoint: key.endpoint.clone(),
                    reason,
                })
            }
            Err(AttemptError::Transport(e)) => {
                let attempts = attempts.load(Ordering::Relaxed);
                tracing::error!(endpoint = %key.endpoint, attempts, error = %e, "request failed");
                Err(CricketError::Api {
                    endpoint: key.endpoint.clone(),
                    attempts,
                    reason: e.to_string(),
                })
            }
        }
    }

    // -----------------------------------------------------------------------
    // Typed helpers
    // -----------------------------------------------------------------------

    pub async fn matches(&self, kind: MatchListKind) -> Result<Vec<MatchSummary>> {
        let list: MatchListResponse = self.fetch_as(&Endpoint::Matches(kind), &[]).await?;
        Ok(list.into_summaries())
    }

    pub async fn match_centre(&self, match_id: MatchId) -> Result<MatchCentre> {
        self.fetch_as(&Endpoint::MatchInfo(match_id), &[]).await
    }

    pub async fn scorecard(&self, match_id: MatchId) -> Result<Scorecard> {
        self.fetch_as(&Endpoint::Scorecard(match_id), &[]).await
    }

    pub async fn international_teams(&self) -> Result<Vec<Team>> {
        let list: TeamListResponse = self.fetch_as(&Endpoint::InternationalTeams, &[]).await?;
        Ok(list.into_teams())
    }

    pub async fn team_players(&self, team_id: TeamId) -> Result<Vec<SquadPlayer>> {
        let squad: SquadResponse = self.fetch_as(&Endpoint::TeamPlayers(team_id), &[]).await?;
        Ok(squad.into_players())
    }

    pub async fn player_profile(&self, player_id: PlayerId) -> Result<PlayerProfile> {
        self.fetch_as(&Endpoint::PlayerProfile(player_id), &[])
            .await
    }

    pub async fn player_batting(&self, player_id: PlayerId) -> Result<StatsTable> {
        self.fetch_as(&Endpoint::PlayerBatting(player_id), &[])
            .await
    }

    pub async fn player_bowling(&self, player_id: PlayerId) -> Result<StatsTable> {
        self.fetch_as(&Endpoint::PlayerBowling(player_id), &[])
            .await
    }

    pub async fn search_players(&self, name: &str) -> Result<Vec<PlayerSearchHit>> {
        let hits: PlayerSearchResponse = self
            .fetch_as(&Endpoint::PlayerSearch, &[("plrN", name)])
            .await?;
        Ok(hits.player)
    }

    pub async fn international_series(&self) -> Result<Vec<SeriesSummary>> {
        let list: SeriesListResponse = self.fetch_as(&Endpoint::InternationalSeries, &[]).await?;
        Ok(list.into_series())
    }
}

#[cfg(test)]
mod tests;
