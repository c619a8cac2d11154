use super::*;
use crate::config::{RateLimitPolicy, RetryPolicy};
use crate::cricbuzz::fake::FakeTransport;
use serde_json::json;
use std::sync::atomic::Ordering;

fn test_config() -> ApiConfig {
    ApiConfig {
        base_url: "https://cricbuzz.test".to_string(),
        api_key: Some("test-key".to_string()),
        retry: RetryPolicy {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(1),
        },
        ..ApiConfig::default()
    }
}

fn teams_json() -> Value {
    json!({"list": [{"teamId": 2, "teamName": "India", "teamSName": "IND"}]})
}

#[tokio::test(start_paused = true)]
async fn test_cache_hit_within_ttl_skips_network() {
    let transport = FakeTransport::new().respond("teams/v1/international", teams_json());
    let calls = transport.call_counter();
    let client = ApiClient::new(transport, test_config()).unwrap();

    let first = client.fetch(&Endpoint::InternationalTeams, &[]).await.unwrap();
    let second = client.fetch(&Endpoint::InternationalTeams, &[]).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(client.calls_made(), 1);
    let stats = client.cache_stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
}

#[tokio::test(start_paused = true)]
async fn test_live_entries_expire_after_live_ttl() {
    let transport = FakeTransport::new().respond("matches/v1/live", json!({"typeMatches": []}));
    let calls = transport.call_counter();
    let client = ApiClient::new(transport, test_config()).unwrap();
    let live = Endpoint::Matches(MatchListKind::Live);

    client.fetch(&live, &[]).await.unwrap();
    tokio::time::advance(Duration::from_secs(30)).await;
    client.fetch(&live, &[]).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    tokio::time::advance(Duration::from_secs(31)).await;
    client.fetch(&live, &[]).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_two_timeouts_then_success_makes_three_calls() {
    let transport = FakeTransport::new().script(
        "teams/v1/international",
        vec![
            Err(TransportError::Timeout),
            Err(TransportError::Timeout),
            Ok(teams_json()),
        ],
    );
    let calls = transport.call_counter();
    let client = ApiClient::new(transport, test_config()).unwrap();

    let teams = client.international_teams().await.unwrap();

    assert_eq!(teams.len(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(client.calls_made(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_retries_exhausted_reports_attempts() {
    let transport = FakeTransport::new().script(
        "teams/v1/international",
        vec![
            Err(TransportError::Status {
                status: 503,
                body: "unavailable".to_string(),
            }),
            Err(TransportError::Network("connection reset".to_string())),
            Err(TransportError::Timeout),
        ],
    );
    let calls = transport.call_counter();
    let client = ApiClient::new(transport, test_config()).unwrap();

    match client.fetch(&Endpoint::InternationalTeams, &[]).await {
        Err(CricketError::Api {
            endpoint, attempts, ..
        }) => {
            assert_eq!(endpoint, "teams/v1/international");
            assert_eq!(attempts, 3);
        }
        other => panic!("Expected Api error, got {:?}", other),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn test_failures_are_not_cached() {
    let transport = FakeTransport::new()
        .script(
            "teams/v1/international",
            vec![
                Err(TransportError::Timeout),
                Err(TransportError::Timeout),
                Err(TransportError::Timeout),
            ],
        )
        .respond("teams/v1/international", teams_json());
    let client = ApiClient::new(transport, test_config()).unwrap();

    assert!(client.fetch(&Endpoint::InternationalTeams, &[]).await.is_err());
    assert!(client.fetch(&Endpoint::InternationalTeams, &[]).await.is_ok());
    assert_eq!(client.calls_made(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_undecodable_body_is_not_retried() {
    let transport = FakeTransport::new().script(
        "teams/v1/international",
        vec![Err(TransportError::Body("expected value".to_string()))],
    );
    let calls = transport.call_counter();
    let client = ApiClient::new(transport, test_config()).unwrap();

    let result = client.fetch(&Endpoint::InternationalTeams, &[]).await;
    assert!(matches!(result, Err(CricketError::MalformedResponse { .. })));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_wrong_shape_is_malformed_response() {
    let transport = FakeTransport::new().respond(
        "matches/v1/recent",
        json!({"typeMatches": [{"seriesMatches": [{"seriesAdWrapper": {
            "matches": [{"matchInfo": {"matchId": 1}}]
        }}]}]}),
    );
    let client = ApiClient::new(transport, test_config()).unwrap();

    match client.matches(MatchListKind::Recent).await {
        Err(CricketError::MalformedResponse { endpoint, reason }) => {
            assert_eq!(endpoint, "matches/v1/recent");
            assert!(reason.contains("team1"), "reason was {reason}");
        }
        other => panic!("Expected MalformedResponse, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_missing_api_key_makes_no_calls() {
    let transport = FakeTransport::new().respond("teams/v1/international", teams_json());
    let calls = transport.call_counter();
    let config = ApiConfig {
        api_key: None,
        ..test_config()
    };
    let client = ApiClient::new(transport, config).unwrap();

    let result = client.fetch(&Endpoint::InternationalTeams, &[]).await;
    assert!(matches!(result, Err(CricketError::MissingApiKey)));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_spent_budget_fails_fast_but_cache_still_serves() {
    let transport = FakeTransport::new()
        .respond("teams/v1/international", teams_json())
        .respond("series/v1/international", json!({"seriesMapProto": []}));
    let calls = transport.call_counter();
    let config = ApiConfig {
        rate_limit: RateLimitPolicy {
            max_requests: 1,
            window: Duration::from_secs(60),
            max_wait: Some(Duration::ZERO),
        },
        ..test_config()
    };
    let client = ApiClient::new(transport, config).unwrap();

    client.fetch(&Endpoint::InternationalTeams, &[]).await.unwrap();

    let limited = client.fetch(&Endpoint::InternationalSeries, &[]).await;
    assert!(matches!(
        limited,
        Err(CricketError::RateLimitExceeded { .. })
    ));

    // cache hits do not consume budget
    client.fetch(&Endpoint::InternationalTeams, &[]).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_fetch_with_timeout_gives_up() {
    let transport = FakeTransport::new()
        .respond("teams/v1/international", teams_json())
        .with_delay(Duration::from_secs(30));
    let client = ApiClient::new(transport, test_config()).unwrap();

    let result = client
        .fetch_with_timeout(&Endpoint::InternationalTeams, &[], Duration::from_secs(2))
        .await;

    match result {
        Err(CricketError::Timeout { operation, after }) => {
            assert_eq!(operation, "fetch teams/v1/international");
            assert_eq!(after, Duration::from_secs(2));
        }
        other => panic!("Expected Timeout, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_query_params_reach_transport_and_key_cache() {
    let transport = FakeTransport::new().respond(
        "stats/v1/player/search",
        json!({"player": [{"id": "1413", "name": "Virat Kohli", "teamName": "India"}]}),
    );
    let queries = transport.query_log();
    let client = ApiClient::new(transport, test_config()).unwrap();

    let hits = client.search_players("Kohli").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, 1413);

    // a different search term is a different cache entry
    client.search_players("Sharma").await.unwrap();
    client.search_players("Kohli").await.unwrap();

    let queries = queries.lock().unwrap();
    assert_eq!(queries.len(), 2);
    assert_eq!(queries[0], vec![("plrN".to_string(), "Kohli".to_string())]);
    assert_eq!(queries[1], vec![("plrN".to_string(), "Sharma".to_string())]);
}

#[tokio::test(start_paused = true)]
async fn test_shared_cache_between_clients() {
    let config = test_config();
    let cache = Arc::new(ResponseCache::new(16));
    let limiter = Arc::new(RateLimiter::new(config.rate_limit.clone()));

    let first_transport = FakeTransport::new().respond("teams/v1/international", teams_json());
    let first = ApiClient::with_shared(
        first_transport,
        config.clone(),
        Arc::clone(&cache),
        Arc::clone(&limiter),
    )
    .unwrap();
    first.fetch(&Endpoint::InternationalTeams, &[]).await.unwrap();

    let second_transport = FakeTransport::new();
    let second_calls = second_transport.call_counter();
    let second = ApiClient::with_shared(second_transport, config, cache, limiter).unwrap();
    second.fetch(&Endpoint::InternationalTeams, &[]).await.unwrap();

    assert_eq!(second_calls.load(Ordering::SeqCst), 0);
}
