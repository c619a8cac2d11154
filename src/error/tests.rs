//! Unit tests for error handling

use super::*;
use std::io;

#[cfg(test)]
mod cricket_error_tests {
    use super::*;

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let error = CricketError::from(json_error);

        match error {
            CricketError::Json(_) => (),
            _ => panic!("Expected Json error variant"),
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error = CricketError::from(io_error);

        match error {
            CricketError::Io(_) => (),
            _ => panic!("Expected Io error variant"),
        }
    }

    #[test]
    fn test_invalid_header_error_conversion() {
        let header_error = reqwest::header::HeaderValue::from_str("invalid\nheader").unwrap_err();
        let error = CricketError::from(header_error);

        match error {
            CricketError::InvalidHeader(_) => (),
            _ => panic!("Expected InvalidHeader error variant"),
        }
    }

    #[test]
    fn test_database_error_conversion() {
        let db_error = rusqlite::Error::InvalidColumnType(
            0,
            "test_column".to_string(),
            rusqlite::types::Type::Null,
        );
        let error = CricketError::from(db_error);

        match error {
            CricketError::Query(_) => (),
            _ => panic!("Expected Query error variant"),
        }
    }

    #[test]
    fn test_not_found_message() {
        let error = CricketError::NotFound {
            entity: "player",
            id: 42,
        };

        assert_eq!(error.to_string(), "player 42 not found");
        assert_eq!(error.user_message(), "No player with id 42.");
    }

    #[test]
    fn test_foreign_key_violation_message() {
        let error = CricketError::ForeignKeyViolation {
            entity: "player",
            id: 7,
            dependents: 3,
        };

        let error_string = error.to_string();
        assert!(error_string.contains("player 7"));
        assert!(error_string.contains("3 row(s)"));
        assert!(error.user_message().contains("cascade"));
    }

    #[test]
    fn test_rate_limit_message() {
        let error = CricketError::RateLimitExceeded {
            retry_after: Duration::from_millis(1500),
        };

        assert!(error.to_string().contains("1500ms"));
        assert!(error.is_retryable());
        assert!(error.user_message().ends_with("Please try again."));
    }

    #[test]
    fn test_api_error_suggests_retry() {
        let error = CricketError::Api {
            endpoint: "matches/v1/live".to_string(),
            attempts: 3,
            reason: "connection reset by peer".to_string(),
        };

        assert!(error.to_string().contains("3 attempt(s)"));
        let message = error.user_message();
        assert!(message.contains("matches/v1/live"));
        assert!(message.contains("Please try again."));
        assert!(!message.contains("connection reset"));
    }

    #[test]
    fn test_connection_error_suggests_retry() {
        let error = CricketError::Connection {
            message: "timed out waiting for connection".to_string(),
        };

        assert!(error.is_retryable());
        assert!(error.user_message().contains("Please try again."));
        assert!(!error.user_message().contains("timed out waiting"));
    }

    #[test]
    fn test_query_error_hides_driver_text() {
        let error = CricketError::Query(rusqlite::Error::InvalidQuery);

        assert!(!error.is_retryable());
        assert_eq!(error.user_message(), "The database rejected the request.");
    }

    #[test]
    fn test_invalid_parameter_error() {
        let error = CricketError::InvalidParameter {
            name: "limit".to_string(),
            reason: "expected an integer".to_string(),
        };

        let error_string = error.to_string();
        assert!(error_string.contains("limit"));
        assert!(error_string.contains("expected an integer"));
        assert!(!error.is_retryable());
    }

    #[test]
    fn test_timeout_message() {
        let error = CricketError::Timeout {
            operation: "fetch matches/v1/live".to_string(),
            after: Duration::from_millis(250),
        };

        assert_eq!(error.to_string(), "fetch matches/v1/live timed out after 250ms");
        assert!(error.is_retryable());
    }

    #[test]
    fn test_error_source_chain() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error = CricketError::from(io_error);

        let error_trait: &dyn std::error::Error = &error;
        assert!(error_trait.source().is_some());
    }

    #[test]
    fn test_error_debug_formatting() {
        let error = CricketError::MissingApiKey;
        let debug_string = format!("{:?}", error);
        assert_eq!(debug_string, "MissingApiKey");
    }

    #[test]
    fn test_result_type_alias_error() {
        fn test_function() -> Result<String> {
            Err(CricketError::UnknownQuery {
                id: "nope".to_string(),
            })
        }

        match test_function().unwrap_err() {
            CricketError::UnknownQuery { id } => assert_eq!(id, "nope"),
            _ => panic!("Expected UnknownQuery error"),
        }
    }
}
