//! HTTP header helpers for RapidAPI authentication

use crate::Result;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};

pub const RAPIDAPI_KEY_HEADER: &str = "x-rapidapi-key";
pub const RAPIDAPI_HOST_HEADER: &str = "x-rapidapi-host";

/// Build the RapidAPI auth headers.
///
/// Returns `Ok(None)` when no key is configured, so callers can decide whether
/// a network call is possible at all.
pub fn rapidapi_header_map(api_key: Option<&str>, host: &str) -> Result<Option<HeaderMap>> {
    let Some(key) = api_key else {
        return Ok(None);
    };

    let mut h = HeaderMap::new();
    h.insert(ACCEPT, HeaderValue::from_static("application/json"));
    h.insert(
        HeaderName::from_static(RAPIDAPI_KEY_HEADER),
        HeaderValue::from_str(key)?,
    );
    h.insert(
        HeaderName::from_static(RAPIDAPI_HOST_HEADER),
        HeaderValue::from_str(host)?,
    );
    Ok(Some(h))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CricketError;

    #[test]
    fn test_header_map_with_key() {
        let headers = rapidapi_header_map(Some("secret"), "cricbuzz-cricket.p.rapidapi.com")
            .unwrap()
            .unwrap();

        assert_eq!(headers.get(ACCEPT).unwrap(), "application/json");
        assert_eq!(headers.get(RAPIDAPI_KEY_HEADER).unwrap(), "secret");
        assert_eq!(
            headers.get(RAPIDAPI_HOST_HEADER).unwrap(),
            "cricbuzz-cricket.p.rapidapi.com"
        );
    }

    #[test]
    fn test_header_map_without_key() {
        let result = rapidapi_header_map(None, "cricbuzz-cricket.p.rapidapi.com").unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_header_map_rejects_bad_key() {
        let result = rapidapi_header_map(Some("bad\nkey"), "host");
        assert!(matches!(result, Err(CricketError::InvalidHeader(_))));
    }
}
