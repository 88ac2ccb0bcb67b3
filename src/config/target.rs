//! Derivation of backend URLs from the account target.
//!
//! A target such as `https://app.us1.example.com/` identifies the account's
//! backend. Anything with fewer than two `.` separators is rejected so a bare
//! host or a typo never becomes the API origin.

use crate::{Result, UpdaterError};
use reqwest::Url;

const STREAMING_PATH: &str = "/plsrws/v2";

/// Returns the API base URL for `target`, without trailing slashes.
pub fn api_url_for_config_check(target: &str) -> Result<String> {
    let trimmed = target.trim().trim_end_matches('/');

    if trimmed.matches('.').count() < 2 {
        return Err(UpdaterError::InvalidTarget(target.to_string()));
    }

    Ok(trimmed.to_string())
}

/// Returns the websocket URL used by streaming features such as synthetic
/// monitoring: `wss://{host}/plsrws/v2`.
pub fn streaming_url(target: &str) -> Result<String> {
    let url = Url::parse(target.trim())
        .map_err(|e| UpdaterError::InvalidTarget(format!("{}: {}", target, e)))?;

    let host = url
        .host_str()
        .ok_or_else(|| UpdaterError::InvalidTarget(target.to_string()))?;

    if host.matches('.').count() < 2 {
        return Err(UpdaterError::InvalidTarget(target.to_string()));
    }

    let port = url.port().or_else(|| {
        url.port_or_known_default()
            .filter(|p| raw_authority(target).ends_with(&format!(":{}", p)))
    });

    let authority = match port {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };

    Ok(format!("wss://{}{}", authority, STREAMING_PATH))
}

/// Authority as written in `target`, so an explicit default port survives.
fn raw_authority(target: &str) -> &str {
    let rest = target.trim().split_once("://").map_or("", |(_, rest)| rest);
    rest.split(['/', '?', '#']).next().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_targets() {
        let cases = [
            ("https://app.us1.example.com", "https://app.us1.example.com"),
            ("https://app.us1.example.com/", "https://app.us1.example.com"),
            ("https://app.us1.example.com//", "https://app.us1.example.com"),
            ("https://abc.middleware.io:443", "https://abc.middleware.io:443"),
        ];

        for (target, expected) in cases {
            let url = api_url_for_config_check(target).expect("valid target");
            assert_eq!(url, expected);
            assert!(!url.ends_with('/'));
        }
    }

    #[test]
    fn test_invalid_targets() {
        for target in ["", "localhost", "https://example.com", "https://example.com/", "a.b"] {
            let err = api_url_for_config_check(target).unwrap_err();
            assert!(matches!(err, UpdaterError::InvalidTarget(_)), "{target}");
        }
    }

    #[test]
    fn test_streaming_url() {
        assert_eq!(
            streaming_url("https://app.us1.example.com/").unwrap(),
            "wss://app.us1.example.com/plsrws/v2"
        );
        assert_eq!(
            streaming_url("https://app.us1.example.com:8443/some/path").unwrap(),
            "wss://app.us1.example.com:8443/plsrws/v2"
        );
        assert_eq!(
            streaming_url("https://app.us1.example.com:443").unwrap(),
            "wss://app.us1.example.com:443/plsrws/v2"
        );
        assert_eq!(
            streaming_url("https://app.us1.example.com/x:443").unwrap(),
            "wss://app.us1.example.com/plsrws/v2"
        );
    }

    #[test]
    fn test_streaming_url_rejects_short_host() {
        assert!(matches!(
            streaming_url("https://example.com"),
            Err(UpdaterError::InvalidTarget(_))
        ));
        assert!(matches!(
            streaming_url("not a url"),
            Err(UpdaterError::InvalidTarget(_))
        ));
    }
}
