//! OAuth token types.

use chrono::{DateTime, Duration, Utc};
use secrecy::SecretString;
use serde::Deserialize;

/// Raw body of a successful token endpoint response.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// OAuth tokens with metadata.
#[derive(Debug, Clone)]
pub struct Tokens {
    /// Access token for API requests.
    pub access_token: SecretString,
    /// When the access token expires.
    pub expires_at: Option<DateTime<Utc>>,
    /// Token type (usually "Bearer").
    pub token_type: String,
}

impl Tokens {
    /// Build tokens from a token endpoint response received at `issued_at`.
    pub fn from_response(response: TokenResponse, issued_at: DateTime<Utc>) -> Self {
        Self {
            access_token: SecretString::from(response.access_token),
            expires_at: response
                .expires_in
                .map(|secs| issued_at + Duration::seconds(secs)),
            token_type: response.token_type,
        }
    }
}

/// Whether a token expiring at `expires_at` is expired, or will be within a minute, at `now`.
/// A token without an expiry never expires.
pub fn is_expired_at(expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    expires_at
        .map(|expires| expires <= now + Duration::minutes(1))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn response(expires_in: Option<i64>) -> TokenResponse {
        TokenResponse {
            access_token: "test".to_string(),
            token_type: "Bearer".to_string(),
            expires_in,
        }
    }

    #[test]
    fn test_from_response_computes_expiry() {
        let now = Utc::now();
        let tokens = Tokens::from_response(response(Some(3600)), now);

        assert_eq!(tokens.access_token.expose_secret(), "test");
        assert_eq!(tokens.expires_at, Some(now + Duration::hours(1)));
        assert!(!is_expired_at(tokens.expires_at, now));
    }

    #[test]
    fn test_token_without_expiry_never_expires() {
        let tokens = Tokens::from_response(response(None), Utc::now());
        assert!(!is_expired_at(tokens.expires_at, Utc::now()));
    }

    #[test]
    fn test_token_expired() {
        let tokens = Tokens::from_response(response(Some(3600)), Utc::now() - Duration::hours(2));
        assert!(is_expired_at(tokens.expires_at, Utc::now()));
    }

    #[test]
    fn test_token_expiring_soon() {
        let now = Utc::now();
        assert!(is_expired_at(Some(now + Duration::seconds(30)), now));
    }

    #[test]
    fn test_token_type_defaults_to_bearer() {
        let parsed: TokenResponse = serde_json::from_str(r#"{"access_token":"abc"}"#).unwrap();
        assert_eq!(parsed.token_type, "Bearer");
        assert_eq!(parsed.expires_in, None);
    }
}
