//! Authorization-code flow operations: starting a sign-in and completing it on callback.

use crate::error::{DomainErrorKind, Error, InvalidErrorKind};
use crate::gateway::oauth::{self, Provider};
use badge_auth::oauth::token::is_expired_at;
use chrono::{DateTime, Utc};
use log::*;
use secrecy::ExposeSecret;
use service::config::Config;

pub use crate::gateway::oauth::{AuthorizationRequest, PkceVerifier, State};

/// The bearer token kept in the user's session after a successful exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessToken {
    pub value: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    pub fn is_expired(&self) -> bool {
        is_expired_at(self.expires_at, Utc::now())
    }
}

impl From<oauth::Tokens> for AccessToken {
    fn from(tokens: oauth::Tokens) -> Self {
        Self {
            value: tokens.access_token.expose_secret().to_string(),
            expires_at: tokens.expires_at,
        }
    }
}

/// An `error` returned by the provider on the callback instead of a code.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderError {
    pub error: String,
    pub description: Option<String>,
}

impl ProviderError {
    /// Whether the user simply has no session at the provider (`prompt=none`).
    pub fn is_login_required(&self) -> bool {
        matches!(
            self.error.as_str(),
            "login_required" | "interaction_required" | "consent_required"
        )
    }
}

/// Build the provider authorization request: a fresh anti-forgery state, a PKCE verifier,
/// and the URL that carries them. The caller must persist state and verifier before
/// redirecting.
pub fn authorization_request(config: &Config) -> Result<AuthorizationRequest, Error> {
    let provider = oauth::auth0::new_provider(config)?;
    let request = provider.authorization_request()?;
    debug!("Built authorization request for client {}", config.client_id());
    Ok(request)
}

/// Exchange the callback's authorization code for an access token.
///
/// `expected_state` is the value stored at the start of the flow; it must match
/// `received_state` or no exchange is attempted.
pub async fn complete_authorization(
    config: &Config,
    expected_state: &State,
    received_state: &str,
    code: &str,
    pkce_verifier: &PkceVerifier,
) -> Result<AccessToken, Error> {
    if !expected_state.verify(received_state) {
        warn!("OAuth state mismatch on callback");
        return Err(Error {
            source: Some("state mismatch".into()),
            error_kind: DomainErrorKind::Invalid(InvalidErrorKind::StateMismatch),
        });
    }

    let provider = oauth::auth0::new_provider(config)?;
    let tokens = provider
        .exchange_code(code, pkce_verifier)
        .await
        .inspect_err(|e| warn!("Failed to exchange OAuth code: {:?}", e))?;

    info!("Completed OAuth authorization");
    Ok(tokens.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use mockito::{Matcher, Server};

    fn config(provider_url: &str) -> Config {
        Config::parse_from([
            "genius_badge",
            "--client-id",
            "client-123",
            "--redirect-uri",
            "http://localhost:4000/callback",
            "--provider-url",
            provider_url,
        ])
    }

    #[test]
    fn test_authorization_request_targets_configured_provider() {
        let request = authorization_request(&config("https://idea.eu.auth0.com")).unwrap();
        assert!(request
            .url
            .starts_with("https://idea.eu.auth0.com/authorize?response_type=code"));
        assert!(request.url.contains("client_id=client-123"));
        assert!(request
            .url
            .contains(&format!("state={}", request.state.as_str())));
    }

    #[tokio::test]
    async fn test_complete_authorization_rejects_state_mismatch() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/oauth/token")
            .expect(0)
            .create_async()
            .await;

        let state = State::generate();
        let err = complete_authorization(
            &config(&server.url()),
            &state,
            "forged",
            "code",
            &PkceVerifier::generate(),
        )
        .await
        .unwrap_err();

        mock.assert_async().await;
        assert_eq!(
            err.error_kind,
            DomainErrorKind::Invalid(InvalidErrorKind::StateMismatch)
        );
    }

    #[tokio::test]
    async fn test_complete_authorization_returns_access_token() {
        let mut server = Server::new_async().await;
        let verifier = PkceVerifier::generate();
        let mock = server
            .mock("POST", "/oauth/token")
            .match_body(Matcher::UrlEncoded(
                "code_verifier".into(),
                verifier.as_str().into(),
            ))
            .with_status(200)
            .with_body(r#"{"access_token":"at-9","expires_in":3600}"#)
            .create_async()
            .await;

        let state = State::generate();
        let echoed = state.as_str().to_string();
        let token =
            complete_authorization(&config(&server.url()), &state, &echoed, "code", &verifier)
                .await
                .unwrap();

        mock.assert_async().await;
        assert_eq!(token.value, "at-9");
        assert!(!token.is_expired());
    }

    #[test]
    fn test_login_required_is_recognised() {
        let err = ProviderError {
            error: "login_required".to_string(),
            description: None,
        };
        assert!(err.is_login_required());

        let err = ProviderError {
            error: "access_denied".to_string(),
            description: Some("User cancelled".to_string()),
        };
        assert!(!err.is_login_required());
    }
}
