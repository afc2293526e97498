//! Auth0 OAuth provider implementation.
//!
//! The IDEA identity service is an Auth0 tenant. Authorization requests ask for
//! `scope=openid` with `prompt=none`, so a user without an existing provider session
//! comes back on the callback with `error=login_required` instead of a code.

use async_trait::async_trait;
use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{oauth_error, Error, OAuthErrorKind};
use crate::oauth::token::{TokenResponse, Tokens};
use crate::oauth::{AuthorizationRequest, PkceVerifier, State};

const AUTHORIZE_PATH: &str = "/authorize";
const TOKEN_PATH: &str = "/oauth/token";
const SCOPE: &str = "openid";
const PROMPT: &str = "none";

/// Auth0 client settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Tenant base URL, e.g. `https://idea.eu.auth0.com`.
    pub base_url: String,
    pub client_id: String,
    /// Only sent when configured; public clients rely on PKCE alone.
    pub client_secret: Option<SecretString>,
    pub redirect_uri: String,
}

/// Form body for the authorization-code grant.
#[derive(Serialize)]
struct TokenExchangeRequest<'a> {
    grant_type: &'static str,
    client_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_secret: Option<&'a str>,
    code: &'a str,
    redirect_uri: &'a str,
    code_verifier: &'a str,
}

/// Auth0 OAuth provider.
pub struct Provider {
    settings: Settings,
    http_client: reqwest::Client,
}

impl Provider {
    /// Create a new Auth0 provider using the given HTTP client for token exchange.
    pub fn new(settings: Settings, http_client: reqwest::Client) -> Self {
        Self {
            settings,
            http_client,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.settings.base_url.trim_end_matches('/'), path)
    }

    /// Build the authorization URL for an already generated state and verifier.
    pub fn authorization_url(
        &self,
        state: &State,
        pkce_verifier: &PkceVerifier,
    ) -> Result<String, Error> {
        let challenge = pkce_verifier.challenge();
        let url = Url::parse_with_params(
            &self.endpoint(AUTHORIZE_PATH),
            &[
                ("response_type", "code"),
                ("client_id", self.settings.client_id.as_str()),
                ("redirect_uri", self.settings.redirect_uri.as_str()),
                ("prompt", PROMPT),
                ("scope", SCOPE),
                ("state", state.as_str()),
                ("code_challenge", challenge.as_str()),
                ("code_challenge_method", challenge.method()),
            ],
        )
        .map_err(|e| Error {
            source: Some(Box::new(e)),
            error_kind: crate::ErrorKind::OAuth(OAuthErrorKind::InvalidEndpoint),
        })?;

        Ok(url.into())
    }
}

#[async_trait]
impl crate::oauth::Provider for Provider {
    fn authorization_request(&self) -> Result<AuthorizationRequest, Error> {
        let state = State::generate();
        let pkce_verifier = PkceVerifier::generate();
        let url = self.authorization_url(&state, &pkce_verifier)?;

        Ok(AuthorizationRequest {
            url,
            state,
            pkce_verifier,
        })
    }

    async fn exchange_code(
        &self,
        code: &str,
        pkce_verifier: &PkceVerifier,
    ) -> Result<Tokens, Error> {
        let request = TokenExchangeRequest {
            grant_type: "authorization_code",
            client_id: &self.settings.client_id,
            client_secret: self
                .settings
                .client_secret
                .as_ref()
                .map(|s| s.expose_secret().as_str()),
            code,
            redirect_uri: &self.settings.redirect_uri,
            code_verifier: pkce_verifier.as_str(),
        };

        debug!("Exchanging authorization code for tokens");

        let response = self
            .http_client
            .post(self.endpoint(TOKEN_PATH))
            .form(&request)
            .send()
            .await
            .inspect_err(|e| warn!("Token endpoint request failed: {:?}", e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!("Token endpoint returned {}: {}", status, error_text);
            return Err(oauth_error(
                OAuthErrorKind::TokenExchangeFailed(status.as_u16()),
                &error_text,
            ));
        }

        let body: TokenResponse = response.json().await.map_err(|e| {
            warn!("Failed to parse token response: {:?}", e);
            Error {
                source: Some(Box::new(e)),
                error_kind: crate::ErrorKind::OAuth(OAuthErrorKind::InvalidResponse),
            }
        })?;

        info!("Exchanged authorization code for tokens");
        Ok(Tokens::from_response(body, Utc::now()))
    }
}
