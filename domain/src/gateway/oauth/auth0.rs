//! Auth0 OAuth client.
//!
//! Provides a configured Auth0 provider for domain operations.

use badge_auth::http::HttpClientBuilder;
use badge_auth::oauth::providers::auth0::{Provider as Auth0Provider, Settings};
use secrecy::SecretString;
use service::config::Config;

use crate::error::Error;

/// Create a new Auth0 provider from the client ID, secret, redirect URI and tenant URL in `config`.
pub fn new_provider(config: &Config) -> Result<Auth0Provider, Error> {
    let http_client = HttpClientBuilder::new()
        .with_timeout(config.http_timeout())
        .build()?;

    let settings = Settings {
        base_url: config.provider_url().to_string(),
        client_id: config.client_id().to_string(),
        client_secret: config.client_secret().map(SecretString::from),
        redirect_uri: config.redirect_uri().to_string(),
    };

    Ok(Auth0Provider::new(settings, http_client))
}
