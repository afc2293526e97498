//! OAuth provider trait and types.

use async_trait::async_trait;

use super::token::Tokens;
use super::{PkceVerifier, State};
use crate::error::Error;

/// Authorization request with URL and the secrets the caller must keep until the callback.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    /// Authorization URL to redirect the user to.
    pub url: String,
    /// Anti-forgery state embedded in `url`.
    pub state: State,
    /// PKCE verifier whose challenge is embedded in `url`.
    pub pkce_verifier: PkceVerifier,
}

/// Trait for OAuth 2.0 authorization-code providers.
///
/// Implementations handle:
/// - Authorization URL generation with state and PKCE
/// - Authorization code exchange for tokens
#[async_trait]
pub trait Provider: Send + Sync {
    /// Generate a fresh state and PKCE pair and the authorization URL that carries them.
    fn authorization_request(&self) -> Result<AuthorizationRequest, Error>;

    /// Exchange an authorization code for tokens.
    ///
    /// # Arguments
    ///
    /// * `code` - Authorization code from the OAuth callback
    /// * `pkce_verifier` - The verifier generated with the authorization request
    async fn exchange_code(&self, code: &str, pkce_verifier: &PkceVerifier)
        -> Result<Tokens, Error>;
}
