use crate::error::Error;
use crate::extractors::RejectionType;
use axum::{extract::FromRequestParts, http::request::Parts};
use chrono::{DateTime, Utc};
use domain::oauth::{AccessToken, PkceVerifier, State};
use log::*;
use tower_sessions::Session;

const OAUTH2_STATE_KEY: &str = "oauth2_state";
const OAUTH2_PKCE_VERIFIER_KEY: &str = "oauth2_pkce_verifier";
const OAUTH2_ACCESS_TOKEN_KEY: &str = "oauth2_access_token";
const OAUTH2_ACCESS_TOKEN_EXPIRES_AT_KEY: &str = "oauth2_access_token_expires_at";
const BADGE_COMPLETION_NONCE_KEY: &str = "badge_completion_nonce";

/// Typed access to the values the badge flow keeps in the server-side session.
pub(crate) struct BadgeSession(Session);

impl<S> FromRequestParts<S> for BadgeSession
where
    S: Send + Sync,
{
    type Rejection = RejectionType;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(status, msg)| (status, msg.to_string()))?;
        Ok(BadgeSession(session))
    }
}

impl BadgeSession {
    /// Remember the state and PKCE verifier of a sign-in that is about to start.
    /// A sign-in already in progress is replaced.
    pub async fn begin_authorization(
        &self,
        state: &State,
        pkce_verifier: &PkceVerifier,
    ) -> Result<(), Error> {
        self.0.insert(OAUTH2_STATE_KEY, state.as_str()).await?;
        self.0
            .insert(OAUTH2_PKCE_VERIFIER_KEY, pkce_verifier.as_str())
            .await?;
        trace!("Stored pending authorization in session");
        Ok(())
    }

    /// Remove and return the pending sign-in. Each state can be redeemed once.
    pub async fn take_authorization(&self) -> Result<Option<(State, PkceVerifier)>, Error> {
        let state = self.0.remove::<String>(OAUTH2_STATE_KEY).await?;
        let pkce_verifier = self.0.remove::<String>(OAUTH2_PKCE_VERIFIER_KEY).await?;

        Ok(match (state, pkce_verifier) {
            (Some(state), Some(pkce_verifier)) => Some((
                State::from_string(state),
                PkceVerifier::from_string(pkce_verifier),
            )),
            _ => None,
        })
    }

    /// Store the token of a completed sign-in under a fresh session id.
    pub async fn store_access_token(&self, token: &AccessToken) -> Result<(), Error> {
        self.0.cycle_id().await?;
        self.0.insert(OAUTH2_ACCESS_TOKEN_KEY, &token.value).await?;
        self.0
            .insert(OAUTH2_ACCESS_TOKEN_EXPIRES_AT_KEY, token.expires_at)
            .await?;
        Ok(())
    }

    pub async fn access_token(&self) -> Result<Option<AccessToken>, Error> {
        let Some(value) = self.0.get::<String>(OAUTH2_ACCESS_TOKEN_KEY).await? else {
            return Ok(None);
        };
        let expires_at = self
            .0
            .get::<Option<DateTime<Utc>>>(OAUTH2_ACCESS_TOKEN_EXPIRES_AT_KEY)
            .await?
            .flatten();

        Ok(Some(AccessToken { value, expires_at }))
    }

    /// The nonce the badge page embeds in its completion link. Reloading the page reuses
    /// the pending nonce so links in other tabs stay valid.
    pub async fn completion_nonce(&self) -> Result<State, Error> {
        if let Some(nonce) = self.0.get::<String>(BADGE_COMPLETION_NONCE_KEY).await? {
            return Ok(State::from_string(nonce));
        }
        let nonce = State::generate();
        self.0
            .insert(BADGE_COMPLETION_NONCE_KEY, nonce.as_str())
            .await?;
        Ok(nonce)
    }

    /// Remove and return the pending completion nonce. Each nonce reports once.
    pub async fn take_completion_nonce(&self) -> Result<Option<State>, Error> {
        let nonce = self.0.remove::<String>(BADGE_COMPLETION_NONCE_KEY).await?;
        Ok(nonce.map(State::from_string))
    }

    /// Drop everything kept for this browser, including the session record itself.
    pub async fn clear(&self) -> Result<(), Error> {
        self.0.flush().await?;
        Ok(())
    }
}
