//! Controller for the sign-in half of the badge flow.
//!
//! Both endpoints are reached through browser redirects, so failures are rendered as
//! HTML error pages rather than JSON.

use crate::error::WebErrorKind;
use crate::extractors::badge_session::BadgeSession;
use crate::{AppState, Error};

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Redirect};

use domain::oauth::{self, ProviderError};
use log::*;
use serde::Deserialize;

/// Query parameters the identity provider sends back to the callback.
#[derive(Debug, Deserialize)]
pub struct OAuthCallback {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// GET /
///
/// Starts a sign-in: stores a fresh state and PKCE verifier in the session and
/// redirects the browser to the identity provider.
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 307, description = "Redirect to the identity provider's authorization endpoint"),
        (status = 500, description = "Sign-in could not be started"),
    )
)]
pub async fn authorize(
    State(app_state): State<AppState>,
    session: BadgeSession,
) -> Result<impl IntoResponse, Error> {
    let request = oauth::authorization_request(&app_state.config)?;
    session
        .begin_authorization(&request.state, &request.pkce_verifier)
        .await?;

    debug!("Redirecting to identity provider");
    Ok(Redirect::temporary(&request.url))
}

/// GET /callback
///
/// Completes a sign-in: checks the state, exchanges the code for an access token and
/// keeps the token in the session.
#[utoipa::path(
    get,
    path = "/callback",
    params(
        ("code" = Option<String>, Query, description = "Authorization code from the identity provider"),
        ("state" = Option<String>, Query, description = "State echoed back from the authorization request"),
        ("error" = Option<String>, Query, description = "Error code when authorization was refused"),
        ("error_description" = Option<String>, Query, description = "Human readable error description"),
    ),
    responses(
        (status = 303, description = "Redirect to the badge page on success"),
        (status = 400, description = "Missing parameters or state mismatch"),
        (status = 401, description = "Authorization refused by the identity provider"),
        (status = 502, description = "Token exchange failed"),
    )
)]
pub async fn callback(
    State(app_state): State<AppState>,
    session: BadgeSession,
    Query(params): Query<OAuthCallback>,
) -> Result<impl IntoResponse, Error> {
    // Consumed up front so a state is never redeemed twice, even when this callback fails.
    let pending = session.take_authorization().await?;

    if let Some(error) = params.error {
        return Err(Error::Web(WebErrorKind::Provider(ProviderError {
            error,
            description: params.error_description,
        })));
    }

    let code = params
        .code
        .ok_or(Error::Web(WebErrorKind::Input("Missing authorization code.")))?;
    let received_state = params
        .state
        .ok_or(Error::Web(WebErrorKind::Input("Missing state parameter.")))?;
    let (expected_state, pkce_verifier) =
        pending.ok_or(Error::Web(WebErrorKind::NoPendingAuthorization))?;

    let token = oauth::complete_authorization(
        &app_state.config,
        &expected_state,
        &received_state,
        &code,
        &pkce_verifier,
    )
    .await?;

    session.store_access_token(&token).await?;

    Ok(Redirect::to("/badge"))
}

#[cfg(test)]
mod tests {
    use crate::test_support;
    use axum::http::{header, StatusCode};
    use mockito::{Matcher, Server};
    use url::Url;

    fn query_param(location: &str, name: &str) -> Option<String> {
        Url::parse(location)
            .unwrap()
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    #[tokio::test]
    async fn test_authorize_redirects_with_fresh_state() {
        let server = Server::new_async().await;
        let app = test_support::app(test_support::config(&server.url()));

        let first = test_support::get(&app, "/", None).await;
        let second = test_support::get(&app, "/", None).await;

        assert!(first.status().is_redirection());
        assert!(test_support::session_cookie(&first).is_some());

        let first_location = test_support::location(&first);
        let second_location = test_support::location(&second);
        assert!(first_location.starts_with(&format!("{}/authorize?", server.url())));
        assert_eq!(
            query_param(&first_location, "response_type").as_deref(),
            Some("code")
        );
        assert_eq!(query_param(&first_location, "scope").as_deref(), Some("openid"));
        assert_eq!(query_param(&first_location, "prompt").as_deref(), Some("none"));
        assert_eq!(
            query_param(&first_location, "code_challenge_method").as_deref(),
            Some("S256")
        );

        let first_state = query_param(&first_location, "state").unwrap();
        let second_state = query_param(&second_location, "state").unwrap();
        assert!(!first_state.is_empty());
        assert_ne!(first_state, second_state);
    }

    #[tokio::test]
    async fn test_callback_exchanges_code_and_redirects_to_badge() {
        let mut server = Server::new_async().await;
        let app = test_support::app(test_support::config(&server.url()));

        let start = test_support::get(&app, "/", None).await;
        let cookie = test_support::session_cookie(&start).unwrap();
        let state = query_param(&test_support::location(&start), "state").unwrap();

        let token_mock = server
            .mock("POST", "/oauth/token")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("grant_type".into(), "authorization_code".into()),
                Matcher::UrlEncoded("code".into(), "code-1".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"access_token":"token-abc","token_type":"Bearer","expires_in":3600}"#)
            .expect(1)
            .create_async()
            .await;

        let uri = format!("/callback?code=code-1&state={state}");
        let response = test_support::get(&app, &uri, Some(&cookie)).await;

        token_mock.assert_async().await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/badge");

        // The signed-in session lives under a new id.
        let signed_in = test_support::session_cookie(&response).unwrap();
        assert_ne!(signed_in, cookie);

        // The state has been consumed and cannot be replayed.
        let replay = test_support::get(&app, &uri, Some(&signed_in)).await;
        assert_eq!(replay.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_callback_rejects_state_mismatch_without_exchange() {
        let mut server = Server::new_async().await;
        let app = test_support::app(test_support::config(&server.url()));
        let token_mock = server
            .mock("POST", "/oauth/token")
            .expect(0)
            .create_async()
            .await;

        let start = test_support::get(&app, "/", None).await;
        let cookie = test_support::session_cookie(&start).unwrap();

        let response =
            test_support::get(&app, "/callback?code=code-1&state=forged", Some(&cookie)).await;

        token_mock.assert_async().await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_callback_without_started_sign_in_is_rejected() {
        let server = Server::new_async().await;
        let app = test_support::app(test_support::config(&server.url()));

        let response = test_support::get(&app, "/callback?code=code-1&state=abc", None).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_callback_provider_error_renders_sign_in_link() {
        let server = Server::new_async().await;
        let app = test_support::app(test_support::config(&server.url()));

        let start = test_support::get(&app, "/", None).await;
        let cookie = test_support::session_cookie(&start).unwrap();

        let response = test_support::get(
            &app,
            "/callback?error=login_required&error_description=Login%20required",
            Some(&cookie),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = test_support::body_string(response).await;
        assert!(body.contains("Login required"));
        assert!(body.contains(r#"href="/""#));
    }

    #[tokio::test]
    async fn test_callback_missing_code_is_bad_request() {
        let server = Server::new_async().await;
        let app = test_support::app(test_support::config(&server.url()));

        let start = test_support::get(&app, "/", None).await;
        let cookie = test_support::session_cookie(&start).unwrap();
        let state = query_param(&test_support::location(&start), "state").unwrap();

        let response =
            test_support::get(&app, &format!("/callback?state={state}"), Some(&cookie)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_callback_token_endpoint_failure_is_bad_gateway() {
        let mut server = Server::new_async().await;
        let app = test_support::app(test_support::config(&server.url()));
        let _token_mock = server
            .mock("POST", "/oauth/token")
            .with_status(500)
            .with_body("internal error")
            .create_async()
            .await;

        let start = test_support::get(&app, "/", None).await;
        let cookie = test_support::session_cookie(&start).unwrap();
        let state = query_param(&test_support::location(&start), "state").unwrap();

        let response = test_support::get(
            &app,
            &format!("/callback?code=code-1&state={state}"),
            Some(&cookie),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = test_support::body_string(response).await;
        assert!(!body.contains("Welcome,"));
    }
}
