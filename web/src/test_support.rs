//! Helpers for driving the full router in tests.

use crate::extractors::badge_session::BadgeSession;
use crate::AppState;
use axum::body::{to_bytes, Body};
use axum::extract::Query;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::routing::get as route_get;
use axum::Router;
use chrono::{Duration, Utc};
use clap::Parser;
use domain::oauth::AccessToken;
use serde::Deserialize;
use service::config::Config;
use tower::ServiceExt;

/// A config whose identity provider and IDEA API both point at `server_url`.
pub(crate) fn config(server_url: &str) -> Config {
    Config::parse_from([
        "genius_badge",
        "--client-id",
        "client-123",
        "--redirect-uri",
        "http://localhost:4000/callback",
        "--provider-url",
        server_url,
        "--api-url",
        server_url,
    ])
}

#[derive(Deserialize)]
struct SeedParams {
    expired: bool,
}

// Stands in for a completed sign-in without going through the provider.
async fn seed_access_token(session: BadgeSession, Query(params): Query<SeedParams>) -> StatusCode {
    let offset = if params.expired {
        Duration::hours(-1)
    } else {
        Duration::hours(1)
    };
    let token = AccessToken {
        value: "token-abc".to_string(),
        expires_at: Some(Utc::now() + offset),
    };
    match session.store_access_token(&token).await {
        Ok(()) => StatusCode::NO_CONTENT,
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn seed_completion_nonce(session: BadgeSession) -> Result<String, StatusCode> {
    session
        .completion_nonce()
        .await
        .map(|nonce| nonce.as_str().to_string())
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// The application with extra routes for seeding the session's access token and
/// completion nonce.
pub(crate) fn app(config: Config) -> Router {
    let app_state = AppState::new(config);
    let session_layer = crate::session_layer(&app_state.config);
    crate::router::define_routes(app_state)
        .route("/test/access-token", route_get(seed_access_token))
        .route("/test/completion-nonce", route_get(seed_completion_nonce))
        .layer(session_layer)
}

pub(crate) async fn get(app: &Router, uri: &str, cookie: Option<&str>) -> Response {
    let mut request = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    app.clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// A session cookie holding `token-abc`, already expired when `expired` is set.
pub(crate) async fn signed_in(app: &Router, expired: bool) -> String {
    let response = get(app, &format!("/test/access-token?expired={expired}"), None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    session_cookie(&response).unwrap()
}

/// A signed-in session cookie and the completion nonce its badge page would embed.
pub(crate) async fn signed_in_with_completion_nonce(app: &Router) -> (String, String) {
    let cookie = signed_in(app, false).await;
    let response = get(app, "/test/completion-nonce", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let nonce = body_string(response).await;
    (cookie, nonce)
}

/// The `name=value` pair of the Set-Cookie header, ready to send back.
pub(crate) fn session_cookie(response: &Response) -> Option<String> {
    let set_cookie = response.headers().get(header::SET_COOKIE)?.to_str().ok()?;
    set_cookie.split(';').next().map(str::to_string)
}

pub(crate) fn location(response: &Response) -> String {
    response.headers()[header::LOCATION]
        .to_str()
        .unwrap()
        .to_string()
}

pub(crate) async fn body_string(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
