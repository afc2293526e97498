use crate::extractors::badge_session::BadgeSession;
use crate::{AppState, Error};

use axum::extract::{Query, State};
use axum::http::Uri;
use axum::response::Redirect;
use log::*;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct LogoutParams {
    pub return_url: Option<String>,
}

/// Only same-origin paths are followed; anything else could bounce the user off-site.
///
/// Browsers drop tabs and newlines and treat `\` as `/` when they read a `Location`,
/// so any of those characters disqualifies the value.
fn is_local_path(url: &str) -> bool {
    if !url.starts_with('/') || url.starts_with("//") {
        return false;
    }
    if url.chars().any(|c| c.is_control() || c == '\\') {
        return false;
    }
    url.parse::<Uri>()
        .is_ok_and(|uri| uri.scheme().is_none() && uri.authority().is_none())
}

/// GET /logout
///
/// Destroys the session and its stored token, then redirects to `return_url` when it is
/// a local path, otherwise to the configured logout redirect.
#[utoipa::path(
    get,
    path = "/logout",
    params(
        ("return_url" = Option<String>, Query, description = "Local path to land on after logout"),
    ),
    responses(
        (status = 303, description = "Session destroyed, redirect to return_url"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn logout(
    State(app_state): State<AppState>,
    session: BadgeSession,
    Query(params): Query<LogoutParams>,
) -> Result<Redirect, Error> {
    session.clear().await?;

    let target = match params.return_url {
        Some(url) if is_local_path(&url) => url,
        Some(url) => {
            warn!("Ignoring non-local logout return_url {url:?}");
            app_state.config.logout_redirect_uri().to_string()
        }
        None => app_state.config.logout_redirect_uri().to_string(),
    };

    debug!("Logged out, redirecting to {target}");
    Ok(Redirect::to(&target))
}
