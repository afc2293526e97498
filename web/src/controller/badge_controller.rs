use crate::error::WebErrorKind;
use crate::extractors::badge_session::BadgeSession;
use crate::{views, AppState, Error};

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Redirect, Response};

use domain::oauth::AccessToken;
use domain::{badge, profile, BadgeResult};
use log::*;
use serde::Deserialize;

/// Query parameters for completing the badge.
#[derive(Debug, Deserialize)]
pub struct CompletedParams {
    pub result: Option<String>,
    pub nonce: Option<String>,
}

/// The session's access token, or `None` when the browser must sign in (again).
async fn usable_access_token(session: &BadgeSession) -> Result<Option<AccessToken>, Error> {
    match session.access_token().await? {
        Some(token) if token.is_expired() => {
            info!("Access token in session has expired");
            session.clear().await?;
            Ok(None)
        }
        token => Ok(token),
    }
}

/// GET /badge
///
/// Shows the signed-in user's name and avatar with the link that completes the badge.
#[utoipa::path(
    get,
    path = "/badge",
    responses(
        (status = 200, description = "Badge page with the user's name and avatar", body = String),
        (status = 303, description = "No usable access token, redirect to sign in"),
        (status = 401, description = "The IDEA API rejected the access token"),
        (status = 502, description = "The IDEA API failed or could not be reached"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn show(
    State(app_state): State<AppState>,
    session: BadgeSession,
) -> Result<Response, Error> {
    let Some(token) = usable_access_token(&session).await? else {
        return Ok(Redirect::to("/").into_response());
    };

    let profile = profile::find_by_access_token(&app_state.config, &token.value).await?;
    let completion_nonce = session.completion_nonce().await?;

    Ok(views::badge_page(&profile, completion_nonce.as_str())?.into_response())
}

/// GET /badge/completed
///
/// Reports the badge result to the IDEA API, then signs the user out. Only links
/// rendered by this session's badge page are honoured.
#[utoipa::path(
    get,
    path = "/badge/completed",
    params(
        ("result" = Option<String>, Query, description = "pass (default) or fail"),
        ("nonce" = Option<String>, Query, description = "Completion nonce from the badge page"),
    ),
    responses(
        (status = 303, description = "Result recorded, redirect to logout"),
        (status = 400, description = "Unknown result value"),
        (status = 401, description = "The IDEA API rejected the access token"),
        (status = 403, description = "Missing or stale completion nonce"),
        (status = 502, description = "The IDEA API failed or could not be reached"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn complete(
    State(app_state): State<AppState>,
    session: BadgeSession,
    Query(params): Query<CompletedParams>,
) -> Result<Response, Error> {
    let result = match params.result.as_deref() {
        None => BadgeResult::Pass,
        Some(value) => value.parse::<BadgeResult>().map_err(|_| {
            warn!("Rejected badge result {value:?}");
            Error::Web(WebErrorKind::Input("The result must be pass or fail."))
        })?,
    };

    let Some(token) = usable_access_token(&session).await? else {
        return Ok(Redirect::to("/").into_response());
    };

    let expected_nonce = session.take_completion_nonce().await?;
    let nonce_matches = match (expected_nonce, params.nonce.as_deref()) {
        (Some(expected), Some(received)) => expected.verify(received),
        _ => false,
    };
    if !nonce_matches {
        warn!("Refused badge completion without a valid nonce");
        return Err(Error::Web(WebErrorKind::StaleCompletionLink));
    }

    badge::report(&app_state.config, &token.value, result).await?;

    Ok(Redirect::to("/logout?return_url=/").into_response())
}
