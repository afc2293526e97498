use crate::controller::{
    badge_controller, health_check_controller, oauth_controller, user_session_controller,
};
use crate::AppState;
use axum::{routing::get, Router};

use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI document. To be a part
// of the rendered document, a path must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Genius Badge"
        ),
        paths(
            oauth_controller::authorize,
            oauth_controller::callback,
            badge_controller::show,
            badge_controller::complete,
            user_session_controller::logout,
            health_check_controller::health_check,
        ),
        modifiers(&SecurityAddon),
        tags(
            (name = "genius_badge", description = "IDEA Genius badge sign-in and completion pages")
        )
    )]
struct ApiDoc;

struct SecurityAddon;

// The badge pages read the access token from the server-side session named by the
// session cookie.
impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "cookie_auth",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "id",
                "Session id value returned via Set-Cookie after a completed sign-in",
            ))),
        )
    }
}

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(oauth_routes(app_state.clone()))
        .merge(badge_routes(app_state.clone()))
        .merge(user_session_routes(app_state))
        .merge(health_routes())
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/rapidoc"))
}

fn oauth_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(oauth_controller::authorize))
        .route("/callback", get(oauth_controller::callback))
        .with_state(app_state)
}

fn badge_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/badge", get(badge_controller::show))
        .route("/badge/completed", get(badge_controller::complete))
        .with_state(app_state)
}

fn user_session_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/logout", get(user_session_controller::logout))
        .with_state(app_state)
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}
