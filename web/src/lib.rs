//! HTTP surface of the Genius Badge: the sign-in redirect, the OAuth callback, the
//! badge page and result reporting.

use axum::Router;
use log::*;
use service::config::Config;
use time::Duration;
use tokio::net::TcpListener;
use tower_sessions::cookie::SameSite;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

pub use self::error::{Error, Result};
pub use service::AppState;

mod controller;
mod error;
mod extractors;
mod router;
mod views;

#[cfg(test)]
mod test_support;

pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let interface = app_state
        .config
        .interface
        .clone()
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let listen_addr = format!("{}:{}", interface, app_state.config.port);

    info!("Server starting... listening for connections on http://{listen_addr}");

    let listener = TcpListener::bind(&listen_addr).await?;
    axum::serve(listener, app(app_state)).await
}

/// The complete application: every route behind the session layer.
pub fn app(app_state: AppState) -> Router {
    let session_layer = session_layer(&app_state.config);
    router::define_routes(app_state).layer(session_layer)
}

// Sessions live in memory: tokens are lost on restart and users simply sign in again.
// `Lax` is required so the cookie is sent on the provider's cross-site redirect to
// /callback.
fn session_layer(config: &Config) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_secure(config.is_production())
        .with_http_only(true)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(Duration::seconds(
            config.backend_session_expiry_seconds as i64,
        )))
}
