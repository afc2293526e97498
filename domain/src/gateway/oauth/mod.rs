//! OAuth authentication gateway.
//!
//! Re-exports OAuth types from badge-auth and provides the configured provider client.

pub mod auth0;

pub use badge_auth::oauth::{
    token::Tokens, AuthorizationRequest, PkceVerifier, Provider, State,
};
