//! OAuth provider implementations.

pub mod auth0;
