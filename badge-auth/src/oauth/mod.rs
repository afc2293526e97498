//! OAuth 2.0 authorization-code flow with PKCE and anti-forgery state.

mod pkce;
mod provider;
mod state;

pub mod providers;
pub mod token;

pub use pkce::{PkceChallenge, PkceVerifier};
pub use provider::{AuthorizationRequest, Provider};
pub use state::State;
