//! # badge-auth
//!
//! OAuth 2.0 plumbing for the Genius Badge flow:
//! - Anti-forgery `state` generation and verification
//! - PKCE verifier/challenge pairs (RFC 7636, S256)
//! - The `Provider` trait and the Auth0 implementation used by the IDEA identity service
//! - Token types returned from the authorization-code exchange
//! - HTTP client building with timeout and user agent defaults
//!
//! ## Usage
//!
//! ```rust,ignore
//! use badge_auth::{
//!     oauth::{providers::auth0, PkceVerifier, Provider, State},
//!     http::HttpClientBuilder,
//! };
//! ```

pub mod error;
pub mod http;
pub mod oauth;

// Re-export commonly used types
pub use error::{Error, ErrorKind};
