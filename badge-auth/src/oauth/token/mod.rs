//! OAuth token types.

mod tokens;

pub use tokens::{is_expired_at, TokenResponse, Tokens};
