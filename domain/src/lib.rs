//! Business operations of the Genius Badge flow.
//!
//! `web` depends on this crate only; it never talks to `badge-auth` or to the IDEA API
//! directly. Errors from those layers are translated into `domain::error::Error`.

pub mod badge;
pub mod error;
pub mod gateway;
pub mod oauth;
pub mod profile;

pub use badge::BadgeResult;
pub use profile::UserProfile;
