//! Error types for the `domain` layer.
use badge_auth::error::{
    Error as BadgeAuthError, ErrorKind as BadgeAuthErrorKind, HttpErrorKind, OAuthErrorKind,
};
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// Errors in the Domain layer are modeled as a tree structure
/// with `domain::error::Error` as the root type holding a tree of `error_kind`
/// enums that represent the kinds of errors that can occur in the domain layer or
/// in lower layers. The `source` field holds the original error. `web` matches on
/// `error_kind` to choose the status code and message of the rendered error page,
/// and never depends on `badge-auth` or `reqwest` directly.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
    External(ExternalErrorKind),
    Invalid(InvalidErrorKind),
}

/// The request reaching the domain layer cannot be acted on.
#[derive(Debug, PartialEq)]
pub enum InvalidErrorKind {
    /// The callback `state` does not match the one stored when the flow started.
    StateMismatch,
}

/// Enum representing the various kinds of internal errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    Config,
    Other(String),
}

/// Enum representing the kinds of failures of calls to the identity provider or the IDEA API.
#[derive(Debug, PartialEq)]
pub enum ExternalErrorKind {
    /// The request never produced a response (connection refused, DNS, timeout).
    Network,
    /// The upstream rejected the bearer token or authorization code (401/403).
    Unauthorized,
    /// Any other non-success status from the upstream.
    Upstream(u16),
    /// A success status whose body could not be decoded.
    InvalidResponse,
}

impl Error {
    pub fn external(error_kind: ExternalErrorKind, message: impl Into<String>) -> Self {
        let message: String = message.into();
        Error {
            source: Some(message.into()),
            error_kind: DomainErrorKind::External(error_kind),
        }
    }

    /// Classify a non-success HTTP status from an upstream service.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let kind = match status {
            401 | 403 => ExternalErrorKind::Unauthorized,
            _ => ExternalErrorKind::Upstream(status),
        };
        Self::external(kind, body)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Domain Error: {self:?}")
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // Errors that result from issues building the reqwest::Client instance. This
        // type of error will occur prior to any network calls being made.
        if err.is_builder() {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                    "Failed to build reqwest client".to_string(),
                )),
            }
        // Errors that result from issues with the network call itself.
        } else {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
            }
        }
    }
}

// This is where we translate errors from the `badge-auth` layer to the `domain` layer.
impl From<BadgeAuthError> for Error {
    fn from(err: BadgeAuthError) -> Self {
        let error_kind = match &err.error_kind {
            BadgeAuthErrorKind::Http(HttpErrorKind::BuilderFailed) => DomainErrorKind::Internal(
                InternalErrorKind::Other("Failed to build HTTP client".to_string()),
            ),
            BadgeAuthErrorKind::Http(_) => DomainErrorKind::External(ExternalErrorKind::Network),
            BadgeAuthErrorKind::OAuth(OAuthErrorKind::TokenExchangeFailed(401 | 403)) => {
                DomainErrorKind::External(ExternalErrorKind::Unauthorized)
            }
            BadgeAuthErrorKind::OAuth(OAuthErrorKind::TokenExchangeFailed(status)) => {
                DomainErrorKind::External(ExternalErrorKind::Upstream(*status))
            }
            BadgeAuthErrorKind::OAuth(OAuthErrorKind::InvalidResponse) => {
                DomainErrorKind::External(ExternalErrorKind::InvalidResponse)
            }
            BadgeAuthErrorKind::OAuth(OAuthErrorKind::InvalidEndpoint) => {
                DomainErrorKind::Internal(InternalErrorKind::Config)
            }
        };
        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}
