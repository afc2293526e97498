use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use domain::error::{
    DomainErrorKind, Error as DomainError, ExternalErrorKind, InternalErrorKind, InvalidErrorKind,
};
use domain::oauth::ProviderError;

use crate::views;

extern crate log;
use log::*;

pub type Result<T> = core::result::Result<T, Error>;

/// Every handler failure ends up here and is rendered as an HTML error page.
#[derive(Debug)]
pub enum Error {
    Domain(DomainError),
    Web(WebErrorKind),
}

#[derive(Debug, PartialEq)]
pub enum WebErrorKind {
    /// A query parameter is missing or has a value we do not accept.
    Input(&'static str),
    /// The callback arrived without a sign-in having been started in this session.
    NoPendingAuthorization,
    /// The completion link does not carry the nonce issued by this session's badge page.
    StaleCompletionLink,
    /// The identity provider answered the authorization request with an `error`.
    Provider(ProviderError),
    /// The session store could not be read or written.
    Session,
    /// A template failed to render.
    Render,
}

/// What the error page shows for a given failure.
struct ErrorPage {
    status: StatusCode,
    title: &'static str,
    message: String,
    retry_url: Option<&'static str>,
}

impl ErrorPage {
    fn new(status: StatusCode, title: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            title,
            message: message.into(),
            retry_url: None,
        }
    }

    fn with_sign_in_link(mut self) -> Self {
        self.retry_url = Some("/");
        self
    }
}

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

impl Error {
    fn page(&self) -> ErrorPage {
        match self {
            Error::Domain(err) => domain_error_page(&err.error_kind),
            Error::Web(kind) => web_error_page(kind),
        }
    }
}

fn domain_error_page(error_kind: &DomainErrorKind) -> ErrorPage {
    match error_kind {
        DomainErrorKind::Internal(internal_error_kind) => match internal_error_kind {
            InternalErrorKind::Config => ErrorPage::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Service misconfigured",
                "The badge service is not configured correctly.",
            ),
            InternalErrorKind::Other(_) => ErrorPage::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong",
                "An unexpected error occurred.",
            ),
        },
        DomainErrorKind::External(external_error_kind) => match external_error_kind {
            ExternalErrorKind::Unauthorized => ErrorPage::new(
                StatusCode::UNAUTHORIZED,
                "Sign-in required",
                "Your sign-in has expired or was rejected.",
            )
            .with_sign_in_link(),
            ExternalErrorKind::Network => ErrorPage::new(
                StatusCode::BAD_GATEWAY,
                "Service unavailable",
                "The IDEA service could not be reached.",
            ),
            ExternalErrorKind::Upstream(status) => ErrorPage::new(
                StatusCode::BAD_GATEWAY,
                "Service error",
                format!("The IDEA service returned an error (HTTP {status})."),
            ),
            ExternalErrorKind::InvalidResponse => ErrorPage::new(
                StatusCode::BAD_GATEWAY,
                "Service error",
                "The IDEA service sent a response we could not understand.",
            ),
        },
        DomainErrorKind::Invalid(InvalidErrorKind::StateMismatch) => ErrorPage::new(
            StatusCode::BAD_REQUEST,
            "Sign-in could not be verified",
            "The sign-in response did not match the request made from this browser.",
        )
        .with_sign_in_link(),
    }
}

fn web_error_page(kind: &WebErrorKind) -> ErrorPage {
    match kind {
        WebErrorKind::Input(message) => {
            ErrorPage::new(StatusCode::BAD_REQUEST, "Bad request", *message)
        }
        WebErrorKind::NoPendingAuthorization => ErrorPage::new(
            StatusCode::BAD_REQUEST,
            "Sign-in could not be verified",
            "No sign-in was started from this browser.",
        )
        .with_sign_in_link(),
        WebErrorKind::StaleCompletionLink => ErrorPage::new(
            StatusCode::FORBIDDEN,
            "Badge link expired",
            "This badge link is no longer valid. Open the badge page and try again.",
        ),
        WebErrorKind::Provider(provider_error) => {
            let message = match &provider_error.description {
                Some(description) => description.clone(),
                None if provider_error.is_login_required() => {
                    "You need to sign in to IDEA first.".to_string()
                }
                None => format!("Sign-in failed: {}", provider_error.error),
            };
            ErrorPage::new(StatusCode::UNAUTHORIZED, "Sign-in failed", message).with_sign_in_link()
        }
        WebErrorKind::Session => ErrorPage::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Something went wrong",
            "Your session could not be read.",
        ),
        WebErrorKind::Render => ErrorPage::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Something went wrong",
            "The page could not be rendered.",
        ),
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let page = self.page();
        if page.status.is_server_error() {
            error!("Responding with {}: {:?}", page.status, self);
        } else {
            warn!("Responding with {}: {:?}", page.status, self);
        }

        match views::error_page(page.title, &page.message, page.retry_url) {
            Ok(html) => (page.status, html).into_response(),
            Err(e) => {
                error!("Failed to render error page: {e:?}");
                plain_text_response(page.status, page.message)
            }
        }
    }
}

// The message can carry provider-supplied text, so it is never sent as unescaped HTML.
fn plain_text_response(status: StatusCode, message: String) -> Response {
    (status, message).into_response()
}

impl From<DomainError> for Error {
    fn from(err: DomainError) -> Self {
        Error::Domain(err)
    }
}

impl From<tower_sessions::session::Error> for Error {
    fn from(err: tower_sessions::session::Error) -> Self {
        error!("Session store error: {err:?}");
        Error::Web(WebErrorKind::Session)
    }
}
