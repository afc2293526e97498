pub(crate) mod badge_session;

use axum::http::StatusCode;

type RejectionType = (StatusCode, String);
