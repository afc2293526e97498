//! HTML pages rendered with handlebars. Templates are compiled into the binary.
//!
//! Handlebars HTML-escapes every `{{value}}`, so profile data from the IDEA API
//! cannot inject markup into the page.

use std::sync::LazyLock;

use axum::response::Html;
use domain::UserProfile;
use handlebars::{Handlebars, TemplateError};
use log::*;
use serde_json::json;

use crate::error::{Error, WebErrorKind};

const BADGE_TEMPLATE: &str = "badge";
const ERROR_TEMPLATE: &str = "error";

static VIEWS: LazyLock<Result<Handlebars<'static>, TemplateError>> = LazyLock::new(|| {
    let mut registry = Handlebars::new();
    registry.register_template_string(BADGE_TEMPLATE, include_str!("../templates/badge.hbs"))?;
    registry.register_template_string(ERROR_TEMPLATE, include_str!("../templates/error.hbs"))?;
    Ok(registry)
});

fn render(template: &str, data: &serde_json::Value) -> Result<Html<String>, Error> {
    let registry = VIEWS.as_ref().map_err(|e| {
        error!("Failed to compile templates: {e:?}");
        Error::Web(WebErrorKind::Render)
    })?;

    registry.render(template, data).map(Html).map_err(|e| {
        error!("Failed to render {template} template: {e:?}");
        Error::Web(WebErrorKind::Render)
    })
}

/// The badge page: greeting, avatar and the link that completes the badge.
/// `completion_nonce` ties the link to the session that rendered the page.
pub fn badge_page(profile: &UserProfile, completion_nonce: &str) -> Result<Html<String>, Error> {
    render(
        BADGE_TEMPLATE,
        &json!({
            "name": profile.name,
            "image_url": profile.image_url,
            "completion_nonce": completion_nonce,
        }),
    )
}

/// An error page. `retry_url`, when given, is offered as a "sign in again" link.
pub fn error_page(
    title: &str,
    message: &str,
    retry_url: Option<&str>,
) -> Result<Html<String>, Error> {
    render(
        ERROR_TEMPLATE,
        &json!({
            "title": title,
            "message": message,
            "retry_url": retry_url,
        }),
    )
}
