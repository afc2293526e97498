//! IDEA API client.
//!
//! Every call authenticates with the user's bearer token and branches on the response
//! status before touching the body: a non-success response is always an `Err`, never
//! decoded as a success payload.

use crate::badge::BadgeResult;
use crate::error::{DomainErrorKind, Error, ExternalErrorKind};
use crate::profile::UserProfile;
use badge_auth::http::HttpClientBuilder;
use log::*;
use serde::Serialize;
use service::config::Config;

/// Body of `POST /result`.
#[derive(Debug, Serialize)]
pub struct ResultReport {
    pub result: BadgeResult,
}

/// Client for the IDEA API endpoints used by the badge flow.
pub struct IdeaApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl IdeaApiClient {
    /// Create a new client against the API base URL in `config`.
    pub fn new(config: &Config) -> Result<Self, Error> {
        let client = HttpClientBuilder::new()
            .with_timeout(config.http_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_url().trim_end_matches('/').to_string(),
        })
    }

    /// `GET /user`: the profile of the user the token was issued to.
    pub async fn get_user(&self, access_token: &str) -> Result<UserProfile, Error> {
        let url = format!("{}/user", self.base_url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await
            .inspect_err(|e| warn!("Failed to reach IDEA user endpoint: {:?}", e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!("IDEA user endpoint returned {}: {}", status, error_text);
            return Err(Error::from_status(status.as_u16(), error_text));
        }

        response.json::<UserProfile>().await.map_err(|e| {
            warn!("Failed to parse IDEA user profile: {:?}", e);
            Error {
                source: Some(Box::new(e)),
                error_kind: DomainErrorKind::External(ExternalErrorKind::InvalidResponse),
            }
        })
    }

    /// `POST /result`: record the badge outcome for the token's user.
    ///
    /// Sent exactly once; the caller decides what to do with a failure.
    pub async fn submit_result(&self, access_token: &str, result: BadgeResult) -> Result<(), Error> {
        let url = format!("{}/result", self.base_url);
        let report = ResultReport { result };

        debug!("Submitting badge result: {}", result);

        let response = self
            .client
            .post(&url)
            .bearer_auth(access_token)
            .json(&report)
            .send()
            .await
            .inspect_err(|e| warn!("Failed to reach IDEA result endpoint: {:?}", e))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            warn!("IDEA result endpoint returned {}: {}", status, body);
            return Err(Error::from_status(status.as_u16(), body));
        }

        debug!("IDEA result endpoint accepted report ({}): {}", status, body);
        Ok(())
    }
}
