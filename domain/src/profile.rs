//! The authenticated user's profile, as returned by the IDEA API.

use crate::error::Error;
use crate::gateway::idea_api::IdeaApiClient;
use log::*;
use serde::{Deserialize, Serialize};
use service::config::Config;

/// Transient, read-only profile. Fields beyond these two are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub image_url: String,
}

/// Look up the profile of the user the bearer token was issued to.
pub async fn find_by_access_token(config: &Config, access_token: &str) -> Result<UserProfile, Error> {
    let client = IdeaApiClient::new(config)?;
    let profile = client.get_user(access_token).await?;
    debug!("Fetched profile for {}", profile.name);
    Ok(profile)
}
