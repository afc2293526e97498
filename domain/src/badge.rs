//! Badge result reporting.

use crate::error::Error;
use crate::gateway::idea_api::IdeaApiClient;
use log::*;
use serde::{Deserialize, Serialize};
use service::config::Config;
use std::fmt;
use std::str::FromStr;

/// Outcome of the badge challenge, serialized as `"pass"` or `"fail"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeResult {
    Pass,
    Fail,
}

#[derive(Debug, PartialEq, Eq)]
pub struct BadgeResultParseError;

impl FromStr for BadgeResult {
    type Err = BadgeResultParseError;

    fn from_str(result: &str) -> Result<Self, Self::Err> {
        match result {
            "pass" => Ok(BadgeResult::Pass),
            "fail" => Ok(BadgeResult::Fail),
            _ => Err(BadgeResultParseError),
        }
    }
}

impl fmt::Display for BadgeResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BadgeResult::Pass => write!(f, "pass"),
            BadgeResult::Fail => write!(f, "fail"),
        }
    }
}

/// Report `result` for the user owning `access_token`.
///
/// The report is attempted once. A failure is returned to the caller, who must surface it.
pub async fn report(config: &Config, access_token: &str, result: BadgeResult) -> Result<(), Error> {
    let client = IdeaApiClient::new(config)?;

    client
        .submit_result(access_token, result)
        .await
        .inspect_err(|e| error!("Failed to report badge result {}: {:?}", result, e))?;

    info!("Reported badge result: {}", result);
    Ok(())
}
