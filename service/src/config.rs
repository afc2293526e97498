use clap::builder::{NonEmptyStringValueParser, TypedValueParser as _};
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Auth0 tenant that fronts the IDEA identity service.
pub const DEFAULT_PROVIDER_URL: &str = "https://idea.eu.auth0.com";

/// Base URL of the IDEA API serving `/user` and `/result`.
pub const DEFAULT_API_URL: &str = "https://idea.org.uk/api";

#[derive(Clone, Debug, PartialEq)]
pub enum RustEnv {
    Development,
    Production,
    Staging,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RustEnvParseError;

impl FromStr for RustEnv {
    type Err = RustEnvParseError;
    fn from_str(level: &str) -> Result<RustEnv, Self::Err> {
        match level.to_lowercase().as_str() {
            "development" => Ok(RustEnv::Development),
            "production" => Ok(RustEnv::Production),
            "staging" => Ok(RustEnv::Staging),
            _ => Err(RustEnvParseError),
        }
    }
}

impl fmt::Display for RustEnv {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RustEnv::Development => write!(f, "development"),
            RustEnv::Production => write!(f, "production"),
            RustEnv::Staging => write!(f, "staging"),
        }
    }
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// The OAuth client ID registered with the identity provider.
    #[arg(long, env = "GENIUS_BADGE_CLIENT_ID", value_parser = NonEmptyStringValueParser::new())]
    client_id: String,

    /// The callback URL the identity provider redirects back to after authorization.
    #[arg(long, env = "GENIUS_BADGE_REDIRECT_URI", value_parser = NonEmptyStringValueParser::new())]
    redirect_uri: String,

    /// The OAuth client secret. Leave unset to exchange codes as a public client (PKCE only).
    #[arg(long, env = "GENIUS_BADGE_CLIENT_SECRET", hide_env_values = true)]
    client_secret: Option<String>,

    /// Base URL of the identity provider (serves /authorize and /oauth/token).
    #[arg(long, env = "GENIUS_BADGE_PROVIDER_URL", default_value = DEFAULT_PROVIDER_URL)]
    provider_url: String,

    /// Base URL of the IDEA API (serves /user and /result).
    /// Override in tests to point at a mock server.
    #[arg(long, env = "GENIUS_BADGE_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Where /logout sends the browser when no usable return_url is given.
    #[arg(long, env, default_value = "/")]
    logout_redirect_uri: String,

    /// Timeout in seconds for every outbound HTTP request
    #[arg(long, env, default_value_t = 30)]
    pub http_timeout_secs: u64,

    /// The host interface to listen for incoming connections
    #[arg(short, long, env, default_value = "127.0.0.1")]
    pub interface: Option<String>,

    /// The host TCP port to listen for incoming connections
    #[arg(short, long, env, default_value_t = 4000)]
    pub port: u16,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,

    /// Set the Rust runtime environment to use.
    #[arg(
    short,
    long,
    env,
    default_value_t = RustEnv::Development,
    value_parser = clap::builder::PossibleValuesParser::new([
        "DEVELOPMENT", "PRODUCTION", "STAGING",
        "development", "production", "staging"
    ])
        .map(|s| s.parse::<RustEnv>().unwrap()),
    )]
    pub runtime_env: RustEnv,

    /// Session expiry duration in seconds (default: 24 hours = 86400 seconds)
    #[arg(long, env, default_value_t = 86400)]
    pub backend_session_expiry_seconds: u64,
}

impl Config {
    /// Loads `.env`, then parses flags and environment. Exits the process with a
    /// usage error when a required value (client ID, redirect URI) is missing or empty.
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    pub fn client_secret(&self) -> Option<String> {
        self.client_secret.clone()
    }

    pub fn provider_url(&self) -> &str {
        &self.provider_url
    }

    /// Returns the IDEA API base URL.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn set_api_url(mut self, api_url: String) -> Self {
        self.api_url = api_url;
        self
    }

    pub fn set_provider_url(mut self, provider_url: String) -> Self {
        self.provider_url = provider_url;
        self
    }

    pub fn logout_redirect_uri(&self) -> &str {
        &self.logout_redirect_uri
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn runtime_env(&self) -> RustEnv {
        self.runtime_env.clone()
    }

    pub fn is_production(&self) -> bool {
        self.runtime_env() == RustEnv::Production
    }
}
