//! Configuration for IGA platform API access.
//!
//! Settings are resolved from `IGA_*` environment variables with sensible
//! defaults, or built programmatically via the `with_*` builders.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{IgaError, IgaResult};

/// Environment variable holding the base URL of the IGA platform API.
pub const ENV_API_URL: &str = "IGA_API_URL";
/// Environment variable holding the bearer token.
pub const ENV_API_KEY: &str = "IGA_API_KEY";
/// Environment variable holding the optional organization id.
pub const ENV_ORG_ID: &str = "IGA_ORG_ID";
/// Environment variable overriding the request timeout in seconds.
pub const ENV_TIMEOUT: &str = "IGA_TIMEOUT";
/// Environment variable overriding the maximum retry attempts.
pub const ENV_MAX_RETRIES: &str = "IGA_MAX_RETRIES";
/// Environment variable overriding the base retry delay in seconds.
pub const ENV_RETRY_DELAY: &str = "IGA_RETRY_DELAY";
/// Environment variable overriding the pagination page size.
pub const ENV_PAGE_SIZE: &str = "IGA_PAGE_SIZE";
/// Environment variable overriding the post-request throttle delay in seconds.
pub const ENV_RATE_LIMIT_DELAY: &str = "IGA_RATE_LIMIT_DELAY";
/// Environment variable overriding the consecutive 429 cap.
pub const ENV_RATE_LIMIT_MAX_RETRIES: &str = "IGA_RATE_LIMIT_MAX_RETRIES";

/// Connection and retry settings for an IGA platform API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IgaConfig {
    /// Base URL of the IGA platform API (e.g. `https://console.jumpcloud.com/api`).
    pub api_url: String,

    /// API key sent as a bearer token on every request.
    pub api_key: String,

    /// Organization id sent in the `x-org-id` header when present.
    #[serde(default)]
    pub org_id: Option<String>,

    /// Request timeout in seconds (default: 30).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum attempts for requests that time out or fail to connect (default: 3).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay in seconds between retries, multiplied by the attempt
    /// number for linear backoff (default: 2).
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,

    /// Number of records requested per page (default: 100).
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Pause in seconds after every successful call, to self-throttle
    /// (default: 0.5). Zero disables the pause.
    #[serde(default = "default_rate_limit_delay_secs")]
    pub rate_limit_delay_secs: f64,

    /// Maximum consecutive 429 responses tolerated for a single request
    /// before giving up (default: 10).
    #[serde(default = "default_rate_limit_max_retries")]
    pub rate_limit_max_retries: u32,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_secs() -> u64 {
    2
}

fn default_page_size() -> u32 {
    100
}

fn default_rate_limit_delay_secs() -> f64 {
    0.5
}

fn default_rate_limit_max_retries() -> u32 {
    10
}

impl IgaConfig {
    /// Creates a configuration with required fields and default tuning.
    #[must_use]
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            api_key: api_key.into(),
            org_id: None,
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_delay_secs: default_retry_delay_secs(),
            page_size: default_page_size(),
            rate_limit_delay_secs: default_rate_limit_delay_secs(),
            rate_limit_max_retries: default_rate_limit_max_retries(),
        }
    }

    /// Creates a configuration optimized for testing (no throttling, no backoff).
    #[must_use]
    pub fn for_testing(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            api_key: "test-api-key".to_string(),
            org_id: None,
            timeout_secs: 5,
            max_retries: 3,
            retry_delay_secs: 0,
            page_size: 100,
            rate_limit_delay_secs: 0.0,
            rate_limit_max_retries: 3,
        }
    }

    /// Resolves the configuration from `IGA_*` environment variables.
    ///
    /// `IGA_API_URL` and `IGA_API_KEY` are required; everything else falls
    /// back to its default when unset or empty. A variable set to a value
    /// that does not parse is a configuration error, not a silent default.
    pub fn from_env() -> IgaResult<Self> {
        let api_url = require_env(ENV_API_URL)?;
        let api_key = require_env(ENV_API_KEY)?;

        let config = Self {
            api_url,
            api_key,
            org_id: optional_env(ENV_ORG_ID),
            timeout_secs: parse_setting(ENV_TIMEOUT, optional_env(ENV_TIMEOUT), default_timeout_secs())?,
            max_retries: parse_setting(
                ENV_MAX_RETRIES,
                optional_env(ENV_MAX_RETRIES),
                default_max_retries(),
            )?,
            retry_delay_secs: parse_setting(
                ENV_RETRY_DELAY,
                optional_env(ENV_RETRY_DELAY),
                default_retry_delay_secs(),
            )?,
            page_size: parse_setting(ENV_PAGE_SIZE, optional_env(ENV_PAGE_SIZE), default_page_size())?,
            rate_limit_delay_secs: parse_setting(
                ENV_RATE_LIMIT_DELAY,
                optional_env(ENV_RATE_LIMIT_DELAY),
                default_rate_limit_delay_secs(),
            )?,
            rate_limit_max_retries: parse_setting(
                ENV_RATE_LIMIT_MAX_RETRIES,
                optional_env(ENV_RATE_LIMIT_MAX_RETRIES),
                default_rate_limit_max_retries(),
            )?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> IgaResult<()> {
        if self.api_url.is_empty() {
            return Err(IgaError::Configuration("api_url is required".to_string()));
        }
        if self.api_key.is_empty() {
            return Err(IgaError::Configuration("api_key is required".to_string()));
        }
        url::Url::parse(&self.api_url)
            .map_err(|e| IgaError::Configuration(format!("invalid api_url: {}", e)))?;
        if !self.rate_limit_delay_secs.is_finite() || self.rate_limit_delay_secs < 0.0 {
            return Err(IgaError::Configuration(
                "rate_limit_delay must be a non-negative number of seconds".to_string(),
            ));
        }
        if self.page_size == 0 {
            return Err(IgaError::Configuration("page_size must be > 0".to_string()));
        }
        Ok(())
    }

    /// Sets the organization id.
    #[must_use]
    pub fn with_org_id(mut self, org_id: impl Into<String>) -> Self {
        self.org_id = Some(org_id.into());
        self
    }

    /// Sets the request timeout in seconds.
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Sets the maximum retry attempts for transport failures.
    #[must_use]
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Sets the base retry delay in seconds.
    #[must_use]
    pub fn with_retry_delay_secs(mut self, secs: u64) -> Self {
        self.retry_delay_secs = secs;
        self
    }

    /// Sets the pagination page size.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Sets the post-request throttle delay in seconds.
    #[must_use]
    pub fn with_rate_limit_delay_secs(mut self, secs: f64) -> Self {
        self.rate_limit_delay_secs = secs;
        self
    }

    /// Sets the consecutive 429 cap.
    #[must_use]
    pub fn with_rate_limit_max_retries(mut self, retries: u32) -> Self {
        self.rate_limit_max_retries = retries;
        self
    }

    /// Request timeout as a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Base retry delay as a [`Duration`].
    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    /// Post-request throttle delay as a [`Duration`].
    #[must_use]
    pub fn rate_limit_delay(&self) -> Duration {
        Duration::from_secs_f64(self.rate_limit_delay_secs.max(0.0))
    }

    /// Builds the full URL for an endpoint path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        let base = self.api_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }
}

fn optional_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.is_empty())
}

fn require_env(name: &str) -> IgaResult<String> {
    optional_env(name)
        .ok_or_else(|| IgaError::Configuration(format!("{} environment variable is required", name)))
}

fn parse_setting<T: FromStr>(name: &str, raw: Option<String>, default: T) -> IgaResult<T> {
    match raw {
        Some(value) => value
            .parse()
            .map_err(|_| IgaError::Configuration(format!("{} has invalid value {:?}", name, value))),
        None => Ok(default),
    }
}
