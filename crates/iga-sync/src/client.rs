//! HTTP client for IGA platform APIs with retry and rate limit handling.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, error, instrument, warn};

use crate::config::IgaConfig;
use crate::error::{IgaError, IgaResult};
use crate::stats::SyncStats;

/// User agent advertised on every request.
const CLIENT_USER_AGENT: &str = concat!("iga-sync/", env!("CARGO_PKG_VERSION"));

/// HTTP client bound to a single IGA platform.
///
/// Authentication headers are baked in at construction; every request
/// carries the bearer token and, when configured, the `x-org-id` header.
#[derive(Debug, Clone)]
pub struct IgaClient {
    http: reqwest::Client,
    config: IgaConfig,
}

impl IgaClient {
    /// Creates a client for the given configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the configuration is invalid or
    /// the HTTP client cannot be created.
    pub fn new(config: IgaConfig) -> IgaResult<Self> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        let bearer = format!("Bearer {}", config.api_key);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&bearer).map_err(|_| {
                IgaError::Configuration("api_key contains invalid header characters".to_string())
            })?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));
        if let Some(org_id) = &config.org_id {
            headers.insert(
                "x-org-id",
                HeaderValue::from_str(org_id).map_err(|_| {
                    IgaError::Configuration("org_id contains invalid header characters".to_string())
                })?,
            );
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| IgaError::Configuration(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Returns the configuration this client was built with.
    #[must_use]
    pub fn config(&self) -> &IgaConfig {
        &self.config
    }

    /// Performs a GET request against an API endpoint and returns the JSON body.
    ///
    /// Retry protocol:
    /// - 429 responses sleep for `Retry-After` seconds (falling back to the
    ///   configured retry delay) and retry without consuming the transport
    ///   retry budget, up to `rate_limit_max_retries` consecutive times.
    /// - Timeouts and connection failures back off linearly and retry up to
    ///   `max_retries` attempts before propagating.
    /// - Any other HTTP error status fails immediately.
    /// - Successful calls pause for the configured rate limit delay before
    ///   returning, to self-throttle.
    ///
    /// Every attempt counts one API call in `stats`, regardless of outcome.
    #[instrument(skip(self, params, stats))]
    pub async fn get_json(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
        stats: &mut SyncStats,
    ) -> IgaResult<Value> {
        let url = self.config.url(endpoint);
        let mut attempts: u32 = 0;
        let mut rate_limit_attempts: u32 = 0;

        loop {
            stats.increment_api_calls();
            debug!("GET {}", url);

            match self.http.get(&url).query(params).send().await {
                Ok(response) => {
                    let status = response.status();

                    if status == StatusCode::TOO_MANY_REQUESTS {
                        stats.increment_rate_limited();
                        rate_limit_attempts += 1;
                        if rate_limit_attempts > self.config.rate_limit_max_retries {
                            stats.increment_errors();
                            error!(
                                "Rate limited {} consecutive times on {}, giving up",
                                rate_limit_attempts, url
                            );
                            return Err(IgaError::RateLimitExceeded {
                                attempts: rate_limit_attempts,
                            });
                        }
                        let delay =
                            retry_after(&response).unwrap_or_else(|| self.config.retry_delay());
                        warn!("Rate limited on {}, waiting {:?} before retry", url, delay);
                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    if !status.is_success() {
                        stats.increment_errors();
                        let message = response.text().await.unwrap_or_default();
                        error!("Request to {} failed with status {}", url, status);
                        return Err(IgaError::Http {
                            status: status.as_u16(),
                            message,
                        });
                    }

                    let body = response.json::<Value>().await?;

                    let delay = self.config.rate_limit_delay();
                    if delay > Duration::ZERO {
                        tokio::time::sleep(delay).await;
                    }

                    return Ok(body);
                }
                Err(err) => {
                    attempts += 1;
                    error!(
                        "Request to {} failed: {} (attempt {}/{})",
                        url, err, attempts, self.config.max_retries
                    );
                    if attempts >= self.config.max_retries {
                        stats.increment_errors();
                        return Err(classify_transport_error(err, &url, attempts));
                    }
                    tokio::time::sleep(self.config.retry_delay() * attempts).await;
                }
            }
        }
    }
}

/// Reads the `Retry-After` header as whole seconds.
///
/// HTTP-date values are not supported and fall through to the caller's
/// fallback delay.
fn retry_after(response: &reqwest::Response) -> Option<Duration> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

fn classify_transport_error(err: reqwest::Error, url: &str, attempts: u32) -> IgaError {
    if err.is_timeout() {
        IgaError::Timeout {
            url: url.to_string(),
            attempts,
        }
    } else if err.is_connect() {
        IgaError::Connection {
            url: url.to_string(),
            attempts,
            message: err.to_string(),
        }
    } else {
        IgaError::Request(err)
    }
}
