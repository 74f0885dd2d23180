//! Client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Bearer token the platform's own web client ships with. Grants guest-level
/// access once paired with an activated guest token.
pub(crate) const WEB_BEARER_TOKEN: &str = "AAAAAAAAAAAAAAAAAAAAANRILgAAAAAAnNwIzUejRCOuH5E6I8xnZz4puTs%3D1Zv7ttfk8LF81IUq16cHjhLTvJu4FA33AGWWjCpTnA";

/// Configuration for the GraphQL client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Session auth token for an authenticated account. When absent the
    /// client runs at guest level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,

    /// CSRF token (`ct0` cookie) paired with the auth token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csrf_token: Option<String>,

    /// Bearer token override. Defaults to the public web client token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bearer_token: Option<String>,

    /// Base URL for the API (default: <https://api.x.com>)
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// User-Agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Proxy URL (http, https, or socks5). No proxy when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,

    /// Request timeout
    #[serde(default = "default_timeout", with = "duration_secs")]
    pub timeout: Duration,

    /// Retry configuration
    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_api_url() -> String {
    "https://api.x.com".into()
}

fn default_user_agent() -> String {
    format!("twitter-graphql/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

/// Retry configuration for the transport layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum attempts per request
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Initial delay between retries in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Maximum delay between retries in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    60_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auth_token: None,
            csrf_token: None,
            bearer_token: None,
            api_url: default_api_url(),
            user_agent: default_user_agent(),
            proxy: None,
            timeout: default_timeout(),
            retry: RetryConfig::default(),
        }
    }
}

/// Rate limit information from API response headers.
#[derive(Debug, Clone, Default)]
pub struct RateLimitInfo {
    /// Maximum number of requests allowed in the window
    pub limit: Option<u32>,

    /// Remaining requests in the current window
    pub remaining: Option<u32>,

    /// Unix timestamp when the rate limit resets
    pub reset: Option<u64>,
}

impl RateLimitInfo {
    /// Parse rate limit info from response headers.
    #[must_use]
    pub fn from_headers(headers: &reqwest::header::HeaderMap) -> Self {
        Self {
            limit: headers
                .get("x-rate-limit-limit")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok()),
            remaining: headers
                .get("x-rate-limit-remaining")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok()),
            reset: headers
                .get("x-rate-limit-reset")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok()),
        }
    }

    /// Check if the window is exhausted (remaining == 0).
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.remaining == Some(0)
    }

    /// Get the duration until the rate limit resets.
    #[must_use]
    pub fn time_until_reset(&self) -> Option<Duration> {
        let reset = self.reset?;
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .ok()?
            .as_secs();

        if reset > now {
            Some(Duration::from_secs(reset - now))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_run_guest_level() {
        let config = Config::default();
        assert!(config.auth_token.is_none());
        assert_eq!(config.api_url, "https://api.x.com");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.retry.max_attempts, 3);
    }

    #[test]
    fn config_deserializes_with_partial_fields() {
        let config: Config = serde_json::from_str(
            r#"{"auth_token":"tok","csrf_token":"ct0","timeout":5}"#,
        )
        .unwrap();
        assert_eq!(config.auth_token.as_deref(), Some("tok"));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.api_url, "https://api.x.com");
    }

    #[test]
    fn rate_limit_info_parses_headers() {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("x-rate-limit-limit", "150".parse().unwrap());
        headers.insert("x-rate-limit-remaining", "0".parse().unwrap());
        headers.insert("x-rate-limit-reset", "1700000000".parse().unwrap());

        let info = RateLimitInfo::from_headers(&headers);
        assert_eq!(info.limit, Some(150));
        assert!(info.is_exhausted());
    }
}
