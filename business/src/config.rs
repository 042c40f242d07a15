use std::env::vars;
use std::fmt::Display;
use std::time::Duration;

use log::info;
use serde::Deserialize;
use ustr::Ustr;

/// API host baked in at build time, overridable at runtime via [`BusinessConfig::from_env`].
pub const DEFAULT_API_BASE_URL: &str = match option_env!("ROSTER_API_URL") {
    Some(url) => url,
    None => "http://localhost:5000",
};

/// What the dashboard does when the backend rejects the stored token while listing users.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum UnauthorizedPolicy {
    /// Show "session expired" and keep the token. The admin decides when to sign out.
    #[default]
    #[serde(rename = "report")]
    Report,
    /// Show "session expired", drop the token and return to the login screen.
    #[serde(rename = "force-logout")]
    ForceLogout,
}

impl Display for UnauthorizedPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Report => f.write_str("report"),
            Self::ForceLogout => f.write_str("force-logout"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration from environment: {0}")]
    Env(String),
    #[error("API base URL must start with http:// or https://, got '{0}'")]
    InvalidBaseUrl(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusinessConfig {
    pub api_base_url: String,
    /// Per-request timeout. `None` leaves it to the transport.
    pub request_timeout: Option<Duration>,
    pub unauthorized_policy: UnauthorizedPolicy,
}

/// Environment variables read by [`BusinessConfig::from_env`].
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    roster_api_url: Option<String>,
    roster_request_timeout_secs: Option<u64>,
    roster_unauthorized_policy: Option<UnauthorizedPolicy>,
}

impl BusinessConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Base URL without a trailing slash, ready for `format!("{}/users", ...)`.
    pub fn api_url(&self) -> Ustr {
        Ustr::from(self.api_base_url.trim_end_matches('/'))
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.api_url())
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_unauthorized_policy(mut self, policy: UnauthorizedPolicy) -> Self {
        self.unauthorized_policy = policy;
        self
    }

    /// Build-time defaults overlaid with `ROSTER_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw: RawConfig =
            serde_env::from_iter(vars()).map_err(|e| ConfigError::Env(e.to_string()))?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        let RawConfig {
            roster_api_url,
            roster_request_timeout_secs,
            roster_unauthorized_policy,
        } = raw;

        let api_base_url = match roster_api_url {
            Some(url) => {
                info!("Using ROSTER_API_URL from environment: {url}");
                url
            }
            None => DEFAULT_API_BASE_URL.to_owned(),
        };
        validate_base_url(&api_base_url)?;

        Ok(Self {
            api_base_url,
            request_timeout: roster_request_timeout_secs.map(Duration::from_secs),
            unauthorized_policy: roster_unauthorized_policy.unwrap_or_default(),
        })
    }
}

pub fn validate_base_url(url: &str) -> Result<(), ConfigError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidBaseUrl(url.to_owned()))
    }
}

impl Default for BusinessConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            request_timeout: None,
            unauthorized_policy: UnauthorizedPolicy::Report,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_env::from_iter;

    #[test]
    fn test_default_uses_build_time_url() {
        let config = BusinessConfig::default();
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert!(config.request_timeout.is_none());
        assert_eq!(config.unauthorized_policy, UnauthorizedPolicy::Report);
    }

    #[test]
    fn test_api_url_strips_trailing_slash() {
        let config = BusinessConfig::new("https://api.example.com/");
        assert_eq!(config.api_url(), Ustr::from("https://api.example.com"));
        assert_eq!(config.endpoint("/users"), "https://api.example.com/users");
    }

    #[test]
    fn test_from_raw_reads_all_variables() {
        let raw: RawConfig = from_iter(vec![
            ("ROSTER_API_URL", "https://roster.example.com"),
            ("ROSTER_REQUEST_TIMEOUT_SECS", "15"),
            ("ROSTER_UNAUTHORIZED_POLICY", "force-logout"),
        ])
        .expect("RawConfig should deserialize");

        let config = BusinessConfig::from_raw(raw).expect("config should build");
        assert_eq!(config.api_base_url, "https://roster.example.com");
        assert_eq!(config.request_timeout, Some(Duration::from_secs(15)));
        assert_eq!(config.unauthorized_policy, UnauthorizedPolicy::ForceLogout);
    }

    #[test]
    fn test_from_raw_falls_back_to_defaults() {
        let raw: RawConfig = from_iter(Vec::<(&str, &str)>::new()).expect("empty env");
        let config = BusinessConfig::from_raw(raw).expect("config should build");
        assert_eq!(config, BusinessConfig::default());
    }

    #[test]
    fn test_from_raw_rejects_url_without_scheme() {
        let raw = RawConfig {
            roster_api_url: Some("localhost:5000".to_owned()),
            ..RawConfig::default()
        };
        let err = BusinessConfig::from_raw(raw).unwrap_err();
        assert!(err.to_string().contains("localhost:5000"));
    }

    #[test]
    fn test_builders() {
        let config = BusinessConfig::new("http://x")
            .with_request_timeout(Some(Duration::from_secs(3)))
            .with_unauthorized_policy(UnauthorizedPolicy::ForceLogout);
        assert_eq!(config.request_timeout, Some(Duration::from_secs(3)));
        assert_eq!(config.unauthorized_policy, UnauthorizedPolicy::ForceLogout);
        assert_eq!(UnauthorizedPolicy::ForceLogout.to_string(), "force-logout");
    }
}
