//! Configuration structures for the dashboard API client.
//!
//! The backend base URL is always injected through [`ApiConfig`], so tests and
//! deployments can point the client wherever they need.

use crate::Error;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use url::Url;
use validator::Validate;

/// Environment variable holding the backend base URL.
pub const ENV_API_URL: &str = "DASHBOARD_API_URL";

/// Environment variable holding the request timeout in seconds.
pub const ENV_API_TIMEOUT_SECS: &str = "DASHBOARD_API_TIMEOUT_SECS";

/// Environment variable holding the bearer token.
pub const ENV_API_TOKEN: &str = "DASHBOARD_API_TOKEN";

/// Environment variable enabling strict list handling (`1` or `true`).
pub const ENV_API_STRICT_LISTS: &str = "DASHBOARD_API_STRICT_LISTS";

/// How list endpoints treat a body that is not a JSON array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListShapeMode {
    /// Log the anomaly and return an empty list.
    #[default]
    Lenient,
    /// Fail with [`Error::ShapeMismatch`].
    Strict,
}

/// Configuration for a dashboard API client.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ApiConfig {
    /// Backend base URL; endpoints are resolved relative to it
    #[validate(url)]
    pub base_url: String,

    /// Request timeout in seconds, handed to the transport
    #[validate(range(min = 1, max = 300))]
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Handling of non-array list bodies
    #[serde(default)]
    pub list_shape_mode: ListShapeMode,

    /// Optional User-Agent override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,

    /// Bearer token sent with every request
    #[serde(skip)]
    pub token: Option<Arc<SecretString>>,
}

const fn default_request_timeout_secs() -> u64 {
    30
}

impl ApiConfig {
    /// Create a new configuration for the given base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or validation fails.
    pub fn new(base_url: impl Into<String>) -> Result<Self, Error> {
        let config = Self {
            base_url: base_url.into(),
            request_timeout_secs: default_request_timeout_secs(),
            list_shape_mode: ListShapeMode::default(),
            user_agent: None,
            token: None,
        };

        config
            .validate()
            .map_err(|e| Error::ConfigError(format!("Invalid configuration: {e}")))?;

        Ok(config)
    }

    /// Build a configuration from `DASHBOARD_API_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is missing or any value is malformed.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(ENV_API_URL)
            .ok_or_else(|| Error::ConfigError(format!("{ENV_API_URL} is not set")))?;
        let mut config = Self::new(base_url)?;

        if let Some(raw) = lookup(ENV_API_TIMEOUT_SECS) {
            let secs = raw.trim().parse::<u64>().map_err(|e| {
                Error::ConfigError(format!("{ENV_API_TIMEOUT_SECS} must be an integer: {e}"))
            })?;
            config = config.with_timeout(secs);
        }

        if let Some(token) = lookup(ENV_API_TOKEN).filter(|t| !t.is_empty()) {
            config = config.with_token(token);
        }

        if let Some(raw) = lookup(ENV_API_STRICT_LISTS) {
            if matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes") {
                config = config.with_list_shape_mode(ListShapeMode::Strict);
            }
        }

        config
            .validate()
            .map_err(|e| Error::ConfigError(format!("Invalid configuration: {e}")))?;
        Ok(config)
    }

    /// Set request timeout in seconds.
    #[must_use]
    pub const fn with_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout_secs = seconds;
        self
    }

    /// Set list shape handling.
    #[must_use]
    pub const fn with_list_shape_mode(mut self, mode: ListShapeMode) -> Self {
        self.list_shape_mode = mode;
        self
    }

    /// Shorthand for strict list handling.
    #[must_use]
    pub const fn strict(self) -> Self {
        self.with_list_shape_mode(ListShapeMode::Strict)
    }

    /// Set the User-Agent header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Set the bearer token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(Arc::new(SecretString::from(token.into())));
        self
    }

    /// Get the request timeout as a Duration.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Parse the base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed.
    pub fn parse_base_url(&self) -> Result<Url, Error> {
        Url::parse(&self.base_url).map_err(|e| Error::ConfigError(format!("Invalid base URL: {e}")))
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            request_timeout_secs: default_request_timeout_secs(),
            list_shape_mode: ListShapeMode::default(),
            user_agent: None,
            token: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_api_config_new() {
        let config = ApiConfig::new("https://api.example.org/v1").unwrap();
        assert_eq!(config.base_url, "https://api.example.org/v1");
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.list_shape_mode, ListShapeMode::Lenient);
        assert!(config.token.is_none());
    }

    #[test]
    fn test_api_config_invalid_url() {
        let err = ApiConfig::new("not-a-url").unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }

    #[test]
    fn test_api_config_builder() {
        let config = ApiConfig::new("https://api.example.org")
            .unwrap()
            .with_timeout(60)
            .strict()
            .with_user_agent("dashboard-tests")
            .with_token("s3cret");

        assert_eq!(config.timeout(), Duration::from_secs(60));
        assert_eq!(config.list_shape_mode, ListShapeMode::Strict);
        assert_eq!(config.user_agent.as_deref(), Some("dashboard-tests"));
        assert_eq!(config.token.as_ref().unwrap().expose_secret(), "s3cret");
    }

    #[test]
    fn test_token_is_never_serialized() {
        let config = ApiConfig::default().with_token("s3cret");
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("s3cret"));
        assert!(!format!("{config:?}").contains("s3cret"));
    }

    #[test]
    fn test_config_deserialization_defaults() {
        let config: ApiConfig =
            serde_json::from_str(r#"{"base_url":"http://localhost:9000"}"#).unwrap();
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.list_shape_mode, ListShapeMode::Lenient);

        let config: ApiConfig = serde_json::from_str(
            r#"{"base_url":"http://localhost:9000","list_shape_mode":"strict"}"#,
        )
        .unwrap();
        assert_eq!(config.list_shape_mode, ListShapeMode::Strict);
    }

    #[test]
    fn test_config_validation_timeout_range() {
        let mut config = ApiConfig::default();
        config.request_timeout_secs = 0;
        assert!(config.validate().is_err());

        config.request_timeout_secs = 301;
        assert!(config.validate().is_err());

        config.request_timeout_secs = 30;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_base_url() {
        let config = ApiConfig::new("https://api.example.org:8443/api").unwrap();
        let url = config.parse_base_url().unwrap();
        assert_eq!(url.host_str(), Some("api.example.org"));
        assert_eq!(url.port(), Some(8443));
        assert_eq!(url.path(), "/api");
    }

    #[test]
    fn test_from_lookup() {
        let config = ApiConfig::from_lookup(lookup_from(&[
            (ENV_API_URL, "http://backend:5000/api"),
            (ENV_API_TIMEOUT_SECS, "12"),
            (ENV_API_TOKEN, "abc"),
            (ENV_API_STRICT_LISTS, "true"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "http://backend:5000/api");
        assert_eq!(config.request_timeout_secs, 12);
        assert_eq!(config.list_shape_mode, ListShapeMode::Strict);
        assert!(config.token.is_some());
    }

    #[test]
    fn test_from_lookup_missing_url() {
        let err = ApiConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.to_string().contains(ENV_API_URL));
    }

    #[test]
    fn test_from_lookup_rejects_bad_timeout() {
        let err = ApiConfig::from_lookup(lookup_from(&[
            (ENV_API_URL, "http://backend:5000"),
            (ENV_API_TIMEOUT_SECS, "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));

        let err = ApiConfig::from_lookup(lookup_from(&[
            (ENV_API_URL, "http://backend:5000"),
            (ENV_API_TIMEOUT_SECS, "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }
}
