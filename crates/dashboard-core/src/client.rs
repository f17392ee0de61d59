//! HTTP client plumbing shared by the dashboard API crates.
//!
//! [`ServiceClient`] owns the `reqwest` client, the base URL and the auth
//! token. It resolves endpoints, sends exactly one request per call and turns
//! non-success statuses into [`Error::Server`] with the extracted message.

use crate::error::{Error, Result};
use crate::normalize::extract_error_message;
use reqwest::{Method, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default idle timeout for connection pools
pub const DEFAULT_POOL_IDLE_TIMEOUT: u64 = 90;

/// Default maximum idle connections per host
pub const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 10;

/// Default User-Agent sent by the client.
pub const DEFAULT_USER_AGENT: &str = concat!("dashboard-core/", env!("CARGO_PKG_VERSION"));

/// HTTP transport tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Connection pool idle timeout
    pub pool_idle_timeout: Duration,

    /// Maximum idle connections per host
    pub pool_max_idle_per_host: usize,

    /// Enable request/response logging
    pub enable_logging: bool,

    /// Enable response compression
    pub enable_compression: bool,

    /// Keep a cookie jar across requests
    pub enable_cookies: bool,
}

impl ClientConfig {
    /// Create a new client configuration with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pool_idle_timeout: Duration::from_secs(DEFAULT_POOL_IDLE_TIMEOUT),
            pool_max_idle_per_host: DEFAULT_POOL_MAX_IDLE_PER_HOST,
            enable_logging: true,
            enable_compression: true,
            enable_cookies: false,
        }
    }

    /// Set connection pool idle timeout.
    #[must_use]
    pub const fn with_pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = timeout;
        self
    }

    /// Set maximum idle connections per host.
    #[must_use]
    pub const fn with_pool_max_idle(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = max;
        self
    }

    /// Enable or disable logging.
    #[must_use]
    pub const fn with_logging(mut self, enabled: bool) -> Self {
        self.enable_logging = enabled;
        self
    }

    /// Enable or disable compression.
    #[must_use]
    pub const fn with_compression(mut self, enabled: bool) -> Self {
        self.enable_compression = enabled;
        self
    }

    /// Enable or disable the cookie jar.
    #[must_use]
    pub const fn with_cookies(mut self, enabled: bool) -> Self {
        self.enable_cookies = enabled;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`ServiceClient`].
#[derive(Debug, Clone)]
pub struct ServiceClientBuilder {
    base_url: Url,
    timeout: Duration,
    http_config: ClientConfig,
    user_agent: String,
    token: Option<Arc<SecretString>>,
}

impl ServiceClientBuilder {
    /// Create a builder for the given base URL and request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed or cannot carry a path.
    pub fn new(base_url: impl AsRef<str>, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url.as_ref())?;
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidEndpoint(format!(
                "base URL cannot carry a path: {base_url}"
            )));
        }

        Ok(Self {
            base_url,
            timeout,
            http_config: ClientConfig::default(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            token: None,
        })
    }

    /// Override the HTTP client configuration.
    #[must_use]
    pub fn with_http_config(mut self, config: ClientConfig) -> Self {
        self.http_config = config;
        self
    }

    /// Override the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the User-Agent header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Configure a bearer token.
    #[must_use]
    pub fn with_token(self, token: impl Into<String>) -> Self {
        self.with_secret_token(Arc::new(SecretString::from(token.into())))
    }

    /// Configure a bearer token that is already held as a secret.
    #[must_use]
    pub fn with_secret_token(mut self, token: Arc<SecretString>) -> Self {
        self.token = Some(token);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying `reqwest` client cannot be built.
    pub fn build(self) -> Result<ServiceClient> {
        let http = reqwest::Client::builder()
            .timeout(self.timeout)
            .pool_idle_timeout(self.http_config.pool_idle_timeout)
            .pool_max_idle_per_host(self.http_config.pool_max_idle_per_host)
            .gzip(self.http_config.enable_compression)
            .cookie_store(self.http_config.enable_cookies)
            .user_agent(self.user_agent)
            .build()
            .map_err(|e| Error::ConfigError(format!("failed to build HTTP client: {e}")))?;

        Ok(ServiceClient {
            http,
            base_url: self.base_url,
            token: self.token,
            logging: self.http_config.enable_logging,
        })
    }
}

/// Thin wrapper around `reqwest::Client` bound to one backend.
#[derive(Clone)]
pub struct ServiceClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<Arc<SecretString>>,
    logging: bool,
}

impl std::fmt::Debug for ServiceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceClient")
            .field("base_url", &self.base_url.as_str())
            .field("authenticated", &self.token.is_some())
            .finish_non_exhaustive()
    }
}

impl ServiceClient {
    /// Return the base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve `endpoint` (and optionally `id`) against the base URL.
    ///
    /// Slashes around segments are ignored; `id` is encoded as one segment.
    ///
    /// # Errors
    ///
    /// Returns an error when the endpoint or id is empty.
    pub fn endpoint_url(&self, endpoint: &str, id: Option<&str>) -> Result<Url> {
        let segments: Vec<&str> = endpoint.split('/').filter(|s| !s.is_empty()).collect();
        if segments.is_empty() {
            return Err(Error::InvalidEndpoint(format!("empty endpoint {endpoint:?}")));
        }

        let id = match id.map(|raw| raw.trim_matches('/')) {
            Some("") => {
                return Err(Error::InvalidEndpoint(format!(
                    "empty id for endpoint {endpoint:?}"
                )))
            }
            other => other,
        };

        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|()| {
                Error::InvalidEndpoint(format!("base URL cannot carry a path: {}", self.base_url))
            })?;
            path.pop_if_empty().extend(segments);
            if let Some(id) = id {
                path.push(id);
            }
        }
        Ok(url)
    }

    /// Send one request and return the response if its status is a success.
    ///
    /// Non-success statuses become [`Error::Server`] with the message picked
    /// out of the body; transport failures become [`Error::Transport`].
    ///
    /// # Errors
    ///
    /// See above.
    pub async fn execute<F>(
        &self,
        method: Method,
        url: Url,
        params: &[(&'static str, String)],
        customize: F,
    ) -> Result<Response>
    where
        F: FnOnce(RequestBuilder) -> RequestBuilder,
    {
        if self.logging {
            debug!(%method, %url, "sending request");
        }

        let mut request = self.http.request(method.clone(), url.clone());
        if !params.is_empty() {
            request = request.query(params);
        }
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = customize(request).send().await.map_err(|err| {
            warn!(%method, %url, error = %err, "request failed before a response arrived");
            Error::from(err)
        })?;

        let status = response.status();
        if status.is_success() {
            if self.logging {
                debug!(%method, %url, status = status.as_u16(), "request succeeded");
            }
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(&body);
        warn!(%method, %url, status = status.as_u16(), %message, "server returned an error");
        Err(Error::Server {
            status: status.as_u16(),
            message,
        })
    }
}
