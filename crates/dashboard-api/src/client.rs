//! The safe API client: list, create, update and remove against one backend.

use crate::Result;
use dashboard_core::client::{
    ClientConfig, ServiceClient, ServiceClientBuilder, DEFAULT_TIMEOUT_SECS,
};
use dashboard_core::normalize::{classify, decode_records, ensure_array, parse_body, ListShape};
use dashboard_core::{ApiConfig, Error, ListShapeMode, Payload, QueryParams, Record, Resource};
use reqwest::header::ACCEPT;
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::warn;
use url::Url;

use crate::resource::ResourceHandle;

const USER_AGENT: &str = concat!("dashboard-api/", env!("CARGO_PKG_VERSION"));
const APPLICATION_JSON: &str = "application/json";

/// Builder for [`SafeApiClient`].
#[derive(Debug, Clone)]
pub struct SafeApiClientBuilder {
    inner: ServiceClientBuilder,
    list_shape_mode: ListShapeMode,
}

impl SafeApiClientBuilder {
    /// Create a builder for the specified base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let builder =
            ServiceClientBuilder::new(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))?
                .with_user_agent(USER_AGENT);

        Ok(Self {
            inner: builder,
            list_shape_mode: ListShapeMode::default(),
        })
    }

    /// Create a builder from a full configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid.
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        let mut builder = Self::new(&config.base_url)?
            .with_timeout(config.timeout())
            .with_list_shape_mode(config.list_shape_mode);

        if let Some(user_agent) = &config.user_agent {
            builder = builder.with_user_agent(user_agent.clone());
        }
        if let Some(token) = &config.token {
            builder.inner = builder.inner.with_secret_token(token.clone());
        }
        Ok(builder)
    }

    /// Override the request timeout passed to the transport.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.inner = self.inner.with_timeout(timeout);
        self
    }

    /// Override the HTTP client configuration.
    #[must_use]
    pub fn with_http_config(mut self, config: ClientConfig) -> Self {
        self.inner = self.inner.with_http_config(config);
        self
    }

    /// Override the User-Agent header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.inner = self.inner.with_user_agent(user_agent);
        self
    }

    /// Configure a bearer token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.inner = self.inner.with_token(token);
        self
    }

    /// Choose how list endpoints treat non-array bodies.
    #[must_use]
    pub const fn with_list_shape_mode(mut self, mode: ListShapeMode) -> Self {
        self.list_shape_mode = mode;
        self
    }

    /// Fail list calls on non-array bodies instead of returning an empty list.
    #[must_use]
    pub const fn strict(self) -> Self {
        self.with_list_shape_mode(ListShapeMode::Strict)
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn build(self) -> Result<SafeApiClient> {
        let inner = self.inner.build()?;
        Ok(SafeApiClient {
            inner,
            list_shape_mode: self.list_shape_mode,
        })
    }
}

/// Asynchronous client for the dashboard backend.
///
/// Every operation sends exactly one request and never retries. Failures of
/// any kind come back as `Err`; list operations only ever yield sequences.
/// The client holds no mutable state and is cheap to clone.
#[derive(Debug, Clone)]
pub struct SafeApiClient {
    inner: ServiceClient,
    list_shape_mode: ListShapeMode,
}

impl SafeApiClient {
    /// Construct a client directly from the base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        SafeApiClientBuilder::new(base_url)?.build()
    }

    /// Construct a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is unusable.
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        SafeApiClientBuilder::from_config(config)?.build()
    }

    /// Return the base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        self.inner.base_url()
    }

    /// Return the list shape handling in effect.
    #[must_use]
    pub const fn list_shape_mode(&self) -> ListShapeMode {
        self.list_shape_mode
    }

    /// Handle bound to one of the dashboard's resource collections.
    #[must_use]
    pub fn resource(&self, resource: Resource) -> ResourceHandle<'_, Self> {
        ResourceHandle::new(self, resource)
    }

    /// GET `endpoint` and return its records.
    ///
    /// A body that is not a JSON array yields an empty list (logged), or
    /// [`Error::ShapeMismatch`] in strict mode.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    pub async fn fetch_list(&self, endpoint: &str) -> Result<Vec<Record>> {
        self.fetch_list_with(endpoint, &QueryParams::new()).await
    }

    /// GET `endpoint` with query parameters and return its records.
    ///
    /// # Errors
    ///
    /// See [`SafeApiClient::fetch_list`].
    pub async fn fetch_list_with(
        &self,
        endpoint: &str,
        params: &QueryParams,
    ) -> Result<Vec<Record>> {
        let url = self.inner.endpoint_url(endpoint, None)?;
        let response = self
            .inner
            .execute(Method::GET, url, params.as_pairs(), |request| {
                request.header(ACCEPT, APPLICATION_JSON)
            })
            .await?;

        let body = read_body(response).await?;
        self.normalize_list(endpoint, body)
    }

    /// GET `endpoint` and decode each record, dropping the ones that do not fit `T`.
    ///
    /// # Errors
    ///
    /// See [`SafeApiClient::fetch_list`].
    pub async fn fetch_list_as<T>(&self, endpoint: &str) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let records = self.fetch_list(endpoint).await?;
        Ok(decode_records(records))
    }

    /// POST a new entry to `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success status, or an
    /// unusable attachment.
    pub async fn create(&self, endpoint: &str, payload: impl Into<Payload>) -> Result<Record> {
        let url = self.inner.endpoint_url(endpoint, None)?;
        self.send_payload(Method::POST, url, payload.into()).await
    }

    /// PUT an entry at `endpoint/id`.
    ///
    /// # Errors
    ///
    /// See [`SafeApiClient::create`].
    pub async fn update(
        &self,
        endpoint: &str,
        id: &str,
        payload: impl Into<Payload>,
    ) -> Result<Record> {
        let url = self.inner.endpoint_url(endpoint, Some(id))?;
        self.send_payload(Method::PUT, url, payload.into()).await
    }

    /// DELETE the entry at `endpoint/id`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    pub async fn remove(&self, endpoint: &str, id: &str) -> Result<Record> {
        let url = self.inner.endpoint_url(endpoint, Some(id))?;
        let response = self
            .inner
            .execute(Method::DELETE, url, &[], |request| {
                request.header(ACCEPT, APPLICATION_JSON)
            })
            .await?;
        read_body(response).await
    }

    async fn send_payload(&self, method: Method, url: Url, payload: Payload) -> Result<Record> {
        let response = match payload {
            Payload::Json(value) => {
                self.inner
                    .execute(method, url, &[], |request| {
                        request.header(ACCEPT, APPLICATION_JSON).json(&value)
                    })
                    .await?
            }
            Payload::Multipart(form) => {
                let form = form.into_form().await?;
                self.inner
                    .execute(method, url, &[], |request| {
                        request.header(ACCEPT, APPLICATION_JSON).multipart(form)
                    })
                    .await?
            }
        };
        read_body(response).await
    }

    fn normalize_list(&self, endpoint: &str, body: Record) -> Result<Vec<Record>> {
        let shape = classify(&body);
        if shape == ListShape::Sequence {
            return Ok(ensure_array(body));
        }

        match self.list_shape_mode {
            ListShapeMode::Lenient => {
                warn!(
                    endpoint,
                    %shape,
                    "list endpoint returned a non-sequence body, using an empty list"
                );
                Ok(Vec::new())
            }
            ListShapeMode::Strict => {
                warn!(endpoint, %shape, "list endpoint returned a non-sequence body");
                Err(Error::ShapeMismatch {
                    endpoint: endpoint.to_string(),
                    shape,
                })
            }
        }
    }
}

async fn read_body(response: Response) -> Result<Record> {
    let text = response.text().await.map_err(Error::from)?;
    Ok(parse_body(&text))
}
