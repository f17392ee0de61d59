//! The CRUD seam between presentation code and the backend.

use async_trait::async_trait;
use dashboard_core::{Payload, Record};

use crate::client::SafeApiClient;
use crate::Result;

/// The four operations every dashboard screen performs.
///
/// [`SafeApiClient`] is the production implementation; screens and other
/// consumers can depend on this trait and be tested against a mock.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CrudApi: Send + Sync {
    /// List the records of `endpoint`.
    async fn fetch_list(&self, endpoint: &str) -> Result<Vec<Record>>;

    /// Create a record under `endpoint`.
    async fn create(&self, endpoint: &str, payload: Payload) -> Result<Record>;

    /// Replace the record `endpoint/id`.
    async fn update(&self, endpoint: &str, id: &str, payload: Payload) -> Result<Record>;

    /// Delete the record `endpoint/id`.
    async fn remove(&self, endpoint: &str, id: &str) -> Result<Record>;
}

#[async_trait]
impl CrudApi for SafeApiClient {
    async fn fetch_list(&self, endpoint: &str) -> Result<Vec<Record>> {
        SafeApiClient::fetch_list(self, endpoint).await
    }

    async fn create(&self, endpoint: &str, payload: Payload) -> Result<Record> {
        SafeApiClient::create(self, endpoint, payload).await
    }

    async fn update(&self, endpoint: &str, id: &str, payload: Payload) -> Result<Record> {
        SafeApiClient::update(self, endpoint, id, payload).await
    }

    async fn remove(&self, endpoint: &str, id: &str) -> Result<Record> {
        SafeApiClient::remove(self, endpoint, id).await
    }
}
