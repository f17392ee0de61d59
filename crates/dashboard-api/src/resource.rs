//! Per-resource handles over a [`CrudApi`].

use dashboard_core::normalize::decode_records;
use dashboard_core::{Payload, Record, Resource};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::api::CrudApi;
use crate::Result;

/// A [`CrudApi`] bound to one dashboard [`Resource`].
#[derive(Debug)]
pub struct ResourceHandle<'a, A: ?Sized> {
    api: &'a A,
    resource: Resource,
}

impl<A: ?Sized> Clone for ResourceHandle<'_, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A: ?Sized> Copy for ResourceHandle<'_, A> {}

impl<'a, A> ResourceHandle<'a, A>
where
    A: CrudApi + ?Sized,
{
    /// Bind `api` to `resource`.
    #[must_use]
    pub fn new(api: &'a A, resource: Resource) -> Self {
        Self { api, resource }
    }

    /// The bound resource.
    #[must_use]
    pub const fn resource(&self) -> Resource {
        self.resource
    }

    /// List all entries.
    pub async fn list(&self) -> Result<Vec<Record>> {
        debug!(resource = %self.resource, "listing");
        self.api.fetch_list(self.resource.path()).await
    }

    /// List all entries decoded as `T`, skipping entries that do not decode.
    pub async fn list_as<T>(&self) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        Ok(decode_records(self.list().await?))
    }

    /// Create an entry.
    pub async fn create(&self, payload: impl Into<Payload>) -> Result<Record> {
        debug!(resource = %self.resource, "creating");
        self.api.create(self.resource.path(), payload.into()).await
    }

    /// Update the entry `id`.
    pub async fn update(&self, id: &str, payload: impl Into<Payload>) -> Result<Record> {
        debug!(resource = %self.resource, id, "updating");
        self.api
            .update(self.resource.path(), id, payload.into())
            .await
    }

    /// Delete the entry `id`.
    pub async fn remove(&self, id: &str) -> Result<Record> {
        debug!(resource = %self.resource, id, "removing");
        self.api.remove(self.resource.path(), id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockCrudApi;
    use dashboard_core::{Attachment, Error, MultipartForm};
    use mockall::predicate::eq;
    use serde_json::json;

    #[tokio::test]
    async fn list_uses_resource_path() {
        let mut api = MockCrudApi::new();
        api.expect_fetch_list()
            .with(eq("campaigns"))
            .times(1)
            .returning(|_| Ok(vec![json!({"id": "c1"})]));

        let handle = ResourceHandle::new(&api, Resource::Campaigns);
        assert_eq!(handle.list().await.unwrap(), vec![json!({"id": "c1"})]);
    }

    #[tokio::test]
    async fn list_as_skips_undecodable_entries() {
        #[derive(serde::Deserialize)]
        struct Message {
            title: String,
        }

        let mut api = MockCrudApi::new();
        api.expect_fetch_list()
            .returning(|_| Ok(vec![json!({"title": "Hello"}), json!({"title": 5})]));

        let messages: Vec<Message> = ResourceHandle::new(&api, Resource::Messages)
            .list_as()
            .await
            .unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].title, "Hello");
    }

    #[tokio::test]
    async fn create_with_attachment_is_multipart() {
        let mut api = MockCrudApi::new();
        api.expect_create()
            .withf(|endpoint, payload| endpoint == "documentation" && payload.is_multipart())
            .times(1)
            .returning(|_, _| Ok(json!({"id": "d1"})));

        let form = MultipartForm::new()
            .text("caption", "Well opening")
            .file("video", Attachment::from_bytes("opening.mp4", vec![0_u8; 4]));
        let created = ResourceHandle::new(&api, Resource::Documentation)
            .create(form)
            .await
            .unwrap();
        assert_eq!(created["id"], "d1");
    }

    #[tokio::test]
    async fn update_and_remove_pass_ids_through() {
        let mut api = MockCrudApi::new();
        api.expect_update()
            .withf(|endpoint, id, _| endpoint == "users" && id == "42")
            .returning(|_, _, _| Ok(json!({"id": "42"})));
        api.expect_remove()
            .with(eq("users"), eq("42"))
            .returning(|_, _| {
                Err(Error::Server {
                    status: 500,
                    message: "cannot delete".to_string(),
                })
            });

        let handle = ResourceHandle::new(&api, Resource::Users);
        assert_eq!(handle.resource(), Resource::Users);
        handle.update("42", json!({"role": "editor"})).await.unwrap();
        let err = handle.remove("42").await.unwrap_err();
        assert_eq!(err.message(), "cannot delete");
    }
}
