//! Safe client for the nonprofit dashboard's REST backend.
//!
//! [`SafeApiClient`] performs the four operations every dashboard screen
//! needs (list, create, update, remove) and always answers with a
//! [`Result`]: list calls never yield anything but a sequence, and no
//! transport or server failure escapes as a panic.

#![deny(missing_docs)]

pub mod api;
pub mod client;
pub mod resource;

pub use api::CrudApi;
pub use client::{SafeApiClient, SafeApiClientBuilder};
pub use dashboard_core::{
    ApiConfig, Attachment, AttachmentSource, Error, ListShapeMode, MultipartForm, Payload,
    QueryParams, Record, Resource, DEFAULT_ERROR_MESSAGE,
};
pub use resource::ResourceHandle;

/// Convenient result alias that reuses the shared dashboard error type.
pub type Result<T> = dashboard_core::Result<T>;
