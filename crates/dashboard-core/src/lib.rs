//! # dashboard-core
//!
//! Core types and HTTP plumbing for the nonprofit dashboard's REST backend.
//!
//! ## Modules
//!
//! - [`error`] - Failure taxonomy and the shared `Result` alias
//! - [`config`] - Client configuration (base URL, timeout, list handling)
//! - [`client`] - `reqwest` wrapper that sends one request per call
//! - [`normalize`] - Defensive shape checks for server responses
//! - [`payload`] - JSON and multipart request bodies
//! - [`resource`] - The dashboard's resource collections
//! - [`query`] - Query string builder for list endpoints

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod error;
pub mod normalize;
pub mod payload;
pub mod query;
pub mod resource;

// Re-export commonly used types
pub use config::{ApiConfig, ListShapeMode};
pub use error::{Error, Result, DEFAULT_ERROR_MESSAGE};
pub use normalize::{ensure_array, safe_map, ListShape, Record};
pub use payload::{Attachment, AttachmentSource, MultipartForm, Payload};
pub use query::QueryParams;
pub use resource::Resource;
