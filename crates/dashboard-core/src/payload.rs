//! Request payloads: plain JSON or multipart forms with file attachments.

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::Body;
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Content type used when an attachment's type cannot be guessed.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Body of a create or update request.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Sent as `application/json`.
    Json(Value),
    /// Sent as `multipart/form-data`.
    Multipart(MultipartForm),
}

impl Payload {
    /// Returns true for multipart payloads.
    #[must_use]
    pub const fn is_multipart(&self) -> bool {
        matches!(self, Self::Multipart(_))
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<MultipartForm> for Payload {
    fn from(form: MultipartForm) -> Self {
        Self::Multipart(form)
    }
}

/// Where an attachment's contents come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentSource {
    /// Contents already held in memory.
    Memory(Bytes),
    /// A file streamed from disk when the request is sent.
    File {
        /// Location of the file
        path: PathBuf,
        /// Size in bytes at the time the attachment was created
        len: u64,
    },
}

/// A binary file to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// File name reported to the server
    pub file_name: String,
    /// MIME type, if known
    pub content_type: Option<String>,
    /// File contents
    pub source: AttachmentSource,
}

impl Attachment {
    /// Wrap in-memory bytes, guessing the content type from the file name.
    #[must_use]
    pub fn from_bytes(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let file_name = file_name.into();
        let content_type = guess_content_type(&file_name).map(str::to_string);
        Self {
            file_name,
            content_type,
            source: AttachmentSource::Memory(data.into()),
        }
    }

    /// Refer to a file on disk.
    ///
    /// Only the metadata is read here; the contents are streamed when the
    /// request is sent, so large videos are never buffered whole.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Attachment`] if the path has no file name or is not a
    /// readable regular file.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| Error::Attachment(format!("no file name in {}", path.display())))?
            .to_string();

        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| Error::Attachment(format!("failed to read {}: {e}", path.display())))?;
        if !metadata.is_file() {
            return Err(Error::Attachment(format!(
                "{} is not a regular file",
                path.display()
            )));
        }

        let content_type = guess_content_type(&file_name).map(str::to_string);
        Ok(Self {
            file_name,
            content_type,
            source: AttachmentSource::File {
                path: path.to_path_buf(),
                len: metadata.len(),
            },
        })
    }

    /// Size of the contents in bytes.
    #[must_use]
    pub fn len(&self) -> u64 {
        match &self.source {
            AttachmentSource::Memory(data) => data.len() as u64,
            AttachmentSource::File { len, .. } => *len,
        }
    }

    /// Returns true for zero-length attachments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Override the content type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    async fn into_part(self) -> Result<Part> {
        let len = self.len();
        let body = match self.source {
            AttachmentSource::Memory(data) => Body::from(data),
            AttachmentSource::File { path, .. } => {
                let file = tokio::fs::File::open(&path).await.map_err(|e| {
                    Error::Attachment(format!("failed to open {}: {e}", path.display()))
                })?;
                Body::from(file)
            }
        };

        let content_type = self
            .content_type
            .unwrap_or_else(|| OCTET_STREAM.to_string());
        Part::stream_with_length(body, len)
            .file_name(self.file_name)
            .mime_str(&content_type)
            .map_err(|e| Error::Attachment(format!("invalid content type {content_type:?}: {e}")))
    }
}

#[derive(Debug, Clone, PartialEq)]
enum FormField {
    Text(String, String),
    File(String, Attachment),
}

/// Ordered multipart form, converted to a `reqwest` form at send time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultipartForm {
    fields: Vec<FormField>,
}

impl MultipartForm {
    /// Create an empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a text field.
    #[must_use]
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(FormField::Text(name.into(), value.into()));
        self
    }

    /// Append a file field.
    #[must_use]
    pub fn file(mut self, name: impl Into<String>, attachment: Attachment) -> Self {
        self.fields.push(FormField::File(name.into(), attachment));
        self
    }

    /// Append the top-level members of a JSON object as text fields.
    ///
    /// Strings are sent verbatim, `null`s are skipped, anything else is sent
    /// as its JSON text.
    #[must_use]
    pub fn json_fields(mut self, value: &Value) -> Self {
        if let Value::Object(map) = value {
            for (name, field) in map {
                let text = match field {
                    Value::Null => continue,
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                self.fields.push(FormField::Text(name.clone(), text));
            }
        }
        self
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true when the form has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of file fields.
    #[must_use]
    pub fn attachment_count(&self) -> usize {
        self.fields
            .iter()
            .filter(|field| matches!(field, FormField::File(..)))
            .count()
    }

    /// Convert into a `reqwest` multipart form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Attachment`] if an attachment has an invalid content
    /// type or its file can no longer be opened.
    pub async fn into_form(self) -> Result<Form> {
        let mut form = Form::new();
        for field in self.fields {
            form = match field {
                FormField::Text(name, value) => form.text(name, value),
                FormField::File(name, attachment) => {
                    form.part(name, attachment.into_part().await?)
                }
            };
        }
        Ok(form)
    }
}

/// Guess a MIME type from a file extension for the media the dashboard uploads.
#[must_use]
pub fn guess_content_type(file_name: &str) -> Option<&'static str> {
    let extension = Path::new(file_name)
        .extension()?
        .to_str()?
        .to_ascii_lowercase();

    let mime = match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "mkv" => "video/x-matroska",
        "avi" => "video/x-msvideo",
        "pdf" => "application/pdf",
        _ => return None,
    };
    Some(mime)
}
