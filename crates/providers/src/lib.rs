//! Annotation server abstractions: wire types and the client seam.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod http;
pub mod memory;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("request failed: {0}")]
    RequestFailed(String),
    #[error("{0}")]
    Rejected(String),
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("could not decode response: {0}")]
    Decode(String),
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

/// One image discovered by a folder scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub image_path: String,
    pub txt_path: String,
    #[serde(default)]
    pub annotation: String,
}

impl ImageRecord {
    pub fn new(
        image_path: impl Into<String>,
        txt_path: impl Into<String>,
        annotation: impl Into<String>,
    ) -> Self {
        Self {
            image_path: image_path.into(),
            txt_path: txt_path.into(),
            annotation: annotation.into(),
        }
    }

    /// File name shown under the thumbnail.
    pub fn file_name(&self) -> &str {
        self.image_path
            .rsplit('/')
            .next()
            .unwrap_or(&self.image_path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveRequest {
    pub txt_path: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaveReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}

#[async_trait::async_trait]
pub trait AnnotationServer: Send + Sync {
    async fn scan_folders(&self, folder_path: &str) -> Result<Vec<ImageRecord>, ServerError>;
    async fn thumbnail(&self, image_path: &str) -> Result<Bytes, ServerError>;
    async fn image(&self, image_path: &str) -> Result<Bytes, ServerError>;
    async fn save_annotation(&self, request: &SaveRequest) -> Result<(), ServerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_entries_without_annotation_default_to_empty() {
        let records: Vec<ImageRecord> = serde_json::from_str(
            r#"[{"image_path":"/d/x.png","txt_path":"/d/x.txt"},
                {"image_path":"/d/y.png","txt_path":"/d/y.txt","annotation":"sky"}]"#,
        )
        .unwrap();
        assert_eq!(records[0].annotation, "");
        assert_eq!(records[1].annotation, "sky");
        assert_eq!(records[0].file_name(), "x.png");
    }

    #[test]
    fn save_reply_tolerates_missing_fields() {
        let reply: SaveReply = serde_json::from_str(r#"{"error":"read-only"}"#).unwrap();
        assert!(!reply.success);
        assert_eq!(reply.error.as_deref(), Some("read-only"));
    }
}
