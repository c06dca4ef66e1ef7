//! In-process annotation server that keeps everything in memory.

use crate::{AnnotationServer, ImageRecord, SaveRequest, ServerError};
use bytes::Bytes;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

#[derive(Default)]
struct Inner {
    images: Vec<ImageRecord>,
    blobs: HashMap<String, Bytes>,
    saves: Vec<SaveRequest>,
    rejected_txt: HashSet<String>,
    offline: bool,
}

/// Serves a fixed image set. Saves are recorded in arrival order and applied
/// to the stored annotations so a later scan sees them.
#[derive(Default)]
pub struct MemoryServer {
    inner: Mutex<Inner>,
}

impl MemoryServer {
    pub fn new(images: Vec<ImageRecord>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                images,
                ..Inner::default()
            }),
        }
    }

    pub fn with_image_bytes(self, image_path: &str, bytes: impl Into<Bytes>) -> Self {
        self.lock().blobs.insert(image_path.to_string(), bytes.into());
        self
    }

    /// Saves for this annotation file answer `success: false`.
    pub fn reject_saves_for(&self, txt_path: &str) {
        self.lock().rejected_txt.insert(txt_path.to_string());
    }

    /// Every call fails as if the connection was refused.
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    pub fn saves(&self) -> Vec<SaveRequest> {
        self.lock().saves.clone()
    }

    pub fn annotation_of(&self, txt_path: &str) -> Option<String> {
        self.lock()
            .images
            .iter()
            .find(|r| r.txt_path == txt_path)
            .map(|r| r.annotation.clone())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn ensure_online(inner: &Inner) -> Result<(), ServerError> {
        if inner.offline {
            Err(ServerError::RequestFailed("connection refused".into()))
        } else {
            Ok(())
        }
    }

    fn blob(&self, image_path: &str) -> Result<Bytes, ServerError> {
        let inner = self.lock();
        Self::ensure_online(&inner)?;
        inner
            .blobs
            .get(image_path)
            .cloned()
            .ok_or_else(|| ServerError::Status {
                status: 404,
                body: "image not found".into(),
            })
    }
}

#[async_trait::async_trait]
impl AnnotationServer for MemoryServer {
    async fn scan_folders(&self, folder_path: &str) -> Result<Vec<ImageRecord>, ServerError> {
        let inner = self.lock();
        Self::ensure_online(&inner)?;
        if folder_path.is_empty() {
            return Err(ServerError::Rejected("no folder path given".into()));
        }
        let found: Vec<ImageRecord> = inner
            .images
            .iter()
            .filter(|r| r.image_path.starts_with(folder_path))
            .cloned()
            .collect();
        if found.is_empty() {
            return Err(ServerError::Rejected("folder does not exist".into()));
        }
        Ok(found)
    }

    async fn thumbnail(&self, image_path: &str) -> Result<Bytes, ServerError> {
        self.blob(image_path)
    }

    async fn image(&self, image_path: &str) -> Result<Bytes, ServerError> {
        self.blob(image_path)
    }

    async fn save_annotation(&self, request: &SaveRequest) -> Result<(), ServerError> {
        let mut inner = self.lock();
        Self::ensure_online(&inner)?;
        inner.saves.push(request.clone());
        if inner.rejected_txt.contains(&request.txt_path) {
            return Err(ServerError::Rejected(format!(
                "permission denied: {}",
                request.txt_path
            )));
        }
        if let Some(record) = inner
            .images
            .iter_mut()
            .find(|r| r.txt_path == request.txt_path)
        {
            record.annotation = request.content.clone();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server() -> MemoryServer {
        MemoryServer::new(vec![
            ImageRecord::new("/set/a.jpg", "/set/a.txt", "cat"),
            ImageRecord::new("/other/b.jpg", "/other/b.txt", ""),
        ])
    }

    #[tokio::test]
    async fn scan_returns_images_under_folder() {
        let s = server();
        let found = s.scan_folders("/set").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].file_name(), "a.jpg");
        assert!(matches!(
            s.scan_folders("/missing").await,
            Err(ServerError::Rejected(_))
        ));
    }

    #[tokio::test]
    async fn saves_are_applied_and_rejections_recorded() {
        let s = server();
        s.save_annotation(&SaveRequest {
            txt_path: "/set/a.txt".into(),
            content: "cat,dog".into(),
        })
        .await
        .unwrap();
        assert_eq!(s.annotation_of("/set/a.txt").as_deref(), Some("cat,dog"));

        s.reject_saves_for("/other/b.txt");
        let err = s
            .save_annotation(&SaveRequest {
                txt_path: "/other/b.txt".into(),
                content: "x".into(),
            })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("permission denied"));
        assert_eq!(s.saves().len(), 2);
        assert_eq!(s.annotation_of("/other/b.txt").as_deref(), Some(""));
    }

    #[tokio::test]
    async fn offline_server_fails_transport() {
        let s = server().with_image_bytes("/set/a.jpg", vec![1u8, 2, 3]);
        assert_eq!(s.image("/set/a.jpg").await.unwrap().len(), 3);
        s.set_offline(true);
        assert!(matches!(
            s.thumbnail("/set/a.jpg").await,
            Err(ServerError::RequestFailed(_))
        ));
    }
}
