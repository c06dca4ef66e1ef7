use crate::{AnnotationServer, ErrorBody, ImageRecord, SaveReply, SaveRequest, ServerError};
use bytes::Bytes;
use reqwest::{Client, Response, Url};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct HttpConfig {
    pub base_url: String,
}

/// Talks to the annotation server over its JSON/HTTP endpoints.
#[derive(Clone)]
pub struct HttpAnnotationServer {
    client: Client,
    base: Arc<Url>,
}

impl HttpAnnotationServer {
    pub fn new(cfg: HttpConfig) -> Result<Self, ServerError> {
        let base = Url::parse(&cfg.base_url)
            .map_err(|e| ServerError::InvalidUrl(format!("{}: {}", cfg.base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(ServerError::InvalidUrl(cfg.base_url));
        }
        Ok(Self {
            client: Client::new(),
            base: Arc::new(base),
        })
    }

    /// `image_path` is pushed as a single percent-encoded segment, slashes included.
    pub fn thumbnail_url(&self, image_path: &str) -> Result<Url, ServerError> {
        self.endpoint(&["thumbnail", image_path])
    }

    pub fn image_url(&self, image_path: &str) -> Result<Url, ServerError> {
        self.endpoint(&["image", image_path])
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ServerError> {
        let mut url = (*self.base).clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ServerError::InvalidUrl(self.base.to_string()))?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<Response, ServerError> {
        let url = self.endpoint(&[endpoint])?;
        let resp = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| ServerError::RequestFailed(e.to_string()))?;
        check_status(resp).await
    }

    async fn get_bytes(&self, url: Url) -> Result<Bytes, ServerError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ServerError::RequestFailed(e.to_string()))?;
        let resp = check_status(resp).await?;
        resp.bytes()
            .await
            .map_err(|e| ServerError::RequestFailed(e.to_string()))
    }
}

async fn check_status(resp: Response) -> Result<Response, ServerError> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status();
    let body = resp.bytes().await.unwrap_or(Bytes::from_static(b""));
    if let Ok(parsed) = serde_json::from_slice::<ErrorBody>(&body) {
        return Err(ServerError::Rejected(parsed.error));
    }
    Err(ServerError::Status {
        status: status.as_u16(),
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

#[async_trait::async_trait]
impl AnnotationServer for HttpAnnotationServer {
    async fn scan_folders(&self, folder_path: &str) -> Result<Vec<ImageRecord>, ServerError> {
        #[derive(Serialize)]
        struct ScanRequest<'a> {
            folder_path: &'a str,
        }

        let resp = self
            .post_json("scan_folders", &ScanRequest { folder_path })
            .await?;
        let records: Vec<ImageRecord> = resp
            .json()
            .await
            .map_err(|e| ServerError::Decode(e.to_string()))?;
        debug!(folder_path, count = records.len(), "scan response");
        Ok(records)
    }

    async fn thumbnail(&self, image_path: &str) -> Result<Bytes, ServerError> {
        let url = self.thumbnail_url(image_path)?;
        self.get_bytes(url).await
    }

    async fn image(&self, image_path: &str) -> Result<Bytes, ServerError> {
        let url = self.image_url(image_path)?;
        self.get_bytes(url).await
    }

    async fn save_annotation(&self, request: &SaveRequest) -> Result<(), ServerError> {
        let resp = self.post_json("save_annotation", request).await?;
        let reply: SaveReply = resp
            .json()
            .await
            .map_err(|e| ServerError::Decode(e.to_string()))?;
        if reply.success {
            Ok(())
        } else {
            Err(ServerError::Rejected(
                reply.error.unwrap_or_else(|| "save failed".to_string()),
            ))
        }
    }
}
