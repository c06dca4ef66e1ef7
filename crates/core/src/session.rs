//! The controller: turns user intents into state transitions and server calls,
//! and reports outcomes through a [`Prompt`].

use crate::debounce::Debouncer;
use crate::editor::{self, BatchHandle};
use crate::error::TaggerError;
use crate::models::{BatchPosition, Direction, ImageRecord, SaveRequest};
use crate::state::TaggerState;
use crate::view::{Frame, THUMBNAIL_PLACEHOLDER_SVG};
use bytes::Bytes;
use providers::{AnnotationServer, ServerError};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Blocking user dialogs.
pub trait Prompt: Send + Sync {
    fn alert(&self, message: &str);
    fn confirm(&self, message: &str) -> bool;
}

pub enum Thumbnail {
    Image(Bytes),
    Placeholder,
}

impl Thumbnail {
    pub fn bytes(&self) -> Bytes {
        match self {
            Thumbnail::Image(bytes) => bytes.clone(),
            Thumbnail::Placeholder => Bytes::from_static(THUMBNAIL_PLACEHOLDER_SVG.as_bytes()),
        }
    }
}

pub struct TaggerSession {
    state: TaggerState,
    server: Arc<dyn AnnotationServer>,
    prompt: Arc<dyn Prompt>,
    live_save: Debouncer<SaveRequest>,
}

impl TaggerSession {
    /// Must be called inside a tokio runtime; the live-edit debouncer spawns a task.
    pub fn new(
        state: TaggerState,
        server: Arc<dyn AnnotationServer>,
        prompt: Arc<dyn Prompt>,
        debounce: Duration,
    ) -> Self {
        let live_save = {
            let server = Arc::clone(&server);
            let prompt = Arc::clone(&prompt);
            Debouncer::new(debounce, move |request: SaveRequest| {
                let server = Arc::clone(&server);
                let prompt = Arc::clone(&prompt);
                async move {
                    match server.save_annotation(&request).await {
                        Ok(()) => info!(txt_path = %request.txt_path, "annotation saved"),
                        Err(e) => report_save_failure(prompt.as_ref(), &request.txt_path, &e),
                    }
                }
            })
        };
        Self {
            state,
            server,
            prompt,
            live_save,
        }
    }

    pub fn state(&self) -> &TaggerState {
        &self.state
    }

    pub fn frame(&self) -> Frame {
        self.state.frame()
    }

    /// The path goes to the server as typed; only a blank path is refused.
    pub async fn scan_folder(&mut self, folder_path: &str) -> Result<usize, TaggerError> {
        if folder_path.trim().is_empty() {
            self.prompt.alert("Please enter a folder path");
            return Err(TaggerError::EmptyFolderPath);
        }
        match self.server.scan_folders(folder_path).await {
            Ok(images) => {
                let count = images.len();
                self.state.load_images(images);
                info!(folder_path, count, "folder scanned");
                Ok(count)
            }
            Err(e) => {
                error!(folder_path, error = %e, "scan failed");
                self.prompt.alert("Error while scanning folder");
                Err(e.into())
            }
        }
    }

    pub fn select_by_click(&mut self, record: ImageRecord) {
        self.state.select_by_click(record);
    }

    pub fn select_path(&mut self, image_path: &str) -> Option<&ImageRecord> {
        self.state.select_path(image_path)
    }

    pub fn advance(&mut self, direction: Direction) -> Option<&ImageRecord> {
        self.state.advance(direction)
    }

    pub fn toggle_filter(&mut self, tag: &str) {
        self.state.toggle_filter(tag);
    }

    /// Live typing path: the editor draft follows every keystroke, only the
    /// last edit of a burst reaches the server, and the registry is left as is.
    pub fn edit_live(&mut self, content: &str) -> Result<(), TaggerError> {
        let txt_path = self
            .state
            .selected()
            .map(|r| r.txt_path.clone())
            .ok_or(TaggerError::NoSelection)?;
        self.state.set_draft(content);
        self.live_save.call(SaveRequest {
            txt_path,
            content: content.to_string(),
        });
        Ok(())
    }

    /// Explicit save of the previewed image. The registry only changes once
    /// the server confirms.
    pub async fn save(&mut self, content: &str) -> Result<(), TaggerError> {
        let txt_path = self
            .state
            .selected()
            .map(|r| r.txt_path.clone())
            .ok_or(TaggerError::NoSelection)?;
        self.state.set_draft(content);
        let request = SaveRequest {
            txt_path,
            content: content.to_string(),
        };
        match self.server.save_annotation(&request).await {
            Ok(()) => {
                info!(txt_path = %request.txt_path, "annotation saved");
                self.state.apply_saved(&request.txt_path, &request.content);
                Ok(())
            }
            Err(e) => {
                report_save_failure(self.prompt.as_ref(), &request.txt_path, &e);
                Err(e.into())
            }
        }
    }

    /// `Ok(None)` when the user declines the confirmation.
    pub fn add_batch(
        &mut self,
        content: &str,
        position: BatchPosition,
    ) -> Result<Option<BatchHandle>, TaggerError> {
        let content = content.trim();
        if content.is_empty() {
            self.prompt.alert("Please enter annotation content to add");
            return Err(TaggerError::EmptyBatchContent);
        }
        let question = match position {
            BatchPosition::Start => format!("Add \"{content}\" to the start of every image?"),
            BatchPosition::End => format!("Add \"{content}\" to the end of every image?"),
        };
        if !self.prompt.confirm(&question) {
            return Ok(None);
        }
        let saves = self.state.add_batch(content, position);
        info!(content, %position, count = saves.len(), "batch add dispatched");
        let handle = editor::dispatch(&self.server, saves);
        self.prompt.alert("Batch add complete");
        Ok(Some(handle))
    }

    /// `None` when the user declines the confirmation.
    pub fn delete_tag(&mut self, tag: &str) -> Option<BatchHandle> {
        if !self
            .prompt
            .confirm(&format!("Delete the tag \"{tag}\" from every image?"))
        {
            return None;
        }
        let saves = self.state.delete_tag(tag);
        info!(tag, count = saves.len(), "tag deletion dispatched");
        let handle = editor::dispatch(&self.server, saves);
        self.prompt.alert("Tag deletion complete");
        Some(handle)
    }

    pub async fn thumbnail(&self, image_path: &str) -> Thumbnail {
        match self.server.thumbnail(image_path).await {
            Ok(bytes) => Thumbnail::Image(bytes),
            Err(e) => {
                warn!(image_path, error = %e, "thumbnail failed to load");
                Thumbnail::Placeholder
            }
        }
    }

    /// Full-size image of the preview; a failure blanks the preview.
    pub async fn preview_image(&mut self) -> Result<Bytes, TaggerError> {
        let image_path = self
            .state
            .selected()
            .map(|r| r.image_path.clone())
            .ok_or(TaggerError::NoSelection)?;
        match self.server.image(&image_path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) => {
                error!(%image_path, error = %e, "image failed to load");
                self.prompt.alert("Failed to load image");
                self.state.mark_preview_failed();
                Err(e.into())
            }
        }
    }

    /// Sends any pending live edit, then drops the session.
    pub async fn shutdown(self) {
        self.live_save.shutdown().await;
    }
}

fn report_save_failure(prompt: &dyn Prompt, txt_path: &str, e: &ServerError) {
    match e {
        ServerError::Rejected(message) => {
            warn!(txt_path, %message, "save rejected");
            prompt.alert(&format!("Save failed: {message}"));
        }
        other => {
            error!(txt_path, error = %other, "save request failed");
            prompt.alert("Error while saving");
        }
    }
}
