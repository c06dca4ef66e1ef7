//! Batch annotation edits: rewriting every record and dispatching one
//! independent save per record.

use crate::models::{BatchPosition, SaveRequest};
use crate::registry::Registry;
use crate::tags::{insert_tags, remove_tag};
use providers::{AnnotationServer, ServerError};
use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Rewrites every record in place and returns the saves to send.
pub fn rewrite_all<F>(registry: &mut Registry, mut rewrite: F) -> Vec<SaveRequest>
where
    F: FnMut(&str) -> String,
{
    registry
        .records_mut()
        .map(|record| {
            record.annotation = rewrite(&record.annotation);
            SaveRequest {
                txt_path: record.txt_path.clone(),
                content: record.annotation.clone(),
            }
        })
        .collect()
}

pub fn add_to_all(registry: &mut Registry, content: &str, position: BatchPosition) -> Vec<SaveRequest> {
    rewrite_all(registry, |annotation| insert_tags(annotation, content, position))
}

pub fn delete_from_all(registry: &mut Registry, tag: &str) -> Vec<SaveRequest> {
    rewrite_all(registry, |annotation| remove_tag(annotation, tag))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub sent: usize,
    pub failed: usize,
}

/// Saves already in flight. Dropping the handle leaves them running.
pub struct BatchHandle {
    tasks: Vec<(String, JoinHandle<Result<(), ServerError>>)>,
}

impl BatchHandle {
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Waits for every request and logs the ones that failed.
    pub async fn settle(self) -> BatchSummary {
        let mut summary = BatchSummary::default();
        for (txt_path, task) in self.tasks {
            summary.sent += 1;
            match task.await {
                Ok(Ok(())) => debug!(%txt_path, "batch save confirmed"),
                Ok(Err(e)) => {
                    summary.failed += 1;
                    warn!(%txt_path, error = %e, "batch save failed");
                }
                Err(e) => {
                    summary.failed += 1;
                    warn!(%txt_path, error = %e, "batch save task aborted");
                }
            }
        }
        summary
    }
}

/// Fires every save concurrently without waiting on the others.
pub fn dispatch(server: &Arc<dyn AnnotationServer>, requests: Vec<SaveRequest>) -> BatchHandle {
    let tasks = requests
        .into_iter()
        .map(|request| {
            let server = Arc::clone(server);
            let txt_path = request.txt_path.clone();
            let task = tokio::spawn(async move { server.save_annotation(&request).await });
            (txt_path, task)
        })
        .collect();
    BatchHandle { tasks }
}
