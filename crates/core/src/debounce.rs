//! Trailing-edge debounce: of a burst of calls, only the last one is delivered,
//! once no new call has arrived for the quiet period.

use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{trace, warn};

pub struct Debouncer<T> {
    tx: mpsc::UnboundedSender<T>,
    worker: JoinHandle<()>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Spawns the worker on the current tokio runtime.
    pub fn new<F, Fut>(quiet: Duration, handler: F) -> Self
    where
        F: Fn(T) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<T>();
        let worker = tokio::spawn(async move {
            while let Some(mut latest) = rx.recv().await {
                loop {
                    tokio::select! {
                        next = rx.recv() => match next {
                            Some(value) => {
                                trace!("debounced call superseded");
                                latest = value;
                            }
                            // Sender gone: deliver what we have and stop.
                            None => break,
                        },
                        _ = tokio::time::sleep(quiet) => break,
                    }
                }
                handler(latest).await;
            }
        });
        Self { tx, worker }
    }

    pub fn call(&self, value: T) {
        if self.tx.send(value).is_err() {
            warn!("debounce worker has stopped; call dropped");
        }
    }

    /// Delivers the pending value, if any, without waiting out the quiet period.
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(e) = self.worker.await {
            warn!("debounce worker ended abnormally: {e}");
        }
    }
}
