//! Ordered background persistence
//!
//! `save` serializes on the caller's thread and hands the payload to a single
//! writer task. The writer applies payloads strictly in the order they were
//! queued, so an older snapshot can never land after a newer one.

use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error};

use super::{decode, encode, KeyValueStore, PersistenceBridge};
use crate::annotations::Annotation;
use crate::error::{PersistError, PersistResult};

enum Command {
    Write(String),
    Flush(oneshot::Sender<PersistResult<()>>),
}

/// Bridge whose writes are applied by a single background task
pub struct QueuedBridge<S> {
    store: Arc<S>,
    key: String,
    tx: mpsc::UnboundedSender<Command>,
    writer: JoinHandle<()>,
}

impl<S> QueuedBridge<S>
where
    S: KeyValueStore + Send + Sync + 'static,
{
    /// Start the writer task on the current tokio runtime
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn spawn(store: Arc<S>, key: impl Into<String>) -> Self {
        let key = key.into();
        let (tx, rx) = mpsc::unbounded_channel();
        let writer = tokio::spawn(run_writer(Arc::clone(&store), key.clone(), rx));

        Self {
            store,
            key,
            tx,
            writer,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Wait until every write queued so far has been applied
    ///
    /// Reports the first write failure since the previous flush.
    pub async fn flush(&self) -> PersistResult<()> {
        let (ack, done) = oneshot::channel();
        self.tx
            .send(Command::Flush(ack))
            .map_err(|_| PersistError::WriterClosed)?;
        done.await.map_err(|_| PersistError::WriterClosed)?
    }

    /// Flush, then stop the writer task
    pub async fn close(self) -> PersistResult<()> {
        let flushed = self.flush().await;
        drop(self.tx);
        self.writer.await.map_err(|_| PersistError::WriterClosed)?;
        flushed
    }
}

impl<S> PersistenceBridge for QueuedBridge<S>
where
    S: KeyValueStore + Send + Sync + 'static,
{
    /// Reads the slot directly; writes still queued are not visible
    fn load_strict(&self) -> PersistResult<Vec<Annotation>> {
        let payload = self.store.get(&self.key)?;
        decode(&self.key, payload.as_deref())
    }

    fn save(&self, annotations: &[Annotation]) -> PersistResult<()> {
        let payload = encode(annotations)?;
        self.tx
            .send(Command::Write(payload))
            .map_err(|_| PersistError::WriterClosed)?;
        debug!(key = %self.key, count = annotations.len(), "Queued annotation write");
        Ok(())
    }
}

async fn run_writer<S>(store: Arc<S>, key: String, mut rx: mpsc::UnboundedReceiver<Command>)
where
    S: KeyValueStore + Send + Sync + 'static,
{
    let mut failure: Option<PersistError> = None;

    while let Some(command) = rx.recv().await {
        match command {
            Command::Write(payload) => {
                let store = Arc::clone(&store);
                let slot = key.clone();
                let result = tokio::task::spawn_blocking(move || store.set(&slot, &payload))
                    .await
                    .unwrap_or_else(|e| {
                        Err(PersistError::Save {
                            key: key.clone(),
                            reason: e.to_string(),
                        })
                    });

                if let Err(e) = result {
                    error!(key = %key, "Annotation write failed: {}", e);
                    failure.get_or_insert(e);
                }
            }
            Command::Flush(ack) => {
                let _ = ack.send(failure.take().map_or(Ok(()), Err));
            }
        }
    }

    debug!(key = %key, "Annotation writer stopped");
}
