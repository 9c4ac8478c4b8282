use super::error::{StorageError, StorageResult};
use super::kv::KeyValueStore;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

enum WriteOp {
    Set(String),
    Remove,
    Barrier,
}

struct WriteRequest {
    key: String,
    op: WriteOp,
    done: Sender<StorageResult<()>>,
}

/// Handle to a queued write.
/// Dropping it is fire-and-forget; `wait` blocks until the write is durable.
#[derive(Debug)]
pub struct PendingWrite {
    done: Receiver<StorageResult<()>>,
}

impl PendingWrite {
    /// Block until the writer has applied this write
    pub fn wait(self) -> StorageResult<()> {
        self.done.recv().unwrap_or(Err(StorageError::WriterStopped))
    }
}

/// Owns the key-value backend on a dedicated thread and applies writes
/// in submission order
pub struct Writer {
    tx: Option<Sender<WriteRequest>>,
    handle: Option<JoinHandle<()>>,
}

impl Writer {
    pub fn spawn<S>(mut store: S) -> Self
    where
        S: KeyValueStore + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<WriteRequest>();

        let handle = thread::spawn(move || {
            for request in rx {
                let result = match &request.op {
                    WriteOp::Set(value) => store.set(&request.key, value),
                    WriteOp::Remove => store.remove(&request.key),
                    WriteOp::Barrier => {
                        let _ = request.done.send(Ok(()));
                        continue;
                    }
                };

                match &result {
                    Ok(()) => debug!(key = %request.key, "persisted"),
                    Err(e) => warn!(key = %request.key, error = %e, "failed to persist"),
                }

                // Nobody waiting is fine
                let _ = request.done.send(result);
            }
        });

        Self {
            tx: Some(tx),
            handle: Some(handle),
        }
    }

    /// Queue `value` under `key`
    pub fn set(&self, key: &str, value: String) -> PendingWrite {
        self.submit(key, WriteOp::Set(value))
    }

    /// Queue removal of `key`
    pub fn remove(&self, key: &str) -> PendingWrite {
        self.submit(key, WriteOp::Remove)
    }

    fn submit(&self, key: &str, op: WriteOp) -> PendingWrite {
        let (done_tx, done_rx) = mpsc::channel();
        let request = WriteRequest {
            key: key.to_string(),
            op,
            done: done_tx,
        };

        let sent = self
            .tx
            .as_ref()
            .map(|tx| tx.send(request).is_ok())
            .unwrap_or(false);
        if !sent {
            warn!(key = %key, "writer stopped, dropping write");
        }

        // A request that never reached the thread drops its sender, so the
        // handle reports WriterStopped
        PendingWrite { done: done_rx }
    }

    /// Block until every write queued so far has been applied
    pub fn flush(&self) -> StorageResult<()> {
        // Writes are applied in order, so waiting on a no-op barrier suffices
        let (done_tx, done_rx) = mpsc::channel::<StorageResult<()>>();
        let tx = self.tx.as_ref().ok_or(StorageError::WriterStopped)?;
        tx.send(WriteRequest {
            key: String::new(),
            op: WriteOp::Barrier,
            done: done_tx,
        })
        .map_err(|_| StorageError::WriterStopped)?;
        done_rx.recv().unwrap_or(Err(StorageError::WriterStopped))
    }
}

impl Drop for Writer {
    fn drop(&mut self) {
        // Closing the channel ends the loop once the queue drains
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("writer thread panicked");
            }
        }
    }
}
