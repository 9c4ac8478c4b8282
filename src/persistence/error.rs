use thiserror::Error;

/// Failures of the key-value layer
#[derive(Error, Debug)]
pub enum StorageError {
    /// File system failure from the backing store
    #[error(transparent)]
    Backend(#[from] anyhow::Error),

    /// A stored value could not be decoded
    #[error("Failed to decode value for key '{key}': {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The background writer is no longer running
    #[error("Background writer stopped before the write completed")]
    WriterStopped,
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;
