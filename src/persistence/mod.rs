pub mod error;
pub mod files;
pub mod kv;
pub mod writer;

pub use error::StorageResult;
pub use files::{ensure_data_dir, init_local_dir, log_file};
pub use kv::{load_json, FileStore, KeyValueStore, TASKS_KEY, USER_KEY};
pub use writer::{PendingWrite, Writer};

#[cfg(test)]
pub use kv::MemoryStore;
