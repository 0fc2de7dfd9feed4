use util::PathEncodingError;

/// Object storage backed by a local directory tree
mod local;
pub use local::LocalStore;

/// Object storage held in memory
mod memory;
pub use memory::MemoryStore;

/// Storage failed. Never retried.
#[derive(thiserror::Error, Debug)]
pub enum PersistenceError {
    #[error("No object \"{1}\" in container \"{0}\"")]
    NotFound(String, String),
    #[error("Invalid object key \"{0}\"")]
    InvalidKey(String),
    #[error("Can't perform IO operation: \"{0}\" is not whitelisted")]
    NotWhitelisted(String),
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
    #[error("{context}: {source}")]
    Io {
        context: String,
        source: std::io::Error,
    },
    #[error("Unable to encode batch: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    PathEncoding(#[from] PathEncodingError),
}

/// Object storage collaborator: named containers holding byte blobs under string keys.
///
/// Keys use `/` as a separator, e.g. `<job_id>/<production_date>.json`.
pub trait ObjectStore {
    /// Store `bytes` under `key`, replacing anything already there.
    fn write(&self, container: &str, key: &str, bytes: &[u8]) -> Result<(), PersistenceError>;

    /// Fetch the bytes stored under `key`.
    fn read(&self, container: &str, key: &str) -> Result<Vec<u8>, PersistenceError>;

    /// Check whether anything is stored under `key`.
    fn exists(&self, container: &str, key: &str) -> Result<bool, PersistenceError>;

    /// All keys in a container, sorted. A missing container is empty.
    fn list(&self, container: &str) -> Result<Vec<String>, PersistenceError>;
}

/// Reject keys that are empty, absolute, or try to leave their container.
fn check_key(key: &str) -> Result<(), PersistenceError> {
    let bad = key.is_empty()
        || key.starts_with('/')
        || key.split('/').any(|part| part.is_empty() || part == "." || part == "..");
    if bad {
        Err(PersistenceError::InvalidKey(key.to_owned()))
    } else {
        Ok(())
    }
}
