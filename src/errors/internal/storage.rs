use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Blob storage error: {operation} failed: {source}")]
    Io {
        operation: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Stored file not found: {0}")]
    MissingBlob(String),
}

impl StorageError {
    pub fn io(operation: &'static str, source: std::io::Error) -> Self {
        Self::Io { operation, source }
    }
}
