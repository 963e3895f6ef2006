use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by an [`ImageStore`](crate::ImageStore)
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{key} not found in {}", .location.display())]
    NotFound { key: String, location: PathBuf },

    #[error("IO error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}
