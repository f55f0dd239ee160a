//! Content store abstraction: blobs addressed by container, directory and name.

pub mod fs;
pub mod http;
pub mod memory;

pub use fs::FileSystemStore;
pub use http::HttpBlobStore;
pub use memory::InMemoryStore;

use crate::core::error::ClassifiedError;
use crate::core::types::{ErrorKind, StoreLocation};
use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("blob {0} not found")]
    NotFound(StoreLocation),
    #[error("container {0} not found")]
    ContainerNotFound(String),
    #[error("content store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Map onto the pipeline taxonomy; `absent` is the kind used for a missing blob.
    pub fn classify(self, absent: ErrorKind) -> ClassifiedError {
        let (kind, message) = match &self {
            StoreError::NotFound(location) => (absent, format!("{} was not found", location)),
            StoreError::ContainerNotFound(container) => (
                ErrorKind::StoreUnavailable,
                format!("container {} does not exist", container),
            ),
            StoreError::Unavailable(_) => (
                ErrorKind::StoreUnavailable,
                "content store is unavailable".to_string(),
            ),
        };
        ClassifiedError::with_source(kind, message, Box::new(self))
    }
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn fetch(&self, location: &StoreLocation) -> Result<Vec<u8>, StoreError>;

    /// Short backend label for diagnostics.
    fn backend(&self) -> &'static str;
}

/// A path segment that can be resolved without escaping its parent.
pub(crate) fn is_plain_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains(['/', '\\', ':', '\0'])
}
