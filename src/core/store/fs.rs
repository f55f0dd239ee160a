use super::{is_plain_segment, ContentStore, StoreError};
use crate::core::types::StoreLocation;
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};

/// Blobs stored as files under `<root>/<container>/<directory>/<name>`.
#[derive(Debug, Clone)]
pub struct FileSystemStore {
    root: PathBuf,
}

impl FileSystemStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileSystemStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, location: &StoreLocation) -> Option<PathBuf> {
        let mut path = self.root.join(&location.container);
        for segment in location.directory_segments() {
            if !is_plain_segment(segment) {
                return None;
            }
            path.push(segment);
        }
        if !is_plain_segment(&location.name) {
            return None;
        }
        path.push(&location.name);
        Some(path)
    }
}

#[async_trait]
impl ContentStore for FileSystemStore {
    async fn fetch(&self, location: &StoreLocation) -> Result<Vec<u8>, StoreError> {
        if !is_plain_segment(&location.container) {
            return Err(StoreError::ContainerNotFound(location.container.clone()));
        }
        let container_dir = self.root.join(&location.container);
        match tokio::fs::metadata(&container_dir).await {
            Ok(metadata) if metadata.is_dir() => {}
            Ok(_) => return Err(StoreError::ContainerNotFound(location.container.clone())),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::ContainerNotFound(location.container.clone()))
            }
            Err(err) => return Err(StoreError::Unavailable(err.to_string())),
        }

        let path = self
            .resolve(location)
            .ok_or_else(|| StoreError::NotFound(location.clone()))?;
        match tokio::fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => {}
            Ok(_) => return Err(StoreError::NotFound(location.clone())),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(location.clone()))
            }
            Err(err) => return Err(StoreError::Unavailable(err.to_string())),
        }

        tokio::fs::read(&path)
            .await
            .map_err(|err| StoreError::Unavailable(format!("{}: {}", path.display(), err)))
    }

    fn backend(&self) -> &'static str {
        "filesystem"
    }
}
