use std::collections::HashMap;
use std::io;

use bytes::Bytes;
use futures::StreamExt;
use futures::stream::BoxStream;
use tokio::sync::RwLock;

use crate::application::ports::{ArtifactStore, ArtifactStoreError};
use crate::domain::StoragePath;

/// Heap-backed artifact store. Nothing survives a restart, which is exactly
/// what tests and scaffolded local runs want.
#[derive(Default)]
pub struct MemoryArtifactStore {
    objects: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ArtifactStore for MemoryArtifactStore {
    async fn store(
        &self,
        path: &StoragePath,
        mut stream: BoxStream<'_, Result<Bytes, io::Error>>,
        _content_length: Option<u64>,
    ) -> Result<u64, ArtifactStoreError> {
        let mut buffer = Vec::new();
        while let Some(chunk) = stream.next().await {
            buffer.extend_from_slice(&chunk.map_err(ArtifactStoreError::Io)?);
        }
        let total = buffer.len() as u64;
        self.objects
            .write()
            .await
            .insert(path.as_str().to_string(), buffer);
        Ok(total)
    }

    async fn fetch(&self, path: &StoragePath) -> Result<Vec<u8>, ArtifactStoreError> {
        self.objects
            .read()
            .await
            .get(path.as_str())
            .cloned()
            .ok_or_else(|| ArtifactStoreError::NotFound(path.to_string()))
    }

    async fn delete(&self, path: &StoragePath) -> Result<(), ArtifactStoreError> {
        self.objects
            .write()
            .await
            .remove(path.as_str())
            .map(|_| ())
            .ok_or_else(|| ArtifactStoreError::DeleteFailed(format!("not found: {}", path)))
    }

    async fn head(&self, path: &StoragePath) -> Result<u64, ArtifactStoreError> {
        self.objects
            .read()
            .await
            .get(path.as_str())
            .map(|data| data.len() as u64)
            .ok_or_else(|| ArtifactStoreError::NotFound(path.to_string()))
    }
}
