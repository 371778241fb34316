//! Payment proof storage
//!
//! UPI screenshots are written to storage before the booking that
//! references them is created; only the returned reference is persisted.

use async_trait::async_trait;
use axum::body::Bytes;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Unsupported file type '{0}', expected a JPEG, PNG or WebP image")]
    UnsupportedType(String),

    #[error("File exceeds the {limit} byte limit")]
    TooLarge { limit: usize },

    #[error("Empty upload")]
    Empty,

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait ProofStorage: Send + Sync {
    /// Persist the image and return a stable reference to it.
    async fn store(&self, content_type: &str, bytes: Bytes) -> Result<String, StorageError>;

    /// Remove a stored file whose booking was never created.
    async fn discard(&self, reference: &str) -> Result<(), StorageError>;
}

fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

/// Files on local disk under `root`, named `<uuid>.<ext>`
#[derive(Debug, Clone)]
pub struct LocalProofStorage {
    root: PathBuf,
    max_bytes: usize,
}

impl LocalProofStorage {
    pub fn new(root: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            root: root.into(),
            max_bytes,
        }
    }
}

#[async_trait]
impl ProofStorage for LocalProofStorage {
    async fn store(&self, content_type: &str, bytes: Bytes) -> Result<String, StorageError> {
        let extension = extension_for(content_type)
            .ok_or_else(|| StorageError::UnsupportedType(content_type.to_string()))?;
        if bytes.is_empty() {
            return Err(StorageError::Empty);
        }
        if bytes.len() > self.max_bytes {
            return Err(StorageError::TooLarge { limit: self.max_bytes });
        }

        tokio::fs::create_dir_all(&self.root).await?;
        let path = self.root.join(format!("{}.{}", Uuid::new_v4(), extension));
        tokio::fs::write(&path, &bytes).await?;

        tracing::debug!("💾 Stored payment proof {} ({} bytes)", path.display(), bytes.len());
        Ok(path.to_string_lossy().into_owned())
    }

    async fn discard(&self, reference: &str) -> Result<(), StorageError> {
        let path = PathBuf::from(reference);
        if !path.starts_with(&self.root) {
            return Ok(());
        }
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage() -> LocalProofStorage {
        LocalProofStorage::new(std::env::temp_dir().join(format!("proofs-{}", Uuid::new_v4())), 16)
    }

    #[tokio::test]
    async fn test_store_and_discard() {
        let storage = storage();
        let reference = storage
            .store("image/png", Bytes::from_static(b"\x89PNG fake"))
            .await
            .unwrap();
        assert!(reference.ends_with(".png"));
        assert!(tokio::fs::metadata(&reference).await.is_ok());

        storage.discard(&reference).await.unwrap();
        assert!(tokio::fs::metadata(&reference).await.is_err());
    }

    #[tokio::test]
    async fn test_rejects_non_images_and_oversize() {
        let storage = storage();
        let err = storage
            .store("application/pdf", Bytes::from_static(b"%PDF"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::UnsupportedType(_)));

        let err = storage
            .store("image/jpeg", Bytes::from(vec![0u8; 17]))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::TooLarge { limit: 16 }));
    }
}
