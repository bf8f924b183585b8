//! File storage for uploaded bootcamp photos.
//!
//! The trait is object safe so the application state can hold an
//! `Arc<dyn FileStorage>` and tests can swap in a temporary directory.
//!
//! ```ignore
//! use devcamper_core::file_storage::{FileStorage, LocalFileStorage};
//!
//! let storage = LocalFileStorage::new(PathBuf::from("./public/uploads"), 1_000_000);
//! let key = storage.save("photo_5d713995.jpg", &bytes).await?;
//! storage.delete(&key).await?;
//! ```

use std::fmt;
use std::path::PathBuf;
use tokio::fs;

use crate::BoxFuture;

pub trait FileStorage: Send + Sync {
    /// Stores `content` under `key`, replacing any existing file, and returns the key.
    fn save<'a>(&'a self, key: &'a str, content: &'a [u8])
    -> BoxFuture<'a, Result<String, StorageError>>;

    /// Removes `key`. Missing files are not an error.
    fn delete<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), StorageError>>;

    /// Largest accepted upload, in bytes.
    fn max_file_size(&self) -> usize;
}

#[derive(Debug)]
pub enum StorageError {
    InvalidFileSize { max_bytes: usize },
    InvalidMimeType { received: String },
    IoError(std::io::Error),
    InvalidKey(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFileSize { max_bytes } => {
                write!(f, "Please upload an image less than {} bytes", max_bytes)
            }
            Self::InvalidMimeType { received } => {
                write!(f, "Please upload an image file (received '{}')", received)
            }
            Self::IoError(e) => write!(f, "I/O error: {}", e),
            Self::InvalidKey(msg) => write!(f, "Invalid storage key: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(e)
    }
}

/// Accepts only `image/*` content types.
pub fn ensure_image(content_type: Option<&str>) -> Result<(), StorageError> {
    match content_type {
        Some(mime) if mime.starts_with("image") => Ok(()),
        other => Err(StorageError::InvalidMimeType {
            received: other.unwrap_or("unknown").to_string(),
        }),
    }
}

/// Stores files in a local directory that the router also serves statically.
#[derive(Clone, Debug)]
pub struct LocalFileStorage {
    base_dir: PathBuf,
    max_file_size: usize,
}

impl LocalFileStorage {
    pub fn new(base_dir: PathBuf, max_file_size: usize) -> Self {
        Self {
            base_dir,
            max_file_size,
        }
    }

    fn validate_key(key: &str) -> Result<(), StorageError> {
        if key.is_empty() || key.contains("..") || key.starts_with('/') || key.starts_with('\\') {
            return Err(StorageError::InvalidKey(
                "Key must not be empty, contain '..', or start with a separator".to_string(),
            ));
        }

        if !key
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '/' || c == '.')
        {
            return Err(StorageError::InvalidKey(
                "Key contains invalid characters".to_string(),
            ));
        }

        Ok(())
    }
}

impl FileStorage for LocalFileStorage {
    fn save<'a>(
        &'a self,
        key: &'a str,
        content: &'a [u8],
    ) -> BoxFuture<'a, Result<String, StorageError>> {
        Box::pin(async move {
            Self::validate_key(key)?;

            if content.len() > self.max_file_size {
                return Err(StorageError::InvalidFileSize {
                    max_bytes: self.max_file_size,
                });
            }

            let file_path = self.base_dir.join(key);
            if let Some(parent) = file_path.parent() {
                fs::create_dir_all(parent).await?;
            }
            fs::write(&file_path, content).await?;

            tracing::debug!(path = %file_path.display(), bytes = content.len(), "Stored upload");
            Ok(key.to_string())
        })
    }

    fn delete<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            Self::validate_key(key)?;

            match fs::remove_file(self.base_dir.join(key)).await {
                Ok(_) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            }
        })
    }

    fn max_file_size(&self) -> usize {
        self.max_file_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("devcamper-storage-{}", std::process::id()))
    }

    fn temp_storage(max: usize) -> LocalFileStorage {
        LocalFileStorage::new(temp_dir(), max)
    }

    #[test]
    fn test_validate_key_accepts_photo_names() {
        assert!(LocalFileStorage::validate_key("photo_5d725a1b7b292f5f8ceff788.jpg").is_ok());
        assert!(LocalFileStorage::validate_key("bootcamps/photo_1.png").is_ok());
    }

    #[test]
    fn test_validate_key_rejects_traversal_and_absolute() {
        assert!(LocalFileStorage::validate_key("../../etc/passwd").is_err());
        assert!(LocalFileStorage::validate_key("/etc/passwd").is_err());
        assert!(LocalFileStorage::validate_key("\\windows").is_err());
        assert!(LocalFileStorage::validate_key("photo 1.jpg").is_err());
    }

    #[test]
    fn test_ensure_image() {
        assert!(ensure_image(Some("image/png")).is_ok());
        assert!(ensure_image(Some("image/jpeg")).is_ok());
        assert!(ensure_image(Some("application/pdf")).is_err());
        assert!(ensure_image(None).is_err());
    }

    #[tokio::test]
    async fn test_save_rejects_oversized_content() {
        let storage = temp_storage(4);
        let err = storage.save("photo_big.jpg", b"12345").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidFileSize { max_bytes: 4 }));
    }

    #[tokio::test]
    async fn test_save_then_delete() {
        let storage = temp_storage(1024);
        let key = storage.save("photo_roundtrip.jpg", b"jpeg").await.unwrap();
        let path = temp_dir().join(&key);
        assert_eq!(std::fs::read(&path).unwrap(), b"jpeg");

        storage.delete(&key).await.unwrap();
        assert!(!path.exists());
        // Deleting again is a no-op.
        storage.delete(&key).await.unwrap();
    }
}
