//! Public storage for job photos: the local public disk or an S3 bucket.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

/// Directory (or key prefix) photos are stored under.
pub const IMAGES_DIR: &str = "images";
pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("S3 request failed: {0}")]
    S3(String),

    #[error("Refusing path outside the storage root: {0}")]
    InvalidPath(String),
}

#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Stores `bytes` at the relative `path`.
    async fn put(&self, path: &str, bytes: Bytes, content_type: &str) -> Result<(), StorageError>;

    async fn delete(&self, path: &str) -> Result<(), StorageError>;
}

/// Why an uploaded photo was refused.
#[derive(Debug, PartialEq)]
pub enum PhotoRejection {
    Empty,
    TooLarge { max_bytes: usize },
    UnsupportedExtension,
    NotAnImage,
}

impl PhotoRejection {
    pub fn message(&self) -> String {
        match self {
            PhotoRejection::Empty => "The photos file is empty.".to_string(),
            PhotoRejection::TooLarge { max_bytes } => format!(
                "The photos file must not be greater than {} kilobytes.",
                max_bytes / 1024
            ),
            PhotoRejection::UnsupportedExtension => {
                "The photos file must be a jpg, jpeg, png, webp or gif.".to_string()
            }
            PhotoRejection::NotAnImage => "The photos file must be an image.".to_string(),
        }
    }
}

/// A photo that passed the checks, with the path it will be stored at.
#[derive(Debug)]
pub struct AcceptedPhoto {
    pub path: String,
    pub content_type: &'static str,
    pub bytes: Bytes,
}

fn sniff_image(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        [0x89, 0x50, 0x4E, 0x47, ..] => Some("image/png"),
        [0x47, 0x49, 0x46, 0x38, ..] => Some("image/gif"),
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Some("image/webp"),
        _ => None,
    }
}

fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        _ => "bin",
    }
}

/// Checks size, extension and magic bytes, and names the file `images/<uuid>.<ext>`.
/// The stored extension follows the sniffed content, not the client's file name.
pub fn accept_photo(
    file_name: &str,
    bytes: Bytes,
    max_bytes: usize,
) -> Result<AcceptedPhoto, PhotoRejection> {
    if bytes.is_empty() {
        return Err(PhotoRejection::Empty);
    }
    if bytes.len() > max_bytes {
        return Err(PhotoRejection::TooLarge { max_bytes });
    }
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(PhotoRejection::UnsupportedExtension);
    }
    let content_type = sniff_image(&bytes).ok_or(PhotoRejection::NotAnImage)?;

    Ok(AcceptedPhoto {
        path: format!("{IMAGES_DIR}/{}.{}", Uuid::new_v4(), extension_for(content_type)),
        content_type,
        bytes,
    })
}

/// Files under a root directory, served separately as static files.
pub struct LocalImageStore {
    root: PathBuf,
}

impl LocalImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        LocalImageStore { root: root.into() }
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(path);
        let safe = !path.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(StorageError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn put(&self, path: &str, bytes: Bytes, _content_type: &str) -> Result<(), StorageError> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, &bytes).await?;
        info!("Stored {} bytes at {}", bytes.len(), target.display());
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        let target = self.resolve(path)?;
        match tokio::fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

pub struct S3ImageStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3ImageStore {
    pub fn new(client: aws_sdk_s3::Client, bucket: String) -> Self {
        S3ImageStore { client, bucket }
    }
}

#[async_trait]
impl ImageStore for S3ImageStore {
    async fn put(&self, path: &str, bytes: Bytes, content_type: &str) -> Result<(), StorageError> {
        let size = bytes.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(path)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::S3(e.to_string()))?;

        info!("Uploaded {size} bytes to s3://{}/{}", self.bucket, path);
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
            .map_err(|e| StorageError::S3(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];

    #[test]
    fn test_accepts_png_and_names_it_by_content() {
        let photo = accept_photo("Sink.JPG", Bytes::from_static(PNG), 1024).unwrap();
        assert!(photo.path.starts_with("images/"));
        assert!(photo.path.ends_with(".png"));
        assert_eq!(photo.content_type, "image/png");
    }

    #[test]
    fn test_rejections() {
        assert_eq!(
            accept_photo("a.png", Bytes::new(), 1024).unwrap_err(),
            PhotoRejection::Empty
        );
        assert_eq!(
            accept_photo("a.png", Bytes::from_static(PNG), 4).unwrap_err(),
            PhotoRejection::TooLarge { max_bytes: 4 }
        );
        assert_eq!(
            accept_photo("a.exe", Bytes::from_static(PNG), 1024).unwrap_err(),
            PhotoRejection::UnsupportedExtension
        );
        assert_eq!(
            accept_photo("a.png", Bytes::from_static(b"plain text here"), 1024).unwrap_err(),
            PhotoRejection::NotAnImage
        );
    }

    #[tokio::test]
    async fn test_local_store_writes_and_deletes() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalImageStore::new(dir.path());

        store
            .put("images/a.png", Bytes::from_static(PNG), "image/png")
            .await
            .unwrap();
        let written = tokio::fs::read(dir.path().join("images/a.png")).await.unwrap();
        assert_eq!(written, PNG);

        store.delete("images/a.png").await.unwrap();
        assert!(!dir.path().join("images/a.png").exists());
        // Deleting again is a no-op.
        store.delete("images/a.png").await.unwrap();
    }

    #[tokio::test]
    async fn test_local_store_refuses_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalImageStore::new(dir.path());
        for path in ["../escape.png", "/etc/passwd", ""] {
            let err = store
                .put(path, Bytes::from_static(PNG), "image/png")
                .await
                .unwrap_err();
            assert!(matches!(err, StorageError::InvalidPath(_)), "{path}");
        }
    }
}
