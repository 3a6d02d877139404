use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;

use crate::config::{StorageBackend, StorageConfig};

pub mod local;
pub mod s3;

pub use local::LocalImageStore;
pub use s3::S3ImageStore;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Storage configuration error: {0}")]
    Config(String),
}

/// Somewhere uploaded images can be written and later fetched by URL
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store `data` under `name` and return its public URL
    async fn put(&self, name: &str, data: Bytes, content_type: &str) -> Result<String, StorageError>;
}

pub async fn build_image_store(config: &StorageConfig) -> Result<Arc<dyn ImageStore>, StorageError> {
    match config.backend {
        StorageBackend::Local => {
            let store = LocalImageStore::new(&config.local).await?;
            tracing::info!("Storing images on disk at {}", config.local.directory.display());
            Ok(Arc::new(store))
        }
        StorageBackend::S3 => {
            let store = S3ImageStore::new(&config.s3).await?;
            tracing::info!("Storing images in bucket {}", config.s3.bucket);
            Ok(Arc::new(store))
        }
    }
}

const ALLOWED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

fn extension(file_name: &str) -> Option<String> {
    std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

fn is_allowed_mime(m: &mime::Mime) -> bool {
    m.type_() == mime::IMAGE
        && (m.subtype() == mime::JPEG
            || m.subtype() == mime::PNG
            || m.subtype().as_str() == "webp"
            || m.subtype().as_str() == "jpg")
}

/// The file extension must name a jpeg, png or webp image, and so must the
/// declared MIME type when the client sent one
pub fn is_allowed_image(file_name: &str, content_type: Option<&str>) -> bool {
    let extension_ok = extension(file_name)
        .map(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false);

    let mime_ok = match content_type {
        Some(ct) => ct
            .parse::<mime::Mime>()
            .map(|m| is_allowed_mime(&m))
            .unwrap_or(false),
        None => true,
    };

    extension_ok && mime_ok
}

/// Content type to store an image with, derived from its extension
pub fn content_type_for(file_name: &str) -> &'static str {
    match extension(file_name).as_deref() {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    }
}

/// Unique, path-safe object name derived from the uploaded file name
pub fn object_name(file_name: &str) -> String {
    let base = std::path::Path::new(file_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("image");

    let sanitized: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect();
    let sanitized = sanitized.trim_start_matches('.');

    format!("{}-{}", Utc::now().timestamp_millis(), sanitized)
}
