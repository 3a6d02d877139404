use async_trait::async_trait;
use bytes::Bytes;
use std::path::PathBuf;

use super::{ImageStore, StorageError};
use crate::config::LocalStorageConfig;

/// Route prefix the upload directory is served under
pub const UPLOADS_ROUTE: &str = "/uploads";

pub struct LocalImageStore {
    directory: PathBuf,
    public_base_url: String,
}

impl LocalImageStore {
    pub async fn new(config: &LocalStorageConfig) -> Result<Self, StorageError> {
        tokio::fs::create_dir_all(&config.directory).await?;

        Ok(Self {
            directory: config.directory.clone(),
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn put(&self, name: &str, data: Bytes, _content_type: &str) -> Result<String, StorageError> {
        let path = self.directory.join(name);
        tokio::fs::write(&path, &data).await?;

        tracing::info!("Stored image {} ({} bytes)", path.display(), data.len());
        Ok(format!("{}{}/{}", self.public_base_url, UPLOADS_ROUTE, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_writes_file_and_returns_url() {
        let dir = tempfile::tempdir().unwrap();
        let config = LocalStorageConfig {
            directory: dir.path().join("uploads"),
            public_base_url: "http://localhost:3000/".to_string(),
        };

        let store = LocalImageStore::new(&config).await.unwrap();
        let url = store
            .put("image-1-poster.png", Bytes::from_static(b"png-bytes"), "image/png")
            .await
            .unwrap();

        assert_eq!(url, "http://localhost:3000/uploads/image-1-poster.png");
        let written = std::fs::read(dir.path().join("uploads/image-1-poster.png")).unwrap();
        assert_eq!(written, b"png-bytes");
    }
}
