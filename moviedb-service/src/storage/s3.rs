use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::{config::Credentials, primitives::ByteStream, Client};
use bytes::Bytes;

use super::{ImageStore, StorageError};
use crate::config::S3Config;

/// S3 or any S3-compatible store such as MinIO
pub struct S3ImageStore {
    client: Client,
    bucket: String,
    folder: String,
    public_base_url: String,
}

impl S3ImageStore {
    pub async fn new(config: &S3Config) -> Result<Self, StorageError> {
        if config.bucket.is_empty() {
            return Err(StorageError::Config("S3 bucket name is empty".to_string()));
        }

        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(config.region.clone()));
        if let (Some(key_id), Some(secret)) = (&config.access_key_id, &config.secret_access_key) {
            loader = loader.credentials_provider(Credentials::new(
                key_id.clone(),
                secret.clone(),
                None,
                None,
                "moviedb-static",
            ));
        }
        let sdk_config = loader.load().await;

        let mut builder =
            aws_sdk_s3::config::Builder::from(&sdk_config).force_path_style(config.force_path_style);
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        Ok(Self {
            client: Client::from_conf(builder.build()),
            bucket: config.bucket.clone(),
            folder: config.folder.trim_matches('/').to_string(),
            public_base_url: public_base_url(config),
        })
    }

    fn key_for(&self, name: &str) -> String {
        if self.folder.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", self.folder, name)
        }
    }
}

/// Where stored objects can be read from when no explicit base URL is configured
fn public_base_url(config: &S3Config) -> String {
    if let Some(url) = &config.public_base_url {
        return url.trim_end_matches('/').to_string();
    }

    match &config.endpoint {
        Some(endpoint) => format!("{}/{}", endpoint.trim_end_matches('/'), config.bucket),
        None => format!("https://{}.s3.{}.amazonaws.com", config.bucket, config.region),
    }
}

#[async_trait]
impl ImageStore for S3ImageStore {
    async fn put(&self, name: &str, data: Bytes, content_type: &str) -> Result<String, StorageError> {
        let key = self.key_for(name);
        let size = data.len();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| StorageError::Upload(aws_sdk_s3::error::DisplayErrorContext(e).to_string()))?;

        tracing::info!("Uploaded image to s3://{}/{} ({} bytes)", self.bucket, key, size);
        Ok(format!("{}/{}", self.public_base_url, key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s3_config() -> S3Config {
        S3Config {
            bucket: "posters".to_string(),
            region: "eu-west-1".to_string(),
            endpoint: None,
            access_key_id: None,
            secret_access_key: None,
            force_path_style: false,
            folder: "movie-app/uploads".to_string(),
            public_base_url: None,
        }
    }

    #[test]
    fn test_public_url_defaults_to_aws_virtual_host() {
        assert_eq!(
            public_base_url(&s3_config()),
            "https://posters.s3.eu-west-1.amazonaws.com"
        );
    }

    #[test]
    fn test_public_url_uses_custom_endpoint() {
        let config = S3Config {
            endpoint: Some("http://localhost:9000/".to_string()),
            ..s3_config()
        };
        assert_eq!(public_base_url(&config), "http://localhost:9000/posters");
    }

    #[test]
    fn test_explicit_public_url_wins() {
        let config = S3Config {
            endpoint: Some("http://minio:9000".to_string()),
            public_base_url: Some("https://cdn.example.com/".to_string()),
            ..s3_config()
        };
        assert_eq!(public_base_url(&config), "https://cdn.example.com");
    }

    #[tokio::test]
    async fn test_object_keys_live_under_folder() {
        let config = S3Config {
            access_key_id: Some("key".to_string()),
            secret_access_key: Some("secret".to_string()),
            ..s3_config()
        };
        let store = S3ImageStore::new(&config).await.unwrap();
        assert_eq!(store.key_for("a.png"), "movie-app/uploads/a.png");
    }

    #[tokio::test]
    async fn test_empty_bucket_is_rejected() {
        let config = S3Config {
            bucket: String::new(),
            ..s3_config()
        };
        assert!(matches!(
            S3ImageStore::new(&config).await,
            Err(StorageError::Config(_))
        ));
    }
}
