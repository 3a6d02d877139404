use anyhow::{bail, Result};
use shared::database::DatabaseConfig;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub storage: StorageConfig,
    pub cors: CorsConfig,
    pub admin: Option<AdminSeedConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => bail!("Unknown environment: {}", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub token_expiry_days: i64,
    /// Sets the `Secure` attribute on the auth cookie
    pub secure_cookie: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Local,
    S3,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "local" | "fs" => Ok(StorageBackend::Local),
            "s3" | "minio" => Ok(StorageBackend::S3),
            other => bail!("Unknown storage backend: {}", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub max_image_bytes: usize,
    pub local: LocalStorageConfig,
    pub s3: S3Config,
}

#[derive(Debug, Clone)]
pub struct LocalStorageConfig {
    pub directory: PathBuf,
    /// Base URL the `/uploads` route is reachable under
    pub public_base_url: String,
}

#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    pub endpoint: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub force_path_style: bool,
    pub folder: String,
    pub public_base_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Empty means any origin
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct AdminSeedConfig {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let environment: Environment = std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .parse()?;
        let port: u16 = std::env::var("PORT")
            .or_else(|_| std::env::var("SERVER_PORT"))
            .unwrap_or_else(|_| "3000".to_string())
            .parse()?;

        Ok(Self {
            server: ServerConfig {
                host: std::env::var("SERVER_HOST")
                    .unwrap_or_else(|_| "0.0.0.0".to_string()),
                port,
                environment,
                max_body_bytes: std::env::var("MAX_BODY_BYTES")
                    .unwrap_or_else(|_| (12 * 1024 * 1024).to_string())
                    .parse()?,
            },
            database: DatabaseConfig::from_env(),
            jwt: JwtConfig {
                secret: std::env::var("JWT_SECRET")?,
                token_expiry_days: std::env::var("JWT_EXPIRY_DAYS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()?,
                secure_cookie: environment == Environment::Production,
            },
            storage: StorageConfig {
                backend: std::env::var("STORAGE_BACKEND")
                    .unwrap_or_else(|_| "local".to_string())
                    .parse()?,
                max_image_bytes: std::env::var("MAX_IMAGE_BYTES")
                    .unwrap_or_else(|_| (10 * 1024 * 1024).to_string())
                    .parse()?,
                local: LocalStorageConfig {
                    directory: std::env::var("UPLOAD_DIR")
                        .unwrap_or_else(|_| "uploads".to_string())
                        .into(),
                    public_base_url: std::env::var("PUBLIC_BASE_URL")
                        .unwrap_or_else(|_| format!("http://localhost:{}", port)),
                },
                s3: S3Config {
                    bucket: std::env::var("S3_BUCKET")
                        .unwrap_or_else(|_| "moviedb-images".to_string()),
                    region: std::env::var("S3_REGION")
                        .unwrap_or_else(|_| "us-east-1".to_string()),
                    endpoint: std::env::var("S3_ENDPOINT").ok(),
                    access_key_id: std::env::var("S3_ACCESS_KEY_ID").ok(),
                    secret_access_key: std::env::var("S3_SECRET_ACCESS_KEY").ok(),
                    force_path_style: std::env::var("S3_FORCE_PATH_STYLE")
                        .unwrap_or_else(|_| "true".to_string())
                        .parse()?,
                    folder: std::env::var("S3_FOLDER")
                        .unwrap_or_else(|_| "movie-app/uploads".to_string()),
                    public_base_url: std::env::var("S3_PUBLIC_BASE_URL").ok(),
                },
            },
            cors: CorsConfig {
                allowed_origins: std::env::var("ALLOWED_ORIGINS")
                    .map(|origins| parse_origins(&origins))
                    .unwrap_or_default(),
            },
            admin: match (
                std::env::var("ADMIN_USERNAME"),
                std::env::var("ADMIN_EMAIL"),
                std::env::var("ADMIN_PASSWORD"),
            ) {
                (Ok(username), Ok(email), Ok(password)) => Some(AdminSeedConfig {
                    username,
                    email,
                    password,
                }),
                _ => None,
            },
        })
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
            environment: Environment::Development,
            max_body_bytes: 2 * 1024 * 1024,
        },
        database: DatabaseConfig::default(),
        jwt: JwtConfig {
            secret: "test_secret_key_for_testing_only".to_string(),
            token_expiry_days: 30,
            secure_cookie: false,
        },
        storage: StorageConfig {
            backend: StorageBackend::Local,
            max_image_bytes: 1024,
            local: LocalStorageConfig {
                directory: std::env::temp_dir().join("moviedb-test-uploads"),
                public_base_url: "http://localhost:3000".to_string(),
            },
            s3: S3Config {
                bucket: "moviedb-images".to_string(),
                region: "us-east-1".to_string(),
                endpoint: None,
                access_key_id: None,
                secret_access_key: None,
                force_path_style: true,
                folder: "movie-app/uploads".to_string(),
                public_base_url: None,
            },
        },
        cors: CorsConfig {
            allowed_origins: Vec::new(),
        },
        admin: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins_skips_blanks() {
        assert_eq!(
            parse_origins("http://localhost:5173, ,https://movies.example.com"),
            vec!["http://localhost:5173", "https://movies.example.com"]
        );
        assert!(parse_origins("").is_empty());
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!("PROD".parse::<Environment>().unwrap(), Environment::Production);
        assert_eq!("minio".parse::<StorageBackend>().unwrap(), StorageBackend::S3);
        assert!("ftp".parse::<StorageBackend>().is_err());
    }
}
