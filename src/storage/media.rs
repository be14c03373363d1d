//! Media storage backends
//!
//! R2 for deployments, a local directory for development and tests.
//! Public URLs are `{public_url}/{key}` for both.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_s3::Client as S3Client;

use super::{MediaBackend, build_r2_http_client};
use crate::config::{AppConfig, CloudflareConfig, MediaBackendKind, MediaStorageConfig};
use crate::error::AppError;

/// Media storage service
///
/// Wraps the configured backend and turns keys into public URLs.
#[derive(Clone)]
pub struct MediaStorage {
    backend: Arc<dyn MediaBackend>,
    /// Public URL base, e.g. "https://media.example.com"
    public_url: String,
}

impl MediaStorage {
    pub fn new(backend: Arc<dyn MediaBackend>, public_url: impl Into<String>) -> Self {
        Self {
            backend,
            public_url: public_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Build the backend selected by `storage.media.backend`
    ///
    /// # Errors
    /// Returns error if the R2 backend is selected without credentials
    pub async fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let media = &config.storage.media;
        let backend: Arc<dyn MediaBackend> = match media.backend {
            MediaBackendKind::Local => Arc::new(LocalBackend::new(media.local_root.clone())),
            MediaBackendKind::R2 => {
                let cloudflare = config.cloudflare.as_ref().ok_or_else(|| {
                    AppError::Config("cloudflare credentials are required for r2".to_string())
                })?;
                Arc::new(R2Backend::new(media, cloudflare))
            }
        };

        tracing::info!(backend = ?media.backend, public_url = %media.public_url, "Media storage ready");
        Ok(Self::new(backend, media.public_url.clone()))
    }

    /// Upload a file and return its public URL
    ///
    /// # Example
    /// ```ignore
    /// let url = storage.upload("images/abc123.png", data, "image/png").await?;
    /// // Returns: https://media.example.com/images/abc123.png
    /// ```
    pub async fn upload(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<String, AppError> {
        let size = data.len();
        self.backend.put(key, data, content_type).await?;
        crate::metrics::MEDIA_BYTES_UPLOADED.inc_by(size as f64);
        tracing::debug!(key, size, "Stored media object");
        Ok(self.get_public_url(key))
    }

    pub async fn delete(&self, key: &str) -> Result<(), AppError> {
        self.backend.delete(key).await
    }

    pub fn get_public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_url, key)
    }
}

/// Cloudflare R2 bucket (S3-compatible API)
pub struct R2Backend {
    client: S3Client,
    bucket: String,
}

impl R2Backend {
    pub fn new(config: &MediaStorageConfig, cloudflare: &CloudflareConfig) -> Self {
        use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};

        // R2 endpoint: https://{account_id}.r2.cloudflarestorage.com
        let endpoint = format!("https://{}.r2.cloudflarestorage.com", cloudflare.account_id);

        let credentials = Credentials::new(
            &cloudflare.r2_access_key_id,
            &cloudflare.r2_secret_access_key,
            None,
            None,
            "socialhub-r2",
        );

        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .http_client(build_r2_http_client())
            .region(Region::new("auto"))
            .endpoint_url(&endpoint)
            .credentials_provider(credentials)
            .build();

        Self {
            client: S3Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
        }
    }
}

#[async_trait]
impl MediaBackend for R2Backend {
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<(), AppError> {
        use aws_sdk_s3::primitives::ByteStream;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .cache_control("public, max-age=31536000")
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("R2 upload failed: {}", e)))?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("R2 delete failed: {}", e)))?;

        Ok(())
    }
}

/// Files under a local directory
pub struct LocalBackend {
    root: PathBuf,
}

impl LocalBackend {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Resolve `key` inside the root, refusing anything that escapes it
    fn resolve(&self, key: &str) -> Result<PathBuf, AppError> {
        let relative = Path::new(key);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if key.is_empty() || escapes {
            return Err(AppError::validation("Invalid media key"));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl MediaBackend for LocalBackend {
    async fn put(&self, key: &str, data: Vec<u8>, _content_type: &str) -> Result<(), AppError> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Storage(format!("Failed to create media dir: {}", e)))?;
        }
        tokio::fs::write(&path, data)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write media file: {}", e)))
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        let path = self.resolve(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Storage(format!("Failed to delete media file: {}", e))),
        }
    }
}
