//! Media storage module
//!
//! Handles:
//! - Uploaded file bytes (Cloudflare R2 or a local directory)
//! - Public URL generation for stored objects

mod media;

use async_trait::async_trait;

use crate::error::AppError;

pub use media::{LocalBackend, MediaStorage, R2Backend};

/// Object store holding media bytes
///
/// Keys are relative paths such as `images/<ulid>.png`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaBackend: Send + Sync {
    /// Store `data` under `key`, replacing any existing object
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<(), AppError>;

    /// Remove the object under `key`; missing objects are not an error
    async fn delete(&self, key: &str) -> Result<(), AppError>;
}

pub(crate) fn build_r2_http_client() -> aws_sdk_s3::config::SharedHttpClient {
    use aws_smithy_runtime::client::http::hyper_014::HyperClientBuilder;

    let https_connector = hyper_rustls::HttpsConnectorBuilder::new()
        .with_webpki_roots()
        .https_only()
        .enable_http1()
        .enable_http2()
        .build();

    HyperClientBuilder::new().build(https_connector)
}
