use crate::error::{AppError, Result};
use async_trait::async_trait;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use std::time::Duration;

/// Write-once blob storage with presigned retrieval links.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, bucket: &str, key: &str, body: Vec<u8>, content_type: &str) -> Result<()>;

    async fn presigned_get(&self, bucket: &str, key: &str, expires_in: Duration) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
}

impl S3ObjectStore {
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }

    /// Builds a client from the standard AWS provider chain (env, profile,
    /// instance role)
    pub async fn from_env() -> Self {
        let shared = aws_config::load_from_env().await;
        Self::new(aws_sdk_s3::Client::new(&shared))
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(&self, bucket: &str, key: &str, body: Vec<u8>, content_type: &str) -> Result<()> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("put_object {}/{} failed: {:?}", bucket, key, e)))?;

        tracing::info!("Wrote s3://{}/{}", bucket, key);
        Ok(())
    }

    async fn presigned_get(&self, bucket: &str, key: &str, expires_in: Duration) -> Result<String> {
        let presigning = PresigningConfig::expires_in(expires_in)
            .map_err(|e| AppError::Storage(format!("Invalid presign expiry: {}", e)))?;

        let request = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| AppError::Storage(format!("Presigning {}/{} failed: {:?}", bucket, key, e)))?;

        Ok(request.uri().to_string())
    }
}
