use std::env;

use async_trait::async_trait;
use uuid::Uuid;

use crate::common::error::{BackendError, Result};

/// Upload seam for customer files. The production implementation talks to
/// an S3-compatible storage HTTP API; tests substitute an in-memory fake.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under a fresh object key derived from `file_name` and
    /// return the public URL of the stored object.
    async fn put(&self, file_name: &str, content_type: &str, bytes: Vec<u8>) -> Result<String>;
}

/// Object storage over the bucket HTTP API (Supabase-style). Config via
/// env: `STORAGE_URL`, `STORAGE_BUCKET`, `STORAGE_SERVICE_KEY`.
pub struct BucketStore {
    http: reqwest::Client,
    base_url: String,
    bucket: String,
    service_key: String,
}

impl BucketStore {
    pub fn from_env() -> Result<Self> {
        let base_url = env::var("STORAGE_URL").map_err(|_| BackendError::Storage {
            message: "STORAGE_URL environment variable not set".to_string(),
        })?;
        let bucket = env::var("STORAGE_BUCKET").map_err(|_| BackendError::Storage {
            message: "STORAGE_BUCKET environment variable not set".to_string(),
        })?;
        let service_key = env::var("STORAGE_SERVICE_KEY").map_err(|_| BackendError::Storage {
            message: "STORAGE_SERVICE_KEY environment variable not set".to_string(),
        })?;

        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            bucket,
            service_key,
        })
    }
}

#[async_trait]
impl ObjectStore for BucketStore {
    async fn put(&self, file_name: &str, content_type: &str, bytes: Vec<u8>) -> Result<String> {
        let key = format!("uploads/{}-{}", Uuid::new_v4(), file_name);
        let base = self.base_url.trim_end_matches('/');
        let endpoint = format!("{}/storage/v1/object/{}/{}", base, self.bucket, key);

        let response = self
            .http
            .put(&endpoint)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Bearer {}", self.service_key),
            )
            .header("apikey", self.service_key.clone())
            .header(reqwest::header::CONTENT_TYPE, content_type.to_string())
            .query(&[("upsert", "true")])
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Storage {
                message: format!("Upload failed: {status} - {body}"),
            });
        }

        Ok(format!(
            "{}/storage/v1/object/public/{}/{}",
            base, self.bucket, key
        ))
    }
}
