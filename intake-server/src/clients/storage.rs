//! Object storage client
//!
//! Upload/list/delete against remote buckets. Object keys are always
//! `{order_id}/{filename}`, so a whole order's files can be removed by
//! prefix.

use reqwest::Client;
use serde::Deserialize;

use crate::utils::{AppError, AppResult, ErrorCode};

#[derive(Debug, Deserialize)]
struct ListedObject {
    name: String,
}

/// Client for the remote object storage service
#[derive(Clone)]
pub struct ObjectStorageClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl ObjectStorageClient {
    pub fn new(http: Client, base_url: String, api_key: String) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn object_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, bucket, path)
    }

    /// Upload an object. Fails on any non-success status; the caller
    /// decides whether to compensate.
    pub async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> AppResult<()> {
        let resp = self
            .http
            .post(self.object_url(bucket, path))
            .bearer_auth(&self.api_key)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| {
                AppError::with_message(
                    ErrorCode::StorageUploadFailed,
                    format!("Storage unreachable: {}", e),
                )
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            tracing::error!(bucket = %bucket, path = %path, status = %status, body = %body,
                "Storage upload failed");
            return Err(AppError::with_message(
                ErrorCode::StorageUploadFailed,
                format!("Storage returned {} uploading {}", status, path),
            ));
        }
        Ok(())
    }

    /// Delete a single object
    pub async fn delete_object(&self, bucket: &str, path: &str) -> AppResult<()> {
        let resp = self
            .http
            .delete(self.object_url(bucket, path))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| {
                AppError::with_message(
                    ErrorCode::StorageDeleteFailed,
                    format!("Storage unreachable: {}", e),
                )
            })?;

        if !resp.status().is_success() {
            return Err(AppError::with_message(
                ErrorCode::StorageDeleteFailed,
                format!("Storage returned {} deleting {}", resp.status(), path),
            ));
        }
        Ok(())
    }

    /// List object names under a prefix
    pub async fn list(&self, bucket: &str, prefix: &str) -> AppResult<Vec<String>> {
        let resp = self
            .http
            .post(format!("{}/storage/v1/object/list/{}", self.base_url, bucket))
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({ "prefix": prefix, "limit": 1000 }))
            .send()
            .await
            .map_err(|e| AppError::upstream("storage", format!("Storage unreachable: {}", e)))?;

        if !resp.status().is_success() {
            return Err(AppError::upstream(
                "storage",
                format!("Storage returned {} listing {}", resp.status(), prefix),
            ));
        }
        let objects: Vec<ListedObject> = resp
            .json()
            .await
            .map_err(|e| AppError::upstream("storage", format!("Invalid storage response: {}", e)))?;
        Ok(objects.into_iter().map(|o| o.name).collect())
    }

    /// Delete every object under a prefix, continuing past per-object
    /// failures (they are logged). Returns the number deleted.
    pub async fn delete_prefix(&self, bucket: &str, prefix: &str) -> AppResult<u32> {
        let names = self.list(bucket, prefix).await?;
        let mut deleted = 0;
        for name in names {
            let path = format!("{}/{}", prefix.trim_end_matches('/'), name);
            match self.delete_object(bucket, &path).await {
                Ok(()) => deleted += 1,
                Err(e) => {
                    tracing::warn!(bucket = %bucket, path = %path, error = %e,
                        "Failed to delete object during prefix cleanup");
                }
            }
        }
        Ok(deleted)
    }

    /// Public URL for an object
    pub fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/public/{}/{}", self.base_url, bucket, path)
    }
}
