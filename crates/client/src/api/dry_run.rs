//! Dry-run server API.
//!
//! This module provides an API implementation that wraps another one and
//! prevents mutating requests from being sent, while indicating success on
//! return.

use super::{Api, Upload};
use crate::ApiHandle;
use crate::error::Result;
use async_trait::async_trait;
use filestation_integrity::{ComputedHashes, FileMetadataRecord, UpdatePayload};

/// Dry-run API.
///
/// Wraps another API handle, forwarding reads (and session calls, so guarded
/// flows still behave) but silently dropping every write, logging an
/// [`info event`](tracing::Event) instead.
#[derive(Clone)]
pub struct DryRunApi {
    inner: ApiHandle,
}
impl DryRunApi {
    pub fn new(inner: ApiHandle) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl Api for DryRunApi {
    fn base_url(&self) -> &str {
        self.inner.base_url()
    }

    async fn check_session(&self) -> Result<Option<String>> {
        self.inner.check_session().await
    }

    async fn login(&self, username: &str, password: &str) -> Result<()> {
        self.inner.login(username, password).await
    }

    async fn logout(&self) -> Result<()> {
        self.inner.logout().await
    }

    async fn file_metadata(&self, path: &str) -> Result<FileMetadataRecord> {
        self.inner.file_metadata(path).await
    }

    async fn recalculate_hashes(&self, path: &str) -> Result<ComputedHashes> {
        self.inner.recalculate_hashes(path).await
    }

    async fn save_metadata(&self, payload: &UpdatePayload) -> Result<()> {
        let fields: Vec<&str> = payload.fields().map(|(key, _)| key).collect();
        tracing::info!(path = payload.file_path(), ?fields, "Skipping metadata save during dry run");
        Ok(())
    }

    async fn list_folders(&self, path: &str) -> Result<Vec<String>> {
        self.inner.list_folders(path).await
    }

    async fn upload(&self, upload: &Upload) -> Result<()> {
        upload.validate()?;
        tracing::info!(dir = %upload.dir, files = upload.files.len(), "Skipping upload during dry run");
        Ok(())
    }

    async fn delete(&self, dir: &str, items: &[String]) -> Result<()> {
        tracing::info!(dir, ?items, "Skipping delete during dry run");
        Ok(())
    }

    async fn rename(&self, path: &str, new_name: &str) -> Result<()> {
        tracing::info!(path, new_name, "Skipping rename during dry run");
        Ok(())
    }

    async fn move_items(&self, items: &[String], destination: &str) -> Result<()> {
        tracing::info!(destination, ?items, "Skipping move during dry run");
        Ok(())
    }

    async fn download(&self, items: &[String]) -> Result<Vec<u8>> {
        self.inner.download(items).await
    }

    async fn create_folder(&self, dir: &str, name: &str) -> Result<()> {
        tracing::info!(dir, name, "Skipping folder creation during dry run");
        Ok(())
    }

    async fn save_readme(&self, dir: &str, content: &str) -> Result<()> {
        tracing::info!(dir, bytes = content.len(), "Skipping README save during dry run");
        Ok(())
    }

    async fn preview_markdown(&self, content: &str) -> Result<String> {
        self.inner.preview_markdown(content).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MockApi, Request, UploadFile, Versioning};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_writes_never_reach_the_inner_api() {
        let mock = Arc::new(MockApi::default().with_session("alice").with_record("/a.bin", [("Version", "1")]));
        let api = DryRunApi::new(mock.clone());

        api.delete("/", &["/a.bin".to_string()]).await.unwrap();
        api.rename("/a.bin", "b.bin").await.unwrap();
        api.move_items(&["/a.bin".to_string()], "/fw").await.unwrap();
        api.create_folder("/", "fw").await.unwrap();
        api.save_readme("/", "# hi").await.unwrap();
        let upload = Upload {
            dir: "/".to_string(),
            versioning: Versioning::Same("1".to_string()),
            files: vec![UploadFile {
                name: "c.bin".to_string(),
                data: vec![0],
            }],
        };
        api.upload(&upload).await.unwrap();
        assert!(mock.requests().await.is_empty());

        let record = api.file_metadata("/a.bin").await.unwrap();
        assert_eq!(record.version(), Some("1"));
        assert_eq!(mock.requests().await, vec![Request::FileMetadata("/a.bin".to_string())]);
        assert!(!mock.requests().await.iter().any(Request::is_mutating));
    }
}
