//! Server API trait and implementations.
//!
//! This module defines the `Api` trait, one method per server endpoint, so
//! that controllers can run against the real HTTP client, an in-memory mock,
//! or a dry-run wrapper without knowing which.

mod dry_run;
mod http;
#[cfg(any(test, feature = "mock"))]
mod mock;

pub use self::dry_run::DryRunApi;
pub use self::http::HttpApi;
#[cfg(any(test, feature = "mock"))]
pub use self::mock::{MockApi, Request};
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use filestation_integrity::{ComputedHashes, FileMetadataRecord, UpdatePayload};

/// Version assignment for an upload batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Versioning {
    /// Every file gets the same version string.
    Same(String),
    /// One version per file, in the same order as [`Upload::files`].
    PerFile(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub data: Vec<u8>,
}

/// A batch of files uploaded into one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub dir: String,
    pub versioning: Versioning,
    pub files: Vec<UploadFile>,
}
impl Upload {
    /// Rejects empty batches and per-file version lists that don't line up
    /// with the files.
    pub fn validate(&self) -> Result<()> {
        if self.files.is_empty() {
            exn::bail!(ErrorKind::InvalidRequest("no files to upload".to_string()));
        }
        if let Versioning::PerFile(versions) = &self.versioning
            && versions.len() != self.files.len()
        {
            exn::bail!(ErrorKind::InvalidRequest(format!(
                "{} versions given for {} files",
                versions.len(),
                self.files.len()
            )));
        }
        Ok(())
    }
}

/// Unified interface for the server's endpoints.
///
/// Paths are remote paths (see [`crate::path`]). Mutating calls succeed on
/// any 2xx or 3xx answer; the server redirects form posts back to a listing
/// page and that redirect is never followed.
///
/// # Errors
/// Every method reports [`Unauthorized`](ErrorKind::Unauthorized) on a 401,
/// [`ServerRejected`](ErrorKind::ServerRejected) with the body text on any
/// other error status, and [`Network`](ErrorKind::Network) when no response
/// could be read.
///
/// # Examples
///
/// ```
/// use filestation_client::{Api, error::Result};
///
/// async fn uploader_of(api: &dyn Api, path: &str) -> Result<Option<String>> {
///     let record = api.file_metadata(path).await?;
///     Ok(record.uploader().map(str::to_string))
/// }
/// ```
#[async_trait]
pub trait Api: Send + Sync {
    /// Where requests go. Used for logging only.
    fn base_url(&self) -> &str;

    /// Name of the logged-in user, or `None` when there is no valid session.
    async fn check_session(&self) -> Result<Option<String>>;

    /// Start a session. Bad credentials give [`LoginRejected`](ErrorKind::LoginRejected).
    async fn login(&self, username: &str, password: &str) -> Result<()>;

    async fn logout(&self) -> Result<()>;

    /// Metadata stored for a file. A file without metadata gives an empty record.
    async fn file_metadata(&self, path: &str) -> Result<FileMetadataRecord>;

    /// Have the server rehash a file. Nothing is stored server-side.
    async fn recalculate_hashes(&self, path: &str) -> Result<ComputedHashes>;

    async fn save_metadata(&self, payload: &UpdatePayload) -> Result<()>;

    /// Names of the sub-folders of `path`.
    async fn list_folders(&self, path: &str) -> Result<Vec<String>>;

    async fn upload(&self, upload: &Upload) -> Result<()>;

    /// Delete `items` (full paths). `dir` is the listing the user was looking at.
    async fn delete(&self, dir: &str, items: &[String]) -> Result<()>;

    /// Rename in place; `new_name` is a bare entry name.
    async fn rename(&self, path: &str, new_name: &str) -> Result<()>;

    /// Move `items` (full paths) into `destination`.
    async fn move_items(&self, items: &[String], destination: &str) -> Result<()>;

    /// A zip archive of `items`.
    async fn download(&self, items: &[String]) -> Result<Vec<u8>>;

    async fn create_folder(&self, dir: &str, name: &str) -> Result<()>;

    /// Replace the README of `dir`.
    async fn save_readme(&self, dir: &str, content: &str) -> Result<()>;

    /// Markdown rendered to HTML by the server.
    async fn preview_markdown(&self, content: &str) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str) -> UploadFile {
        UploadFile {
            name: name.to_string(),
            data: b"data".to_vec(),
        }
    }

    #[test]
    fn test_upload_validation() {
        let mut upload = Upload {
            dir: "/".to_string(),
            versioning: Versioning::PerFile(vec!["1".to_string()]),
            files: vec![file("a"), file("b")],
        };
        let err = upload.validate().unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidRequest(_)));
        upload.versioning = Versioning::PerFile(vec!["1".to_string(), "2".to_string()]);
        assert!(upload.validate().is_ok());
        upload.versioning = Versioning::Same("3".to_string());
        assert!(upload.validate().is_ok());
        upload.files.clear();
        assert!(upload.validate().is_err());
    }
}
