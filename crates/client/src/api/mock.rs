//! In-memory server API for testing.

use super::{Api, Upload};
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use filestation_integrity::{ComputedHashes, FileMetadataRecord, UpdatePayload};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::Mutex;

/// A request as the mock saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    CheckSession,
    Login { username: String },
    Logout,
    FileMetadata(String),
    RecalculateHashes(String),
    SaveMetadata { path: String, fields: BTreeMap<String, String> },
    ListFolders(String),
    Upload { dir: String, files: Vec<String> },
    Delete { dir: String, items: Vec<String> },
    Rename { path: String, new_name: String },
    Move { items: Vec<String>, destination: String },
    Download(Vec<String>),
    CreateFolder { dir: String, name: String },
    SaveReadme { dir: String, content: String },
    PreviewMarkdown(String),
}
impl Request {
    /// Whether the real server would change state in response to this request.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Self::SaveMetadata { .. }
                | Self::Upload { .. }
                | Self::Delete { .. }
                | Self::Rename { .. }
                | Self::Move { .. }
                | Self::CreateFolder { .. }
                | Self::SaveReadme { .. }
        )
    }
}

#[derive(Default)]
struct State {
    session: Option<String>,
    credentials: HashMap<String, String>,
    records: HashMap<String, FileMetadataRecord>,
    hashes: HashMap<String, ComputedHashes>,
    folders: HashMap<String, Vec<String>>,
    failures: HashMap<&'static str, ErrorKind>,
    requests: Vec<Request>,
}

/// In-memory server for testing.
///
/// Everything lives behind one [`Mutex`], so all trait methods work on
/// `&self`. Every call is recorded before it is answered, which lets tests
/// assert on exactly what was (or wasn't) sent. Endpoints the real server
/// guards with a session answer [`Unauthorized`](ErrorKind::Unauthorized)
/// until a session exists.
#[derive(Default)]
pub struct MockApi {
    state: Mutex<State>,
}
impl MockApi {
    pub fn with_session(mut self, username: impl Into<String>) -> Self {
        self.state.get_mut().session = Some(username.into());
        self
    }

    /// Accept `username`/`password` at [`login`](Api::login).
    pub fn with_user(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.state.get_mut().credentials.insert(username.into(), password.into());
        self
    }

    pub fn with_record<K: Into<String>, V: Into<String>>(
        mut self,
        path: impl Into<String>,
        fields: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        self.state.get_mut().records.insert(path.into(), fields.into_iter().collect());
        self
    }

    pub fn with_hashes<K: Into<String>, V: Into<String>>(
        mut self,
        path: impl Into<String>,
        hashes: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        let hashes = hashes.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self.state.get_mut().hashes.insert(path.into(), hashes);
        self
    }

    pub fn with_folders(mut self, path: impl Into<String>, folders: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.state.get_mut().folders.insert(path.into(), folders.into_iter().map(Into::into).collect());
        self
    }

    /// Make every call to `endpoint` (e.g. `"save-metadata"`) fail with `kind`.
    pub fn with_failure(mut self, endpoint: &'static str, kind: ErrorKind) -> Self {
        self.state.get_mut().failures.insert(endpoint, kind);
        self
    }

    /// Everything received so far, oldest first.
    pub async fn requests(&self) -> Vec<Request> {
        self.state.lock().await.requests.clone()
    }

    /// Forget recorded requests, keeping all other state.
    pub async fn clear_requests(&self) {
        self.state.lock().await.requests.clear();
    }

    /// Current stored record for `path`.
    pub async fn record(&self, path: &str) -> Option<FileMetadataRecord> {
        self.state.lock().await.records.get(path).cloned()
    }

    /// Record the request, then apply any injected failure and session guard.
    async fn receive(&self, endpoint: &'static str, request: Request, guarded: bool) -> Result<()> {
        let mut state = self.state.lock().await;
        state.requests.push(request);
        if let Some(kind) = state.failures.get(endpoint) {
            exn::bail!(kind.clone());
        }
        if guarded && state.session.is_none() {
            exn::bail!(ErrorKind::Unauthorized);
        }
        Ok(())
    }
}

#[async_trait]
impl Api for MockApi {
    fn base_url(&self) -> &str {
        "mock://"
    }

    async fn check_session(&self) -> Result<Option<String>> {
        self.receive("check-session", Request::CheckSession, false).await?;
        Ok(self.state.lock().await.session.clone())
    }

    async fn login(&self, username: &str, password: &str) -> Result<()> {
        let request = Request::Login {
            username: username.to_string(),
        };
        self.receive("login", request, false).await?;
        let mut state = self.state.lock().await;
        if !state.credentials.get(username).is_some_and(|expected| expected == password) {
            exn::bail!(ErrorKind::LoginRejected("Invalid username or password".to_string()));
        }
        state.session = Some(username.to_string());
        Ok(())
    }

    async fn logout(&self) -> Result<()> {
        self.receive("logout", Request::Logout, false).await?;
        self.state.lock().await.session = None;
        Ok(())
    }

    async fn file_metadata(&self, path: &str) -> Result<FileMetadataRecord> {
        self.receive("file-metadata", Request::FileMetadata(path.to_string()), false).await?;
        Ok(self.state.lock().await.records.get(path).cloned().unwrap_or_default())
    }

    async fn recalculate_hashes(&self, path: &str) -> Result<ComputedHashes> {
        self.receive("recalculate-hashes", Request::RecalculateHashes(path.to_string()), false).await?;
        match self.state.lock().await.hashes.get(path) {
            Some(hashes) => Ok(hashes.clone()),
            None => exn::bail!(ErrorKind::ServerRejected {
                status: 500,
                body: format!("Error recalculating hashes: {path}: no such file"),
            }),
        }
    }

    async fn save_metadata(&self, payload: &UpdatePayload) -> Result<()> {
        let fields: BTreeMap<String, String> = payload.fields().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        let request = Request::SaveMetadata {
            path: payload.file_path().to_string(),
            fields: fields.clone(),
        };
        self.receive("save-metadata", request, true).await?;
        let mut state = self.state.lock().await;
        let record = state.records.entry(payload.file_path().to_string()).or_default();
        for (key, value) in fields {
            record.set(key, value);
        }
        Ok(())
    }

    async fn list_folders(&self, path: &str) -> Result<Vec<String>> {
        self.receive("list-folders", Request::ListFolders(path.to_string()), false).await?;
        Ok(self.state.lock().await.folders.get(path).cloned().unwrap_or_default())
    }

    async fn upload(&self, upload: &Upload) -> Result<()> {
        let request = Request::Upload {
            dir: upload.dir.clone(),
            files: upload.files.iter().map(|f| f.name.clone()).collect(),
        };
        self.receive("upload", request, true).await?;
        upload.validate()
    }

    async fn delete(&self, dir: &str, items: &[String]) -> Result<()> {
        let request = Request::Delete {
            dir: dir.to_string(),
            items: items.to_vec(),
        };
        self.receive("delete", request, true).await
    }

    async fn rename(&self, path: &str, new_name: &str) -> Result<()> {
        let request = Request::Rename {
            path: path.to_string(),
            new_name: new_name.to_string(),
        };
        self.receive("rename", request, true).await
    }

    async fn move_items(&self, items: &[String], destination: &str) -> Result<()> {
        let request = Request::Move {
            items: items.to_vec(),
            destination: destination.to_string(),
        };
        self.receive("move", request, true).await
    }

    async fn download(&self, items: &[String]) -> Result<Vec<u8>> {
        self.receive("download", Request::Download(items.to_vec()), false).await?;
        // Just enough to look like a zip.
        Ok(b"PK\x05\x06".to_vec())
    }

    async fn create_folder(&self, dir: &str, name: &str) -> Result<()> {
        let request = Request::CreateFolder {
            dir: dir.to_string(),
            name: name.to_string(),
        };
        self.receive("create-folder", request, true).await?;
        let mut state = self.state.lock().await;
        state.folders.entry(dir.to_string()).or_default().push(name.to_string());
        Ok(())
    }

    async fn save_readme(&self, dir: &str, content: &str) -> Result<()> {
        let request = Request::SaveReadme {
            dir: dir.to_string(),
            content: content.to_string(),
        };
        self.receive("save-readme", request, false).await
    }

    async fn preview_markdown(&self, content: &str) -> Result<String> {
        self.receive("preview-markdown", Request::PreviewMarkdown(content.to_string()), false).await?;
        Ok(format!("<p>{content}</p>"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_guarded_endpoints_need_a_session() {
        let api = MockApi::default();
        let err = api.rename("/a.bin", "b.bin").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Unauthorized));
        // Still recorded, the request was sent.
        assert_eq!(api.requests().await.len(), 1);
    }

    #[tokio::test]
    async fn test_login_starts_a_session() {
        let api = MockApi::default().with_user("alice", "secret");
        let err = api.login("alice", "wrong").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::LoginRejected(_)));
        assert_eq!(api.check_session().await.unwrap(), None);
        api.login("alice", "secret").await.unwrap();
        assert_eq!(api.check_session().await.unwrap(), Some("alice".to_string()));
        api.logout().await.unwrap();
        assert_eq!(api.check_session().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_metadata_merges_fields() {
        let api = MockApi::default().with_session("alice").with_record("/a.bin", [("Version", "1"), ("CRC32", "AB")]);
        let mut form = filestation_integrity::EditForm::new(
            &api.file_metadata("/a.bin").await.unwrap(),
            &[filestation_integrity::Algorithm::Crc32],
        );
        form.set("Version", "2").unwrap();
        api.save_metadata(&form.changes().into_payload("/a.bin")).await.unwrap();
        let record = api.record("/a.bin").await.unwrap();
        assert_eq!(record.version(), Some("2"));
        assert_eq!(record.raw("CRC32"), Some("AB"));
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let api = MockApi::default().with_failure("file-metadata", ErrorKind::Network("reset".to_string()));
        let err = api.file_metadata("/a.bin").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Network(_)));
    }
}
