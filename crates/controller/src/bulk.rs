//! Bulk actions over a directory listing.
//!
//! Download and delete need nothing but a selection. Rename, move, upload and
//! new-folder check the session first and stop at [`ErrorKind::Unauthorized`]
//! without touching anything else. A successful action clears the selection;
//! a failed one leaves it as it was.

use crate::error::{ErrorKind, Result};
use crate::picker::MovePicker;
use crate::selection::{Buttons, DownloadPolicy, Item, Selection};
use filestation_client::ApiHandle;
use filestation_client::api::{Upload, UploadFile, Versioning};
use filestation_client::path;
use std::fmt::{Display, Formatter, Result as FmtResult};
use tracing::instrument;

/// What the user is asked before anything is deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteConfirmation {
    dir: String,
    items: Vec<String>,
}
impl DeleteConfirmation {
    pub fn dir(&self) -> &str {
        &self.dir
    }

    /// The selected paths, exactly as they will be sent.
    pub fn items(&self) -> &[String] {
        &self.items
    }
}
impl Display for DeleteConfirmation {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        writeln!(f, "Delete the following {} item(s)?", self.items.len())?;
        for item in &self.items {
            writeln!(f, "  {item}")?;
        }
        Ok(())
    }
}

pub struct Bulk {
    api: ApiHandle,
    policy: DownloadPolicy,
    dir: String,
    selection: Selection,
}
impl Bulk {
    pub fn new(api: ApiHandle, policy: DownloadPolicy, dir: impl Into<String>, items: impl IntoIterator<Item = Item>) -> Self {
        Self {
            api,
            policy,
            dir: dir.into(),
            selection: Selection::new(items),
        }
    }

    /// The directory being listed.
    pub fn dir(&self) -> &str {
        &self.dir
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    pub fn buttons(&self) -> Buttons {
        self.selection.buttons(self.policy)
    }

    pub fn request_delete(&self) -> Result<DeleteConfirmation> {
        if !self.buttons().delete {
            exn::bail!(ErrorKind::invalid_state("nothing selected to delete"));
        }
        Ok(DeleteConfirmation {
            dir: self.dir.clone(),
            items: self.selection.selected_paths(),
        })
    }

    /// Send a confirmed delete. The confirmation is sent as shown, even if
    /// the selection changed since.
    #[instrument(skip_all, fields(dir = %confirmation.dir))]
    pub async fn confirm_delete(&mut self, confirmation: DeleteConfirmation) -> Result<()> {
        self.api
            .delete(&confirmation.dir, &confirmation.items)
            .await
            .map_err(ErrorKind::client)?;
        tracing::info!(items = confirmation.items.len(), "Items deleted");
        self.selection.clear();
        Ok(())
    }

    /// Rename the one selected item to `new_name`, in place.
    #[instrument(skip_all, fields(new_name = %new_name))]
    pub async fn rename(&mut self, new_name: &str) -> Result<String> {
        if !self.buttons().rename {
            exn::bail!(ErrorKind::invalid_state("rename needs exactly one selected item"));
        }
        let Some(old) = self.selection.selected_paths().into_iter().next() else {
            exn::bail!(ErrorKind::invalid_state("nothing selected to rename"));
        };
        let new_name = new_name.trim();
        let renamed = path::join(path::parent(&old), new_name).map_err(ErrorKind::client)?;
        self.require_session().await?;
        self.api.rename(&old, new_name).await.map_err(ErrorKind::client)?;
        tracing::info!(old = %old, new = %renamed, "Item renamed");
        self.selection.clear();
        Ok(renamed)
    }

    /// Open the destination picker for the selected items.
    pub async fn start_move(&self) -> Result<MovePicker> {
        if !self.buttons().move_to {
            exn::bail!(ErrorKind::invalid_state("nothing selected to move"));
        }
        self.require_session().await?;
        MovePicker::open(self.api.clone(), self.selection.selected_paths()).await
    }

    /// Move the picker's items into its marked folder.
    #[instrument(skip_all)]
    pub async fn confirm_move(&mut self, picker: &MovePicker) -> Result<String> {
        let Some(destination) = picker.candidate() else {
            exn::bail!(ErrorKind::invalid_state("no destination folder marked"));
        };
        self.api
            .move_items(picker.items(), destination)
            .await
            .map_err(ErrorKind::client)?;
        tracing::info!(items = picker.items().len(), destination = %destination, "Items moved");
        self.selection.clear();
        Ok(destination.to_string())
    }

    /// Zip archive of the selection.
    #[instrument(skip_all)]
    pub async fn download(&mut self) -> Result<Vec<u8>> {
        if !self.buttons().download {
            exn::bail!(ErrorKind::invalid_state(match self.policy {
                DownloadPolicy::AnySelection => "nothing selected to download",
                DownloadPolicy::FilesOnly => "select at least one file to download",
            }));
        }
        let items = self.selection.selected_paths();
        let archive = self.api.download(&items).await.map_err(ErrorKind::client)?;
        tracing::info!(items = items.len(), bytes = archive.len(), "Archive downloaded");
        self.selection.clear();
        Ok(archive)
    }

    /// Upload files into the listed directory.
    #[instrument(skip_all, fields(dir = %self.dir, files = files.len()))]
    pub async fn upload(&mut self, versioning: Versioning, files: Vec<UploadFile>) -> Result<()> {
        let upload = Upload {
            dir: self.dir.clone(),
            versioning,
            files,
        };
        upload.validate().map_err(ErrorKind::client)?;
        self.require_session().await?;
        self.api.upload(&upload).await.map_err(ErrorKind::client)?;
        tracing::info!("Files uploaded");
        Ok(())
    }

    /// Create a folder inside the listed directory.
    #[instrument(skip_all, fields(dir = %self.dir, name = %name))]
    pub async fn create_folder(&mut self, name: &str) -> Result<String> {
        let name = name.trim();
        let created = path::join(&self.dir, name).map_err(ErrorKind::client)?;
        self.require_session().await?;
        self.api.create_folder(&self.dir, name).await.map_err(ErrorKind::client)?;
        tracing::info!("Folder created");
        Ok(created)
    }

    async fn require_session(&self) -> Result<String> {
        match self.api.check_session().await.map_err(ErrorKind::client)? {
            Some(username) => Ok(username),
            None => exn::bail!(ErrorKind::Unauthorized),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filestation_client::error::ErrorKind as ClientErrorKind;
    use filestation_client::{Api, MockApi, Request};
    use rstest::rstest;
    use std::sync::Arc;

    fn listing() -> Vec<Item> {
        vec![Item::folder("/fw/old"), Item::file("/fw/a.bin"), Item::file("/fw/b.bin")]
    }

    fn mock() -> MockApi {
        MockApi::default()
            .with_session("alice")
            .with_folders("/", ["fw", "archive"])
            .with_folders("/archive", ["2023"])
    }

    fn bulk(mock: &Arc<MockApi>) -> Bulk {
        Bulk::new(mock.clone(), DownloadPolicy::FilesOnly, "/fw", listing())
    }

    #[tokio::test]
    async fn test_delete_lists_paths_verbatim() {
        let mock = Arc::new(mock());
        let mut bulk = bulk(&mock);
        bulk.selection_mut().set("/fw/b.bin", true);
        bulk.selection_mut().set("/fw/old", true);
        let confirmation = bulk.request_delete().unwrap();
        assert_eq!(confirmation.items(), ["/fw/old", "/fw/b.bin"]);
        assert_eq!(confirmation.to_string(), "Delete the following 2 item(s)?\n  /fw/old\n  /fw/b.bin\n");
        assert!(mock.requests().await.is_empty());
        bulk.confirm_delete(confirmation).await.unwrap();
        assert_eq!(
            mock.requests().await,
            vec![Request::Delete {
                dir: "/fw".to_string(),
                items: vec!["/fw/old".to_string(), "/fw/b.bin".to_string()],
            }]
        );
        assert!(bulk.selection().is_empty());
    }

    #[tokio::test]
    async fn test_delete_needs_a_selection() {
        let mock = Arc::new(mock());
        let bulk = bulk(&mock);
        let err = bulk.request_delete().unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidState(_)));
    }

    #[tokio::test]
    async fn test_rename_one_item() {
        let mock = Arc::new(mock());
        let mut bulk = bulk(&mock);
        bulk.selection_mut().set("/fw/a.bin", true);
        assert_eq!(bulk.rename(" c.bin ").await.unwrap(), "/fw/c.bin");
        assert_eq!(
            mock.requests().await,
            vec![
                Request::CheckSession,
                Request::Rename {
                    path: "/fw/a.bin".to_string(),
                    new_name: "c.bin".to_string(),
                },
            ]
        );
        assert!(bulk.selection().is_empty());
    }

    #[tokio::test]
    async fn test_rename_refuses_two_items() {
        let mock = Arc::new(mock());
        let mut bulk = bulk(&mock);
        bulk.selection_mut().set_all(true);
        let err = bulk.rename("c.bin").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidState(_)));
        assert!(mock.requests().await.is_empty());
    }

    #[rstest]
    #[case::rename("rename")]
    #[case::move_to("move")]
    #[case::upload("upload")]
    #[case::create_folder("create-folder")]
    #[tokio::test]
    async fn test_gated_actions_need_a_session(#[case] action: &str) {
        let mock = Arc::new(MockApi::default().with_folders("/", ["archive"]));
        let mut bulk = bulk(&mock);
        bulk.selection_mut().set("/fw/a.bin", true);
        let err = match action {
            "rename" => bulk.rename("c.bin").await.unwrap_err(),
            "move" => bulk.start_move().await.err().unwrap(),
            "upload" => {
                let files = vec![UploadFile {
                    name: "c.bin".to_string(),
                    data: vec![1, 2, 3],
                }];
                bulk.upload(Versioning::Same("1.0".to_string()), files).await.unwrap_err()
            },
            _ => bulk.create_folder("new").await.unwrap_err(),
        };
        assert!(matches!(&*err, ErrorKind::Unauthorized));
        assert_eq!(mock.requests().await, vec![Request::CheckSession]);
        assert!(bulk.selection().is_checked("/fw/a.bin"));
    }

    #[tokio::test]
    async fn test_move_through_picker() {
        let mock = Arc::new(mock());
        let mut bulk = bulk(&mock);
        bulk.selection_mut().set("/fw/a.bin", true);
        bulk.selection_mut().set("/fw/b.bin", true);
        let mut picker = bulk.start_move().await.unwrap();
        assert!(bulk.confirm_move(&picker).await.is_err());
        picker.double_click("archive").await.unwrap();
        assert_eq!(bulk.confirm_move(&picker).await.unwrap(), "/archive");
        let requests = mock.requests().await;
        assert_eq!(
            requests.last(),
            Some(&Request::Move {
                items: vec!["/fw/a.bin".to_string(), "/fw/b.bin".to_string()],
                destination: "/archive".to_string(),
            })
        );
        assert!(bulk.selection().is_empty());
    }

    #[tokio::test]
    async fn test_failed_move_keeps_selection() {
        let mock = Arc::new(mock().with_failure(
            "move",
            ClientErrorKind::ServerRejected {
                status: 500,
                body: "Error moving item".to_string(),
            },
        ));
        let mut bulk = bulk(&mock);
        bulk.selection_mut().set("/fw/a.bin", true);
        let mut picker = bulk.start_move().await.unwrap();
        picker.click("archive").unwrap();
        let err = bulk.confirm_move(&picker).await.unwrap_err();
        assert_eq!(&*err, &ErrorKind::Request("Error moving item".to_string()));
        assert!(bulk.selection().is_checked("/fw/a.bin"));
    }

    #[rstest]
    #[case(DownloadPolicy::FilesOnly, false)]
    #[case(DownloadPolicy::AnySelection, true)]
    #[tokio::test]
    async fn test_download_follows_policy(#[case] policy: DownloadPolicy, #[case] allowed: bool) {
        let mock = Arc::new(mock());
        let mut bulk = Bulk::new(mock.clone(), policy, "/fw", listing());
        bulk.selection_mut().set("/fw/old", true);
        assert_eq!(bulk.download().await.is_ok(), allowed);
        let sent = mock.requests().await.contains(&Request::Download(vec!["/fw/old".to_string()]));
        assert_eq!(sent, allowed);
    }

    #[tokio::test]
    async fn test_upload_rejects_mismatched_versions_before_asking() {
        let mock = Arc::new(mock());
        let mut bulk = bulk(&mock);
        let files = vec![UploadFile {
            name: "c.bin".to_string(),
            data: vec![0],
        }];
        let err = bulk.upload(Versioning::PerFile(vec![]), files).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Request(_)));
        assert!(mock.requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_create_folder() {
        let mock = Arc::new(mock());
        let mut bulk = bulk(&mock);
        assert_eq!(bulk.create_folder("releases").await.unwrap(), "/fw/releases");
        assert_eq!(mock.list_folders("/fw").await.unwrap(), vec!["releases".to_string()]);
        assert!(bulk.create_folder("../up").await.is_err());
    }
}
