//! Destination picker for moves.
//!
//! Walks the server's folder tree one directory at a time. A click marks a
//! folder as the destination; a double click goes into it and marks it. Any
//! navigation drops the mark, so the move can't be confirmed until the user
//! picks again.

use crate::error::{ErrorKind, Result};
use filestation_client::ApiHandle;
use filestation_client::path::{self, Crumb};
use tracing::instrument;

pub struct MovePicker {
    api: ApiHandle,
    items: Vec<String>,
    current: String,
    folders: Vec<String>,
    candidate: Option<String>,
}
impl MovePicker {
    /// Start at the root with the listing already loaded.
    pub async fn open(api: ApiHandle, items: Vec<String>) -> Result<Self> {
        let mut picker = Self {
            api,
            items,
            current: "/".to_string(),
            folders: Vec::new(),
            candidate: None,
        };
        picker.navigate("/").await?;
        Ok(picker)
    }

    /// Paths being moved, verbatim.
    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    pub fn folders(&self) -> &[String] {
        &self.folders
    }

    pub fn crumbs(&self) -> Vec<Crumb> {
        path::breadcrumbs(&self.current)
    }

    /// "Go up" is offered everywhere except the root.
    pub fn can_go_up(&self) -> bool {
        self.current != "/"
    }

    pub fn candidate(&self) -> Option<&str> {
        self.candidate.as_deref()
    }

    pub fn can_confirm(&self) -> bool {
        self.candidate.is_some()
    }

    /// Load `dir`'s folders and make it current. On failure nothing changes.
    #[instrument(skip_all, fields(dir = %dir))]
    pub async fn navigate(&mut self, dir: &str) -> Result<()> {
        let dir = path::normalize(dir).map_err(ErrorKind::client)?;
        let folders = self.api.list_folders(&dir).await.map_err(ErrorKind::client)?;
        tracing::debug!(folders = folders.len(), "Folder listing loaded");
        self.current = dir;
        self.folders = folders;
        self.candidate = None;
        Ok(())
    }

    pub async fn go_up(&mut self) -> Result<()> {
        let parent = path::parent(&self.current).to_string();
        self.navigate(&parent).await
    }

    /// Mark a folder of the current listing as the destination.
    pub fn click(&mut self, folder: &str) -> Result<&str> {
        let target = self.child(folder)?;
        Ok(self.candidate.insert(target).as_str())
    }

    /// Go into a folder of the current listing and mark it.
    pub async fn double_click(&mut self, folder: &str) -> Result<()> {
        let target = self.child(folder)?;
        self.navigate(&target).await?;
        self.candidate = Some(target);
        Ok(())
    }

    fn child(&self, folder: &str) -> Result<String> {
        if !self.folders.iter().any(|f| f == folder) {
            exn::bail!(ErrorKind::invalid_state(format!("no folder named '{folder}' here")));
        }
        path::join(&self.current, folder).map_err(ErrorKind::client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filestation_client::error::ErrorKind as ClientErrorKind;
    use filestation_client::{MockApi, Request};
    use std::sync::Arc;

    fn mock() -> MockApi {
        MockApi::default().with_folders("/", ["fw", "docs"]).with_folders("/fw", ["v1", "v2"])
    }

    async fn picker(mock: &Arc<MockApi>) -> MovePicker {
        MovePicker::open(mock.clone(), vec!["/a.bin".to_string()]).await.unwrap()
    }

    #[tokio::test]
    async fn test_opens_at_root() {
        let mock = Arc::new(mock());
        let picker = picker(&mock).await;
        assert_eq!(picker.current(), "/");
        assert_eq!(picker.folders(), ["fw", "docs"]);
        assert!(!picker.can_go_up());
        assert!(!picker.can_confirm());
        assert_eq!(picker.crumbs().len(), 1);
    }

    #[tokio::test]
    async fn test_click_marks_without_navigating() {
        let mock = Arc::new(mock());
        let mut picker = picker(&mock).await;
        assert_eq!(picker.click("fw").unwrap(), "/fw");
        assert!(picker.can_confirm());
        assert_eq!(picker.current(), "/");
        assert_eq!(mock.requests().await, vec![Request::ListFolders("/".to_string())]);
    }

    #[tokio::test]
    async fn test_double_click_navigates_and_marks() {
        let mock = Arc::new(mock());
        let mut picker = picker(&mock).await;
        picker.double_click("fw").await.unwrap();
        assert_eq!(picker.current(), "/fw");
        assert_eq!(picker.candidate(), Some("/fw"));
        assert_eq!(picker.folders(), ["v1", "v2"]);
        let labels: Vec<_> = picker.crumbs().into_iter().map(|c| c.label).collect();
        assert_eq!(labels, ["Home", "fw"]);
        assert!(picker.can_go_up());
    }

    #[tokio::test]
    async fn test_navigation_clears_the_mark() {
        let mock = Arc::new(mock());
        let mut picker = picker(&mock).await;
        picker.double_click("fw").await.unwrap();
        picker.click("v2").unwrap();
        picker.go_up().await.unwrap();
        assert_eq!(picker.current(), "/");
        assert!(!picker.can_confirm());
        picker.click("docs").unwrap();
        picker.navigate("/fw").await.unwrap();
        assert!(!picker.can_confirm());
    }

    #[tokio::test]
    async fn test_unknown_folder_is_rejected() {
        let mock = Arc::new(mock());
        let mut picker = picker(&mock).await;
        let err = picker.click("v1").unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidState(_)));
        assert!(!picker.can_confirm());
    }

    #[tokio::test]
    async fn test_failed_listing_keeps_position() {
        let mock = Arc::new(mock());
        let mut picker = picker(&mock).await;
        picker.click("fw").unwrap();
        picker.api = Arc::new(mock_with_failure()) as ApiHandle;
        assert!(picker.double_click("fw").await.is_err());
        assert_eq!(picker.current(), "/");
        assert_eq!(picker.candidate(), Some("/fw"));
    }

    fn mock_with_failure() -> MockApi {
        mock().with_failure("list-folders", ClientErrorKind::Network("reset".to_string()))
    }
}
