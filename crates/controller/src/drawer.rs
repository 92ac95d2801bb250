//! Metadata drawer.
//!
//! The drawer shows one file's metadata read-only, and lets a logged-in user
//! edit the uploader, version and RDS attestations. Everything it knows about
//! the open file lives in a [`DrawerSession`]; closing the drawer or saving
//! drops the session.
//!
//! ```text
//! Closed ──open──▶ ReadOnly ──enter_edit──▶ Editing ──save──▶ Closed
//!                     ▲                        │
//!                     └──────leave_edit────────┤ (unsaved edits)
//!                                              ▼
//!                                      ConfirmingDiscard
//! ```
//!
//! A failed request never moves the drawer: the error comes back and the
//! state is exactly what it was.

use crate::error::{ErrorKind, Result};
use crate::summary::Summary;
use filestation_client::{ApiHandle, HashWorker};
use filestation_integrity::{EditForm, FileMetadataRecord, IntegrityPolicy, Verdicts};
use tracing::instrument;

/// Where a confirmed discard goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardTarget {
    ReadOnly,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawerState {
    Closed,
    ReadOnly,
    Editing,
    /// Leaving edit mode with unsaved edits; waiting for the user to confirm.
    ConfirmingDiscard(DiscardTarget),
}

/// What a save did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The form matched the record; no request was made.
    NoChanges,
    /// These fields were sent and the drawer closed.
    Saved(Vec<String>),
}

/// Everything the drawer holds about the open file.
#[derive(Debug, Clone)]
pub struct DrawerSession {
    path: String,
    record: FileMetadataRecord,
    verdicts: Verdicts,
    summary: Summary,
    form: EditForm,
}
impl DrawerSession {
    fn build(path: &str, record: FileMetadataRecord, policy: &IntegrityPolicy) -> Self {
        Self {
            path: path.to_string(),
            verdicts: policy.reconcile(&record),
            summary: Summary::build(path, &record, policy),
            form: EditForm::new(&record, policy.algorithms()),
            record,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn record(&self) -> &FileMetadataRecord {
        &self.record
    }

    pub fn verdicts(&self) -> &Verdicts {
        &self.verdicts
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    pub fn form(&self) -> &EditForm {
        &self.form
    }
}

/// Metadata drawer controller.
///
/// Operations take `&mut self`, so a drawer never has two requests in
/// flight.
pub struct Drawer {
    api: ApiHandle,
    policy: IntegrityPolicy,
    worker: Option<HashWorker>,
    state: DrawerState,
    session: Option<DrawerSession>,
}
impl Drawer {
    pub fn new(api: ApiHandle, policy: IntegrityPolicy) -> Self {
        Self {
            api,
            policy,
            worker: None,
            state: DrawerState::Closed,
            session: None,
        }
    }

    /// Send hash recalculations through `worker` instead of awaiting them inline.
    pub fn with_worker(mut self, worker: HashWorker) -> Self {
        self.worker = Some(worker);
        self
    }

    pub fn state(&self) -> DrawerState {
        self.state
    }

    pub fn session(&self) -> Option<&DrawerSession> {
        self.session.as_ref()
    }

    /// Fetch the file's record and show it read-only.
    ///
    /// Replaces whatever session was open, including unsaved edits.
    #[instrument(skip_all, fields(path = %path))]
    pub async fn open(&mut self, path: &str) -> Result<&DrawerSession> {
        let record = self.api.file_metadata(path).await.map_err(ErrorKind::client)?;
        if self.session.as_ref().is_some_and(|s| s.form.is_dirty()) {
            tracing::info!(previous = ?self.session.as_ref().map(|s| s.path.as_str()), "Discarding unsaved edits");
        }
        let session = self.session.insert(DrawerSession::build(path, record, &self.policy));
        self.state = DrawerState::ReadOnly;
        tracing::info!("Drawer opened");
        Ok(session)
    }

    /// Switch to edit mode. Needs a logged-in session.
    #[instrument(skip_all)]
    pub async fn enter_edit(&mut self) -> Result<()> {
        self.expect_state(DrawerState::ReadOnly, "enter edit mode")?;
        match self.api.check_session().await.map_err(ErrorKind::client)? {
            Some(username) => {
                tracing::info!(username = %username, "Entering edit mode");
                self.state = DrawerState::Editing;
                Ok(())
            },
            None => exn::bail!(ErrorKind::Unauthorized),
        }
    }

    /// Change one form field.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.expect_state(DrawerState::Editing, "edit a field")?;
        let session = self.session_mut()?;
        session.form.set(key, value).map_err(ErrorKind::integrity)
    }

    /// Send the fields that changed. An unchanged form sends nothing.
    #[instrument(skip_all)]
    pub async fn save(&mut self) -> Result<SaveOutcome> {
        self.expect_state(DrawerState::Editing, "save")?;
        let session = self.session_mut()?;
        let changes = session.form.changes();
        if changes.is_empty() {
            tracing::info!(path = %session.path, "Nothing to save");
            return Ok(SaveOutcome::NoChanges);
        }
        let fields: Vec<String> = changes.iter().map(|(key, _)| key.to_string()).collect();
        let payload = changes.into_payload(session.path.clone());
        self.api.save_metadata(&payload).await.map_err(ErrorKind::client)?;
        tracing::info!(path = payload.file_path(), ?fields, "Metadata saved");
        self.close_now();
        Ok(SaveOutcome::Saved(fields))
    }

    /// Leave edit mode. Asks for confirmation first if there are unsaved edits.
    pub fn leave_edit(&mut self) -> Result<DrawerState> {
        self.expect_state(DrawerState::Editing, "leave edit mode")?;
        self.request(DiscardTarget::ReadOnly);
        Ok(self.state)
    }

    /// Close the drawer. From edit mode with unsaved edits this asks first.
    pub fn close(&mut self) -> DrawerState {
        match self.state {
            DrawerState::Editing => self.request(DiscardTarget::Closed),
            DrawerState::ConfirmingDiscard(_) => {},
            _ => self.close_now(),
        }
        self.state
    }

    /// Throw the edits away and carry on to wherever the user was going.
    pub fn confirm_discard(&mut self) -> Result<DrawerState> {
        let DrawerState::ConfirmingDiscard(target) = self.state else {
            exn::bail!(ErrorKind::invalid_state("nothing to discard"));
        };
        self.go(target);
        Ok(self.state)
    }

    /// Keep editing.
    pub fn cancel_discard(&mut self) -> Result<DrawerState> {
        if !matches!(self.state, DrawerState::ConfirmingDiscard(_)) {
            exn::bail!(ErrorKind::invalid_state("nothing to discard"));
        }
        self.state = DrawerState::Editing;
        Ok(self.state)
    }

    /// Have the server rehash the open file, then show the fresh hashes
    /// against the current attestations. Nothing is written server-side.
    ///
    /// In edit mode the form keeps whatever the user typed.
    #[instrument(skip_all)]
    pub async fn refresh(&mut self) -> Result<&DrawerSession> {
        if !matches!(self.state, DrawerState::ReadOnly | DrawerState::Editing) {
            exn::bail!(ErrorKind::invalid_state("refresh a closed drawer"));
        }
        let path = self.session_mut()?.path.clone();
        let hashes = match &self.worker {
            Some(worker) => worker.recalculate(&path).await,
            None => self.api.recalculate_hashes(&path).await,
        }
        .map_err(ErrorKind::client)?;
        let mut record = self.api.file_metadata(&path).await.map_err(ErrorKind::client)?;
        record.overlay_hashes(&hashes);
        let mut fresh = DrawerSession::build(&path, record, &self.policy);
        if self.state == DrawerState::Editing
            && let Some(session) = &self.session
        {
            fresh.form = session.form.clone();
        }
        tracing::info!(path = %path, "Hashes refreshed");
        Ok(self.session.insert(fresh))
    }

    fn request(&mut self, target: DiscardTarget) {
        let dirty = self.session.as_ref().is_some_and(|s| s.form.is_dirty());
        match dirty {
            true => self.state = DrawerState::ConfirmingDiscard(target),
            false => self.go(target),
        }
    }

    fn go(&mut self, target: DiscardTarget) {
        match target {
            DiscardTarget::Closed => self.close_now(),
            DiscardTarget::ReadOnly => {
                if let Some(session) = self.session.as_mut() {
                    session.form = EditForm::new(&session.record, self.policy.algorithms());
                }
                self.state = DrawerState::ReadOnly;
            },
        }
    }

    fn close_now(&mut self) {
        self.session = None;
        self.state = DrawerState::Closed;
    }

    fn expect_state(&self, expected: DrawerState, action: &str) -> Result<()> {
        if self.state != expected {
            exn::bail!(ErrorKind::invalid_state(format!("cannot {action} while {:?}", self.state)));
        }
        Ok(())
    }

    fn session_mut(&mut self) -> Result<&mut DrawerSession> {
        match self.session.as_mut() {
            Some(session) => Ok(session),
            None => exn::bail!(ErrorKind::invalid_state("no file is open")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filestation_client::error::ErrorKind as ClientErrorKind;
    use filestation_client::{MockApi, Request};
    use filestation_integrity::{Algorithm, Profile, Verdict};
    use std::collections::BTreeMap;
    use std::sync::Arc;

    const PATH: &str = "/fw/a.bin";

    fn mock() -> MockApi {
        MockApi::default().with_record(PATH, [("Uploader", "alice"), ("Version", "1.0"), ("CRC32", "AB12")])
    }

    fn drawer(mock: &Arc<MockApi>) -> Drawer {
        Drawer::new(mock.clone(), IntegrityPolicy::from_profile(Profile::Modern))
    }

    async fn editing(mock: &Arc<MockApi>) -> Drawer {
        let mut drawer = drawer(mock);
        drawer.open(PATH).await.unwrap();
        drawer.enter_edit().await.unwrap();
        mock.clear_requests().await;
        drawer
    }

    #[tokio::test]
    async fn test_open_shows_read_only() {
        let mock = Arc::new(mock().with_record("/b.bin", [("CRC32", "AB12"), ("RDS CRC32", "CD34")]));
        let mut drawer = drawer(&mock);
        let session = drawer.open("/b.bin").await.unwrap();
        assert_eq!(session.verdicts()[&Algorithm::Crc32], Verdict::Mismatch);
        assert_eq!(drawer.state(), DrawerState::ReadOnly);
    }

    #[tokio::test]
    async fn test_failed_open_changes_nothing() {
        let mock = Arc::new(mock().with_failure("file-metadata", ClientErrorKind::Network("reset".to_string())));
        let mut drawer = drawer(&mock);
        let err = drawer.open(PATH).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Request(_)));
        assert_eq!(drawer.state(), DrawerState::Closed);
        assert!(drawer.session().is_none());
    }

    #[tokio::test]
    async fn test_enter_edit_without_session_stays_read_only() {
        let mock = Arc::new(mock());
        let mut drawer = drawer(&mock);
        drawer.open(PATH).await.unwrap();
        let err = drawer.enter_edit().await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Unauthorized));
        assert_eq!(drawer.state(), DrawerState::ReadOnly);
    }

    #[tokio::test]
    async fn test_save_without_changes_sends_nothing() {
        let mock = Arc::new(mock().with_session("alice"));
        let mut drawer = editing(&mock).await;
        drawer.set("Version", "1.0").unwrap();
        assert_eq!(drawer.save().await.unwrap(), SaveOutcome::NoChanges);
        assert!(mock.requests().await.is_empty());
        assert_eq!(drawer.state(), DrawerState::Editing);
    }

    #[tokio::test]
    async fn test_save_sends_only_modified_fields() {
        let mock = Arc::new(mock().with_session("alice"));
        let mut drawer = editing(&mock).await;
        drawer.set("Version", "1.1").unwrap();
        assert_eq!(drawer.save().await.unwrap(), SaveOutcome::Saved(vec!["Version".to_string()]));
        let expected = Request::SaveMetadata {
            path: PATH.to_string(),
            fields: BTreeMap::from([("Version".to_string(), "1.1".to_string())]),
        };
        assert_eq!(mock.requests().await, vec![expected]);
        assert_eq!(drawer.state(), DrawerState::Closed);
        assert!(drawer.session().is_none());
    }

    #[tokio::test]
    async fn test_failed_save_stays_editing() {
        let rejected = ClientErrorKind::ServerRejected {
            status: 500,
            body: "Error saving metadata".to_string(),
        };
        let mock = Arc::new(mock().with_session("alice").with_failure("save-metadata", rejected));
        let mut drawer = editing(&mock).await;
        drawer.set("Uploader", "bob").unwrap();
        let err = drawer.save().await.unwrap_err();
        assert_eq!(&*err, &ErrorKind::Request("Error saving metadata".to_string()));
        assert_eq!(drawer.state(), DrawerState::Editing);
        assert_eq!(drawer.session().unwrap().form().get("Uploader"), Some("bob"));
    }

    #[tokio::test]
    async fn test_session_expiring_before_save() {
        let mock = Arc::new(mock().with_session("alice").with_failure("save-metadata", ClientErrorKind::Unauthorized));
        let mut drawer = editing(&mock).await;
        drawer.set("Uploader", "bob").unwrap();
        let err = drawer.save().await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Unauthorized));
        assert_eq!(drawer.state(), DrawerState::Editing);
    }

    #[tokio::test]
    async fn test_computed_hash_is_read_only() {
        let mock = Arc::new(mock().with_session("alice"));
        let mut drawer = editing(&mock).await;
        let err = drawer.set("CRC32", "0000").unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotEditable(_)));
    }

    #[tokio::test]
    async fn test_close_with_unsaved_edits_asks_first() {
        let mock = Arc::new(mock().with_session("alice"));
        let mut drawer = editing(&mock).await;
        drawer.set("RDS CRC32", "AB12").unwrap();
        assert_eq!(drawer.close(), DrawerState::ConfirmingDiscard(DiscardTarget::Closed));
        assert_eq!(drawer.cancel_discard().unwrap(), DrawerState::Editing);
        assert_eq!(drawer.session().unwrap().form().get("RDS CRC32"), Some("AB12"));
        assert_eq!(drawer.close(), DrawerState::ConfirmingDiscard(DiscardTarget::Closed));
        assert_eq!(drawer.confirm_discard().unwrap(), DrawerState::Closed);
        assert!(drawer.session().is_none());
    }

    #[tokio::test]
    async fn test_leave_edit_discards_edits_after_confirmation() {
        let mock = Arc::new(mock().with_session("alice"));
        let mut drawer = editing(&mock).await;
        drawer.set("Version", "9").unwrap();
        assert_eq!(drawer.leave_edit().unwrap(), DrawerState::ConfirmingDiscard(DiscardTarget::ReadOnly));
        assert_eq!(drawer.confirm_discard().unwrap(), DrawerState::ReadOnly);
        assert_eq!(drawer.session().unwrap().form().get("Version"), Some("1.0"));
    }

    #[tokio::test]
    async fn test_clean_edit_mode_leaves_without_asking() {
        let mock = Arc::new(mock().with_session("alice"));
        let mut drawer = editing(&mock).await;
        assert_eq!(drawer.leave_edit().unwrap(), DrawerState::ReadOnly);
        drawer.enter_edit().await.unwrap();
        assert_eq!(drawer.close(), DrawerState::Closed);
    }

    #[tokio::test]
    async fn test_rds_alias_edit_writes_canonical_key() {
        let mock = Arc::new(mock().with_session("alice").with_record("/c.bin", [("RDS RDS", "17")]));
        let mut drawer = drawer(&mock);
        drawer.open("/c.bin").await.unwrap();
        drawer.enter_edit().await.unwrap();
        drawer.set("RDS Number", "18").unwrap();
        drawer.save().await.unwrap();
        let record = mock.record("/c.bin").await.unwrap();
        assert_eq!(record.raw("RDS Number"), Some("18"));
        assert_eq!(record.raw("RDS RDS"), Some("18"));
        assert_eq!(record.rds_number(), Some("18"));
    }

    #[tokio::test]
    async fn test_clearing_legacy_rds_number_sticks() {
        let mock = Arc::new(mock().with_session("alice").with_record("/c.bin", [("RDS RDS", "17")]));
        let mut drawer = drawer(&mock);
        drawer.open("/c.bin").await.unwrap();
        drawer.enter_edit().await.unwrap();
        drawer.set("RDS Number", "").unwrap();
        assert_eq!(
            drawer.save().await.unwrap(),
            SaveOutcome::Saved(vec!["RDS Number".to_string(), "RDS RDS".to_string()])
        );
        let session = drawer.open("/c.bin").await.unwrap();
        assert_eq!(session.record().rds_number(), None);
        assert_eq!(session.form().get("RDS Number"), Some(""));
    }

    #[rstest::rstest]
    #[case(false)]
    #[case(true)]
    #[tokio::test]
    async fn test_refresh_overlays_fresh_hashes(#[case] through_worker: bool) {
        let mock = Arc::new(
            MockApi::default()
                .with_record(PATH, [("CRC32", "OLD0"), ("RDS CRC32", "AB12")])
                .with_hashes(PATH, [("CRC32", "AB12")]),
        );
        let mut drawer = drawer(&mock);
        if through_worker {
            drawer = drawer.with_worker(HashWorker::spawn(mock.clone()));
        }
        drawer.open(PATH).await.unwrap();
        assert_eq!(drawer.session().unwrap().verdicts()[&Algorithm::Crc32], Verdict::Mismatch);
        let session = drawer.refresh().await.unwrap();
        assert_eq!(session.verdicts()[&Algorithm::Crc32], Verdict::Match);
        // Refresh never writes.
        assert!(!mock.requests().await.iter().any(Request::is_mutating));
        assert_eq!(mock.record(PATH).await.unwrap().raw("CRC32"), Some("OLD0"));
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_view() {
        let mock = Arc::new(mock());
        let mut drawer = drawer(&mock);
        drawer.open(PATH).await.unwrap();
        let before = drawer.session().unwrap().summary().clone();
        // No hashes registered for PATH, so the mock answers 500.
        let err = drawer.refresh().await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Request(_)));
        assert_eq!(drawer.session().unwrap().summary(), &before);
        assert_eq!(drawer.state(), DrawerState::ReadOnly);
    }

    #[tokio::test]
    async fn test_save_needs_edit_mode() {
        let mock = Arc::new(mock().with_session("alice"));
        let mut drawer = drawer(&mock);
        let err = drawer.save().await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidState(_)));
    }
}
