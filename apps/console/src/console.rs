//! Developer console and public home view: the two consumers of the sync client.

use std::time::Duration;

use tracing::{error, info, warn};

use crate::editor::asset::PendingAsset;
use crate::editor::preview::PreviewRegistry;
use crate::editor::EditSession;
use crate::errors::SyncError;
use crate::models::PortfolioDocument;
use crate::status::{StatusTracker, SyncStatus};
use crate::sync_client::SyncClient;

/// Shown verbatim when the backend refuses the admin password.
pub const LOGIN_REJECTED: &str = "Unauthorized access. Key rejected.";
pub const SAVE_SUCCEEDED: &str = "✓ SYSTEM_SYNCHRONIZED";
pub const SAVE_FAILED: &str = "ERROR: Check Console";
pub const SYNC_SUCCEEDED: &str = "Profile Synced";
pub const SYNC_FAILED: &str = "Protocol_Error: Check source file";

/// Owns the edit session between loads and saves.
///
/// Every operation takes `&mut self`, so a save's completion handling always
/// runs before the re-fetch it triggers, and nothing overlaps.
pub struct DeveloperConsole {
    client: SyncClient,
    previews: PreviewRegistry,
    session: EditSession,
    /// Set once the session holds a document the operator chose to edit.
    hydrated: bool,
    save_status: StatusTracker,
    sync_status: StatusTracker,
}

impl DeveloperConsole {
    pub fn new(client: SyncClient, previews: PreviewRegistry, status_reset: Duration) -> Self {
        Self {
            client,
            previews,
            session: EditSession::from_document(PortfolioDocument::empty()),
            hydrated: false,
            save_status: StatusTracker::new("save", status_reset),
            sync_status: StatusTracker::new("sync", status_reset),
        }
    }

    /// Hydrates the edit session. A failed fetch leaves an empty, still editable session.
    pub async fn load(&mut self) -> &EditSession {
        let document = self.client.fetch_portfolio_or_empty().await;
        self.replace_document(document);
        &self.session
    }

    /// Hydrates the edit session from the backend, or fails without touching it.
    ///
    /// Unattended callers use this instead of [`DeveloperConsole::load`], since a
    /// fallback document saved back would wipe the stored portfolio.
    pub async fn try_load(&mut self) -> Result<&EditSession, SyncError> {
        let document = self.client.fetch_portfolio().await?;
        self.replace_document(document);
        Ok(&self.session)
    }

    /// Starts editing `document` in place of whatever the session held.
    pub fn replace_document(&mut self, document: PortfolioDocument) {
        self.session = EditSession::from_document(document);
        self.hydrated = true;
    }

    pub fn session(&self) -> &EditSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut EditSession {
        self.save_status.acknowledge();
        &mut self.session
    }

    pub fn previews(&self) -> &PreviewRegistry {
        &self.previews
    }

    pub fn save_status(&self) -> SyncStatus {
        self.save_status.current()
    }

    pub fn sync_status(&self) -> SyncStatus {
        self.sync_status.current()
    }

    /// Uploads the session, then re-fetches the canonical document.
    ///
    /// On failure the session, pending files included, is left as it was so
    /// the operator can retry by hand. A failed re-fetch after a successful
    /// upload also keeps the session; the save itself still counts.
    pub async fn save(&mut self) -> Result<(), SyncError> {
        if !self.hydrated {
            return Err(SyncError::NotLoaded);
        }
        if !self.save_status.begin() {
            return Err(SyncError::Busy("save"));
        }

        if let Err(e) = self.client.save_manual_update(&self.session).await {
            error!("Upload error: {e}");
            self.save_status.fail(SAVE_FAILED);
            return Err(e);
        }

        self.save_status.succeed();
        info!("{SAVE_SUCCEEDED}");
        match self.client.fetch_portfolio().await {
            // Replacing the session drops pending assets, which revokes their previews.
            Ok(document) => self.session = EditSession::from_document(document),
            Err(e) => warn!("Re-fetch after save failed, keeping local edits: {e}"),
        }
        Ok(())
    }

    /// Sends a resume to the ingestion endpoint and applies the returned snapshot
    /// directly, without a follow-up fetch. On failure nothing changes.
    pub async fn sync_resume(&mut self, resume: PendingAsset) -> Result<(), SyncError> {
        if !self.sync_status.begin() {
            return Err(SyncError::Busy("resume sync"));
        }

        match self.client.sync_resume(&resume).await {
            Ok(snapshot) => {
                self.replace_document(snapshot);
                self.sync_status.succeed();
                info!("{SYNC_SUCCEEDED}");
                Ok(())
            }
            Err(e) => {
                error!("Resume sync failed: {e}");
                self.sync_status.fail(SYNC_FAILED);
                Err(e)
            }
        }
    }
}

/// Read-only copy of the portfolio for the public page.
#[derive(Debug, Clone, Default)]
pub struct HomeView {
    document: PortfolioDocument,
}

impl HomeView {
    /// Never fails: a backend error renders as an empty page instead of a blank one.
    pub async fn load(client: &SyncClient) -> Self {
        Self {
            document: client.fetch_portfolio_or_empty().await,
        }
    }

    pub fn document(&self) -> &PortfolioDocument {
        &self.document
    }

    /// Replaces the copy with a snapshot returned by a resume sync.
    pub fn apply_snapshot(&mut self, snapshot: PortfolioDocument) {
        self.document = snapshot;
    }
}

/// The message an operator sees for a failed call.
pub fn operator_message(err: &SyncError) -> String {
    match err {
        SyncError::Unauthorized => "Unauthorized".to_string(),
        SyncError::Busy(what) => format!("A {what} is already running"),
        other => other.to_string(),
    }
}
