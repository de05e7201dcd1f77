//! crates/lumina_core/src/repository.rs
//!
//! CRUD access to journal entries, scoped to the authenticated user and
//! normalized to the crate's error policy: reads soft-fail to empty/none,
//! writes propagate so the caller can surface them.

use std::sync::Arc;

use chrono::Utc;
use tracing::warn;
use uuid::Uuid;

use crate::domain::{EntryDraft, JournalEntry};
use crate::ports::{EntryRow, EntryStore, PortError, PortResult};
use crate::session::SessionManager;

/// Owner-scoped entry access over an [`EntryStore`].
///
/// The repository holds no cache; every operation is a fresh round trip to
/// the store.
pub struct EntryRepository {
    store: Arc<dyn EntryStore>,
    session: Arc<SessionManager>,
}

impl EntryRepository {
    pub fn new(store: Arc<dyn EntryStore>, session: Arc<SessionManager>) -> Self {
        Self { store, session }
    }

    /// All of the caller's entries, ordered by authored date descending.
    ///
    /// A listing failure degrades to "no entries" rather than propagating:
    /// the dashboard shows an empty journal, not an error dialog.
    pub async fn list(&self) -> Vec<JournalEntry> {
        let Some(user) = self.session.current_user().await else {
            return Vec::new();
        };
        match self.store.list_for_owner(user.id).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "listing entries failed, showing none");
                Vec::new()
            }
        }
    }

    /// Case-insensitive substring search over title and content.
    pub async fn search(&self, query: &str) -> Vec<JournalEntry> {
        let needle = query.to_lowercase();
        self.list()
            .await
            .into_iter()
            .filter(|e| {
                e.title.to_lowercase().contains(&needle)
                    || e.content.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Fetches one entry by id.
    ///
    /// Returns `None` both when the row does not exist and when the fetch
    /// errors; the caller cannot tell the two apart.
    pub async fn get(&self, id: Uuid) -> Option<JournalEntry> {
        let user = self.session.current_user().await?;
        match self.store.fetch(id, user.id).await {
            Ok(entry) => entry,
            Err(e) => {
                warn!(entry_id = %id, error = %e, "fetching entry failed, treating as absent");
                None
            }
        }
    }

    /// Creates or updates an entry from a draft.
    ///
    /// The owner is always pinned to the active session's user and
    /// `last_modified` is stamped here. The draft's `date` travels to the
    /// store only when it is set, so an update that omits it preserves the
    /// stored authored date.
    pub async fn save(&self, draft: &EntryDraft) -> PortResult<JournalEntry> {
        let user = self
            .session
            .current_user()
            .await
            .ok_or(PortError::NotAuthenticated)?;

        if draft.title.trim().is_empty() {
            return Err(PortError::Invalid("an entry needs a title".to_string()));
        }
        if draft.content.trim().is_empty() {
            return Err(PortError::Invalid("an entry needs some content".to_string()));
        }

        let row = EntryRow {
            id: draft.id,
            owner_id: user.id,
            title: draft.title.clone(),
            content: draft.content.clone(),
            date: draft.date,
            mood: draft.mood.clone(),
            ai_reflection: draft.ai_reflection.clone(),
            last_modified: Utc::now(),
        };
        self.store.upsert(row).await
    }

    /// Deletes an entry. Idempotent: an id that is already absent succeeds.
    ///
    /// Store failures propagate; nothing is reported removed until the store
    /// confirms.
    pub async fn delete(&self, id: Uuid) -> PortResult<()> {
        let user = self
            .session
            .current_user()
            .await
            .ok_or(PortError::NotAuthenticated)?;
        self.store.remove(id, user.id).await
    }
}
