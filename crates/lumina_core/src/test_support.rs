//! crates/lumina_core/src/test_support.rs
//!
//! In-memory fakes behind the port traits, shared by the unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{JournalEntry, User};
use crate::ports::{AuthProvider, EntryRow, EntryStore, PortError, PortResult, ReflectionModel};

pub(crate) fn test_user() -> User {
    User {
        id: Uuid::from_u128(1),
        email: "mira@example.com".to_string(),
        display_name: "Mira".to_string(),
    }
}

pub(crate) fn other_user() -> User {
    User {
        id: Uuid::from_u128(2),
        email: "noor@example.com".to_string(),
        display_name: "Noor".to_string(),
    }
}

//=========================================================================================
// Entry store fake
//=========================================================================================

/// A `HashMap`-backed entry store with the same upsert/remove semantics the
/// Postgres adapter implements, plus a switch to simulate transport failure.
#[derive(Default)]
pub(crate) struct MemoryStore {
    rows: Mutex<HashMap<Uuid, JournalEntry>>,
    failing: AtomicBool,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_entries(entries: Vec<JournalEntry>) -> Self {
        let store = Self::new();
        {
            let mut rows = store.rows.lock().unwrap();
            for entry in entries {
                rows.insert(entry.id, entry);
            }
        }
        store
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub(crate) fn entry(&self, id: Uuid) -> Option<JournalEntry> {
        self.rows.lock().unwrap().get(&id).cloned()
    }

    pub(crate) fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    fn check_available(&self) -> PortResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(PortError::Store("store unreachable".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl EntryStore for MemoryStore {
    async fn list_for_owner(&self, owner: Uuid) -> PortResult<Vec<JournalEntry>> {
        self.check_available()?;
        let mut entries: Vec<JournalEntry> = self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|e| e.owner_id == owner)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(entries)
    }

    async fn fetch(&self, id: Uuid, owner: Uuid) -> PortResult<Option<JournalEntry>> {
        self.check_available()?;
        Ok(self
            .rows
            .lock()
            .unwrap()
            .get(&id)
            .filter(|e| e.owner_id == owner)
            .cloned())
    }

    async fn upsert(&self, row: EntryRow) -> PortResult<JournalEntry> {
        self.check_available()?;
        let mut rows = self.rows.lock().unwrap();

        if let Some(existing) = row.id.and_then(|id| rows.get(&id).cloned()) {
            if existing.owner_id != row.owner_id {
                return Err(PortError::Store(
                    "entry was not updated; it belongs to another user".to_string(),
                ));
            }
            let updated = JournalEntry {
                id: existing.id,
                owner_id: existing.owner_id,
                title: row.title,
                content: row.content,
                // The date is written only when the payload carries one.
                date: row.date.unwrap_or(existing.date),
                mood: row.mood,
                ai_reflection: row.ai_reflection,
                last_modified: row.last_modified,
            };
            rows.insert(updated.id, updated.clone());
            return Ok(updated);
        }

        let created = JournalEntry {
            id: row.id.unwrap_or_else(Uuid::new_v4),
            owner_id: row.owner_id,
            title: row.title,
            content: row.content,
            date: row.date.unwrap_or(row.last_modified),
            mood: row.mood,
            ai_reflection: row.ai_reflection,
            last_modified: row.last_modified,
        };
        rows.insert(created.id, created.clone());
        Ok(created)
    }

    async fn remove(&self, id: Uuid, owner: Uuid) -> PortResult<()> {
        self.check_available()?;
        let mut rows = self.rows.lock().unwrap();
        if rows.get(&id).is_some_and(|e| e.owner_id == owner) {
            rows.remove(&id);
        }
        Ok(())
    }
}

//=========================================================================================
// Auth provider fake
//=========================================================================================

pub(crate) struct StaticAuthProvider {
    user: Option<User>,
    available: bool,
}

impl StaticAuthProvider {
    pub(crate) fn signed_in(user: User) -> Self {
        Self {
            user: Some(user),
            available: true,
        }
    }

    pub(crate) fn signed_out() -> Self {
        Self {
            user: None,
            available: true,
        }
    }

    pub(crate) fn unavailable() -> Self {
        Self {
            user: None,
            available: false,
        }
    }
}

#[async_trait]
impl AuthProvider for StaticAuthProvider {
    async fn current_user(&self) -> PortResult<Option<User>> {
        if !self.available {
            return Err(PortError::Unexpected("auth provider unreachable".to_string()));
        }
        Ok(self.user.clone())
    }

    async fn sign_out(&self) -> PortResult<()> {
        if !self.available {
            return Err(PortError::Store("auth provider unreachable".to_string()));
        }
        Ok(())
    }
}

//=========================================================================================
// Reflection model fake
//=========================================================================================

enum Script {
    Output(String),
    TransportFailure,
}

/// A reflection generator that replays a fixed script on every call.
pub(crate) struct ScriptedModel {
    script: Script,
}

impl ScriptedModel {
    pub(crate) fn output(raw: impl Into<String>) -> Self {
        Self {
            script: Script::Output(raw.into()),
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            script: Script::TransportFailure,
        }
    }
}

#[async_trait]
impl ReflectionModel for ScriptedModel {
    async fn generate_reflection(&self, _content: &str) -> PortResult<String> {
        match &self.script {
            Script::Output(raw) => Ok(raw.clone()),
            Script::TransportFailure => {
                Err(PortError::Unexpected("network fault".to_string()))
            }
        }
    }
}
