//! crates/lumina_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// The authenticated identity as seen by the rest of the application.
///
/// A `User` is an immutable projection of the auth provider's session: it is
/// replaced wholesale on login/logout and never partially mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
}

/// A persisted journal entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntry {
    pub id: Uuid,
    /// Derived from the active session at save time, never from caller input.
    pub owner_id: Uuid,
    pub title: String,
    pub content: String,
    /// The "written on" timestamp. Assigned once at creation and preserved
    /// across every subsequent edit.
    pub date: DateTime<Utc>,
    pub mood: Option<String>,
    pub ai_reflection: Option<String>,
    pub last_modified: DateTime<Utc>,
}

/// The in-memory representation of an entry being edited.
///
/// `id` is `None` while the draft has not been created in the store (the
/// HTTP layer maps the literal path token `new` to `None`). `date` is only
/// `Some` when the caller intends to write it; an update that leaves it
/// `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryDraft {
    pub id: Option<Uuid>,
    pub title: String,
    pub content: String,
    pub date: Option<DateTime<Utc>>,
    pub mood: Option<String>,
    pub ai_reflection: Option<String>,
}

impl EntryDraft {
    /// Builds a draft from a stored entry, for editing.
    pub fn from_entry(entry: &JournalEntry) -> Self {
        Self {
            id: Some(entry.id),
            title: entry.title.clone(),
            content: entry.content.clone(),
            date: Some(entry.date),
            mood: entry.mood.clone(),
            ai_reflection: entry.ai_reflection.clone(),
        }
    }
}

/// A mood label and supportive reflection produced for an entry.
///
/// The two fields are always set together; the reflection path never yields
/// one without the other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reflection {
    pub mood: String,
    pub reflection: String,
}

// Only used internally for login/signup - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: Uuid,
    pub email: String,
    pub display_name: String,
    pub hashed_password: String,
}
