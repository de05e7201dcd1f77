//! crates/lumina_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core to be independent of specific external implementations like databases
//! or AI services.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{JournalEntry, User, UserCredentials};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// No session was active at the point a write was attempted.
    #[error("Not authenticated")]
    NotAuthenticated,
    /// A transport or store failure on a write or delete. Callers must
    /// surface this to the user; the in-memory draft is kept for retry.
    #[error("Store error: {0}")]
    Store(String),
    #[error("Item not found: {0}")]
    NotFound(String),
    /// A request the component refuses to run (empty fields, wrong state).
    #[error("Invalid request: {0}")]
    Invalid(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Entry Store Port
//=========================================================================================

/// The write payload handed to the store.
///
/// `id: None` asks the store to assign one. `date: None` means "do not touch
/// the date" — the store's update arm must preserve the existing value rather
/// than having the caller merge it client-side.
#[derive(Debug, Clone)]
pub struct EntryRow {
    pub id: Option<Uuid>,
    pub owner_id: Uuid,
    pub title: String,
    pub content: String,
    pub date: Option<DateTime<Utc>>,
    pub mood: Option<String>,
    pub ai_reflection: Option<String>,
    pub last_modified: DateTime<Utc>,
}

/// Raw, owner-scoped CRUD against the entry store.
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// All entries owned by `owner`, ordered by `date` descending.
    async fn list_for_owner(&self, owner: Uuid) -> PortResult<Vec<JournalEntry>>;

    async fn fetch(&self, id: Uuid, owner: Uuid) -> PortResult<Option<JournalEntry>>;

    /// Inserts when the id is absent or unknown, updates when it exists.
    /// Repeated application of the same payload must yield the same row.
    async fn upsert(&self, row: EntryRow) -> PortResult<JournalEntry>;

    /// Removes the row scoped to `owner`. Succeeds when the row was already
    /// absent — deletion is idempotent.
    async fn remove(&self, id: Uuid, owner: Uuid) -> PortResult<()>;
}

//=========================================================================================
// Auth Ports
//=========================================================================================

/// Account and auth-session persistence, used by the signup/login/logout flow.
#[async_trait]
pub trait AuthStore: Send + Sync {
    async fn create_user_with_email(
        &self,
        email: &str,
        display_name: &str,
        hashed_password: &str,
    ) -> PortResult<User>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    /// Resolves a session token to its user, or `NotAuthenticated` when the
    /// token is unknown or expired.
    async fn validate_auth_session(&self, session_id: &str) -> PortResult<User>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;
}

/// The auth provider's session surface as consumed by the `SessionManager`:
/// "who is signed in right now" and "end the session".
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn current_user(&self) -> PortResult<Option<User>>;

    async fn sign_out(&self) -> PortResult<()>;
}

//=========================================================================================
// Reflection Model Port
//=========================================================================================

/// A single attempt against the remote reflection generator.
///
/// Returns the generator's raw structured text; transport and service
/// failures surface as `Err`. Interpreting (and repairing) the output is the
/// `ReflectionService`'s job.
#[async_trait]
pub trait ReflectionModel: Send + Sync {
    async fn generate_reflection(&self, content: &str) -> PortResult<String>;
}
