//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete
//! implementation of the `EntryStore` and `AuthStore` ports from the `core`
//! crate. It handles all interactions with the PostgreSQL database using
//! `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lumina_core::domain::{JournalEntry, User, UserCredentials};
use lumina_core::ports::{AuthStore, EntryRow, EntryStore, PortError, PortResult};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `EntryStore` and `AuthStore` ports.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn store_error(e: sqlx::Error) -> PortError {
    PortError::Store(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct EntryRecord {
    id: Uuid,
    user_id: Uuid,
    title: String,
    content: String,
    date: DateTime<Utc>,
    mood: Option<String>,
    ai_reflection: Option<String>,
    last_modified: DateTime<Utc>,
}

impl EntryRecord {
    fn to_domain(self) -> JournalEntry {
        JournalEntry {
            id: self.id,
            owner_id: self.user_id,
            title: self.title,
            content: self.content,
            date: self.date,
            mood: self.mood,
            ai_reflection: self.ai_reflection,
            last_modified: self.last_modified,
        }
    }
}

#[derive(FromRow)]
struct UserRecord {
    user_id: Uuid,
    email: String,
    display_name: String,
}

impl UserRecord {
    fn to_domain(self) -> User {
        User {
            id: self.user_id,
            email: self.email,
            display_name: self.display_name,
        }
    }
}

#[derive(FromRow)]
struct CredentialsRecord {
    user_id: Uuid,
    email: String,
    display_name: String,
    hashed_password: String,
}

impl CredentialsRecord {
    fn to_domain(self) -> UserCredentials {
        UserCredentials {
            user_id: self.user_id,
            email: self.email,
            display_name: self.display_name,
            hashed_password: self.hashed_password,
        }
    }
}

const ENTRY_COLUMNS: &str = "id, user_id, title, content, date, mood, ai_reflection, last_modified";

//=========================================================================================
// `EntryStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl EntryStore for DbAdapter {
    async fn list_for_owner(&self, owner: Uuid) -> PortResult<Vec<JournalEntry>> {
        let records = sqlx::query_as::<_, EntryRecord>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM entries WHERE user_id = $1 ORDER BY date DESC"
        ))
        .bind(owner)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn fetch(&self, id: Uuid, owner: Uuid) -> PortResult<Option<JournalEntry>> {
        let record = sqlx::query_as::<_, EntryRecord>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM entries WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(record.map(|r| r.to_domain()))
    }

    async fn upsert(&self, row: EntryRow) -> PortResult<JournalEntry> {
        // The update arm coalesces an omitted date with the stored value, so
        // the "send the field only when you intend to change it" rule lives
        // in the statement rather than being merged client-side. The owner
        // guard on the conflict arm keeps an upsert from touching a row that
        // belongs to someone else.
        let record = sqlx::query_as::<_, EntryRecord>(&format!(
            "INSERT INTO entries (id, user_id, title, content, date, mood, ai_reflection, last_modified) \
             VALUES ($1, $2, $3, $4, COALESCE($5, $8), $6, $7, $8) \
             ON CONFLICT (id) DO UPDATE SET \
                 title = EXCLUDED.title, \
                 content = EXCLUDED.content, \
                 date = COALESCE($5, entries.date), \
                 mood = EXCLUDED.mood, \
                 ai_reflection = EXCLUDED.ai_reflection, \
                 last_modified = EXCLUDED.last_modified \
             WHERE entries.user_id = EXCLUDED.user_id \
             RETURNING {ENTRY_COLUMNS}"
        ))
        .bind(row.id.unwrap_or_else(Uuid::new_v4))
        .bind(row.owner_id)
        .bind(&row.title)
        .bind(&row.content)
        .bind(row.date)
        .bind(&row.mood)
        .bind(&row.ai_reflection)
        .bind(row.last_modified)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        match record {
            Some(r) => Ok(r.to_domain()),
            None => Err(PortError::Store(
                "entry was not updated; it belongs to another user".to_string(),
            )),
        }
    }

    async fn remove(&self, id: Uuid, owner: Uuid) -> PortResult<()> {
        // Zero affected rows is fine: deletion is idempotent.
        sqlx::query("DELETE FROM entries WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(())
    }
}

//=========================================================================================
// `AuthStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl AuthStore for DbAdapter {
    async fn create_user_with_email(
        &self,
        email: &str,
        display_name: &str,
        hashed_password: &str,
    ) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (user_id, email, display_name, hashed_password) \
             VALUES ($1, $2, $3, $4) RETURNING user_id, email, display_name",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(display_name)
        .bind(hashed_password)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if e.as_database_error().is_some_and(|d| d.is_unique_violation()) {
                PortError::Invalid("that email is already registered".to_string())
            } else {
                store_error(e)
            }
        })?;

        Ok(record.to_domain())
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            "SELECT user_id, email, display_name, hashed_password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        match record {
            Some(r) => Ok(r.to_domain()),
            None => Err(PortError::NotFound(format!("No user with email {email}"))),
        }
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(session_id)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT u.user_id, u.email, u.display_name \
             FROM auth_sessions s JOIN users u ON u.user_id = s.user_id \
             WHERE s.id = $1 AND s.expires_at > now()",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        match record {
            Some(r) => Ok(r.to_domain()),
            None => Err(PortError::NotAuthenticated),
        }
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(())
    }
}
