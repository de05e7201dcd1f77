//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the journal REST endpoints and the master
//! definition for the OpenAPI specification.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use chrono::{DateTime, Utc};
use lumina_core::domain::JournalEntry;
use lumina_core::editor::EntryEditor;
use lumina_core::ports::PortError;
use lumina_core::repository::EntryRepository;
use lumina_core::session::SessionManager;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::{IntoParams, OpenApi, ToSchema};
use uuid::Uuid;

use crate::web::state::AppState;

/// The path/body token meaning "this draft has no id yet".
const NEW_ENTRY_TOKEN: &str = "new";

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::auth::signup_handler,
        crate::web::auth::login_handler,
        crate::web::auth::logout_handler,
        list_entries_handler,
        get_entry_handler,
        save_entry_handler,
        delete_entry_handler,
        reflect_handler,
    ),
    components(
        schemas(
            crate::web::auth::SignupRequest,
            crate::web::auth::LoginRequest,
            crate::web::auth::AuthResponse,
            EntryResponse,
            SaveEntryRequest,
            ReflectRequest,
            ReflectionResponse,
        )
    ),
    tags(
        (name = "Lumina Journal API", description = "API endpoints for the personal journal.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// A journal entry as it goes over the wire.
#[derive(Serialize, ToSchema)]
pub struct EntryResponse {
    id: Uuid,
    user_id: Uuid,
    title: String,
    content: String,
    date: DateTime<Utc>,
    mood: Option<String>,
    ai_reflection: Option<String>,
    last_modified: DateTime<Utc>,
}

impl From<JournalEntry> for EntryResponse {
    fn from(entry: JournalEntry) -> Self {
        Self {
            id: entry.id,
            user_id: entry.owner_id,
            title: entry.title,
            content: entry.content,
            date: entry.date,
            mood: entry.mood,
            ai_reflection: entry.ai_reflection,
            last_modified: entry.last_modified,
        }
    }
}

/// The draft sent by the editor. `id` may be a uuid, absent, or the literal
/// token `new`; `date` is only honored when the entry is being created.
#[derive(Deserialize, ToSchema)]
pub struct SaveEntryRequest {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub ai_reflection: Option<String>,
    /// Ask for an AI reflection to be merged in before the save.
    #[serde(default)]
    pub analyze: bool,
}

#[derive(Deserialize, IntoParams)]
pub struct ListParams {
    /// Case-insensitive substring filter over title and content.
    pub q: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct ReflectRequest {
    pub content: String,
}

#[derive(Serialize, ToSchema)]
pub struct ReflectionResponse {
    pub mood: String,
    pub reflection: String,
}

//=========================================================================================
// Helpers
//=========================================================================================

fn repository(state: &AppState, session: Arc<SessionManager>) -> Arc<EntryRepository> {
    Arc::new(EntryRepository::new(state.store.clone(), session))
}

/// Maps a draft's id field to a store id. The `new` token and an absent id
/// both mean "not created yet".
fn parse_entry_id(raw: Option<&str>) -> Result<Option<Uuid>, (StatusCode, String)> {
    match raw {
        None => Ok(None),
        Some(token) if token == NEW_ENTRY_TOKEN => Ok(None),
        Some(raw) => Uuid::parse_str(raw).map(Some).map_err(|_| {
            (
                StatusCode::BAD_REQUEST,
                format!("'{raw}' is not a valid entry id"),
            )
        }),
    }
}

/// Turns a core refusal or failure into a response.
fn port_error_response(e: PortError) -> (StatusCode, String) {
    match e {
        PortError::NotAuthenticated => (
            StatusCode::UNAUTHORIZED,
            "Not authenticated".to_string(),
        ),
        PortError::Invalid(message) => (StatusCode::BAD_REQUEST, message),
        PortError::NotFound(message) => (StatusCode::NOT_FOUND, message),
        PortError::Store(message) => {
            error!("Store failure: {}", message);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "The journal store did not accept the change. Your text was not lost; please try again."
                    .to_string(),
            )
        }
        PortError::Unexpected(message) => {
            error!("Unexpected failure: {}", message);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong. Please try again.".to_string(),
            )
        }
    }
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// List the caller's entries, newest authored first.
///
/// A store failure degrades to an empty list rather than an error, so this
/// endpoint only fails when the caller is not signed in.
#[utoipa::path(
    get,
    path = "/entries",
    params(ListParams),
    responses(
        (status = 200, description = "The caller's entries", body = [EntryResponse]),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_entries_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Arc<SessionManager>>,
    Query(params): Query<ListParams>,
) -> Json<Vec<EntryResponse>> {
    let repository = repository(&state, session);
    let entries = match params.q.as_deref() {
        Some(q) if !q.trim().is_empty() => repository.search(q).await,
        _ => repository.list().await,
    };
    Json(entries.into_iter().map(EntryResponse::from).collect())
}

/// Fetch a single entry.
#[utoipa::path(
    get,
    path = "/entries/{id}",
    params(("id" = Uuid, Path, description = "The entry id")),
    responses(
        (status = 200, description = "The entry", body = EntryResponse),
        (status = 404, description = "No such entry"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_entry_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Arc<SessionManager>>,
    Path(id): Path<Uuid>,
) -> Result<Json<EntryResponse>, (StatusCode, String)> {
    let repository = repository(&state, session);
    match repository.get(id).await {
        Some(entry) => Ok(Json(EntryResponse::from(entry))),
        None => Err((StatusCode::NOT_FOUND, "Entry not found".to_string())),
    }
}

/// Create or update an entry from a draft.
///
/// Drives the entry editor through its lifecycle: load (for an existing id),
/// apply the submitted fields, optionally merge in an AI reflection, then
/// commit.
#[utoipa::path(
    post,
    path = "/entries",
    request_body = SaveEntryRequest,
    responses(
        (status = 201, description = "Entry created", body = EntryResponse),
        (status = 200, description = "Entry updated", body = EntryResponse),
        (status = 400, description = "Invalid draft"),
        (status = 404, description = "The entry to update no longer exists"),
        (status = 401, description = "Not authenticated"),
        (status = 500, description = "The store rejected the write; the draft is preserved")
    )
)]
pub async fn save_entry_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Arc<SessionManager>>,
    Json(req): Json<SaveEntryRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let id = parse_entry_id(req.id.as_deref())?;
    let repository = repository(&state, session);

    let mut editor = EntryEditor::open(repository, state.reflections.clone(), id)
        .await
        .ok_or((StatusCode::NOT_FOUND, "Entry not found".to_string()))?;

    let was_new = editor.is_new();
    editor.set_title(req.title);
    editor.set_content(req.content);
    editor.set_mood(req.mood);
    editor.set_ai_reflection(req.ai_reflection);
    if let Some(date) = req.date {
        editor.set_date(date);
    }

    if req.analyze {
        editor.request_reflection().await.map_err(port_error_response)?;
    }

    let saved = editor.commit().await.map_err(port_error_response)?;

    let status = if was_new {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(EntryResponse::from(saved))))
}

/// Delete an entry.
///
/// Idempotent: deleting an id that is already gone is a success. Nothing is
/// reported deleted until the store confirms it.
#[utoipa::path(
    delete,
    path = "/entries/{id}",
    params(("id" = Uuid, Path, description = "The entry id")),
    responses(
        (status = 204, description = "Entry deleted (or already absent)"),
        (status = 401, description = "Not authenticated"),
        (status = 500, description = "The store rejected the delete")
    )
)]
pub async fn delete_entry_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Arc<SessionManager>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    let repository = repository(&state, session);
    repository.delete(id).await.map_err(port_error_response)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Generate a reflection for some content without saving anything.
///
/// Always answers with a pair: generator trouble degrades to a fallback.
#[utoipa::path(
    post,
    path = "/reflections",
    request_body = ReflectRequest,
    responses(
        (status = 200, description = "A mood label and supportive reflection", body = ReflectionResponse),
        (status = 400, description = "Empty content"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn reflect_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ReflectRequest>,
) -> Result<Json<ReflectionResponse>, (StatusCode, String)> {
    if req.content.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Write some content before requesting a reflection".to_string(),
        ));
    }

    let reflection = state.reflections.analyze(&req.content).await;
    Ok(Json(ReflectionResponse {
        mood: reflection.mood,
        reflection: reflection.reflection,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_new_token_and_an_absent_id_both_mean_uncreated() {
        assert_eq!(parse_entry_id(None).unwrap(), None);
        assert_eq!(parse_entry_id(Some("new")).unwrap(), None);
    }

    #[test]
    fn a_uuid_id_is_parsed() {
        let id = Uuid::new_v4();
        assert_eq!(
            parse_entry_id(Some(&id.to_string())).unwrap(),
            Some(id)
        );
    }

    #[test]
    fn a_malformed_id_is_a_bad_request() {
        let err = parse_entry_id(Some("not-a-uuid")).unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }
}
