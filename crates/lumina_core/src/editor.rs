//! crates/lumina_core/src/editor.rs
//!
//! The entry lifecycle controller: owns one draft while it is being edited
//! and coordinates loading, reflection enrichment, and saving.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{EntryDraft, JournalEntry, Reflection};
use crate::ports::{PortError, PortResult};
use crate::reflection::ReflectionService;
use crate::repository::EntryRepository;

/// Where the editor is in its lifecycle.
///
/// `Analyzing` is not a phase: a reflection request overlaps `Ready` and is
/// tracked by its own flag, with commit and reflection mutually excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorPhase {
    Loading,
    Ready,
    Saving,
    Done,
}

/// Orchestrates create-vs-update decisions, reflection requests, and save
/// state for a single draft.
pub struct EntryEditor {
    repository: Arc<EntryRepository>,
    reflections: Arc<ReflectionService>,
    draft: EntryDraft,
    phase: EditorPhase,
    analyzing: bool,
}

impl EntryEditor {
    /// Opens the editor.
    ///
    /// With an id, the entry is loaded through the repository; `None` means
    /// it vanished or is inaccessible, and the caller should navigate away
    /// instead of showing a broken editor. Without an id, editing starts
    /// immediately on an empty draft.
    pub async fn open(
        repository: Arc<EntryRepository>,
        reflections: Arc<ReflectionService>,
        id: Option<Uuid>,
    ) -> Option<Self> {
        let mut editor = Self {
            repository,
            reflections,
            draft: EntryDraft::default(),
            phase: if id.is_some() {
                EditorPhase::Loading
            } else {
                EditorPhase::Ready
            },
            analyzing: false,
        };

        if let Some(id) = id {
            let entry = editor.repository.get(id).await?;
            editor.draft = EntryDraft::from_entry(&entry);
            editor.phase = EditorPhase::Ready;
        }
        Some(editor)
    }

    pub fn phase(&self) -> EditorPhase {
        self.phase
    }

    pub fn is_analyzing(&self) -> bool {
        self.analyzing
    }

    pub fn draft(&self) -> &EntryDraft {
        &self.draft
    }

    /// True while the draft has never been committed to the store.
    pub fn is_new(&self) -> bool {
        self.draft.id.is_none()
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.draft.title = title.into();
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.draft.content = content.into();
    }

    /// Sets the authored date of a draft that has not been created yet.
    ///
    /// Has no effect on an existing entry: an edit never resends the date.
    pub fn set_date(&mut self, date: DateTime<Utc>) {
        if self.draft.id.is_none() {
            self.draft.date = Some(date);
        }
    }

    pub fn set_mood(&mut self, mood: Option<String>) {
        self.draft.mood = mood;
    }

    pub fn set_ai_reflection(&mut self, ai_reflection: Option<String>) {
        self.draft.ai_reflection = ai_reflection;
    }

    /// Asks the reflection service to enrich the draft.
    ///
    /// Valid only while `Ready` with non-empty content, and serialized: a
    /// request arriving while another is outstanding is rejected rather than
    /// merged in an undefined order. On completion the mood and reflection
    /// are merged into the draft together.
    pub async fn request_reflection(&mut self) -> PortResult<Reflection> {
        self.ensure_ready("request a reflection")?;
        if self.draft.content.trim().is_empty() {
            return Err(PortError::Invalid(
                "write some content before requesting a reflection".to_string(),
            ));
        }

        self.analyzing = true;
        // `analyze` is total, so the flag always clears again.
        let reflection = self.reflections.analyze(&self.draft.content).await;
        self.draft.mood = Some(reflection.mood.clone());
        self.draft.ai_reflection = Some(reflection.reflection.clone());
        self.analyzing = false;
        Ok(reflection)
    }

    /// Persists the draft.
    ///
    /// Valid only while `Ready` with a title and content and no reflection in
    /// flight. On success the editor is `Done` and the stored entry is
    /// returned; on a store failure it transitions back to `Ready` with the
    /// draft intact so the user can retry.
    pub async fn commit(&mut self) -> PortResult<JournalEntry> {
        self.ensure_ready("save")?;
        if self.draft.title.trim().is_empty() || self.draft.content.trim().is_empty() {
            return Err(PortError::Invalid(
                "a title and some content are needed before saving".to_string(),
            ));
        }

        let mut payload = self.draft.clone();
        // The authored date is written once, at creation. An update never
        // resends it, so the store keeps the original.
        payload.date = if payload.id.is_none() {
            Some(payload.date.unwrap_or_else(Utc::now))
        } else {
            None
        };

        self.phase = EditorPhase::Saving;
        match self.repository.save(&payload).await {
            Ok(saved) => {
                self.draft.id = Some(saved.id);
                self.phase = EditorPhase::Done;
                Ok(saved)
            }
            Err(e) => {
                self.phase = EditorPhase::Ready;
                Err(e)
            }
        }
    }

    fn ensure_ready(&self, action: &str) -> PortResult<()> {
        if self.phase != EditorPhase::Ready {
            return Err(PortError::Invalid(format!(
                "cannot {action} while the editor is {:?}",
                self.phase
            )));
        }
        if self.analyzing {
            return Err(PortError::Invalid(format!(
                "cannot {action} while a reflection is being generated"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::session::SessionManager;
    use crate::test_support::{test_user, MemoryStore, ScriptedModel, StaticAuthProvider};

    struct Fixture {
        store: Arc<MemoryStore>,
        repository: Arc<EntryRepository>,
        reflections: Arc<ReflectionService>,
    }

    fn fixture(entries: Vec<JournalEntry>, model: ScriptedModel) -> Fixture {
        let store = Arc::new(MemoryStore::with_entries(entries));
        let session = Arc::new(SessionManager::new(Arc::new(
            StaticAuthProvider::signed_in(test_user()),
        )));
        Fixture {
            store: store.clone(),
            repository: Arc::new(EntryRepository::new(store, session)),
            reflections: Arc::new(ReflectionService::new(Arc::new(model))),
        }
    }

    fn existing_entry() -> JournalEntry {
        JournalEntry {
            id: Uuid::from_u128(10),
            owner_id: test_user().id,
            title: "Day one".to_string(),
            content: "it begins".to_string(),
            date: Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
            mood: None,
            ai_reflection: None,
            last_modified: Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
        }
    }

    async fn open_new(f: &Fixture) -> EntryEditor {
        EntryEditor::open(f.repository.clone(), f.reflections.clone(), None)
            .await
            .unwrap()
    }

    // The first save of a fresh draft creates the row.
    #[tokio::test]
    async fn committing_a_new_draft_creates_the_entry() {
        let f = fixture(vec![], ScriptedModel::failing());
        let before = Utc::now();
        let mut editor = open_new(&f).await;
        assert_eq!(editor.phase(), EditorPhase::Ready);

        editor.set_title("First");
        editor.set_content("Today was good");
        let saved = editor.commit().await.unwrap();

        assert_eq!(editor.phase(), EditorPhase::Done);
        assert_eq!(saved.owner_id, test_user().id);
        assert_eq!(saved.title, "First");
        assert!(saved.date >= before);
        assert!(saved.last_modified >= before);
        assert_eq!(f.store.entry(saved.id).unwrap().content, "Today was good");
    }

    // Editing an existing entry never moves its authored date.
    #[tokio::test]
    async fn committing_an_edit_preserves_the_authored_date() {
        let entry = existing_entry();
        let authored = entry.date;
        let f = fixture(vec![entry.clone()], ScriptedModel::failing());

        let mut editor =
            EntryEditor::open(f.repository.clone(), f.reflections.clone(), Some(entry.id))
                .await
                .unwrap();
        editor.set_content("it begins, revised");
        let saved = editor.commit().await.unwrap();

        assert_eq!(saved.id, entry.id);
        assert_eq!(saved.date, authored);
        assert!(saved.last_modified > entry.last_modified);
    }

    #[tokio::test]
    async fn opening_a_vanished_entry_yields_none() {
        let f = fixture(vec![], ScriptedModel::failing());
        let editor = EntryEditor::open(
            f.repository.clone(),
            f.reflections.clone(),
            Some(Uuid::from_u128(99)),
        )
        .await;
        assert!(editor.is_none());
    }

    // Mood and reflection land in the draft together, then persist.
    #[tokio::test]
    async fn a_reflection_is_merged_into_the_draft_and_persisted() {
        let f = fixture(
            vec![],
            ScriptedModel::output(r#"{"mood": "Anxious", "reflection": "Take a breath; you carried a lot today."}"#),
        );
        let mut editor = open_new(&f).await;
        editor.set_title("Heavy");
        editor.set_content("I feel overwhelmed");

        let reflection = editor.request_reflection().await.unwrap();
        assert_eq!(editor.phase(), EditorPhase::Ready);
        assert!(!editor.is_analyzing());
        assert_eq!(editor.draft().mood.as_deref(), Some("Anxious"));
        assert_eq!(
            editor.draft().ai_reflection.as_deref(),
            Some(reflection.reflection.as_str())
        );

        let saved = editor.commit().await.unwrap();
        assert_eq!(saved.mood.as_deref(), Some("Anxious"));
        assert_eq!(
            saved.ai_reflection.as_deref(),
            Some("Take a breath; you carried a lot today.")
        );
    }

    // A generator fault degrades to a fallback and the editor
    // stays usable.
    #[tokio::test]
    async fn a_failed_reflection_leaves_the_editor_usable() {
        let f = fixture(vec![], ScriptedModel::failing());
        let mut editor = open_new(&f).await;
        editor.set_title("Heavy");
        editor.set_content("I feel overwhelmed");

        let reflection = editor.request_reflection().await.unwrap();
        assert_eq!(reflection, Reflection::unavailable());
        assert_eq!(editor.phase(), EditorPhase::Ready);

        let saved = editor.commit().await.unwrap();
        assert_eq!(saved.mood.as_deref(), Some("Unknown"));
    }

    #[tokio::test]
    async fn a_reflection_needs_content() {
        let f = fixture(vec![], ScriptedModel::failing());
        let mut editor = open_new(&f).await;
        editor.set_title("Untitled");

        assert!(matches!(
            editor.request_reflection().await,
            Err(PortError::Invalid(_))
        ));
    }

    #[tokio::test]
    async fn commit_requires_title_and_content() {
        let f = fixture(vec![], ScriptedModel::failing());
        let mut editor = open_new(&f).await;
        editor.set_content("words without a title");

        assert!(matches!(editor.commit().await, Err(PortError::Invalid(_))));
        assert_eq!(editor.phase(), EditorPhase::Ready);
    }

    #[tokio::test]
    async fn a_failed_commit_returns_to_ready_with_the_draft_intact() {
        let f = fixture(vec![], ScriptedModel::failing());
        let mut editor = open_new(&f).await;
        editor.set_title("First");
        editor.set_content("Today was good");

        f.store.set_failing(true);
        assert!(matches!(editor.commit().await, Err(PortError::Store(_))));
        assert_eq!(editor.phase(), EditorPhase::Ready);
        assert_eq!(editor.draft().title, "First");
        assert_eq!(editor.draft().content, "Today was good");

        // The user retries once the store is back.
        f.store.set_failing(false);
        assert!(editor.commit().await.is_ok());
        assert_eq!(editor.phase(), EditorPhase::Done);
    }

    #[tokio::test]
    async fn a_finished_editor_refuses_further_operations() {
        let f = fixture(vec![], ScriptedModel::failing());
        let mut editor = open_new(&f).await;
        editor.set_title("First");
        editor.set_content("Today was good");
        editor.commit().await.unwrap();

        assert!(matches!(editor.commit().await, Err(PortError::Invalid(_))));
        assert!(matches!(
            editor.request_reflection().await,
            Err(PortError::Invalid(_))
        ));
    }
}
