use std::sync::Arc;

use aarambh_core::model::{Note, NoteDraft, NoteId, UserSession};
use storage::repository::NoteRepository;

use crate::Clock;
use crate::error::NoteServiceError;

/// A user's own notes.
///
/// Every mutation is scoped to the caller: notes owned by someone else are
/// reported as `NotFound`.
#[derive(Clone)]
pub struct NoteService {
    clock: Clock,
    notes: Arc<dyn NoteRepository>,
}

impl NoteService {
    #[must_use]
    pub fn new(clock: Clock, notes: Arc<dyn NoteRepository>) -> Self {
        Self { clock, notes }
    }

    /// # Errors
    ///
    /// Returns `NoteServiceError::Validation` when the title or content is
    /// missing, or a storage error.
    pub async fn create(
        &self,
        user: &UserSession,
        draft: NoteDraft,
    ) -> Result<Note, NoteServiceError> {
        let note = Note::new(NoteId::random(), user.user_id(), draft, self.clock.now())?;
        self.notes.upsert_note(&note).await?;
        tracing::debug!(note = %note.id(), "note created");
        Ok(note)
    }

    /// The caller's notes, newest first.
    ///
    /// # Errors
    ///
    /// Returns `NoteServiceError::Storage` on repository failures.
    pub async fn list(
        &self,
        user: &UserSession,
        show_archived: bool,
    ) -> Result<Vec<Note>, NoteServiceError> {
        let mut notes = self.notes.list_notes(Some(user.user_id())).await?;
        notes.retain(|n| n.visible(show_archived));
        Ok(notes)
    }

    /// # Errors
    ///
    /// Returns `NoteServiceError::NotFound` unless the caller owns the note.
    pub async fn toggle_favorite(
        &self,
        user: &UserSession,
        id: NoteId,
    ) -> Result<Note, NoteServiceError> {
        let mut note = self.owned(user, id).await?;
        note.favorite = !note.favorite;
        self.notes.upsert_note(&note).await?;
        Ok(note)
    }

    /// # Errors
    ///
    /// Returns `NoteServiceError::NotFound` unless the caller owns the note.
    pub async fn toggle_archive(
        &self,
        user: &UserSession,
        id: NoteId,
    ) -> Result<Note, NoteServiceError> {
        let mut note = self.owned(user, id).await?;
        note.archived = !note.archived;
        self.notes.upsert_note(&note).await?;
        Ok(note)
    }

    /// # Errors
    ///
    /// Returns `NoteServiceError::NotFound` unless the caller owns the note.
    pub async fn delete(&self, user: &UserSession, id: NoteId) -> Result<(), NoteServiceError> {
        self.owned(user, id).await?;
        self.notes.delete_note(id).await?;
        tracing::debug!(note = %id, "note deleted");
        Ok(())
    }

    async fn owned(&self, user: &UserSession, id: NoteId) -> Result<Note, NoteServiceError> {
        self.notes
            .get_note(id)
            .await?
            .filter(|n| n.owner() == user.user_id())
            .ok_or(NoteServiceError::NotFound)
    }
}
