use chrono::{DateTime, Utc};
use thiserror::Error;
use url::Url;

use crate::model::ids::{NoteId, UserId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NoteError {
    #[error("{field} must not be empty")]
    MissingField { field: &'static str },

    #[error("invalid file url: {0}")]
    InvalidFileUrl(String),
}

/// User-entered note fields before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    pub subject: String,
    pub file_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    id: NoteId,
    owner: UserId,
    title: String,
    content: String,
    subject: String,
    file_url: Option<Url>,
    pub favorite: bool,
    pub archived: bool,
    pub approved: bool,
    created_at: DateTime<Utc>,
}

impl Note {
    /// Validates a draft. Title and content are required; a blank subject
    /// falls back to "General".
    ///
    /// # Errors
    ///
    /// Returns `NoteError::MissingField` or `NoteError::InvalidFileUrl`.
    pub fn new(
        id: NoteId,
        owner: UserId,
        draft: NoteDraft,
        created_at: DateTime<Utc>,
    ) -> Result<Self, NoteError> {
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(NoteError::MissingField { field: "title" });
        }
        if draft.content.trim().is_empty() {
            return Err(NoteError::MissingField { field: "content" });
        }
        let subject = match draft.subject.trim() {
            "" => "General".to_string(),
            s => s.to_string(),
        };
        let file_url = draft
            .file_url
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| Url::parse(raw.trim()).map_err(|_| NoteError::InvalidFileUrl(raw)))
            .transpose()?;

        Ok(Self {
            id,
            owner,
            title: title.to_string(),
            content: draft.content,
            subject,
            file_url,
            favorite: false,
            archived: false,
            approved: false,
            created_at,
        })
    }

    #[must_use]
    pub fn id(&self) -> NoteId {
        self.id
    }

    #[must_use]
    pub fn owner(&self) -> UserId {
        self.owner
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    #[must_use]
    pub fn file_url(&self) -> Option<&Url> {
        self.file_url.as_ref()
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Replace the editable fields. Owner, flags and creation time are kept.
    ///
    /// # Errors
    ///
    /// Same as [`Note::new`]; the note is left untouched on error.
    pub fn apply(&mut self, draft: NoteDraft) -> Result<(), NoteError> {
        let edited = Self::new(self.id, self.owner, draft, self.created_at)?;
        self.title = edited.title;
        self.content = edited.content;
        self.subject = edited.subject;
        self.file_url = edited.file_url;
        Ok(())
    }

    /// Whether the note is shown in a list that may or may not include archived notes.
    #[must_use]
    pub fn visible(&self, show_archived: bool) -> bool {
        show_archived || !self.archived
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn draft(title: &str, content: &str) -> NoteDraft {
        NoteDraft {
            title: title.into(),
            content: content.into(),
            subject: String::new(),
            file_url: None,
        }
    }

    #[test]
    fn requires_title_and_content() {
        let owner = UserId::random();
        let err = Note::new(NoteId::random(), owner, draft("", "body"), fixed_now()).unwrap_err();
        assert_eq!(err, NoteError::MissingField { field: "title" });

        let err = Note::new(NoteId::random(), owner, draft("Title", " "), fixed_now()).unwrap_err();
        assert_eq!(err, NoteError::MissingField { field: "content" });
    }

    #[test]
    fn defaults_subject_and_flags() {
        let note = Note::new(
            NoteId::random(),
            UserId::random(),
            draft("Algebra Formulas", "x = (-b ± √(b²-4ac)) / 2a"),
            fixed_now(),
        )
        .unwrap();
        assert_eq!(note.subject(), "General");
        assert!(!note.favorite && !note.archived && !note.approved);
        assert!(note.visible(false));
    }

    #[test]
    fn rejects_malformed_file_url() {
        let mut with_file = draft("Scan", "see attachment");
        with_file.file_url = Some("not a url".into());
        let err = Note::new(NoteId::random(), UserId::random(), with_file, fixed_now()).unwrap_err();
        assert!(matches!(err, NoteError::InvalidFileUrl(_)));
    }

    #[test]
    fn apply_edits_fields_and_keeps_flags() {
        let mut note = Note::new(NoteId::random(), UserId::random(), draft("Cells", "mitochondria"), fixed_now()).unwrap();
        note.approved = true;
        note.favorite = true;

        let mut edit = draft("Cell biology", "organelles");
        edit.subject = "Science".into();
        note.apply(edit).unwrap();
        assert_eq!(note.title(), "Cell biology");
        assert_eq!(note.subject(), "Science");
        assert!(note.approved && note.favorite);

        assert!(note.apply(draft("  ", "x")).is_err());
        assert_eq!(note.title(), "Cell biology");
    }
}
