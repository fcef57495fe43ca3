//! Moderation and catalog management for admins.
//!
//! Every entry point takes the caller's [`UserSession`] and refuses to do
//! anything unless it carries the admin role. Approval and deletion are
//! dispatched over closed enums so each entity keeps its own typed id.

use std::sync::Arc;

use aarambh_core::model::{
    Course, CourseDraft, CourseId, Lesson, LessonDraft, LessonId, Note, NoteDraft, NoteId,
    Profile, QuizDraft, QuizId, QuizQuestion, ResourceId, ResourceKind, Role, StudyResource,
    Subject, SubjectId, UserId, UserSession,
};
use storage::repository::{Storage, StorageError};

use crate::Clock;
use crate::error::AdminError;

/// Rows that can be approved or rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationTarget {
    Note(NoteId),
    Quiz(QuizId),
    Resource(ResourceId),
}

/// Rows an admin may delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminEntity {
    Course(CourseId),
    Lesson(LessonId),
    Note(NoteId),
    Quiz(QuizId),
    Resource(ResourceId),
    Subject(SubjectId),
}

impl AdminEntity {
    fn label(self) -> &'static str {
        match self {
            Self::Course(_) => "course",
            Self::Lesson(_) => "lesson",
            Self::Note(_) => "note",
            Self::Quiz(_) => "quiz",
            Self::Resource(_) => "resource",
            Self::Subject(_) => "subject",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdminStats {
    pub users: usize,
    pub courses: usize,
    pub lessons: usize,
    pub notes: usize,
    pub quizzes: usize,
    pub resources: usize,
    pub subjects: usize,
}

/// Items waiting for moderation.
#[derive(Debug, Clone, Default)]
pub struct PendingReview {
    pub notes: Vec<Note>,
    pub quizzes: Vec<QuizQuestion>,
    pub resources: Vec<StudyResource>,
}

/// A directory entry with the role the user currently holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSummary {
    pub profile: Profile,
    pub role: Role,
}

/// Input for a new study resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDraft {
    pub title: String,
    pub subject: String,
    pub kind: ResourceKind,
    pub url: String,
}

fn not_found(what: &'static str) -> impl FnOnce(StorageError) -> AdminError {
    move |e| match e {
        StorageError::NotFound => AdminError::NotFound(what),
        other => AdminError::Storage(other),
    }
}

fn invalid(e: impl Into<aarambh_core::Error>) -> AdminError {
    AdminError::Validation(e.into())
}

#[derive(Clone)]
pub struct AdminService {
    clock: Clock,
    storage: Storage,
}

impl AdminService {
    #[must_use]
    pub fn new(clock: Clock, storage: Storage) -> Self {
        Self { clock, storage }
    }

    fn require_admin(session: &UserSession) -> Result<(), AdminError> {
        if session.is_admin() {
            Ok(())
        } else {
            tracing::warn!(user = %session.user_id(), "admin action refused");
            Err(AdminError::Forbidden)
        }
    }

    /// # Errors
    ///
    /// Returns `AdminError::Forbidden` for non-admins, or a storage error.
    pub async fn stats(&self, session: &UserSession) -> Result<AdminStats, AdminError> {
        Self::require_admin(session)?;
        let s = &self.storage;
        Ok(AdminStats {
            users: s.profiles.list_profiles().await?.len(),
            courses: s.courses.list_courses().await?.len(),
            lessons: s.lessons.list_lessons(None).await?.len(),
            notes: s.notes.list_notes(None).await?.len(),
            quizzes: s.quizzes.list_quizzes(false).await?.len(),
            resources: s.resources.list_resources(false).await?.len(),
            subjects: s.subjects.list_subjects().await?.len(),
        })
    }

    /// # Errors
    ///
    /// Returns `AdminError::Forbidden` for non-admins, or a storage error.
    pub async fn pending(&self, session: &UserSession) -> Result<PendingReview, AdminError> {
        Self::require_admin(session)?;
        let s = &self.storage;
        let mut notes = s.notes.list_notes(None).await?;
        notes.retain(|n| !n.approved);
        let mut quizzes = s.quizzes.list_quizzes(false).await?;
        quizzes.retain(|q| !q.approved());
        let mut resources = s.resources.list_resources(false).await?;
        resources.retain(|r| !r.approved);
        Ok(PendingReview {
            notes,
            quizzes,
            resources,
        })
    }

    /// Every known user, newest first, with their role. Users without a
    /// role row are students.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Forbidden` for non-admins, or a storage error.
    pub async fn users(&self, session: &UserSession) -> Result<Vec<UserSummary>, AdminError> {
        Self::require_admin(session)?;
        let s = &self.storage;
        let mut users = Vec::new();
        for profile in s.profiles.list_profiles().await? {
            let role = s.roles.role_for(profile.user_id()).await?.unwrap_or_default();
            users.push(UserSummary { profile, role });
        }
        Ok(users)
    }

    /// # Errors
    ///
    /// Returns `AdminError::Forbidden` for non-admins, or a storage error.
    pub async fn subjects(&self, session: &UserSession) -> Result<Vec<Subject>, AdminError> {
        Self::require_admin(session)?;
        Ok(self.storage.subjects.list_subjects().await?)
    }

    /// # Errors
    ///
    /// Returns `AdminError::Forbidden` for non-admins and
    /// `AdminError::NotFound` for a missing row.
    pub async fn set_approved(
        &self,
        session: &UserSession,
        target: ModerationTarget,
        approved: bool,
    ) -> Result<(), AdminError> {
        Self::require_admin(session)?;
        let s = &self.storage;
        match target {
            ModerationTarget::Note(id) => {
                let mut note = s
                    .notes
                    .get_note(id)
                    .await?
                    .ok_or(AdminError::NotFound("note"))?;
                note.approved = approved;
                s.notes.upsert_note(&note).await?;
            }
            ModerationTarget::Quiz(id) => s
                .quizzes
                .set_quiz_approved(id, approved)
                .await
                .map_err(not_found("quiz"))?,
            ModerationTarget::Resource(id) => s
                .resources
                .set_resource_approved(id, approved)
                .await
                .map_err(not_found("resource"))?,
        }
        tracing::info!(admin = %session.user_id(), ?target, approved, "moderation updated");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `AdminError::Forbidden` for non-admins and
    /// `AdminError::NotFound` for a missing row.
    pub async fn delete(&self, session: &UserSession, entity: AdminEntity) -> Result<(), AdminError> {
        Self::require_admin(session)?;
        let s = &self.storage;
        let res = match entity {
            AdminEntity::Course(id) => s.courses.delete_course(id).await,
            AdminEntity::Lesson(id) => s.lessons.delete_lesson(id).await,
            AdminEntity::Note(id) => s.notes.delete_note(id).await,
            AdminEntity::Quiz(id) => s.quizzes.delete_quiz(id).await,
            AdminEntity::Resource(id) => s.resources.delete_resource(id).await,
            AdminEntity::Subject(id) => s.subjects.delete_subject(id).await,
        };
        res.map_err(not_found(entity.label()))?;
        tracing::info!(admin = %session.user_id(), ?entity, "deleted");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `AdminError::Validation` for a blank name and
    /// `AdminError::DuplicateSubject` when the name is taken.
    pub async fn create_subject(
        &self,
        session: &UserSession,
        name: &str,
        description: Option<String>,
    ) -> Result<Subject, AdminError> {
        self.save_subject(session, SubjectId::random(), name, description)
            .await
    }

    /// # Errors
    ///
    /// Same as [`AdminService::create_subject`].
    pub async fn update_subject(
        &self,
        session: &UserSession,
        id: SubjectId,
        name: &str,
        description: Option<String>,
    ) -> Result<Subject, AdminError> {
        self.save_subject(session, id, name, description).await
    }

    async fn save_subject(
        &self,
        session: &UserSession,
        id: SubjectId,
        name: &str,
        description: Option<String>,
    ) -> Result<Subject, AdminError> {
        Self::require_admin(session)?;
        let subject = Subject::new(id, name, description).map_err(invalid)?;
        match self.storage.subjects.upsert_subject(&subject).await {
            Ok(()) => Ok(subject),
            Err(StorageError::Conflict) => Err(AdminError::DuplicateSubject),
            Err(other) => Err(other.into()),
        }
    }

    /// The caller becomes the course instructor.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Validation` for a blank title.
    pub async fn create_course(
        &self,
        session: &UserSession,
        draft: CourseDraft,
    ) -> Result<Course, AdminError> {
        Self::require_admin(session)?;
        let course = Course::new(CourseId::random(), draft, session.user_id(), self.clock.now())
            .map_err(invalid)?;
        self.storage.courses.upsert_course(&course).await?;
        tracing::info!(admin = %session.user_id(), course = %course.id(), "course created");
        Ok(course)
    }

    /// # Errors
    ///
    /// Returns `AdminError::NotFound` for an unknown course and
    /// `AdminError::Validation` for a blank title.
    pub async fn update_course(
        &self,
        session: &UserSession,
        id: CourseId,
        draft: CourseDraft,
    ) -> Result<Course, AdminError> {
        Self::require_admin(session)?;
        let mut course = self
            .storage
            .courses
            .get_course(id)
            .await?
            .ok_or(AdminError::NotFound("course"))?;
        course.apply(draft).map_err(invalid)?;
        self.storage.courses.upsert_course(&course).await?;
        Ok(course)
    }

    /// # Errors
    ///
    /// Returns `AdminError::Validation` for a missing course or title, or
    /// `AdminError::NotFound` when the course does not exist.
    pub async fn create_lesson(
        &self,
        session: &UserSession,
        draft: LessonDraft,
    ) -> Result<Lesson, AdminError> {
        self.save_lesson(session, LessonId::random(), draft).await
    }

    /// # Errors
    ///
    /// Same as [`AdminService::create_lesson`].
    pub async fn update_lesson(
        &self,
        session: &UserSession,
        id: LessonId,
        draft: LessonDraft,
    ) -> Result<Lesson, AdminError> {
        Self::require_admin(session)?;
        if self.storage.lessons.get_lesson(id).await?.is_none() {
            return Err(AdminError::NotFound("lesson"));
        }
        self.save_lesson(session, id, draft).await
    }

    async fn save_lesson(
        &self,
        session: &UserSession,
        id: LessonId,
        draft: LessonDraft,
    ) -> Result<Lesson, AdminError> {
        Self::require_admin(session)?;
        let lesson = Lesson::new(id, draft).map_err(invalid)?;
        self.storage
            .lessons
            .upsert_lesson(&lesson)
            .await
            .map_err(not_found("course"))?;
        Ok(lesson)
    }

    /// Admin-authored questions are published immediately.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Validation` when any field is missing.
    pub async fn create_quiz(
        &self,
        session: &UserSession,
        draft: QuizDraft,
    ) -> Result<QuizQuestion, AdminError> {
        Self::require_admin(session)?;
        let quiz = QuizQuestion::from_persisted(
            QuizId::random(),
            draft,
            true,
            Some(session.user_id()),
        )
        .map_err(invalid)?;
        self.storage.quizzes.upsert_quiz(&quiz).await?;
        tracing::info!(admin = %session.user_id(), quiz = %quiz.id(), "quiz created");
        Ok(quiz)
    }

    /// Keeps the approval state and author of the existing question.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NotFound` for an unknown question and
    /// `AdminError::Validation` when any field is missing.
    pub async fn update_quiz(
        &self,
        session: &UserSession,
        id: QuizId,
        draft: QuizDraft,
    ) -> Result<QuizQuestion, AdminError> {
        Self::require_admin(session)?;
        let existing = self
            .storage
            .quizzes
            .get_quiz(id)
            .await?
            .ok_or(AdminError::NotFound("quiz"))?;
        let quiz = QuizQuestion::from_persisted(id, draft, existing.approved(), existing.created_by())
            .map_err(invalid)?;
        self.storage.quizzes.upsert_quiz(&quiz).await?;
        Ok(quiz)
    }

    /// Edit any user's note. Owner, approval and flags stay as they were.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NotFound` for an unknown note and
    /// `AdminError::Validation` for a blank title or content.
    pub async fn update_note(
        &self,
        session: &UserSession,
        id: NoteId,
        draft: NoteDraft,
    ) -> Result<Note, AdminError> {
        Self::require_admin(session)?;
        let mut note = self
            .storage
            .notes
            .get_note(id)
            .await?
            .ok_or(AdminError::NotFound("note"))?;
        note.apply(draft).map_err(invalid)?;
        self.storage.notes.upsert_note(&note).await?;
        tracing::info!(admin = %session.user_id(), note = %id, "note updated");
        Ok(note)
    }

    /// # Errors
    ///
    /// Returns `AdminError::Validation` for a blank title or subject or a bad URL.
    pub async fn create_resource(
        &self,
        session: &UserSession,
        draft: ResourceDraft,
    ) -> Result<StudyResource, AdminError> {
        Self::require_admin(session)?;
        let resource = StudyResource::new(
            ResourceId::random(),
            draft.title,
            draft.subject,
            draft.kind,
            &draft.url,
            true,
            self.clock.now(),
        )
        .map_err(invalid)?;
        self.storage.resources.upsert_resource(&resource).await?;
        Ok(resource)
    }

    /// Replaces whatever role the user had.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Forbidden` for non-admins, or a storage error.
    pub async fn set_user_role(
        &self,
        session: &UserSession,
        user: UserId,
        role: Role,
    ) -> Result<(), AdminError> {
        Self::require_admin(session)?;
        self.storage.roles.set_role(user, role).await?;
        tracing::info!(admin = %session.user_id(), %user, role = role.as_str(), "role changed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aarambh_core::model::{AnswerOption, QuizError};
    use aarambh_core::time::{fixed_clock, fixed_now};

    fn admin() -> UserSession {
        UserSession::local(UserId::random(), Role::Admin)
    }

    fn quiz_draft() -> QuizDraft {
        QuizDraft {
            subject: "Mathematics".into(),
            question: "What is 2 + 2?".into(),
            options: ["3".into(), "4".into(), "5".into(), "6".into()],
            correct: Some(AnswerOption::B),
        }
    }

    #[tokio::test]
    async fn non_admins_are_refused() {
        let svc = AdminService::new(fixed_clock(), Storage::in_memory());
        let student = UserSession::local(UserId::random(), Role::Student);
        let instructor = UserSession::local(UserId::random(), Role::Instructor);

        assert!(matches!(svc.stats(&student).await, Err(AdminError::Forbidden)));
        assert!(matches!(
            svc.create_quiz(&instructor, quiz_draft()).await,
            Err(AdminError::Forbidden)
        ));
        assert!(matches!(
            svc.delete(&student, AdminEntity::Quiz(QuizId::random())).await,
            Err(AdminError::Forbidden)
        ));
    }

    #[tokio::test]
    async fn create_quiz_validates_before_writing() {
        let svc = AdminService::new(fixed_clock(), Storage::in_memory());
        let mut draft = quiz_draft();
        draft.correct = None;
        let err = svc.create_quiz(&admin(), draft).await.unwrap_err();
        assert!(matches!(
            err,
            AdminError::Validation(aarambh_core::Error::Quiz(QuizError::MissingField { .. }))
        ));
        assert_eq!(svc.stats(&admin()).await.unwrap().quizzes, 0);
    }

    #[tokio::test]
    async fn moderation_and_delete_are_typed() {
        let storage = Storage::in_memory();
        let svc = AdminService::new(fixed_clock(), storage.clone());
        let me = admin();
        let quiz = svc.create_quiz(&me, quiz_draft()).await.unwrap();
        assert!(quiz.approved());

        svc.set_approved(&me, ModerationTarget::Quiz(quiz.id()), false)
            .await
            .unwrap();
        assert_eq!(svc.pending(&me).await.unwrap().quizzes.len(), 1);

        svc.delete(&me, AdminEntity::Quiz(quiz.id())).await.unwrap();
        assert!(matches!(
            svc.delete(&me, AdminEntity::Quiz(quiz.id())).await,
            Err(AdminError::NotFound("quiz"))
        ));
        assert!(matches!(
            svc.set_approved(&me, ModerationTarget::Note(NoteId::random()), true)
                .await,
            Err(AdminError::NotFound("note"))
        ));
    }

    #[tokio::test]
    async fn subjects_are_unique_and_roles_replace() {
        let storage = Storage::in_memory();
        let svc = AdminService::new(fixed_clock(), storage.clone());
        let me = admin();

        svc.create_subject(&me, "Mathematics", None).await.unwrap();
        assert!(matches!(
            svc.create_subject(&me, "mathematics", None).await,
            Err(AdminError::DuplicateSubject)
        ));

        let user = UserId::random();
        svc.set_user_role(&me, user, Role::Instructor).await.unwrap();
        svc.set_user_role(&me, user, Role::Admin).await.unwrap();
        assert_eq!(storage.roles.role_for(user).await.unwrap(), Some(Role::Admin));
    }

    #[tokio::test]
    async fn users_list_profiles_with_roles() {
        use chrono::Duration;

        let storage = Storage::in_memory();
        let svc = AdminService::new(fixed_clock(), storage.clone());
        let me = admin();

        let asha = Profile::new(UserId::random(), Some("Asha".into()), None, fixed_now());
        let ravi = Profile::new(
            UserId::random(),
            Some("Ravi".into()),
            None,
            fixed_now() + Duration::days(1),
        );
        storage.profiles.upsert_profile(&asha).await.unwrap();
        storage.profiles.upsert_profile(&ravi).await.unwrap();
        svc.set_user_role(&me, asha.user_id(), Role::Instructor).await.unwrap();

        let users = svc.users(&me).await.unwrap();
        assert_eq!(
            users,
            vec![
                UserSummary { profile: ravi, role: Role::Student },
                UserSummary { profile: asha, role: Role::Instructor },
            ]
        );
        assert_eq!(svc.stats(&me).await.unwrap().users, 2);

        let student = UserSession::local(UserId::random(), Role::Student);
        assert!(matches!(svc.users(&student).await, Err(AdminError::Forbidden)));
    }

    #[tokio::test]
    async fn update_note_validates_and_keeps_owner() {
        let storage = Storage::in_memory();
        let svc = AdminService::new(fixed_clock(), storage.clone());
        let owner = UserId::random();
        let mut note = Note::new(
            NoteId::random(),
            owner,
            NoteDraft {
                title: "Photosynthesis".into(),
                content: "light + water".into(),
                subject: "Science".into(),
                file_url: None,
            },
            fixed_now(),
        )
        .unwrap();
        note.approved = true;
        storage.notes.upsert_note(&note).await.unwrap();

        let edit = NoteDraft {
            title: "Photosynthesis basics".into(),
            content: "light + water + CO2".into(),
            subject: "Biology".into(),
            file_url: None,
        };
        let updated = svc.update_note(&admin(), note.id(), edit.clone()).await.unwrap();
        assert_eq!(updated.title(), "Photosynthesis basics");
        assert_eq!(updated.subject(), "Biology");
        assert_eq!(updated.owner(), owner);
        assert!(updated.approved);
        let stored = storage.notes.get_note(note.id()).await.unwrap().unwrap();
        assert_eq!(stored, updated);

        let blank = NoteDraft { content: " ".into(), ..edit.clone() };
        assert!(matches!(
            svc.update_note(&admin(), note.id(), blank).await,
            Err(AdminError::Validation(_))
        ));
        assert!(matches!(
            svc.update_note(&admin(), NoteId::random(), edit).await,
            Err(AdminError::NotFound("note"))
        ));
    }
}
