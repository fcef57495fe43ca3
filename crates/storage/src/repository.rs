use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use aarambh_core::model::{
    Course, CourseId, Enrollment, Lesson, LessonId, Note, NoteId, QuizAttempt, QuizId,
    Profile, QuizQuestion, ResourceId, Role, StudyResource, Subject, SubjectId, UserId, UserStats,
};
use async_trait::async_trait;
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

//
// ─── CONTRACTS ────────────────────────────────────────────────────────────────
//

#[async_trait]
pub trait QuizRepository: Send + Sync {
    /// Persist or update a question.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the question cannot be stored.
    async fn upsert_quiz(&self, quiz: &QuizQuestion) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_quiz(&self, id: QuizId) -> Result<Option<QuizQuestion>, StorageError>;

    /// List questions in retrieval (insertion) order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_quizzes(&self, approved_only: bool) -> Result<Vec<QuizQuestion>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the question does not exist.
    async fn set_quiz_approved(&self, id: QuizId, approved: bool) -> Result<(), StorageError>;

    /// Delete a question together with the attempts that reference it.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the question does not exist.
    async fn delete_quiz(&self, id: QuizId) -> Result<(), StorageError>;
}

#[async_trait]
pub trait AttemptRepository: Send + Sync {
    /// Append attempt rows and return how many were written.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if an attempt references an unknown
    /// question, or another `StorageError` if any row cannot be stored. No
    /// rows are kept on error.
    async fn append_attempts(&self, attempts: &[QuizAttempt]) -> Result<usize, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_attempts(&self, user_id: UserId) -> Result<Vec<QuizAttempt>, StorageError>;
}

#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the course cannot be stored.
    async fn upsert_course(&self, course: &Course) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_course(&self, id: CourseId) -> Result<Option<Course>, StorageError>;

    /// Newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_courses(&self) -> Result<Vec<Course>, StorageError>;

    /// Delete a course with its lessons and enrollments.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the course does not exist.
    async fn delete_course(&self, id: CourseId) -> Result<(), StorageError>;
}

#[async_trait]
pub trait LessonRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the lesson cannot be stored.
    async fn upsert_lesson(&self, lesson: &Lesson) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_lesson(&self, id: LessonId) -> Result<Option<Lesson>, StorageError>;

    /// Lessons of one course (or all courses), ordered by `order_number`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_lessons(&self, course_id: Option<CourseId>) -> Result<Vec<Lesson>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the lesson does not exist.
    async fn delete_lesson(&self, id: LessonId) -> Result<(), StorageError>;
}

#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the user is already enrolled.
    async fn insert_enrollment(&self, enrollment: &Enrollment) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_enrollments(&self, user_id: UserId) -> Result<Vec<Enrollment>, StorageError>;
}

#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the note cannot be stored.
    async fn upsert_note(&self, note: &Note) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_note(&self, id: NoteId) -> Result<Option<Note>, StorageError>;

    /// Notes of one owner (or everyone), newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_notes(&self, owner: Option<UserId>) -> Result<Vec<Note>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the note does not exist.
    async fn delete_note(&self, id: NoteId) -> Result<(), StorageError>;
}

#[async_trait]
pub trait SubjectRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if another subject already has the name.
    async fn upsert_subject(&self, subject: &Subject) -> Result<(), StorageError>;

    /// Ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_subjects(&self) -> Result<Vec<Subject>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the subject does not exist.
    async fn delete_subject(&self, id: SubjectId) -> Result<(), StorageError>;
}

#[async_trait]
pub trait ResourceRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the resource cannot be stored.
    async fn upsert_resource(&self, resource: &StudyResource) -> Result<(), StorageError>;

    /// Newest upload first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_resources(&self, approved_only: bool)
    -> Result<Vec<StudyResource>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the resource does not exist.
    async fn set_resource_approved(
        &self,
        id: ResourceId,
        approved: bool,
    ) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the resource does not exist.
    async fn delete_resource(&self, id: ResourceId) -> Result<(), StorageError>;
}

#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn role_for(&self, user_id: UserId) -> Result<Option<Role>, StorageError>;

    /// Replace whatever role the user had.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn set_role(&self, user_id: UserId, role: Role) -> Result<(), StorageError>;
}

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Insert the profile, or refresh its name and email. `created_at` is kept.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn upsert_profile(&self, profile: &Profile) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_profile(&self, user_id: UserId) -> Result<Option<Profile>, StorageError>;

    /// Newest profile first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_profiles(&self) -> Result<Vec<Profile>, StorageError>;
}

#[async_trait]
pub trait UserStatsRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_stats(&self, user_id: UserId) -> Result<Option<UserStats>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn upsert_stats(&self, stats: &UserStats) -> Result<(), StorageError>;
}

//
// ─── IN-MEMORY ────────────────────────────────────────────────────────────────
//

#[derive(Default)]
struct Tables {
    // Vec keeps insertion order, which is the order quiz sets are presented in.
    quizzes: Vec<QuizQuestion>,
    attempts: Vec<QuizAttempt>,
    courses: HashMap<CourseId, Course>,
    lessons: HashMap<LessonId, Lesson>,
    enrollments: Vec<Enrollment>,
    notes: HashMap<NoteId, Note>,
    subjects: HashMap<SubjectId, Subject>,
    resources: HashMap<ResourceId, StudyResource>,
    roles: HashMap<UserId, Role>,
    profiles: HashMap<UserId, Profile>,
    stats: HashMap<UserId, UserStats>,
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, StorageError> {
        self.tables
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl QuizRepository for InMemoryRepository {
    async fn upsert_quiz(&self, quiz: &QuizQuestion) -> Result<(), StorageError> {
        let mut t = self.lock()?;
        match t.quizzes.iter_mut().find(|q| q.id() == quiz.id()) {
            Some(existing) => *existing = quiz.clone(),
            None => t.quizzes.push(quiz.clone()),
        }
        Ok(())
    }

    async fn get_quiz(&self, id: QuizId) -> Result<Option<QuizQuestion>, StorageError> {
        Ok(self.lock()?.quizzes.iter().find(|q| q.id() == id).cloned())
    }

    async fn list_quizzes(&self, approved_only: bool) -> Result<Vec<QuizQuestion>, StorageError> {
        Ok(self
            .lock()?
            .quizzes
            .iter()
            .filter(|q| !approved_only || q.approved())
            .cloned()
            .collect())
    }

    async fn set_quiz_approved(&self, id: QuizId, approved: bool) -> Result<(), StorageError> {
        let mut t = self.lock()?;
        let quiz = t
            .quizzes
            .iter_mut()
            .find(|q| q.id() == id)
            .ok_or(StorageError::NotFound)?;
        quiz.set_approved(approved);
        Ok(())
    }

    async fn delete_quiz(&self, id: QuizId) -> Result<(), StorageError> {
        let mut t = self.lock()?;
        let before = t.quizzes.len();
        t.quizzes.retain(|q| q.id() != id);
        if t.quizzes.len() == before {
            return Err(StorageError::NotFound);
        }
        t.attempts.retain(|a| a.quiz_id != id);
        Ok(())
    }
}

#[async_trait]
impl AttemptRepository for InMemoryRepository {
    async fn append_attempts(&self, attempts: &[QuizAttempt]) -> Result<usize, StorageError> {
        let mut t = self.lock()?;
        if attempts
            .iter()
            .any(|a| !t.quizzes.iter().any(|q| q.id() == a.quiz_id))
        {
            return Err(StorageError::NotFound);
        }
        t.attempts.extend_from_slice(attempts);
        Ok(attempts.len())
    }

    async fn list_attempts(&self, user_id: UserId) -> Result<Vec<QuizAttempt>, StorageError> {
        Ok(self
            .lock()?
            .attempts
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CourseRepository for InMemoryRepository {
    async fn upsert_course(&self, course: &Course) -> Result<(), StorageError> {
        self.lock()?.courses.insert(course.id(), course.clone());
        Ok(())
    }

    async fn get_course(&self, id: CourseId) -> Result<Option<Course>, StorageError> {
        Ok(self.lock()?.courses.get(&id).cloned())
    }

    async fn list_courses(&self) -> Result<Vec<Course>, StorageError> {
        let mut courses: Vec<Course> = self.lock()?.courses.values().cloned().collect();
        courses.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| a.title().cmp(b.title()))
        });
        Ok(courses)
    }

    async fn delete_course(&self, id: CourseId) -> Result<(), StorageError> {
        let mut t = self.lock()?;
        t.courses.remove(&id).ok_or(StorageError::NotFound)?;
        t.lessons.retain(|_, lesson| lesson.course_id() != id);
        t.enrollments.retain(|e| e.course_id != id);
        Ok(())
    }
}

#[async_trait]
impl LessonRepository for InMemoryRepository {
    async fn upsert_lesson(&self, lesson: &Lesson) -> Result<(), StorageError> {
        let mut t = self.lock()?;
        if !t.courses.contains_key(&lesson.course_id()) {
            return Err(StorageError::NotFound);
        }
        t.lessons.insert(lesson.id(), lesson.clone());
        Ok(())
    }

    async fn get_lesson(&self, id: LessonId) -> Result<Option<Lesson>, StorageError> {
        Ok(self.lock()?.lessons.get(&id).cloned())
    }

    async fn list_lessons(&self, course_id: Option<CourseId>) -> Result<Vec<Lesson>, StorageError> {
        let mut lessons: Vec<Lesson> = self
            .lock()?
            .lessons
            .values()
            .filter(|l| course_id.is_none_or(|c| l.course_id() == c))
            .cloned()
            .collect();
        lessons.sort_by(|a, b| {
            a.course_id()
                .cmp(&b.course_id())
                .then_with(|| a.order_number().cmp(&b.order_number()))
                .then_with(|| a.title().cmp(b.title()))
        });
        Ok(lessons)
    }

    async fn delete_lesson(&self, id: LessonId) -> Result<(), StorageError> {
        self.lock()?
            .lessons
            .remove(&id)
            .map(|_| ())
            .ok_or(StorageError::NotFound)
    }
}

#[async_trait]
impl EnrollmentRepository for InMemoryRepository {
    async fn insert_enrollment(&self, enrollment: &Enrollment) -> Result<(), StorageError> {
        let mut t = self.lock()?;
        if !t.courses.contains_key(&enrollment.course_id) {
            return Err(StorageError::NotFound);
        }
        if t
            .enrollments
            .iter()
            .any(|e| e.user_id == enrollment.user_id && e.course_id == enrollment.course_id)
        {
            return Err(StorageError::Conflict);
        }
        t.enrollments.push(enrollment.clone());
        Ok(())
    }

    async fn list_enrollments(&self, user_id: UserId) -> Result<Vec<Enrollment>, StorageError> {
        Ok(self
            .lock()?
            .enrollments
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl NoteRepository for InMemoryRepository {
    async fn upsert_note(&self, note: &Note) -> Result<(), StorageError> {
        self.lock()?.notes.insert(note.id(), note.clone());
        Ok(())
    }

    async fn get_note(&self, id: NoteId) -> Result<Option<Note>, StorageError> {
        Ok(self.lock()?.notes.get(&id).cloned())
    }

    async fn list_notes(&self, owner: Option<UserId>) -> Result<Vec<Note>, StorageError> {
        let mut notes: Vec<Note> = self
            .lock()?
            .notes
            .values()
            .filter(|n| owner.is_none_or(|o| n.owner() == o))
            .cloned()
            .collect();
        notes.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| a.title().cmp(b.title()))
        });
        Ok(notes)
    }

    async fn delete_note(&self, id: NoteId) -> Result<(), StorageError> {
        self.lock()?
            .notes
            .remove(&id)
            .map(|_| ())
            .ok_or(StorageError::NotFound)
    }
}

#[async_trait]
impl SubjectRepository for InMemoryRepository {
    async fn upsert_subject(&self, subject: &Subject) -> Result<(), StorageError> {
        let mut t = self.lock()?;
        if t
            .subjects
            .values()
            .any(|s| s.id() != subject.id() && s.name().eq_ignore_ascii_case(subject.name()))
        {
            return Err(StorageError::Conflict);
        }
        t.subjects.insert(subject.id(), subject.clone());
        Ok(())
    }

    async fn list_subjects(&self) -> Result<Vec<Subject>, StorageError> {
        let mut subjects: Vec<Subject> = self.lock()?.subjects.values().cloned().collect();
        subjects.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(subjects)
    }

    async fn delete_subject(&self, id: SubjectId) -> Result<(), StorageError> {
        self.lock()?
            .subjects
            .remove(&id)
            .map(|_| ())
            .ok_or(StorageError::NotFound)
    }
}

#[async_trait]
impl ResourceRepository for InMemoryRepository {
    async fn upsert_resource(&self, resource: &StudyResource) -> Result<(), StorageError> {
        self.lock()?.resources.insert(resource.id(), resource.clone());
        Ok(())
    }

    async fn list_resources(
        &self,
        approved_only: bool,
    ) -> Result<Vec<StudyResource>, StorageError> {
        let mut resources: Vec<StudyResource> = self
            .lock()?
            .resources
            .values()
            .filter(|r| !approved_only || r.approved)
            .cloned()
            .collect();
        resources.sort_by(|a, b| {
            b.uploaded_at()
                .cmp(&a.uploaded_at())
                .then_with(|| a.title().cmp(b.title()))
        });
        Ok(resources)
    }

    async fn set_resource_approved(
        &self,
        id: ResourceId,
        approved: bool,
    ) -> Result<(), StorageError> {
        let mut t = self.lock()?;
        let resource = t.resources.get_mut(&id).ok_or(StorageError::NotFound)?;
        resource.approved = approved;
        Ok(())
    }

    async fn delete_resource(&self, id: ResourceId) -> Result<(), StorageError> {
        self.lock()?
            .resources
            .remove(&id)
            .map(|_| ())
            .ok_or(StorageError::NotFound)
    }
}

#[async_trait]
impl RoleRepository for InMemoryRepository {
    async fn role_for(&self, user_id: UserId) -> Result<Option<Role>, StorageError> {
        Ok(self.lock()?.roles.get(&user_id).copied())
    }

    async fn set_role(&self, user_id: UserId, role: Role) -> Result<(), StorageError> {
        self.lock()?.roles.insert(user_id, role);
        Ok(())
    }
}

#[async_trait]
impl ProfileRepository for InMemoryRepository {
    async fn upsert_profile(&self, profile: &Profile) -> Result<(), StorageError> {
        let mut t = self.lock()?;
        let created_at = t
            .profiles
            .get(&profile.user_id())
            .map_or(profile.created_at(), Profile::created_at);
        let stored = Profile::new(
            profile.user_id(),
            profile.name().map(str::to_string),
            profile.email().map(str::to_string),
            created_at,
        );
        t.profiles.insert(profile.user_id(), stored);
        Ok(())
    }

    async fn get_profile(&self, user_id: UserId) -> Result<Option<Profile>, StorageError> {
        Ok(self.lock()?.profiles.get(&user_id).cloned())
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>, StorageError> {
        let mut profiles: Vec<Profile> = self.lock()?.profiles.values().cloned().collect();
        profiles.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(profiles)
    }
}

#[async_trait]
impl UserStatsRepository for InMemoryRepository {
    async fn get_stats(&self, user_id: UserId) -> Result<Option<UserStats>, StorageError> {
        Ok(self.lock()?.stats.get(&user_id).cloned())
    }

    async fn upsert_stats(&self, stats: &UserStats) -> Result<(), StorageError> {
        self.lock()?.stats.insert(stats.user_id, stats.clone());
        Ok(())
    }
}

//
// ─── AGGREGATE ────────────────────────────────────────────────────────────────
//

/// Aggregates every repository behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub quizzes: Arc<dyn QuizRepository>,
    pub attempts: Arc<dyn AttemptRepository>,
    pub courses: Arc<dyn CourseRepository>,
    pub lessons: Arc<dyn LessonRepository>,
    pub enrollments: Arc<dyn EnrollmentRepository>,
    pub notes: Arc<dyn NoteRepository>,
    pub subjects: Arc<dyn SubjectRepository>,
    pub resources: Arc<dyn ResourceRepository>,
    pub roles: Arc<dyn RoleRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub stats: Arc<dyn UserStatsRepository>,
}

impl Storage {
    /// Wire every repository slot to clones of one backend.
    #[must_use]
    pub fn from_backend<R>(repo: R) -> Self
    where
        R: QuizRepository
            + AttemptRepository
            + CourseRepository
            + LessonRepository
            + EnrollmentRepository
            + NoteRepository
            + SubjectRepository
            + ResourceRepository
            + RoleRepository
            + ProfileRepository
            + UserStatsRepository
            + Clone
            + 'static,
    {
        Self {
            quizzes: Arc::new(repo.clone()),
            attempts: Arc::new(repo.clone()),
            courses: Arc::new(repo.clone()),
            lessons: Arc::new(repo.clone()),
            enrollments: Arc::new(repo.clone()),
            notes: Arc::new(repo.clone()),
            subjects: Arc::new(repo.clone()),
            resources: Arc::new(repo.clone()),
            roles: Arc::new(repo.clone()),
            profiles: Arc::new(repo.clone()),
            stats: Arc::new(repo),
        }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_backend(InMemoryRepository::new())
    }
}
