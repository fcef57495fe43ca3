use aarambh_core::model::{
    AnswerOption, Course, CourseDraft, CourseId, Enrollment, Lesson, LessonDraft, LessonId, Note,
    NoteDraft, NoteId, Profile, QuizAttempt, QuizDraft, QuizId, QuizQuestion, ResourceId, ResourceKind,
    Role, ScorePercent, StudyResource, Subject, SubjectId, UserId, UserStats,
};
use aarambh_core::time::fixed_now;
use chrono::Duration;
use serde_json::json;
use storage::repository::{
    AttemptRepository, CourseRepository, EnrollmentRepository, LessonRepository, NoteRepository,
    ProfileRepository, QuizRepository, ResourceRepository, RoleRepository, StorageError, SubjectRepository,
    UserStatsRepository,
};
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn quiz(subject: &str, question: &str) -> QuizQuestion {
    QuizQuestion::from_draft(
        QuizId::random(),
        QuizDraft {
            subject: subject.into(),
            question: question.into(),
            options: ["3".into(), "4".into(), "5".into(), "6".into()],
            correct: Some(AnswerOption::B),
        },
        Some(UserId::random()),
    )
    .unwrap()
}

fn course(title: &str, subject: Option<&str>, age_days: i64) -> Course {
    Course::new(
        CourseId::random(),
        CourseDraft {
            title: title.into(),
            description: Some("desc".into()),
            subject: subject.map(Into::into),
        },
        UserId::random(),
        fixed_now() - Duration::days(age_days),
    )
    .unwrap()
}

fn lesson(course: CourseId, title: &str, order: i64) -> Lesson {
    Lesson::new(
        LessonId::random(),
        LessonDraft {
            course_id: Some(course),
            title: title.into(),
            content: "body".into(),
            order_number: order,
        },
    )
    .unwrap()
}

#[tokio::test]
async fn quizzes_round_trip_in_insertion_order() {
    let repo = connect("memdb_quizzes").await;

    let first = quiz("Mathematics", "2+2?");
    let second = quiz("Science", "H2O is?");
    repo.upsert_quiz(&first).await.unwrap();
    repo.upsert_quiz(&second).await.unwrap();

    // Updating the first question must not move it to the back.
    repo.set_quiz_approved(first.id(), true).await.unwrap();
    repo.set_quiz_approved(second.id(), true).await.unwrap();
    repo.upsert_quiz(&first).await.unwrap();

    let listed = repo.list_quizzes(false).await.unwrap();
    assert_eq!(
        listed.iter().map(QuizQuestion::id).collect::<Vec<_>>(),
        vec![first.id(), second.id()]
    );
    assert_eq!(listed[0].correct(), AnswerOption::B);
    assert_eq!(listed[0].option_text(AnswerOption::B), "4");

    // upsert of the unapproved copy reset approval on the first question
    let approved = repo.list_quizzes(true).await.unwrap();
    assert_eq!(approved.len(), 1);
    assert_eq!(approved[0].id(), second.id());

    let fetched = repo.get_quiz(second.id()).await.unwrap().unwrap();
    assert_eq!(fetched, approved[0]);
    assert!(repo.get_quiz(QuizId::random()).await.unwrap().is_none());
}

#[tokio::test]
async fn attempts_append_atomically_and_cascade_on_quiz_delete() {
    let repo = connect("memdb_attempts").await;
    let user = UserId::random();
    let q1 = quiz("Mathematics", "2+2?");
    let q2 = quiz("Mathematics", "3+3?");
    repo.upsert_quiz(&q1).await.unwrap();
    repo.upsert_quiz(&q2).await.unwrap();

    let score = ScorePercent::new(50).unwrap();
    let written = repo
        .append_attempts(&[
            QuizAttempt::new(user, q1.id(), score, fixed_now()),
            QuizAttempt::new(user, q2.id(), score, fixed_now()),
        ])
        .await
        .unwrap();
    assert_eq!(written, 2);

    // One bad row rolls back the whole batch.
    let err = repo
        .append_attempts(&[
            QuizAttempt::new(user, q1.id(), score, fixed_now()),
            QuizAttempt::new(user, QuizId::random(), score, fixed_now()),
        ])
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::NotFound));
    assert_eq!(repo.list_attempts(user).await.unwrap().len(), 2);

    repo.delete_quiz(q1.id()).await.unwrap();
    let remaining = repo.list_attempts(user).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].quiz_id, q2.id());
    assert_eq!(remaining[0].score, score);

    assert!(matches!(
        repo.delete_quiz(q1.id()).await,
        Err(StorageError::NotFound)
    ));
}

#[tokio::test]
async fn courses_lessons_and_enrollments() {
    let repo = connect("memdb_courses").await;
    let old = course("Algebra", Some("Mathematics"), 10);
    let new = course("Chemistry", None, 1);
    repo.upsert_course(&old).await.unwrap();
    repo.upsert_course(&new).await.unwrap();

    let listed = repo.list_courses().await.unwrap();
    assert_eq!(listed[0].id(), new.id());
    assert_eq!(listed[1].subject(), Some("Mathematics"));

    repo.upsert_lesson(&lesson(old.id(), "Second", 2)).await.unwrap();
    repo.upsert_lesson(&lesson(old.id(), "First", 1)).await.unwrap();
    repo.upsert_lesson(&lesson(new.id(), "Atoms", 1)).await.unwrap();

    let algebra: Vec<String> = repo
        .list_lessons(Some(old.id()))
        .await
        .unwrap()
        .iter()
        .map(|l| l.title().to_string())
        .collect();
    assert_eq!(algebra, vec!["First", "Second"]);
    assert_eq!(repo.list_lessons(None).await.unwrap().len(), 3);

    let orphan = lesson(CourseId::random(), "Nowhere", 1);
    assert!(matches!(
        repo.upsert_lesson(&orphan).await,
        Err(StorageError::NotFound)
    ));

    let user = UserId::random();
    let enrollment = Enrollment::new(user, old.id(), fixed_now());
    repo.insert_enrollment(&enrollment).await.unwrap();
    assert!(matches!(
        repo.insert_enrollment(&enrollment).await,
        Err(StorageError::Conflict)
    ));
    assert_eq!(repo.list_enrollments(user).await.unwrap(), vec![enrollment]);

    repo.delete_course(old.id()).await.unwrap();
    assert_eq!(repo.list_lessons(None).await.unwrap().len(), 1);
    assert!(repo.list_enrollments(user).await.unwrap().is_empty());
}

#[tokio::test]
async fn notes_keep_flags_and_owner_scope() {
    let repo = connect("memdb_notes").await;
    let owner = UserId::random();
    let mut note = Note::new(
        NoteId::random(),
        owner,
        NoteDraft {
            title: "Physics Laws".into(),
            content: "F = ma".into(),
            subject: "Physics".into(),
            file_url: Some("https://example.com/laws.pdf".into()),
        },
        fixed_now(),
    )
    .unwrap();
    repo.upsert_note(&note).await.unwrap();

    note.favorite = true;
    note.archived = true;
    repo.upsert_note(&note).await.unwrap();

    let fetched = repo.get_note(note.id()).await.unwrap().unwrap();
    assert!(fetched.favorite && fetched.archived && !fetched.approved);
    assert_eq!(
        fetched.file_url().map(url::Url::as_str),
        Some("https://example.com/laws.pdf")
    );

    assert_eq!(repo.list_notes(Some(owner)).await.unwrap().len(), 1);
    assert!(repo.list_notes(Some(UserId::random())).await.unwrap().is_empty());

    repo.delete_note(note.id()).await.unwrap();
    assert!(matches!(
        repo.delete_note(note.id()).await,
        Err(StorageError::NotFound)
    ));
}

#[tokio::test]
async fn catalog_and_user_tables() {
    let repo = connect("memdb_catalog").await;

    let math = Subject::new(SubjectId::random(), "Mathematics", None).unwrap();
    repo.upsert_subject(&math).await.unwrap();
    let clash = Subject::new(SubjectId::random(), "mathematics", None).unwrap();
    assert!(matches!(
        repo.upsert_subject(&clash).await,
        Err(StorageError::Conflict)
    ));

    let video = StudyResource::new(
        ResourceId::random(),
        "Khan Academy",
        "Mathematics",
        ResourceKind::Video,
        "https://www.khanacademy.org",
        false,
        fixed_now() - Duration::days(2),
    )
    .unwrap();
    repo.upsert_resource(&video).await.unwrap();
    assert!(repo.list_resources(true).await.unwrap().is_empty());
    repo.set_resource_approved(video.id(), true).await.unwrap();
    let approved = repo.list_resources(true).await.unwrap();
    assert_eq!(approved.len(), 1);
    assert_eq!(approved[0].kind(), ResourceKind::Video);
    assert_eq!(approved[0].uploaded_at(), fixed_now() - Duration::days(2));

    let article = StudyResource::new(
        ResourceId::random(),
        "Algebra basics",
        "Mathematics",
        ResourceKind::Article,
        "https://example.com/algebra",
        true,
        fixed_now(),
    )
    .unwrap();
    repo.upsert_resource(&article).await.unwrap();
    let newest_first: Vec<ResourceId> = repo
        .list_resources(true)
        .await
        .unwrap()
        .iter()
        .map(StudyResource::id)
        .collect();
    assert_eq!(newest_first, vec![article.id(), video.id()]);

    let user = UserId::random();
    assert_eq!(repo.role_for(user).await.unwrap(), None);
    repo.set_role(user, Role::Instructor).await.unwrap();
    repo.set_role(user, Role::Admin).await.unwrap();
    assert_eq!(repo.role_for(user).await.unwrap(), Some(Role::Admin));

    let stats = UserStats {
        user_id: user,
        current_streak: 7,
        total_points: 3240,
        achievements: Some(json!(["first-quiz"])),
    };
    repo.upsert_stats(&stats).await.unwrap();
    assert_eq!(repo.get_stats(user).await.unwrap(), Some(stats));
}

#[tokio::test]
async fn profiles_list_newest_first_and_keep_created_at() {
    let repo = connect("memdb_profiles").await;

    let early = UserId::random();
    repo.upsert_profile(&Profile::new(early, None, Some("early@example.com".into()), fixed_now()))
        .await
        .unwrap();
    let late = UserId::random();
    repo.upsert_profile(&Profile::new(
        late,
        Some("Ravi".into()),
        None,
        fixed_now() + Duration::days(1),
    ))
    .await
    .unwrap();

    repo.upsert_profile(&Profile::new(
        early,
        Some("Asha".into()),
        Some("asha@example.com".into()),
        fixed_now() + Duration::days(5),
    ))
    .await
    .unwrap();

    let stored = repo.get_profile(early).await.unwrap().unwrap();
    assert_eq!(stored.name(), Some("Asha"));
    assert_eq!(stored.email(), Some("asha@example.com"));
    assert_eq!(stored.created_at(), fixed_now());

    let order: Vec<UserId> = repo
        .list_profiles()
        .await
        .unwrap()
        .iter()
        .map(Profile::user_id)
        .collect();
    assert_eq!(order, vec![late, early]);
    assert_eq!(repo.get_profile(UserId::random()).await.unwrap(), None);
}
