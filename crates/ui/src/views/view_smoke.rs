use aarambh_core::model::{
    AnswerOption, Course, CourseDraft, CourseId, Lesson, LessonDraft, LessonId, NoteDraft,
    QuizDraft, QuizId, QuizQuestion, ResourceId, ResourceKind, Role, StudyResource, UserId,
};
use aarambh_core::time::fixed_now;
use storage::repository::{CourseRepository, LessonRepository, QuizRepository, ResourceRepository};

use super::test_harness::{ViewHarness, ViewKind, setup_view_harness};

async fn seed_course(harness: &ViewHarness, title: &str, lessons: u32) -> (CourseId, Vec<LessonId>) {
    let course = Course::new(
        CourseId::random(),
        CourseDraft {
            title: title.into(),
            description: Some("Numbers and shapes".into()),
            subject: Some("Mathematics".into()),
        },
        UserId::random(),
        fixed_now(),
    )
    .unwrap();
    harness.storage.courses.upsert_course(&course).await.unwrap();

    let mut ids = Vec::new();
    for n in 1..=lessons {
        let lesson = Lesson::new(
            LessonId::random(),
            LessonDraft {
                course_id: Some(course.id()),
                title: format!("Lesson title {n}"),
                content: "**Read** this first.".into(),
                order_number: i64::from(n),
            },
        )
        .unwrap();
        harness.storage.lessons.upsert_lesson(&lesson).await.unwrap();
        ids.push(lesson.id());
    }
    (course.id(), ids)
}

async fn seed_quiz(harness: &ViewHarness, question: &str, approved: bool) {
    let quiz = QuizQuestion::from_persisted(
        QuizId::random(),
        QuizDraft {
            subject: "Mathematics".into(),
            question: question.into(),
            options: ["1".into(), "2".into(), "3".into(), "4".into()],
            correct: Some(AnswerOption::B),
        },
        approved,
        None,
    )
    .unwrap();
    harness.storage.quizzes.upsert_quiz(&quiz).await.unwrap();
}

#[tokio::test(flavor = "current_thread")]
async fn home_view_asks_for_sign_in_without_session() {
    let mut harness = setup_view_harness(ViewKind::Home);
    let html = harness.render_settled().await;
    assert!(html.contains("Please sign in to continue."), "{html}");
    assert!(html.contains("Go to account"), "{html}");
}

#[tokio::test(flavor = "current_thread")]
async fn home_view_smoke_renders_counts() {
    let mut harness = setup_view_harness(ViewKind::Home);
    harness.sign_in_as(Role::Student).await;
    seed_course(&harness, "Mathematics 101", 2).await;
    seed_quiz(&harness, "What is 1 + 1?", true).await;

    let html = harness.render_settled().await;
    assert!(html.contains("Signed in as student"), "{html}");
    assert!(html.contains("Courses available"), "{html}");
    assert!(html.contains("Quiz subjects"), "{html}");
}

#[tokio::test(flavor = "current_thread")]
async fn courses_view_shows_enroll_state() {
    let mut harness = setup_view_harness(ViewKind::Courses);
    let user = harness.sign_in_as(Role::Student).await;
    let (enrolled, _) = seed_course(&harness, "Algebra", 1).await;
    seed_course(&harness, "Geometry", 1).await;
    harness.services.courses().enroll(&user, enrolled).await.unwrap();

    let html = harness.render_settled().await;
    assert!(html.contains("Algebra"), "{html}");
    assert!(html.contains("Geometry"), "{html}");
    assert!(html.contains("Enrolled · 0%"), "{html}");
    assert_eq!(html.matches(">Enroll<").count(), 1, "{html}");
}

#[tokio::test(flavor = "current_thread")]
async fn course_detail_counts_completed_lessons() {
    let mut harness = setup_view_harness(ViewKind::Home);
    harness.sign_in_as(Role::Student).await;
    let (course_id, lessons) = seed_course(&harness, "Fractions", 2).await;
    harness.services.completion().toggle(lessons[0]).unwrap();

    harness.show(ViewKind::CourseDetail(course_id));

    let html = harness.render_settled().await;
    assert!(html.contains("Fractions"), "{html}");
    assert!(html.contains("1 of 2 lessons completed"), "{html}");
    assert!(html.contains("Mark incomplete"), "{html}");
    assert!(html.contains("Mark complete"), "{html}");
}

#[tokio::test(flavor = "current_thread")]
async fn quizzes_view_lists_only_approved_sets() {
    let mut harness = setup_view_harness(ViewKind::Quizzes);
    harness.sign_in_as(Role::Student).await;
    seed_quiz(&harness, "What is 1 + 1?", true).await;
    seed_quiz(&harness, "What is 2 + 2?", true).await;
    seed_quiz(&harness, "Unreviewed?", false).await;

    let html = harness.render_settled().await;
    assert!(html.contains("Mathematics"), "{html}");
    assert!(html.contains("2 questions"), "{html}");
    assert!(html.contains("Start Quiz"), "{html}");
}

#[tokio::test(flavor = "current_thread")]
async fn progress_view_renders_snapshot() {
    let mut harness = setup_view_harness(ViewKind::Progress);
    harness.sign_in_as(Role::Student).await;
    let (_, lessons) = seed_course(&harness, "Mathematics 101", 2).await;
    harness.services.completion().toggle(lessons[1]).unwrap();

    let html = harness.render_settled().await;
    assert!(html.contains("Overall completion"), "{html}");
    assert!(html.contains("50%"), "{html}");
    assert!(html.contains("1 / 2 lessons"), "{html}");
    assert!(html.contains("No quizzes yet"), "{html}");
}

#[tokio::test(flavor = "current_thread")]
async fn notes_view_lists_own_notes() {
    let mut harness = setup_view_harness(ViewKind::Notes);
    let user = harness.sign_in_as(Role::Student).await;
    harness
        .services
        .notes()
        .create(
            &user,
            NoteDraft {
                title: "Photosynthesis".into(),
                content: "Plants turn light into sugar.".into(),
                subject: "Science".into(),
                file_url: None,
            },
        )
        .await
        .unwrap();

    let html = harness.render_settled().await;
    assert!(html.contains("Photosynthesis"), "{html}");
    assert!(html.contains("Pending review"), "{html}");
    assert!(html.contains("Show archived"), "{html}");
}

#[tokio::test(flavor = "current_thread")]
async fn resources_view_hides_unapproved() {
    let mut harness = setup_view_harness(ViewKind::Resources);
    harness.sign_in_as(Role::Student).await;
    for (title, approved) in [("Khan Academy Algebra", true), ("Secret draft", false)] {
        let r = StudyResource::new(
            ResourceId::random(),
            title,
            "Mathematics",
            ResourceKind::Video,
            "https://example.com/",
            approved,
            fixed_now(),
        )
        .unwrap();
        harness.storage.resources.upsert_resource(&r).await.unwrap();
    }

    let html = harness.render_settled().await;
    assert!(html.contains("Khan Academy Algebra"), "{html}");
    assert!(!html.contains("Secret draft"), "{html}");
    assert!(html.contains(">All<"), "{html}");
}

#[tokio::test(flavor = "current_thread")]
async fn admin_view_is_refused_for_students() {
    let mut harness = setup_view_harness(ViewKind::Admin);
    harness.sign_in_as(Role::Student).await;
    let html = harness.render_settled().await;
    assert!(html.contains("Only admins can open this page."), "{html}");
}

#[tokio::test(flavor = "current_thread")]
async fn admin_view_shows_pending_items() {
    let mut harness = setup_view_harness(ViewKind::Admin);
    let student = harness.sign_in_as(Role::Student).await;
    harness
        .services
        .notes()
        .create(
            &student,
            NoteDraft {
                title: "Cell walls".into(),
                content: "Plants have them.".into(),
                subject: "Science".into(),
                file_url: None,
            },
        )
        .await
        .unwrap();
    harness.sign_in_as(Role::Admin).await;
    seed_quiz(&harness, "Needs a look?", false).await;

    let html = harness.render_settled().await;
    assert!(html.contains("Pending review"), "{html}");
    assert!(html.contains("Needs a look?"), "{html}");
    assert!(html.contains("Cell walls"), "{html}");
    assert!(html.contains("Approve"), "{html}");
    assert!(html.contains(">Edit<"), "{html}");
    assert!(html.contains("New subject"), "{html}");
}

#[tokio::test(flavor = "current_thread")]
async fn admin_view_lists_users_with_roles() {
    let mut harness = setup_view_harness(ViewKind::Admin);
    let student = harness.sign_in_as(Role::Student).await;
    harness.sign_in_as(Role::Admin).await;
    let short_id: String = student.user_id().to_string().chars().take(8).collect();

    let html = harness.render_settled().await;
    assert!(html.contains(">Users<"), "{html}");
    assert!(html.contains(&format!("user {short_id}")), "{html}");
    assert!(html.contains("Choose a user"), "{html}");
    assert!(html.contains(&format!("value=\"{}\"", student.user_id())), "{html}");
}

#[tokio::test(flavor = "current_thread")]
async fn account_view_shows_local_session() {
    let mut harness = setup_view_harness(ViewKind::Account);
    let user = harness.sign_in_as(Role::Instructor).await;
    let (course, _) = seed_course(&harness, "Trigonometry", 1).await;
    harness.services.courses().enroll(&user, course).await.unwrap();
    let short_id: String = user.user_id().to_string().chars().take(8).collect();

    let html = harness.render_settled().await;
    assert!(html.contains("offline profile"), "{html}");
    assert!(html.contains("instructor"), "{html}");
    assert!(html.contains("never"), "{html}");
    assert!(html.contains(&format!("user {short_id}")), "{html}");
    assert!(html.contains("My courses"), "{html}");
    assert!(html.contains("Trigonometry"), "{html}");
    assert!(html.contains("0% · In progress"), "{html}");
}
