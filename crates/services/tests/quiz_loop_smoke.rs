use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use aarambh_core::model::{
    AnswerOption, AttemptRecording, QuizAttempt, QuizDraft, Role, UserId, UserSession,
};
use aarambh_core::time::fixed_now;
use async_trait::async_trait;
use services::{AppServices, AttemptPersistence, Clock, QuizStep, QuizWorkflow, ServiceOptions};
use storage::repository::{AttemptRepository, InMemoryRepository, Storage, StorageError};

fn draft(subject: &str, question: &str, correct: AnswerOption) -> QuizDraft {
    QuizDraft {
        subject: subject.into(),
        question: question.into(),
        options: ["A1".into(), "B1".into(), "C1".into(), "D1".into()],
        correct: Some(correct),
    }
}

async fn seed_quizzes(services: &AppServices, admin: &UserSession) {
    let admin_svc = services.admin();
    for (question, correct) in [("2 + 2?", AnswerOption::A), ("3 x 3?", AnswerOption::B)] {
        admin_svc
            .create_quiz(admin, draft("Mathematics", question, correct))
            .await
            .unwrap();
    }
    admin_svc
        .create_quiz(admin, draft("Science", "H2O?", AnswerOption::C))
        .await
        .unwrap();
}

#[tokio::test]
async fn quiz_loop_persists_one_row_per_question() {
    let storage = Storage::sqlite("sqlite:file:memdb_quiz_loop?mode=memory&cache=shared")
        .await
        .expect("connect sqlite");
    let services = AppServices::new(
        Clock::fixed(fixed_now()),
        &storage,
        Arc::new(storage::local::MemoryStore::new()),
        None,
        ServiceOptions::default(),
    );
    let admin = UserSession::local(UserId::random(), Role::Admin);
    seed_quizzes(&services, &admin).await;

    let workflow = services.quizzes();
    let sets = workflow.list_sets().await.unwrap();
    assert_eq!(
        sets.iter().map(|s| s.subject()).collect::<Vec<_>>(),
        vec!["Mathematics", "Science"]
    );

    let student = services.sessions().local(UserId::random()).await.unwrap();
    let mut quiz = workflow.start_quiz("Mathematics").await.unwrap();
    let mut finished = None;
    for answer in [AnswerOption::A, AnswerOption::C] {
        quiz.select_answer(answer).unwrap();
        if let QuizStep::Finished { result, persistence } =
            workflow.advance(&mut quiz, &student).await.unwrap()
        {
            finished = Some((result, persistence));
        }
    }

    let (result, persistence) = finished.expect("quiz finished");
    assert_eq!(result.score.value(), 50);
    assert_eq!(persistence, AttemptPersistence::Saved { rows: 2 });

    let rows = storage.attempts.list_attempts(student.user_id()).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.score.value() == 50));

    let snapshot = services.progress().snapshot(&student).await.unwrap();
    assert_eq!(snapshot.quiz_attempts, 2);
    assert_eq!(snapshot.average_score, 50);
    let maths = snapshot
        .subjects
        .iter()
        .find(|s| s.subject == "Mathematics")
        .unwrap();
    assert_eq!(maths.average_score, 50);
}

/// Attempt store that can be switched between failing and delegating.
struct FlakyAttempts {
    inner: InMemoryRepository,
    failing: AtomicBool,
}

#[async_trait]
impl AttemptRepository for FlakyAttempts {
    async fn append_attempts(&self, attempts: &[QuizAttempt]) -> Result<usize, StorageError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::Connection("backend unreachable".into()));
        }
        self.inner.append_attempts(attempts).await
    }

    async fn list_attempts(&self, user_id: UserId) -> Result<Vec<QuizAttempt>, StorageError> {
        self.inner.list_attempts(user_id).await
    }
}

#[tokio::test]
async fn failed_persistence_is_reported_and_retryable() {
    let repo = InMemoryRepository::new();
    let storage = Storage::from_backend(repo.clone());
    let services = AppServices::new(
        Clock::fixed(fixed_now()),
        &storage,
        Arc::new(storage::local::MemoryStore::new()),
        None,
        ServiceOptions::default(),
    );
    let admin = UserSession::local(UserId::random(), Role::Admin);
    seed_quizzes(&services, &admin).await;

    let attempts = Arc::new(FlakyAttempts {
        inner: repo.clone(),
        failing: AtomicBool::new(true),
    });
    let workflow = QuizWorkflow::new(
        Clock::fixed(fixed_now()),
        Arc::clone(&storage.quizzes),
        attempts.clone(),
    )
    .with_recording(AttemptRecording::PerSession);

    let student = UserSession::local(UserId::random(), Role::Student);
    let mut quiz = workflow.start_quiz("Science").await.unwrap();
    quiz.select_answer(AnswerOption::C).unwrap();
    let step = workflow.advance(&mut quiz, &student).await.unwrap();

    let QuizStep::Finished { result, persistence } = step else {
        panic!("single question quiz should finish");
    };
    assert_eq!(result.score.value(), 100);
    assert!(matches!(persistence, AttemptPersistence::Failed { .. }));
    assert!(quiz.is_finished());
    assert!(repo.list_attempts(student.user_id()).await.unwrap().is_empty());

    attempts.failing.store(false, Ordering::SeqCst);
    let retried = workflow.retry_persistence(&mut quiz, &student).await.unwrap();
    assert_eq!(retried, AttemptPersistence::Saved { rows: 1 });

    // A second retry does not write duplicates.
    let again = workflow.retry_persistence(&mut quiz, &student).await.unwrap();
    assert_eq!(again, AttemptPersistence::Saved { rows: 1 });
    assert_eq!(repo.list_attempts(student.user_id()).await.unwrap().len(), 1);
}
