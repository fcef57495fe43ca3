use aarambh_core::model::{QuizAttempt, QuizId, QuizQuestion, UserId};

use super::SqliteRepository;
use super::mapping::{db_err, expect_affected, map_attempt_row, map_quiz_row};
use crate::repository::{AttemptRepository, QuizRepository, StorageError};

const QUIZ_COLUMNS: &str = "id, subject, question, option_a, option_b, option_c, option_d, \
                            correct_answer, approved, created_by";

#[async_trait::async_trait]
impl QuizRepository for SqliteRepository {
    async fn upsert_quiz(&self, quiz: &QuizQuestion) -> Result<(), StorageError> {
        let [a, b, c, d] = quiz.options().clone();
        sqlx::query(
            r"
            INSERT INTO quizzes (
                id, subject, question, option_a, option_b, option_c, option_d,
                correct_answer, approved, created_by
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(id) DO UPDATE SET
                subject = excluded.subject,
                question = excluded.question,
                option_a = excluded.option_a,
                option_b = excluded.option_b,
                option_c = excluded.option_c,
                option_d = excluded.option_d,
                correct_answer = excluded.correct_answer,
                approved = excluded.approved
            ",
        )
        .bind(quiz.id().value())
        .bind(quiz.subject().to_owned())
        .bind(quiz.question().to_owned())
        .bind(a)
        .bind(b)
        .bind(c)
        .bind(d)
        .bind(quiz.correct().letter().to_string())
        .bind(i64::from(quiz.approved()))
        .bind(quiz.created_by().map(|u| u.value()))
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn get_quiz(&self, id: QuizId) -> Result<Option<QuizQuestion>, StorageError> {
        let row = sqlx::query(&format!("SELECT {QUIZ_COLUMNS} FROM quizzes WHERE id = ?1"))
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.as_ref().map(map_quiz_row).transpose()
    }

    async fn list_quizzes(&self, approved_only: bool) -> Result<Vec<QuizQuestion>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {QUIZ_COLUMNS} FROM quizzes WHERE (?1 = 0 OR approved = 1) ORDER BY seq ASC"
        ))
        .bind(i64::from(approved_only))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(map_quiz_row).collect()
    }

    async fn set_quiz_approved(&self, id: QuizId, approved: bool) -> Result<(), StorageError> {
        let res = sqlx::query("UPDATE quizzes SET approved = ?2 WHERE id = ?1")
            .bind(id.value())
            .bind(i64::from(approved))
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        expect_affected(res.rows_affected())
    }

    async fn delete_quiz(&self, id: QuizId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM quizzes WHERE id = ?1")
            .bind(id.value())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        expect_affected(res.rows_affected())
    }
}

#[async_trait::async_trait]
impl AttemptRepository for SqliteRepository {
    async fn append_attempts(&self, attempts: &[QuizAttempt]) -> Result<usize, StorageError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        for attempt in attempts {
            sqlx::query(
                r"
                INSERT INTO quiz_attempts (user_id, quiz_id, score, attempted_at)
                VALUES (?1, ?2, ?3, ?4)
                ",
            )
            .bind(attempt.user_id.value())
            .bind(attempt.quiz_id.value())
            .bind(i64::from(attempt.score))
            .bind(attempt.attempted_at)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }

        tx.commit().await.map_err(db_err)?;
        Ok(attempts.len())
    }

    async fn list_attempts(&self, user_id: UserId) -> Result<Vec<QuizAttempt>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT user_id, quiz_id, score, attempted_at
            FROM quiz_attempts
            WHERE user_id = ?1
            ORDER BY attempted_at ASC, id ASC
            ",
        )
        .bind(user_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(map_attempt_row).collect()
    }
}
