use aarambh_core::model::{AnswerOption, QuizSet, UserSession};
use services::{AttemptPersistence, QuizServiceError, QuizSession, QuizSessionError, QuizStep, QuizWorkflow};

use crate::views::ViewError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizSetCardVm {
    pub subject: String,
    pub questions_label: String,
}

#[must_use]
pub fn map_quiz_set_cards(sets: &[QuizSet]) -> Vec<QuizSetCardVm> {
    sets.iter()
        .map(|set| QuizSetCardVm {
            subject: set.subject().to_string(),
            questions_label: match set.len() {
                1 => "1 question".to_string(),
                n => format!("{n} questions"),
            },
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionVm {
    pub option: AnswerOption,
    pub letter: char,
    pub text: String,
    pub selected: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionVm {
    pub position_label: String,
    pub question: String,
    pub options: Vec<OptionVm>,
    pub can_advance: bool,
    pub advance_label: &'static str,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultVm {
    pub score_label: String,
    pub detail: String,
    pub saved_label: String,
    pub can_retry_save: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QuizPhase {
    Question(QuestionVm),
    Results(ResultVm),
}

/// Wraps one [`QuizSession`] for a view: renders it and forwards user intents.
#[derive(Clone, Debug)]
pub struct QuizVm {
    session: QuizSession,
}

impl PartialEq for QuizVm {
    fn eq(&self, other: &Self) -> bool {
        self.phase() == other.phase()
    }
}

impl QuizVm {
    #[must_use]
    pub fn new(session: QuizSession) -> Self {
        Self { session }
    }

    #[must_use]
    pub fn subject(&self) -> &str {
        self.session.subject()
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        match self.session.current_question() {
            Some(question) => {
                let progress = self.session.progress();
                let selected = self.session.selected();
                QuizPhase::Question(QuestionVm {
                    position_label: format!(
                        "Question {} of {}",
                        progress.position, progress.total
                    ),
                    question: question.question().to_string(),
                    options: AnswerOption::ALL
                        .iter()
                        .map(|&option| OptionVm {
                            option,
                            letter: option.letter(),
                            text: question.option_text(option).to_string(),
                            selected: selected == Some(option),
                        })
                        .collect(),
                    can_advance: selected.is_some(),
                    advance_label: if progress.position == progress.total {
                        "Finish"
                    } else {
                        "Next"
                    },
                })
            }
            None => QuizPhase::Results(self.result_vm()),
        }
    }

    fn result_vm(&self) -> ResultVm {
        let (score_label, detail) = self.session.result().map_or_else(
            || (String::from("0%"), String::new()),
            |r| (r.score.to_string(), format!("{} of {} correct", r.correct, r.total)),
        );
        let (saved_label, can_retry_save) = match self.session.persistence() {
            Some(AttemptPersistence::Saved { .. }) => ("Attempt saved".to_string(), false),
            Some(AttemptPersistence::InProgress) => ("Saving...".to_string(), false),
            Some(AttemptPersistence::Failed { reason }) => {
                (format!("Could not save this attempt: {reason}"), true)
            }
            None => ("Not saved yet".to_string(), true),
        };
        ResultVm {
            score_label,
            detail,
            saved_label,
            can_retry_save,
        }
    }

    /// Identifies the run this view-model belongs to.
    #[must_use]
    pub fn run_id(&self) -> u64 {
        self.session.run_id()
    }

    /// # Errors
    ///
    /// Returns `ViewError::Invalid` once the quiz is finished.
    pub fn select(&mut self, option: AnswerOption) -> Result<(), ViewError> {
        self.session
            .select_answer(option)
            .map_err(|err| quiz_error(err.into()))
    }

    /// Returns `true` when that was the last question.
    ///
    /// # Errors
    ///
    /// Returns `ViewError::Invalid` without a selection or after the end.
    pub async fn advance(
        &mut self,
        workflow: &QuizWorkflow,
        user: &UserSession,
    ) -> Result<bool, ViewError> {
        let step = workflow
            .advance(&mut self.session, user)
            .await
            .map_err(quiz_error)?;
        Ok(matches!(step, QuizStep::Finished { .. }))
    }

    /// # Errors
    ///
    /// Returns `ViewError::Invalid` if the quiz has not finished.
    pub async fn retry_save(
        &mut self,
        workflow: &QuizWorkflow,
        user: &UserSession,
    ) -> Result<AttemptPersistence, ViewError> {
        workflow
            .retry_persistence(&mut self.session, user)
            .await
            .map_err(quiz_error)
    }

    pub fn retake(&mut self) {
        self.session.retake();
    }
}

fn quiz_error(err: QuizServiceError) -> ViewError {
    match err {
        QuizServiceError::Session(QuizSessionError::Empty) => ViewError::EmptyQuiz,
        QuizServiceError::Session(QuizSessionError::Score(score)) => ViewError::failed(score),
        QuizServiceError::Session(state) => ViewError::Invalid(state.to_string()),
        other => ViewError::failed(other),
    }
}

/// # Errors
///
/// Returns `ViewError::EmptyQuiz` when the subject has no approved questions
/// and `ViewError::Failed` with the cause for other failures.
pub async fn start_quiz(workflow: &QuizWorkflow, subject: &str) -> Result<QuizVm, ViewError> {
    workflow
        .start_quiz(subject)
        .await
        .map(QuizVm::new)
        .map_err(quiz_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aarambh_core::model::{QuizDraft, QuizId, QuizQuestion};

    fn question(text: &str, correct: AnswerOption) -> QuizQuestion {
        QuizQuestion::from_persisted(
            QuizId::random(),
            QuizDraft {
                subject: "Science".into(),
                question: text.into(),
                options: ["w".into(), "x".into(), "y".into(), "z".into()],
                correct: Some(correct),
            },
            true,
            None,
        )
        .unwrap()
    }

    fn questions() -> Vec<QuizQuestion> {
        vec![
            question("First?", AnswerOption::A),
            question("Second?", AnswerOption::B),
        ]
    }

    fn vm_over(questions: Vec<QuizQuestion>) -> QuizVm {
        let set = QuizSet::new("Science", questions).unwrap();
        QuizVm::new(QuizSession::start(set).unwrap())
    }

    fn vm() -> QuizVm {
        vm_over(questions())
    }

    #[test]
    fn question_phase_tracks_selection() {
        let mut vm = vm();
        let QuizPhase::Question(q) = vm.phase() else {
            panic!("expected question phase");
        };
        assert_eq!(q.position_label, "Question 1 of 2");
        assert!(!q.can_advance);
        assert_eq!(q.advance_label, "Next");
        assert_eq!(q.options.len(), 4);

        vm.select(AnswerOption::C).unwrap();
        let QuizPhase::Question(q) = vm.phase() else {
            panic!("expected question phase");
        };
        assert!(q.can_advance);
        assert!(q.options[2].selected);
        assert!(!q.options[0].selected);
    }

    #[tokio::test]
    async fn finishing_scores_and_saves() {
        use aarambh_core::Clock;
        use aarambh_core::model::{Role, UserId};
        use aarambh_core::time::fixed_now;
        use std::sync::Arc;
        use storage::repository::{InMemoryRepository, QuizRepository};

        let repo = InMemoryRepository::new();
        let questions = questions();
        for q in &questions {
            repo.upsert_quiz(q).await.unwrap();
        }
        let workflow = QuizWorkflow::new(
            Clock::fixed(fixed_now()),
            Arc::new(repo.clone()),
            Arc::new(repo),
        );
        let user = UserSession::local(UserId::random(), Role::Student);
        let mut vm = vm_over(questions);

        vm.select(AnswerOption::A).unwrap();
        assert!(!vm.advance(&workflow, &user).await.unwrap());
        let QuizPhase::Question(q) = vm.phase() else {
            panic!("expected question phase");
        };
        assert_eq!(q.advance_label, "Finish");

        vm.select(AnswerOption::C).unwrap();
        assert!(vm.advance(&workflow, &user).await.unwrap());
        let QuizPhase::Results(result) = vm.phase() else {
            panic!("expected results");
        };
        assert_eq!(result.score_label, "50%");
        assert_eq!(result.detail, "1 of 2 correct");
        assert_eq!(result.saved_label, "Attempt saved");
        assert!(!result.can_retry_save);

        vm.retake();
        assert!(matches!(vm.phase(), QuizPhase::Question(_)));
    }

    #[tokio::test]
    async fn errors_say_what_went_wrong() {
        use aarambh_core::Clock;
        use aarambh_core::model::{Role, UserId};
        use aarambh_core::time::fixed_now;
        use std::sync::Arc;
        use storage::repository::InMemoryRepository;

        let repo = InMemoryRepository::new();
        let workflow = QuizWorkflow::new(
            Clock::fixed(fixed_now()),
            Arc::new(repo.clone()),
            Arc::new(repo),
        );
        let user = UserSession::local(UserId::random(), Role::Student);
        let mut vm = vm();

        let err = vm.advance(&workflow, &user).await.unwrap_err();
        assert_eq!(err, ViewError::Invalid("select an answer before continuing".into()));
        assert_eq!(err.message(), "Select an answer before continuing");

        // The questions were never stored, so the save fails with a storage reason.
        vm.select(AnswerOption::A).unwrap();
        vm.advance(&workflow, &user).await.unwrap();
        vm.select(AnswerOption::A).unwrap();
        assert!(vm.advance(&workflow, &user).await.unwrap());
        let QuizPhase::Results(result) = vm.phase() else {
            panic!("expected results");
        };
        assert!(result.can_retry_save);
        assert!(result.saved_label.starts_with("Could not save this attempt: "));

        assert!(matches!(vm.select(AnswerOption::B), Err(ViewError::Invalid(_))));
        assert_eq!(
            start_quiz(&workflow, "History").await.unwrap_err(),
            ViewError::EmptyQuiz
        );
    }

    #[test]
    fn set_cards_pluralize() {
        let set = QuizSet::new("Science", vec![question("Only?", AnswerOption::A)]).unwrap();
        let cards = map_quiz_set_cards(&[set]);
        assert_eq!(cards[0].questions_label, "1 question");
    }
}
