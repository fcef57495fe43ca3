use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::{QuizId, UserId};

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("answer option must be one of A, B, C, D (got {0:?})")]
    InvalidOption(String),

    #[error("{field} must not be empty")]
    MissingField { field: &'static str },

    #[error("a quiz set needs at least one question")]
    EmptySet,

    #[error("question belongs to subject {found:?}, expected {expected:?}")]
    SubjectMismatch { expected: String, found: String },
}

//
// ─── ANSWER OPTION ────────────────────────────────────────────────────────────
//

/// One of the four lettered choices of a multiple-choice question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnswerOption {
    A,
    B,
    C,
    D,
}

impl AnswerOption {
    pub const ALL: [AnswerOption; 4] = [Self::A, Self::B, Self::C, Self::D];

    #[must_use]
    pub fn letter(self) -> char {
        match self {
            Self::A => 'A',
            Self::B => 'B',
            Self::C => 'C',
            Self::D => 'D',
        }
    }

    /// Position of this option inside a question's option array.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
            Self::C => 2,
            Self::D => 3,
        }
    }

    /// Parses a single letter, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidOption` for anything but A-D.
    pub fn from_letter(value: &str) -> Result<Self, QuizError> {
        match value.trim() {
            "A" | "a" => Ok(Self::A),
            "B" | "b" => Ok(Self::B),
            "C" | "c" => Ok(Self::C),
            "D" | "d" => Ok(Self::D),
            other => Err(QuizError::InvalidOption(other.to_string())),
        }
    }
}

impl fmt::Display for AnswerOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

impl FromStr for AnswerOption {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_letter(s)
    }
}

//
// ─── QUESTION ─────────────────────────────────────────────────────────────────
//

/// Unvalidated input for creating or editing a quiz question.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuizDraft {
    pub subject: String,
    pub question: String,
    pub options: [String; 4],
    pub correct: Option<AnswerOption>,
}

/// A validated multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizQuestion {
    id: QuizId,
    subject: String,
    question: String,
    options: [String; 4],
    correct: AnswerOption,
    approved: bool,
    created_by: Option<UserId>,
}

fn required(field: &'static str, value: &str) -> Result<String, QuizError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(QuizError::MissingField { field });
    }
    Ok(trimmed.to_string())
}

impl QuizQuestion {
    /// Validates a draft into a question. New questions start unapproved.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::MissingField` when the subject, the question text,
    /// any option, or the correct letter is missing.
    pub fn from_draft(
        id: QuizId,
        draft: QuizDraft,
        created_by: Option<UserId>,
    ) -> Result<Self, QuizError> {
        let subject = required("subject", &draft.subject)?;
        let question = required("question", &draft.question)?;
        let [a, b, c, d] = draft.options;
        let options = [
            required("option A", &a)?,
            required("option B", &b)?,
            required("option C", &c)?,
            required("option D", &d)?,
        ];
        let correct = draft.correct.ok_or(QuizError::MissingField {
            field: "correct answer",
        })?;

        Ok(Self {
            id,
            subject,
            question,
            options,
            correct,
            approved: false,
            created_by,
        })
    }

    /// Rehydrate a question from persisted storage.
    ///
    /// # Errors
    ///
    /// Same validation as [`QuizQuestion::from_draft`].
    pub fn from_persisted(
        id: QuizId,
        draft: QuizDraft,
        approved: bool,
        created_by: Option<UserId>,
    ) -> Result<Self, QuizError> {
        let mut question = Self::from_draft(id, draft, created_by)?;
        question.approved = approved;
        Ok(question)
    }

    #[must_use]
    pub fn id(&self) -> QuizId {
        self.id
    }

    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    #[must_use]
    pub fn question(&self) -> &str {
        &self.question
    }

    #[must_use]
    pub fn options(&self) -> &[String; 4] {
        &self.options
    }

    #[must_use]
    pub fn option_text(&self, option: AnswerOption) -> &str {
        &self.options[option.index()]
    }

    #[must_use]
    pub fn correct(&self) -> AnswerOption {
        self.correct
    }

    #[must_use]
    pub fn is_correct(&self, answer: AnswerOption) -> bool {
        self.correct == answer
    }

    #[must_use]
    pub fn approved(&self) -> bool {
        self.approved
    }

    pub fn set_approved(&mut self, approved: bool) {
        self.approved = approved;
    }

    #[must_use]
    pub fn created_by(&self) -> Option<UserId> {
        self.created_by
    }

    /// Returns the draft form of this question, e.g. to prefill an edit form.
    #[must_use]
    pub fn to_draft(&self) -> QuizDraft {
        QuizDraft {
            subject: self.subject.clone(),
            question: self.question.clone(),
            options: self.options.clone(),
            correct: Some(self.correct),
        }
    }
}

//
// ─── QUIZ SET ─────────────────────────────────────────────────────────────────
//

/// The ordered, non-empty group of questions that share a subject.
///
/// Order is retrieval order; nothing guarantees it is stable across reloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSet {
    subject: String,
    questions: Vec<QuizQuestion>,
}

impl QuizSet {
    /// # Errors
    ///
    /// Returns `QuizError::EmptySet` for an empty list and
    /// `QuizError::SubjectMismatch` if a question has a different subject.
    pub fn new(subject: impl Into<String>, questions: Vec<QuizQuestion>) -> Result<Self, QuizError> {
        let subject = subject.into();
        if questions.is_empty() {
            return Err(QuizError::EmptySet);
        }
        if let Some(stray) = questions.iter().find(|q| q.subject() != subject) {
            return Err(QuizError::SubjectMismatch {
                expected: subject,
                found: stray.subject().to_string(),
            });
        }
        Ok(Self { subject, questions })
    }

    /// Groups questions by subject, keeping both the first-seen subject order
    /// and the retrieval order inside each subject.
    #[must_use]
    pub fn group_by_subject(questions: Vec<QuizQuestion>) -> Vec<QuizSet> {
        let mut sets: Vec<QuizSet> = Vec::new();
        for question in questions {
            match sets.iter_mut().find(|set| set.subject == question.subject()) {
                Some(set) => set.questions.push(question),
                None => sets.push(QuizSet {
                    subject: question.subject().to_string(),
                    questions: vec![question],
                }),
            }
        }
        sets
    }

    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    #[must_use]
    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Always false; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&QuizQuestion> {
        self.questions.get(index)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(subject: &str, correct: AnswerOption) -> QuizDraft {
        QuizDraft {
            subject: subject.to_string(),
            question: "What is 2 + 2?".to_string(),
            options: ["3".into(), "4".into(), "5".into(), "22".into()],
            correct: Some(correct),
        }
    }

    #[test]
    fn option_letters_parse_case_insensitively() {
        assert_eq!(AnswerOption::from_letter("a").unwrap(), AnswerOption::A);
        assert_eq!("D".parse::<AnswerOption>().unwrap(), AnswerOption::D);
        assert!(matches!(
            AnswerOption::from_letter("E"),
            Err(QuizError::InvalidOption(value)) if value == "E"
        ));
    }

    #[test]
    fn draft_requires_every_field() {
        let mut missing_option = draft("Math", AnswerOption::B);
        missing_option.options[2] = "  ".into();
        let err = QuizQuestion::from_draft(QuizId::random(), missing_option, None).unwrap_err();
        assert_eq!(err, QuizError::MissingField { field: "option C" });

        let mut missing_correct = draft("Math", AnswerOption::B);
        missing_correct.correct = None;
        let err = QuizQuestion::from_draft(QuizId::random(), missing_correct, None).unwrap_err();
        assert_eq!(
            err,
            QuizError::MissingField {
                field: "correct answer"
            }
        );
    }

    #[test]
    fn new_questions_start_unapproved() {
        let q = QuizQuestion::from_draft(QuizId::random(), draft("Math", AnswerOption::B), None)
            .unwrap();
        assert!(!q.approved());
        assert!(q.is_correct(AnswerOption::B));
        assert_eq!(q.option_text(AnswerOption::B), "4");
    }

    #[test]
    fn grouping_keeps_retrieval_order() {
        let make = |subject: &str| {
            QuizQuestion::from_draft(QuizId::random(), draft(subject, AnswerOption::A), None)
                .unwrap()
        };
        let questions = vec![make("Math"), make("Science"), make("Math")];
        let first_math = questions[0].id();
        let second_math = questions[2].id();

        let sets = QuizSet::group_by_subject(questions);

        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0].subject(), "Math");
        assert_eq!(sets[0].len(), 2);
        assert_eq!(sets[0].questions()[0].id(), first_math);
        assert_eq!(sets[0].questions()[1].id(), second_math);
        assert_eq!(sets[1].subject(), "Science");
    }

    #[test]
    fn empty_or_mixed_sets_are_rejected() {
        assert_eq!(QuizSet::new("Math", Vec::new()), Err(QuizError::EmptySet));

        let science =
            QuizQuestion::from_draft(QuizId::random(), draft("Science", AnswerOption::A), None)
                .unwrap();
        assert!(matches!(
            QuizSet::new("Math", vec![science]),
            Err(QuizError::SubjectMismatch { .. })
        ));
    }
}
