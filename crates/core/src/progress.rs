//! Dashboard progress math.
//!
//! Everything here is a pure function of its inputs. Divisions by zero
//! yield `0` instead of an error so the dashboard always has something
//! to draw.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde_json::Value;

use crate::model::{Course, CourseId, Lesson, LessonId, QuizAttempt, QuizId, ScorePercent, UserStats};

/// Subject label for lessons whose course has no subject.
pub const GENERAL_SUBJECT: &str = "General";

/// `round(part / whole * 100)` with halves rounding up; `0` when `whole` is zero.
#[must_use]
pub fn rounded_percent(part: u64, whole: u64) -> u64 {
    if whole == 0 {
        return 0;
    }
    (part.saturating_mul(200) + whole) / whole.saturating_mul(2)
}

/// Share of completed lessons, as a whole percentage.
///
/// ```
/// # use aarambh_core::progress::compute_overall_completion;
/// assert_eq!(compute_overall_completion(0, 0), 0);
/// assert_eq!(compute_overall_completion(5, 10), 50);
/// assert_eq!(compute_overall_completion(10, 10), 100);
/// ```
#[must_use]
pub fn compute_overall_completion(completed: u32, total: u32) -> u8 {
    let percent = rounded_percent(u64::from(completed), u64::from(total)).min(100);
    u8::try_from(percent).unwrap_or(100)
}

/// Rounded arithmetic mean of the given scores; `0` for no scores.
#[must_use]
pub fn compute_subject_average(scores: &[ScorePercent]) -> u8 {
    let sum: u64 = scores.iter().map(|s| u64::from(s.value())).sum();
    let count = u64::try_from(scores.len()).unwrap_or(u64::MAX);
    // The mean of values <= 100 is <= 100.
    u8::try_from(rounded_percent(sum, count.saturating_mul(100))).unwrap_or(100)
}

/// Number of achievements; anything that is not a JSON array counts as none.
#[must_use]
pub fn compute_achievement_count(achievements: Option<&Value>) -> usize {
    match achievements {
        Some(Value::Array(items)) => items.len(),
        _ => 0,
    }
}

//
// ─── SNAPSHOT ─────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectProgress {
    pub subject: String,
    pub completed: u32,
    pub total: u32,
    pub completion_percent: u8,
    pub average_score: u8,
    pub attempts: u32,
}

/// Derived dashboard aggregate. Recomputed on every view, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub total_lessons: u32,
    pub completed_lessons: u32,
    pub completion_percent: u8,
    pub average_score: u8,
    pub quiz_attempts: u32,
    pub current_streak: u32,
    pub total_points: u32,
    pub achievements: usize,
    pub subjects: Vec<SubjectProgress>,
}

/// Raw inputs for [`ProgressSnapshot::build`].
pub struct ProgressInputs<'a> {
    pub courses: &'a [Course],
    pub lessons: &'a [Lesson],
    pub completed: &'a HashSet<LessonId>,
    pub attempts: &'a [QuizAttempt],
    pub quiz_subjects: &'a HashMap<QuizId, String>,
    pub stats: Option<&'a UserStats>,
}

#[derive(Default)]
struct SubjectTally {
    completed: u32,
    total: u32,
    scores: Vec<ScorePercent>,
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

impl ProgressSnapshot {
    /// Builds the snapshot. Subjects are listed alphabetically.
    ///
    /// Lessons take their subject from their course; attempts take theirs
    /// from the quiz they reference. Attempts for unknown quizzes still count
    /// toward the overall average.
    #[must_use]
    pub fn build(inputs: &ProgressInputs<'_>) -> Self {
        let course_subjects: HashMap<CourseId, &str> = inputs
            .courses
            .iter()
            .map(|c| (c.id(), c.subject().unwrap_or(GENERAL_SUBJECT)))
            .collect();

        let mut tallies: BTreeMap<String, SubjectTally> = BTreeMap::new();
        let mut completed_lessons = 0_u32;

        for lesson in inputs.lessons {
            let subject = course_subjects
                .get(&lesson.course_id())
                .copied()
                .unwrap_or(GENERAL_SUBJECT);
            let tally = tallies.entry(subject.to_string()).or_default();
            tally.total = tally.total.saturating_add(1);
            if inputs.completed.contains(&lesson.id()) {
                tally.completed = tally.completed.saturating_add(1);
                completed_lessons = completed_lessons.saturating_add(1);
            }
        }

        for attempt in inputs.attempts {
            if let Some(subject) = inputs.quiz_subjects.get(&attempt.quiz_id) {
                tallies
                    .entry(subject.clone())
                    .or_default()
                    .scores
                    .push(attempt.score);
            }
        }

        let all_scores: Vec<ScorePercent> = inputs.attempts.iter().map(|a| a.score).collect();
        let total_lessons = count(inputs.lessons.len());

        let subjects = tallies
            .into_iter()
            .map(|(subject, tally)| SubjectProgress {
                subject,
                completed: tally.completed,
                total: tally.total,
                completion_percent: compute_overall_completion(tally.completed, tally.total),
                average_score: compute_subject_average(&tally.scores),
                attempts: count(tally.scores.len()),
            })
            .collect();

        let (current_streak, total_points, achievements) = inputs.stats.map_or((0, 0, 0), |s| {
            (
                s.current_streak,
                s.total_points,
                compute_achievement_count(s.achievements.as_ref()),
            )
        });

        Self {
            total_lessons,
            completed_lessons,
            completion_percent: compute_overall_completion(completed_lessons, total_lessons),
            average_score: compute_subject_average(&all_scores),
            quiz_attempts: count(all_scores.len()),
            current_streak,
            total_points,
            achievements,
            subjects,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CourseDraft, LessonDraft, UserId};
    use crate::time::fixed_now;
    use serde_json::json;

    fn scores(values: &[i64]) -> Vec<ScorePercent> {
        values.iter().map(|v| ScorePercent::new(*v).unwrap()).collect()
    }

    #[test]
    fn overall_completion_edges() {
        assert_eq!(compute_overall_completion(0, 0), 0);
        assert_eq!(compute_overall_completion(5, 10), 50);
        assert_eq!(compute_overall_completion(10, 10), 100);
        assert_eq!(compute_overall_completion(32, 45), 71);
        assert_eq!(compute_overall_completion(12, 10), 100);
    }

    #[test]
    fn subject_average_edges() {
        assert_eq!(compute_subject_average(&[]), 0);
        assert_eq!(compute_subject_average(&scores(&[80, 100])), 90);
        assert_eq!(compute_subject_average(&scores(&[85, 92])), 89);
        assert_eq!(compute_subject_average(&scores(&[0, 0, 1])), 0);
    }

    #[test]
    fn achievement_count_normalizes_non_lists() {
        assert_eq!(compute_achievement_count(None), 0);
        assert_eq!(compute_achievement_count(Some(&Value::Null)), 0);
        assert_eq!(compute_achievement_count(Some(&json!({"first": true}))), 0);
        assert_eq!(compute_achievement_count(Some(&json!(["x", "y", "z"]))), 3);
    }

    #[test]
    fn snapshot_groups_by_course_subject() {
        let user = UserId::random();
        let now = fixed_now();
        let math = Course::new(
            CourseId::random(),
            CourseDraft {
                title: "Algebra".into(),
                description: None,
                subject: Some("Math".into()),
            },
            user,
            now,
        )
        .unwrap();
        let misc = Course::new(
            CourseId::random(),
            CourseDraft {
                title: "Study Skills".into(),
                ..CourseDraft::default()
            },
            user,
            now,
        )
        .unwrap();
        let lesson = |course: &Course, n: i64| {
            Lesson::new(
                LessonId::random(),
                LessonDraft {
                    course_id: Some(course.id()),
                    title: format!("Lesson {n}"),
                    content: String::new(),
                    order_number: n,
                },
            )
            .unwrap()
        };
        let lessons = vec![lesson(&math, 1), lesson(&math, 2), lesson(&misc, 1)];
        let completed: HashSet<LessonId> = [lessons[0].id()].into_iter().collect();

        let quiz = QuizId::random();
        let orphan_quiz = QuizId::random();
        let quiz_subjects: HashMap<QuizId, String> = [(quiz, "Math".to_string())].into();
        let attempts = vec![
            QuizAttempt::new(user, quiz, ScorePercent::new(80).unwrap(), now),
            QuizAttempt::new(user, quiz, ScorePercent::new(100).unwrap(), now),
            QuizAttempt::new(user, orphan_quiz, ScorePercent::new(40).unwrap(), now),
        ];
        let stats = UserStats {
            user_id: user,
            current_streak: 7,
            total_points: 3240,
            achievements: Some(json!(["first-quiz", "week-streak"])),
        };

        let snapshot = ProgressSnapshot::build(&ProgressInputs {
            courses: &[math, misc],
            lessons: &lessons,
            completed: &completed,
            attempts: &attempts,
            quiz_subjects: &quiz_subjects,
            stats: Some(&stats),
        });

        assert_eq!(snapshot.total_lessons, 3);
        assert_eq!(snapshot.completed_lessons, 1);
        assert_eq!(snapshot.completion_percent, 33);
        assert_eq!(snapshot.average_score, 73);
        assert_eq!(snapshot.quiz_attempts, 3);
        assert_eq!(snapshot.current_streak, 7);
        assert_eq!(snapshot.total_points, 3240);
        assert_eq!(snapshot.achievements, 2);

        assert_eq!(snapshot.subjects.len(), 2);
        let general = &snapshot.subjects[0];
        assert_eq!(general.subject, GENERAL_SUBJECT);
        assert_eq!((general.completed, general.total), (0, 1));
        assert_eq!(general.average_score, 0);

        let math = &snapshot.subjects[1];
        assert_eq!(math.subject, "Math");
        assert_eq!((math.completed, math.total), (1, 2));
        assert_eq!(math.completion_percent, 50);
        assert_eq!(math.average_score, 90);
        assert_eq!(math.attempts, 2);
    }

    #[test]
    fn empty_snapshot_is_all_zero() {
        let snapshot = ProgressSnapshot::build(&ProgressInputs {
            courses: &[],
            lessons: &[],
            completed: &HashSet::new(),
            attempts: &[],
            quiz_subjects: &HashMap::new(),
            stats: None,
        });
        assert_eq!(snapshot.completion_percent, 0);
        assert_eq!(snapshot.average_score, 0);
        assert!(snapshot.subjects.is_empty());
    }
}
