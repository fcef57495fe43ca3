use std::collections::{HashMap, HashSet};

use aarambh_core::model::{CompletionStatus, Course, CourseId, Enrollment, Lesson, LessonId};

use super::markdown_vm::{excerpt, markdown_to_html};
use super::time_fmt::format_date;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CourseCardVm {
    pub id: CourseId,
    pub title: String,
    pub summary: String,
    pub subject: String,
    pub created_label: String,
    pub enrollment: Option<u8>,
}

#[must_use]
pub fn map_course_cards(courses: &[Course], enrollments: &[Enrollment]) -> Vec<CourseCardVm> {
    let progress: HashMap<CourseId, u8> = enrollments
        .iter()
        .map(|e| (e.course_id, e.progress()))
        .collect();
    courses
        .iter()
        .map(|course| CourseCardVm {
            id: course.id(),
            title: course.title().to_string(),
            summary: course
                .description()
                .map(|d| excerpt(d, 140))
                .unwrap_or_default(),
            subject: course.subject().unwrap_or("General").to_string(),
            created_label: format_date(course.created_at()),
            enrollment: progress.get(&course.id()).copied(),
        })
        .collect()
}

/// One row of the account page's "My courses" list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnrollmentRowVm {
    pub course_id: CourseId,
    pub title: String,
    pub progress: u8,
    pub status_label: &'static str,
    pub enrolled_label: String,
}

/// Joins enrollments to their courses, newest enrollment first. Enrollments
/// whose course is gone are skipped.
#[must_use]
pub fn map_enrollment_rows(courses: &[Course], enrollments: &[Enrollment]) -> Vec<EnrollmentRowVm> {
    let titles: HashMap<CourseId, &str> = courses.iter().map(|c| (c.id(), c.title())).collect();
    let mut rows: Vec<(&Enrollment, &str)> = enrollments
        .iter()
        .filter_map(|e| titles.get(&e.course_id).map(|title| (e, *title)))
        .collect();
    rows.sort_by(|a, b| b.0.enrolled_at.cmp(&a.0.enrolled_at));
    rows.into_iter()
        .map(|(enrollment, title)| EnrollmentRowVm {
            course_id: enrollment.course_id,
            title: title.to_string(),
            progress: enrollment.progress(),
            status_label: match enrollment.status {
                CompletionStatus::InProgress => "In progress",
                CompletionStatus::Completed => "Completed",
            },
            enrolled_label: format_date(enrollment.enrolled_at),
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LessonRowVm {
    pub id: LessonId,
    pub title: String,
    pub order_label: String,
    pub body_html: String,
    pub completed: bool,
}

#[must_use]
pub fn map_lesson_rows(lessons: &[Lesson], completed: &HashSet<LessonId>) -> Vec<LessonRowVm> {
    lessons
        .iter()
        .map(|lesson| LessonRowVm {
            id: lesson.id(),
            title: lesson.title().to_string(),
            order_label: format!("Lesson {}", lesson.order_number()),
            body_html: markdown_to_html(lesson.content()),
            completed: completed.contains(&lesson.id()),
        })
        .collect()
}
