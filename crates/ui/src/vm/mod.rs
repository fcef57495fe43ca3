mod course_vm;
mod markdown_vm;
mod note_vm;
mod progress_vm;
mod quiz_vm;
mod resource_vm;
mod time_fmt;

pub use course_vm::{
    CourseCardVm, EnrollmentRowVm, LessonRowVm, map_course_cards, map_enrollment_rows,
    map_lesson_rows,
};
pub use markdown_vm::{excerpt, markdown_to_html, sanitize_html};
pub use note_vm::{NoteCardVm, map_note_cards};
pub use progress_vm::{ProgressVm, StatTileVm, SubjectRowVm, map_progress};
pub use quiz_vm::{
    OptionVm, QuestionVm, QuizPhase, QuizSetCardVm, QuizVm, ResultVm, map_quiz_set_cards,
    start_quiz,
};
pub use resource_vm::{ResourceCardVm, map_resource_cards};
pub use time_fmt::{format_date, format_datetime};
