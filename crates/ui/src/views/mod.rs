mod account;
mod admin;
mod course_detail;
mod courses;
mod home;
mod notes;
mod notice;
mod progress;
mod quizzes;
mod resources;
mod state;

#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod view_smoke;

pub use account::AccountView;
pub use admin::AdminView;
pub use course_detail::CourseDetailView;
pub use courses::CoursesView;
pub use home::{HomeView, SignedOutNotice};
pub use notes::NotesView;
pub use notice::{NoticeBanner, show_notice};
pub use progress::ProgressView;
pub use quizzes::QuizzesView;
pub use resources::ResourcesView;
pub use state::{ViewError, ViewState, view_state_from_resource};
