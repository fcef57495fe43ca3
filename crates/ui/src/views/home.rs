use dioxus::prelude::*;
use dioxus_router::Link;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};

#[derive(Clone, Debug, PartialEq)]
struct HomeData {
    greeting: String,
    role: &'static str,
    courses: usize,
    enrolled: usize,
    quiz_subjects: usize,
    completion_percent: u8,
}

#[component]
pub fn HomeView() -> Element {
    let ctx = use_context::<AppContext>();
    let app_name = ctx.app_name().to_string();

    let resource = use_resource(move || {
        let ctx = ctx.clone();
        async move {
            let user = ctx.user()?;
            let courses = ctx.courses();
            let course_count = courses
                .list_courses()
                .await
                .map_err(ViewError::failed)?
                .len();
            let enrolled = courses
                .enrollments(&user)
                .await
                .map_err(ViewError::failed)?
                .len();
            let quiz_subjects = ctx
                .quizzes()
                .list_sets()
                .await
                .map_err(ViewError::failed)?
                .len();
            let snapshot = ctx
                .progress()
                .snapshot(&user)
                .await
                .map_err(ViewError::failed)?;

            Ok(HomeData {
                greeting: user
                    .email()
                    .map_or_else(|| "Welcome back".to_string(), |e| format!("Welcome back, {e}")),
                role: user.role().as_str(),
                courses: course_count,
                enrolled,
                quiz_subjects,
                completion_percent: snapshot.completion_percent,
            })
        }
    });

    let state = view_state_from_resource(&resource);

    rsx! {
        div { class: "page",
            header { class: "view-header",
                h2 { class: "view-title", "{app_name}" }
                p { class: "view-subtitle", "Your learning dashboard." }
            }
            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Error(ViewError::SignedOut) => rsx! {
                    SignedOutNotice {}
                },
                ViewState::Error(err) => rsx! {
                    p { "{err.message()}" }
                },
                ViewState::Ready(data) => rsx! {
                    p { class: "home-greeting", "{data.greeting}" }
                    p { class: "home-role", "Signed in as {data.role}" }
                    div { class: "tile-grid",
                        Link { class: "tile", to: Route::Courses {},
                            span { class: "tile-value", "{data.courses}" }
                            span { class: "tile-label", "Courses available" }
                        }
                        Link { class: "tile", to: Route::Courses {},
                            span { class: "tile-value", "{data.enrolled}" }
                            span { class: "tile-label", "Enrolled" }
                        }
                        Link { class: "tile", to: Route::Quizzes {},
                            span { class: "tile-value", "{data.quiz_subjects}" }
                            span { class: "tile-label", "Quiz subjects" }
                        }
                        Link { class: "tile", to: Route::Progress {},
                            span { class: "tile-value", "{data.completion_percent}%" }
                            span { class: "tile-label", "Lessons completed" }
                        }
                    }
                },
            }
        }
    }
}

/// Shown by every page that needs a signed-in user.
#[component]
pub fn SignedOutNotice() -> Element {
    let message = ViewError::SignedOut.message();
    rsx! {
        div { class: "signed-out",
            p { "{message}" }
            Link { class: "btn btn-primary", to: Route::Account {}, "Go to account" }
        }
    }
}
