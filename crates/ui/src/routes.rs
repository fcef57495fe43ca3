use aarambh_core::model::CourseId;
use dioxus::prelude::*;
use dioxus_router::{Link, Outlet, Routable};

use crate::context::AppContext;
use crate::views::{
    AccountView, AdminView, CourseDetailView, CoursesView, HomeView, NotesView, ProgressView,
    QuizzesView, ResourcesView,
};

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Layout)]
        #[route("/", HomeView)] Home {},
        #[route("/courses", CoursesView)] Courses {},
        #[route("/courses/:course_id", CourseDetailView)] CourseDetail { course_id: CourseId },
        #[route("/quizzes", QuizzesView)] Quizzes {},
        #[route("/progress", ProgressView)] Progress {},
        #[route("/notes", NotesView)] Notes {},
        #[route("/resources", ResourcesView)] Resources {},
        #[route("/admin", AdminView)] Admin {},
        #[route("/account", AccountView)] Account {},
}

#[component]
fn Layout() -> Element {
    rsx! {
        div { class: "app",
            Sidebar {}
            main { class: "content",
                Outlet::<Route> {}
            }
        }
    }
}

#[component]
fn Sidebar() -> Element {
    let ctx = use_context::<AppContext>();
    let app_name = ctx.app_name().to_string();
    rsx! {
        nav { class: "sidebar",
            h1 { "{app_name}" }
            ul {
                li { Link { to: Route::Home {}, "Dashboard" } }
                li { Link { to: Route::Courses {}, "Courses" } }
                li { Link { to: Route::Quizzes {}, "Quizzes" } }
                li { Link { to: Route::Progress {}, "Progress" } }
                li { Link { to: Route::Notes {}, "Notes" } }
                li { Link { to: Route::Resources {}, "Resources" } }
                li { Link { to: Route::Admin {}, "Admin" } }
                li { Link { to: Route::Account {}, "Account" } }
            }
        }
    }
}
