use aarambh_core::model::CourseId;
use dioxus::prelude::*;
use dioxus_router::Link;
use services::{CourseServiceError, Notice};

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::home::SignedOutNotice;
use crate::views::notice::{NoticeBanner, show_notice};
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{CourseCardVm, map_course_cards};

#[derive(Clone, Debug, PartialEq)]
struct CoursesData {
    cards: Vec<CourseCardVm>,
}

/// Enroll the signed-in user and report the outcome as a notice.
pub(crate) fn enroll_in(
    ctx: &AppContext,
    course: CourseId,
    notice: Signal<Option<Notice>>,
    mut on_done: impl FnMut() + 'static,
) {
    let ctx = ctx.clone();
    spawn(async move {
        let user = match ctx.user() {
            Ok(user) => user,
            Err(err) => {
                show_notice(notice, Notice::info(err.message()));
                return;
            }
        };
        match ctx.courses().enroll(&user, course).await {
            Ok(_) => {
                show_notice(notice, Notice::success("Enrolled!"));
                on_done();
            }
            Err(CourseServiceError::AlreadyEnrolled) => {
                show_notice(notice, Notice::info("You are already enrolled in this course"));
            }
            Err(err) => show_notice(notice, Notice::error("Could not enroll", &err)),
        }
    });
}

#[component]
pub fn CoursesView() -> Element {
    let ctx = use_context::<AppContext>();
    let notice = use_signal(|| None::<Notice>);

    let ctx_for_resource = ctx.clone();
    let resource = use_resource(move || {
        let ctx = ctx_for_resource.clone();
        async move {
            let user = ctx.user()?;
            let courses = ctx.courses();
            let list = courses
                .list_courses()
                .await
                .map_err(ViewError::failed)?;
            let enrollments = courses
                .enrollments(&user)
                .await
                .map_err(ViewError::failed)?;
            Ok(CoursesData {
                cards: map_course_cards(&list, &enrollments),
            })
        }
    });

    let state = view_state_from_resource(&resource);

    rsx! {
        div { class: "page courses-page",
            header { class: "view-header",
                h2 { class: "view-title", "Courses" }
                p { class: "view-subtitle", "Browse courses and enroll to track your progress." }
            }
            NoticeBanner { notice }
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
                    button {
                        class: "btn btn-secondary",
                        r#type: "button",
                        onclick: move |_| {
                            let mut resource = resource;
                            resource.restart();
                        },
                        "Retry"
                    }
                },
                ViewState::Ready(data) => rsx! {
                    if data.cards.is_empty() {
                        p { class: "empty", "No courses yet." }
                    } else {
                        ul { class: "card-list",
                            for card in data.cards {
                                CourseCard {
                                    key: "{card.id}",
                                    card: card.clone(),
                                    on_enroll: {
                                        let ctx = ctx.clone();
                                        move |course: CourseId| {
                                            enroll_in(&ctx, course, notice, move || {
                                                let mut resource = resource;
                                                resource.restart();
                                            });
                                        }
                                    },
                                }
                            }
                        }
                    }
                },
            }
        }
    }
}

#[component]
fn CourseCard(card: CourseCardVm, on_enroll: EventHandler<CourseId>) -> Element {
    let course_id = card.id;
    rsx! {
        li { class: "course-card",
            div { class: "course-card-header",
                Link { class: "course-title", to: Route::CourseDetail { course_id }, "{card.title}" }
                span { class: "pill", "{card.subject}" }
            }
            if !card.summary.is_empty() {
                p { class: "course-summary", "{card.summary}" }
            }
            div { class: "course-card-footer",
                span { class: "course-date", "Added {card.created_label}" }
                match card.enrollment {
                    Some(progress) => rsx! {
                        span { class: "course-enrolled", "Enrolled · {progress}%" }
                    },
                    None => rsx! {
                        button {
                            class: "btn btn-primary",
                            r#type: "button",
                            onclick: move |_| on_enroll.call(course_id),
                            "Enroll"
                        }
                    },
                }
            }
        }
    }
}
