use aarambh_core::model::{CourseId, LessonId};
use dioxus::prelude::*;
use dioxus_router::Link;
use services::{CourseServiceError, Notice};

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::courses::enroll_in;
use crate::views::home::SignedOutNotice;
use crate::views::notice::{NoticeBanner, show_notice};
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{LessonRowVm, map_lesson_rows};

#[derive(Clone, Debug, PartialEq)]
struct CourseDetailData {
    title: String,
    description: Option<String>,
    enrolled: bool,
    lessons: Vec<LessonRowVm>,
    completed: usize,
}

#[component]
pub fn CourseDetailView(course_id: CourseId) -> Element {
    let ctx = use_context::<AppContext>();
    let notice = use_signal(|| None::<Notice>);
    let mut open_lesson = use_signal(|| None::<LessonId>);

    let ctx_for_resource = ctx.clone();
    let resource = use_resource(use_reactive!(|course_id| {
        let ctx = ctx_for_resource.clone();
        async move {
            let user = ctx.user()?;
            let courses = ctx.courses();
            let course = courses.course(course_id).await.map_err(|err| match err {
                CourseServiceError::CourseNotFound => ViewError::NotFound,
                other => ViewError::failed(other),
            })?;
            let lessons = courses
                .list_lessons(course_id)
                .await
                .map_err(ViewError::failed)?;
            let enrolled = courses
                .is_enrolled(&user, course_id)
                .await
                .map_err(ViewError::failed)?;
            let done = ctx
                .completion()
                .completed_lessons()
                .map_err(ViewError::failed)?;
            let lessons = map_lesson_rows(&lessons, &done);
            Ok(CourseDetailData {
                title: course.title().to_string(),
                description: course.description().map(ToString::to_string),
                enrolled,
                completed: lessons.iter().filter(|l| l.completed).count(),
                lessons,
            })
        }
    }));

    let state = view_state_from_resource(&resource);

    let toggle = {
        let ctx = ctx.clone();
        move |lesson: LessonId| match ctx.completion().toggle(lesson) {
            Ok(toggled) => {
                show_notice(notice, toggled.notice);
                let mut resource = resource;
                resource.restart();
            }
            Err(err) => show_notice(notice, Notice::error("Could not update lesson", &err)),
        }
    };

    rsx! {
        div { class: "page course-page",
            Link { class: "back-link", to: Route::Courses {}, "← All courses" }
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
                },
                ViewState::Ready(data) => rsx! {
                    header { class: "view-header",
                        h2 { class: "view-title", "{data.title}" }
                        if let Some(description) = data.description.as_ref() {
                            p { class: "view-subtitle", "{description}" }
                        }
                    }
                    div { class: "course-status",
                        span { "{data.completed} of {data.lessons.len()} lessons completed" }
                        if !data.enrolled {
                            button {
                                class: "btn btn-primary",
                                r#type: "button",
                                onclick: {
                                    let ctx = ctx.clone();
                                    move |_| {
                                        enroll_in(&ctx, course_id, notice, move || {
                                            let mut resource = resource;
                                            resource.restart();
                                        });
                                    }
                                },
                                "Enroll"
                            }
                        }
                    }
                    if data.lessons.is_empty() {
                        p { class: "empty", "This course has no lessons yet." }
                    } else {
                        ol { class: "lesson-list",
                            for lesson in data.lessons {
                                li {
                                    key: "{lesson.id}",
                                    class: "lesson",
                                    class: if lesson.completed { "lesson--done" },
                                    div { class: "lesson-header",
                                        button {
                                            class: "lesson-title",
                                            r#type: "button",
                                            onclick: move |_| {
                                                if open_lesson() == Some(lesson.id) {
                                                    open_lesson.set(None);
                                                } else {
                                                    open_lesson.set(Some(lesson.id));
                                                }
                                            },
                                            span { class: "lesson-order", "{lesson.order_label}" }
                                            span { "{lesson.title}" }
                                        }
                                        button {
                                            class: "btn btn-secondary lesson-toggle",
                                            r#type: "button",
                                            onclick: {
                                                let toggle = toggle.clone();
                                                move |_| toggle(lesson.id)
                                            },
                                            if lesson.completed { "Mark incomplete" } else { "Mark complete" }
                                        }
                                    }
                                    if open_lesson() == Some(lesson.id) {
                                        div { class: "lesson-body", dangerous_inner_html: "{lesson.body_html}" }
                                    }
                                }
                            }
                        }
                    }
                },
            }
        }
    }
}
