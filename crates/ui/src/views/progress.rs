use dioxus::prelude::*;

use crate::context::AppContext;
use crate::views::home::SignedOutNotice;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{ProgressVm, map_progress};

#[component]
pub fn ProgressView() -> Element {
    let ctx = use_context::<AppContext>();

    let resource = use_resource(move || {
        let ctx = ctx.clone();
        async move {
            let user = ctx.user()?;
            let snapshot = ctx
                .progress()
                .snapshot(&user)
                .await
                .map_err(ViewError::failed)?;
            Ok::<ProgressVm, ViewError>(map_progress(&snapshot))
        }
    });
    let state = view_state_from_resource(&resource);

    rsx! {
        div { class: "page progress-page",
            header { class: "view-header",
                h2 { class: "view-title", "Progress" }
                p { class: "view-subtitle", "Lessons you have reviewed and how your quizzes went." }
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
                ViewState::Ready(vm) => rsx! {
                    div { class: "tile-grid",
                        for tile in vm.tiles {
                            div { key: "{tile.label}", class: "tile",
                                span { class: "tile-value", "{tile.value}" }
                                span { class: "tile-label", "{tile.label}" }
                            }
                        }
                    }
                    h3 { "By subject" }
                    if vm.subjects.is_empty() {
                        p { class: "empty", "No lessons yet." }
                    } else {
                        table { class: "subject-table",
                            thead {
                                tr {
                                    th { "Subject" }
                                    th { "Lessons" }
                                    th { "Completion" }
                                    th { "Quizzes" }
                                }
                            }
                            tbody {
                                for row in vm.subjects {
                                    tr { key: "{row.subject}",
                                        td { "{row.subject}" }
                                        td { "{row.lessons_label}" }
                                        td {
                                            progress {
                                                max: "100",
                                                value: "{row.completion_percent}",
                                            }
                                            span { " {row.completion_percent}%" }
                                        }
                                        td { "{row.average_label}" }
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
