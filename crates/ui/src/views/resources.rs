use dioxus::prelude::*;
use services::{ALL_SUBJECTS, ResourceFilter};

use crate::context::AppContext;
use crate::views::home::SignedOutNotice;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{ResourceCardVm, map_resource_cards};

#[derive(Clone, Debug, PartialEq)]
struct ResourcesData {
    subjects: Vec<String>,
    cards: Vec<ResourceCardVm>,
}

#[component]
pub fn ResourcesView() -> Element {
    let ctx = use_context::<AppContext>();
    let mut subject = use_signal(|| ALL_SUBJECTS.to_string());
    let mut search = use_signal(String::new);

    let ctx_for_resource = ctx.clone();
    let resource = use_resource(move || {
        let ctx = ctx_for_resource.clone();
        let filter = ResourceFilter::new(&subject(), &search());
        async move {
            ctx.user()?;
            let resources = ctx.resources();
            let subjects = resources
                .subject_options()
                .await
                .map_err(ViewError::failed)?;
            let list = resources
                .list(&filter)
                .await
                .map_err(ViewError::failed)?;
            Ok(ResourcesData {
                subjects,
                cards: map_resource_cards(&list),
            })
        }
    });
    let state = view_state_from_resource(&resource);

    rsx! {
        div { class: "page resources-page",
            header { class: "view-header",
                h2 { class: "view-title", "Study Resources" }
                p { class: "view-subtitle", "Videos, articles and documents picked by your instructors." }
            }
            div { class: "filter-bar",
                input {
                    r#type: "search",
                    placeholder: "Search resources...",
                    value: "{search}",
                    oninput: move |evt| search.set(evt.value()),
                }
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
                    div { class: "subject-filter",
                        for name in data.subjects {
                            button {
                                key: "{name}",
                                class: "pill pill--button",
                                class: if subject() == name { "pill--active" },
                                r#type: "button",
                                onclick: {
                                    let name = name.clone();
                                    move |_| subject.set(name.clone())
                                },
                                "{name}"
                            }
                        }
                    }
                    if data.cards.is_empty() {
                        p { class: "empty", "No resources match." }
                    } else {
                        ul { class: "card-list",
                            for card in data.cards {
                                li { key: "{card.id}", class: "resource-card",
                                    span { class: "pill", "{card.kind_label}" }
                                    a {
                                        class: "resource-title",
                                        href: "{card.url}",
                                        onclick: {
                                            let ctx = ctx.clone();
                                            let url = card.url.clone();
                                            move |evt: MouseEvent| {
                                                evt.prevent_default();
                                                ctx.open_url(&url);
                                            }
                                        },
                                        "{card.title}"
                                    }
                                    span { class: "resource-subject", "{card.subject}" }
                                    span { class: "resource-date", "Added {card.uploaded_label}" }
                                }
                            }
                        }
                    }
                },
            }
        }
    }
}
