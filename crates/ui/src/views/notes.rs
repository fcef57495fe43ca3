use aarambh_core::model::{NoteDraft, NoteId};
use dioxus::prelude::*;
use services::Notice;

use crate::context::AppContext;
use crate::views::home::SignedOutNotice;
use crate::views::notice::{NoticeBanner, show_notice};
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{NoteCardVm, map_note_cards};

#[derive(Clone, Debug, PartialEq)]
struct NotesData {
    cards: Vec<NoteCardVm>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum NoteAction {
    Favorite,
    Archive,
    Delete,
}

#[component]
pub fn NotesView() -> Element {
    let ctx = use_context::<AppContext>();
    let notice = use_signal(|| None::<Notice>);
    let mut show_archived = use_signal(|| false);
    let mut title = use_signal(String::new);
    let mut subject = use_signal(String::new);
    let mut content = use_signal(String::new);
    let mut file_url = use_signal(String::new);

    let ctx_for_resource = ctx.clone();
    let resource = use_resource(move || {
        let ctx = ctx_for_resource.clone();
        let show_archived = show_archived();
        async move {
            let user = ctx.user()?;
            let notes = ctx
                .notes()
                .list(&user, show_archived)
                .await
                .map_err(ViewError::failed)?;
            Ok(NotesData {
                cards: map_note_cards(&notes),
            })
        }
    });
    let state = view_state_from_resource(&resource);

    let create = {
        let ctx = ctx.clone();
        move |evt: FormEvent| {
            evt.prevent_default();
            let Ok(user) = ctx.user() else {
                show_notice(notice, Notice::info(ViewError::SignedOut.message()));
                return;
            };
            let draft = NoteDraft {
                title: title(),
                content: content(),
                subject: subject(),
                file_url: Some(file_url()).filter(|u| !u.trim().is_empty()),
            };
            let notes = ctx.notes();
            spawn(async move {
                match notes.create(&user, draft).await {
                    Ok(_) => {
                        title.set(String::new());
                        content.set(String::new());
                        subject.set(String::new());
                        file_url.set(String::new());
                        show_notice(notice, Notice::success("Note saved"));
                        let mut resource = resource;
                        resource.restart();
                    }
                    Err(err) => show_notice(notice, Notice::error("Could not save note", &err)),
                }
            });
        }
    };

    let act = {
        let ctx = ctx.clone();
        move |(id, action): (NoteId, NoteAction)| {
            let Ok(user) = ctx.user() else {
                return;
            };
            let notes = ctx.notes();
            spawn(async move {
                let outcome = match action {
                    NoteAction::Favorite => notes.toggle_favorite(&user, id).await.map(|_| ()),
                    NoteAction::Archive => notes.toggle_archive(&user, id).await.map(|_| ()),
                    NoteAction::Delete => notes.delete(&user, id).await,
                };
                match outcome {
                    Ok(()) => {
                        if action == NoteAction::Delete {
                            show_notice(notice, Notice::success("Note deleted"));
                        }
                        let mut resource = resource;
                        resource.restart();
                    }
                    Err(err) => show_notice(notice, Notice::error("Could not update note", &err)),
                }
            });
        }
    };

    rsx! {
        div { class: "page notes-page",
            header { class: "view-header",
                h2 { class: "view-title", "Notes" }
                p { class: "view-subtitle", "Write things down. Shared notes are reviewed by an admin." }
            }
            NoticeBanner { notice }
            form { class: "note-form", onsubmit: create,
                input {
                    r#type: "text",
                    placeholder: "Title",
                    value: "{title}",
                    oninput: move |evt| title.set(evt.value()),
                }
                input {
                    r#type: "text",
                    placeholder: "Subject (optional)",
                    value: "{subject}",
                    oninput: move |evt| subject.set(evt.value()),
                }
                textarea {
                    placeholder: "Write your note...",
                    value: "{content}",
                    oninput: move |evt| content.set(evt.value()),
                }
                input {
                    r#type: "url",
                    placeholder: "Attachment URL (optional)",
                    value: "{file_url}",
                    oninput: move |evt| file_url.set(evt.value()),
                }
                button { class: "btn btn-primary", r#type: "submit", "Save note" }
            }
            label { class: "toggle",
                input {
                    r#type: "checkbox",
                    checked: show_archived(),
                    onchange: move |evt| show_archived.set(evt.checked()),
                }
                " Show archived"
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
                    if data.cards.is_empty() {
                        p { class: "empty", "No notes yet." }
                    } else {
                        ul { class: "card-list",
                            for card in data.cards {
                                NoteCard {
                                    key: "{card.id}",
                                    card: card.clone(),
                                    on_action: act.clone(),
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
fn NoteCard(card: NoteCardVm, on_action: EventHandler<(NoteId, NoteAction)>) -> Element {
    let ctx = use_context::<AppContext>();
    let id = card.id;
    rsx! {
        li { class: "note-card",
            class: if card.archived { "note-card--archived" },
            div { class: "note-card-header",
                h3 { "{card.title}" }
                span { class: "pill", "{card.subject}" }
                span { class: "pill pill--muted", "{card.review_label}" }
            }
            p { class: "note-excerpt", "{card.excerpt}" }
            if let Some(url) = card.file_url.as_ref() {
                a {
                    class: "note-file",
                    href: "{url}",
                    onclick: {
                        let url = url.clone();
                        move |evt: MouseEvent| {
                            evt.prevent_default();
                            ctx.open_url(&url);
                        }
                    },
                    "Attachment"
                }
            }
            div { class: "note-card-footer",
                span { class: "note-date", "{card.created_label}" }
                button {
                    class: "btn btn-ghost",
                    r#type: "button",
                    onclick: move |_| on_action.call((id, NoteAction::Favorite)),
                    if card.favorite { "★ Unfavorite" } else { "☆ Favorite" }
                }
                button {
                    class: "btn btn-ghost",
                    r#type: "button",
                    onclick: move |_| on_action.call((id, NoteAction::Archive)),
                    if card.archived { "Unarchive" } else { "Archive" }
                }
                button {
                    class: "btn btn-danger",
                    r#type: "button",
                    onclick: move |_| on_action.call((id, NoteAction::Delete)),
                    "Delete"
                }
            }
        }
    }
}
