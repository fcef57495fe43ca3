use aarambh_core::model::{
    AnswerOption, CourseDraft, CourseId, LessonDraft, NoteDraft, NoteId, QuizDraft, ResourceKind,
    Role, UserId,
};
use dioxus::prelude::*;
use services::{Notice, ResourceDraft};

use super::{AdminData, UserRowVm, run_admin};
use crate::context::AppContext;
use crate::views::ViewError;
use crate::views::notice::show_notice;

type Reload = Resource<Result<AdminData, ViewError>>;

fn optional(value: String) -> Option<String> {
    Some(value).filter(|v| !v.trim().is_empty())
}

#[component]
pub(super) fn SubjectForm(notice: Signal<Option<Notice>>, reload: Reload) -> Element {
    let ctx = use_context::<AppContext>();
    let mut name = use_signal(String::new);
    let mut description = use_signal(String::new);

    rsx! {
        form {
            class: "admin-form",
            onsubmit: move |evt: FormEvent| {
                evt.prevent_default();
                let (n, d) = (name(), optional(description()));
                run_admin(
                    &ctx,
                    notice,
                    reload,
                    "Subject created successfully.",
                    move |admin, user| async move {
                        admin.create_subject(&user, &n, d).await.map(|_| ())
                    },
                    move || {
                        name.set(String::new());
                        description.set(String::new());
                    },
                );
            },
            h4 { "New subject" }
            input {
                placeholder: "Name",
                value: "{name}",
                oninput: move |evt| name.set(evt.value()),
            }
            input {
                placeholder: "Description (optional)",
                value: "{description}",
                oninput: move |evt| description.set(evt.value()),
            }
            button { class: "btn btn-primary", r#type: "submit", "Add subject" }
        }
    }
}

#[component]
pub(super) fn CourseForm(notice: Signal<Option<Notice>>, reload: Reload) -> Element {
    let ctx = use_context::<AppContext>();
    let mut title = use_signal(String::new);
    let mut description = use_signal(String::new);
    let mut subject = use_signal(String::new);

    rsx! {
        form {
            class: "admin-form",
            onsubmit: move |evt: FormEvent| {
                evt.prevent_default();
                let draft = CourseDraft {
                    title: title(),
                    description: optional(description()),
                    subject: optional(subject()),
                };
                run_admin(
                    &ctx,
                    notice,
                    reload,
                    "Course created successfully.",
                    move |admin, user| async move {
                        admin.create_course(&user, draft).await.map(|_| ())
                    },
                    move || {
                        title.set(String::new());
                        description.set(String::new());
                        subject.set(String::new());
                    },
                );
            },
            h4 { "New course" }
            input {
                placeholder: "Title",
                value: "{title}",
                oninput: move |evt| title.set(evt.value()),
            }
            input {
                placeholder: "Subject (optional)",
                value: "{subject}",
                oninput: move |evt| subject.set(evt.value()),
            }
            textarea {
                placeholder: "Description (optional)",
                value: "{description}",
                oninput: move |evt| description.set(evt.value()),
            }
            button { class: "btn btn-primary", r#type: "submit", "Add course" }
        }
    }
}

#[component]
pub(super) fn LessonForm(
    notice: Signal<Option<Notice>>,
    reload: Reload,
    courses: Vec<(CourseId, String)>,
) -> Element {
    let ctx = use_context::<AppContext>();
    let mut course = use_signal(String::new);
    let mut title = use_signal(String::new);
    let mut content = use_signal(String::new);
    let mut order = use_signal(|| "1".to_string());

    rsx! {
        form {
            class: "admin-form",
            onsubmit: move |evt: FormEvent| {
                evt.prevent_default();
                let draft = LessonDraft {
                    course_id: course().parse::<CourseId>().ok(),
                    title: title(),
                    content: content(),
                    // Unparseable input is rejected by lesson validation.
                    order_number: order().trim().parse().unwrap_or(0),
                };
                run_admin(
                    &ctx,
                    notice,
                    reload,
                    "Lesson created successfully.",
                    move |admin, user| async move {
                        admin.create_lesson(&user, draft).await.map(|_| ())
                    },
                    move || {
                        title.set(String::new());
                        content.set(String::new());
                    },
                );
            },
            h4 { "New lesson" }
            select {
                value: "{course}",
                onchange: move |evt| course.set(evt.value()),
                option { value: "", "Choose a course" }
                for (id, label) in courses {
                    option { key: "{id}", value: "{id}", "{label}" }
                }
            }
            input {
                placeholder: "Title",
                value: "{title}",
                oninput: move |evt| title.set(evt.value()),
            }
            input {
                r#type: "number",
                min: "1",
                value: "{order}",
                oninput: move |evt| order.set(evt.value()),
            }
            textarea {
                placeholder: "Content (markdown)",
                value: "{content}",
                oninput: move |evt| content.set(evt.value()),
            }
            button { class: "btn btn-primary", r#type: "submit", "Add lesson" }
        }
    }
}

#[component]
pub(super) fn QuizForm(notice: Signal<Option<Notice>>, reload: Reload) -> Element {
    let ctx = use_context::<AppContext>();
    let mut subject = use_signal(String::new);
    let mut question = use_signal(String::new);
    let mut options = use_signal(|| <[String; 4]>::default());
    let mut correct = use_signal(String::new);

    rsx! {
        form {
            class: "admin-form",
            onsubmit: move |evt: FormEvent| {
                evt.prevent_default();
                let draft = QuizDraft {
                    subject: subject(),
                    question: question(),
                    options: options(),
                    correct: AnswerOption::from_letter(&correct()).ok(),
                };
                run_admin(
                    &ctx,
                    notice,
                    reload,
                    "Quiz created successfully.",
                    move |admin, user| async move {
                        admin.create_quiz(&user, draft).await.map(|_| ())
                    },
                    move || {
                        question.set(String::new());
                        options.set(<[String; 4]>::default());
                        correct.set(String::new());
                    },
                );
            },
            h4 { "New quiz question" }
            input {
                placeholder: "Subject",
                value: "{subject}",
                oninput: move |evt| subject.set(evt.value()),
            }
            input {
                placeholder: "Question",
                value: "{question}",
                oninput: move |evt| question.set(evt.value()),
            }
            for choice in AnswerOption::ALL {
                input {
                    key: "{choice.letter()}",
                    placeholder: "Option {choice.letter()}",
                    value: options.read()[choice.index()].clone(),
                    oninput: move |evt| options.write()[choice.index()] = evt.value(),
                }
            }
            select {
                value: "{correct}",
                onchange: move |evt| correct.set(evt.value()),
                option { value: "", "Correct answer" }
                for choice in AnswerOption::ALL {
                    option { key: "{choice.letter()}", value: "{choice.letter()}", "{choice.letter()}" }
                }
            }
            button { class: "btn btn-primary", r#type: "submit", "Add question" }
        }
    }
}

#[component]
pub(super) fn ResourceForm(notice: Signal<Option<Notice>>, reload: Reload) -> Element {
    let ctx = use_context::<AppContext>();
    let mut title = use_signal(String::new);
    let mut subject = use_signal(String::new);
    let mut kind = use_signal(|| ResourceKind::Link.as_str().to_string());
    let mut url = use_signal(String::new);

    rsx! {
        form {
            class: "admin-form",
            onsubmit: move |evt: FormEvent| {
                evt.prevent_default();
                let kind = match ResourceKind::parse(&kind()) {
                    Ok(kind) => kind,
                    Err(err) => {
                        show_notice(notice, Notice::error("Error", &err));
                        return;
                    }
                };
                let draft = ResourceDraft {
                    title: title(),
                    subject: subject(),
                    kind,
                    url: url(),
                };
                run_admin(
                    &ctx,
                    notice,
                    reload,
                    "Resource added successfully.",
                    move |admin, user| async move {
                        admin.create_resource(&user, draft).await.map(|_| ())
                    },
                    move || {
                        title.set(String::new());
                        url.set(String::new());
                    },
                );
            },
            h4 { "New study resource" }
            input {
                placeholder: "Title",
                value: "{title}",
                oninput: move |evt| title.set(evt.value()),
            }
            input {
                placeholder: "Subject",
                value: "{subject}",
                oninput: move |evt| subject.set(evt.value()),
            }
            select {
                value: "{kind}",
                onchange: move |evt| kind.set(evt.value()),
                for k in [ResourceKind::Video, ResourceKind::Article, ResourceKind::Document, ResourceKind::Link] {
                    option { key: "{k.as_str()}", value: "{k.as_str()}", "{k.as_str()}" }
                }
            }
            input {
                r#type: "url",
                placeholder: "https://...",
                value: "{url}",
                oninput: move |evt| url.set(evt.value()),
            }
            button { class: "btn btn-primary", r#type: "submit", "Add resource" }
        }
    }
}

#[component]
pub(super) fn NoteEditForm(
    notice: Signal<Option<Notice>>,
    reload: Reload,
    id: NoteId,
    draft: NoteDraft,
    on_close: EventHandler<()>,
) -> Element {
    let ctx = use_context::<AppContext>();
    let mut title = use_signal(|| draft.title.clone());
    let mut subject = use_signal(|| draft.subject.clone());
    let mut content = use_signal(|| draft.content.clone());
    let mut file_url = use_signal(|| draft.file_url.clone().unwrap_or_default());

    rsx! {
        form {
            class: "admin-form note-edit-form",
            onsubmit: move |evt: FormEvent| {
                evt.prevent_default();
                let draft = NoteDraft {
                    title: title(),
                    content: content(),
                    subject: subject(),
                    file_url: optional(file_url()),
                };
                run_admin(
                    &ctx,
                    notice,
                    reload,
                    "Note updated successfully.",
                    move |admin, user| async move {
                        admin.update_note(&user, id, draft).await.map(|_| ())
                    },
                    move || on_close.call(()),
                );
            },
            h4 { "Edit note" }
            input {
                placeholder: "Title",
                value: "{title}",
                oninput: move |evt| title.set(evt.value()),
            }
            input {
                placeholder: "Subject",
                value: "{subject}",
                oninput: move |evt| subject.set(evt.value()),
            }
            textarea {
                placeholder: "Content (markdown)",
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
            button {
                class: "btn btn-ghost",
                r#type: "button",
                onclick: move |_| on_close.call(()),
                "Cancel"
            }
        }
    }
}

#[component]
pub(super) fn RoleForm(
    notice: Signal<Option<Notice>>,
    reload: Reload,
    users: Vec<UserRowVm>,
) -> Element {
    let ctx = use_context::<AppContext>();
    let mut user_id = use_signal(String::new);
    let mut role = use_signal(|| Role::Student.as_str().to_string());

    rsx! {
        form {
            class: "admin-form",
            onsubmit: move |evt: FormEvent| {
                evt.prevent_default();
                let Ok(target) = user_id().parse::<UserId>() else {
                    show_notice(notice, Notice::info("Choose a user first"));
                    return;
                };
                let new_role = match Role::parse(&role()) {
                    Ok(new_role) => new_role,
                    Err(err) => {
                        show_notice(notice, Notice::error("Error", &err));
                        return;
                    }
                };
                run_admin(
                    &ctx,
                    notice,
                    reload,
                    "User role updated successfully.",
                    move |admin, user| async move {
                        admin.set_user_role(&user, target, new_role).await
                    },
                    move || user_id.set(String::new()),
                );
            },
            h4 { "Change a user's role" }
            select {
                value: "{user_id}",
                onchange: move |evt| user_id.set(evt.value()),
                option { value: "", "Choose a user" }
                for row in users {
                    option { key: "{row.id}", value: "{row.id}", "{row.name} ({row.role.as_str()})" }
                }
            }
            select {
                value: "{role}",
                onchange: move |evt| role.set(evt.value()),
                for r in [Role::Student, Role::Instructor, Role::Admin] {
                    option { key: "{r.as_str()}", value: "{r.as_str()}", "{r.as_str()}" }
                }
            }
            button { class: "btn btn-primary", r#type: "submit", "Update role" }
        }
    }
}
