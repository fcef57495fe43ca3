//! Admin dashboard: counts, moderation queue, and catalog management.
//!
//! Every mutation goes through [`AdminService`], which re-checks the admin
//! role; the page itself only hides what a non-admin cannot use.

mod forms;

use std::future::Future;
use std::sync::Arc;

use aarambh_core::model::{CourseId, Note, NoteDraft, NoteId, Role, UserId, UserSession};
use dioxus::prelude::*;
use services::{
    AdminEntity, AdminError, AdminService, AdminStats, ModerationTarget, Notice, PendingReview,
    UserSummary,
};

use crate::context::AppContext;
use crate::views::home::SignedOutNotice;
use crate::views::notice::{NoticeBanner, show_notice};
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::excerpt;

use forms::{CourseForm, LessonForm, NoteEditForm, QuizForm, ResourceForm, RoleForm, SubjectForm};

#[derive(Clone, Debug, PartialEq, Eq)]
struct PendingItemVm {
    kind: &'static str,
    title: String,
    detail: String,
    target: ModerationTarget,
    entity: AdminEntity,
    /// Only notes can be edited from the review queue.
    edit: Option<(NoteId, NoteDraft)>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct UserRowVm {
    id: UserId,
    name: String,
    email: String,
    role: Role,
}

fn map_users(users: Vec<UserSummary>) -> Vec<UserRowVm> {
    users
        .into_iter()
        .map(|u| UserRowVm {
            id: u.profile.user_id(),
            name: u.profile.display_name(),
            email: u.profile.email().unwrap_or("-").to_string(),
            role: u.role,
        })
        .collect()
}

fn note_draft(note: &Note) -> NoteDraft {
    NoteDraft {
        title: note.title().to_string(),
        content: note.content().to_string(),
        subject: note.subject().to_string(),
        file_url: note.file_url().map(ToString::to_string),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct CatalogRowVm {
    label: String,
    entity: AdminEntity,
}

#[derive(Clone, Debug, PartialEq)]
struct AdminData {
    stats: AdminStats,
    pending: Vec<PendingItemVm>,
    users: Vec<UserRowVm>,
    courses: Vec<(CourseId, String)>,
    subjects: Vec<CatalogRowVm>,
    course_rows: Vec<CatalogRowVm>,
}

fn map_pending(pending: PendingReview) -> Vec<PendingItemVm> {
    let notes = pending.notes.into_iter().map(|n| PendingItemVm {
        kind: "Note",
        title: n.title().to_string(),
        detail: excerpt(n.content(), 120),
        target: ModerationTarget::Note(n.id()),
        entity: AdminEntity::Note(n.id()),
        edit: Some((n.id(), note_draft(&n))),
    });
    let quizzes = pending.quizzes.into_iter().map(|q| PendingItemVm {
        kind: "Quiz",
        title: q.question().to_string(),
        detail: q.subject().to_string(),
        target: ModerationTarget::Quiz(q.id()),
        entity: AdminEntity::Quiz(q.id()),
        edit: None,
    });
    let resources = pending.resources.into_iter().map(|r| PendingItemVm {
        kind: "Resource",
        title: r.title().to_string(),
        detail: r.url().to_string(),
        target: ModerationTarget::Resource(r.id()),
        entity: AdminEntity::Resource(r.id()),
        edit: None,
    });
    notes.chain(quizzes).chain(resources).collect()
}

fn view_error(err: &AdminError) -> ViewError {
    match err {
        AdminError::Forbidden => ViewError::Forbidden,
        other => ViewError::failed(other),
    }
}

/// Shared plumbing for admin mutations: run `op` with the current session,
/// report the outcome, reload the page data on success.
fn run_admin<Fut>(
    ctx: &AppContext,
    notice: Signal<Option<Notice>>,
    mut reload: Resource<Result<AdminData, ViewError>>,
    success: &'static str,
    op: impl FnOnce(Arc<AdminService>, UserSession) -> Fut + 'static,
    on_success: impl FnOnce() + 'static,
) where
    Fut: Future<Output = Result<(), AdminError>> + 'static,
{
    let user = match ctx.user() {
        Ok(user) => user,
        Err(err) => {
            show_notice(notice, Notice::info(err.message()));
            return;
        }
    };
    let admin = ctx.admin();
    spawn(async move {
        match op(admin, user).await {
            Ok(()) => {
                show_notice(notice, Notice::success(success));
                on_success();
                reload.restart();
            }
            Err(err) => show_notice(notice, Notice::error("Error", &err)),
        }
    });
}

#[component]
pub fn AdminView() -> Element {
    let ctx = use_context::<AppContext>();
    let notice = use_signal(|| None::<Notice>);

    let ctx_for_resource = ctx.clone();
    let resource = use_resource(move || {
        let ctx = ctx_for_resource.clone();
        async move {
            let user = ctx.user()?;
            let admin = ctx.admin();
            let stats = admin.stats(&user).await.map_err(|e| view_error(&e))?;
            let pending = admin.pending(&user).await.map_err(|e| view_error(&e))?;
            let users = admin.users(&user).await.map_err(|e| view_error(&e))?;
            let subjects = admin.subjects(&user).await.map_err(|e| view_error(&e))?;
            let courses = ctx
                .courses()
                .list_courses()
                .await
                .map_err(ViewError::failed)?;
            Ok(AdminData {
                stats,
                pending: map_pending(pending),
                users: map_users(users),
                courses: courses
                    .iter()
                    .map(|c| (c.id(), c.title().to_string()))
                    .collect(),
                subjects: subjects
                    .iter()
                    .map(|s| CatalogRowVm {
                        label: s.name().to_string(),
                        entity: AdminEntity::Subject(s.id()),
                    })
                    .collect(),
                course_rows: courses
                    .iter()
                    .map(|c| CatalogRowVm {
                        label: c.title().to_string(),
                        entity: AdminEntity::Course(c.id()),
                    })
                    .collect(),
            })
        }
    });
    let state = view_state_from_resource(&resource);
    let mut editing = use_signal(|| None::<(NoteId, NoteDraft)>);

    let approve = {
        let ctx = ctx.clone();
        move |target: ModerationTarget| {
            run_admin(
                &ctx,
                notice,
                resource,
                "Content approved successfully.",
                move |admin, user| async move { admin.set_approved(&user, target, true).await },
                || {},
            );
        }
    };

    let delete = {
        let ctx = ctx.clone();
        move |entity: AdminEntity| {
            run_admin(
                &ctx,
                notice,
                resource,
                "Deleted successfully.",
                move |admin, user| async move { admin.delete(&user, entity).await },
                || {},
            );
        }
    };

    rsx! {
        div { class: "page admin-page",
            header { class: "view-header",
                h2 { class: "view-title", "Admin Dashboard" }
                p { class: "view-subtitle", "Moderate submissions and manage the catalog." }
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
                    p { class: "admin-error", "{err.message()}" }
                },
                ViewState::Ready(data) => rsx! {
                    div { class: "tile-grid",
                        StatTile { label: "Users", value: data.stats.users }
                        StatTile { label: "Courses", value: data.stats.courses }
                        StatTile { label: "Lessons", value: data.stats.lessons }
                        StatTile { label: "Notes", value: data.stats.notes }
                        StatTile { label: "Quizzes", value: data.stats.quizzes }
                        StatTile { label: "Resources", value: data.stats.resources }
                        StatTile { label: "Subjects", value: data.stats.subjects }
                    }

                    section { class: "admin-section",
                        h3 { "Pending review" }
                        if data.pending.is_empty() {
                            p { class: "empty", "Nothing waiting for review." }
                        } else {
                            ul { class: "card-list",
                                for item in data.pending {
                                    li { class: "pending-item",
                                        span { class: "pill", "{item.kind}" }
                                        strong { "{item.title}" }
                                        span { class: "pending-detail", "{item.detail}" }
                                        if let Some(edit) = item.edit.clone() {
                                            button {
                                                class: "btn btn-secondary",
                                                r#type: "button",
                                                onclick: move |_| editing.set(Some(edit.clone())),
                                                "Edit"
                                            }
                                        }
                                        button {
                                            class: "btn btn-primary",
                                            r#type: "button",
                                            onclick: {
                                                let approve = approve.clone();
                                                let target = item.target;
                                                move |_| approve(target)
                                            },
                                            "Approve"
                                        }
                                        button {
                                            class: "btn btn-danger",
                                            r#type: "button",
                                            onclick: {
                                                let delete = delete.clone();
                                                let entity = item.entity;
                                                move |_| delete(entity)
                                            },
                                            "Delete"
                                        }
                                    }
                                }
                            }
                        }
                        if let Some((id, draft)) = editing() {
                            NoteEditForm {
                                key: "{id}",
                                notice,
                                reload: resource,
                                id,
                                draft,
                                on_close: move |()| editing.set(None),
                            }
                        }
                    }

                    section { class: "admin-section",
                        h3 { "Subjects" }
                        CatalogList { rows: data.subjects, on_delete: delete.clone() }
                        SubjectForm { notice, reload: resource }
                    }

                    section { class: "admin-section",
                        h3 { "Courses" }
                        CatalogList { rows: data.course_rows, on_delete: delete.clone() }
                        CourseForm { notice, reload: resource }
                        LessonForm { notice, reload: resource, courses: data.courses }
                    }

                    section { class: "admin-section",
                        h3 { "Quizzes & resources" }
                        QuizForm { notice, reload: resource }
                        ResourceForm { notice, reload: resource }
                    }

                    section { class: "admin-section",
                        h3 { "Users" }
                        if data.users.is_empty() {
                            p { class: "empty", "No users have signed in yet." }
                        } else {
                            table { class: "user-table",
                                thead {
                                    tr {
                                        th { "Name" }
                                        th { "Email" }
                                        th { "Role" }
                                    }
                                }
                                tbody {
                                    for row in data.users.iter() {
                                        tr { key: "{row.id}",
                                            td { "{row.name}" }
                                            td { "{row.email}" }
                                            td { "{row.role.as_str()}" }
                                        }
                                    }
                                }
                            }
                        }
                        RoleForm { notice, reload: resource, users: data.users.clone() }
                    }
                },
            }
        }
    }
}

#[component]
fn StatTile(label: &'static str, value: usize) -> Element {
    rsx! {
        div { class: "tile",
            span { class: "tile-value", "{value}" }
            span { class: "tile-label", "{label}" }
        }
    }
}

#[component]
fn CatalogList(rows: Vec<CatalogRowVm>, on_delete: EventHandler<AdminEntity>) -> Element {
    rsx! {
        if rows.is_empty() {
            p { class: "empty", "None yet." }
        } else {
            ul { class: "catalog-list",
                for row in rows {
                    li {
                        span { "{row.label}" }
                        button {
                            class: "btn btn-ghost",
                            r#type: "button",
                            onclick: move |_| on_delete.call(row.entity),
                            "Delete"
                        }
                    }
                }
            }
        }
    }
}
