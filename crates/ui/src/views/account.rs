use dioxus::prelude::*;
use aarambh_core::model::UserSession;
use services::{AuthError, Notice};

use crate::context::AppContext;
use crate::views::notice::{NoticeBanner, show_notice};
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{EnrollmentRowVm, format_datetime, map_enrollment_rows};

#[derive(Clone, Debug, PartialEq)]
struct AccountData {
    name: Option<String>,
    enrolled: Vec<EnrollmentRowVm>,
}

#[component]
pub fn AccountView() -> Element {
    let ctx = use_context::<AppContext>();
    let notice = use_signal(|| None::<Notice>);
    // Bumped after sign-in/out so the session block re-reads the manager.
    let mut revision = use_signal(|| 0_u32);
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut busy = use_signal(|| false);

    let _ = revision();
    let sessions = ctx.sessions();
    let user = ctx.user().ok();
    let has_backend = sessions.has_backend();

    let sign_in = {
        let sessions = sessions.clone();
        move |evt: FormEvent| {
            evt.prevent_default();
            if busy() {
                return;
            }
            busy.set(true);
            let sessions = sessions.clone();
            let (e, p) = (email(), password());
            spawn(async move {
                match sessions.sign_in(&e, &p).await {
                    Ok(_) => {
                        password.set(String::new());
                        show_notice(notice, Notice::success("Signed in"));
                    }
                    Err(err @ AuthError::InvalidCredentials) => {
                        show_notice(notice, Notice::error("Sign in failed", &err));
                    }
                    Err(err) => show_notice(notice, Notice::error("Could not sign in", &err)),
                }
                busy.set(false);
                revision += 1;
            });
        }
    };

    let sign_out = {
        let sessions = sessions.clone();
        move |_: MouseEvent| {
            let sessions = sessions.clone();
            spawn(async move {
                if let Err(err) = sessions.sign_out().await {
                    show_notice(notice, Notice::error("Signed out locally", &err));
                } else {
                    show_notice(notice, Notice::info("Signed out"));
                }
                revision += 1;
            });
        }
    };

    let resend = {
        let sessions = sessions.clone();
        move |_: MouseEvent| {
            let sessions = sessions.clone();
            let e = email();
            spawn(async move {
                match sessions.resend_verification(&e).await {
                    Ok(()) => show_notice(notice, Notice::success("Verification email sent")),
                    Err(err) => show_notice(notice, Notice::error("Could not send email", &err)),
                }
            });
        }
    };

    rsx! {
        div { class: "page account-page",
            header { class: "view-header",
                h2 { class: "view-title", "Account" }
            }
            NoticeBanner { notice }
            match user {
                Some(user) => rsx! {
                    SessionDetails { user, on_sign_out: sign_out }
                },
                None if has_backend => rsx! {
                    form { class: "auth-form", onsubmit: sign_in,
                        input {
                            r#type: "email",
                            placeholder: "Email",
                            value: "{email}",
                            oninput: move |evt| email.set(evt.value()),
                        }
                        input {
                            r#type: "password",
                            placeholder: "Password",
                            value: "{password}",
                            oninput: move |evt| password.set(evt.value()),
                        }
                        button {
                            class: "btn btn-primary",
                            r#type: "submit",
                            disabled: busy(),
                            "Sign in"
                        }
                        button {
                            class: "btn btn-ghost",
                            r#type: "button",
                            onclick: resend,
                            "Resend verification email"
                        }
                    }
                },
                None => rsx! {
                    p { "You are signed out. Restart the app with a user id or configure an auth server to sign in." }
                },
            }
        }
    }
}

#[component]
fn SessionDetails(user: UserSession, on_sign_out: EventHandler<MouseEvent>) -> Element {
    let ctx = use_context::<AppContext>();
    let resource = use_resource(use_reactive!(|user| {
        let ctx = ctx.clone();
        async move {
            let profile = ctx
                .sessions()
                .profile(&user)
                .await
                .map_err(ViewError::failed)?;
            let courses = ctx.courses();
            let list = courses.list_courses().await.map_err(ViewError::failed)?;
            let enrollments = courses
                .enrollments(&user)
                .await
                .map_err(ViewError::failed)?;
            Ok::<_, ViewError>(AccountData {
                name: profile.map(|p| p.display_name()),
                enrolled: map_enrollment_rows(&list, &enrollments),
            })
        }
    }));
    let state = view_state_from_resource(&resource);

    let email_label = user.email().unwrap_or("offline profile").to_string();
    let expires = user
        .expires_at()
        .map_or_else(|| "never".to_string(), format_datetime);
    let name = match &state {
        ViewState::Ready(data) => data.name.clone(),
        _ => None,
    };
    rsx! {
        dl { class: "account-details",
            if let Some(name) = name {
                dt { "Name" }
                dd { "{name}" }
            }
            dt { "Email" }
            dd { "{email_label}" }
            dt { "Role" }
            dd { "{user.role().as_str()}" }
            dt { "User id" }
            dd { class: "mono", "{user.user_id()}" }
            dt { "Session expires" }
            dd { "{expires}" }
        }
        button {
            class: "btn btn-secondary",
            r#type: "button",
            onclick: move |evt| on_sign_out.call(evt),
            "Sign out"
        }
        section { class: "account-courses",
            h3 { "My courses" }
            match state {
                ViewState::Idle | ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Error(err) => rsx! {
                    p { "{err.message()}" }
                },
                ViewState::Ready(data) => rsx! {
                    if data.enrolled.is_empty() {
                        p { class: "empty", "You have not enrolled in any courses yet." }
                    } else {
                        ul { class: "enrollment-list",
                            for row in data.enrolled {
                                li { key: "{row.course_id}", class: "enrollment-row",
                                    span { class: "enrollment-title", "{row.title}" }
                                    progress { max: "100", value: "{row.progress}" }
                                    span { class: "enrollment-progress", "{row.progress}% · {row.status_label}" }
                                    span { class: "enrollment-date", "Enrolled {row.enrolled_label}" }
                                }
                            }
                        }
                    }
                },
            }
        }
    }
}
