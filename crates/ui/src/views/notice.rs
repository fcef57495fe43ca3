use std::time::Duration;

use dioxus::prelude::*;
use services::{Notice, NoticeKind};

const AUTO_DISMISS: Duration = Duration::from_secs(4);

/// Show `notice`, then clear it after a few seconds unless another one replaced it.
pub fn show_notice(mut slot: Signal<Option<Notice>>, notice: Notice) {
    slot.set(Some(notice.clone()));
    spawn(async move {
        tokio::time::sleep(AUTO_DISMISS).await;
        if slot.peek().as_ref() == Some(&notice) {
            slot.set(None);
        }
    });
}

#[component]
pub fn NoticeBanner(notice: Signal<Option<Notice>>) -> Element {
    let Some(current) = notice() else {
        return rsx! {};
    };
    let class = match current.kind {
        NoticeKind::Success => "notice notice--success",
        NoticeKind::Info => "notice notice--info",
        NoticeKind::Error => "notice notice--error",
    };
    rsx! {
        div { class: "{class}", role: "status",
            div { class: "notice-text",
                strong { "{current.title}" }
                if let Some(detail) = current.detail.as_ref() {
                    span { class: "notice-detail", "{detail}" }
                }
            }
            button {
                class: "notice-dismiss",
                r#type: "button",
                onclick: move |_| {
                    let mut notice = notice;
                    notice.set(None);
                },
                "Dismiss"
            }
        }
    }
}
