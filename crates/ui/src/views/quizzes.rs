use aarambh_core::model::AnswerOption;
use dioxus::prelude::*;
use services::{AttemptPersistence, Notice, NoticeKind};

use crate::context::AppContext;
use crate::views::home::SignedOutNotice;
use crate::views::notice::{NoticeBanner, show_notice};
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{QuestionVm, QuizPhase, QuizSetCardVm, QuizVm, ResultVm, map_quiz_set_cards, start_quiz};

#[derive(Clone, Debug, PartialEq)]
struct QuizzesData {
    sets: Vec<QuizSetCardVm>,
}

fn save_failed(reason: &str) -> Notice {
    Notice {
        kind: NoticeKind::Error,
        title: "Your score could not be saved".to_string(),
        detail: Some(reason.to_string()),
    }
}

#[component]
pub fn QuizzesView() -> Element {
    let ctx = use_context::<AppContext>();
    let notice = use_signal(|| None::<Notice>);
    let mut active = use_signal(|| None::<QuizVm>);
    let mut busy = use_signal(|| false);

    let ctx_for_resource = ctx.clone();
    let resource = use_resource(move || {
        let ctx = ctx_for_resource.clone();
        async move {
            ctx.user()?;
            let sets = ctx
                .quizzes()
                .list_sets()
                .await
                .map_err(ViewError::failed)?;
            Ok(QuizzesData {
                sets: map_quiz_set_cards(&sets),
            })
        }
    });
    let state = view_state_from_resource(&resource);

    let start = {
        let ctx = ctx.clone();
        move |subject: String| {
            let workflow = ctx.quizzes();
            spawn(async move {
                match start_quiz(&workflow, &subject).await {
                    Ok(vm) => active.set(Some(vm)),
                    Err(err) => show_notice(notice, Notice::info(err.message())),
                }
            });
        }
    };

    let advance = {
        let ctx = ctx.clone();
        move |()| {
            if busy() {
                return;
            }
            let Some(mut vm) = active() else {
                return;
            };
            let workflow = ctx.quizzes();
            let user = match ctx.user() {
                Ok(user) => user,
                Err(err) => {
                    show_notice(notice, Notice::info(err.message()));
                    return;
                }
            };
            busy.set(true);
            spawn(async move {
                match vm.advance(&workflow, &user).await {
                    Ok(true) => {
                        if let QuizPhase::Results(result) = vm.phase() {
                            let finished = Notice::success("Quiz completed!")
                                .with_detail(format!("You scored {}", result.score_label));
                            show_notice(notice, finished);
                        }
                    }
                    Ok(false) => {}
                    Err(err) => show_notice(notice, Notice::info(err.message())),
                }
                replace_run(active, vm);
                busy.set(false);
            });
        }
    };

    let retry_save = {
        let ctx = ctx.clone();
        move |()| {
            if busy() {
                return;
            }
            let Some(mut vm) = active() else {
                return;
            };
            let workflow = ctx.quizzes();
            let Ok(user) = ctx.user() else {
                return;
            };
            busy.set(true);
            spawn(async move {
                match vm.retry_save(&workflow, &user).await {
                    Ok(AttemptPersistence::Saved { .. }) => {
                        show_notice(notice, Notice::success("Attempt saved"));
                    }
                    Ok(AttemptPersistence::InProgress) => {}
                    Ok(AttemptPersistence::Failed { reason }) => {
                        show_notice(notice, save_failed(&reason));
                    }
                    Err(err) => show_notice(notice, Notice::info(err.message())),
                }
                replace_run(active, vm);
                busy.set(false);
            });
        }
    };

    let current = active();

    rsx! {
        div { class: "page quizzes-page",
            header { class: "view-header",
                h2 { class: "view-title", "Quizzes" }
                p { class: "view-subtitle", "Test yourself one subject at a time." }
            }
            NoticeBanner { notice }
            if let Some(vm) = current {
                QuizPanel {
                    subject: vm.subject().to_string(),
                    phase: vm.phase(),
                    busy: busy(),
                    on_select: move |option: AnswerOption| {
                        let outcome = active.write().as_mut().map(|vm| vm.select(option));
                        if let Some(Err(err)) = outcome {
                            show_notice(notice, Notice::info(err.message()));
                        }
                    },
                    on_advance: advance,
                    on_retry_save: retry_save,
                    on_retake: move |()| {
                        if busy() {
                            return;
                        }
                        if let Some(vm) = active.write().as_mut() {
                            vm.retake();
                        }
                    },
                    on_close: move |()| active.set(None),
                }
            } else {
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
                        if data.sets.is_empty() {
                            p { class: "empty", "No quizzes available yet." }
                        } else {
                            ul { class: "card-list",
                                for set in data.sets {
                                    li { key: "{set.subject}", class: "quiz-card",
                                        h3 { "{set.subject}" }
                                        span { class: "quiz-count", "{set.questions_label}" }
                                        button {
                                            class: "btn btn-primary",
                                            r#type: "button",
                                            onclick: {
                                                let start = start.clone();
                                                let subject = set.subject.clone();
                                                move |_| start(subject.clone())
                                            },
                                            "Start Quiz"
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
}

/// Put `vm` back only if the user still has the same run open.
fn replace_run(mut active: Signal<Option<QuizVm>>, vm: QuizVm) {
    let mut slot = active.write();
    if let Some(current) = slot.as_mut().filter(|current| current.run_id() == vm.run_id()) {
        *current = vm;
    }
}

#[component]
fn QuizPanel(
    subject: String,
    phase: QuizPhase,
    busy: bool,
    on_select: EventHandler<AnswerOption>,
    on_advance: EventHandler<()>,
    on_retry_save: EventHandler<()>,
    on_retake: EventHandler<()>,
    on_close: EventHandler<()>,
) -> Element {
    rsx! {
        section { class: "quiz-panel",
            div { class: "quiz-panel-header",
                h3 { "{subject}" }
                button {
                    class: "btn btn-secondary",
                    r#type: "button",
                    onclick: move |_| on_close.call(()),
                    "Back to quizzes"
                }
            }
            match phase {
                QuizPhase::Question(question) => rsx! {
                    QuestionCard { question, busy, on_select, on_advance }
                },
                QuizPhase::Results(result) => rsx! {
                    ResultCard { result, busy, on_retry_save, on_retake }
                },
            }
        }
    }
}

#[component]
fn QuestionCard(
    question: QuestionVm,
    busy: bool,
    on_select: EventHandler<AnswerOption>,
    on_advance: EventHandler<()>,
) -> Element {
    rsx! {
        div { class: "quiz-question",
            p { class: "quiz-position", "{question.position_label}" }
            h4 { "{question.question}" }
            div { class: "quiz-options",
                for choice in question.options {
                    button {
                        key: "{choice.letter}",
                        class: "quiz-option",
                        class: if choice.selected { "quiz-option--selected" },
                        r#type: "button",
                        onclick: move |_| on_select.call(choice.option),
                        span { class: "quiz-option-letter", "{choice.letter}" }
                        span { "{choice.text}" }
                    }
                }
            }
            button {
                class: "btn btn-primary",
                r#type: "button",
                disabled: busy || !question.can_advance,
                onclick: move |_| on_advance.call(()),
                "{question.advance_label}"
            }
        }
    }
}

#[component]
fn ResultCard(
    result: ResultVm,
    busy: bool,
    on_retry_save: EventHandler<()>,
    on_retake: EventHandler<()>,
) -> Element {
    rsx! {
        div { class: "quiz-result",
            h4 { "Quiz completed!" }
            p { class: "quiz-score", "{result.score_label}" }
            p { class: "quiz-detail", "{result.detail}" }
            p { class: "quiz-saved", "{result.saved_label}" }
            div { class: "quiz-result-actions",
                if result.can_retry_save {
                    button {
                        class: "btn btn-secondary",
                        r#type: "button",
                        disabled: busy,
                        onclick: move |_| on_retry_save.call(()),
                        "Retry save"
                    }
                }
                button {
                    class: "btn btn-primary",
                    r#type: "button",
                    disabled: busy,
                    onclick: move |_| on_retake.call(()),
                    "Retake Quiz"
                }
            }
        }
    }
}
