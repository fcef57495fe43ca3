use dioxus::prelude::*;

use std::fmt::Display;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewError {
    SignedOut,
    Forbidden,
    NotFound,
    EmptyQuiz,
    /// The action is not allowed right now; shown as is.
    Invalid(String),
    /// A service call failed; carries its message.
    Failed(String),
    Unknown,
}

impl ViewError {
    pub fn failed<E: Display>(err: E) -> Self {
        Self::Failed(err.to_string())
    }

    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::SignedOut => "Please sign in to continue.".to_string(),
            Self::Forbidden => "Only admins can open this page.".to_string(),
            Self::NotFound => "That item no longer exists.".to_string(),
            Self::EmptyQuiz => "This quiz has no questions yet.".to_string(),
            Self::Invalid(reason) => capitalize(reason),
            Self::Failed(reason) => format!("Something went wrong: {reason}"),
            Self::Unknown => "Something went wrong. Please try again.".to_string(),
        }
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[derive(Clone, Debug, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Ready(T),
    Error(ViewError),
}

#[must_use]
pub fn view_state_from_resource<T: Clone>(
    resource: &Resource<Result<T, ViewError>>,
) -> ViewState<T> {
    match resource.state().cloned() {
        UseResourceState::Pending => ViewState::Loading,
        UseResourceState::Ready => match resource.value().read().as_ref() {
            Some(Ok(data)) => ViewState::Ready(data.clone()),
            Some(Err(err)) => ViewState::Error(err.clone()),
            None => ViewState::Error(ViewError::Unknown),
        },
        UseResourceState::Paused | UseResourceState::Stopped => ViewState::Idle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_keep_their_reason() {
        let err = ViewError::failed("database is locked");
        assert_eq!(err.message(), "Something went wrong: database is locked");
        assert_eq!(ViewError::EmptyQuiz.message(), "This quiz has no questions yet.");
        assert_eq!(
            ViewError::Invalid("select an answer first".into()).message(),
            "Select an answer first"
        );
    }
}
