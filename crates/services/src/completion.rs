use std::collections::HashSet;
use std::sync::Arc;

use aarambh_core::model::LessonId;
use storage::local::KeyValueStore;

use crate::error::CompletionError;
use crate::notice::Notice;

const KEY_PREFIX: &str = "lesson_";

fn key(lesson: LessonId) -> String {
    format!("{KEY_PREFIX}{lesson}")
}

/// New state of a lesson flag after a toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toggled {
    pub completed: bool,
    pub notice: Notice,
}

/// Per-lesson "reviewed" flags kept only on this device.
#[derive(Clone)]
pub struct CompletionService {
    store: Arc<dyn KeyValueStore>,
}

impl CompletionService {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Absent or unparseable values read as `false`.
    ///
    /// # Errors
    ///
    /// Returns `CompletionError::Storage` if the store cannot be read.
    pub fn is_completed(&self, lesson: LessonId) -> Result<bool, CompletionError> {
        Ok(self
            .store
            .get(&key(lesson))?
            .is_some_and(|v| v.trim() == "true"))
    }

    /// Flip the flag and return the new value.
    ///
    /// # Errors
    ///
    /// Returns `CompletionError::Storage` if the store cannot be read or written.
    pub fn toggle(&self, lesson: LessonId) -> Result<Toggled, CompletionError> {
        let completed = !self.is_completed(lesson)?;
        self.store
            .set(&key(lesson), if completed { "true" } else { "false" })?;
        tracing::debug!(%lesson, completed, "lesson completion toggled");

        let notice = if completed {
            Notice::success("Lesson Completed!")
        } else {
            Notice::info("Marked as incomplete")
        };
        Ok(Toggled { completed, notice })
    }

    /// Every lesson currently flagged complete.
    ///
    /// # Errors
    ///
    /// Returns `CompletionError::Storage` if the store cannot be read.
    pub fn completed_lessons(&self) -> Result<HashSet<LessonId>, CompletionError> {
        let mut done = HashSet::new();
        for k in self.store.keys_with_prefix(KEY_PREFIX)? {
            let Ok(id) = k[KEY_PREFIX.len()..].parse::<LessonId>() else {
                continue;
            };
            if self.is_completed(id)? {
                done.insert(id);
            }
        }
        Ok(done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::NoticeKind;
    use storage::local::MemoryStore;

    fn service() -> (CompletionService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (CompletionService::new(store.clone()), store)
    }

    #[test]
    fn toggle_twice_restores_original() {
        let (svc, store) = service();
        let lesson = LessonId::random();
        assert!(!svc.is_completed(lesson).unwrap());

        let first = svc.toggle(lesson).unwrap();
        assert!(first.completed);
        assert_eq!(first.notice.title, "Lesson Completed!");
        assert_eq!(first.notice.kind, NoticeKind::Success);
        assert_eq!(
            store.get(&format!("lesson_{lesson}")).unwrap().as_deref(),
            Some("true")
        );

        let second = svc.toggle(lesson).unwrap();
        assert!(!second.completed);
        assert_eq!(second.notice.title, "Marked as incomplete");
        assert!(!svc.is_completed(lesson).unwrap());
        assert_eq!(
            store.get(&format!("lesson_{lesson}")).unwrap().as_deref(),
            Some("false")
        );
    }

    #[test]
    fn reads_are_stable_and_garbage_is_false() {
        let (svc, store) = service();
        let lesson = LessonId::random();
        store.set(&format!("lesson_{lesson}"), "yes").unwrap();
        assert!(!svc.is_completed(lesson).unwrap());
        assert!(!svc.is_completed(lesson).unwrap());

        svc.toggle(lesson).unwrap();
        assert!(svc.is_completed(lesson).unwrap());
        assert!(svc.is_completed(lesson).unwrap());
    }

    #[test]
    fn completed_set_skips_foreign_keys() {
        let (svc, store) = service();
        let done = LessonId::random();
        let undone = LessonId::random();
        svc.toggle(done).unwrap();
        svc.toggle(undone).unwrap();
        svc.toggle(undone).unwrap();
        store.set("lesson_not-a-uuid", "true").unwrap();

        let set = svc.completed_lessons().unwrap();
        assert_eq!(set, HashSet::from([done]));
    }
}
