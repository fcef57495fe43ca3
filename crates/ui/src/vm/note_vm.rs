use aarambh_core::model::{Note, NoteId};

use super::markdown_vm::excerpt;
use super::time_fmt::format_date;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NoteCardVm {
    pub id: NoteId,
    pub title: String,
    pub subject: String,
    pub excerpt: String,
    pub created_label: String,
    pub favorite: bool,
    pub archived: bool,
    pub review_label: &'static str,
    pub file_url: Option<String>,
}

/// Favorites float to the top; otherwise the incoming order is kept.
#[must_use]
pub fn map_note_cards(notes: &[Note]) -> Vec<NoteCardVm> {
    let mut cards: Vec<NoteCardVm> = notes
        .iter()
        .map(|note| NoteCardVm {
            id: note.id(),
            title: note.title().to_string(),
            subject: note.subject().to_string(),
            excerpt: excerpt(note.content(), 180),
            created_label: format_date(note.created_at()),
            favorite: note.favorite,
            archived: note.archived,
            review_label: if note.approved { "Approved" } else { "Pending review" },
            file_url: note.file_url().map(ToString::to_string),
        })
        .collect();
    cards.sort_by_key(|card| !card.favorite);
    cards
}

#[cfg(test)]
mod tests {
    use super::*;
    use aarambh_core::model::{NoteDraft, UserId};
    use aarambh_core::time::fixed_now;

    fn note(title: &str, favorite: bool) -> Note {
        let mut note = Note::new(
            NoteId::random(),
            UserId::random(),
            NoteDraft {
                title: title.into(),
                content: "Some content".into(),
                ..NoteDraft::default()
            },
            fixed_now(),
        )
        .unwrap();
        note.favorite = favorite;
        note
    }

    #[test]
    fn favorites_come_first_and_order_is_stable() {
        let cards = map_note_cards(&[note("a", false), note("b", true), note("c", false)]);
        let titles: Vec<_> = cards.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, ["b", "a", "c"]);
        assert_eq!(cards[0].subject, "General");
        assert_eq!(cards[0].review_label, "Pending review");
    }
}
