use study_core::learn::StudyView;
use study_core::model::{Term, TermId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardFace {
    Word,
    Definition,
}

/// Everything the flashcard needs to render one term.
///
/// `flipped` is transient UI state owned by the learn page; it is not part of
/// the session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlashcardVm {
    pub term_id: TermId,
    pub word: String,
    pub definition: String,
    pub index: usize,
    pub total: usize,
    pub starred: bool,
    pub flipped: bool,
    pub can_edit: bool,
}

impl FlashcardVm {
    #[must_use]
    pub fn new(
        term: &Term,
        index: usize,
        total: usize,
        starred: bool,
        flipped: bool,
        can_edit: bool,
    ) -> Self {
        Self {
            term_id: term.id,
            word: term.word.clone(),
            definition: term.definition.clone(),
            index,
            total,
            starred,
            flipped,
            can_edit,
        }
    }

    /// Build from an interaction view; `None` for summary and completed views.
    #[must_use]
    pub fn from_view(view: &StudyView<'_>, flipped: bool, can_edit: bool) -> Option<Self> {
        match *view {
            StudyView::Interaction {
                term,
                index,
                total,
                starred,
                ..
            } => Some(Self::new(term, index, total, starred, flipped, can_edit)),
            StudyView::RoundSummary { .. } | StudyView::Completed { .. } => None,
        }
    }

    #[must_use]
    pub fn face(&self) -> CardFace {
        if self.flipped {
            CardFace::Definition
        } else {
            CardFace::Word
        }
    }

    #[must_use]
    pub fn face_label(&self) -> &'static str {
        match self.face() {
            CardFace::Word => "Term",
            CardFace::Definition => "Definition",
        }
    }

    /// Text on the visible side. Blank sides render a placeholder.
    #[must_use]
    pub fn face_text(&self) -> &str {
        let text = match self.face() {
            CardFace::Word => self.word.as_str(),
            CardFace::Definition => self.definition.as_str(),
        };
        if text.trim().is_empty() { "(empty)" } else { text }
    }

    #[must_use]
    pub fn previous_disabled(&self) -> bool {
        self.index == 0
    }

    #[must_use]
    pub fn next_disabled(&self) -> bool {
        self.index + 1 >= self.total
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.next_disabled()
    }

    #[must_use]
    pub fn progress_label(&self) -> String {
        format!("{} / {}", self.index + 1, self.total)
    }

    #[must_use]
    pub fn star_label(&self) -> &'static str {
        if self.starred { "Unstar" } else { "Star" }
    }
}
