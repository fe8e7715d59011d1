use crate::models::Book;

use super::forms::{BookForm, ConfirmBookDelete, TitleInput};

/// The four top-level modes shown in the tab bar.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum CatalogMode {
    Create,
    Read,
    Update,
    Delete,
}

impl CatalogMode {
    pub(crate) const ALL: [CatalogMode; 4] = [
        CatalogMode::Create,
        CatalogMode::Read,
        CatalogMode::Update,
        CatalogMode::Delete,
    ];

    pub(crate) fn title(self) -> &'static str {
        match self {
            CatalogMode::Create => "Create",
            CatalogMode::Read => "Read",
            CatalogMode::Update => "Update",
            CatalogMode::Delete => "Delete",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            CatalogMode::Create => 0,
            CatalogMode::Read => 1,
            CatalogMode::Update => 2,
            CatalogMode::Delete => 3,
        }
    }

    pub(crate) fn from_index(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }

    pub(crate) fn next(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    pub(crate) fn previous(self) -> Self {
        Self::from_index(self.index() + Self::ALL.len() - 1)
    }
}

/// Book table plus the highlighted row.
#[derive(Default)]
pub(crate) struct ReadScreen {
    pub(crate) books: Vec<Book>,
    pub(crate) selected: usize,
}

impl ReadScreen {
    pub(crate) fn set_books(&mut self, books: Vec<Book>) {
        self.books = books;
        self.ensure_in_bounds();
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.books.is_empty() {
            return;
        }
        let len = self.books.len() as isize;
        let new = (self.selected as isize + offset).clamp(0, len - 1);
        self.selected = new as usize;
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.books.len().saturating_sub(1);
    }

    fn ensure_in_bounds(&mut self) {
        if self.selected >= self.books.len() {
            self.selected = self.books.len().saturating_sub(1);
        }
    }
}

/// Update flow: first find the book by title, then edit it.
pub(crate) enum UpdateScreen {
    Lookup(TitleInput),
    Editing {
        /// Title the book had when it was looked up; the update targets it.
        current: Book,
        form: BookForm,
    },
}

impl Default for UpdateScreen {
    fn default() -> Self {
        UpdateScreen::Lookup(TitleInput::default())
    }
}

/// Delete flow: a title prompt, optionally with a confirmation on top.
#[derive(Default)]
pub(crate) struct DeleteScreen {
    pub(crate) input: TitleInput,
    pub(crate) confirm: Option<ConfirmBookDelete>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(id: i64) -> Book {
        Book {
            id,
            title: format!("Book {id}"),
            author: "Anon".into(),
            isbn: None,
            quantity: 1,
            description: None,
        }
    }

    #[test]
    fn mode_cycle_wraps() {
        assert_eq!(CatalogMode::Delete.next(), CatalogMode::Create);
        assert_eq!(CatalogMode::Create.previous(), CatalogMode::Delete);
    }

    #[test]
    fn selection_is_clamped() {
        let mut screen = ReadScreen::default();
        screen.set_books((1..=3).map(book).collect());
        screen.move_selection(10);
        assert_eq!(screen.selected, 2);
        screen.move_selection(-10);
        assert_eq!(screen.selected, 0);

        screen.select_last();
        screen.set_books(vec![book(1)]);
        assert_eq!(screen.selected, 0);
    }
}
