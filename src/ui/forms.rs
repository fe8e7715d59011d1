use anyhow::{anyhow, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{Book, BookDraft};

/// Fields of the book form, in focus order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub(crate) enum BookField {
    #[default]
    Title,
    Author,
    Isbn,
    Quantity,
    Description,
}

impl BookField {
    pub(crate) const ALL: [BookField; 5] = [
        BookField::Title,
        BookField::Author,
        BookField::Isbn,
        BookField::Quantity,
        BookField::Description,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            BookField::Title => "Title",
            BookField::Author => "Author",
            BookField::Isbn => "ISBN",
            BookField::Quantity => "Quantity",
            BookField::Description => "Description",
        }
    }

    fn placeholder(self) -> &'static str {
        match self {
            BookField::Title | BookField::Author | BookField::Quantity => "<required>",
            BookField::Isbn | BookField::Description => "<optional>",
        }
    }

    fn row(self) -> u16 {
        match self {
            BookField::Title => 0,
            BookField::Author => 1,
            BookField::Isbn => 2,
            BookField::Quantity => 3,
            BookField::Description => 4,
        }
    }
}

/// Editable state behind the create and update forms.
#[derive(Clone, Debug)]
pub(crate) struct BookForm {
    pub(crate) title: String,
    pub(crate) author: String,
    pub(crate) isbn: String,
    pub(crate) quantity: String,
    pub(crate) description: String,
    pub(crate) active: BookField,
    pub(crate) error: Option<String>,
}

impl Default for BookForm {
    /// Quantity starts at one, the smallest value the catalog accepts.
    fn default() -> Self {
        Self {
            title: String::new(),
            author: String::new(),
            isbn: String::new(),
            quantity: "1".to_string(),
            description: String::new(),
            active: BookField::Title,
            error: None,
        }
    }
}

impl BookForm {
    /// Prefill the form with a stored book for editing.
    pub(crate) fn from_book(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            isbn: book.isbn.clone().unwrap_or_default(),
            quantity: book.quantity.to_string(),
            description: book.description.clone().unwrap_or_default(),
            active: BookField::Title,
            error: None,
        }
    }

    pub(crate) fn next_field(&mut self) {
        self.active = match self.active {
            BookField::Title => BookField::Author,
            BookField::Author => BookField::Isbn,
            BookField::Isbn => BookField::Quantity,
            BookField::Quantity => BookField::Description,
            BookField::Description => BookField::Title,
        };
    }

    pub(crate) fn previous_field(&mut self) {
        self.active = match self.active {
            BookField::Title => BookField::Description,
            BookField::Author => BookField::Title,
            BookField::Isbn => BookField::Author,
            BookField::Quantity => BookField::Isbn,
            BookField::Description => BookField::Quantity,
        };
    }

    fn value(&self, field: BookField) -> &String {
        match field {
            BookField::Title => &self.title,
            BookField::Author => &self.author,
            BookField::Isbn => &self.isbn,
            BookField::Quantity => &self.quantity,
            BookField::Description => &self.description,
        }
    }

    fn value_mut(&mut self, field: BookField) -> &mut String {
        match field {
            BookField::Title => &mut self.title,
            BookField::Author => &mut self.author,
            BookField::Isbn => &mut self.isbn,
            BookField::Quantity => &mut self.quantity,
            BookField::Description => &mut self.description,
        }
    }

    /// Append a character to the active field. Quantity only takes digits.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        if self.active == BookField::Quantity && !ch.is_ascii_digit() {
            return false;
        }
        let active = self.active;
        self.value_mut(active).push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        let active = self.active;
        self.value_mut(active).pop();
    }

    /// Validate the inputs and return a draft ready for persistence.
    pub(crate) fn parse_inputs(&self) -> Result<BookDraft> {
        let quantity_raw = self.quantity.trim();
        if quantity_raw.is_empty() {
            return Err(anyhow!("Quantity is required."));
        }
        let quantity = quantity_raw
            .parse::<i64>()
            .map_err(|_| anyhow!("Quantity must be a whole number."))?;

        let draft = BookDraft::new(
            &self.title,
            &self.author,
            Some(&self.isbn),
            quantity,
            Some(&self.description),
        );
        draft.validate()?;
        Ok(draft)
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(&self, field: BookField) -> Line<'static> {
        let value = self.value(field);
        let is_active = self.active == field;

        let display = if value.is_empty() {
            field.placeholder().to_string()
        } else {
            value.clone()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{}: ", field.label())),
            Span::styled(display, style),
        ])
    }

    /// Cursor offset (column, row) of the active field relative to the form.
    pub(crate) fn cursor_offset(&self) -> (u16, u16) {
        let width = self.active.label().len() + 2 + self.value(self.active).chars().count();
        (u16::try_from(width).unwrap_or(u16::MAX), self.active.row())
    }
}

/// Single-line title input used to pick the book to update or delete.
#[derive(Clone, Debug, Default)]
pub(crate) struct TitleInput {
    pub(crate) value: String,
    pub(crate) error: Option<String>,
}

impl TitleInput {
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.value.push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.value.pop();
    }

    /// The title exactly as typed. Matching is exact, so surrounding spaces
    /// are only dropped when the whole input is blank.
    pub(crate) fn parse(&self) -> Result<String> {
        if self.value.trim().is_empty() {
            return Err(anyhow!("Enter the exact title of a book."));
        }
        Ok(self.value.clone())
    }

    pub(crate) fn value_len(&self) -> usize {
        self.value.chars().count()
    }
}

/// Pending deletion awaiting a yes/no answer.
#[derive(Clone, Debug)]
pub(crate) struct ConfirmBookDelete {
    pub(crate) title: String,
}
