//! Domain models that mirror the `books` table. `Book` is what the database
//! hands back; `BookDraft` is what the forms hand to the record operations.
//! Optional text is kept as `Option<String>` so an empty ISBN never reaches
//! the `UNIQUE` column as `''`.

use std::fmt;

use crate::error::{CatalogError, CatalogResult};

#[derive(Debug, Clone, PartialEq, Eq)]
/// A catalog entry as stored in SQLite.
pub struct Book {
    /// Primary key assigned by SQLite. Update and delete flows never change it.
    pub id: i64,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    /// Number of copies on the shelf, at least one.
    pub quantity: i64,
    pub description: Option<String>,
}

impl Book {
    /// ISBN text for display, with the placeholder the detail panel uses.
    pub fn isbn_display(&self) -> &str {
        self.isbn.as_deref().unwrap_or("Not Available")
    }

    pub fn description_display(&self) -> &str {
        self.description.as_deref().unwrap_or("No Description")
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} by {}", self.title, self.author)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Field values for an add or update, independent of how they were entered.
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub quantity: i64,
    pub description: Option<String>,
}

impl BookDraft {
    /// Build a draft, trimming text and turning blank optional fields into
    /// `None`.
    pub fn new(
        title: &str,
        author: &str,
        isbn: Option<&str>,
        quantity: i64,
        description: Option<&str>,
    ) -> Self {
        Self {
            title: title.trim().to_string(),
            author: author.trim().to_string(),
            isbn: non_blank(isbn),
            quantity,
            description: non_blank(description),
        }
    }

    /// Reject drafts that would break the schema's required fields or the
    /// quantity floor.
    pub fn validate(&self) -> CatalogResult<()> {
        if self.title.is_empty() {
            return Err(CatalogError::invalid("Book title is required."));
        }
        if self.author.is_empty() {
            return Err(CatalogError::invalid("Author is required."));
        }
        if self.quantity < 1 {
            return Err(CatalogError::invalid("Quantity must be at least 1."));
        }
        Ok(())
    }

    /// ISBN to store and check. Blank counts as absent even when the draft
    /// was built as a struct literal.
    pub fn isbn(&self) -> Option<&str> {
        present(&self.isbn)
    }

    pub fn description(&self) -> Option<&str> {
        present(&self.description)
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_optional_fields_become_none() {
        let draft = BookDraft::new(" Dune ", "Herbert", Some("  "), 2, Some(""));
        assert_eq!(draft.title, "Dune");
        assert_eq!(draft.isbn, None);
        assert_eq!(draft.description, None);
    }

    #[test]
    fn accessors_treat_blank_literals_as_absent() {
        let draft = BookDraft {
            title: "Dune".into(),
            author: "Herbert".into(),
            isbn: Some(String::new()),
            quantity: 1,
            description: Some("  ".into()),
        };
        assert_eq!(draft.isbn(), None);
        assert_eq!(draft.description(), None);
    }

    #[test]
    fn validate_rejects_zero_quantity() {
        let draft = BookDraft::new("Dune", "Herbert", None, 0, None);
        let err = draft.validate().unwrap_err();
        assert_eq!(err.to_string(), "Quantity must be at least 1.");
    }

    #[test]
    fn validate_requires_author() {
        let draft = BookDraft::new("Dune", "   ", None, 1, None);
        assert!(matches!(draft.validate(), Err(CatalogError::Invalid(_))));
    }
}
