//! Error taxonomy for record operations. The UI shows every variant as a
//! status message, so the `Display` output doubles as user-facing text.

use std::fmt;

use rusqlite::ErrorCode;
use thiserror::Error;

pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Debug, Error)]
pub enum CatalogError {
    /// A write would break title or ISBN uniqueness. Nothing was written.
    #[error("{0}")]
    Conflict(Conflict),

    /// No book carries the referenced title.
    #[error("Book with title '{title}' not found!")]
    NotFound { title: String },

    /// Field values rejected before touching the database.
    #[error("{0}")]
    Invalid(String),

    /// SQLite failure, tagged with what we were doing at the time.
    #[error("{context}")]
    Storage {
        context: &'static str,
        #[source]
        source: rusqlite::Error,
    },
}

impl CatalogError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }

    pub fn not_found(title: impl Into<String>) -> Self {
        Self::NotFound {
            title: title.into(),
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Which write produced a conflict. The wording differs because an update
/// is allowed to keep its own title and ISBN.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOperation {
    Add,
    Update,
}

/// Uniqueness violations detected for a single write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conflict {
    pub operation: WriteOperation,
    pub title: bool,
    pub isbn: bool,
}

impl Conflict {
    pub fn new(operation: WriteOperation, title: bool, isbn: bool) -> Self {
        Self {
            operation,
            title,
            isbn,
        }
    }

    pub fn any(&self) -> bool {
        self.title || self.isbn
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operation {
            WriteOperation::Add => {
                if self.title {
                    f.write_str("Title already exists. ")?;
                }
                if self.isbn {
                    f.write_str("ISBN already exists. ")?;
                }
                f.write_str("Please choose unique values.")
            }
            WriteOperation::Update => {
                if self.title {
                    f.write_str("New title already exists. ")?;
                }
                if self.isbn {
                    f.write_str("New ISBN already exists. ")?;
                }
                f.write_str("Please choose unique values or values that haven't changed.")
            }
        }
    }
}

/// Attach a short context string to raw SQLite errors, the typed
/// counterpart of `anyhow::Context` for the persistence layer.
pub(crate) trait StorageContext<T> {
    fn storage(self, context: &'static str) -> CatalogResult<T>;
}

impl<T> StorageContext<T> for Result<T, rusqlite::Error> {
    fn storage(self, context: &'static str) -> CatalogResult<T> {
        self.map_err(|source| CatalogError::Storage { context, source })
    }
}

/// Coerce a `UNIQUE` constraint failure on `books` into a `Conflict`. SQLite
/// names the offending column in the message (`UNIQUE constraint failed:
/// books.title`), which is the only place that detail is exposed.
pub(crate) fn map_unique_constraint(
    err: rusqlite::Error,
    operation: WriteOperation,
    context: &'static str,
) -> CatalogError {
    if !matches!(err.sqlite_error_code(), Some(ErrorCode::ConstraintViolation)) {
        return CatalogError::Storage {
            context,
            source: err,
        };
    }

    let message = err.to_string();
    let title = message.contains("books.title");
    let isbn = message.contains("books.isbn");
    if title || isbn {
        CatalogError::Conflict(Conflict::new(operation, title, isbn))
    } else {
        CatalogError::Storage {
            context,
            source: err,
        }
    }
}
