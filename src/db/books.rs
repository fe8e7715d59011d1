//! Record operations over the `books` table. Uniqueness is checked up front so
//! the caller gets a conflict report naming every offending field; the
//! `UNIQUE` constraints stay in place as the final word.

use log::{info, warn};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::{
    map_unique_constraint, CatalogError, CatalogResult, Conflict, StorageContext, WriteOperation,
};
use crate::models::{Book, BookDraft};

const BOOK_COLUMNS: &str = "id, title, author, isbn, quantity, description";

fn book_from_row(row: &Row<'_>) -> rusqlite::Result<Book> {
    Ok(Book {
        id: row.get(0)?,
        title: row.get(1)?,
        author: row.get(2)?,
        isbn: row.get(3)?,
        quantity: row.get(4)?,
        description: row.get(5)?,
    })
}

/// True when a book with exactly this title is stored (case-sensitive).
pub fn title_exists(conn: &Connection, title: &str) -> CatalogResult<bool> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM books WHERE title = ?1",
            params![title],
            |row| row.get(0),
        )
        .storage("failed to check title")?;
    Ok(count > 0)
}

/// True when some book carries this ISBN. A missing or empty ISBN never
/// collides, so the query is skipped entirely.
pub fn isbn_exists(conn: &Connection, isbn: Option<&str>) -> CatalogResult<bool> {
    let Some(isbn) = isbn.filter(|v| !v.is_empty()) else {
        return Ok(false);
    };
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM books WHERE isbn = ?1",
            params![isbn],
            |row| row.get(0),
        )
        .storage("failed to check ISBN")?;
    Ok(count > 0)
}

/// Every stored book in rowid order.
pub fn fetch_all_books(conn: &Connection) -> CatalogResult<Vec<Book>> {
    let mut stmt = conn
        .prepare(&format!("SELECT {BOOK_COLUMNS} FROM books ORDER BY id"))
        .storage("failed to prepare book query")?;

    let books = stmt
        .query_map([], book_from_row)
        .storage("failed to load books")?
        .collect::<Result<Vec<_>, _>>()
        .storage("failed to collect books")?;

    Ok(books)
}

/// Look a book up by its exact title.
pub fn find_book_by_title(conn: &Connection, title: &str) -> CatalogResult<Option<Book>> {
    conn.query_row(
        &format!("SELECT {BOOK_COLUMNS} FROM books WHERE title = ?1"),
        params![title],
        book_from_row,
    )
    .optional()
    .storage("failed to look up book")
}

/// Insert a new book after both uniqueness checks pass, returning the
/// hydrated row.
pub fn add_book(conn: &Connection, draft: &BookDraft) -> CatalogResult<Book> {
    draft.validate()?;

    let conflict = Conflict::new(
        WriteOperation::Add,
        title_exists(conn, &draft.title)?,
        isbn_exists(conn, draft.isbn())?,
    );
    if conflict.any() {
        warn!(
            "event=book_add module=db status=conflict title_taken={} isbn_taken={}",
            conflict.title, conflict.isbn
        );
        return Err(CatalogError::Conflict(conflict));
    }

    conn.execute(
        "INSERT INTO books (title, author, isbn, quantity, description)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            draft.title,
            draft.author,
            draft.isbn(),
            draft.quantity,
            draft.description()
        ],
    )
    .map_err(|err| map_unique_constraint(err, WriteOperation::Add, "failed to insert book"))?;

    let id = conn.last_insert_rowid();
    info!("event=book_add module=db status=ok id={id}");
    Ok(Book {
        id,
        title: draft.title.clone(),
        author: draft.author.clone(),
        isbn: draft.isbn().map(str::to_string),
        quantity: draft.quantity,
        description: draft.description().map(str::to_string),
    })
}

/// Overwrite the book currently titled `current_title` with `draft`.
///
/// The new title may equal the current one and the new ISBN may equal the
/// record's current ISBN; only collisions with *other* books are conflicts.
/// The row is written by id, so renaming is safe.
pub fn update_book(conn: &Connection, current_title: &str, draft: &BookDraft) -> CatalogResult<Book> {
    let existing = find_book_by_title(conn, current_title)?
        .ok_or_else(|| CatalogError::not_found(current_title))?;

    draft.validate()?;

    let title_taken = draft.title != current_title && title_exists(conn, &draft.title)?;
    let isbn_taken = match draft.isbn() {
        None => false,
        Some(isbn) if existing.isbn.as_deref() == Some(isbn) => false,
        Some(isbn) => isbn_exists(conn, Some(isbn))?,
    };

    let conflict = Conflict::new(WriteOperation::Update, title_taken, isbn_taken);
    if conflict.any() {
        warn!(
            "event=book_update module=db status=conflict id={} title_taken={} isbn_taken={}",
            existing.id, conflict.title, conflict.isbn
        );
        return Err(CatalogError::Conflict(conflict));
    }

    let updated = conn
        .execute(
            "UPDATE books
             SET title = ?1, author = ?2, isbn = ?3, quantity = ?4, description = ?5
             WHERE id = ?6",
            params![
                draft.title,
                draft.author,
                draft.isbn(),
                draft.quantity,
                draft.description(),
                existing.id
            ],
        )
        .map_err(|err| map_unique_constraint(err, WriteOperation::Update, "failed to update book"))?;

    if updated == 0 {
        return Err(CatalogError::not_found(current_title));
    }

    info!("event=book_update module=db status=ok id={}", existing.id);
    Ok(Book {
        id: existing.id,
        title: draft.title.clone(),
        author: draft.author.clone(),
        isbn: draft.isbn().map(str::to_string),
        quantity: draft.quantity,
        description: draft.description().map(str::to_string),
    })
}

/// Delete every book with exactly this title and report how many went away.
/// Zero matches is a `NotFound`, so repeating a delete reports it each time.
pub fn delete_book_by_title(conn: &Connection, title: &str) -> CatalogResult<usize> {
    let deleted = conn
        .execute("DELETE FROM books WHERE title = ?1", params![title])
        .storage("failed to delete book")?;

    if deleted == 0 {
        Err(CatalogError::not_found(title))
    } else {
        info!("event=book_delete module=db status=ok rows={deleted}");
        Ok(deleted)
    }
}
