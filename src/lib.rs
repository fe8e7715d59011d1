//! Core library surface for the Library Catalog TUI application.
//!
//! The persistence layer (`db`) owns every query and the uniqueness rules;
//! `ui` is a thin Ratatui front-end that gathers field values and calls into
//! it. Both the binary and the integration tests go through these re-exports.
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod ui;

/// Storage handle lifecycle and the record operations.
pub use db::{
    add_book, close_catalog, delete_book_by_title, ensure_schema, fetch_all_books,
    find_book_by_title, isbn_exists, open_catalog, open_in_memory, title_exists, update_book,
};

pub use config::{CatalogPaths, Cli};
pub use error::{CatalogError, CatalogResult, Conflict, WriteOperation};
pub use logging::init_logging;
pub use models::{Book, BookDraft};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
