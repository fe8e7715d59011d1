//! Persistence module split across logical submodules.

mod books;
mod connection;

pub use books::{
    add_book, delete_book_by_title, fetch_all_books, find_book_by_title, isbn_exists,
    title_exists, update_book,
};
pub use connection::{close_catalog, ensure_schema, open_catalog, open_in_memory};
