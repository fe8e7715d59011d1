use library_catalog::{
    add_book, close_catalog, ensure_schema, fetch_all_books, open_catalog, BookDraft,
};
use tempfile::TempDir;

#[test]
fn open_creates_missing_directories_and_table() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("library.sqlite");

    let conn = open_catalog(&path).unwrap();
    assert!(path.exists());
    assert!(fetch_all_books(&conn).unwrap().is_empty());
    close_catalog(conn).unwrap();
}

#[test]
fn reopening_keeps_existing_rows() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("library.sqlite");

    let conn = open_catalog(&path).unwrap();
    add_book(
        &conn,
        &BookDraft::new("Dune", "Herbert", Some("123"), 2, None),
    )
    .unwrap();
    close_catalog(conn).unwrap();

    let conn = open_catalog(&path).unwrap();
    let books = fetch_all_books(&conn).unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].title, "Dune");
    assert_eq!(books[0].id, 1);
}

#[test]
fn ensure_schema_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let conn = open_catalog(&dir.path().join("library.sqlite")).unwrap();
    ensure_schema(&conn).unwrap();
    ensure_schema(&conn).unwrap();

    let columns: Vec<String> = conn
        .prepare("SELECT name FROM pragma_table_info('books')")
        .unwrap()
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(
        columns,
        ["id", "title", "author", "isbn", "quantity", "description"]
    );
}
