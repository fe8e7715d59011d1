use std::collections::HashSet;

use library_catalog::{
    add_book, delete_book_by_title, fetch_all_books, find_book_by_title, isbn_exists,
    open_in_memory, title_exists, update_book, BookDraft, CatalogError, Conflict, WriteOperation,
};
use rusqlite::Connection;

fn draft(title: &str, author: &str, isbn: &str, quantity: i64, description: &str) -> BookDraft {
    BookDraft::new(title, author, Some(isbn), quantity, Some(description))
}

fn assert_unique_invariants(conn: &Connection) {
    let books = fetch_all_books(conn).unwrap();
    let mut titles = HashSet::new();
    let mut isbns = HashSet::new();
    for book in &books {
        assert!(titles.insert(book.title.clone()), "duplicate title {}", book.title);
        if let Some(isbn) = book.isbn.as_deref().filter(|v| !v.is_empty()) {
            assert!(isbns.insert(isbn.to_string()), "duplicate isbn {isbn}");
        }
        assert!(book.quantity >= 1);
    }
}

fn expect_conflict(err: CatalogError) -> Conflict {
    match err {
        CatalogError::Conflict(conflict) => conflict,
        other => panic!("expected conflict, got {other:?}"),
    }
}

#[test]
fn add_then_fetch_returns_the_record() {
    let conn = open_in_memory().unwrap();
    let added = add_book(&conn, &draft("Dune", "Herbert", "123", 2, "")).unwrap();

    let books = fetch_all_books(&conn).unwrap();
    assert_eq!(books.len(), 1);
    let book = &books[0];
    assert_eq!(book.id, added.id);
    assert!(book.id >= 1);
    assert_eq!(book.title, "Dune");
    assert_eq!(book.author, "Herbert");
    assert_eq!(book.isbn.as_deref(), Some("123"));
    assert_eq!(book.quantity, 2);
    assert_eq!(book.description, None);
    assert_unique_invariants(&conn);
}

#[test]
fn fetch_all_on_empty_store_is_empty() {
    let conn = open_in_memory().unwrap();
    assert!(fetch_all_books(&conn).unwrap().is_empty());
}

#[test]
fn fetch_all_keeps_insertion_order() {
    let conn = open_in_memory().unwrap();
    for title in ["Zed", "Alpha", "Mid"] {
        add_book(&conn, &draft(title, "Anon", "", 1, "")).unwrap();
    }
    let titles: Vec<_> = fetch_all_books(&conn)
        .unwrap()
        .into_iter()
        .map(|b| b.title)
        .collect();
    assert_eq!(titles, ["Zed", "Alpha", "Mid"]);
}

#[test]
fn duplicate_title_is_a_conflict() {
    let conn = open_in_memory().unwrap();
    add_book(&conn, &draft("Dune", "Herbert", "123", 2, "")).unwrap();

    let err = add_book(&conn, &draft("Dune", "Someone", "456", 1, "")).unwrap_err();
    let conflict = expect_conflict(err);
    assert_eq!(conflict, Conflict::new(WriteOperation::Add, true, false));
    assert_eq!(
        conflict.to_string(),
        "Title already exists. Please choose unique values."
    );

    let matching: Vec<_> = fetch_all_books(&conn)
        .unwrap()
        .into_iter()
        .filter(|b| b.title == "Dune")
        .collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0].author, "Herbert");
    assert_unique_invariants(&conn);
}

#[test]
fn duplicate_title_and_isbn_are_both_reported() {
    let conn = open_in_memory().unwrap();
    add_book(&conn, &draft("Dune", "Herbert", "123", 2, "")).unwrap();

    let conflict = expect_conflict(
        add_book(&conn, &draft("Dune", "Herbert", "123", 1, "")).unwrap_err(),
    );
    assert!(conflict.title && conflict.isbn);
    assert_eq!(fetch_all_books(&conn).unwrap().len(), 1);
}

#[test]
fn duplicate_isbn_alone_is_a_conflict() {
    let conn = open_in_memory().unwrap();
    add_book(&conn, &draft("Dune", "Herbert", "123", 2, "")).unwrap();

    let conflict = expect_conflict(
        add_book(&conn, &draft("Emma", "Austen", "123", 1, "")).unwrap_err(),
    );
    assert_eq!(conflict, Conflict::new(WriteOperation::Add, false, true));
}

#[test]
fn books_without_isbn_can_coexist() {
    let conn = open_in_memory().unwrap();
    add_book(&conn, &draft("Dune", "Herbert", "", 1, "")).unwrap();
    add_book(&conn, &draft("Emma", "Austen", "  ", 1, "")).unwrap();

    let books = fetch_all_books(&conn).unwrap();
    assert_eq!(books.len(), 2);
    assert!(books.iter().all(|b| b.isbn.is_none()));
    assert_unique_invariants(&conn);
}

#[test]
fn literal_drafts_with_empty_isbn_store_null() {
    let conn = open_in_memory().unwrap();
    let literal = |title: &str| BookDraft {
        title: title.to_string(),
        author: "Anon".to_string(),
        isbn: Some(String::new()),
        quantity: 1,
        description: Some(String::new()),
    };

    let first = add_book(&conn, &literal("Dune")).unwrap();
    assert_eq!(first.isbn, None);
    add_book(&conn, &literal("Emma")).unwrap();

    let books = fetch_all_books(&conn).unwrap();
    assert_eq!(books.len(), 2);
    assert!(books.iter().all(|b| b.isbn.is_none() && b.description.is_none()));

    update_book(&conn, "Emma", &literal("Emma")).unwrap();
    let emma = find_book_by_title(&conn, "Emma").unwrap().unwrap();
    assert_eq!(emma.isbn, None);
    assert_unique_invariants(&conn);
}

#[test]
fn invalid_drafts_are_rejected_before_writing() {
    let conn = open_in_memory().unwrap();
    let err = add_book(&conn, &draft("", "Herbert", "", 1, "")).unwrap_err();
    assert!(matches!(err, CatalogError::Invalid(_)));
    let err = add_book(&conn, &draft("Dune", "Herbert", "", 0, "")).unwrap_err();
    assert!(matches!(err, CatalogError::Invalid(_)));
    assert!(fetch_all_books(&conn).unwrap().is_empty());
}

#[test]
fn title_exists_is_exact_and_case_sensitive() {
    let conn = open_in_memory().unwrap();
    add_book(&conn, &draft("Dune", "Herbert", "", 1, "")).unwrap();

    assert!(title_exists(&conn, "Dune").unwrap());
    assert!(!title_exists(&conn, "dune").unwrap());
    assert!(!title_exists(&conn, "Dune Messiah").unwrap());
}

#[test]
fn isbn_exists_ignores_missing_values() {
    let conn = open_in_memory().unwrap();
    assert!(!isbn_exists(&conn, None).unwrap());
    assert!(!isbn_exists(&conn, Some("")).unwrap());

    add_book(&conn, &draft("Dune", "Herbert", "", 1, "")).unwrap();
    add_book(&conn, &draft("Emma", "Austen", "123", 1, "")).unwrap();
    assert!(!isbn_exists(&conn, None).unwrap());
    assert!(!isbn_exists(&conn, Some("")).unwrap());
    assert!(isbn_exists(&conn, Some("123")).unwrap());
    assert!(!isbn_exists(&conn, Some("999")).unwrap());
}

#[test]
fn update_with_unchanged_title_and_isbn_succeeds() {
    let conn = open_in_memory().unwrap();
    let added = add_book(&conn, &draft("Dune", "Herbert", "123", 2, "")).unwrap();

    let updated = update_book(&conn, "Dune", &draft("Dune", "Herbert Jr.", "123", 3, "")).unwrap();
    assert_eq!(updated.id, added.id);

    let book = find_book_by_title(&conn, "Dune").unwrap().unwrap();
    assert_eq!(book.author, "Herbert Jr.");
    assert_eq!(book.quantity, 3);
    assert_eq!(book.isbn.as_deref(), Some("123"));
    assert_unique_invariants(&conn);
}

#[test]
fn update_can_rename_and_keeps_id() {
    let conn = open_in_memory().unwrap();
    let added = add_book(&conn, &draft("Dune", "Herbert", "123", 2, "")).unwrap();

    update_book(&conn, "Dune", &draft("Dune Messiah", "Herbert", "124", 1, "sequel")).unwrap();

    assert!(find_book_by_title(&conn, "Dune").unwrap().is_none());
    let book = find_book_by_title(&conn, "Dune Messiah").unwrap().unwrap();
    assert_eq!(book.id, added.id);
    assert_eq!(book.description.as_deref(), Some("sequel"));
}

#[test]
fn update_to_another_books_title_is_a_conflict() {
    let conn = open_in_memory().unwrap();
    add_book(&conn, &draft("Dune", "Herbert", "123", 2, "")).unwrap();
    add_book(&conn, &draft("Emma", "Austen", "456", 1, "")).unwrap();

    let conflict = expect_conflict(
        update_book(&conn, "Emma", &draft("Dune", "Austen", "456", 1, "")).unwrap_err(),
    );
    assert_eq!(conflict, Conflict::new(WriteOperation::Update, true, false));
    assert_eq!(
        conflict.to_string(),
        "New title already exists. Please choose unique values or values that haven't changed."
    );

    let emma = find_book_by_title(&conn, "Emma").unwrap().unwrap();
    assert_eq!(emma.author, "Austen");
    assert_eq!(emma.isbn.as_deref(), Some("456"));
    assert_unique_invariants(&conn);
}

#[test]
fn update_to_another_books_isbn_is_a_conflict() {
    let conn = open_in_memory().unwrap();
    add_book(&conn, &draft("Dune", "Herbert", "123", 2, "")).unwrap();
    add_book(&conn, &draft("Emma", "Austen", "456", 1, "")).unwrap();

    let conflict = expect_conflict(
        update_book(&conn, "Emma", &draft("Emma", "Austen", "123", 1, "")).unwrap_err(),
    );
    assert!(!conflict.title && conflict.isbn);
}

#[test]
fn update_can_clear_isbn() {
    let conn = open_in_memory().unwrap();
    add_book(&conn, &draft("Dune", "Herbert", "123", 2, "")).unwrap();

    update_book(&conn, "Dune", &draft("Dune", "Herbert", "", 2, "")).unwrap();
    let book = find_book_by_title(&conn, "Dune").unwrap().unwrap();
    assert_eq!(book.isbn, None);
}

#[test]
fn update_of_missing_title_is_not_found() {
    let conn = open_in_memory().unwrap();
    let err = update_book(&conn, "Dune", &draft("Dune", "Herbert", "", 1, "")).unwrap_err();
    assert!(err.is_not_found());
    assert!(fetch_all_books(&conn).unwrap().is_empty());
}

#[test]
fn delete_on_empty_store_is_not_found() {
    let conn = open_in_memory().unwrap();
    let err = delete_book_by_title(&conn, "Dune").unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "Book with title 'Dune' not found!");

    // Repeating is harmless and reports the same thing.
    assert!(delete_book_by_title(&conn, "Dune").unwrap_err().is_not_found());
}

#[test]
fn delete_after_add_removes_the_record() {
    let conn = open_in_memory().unwrap();
    add_book(&conn, &draft("Dune", "Herbert", "123", 2, "")).unwrap();

    assert_eq!(delete_book_by_title(&conn, "Dune").unwrap(), 1);
    assert!(fetch_all_books(&conn).unwrap().is_empty());
    assert!(delete_book_by_title(&conn, "Dune").unwrap_err().is_not_found());
}

#[test]
fn delete_only_touches_exact_title() {
    let conn = open_in_memory().unwrap();
    add_book(&conn, &draft("Dune", "Herbert", "", 1, "")).unwrap();
    add_book(&conn, &draft("Dune Messiah", "Herbert", "", 1, "")).unwrap();

    delete_book_by_title(&conn, "Dune").unwrap();
    let books = fetch_all_books(&conn).unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].title, "Dune Messiah");
}

#[test]
fn unique_constraint_backs_up_the_precheck() {
    let conn = open_in_memory().unwrap();
    add_book(&conn, &draft("Dune", "Herbert", "123", 2, "")).unwrap();

    let err = conn
        .execute(
            "INSERT INTO books (title, author, quantity) VALUES ('Dune', 'X', 1)",
            [],
        )
        .unwrap_err();
    assert_eq!(
        err.sqlite_error_code(),
        Some(rusqlite::ErrorCode::ConstraintViolation)
    );

    let err = conn
        .execute(
            "INSERT INTO books (title, author, quantity) VALUES ('Emma', 'Austen', 0)",
            [],
        )
        .unwrap_err();
    assert_eq!(
        err.sqlite_error_code(),
        Some(rusqlite::ErrorCode::ConstraintViolation)
    );
}
