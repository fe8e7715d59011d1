use std::fs;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use log::{error, info};
use rusqlite::Connection;

/// Open (or create) the catalog database at `path` and make sure the `books`
/// table exists. The returned connection is the single storage handle for the
/// lifetime of the process.
pub fn open_catalog(path: &Path) -> Result<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode=file");

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).context("failed to create data directory")?;
        }
    }

    let conn = Connection::open(path).context("failed to open SQLite database")?;
    match ensure_schema(&conn) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode=file duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!("event=db_open module=db status=error mode=file error={err:#}");
            Err(err)
        }
    }
}

/// In-memory variant used by tests and throwaway sessions.
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
    ensure_schema(&conn)?;
    info!("event=db_open module=db status=ok mode=memory");
    Ok(conn)
}

/// Create the `books` table when missing. Safe to call on every start; an
/// existing table is left untouched.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS books (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL UNIQUE,
            author TEXT NOT NULL,
            isbn TEXT UNIQUE,
            quantity INTEGER NOT NULL DEFAULT 1 CHECK (quantity >= 1),
            description TEXT
        )",
        [],
    )
    .context("failed to create books table")?;

    Ok(())
}

/// Close the storage handle, surfacing errors that a plain drop would swallow.
pub fn close_catalog(conn: Connection) -> Result<()> {
    conn.close()
        .map_err(|(_, err)| err)
        .context("failed to close SQLite database")?;
    info!("event=db_close module=db status=ok");
    Ok(())
}
