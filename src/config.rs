//! Command-line configuration. The only knob is where the catalog lives; the
//! log directory is derived from it.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Parser;
use directories::BaseDirs;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".library-catalog";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "library.sqlite";
const LOG_DIR_NAME: &str = "logs";

#[derive(Debug, Parser)]
#[command(name = "library-catalog", version, about = "Terminal catalog for a small library")]
pub struct Cli {
    /// Path to the SQLite catalog file
    #[arg(long, value_name = "PATH")]
    pub db: Option<PathBuf>,
}

/// Resolved on-disk locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogPaths {
    pub db_path: PathBuf,
    pub log_dir: PathBuf,
}

impl CatalogPaths {
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let db_path = match &cli.db {
            Some(path) => path.clone(),
            None => default_db_path()?,
        };
        Ok(Self::for_db(db_path))
    }

    /// Logs sit in a `logs/` folder beside the database file.
    pub fn for_db(db_path: PathBuf) -> Self {
        let log_dir = db_path
            .parent()
            .map(|parent| parent.join(LOG_DIR_NAME))
            .unwrap_or_else(|| PathBuf::from(LOG_DIR_NAME));
        Self { db_path, log_dir }
    }
}

/// Resolve the absolute path to the SQLite database inside the user's home.
fn default_db_path() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME).join(DB_FILE_NAME))
}
