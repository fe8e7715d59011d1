//! Binary entry point: resolve paths, start file logging, open the catalog,
//! and drive the Ratatui event loop until the user exits.
use anyhow::Result;
use clap::Parser;
use library_catalog::{close_catalog, init_logging, open_catalog, run_app, App, CatalogPaths, Cli};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let paths = CatalogPaths::resolve(&cli)?;

    // A broken log directory should not keep the catalog from opening.
    let _logger = match init_logging(&paths.log_dir) {
        Ok(handle) => Some(handle),
        Err(err) => {
            eprintln!("warning: logging disabled: {err:#}");
            None
        }
    };

    let conn = open_catalog(&paths.db_path)?;
    let mut app = App::new(conn)?;
    let result = run_app(&mut app);

    close_catalog(app.into_connection())?;
    log::info!("event=app_exit module=core status=ok");
    result
}
