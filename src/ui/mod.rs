//! Ratatui front-end: a Create/Read/Update/Delete mode selector with one
//! form or table per mode. All persistence goes through `crate::db`.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
