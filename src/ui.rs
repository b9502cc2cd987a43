//! Ratatui front-end: a grid of book cards with a footer summary, plus popups
//! for search, year range, and language. `App` owns the catalog and turns key
//! presses into catalog commands; `terminal` owns the event loop.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
