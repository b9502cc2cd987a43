//! Core library surface for the book catalog browser.
//!
//! The query pipeline (`models` + `catalog`) knows nothing about terminals or
//! files; `loader` feeds it and `ui` paints it. The binary wires the pieces
//! together, and tests exercise the pipeline directly.
pub mod catalog;
pub mod collation;
pub mod config;
pub mod error;
pub mod loader;
pub mod models;
pub mod ui;

/// The pipeline types the front-end and tests work with.
pub use catalog::{
    Catalog, CatalogState, Command, Filters, SortKey, YearBounds, ALL_LANGUAGES,
};

pub use config::Config;
pub use error::LoadError;
pub use loader::{read_document, records_from_value};
pub use models::{Record, RecordInput};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
