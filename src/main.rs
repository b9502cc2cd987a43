//! Binary entry point: parse flags, start logging, read the catalog data once,
//! and drive the Ratatui event loop until the user exits.
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use book_catalog::{read_document, run_app, App, Catalog, Config};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Browse, filter, and sort a catalog of books in the terminal.
#[derive(Parser, Debug)]
#[command(name = "book-catalog", version)]
struct Cli {
    /// JSON file holding the array of book records.
    #[arg(long, env = "BOOK_CATALOG_DATA")]
    data: Option<PathBuf>,

    /// Prefix joined with each record's image path when resolving covers.
    #[arg(long)]
    cover_prefix: Option<String>,

    /// Log filter directive (for example `debug` or `book_catalog=trace`).
    #[arg(long)]
    log_level: Option<String>,

    /// File receiving log output. The terminal itself belongs to the UI.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

/// Send tracing output to the log file, honouring `RUST_LOG` over the flag.
fn initialize_tracing(config: &Config) -> Result<()> {
    if let Some(parent) = config.log_path.parent() {
        fs::create_dir_all(parent).context("failed to create log directory")?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)
        .with_context(|| format!("failed to open log file {}", config.log_path.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::resolve(cli.data, cli.cover_prefix, cli.log_level, cli.log_file)?;
    initialize_tracing(&config)?;

    let document = read_document(&config.data_path)
        .await
        .context("could not read the catalog")?;
    let mut catalog = Catalog::new();
    catalog
        .load_json(document)
        .context("could not load the catalog")?;

    let mut app = App::new(catalog, config);
    run_app(&mut app)
}
