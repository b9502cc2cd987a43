use std::path::PathBuf;

use anyhow::{anyhow, Result};
use directories::BaseDirs;

use crate::models::DEFAULT_COVER_PREFIX;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".book-catalog";
/// Data file looked up inside the application data directory.
const DATA_FILE_NAME: &str = "books.json";
/// Log file written inside the application data directory.
const LOG_FILE_NAME: &str = "book-catalog.log";
/// Filter directive used when neither the CLI nor `RUST_LOG` provide one.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Resolved runtime settings. The binary fills this from command-line flags;
/// anything left unset falls back to a location under the user's home.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_path: PathBuf,
    pub cover_prefix: String,
    pub log_level: String,
    pub log_path: PathBuf,
}

impl Config {
    /// Fill in defaults for every setting the caller did not supply.
    pub fn resolve(
        data_path: Option<PathBuf>,
        cover_prefix: Option<String>,
        log_level: Option<String>,
        log_path: Option<PathBuf>,
    ) -> Result<Self> {
        let data_path = match data_path {
            Some(path) => path,
            None => data_dir()?.join(DATA_FILE_NAME),
        };
        let log_path = match log_path {
            Some(path) => path,
            None => data_dir()?.join(LOG_FILE_NAME),
        };

        Ok(Self {
            data_path,
            cover_prefix: cover_prefix.unwrap_or_else(|| DEFAULT_COVER_PREFIX.to_string()),
            log_level: log_level.unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            log_path,
        })
    }
}

/// Resolve the application data directory inside the user's home.
fn data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn explicit_settings_win() {
        let config = Config::resolve(
            Some(PathBuf::from("data/books.json")),
            Some("covers/".to_string()),
            Some("debug".to_string()),
            Some(PathBuf::from("/tmp/catalog.log")),
        )
        .expect("no defaults needed");

        assert_eq!(
            config,
            Config {
                data_path: PathBuf::from("data/books.json"),
                cover_prefix: "covers/".to_string(),
                log_level: "debug".to_string(),
                log_path: PathBuf::from("/tmp/catalog.log"),
            }
        );
    }

    #[test]
    fn unset_prefix_and_level_use_defaults() {
        let config = Config::resolve(
            Some(PathBuf::from("books.json")),
            None,
            None,
            Some(PathBuf::from("catalog.log")),
        )
        .expect("no home lookup needed");

        assert_eq!(config.cover_prefix, DEFAULT_COVER_PREFIX);
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
    }
}
