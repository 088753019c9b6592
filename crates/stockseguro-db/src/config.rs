//! # Store Configuration
//!
//! Settings the binaries read at startup.
//!
//! ## Environment Variables
//! - `STOCKSEGURO_DB_PATH`: database file (default: platform data dir)
//! - `RESET_CATALOG`: `1` replaces the catalog with the seed list
//! - `STOCKSEGURO_DEMO_EMAIL` / `STOCKSEGURO_DEMO_PIN`: demo worker login
//!
//! ## Default Database Location
//! - **macOS**: `~/Library/Application Support/com.stockseguro.pos/stockseguro.db`
//! - **Windows**: `%APPDATA%\stockseguro\pos\data\stockseguro.db`
//! - **Linux**: `~/.local/share/pos/stockseguro.db`

use directories::ProjectDirs;
use std::path::PathBuf;

use crate::error::{DbError, DbResult};
use crate::pool::DbConfig;

const DB_FILE_NAME: &str = "stockseguro.db";

/// Demo worker registered on an empty database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoWorker {
    pub rut: String,
    pub name: String,
    pub email: String,
    pub pin: String,
}

impl Default for DemoWorker {
    fn default() -> Self {
        DemoWorker {
            rut: "12.345.678-9".to_string(),
            name: "Kevin Demo".to_string(),
            email: "kevin@demo.com".to_string(),
            pin: "1234".to_string(),
        }
    }
}

/// Startup configuration for binaries.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub database_path: PathBuf,

    /// Replace the catalog instead of seeding an empty one.
    pub reset_catalog: bool,

    pub demo_worker: DemoWorker,
}

impl StoreConfig {
    /// Reads the environment, falling back to defaults.
    ///
    /// Creates the platform data directory when no path is given.
    pub fn from_env() -> DbResult<Self> {
        let database_path = match std::env::var("STOCKSEGURO_DB_PATH") {
            Ok(path) if !path.trim().is_empty() => PathBuf::from(path.trim()),
            _ => default_database_path()?,
        };

        let mut demo_worker = DemoWorker::default();
        if let Ok(email) = std::env::var("STOCKSEGURO_DEMO_EMAIL") {
            demo_worker.email = email;
        }
        if let Ok(pin) = std::env::var("STOCKSEGURO_DEMO_PIN") {
            demo_worker.pin = pin;
        }

        Ok(StoreConfig {
            database_path,
            reset_catalog: reset_requested(std::env::var("RESET_CATALOG").ok().as_deref()),
            demo_worker,
        })
    }

    /// Pool settings for the configured file.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database_path.clone())
    }
}

/// Only the exact value `1` counts.
fn reset_requested(value: Option<&str>) -> bool {
    value == Some("1")
}

fn default_database_path() -> DbResult<PathBuf> {
    let proj_dirs = ProjectDirs::from("com", "stockseguro", "pos").ok_or_else(|| {
        DbError::ConnectionFailed("Could not determine app data directory".to_string())
    })?;

    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir).map_err(|e| {
        DbError::ConnectionFailed(format!("Cannot create {}: {}", data_dir.display(), e))
    })?;

    Ok(data_dir.join(DB_FILE_NAME))
}
