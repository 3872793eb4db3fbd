//! # Store Configuration
//!
//! Where the database lives and how the pool is sized.
//!
//! ## Load Order (later overrides earlier)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Defaults             data_dir/billbook.db, 5 connections            │
//! │  2. Config file          ~/.config/billbook/billbook.toml (Linux)       │
//! │                          ~/Library/Application Support/                 │
//! │                              com.billbook.billbook/billbook.toml        │
//! │  3. Environment          BILLBOOK_DB_PATH                               │
//! │                          BILLBOOK_MAX_CONNECTIONS                       │
//! │                          BILLBOOK_RUN_MIGRATIONS                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Config File
//! ```toml
//! db_path = "/var/lib/billbook/billbook.db"
//! max_connections = 5
//! run_migrations = true
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::pool::DbConfig;

const CONFIG_FILE: &str = "billbook.toml";
const DB_FILE: &str = "billbook.db";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BillbookConfig {
    /// SQLite database file.
    pub db_path: PathBuf,

    /// Pool size. Must be at least 1.
    pub max_connections: u32,

    /// Apply embedded migrations when the database is opened.
    pub run_migrations: bool,
}

impl Default for BillbookConfig {
    fn default() -> Self {
        BillbookConfig {
            db_path: default_db_path(),
            max_connections: 5,
            run_migrations: true,
        }
    }
}

impl BillbookConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// A missing file is not an error; an unreadable or malformed one is.
    pub fn load(config_path: Option<PathBuf>) -> DbResult<Self> {
        let mut config = match config_path.or_else(Self::default_config_path) {
            Some(path) if path.exists() => {
                info!(?path, "Loading config from file");
                Self::from_file(&path)?
            }
            Some(path) => {
                debug!(?path, "Config file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Parses one TOML file without applying overrides.
    pub fn from_file(path: &Path) -> DbResult<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| DbError::Config(format!("{}: {}", path.display(), e)))?;
        toml::from_str(&contents).map_err(|e| DbError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Writes the configuration as TOML, creating parent directories.
    pub fn save(&self, path: &Path) -> DbResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| DbError::Config(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self).map_err(|e| DbError::Config(e.to_string()))?;
        std::fs::write(path, contents).map_err(|e| DbError::Config(e.to_string()))?;

        info!(?path, "Config saved");
        Ok(())
    }

    pub fn validate(&self) -> DbResult<()> {
        if self.db_path.as_os_str().is_empty() {
            return Err(DbError::Config("db_path must not be empty".into()));
        }

        if self.max_connections == 0 {
            return Err(DbError::Config(
                "max_connections must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Pool settings for [`Database::new`](crate::pool::Database::new).
    pub fn to_db_config(&self) -> DbConfig {
        DbConfig::new(&self.db_path)
            .max_connections(self.max_connections)
            .run_migrations(self.run_migrations)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("BILLBOOK_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.db_path = PathBuf::from(path);
        }

        if let Ok(max) = std::env::var("BILLBOOK_MAX_CONNECTIONS") {
            match max.parse::<u32>() {
                Ok(n) => self.max_connections = n,
                Err(_) => warn!(value = %max, "Ignoring invalid BILLBOOK_MAX_CONNECTIONS"),
            }
        }

        if let Ok(run) = std::env::var("BILLBOOK_RUN_MIGRATIONS") {
            match run.to_lowercase().as_str() {
                "1" | "true" | "yes" => self.run_migrations = true,
                "0" | "false" | "no" => self.run_migrations = false,
                _ => warn!(value = %run, "Ignoring invalid BILLBOOK_RUN_MIGRATIONS"),
            }
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "billbook", "billbook")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }
}

fn default_db_path() -> PathBuf {
    directories::ProjectDirs::from("com", "billbook", "billbook")
        .map(|dirs| dirs.data_dir().join(DB_FILE))
        .unwrap_or_else(|| PathBuf::from(DB_FILE))
}
