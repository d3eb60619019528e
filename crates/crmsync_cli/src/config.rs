//! Configuration file support for the crmsync CLI.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (prefixed with `CRMSYNC_`, e.g., `CRMSYNC_CRM_KEY`)
//! 3. Config file (~/.config/crmsync/config.toml or ./crmsync.toml)
//! 4. Built-in defaults
//!
//! The database URL defaults to `sqlite://~/.local/state/crmsync/crmsync.db`
//! on Linux (using the XDG state directory) if not explicitly configured.
//!
//! Example config file:
//! ```toml
//! [database]
//! url = "sqlite://~/.local/state/crmsync/crmsync.db"  # optional, this is the default
//!
//! [crm]
//! url = "https://mycompany.myfreshworks.com/crm/sales/api"
//! key = "..."  # or use CRMSYNC_CRM_KEY env var
//!
//! [sync]
//! page_delay_ms = 500
//! max_pages = 10000
//! request_timeout_ms = 30000
//! resources = ["contacts", "accounts", "products", "deals", "sales_activities"]
//! ```

use std::path::PathBuf;

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::Deserialize;

use crmsync::sync::{DEFAULT_MAX_PAGES, DEFAULT_PAGE_DELAY_MS, DEFAULT_REQUEST_TIMEOUT_MS};

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// CRM endpoint configuration.
    pub crm: CrmConfig,
    /// Default sync options.
    pub sync: SyncConfig,
}

/// Database configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database connection URL.
    /// Supports sqlite:// and postgres:// schemes.
    /// Defaults to `sqlite://~/.local/state/crmsync/crmsync.db` if not specified.
    pub url: Option<String>,
}

/// CRM endpoint configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CrmConfig {
    /// API base URL (e.g. "https://mycompany.myfreshworks.com/crm/sales/api").
    /// Can also be set via the CRMSYNC_CRM_URL environment variable.
    pub url: Option<String>,
    /// API key.
    /// Can also be set via the CRMSYNC_CRM_KEY environment variable.
    pub key: Option<String>,
}

/// Default sync options.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Minimum delay between paginated requests, in milliseconds.
    pub page_delay_ms: u64,
    /// Safety bound on pages fetched per resource.
    pub max_pages: u32,
    /// Overall timeout for one page fetch, in milliseconds.
    pub request_timeout_ms: u64,
    /// Resource types to sync, by collection name. Empty means all.
    pub resources: Vec<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            page_delay_ms: DEFAULT_PAGE_DELAY_MS,
            max_pages: DEFAULT_MAX_PAGES,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            resources: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    ///
    /// Sources are loaded in order (later sources override earlier):
    /// 1. Built-in defaults
    /// 2. XDG config file (~/.config/crmsync/config.toml)
    /// 3. Local config file (./crmsync.toml)
    /// 4. Environment variables with CRMSYNC_ prefix
    pub fn load() -> Self {
        let mut builder = ConfigBuilder::builder();

        if let Some(proj_dirs) = ProjectDirs::from("", "", "crmsync") {
            let xdg_config = proj_dirs.config_dir().join("config.toml");
            if xdg_config.exists() {
                tracing::debug!("Loading config from {:?}", xdg_config);
                builder = builder.add_source(
                    File::from(xdg_config)
                        .format(FileFormat::Toml)
                        .required(false),
                );
            }
        }

        // Local config file (higher priority than XDG)
        let local_config = PathBuf::from("crmsync.toml");
        if local_config.exists() {
            tracing::debug!("Loading config from ./crmsync.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        // CRMSYNC_ prefixed environment variables,
        // e.g. CRMSYNC_CRM_KEY -> crm.key
        builder = builder.add_source(
            Environment::with_prefix("CRMSYNC")
                .separator("_")
                .try_parsing(true),
        );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<Config>() {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to deserialize config: {}", e);
                    Config::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to build config: {}", e);
                Config::default()
            }
        }
    }

    /// Get the database URL, falling back to the default state directory path.
    ///
    /// The `mode=rwc` parameter enables read-write access and creates the
    /// file if it doesn't exist.
    pub fn database_url(&self) -> Option<String> {
        self.database.url.clone().or_else(|| {
            Self::default_state_dir().map(|state_dir| {
                let db_path = state_dir.join("crmsync.db");
                format!("sqlite://{}?mode=rwc", db_path.display())
            })
        })
    }

    /// Get the default state directory path.
    ///
    /// On Linux, this is `$XDG_STATE_HOME/crmsync` or `~/.local/state/crmsync`.
    /// On macOS/Windows, falls back to the data directory.
    pub fn default_state_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "crmsync").map(|dirs| {
            dirs.state_dir()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| dirs.data_dir().to_path_buf())
        })
    }
}
