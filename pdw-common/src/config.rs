//! Bootstrap configuration loading and database path resolution
//!
//! Settings sources, highest priority first:
//! 1. Command-line argument
//! 2. Environment variable
//! 3. TOML config file (`~/.config/pdw/pdw.toml`, then `/etc/pdw/pdw.toml`)
//! 4. OS-dependent compiled default
//!
//! The TOML file only carries bootstrap concerns. A process must restart to
//! pick up changes.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable overriding the database location
pub const DATABASE_PATH_ENV: &str = "PDW_DATABASE_PATH";

/// Default file name of the warehouse database
pub const DEFAULT_DATABASE_FILE: &str = "protein_dw.db";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    /// Path to the SQLite database file
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// HTTP bind address
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Token required by `POST /admin/seed`; seeding over HTTP is refused when unset
    #[serde(default)]
    pub admin_token: Option<String>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub pricing: PricingConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            host: default_host(),
            port: default_port(),
            admin_token: None,
            logging: LoggingConfig::default(),
            pricing: PricingConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Pricing file drop configuration used by `pdw-pricing`
#[derive(Debug, Clone, Deserialize)]
pub struct PricingConfig {
    /// Directory scanned for pricing CSV files
    #[serde(default)]
    pub source_dir: Option<PathBuf>,

    #[serde(default = "default_pricing_prefix")]
    pub prefix: String,

    #[serde(default = "default_pricing_suffix")]
    pub suffix: String,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            source_dir: None,
            prefix: default_pricing_prefix(),
            suffix: default_pricing_suffix(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8600
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_pricing_prefix() -> String {
    "pricing_by_plant_".to_string()
}

fn default_pricing_suffix() -> String {
    ".csv".to_string()
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Load configuration
    ///
    /// An explicit path must exist. Without one, the platform config file is
    /// used when present, otherwise built-in defaults apply.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let path = match explicit_path {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                path.to_path_buf()
            }
            None => match find_config_file() {
                Some(path) => path,
                None => {
                    debug!("No config file found, using built-in defaults");
                    return Ok(Self::default());
                }
            },
        };

        let content = std::fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}

/// Locate the platform configuration file, user config before system config
fn find_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("pdw").join("pdw.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(unix) {
        let system_config = PathBuf::from("/etc/pdw/pdw.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Resolve the database path by priority order
pub fn resolve_database_path(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    toml_config: &TomlConfig,
) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(path) = &toml_config.database_path {
        return path.clone();
    }

    // Priority 4: OS-dependent compiled default
    default_database_path()
}

/// OS-dependent default database path
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("pdw"))
        .unwrap_or_else(|| PathBuf::from("./pdw_data"))
        .join(DEFAULT_DATABASE_FILE)
}
