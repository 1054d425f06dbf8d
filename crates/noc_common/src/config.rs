//! Daemon configuration
//!
//! Config file: /etc/nocd/config.toml or ~/.config/nocd/config.toml.
//! Every field has a default so a missing file just means defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// System-wide config path, preferred when present.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/nocd/config.toml";

/// Daemon configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NocdConfig {
    /// HTTP listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// SQLite work-order database
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Directory of solution documents (<code>.md flat files)
    #[serde(default = "default_solutions_dir")]
    pub solutions_dir: PathBuf,

    /// Rule catalog TOML; when absent the compiled-in defaults apply
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,

    /// Optical readings TOML; when absent the compiled-in table applies
    #[serde(default)]
    pub readings_path: Option<PathBuf>,

    /// tracing-subscriber env filter, e.g. "info,nocd=debug"
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_listen_addr() -> String {
    // Localhost only; the assistant sits behind the operator's tooling
    "127.0.0.1:7868".to_string()
}

fn default_database_path() -> PathBuf {
    PathBuf::from("/var/lib/nocd/work_orders.db")
}

fn default_solutions_dir() -> PathBuf {
    PathBuf::from("/var/lib/nocd/solutions")
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for NocdConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            database_path: default_database_path(),
            solutions_dir: default_solutions_dir(),
            catalog_path: None,
            readings_path: None,
            log_filter: default_log_filter(),
        }
    }
}

impl NocdConfig {
    /// Load from the first existing config path, or defaults.
    pub fn load() -> Result<Self> {
        for path in Self::candidate_paths() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }
        Ok(Self::default())
    }

    /// Load from a specific file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        let config = toml::from_str(&contents)
            .with_context(|| format!("failed to parse config: {}", path.display()))?;
        Ok(config)
    }

    fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(SYSTEM_CONFIG_PATH)];
        if let Ok(home) = std::env::var("HOME") {
            paths.push(PathBuf::from(home).join(".config/nocd/config.toml"));
        }
        paths
    }
}
