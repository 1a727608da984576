use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::reconcile::ReconcileConfig;
use crate::remote::aur::DEFAULT_BASE_URL;
use crate::remote::fetcher::DEFAULT_PARALLELISM;

// =============================================================================
// Time-related constants
// =============================================================================

/// Timeout for a single upstream lookup in milliseconds (30 seconds)
pub const FETCH_TIMEOUT_MS: u64 = 30_000;

/// repodiff configuration structure
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Path to the repository database; packages live next to it
    pub repository: Option<PathBuf>,
    /// Packages left out of pending and update computation
    pub ignore: Vec<String>,
    pub upstream: UpstreamConfig,
    /// False when no config file was found and defaults apply
    #[serde(skip)]
    pub configured: bool,
}

/// Upstream (AUR) configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct UpstreamConfig {
    pub enabled: bool,
    pub base_url: String,
    /// Maximum number of concurrent lookups
    pub parallelism: usize,
    /// Per-lookup timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: DEFAULT_BASE_URL.to_string(),
            parallelism: DEFAULT_PARALLELISM,
            timeout_ms: FETCH_TIMEOUT_MS,
        }
    }
}

impl Config {
    /// Parse a TOML document
    pub fn from_toml(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let mut config: Config = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.configured = true;
        Ok(config)
    }

    /// Load configuration
    ///
    /// An explicit `path` must exist. Without one the default location is
    /// tried, and a missing default file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (config_path(), false),
        };

        match std::fs::read_to_string(&path) {
            Ok(content) => {
                debug!("Loading config from {:?}", path);
                Self::from_toml(&content, &path)
            }
            Err(e) if !required && e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No config at {:?}, using defaults", path);
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io { path, source }),
        }
    }

    /// Render as TOML for display
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(self)
    }

    /// Settings for the reconciliation core
    pub fn reconcile_config(&self) -> ReconcileConfig {
        ReconcileConfig {
            parallelism: self.upstream.parallelism.max(1),
            timeout: Duration::from_millis(self.upstream.timeout_ms),
            ignore: self.ignore.iter().cloned().collect::<BTreeSet<_>>(),
            check_upstream: self.upstream.enabled,
        }
    }
}

/// Returns the path to the configuration directory for repodiff.
/// Uses $XDG_CONFIG_HOME/repodiff if XDG_CONFIG_HOME is set,
/// otherwise falls back to ~/.config/repodiff,
/// or ./repodiff if neither is available.
pub fn config_dir() -> PathBuf {
    config_dir_with_env(std::env::var("XDG_CONFIG_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the default config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

fn config_dir_with_env(xdg_config_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let config_dir = xdg_config_home
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".config")))
        .unwrap_or_else(|| PathBuf::from("."));

    config_dir.join("repodiff")
}
