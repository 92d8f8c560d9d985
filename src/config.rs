use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::store::Backend;

fn default_snapshots_file() -> String {
    "snapshots.json".to_string()
}

fn default_token_env() -> String {
    "GITHUB_TOKEN".to_string()
}

fn default_api_base() -> String {
    "https://api.github.com".to_string()
}

fn default_quote_currency() -> String {
    "usd".to_string()
}

/// SQLite backend settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SqliteConfig {
    /// Path to the database file. If relative, resolved from the config file
    /// location. Defaults to `snapshots.db`.
    pub path: Option<PathBuf>,
}

/// GitHub contents API backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    /// Repository in "owner/name" form.
    pub repo: String,

    /// Path of the snapshot file within the repository.
    pub file: String,

    /// API token. Prefer `token_env`; this exists for setups without a
    /// usable environment.
    pub token: Option<String>,

    /// Environment variable the token is read from when `token` is unset.
    pub token_env: String,

    /// Override for the API base URL.
    pub api_base: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            repo: String::new(),
            file: default_snapshots_file(),
            token: None,
            token_env: default_token_env(),
            api_base: default_api_base(),
        }
    }
}

/// Snapshot storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Which backend persists snapshots.
    pub backend: Backend,

    pub sqlite: SqliteConfig,

    pub github: GithubConfig,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Sqlite,
            sqlite: SqliteConfig::default(),
            github: GithubConfig::default(),
        }
    }
}

/// Price lookup settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PricesConfig {
    /// Quote currency for all price lookups (e.g. "usd").
    pub quote_currency: String,
}

impl Default for PricesConfig {
    fn default() -> Self {
        Self {
            quote_currency: default_quote_currency(),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the holdings document. If relative, resolved from the config
    /// file location. Defaults to `holdings.json`.
    pub holdings_path: Option<PathBuf>,

    /// Snapshot storage settings.
    pub storage: StorageConfig,

    /// Price lookup settings.
    pub prices: PricesConfig,
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load config from a file, or return default config if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

/// Returns the default config file path.
///
/// Resolution order:
/// 1. `./networth.toml` if it exists in current directory
/// 2. `~/.local/share/networth/networth.toml` (XDG data directory)
pub fn default_config_path() -> PathBuf {
    let local_config = PathBuf::from("networth.toml");
    if local_config.exists() {
        return local_config;
    }

    if let Some(data_dir) = dirs::data_dir() {
        return data_dir.join("networth").join("networth.toml");
    }

    local_config
}

/// Loaded configuration with resolved paths.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Resolved path to the holdings document.
    pub holdings_path: PathBuf,

    /// Resolved path to the SQLite database.
    pub sqlite_path: PathBuf,

    /// Snapshot storage settings.
    pub storage: StorageConfig,

    /// Price lookup settings.
    pub prices: PricesConfig,
}

impl ResolvedConfig {
    /// Load and resolve config from a file path, falling back to defaults if
    /// the file doesn't exist.
    ///
    /// Relative paths are resolved against the config file's directory.
    pub fn load_or_default(config_path: &Path) -> Result<Self> {
        let config = Config::load_or_default(config_path)?;

        let config_dir = config_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let resolve = |path: PathBuf| {
            if path.is_absolute() {
                path
            } else {
                config_dir.join(path)
            }
        };

        Ok(Self {
            holdings_path: resolve(
                config
                    .holdings_path
                    .unwrap_or_else(|| PathBuf::from("holdings.json")),
            ),
            sqlite_path: resolve(
                config
                    .storage
                    .sqlite
                    .path
                    .clone()
                    .unwrap_or_else(|| PathBuf::from("snapshots.db")),
            ),
            storage: config.storage,
            prices: config.prices,
        })
    }

    /// Resolve the GitHub API token from config or the configured
    /// environment variable. Config resolution is the only place that reads
    /// the environment; the store itself takes the token explicitly.
    pub fn github_token(&self) -> Result<SecretString> {
        if let Some(token) = &self.storage.github.token {
            return Ok(SecretString::from(token.clone()));
        }

        match std::env::var(&self.storage.github.token_env) {
            Ok(token) if !token.is_empty() => Ok(SecretString::from(token)),
            _ => bail!(
                "GitHub token not configured: set [storage.github] token or the {} environment variable",
                self.storage.github.token_env
            ),
        }
    }
}
