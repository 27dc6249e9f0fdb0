//! Configuration loading and root folder resolution
//!
//! Settings come from, highest priority first:
//! 1. Command-line arguments
//! 2. Environment variables (`TIERDEX_ROOT_FOLDER`, `TIERDEX_CONFIG`)
//! 3. TOML config file (`tierdex.toml`)
//! 4. Compiled defaults
//!
//! A missing config file is not an error; the compiled defaults describe the
//! site's standard project layout. A config file that exists but does not
//! parse is an error, since silently ignoring it would sync with the wrong
//! endpoints or paths.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Config file name looked up in the root folder and the user config dir
pub const CONFIG_FILE_NAME: &str = "tierdex.toml";

/// Environment variable overriding the project root folder
pub const ROOT_FOLDER_ENV: &str = "TIERDEX_ROOT_FOLDER";

/// Environment variable pointing at an explicit config file
pub const CONFIG_PATH_ENV: &str = "TIERDEX_CONFIG";

pub const DEFAULT_CATALOG_URL: &str =
    "https://vizualabstract.github.io/StarRailStaticAPI/db/en/characters.json";
pub const DEFAULT_ASSET_BASE_URL: &str = "https://vizualabstract.github.io/StarRailStaticAPI/assets/";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TomlConfig {
    /// Project root; relative storage paths resolve against it
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    #[serde(default)]
    pub remote: RemoteConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub sync: SyncConfig,

    #[serde(default)]
    pub retry: RetryConfig,

    /// Internal role code → display path; replaces the built-in table when set
    #[serde(default)]
    pub path_mapping: Option<BTreeMap<String, String>>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote data source settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RemoteConfig {
    #[serde(default = "default_catalog_url")]
    pub catalog_url: String,

    /// Prefix joined with each entry's relative icon / portrait path
    #[serde(default = "default_asset_base_url")]
    pub asset_base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Project-relative storage locations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default = "default_catalog_path")]
    pub catalog_path: PathBuf,

    /// Where vanished records go under the `archive` policy
    #[serde(default = "default_archive_path")]
    pub archive_path: PathBuf,

    /// Root of the icon and portrait trees
    #[serde(default = "default_assets_dir")]
    pub assets_dir: PathBuf,
}

/// What a sync does with stored records that are gone from the remote catalog
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VanishedPolicy {
    /// Move them to the archive file
    #[default]
    Archive,
    /// Drop them
    Prune,
}

/// Reconciliation behavior
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub vanished: VanishedPolicy,

    /// Stamp `lastUpdated` on every synced record, even when nothing changed
    #[serde(default)]
    pub stamp_unchanged: bool,
}

/// Bounded retry for network calls
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_base_backoff_ms")]
    pub base_backoff_ms: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_catalog_url() -> String {
    DEFAULT_CATALOG_URL.to_string()
}

fn default_asset_base_url() -> String {
    DEFAULT_ASSET_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("data/characters.json")
}

fn default_archive_path() -> PathBuf {
    PathBuf::from("data/characters.archive.json")
}

fn default_assets_dir() -> PathBuf {
    PathBuf::from("public/assets")
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_backoff_ms() -> u64 {
    250
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            catalog_url: default_catalog_url(),
            asset_base_url: default_asset_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            catalog_path: default_catalog_path(),
            archive_path: default_archive_path(),
            assets_dir: default_assets_dir(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_backoff_ms: default_base_backoff_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Storage locations resolved against the root folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePaths {
    pub catalog: PathBuf,
    pub archive: PathBuf,
    pub assets_dir: PathBuf,
}

impl StorageConfig {
    pub fn resolve(&self, root: &Path) -> StoragePaths {
        StoragePaths {
            catalog: root.join(&self.catalog_path),
            archive: root.join(&self.archive_path),
            assets_dir: root.join(&self.assets_dir),
        }
    }
}

impl TomlConfig {
    /// Parse a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        Self::parse(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }

    /// Parse config text
    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load the given file, or fall back to compiled defaults when there is none
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                Self::load(path)
            }
            None => {
                info!("No {} found, using compiled defaults", CONFIG_FILE_NAME);
                Ok(Self::default())
            }
        }
    }
}

/// Resolve the project root folder.
///
/// Priority: CLI argument → `TIERDEX_ROOT_FOLDER` → `root_folder` from the
/// config file → current directory.
pub fn resolve_root_folder(cli_arg: Option<&Path>, config: Option<&TomlConfig>) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(root) = config.and_then(|c| c.root_folder.as_ref()) {
        return root.clone();
    }

    PathBuf::from(".")
}

/// Locate the config file, if any.
///
/// Priority: CLI argument → `TIERDEX_CONFIG` → `<root>/tierdex.toml` →
/// `<user config dir>/tierdex/tierdex.toml`. Explicit paths are returned even
/// when missing so the subsequent load reports them.
pub fn resolve_config_path(cli_arg: Option<&Path>, root_hint: &Path) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    let project_config = root_hint.join(CONFIG_FILE_NAME);
    if project_config.exists() {
        return Some(project_config);
    }

    let user_config = dirs::config_dir().map(|d| d.join("tierdex").join(CONFIG_FILE_NAME));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
        debug!("No user config at {}", path.display());
    }

    None
}
