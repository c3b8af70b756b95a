//! Bootstrap configuration and layered value resolution
//!
//! Resolution priority for every setting:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing or unreadable TOML file never aborts startup: it is logged and
//! the compiled defaults are used.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::{Error, Result};

/// Environment variable overriding the site output root
pub const ENV_SITE_ROOT: &str = "WYRD_SITE_ROOT";
/// Environment variable overriding the local source root
pub const ENV_SOURCE_ROOT: &str = "WYRD_SOURCE_ROOT";
/// Environment variable overriding the remote organisation
pub const ENV_ORG: &str = "WYRD_ORG";
/// Environment variable carrying the remote API token
pub const ENV_GITHUB_TOKEN: &str = "GITHUB_TOKEN";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TomlConfig {
    /// Directory `api/v1/` and `phenomena/` are generated under
    #[serde(default)]
    pub site_root: Option<PathBuf>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub sources: SourcesConfig,

    #[serde(default)]
    pub site: SiteConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
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

/// Which collection strategy produces raw documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    /// Sibling directories on the local filesystem
    #[default]
    Local,
    /// Public repositories of a remote organisation
    Remote,
}

impl std::str::FromStr for SourceMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(SourceMode::Local),
            "remote" => Ok(SourceMode::Remote),
            other => Err(Error::Config(format!("Unknown source mode: {}", other))),
        }
    }
}

/// Source collection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcesConfig {
    #[serde(default)]
    pub mode: SourceMode,

    /// Parent directory whose sub-directories are sources
    #[serde(default)]
    pub local_root: Option<PathBuf>,

    /// Remote organisation owning the source repositories
    #[serde(default = "default_org")]
    pub org: String,

    /// Directory / repository names never treated as sources
    #[serde(default = "default_excluded")]
    pub excluded: Vec<String>,

    /// File name of the raw document inside each source
    #[serde(default = "default_document")]
    pub document: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            mode: SourceMode::default(),
            local_root: None,
            org: default_org(),
            excluded: default_excluded(),
            document: default_document(),
        }
    }
}

/// Site generation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Page template; the built-in template is used when unset
    #[serde(default)]
    pub template: Option<PathBuf>,

    /// Version string stamped into artifacts
    #[serde(default = "default_version")]
    pub version: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            template: None,
            version: default_version(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_org() -> String {
    "wyrdness".to_string()
}

fn default_excluded() -> Vec<String> {
    vec![
        "wyrdness.github.io".to_string(),
        ".github".to_string(),
        ".git".to_string(),
        "node_modules".to_string(),
    ]
}

fn default_document() -> String {
    "api.json".to_string()
}

fn default_version() -> String {
    crate::model::ARTIFACT_VERSION.to_string()
}

/// Platform config file location: `{config_dir}/wyrdness/{module}.toml`
pub fn default_config_path(module_name: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("wyrdness").join(format!("{}.toml", module_name)))
}

/// Parse a TOML config file
pub fn read_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed ({}): {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))
}

/// Result of bootstrap config loading
///
/// Loading happens before the tracing subscriber exists, so a failure is
/// carried back as `warning` for the caller to log once logging is up.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedConfig {
    pub config: TomlConfig,
    /// File the config came from, when one was read successfully
    pub path: Option<PathBuf>,
    /// Why the compiled defaults are in use, when a file failed to load
    pub warning: Option<String>,
}

impl LoadedConfig {
    fn defaults(warning: Option<String>) -> Self {
        Self {
            config: TomlConfig::default(),
            path: None,
            warning,
        }
    }

    fn from_file(path: PathBuf) -> Self {
        match read_toml_config(&path) {
            Ok(config) => Self {
                config,
                path: Some(path),
                warning: None,
            },
            Err(e) => Self::defaults(Some(format!("{}; using compiled defaults", e))),
        }
    }
}

/// Load config without logging
///
/// An explicit path that fails to load, or a default file that exists but
/// does not parse, yields a warning. A missing default file is expected and
/// yields none. Every failure falls back to defaults.
pub fn try_load_toml_config(explicit: Option<&Path>, module_name: &str) -> LoadedConfig {
    if let Some(path) = explicit {
        return LoadedConfig::from_file(path.to_path_buf());
    }

    match default_config_path(module_name) {
        Some(path) if path.exists() => LoadedConfig::from_file(path),
        _ => LoadedConfig::defaults(None),
    }
}

/// Load config with graceful degradation, logging the outcome
///
/// For use once a subscriber is installed; binaries bootstrapping logging
/// from the config call [`try_load_toml_config`] instead.
pub fn load_toml_config(explicit: Option<&Path>, module_name: &str) -> TomlConfig {
    let loaded = try_load_toml_config(explicit, module_name);
    match (&loaded.warning, &loaded.path) {
        (Some(warning), _) => warn!("{}", warning),
        (None, Some(path)) => debug!("Loaded config from {}", path.display()),
        (None, None) => debug!("No config file for {}; using compiled defaults", module_name),
    }
    loaded.config
}

/// Write config atomically (temp file + rename)
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;
    crate::artifact_io::write_bytes_atomic(path, content.as_bytes())
}

/// Resolve one value through CLI → ENV → TOML → default
pub fn resolve_value<T, F>(cli: Option<T>, env_var_name: &str, toml_value: Option<T>, default: F) -> T
where
    T: From<String>,
    F: FnOnce() -> T,
{
    if let Some(value) = cli {
        return value;
    }
    if let Ok(value) = std::env::var(env_var_name) {
        if !value.trim().is_empty() {
            return T::from(value);
        }
    }
    if let Some(value) = toml_value {
        return value;
    }
    default()
}

/// Default site root: the current directory
pub fn default_site_root() -> PathBuf {
    PathBuf::from(".")
}

/// Default local source root: the parent of the current directory
pub fn default_source_root() -> PathBuf {
    PathBuf::from("..")
}
