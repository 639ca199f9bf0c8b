//! Configuration loading and backend endpoint resolution
//!
//! The only external setting is the base URL of the scene service. It is
//! resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing or broken TOML file never stops the client; it is logged and
//! defaults are used instead.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Compiled default service endpoint
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8001";

/// Environment variable overriding the service endpoint
pub const BACKEND_URL_ENV: &str = "SCENELIB_BACKEND_URL";

/// Default per-request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Contents of `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Service endpoint base, e.g. `http://localhost:8001`
    #[serde(default)]
    pub backend_url: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
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

fn default_log_level() -> String {
    "info".to_string()
}

/// Platform config file location (`<config_dir>/scenelib/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("scenelib").join("config.toml"))
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML {} failed: {}", path.display(), e)))
}

/// Result of looking for the config file, without logging
///
/// Lets the binary read the log level before the subscriber exists and
/// report `problem` afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedConfig {
    pub config: TomlConfig,
    /// File the config was read from; `None` when defaults are in use
    pub source: Option<PathBuf>,
    /// Why defaults were used instead of a requested or broken file
    pub problem: Option<String>,
}

/// Locate and parse the config file, falling back to defaults
///
/// With no explicit path the platform location is tried; its absence is
/// normal and not a problem.
pub fn load_config(explicit: Option<&Path>) -> LoadedConfig {
    let (path, explicit) = match explicit {
        Some(path) => (path.to_path_buf(), true),
        None => match default_config_path() {
            Some(path) => (path, false),
            None => return LoadedConfig::default(),
        },
    };

    if !path.exists() {
        return LoadedConfig {
            problem: explicit.then(|| format!("Config file {} not found", path.display())),
            ..LoadedConfig::default()
        };
    }

    match load_toml_config(&path) {
        Ok(config) => LoadedConfig {
            config,
            source: Some(path),
            problem: None,
        },
        Err(e) => LoadedConfig {
            problem: Some(e.to_string()),
            ..LoadedConfig::default()
        },
    }
}

/// Load the config file, logging why defaults were used if they were
pub fn load_toml_config_or_default(explicit: Option<&Path>) -> TomlConfig {
    let loaded = load_config(explicit);
    match (&loaded.problem, &loaded.source) {
        (Some(problem), _) => warn!("{}; using defaults", problem),
        (None, None) => debug!("No config file, using defaults"),
        (None, Some(path)) => debug!("Loaded config from {}", path.display()),
    }
    loaded.config
}

/// Resolves the service endpoint from all configuration tiers
#[derive(Debug, Clone)]
pub struct BackendUrlResolver {
    cli_arg: Option<String>,
    env_var_name: String,
    toml: TomlConfig,
}

impl BackendUrlResolver {
    pub fn new(cli_arg: Option<&str>, toml: TomlConfig) -> Self {
        Self {
            cli_arg: cli_arg.map(str::to_string),
            env_var_name: BACKEND_URL_ENV.to_string(),
            toml,
        }
    }

    /// Use a different environment variable name (tests)
    pub fn with_env_var(mut self, name: &str) -> Self {
        self.env_var_name = name.to_string();
        self
    }

    /// Resolve the endpoint; blank values fall through to the next tier
    pub fn resolve(&self) -> String {
        // Priority 1: Command-line argument
        if let Some(url) = non_blank(self.cli_arg.as_deref()) {
            debug!(url = %url, "Backend URL from command line");
            return normalize_url(url);
        }

        // Priority 2: Environment variable
        if let Ok(url) = std::env::var(&self.env_var_name) {
            if let Some(url) = non_blank(Some(&url)) {
                debug!(url = %url, var = %self.env_var_name, "Backend URL from environment");
                return normalize_url(url);
            }
        }

        // Priority 3: TOML config file
        if let Some(url) = non_blank(self.toml.backend_url.as_deref()) {
            debug!(url = %url, "Backend URL from config file");
            return normalize_url(url);
        }

        // Priority 4: Compiled default
        DEFAULT_BACKEND_URL.to_string()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn normalize_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

/// Fully resolved client settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub backend_url: String,
    pub request_timeout: Duration,
    pub log_level: String,
}

impl ClientSettings {
    /// Resolve every setting from CLI, environment, TOML and defaults
    pub fn resolve(cli_backend_url: Option<&str>, config_path: Option<&Path>) -> Self {
        let toml = load_toml_config_or_default(config_path);
        Self::from_toml(cli_backend_url, toml)
    }

    pub fn from_toml(cli_backend_url: Option<&str>, toml: TomlConfig) -> Self {
        let request_timeout =
            Duration::from_secs(toml.request_timeout_secs.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS));
        let log_level = toml.logging.level.clone();
        let backend_url = BackendUrlResolver::new(cli_backend_url, toml).resolve();

        Self {
            backend_url,
            request_timeout,
            log_level,
        }
    }
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            log_level: default_log_level(),
        }
    }
}
