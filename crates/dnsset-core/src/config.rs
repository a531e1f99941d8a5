//! Configuration types for dnsset
//!
//! Configuration is layered:
//!
//! 1. Built-in defaults
//! 2. The TOML file (`config.toml` in the config directory, or `--config`)
//! 3. Environment overrides (`CLOUDFLARE_API_TOKEN`, `DNSSET_CADDYFILE_PATH`,
//!    `DNSSET_DEFAULT_TTL`)
//!
//! A missing file is not an error; a malformed one is.

use crate::error::{Error, Result};
use crate::reconcile::ReconcileOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable holding the Cloudflare API token
pub const ENV_API_TOKEN: &str = "CLOUDFLARE_API_TOKEN";

/// Environment variable overriding the Caddyfile path
pub const ENV_CADDYFILE_PATH: &str = "DNSSET_CADDYFILE_PATH";

/// Environment variable overriding the default TTL
pub const ENV_DEFAULT_TTL: &str = "DNSSET_DEFAULT_TTL";

/// Environment variable overriding the config directory
pub const ENV_CONFIG_DIR: &str = "DNSSET_CONFIG_DIR";

/// Config file name inside the config directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Main dnsset configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DnssetConfig {
    /// Cloudflare credentials
    pub cloudflare: CloudflareConfig,

    /// Operator preferences
    pub preferences: Preferences,

    /// Pass engine settings
    pub engine: EngineConfig,
}

impl DnssetConfig {
    /// Load configuration from `path` (or the default location) plus environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => default_config_path()?,
        };

        let mut config = Self::from_file(&path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Read a config file, falling back to defaults if it does not exist
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No config file at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(Error::config(format!(
                    "failed to read config file {}: {e}",
                    path.display()
                )));
            }
        };

        toml::from_str(&text).map_err(|e| {
            Error::config(format!("failed to parse config file {}: {e}", path.display()))
        })
    }

    /// Apply environment-style overrides
    ///
    /// # Parameters
    ///
    /// - `lookup`: Returns the value of a variable, or `None` if unset
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup(ENV_API_TOKEN).filter(|t| !t.trim().is_empty()) {
            self.cloudflare.api_token = token.trim().to_string();
        }

        if let Some(path) = lookup(ENV_CADDYFILE_PATH).filter(|p| !p.is_empty()) {
            self.preferences.caddyfile_path = PathBuf::from(path);
        }

        if let Some(ttl) = lookup(ENV_DEFAULT_TTL).filter(|t| !t.is_empty()) {
            let ttl = ttl.trim().parse::<u32>().map_err(|_| {
                Error::config(format!("{ENV_DEFAULT_TTL} must be a non-negative integer. Got: {ttl}"))
            })?;
            self.preferences.default_ttl = Some(ttl);
        }

        Ok(())
    }

    /// Write the configuration as TOML, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let text = toml::to_string_pretty(self)
            .map_err(|e| Error::config(format!("failed to serialize config: {e}")))?;
        std::fs::write(path, text)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.engine.event_channel_capacity == 0 {
            return Err(Error::config("engine.event_channel_capacity must be > 0"));
        }

        if self.preferences.caddyfile_path.as_os_str().is_empty() {
            return Err(Error::config("preferences.caddyfile_path cannot be empty"));
        }

        Ok(())
    }
}

/// Cloudflare credentials
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudflareConfig {
    /// API token with Zone:Read and DNS:Edit permissions
    /// ⚠️ NEVER log this value
    pub api_token: String,
}

impl CloudflareConfig {
    /// Whether a token has been configured
    pub fn has_token(&self) -> bool {
        !self.api_token.trim().is_empty()
    }
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for CloudflareConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareConfig")
            .field("api_token", &"<REDACTED>")
            .finish()
    }
}

/// Operator preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Default Caddyfile scanned by the Caddyfile domain source
    pub caddyfile_path: PathBuf,

    /// TTL for created/updated records; absent or 0 means automatic
    pub default_ttl: Option<u32>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            caddyfile_path: PathBuf::from(default_caddyfile_path()),
            default_ttl: None,
        }
    }
}

/// Pass engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Capacity of the pass event channel
    ///
    /// When full, new events are dropped (with a warning log).
    pub event_channel_capacity: usize,

    /// Treat a TTL difference as divergence during reconciliation
    ///
    /// Off by default: only content and proxy flag are compared.
    pub ttl_drift_triggers_update: bool,
}

impl EngineConfig {
    /// Reconciliation options derived from this configuration
    pub fn reconcile_options(&self) -> ReconcileOptions {
        ReconcileOptions {
            ttl_drift_triggers_update: self.ttl_drift_triggers_update,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            event_channel_capacity: default_event_channel_capacity(),
            ttl_drift_triggers_update: false,
        }
    }
}

fn default_caddyfile_path() -> &'static str {
    "/etc/caddy/Caddyfile"
}

fn default_event_channel_capacity() -> usize {
    256
}

/// Default config file location
///
/// `$DNSSET_CONFIG_DIR/config.toml`, else `$XDG_CONFIG_HOME/dnsset/config.toml`,
/// else `~/.config/dnsset/config.toml`.
pub fn default_config_path() -> Result<PathBuf> {
    let dir = config_dir_from(|key| std::env::var(key).ok(), dirs::home_dir())?;
    Ok(dir.join(CONFIG_FILE_NAME))
}

/// Resolve the config directory from environment-style lookups
pub fn config_dir_from<F>(lookup: F, home: Option<PathBuf>) -> Result<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(dir) = lookup(ENV_CONFIG_DIR).filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }

    if let Some(dir) = lookup("XDG_CONFIG_HOME").filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir).join("dnsset"));
    }

    home.map(|home| home.join(".config").join("dnsset"))
        .ok_or_else(|| Error::config("cannot determine home directory for the config file"))
}
