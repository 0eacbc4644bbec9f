//! Registry configuration via `vexdb.toml`
//!
//! On first open, a default `vexdb.toml` is written into the data directory.
//! To change settings, edit the file and restart.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use vexdb_core::{RegistryError, RegistryResult};

/// Config file name placed in the registry data directory.
pub const CONFIG_FILE_NAME: &str = "vexdb.toml";

/// Where collection storage is allocated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    /// Process memory only; nothing survives a restart
    Memory,
    /// One directory per collection under the data directory
    Disk,
}

/// Logging settings, the `[log]` section of `vexdb.toml`.
///
/// `RUST_LOG` takes precedence over `level` when set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogConfig {
    /// Filter directive, e.g. `"info"` or `"vexdb=debug,info"`
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit ANSI colors
    #[serde(default)]
    pub color: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            color: false,
        }
    }
}

/// Registry configuration loaded from `vexdb.toml`.
///
/// # Example
///
/// ```toml
/// storage = "disk"
/// lock_timeout_ms = 30000
///
/// [log]
/// level = "info"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Storage mode: `"disk"` or `"memory"`.
    #[serde(default = "default_storage_str")]
    pub storage: String,
    /// Maximum time a create/drop waits for another mutation on the same
    /// name. Unset means wait indefinitely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_timeout_ms: Option<u64>,
    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,
}

fn default_storage_str() -> String {
    "disk".to_string()
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            storage: default_storage_str(),
            lock_timeout_ms: None,
            log: LogConfig::default(),
        }
    }
}

impl RegistryConfig {
    /// Config for a memory-backed registry, mostly useful in tests.
    pub fn in_memory() -> Self {
        Self {
            storage: "memory".to_string(),
            ..Self::default()
        }
    }

    /// Parse the storage string into a `StorageMode`.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not `"disk"` or `"memory"`.
    pub fn storage_mode(&self) -> RegistryResult<StorageMode> {
        match self.storage.as_str() {
            "disk" => Ok(StorageMode::Disk),
            "memory" => Ok(StorageMode::Memory),
            other => Err(RegistryError::Config(format!(
                "Invalid storage mode '{}' in {}. Expected \"disk\" or \"memory\".",
                other, CONFIG_FILE_NAME
            ))),
        }
    }

    /// Per-name lock timeout, if configured.
    pub fn lock_timeout(&self) -> Option<Duration> {
        self.lock_timeout_ms.map(Duration::from_millis)
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# VexDB collection registry configuration
#
# Storage mode: "disk" (default) or "memory"
#   "disk"   = one directory per collection, reloaded on restart
#   "memory" = nothing survives a restart
storage = "disk"

# Maximum time (ms) a create or drop waits for another in-flight mutation
# on the same collection name before failing as busy.
# Unset = wait indefinitely.
# lock_timeout_ms = 30000

[log]
# Filter directive; RUST_LOG overrides it when set.
level = "info"
color = false
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> RegistryResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RegistryError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: RegistryConfig = toml::from_str(&content).map_err(|e| {
            RegistryError::Config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        // Validate the storage value eagerly
        config.storage_mode()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> RegistryResult<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                RegistryError::Config(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> RegistryResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| RegistryError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            RegistryError::Config(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}
