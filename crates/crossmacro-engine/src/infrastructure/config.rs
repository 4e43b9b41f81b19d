//! TOML-based runtime configuration for the engine binary.
//!
//! Adapted from `crossmacro-daemon::infrastructure::storage::config`: same
//! `#[serde(default)]`-per-field schema, same "missing file means defaults"
//! load behavior. Unlike the daemon's config this one resolves on all three
//! platforms, since `crossmacro-engine` (not `crossmacro-daemon`) is the
//! binary that ships to Windows and macOS.
//!
//! This is a read path only: the engine never writes this file back. Macro
//! files themselves (the `record`/`play` CLI's positional argument) are a
//! separate, user-chosen path, not part of this config.

use std::collections::HashSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,
    #[error("I/O error accessing config at {path}: {source}")]
    Io { path: PathBuf, #[source] source: std::io::Error },
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Runtime settings for the engine binary. Covers the tunables §5 leaves
/// open (ignored-key set, poll intervals, socket path override) — not a
/// macro/settings-persistence format, which stays out of scope per
/// SPEC_FULL.md's non-goals.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub position: PositionConfig,
    #[serde(default)]
    pub expansion: ExpansionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaptureConfig {
    /// evdev/VK codes never recorded, even when keyboard capture is on.
    #[serde(default)]
    pub ignored_keys: HashSet<i32>,
    /// Overrides the daemon socket path baked into `infrastructure::ipc`.
    #[serde(default)]
    pub socket_path_override: Option<String>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self { ignored_keys: HashSet::new(), socket_path_override: None }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PositionConfig {
    #[serde(default = "default_fallback_timeout_ms")]
    pub fallback_timeout_ms: u64,
}

impl Default for PositionConfig {
    fn default() -> Self {
        Self { fallback_timeout_ms: default_fallback_timeout_ms() }
    }
}

fn default_fallback_timeout_ms() -> u64 {
    2000
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExpansionConfig {
    /// Path to the dictionary TOML file, relative to the config directory
    /// unless absolute. `None` disables text expansion.
    #[serde(default)]
    pub dictionary_path: Option<String>,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self { dictionary_path: None }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { capture: CaptureConfig::default(), position: PositionConfig::default(), expansion: ExpansionConfig::default() }
    }
}

/// Resolves `${XDG_CONFIG_HOME:-$HOME/.config}/crossmacro` on Linux,
/// `%APPDATA%\CrossMacro` on Windows, `~/Library/Application
/// Support/CrossMacro` on macOS.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads [`EngineConfig`] from disk, falling back to [`EngineConfig::default`]
/// when the file doesn't exist.
pub fn load_config() -> Result<EngineConfig, ConfigError> {
    let path = config_file_path()?;
    match std::fs::read_to_string(&path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(EngineConfig::default()),
        Err(e) => Err(ConfigError::Io { path, source: e }),
    }
}

/// Directory §4.9/§6 expects compositor position-provider scripts in
/// (`${XDG_DATA_HOME:-$HOME/.local/share}/crossmacro/scripts` on Linux).
pub fn scripts_dir() -> Option<PathBuf> {
    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_DATA_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".local/share")))?;
        Some(base.join("crossmacro/scripts"))
    }
    #[cfg(not(target_os = "linux"))]
    {
        None
    }
}

fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("CrossMacro"))
    }
    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("crossmacro"))
    }
    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| PathBuf::from(h).join("Library/Application Support/CrossMacro"))
    }
    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_disables_expansion() {
        assert_eq!(EngineConfig::default().expansion.dictionary_path, None);
    }

    #[test]
    fn default_fallback_timeout_is_two_seconds() {
        assert_eq!(EngineConfig::default().position.fallback_timeout_ms, 2000);
    }

    #[test]
    fn deserializes_minimal_toml_using_defaults() {
        let cfg: EngineConfig = toml::from_str("[capture]\n[position]\n[expansion]\n").unwrap();
        assert_eq!(cfg, EngineConfig::default());
    }

    #[test]
    fn deserializes_partial_capture_override() {
        let cfg: EngineConfig = toml::from_str("[capture]\nsocket_path_override = \"/tmp/other.sock\"\n").unwrap();
        assert_eq!(cfg.capture.socket_path_override.as_deref(), Some("/tmp/other.sock"));
        assert!(cfg.capture.ignored_keys.is_empty());
    }
}
