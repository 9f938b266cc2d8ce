//! Operator settings file I/O
//!
//! Handles loading and saving the daemon's own settings (service socket and
//! pid-file locations) from a TOML file. These are distinct from the
//! per-session [`VnetConfig`](crate::config::VnetConfig), which arrives over
//! IPC.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, VnetdError};

/// Daemon settings structure
///
/// Every field is optional; unset fields fall back to runtime-directory
/// defaults via [`DaemonSettings::resolve`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaemonSettings {
    /// Path the daemon binds its IPC service socket to
    #[serde(default)]
    pub service_socket: Option<PathBuf>,

    /// Path of the daemon pid file
    #[serde(default)]
    pub pid_file: Option<PathBuf>,
}

/// Effective settings after defaults are applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSettings {
    pub service_socket: PathBuf,
    pub pid_file: PathBuf,
}

impl DaemonSettings {
    /// Load settings from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, VnetdError> {
        let contents = std::fs::read_to_string(path).map_err(|_| {
            ConfigError::LoadFailed {
                path: path.display().to_string(),
            }
        })?;

        let settings: DaemonSettings = toml::from_str(&contents).map_err(|e| {
            ConfigError::ValidationError {
                message: format!("Failed to parse settings file: {}", e),
            }
        })?;

        settings.validate()?;
        debug!("Loaded daemon settings from {}", path.display());
        Ok(settings)
    }

    /// Save settings to a TOML file
    pub fn to_file(&self, path: &Path) -> Result<(), VnetdError> {
        let contents = toml::to_string_pretty(self).map_err(|e| {
            ConfigError::ValidationError {
                message: format!("Failed to serialize settings: {}", e),
            }
        })?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConfigError::IoError {
                    message: format!("Failed to create settings directory: {}", e),
                }
            })?;
        }

        std::fs::write(path, contents).map_err(|e| {
            ConfigError::IoError {
                message: format!("Failed to write settings file: {}", e),
            }
        })?;

        Ok(())
    }

    /// Validate loaded settings
    fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("service_socket", &self.service_socket),
            ("pid_file", &self.pid_file),
        ] {
            if let Some(path) = value {
                if !path.is_absolute() {
                    return Err(ConfigError::RelativePath {
                        field: field.to_string(),
                        value: path.display().to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Apply runtime-directory defaults to any unset field
    pub fn resolve(&self) -> ResolvedSettings {
        ResolvedSettings {
            service_socket: self
                .service_socket
                .clone()
                .unwrap_or_else(default_service_socket_path),
            pid_file: self.pid_file.clone().unwrap_or_else(default_pid_file_path),
        }
    }
}

/// Get the default service socket path
pub fn default_service_socket_path() -> PathBuf {
    // Use XDG_RUNTIME_DIR if available, otherwise /tmp
    if let Ok(runtime_dir) = std::env::var("XDG_RUNTIME_DIR") {
        Path::new(&runtime_dir).join("vnetd.sock")
    } else {
        Path::new("/tmp").join(format!("vnetd-{}.sock", nix::unistd::getuid()))
    }
}

/// Get the default pid file path
pub fn default_pid_file_path() -> PathBuf {
    if let Ok(runtime_dir) = std::env::var("XDG_RUNTIME_DIR") {
        Path::new(&runtime_dir).join("vnetd.pid")
    } else {
        Path::new("/tmp").join(format!("vnetd-{}.pid", nix::unistd::getuid()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_round_trip() {
        let dir = TempDir::new().expect("failed to create temp dir");
        let path = dir.path().join("vnetd.toml");

        let settings = DaemonSettings {
            service_socket: Some(PathBuf::from("/run/vnetd/vnetd.sock")),
            pid_file: Some(PathBuf::from("/run/vnetd/vnetd.pid")),
        };
        settings.to_file(&path).expect("failed to save settings");

        let loaded = DaemonSettings::from_file(&path).expect("failed to load settings");
        assert_eq!(loaded.resolve(), settings.resolve());
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let dir = TempDir::new().expect("failed to create temp dir");
        let path = dir.path().join("vnetd.toml");
        std::fs::write(&path, "").expect("failed to write settings");

        let resolved = DaemonSettings::from_file(&path)
            .expect("empty settings file should load")
            .resolve();
        assert_eq!(resolved.service_socket, default_service_socket_path());
        assert_eq!(resolved.pid_file, default_pid_file_path());
    }

    #[test]
    fn test_relative_path_rejected() {
        let dir = TempDir::new().expect("failed to create temp dir");
        let path = dir.path().join("vnetd.toml");
        std::fs::write(&path, "service_socket = \"run/vnetd.sock\"\n")
            .expect("failed to write settings");

        assert!(DaemonSettings::from_file(&path).is_err());
    }

    #[test]
    fn test_missing_file_fails() {
        assert!(DaemonSettings::from_file(Path::new("/nonexistent/vnetd.toml")).is_err());
    }
}
