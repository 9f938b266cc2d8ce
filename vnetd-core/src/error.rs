//! Error types for the vnetd daemon
//!
//! This module defines all error types used throughout the daemon,
//! providing consistent error handling and user-friendly error messages.

use thiserror::Error;

/// Main error type for the vnetd daemon
#[derive(Error, Debug)]
pub enum VnetdError {
    /// Errors related to configuration loading/validation
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Errors related to the VNet session lifecycle
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Errors related to the daemon IPC surface
    #[error("IPC error: {0}")]
    Ipc(#[from] IpcError),

    /// Errors related to daemon process management (pid file, detach, stop)
    #[error("Daemon process error: {reason}")]
    Daemon { reason: String },

    /// Generic I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing errors
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Configuration-related errors
///
/// Covers both the operator settings file and the per-session `VnetConfig`
/// received over IPC. The `VnetConfig` variants are the rejection reasons the
/// daemon service uses when sanitizing client-supplied input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingField { field: String },

    #[error("Field {field} must be an absolute path, got: {value}")]
    RelativePath { field: String, value: String },

    #[error("Field {field} must not contain parent-directory components: {value}")]
    PathTraversal { field: String, value: String },

    #[error("Invalid IPv6 prefix: {value}")]
    InvalidIpv6Prefix { value: String },

    #[error("Invalid DNS address: {value}")]
    InvalidDnsAddr { value: String },

    #[error("Failed to load settings file: {path}")]
    LoadFailed { path: String },

    #[error("Settings validation error: {message}")]
    ValidationError { message: String },

    #[error("I/O error: {message}")]
    IoError { message: String },
}

/// VNet session lifecycle errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Control socket error: {reason}")]
    ControlSocket { reason: String },
}

/// Daemon IPC surface errors
#[derive(Error, Debug)]
pub enum IpcError {
    #[error("Failed to bind service socket: {reason}")]
    BindFailed { reason: String },

    #[error("Failed to connect to service socket: {reason}")]
    ConnectFailed { reason: String },

    #[error("Malformed IPC message: {reason}")]
    MalformedMessage { reason: String },

    #[error("Unexpected IPC response")]
    UnexpectedResponse,

    #[error("I/O error on IPC socket: {0}")]
    Io(#[from] std::io::Error),
}
