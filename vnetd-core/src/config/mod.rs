//! Configuration module
//!
//! Defines the per-session `VnetConfig` received over IPC from the
//! unprivileged client, and the operator-facing daemon settings file.

use std::net::{IpAddr, Ipv6Addr};
use std::path::{Component, Path};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub mod settings;

/// VNet session configuration
///
/// Supplied once per daemon process by the unprivileged client. The first
/// accepted config wins; it is never re-validated or re-applied on later
/// start requests. All four fields are required and cross a privilege
/// boundary, so they are sanitized before any session is spawned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VnetConfig {
    /// Path of the control socket owned by the client; the daemon connects
    /// to it and treats EOF as the session stop condition
    pub socket_path: String,

    /// IPv6 prefix assigned to the virtual interface, e.g. "fd60:627a:a5b3::"
    /// or "fd60:627a:a5b3::/64"
    pub ipv6_prefix: String,

    /// Address DNS queries are routed to through the virtual interface
    pub dns_addr: String,

    /// Base directory for daemon-local state
    pub home_path: String,
}

impl VnetConfig {
    /// Create a new VNet configuration
    pub fn new(socket_path: String, ipv6_prefix: String, dns_addr: String, home_path: String) -> Self {
        Self {
            socket_path,
            ipv6_prefix,
            dns_addr,
            home_path,
        }
    }

    /// Validate the configuration
    ///
    /// Called by the daemon service boundary before a session slot is
    /// consumed. Client input is untrusted: paths must be absolute and free
    /// of parent-directory components, and the address fields must parse.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_path_field("socket_path", &self.socket_path)?;
        validate_path_field("home_path", &self.home_path)?;
        validate_ipv6_prefix(&self.ipv6_prefix)?;
        validate_dns_addr(&self.dns_addr)?;
        Ok(())
    }
}

fn validate_path_field(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::MissingField {
            field: field.to_string(),
        });
    }

    let path = Path::new(value);
    if !path.is_absolute() {
        return Err(ConfigError::RelativePath {
            field: field.to_string(),
            value: value.to_string(),
        });
    }

    if path.components().any(|c| matches!(c, Component::ParentDir)) {
        return Err(ConfigError::PathTraversal {
            field: field.to_string(),
            value: value.to_string(),
        });
    }

    Ok(())
}

/// Validate an IPv6 prefix of the form "addr" or "addr/len"
fn validate_ipv6_prefix(value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::MissingField {
            field: "ipv6_prefix".to_string(),
        });
    }

    let invalid = || ConfigError::InvalidIpv6Prefix {
        value: value.to_string(),
    };

    let (addr, len) = match value.split_once('/') {
        Some((addr, len)) => (addr, Some(len)),
        None => (value, None),
    };

    addr.parse::<Ipv6Addr>().map_err(|_| invalid())?;

    if let Some(len) = len {
        let len: u8 = len.parse().map_err(|_| invalid())?;
        if len == 0 || len > 128 {
            return Err(invalid());
        }
    }

    Ok(())
}

fn validate_dns_addr(value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::MissingField {
            field: "dns_addr".to_string(),
        });
    }

    value
        .parse::<IpAddr>()
        .map(|_| ())
        .map_err(|_| ConfigError::InvalidDnsAddr {
            value: value.to_string(),
        })
}
