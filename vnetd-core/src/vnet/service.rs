//! VNet service boundary
//!
//! The packet-forwarding engine behind the virtual interface is an external
//! collaborator; this module pins down the one thing the lifecycle core needs
//! from it: a blocking run loop whose return is the session stop condition.

use std::io::Read;
use std::os::unix::net::UnixStream;

use tracing::{debug, info, warn};

use crate::config::VnetConfig;
use crate::error::SessionError;

/// The network servicing loop handed off to the background thread
///
/// `run` blocks for the lifetime of the session and returns when the session
/// is over. An `Err` return means the session could not be established or
/// died abnormally; either way the lifecycle manager reacts identically by
/// stopping and exiting the process.
pub trait VnetService: Send + Sync + 'static {
    fn run(&self, config: &VnetConfig) -> Result<(), SessionError>;
}

/// Production service: watch the client's control socket
///
/// The unprivileged client owns the control socket named by
/// `VnetConfig::socket_path`. The daemon connects to it and services the
/// session until the client side reaches EOF; the client disappearing is the
/// stop condition. A failure to connect surfaces as a failed session.
#[derive(Debug, Default)]
pub struct ControlSocketService;

impl VnetService for ControlSocketService {
    fn run(&self, config: &VnetConfig) -> Result<(), SessionError> {
        info!(
            socket_path = %config.socket_path,
            ipv6_prefix = %config.ipv6_prefix,
            dns_addr = %config.dns_addr,
            "Starting VNet session"
        );

        let mut stream = UnixStream::connect(&config.socket_path).map_err(|e| {
            SessionError::ControlSocket {
                reason: format!("Failed to connect to control socket: {}", e),
            }
        })?;

        // Block until the client closes its end. Any payload on the control
        // socket is drained and ignored at this layer.
        let mut buffer = [0u8; 1024];
        loop {
            match stream.read(&mut buffer) {
                Ok(0) => {
                    info!("Control socket closed by client, stopping VNet session");
                    return Ok(());
                }
                Ok(n) => {
                    debug!("Drained {} bytes from control socket", n);
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!("Control socket read failed: {}", e);
                    return Err(SessionError::ControlSocket {
                        reason: format!("Control socket read failed: {}", e),
                    });
                }
            }
        }
    }
}
