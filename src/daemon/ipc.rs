//! Unix socket IPC for the daemon service surface
//!
//! Carries start-VNet requests from the unprivileged client to the daemon.
//! Messages are JSON-serialized over a Unix domain socket, one request per
//! connection. The acknowledgment carries no payload: it signals only that
//! the request was processed, never session success or failure.

use std::io::{Read, Write};
use std::net::Shutdown;
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use tracing::warn;

use vnetd_core::config::VnetConfig;
use vnetd_core::error::{IpcError, VnetdError};
use vnetd_core::vnet::DaemonService;

/// IPC message types
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum IpcMessage {
    /// Request to start the VNet session with the given config
    StartRequest(VnetConfig),
    /// Acknowledgment with no payload; duplicate requests get it too
    StartAck,
}

/// IPC client for talking to a running daemon
///
/// Used by tests and by supervisors that want to poke the daemon; the real
/// unprivileged client implements the same wire contract.
pub struct IpcClient {
    socket_path: PathBuf,
}

impl IpcClient {
    /// Create a new IPC client
    pub fn new(socket_path: PathBuf) -> Self {
        Self { socket_path }
    }

    /// Send a start-VNet request and wait for the acknowledgment
    pub fn start_vnet(&self, config: &VnetConfig) -> Result<(), VnetdError> {
        let mut stream = UnixStream::connect(&self.socket_path).map_err(|e| {
            IpcError::ConnectFailed {
                reason: format!("Failed to connect to service socket: {}", e),
            }
        })?;

        let message_data = serde_json::to_vec(&IpcMessage::StartRequest(config.clone()))
            .map_err(|e| IpcError::MalformedMessage {
                reason: format!("Failed to serialize request: {}", e),
            })?;

        stream.write_all(&message_data).map_err(IpcError::Io)?;
        stream.flush().map_err(IpcError::Io)?;
        // Half-close so the server sees EOF on its read
        stream.shutdown(Shutdown::Write).map_err(IpcError::Io)?;

        let mut buffer = Vec::new();
        stream.read_to_end(&mut buffer).map_err(IpcError::Io)?;

        let response: IpcMessage =
            serde_json::from_slice(&buffer).map_err(|e| IpcError::MalformedMessage {
                reason: format!("Failed to deserialize response: {}", e),
            })?;

        match response {
            IpcMessage::StartAck => Ok(()),
            _ => Err(VnetdError::Ipc(IpcError::UnexpectedResponse)),
        }
    }
}

/// IPC server: accepts client connections and forwards start requests
pub struct IpcServer {
    listener: UnixListener,
    service: Arc<DaemonService>,
}

impl IpcServer {
    /// Bind the service socket
    pub fn new(socket_path: PathBuf, service: DaemonService) -> Result<Self, VnetdError> {
        // Clean up any stale socket from a previous process generation
        let _ = std::fs::remove_file(&socket_path);

        let listener = UnixListener::bind(&socket_path).map_err(|e| IpcError::BindFailed {
            reason: format!("Failed to bind service socket: {}", e),
        })?;

        Ok(Self {
            listener,
            service: Arc::new(service),
        })
    }

    /// Run the accept loop (blocking)
    ///
    /// One handler thread per connection; the daemon process ends from
    /// inside the lifecycle manager, not by this loop returning.
    pub fn run(&self) -> Result<(), VnetdError> {
        for stream in self.listener.incoming() {
            match stream {
                Ok(mut stream) => {
                    let service = Arc::clone(&self.service);
                    thread::spawn(move || {
                        if let Err(e) = Self::handle_connection(&mut stream, &service) {
                            warn!("IPC connection error: {}", e);
                        }
                    });
                }
                Err(e) => {
                    warn!("IPC accept error: {}", e);
                    // Continue listening
                }
            }
        }

        Ok(())
    }

    /// Handle a single connection
    ///
    /// Blocks on the completion signal before acknowledging: by contract the
    /// lifecycle manager resolves it exactly once per request, whichever
    /// branch the request takes, so the handler never hangs on it.
    fn handle_connection(stream: &mut UnixStream, service: &DaemonService) -> Result<(), VnetdError> {
        let mut buffer = Vec::new();
        stream.read_to_end(&mut buffer).map_err(IpcError::Io)?;

        let message: IpcMessage =
            serde_json::from_slice(&buffer).map_err(|e| IpcError::MalformedMessage {
                reason: format!("Failed to deserialize request: {}", e),
            })?;

        match message {
            IpcMessage::StartRequest(config) => {
                let (completion, accepted) = tokio::sync::oneshot::channel();
                service.start_vnet(config, completion);
                accepted.blocking_recv().map_err(|_| {
                    IpcError::MalformedMessage {
                        reason: "Completion signal dropped before resolving".to_string(),
                    }
                })?;
            }
            IpcMessage::StartAck => {
                return Err(VnetdError::Ipc(IpcError::UnexpectedResponse));
            }
        }

        let response_data = serde_json::to_vec(&IpcMessage::StartAck)
            .map_err(|e| IpcError::MalformedMessage {
                reason: format!("Failed to serialize response: {}", e),
            })?;

        stream.write_all(&response_data).map_err(IpcError::Io)?;
        stream.flush().map_err(IpcError::Io)?;

        Ok(())
    }
}
