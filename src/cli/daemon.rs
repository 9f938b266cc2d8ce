//! Daemon management commands
//!
//! Command bodies for `vnetd run`, `vnetd status` and `vnetd stop`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use colored::Colorize;
use tracing::info;

use vnetd_core::config::settings::{DaemonSettings, ResolvedSettings};
use vnetd_core::error::{IpcError, VnetdError};
use vnetd_core::vnet::{ControlSocketService, DaemonService, LifecycleManager, ProcessShutdown};

use crate::daemon::ipc::{IpcClient, IpcServer};
use crate::daemon::process::DaemonProcess;

/// Load the settings file and apply CLI overrides
fn resolve_settings(
    config_path: Option<&Path>,
    service_socket: Option<PathBuf>,
    pid_file: Option<PathBuf>,
) -> Result<ResolvedSettings, VnetdError> {
    let settings = match config_path {
        Some(path) => DaemonSettings::from_file(path)?,
        None => DaemonSettings::default(),
    };

    let mut resolved = settings.resolve();
    if let Some(path) = service_socket {
        resolved.service_socket = path;
    }
    if let Some(path) = pid_file {
        resolved.pid_file = path;
    }
    Ok(resolved)
}

/// Run the daemon and serve start requests until the session ends
///
/// The process exits from inside the lifecycle manager once the VNet session
/// stops; this function only returns early on setup errors.
pub fn run_daemon(
    config_path: Option<&Path>,
    service_socket: Option<PathBuf>,
    pid_file: Option<PathBuf>,
    detach: bool,
) -> Result<(), VnetdError> {
    let settings = resolve_settings(config_path, service_socket, pid_file)?;

    let process = DaemonProcess::new(settings.pid_file.clone());
    if process.is_running()? {
        let pid = process.get_pid()?;
        return Err(VnetdError::Ipc(IpcError::BindFailed {
            reason: format!("daemon already running with pid {}", pid),
        }));
    }

    if detach {
        process.daemonize()?;
    } else {
        process.write_pid_file()?;
    }

    let manager = Arc::new(LifecycleManager::new(
        Arc::new(ControlSocketService),
        Arc::new(ProcessShutdown),
    ));
    let service = DaemonService::new(manager);

    let server = IpcServer::new(settings.service_socket.clone(), service)?;
    info!(
        "vnetd listening on {} (pid {})",
        settings.service_socket.display(),
        std::process::id()
    );
    server.run()
}

/// Send a start request to a running daemon
///
/// The daemon acknowledges every request; whether a new session was spawned
/// or an existing one recognized is not reported, by contract.
pub fn run_start(
    config_path: Option<&Path>,
    service_socket: Option<PathBuf>,
    config: vnetd_core::config::VnetConfig,
) -> Result<(), VnetdError> {
    let settings = resolve_settings(config_path, service_socket, None)?;

    let client = IpcClient::new(settings.service_socket);
    client.start_vnet(&config)?;
    println!("Start request acknowledged");
    Ok(())
}

/// Run the status command
pub fn run_status(config_path: Option<&Path>, pid_file: Option<PathBuf>) -> Result<(), VnetdError> {
    let settings = resolve_settings(config_path, None, pid_file)?;
    let process = DaemonProcess::new(settings.pid_file);

    if process.is_running()? {
        let pid = process.get_pid()?;
        println!("vnetd: {} (pid {})", "running".green(), pid);
    } else {
        println!("vnetd: {}", "not running".red());
    }
    Ok(())
}

/// Run the stop command
pub fn run_stop(config_path: Option<&Path>, pid_file: Option<PathBuf>) -> Result<(), VnetdError> {
    let settings = resolve_settings(config_path, None, pid_file)?;
    let process = DaemonProcess::new(settings.pid_file);

    if !process.is_running()? {
        println!("vnetd: {}", "not running".red());
        return Ok(());
    }

    let pid = process.get_pid()?;
    process.stop()?;
    println!("Stopped vnetd (pid {})", pid);
    Ok(())
}
