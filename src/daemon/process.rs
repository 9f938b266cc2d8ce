//! Daemon process management
//!
//! Handles pid-file management, optional self-daemonization, and stopping a
//! running daemon. The daemon normally runs in the foreground under a
//! supervisor that respawns it after each session; `--detach` covers manual
//! operation.

use std::fs;
use std::path::PathBuf;
use std::process;

use daemonize::Daemonize;
use tracing::info;

use vnetd_core::error::VnetdError;

/// Represents the daemon process behind a pid file
pub struct DaemonProcess {
    pid_file: PathBuf,
}

impl DaemonProcess {
    /// Create a new daemon process manager
    pub fn new(pid_file: PathBuf) -> Self {
        Self { pid_file }
    }

    /// Check if a daemon is already running
    ///
    /// Stale pid files left behind by a crashed process are cleaned up here.
    pub fn is_running(&self) -> Result<bool, VnetdError> {
        if !self.pid_file.exists() {
            return Ok(false);
        }

        let pid = self.get_pid()?;
        match nix::unistd::getpgid(Some(nix::unistd::Pid::from_raw(pid))) {
            Ok(_) => Ok(true),
            Err(nix::errno::Errno::ESRCH) => {
                // Process doesn't exist, clean up the stale pid file
                let _ = fs::remove_file(&self.pid_file);
                Ok(false)
            }
            Err(e) => Err(VnetdError::Daemon {
                reason: format!("Failed to check process status: {}", e),
            }),
        }
    }

    /// Write the current process id to the pid file (foreground mode)
    pub fn write_pid_file(&self) -> Result<(), VnetdError> {
        if let Some(parent) = self.pid_file.parent() {
            fs::create_dir_all(parent).map_err(|e| VnetdError::Daemon {
                reason: format!("Failed to create pid file directory: {}", e),
            })?;
        }

        fs::write(&self.pid_file, format!("{}\n", process::id())).map_err(|e| {
            VnetdError::Daemon {
                reason: format!("Failed to write pid file: {}", e),
            }
        })?;
        Ok(())
    }

    /// Daemonize the current process
    pub fn daemonize(&self) -> Result<(), VnetdError> {
        if let Some(parent) = self.pid_file.parent() {
            fs::create_dir_all(parent).map_err(|e| VnetdError::Daemon {
                reason: format!("Failed to create pid file directory: {}", e),
            })?;
        }

        let daemonize = Daemonize::new()
            .pid_file(&self.pid_file)
            .chown_pid_file(true)
            .working_directory(std::env::current_dir().map_err(|e| VnetdError::Daemon {
                reason: format!("Failed to get current directory: {}", e),
            })?)
            .umask(0o027); // Restrictive permissions

        daemonize.start().map_err(|e| VnetdError::Daemon {
            reason: format!("Failed to daemonize process: {}", e),
        })?;

        info!("Successfully daemonized process, PID: {}", process::id());
        Ok(())
    }

    /// Get the PID of the running daemon
    pub fn get_pid(&self) -> Result<i32, VnetdError> {
        let pid_content = fs::read_to_string(&self.pid_file).map_err(|e| VnetdError::Daemon {
            reason: format!("Failed to read pid file: {}", e),
        })?;

        pid_content.trim().parse().map_err(|_| VnetdError::Daemon {
            reason: "Invalid pid in pid file".to_string(),
        })
    }

    /// Stop the daemon process
    pub fn stop(&self) -> Result<(), VnetdError> {
        let pid = self.get_pid()?;

        // Send SIGTERM for graceful shutdown
        nix::sys::signal::kill(
            nix::unistd::Pid::from_raw(pid),
            nix::sys::signal::Signal::SIGTERM,
        )
        .map_err(|e| VnetdError::Daemon {
            reason: format!("Failed to send SIGTERM to daemon: {}", e),
        })?;

        // Give it a moment before checking
        std::thread::sleep(std::time::Duration::from_secs(2));

        if self.is_running()? {
            // Still up, force it down
            nix::sys::signal::kill(
                nix::unistd::Pid::from_raw(pid),
                nix::sys::signal::Signal::SIGKILL,
            )
            .map_err(|e| VnetdError::Daemon {
                reason: format!("Failed to send SIGKILL to daemon: {}", e),
            })?;
        }

        // Clean up the pid file
        let _ = fs::remove_file(&self.pid_file);

        info!("Stopped daemon process {}", pid);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_is_running_without_pid_file() {
        let dir = TempDir::new().expect("failed to create temp dir");
        let process = DaemonProcess::new(dir.path().join("vnetd.pid"));
        assert!(!process.is_running().expect("is_running failed"));
    }

    #[test]
    fn test_write_and_read_own_pid() {
        let dir = TempDir::new().expect("failed to create temp dir");
        let process = DaemonProcess::new(dir.path().join("vnetd.pid"));

        process.write_pid_file().expect("failed to write pid file");
        assert_eq!(
            process.get_pid().expect("failed to read pid"),
            std::process::id() as i32
        );
        // The test process itself is running
        assert!(process.is_running().expect("is_running failed"));
    }

    #[test]
    fn test_stale_pid_file_is_cleaned_up() {
        let dir = TempDir::new().expect("failed to create temp dir");
        let pid_file = dir.path().join("vnetd.pid");
        // pid_max on Linux is 4194304, so nothing can be running with this
        fs::write(&pid_file, "4194303\n").expect("failed to write pid file");

        let process = DaemonProcess::new(pid_file.clone());
        assert!(!process.is_running().expect("is_running failed"));
        assert!(!pid_file.exists());
    }

    #[test]
    fn test_invalid_pid_file_is_an_error() {
        let dir = TempDir::new().expect("failed to create temp dir");
        let pid_file = dir.path().join("vnetd.pid");
        fs::write(&pid_file, "not-a-pid\n").expect("failed to write pid file");

        let process = DaemonProcess::new(pid_file);
        assert!(process.get_pid().is_err());
    }
}
