//! Daemon process plumbing
//!
//! This module holds the Unix-socket IPC surface and the pid-file /
//! daemonization management for the vnetd process.

pub mod ipc;
pub mod process;
