//! vnetd - VNet session daemon
//!
//! A privileged background daemon that stands up one virtual network session
//! per process on behalf of an unprivileged client, reached over a Unix
//! domain socket.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use vnetd_core::{error::VnetdError, init_logging};

mod cli;
mod daemon;

#[derive(Parser)]
#[command(name = "vnetd")]
#[command(about = "VNet session daemon")]
struct Cli {
    /// Path to the daemon settings file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the daemon and serve start requests
    Run {
        /// Detach from the terminal and run in the background
        #[arg(long)]
        detach: bool,

        /// Override the IPC service socket path
        #[arg(long)]
        service_socket: Option<PathBuf>,

        /// Override the pid file path
        #[arg(long)]
        pid_file: Option<PathBuf>,
    },
    /// Send a start request to a running daemon (debugging aid)
    Start {
        /// Control socket owned by the client process
        #[arg(long)]
        socket_path: String,

        /// IPv6 prefix for the virtual interface
        #[arg(long)]
        ipv6_prefix: String,

        /// Address DNS queries are routed to
        #[arg(long)]
        dns_addr: String,

        /// Base directory for daemon-local state
        #[arg(long)]
        home_path: String,

        /// Override the IPC service socket path
        #[arg(long)]
        service_socket: Option<PathBuf>,
    },
    /// Show whether a daemon is running
    Status {
        /// Override the pid file path
        #[arg(long)]
        pid_file: Option<PathBuf>,
    },
    /// Stop a running daemon
    Stop {
        /// Override the pid file path
        #[arg(long)]
        pid_file: Option<PathBuf>,
    },
}

fn main() {
    // Initialize logging
    if let Err(e) = init_logging() {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(2);
    }

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            detach,
            service_socket,
            pid_file,
        } => cli::daemon::run_daemon(cli.config.as_deref(), service_socket, pid_file, detach),
        Commands::Start {
            socket_path,
            ipv6_prefix,
            dns_addr,
            home_path,
            service_socket,
        } => cli::daemon::run_start(
            cli.config.as_deref(),
            service_socket,
            vnetd_core::config::VnetConfig::new(socket_path, ipv6_prefix, dns_addr, home_path),
        ),
        Commands::Status { pid_file } => cli::daemon::run_status(cli.config.as_deref(), pid_file),
        Commands::Stop { pid_file } => cli::daemon::run_stop(cli.config.as_deref(), pid_file),
    };

    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            let exit_code = match e {
                // Configuration and settings errors (exit code 2)
                VnetdError::Config(_) | VnetdError::Toml(_) | VnetdError::TomlSerialize(_) => 2,
                // Runtime errors (exit code 1)
                VnetdError::Session(_)
                | VnetdError::Ipc(_)
                | VnetdError::Daemon { .. }
                | VnetdError::Io(_) => 1,
            };

            eprintln!("{}", e);
            std::process::exit(exit_code);
        }
    }
}
