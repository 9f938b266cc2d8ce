//! Process termination hook
//!
//! Exiting after the session ends is the daemon's only way back to a clean,
//! restartable state, so it is modeled as an explicit hook invoked by the
//! lifecycle manager rather than a side effect of the session thread
//! unwinding. Tests inject a recording implementation instead of ending the
//! test process.

use tracing::{error, info};

/// How the one session of this process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The network task returned normally (client closed the control socket)
    Completed,

    /// The network task failed, or the config was rejected before spawning
    Failed,
}

impl SessionOutcome {
    /// Process exit code reported to the supervisor
    pub fn exit_code(&self) -> i32 {
        match self {
            SessionOutcome::Completed => 0,
            SessionOutcome::Failed => 1,
        }
    }
}

/// Termination hook invoked once the session has reached its terminal phase
pub trait ShutdownHook: Send + Sync {
    /// Request daemon process termination with the given outcome
    fn request_exit(&self, outcome: SessionOutcome);
}

/// Production hook: ends the daemon process
///
/// The exit code is the only stop-reason signal the supervisor gets; the
/// client observes nothing beyond the process disappearing.
#[derive(Debug, Default)]
pub struct ProcessShutdown;

impl ShutdownHook for ProcessShutdown {
    fn request_exit(&self, outcome: SessionOutcome) {
        match outcome {
            SessionOutcome::Completed => info!("VNet session ended, exiting"),
            SessionOutcome::Failed => error!("VNet session failed, exiting"),
        }
        std::process::exit(outcome.exit_code());
    }
}
