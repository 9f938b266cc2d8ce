//! VNet session module
//!
//! Implements the single-session lifecycle: phase tracking, the manager that
//! spawns the network servicing loop on a background thread, and the
//! IPC-facing boundary adapter.

pub mod daemon;
pub mod lifecycle;
pub mod service;
pub mod shutdown;
pub mod state;

// Public re-exports
pub use daemon::DaemonService;
pub use lifecycle::LifecycleManager;
pub use service::{ControlSocketService, VnetService};
pub use shutdown::{ProcessShutdown, SessionOutcome, ShutdownHook};
pub use state::{SessionPhase, SharedSessionState};
