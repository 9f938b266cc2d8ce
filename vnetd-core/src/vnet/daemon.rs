//! IPC-facing boundary adapter
//!
//! `DaemonService` sits between the IPC transport and the lifecycle manager.
//! It owns no state of its own: it sanitizes the client-supplied config and
//! forwards the request. It is the only surface visible to the outside world.

use std::sync::Arc;

use tokio::sync::oneshot;
use tracing::warn;

use crate::config::VnetConfig;
use crate::vnet::lifecycle::LifecycleManager;

/// Handler for start-VNet requests arriving over IPC
pub struct DaemonService {
    manager: Arc<LifecycleManager>,
}

impl DaemonService {
    /// Create a new daemon service over the given lifecycle manager
    pub fn new(manager: Arc<LifecycleManager>) -> Self {
        Self { manager }
    }

    /// Get the lifecycle manager
    pub fn manager(&self) -> &Arc<LifecycleManager> {
        &self.manager
    }

    /// Handle a start-VNet request
    ///
    /// The config crosses a privilege boundary and is validated here, before
    /// any session slot is consumed by a spawn. `completion` resolves exactly
    /// once whichever branch is taken; a rejected config still acknowledges
    /// the caller, then fails the session so the process exits. The caller's
    /// only failure signal is the daemon disappearing.
    pub fn start_vnet(&self, config: VnetConfig, completion: oneshot::Sender<()>) {
        if let Err(err) = config.validate() {
            warn!("Rejecting VNet start request: {}", err);
            let _ = completion.send(());
            self.manager.fail_start(err);
            return;
        }

        self.manager.start(config, completion);
    }
}
