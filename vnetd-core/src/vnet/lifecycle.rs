//! VNet session lifecycle management
//!
//! Owns the session state, implements the idempotent start contract, hands
//! the network servicing loop to a dedicated background thread, and arranges
//! for the daemon process to exit once that loop ends.

use std::sync::{Arc, Mutex};
use std::thread;

use tokio::sync::oneshot;
use tracing::{debug, error, info};

use crate::config::VnetConfig;
use crate::error::ConfigError;
use crate::vnet::service::VnetService;
use crate::vnet::shutdown::{SessionOutcome, ShutdownHook};
use crate::vnet::state::SharedSessionState;

/// Manager for the one VNet session a daemon process may run
///
/// Each instance owns its session state, so constructing a fresh manager
/// models a fresh daemon process generation. The start contract:
///
/// - The first call claims the session slot, stores its config, spawns the
///   background thread, and resolves its completion sender once the spawn
///   has been issued.
/// - Every later call is a no-op whose completion sender is still resolved,
///   so no caller is ever left waiting.
/// - When the background thread's servicing loop returns, the session is
///   marked stopped and the shutdown hook ends the process. There is no way
///   back to idle; a new session requires a new process.
pub struct LifecycleManager {
    state: SharedSessionState,
    service: Arc<dyn VnetService>,
    shutdown: Arc<dyn ShutdownHook>,
    active_config: Mutex<Option<VnetConfig>>,
}

impl LifecycleManager {
    /// Create a manager with an idle session state
    pub fn new(service: Arc<dyn VnetService>, shutdown: Arc<dyn ShutdownHook>) -> Self {
        Self {
            state: SharedSessionState::new(),
            service,
            shutdown,
            active_config: Mutex::new(None),
        }
    }

    /// Get the session state
    pub fn state(&self) -> &SharedSessionState {
        &self.state
    }

    /// Get the config the running session was started with, if any
    pub fn active_config(&self) -> Option<VnetConfig> {
        self.active_config.lock().unwrap().clone()
    }

    /// Start the VNet session
    ///
    /// Only the first call per manager instance starts a session; later
    /// calls are no-ops. `completion` is resolved exactly once per call,
    /// as soon as the request has been processed. It signals acceptance
    /// only, never session success. This method never blocks on the
    /// session's lifetime.
    pub fn start(&self, config: VnetConfig, completion: oneshot::Sender<()>) {
        if !self.state.try_begin_session() {
            debug!("VNet session already started, ignoring start request");
            let _ = completion.send(());
            return;
        }

        info!("Accepted first VNet start request");
        *self.active_config.lock().unwrap() = Some(config.clone());

        let state = self.state.clone();
        let service = Arc::clone(&self.service);
        let shutdown = Arc::clone(&self.shutdown);

        let spawned = thread::Builder::new()
            .name("vnet-session".to_string())
            .spawn(move || {
                state.mark_running();
                let result = service.run(&config);
                state.mark_stopped();

                let outcome = match result {
                    Ok(()) => SessionOutcome::Completed,
                    Err(e) => {
                        error!("VNet session failed: {}", e);
                        SessionOutcome::Failed
                    }
                };
                shutdown.request_exit(outcome);
            });

        match spawned {
            Ok(_) => {
                // The spawn has been issued; the session itself comes up
                // asynchronously.
                let _ = completion.send(());
            }
            Err(e) => {
                error!("Failed to spawn VNet session thread: {}", e);
                self.state.mark_stopped();
                let _ = completion.send(());
                self.shutdown.request_exit(SessionOutcome::Failed);
            }
        }
    }

    /// Record a start request rejected before spawning
    ///
    /// Used by the daemon service when config validation fails. If the
    /// session slot is still free this consumes it, transitions straight to
    /// stopped, and requests process exit through the same path a failed
    /// session takes. If a session was already started the invalid request
    /// is simply ignored, matching the duplicate-start contract.
    pub fn fail_start(&self, err: ConfigError) {
        if !self.state.try_begin_session() {
            debug!("Invalid start request after session already started, ignoring");
            return;
        }

        error!("Declining to spawn VNet session: {}", err);
        self.state.mark_stopped();
        self.shutdown.request_exit(SessionOutcome::Failed);
    }
}
