//! Integration tests for the IPC-facing daemon service boundary
//!
//! Verifies the hardening contract: client-supplied configs are sanitized
//! before any session slot is consumed, rejected requests are still
//! acknowledged, and valid requests pass through to the lifecycle manager.

use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use tokio::sync::oneshot;

use vnetd_core::config::VnetConfig;
use vnetd_core::error::SessionError;
use vnetd_core::vnet::{
    DaemonService, LifecycleManager, SessionOutcome, SessionPhase, ShutdownHook, VnetService,
};

/// Service that ends immediately with success, recording that it ran
struct CountingService {
    runs: Mutex<u32>,
}

impl CountingService {
    fn new() -> Arc<Self> {
        Arc::new(Self { runs: Mutex::new(0) })
    }

    fn runs(&self) -> u32 {
        *self.runs.lock().unwrap()
    }
}

impl VnetService for CountingService {
    fn run(&self, _config: &VnetConfig) -> Result<(), SessionError> {
        *self.runs.lock().unwrap() += 1;
        Ok(())
    }
}

struct RecordingShutdown {
    tx: Mutex<mpsc::Sender<SessionOutcome>>,
}

impl RecordingShutdown {
    fn new() -> (Arc<Self>, mpsc::Receiver<SessionOutcome>) {
        let (tx, rx) = mpsc::channel();
        (Arc::new(Self { tx: Mutex::new(tx) }), rx)
    }
}

impl ShutdownHook for RecordingShutdown {
    fn request_exit(&self, outcome: SessionOutcome) {
        self.tx
            .lock()
            .unwrap()
            .send(outcome)
            .expect("test dropped the outcome receiver");
    }
}

fn service_under_test() -> (DaemonService, Arc<CountingService>, mpsc::Receiver<SessionOutcome>) {
    let vnet = CountingService::new();
    let (hook, outcomes) = RecordingShutdown::new();
    let daemon = DaemonService::new(Arc::new(LifecycleManager::new(vnet.clone(), hook)));
    (daemon, vnet, outcomes)
}

fn valid_config() -> VnetConfig {
    VnetConfig::new(
        "/var/run/vnet/ctl.sock".to_string(),
        "fd60:627a:a5b3::/64".to_string(),
        "fd60:627a:a5b3::53".to_string(),
        "/var/lib/vnetd".to_string(),
    )
}

#[test]
fn test_valid_config_is_forwarded() {
    let (daemon, vnet, outcomes) = service_under_test();

    let (tx, rx) = oneshot::channel();
    daemon.start_vnet(valid_config(), tx);
    rx.blocking_recv().expect("completion never fired");

    // The counting service returns at once, so the session runs to
    // completion
    assert_eq!(
        outcomes
            .recv_timeout(Duration::from_secs(5))
            .expect("shutdown hook never invoked"),
        SessionOutcome::Completed
    );
    assert_eq!(vnet.runs(), 1);
}

#[test]
fn test_invalid_config_is_acknowledged_and_fails_fast() {
    let (daemon, vnet, outcomes) = service_under_test();

    let mut config = valid_config();
    config.ipv6_prefix = "bogus".to_string();

    let (tx, rx) = oneshot::channel();
    daemon.start_vnet(config, tx);
    rx.blocking_recv().expect("rejected request must still be acknowledged");

    assert_eq!(
        outcomes
            .recv_timeout(Duration::from_secs(5))
            .expect("shutdown hook never invoked"),
        SessionOutcome::Failed
    );
    assert_eq!(vnet.runs(), 0);
    assert_eq!(daemon.manager().state().phase(), SessionPhase::Stopped);
}

#[test]
fn test_path_traversal_is_rejected() {
    let (daemon, vnet, outcomes) = service_under_test();

    let mut config = valid_config();
    config.home_path = "/var/lib/../../etc".to_string();

    let (tx, rx) = oneshot::channel();
    daemon.start_vnet(config, tx);
    rx.blocking_recv().expect("rejected request must still be acknowledged");

    assert_eq!(
        outcomes
            .recv_timeout(Duration::from_secs(5))
            .expect("shutdown hook never invoked"),
        SessionOutcome::Failed
    );
    assert_eq!(vnet.runs(), 0);
}

#[test]
fn test_invalid_duplicate_after_start_is_ignored() {
    let (daemon, vnet, outcomes) = service_under_test();

    let (tx, rx) = oneshot::channel();
    daemon.start_vnet(valid_config(), tx);
    rx.blocking_recv().expect("completion never fired");
    outcomes
        .recv_timeout(Duration::from_secs(5))
        .expect("shutdown hook never invoked");

    // An invalid request after the session slot is spent is a plain no-op
    // with an acknowledgment, not a second exit request
    let mut config = valid_config();
    config.dns_addr = String::new();
    let (tx, rx) = oneshot::channel();
    daemon.start_vnet(config, tx);
    rx.blocking_recv().expect("completion never fired");

    assert_eq!(vnet.runs(), 1);
    assert!(outcomes.try_recv().is_err());
}
