//! VNet session state management
//!
//! Defines the state machine for the one VNet session a daemon process may
//! run, and provides thread-safe phase tracking.

use std::sync::{Arc, Mutex};

/// Session phases
///
/// A process runs at most one session. There is no transition back to
/// `Idle`; a new session requires a new process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No session has been requested yet
    Idle,

    /// The first start call has been accepted, spawn in progress
    Starting,

    /// The background network task is active
    Running,

    /// The background task has ended (normally or not); terminal
    Stopped,
}

impl Default for SessionPhase {
    fn default() -> Self {
        Self::Idle
    }
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionPhase::Idle => write!(f, "idle"),
            SessionPhase::Starting => write!(f, "starting"),
            SessionPhase::Running => write!(f, "running"),
            SessionPhase::Stopped => write!(f, "stopped"),
        }
    }
}

/// Thread-safe session state wrapper
///
/// Single source of truth for "has a VNet session already been requested in
/// this process." All lifecycle transitions go through the mutex, so
/// [`try_begin_session`](Self::try_begin_session) admits at most one caller
/// even under concurrent start requests.
#[derive(Debug, Clone)]
pub struct SharedSessionState(Arc<Mutex<SessionPhase>>);

impl SharedSessionState {
    /// Create a new session state in the idle phase
    pub fn new() -> Self {
        Self(Arc::new(Mutex::new(SessionPhase::default())))
    }

    /// Get the current session phase
    pub fn phase(&self) -> SessionPhase {
        *self.0.lock().unwrap()
    }

    /// Atomically claim the one session slot
    ///
    /// Returns true for exactly one caller per state instance: the caller
    /// that observes `Idle` and moves the phase to `Starting`. Every other
    /// caller, for the rest of the process lifetime, gets false and must
    /// treat its start request as a no-op.
    pub fn try_begin_session(&self) -> bool {
        let mut phase = self.0.lock().unwrap();
        if *phase == SessionPhase::Idle {
            *phase = SessionPhase::Starting;
            true
        } else {
            false
        }
    }

    /// Mark the background task as live
    pub fn mark_running(&self) {
        *self.0.lock().unwrap() = SessionPhase::Running;
    }

    /// Mark the session as ended; terminal
    pub fn mark_stopped(&self) {
        *self.0.lock().unwrap() = SessionPhase::Stopped;
    }

    /// Check whether the background task is active
    pub fn is_running(&self) -> bool {
        self.phase() == SessionPhase::Running
    }

    /// Check whether a session has ever been requested
    pub fn has_started(&self) -> bool {
        self.phase() != SessionPhase::Idle
    }
}

impl Default for SharedSessionState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_transitions() {
        let state = SharedSessionState::new();

        assert_eq!(state.phase(), SessionPhase::Idle);
        assert!(!state.has_started());
        assert!(!state.is_running());

        assert!(state.try_begin_session());
        assert_eq!(state.phase(), SessionPhase::Starting);
        assert!(state.has_started());

        state.mark_running();
        assert!(state.is_running());

        state.mark_stopped();
        assert_eq!(state.phase(), SessionPhase::Stopped);
        assert!(state.has_started());
        assert!(!state.is_running());
    }

    #[test]
    fn test_try_begin_session_admits_one_caller() {
        let state = SharedSessionState::new();
        assert!(state.try_begin_session());
        assert!(!state.try_begin_session());

        // Still claimed after the session ends
        state.mark_running();
        state.mark_stopped();
        assert!(!state.try_begin_session());
    }

    #[test]
    fn test_try_begin_session_under_race() {
        let state = SharedSessionState::new();
        let mut handles = Vec::new();

        for _ in 0..16 {
            let state = state.clone();
            handles.push(std::thread::spawn(move || state.try_begin_session()));
        }

        let winners = handles
            .into_iter()
            .map(|h| h.join().expect("thread panicked"))
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", SessionPhase::Idle), "idle");
        assert_eq!(format!("{}", SessionPhase::Starting), "starting");
        assert_eq!(format!("{}", SessionPhase::Running), "running");
        assert_eq!(format!("{}", SessionPhase::Stopped), "stopped");
    }
}
