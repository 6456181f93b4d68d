//! Per-connection protocol state (`spec.md` §3 `Session`, §4.6 state
//! machine).
//!
//! One `Session` exists per stdio process or per SSE connection
//! (`spec.md` §4.7). State transitions are infrequent and never held
//! across an `.await`, so a plain `parking_lot::RwLock` is enough —
//! no need for the teacher's `tokio::sync::RwLock` here.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// `uninitialized → initialized → shutting_down → closed` (`spec.md` §4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Initialized,
    ShuttingDown,
    Closed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

pub struct Session {
    state: RwLock<SessionState>,
    client_info: RwLock<Option<ClientInfo>>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(SessionState::Uninitialized),
            client_info: RwLock::new(None),
        }
    }

    pub fn state(&self) -> SessionState {
        *self.state.read()
    }

    pub fn is_initialized(&self) -> bool {
        self.state() == SessionState::Initialized
    }

    pub fn client_info(&self) -> Option<ClientInfo> {
        self.client_info.read().clone()
    }

    /// Only valid from `Uninitialized` (`spec.md` §4.6). Returns `false`
    /// (and makes no change) if the session was already past that state.
    pub fn initialize(&self, client_info: ClientInfo) -> bool {
        let mut state = self.state.write();
        if *state != SessionState::Uninitialized {
            return false;
        }
        *self.client_info.write() = Some(client_info);
        *state = SessionState::Initialized;
        true
    }

    /// Only valid from `Initialized`. Transitions straight to `Closed`
    /// per `spec.md` §4.6 ("`shutdown`: from `initialized`. Transitions
    /// to `closed`"); `ShuttingDown` is used by the transport layer for
    /// the bounded grace period around process-wide shutdown, not by this
    /// per-session transition.
    pub fn shutdown(&self) -> bool {
        let mut state = self.state.write();
        if *state != SessionState::Initialized {
            return false;
        }
        *state = SessionState::Closed;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_uninitialized() {
        let session = Session::new();
        assert_eq!(session.state(), SessionState::Uninitialized);
        assert!(!session.is_initialized());
    }

    #[test]
    fn initialize_then_shutdown_transitions_correctly() {
        let session = Session::new();
        assert!(session.initialize(ClientInfo { name: "t".into(), version: "1".into() }));
        assert!(session.is_initialized());
        assert!(session.shutdown());
        assert_eq!(session.state(), SessionState::Closed);
    }

    #[test]
    fn cannot_initialize_twice() {
        let session = Session::new();
        assert!(session.initialize(ClientInfo { name: "t".into(), version: "1".into() }));
        assert!(!session.initialize(ClientInfo { name: "t2".into(), version: "2".into() }));
    }

    #[test]
    fn cannot_shutdown_before_initialize() {
        let session = Session::new();
        assert!(!session.shutdown());
    }
}
