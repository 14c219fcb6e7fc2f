//! Process-wide session state with a single writer.
//!
//! The login/logout/refresh flow owns the [`SessionContext`]; everything
//! else (route gate, dashboards, stores) holds a `watch::Receiver` and only
//! reads.

use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::watch;

use super::Session;

/// What is currently known about the user's session.
#[derive(Debug, Clone)]
pub enum SessionState {
    /// The token check has not completed yet.
    Unresolved,
    /// No valid session exists.
    SignedOut,
    SignedIn(Arc<Session>),
}

impl SessionState {
    /// The active session, if signed in.
    pub fn session(&self) -> Option<&Arc<Session>> {
        match self {
            SessionState::SignedIn(session) => Some(session),
            _ => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, SessionState::Unresolved)
    }
}

/// Owner of the session state. Not `Clone`: there is exactly one writer.
#[derive(Debug)]
pub struct SessionContext {
    tx: watch::Sender<SessionState>,
}

impl SessionContext {
    /// Creates a context whose session is not yet resolved.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SessionState::Unresolved);
        Self { tx }
    }

    /// Returns a snapshot of the current state.
    pub fn current(&self) -> SessionState {
        self.tx.borrow().clone()
    }

    /// Returns a reader that is notified on every change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }

    /// Installs a session after a successful login.
    pub fn sign_in(&self, session: Session) {
        tracing::info!(user_id = %session.user_id(), role = %session.role(), "Session established");
        self.tx.send_replace(SessionState::SignedIn(Arc::new(session)));
    }

    /// Tears the session down (logout or token invalidation). Also used
    /// to resolve an initial token check that found nothing.
    pub fn sign_out(&self) {
        let previous = self.tx.send_replace(SessionState::SignedOut);
        if let Some(session) = previous.session() {
            tracing::info!(user_id = %session.user_id(), "Session ended");
        }
    }

    /// Replaces role and attributes of the active session.
    ///
    /// Returns false (and changes nothing) when no one is signed in.
    pub fn refresh(&self, display_role: impl Into<String>, attributes: Map<String, Value>) -> bool {
        let display_role = display_role.into();
        self.tx.send_if_modified(|state| match state {
            SessionState::SignedIn(session) => {
                *session = Arc::new(session.refreshed(display_role.clone(), attributes.clone()));
                true
            }
            _ => false,
        })
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}
