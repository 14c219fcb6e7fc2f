//! Role-based route authorization.
//!
//! ```text
//! Unresolved --[no session]------------------> Unauthenticated
//! Unresolved --[session, role in allowed]----> AuthenticatedAllowed(role)
//! Unresolved --[session, role not allowed]---> AuthenticatedForbidden(role)
//! ```
//!
//! Unmatched paths resolve to `NotFound` before any of the above is
//! considered. The gate never fails: every input maps to a decision.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use tokio::sync::watch;

use super::route_table::{AllowedRoles, RouteAccess, RouteTable, LOGIN_PATH, UNAUTHORIZED_PATH};
use crate::domain::session::{Role, SessionState};

static CLINIC_ROUTES: Lazy<Arc<RouteTable>> = Lazy::new(|| Arc::new(RouteTable::clinic()));

/// Outcome of evaluating a session against a route's allowed roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateState {
    Unresolved,
    Unauthenticated,
    AuthenticatedAllowed(Role),
    AuthenticatedForbidden(Role),
}

impl GateState {
    /// Evaluates the current session against a non-empty allowed set.
    pub fn evaluate(session: &SessionState, allowed: &AllowedRoles) -> Self {
        match session {
            SessionState::Unresolved => GateState::Unresolved,
            SessionState::SignedOut => GateState::Unauthenticated,
            SessionState::SignedIn(session) => {
                let role = session.role();
                if allowed.contains(&role) {
                    GateState::AuthenticatedAllowed(role)
                } else {
                    GateState::AuthenticatedForbidden(role)
                }
            }
        }
    }
}

/// What the UI should do for a navigation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Session status unknown; show a loading indicator and wait.
    Pending,
    /// Render the view. `role` is `None` for public views visited anonymously.
    Render {
        role: Option<Role>,
        params: HashMap<String, String>,
    },
    /// Send the user to the login view, remembering where they were going.
    RedirectToLogin { return_to: String },
    RedirectToUnauthorized,
    /// Declared forward (e.g. `/` to `/login`).
    Redirect { to: String },
    NotFound,
}

impl RouteDecision {
    /// Target path for redirecting decisions.
    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            RouteDecision::RedirectToLogin { .. } => Some(LOGIN_PATH),
            RouteDecision::RedirectToUnauthorized => Some(UNAUTHORIZED_PATH),
            RouteDecision::Redirect { to } => Some(to),
            _ => None,
        }
    }
}

/// Evaluates navigation requests against a [`RouteTable`].
#[derive(Debug, Clone)]
pub struct AuthGate {
    table: Arc<RouteTable>,
}

impl AuthGate {
    pub fn new(table: RouteTable) -> Self {
        Self {
            table: Arc::new(table),
        }
    }

    /// A gate over the clinic's declared routes. The table is built once
    /// and shared by every gate.
    pub fn clinic() -> Self {
        Self {
            table: Arc::clone(&CLINIC_ROUTES),
        }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Decides how to handle a request for `path` under `session`.
    pub fn decide(&self, path: &str, session: &SessionState) -> RouteDecision {
        let Some(matched) = self.table.resolve(path) else {
            tracing::debug!(path, "No declared route matches");
            return RouteDecision::NotFound;
        };

        match &matched.route.access {
            RouteAccess::Redirect(to) => RouteDecision::Redirect { to: to.clone() },
            RouteAccess::Public => RouteDecision::Render {
                role: session.session().map(|s| s.role()),
                params: matched.params,
            },
            RouteAccess::Protected(allowed) => match GateState::evaluate(session, allowed) {
                GateState::Unresolved => RouteDecision::Pending,
                GateState::Unauthenticated => RouteDecision::RedirectToLogin {
                    return_to: path.to_string(),
                },
                GateState::AuthenticatedAllowed(role) => RouteDecision::Render {
                    role: Some(role),
                    params: matched.params,
                },
                GateState::AuthenticatedForbidden(role) => {
                    tracing::info!(path, role = %role, "Route forbidden for role");
                    RouteDecision::RedirectToUnauthorized
                }
            },
        }
    }

    /// Watches one path and re-decides whenever the session changes.
    pub fn watch(&self, path: impl Into<String>, sessions: watch::Receiver<SessionState>) -> GateWatcher {
        GateWatcher {
            gate: self.clone(),
            path: path.into(),
            sessions,
        }
    }
}

/// A live route evaluation bound to the session channel.
///
/// Re-evaluates on login, logout and role refresh rather than once at mount.
#[derive(Debug)]
pub struct GateWatcher {
    gate: AuthGate,
    path: String,
    sessions: watch::Receiver<SessionState>,
}

impl GateWatcher {
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Decision for the current session, marking it as seen.
    pub fn current(&mut self) -> RouteDecision {
        let state = self.sessions.borrow_and_update().clone();
        self.gate.decide(&self.path, &state)
    }

    /// Waits for the next session change and returns the new decision.
    ///
    /// Returns `None` once the session owner has been dropped.
    pub async fn changed(&mut self) -> Option<RouteDecision> {
        self.sessions.changed().await.ok()?;
        Some(self.current())
    }

    /// Switches to a new path and decides it immediately.
    pub fn navigate(&mut self, path: impl Into<String>) -> RouteDecision {
        self.path = path.into();
        self.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::auth::StaticTokenProvider;
    use crate::domain::session::Session;

    fn signed_in(role: &str) -> SessionState {
        SessionState::SignedIn(Arc::new(Session::new(
            "user-1",
            role,
            Arc::new(StaticTokenProvider::empty()),
        )))
    }

    #[test]
    fn evaluate_maps_every_session_state() {
        let allowed = AllowedRoles::new([Role::Admin, Role::Doctor]).unwrap();
        assert_eq!(GateState::evaluate(&SessionState::Unresolved, &allowed), GateState::Unresolved);
        assert_eq!(
            GateState::evaluate(&SessionState::SignedOut, &allowed),
            GateState::Unauthenticated
        );
        assert_eq!(
            GateState::evaluate(&signed_in("doctor"), &allowed),
            GateState::AuthenticatedAllowed(Role::Doctor)
        );
        assert_eq!(
            GateState::evaluate(&signed_in("frontdesk"), &allowed),
            GateState::AuthenticatedForbidden(Role::FrontDesk)
        );
    }

    #[test]
    fn unresolved_session_on_protected_route_is_pending() {
        let gate = AuthGate::clinic();
        assert_eq!(gate.decide("/admin", &SessionState::Unresolved), RouteDecision::Pending);
    }

    #[test]
    fn public_route_renders_without_session() {
        let gate = AuthGate::clinic();
        assert_eq!(
            gate.decide("/login", &SessionState::SignedOut),
            RouteDecision::Render {
                role: None,
                params: HashMap::new()
            }
        );
    }

    #[test]
    fn redirect_targets_are_exposed() {
        assert_eq!(
            RouteDecision::RedirectToLogin {
                return_to: "/admin".to_string()
            }
            .redirect_target(),
            Some("/login")
        );
        assert_eq!(RouteDecision::RedirectToUnauthorized.redirect_target(), Some("/unauthorized"));
        assert_eq!(RouteDecision::NotFound.redirect_target(), None);
    }
}
