//! Session module - who is signed in and with which role.

mod context;
mod role;
#[allow(clippy::module_inception)]
mod session;

pub use context::{SessionContext, SessionState};
pub use role::Role;
pub use session::{IdTokenClaims, Session, SessionError, DEFAULT_ROLE};
