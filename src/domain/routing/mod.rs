//! Routing module - declared routes and the role-based gate.

mod gate;
mod route_table;

pub use gate::{AuthGate, GateState, GateWatcher, RouteDecision};
pub use route_table::{
    AllowedRoles, Route, RouteAccess, RouteMatch, RoutePattern, RouteTable, LOGIN_PATH,
    UNAUTHORIZED_PATH,
};
