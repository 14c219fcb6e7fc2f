//! Declared routes and path matching.

use std::collections::HashMap;

use crate::domain::foundation::ValidationError;
use crate::domain::session::Role;

/// Path of the sign-in view.
pub const LOGIN_PATH: &str = "/login";

/// Path of the "you may not view this" view.
pub const UNAUTHORIZED_PATH: &str = "/unauthorized";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A path pattern such as `/admin/patients/:id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    /// Parses a pattern. A segment `:name` captures one path segment; a
    /// bare `:` is treated literally.
    pub fn new(pattern: impl Into<String>) -> Self {
        let raw = pattern.into();
        let segments = split_path(&raw)
            .into_iter()
            .map(|segment| match segment.strip_prefix(':') {
                Some(name) if !name.is_empty() => Segment::Param(name.to_string()),
                _ => Segment::Literal(segment.to_string()),
            })
            .collect();
        Self { raw, segments }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Number of literal segments; more literals means a more specific route.
    fn specificity(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Literal(_)))
            .count()
    }

    fn capture(&self, path: &[&str]) -> Option<HashMap<String, String>> {
        if path.len() != self.segments.len() {
            return None;
        }
        let mut params = HashMap::new();
        for (segment, actual) in self.segments.iter().zip(path) {
            match segment {
                Segment::Literal(expected) if expected == actual => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => {
                    params.insert(name.clone(), (*actual).to_string());
                }
            }
        }
        Some(params)
    }
}

/// Non-empty set of roles allowed to view a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedRoles(Vec<Role>);

impl AllowedRoles {
    /// Builds a set from arbitrary roles, rejecting an empty set.
    pub fn new(roles: impl IntoIterator<Item = Role>) -> Result<Self, ValidationError> {
        let mut unique: Vec<Role> = Vec::new();
        for role in roles {
            if !unique.contains(&role) {
                unique.push(role);
            }
        }
        if unique.is_empty() {
            return Err(ValidationError::empty_field("allowed_roles"));
        }
        Ok(Self(unique))
    }

    /// A set containing exactly one role.
    pub fn only(role: Role) -> Self {
        Self(vec![role])
    }

    /// All staff roles.
    pub fn staff() -> Self {
        Self(Role::STAFF.to_vec())
    }

    pub fn contains(&self, role: &Role) -> bool {
        self.0.contains(role)
    }

    pub fn roles(&self) -> &[Role] {
        &self.0
    }
}

/// How a declared route is guarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteAccess {
    /// Visible without a session.
    Public,
    /// Requires a session whose role is in the set.
    Protected(AllowedRoles),
    /// Always forwards elsewhere.
    Redirect(String),
}

/// A declared route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub pattern: RoutePattern,
    pub access: RouteAccess,
}

/// A resolved route together with its captured path parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    pub route: &'a Route,
    pub params: HashMap<String, String>,
}

/// The set of declared routes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn public(mut self, pattern: &str) -> Self {
        self.push(pattern, RouteAccess::Public);
        self
    }

    pub fn protected(mut self, pattern: &str, allowed: AllowedRoles) -> Self {
        self.push(pattern, RouteAccess::Protected(allowed));
        self
    }

    pub fn redirect(mut self, pattern: &str, to: &str) -> Self {
        self.push(pattern, RouteAccess::Redirect(to.to_string()));
        self
    }

    fn push(&mut self, pattern: &str, access: RouteAccess) {
        self.routes.push(Route {
            pattern: RoutePattern::new(pattern),
            access,
        });
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Finds the most specific route matching `path`.
    ///
    /// Query strings, fragments and trailing slashes are ignored. Ties go
    /// to the route declared first.
    pub fn resolve(&self, path: &str) -> Option<RouteMatch<'_>> {
        let segments = split_path(strip_suffixes(path));
        let mut best: Option<RouteMatch<'_>> = None;
        for route in &self.routes {
            let Some(params) = route.pattern.capture(&segments) else {
                continue;
            };
            let better = best
                .as_ref()
                .map_or(true, |b| route.pattern.specificity() > b.route.pattern.specificity());
            if better {
                best = Some(RouteMatch { route, params });
            }
        }
        best
    }

    /// The clinic application's route table.
    pub fn clinic() -> Self {
        let admin = || AllowedRoles::only(Role::Admin);
        let doctor = || AllowedRoles::only(Role::Doctor);
        let frontdesk = || AllowedRoles::only(Role::FrontDesk);

        Self::new()
            .public(LOGIN_PATH)
            .public(UNAUTHORIZED_PATH)
            .public("/style-guide")
            .redirect("/", LOGIN_PATH)
            .protected("/admin", admin())
            .protected("/admin/users", admin())
            .protected("/admin/appointments", admin())
            .protected("/admin/services", admin())
            .protected("/admin/patients", admin())
            .protected("/admin/patients/new", admin())
            .protected("/admin/patients/:id", admin())
            .protected("/admin/reports", admin())
            .protected("/admin/diagnostics", admin())
            .protected("/settings", AllowedRoles::staff())
            .protected("/account-settings", AllowedRoles::staff())
            .protected("/doctor", doctor())
            .protected("/doctor/patients", doctor())
            .protected("/doctor/patients/:id", doctor())
            .protected("/doctor/appointments", doctor())
            .protected("/doctor/schedule", doctor())
            .protected("/doctor/medical-records", doctor())
            .protected("/frontdesk", frontdesk())
            .protected("/frontdesk/appointments", frontdesk())
            .protected("/frontdesk/patients", frontdesk())
            .protected("/frontdesk/patients/new", frontdesk())
            .protected("/frontdesk/patients/:id", frontdesk())
            .protected("/frontdesk/checkout", frontdesk())
    }
}

fn strip_suffixes(path: &str) -> &str {
    let end = path.find(|c: char| c == '?' || c == '#').unwrap_or(path.len());
    &path[..end]
}

fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_routes_beat_parameters() {
        let table = RouteTable::clinic();
        let matched = table.resolve("/admin/patients/new").unwrap();
        assert_eq!(matched.route.pattern.as_str(), "/admin/patients/new");
        assert!(matched.params.is_empty());
    }

    #[test]
    fn parameters_are_captured() {
        let table = RouteTable::clinic();
        let matched = table.resolve("/doctor/patients/p-42").unwrap();
        assert_eq!(matched.route.pattern.as_str(), "/doctor/patients/:id");
        assert_eq!(matched.params.get("id").map(String::as_str), Some("p-42"));
    }

    #[test]
    fn trailing_slash_and_query_are_ignored() {
        let table = RouteTable::clinic();
        assert!(table.resolve("/admin/users/").is_some());
        assert!(table.resolve("/admin/users?page=2").is_some());
        assert!(table.resolve("/doctor#today").is_some());
    }

    #[test]
    fn root_is_declared_as_redirect() {
        let table = RouteTable::clinic();
        let matched = table.resolve("/").unwrap();
        assert_eq!(matched.route.access, RouteAccess::Redirect(LOGIN_PATH.to_string()));
    }

    #[test]
    fn unknown_paths_do_not_resolve() {
        let table = RouteTable::clinic();
        assert!(table.resolve("/billing").is_none());
        assert!(table.resolve("/admin/patients/1/edit").is_none());
    }

    #[test]
    fn allowed_roles_rejects_empty_set_and_dedupes() {
        assert!(AllowedRoles::new(Vec::new()).is_err());
        let roles = AllowedRoles::new([Role::Admin, Role::Admin, Role::Doctor]).unwrap();
        assert_eq!(roles.roles(), &[Role::Admin, Role::Doctor]);
    }

    #[test]
    fn param_pattern_with_bare_colon_is_literal() {
        let table = RouteTable::new().public("/x/:");
        assert!(table.resolve("/x/:").is_some());
        assert!(table.resolve("/x/y").is_none());
    }
}
