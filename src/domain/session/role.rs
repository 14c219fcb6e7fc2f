//! Staff roles recognised by the route gate.

use std::fmt;

/// Role of an authenticated user.
///
/// Parsed leniently from the identity provider's `custom:role` attribute.
/// Anything unrecognised is kept as [`Role::Other`] under its normalised
/// name, so it only passes routes that list that exact name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    Doctor,
    FrontDesk,
    Other(String),
}

impl Role {
    /// Every role that may sign into the staff application.
    pub const STAFF: [Role; 3] = [Role::Admin, Role::Doctor, Role::FrontDesk];

    /// Parses a raw role attribute, ignoring case and separators.
    pub fn parse(raw: &str) -> Self {
        let normalised: String = raw
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        match normalised.as_str() {
            "admin" => Role::Admin,
            "doctor" => Role::Doctor,
            "frontdesk" => Role::FrontDesk,
            _ => Role::Other(normalised),
        }
    }

    /// Canonical lowercase name.
    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "admin",
            Role::Doctor => "doctor",
            Role::FrontDesk => "frontdesk",
            Role::Other(name) => name,
        }
    }

    /// The dashboard a role lands on after sign-in.
    pub fn home_path(&self) -> Option<&'static str> {
        match self {
            Role::Admin => Some("/admin"),
            Role::Doctor => Some("/doctor"),
            Role::FrontDesk => Some("/frontdesk"),
            Role::Other(_) => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
