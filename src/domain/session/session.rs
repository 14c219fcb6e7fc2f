//! The authenticated session.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use super::Role;
use crate::ports::TokenProvider;

/// Role attribute used when the identity provider supplies none.
pub const DEFAULT_ROLE: &str = "user";

/// Errors building a session from identity-provider output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Invalid ID token: {0}")]
    InvalidToken(String),

    #[error("ID token has no subject")]
    MissingSubject,
}

/// Claims read from an ID token.
///
/// Remaining claims are kept verbatim as session attributes.
#[derive(Debug, Clone, Deserialize)]
pub struct IdTokenClaims {
    #[serde(default)]
    pub sub: Option<String>,

    #[serde(rename = "custom:role", default)]
    pub role: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl IdTokenClaims {
    /// Reads the claims without checking the signature.
    ///
    /// Every backend call re-validates the token, so the client only needs
    /// the identity and role to drive routing.
    pub fn decode_unverified(token: &str) -> Result<Self, SessionError> {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims = HashSet::new();

        jsonwebtoken::decode::<IdTokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)
            .map(|data| data.claims)
            .map_err(|e| SessionError::InvalidToken(e.to_string()))
    }
}

/// An authenticated browsing session.
///
/// Immutable; a role or attribute refresh produces a new value which the
/// [`SessionContext`](super::SessionContext) swaps in.
#[derive(Clone)]
pub struct Session {
    user_id: String,
    display_role: String,
    attributes: Map<String, Value>,
    tokens: Arc<dyn TokenProvider>,
}

impl Session {
    /// Creates a session with no extra attributes.
    pub fn new(
        user_id: impl Into<String>,
        display_role: impl Into<String>,
        tokens: Arc<dyn TokenProvider>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            display_role: display_role.into(),
            attributes: Map::new(),
            tokens,
        }
    }

    /// Builds a session from an ID token's claims.
    pub fn from_id_token(token: &str, tokens: Arc<dyn TokenProvider>) -> Result<Self, SessionError> {
        let claims = IdTokenClaims::decode_unverified(token)?;
        let user_id = claims
            .sub
            .filter(|sub| !sub.is_empty())
            .ok_or(SessionError::MissingSubject)?;
        let role = claims.role.unwrap_or_else(|| DEFAULT_ROLE.to_string());

        Ok(Self {
            user_id,
            display_role: role,
            attributes: claims.extra,
            tokens,
        })
    }

    /// Adds raw attributes.
    pub fn with_attributes(mut self, attributes: Map<String, Value>) -> Self {
        self.attributes = attributes;
        self
    }

    /// Returns a copy with the role and attributes replaced.
    pub fn refreshed(&self, display_role: impl Into<String>, attributes: Map<String, Value>) -> Self {
        Self {
            user_id: self.user_id.clone(),
            display_role: display_role.into(),
            attributes,
            tokens: Arc::clone(&self.tokens),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// The role as the identity provider spelled it.
    pub fn display_role(&self) -> &str {
        &self.display_role
    }

    /// The parsed role used for authorization.
    pub fn role(&self) -> Role {
        Role::parse(&self.display_role)
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// Returns a string attribute such as `email` or `cognito:username`.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(Value::as_str)
    }

    /// The credential source every outbound call should use.
    pub fn token_provider(&self) -> Arc<dyn TokenProvider> {
        Arc::clone(&self.tokens)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("display_role", &self.display_role)
            .field("attributes", &self.attributes)
            .finish_non_exhaustive()
    }
}
