//! Identity resolution across inconsistently-named identifier fields.
//!
//! The same account arrives as `id` from one endpoint, `sub` from the
//! identity provider and `uniqueId` from a transformer. Mutations by id
//! must treat all of them as the same key.
//!
//! # Contracts
//!
//! | Operation | Expected matches | On violation |
//! |-----------|------------------|--------------|
//! | update / enable / disable | exactly one | warn, patch first match (or nothing) |
//! | delete | exactly one | warn, remove every match |

use std::borrow::Cow;
use std::fmt;

use serde_json::Value;

use super::Entity;
use crate::domain::foundation::ValidationError;

/// Recognised identifier fields in resolution order.
pub const DEFAULT_IDENTIFIER_FIELDS: [&str; 3] = ["id", "sub", "uniqueId"];

/// Matches entities against an identifier value using an ordered, fixed
/// set of recognised identifier fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityResolver {
    fields: Vec<String>,
}

impl Default for IdentityResolver {
    fn default() -> Self {
        Self {
            fields: DEFAULT_IDENTIFIER_FIELDS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

impl IdentityResolver {
    /// Creates a resolver over a custom ordered field list.
    pub fn with_fields<I, S>(fields: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        if fields.is_empty() || fields.iter().any(|f| f.trim().is_empty()) {
            return Err(ValidationError::empty_field("identifier_fields"));
        }
        Ok(Self { fields })
    }

    /// The recognised fields, in resolution order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Returns the first populated recognised identifier of the entity.
    ///
    /// `None` means the entity can never be matched by id.
    pub fn canonical_key<'a>(&self, entity: &'a Entity) -> Option<Cow<'a, str>> {
        self.fields
            .iter()
            .find_map(|field| entity.get(field).and_then(identifier_text))
    }

    /// Returns true if any recognised identifier of the entity equals `candidate`.
    pub fn matches(&self, entity: &Entity, candidate: &str) -> bool {
        if candidate.is_empty() {
            return false;
        }
        self.fields.iter().any(|field| {
            entity
                .get(field)
                .and_then(identifier_text)
                .is_some_and(|value| value == candidate)
        })
    }

    /// Positions of every entity matching `candidate`, in collection order.
    pub fn positions(&self, items: &[Entity], candidate: &str) -> Vec<usize> {
        items
            .iter()
            .enumerate()
            .filter(|(_, entity)| self.matches(entity, candidate))
            .map(|(index, _)| index)
            .collect()
    }

    /// Resolves `candidate` under an "exactly one match" contract.
    ///
    /// Zero or multiple matches are reported as a [`ConsistencyWarning`],
    /// which is also logged. The positions are returned either way so the
    /// caller can apply its own duplicate policy.
    pub fn resolve(&self, items: &[Entity], candidate: &str, operation: &'static str) -> Resolution {
        let positions = self.positions(items, candidate);
        let warning = match positions.len() {
            1 => None,
            0 => Some(ConsistencyWarning::NoMatch {
                operation,
                id: candidate.to_string(),
            }),
            count => Some(ConsistencyWarning::MultipleMatches {
                operation,
                id: candidate.to_string(),
                count,
            }),
        };
        if let Some(warning) = &warning {
            warning.emit();
        }
        Resolution { positions, warning }
    }
}

/// Result of resolving an id against a local collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub positions: Vec<usize>,
    pub warning: Option<ConsistencyWarning>,
}

impl Resolution {
    /// Position of the first match.
    pub fn first(&self) -> Option<usize> {
        self.positions.first().copied()
    }
}

/// A non-fatal inconsistency between the local cache and a confirmed
/// server mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsistencyWarning {
    /// The server confirmed a mutation for an id the cache does not hold.
    NoMatch { operation: &'static str, id: String },

    /// Several cached entities share the id (upstream duplicates).
    MultipleMatches {
        operation: &'static str,
        id: String,
        count: usize,
    },
}

impl ConsistencyWarning {
    /// Number of cached entities that matched.
    pub fn match_count(&self) -> usize {
        match self {
            ConsistencyWarning::NoMatch { .. } => 0,
            ConsistencyWarning::MultipleMatches { count, .. } => *count,
        }
    }

    fn emit(&self) {
        match self {
            ConsistencyWarning::NoMatch { operation, id } => tracing::warn!(
                operation = *operation,
                id = %id,
                matches = 0,
                "Confirmed mutation matched no cached entity"
            ),
            ConsistencyWarning::MultipleMatches { operation, id, count } => tracing::warn!(
                operation = *operation,
                id = %id,
                matches = *count,
                "Confirmed mutation matched several cached entities"
            ),
        }
    }
}

impl fmt::Display for ConsistencyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsistencyWarning::NoMatch { operation, id } => {
                write!(f, "{operation}: no cached entity matches id '{id}'")
            }
            ConsistencyWarning::MultipleMatches { operation, id, count } => {
                write!(f, "{operation}: {count} cached entities match id '{id}'")
            }
        }
    }
}

fn identifier_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) if !s.is_empty() => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        _ => None,
    }
}
