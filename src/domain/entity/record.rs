//! Generic entity record (user, patient, appointment).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field name of the account enabled flag patched by enable/disable.
pub const ENABLED_FIELD: &str = "enabled";

/// A loosely-typed record as returned by the backend.
///
/// Source APIs disagree on field naming, so the record stays a plain
/// field map and callers read what they need.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entity(Map<String, Value>);

impl Entity {
    /// Creates an empty entity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field insertion.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Sets a field, returning the previous value.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    /// Returns a field's raw value.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Returns a field as a string slice, if it is a JSON string.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    /// Returns true if the field is present (even if null).
    pub fn has_field(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Returns the enabled flag, if the record carries one.
    pub fn enabled(&self) -> Option<bool> {
        self.0.get(ENABLED_FIELD).and_then(Value::as_bool)
    }

    /// Patches the enabled flag in place.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.0.insert(ENABLED_FIELD.to_string(), Value::Bool(enabled));
    }

    /// Returns the underlying field map.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consumes the entity, returning the field map.
    pub fn into_fields(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Entity {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}
