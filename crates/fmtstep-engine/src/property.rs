//! Configurable engine properties
//!
//! A [`Property`] is a named, typed configuration point exposed either by a
//! single rule or by the engine as a whole.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Declared type of a property value
///
/// The declared type is informational; values are never validated against
/// it here. The engine checks values when it applies them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "values")]
pub enum PropertyKind {
    /// `true` / `false`
    Boolean,
    /// Signed integer
    Integer,
    /// Free-form string
    Text,
    /// One of a fixed set of string values
    Choice(Vec<String>),
}

/// Named configuration point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    name: String,
    kind: PropertyKind,
    default: Value,
    owner: Option<String>,
}

impl Property {
    /// Create engine-wide property
    #[must_use]
    pub fn new(name: impl Into<String>, kind: PropertyKind, default: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            kind,
            default: default.into(),
            owner: None,
        }
    }

    /// Mark property as owned by a rule
    #[inline]
    #[must_use]
    pub fn owned_by(mut self, rule_id: impl Into<String>) -> Self {
        self.owner = Some(rule_id.into());
        self
    }

    /// Property name (override key)
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &PropertyKind {
        &self.kind
    }

    /// Default value
    #[inline]
    #[must_use]
    pub fn default_value(&self) -> &Value {
        &self.default
    }

    /// Owning rule, `None` for engine-wide properties
    #[inline]
    #[must_use]
    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }
}
