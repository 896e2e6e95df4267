//! Rules, rule sets and the catalog that supplies them
//!
//! Rules are engine-owned objects that may keep mutable scratch state between
//! calls, which is why the engine receives them by `&mut`.

use crate::property::Property;
use crate::version::EngineVersion;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single style check or transformation unit within an engine
pub trait Rule: Send + Sync + fmt::Debug {
    /// Stable rule identifier
    fn id(&self) -> &str;

    /// Properties this rule reads from configuration
    fn properties(&self) -> Vec<Property> {
        Vec::new()
    }

    /// Fresh copy of this rule with its own scratch state
    fn boxed_clone(&self) -> Box<dyn Rule>;
}

/// Named collection of rules
#[derive(Debug)]
pub struct RuleSet {
    id: String,
    rules: Vec<Box<dyn Rule>>,
}

impl RuleSet {
    /// Create rule set
    #[must_use]
    pub fn new(id: impl Into<String>, rules: Vec<Box<dyn Rule>>) -> Self {
        Self {
            id: id.into(),
            rules,
        }
    }

    /// Rule set identifier
    #[inline]
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Rules in declaration order
    #[inline]
    #[must_use]
    pub fn rules(&self) -> &[Box<dyn Rule>] {
        &self.rules
    }

    /// Mutable access for engines that drive rule state
    #[inline]
    pub fn rules_mut(&mut self) -> &mut [Box<dyn Rule>] {
        &mut self.rules
    }

    /// Properties declared by every rule in this set
    pub fn declared_properties(&self) -> impl Iterator<Item = Property> + '_ {
        self.rules.iter().flat_map(|rule| rule.properties())
    }
}

impl Clone for RuleSet {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            rules: self.rules.iter().map(|r| r.boxed_clone()).collect(),
        }
    }
}

/// Which rule sets are active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RuleSelection {
    /// Include the experimental rule set on top of the standard one
    pub experimental: bool,
}

impl RuleSelection {
    /// Standard rules only
    #[inline]
    #[must_use]
    pub const fn standard() -> Self {
        Self {
            experimental: false,
        }
    }

    /// Standard plus experimental rules
    #[inline]
    #[must_use]
    pub const fn with_experimental() -> Self {
        Self { experimental: true }
    }
}

/// Source of rule sets and engine-wide default properties
///
/// Both depend on the engine version: rules and properties come and go
/// between releases. Passed explicitly to catalog construction and to the
/// invoker, so test suites can substitute fakes.
pub trait RuleSetCatalog: Send + Sync {
    /// Rule sets shipped with `version` and active for `selection`, standard set first
    fn rule_sets(&self, version: &EngineVersion, selection: &RuleSelection) -> Vec<RuleSet>;

    /// Properties `version` understands regardless of rules
    fn engine_properties(&self, version: &EngineVersion) -> Vec<Property>;
}
