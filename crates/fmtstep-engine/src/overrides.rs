//! Override resolution against a property catalog
//!
//! Callers supply a flat `key → value` map. Only keys the catalog knows
//! survive; everything else is dropped without error so one override map
//! can be used across engine versions that expose different properties.
//! Values are passed through untouched; the engine validates them.

use crate::catalog::PropertyCatalog;
use crate::property::Property;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Raw, weakly-typed override map supplied by the user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OverrideRequest {
    entries: BTreeMap<String, Value>,
}

impl OverrideRequest {
    /// Create empty request
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace one override
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Merge another request on top of this one
    pub fn extend(&mut self, other: OverrideRequest) {
        self.entries.extend(other.entries);
    }

    /// Value for key
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of requested overrides
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing was requested
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for OverrideRequest {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Overrides restricted to properties present in a catalog
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedOverride {
    entries: Vec<(Arc<Property>, Value)>,
}

impl ResolvedOverride {
    /// Value for property name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(p, _)| p.name() == name)
            .map(|(_, v)| v)
    }

    /// Check if property name is overridden
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// `(property, value)` pairs in key order
    pub fn iter(&self) -> impl Iterator<Item = (&Property, &Value)> {
        self.entries.iter().map(|(p, v)| (p.as_ref(), v))
    }

    /// Name → value view for snapshots and logging
    #[must_use]
    pub fn to_pairs(&self) -> BTreeMap<String, Value> {
        self.entries
            .iter()
            .map(|(p, v)| (p.name().to_string(), v.clone()))
            .collect()
    }

    /// Number of resolved overrides
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no override survived resolution
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Outcome of resolving a request
///
/// "Nothing requested" and "requested but nothing known" are different:
/// the first selects the legacy engine call, the second still uses the
/// override-aware call with an empty set.
#[derive(Debug, Clone, PartialEq)]
pub enum OverrideResolution {
    /// Request was empty; resolution skipped
    NotRequested,
    /// Request was non-empty; holds the surviving overrides
    Resolved(ResolvedOverride),
}

impl OverrideResolution {
    /// Resolved overrides, if any were requested
    #[inline]
    #[must_use]
    pub fn resolved(&self) -> Option<&ResolvedOverride> {
        match self {
            Self::NotRequested => None,
            Self::Resolved(resolved) => Some(resolved),
        }
    }

    /// Check if overrides were requested at all
    #[inline]
    #[must_use]
    pub fn is_requested(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

/// Reconciles override requests against property catalogs
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertyOverrideResolver;

impl PropertyOverrideResolver {
    /// Keep every requested key the catalog knows, drop the rest
    #[must_use]
    pub fn resolve(request: &OverrideRequest, catalog: &PropertyCatalog) -> ResolvedOverride {
        let entries = request
            .iter()
            .filter_map(|(key, value)| match catalog.get(key) {
                Some(property) => Some((Arc::clone(property), value.clone())),
                None => {
                    tracing::debug!(key, "dropping override for unknown property");
                    None
                }
            })
            .collect();

        ResolvedOverride { entries }
    }

    /// Resolve unless the request is empty
    #[must_use]
    pub fn resolution(request: &OverrideRequest, catalog: &PropertyCatalog) -> OverrideResolution {
        if request.is_empty() {
            OverrideResolution::NotRequested
        } else {
            OverrideResolution::Resolved(Self::resolve(request, catalog))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::PropertyKind;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::json;

    fn catalog_of(names: &[&str]) -> PropertyCatalog {
        let mut catalog = PropertyCatalog::new();
        for name in names {
            catalog
                .insert(Property::new(*name, PropertyKind::Text, ""))
                .unwrap();
        }
        catalog
    }

    #[test]
    fn unknown_keys_are_dropped() {
        let catalog = catalog_of(&["indent_size"]);
        let request: OverrideRequest =
            [("indent_size", json!(4)), ("unknown_prop", json!("x"))].into_iter().collect();

        let resolved = PropertyOverrideResolver::resolve(&request, &catalog);

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved.get("indent_size"), Some(&json!(4)));
        assert!(!resolved.contains("unknown_prop"));
    }

    #[test]
    fn values_are_not_validated() {
        let mut catalog = PropertyCatalog::new();
        catalog
            .insert(Property::new("indent_size", PropertyKind::Integer, 4))
            .unwrap();
        let mut request = OverrideRequest::new();
        request.insert("indent_size", "not a number");

        let resolved = PropertyOverrideResolver::resolve(&request, &catalog);
        assert_eq!(resolved.get("indent_size"), Some(&json!("not a number")));
    }

    #[test]
    fn empty_request_is_not_requested() {
        let catalog = catalog_of(&["indent_size"]);
        let resolution = PropertyOverrideResolver::resolution(&OverrideRequest::new(), &catalog);
        assert_eq!(resolution, OverrideResolution::NotRequested);
        assert!(resolution.resolved().is_none());
    }

    #[test]
    fn all_unknown_is_still_requested() {
        let catalog = catalog_of(&["indent_size"]);
        let request: OverrideRequest = [("typo_size", 2)].into_iter().collect();
        let resolution = PropertyOverrideResolver::resolution(&request, &catalog);

        assert!(resolution.is_requested());
        assert!(resolution.resolved().is_some_and(ResolvedOverride::is_empty));
    }

    #[test]
    fn to_pairs_keeps_key_order() {
        let catalog = catalog_of(&["b", "a"]);
        let request: OverrideRequest = [("b", 2), ("a", 1)].into_iter().collect();
        let pairs = PropertyOverrideResolver::resolve(&request, &catalog).to_pairs();
        assert_eq!(pairs.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    fn key() -> impl Strategy<Value = String> {
        "[a-z_]{1,12}"
    }

    proptest! {
        #[test]
        fn prop_known_keys_all_survive(
            entries in proptest::collection::btree_map(key(), any::<i64>(), 0..16)
        ) {
            let names: Vec<&str> = entries.keys().map(String::as_str).collect();
            let catalog = catalog_of(&names);
            let request: OverrideRequest = entries.clone().into_iter().collect();

            let resolved = PropertyOverrideResolver::resolve(&request, &catalog);
            prop_assert_eq!(resolved.len(), request.len());
        }

        #[test]
        fn prop_resolution_is_restricted_to_catalog(
            known in proptest::collection::btree_map(key(), any::<i64>(), 0..8),
            unknown in proptest::collection::btree_map("[A-Z]{1,8}", any::<i64>(), 0..8)
        ) {
            let names: Vec<&str> = known.keys().map(String::as_str).collect();
            let catalog = catalog_of(&names);
            let request: OverrideRequest = known.clone().into_iter().chain(unknown.clone()).collect();

            let resolved = PropertyOverrideResolver::resolve(&request, &catalog);

            for (name, _) in resolved.iter() {
                prop_assert!(catalog.contains(name.name()));
            }
            for key in unknown.keys() {
                prop_assert!(!resolved.contains(key));
            }
            for (key, value) in &known {
                prop_assert_eq!(resolved.get(key), Some(&json!(value)));
            }
        }
    }
}
