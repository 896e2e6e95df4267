//! Property catalogs and the per-version catalog cache
//!
//! A [`PropertyCatalog`] merges each active rule's declared properties with
//! the engine-wide defaults. [`CatalogCache`] guarantees a catalog is built
//! once per (engine version, rule selection).

use crate::error::CatalogError;
use crate::property::Property;
use crate::rule::{RuleSelection, RuleSet, RuleSetCatalog};
use crate::version::EngineVersion;
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Name → property map for one engine configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyCatalog {
    properties: BTreeMap<String, Arc<Property>>,
}

impl PropertyCatalog {
    /// Create empty catalog
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build catalog from rule sets and engine-wide defaults
    ///
    /// Rule-declared properties come first, then the defaults. A property
    /// declared more than once is kept once; two different properties under
    /// the same name are rejected.
    ///
    /// # Errors
    /// - `CatalogError::ConflictingProperty` on a name clash
    pub fn build(
        rule_sets: &[RuleSet],
        engine_properties: Vec<Property>,
    ) -> Result<Self, CatalogError> {
        let mut catalog = Self::new();

        let declared = rule_sets.iter().flat_map(RuleSet::declared_properties);
        for property in declared.chain(engine_properties) {
            catalog.insert(property)?;
        }

        Ok(catalog)
    }

    /// Insert property, ignoring exact duplicates
    ///
    /// # Errors
    /// - `CatalogError::ConflictingProperty` if a different property owns the name
    pub fn insert(&mut self, property: Property) -> Result<(), CatalogError> {
        match self.properties.get(property.name()) {
            Some(existing) if **existing == property => Ok(()),
            Some(existing) => Err(CatalogError::conflicting(
                property.name(),
                existing.owner().map(str::to_string),
                property.owner().map(str::to_string),
            )),
            None => {
                self.properties
                    .insert(property.name().to_string(), Arc::new(property));
                Ok(())
            }
        }
    }

    /// Look up property by name
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<Property>> {
        self.properties.get(name)
    }

    /// Check if name is a known property
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    /// Known property names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    /// Number of properties
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Check if catalog is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

/// Build-once cache of property catalogs
///
/// Keyed by version and rule selection since the active rules decide which
/// properties exist.
#[derive(Debug, Default)]
pub struct CatalogCache {
    inner: DashMap<(EngineVersion, RuleSelection), Arc<PropertyCatalog>>,
}

impl CatalogCache {
    /// Create empty cache
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get catalog for key, building it on first use
    ///
    /// The shard lock is held while building, so concurrent callers for the
    /// same key observe a single build.
    ///
    /// # Errors
    /// - `CatalogError` from [`PropertyCatalog::build`]; nothing is cached on error
    pub fn get_or_build(
        &self,
        version: &EngineVersion,
        selection: &RuleSelection,
        rule_catalog: &dyn RuleSetCatalog,
    ) -> Result<Arc<PropertyCatalog>, CatalogError> {
        let entry = self
            .inner
            .entry((*version, *selection))
            .or_try_insert_with(|| {
                tracing::debug!(%version, experimental = selection.experimental, "building property catalog");
                let rule_sets = rule_catalog.rule_sets(version, selection);
                PropertyCatalog::build(&rule_sets, rule_catalog.engine_properties(version))
                    .map(Arc::new)
            })?;

        Ok(Arc::clone(entry.value()))
    }

    /// Check if a catalog is cached for key
    #[inline]
    #[must_use]
    pub fn contains(&self, version: &EngineVersion, selection: &RuleSelection) -> bool {
        self.inner.contains_key(&(*version, *selection))
    }

    /// Number of cached catalogs
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Check if cache is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::PropertyKind;
    use crate::rule::Rule;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone)]
    struct IndentRule;

    impl Rule for IndentRule {
        fn id(&self) -> &str {
            "indent"
        }

        fn properties(&self) -> Vec<Property> {
            vec![indent_size()]
        }

        fn boxed_clone(&self) -> Box<dyn Rule> {
            Box::new(self.clone())
        }
    }

    fn indent_size() -> Property {
        Property::new("indent_size", PropertyKind::Integer, 4)
    }

    #[derive(Default)]
    struct CountingCatalog {
        builds: AtomicUsize,
    }

    impl RuleSetCatalog for CountingCatalog {
        fn rule_sets(&self, _version: &EngineVersion, _selection: &RuleSelection) -> Vec<RuleSet> {
            self.builds.fetch_add(1, Ordering::SeqCst);
            vec![RuleSet::new("standard", vec![Box::new(IndentRule)])]
        }

        fn engine_properties(&self, version: &EngineVersion) -> Vec<Property> {
            let mut properties = vec![
                indent_size(),
                Property::new("insert_final_newline", PropertyKind::Boolean, true),
            ];
            if version.at_least(&EngineVersion::new(0, 46, 0)) {
                properties.push(Property::new(
                    "code_style",
                    PropertyKind::Choice(vec!["official".to_string(), "android".to_string()]),
                    "official",
                ));
            }
            properties
        }
    }

    #[test]
    fn build_merges_rules_and_defaults() {
        let catalog_source = CountingCatalog::default();
        let version = EngineVersion::new(0, 45, 2);
        let sets = catalog_source.rule_sets(&version, &RuleSelection::standard());
        let catalog =
            PropertyCatalog::build(&sets, catalog_source.engine_properties(&version)).unwrap();

        assert_eq!(catalog.len(), 2);
        assert!(catalog.contains("indent_size"));
        assert!(catalog.contains("insert_final_newline"));
        assert_eq!(
            catalog.names().collect::<Vec<_>>(),
            vec!["indent_size", "insert_final_newline"]
        );
    }

    #[test]
    fn build_rejects_conflicting_definitions() {
        let sets = vec![RuleSet::new("standard", vec![Box::new(IndentRule)])];
        let clash = Property::new("indent_size", PropertyKind::Text, "tab");
        let err = PropertyCatalog::build(&sets, vec![clash]).unwrap_err();
        assert!(matches!(err, CatalogError::ConflictingProperty { ref name, .. } if name == "indent_size"));
    }

    #[test]
    fn cache_builds_once_per_key() {
        let source = CountingCatalog::default();
        let cache = CatalogCache::new();
        let v1 = EngineVersion::new(0, 45, 2);
        let v2 = EngineVersion::new(0, 46, 0);

        let a = cache.get_or_build(&v1, &RuleSelection::standard(), &source).unwrap();
        let b = cache.get_or_build(&v1, &RuleSelection::standard(), &source).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(source.builds.load(Ordering::SeqCst), 1);

        cache.get_or_build(&v2, &RuleSelection::standard(), &source).unwrap();
        cache.get_or_build(&v1, &RuleSelection::with_experimental(), &source).unwrap();
        assert_eq!(source.builds.load(Ordering::SeqCst), 3);
        assert_eq!(cache.len(), 3);
        assert!(cache.contains(&v2, &RuleSelection::standard()));
    }

    #[test]
    fn catalogs_follow_engine_version() {
        let source = CountingCatalog::default();
        let cache = CatalogCache::new();
        let older = EngineVersion::new(0, 45, 2);
        let newer = EngineVersion::new(0, 46, 1);

        let a = cache.get_or_build(&older, &RuleSelection::standard(), &source).unwrap();
        let b = cache.get_or_build(&newer, &RuleSelection::standard(), &source).unwrap();

        assert!(!a.contains("code_style"));
        assert!(b.contains("code_style"));
        assert_ne!(*a, *b);
    }
}
