//! Property catalog and override resolution tests
//!
//! Covers concurrent catalog caching and the subset guarantees of
//! override resolution.

use fmtstep_engine::{
    CatalogCache, EngineVersion, OverrideRequest, Property, PropertyCatalog, PropertyKind,
    PropertyOverrideResolver, Rule, RuleSelection, RuleSet, RuleSetCatalog,
};
use proptest::prelude::*;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone)]
struct WrappingRule;

impl Rule for WrappingRule {
    fn id(&self) -> &str {
        "wrapping"
    }

    fn properties(&self) -> Vec<Property> {
        vec![Property::new("max_line_length", PropertyKind::Integer, 120).owned_by("wrapping")]
    }

    fn boxed_clone(&self) -> Box<dyn Rule> {
        Box::new(self.clone())
    }
}

#[derive(Default)]
struct SlowCatalog {
    builds: AtomicUsize,
}

impl RuleSetCatalog for SlowCatalog {
    fn rule_sets(&self, _version: &EngineVersion, _selection: &RuleSelection) -> Vec<RuleSet> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(std::time::Duration::from_millis(5));
        vec![RuleSet::new("standard", vec![Box::new(WrappingRule)])]
    }

    fn engine_properties(&self, _version: &EngineVersion) -> Vec<Property> {
        vec![
            Property::new("indent_size", PropertyKind::Integer, 4),
            Property::new("insert_final_newline", PropertyKind::Boolean, true),
        ]
    }
}

const CATALOG_KEYS: [&str; 3] = ["indent_size", "insert_final_newline", "max_line_length"];

fn catalog() -> PropertyCatalog {
    let source = SlowCatalog::default();
    let version = EngineVersion::new(0, 46, 1);
    PropertyCatalog::build(
        &source.rule_sets(&version, &RuleSelection::standard()),
        source.engine_properties(&version),
    )
    .unwrap()
}

#[test]
fn test_cache_single_build_under_contention() {
    let source = SlowCatalog::default();
    let cache = CatalogCache::new();
    let version = EngineVersion::new(0, 46, 1);

    let catalogs: Vec<Arc<PropertyCatalog>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(|| {
                    cache
                        .get_or_build(&version, &RuleSelection::standard(), &source)
                        .unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(source.builds.load(Ordering::SeqCst), 1);
    assert!(catalogs.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
}

#[test]
fn test_rule_owner_recorded() {
    let catalog = catalog();
    assert_eq!(catalog.get("max_line_length").unwrap().owner(), Some("wrapping"));
    assert_eq!(catalog.get("indent_size").unwrap().owner(), None);
}

#[test]
fn test_resolution_example() {
    let request: OverrideRequest = [("indent_size", json!(4)), ("unknown_prop", json!("x"))]
        .into_iter()
        .collect();
    let resolved = PropertyOverrideResolver::resolve(&request, &catalog());

    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved.get("indent_size"), Some(&json!(4)));
    assert!(!resolved.contains("unknown_prop"));
}

proptest! {
    #[test]
    fn prop_known_keys_all_resolved(
        picks in proptest::collection::btree_map(0..3usize, any::<i64>(), 0..3)
    ) {
        let request: OverrideRequest = picks
            .iter()
            .map(|(idx, value)| (CATALOG_KEYS[*idx], json!(value)))
            .collect();
        let resolved = PropertyOverrideResolver::resolve(&request, &catalog());

        prop_assert_eq!(resolved.len(), request.len());
        for (key, value) in request.iter() {
            prop_assert_eq!(resolved.get(key), Some(value));
        }
    }

    #[test]
    fn prop_unknown_keys_dropped(
        unknown in proptest::collection::btree_set("[a-z]{3,8}_x", 1..5),
        value in any::<bool>()
    ) {
        let mut request: OverrideRequest = unknown
            .iter()
            .map(|key| (key.clone(), json!(value)))
            .collect();
        request.insert("indent_size", 2);

        let resolved = PropertyOverrideResolver::resolve(&request, &catalog());

        prop_assert_eq!(resolved.len(), 1);
        prop_assert_eq!(resolved.get("indent_size"), Some(&json!(2)));
        for key in &unknown {
            prop_assert!(!resolved.contains(key));
        }
    }
}
