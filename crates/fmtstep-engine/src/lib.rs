//! fmtstep Engine Layer
//!
//! The vocabulary shared between the formatting pipeline and the external
//! formatting engines it wraps.
//!
//! # Core Concepts
//!
//! - [`Engine`]: downstream collaborator that formats one file's content
//! - [`RuleSetCatalog`]: explicit source of rule sets and engine-wide properties
//! - [`PropertyCatalog`]: name → [`Property`] map built once per engine version
//! - [`PropertyOverrideResolver`]: reconciles raw overrides against a catalog
//! - [`Diagnostic`] / [`DiagnosticFlow`]: findings and the callback verdict
//!
//! # Architecture
//!
//! ```text
//! RuleSetCatalog ──► PropertyCatalog (CatalogCache, once per version)
//!                          │
//! OverrideRequest ─────────┴──► PropertyOverrideResolver ──► ResolvedOverride
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use fmtstep_engine::{CatalogCache, OverrideRequest, PropertyOverrideResolver, RuleSelection};
//!
//! let cache = CatalogCache::new();
//! let catalog = cache.get_or_build(&version, &RuleSelection::standard(), rule_catalog.as_ref())?;
//!
//! let mut request = OverrideRequest::new();
//! request.insert("indent_size", 4);
//! let resolved = PropertyOverrideResolver::resolve(&request, &catalog);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod catalog;
pub mod diagnostic;
pub mod engine;
pub mod error;
pub mod overrides;
pub mod property;
pub mod rule;
pub mod version;

// Re-exports
pub use catalog::{CatalogCache, PropertyCatalog};
pub use diagnostic::{Diagnostic, DiagnosticFlow, Location};
pub use engine::{DiagnosticCallback, Engine, EngineProvider, EngineSettings, FormatRequest};
pub use error::{CatalogError, EngineError, VersionError};
pub use overrides::{OverrideRequest, OverrideResolution, PropertyOverrideResolver, ResolvedOverride};
pub use property::{Property, PropertyKind};
pub use rule::{Rule, RuleSelection, RuleSet, RuleSetCatalog};
pub use version::EngineVersion;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
