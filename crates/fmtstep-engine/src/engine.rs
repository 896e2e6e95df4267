//! Formatting engine contract
//!
//! The engine is a downstream collaborator: it receives content plus rules
//! and returns formatted content, reporting each finding through a callback.
//! Two call shapes exist because override support arrived in later engine
//! versions.

use crate::diagnostic::{Diagnostic, DiagnosticFlow};
use crate::error::EngineError;
use crate::overrides::ResolvedOverride;
use crate::rule::RuleSet;
use crate::version::EngineVersion;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Per-call input handed to the engine
#[derive(Debug, Clone, Copy)]
pub struct FormatRequest<'a> {
    /// File name (not the full path)
    pub file_name: &'a str,
    /// Line-ending normalized content
    pub content: &'a str,
    /// Opaque user data forwarded untouched
    pub user_data: &'a BTreeMap<String, String>,
    /// Script grammar instead of regular source
    pub script: bool,
}

/// Callback invoked once per finding
pub type DiagnosticCallback<'a> = dyn FnMut(&Diagnostic) -> DiagnosticFlow + 'a;

/// External formatting engine
pub trait Engine: Send + Sync {
    /// Installed engine version
    fn version(&self) -> EngineVersion;

    /// Whether [`Engine::format_with_overrides`] is available
    fn supports_overrides(&self) -> bool {
        false
    }

    /// Whether concurrent calls are safe without external locking
    fn is_reentrant(&self) -> bool {
        false
    }

    /// Legacy call shape
    ///
    /// # Errors
    /// - `EngineError::Aborted` when the callback returned `Abort`
    /// - any engine-specific failure
    fn format(
        &self,
        request: FormatRequest<'_>,
        rule_sets: &mut [RuleSet],
        on_diagnostic: &mut DiagnosticCallback<'_>,
    ) -> Result<String, EngineError>;

    /// Override-aware call shape
    ///
    /// # Errors
    /// - `EngineError::Unsupported` unless the engine overrides this method
    fn format_with_overrides(
        &self,
        request: FormatRequest<'_>,
        rule_sets: &mut [RuleSet],
        overrides: &ResolvedOverride,
        on_diagnostic: &mut DiagnosticCallback<'_>,
    ) -> Result<String, EngineError> {
        let _ = (request, rule_sets, overrides, on_diagnostic);
        Err(EngineError::unsupported(self.version(), "editorconfig overrides"))
    }
}

/// Engine-specific auxiliary settings
///
/// Passed to the provider without interpretation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// External preference files
    pub preferences: Vec<PathBuf>,
    /// Artifact mirror mappings (source URL prefix → mirror URL prefix)
    pub mirrors: BTreeMap<String, String>,
}

/// Supplies engine instances by version
pub trait EngineProvider: Send + Sync {
    /// Version used when the caller does not pick one
    fn default_version(&self) -> EngineVersion;

    /// Engine for `version` configured with `settings`
    ///
    /// # Errors
    /// - `EngineError::VersionUnavailable` if the version cannot be provided
    fn engine(
        &self,
        version: &EngineVersion,
        settings: &EngineSettings,
    ) -> Result<Arc<dyn Engine>, EngineError>;
}
