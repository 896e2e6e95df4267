//! Immutable pipeline steps
//!
//! A [`Step`] is frozen configuration plus the function that applies it.
//! Steps are never edited; a configuration change builds a new step that
//! replaces the old one in the pipeline.

use crate::error::FormatError;
use crate::fingerprint::Fingerprint;
use crate::func::FormatterFunc;
use fmtstep_engine::{EngineVersion, RuleSelection};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Preference file captured at build time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceFile {
    /// Location on disk
    pub path: PathBuf,
    /// Fingerprint of the file content when the step was built
    pub checksum: String,
}

/// Configuration snapshot of an engine-backed step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineStepConfig {
    /// Engine version in use
    pub version: EngineVersion,
    /// Active rule sets
    pub selection: RuleSelection,
    /// Script grammar
    pub script: bool,
    /// Opaque user data
    pub user_data: BTreeMap<String, String>,
    /// Resolved overrides; `None` when none were requested
    pub overrides: Option<BTreeMap<String, Value>>,
    /// Preference files with content checksums
    pub preferences: Vec<PreferenceFile>,
    /// Artifact mirror mappings
    pub mirrors: BTreeMap<String, String>,
}

/// One configured, pipeline-positioned unit of formatting work
#[derive(Clone)]
pub struct Step {
    name: String,
    snapshot: Value,
    fingerprint: Fingerprint,
    func: Arc<dyn FormatterFunc>,
}

impl Step {
    /// Freeze configuration and function into a step
    ///
    /// # Errors
    /// Returns error if the configuration cannot be encoded as JSON
    pub fn new<C: Serialize>(
        name: impl Into<String>,
        config: &C,
        func: Arc<dyn FormatterFunc>,
    ) -> Result<Self, serde_json::Error> {
        let name = name.into();
        let snapshot = serde_json::to_value(config)?;
        let fingerprint = Fingerprint::compute_serializable(&(&name, &snapshot))?;
        Ok(Self {
            name,
            snapshot,
            fingerprint,
            func,
        })
    }

    /// Step name; unique within a pipeline
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical configuration snapshot
    #[inline]
    #[must_use]
    pub fn snapshot(&self) -> &Value {
        &self.snapshot
    }

    /// Decode snapshot into a typed configuration
    ///
    /// # Errors
    /// Returns error if the snapshot has a different shape
    pub fn config<C: serde::de::DeserializeOwned>(&self) -> Result<C, serde_json::Error> {
        serde_json::from_value(self.snapshot.clone())
    }

    /// Fingerprint of name and configuration
    #[inline]
    #[must_use]
    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    /// Check configuration equality (not identity)
    #[inline]
    #[must_use]
    pub fn same_config(&self, other: &Step) -> bool {
        self.fingerprint == other.fingerprint
    }

    /// Formatter function
    #[inline]
    #[must_use]
    pub fn func(&self) -> &Arc<dyn FormatterFunc> {
        &self.func
    }

    /// Format one file with this step
    ///
    /// # Errors
    /// - `FormatError` from the wrapped function
    #[inline]
    pub fn apply(&self, content: &str, file: &Path) -> Result<String, FormatError> {
        self.func.apply(content, file)
    }
}

impl PartialEq for Step {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.same_config(other)
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("name", &self.name)
            .field("fingerprint", &self.fingerprint.short())
            .field("snapshot", &self.snapshot)
            .finish_non_exhaustive()
    }
}
