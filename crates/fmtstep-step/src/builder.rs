//! Step builder
//!
//! [`StepBuilder`] stages engine configuration across several calls and
//! freezes it into a [`Step`] on [`StepBuilder::build`]. Overrides are kept
//! raw and resolved again on every build, against the catalog of whatever
//! version is selected at that moment.
//!
//! Usage:
//! ```rust,ignore
//! let mut builder = StepBuilder::new("ktlint", provider, rule_catalog, catalogs);
//! builder.set_version("0.45.2".parse()?).add_override("indent_size", 2);
//! let step = builder.build()?;
//! ```

use crate::error::BuildError;
use crate::fingerprint::Fingerprint;
use crate::invoker::{CallShape, FormatterInvoker};
use crate::step::{EngineStepConfig, PreferenceFile, Step};
use fmtstep_engine::{
    CatalogCache, EngineProvider, EngineSettings, EngineVersion, OverrideRequest,
    PropertyOverrideResolver, ResolvedOverride, RuleSelection, RuleSetCatalog,
};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Mutable staging area for an engine-backed step
#[derive(Clone)]
pub struct StepBuilder {
    name: String,
    provider: Arc<dyn EngineProvider>,
    rule_catalog: Arc<dyn RuleSetCatalog>,
    catalogs: Arc<CatalogCache>,
    version: EngineVersion,
    selection: RuleSelection,
    script: bool,
    user_data: BTreeMap<String, String>,
    overrides: OverrideRequest,
    settings: EngineSettings,
}

impl StepBuilder {
    /// Create builder at the provider's default version
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        provider: Arc<dyn EngineProvider>,
        rule_catalog: Arc<dyn RuleSetCatalog>,
        catalogs: Arc<CatalogCache>,
    ) -> Self {
        Self {
            name: name.into(),
            version: provider.default_version(),
            provider,
            rule_catalog,
            catalogs,
            selection: RuleSelection::standard(),
            script: false,
            user_data: BTreeMap::new(),
            overrides: OverrideRequest::new(),
            settings: EngineSettings::default(),
        }
    }

    /// Name given to built steps
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Selected engine version
    #[inline]
    #[must_use]
    pub fn version(&self) -> EngineVersion {
        self.version
    }

    /// Selected rule sets
    #[inline]
    #[must_use]
    pub fn selection(&self) -> RuleSelection {
        self.selection
    }

    /// Raw override request
    #[inline]
    #[must_use]
    pub fn overrides(&self) -> &OverrideRequest {
        &self.overrides
    }

    /// Auxiliary engine settings
    #[inline]
    #[must_use]
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Select engine version
    pub fn set_version(&mut self, version: EngineVersion) -> &mut Self {
        self.version = version;
        self
    }

    /// Toggle the experimental rule set
    pub fn set_experimental(&mut self, experimental: bool) -> &mut Self {
        self.selection.experimental = experimental;
        self
    }

    /// Toggle script grammar
    pub fn set_script(&mut self, script: bool) -> &mut Self {
        self.script = script;
        self
    }

    /// Replace opaque user data
    pub fn set_user_data(&mut self, user_data: BTreeMap<String, String>) -> &mut Self {
        self.user_data = user_data;
        self
    }

    /// Replace the whole override request
    pub fn set_overrides(&mut self, overrides: OverrideRequest) -> &mut Self {
        self.overrides = overrides;
        self
    }

    /// Add or replace a single override
    pub fn add_override(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.overrides.insert(key, value);
        self
    }

    /// Replace preference file locations
    pub fn set_preferences(&mut self, preferences: Vec<PathBuf>) -> &mut Self {
        self.settings.preferences = preferences;
        self
    }

    /// Replace artifact mirror mappings
    pub fn set_mirrors(&mut self, mirrors: BTreeMap<String, String>) -> &mut Self {
        self.settings.mirrors = mirrors;
        self
    }

    /// Freeze current state into a step
    ///
    /// Identical builder state yields steps with equal fingerprints.
    ///
    /// # Errors
    /// - `BuildError::Engine` if the provider has no engine for the version
    /// - `BuildError::OverridesUnsupported` if overrides were requested from a
    ///   legacy-only engine
    /// - `BuildError::Catalog` if the property catalog is inconsistent
    /// - `BuildError::PreferenceFile` if a preference file cannot be read
    pub fn build(&self) -> Result<Step, BuildError> {
        let engine = self.provider.engine(&self.version, &self.settings)?;

        if !self.overrides.is_empty() && !engine.supports_overrides() {
            return Err(BuildError::OverridesUnsupported {
                version: self.version,
                requested: self.overrides.iter().map(|(k, _)| k.to_string()).collect(),
            });
        }

        let catalog =
            self.catalogs
                .get_or_build(&self.version, &self.selection, self.rule_catalog.as_ref())?;
        let resolution = PropertyOverrideResolver::resolution(&self.overrides, &catalog);

        let preferences = self
            .settings
            .preferences
            .iter()
            .map(|path| read_preference(path))
            .collect::<Result<Vec<_>, _>>()?;

        let config = EngineStepConfig {
            version: self.version,
            selection: self.selection,
            script: self.script,
            user_data: self.user_data.clone(),
            overrides: resolution.resolved().map(ResolvedOverride::to_pairs),
            preferences,
            mirrors: self.settings.mirrors.clone(),
        };

        let invoker = FormatterInvoker::new(
            engine,
            self.rule_catalog.as_ref(),
            &self.selection,
            CallShape::from_resolution(resolution),
        )
        .with_user_data(self.user_data.clone())
        .with_script(self.script);

        let step = Step::new(&self.name, &config, Arc::new(invoker))?;
        tracing::info!(
            step = %self.name,
            version = %self.version,
            fingerprint = %step.fingerprint().short(),
            "built step"
        );
        Ok(step)
    }
}

fn read_preference(path: &Path) -> Result<PreferenceFile, BuildError> {
    let content = std::fs::read(path).map_err(|e| BuildError::preference_file(path, e))?;
    Ok(PreferenceFile {
        path: path.to_path_buf(),
        checksum: Fingerprint::compute(&content).to_string(),
    })
}

impl fmt::Debug for StepBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepBuilder")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("selection", &self.selection)
            .field("script", &self.script)
            .field("user_data", &self.user_data)
            .field("overrides", &self.overrides)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
