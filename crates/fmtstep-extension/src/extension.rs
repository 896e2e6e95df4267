//! Configuration surface
//!
//! [`FormatExtension`] collects steps into a [`Pipeline`]. One-shot steps
//! (import ordering) are appended once. Engine-backed steps are driven
//! through an [`EngineConfig`] handle: every handle call mutates the step's
//! builder, rebuilds, and swaps the new step into the old step's slot.
//!
//! ```rust,ignore
//! let mut ext = FormatExtension::new(provider, rule_catalog, project_dir);
//! ext.import_order(&["java", "org"])?;
//! ext.engine_version("0.45.2")?
//!     .experimental(true)?
//!     .editor_config_override([("indent_size", 4)])?;
//! let pipeline = ext.finalize();
//! ```

use crate::error::{ExtensionError, ExtensionResult};
use crate::import_order::ImportOrder;
use crate::pipeline::{FinalizedPipeline, Pipeline};
use crate::settings::FormatSettings;
use fmtstep_engine::{
    CatalogCache, EngineProvider, EngineVersion, OverrideRequest, RuleSetCatalog,
};
use fmtstep_step::{BuildError, Step, StepBuilder};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Pipeline name of the engine-backed step
pub const ENGINE_STEP: &str = "ktlint";

/// Owner of the pipeline under configuration
pub struct FormatExtension {
    pipeline: Pipeline,
    provider: Arc<dyn EngineProvider>,
    rule_catalog: Arc<dyn RuleSetCatalog>,
    catalogs: Arc<CatalogCache>,
    project_dir: PathBuf,
}

impl FormatExtension {
    /// Create extension with an empty pipeline and a private catalog cache
    pub fn new(
        provider: Arc<dyn EngineProvider>,
        rule_catalog: Arc<dyn RuleSetCatalog>,
        project_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            pipeline: Pipeline::new(),
            provider,
            rule_catalog,
            catalogs: Arc::new(CatalogCache::new()),
            project_dir: project_dir.into(),
        }
    }

    /// Share a catalog cache with other extensions
    #[must_use]
    pub fn with_catalog_cache(mut self, catalogs: Arc<CatalogCache>) -> Self {
        self.catalogs = catalogs;
        self
    }

    /// Pipeline as currently configured
    #[inline]
    #[must_use]
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Project directory
    #[inline]
    #[must_use]
    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// Resolve a path against the project directory
    #[must_use]
    pub fn project_file(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_dir.join(path)
        }
    }

    /// Append a custom step
    ///
    /// # Errors
    /// - `PipelineError::DuplicateStep` if the name is taken
    pub fn add_step(&mut self, step: Step) -> ExtensionResult<()> {
        Ok(self.pipeline.add_step(step)?)
    }

    /// Swap a step in by name, returning the one it replaced
    ///
    /// # Errors
    /// - `PipelineError::NoSuchStep` if no step has that name
    pub fn replace_step(&mut self, step: Step) -> ExtensionResult<Step> {
        Ok(self.pipeline.replace_step(step)?)
    }

    /// Add import ordering by prefix
    ///
    /// # Errors
    /// - `PipelineError::DuplicateStep` if import ordering was already added
    pub fn import_order<S: AsRef<str>>(&mut self, prefixes: &[S]) -> ExtensionResult<()> {
        let order = ImportOrder::new(prefixes.iter().map(|p| p.as_ref().to_string()));
        self.add_step(order.into_step()?)
    }

    /// Add import ordering from an `N=prefix` file
    ///
    /// # Errors
    /// - `ImportOrderError` if the file cannot be read or parsed
    /// - `PipelineError::DuplicateStep` if import ordering was already added
    pub fn import_order_file(&mut self, path: impl AsRef<Path>) -> ExtensionResult<()> {
        let order = ImportOrder::from_file(&self.project_file(path))?;
        self.add_step(order.into_step()?)
    }

    /// Add the engine step at the provider's default version
    ///
    /// # Errors
    /// - `BuildError` if the initial build fails
    /// - `PipelineError::DuplicateStep` if the engine step already exists
    pub fn engine(&mut self) -> ExtensionResult<EngineConfig<'_>> {
        let builder = self.step_builder();
        EngineConfig::attach(builder, self)
    }

    /// Add the engine step at an explicit version
    ///
    /// # Errors
    /// - `BuildError::Version` if `version` does not parse
    /// - as [`FormatExtension::engine`]
    pub fn engine_version(&mut self, version: &str) -> ExtensionResult<EngineConfig<'_>> {
        let version: EngineVersion = version.parse().map_err(BuildError::from)?;
        let mut builder = self.step_builder();
        builder.set_version(version);
        EngineConfig::attach(builder, self)
    }

    fn step_builder(&self) -> StepBuilder {
        StepBuilder::new(
            ENGINE_STEP,
            Arc::clone(&self.provider),
            Arc::clone(&self.rule_catalog),
            Arc::clone(&self.catalogs),
        )
    }

    /// Replay a settings file through the regular operations
    ///
    /// # Errors
    /// The first failing operation's error; earlier operations stay applied
    pub fn apply_settings(&mut self, settings: &FormatSettings) -> ExtensionResult<()> {
        if let Some(prefixes) = &settings.import_order {
            self.import_order(prefixes)?;
        }
        if let Some(path) = &settings.import_order_file {
            self.import_order_file(path)?;
        }
        let Some(section) = &settings.engine else {
            return Ok(());
        };

        let mut config = match &section.version {
            Some(version) => self.engine_version(version)?,
            None => self.engine()?,
        };
        if section.experimental {
            config.experimental(true)?;
        }
        if section.script {
            config.script(true)?;
        }
        if !section.user_data.is_empty() {
            config.user_data(section.user_data.clone())?;
        }
        if !section.config_files.is_empty() {
            config.config_file(&section.config_files)?;
        }
        if !section.mirrors.is_empty() {
            config.with_mirrors(section.mirrors.clone())?;
        }
        if !section.overrides.is_empty() {
            config.editor_config_override(section.overrides.clone())?;
        }
        Ok(())
    }

    /// Close configuration and hand over the pipeline
    #[must_use]
    pub fn finalize(self) -> FinalizedPipeline {
        tracing::debug!(steps = self.pipeline.len(), "finalizing pipeline");
        self.pipeline.finalize()
    }
}

impl fmt::Debug for FormatExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatExtension")
            .field("pipeline", &self.pipeline)
            .field("project_dir", &self.project_dir)
            .finish_non_exhaustive()
    }
}

/// Handle on a live engine-backed step
///
/// Each method changes one setting and rebuilds. On success the rebuilt
/// step takes the old step's slot; on failure the setting is reverted and
/// the old step stays live.
pub struct EngineConfig<'a> {
    builder: StepBuilder,
    extension: &'a mut FormatExtension,
}

impl<'a> EngineConfig<'a> {
    fn attach(builder: StepBuilder, extension: &'a mut FormatExtension) -> ExtensionResult<Self> {
        let step = builder.build()?;
        extension.pipeline.add_step(step)?;
        Ok(Self { builder, extension })
    }

    /// Builder state behind the live step
    #[inline]
    #[must_use]
    pub fn builder(&self) -> &StepBuilder {
        &self.builder
    }

    /// Live step in the pipeline
    #[must_use]
    pub fn step(&self) -> Option<&Step> {
        self.extension.pipeline.get(self.builder.name())
    }

    /// Select engine version
    ///
    /// # Errors
    /// - `BuildError::Version` if `version` does not parse
    /// - any rebuild error
    pub fn version(&mut self, version: &str) -> ExtensionResult<&mut Self> {
        let version: EngineVersion = version.parse().map_err(BuildError::from)?;
        self.mutate(|b| {
            b.set_version(version);
        })
    }

    /// Toggle the experimental rule set
    ///
    /// # Errors
    /// Any rebuild error
    pub fn experimental(&mut self, experimental: bool) -> ExtensionResult<&mut Self> {
        self.mutate(|b| {
            b.set_experimental(experimental);
        })
    }

    /// Toggle script grammar
    ///
    /// # Errors
    /// Any rebuild error
    pub fn script(&mut self, script: bool) -> ExtensionResult<&mut Self> {
        self.mutate(|b| {
            b.set_script(script);
        })
    }

    /// Replace opaque user data
    ///
    /// # Errors
    /// Any rebuild error
    pub fn user_data(&mut self, user_data: BTreeMap<String, String>) -> ExtensionResult<&mut Self> {
        self.mutate(|b| {
            b.set_user_data(user_data);
        })
    }

    /// Replace property overrides
    ///
    /// # Errors
    /// - `BuildError::OverridesUnsupported` for a non-empty map on a legacy engine
    /// - any other rebuild error
    pub fn editor_config_override<I, K, V>(&mut self, overrides: I) -> ExtensionResult<&mut Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let request: OverrideRequest = overrides.into_iter().collect();
        self.mutate(|b| {
            b.set_overrides(request);
        })
    }

    /// Replace preference files; relative paths resolve against the project
    ///
    /// # Errors
    /// - `BuildError::PreferenceFile` if a file cannot be read
    /// - any other rebuild error
    pub fn config_file<P: AsRef<Path>>(&mut self, paths: &[P]) -> ExtensionResult<&mut Self> {
        let paths: Vec<PathBuf> = paths.iter().map(|p| self.extension.project_file(p)).collect();
        self.mutate(|b| {
            b.set_preferences(paths);
        })
    }

    /// Replace artifact mirror mappings
    ///
    /// # Errors
    /// Any rebuild error
    pub fn with_mirrors(&mut self, mirrors: BTreeMap<String, String>) -> ExtensionResult<&mut Self> {
        self.mutate(|b| {
            b.set_mirrors(mirrors);
        })
    }

    fn mutate(&mut self, change: impl FnOnce(&mut StepBuilder)) -> ExtensionResult<&mut Self> {
        let previous = self.builder.clone();
        change(&mut self.builder);

        let rebuilt = self
            .builder
            .build()
            .map_err(ExtensionError::from)
            .and_then(|step| Ok(self.extension.pipeline.replace_step(step)?));

        match rebuilt {
            Ok(_) => Ok(self),
            Err(err) => {
                tracing::warn!(
                    step = self.builder.name(),
                    error = %err,
                    "rebuild failed, keeping previous step"
                );
                self.builder = previous;
                Err(err)
            }
        }
    }
}

impl fmt::Debug for EngineConfig<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineConfig")
            .field("builder", &self.builder)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use fmtstep_step::EngineStepConfig;
    use fmtstep_test_utils::{version, write_file, FakeProvider, FakeRuleCatalog};
    use serde_json::json;

    fn extension() -> FormatExtension {
        FormatExtension::new(
            Arc::new(FakeProvider::standard()),
            FakeRuleCatalog::shared(),
            "/project",
        )
    }

    fn live_config(ext: &FormatExtension) -> EngineStepConfig {
        ext.pipeline().get(ENGINE_STEP).unwrap().config().unwrap()
    }

    #[test]
    fn engine_adds_step_at_default_version() {
        let mut ext = extension();
        ext.engine().unwrap();

        assert_eq!(ext.pipeline().len(), 1);
        assert_eq!(live_config(&ext).version, version("0.46.1"));
    }

    #[test]
    fn mutations_replace_in_place() {
        let mut ext = extension();
        ext.import_order(&["java"]).unwrap();
        ext.engine_version("0.45.2")
            .unwrap()
            .experimental(true)
            .unwrap()
            .editor_config_override([("indent_size", 2)])
            .unwrap();

        assert_eq!(ext.pipeline().len(), 2);
        assert_eq!(ext.pipeline().position(ENGINE_STEP), Some(1));
        let config = live_config(&ext);
        assert!(config.selection.experimental);
        assert_eq!(
            config.overrides,
            Some(BTreeMap::from([("indent_size".to_string(), json!(2))]))
        );
    }

    #[test]
    fn failed_rebuild_rolls_back() {
        let mut ext = extension();
        let mut config = ext.engine_version("0.44.0").unwrap();
        let before = config.step().unwrap().fingerprint();

        let err = config
            .editor_config_override([("indent_size", 2)])
            .unwrap_err();
        assert!(matches!(
            err,
            ExtensionError::Build(BuildError::OverridesUnsupported { .. })
        ));
        assert!(config.builder().overrides().is_empty());
        assert_eq!(config.step().unwrap().fingerprint(), before);

        // Builder is usable afterwards
        config.script(true).unwrap();
        assert!(config.step().unwrap().fingerprint() != before);
    }

    #[test]
    fn invalid_version_changes_nothing() {
        let mut ext = extension();
        let mut config = ext.engine().unwrap();
        assert!(matches!(
            config.version("one.two").unwrap_err(),
            ExtensionError::Build(BuildError::Version(_))
        ));
        assert_eq!(config.builder().version(), version("0.46.1"));
    }

    #[test]
    fn second_engine_is_duplicate() {
        let mut ext = extension();
        ext.engine().unwrap();
        assert!(matches!(
            ext.engine().unwrap_err(),
            ExtensionError::Pipeline(PipelineError::DuplicateStep(_))
        ));
    }

    #[test]
    fn relative_paths_resolve_against_project() {
        let ext = extension();
        assert_eq!(ext.project_file("fmt/a.prefs"), PathBuf::from("/project/fmt/a.prefs"));
        assert_eq!(ext.project_file("/abs/a.prefs"), PathBuf::from("/abs/a.prefs"));
    }

    #[test]
    fn config_file_reads_from_project_dir() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "prefs.properties", "indent=2\n");

        let mut ext = FormatExtension::new(
            Arc::new(FakeProvider::standard()),
            FakeRuleCatalog::shared(),
            dir.path(),
        );
        ext.engine().unwrap().config_file(&["prefs.properties"]).unwrap();

        let config = live_config(&ext);
        assert_eq!(config.preferences[0].path, dir.path().join("prefs.properties"));
    }

    #[test]
    fn import_order_file_is_resolved() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "project.importorder", "0=java\n1=org\n");

        let mut ext = FormatExtension::new(
            Arc::new(FakeProvider::standard()),
            FakeRuleCatalog::shared(),
            dir.path(),
        );
        ext.import_order_file("project.importorder").unwrap();

        let order: ImportOrder = ext
            .pipeline()
            .get(crate::import_order::STEP_NAME)
            .unwrap()
            .config()
            .unwrap();
        assert_eq!(order, ImportOrder::new(["java", "org"]));
    }
}
