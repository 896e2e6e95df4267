//! Testing utilities for fmtstep workspace
//!
//! Fake engines, rule catalogs and providers shared by the test suites.

#![allow(missing_docs)]

use fmtstep_engine::{
    Diagnostic, DiagnosticCallback, DiagnosticFlow, Engine, EngineError, EngineProvider,
    EngineSettings, EngineVersion, FormatRequest, Property, PropertyKind, ResolvedOverride, Rule,
    RuleSelection, RuleSet, RuleSetCatalog,
};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// First engine version with override support in the fake catalog
pub const OVERRIDES_SINCE: EngineVersion = EngineVersion::new(0, 45, 2);

/// First engine version whose fake catalog knows `ktlint_code_style`
pub const CODE_STYLE_SINCE: EngineVersion = EngineVersion::new(0, 46, 0);

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn version(s: &str) -> EngineVersion {
    s.parse().unwrap()
}

pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[derive(Debug, Clone)]
pub struct FakeRule {
    id: &'static str,
    properties: Vec<Property>,
}

impl FakeRule {
    pub fn new(id: &'static str) -> Self {
        Self {
            id,
            properties: Vec::new(),
        }
    }

    pub fn with_property(mut self, name: &str, kind: PropertyKind, default: impl Into<Value>) -> Self {
        self.properties
            .push(Property::new(name, kind, default).owned_by(self.id));
        self
    }
}

impl Rule for FakeRule {
    fn id(&self) -> &str {
        self.id
    }

    fn properties(&self) -> Vec<Property> {
        self.properties.clone()
    }

    fn boxed_clone(&self) -> Box<dyn Rule> {
        Box::new(self.clone())
    }
}

/// Standard + experimental rule sets modelled on a Kotlin linter;
/// `ktlint_code_style` only exists from [`CODE_STYLE_SINCE`]
#[derive(Debug, Default)]
pub struct FakeRuleCatalog;

impl FakeRuleCatalog {
    pub fn shared() -> Arc<dyn RuleSetCatalog> {
        Arc::new(Self)
    }
}

impl RuleSetCatalog for FakeRuleCatalog {
    fn rule_sets(&self, _version: &EngineVersion, selection: &RuleSelection) -> Vec<RuleSet> {
        let mut sets = vec![RuleSet::new(
            "standard",
            vec![
                Box::new(
                    FakeRule::new("max-line-length").with_property(
                        "max_line_length",
                        PropertyKind::Integer,
                        -1,
                    ),
                ),
                Box::new(FakeRule::new("no-wildcard-imports")),
                Box::new(FakeRule::new("indent")),
            ],
        )];

        if selection.experimental {
            sets.push(RuleSet::new(
                "experimental",
                vec![Box::new(FakeRule::new("trailing-comma").with_property(
                    "ij_kotlin_allow_trailing_comma",
                    PropertyKind::Boolean,
                    false,
                ))],
            ));
        }

        sets
    }

    fn engine_properties(&self, version: &EngineVersion) -> Vec<Property> {
        let mut properties = vec![
            Property::new("indent_size", PropertyKind::Integer, 4),
            Property::new(
                "indent_style",
                PropertyKind::Choice(vec!["space".to_string(), "tab".to_string()]),
                "space",
            ),
            Property::new("insert_final_newline", PropertyKind::Boolean, true),
        ];
        if version.at_least(&CODE_STYLE_SINCE) {
            properties.push(Property::new(
                "ktlint_code_style",
                PropertyKind::Choice(vec!["official".to_string(), "android".to_string()]),
                "official",
            ));
        }
        properties
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeUsed {
    Legacy,
    OverrideAware,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallRecord {
    pub shape: ShapeUsed,
    pub file_name: String,
    pub script: bool,
    pub user_data: BTreeMap<String, String>,
    pub rule_sets: Vec<String>,
    pub overrides: BTreeMap<String, Value>,
    pub diagnostics_reported: usize,
}

/// Scriptable engine: applies text rewrites, then reports findings in order
#[derive(Debug)]
pub struct FakeEngine {
    version: EngineVersion,
    supports_overrides: bool,
    reentrant: bool,
    ignore_abort: bool,
    rewrites: Vec<(String, String)>,
    findings: Vec<Diagnostic>,
    calls: Mutex<Vec<CallRecord>>,
}

impl FakeEngine {
    pub fn new(version: EngineVersion) -> Self {
        Self {
            version,
            supports_overrides: version >= OVERRIDES_SINCE,
            reentrant: false,
            ignore_abort: false,
            rewrites: Vec::new(),
            findings: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn rewriting(mut self, from: &str, to: &str) -> Self {
        self.rewrites.push((from.to_string(), to.to_string()));
        self
    }

    pub fn reporting(mut self, diagnostic: Diagnostic) -> Self {
        self.findings.push(diagnostic);
        self
    }

    pub fn reentrant(mut self) -> Self {
        self.reentrant = true;
        self
    }

    /// Keep going and return content even after the callback aborted
    pub fn ignoring_abort(mut self) -> Self {
        self.ignore_abort = true;
        self
    }

    pub fn calls(&self) -> Vec<CallRecord> {
        self.calls.lock().clone()
    }

    pub fn last_call(&self) -> Option<CallRecord> {
        self.calls.lock().last().cloned()
    }

    fn run(
        &self,
        shape: ShapeUsed,
        request: FormatRequest<'_>,
        rule_sets: &[RuleSet],
        overrides: BTreeMap<String, Value>,
        on_diagnostic: &mut DiagnosticCallback<'_>,
    ) -> Result<String, EngineError> {
        let mut content = request.content.to_string();
        for (from, to) in &self.rewrites {
            content = content.replace(from.as_str(), to.as_str());
        }

        let mut reported = 0;
        let mut aborted = false;
        for finding in &self.findings {
            reported += 1;
            if let DiagnosticFlow::Abort(_) = on_diagnostic(finding) {
                aborted = true;
                if !self.ignore_abort {
                    break;
                }
            }
        }

        self.calls.lock().push(CallRecord {
            shape,
            file_name: request.file_name.to_string(),
            script: request.script,
            user_data: request.user_data.clone(),
            rule_sets: rule_sets.iter().map(|s| s.id().to_string()).collect(),
            overrides,
            diagnostics_reported: reported,
        });

        if aborted && !self.ignore_abort {
            return Err(EngineError::Aborted);
        }
        Ok(content)
    }
}

impl Engine for FakeEngine {
    fn version(&self) -> EngineVersion {
        self.version
    }

    fn supports_overrides(&self) -> bool {
        self.supports_overrides
    }

    fn is_reentrant(&self) -> bool {
        self.reentrant
    }

    fn format(
        &self,
        request: FormatRequest<'_>,
        rule_sets: &mut [RuleSet],
        on_diagnostic: &mut DiagnosticCallback<'_>,
    ) -> Result<String, EngineError> {
        self.run(ShapeUsed::Legacy, request, rule_sets, BTreeMap::new(), on_diagnostic)
    }

    fn format_with_overrides(
        &self,
        request: FormatRequest<'_>,
        rule_sets: &mut [RuleSet],
        overrides: &ResolvedOverride,
        on_diagnostic: &mut DiagnosticCallback<'_>,
    ) -> Result<String, EngineError> {
        if !self.supports_overrides {
            return Err(EngineError::unsupported(self.version, "editorconfig overrides"));
        }
        self.run(
            ShapeUsed::OverrideAware,
            request,
            rule_sets,
            overrides.to_pairs(),
            on_diagnostic,
        )
    }
}

/// Provider serving pre-registered fake engines
#[derive(Debug)]
pub struct FakeProvider {
    default_version: EngineVersion,
    engines: BTreeMap<EngineVersion, Arc<FakeEngine>>,
    requests: Mutex<Vec<(EngineVersion, EngineSettings)>>,
}

impl FakeProvider {
    pub fn new(default_version: EngineVersion) -> Self {
        Self {
            default_version,
            engines: BTreeMap::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// 0.44.0 (legacy only), 0.45.2 and 0.46.1 (override-aware); default 0.46.1
    pub fn standard() -> Self {
        Self::new(version("0.46.1"))
            .with_engine(FakeEngine::new(version("0.44.0")))
            .with_engine(FakeEngine::new(version("0.45.2")))
            .with_engine(FakeEngine::new(version("0.46.1")))
    }

    pub fn with_engine(mut self, engine: FakeEngine) -> Self {
        self.engines.insert(engine.version(), Arc::new(engine));
        self
    }

    pub fn engine_for(&self, version: &EngineVersion) -> Option<Arc<FakeEngine>> {
        self.engines.get(version).cloned()
    }

    pub fn requests(&self) -> Vec<(EngineVersion, EngineSettings)> {
        self.requests.lock().clone()
    }
}

impl EngineProvider for FakeProvider {
    fn default_version(&self) -> EngineVersion {
        self.default_version
    }

    fn engine(
        &self,
        version: &EngineVersion,
        settings: &EngineSettings,
    ) -> Result<Arc<dyn Engine>, EngineError> {
        self.requests.lock().push((*version, settings.clone()));
        self.engines
            .get(version)
            .map(|engine| Arc::clone(engine) as Arc<dyn Engine>)
            .ok_or_else(|| EngineError::VersionUnavailable(version.to_string()))
    }
}
