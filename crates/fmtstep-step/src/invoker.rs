//! Engine invocation with fail-fast diagnostics
//!
//! The [`FormatterInvoker`] owns the compiled rule sets for one step and
//! hands them to the engine on every call. The call shape is fixed when the
//! invoker is built:
//!
//! - [`CallShape::Legacy`] when no overrides were requested, so older
//!   engines keep working
//! - [`CallShape::OverrideAware`] otherwise, even if every requested key was
//!   unknown to the catalog
//!
//! The first uncorrected diagnostic wins: it is recorded, every later
//! callback answers `Abort`, and the caller gets the failure instead of
//! whatever content the engine produced.

use crate::error::FormatError;
use crate::func::FormatterFunc;
use fmtstep_engine::{
    Diagnostic, DiagnosticCallback, DiagnosticFlow, Engine, EngineError, FormatRequest,
    OverrideResolution, ResolvedOverride, RuleSelection, RuleSet, RuleSetCatalog,
};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Which engine entry point to call
#[derive(Debug, Clone, PartialEq)]
pub enum CallShape {
    /// `Engine::format`
    Legacy,
    /// `Engine::format_with_overrides` with the resolved set
    OverrideAware(ResolvedOverride),
}

impl CallShape {
    /// Select shape from an override resolution
    #[must_use]
    pub fn from_resolution(resolution: OverrideResolution) -> Self {
        match resolution {
            OverrideResolution::NotRequested => Self::Legacy,
            OverrideResolution::Resolved(resolved) => Self::OverrideAware(resolved),
        }
    }

    /// Check if this is the legacy shape
    #[inline]
    #[must_use]
    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::Legacy)
    }

    /// Overrides passed on the override-aware shape
    #[inline]
    #[must_use]
    pub fn overrides(&self) -> Option<&ResolvedOverride> {
        match self {
            Self::Legacy => None,
            Self::OverrideAware(resolved) => Some(resolved),
        }
    }
}

/// Tracks findings for one invocation
#[derive(Debug, Default)]
struct DiagnosticGate {
    first_failure: Option<Diagnostic>,
    corrected: usize,
}

impl DiagnosticGate {
    fn observe(&mut self, diagnostic: &Diagnostic) -> DiagnosticFlow {
        if let Some(failure) = &self.first_failure {
            return DiagnosticFlow::Abort(failure.clone());
        }

        if diagnostic.corrected {
            self.corrected += 1;
            DiagnosticFlow::Continue
        } else {
            self.first_failure = Some(diagnostic.clone());
            DiagnosticFlow::Abort(diagnostic.clone())
        }
    }
}

/// How calls reach the rule sets
#[derive(Debug)]
enum RuleSetAccess {
    /// One instance, serialized on a lock
    Shared(Mutex<Vec<RuleSet>>),
    /// Read-only prototype, cloned per call without locking
    PerCall(Vec<RuleSet>),
}

/// Applies one engine, with one fixed configuration, to file contents
pub struct FormatterInvoker {
    engine: Arc<dyn Engine>,
    rule_sets: RuleSetAccess,
    user_data: BTreeMap<String, String>,
    script: bool,
    shape: CallShape,
}

impl FormatterInvoker {
    /// Create invoker; rule sets are instantiated once here
    #[must_use]
    pub fn new(
        engine: Arc<dyn Engine>,
        rule_catalog: &dyn RuleSetCatalog,
        selection: &RuleSelection,
        shape: CallShape,
    ) -> Self {
        tracing::debug!(
            version = %engine.version(),
            legacy = shape.is_legacy(),
            "selected engine call shape"
        );
        let rule_sets = rule_catalog.rule_sets(&engine.version(), selection);
        let rule_sets = if engine.is_reentrant() {
            RuleSetAccess::PerCall(rule_sets)
        } else {
            RuleSetAccess::Shared(Mutex::new(rule_sets))
        };
        Self {
            rule_sets,
            engine,
            user_data: BTreeMap::new(),
            script: false,
            shape,
        }
    }

    /// Attach opaque user data
    #[inline]
    #[must_use]
    pub fn with_user_data(mut self, user_data: BTreeMap<String, String>) -> Self {
        self.user_data = user_data;
        self
    }

    /// Select script grammar
    #[inline]
    #[must_use]
    pub fn with_script(mut self, script: bool) -> Self {
        self.script = script;
        self
    }

    /// Call shape fixed at construction
    #[inline]
    #[must_use]
    pub fn shape(&self) -> &CallShape {
        &self.shape
    }

    /// Whether script grammar is selected
    #[inline]
    #[must_use]
    pub fn is_script(&self) -> bool {
        self.script
    }

    /// Format one file
    ///
    /// Calls are serialized on the rule-set lock unless the engine is
    /// re-entrant, in which case each call works on its own copy of the rules.
    ///
    /// # Errors
    /// - `FormatError::Uncorrected` for the first uncorrected diagnostic
    /// - `FormatError::Engine` if the engine fails for another reason
    pub fn apply(&self, content: &str, file: &Path) -> Result<String, FormatError> {
        let span = tracing::debug_span!("format", file = %file.display());
        let _enter = span.enter();

        let file_name = file
            .file_name()
            .map_or_else(|| file.to_string_lossy(), |name| name.to_string_lossy());
        let request = FormatRequest {
            file_name: &file_name,
            content,
            user_data: &self.user_data,
            script: self.script,
        };

        let mut gate = DiagnosticGate::default();
        let outcome = {
            let mut callback = |diagnostic: &Diagnostic| gate.observe(diagnostic);
            match &self.rule_sets {
                RuleSetAccess::PerCall(prototype) => {
                    let mut rule_sets = prototype.clone();
                    self.dispatch(request, &mut rule_sets, &mut callback)
                }
                RuleSetAccess::Shared(lock) => {
                    let mut rule_sets = lock.lock();
                    self.dispatch(request, &mut rule_sets, &mut callback)
                }
            }
        };

        if let Some(failure) = gate.first_failure {
            tracing::debug!(location = %failure.location, rule = %failure.rule_id, "uncorrected finding");
            return Err(FormatError::uncorrected(file, failure));
        }

        let formatted = outcome.map_err(|e| FormatError::engine(file, e))?;
        tracing::trace!(corrected = gate.corrected, "formatted");
        Ok(formatted)
    }

    fn dispatch(
        &self,
        request: FormatRequest<'_>,
        rule_sets: &mut [RuleSet],
        callback: &mut DiagnosticCallback<'_>,
    ) -> Result<String, EngineError> {
        match &self.shape {
            CallShape::Legacy => self.engine.format(request, rule_sets, callback),
            CallShape::OverrideAware(overrides) => {
                self.engine
                    .format_with_overrides(request, rule_sets, overrides, callback)
            }
        }
    }
}

impl FormatterFunc for FormatterInvoker {
    fn apply(&self, content: &str, file: &Path) -> Result<String, FormatError> {
        FormatterInvoker::apply(self, content, file)
    }
}

impl fmt::Debug for FormatterInvoker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatterInvoker")
            .field("engine_version", &self.engine.version())
            .field("shape", &self.shape)
            .field("script", &self.script)
            .field("user_data", &self.user_data)
            .finish_non_exhaustive()
    }
}
