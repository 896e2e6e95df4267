//! Engine findings and the callback verdict

use serde::{Deserialize, Serialize};
use std::fmt;

/// 1-based line/column position
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Line number
    pub line: usize,
    /// Column number
    pub column: usize,
}

impl Location {
    /// Create location
    #[inline]
    #[must_use]
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Finding reported by an engine while formatting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Where the finding applies
    pub location: Location,
    /// Rule that reported it
    pub rule_id: String,
    /// Human-readable detail
    pub message: String,
    /// Whether the engine fixed it in the returned content
    pub corrected: bool,
}

impl Diagnostic {
    /// Create diagnostic the engine already fixed
    #[must_use]
    pub fn corrected(
        location: Location,
        rule_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            location,
            rule_id: rule_id.into(),
            message: message.into(),
            corrected: true,
        }
    }

    /// Create diagnostic the engine could not fix
    #[must_use]
    pub fn uncorrected(
        location: Location,
        rule_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            corrected: false,
            ..Self::corrected(location, rule_id, message)
        }
    }
}

/// Verdict returned by the diagnostic callback
///
/// Engines must stop reporting and return as soon as they receive `Abort`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticFlow {
    /// Keep formatting
    Continue,
    /// Stop; carries the diagnostic that caused the abort
    Abort(Diagnostic),
}

impl DiagnosticFlow {
    /// Check if this verdict stops the engine
    #[inline]
    #[must_use]
    pub fn is_abort(&self) -> bool {
        matches!(self, Self::Abort(_))
    }
}
