//! Error types for step construction and invocation
//!
//! - [`FormatError`]: one file's invocation failed
//! - [`BuildError`]: a step could not be built from its configuration

use fmtstep_engine::{CatalogError, Diagnostic, EngineError, EngineVersion, Location, VersionError};
use std::path::{Path, PathBuf};

/// Errors while formatting a single file
///
/// Aborts only that file; other files in the batch are unaffected.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    /// Engine reported a finding it could not correct
    #[error("{file}: error on line {line}, column {column} ({rule}): {message}", line = .location.line, column = .location.column)]
    Uncorrected {
        /// File being formatted
        file: PathBuf,
        /// Finding position
        location: Location,
        /// Reporting rule
        rule: String,
        /// Engine message
        message: String,
    },

    /// Engine failed outright
    #[error("{file}: {source}")]
    Engine {
        /// File being formatted
        file: PathBuf,
        /// Engine failure
        #[source]
        source: EngineError,
    },
}

impl FormatError {
    /// Create error from the first uncorrected diagnostic
    pub fn uncorrected(file: impl Into<PathBuf>, diagnostic: Diagnostic) -> Self {
        Self::Uncorrected {
            file: file.into(),
            location: diagnostic.location,
            rule: diagnostic.rule_id,
            message: diagnostic.message,
        }
    }

    /// Wrap engine failure for file
    pub fn engine(file: impl Into<PathBuf>, source: EngineError) -> Self {
        Self::Engine {
            file: file.into(),
            source,
        }
    }

    /// File the error belongs to
    #[must_use]
    pub fn file(&self) -> &Path {
        match self {
            Self::Uncorrected { file, .. } | Self::Engine { file, .. } => file,
        }
    }

    /// Location of the uncorrected finding, if that is the cause
    #[must_use]
    pub fn location(&self) -> Option<Location> {
        match self {
            Self::Uncorrected { location, .. } => Some(*location),
            Self::Engine { .. } => None,
        }
    }
}

/// Errors while building a step
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// Overrides were requested but the engine only has the legacy call shape
    #[error("engine {version} does not support overrides (requested: {})", .requested.join(", "))]
    OverridesUnsupported {
        /// Selected engine version
        version: EngineVersion,
        /// Requested override keys
        requested: Vec<String>,
    },

    /// Engine could not be provided
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    /// Property catalog could not be built
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Version string was invalid
    #[error("version error: {0}")]
    Version(#[from] VersionError),

    /// Preference file could not be read
    #[error("cannot read preference file {path}: {source}")]
    PreferenceFile {
        /// Offending path
        path: PathBuf,
        /// IO failure
        #[source]
        source: std::io::Error,
    },

    /// Step snapshot could not be encoded
    #[error("snapshot encoding failed: {0}")]
    Snapshot(#[from] serde_json::Error),
}

impl BuildError {
    /// Create IO error for preference path
    pub fn preference_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::PreferenceFile {
            path: path.into(),
            source,
        }
    }
}
