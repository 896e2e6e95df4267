//! Error types for the configuration surface
//!
//! Provides error handling for:
//! - Pipeline slot management
//! - Import-order files
//! - TOML settings files
//! - The combined [`ExtensionError`]

use fmtstep_step::BuildError;
use std::path::PathBuf;

/// Errors while adding or replacing pipeline steps
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    /// A step with this name already occupies a slot
    #[error("multiple steps named '{0}'")]
    DuplicateStep(String),

    /// No slot holds a step with this name
    #[error("no step named '{0}' to replace")]
    NoSuchStep(String),
}

/// Errors while reading import-order configuration
#[derive(Debug, thiserror::Error)]
pub enum ImportOrderError {
    /// Line is not `N=prefix`
    #[error("malformed import order entry on line {line}: '{content}'")]
    Malformed {
        /// 1-based line number
        line: usize,
        /// Offending line
        content: String,
    },

    /// Two entries share an index
    #[error("duplicate import order index {0}")]
    DuplicateIndex(usize),

    /// File could not be read
    #[error("io error reading {path}: {source}")]
    Io {
        /// Import order file
        path: PathBuf,
        /// IO failure
        #[source]
        source: std::io::Error,
    },
}

impl ImportOrderError {
    /// Create malformed entry error
    pub fn malformed(line: usize, content: impl Into<String>) -> Self {
        Self::Malformed {
            line,
            content: content.into(),
        }
    }
}

/// Errors while loading settings files
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// File could not be read
    #[error("io error reading {path}: {source}")]
    Io {
        /// Settings file
        path: PathBuf,
        /// IO failure
        #[source]
        source: std::io::Error,
    },

    /// File is not valid settings TOML
    #[error("invalid settings: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Combined configuration error
#[derive(Debug, thiserror::Error)]
pub enum ExtensionError {
    /// Slot management failure
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Step could not be built
    #[error("build error: {0}")]
    Build(#[from] BuildError),

    /// Import-order configuration failure
    #[error("import order error: {0}")]
    ImportOrder(#[from] ImportOrderError),

    /// Settings file failure
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),

    /// Step configuration could not be encoded
    #[error("snapshot encoding failed: {0}")]
    Snapshot(#[from] serde_json::Error),
}

/// Result type alias for configuration operations
pub type ExtensionResult<T> = Result<T, ExtensionError>;
