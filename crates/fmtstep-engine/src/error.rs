//! Error types for the engine layer
//!
//! Provides error handling for:
//! - Version string parsing
//! - Property catalog construction
//! - Engine invocation and provisioning

/// Errors while parsing an engine version string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionError {
    /// Version string was empty
    #[error("empty version string")]
    Empty,

    /// A component was not a non-negative integer
    #[error("invalid version component '{component}' in '{version}'")]
    InvalidComponent {
        /// Full version string
        version: String,
        /// Offending component
        component: String,
    },

    /// More than `major.minor.patch`
    #[error("too many version components in '{0}'")]
    TooManyComponents(String),
}

/// Errors while building a property catalog
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// Two different properties were declared under the same name
    #[error("property '{name}' declared twice with different definitions (owners: {first:?}, {second:?})")]
    ConflictingProperty {
        /// Shared property name
        name: String,
        /// Owner of the property seen first
        first: Option<String>,
        /// Owner of the conflicting property
        second: Option<String>,
    },
}

impl CatalogError {
    /// Create conflicting property error
    pub fn conflicting(
        name: impl Into<String>,
        first: Option<String>,
        second: Option<String>,
    ) -> Self {
        Self::ConflictingProperty {
            name: name.into(),
            first,
            second,
        }
    }
}

/// Errors raised by an engine or its provider
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// Provider has no engine for the requested version
    #[error("engine version {0} is not available")]
    VersionUnavailable(String),

    /// Engine does not implement the requested call shape
    #[error("engine {version} does not support {capability}")]
    Unsupported {
        /// Engine version
        version: String,
        /// Missing capability
        capability: &'static str,
    },

    /// Engine stopped because the diagnostic callback asked it to
    #[error("formatting aborted by diagnostic callback")]
    Aborted,

    /// Engine failed to parse the input
    #[error("engine could not parse {file}: {message}")]
    Parse {
        /// File name handed to the engine
        file: String,
        /// Engine message
        message: String,
    },

    /// Any other engine failure
    #[error("engine failure: {0}")]
    Internal(String),
}

impl EngineError {
    /// Create unsupported capability error
    pub fn unsupported(version: impl std::fmt::Display, capability: &'static str) -> Self {
        Self::Unsupported {
            version: version.to_string(),
            capability,
        }
    }

    /// Create parse error for file
    pub fn parse(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            file: file.into(),
            message: message.into(),
        }
    }
}
