//! Declarative TOML settings
//!
//! ```toml
//! import_order = ["java", "javax", "org", "com"]
//!
//! [engine]
//! version = "0.45.2"
//! experimental = true
//! config_files = ["fmt/prefs.properties"]
//! [engine.overrides]
//! indent_size = 4
//! ```

use crate::error::SettingsError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Top-level settings file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormatSettings {
    /// Import prefix groups; adds an import ordering step when present
    #[serde(default)]
    pub import_order: Option<Vec<String>>,

    /// Import-order file, relative to the project directory
    #[serde(default)]
    pub import_order_file: Option<PathBuf>,

    /// Engine-backed step; added when present
    #[serde(default)]
    pub engine: Option<EngineSection>,
}

/// `[engine]` table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineSection {
    /// Version string; provider default when absent
    #[serde(default)]
    pub version: Option<String>,

    /// Enable the experimental rule set
    #[serde(default)]
    pub experimental: bool,

    /// Use script grammar
    #[serde(default)]
    pub script: bool,

    /// Preference files, relative to the project directory
    #[serde(default)]
    pub config_files: Vec<PathBuf>,

    /// Opaque user data
    #[serde(default)]
    pub user_data: BTreeMap<String, String>,

    /// Artifact mirror mappings
    #[serde(default)]
    pub mirrors: BTreeMap<String, String>,

    /// Property overrides
    #[serde(default)]
    pub overrides: BTreeMap<String, Value>,
}

impl FormatSettings {
    /// Parse settings from TOML text
    ///
    /// # Errors
    /// - `SettingsError::Parse` on invalid TOML or unknown keys
    pub fn from_toml_str(text: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a settings file
    ///
    /// # Errors
    /// - `SettingsError::Io` if the file cannot be read
    /// - `SettingsError::Parse` on invalid content
    pub fn from_path(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}
