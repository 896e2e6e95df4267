//! Engine version numbers
//!
//! Versions gate capabilities (e.g. override support), so they are parsed
//! once into a totally ordered value instead of compared as strings.

use crate::error::VersionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// `major.minor.patch` engine version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EngineVersion {
    /// Major component
    pub major: u32,
    /// Minor component
    pub minor: u32,
    /// Patch component
    pub patch: u32,
}

impl EngineVersion {
    /// Create version from components
    #[inline]
    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Check whether this version is at least `minimum`
    #[inline]
    #[must_use]
    pub fn at_least(&self, minimum: &Self) -> bool {
        self >= minimum
    }
}

impl FromStr for EngineVersion {
    type Err = VersionError;

    /// Parse `"1"`, `"1.2"` or `"1.2.3"`; missing components are zero
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(VersionError::Empty);
        }

        let mut parts = [0u32; 3];
        for (i, component) in trimmed.split('.').enumerate() {
            if i >= parts.len() {
                return Err(VersionError::TooManyComponents(trimmed.to_string()));
            }
            parts[i] = component
                .parse()
                .map_err(|_| VersionError::InvalidComponent {
                    version: trimmed.to_string(),
                    component: component.to_string(),
                })?;
        }

        Ok(Self::new(parts[0], parts[1], parts[2]))
    }
}

impl fmt::Display for EngineVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
