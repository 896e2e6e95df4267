//! Configuration fingerprints
//!
//! A [`Fingerprint`] is a Blake3 hash of canonical JSON. Two steps built from
//! the same configuration share a fingerprint, which is how configuration
//! equality is decided without comparing formatter objects.

use std::fmt::{self, Display, Formatter};

/// 32-byte Blake3 fingerprint
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Hash arbitrary bytes
    #[inline]
    #[must_use]
    pub fn compute(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Hash the JSON encoding of a serializable value
    ///
    /// `serde_json` objects are key-sorted, so equal values hash equally.
    ///
    /// # Errors
    /// Returns error if serialization fails
    #[inline]
    pub fn compute_serializable<T: serde::Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        let canonical = serde_json::to_value(value)?;
        Ok(Self::compute(canonical.to_string().as_bytes()))
    }

    /// Raw bytes
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Short string representation (first 16 hex chars)
    #[inline]
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..8])
    }
}

impl Display for Fingerprint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}
