//! The per-file formatting function a step wraps

use crate::error::FormatError;
use std::fmt;
use std::path::Path;

/// Applies one configured formatter to one file's content
///
/// Content arrives line-ending normalized. Implementations must be safe to
/// call from several threads at once.
pub trait FormatterFunc: Send + Sync + fmt::Debug {
    /// Format `content` belonging to `file`
    ///
    /// # Errors
    /// - `FormatError` if this file cannot be formatted
    fn apply(&self, content: &str, file: &Path) -> Result<String, FormatError>;
}
