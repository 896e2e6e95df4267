//! Import ordering step
//!
//! Regroups the leading block of `import` lines by a configured prefix
//! order. Everything outside that block passes through untouched.

use crate::error::ImportOrderError;
use fmtstep_step::{FormatError, FormatterFunc, Step};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

/// Pipeline name of the import ordering step
pub const STEP_NAME: &str = "importOrder";

/// Prefix groups, in output order
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImportOrder {
    groups: Vec<String>,
}

impl ImportOrder {
    /// Create from prefixes in output order
    pub fn new<I, S>(groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            groups: groups.into_iter().map(Into::into).collect(),
        }
    }

    /// Configured prefixes
    #[inline]
    #[must_use]
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    /// Parse `N=prefix` entries; `#` starts a comment line
    ///
    /// # Errors
    /// - `ImportOrderError::Malformed` for a line without `=` or a non-numeric index
    /// - `ImportOrderError::DuplicateIndex` if two entries share an index
    pub fn parse(text: &str) -> Result<Self, ImportOrderError> {
        let mut entries: Vec<(usize, String)> = Vec::new();

        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (index, prefix) = line
                .split_once('=')
                .ok_or_else(|| ImportOrderError::malformed(idx + 1, line))?;
            let index: usize = index
                .trim()
                .parse()
                .map_err(|_| ImportOrderError::malformed(idx + 1, line))?;
            if entries.iter().any(|(n, _)| *n == index) {
                return Err(ImportOrderError::DuplicateIndex(index));
            }
            entries.push((index, prefix.trim().to_string()));
        }

        entries.sort_by_key(|(n, _)| *n);
        Ok(Self::new(entries.into_iter().map(|(_, prefix)| prefix)))
    }

    /// Read and parse an import-order file
    ///
    /// # Errors
    /// - `ImportOrderError::Io` if the file cannot be read
    /// - parse errors as in [`ImportOrder::parse`]
    pub fn from_file(path: &Path) -> Result<Self, ImportOrderError> {
        let text = std::fs::read_to_string(path).map_err(|source| ImportOrderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Freeze into a pipeline step
    ///
    /// # Errors
    /// Returns error if the configuration cannot be encoded as JSON
    pub fn into_step(self) -> Result<Step, serde_json::Error> {
        Step::new(STEP_NAME, &self, Arc::new(self.clone()))
    }

    /// Group index for an import target; `groups.len()` is the trailing group
    fn group_of(&self, target: &str) -> usize {
        self.groups
            .iter()
            .enumerate()
            .filter(|(_, prefix)| matches_prefix(target, prefix))
            .max_by_key(|(_, prefix)| prefix.len())
            .map_or(self.groups.len(), |(i, _)| i)
    }

    /// Reorder imports in `content`
    #[must_use]
    pub fn reorder(&self, content: &str) -> String {
        let lines: Vec<&str> = content.split('\n').collect();

        let Some(start) = lines.iter().position(|l| parse_import(l).is_some()) else {
            return content.to_string();
        };
        // Leading run of imports and blank lines; stops at the first code line.
        let end = lines[start..]
            .iter()
            .take_while(|l| l.trim().is_empty() || parse_import(l).is_some())
            .enumerate()
            .filter(|(_, l)| !l.trim().is_empty())
            .last()
            .map_or(start, |(i, _)| start + i);
        let block = &lines[start..=end];

        let mut buckets: Vec<BTreeSet<Import<'_>>> = vec![BTreeSet::new(); self.groups.len() + 1];
        for import in block.iter().filter_map(|l| parse_import(l)) {
            buckets[self.group_of(import.target)].insert(import);
        }

        let mut out: Vec<&str> = lines[..start].to_vec();
        let mut first = true;
        for bucket in buckets.iter().filter(|b| !b.is_empty()) {
            if !first {
                out.push("");
            }
            first = false;
            out.extend(bucket.iter().map(|i| i.line));
        }
        out.extend_from_slice(&lines[end + 1..]);
        out.join("\n")
    }
}

impl FormatterFunc for ImportOrder {
    fn apply(&self, content: &str, _file: &Path) -> Result<String, FormatError> {
        Ok(self.reorder(content))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Import<'a> {
    target: &'a str,
    line: &'a str,
}

fn parse_import(line: &str) -> Option<Import<'_>> {
    let rest = line.trim_start().strip_prefix("import ")?.trim_start();
    let rest = rest.strip_prefix("static ").map_or(rest, str::trim_start);
    // Target ends at `;`, an alias, or a trailing comment.
    let target = rest
        .split(|c: char| c == ';' || c.is_whitespace())
        .next()
        .unwrap_or_default();
    if target.is_empty() {
        return None;
    }
    Some(Import {
        target,
        line: line.trim_end(),
    })
}

fn matches_prefix(target: &str, prefix: &str) -> bool {
    if prefix.is_empty() {
        return true;
    }
    target
        .strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
}
