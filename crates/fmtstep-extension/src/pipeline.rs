//! Ordered step pipeline
//!
//! Slots are keyed by step name. Replacing a step swaps the value in its
//! slot with a single assignment, so the slot is never empty or doubled and
//! the step keeps its position.

use crate::error::PipelineError;
use fmtstep_step::{FormatError, Step};
use indexmap::IndexMap;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Mutable, ordered collection of steps during configuration
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    steps: IndexMap<String, Step>,
}

impl Pipeline {
    /// Create empty pipeline
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append step
    ///
    /// # Errors
    /// - `PipelineError::DuplicateStep` if the name is taken
    pub fn add_step(&mut self, step: Step) -> Result<(), PipelineError> {
        if self.steps.contains_key(step.name()) {
            return Err(PipelineError::DuplicateStep(step.name().to_string()));
        }
        tracing::debug!(step = step.name(), position = self.steps.len(), "adding step");
        self.steps.insert(step.name().to_string(), step);
        Ok(())
    }

    /// Swap in `step` for the step with the same name, returning the old one
    ///
    /// # Errors
    /// - `PipelineError::NoSuchStep` if no step has that name
    pub fn replace_step(&mut self, step: Step) -> Result<Step, PipelineError> {
        match self.steps.get_mut(step.name()) {
            Some(slot) => {
                tracing::info!(step = step.name(), fingerprint = %step.fingerprint().short(), "replacing step");
                Ok(std::mem::replace(slot, step))
            }
            None => Err(PipelineError::NoSuchStep(step.name().to_string())),
        }
    }

    /// Step by name
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Step> {
        self.steps.get(name)
    }

    /// Position of the named step
    #[inline]
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.steps.get_index_of(name)
    }

    /// Steps in pipeline order
    pub fn steps(&self) -> impl Iterator<Item = &Step> {
        self.steps.values()
    }

    /// Step names in pipeline order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.steps.keys().map(String::as_str)
    }

    /// Number of steps
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if pipeline has no steps
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Freeze the pipeline; no further steps can be added or replaced
    #[must_use]
    pub fn finalize(self) -> FinalizedPipeline {
        FinalizedPipeline {
            steps: self.steps.into_values().collect(),
        }
    }
}

/// Terminal pipeline used for formatting
#[derive(Debug, Clone)]
pub struct FinalizedPipeline {
    steps: Vec<Step>,
}

/// Formatting outcome for one file of a batch
pub type FileOutcome = (PathBuf, Result<String, FormatError>);

impl FinalizedPipeline {
    /// Steps in order
    #[inline]
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Run every step over one file, each feeding the next
    ///
    /// # Errors
    /// - the first step failure; later steps are skipped for this file
    pub fn apply(&self, content: &str, file: &Path) -> Result<String, FormatError> {
        self.steps
            .iter()
            .try_fold(content.to_string(), |acc, step| step.apply(&acc, file))
    }

    /// Format many files in parallel
    ///
    /// Outcomes are returned in input order; one file failing does not
    /// affect the others.
    #[must_use]
    pub fn apply_all(&self, files: &[(PathBuf, String)]) -> Vec<FileOutcome> {
        files
            .par_iter()
            .map(|(path, content)| (path.clone(), self.apply(content, path)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fmtstep_step::FormatterFunc;
    use serde_json::json;
    use std::sync::Arc;

    #[derive(Debug)]
    struct Append(&'static str);

    impl FormatterFunc for Append {
        fn apply(&self, content: &str, _file: &Path) -> Result<String, FormatError> {
            Ok(format!("{content}{}", self.0))
        }
    }

    fn step(name: &str, suffix: &'static str) -> Step {
        Step::new(name, &json!({ "suffix": suffix }), Arc::new(Append(suffix))).unwrap()
    }

    #[test]
    fn add_preserves_order() {
        let mut pipeline = Pipeline::new();
        pipeline.add_step(step("a", "1")).unwrap();
        pipeline.add_step(step("b", "2")).unwrap();

        assert_eq!(pipeline.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(pipeline.position("b"), Some(1));
    }

    #[test]
    fn duplicate_names_rejected() {
        let mut pipeline = Pipeline::new();
        pipeline.add_step(step("a", "1")).unwrap();
        assert_eq!(
            pipeline.add_step(step("a", "2")),
            Err(PipelineError::DuplicateStep("a".to_string()))
        );
        assert_eq!(pipeline.len(), 1);
    }

    #[test]
    fn replace_keeps_position() {
        let mut pipeline = Pipeline::new();
        pipeline.add_step(step("a", "1")).unwrap();
        pipeline.add_step(step("b", "2")).unwrap();
        pipeline.add_step(step("c", "3")).unwrap();

        let old = pipeline.replace_step(step("b", "X")).unwrap();

        assert_eq!(old.snapshot(), &json!({ "suffix": "2" }));
        assert_eq!(pipeline.len(), 3);
        assert_eq!(pipeline.position("b"), Some(1));
        assert_eq!(pipeline.get("b").unwrap().snapshot(), &json!({ "suffix": "X" }));
    }

    #[test]
    fn replace_unknown_fails() {
        let mut pipeline = Pipeline::new();
        assert_eq!(
            pipeline.replace_step(step("ghost", "1")).unwrap_err(),
            PipelineError::NoSuchStep("ghost".to_string())
        );
        assert!(pipeline.is_empty());
    }

    #[test]
    fn finalized_applies_in_order() {
        let mut pipeline = Pipeline::new();
        pipeline.add_step(step("a", "1")).unwrap();
        pipeline.add_step(step("b", "2")).unwrap();
        let finalized = pipeline.finalize();

        assert_eq!(finalized.apply("x", Path::new("f")).unwrap(), "x12");
    }

    #[test]
    fn apply_all_keeps_input_order() {
        let mut pipeline = Pipeline::new();
        pipeline.add_step(step("a", "!")).unwrap();
        let finalized = pipeline.finalize();

        let files: Vec<(PathBuf, String)> = (0..32)
            .map(|i| (PathBuf::from(format!("f{i}")), format!("{i}")))
            .collect();
        let outcomes = finalized.apply_all(&files);

        for (i, (path, outcome)) in outcomes.iter().enumerate() {
            assert_eq!(path, &PathBuf::from(format!("f{i}")));
            assert_eq!(outcome.as_ref().unwrap(), &format!("{i}!"));
        }
    }
}
