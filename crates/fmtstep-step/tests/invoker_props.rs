//! Property tests for diagnostic handling in the invoker
//!
//! Whatever the mix of findings an engine reports, the invoker must either
//! return the engine's content untouched (all corrected) or fail with the
//! first uncorrected finding (never partial content).

use fmtstep_engine::{Diagnostic, EngineVersion, Location, RuleSelection};
use fmtstep_step::{CallShape, FormatError, FormatterInvoker};
use fmtstep_test_utils::{FakeEngine, FakeRuleCatalog};
use proptest::prelude::*;
use std::path::Path;
use std::sync::Arc;

fn finding() -> impl Strategy<Value = (bool, usize, usize)> {
    (any::<bool>(), 1..200usize, 1..120usize)
}

fn to_diagnostic((corrected, line, column): (bool, usize, usize)) -> Diagnostic {
    let location = Location::new(line, column);
    if corrected {
        Diagnostic::corrected(location, "indent", "Unexpected indentation")
    } else {
        Diagnostic::uncorrected(location, "max-line-length", "Exceeded max line length")
    }
}

fn invoker_for(engine: FakeEngine) -> FormatterInvoker {
    FormatterInvoker::new(
        Arc::new(engine),
        FakeRuleCatalog::shared().as_ref(),
        &RuleSelection::standard(),
        CallShape::Legacy,
    )
}

proptest! {
    #[test]
    fn prop_corrected_only_never_aborts(
        findings in proptest::collection::vec((1..200usize, 1..120usize), 0..20)
    ) {
        let mut engine = FakeEngine::new(EngineVersion::new(0, 46, 1)).rewriting("val x=1", "val x = 1");
        for (line, column) in findings {
            engine = engine.reporting(to_diagnostic((true, line, column)));
        }

        let out = invoker_for(engine).apply("val x=1", Path::new("A.kt"));
        prop_assert_eq!(out.unwrap(), "val x = 1");
    }

    #[test]
    fn prop_first_uncorrected_wins(
        findings in proptest::collection::vec(finding(), 1..20),
        ignore_abort in any::<bool>()
    ) {
        let first_failure = findings.iter().find(|(corrected, _, _)| !corrected).copied();

        let mut engine = FakeEngine::new(EngineVersion::new(0, 46, 1)).rewriting("val x=1", "val x = 1");
        if ignore_abort {
            engine = engine.ignoring_abort();
        }
        for f in &findings {
            engine = engine.reporting(to_diagnostic(*f));
        }

        let out = invoker_for(engine).apply("val x=1", Path::new("A.kt"));
        match first_failure {
            None => prop_assert_eq!(out.unwrap(), "val x = 1"),
            Some((_, line, column)) => {
                let err = out.unwrap_err();
                prop_assert!(matches!(err, FormatError::Uncorrected { .. }), "unexpected error kind");
                prop_assert_eq!(err.location(), Some(Location::new(line, column)));
            }
        }
    }
}
