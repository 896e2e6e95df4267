//! fmtstep Steps
//!
//! Turns engine configuration into frozen, pipeline-ready steps.
//!
//! # Core Concepts
//!
//! - [`FormatterInvoker`]: applies one engine to one file, first uncorrected
//!   diagnostic wins
//! - [`CallShape`]: legacy vs override-aware engine entry point, fixed at build time
//! - [`StepBuilder`]: mutable staging, re-resolves overrides on every build
//! - [`Step`]: immutable snapshot + formatter function, compared by [`Fingerprint`]
//!
//! # Lifecycle
//!
//! ```text
//! StepBuilder ──build()──► Step ──(builder mutated)──► build() ──► Step'
//!                                                              replaces Step
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod builder;
pub mod error;
pub mod fingerprint;
pub mod func;
pub mod invoker;
pub mod step;

// Re-exports
pub use builder::StepBuilder;
pub use error::{BuildError, FormatError};
pub use fingerprint::Fingerprint;
pub use func::FormatterFunc;
pub use invoker::{CallShape, FormatterInvoker};
pub use step::{EngineStepConfig, PreferenceFile, Step};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
