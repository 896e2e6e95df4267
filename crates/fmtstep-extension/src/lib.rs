//! fmtstep Extension
//!
//! Pipeline-facing configuration surface.
//!
//! # Core Concepts
//!
//! - [`FormatExtension`]: owns the [`Pipeline`] while it is being configured
//! - [`EngineConfig`]: handle whose every call rebuilds the engine step and
//!   replaces it in place
//! - [`ImportOrder`]: one-shot import grouping step
//! - [`FormatSettings`]: declarative TOML form of the same operations
//! - [`FinalizedPipeline`]: frozen steps, applied per file or in parallel

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod extension;
pub mod import_order;
pub mod pipeline;
pub mod settings;

// Re-exports
pub use error::{ExtensionError, ExtensionResult, ImportOrderError, PipelineError, SettingsError};
pub use extension::{EngineConfig, FormatExtension, ENGINE_STEP};
pub use import_order::ImportOrder;
pub use pipeline::{FileOutcome, FinalizedPipeline, Pipeline};
pub use settings::{EngineSection, FormatSettings};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
