//! Common types and utilities for the ovid transpiler core.
//!
//! This crate provides foundational types used across all ovid crates:
//! - Position/LineMap types for source locations
//! - Source map generation and reverse lookup
//! - Structured problems and the reporting sink
//! - Transpilation options

// Position/LineMap types for line/column source locations
pub mod position;
pub use position::{LineMap, Position, SourcePosition};

// Source Map generation
pub mod source_map;
pub use source_map::{SourceMap, SourceMapEntry};

// Problems - structured diagnostics and the reporting sink
pub mod diagnostics;
pub use diagnostics::{
    CollectingReporter, ErrorCountReporter, Problem, ProblemKind, ProblemReporter, Severity,
};

// Transpilation options
pub mod options;
pub use options::{ModuleKind, TranspileOptions};
