//! Emission pipeline for the ovid transpiler core.
//!
//! Drives the whole back half of a translation run: the speculative tree
//! printer walks each resolved unit and produces target-language text with
//! a source map; the assembler runs the printer once per unit (independent
//! files) or over the dependency-sorted unit sequence (bundle mode) and
//! stitches the results together.

// SourceWriter - output buffer with line/column tracking and checkpoints
pub mod source_writer;
pub use source_writer::SourceWriter;

// Printer - speculative tree-to-text emission
pub mod printer;
pub use printer::{Printer, UnitAbort};

// Assembler - per-file and bundle output generation
pub mod assembler;
pub use assembler::{
    BundleInfo, EmittedFile, TranspileResult, UnitSourceMap, transpile, write_output,
};
