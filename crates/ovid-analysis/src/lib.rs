//! Whole-program analysis passes for the ovid transpiler core.
//!
//! Everything here runs once per translation run, before any code is
//! emitted, and produces immutable tables that the printer consumes by
//! reference:
//! - [`GlobalFacts`] — cross-cutting facts (name clashes, static
//!   initializer counts, default methods, lazy-init candidates, wildcards)
//! - [`OverloadPlan`] — an emission strategy for every overloaded member
//! - [`StaticInitAnalysis`] — the per-domain "must-initialize-before"
//!   dependency graphs used to order units in bundle mode

// Global facts collected before translation
pub mod facts;
pub use facts::{GlobalFacts, WildcardUse};

// Overload disambiguation
pub mod overloads;
pub use overloads::{DispatchStrategy, GroupKind, OverloadPlan, method_groups};

// Directed graph with cycle-reporting topological sort
pub mod graph;
pub use graph::DirectedGraph;

// Reference collection inside static initializers
pub mod references;
pub use references::ReferenceGrabber;

// Static-initialization dependency analysis
pub mod static_init;
pub use static_init::StaticInitAnalysis;
