//! Resolved program model for the ovid transpiler core.
//!
//! This crate is the input contract of the pipeline: a forest of per-file,
//! fully resolved declarations with symbol and type information attached,
//! stored in index-keyed arenas. Whatever front end parses and type-checks
//! the source language populates a [`Program`] (typically through
//! [`ProgramBuilder`]); the core only reads it. Identity is always the index
//! handle, never a name — names may collide across scopes and that is the
//! whole point of the downstream disambiguation passes.

// Arena storage - units, type declarations, members
pub mod arena;
pub use arena::{
    Member, MemberId, MemberKind, Param, Program, ProgramUnit, TypeDecl, TypeId, TypeKind, UnitId,
};

// Type references, modifiers, erasure
pub mod types;
pub use types::{Modifiers, Primitive, TypeRef, WildcardKind};

// Expression trees for initializers and bodies
pub mod expr;
pub use expr::{BinaryOp, Expr, ExprId, ExprKind, Literal};

// Stable signature serialization
pub mod signature;

// Programmatic model construction
pub mod builder;
pub use builder::ProgramBuilder;
