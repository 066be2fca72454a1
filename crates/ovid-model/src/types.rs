//! Type references, declaration modifiers, and erasure.

use crate::arena::{Program, TypeId};
use bitflags::bitflags;
use serde::Serialize;

bitflags! {
    /// Declaration modifiers.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Modifiers: u16 {
        const STATIC   = 1 << 0;
        const FINAL    = 1 << 1;
        const ABSTRACT = 1 << 2;
        /// An interface method carrying a default body.
        const DEFAULT  = 1 << 3;
        const PUBLIC   = 1 << 4;
        const PRIVATE  = 1 << 5;
    }
}

/// Built-in value types of the source language.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Primitive {
    Void,
    Boolean,
    Char,
    Int,
    Long,
    Double,
    /// The built-in string type.
    Str,
}

impl Primitive {
    pub fn erased_name(self) -> &'static str {
        match self {
            Primitive::Void => "void",
            Primitive::Boolean => "boolean",
            Primitive::Char => "char",
            Primitive::Int => "int",
            Primitive::Long => "long",
            Primitive::Double => "double",
            Primitive::Str => "String",
        }
    }
}

/// The variance marker of a wildcard type argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum WildcardKind {
    Unbounded,
    Extends,
    Super,
}

/// A resolved reference to a type, as attached to fields, parameters and
/// return positions by the front end.
#[derive(Clone, Debug, PartialEq)]
pub enum TypeRef {
    Primitive(Primitive),
    Named(TypeId),
    /// A type variable of a generic declaration.
    Var(String),
    Generic {
        base: TypeId,
        args: Vec<TypeRef>,
    },
    /// A wildcard-bounded type argument. Has no target-language equivalent
    /// and is erased consistently via the global wildcard registry.
    Wildcard {
        kind: WildcardKind,
        bound: Option<Box<TypeRef>>,
    },
}

impl TypeRef {
    pub fn int() -> Self {
        TypeRef::Primitive(Primitive::Int)
    }

    pub fn double() -> Self {
        TypeRef::Primitive(Primitive::Double)
    }

    pub fn boolean() -> Self {
        TypeRef::Primitive(Primitive::Boolean)
    }

    pub fn string() -> Self {
        TypeRef::Primitive(Primitive::Str)
    }

    pub fn void() -> Self {
        TypeRef::Primitive(Primitive::Void)
    }

    /// The erased, qualified name of this reference. Type variables and
    /// unbounded (or lower-bounded) wildcards erase to the root object type;
    /// an upper-bounded wildcard erases to its bound.
    pub fn erased_name(&self, program: &Program) -> String {
        match self {
            TypeRef::Primitive(p) => p.erased_name().to_string(),
            TypeRef::Named(id) => program.qualified_name(*id),
            TypeRef::Var(_) => "Object".to_string(),
            TypeRef::Generic { base, .. } => program.qualified_name(*base),
            TypeRef::Wildcard { kind, bound } => match (kind, bound) {
                (WildcardKind::Extends, Some(b)) => b.erased_name(program),
                _ => "Object".to_string(),
            },
        }
    }

    /// True when this reference is or contains a wildcard.
    pub fn contains_wildcard(&self) -> bool {
        match self {
            TypeRef::Wildcard { .. } => true,
            TypeRef::Generic { args, .. } => args.iter().any(TypeRef::contains_wildcard),
            _ => false,
        }
    }

    /// The outermost wildcard in this reference, if any.
    pub fn find_wildcard(&self) -> Option<(&WildcardKind, Option<&TypeRef>)> {
        match self {
            TypeRef::Wildcard { kind, bound } => Some((kind, bound.as_deref())),
            TypeRef::Generic { args, .. } => args.iter().find_map(TypeRef::find_wildcard),
            _ => None,
        }
    }
}
