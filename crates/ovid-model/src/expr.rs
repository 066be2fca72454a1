//! Resolved expression trees.
//!
//! Initializers, static blocks and method bodies are delivered as small
//! resolved trees: every name that survived front-end resolution carries its
//! target as an index handle. A front end that could not resolve a name
//! still delivers the node — as [`ExprKind::Unresolved`] — and the printer
//! treats it as fatal to the enclosing unit.

use crate::arena::{MemberId, TypeId};
use ovid_common::Position;

/// Index of an expression in the program's expression arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprId(pub u32);

/// A literal constant. The only initializer form that never needs deferred
/// static initialization.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    Str(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Eq => "===",
            BinaryOp::Ne => "!==",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

/// One resolved expression node.
#[derive(Clone, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub pos: Position,
}

#[derive(Clone, Debug)]
pub enum ExprKind {
    Literal(Literal),
    /// A local variable or parameter name.
    LocalRef(String),
    This,
    /// A type used as a value (class literal, qualifier of a static chain).
    TypeLiteral(TypeId),
    /// Field access with a resolved member. A `None` receiver means either a
    /// static read (static field) or an implicit `this` (instance field).
    FieldRead {
        receiver: Option<ExprId>,
        field: MemberId,
    },
    /// Method invocation with a resolved callee.
    Call {
        receiver: Option<ExprId>,
        method: MemberId,
        args: Vec<ExprId>,
    },
    New {
        ty: TypeId,
        args: Vec<ExprId>,
    },
    Binary {
        op: BinaryOp,
        lhs: ExprId,
        rhs: ExprId,
    },
    Assign {
        target: ExprId,
        value: ExprId,
    },
    Return(Option<ExprId>),
    /// A local variable statement.
    Local {
        name: String,
        init: Option<ExprId>,
    },
    /// An ordered statement sequence.
    Block(Vec<ExprId>),
    /// A name the front end failed to resolve. The input contract requires
    /// resolved trees, so the printer fails fast on this node.
    Unresolved {
        name: String,
    },
}

impl Expr {
    /// True for nodes whose value is a compile-time literal constant.
    pub fn is_literal(&self) -> bool {
        matches!(self.kind, ExprKind::Literal(_))
    }
}
