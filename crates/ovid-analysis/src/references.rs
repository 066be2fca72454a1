//! Reference collection inside initializer trees.
//!
//! A sub-walk over one expression tree that records every type declaration
//! the tree depends on at initialization time: types used as values, owners
//! of static member accesses, and instantiation targets.

use ovid_model::{ExprId, ExprKind, Program, TypeId};
use rustc_hash::FxHashSet;

#[derive(Debug)]
pub struct ReferenceGrabber<'p> {
    program: &'p Program,
    seen: FxHashSet<TypeId>,
    /// Referenced types, in first-encounter order.
    pub referenced_types: Vec<TypeId>,
}

impl<'p> ReferenceGrabber<'p> {
    pub fn new(program: &'p Program) -> Self {
        Self {
            program,
            seen: FxHashSet::default(),
            referenced_types: Vec::new(),
        }
    }

    fn record(&mut self, ty: TypeId) {
        if self.seen.insert(ty) {
            self.referenced_types.push(ty);
        }
    }

    pub fn scan(&mut self, expr: ExprId) {
        match &self.program.expr(expr).kind {
            ExprKind::TypeLiteral(ty) => self.record(*ty),
            ExprKind::New { ty, args } => {
                self.record(*ty);
                for &arg in args {
                    self.scan(arg);
                }
            }
            ExprKind::FieldRead { receiver, field } => {
                let member = self.program.member(*field);
                if member.is_static() {
                    self.record(member.owner);
                }
                if let Some(r) = receiver {
                    self.scan(*r);
                }
            }
            ExprKind::Call {
                receiver,
                method,
                args,
            } => {
                let member = self.program.member(*method);
                if member.is_static() {
                    self.record(member.owner);
                }
                if let Some(r) = receiver {
                    self.scan(*r);
                }
                for &arg in args {
                    self.scan(arg);
                }
            }
            ExprKind::Binary { lhs, rhs, .. } => {
                self.scan(*lhs);
                self.scan(*rhs);
            }
            ExprKind::Assign { target, value } => {
                self.scan(*target);
                self.scan(*value);
            }
            ExprKind::Return(value) => {
                if let Some(v) = value {
                    self.scan(*v);
                }
            }
            ExprKind::Local { init, .. } => {
                if let Some(i) = init {
                    self.scan(*i);
                }
            }
            ExprKind::Block(stmts) => {
                for &s in stmts {
                    self.scan(s);
                }
            }
            ExprKind::Literal(_)
            | ExprKind::LocalRef(_)
            | ExprKind::This
            | ExprKind::Unresolved { .. } => {}
        }
    }
}
