//! Programmatic construction of a [`Program`].
//!
//! Stands in for the front-end collaborator: a real front end would parse
//! and resolve source files and populate the same arenas. Positions are
//! synthesized from line numbers; a node created from children inherits the
//! position of its leftmost child, matching how a real parser stamps a
//! parent node with the start of its first token.

use crate::arena::{
    Member, MemberId, MemberKind, Param, Program, ProgramUnit, TypeDecl, TypeId, TypeKind, UnitId,
};
use crate::expr::{BinaryOp, Expr, ExprId, ExprKind, Literal};
use crate::types::{Modifiers, TypeRef};
use ovid_common::{LineMap, Position};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Spacing of synthesized positions within one line.
const COL_STRIDE: u32 = 4;
/// Synthesized byte offset per line, generous enough for any test fixture.
const LINE_STRIDE: u32 = 4096;

pub struct ProgramBuilder {
    program: Program,
    /// Next synthesized expression column per line.
    line_cols: FxHashMap<u32, u32>,
    /// Optional real line maps, keyed by unit, for offset-based positions.
    line_maps: FxHashMap<UnitId, LineMap>,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self {
            program: Program::default(),
            line_cols: FxHashMap::default(),
            line_maps: FxHashMap::default(),
        }
    }

    pub fn finish(self) -> Program {
        self.program
    }

    // =========================================================================
    // Units and type declarations
    // =========================================================================

    pub fn add_unit(&mut self, file_name: &str, package: &[&str]) -> UnitId {
        let stem = file_name
            .rsplit('/')
            .next()
            .unwrap_or(file_name)
            .split('.')
            .next()
            .unwrap_or(file_name);
        let id = UnitId(self.program.units.len() as u32);
        self.program.units.push(ProgramUnit {
            file_name: file_name.to_string(),
            package: package.iter().map(|s| s.to_string()).collect(),
            simple_name: stem.to_string(),
            imports: Vec::new(),
            types: Vec::new(),
        });
        id
    }

    /// Attach a real source text to a unit so positions can be derived from
    /// byte offsets instead of synthesized lines.
    pub fn set_unit_source(&mut self, unit: UnitId, text: &str) {
        self.line_maps.insert(unit, LineMap::build(text));
    }

    /// Resolve a byte offset against the unit's source text.
    ///
    /// Panics if the unit has no source attached; fixture code decides up
    /// front which style it uses.
    pub fn position_at(&self, unit: UnitId, offset: u32) -> Position {
        self.line_maps[&unit].position_at(offset)
    }

    pub fn add_import(&mut self, unit: UnitId, ty: TypeId) {
        self.program.units[unit.0 as usize].imports.push(ty);
    }

    pub fn add_class(&mut self, unit: UnitId, name: &str, line: u32) -> TypeId {
        self.add_type(unit, name, TypeKind::Class, line)
    }

    pub fn add_interface(&mut self, unit: UnitId, name: &str, line: u32) -> TypeId {
        self.add_type(unit, name, TypeKind::Interface, line)
    }

    fn add_type(&mut self, unit: UnitId, name: &str, kind: TypeKind, line: u32) -> TypeId {
        let id = TypeId(self.program.types.len() as u32);
        self.program.types.push(TypeDecl {
            name: name.to_string(),
            kind,
            modifiers: Modifiers::empty(),
            unit,
            superclass: None,
            interfaces: Vec::new(),
            members: Vec::new(),
            pos: decl_position(line),
        });
        self.program.units[unit.0 as usize].types.push(id);
        id
    }

    pub fn set_superclass(&mut self, ty: TypeId, superclass: TypeId) {
        self.program.types[ty.0 as usize].superclass = Some(superclass);
    }

    pub fn add_implements(&mut self, ty: TypeId, iface: TypeId) {
        self.program.types[ty.0 as usize].interfaces.push(iface);
    }

    // =========================================================================
    // Members
    // =========================================================================

    pub fn add_field(
        &mut self,
        owner: TypeId,
        name: &str,
        ty: TypeRef,
        modifiers: Modifiers,
        initializer: Option<ExprId>,
        line: u32,
    ) -> MemberId {
        self.add_member(
            owner,
            name,
            modifiers,
            MemberKind::Field { ty, initializer },
            line,
        )
    }

    pub fn add_method(
        &mut self,
        owner: TypeId,
        name: &str,
        params: Vec<Param>,
        return_type: TypeRef,
        modifiers: Modifiers,
        body: Option<ExprId>,
        line: u32,
    ) -> MemberId {
        self.add_member(
            owner,
            name,
            modifiers,
            MemberKind::Method {
                params: SmallVec::from_vec(params),
                return_type,
                body,
            },
            line,
        )
    }

    pub fn add_static_block(&mut self, owner: TypeId, body: ExprId, line: u32) -> MemberId {
        self.add_member(
            owner,
            "<clinit>",
            Modifiers::STATIC,
            MemberKind::StaticBlock { body },
            line,
        )
    }

    fn add_member(
        &mut self,
        owner: TypeId,
        name: &str,
        modifiers: Modifiers,
        kind: MemberKind,
        line: u32,
    ) -> MemberId {
        let id = MemberId(self.program.members.len() as u32);
        self.program.members.push(Member {
            name: name.to_string(),
            owner,
            modifiers,
            kind,
            pos: decl_position(line),
        });
        self.program.types[owner.0 as usize].members.push(id);
        id
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    /// Create an expression node at the given line. The synthesized position
    /// is the leftmost child's position when the node has children, so that
    /// pre-order traversal of the finished tree is non-decreasing in source
    /// order.
    pub fn expr(&mut self, kind: ExprKind, line: u32) -> ExprId {
        let mut pos = self.next_expr_position(line);
        for child in child_exprs(&kind) {
            let child_pos = self.program.exprs[child.0 as usize].pos;
            if child_pos.pos < pos.pos {
                pos = child_pos;
            }
        }
        let id = ExprId(self.program.exprs.len() as u32);
        self.program.exprs.push(Expr { kind, pos });
        id
    }

    fn next_expr_position(&mut self, line: u32) -> Position {
        let col = self.line_cols.entry(line).or_insert(2 * COL_STRIDE);
        let pos = Position::new(line * LINE_STRIDE + *col, line, *col);
        *col += COL_STRIDE;
        pos
    }

    pub fn lit_null(&mut self, line: u32) -> ExprId {
        self.expr(ExprKind::Literal(Literal::Null), line)
    }

    pub fn lit_bool(&mut self, value: bool, line: u32) -> ExprId {
        self.expr(ExprKind::Literal(Literal::Bool(value)), line)
    }

    pub fn lit_int(&mut self, value: i64, line: u32) -> ExprId {
        self.expr(ExprKind::Literal(Literal::Int(value)), line)
    }

    pub fn lit_double(&mut self, value: f64, line: u32) -> ExprId {
        self.expr(ExprKind::Literal(Literal::Double(value)), line)
    }

    pub fn lit_str(&mut self, value: &str, line: u32) -> ExprId {
        self.expr(ExprKind::Literal(Literal::Str(value.to_string())), line)
    }

    pub fn local_ref(&mut self, name: &str, line: u32) -> ExprId {
        self.expr(ExprKind::LocalRef(name.to_string()), line)
    }

    pub fn this_ref(&mut self, line: u32) -> ExprId {
        self.expr(ExprKind::This, line)
    }

    pub fn type_literal(&mut self, ty: TypeId, line: u32) -> ExprId {
        self.expr(ExprKind::TypeLiteral(ty), line)
    }

    /// A static read or an implicit-`this` instance read of `field`.
    pub fn field_read(&mut self, field: MemberId, line: u32) -> ExprId {
        self.expr(
            ExprKind::FieldRead {
                receiver: None,
                field,
            },
            line,
        )
    }

    pub fn field_read_on(&mut self, receiver: ExprId, field: MemberId, line: u32) -> ExprId {
        self.expr(
            ExprKind::FieldRead {
                receiver: Some(receiver),
                field,
            },
            line,
        )
    }

    pub fn call(&mut self, method: MemberId, args: Vec<ExprId>, line: u32) -> ExprId {
        self.expr(
            ExprKind::Call {
                receiver: None,
                method,
                args,
            },
            line,
        )
    }

    pub fn call_on(
        &mut self,
        receiver: ExprId,
        method: MemberId,
        args: Vec<ExprId>,
        line: u32,
    ) -> ExprId {
        self.expr(
            ExprKind::Call {
                receiver: Some(receiver),
                method,
                args,
            },
            line,
        )
    }

    pub fn new_expr(&mut self, ty: TypeId, args: Vec<ExprId>, line: u32) -> ExprId {
        self.expr(ExprKind::New { ty, args }, line)
    }

    pub fn binary(&mut self, op: BinaryOp, lhs: ExprId, rhs: ExprId, line: u32) -> ExprId {
        self.expr(ExprKind::Binary { op, lhs, rhs }, line)
    }

    pub fn assign(&mut self, target: ExprId, value: ExprId, line: u32) -> ExprId {
        self.expr(ExprKind::Assign { target, value }, line)
    }

    pub fn ret(&mut self, value: Option<ExprId>, line: u32) -> ExprId {
        self.expr(ExprKind::Return(value), line)
    }

    pub fn local_var(&mut self, name: &str, init: Option<ExprId>, line: u32) -> ExprId {
        self.expr(
            ExprKind::Local {
                name: name.to_string(),
                init,
            },
            line,
        )
    }

    pub fn block(&mut self, stmts: Vec<ExprId>, line: u32) -> ExprId {
        self.expr(ExprKind::Block(stmts), line)
    }

    pub fn unresolved(&mut self, name: &str, line: u32) -> ExprId {
        self.expr(
            ExprKind::Unresolved {
                name: name.to_string(),
            },
            line,
        )
    }
}

fn decl_position(line: u32) -> Position {
    Position::line_start(line * LINE_STRIDE, line)
}

fn child_exprs(kind: &ExprKind) -> Vec<ExprId> {
    match kind {
        ExprKind::FieldRead { receiver, .. } => receiver.iter().copied().collect(),
        ExprKind::Call { receiver, args, .. } => {
            receiver.iter().copied().chain(args.iter().copied()).collect()
        }
        ExprKind::New { args, .. } => args.clone(),
        ExprKind::Binary { lhs, rhs, .. } => vec![*lhs, *rhs],
        ExprKind::Assign { target, value } => vec![*target, *value],
        ExprKind::Return(value) => value.iter().copied().collect(),
        ExprKind::Local { init, .. } => init.iter().copied().collect(),
        ExprKind::Block(stmts) => stmts.clone(),
        _ => Vec::new(),
    }
}
