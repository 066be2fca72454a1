//! Index-keyed arenas for units, type declarations and members.

use crate::expr::{Expr, ExprId};
use crate::types::{Modifiers, TypeRef};
use ovid_common::Position;
use smallvec::SmallVec;

/// Index of a program unit (one source file's resolved tree).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(pub u32);

/// Index of a type declaration. Identity is this handle, not the name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

/// Index of a member (field, method or static block).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberId(pub u32);

/// One source file's resolved tree: package identity, imports, and the
/// ordered list of top-level type declarations.
#[derive(Clone, Debug)]
pub struct ProgramUnit {
    pub file_name: String,
    /// Package path segments, outermost first. Empty for the root package.
    pub package: Vec<String>,
    /// The unit's simple name, derived from the file stem.
    pub simple_name: String,
    pub imports: Vec<TypeId>,
    pub types: Vec<TypeId>,
}

impl ProgramUnit {
    pub fn package_name(&self) -> String {
        self.package.join(".")
    }

    /// Declaration units carry ambient declarations only; in bundle mode
    /// they are routed into the declaration-only bundle.
    pub fn is_declaration_unit(&self) -> bool {
        self.package.first().map(String::as_str) == Some("def")
    }

    /// Package segments as they appear in generated output: the reserved
    /// `def` root of declaration units is not part of the target name.
    pub fn target_segments(&self) -> impl Iterator<Item = &str> {
        self.package
            .iter()
            .enumerate()
            .filter(|(i, s)| !(*i == 0 && s.as_str() == "def"))
            .map(|(_, s)| s.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    Interface,
}

/// A class or interface declaration.
#[derive(Clone, Debug)]
pub struct TypeDecl {
    pub name: String,
    pub kind: TypeKind,
    pub modifiers: Modifiers,
    pub unit: UnitId,
    pub superclass: Option<TypeId>,
    pub interfaces: Vec<TypeId>,
    pub members: Vec<MemberId>,
    pub pos: Position,
}

/// A method or constructor parameter.
#[derive(Clone, Debug)]
pub struct Param {
    pub name: String,
    pub ty: TypeRef,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

#[derive(Clone, Debug)]
pub enum MemberKind {
    Field {
        ty: TypeRef,
        initializer: Option<ExprId>,
    },
    Method {
        params: SmallVec<[Param; 4]>,
        return_type: TypeRef,
        body: Option<ExprId>,
    },
    StaticBlock {
        body: ExprId,
    },
}

/// A field, method or static initializer block. Several members of one type
/// may share a declared name (overloading, field/method clashes).
#[derive(Clone, Debug)]
pub struct Member {
    pub name: String,
    pub owner: TypeId,
    pub modifiers: Modifiers,
    pub kind: MemberKind,
    pub pos: Position,
}

impl Member {
    pub fn is_static(&self) -> bool {
        self.modifiers.contains(Modifiers::STATIC)
    }

    pub fn is_final(&self) -> bool {
        self.modifiers.contains(Modifiers::FINAL)
    }

    pub fn is_default_method(&self) -> bool {
        self.modifiers.contains(Modifiers::DEFAULT)
    }

    pub fn is_field(&self) -> bool {
        matches!(self.kind, MemberKind::Field { .. })
    }

    pub fn is_method(&self) -> bool {
        matches!(self.kind, MemberKind::Method { .. })
    }

    pub fn is_static_block(&self) -> bool {
        matches!(self.kind, MemberKind::StaticBlock { .. })
    }

    pub fn params(&self) -> &[Param] {
        match &self.kind {
            MemberKind::Method { params, .. } => params,
            _ => &[],
        }
    }

    /// Parameter count, for methods.
    pub fn arity(&self) -> Option<usize> {
        match &self.kind {
            MemberKind::Method { params, .. } => Some(params.len()),
            _ => None,
        }
    }

    pub fn body(&self) -> Option<ExprId> {
        match &self.kind {
            MemberKind::Method { body, .. } => *body,
            MemberKind::StaticBlock { body } => Some(*body),
            MemberKind::Field { .. } => None,
        }
    }

    pub fn field_initializer(&self) -> Option<ExprId> {
        match &self.kind {
            MemberKind::Field { initializer, .. } => *initializer,
            _ => None,
        }
    }
}

/// The whole resolved program: an ordered collection of units plus the
/// shared type/member/expression arenas. Immutable once built — every later
/// stage reads it by reference and keeps its own state elsewhere.
#[derive(Clone, Debug, Default)]
pub struct Program {
    pub(crate) units: Vec<ProgramUnit>,
    pub(crate) types: Vec<TypeDecl>,
    pub(crate) members: Vec<Member>,
    pub(crate) exprs: Vec<Expr>,
}

impl Program {
    pub fn unit(&self, id: UnitId) -> &ProgramUnit {
        &self.units[id.0 as usize]
    }

    pub fn type_decl(&self, id: TypeId) -> &TypeDecl {
        &self.types[id.0 as usize]
    }

    pub fn member(&self, id: MemberId) -> &Member {
        &self.members[id.0 as usize]
    }

    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.0 as usize]
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    pub fn unit_ids(&self) -> impl Iterator<Item = UnitId> + '_ {
        (0..self.units.len()).map(|i| UnitId(i as u32))
    }

    pub fn units(&self) -> impl Iterator<Item = (UnitId, &ProgramUnit)> + '_ {
        self.units
            .iter()
            .enumerate()
            .map(|(i, u)| (UnitId(i as u32), u))
    }

    pub fn type_ids(&self) -> impl Iterator<Item = TypeId> + '_ {
        (0..self.types.len()).map(|i| TypeId(i as u32))
    }

    /// The source-side fully qualified name (`pkg.sub.Name`).
    pub fn qualified_name(&self, id: TypeId) -> String {
        let decl = self.type_decl(id);
        let unit = self.unit(decl.unit);
        if unit.package.is_empty() {
            decl.name.clone()
        } else {
            format!("{}.{}", unit.package_name(), decl.name)
        }
    }

    /// The name a type is referred to by in generated output. Declaration
    /// units' reserved `def` root segment is not part of the target name.
    pub fn target_qualified_name(&self, id: TypeId) -> String {
        let decl = self.type_decl(id);
        let unit = self.unit(decl.unit);
        let segments: Vec<&str> = unit.target_segments().collect();
        if segments.is_empty() {
            decl.name.clone()
        } else {
            format!("{}.{}", segments.join("."), decl.name)
        }
    }

    /// Iterate a type's members in declaration order.
    pub fn members_of(&self, ty: TypeId) -> impl Iterator<Item = (MemberId, &Member)> + '_ {
        self.type_decl(ty)
            .members
            .iter()
            .map(|&id| (id, self.member(id)))
    }

    /// First method of `ty` with the given declared name, if any.
    pub fn find_method(&self, ty: TypeId, name: &str) -> Option<MemberId> {
        self.members_of(ty)
            .find(|(_, m)| m.is_method() && m.name == name)
            .map(|(id, _)| id)
    }

    /// Walk the superclass chain starting at `ty` (exclusive).
    pub fn superclass_chain(&self, ty: TypeId) -> impl Iterator<Item = TypeId> + '_ {
        let mut current = self.type_decl(ty).superclass;
        std::iter::from_fn(move || {
            let next = current?;
            current = self.type_decl(next).superclass;
            Some(next)
        })
    }

    /// The constructor of a class: the first method whose name equals the
    /// class name.
    pub fn constructor_of(&self, ty: TypeId) -> Option<MemberId> {
        let name = &self.type_decl(ty).name;
        self.find_method(ty, name)
    }
}
