//! Stable signature serialization.
//!
//! Signatures serve two purposes downstream: matching overrides across the
//! inheritance chain, and breaking ties deterministically when two overloads
//! would otherwise mangle to the same output name. Both rely on the erased
//! form being stable across runs.

use crate::arena::{Member, MemberId, Program};

/// The erased parameter list of a method, e.g. `(int,a.b.Foo)`.
pub fn param_signature(program: &Program, member: &Member) -> String {
    let params: Vec<String> = member
        .params()
        .iter()
        .map(|p| p.ty.erased_name(program))
        .collect();
    format!("({})", params.join(","))
}

/// The full erased signature, e.g. `m(int,a.b.Foo)->void`.
pub fn erased_signature(program: &Program, id: MemberId) -> String {
    let member = program.member(id);
    let ret = match &member.kind {
        crate::arena::MemberKind::Method { return_type, .. } => return_type.erased_name(program),
        _ => "void".to_string(),
    };
    format!(
        "{}{}->{}",
        member.name,
        param_signature(program, member),
        ret
    )
}

/// True when `sub` overrides `sup`: same name and same erased parameters.
pub fn overrides(program: &Program, sub: MemberId, sup: MemberId) -> bool {
    let a = program.member(sub);
    let b = program.member(sup);
    a.name == b.name && param_signature(program, a) == param_signature(program, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ProgramBuilder;
    use crate::types::{Modifiers, TypeRef, WildcardKind};
    use crate::arena::Param;

    #[test]
    fn test_erased_signature_stability() {
        let mut b = ProgramBuilder::new();
        let unit = b.add_unit("p/Foo.x", &["p"]);
        let foo = b.add_class(unit, "Foo", 1);
        let m = b.add_method(
            foo,
            "m",
            vec![
                Param::new("a", TypeRef::int()),
                Param::new("b", TypeRef::Named(foo)),
            ],
            TypeRef::void(),
            Modifiers::empty(),
            None,
            2,
        );
        let program = b.finish();
        assert_eq!(erased_signature(&program, m), "m(int,p.Foo)->void");
    }

    #[test]
    fn test_wildcard_erases_to_bound() {
        let mut b = ProgramBuilder::new();
        let unit = b.add_unit("p/Foo.x", &["p"]);
        let foo = b.add_class(unit, "Foo", 1);
        let list = b.add_class(unit, "List", 2);
        let upper = TypeRef::Generic {
            base: list,
            args: vec![TypeRef::Wildcard {
                kind: WildcardKind::Extends,
                bound: Some(Box::new(TypeRef::Named(foo))),
            }],
        };
        let lower = TypeRef::Wildcard {
            kind: WildcardKind::Super,
            bound: Some(Box::new(TypeRef::Named(foo))),
        };
        let m = b.add_method(
            foo,
            "m",
            vec![Param::new("xs", upper), Param::new("y", lower)],
            TypeRef::void(),
            Modifiers::empty(),
            None,
            3,
        );
        let program = b.finish();
        // The generic erases to its base; the lower-bounded wildcard to Object.
        assert_eq!(erased_signature(&program, m), "m(p.List,Object)->void");
    }

    #[test]
    fn test_override_matching() {
        let mut b = ProgramBuilder::new();
        let unit = b.add_unit("Foo.x", &[]);
        let a = b.add_class(unit, "A", 1);
        let c = b.add_class(unit, "B", 4);
        b.set_superclass(c, a);
        let base = b.add_method(
            a,
            "m",
            vec![Param::new("x", TypeRef::int())],
            TypeRef::void(),
            Modifiers::empty(),
            None,
            2,
        );
        let same = b.add_method(
            c,
            "m",
            vec![Param::new("x", TypeRef::int())],
            TypeRef::void(),
            Modifiers::empty(),
            None,
            5,
        );
        let other = b.add_method(
            c,
            "m",
            vec![Param::new("x", TypeRef::string())],
            TypeRef::void(),
            Modifiers::empty(),
            None,
            6,
        );
        let program = b.finish();
        assert!(overrides(&program, same, base));
        assert!(!overrides(&program, other, base));
    }
}
