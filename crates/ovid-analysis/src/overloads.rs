//! Overload disambiguation.
//!
//! The target language cannot host two functions under one name, so every
//! group of same-named methods needs an emission strategy:
//!
//! - **Arity dispatch** (preferred): when every overload in the group takes
//!   a different number of arguments and every body is available, one
//!   function is emitted under the declared name that dispatches on
//!   `arguments.length`.
//! - **Mangled names**: otherwise each overload is emitted under the
//!   declared name extended with its erased parameter types.
//!
//! A supertype's resolved strategy is propagated down the inheritance chain
//! before any subtype assignment, so an override always lands on the same
//! output identity as the method it overrides. Overloads with identical
//! erased signatures cannot be distinguished at any call site; they get a
//! stable ordinal tiebreak and an `AmbiguousOverload` problem, and emission
//! continues best-effort.

use crate::facts::GlobalFacts;
use indexmap::IndexMap;
use ovid_common::{Problem, ProblemKind, ProblemReporter, SourcePosition};
use ovid_model::{Member, MemberId, Program, TypeId};
use rustc_hash::{FxHashMap, FxHashSet};

/// How one overloaded member is represented in the output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchStrategy {
    /// Emitted under a mangled name encoding the erased signature.
    Mangled(String),
    /// Folded into a single function under the declared name; `root` is the
    /// first-declared member of the group in the declaring type, where the
    /// dispatcher is emitted.
    ArityDispatch { root: MemberId },
}

/// The strategy kind shared by a whole name-group of one type. Propagated
/// down the inheritance chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GroupKind {
    /// Single member, plain name.
    Single,
    Dispatch,
    Mangled,
}

/// The disambiguator's result: a strategy for every member of every
/// overloaded group, plus the group kinds used for propagation.
#[derive(Debug, Default)]
pub struct OverloadPlan {
    strategies: FxHashMap<MemberId, DispatchStrategy>,
    group_kinds: FxHashMap<(TypeId, String), GroupKind>,
}

/// Partition a type's methods by declared name, in declaration order.
pub fn method_groups(program: &Program, ty: TypeId) -> IndexMap<String, Vec<MemberId>> {
    let mut groups: IndexMap<String, Vec<MemberId>> = IndexMap::new();
    for (id, member) in program.members_of(ty) {
        if member.is_method() {
            groups.entry(member.name.clone()).or_default().push(id);
        }
    }
    groups
}

impl OverloadPlan {
    /// Resolve strategies for the whole program. Deterministic: types are
    /// visited in declaration order (supertypes forced first), groups in
    /// declaration order, ties broken by signature serialization.
    pub fn process(
        program: &Program,
        facts: &GlobalFacts,
        reporter: &mut dyn ProblemReporter,
    ) -> OverloadPlan {
        let mut scanner = OverloadScanner {
            program,
            facts,
            reporter,
            processed: FxHashSet::default(),
            plan: OverloadPlan::default(),
        };
        for ty in program.type_ids() {
            scanner.resolve_type(ty);
        }
        scanner.plan
    }

    pub fn strategy(&self, id: MemberId) -> Option<&DispatchStrategy> {
        self.strategies.get(&id)
    }

    /// The name this member is invoked by and emitted under. Members of an
    /// arity-dispatch group keep their declared name.
    pub fn output_name(&self, program: &Program, id: MemberId) -> String {
        match self.strategies.get(&id) {
            Some(DispatchStrategy::Mangled(name)) => name.clone(),
            _ => program.member(id).name.clone(),
        }
    }

    /// True when `id` is the member a dispatcher is emitted at.
    pub fn is_dispatch_root(&self, id: MemberId) -> bool {
        matches!(
            self.strategies.get(&id),
            Some(DispatchStrategy::ArityDispatch { root }) if *root == id
        )
    }

    pub fn group_kind(&self, ty: TypeId, name: &str) -> Option<GroupKind> {
        self.group_kinds.get(&(ty, name.to_string())).copied()
    }

    /// The nearest strategy kind for `name` on the superclass chain of `ty`.
    pub fn inherited_group_kind(&self, program: &Program, ty: TypeId, name: &str) -> Option<GroupKind> {
        program
            .superclass_chain(ty)
            .find_map(|sup| self.group_kind(sup, name))
    }
}

struct OverloadScanner<'p, 'r> {
    program: &'p Program,
    facts: &'p GlobalFacts,
    reporter: &'r mut dyn ProblemReporter,
    processed: FxHashSet<TypeId>,
    plan: OverloadPlan,
}

impl OverloadScanner<'_, '_> {
    fn resolve_type(&mut self, ty: TypeId) {
        if !self.processed.insert(ty) {
            return;
        }
        if let Some(superclass) = self.program.type_decl(ty).superclass {
            self.resolve_type(superclass);
        }

        for (name, group) in method_groups(self.program, ty) {
            let inherited = self.plan.inherited_group_kind(self.program, ty, &name);
            let kind = self.decide_kind(&group, inherited);
            self.plan.group_kinds.insert((ty, name.clone()), kind);
            match kind {
                GroupKind::Single => {}
                GroupKind::Dispatch => {
                    let root = group[0];
                    for &member in &group {
                        self.plan
                            .strategies
                            .insert(member, DispatchStrategy::ArityDispatch { root });
                    }
                }
                GroupKind::Mangled => self.assign_mangled(&group),
            }
        }
    }

    /// Pick the group's strategy kind, honoring the inherited one.
    fn decide_kind(&mut self, group: &[MemberId], inherited: Option<GroupKind>) -> GroupKind {
        let dispatchable = self.arities_distinct(group) && self.all_bodies_present(group);
        match inherited {
            Some(GroupKind::Mangled) => GroupKind::Mangled,
            Some(GroupKind::Dispatch) => {
                if dispatchable {
                    GroupKind::Dispatch
                } else {
                    // The subtype broke the dispatch invariant the supertype
                    // established; overrides can no longer share an output
                    // identity with the methods they override.
                    self.report_ambiguity(
                        group[0],
                        "overloads are incompatible with the inherited dispatch strategy",
                    );
                    GroupKind::Mangled
                }
            }
            Some(GroupKind::Single) | None => {
                if group.len() == 1 {
                    // A lone method, or an override of a plain inherited one:
                    // the declared name stays.
                    GroupKind::Single
                } else if dispatchable {
                    GroupKind::Dispatch
                } else {
                    GroupKind::Mangled
                }
            }
        }
    }

    fn arities_distinct(&self, group: &[MemberId]) -> bool {
        let mut seen = FxHashSet::default();
        group
            .iter()
            .all(|&m| seen.insert(self.program.member(m).arity()))
    }

    fn all_bodies_present(&self, group: &[MemberId]) -> bool {
        group.iter().all(|&m| self.program.member(m).body().is_some())
    }

    /// Mangle every member of the group. Overrides reproduce the supertype's
    /// mangled name automatically because the name is a pure function of the
    /// erased signature. Identical erased signatures are ordered by their
    /// serialization and suffixed with a stable ordinal.
    fn assign_mangled(&mut self, group: &[MemberId]) {
        let mut used: FxHashMap<String, Vec<MemberId>> = FxHashMap::default();
        for &member in group {
            let name = self.mangled_name(member);
            used.entry(name).or_default().push(member);
        }
        for &member in group {
            let name = self.mangled_name(member);
            let clashing = &used[&name];
            let final_name = if clashing.len() == 1 {
                name
            } else {
                // Deterministic ordinal: order the colliding members by full
                // signature serialization, then by declaration order.
                let mut ordered: Vec<MemberId> = clashing.clone();
                ordered.sort_by_key(|&m| {
                    (
                        ovid_model::signature::erased_signature(self.program, m),
                        m,
                    )
                });
                let ordinal = ordered.iter().position(|&m| m == member).unwrap_or(0);
                if ordinal == 0 {
                    name
                } else {
                    self.report_ambiguity(
                        member,
                        "overloads have identical erased signatures and cannot be distinguished at call sites",
                    );
                    format!("{name}${ordinal}")
                }
            };
            self.plan
                .strategies
                .insert(member, DispatchStrategy::Mangled(final_name));
        }
    }

    /// `name$erasedParam$erasedParam`, dots flattened. The erasure of a
    /// wildcard-bounded parameter comes from the global registry so every
    /// use site agrees.
    fn mangled_name(&self, id: MemberId) -> String {
        let member = self.program.member(id);
        let mut name = member.name.clone();
        name.push('$');
        let parts: Vec<String> = member
            .params()
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let erased = match self.facts.wildcard_erasure(id, i) {
                    Some(e) => e.to_string(),
                    None => p.ty.erased_name(self.program),
                };
                erased.replace('.', "_")
            })
            .collect();
        name.push_str(&parts.join("$"));
        name
    }

    fn report_ambiguity(&mut self, member: MemberId, message: &str) {
        let m: &Member = self.program.member(member);
        let unit = self.program.unit(self.program.type_decl(m.owner).unit);
        self.reporter.report(Problem::new(
            ProblemKind::AmbiguousOverload,
            Some(SourcePosition::new(unit.file_name.clone(), m.pos)),
            format!("'{}': {}", m.name, message),
        ));
    }
}
