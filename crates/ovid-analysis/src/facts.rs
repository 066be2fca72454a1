//! Global facts collected in a single pre-pass over the whole program.
//!
//! This pass only records; validation is deferred to later stages. The
//! resulting tables are immutable and shared by reference with the
//! disambiguator and the printer.

use ovid_common::TranspileOptions;
use ovid_model::{Member, MemberId, Program, TypeId, TypeKind, WildcardKind};
use rustc_hash::{FxHashMap, FxHashSet};

/// Prefix applied to a field whose name clashes with a method of the same
/// type; the target language cannot host both under one identifier.
pub const FIELD_METHOD_CLASH_PREFIX: &str = "__";

/// One wildcard-bounded parameter use site of a generic method.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WildcardUse {
    pub param_index: usize,
    pub kind: WildcardKind,
    /// The erased name every use of this wildcard resolves to.
    pub erasure: String,
}

/// Cross-cutting facts needed before any code is emitted.
#[derive(Debug, Default)]
pub struct GlobalFacts {
    field_name_mappings: FxHashMap<MemberId, String>,
    static_initializer_counts: FxHashMap<TypeId, u32>,
    default_methods: FxHashMap<TypeId, Vec<MemberId>>,
    lazy_static_fields: FxHashSet<MemberId>,
    wildcards: FxHashMap<MemberId, Vec<WildcardUse>>,
}

impl GlobalFacts {
    /// Run the collection pass over every unit of the program.
    pub fn collect(program: &Program, options: &TranspileOptions) -> GlobalFacts {
        let mut facts = GlobalFacts::default();
        let mut lazy_candidates: Vec<MemberId> = Vec::new();

        for ty in program.type_ids() {
            let decl = program.type_decl(ty);
            for (member_id, member) in program.members_of(ty) {
                if member.is_field() {
                    if program.find_method(ty, &member.name).is_some() {
                        facts.field_name_mappings.insert(
                            member_id,
                            format!("{FIELD_METHOD_CLASH_PREFIX}{}", member.name),
                        );
                    }
                    if options.support_static_lazy_initialization
                        && member.is_static()
                        && !(member.is_final() && is_literal_init(program, member))
                    {
                        lazy_candidates.push(member_id);
                    }
                } else if member.is_static_block() {
                    *facts.static_initializer_counts.entry(ty).or_insert(0) += 1;
                } else if member.is_method() {
                    if decl.kind == TypeKind::Interface && member.is_default_method() {
                        facts.default_methods.entry(ty).or_default().push(member_id);
                    }
                    if !options.ignore_wildcard_bounds {
                        facts.register_wildcards(program, member_id, member);
                    }
                }
            }
        }

        // A candidate is confirmed only once the total static-initializer
        // count of its class is known: a literal initializer never needs a
        // lazy wrapper, and a field without any initializer only does when
        // a static block may write it.
        for candidate in lazy_candidates {
            let member = program.member(candidate);
            let count = facts.static_initializer_count(member.owner);
            let init_is_literal = is_literal_init(program, member);
            if (count == 0 && member.field_initializer().is_none()) || init_is_literal {
                continue;
            }
            facts.lazy_static_fields.insert(candidate);
        }

        facts
    }

    fn register_wildcards(&mut self, program: &Program, id: MemberId, member: &Member) {
        for (index, param) in member.params().iter().enumerate() {
            if let Some((kind, _bound)) = param.ty.find_wildcard() {
                self.wildcards.entry(id).or_default().push(WildcardUse {
                    param_index: index,
                    kind: *kind,
                    erasure: param.ty.erased_name(program),
                });
            }
        }
    }

    /// The name a field is emitted under: the clash-resolved mapping when
    /// one exists, the declared name otherwise.
    pub fn field_output_name<'a>(&'a self, member: &'a Member, id: MemberId) -> &'a str {
        self.field_name_mappings
            .get(&id)
            .map(String::as_str)
            .unwrap_or(&member.name)
    }

    pub fn has_field_mapping(&self, id: MemberId) -> bool {
        self.field_name_mappings.contains_key(&id)
    }

    pub fn static_initializer_count(&self, ty: TypeId) -> u32 {
        self.static_initializer_counts.get(&ty).copied().unwrap_or(0)
    }

    pub fn default_methods_of(&self, ty: TypeId) -> &[MemberId] {
        self.default_methods.get(&ty).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_lazy_static(&self, id: MemberId) -> bool {
        self.lazy_static_fields.contains(&id)
    }

    pub fn lazy_static_count(&self) -> usize {
        self.lazy_static_fields.len()
    }

    pub fn wildcards_of(&self, id: MemberId) -> &[WildcardUse] {
        self.wildcards.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The registered erasure for a wildcard-bounded parameter, if the
    /// collector saw one at this position.
    pub fn wildcard_erasure(&self, id: MemberId, param_index: usize) -> Option<&str> {
        self.wildcards_of(id)
            .iter()
            .find(|w| w.param_index == param_index)
            .map(|w| w.erasure.as_str())
    }
}

fn is_literal_init(program: &Program, member: &Member) -> bool {
    member
        .field_initializer()
        .is_some_and(|init| program.expr(init).is_literal())
}
