//! Static-initialization dependency analysis.
//!
//! Builds, per dependency domain, a directed graph of units whose static
//! state must be established in a particular order when everything is
//! concatenated into one output. A domain is the whole program in global
//! output, or one package when module output is enabled. Two passes: the
//! first registers types against their owning units and adds graph nodes,
//! the second derives edges from static field initializers, static blocks
//! and inheritance.
//!
//! Skipped entirely in one-file-per-unit mode — each unit is then loaded
//! independently and the host module system owns initialization order.

use crate::graph::DirectedGraph;
use crate::references::ReferenceGrabber;
use ovid_common::TranspileOptions;
use ovid_model::{Program, TypeId, UnitId};
use rustc_hash::FxHashMap;
use tracing::debug;

/// The analysis result: one graph per domain plus the type-to-unit index.
#[derive(Debug)]
pub struct StaticInitAnalysis {
    /// The whole-program graph when modules are disabled (empty otherwise).
    pub global: DirectedGraph<UnitId>,
    /// Per-package graphs when modules are enabled (empty otherwise).
    pub per_package: FxHashMap<String, DirectedGraph<UnitId>>,
    /// Maps every type declaration to the unit declaring it.
    pub types_to_units: FxHashMap<TypeId, UnitId>,
}

impl StaticInitAnalysis {
    /// Run both passes over the whole unit collection.
    pub fn process(program: &Program, options: &TranspileOptions) -> StaticInitAnalysis {
        let use_modules = options.uses_modules();
        let mut analysis = StaticInitAnalysis {
            global: DirectedGraph::new(),
            per_package: FxHashMap::default(),
            types_to_units: FxHashMap::default(),
        };

        // Pass 1: nodes and the type lookup table.
        for (unit_id, unit) in program.units() {
            analysis.graph_for(use_modules, unit.package_name()).add_node(unit_id);
            for &ty in &unit.types {
                analysis.types_to_units.insert(ty, unit_id);
            }
        }

        // Pass 2: edges.
        for (unit_id, unit) in program.units() {
            let package = unit.package_name();
            for &ty in &unit.types {
                let decl = program.type_decl(ty);

                // Base class state must be established first.
                if let Some(superclass) = decl.superclass {
                    analysis.add_dependency(program, use_modules, &package, unit_id, superclass, "inheritance");
                }

                for (_, member) in program.members_of(ty) {
                    let initializer = if member.is_static_block() {
                        member.body()
                    } else if member.is_field() && member.is_static() {
                        member.field_initializer()
                    } else {
                        None
                    };
                    let Some(init) = initializer else { continue };

                    let mut grabber = ReferenceGrabber::new(program);
                    grabber.scan(init);
                    for referenced in grabber.referenced_types {
                        analysis.add_dependency(
                            program,
                            use_modules,
                            &package,
                            unit_id,
                            referenced,
                            "static initializer",
                        );
                    }
                }
            }
        }

        analysis
    }

    fn graph_for(&mut self, use_modules: bool, package: String) -> &mut DirectedGraph<UnitId> {
        if use_modules {
            self.per_package.entry(package).or_default()
        } else {
            &mut self.global
        }
    }

    /// Add an edge from the unit declaring `referenced` to `from_unit`, when
    /// the two units differ and belong to the same domain.
    fn add_dependency(
        &mut self,
        program: &Program,
        use_modules: bool,
        package: &str,
        from_unit: UnitId,
        referenced: TypeId,
        why: &str,
    ) {
        let Some(&target) = self.types_to_units.get(&referenced) else {
            return;
        };
        if target == from_unit {
            return;
        }
        if use_modules && program.unit(target).package_name() != package {
            return;
        }
        let graph = self.graph_for(use_modules, package.to_string());
        if graph.contains(target) {
            debug!(
                from = %program.unit(from_unit).file_name,
                to = %program.unit(target).file_name,
                why,
                "adding dependency edge"
            );
            graph.add_edge(target, from_unit);
        }
    }
}
