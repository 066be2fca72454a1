//! Transpilation options shared by every stage of the pipeline.

use serde::Serialize;

/// The module system of the generated output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum ModuleKind {
    /// Global output: every unit shares one global scope. Bundling is only
    /// meaningful in this mode.
    #[default]
    None,
    CommonJs,
    EsNext,
}

impl ModuleKind {
    /// True when each unit is an independently-loaded module, in which case
    /// the host module system owns initialization ordering.
    pub fn uses_modules(self) -> bool {
        !matches!(self, ModuleKind::None)
    }
}

/// Options controlling a single transpilation run.
#[derive(Clone, Debug)]
pub struct TranspileOptions {
    pub module_kind: ModuleKind,
    /// Concatenate all units into one dependency-ordered output file.
    pub bundle: bool,
    /// Make emitted line numbers track the original source line numbers.
    pub preserve_source_line_numbers: bool,
    /// Emulate deferred static-field initialization in the target runtime.
    pub support_static_lazy_initialization: bool,
    /// Skip wildcard-bound registration entirely.
    pub ignore_wildcard_bounds: bool,
    /// In bundle mode, additionally produce a declaration-only bundle.
    pub generate_definitions: bool,
    /// Write a JSON source map next to each produced file.
    pub emit_source_maps: bool,
    /// Soft column limit used by the printer's layout fallback when line
    /// preservation is off.
    pub max_line_width: u32,
}

impl Default for TranspileOptions {
    fn default() -> Self {
        Self {
            module_kind: ModuleKind::None,
            bundle: false,
            preserve_source_line_numbers: true,
            support_static_lazy_initialization: true,
            ignore_wildcard_bounds: false,
            generate_definitions: false,
            emit_source_maps: false,
            max_line_width: 100,
        }
    }
}

impl TranspileOptions {
    pub fn uses_modules(&self) -> bool {
        self.module_kind.uses_modules()
    }
}
