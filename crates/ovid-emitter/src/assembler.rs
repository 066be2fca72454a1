//! Per-file and bundle output assembly.
//!
//! Drives the pipeline: facts collection, overload planning, optional
//! dependency analysis, then one printer run per unit. In per-file mode
//! every unit becomes its own output file; in bundle mode units are
//! concatenated in topological order into a single file (plus an optional
//! declaration-only file), with each unit's source map shifted by the
//! cumulative output size. A unit whose input has resolution gaps is
//! withheld; a dependency cycle withholds the whole bundle.

use crate::printer::Printer;
use ovid_analysis::{GlobalFacts, OverloadPlan, StaticInitAnalysis};
use ovid_common::{
    ErrorCountReporter, Problem, ProblemKind, ProblemReporter, SourceMap, TranspileOptions,
};
use ovid_model::{Program, UnitId};
use std::path::Path;
use tracing::{debug, info, warn};

/// The (possibly shifted) source map of one unit inside one output file.
#[derive(Clone, Debug)]
pub struct UnitSourceMap {
    pub unit: UnitId,
    pub source_file: String,
    pub map: SourceMap,
}

/// One produced output file.
#[derive(Clone, Debug)]
pub struct EmittedFile {
    pub relative_path: String,
    pub code: String,
    pub maps: Vec<UnitSourceMap>,
}

/// Bundle-mode bookkeeping: the topological unit order and the permutation
/// mapping sorted position to original unit index (a bijection).
#[derive(Clone, Debug)]
pub struct BundleInfo {
    pub order: Vec<UnitId>,
    pub permutation: Vec<usize>,
}

#[derive(Debug, Default)]
pub struct TranspileResult {
    pub files: Vec<EmittedFile>,
    pub bundle: Option<BundleInfo>,
}

/// Run a whole translation: collect facts, disambiguate overloads, then
/// print and assemble. Problems go to `reporter`; the host process is never
/// terminated and unaffected units always produce output.
pub fn transpile(
    program: &Program,
    options: &TranspileOptions,
    reporter: &mut dyn ProblemReporter,
) -> TranspileResult {
    let mut counting = ErrorCountReporter::new(reporter);

    if options.bundle && options.uses_modules() {
        counting.report(Problem::new(
            ProblemKind::BundleWithModule,
            None,
            "bundles cannot be used with modules: each module is loaded independently",
        ));
        return TranspileResult::default();
    }

    let facts = GlobalFacts::collect(program, options);

    if options.bundle {
        generate_bundle(program, options, &facts, &mut counting)
    } else {
        let plan = OverloadPlan::process(program, &facts, &mut counting);
        generate_files(program, options, &facts, &plan, &mut counting)
    }
}

fn generate_files(
    program: &Program,
    options: &TranspileOptions,
    facts: &GlobalFacts,
    plan: &OverloadPlan,
    reporter: &mut dyn ProblemReporter,
) -> TranspileResult {
    let mut files = Vec::new();
    for (unit_id, unit) in program.units() {
        let mut printer = Printer::new(program, unit_id, facts, plan, options, &mut *reporter);
        if printer.print_unit().is_err() {
            warn!(file = %unit.file_name, "skipping unit with unresolved input");
            continue;
        }
        let (code, map) = printer.into_output();
        if code.trim().is_empty() {
            continue;
        }
        let extension = if unit.is_declaration_unit() { ".d.ts" } else { ".ts" };
        let mut path = unit.package.join("/");
        if !path.is_empty() {
            path.push('/');
        }
        path.push_str(&unit.simple_name);
        path.push_str(extension);
        info!(path = %path, "created output file");
        files.push(EmittedFile {
            relative_path: path,
            code,
            maps: vec![UnitSourceMap {
                unit: unit_id,
                source_file: unit.file_name.clone(),
                map,
            }],
        });
    }
    TranspileResult {
        files,
        bundle: None,
    }
}

fn generate_bundle(
    program: &Program,
    options: &TranspileOptions,
    facts: &GlobalFacts,
    reporter: &mut dyn ProblemReporter,
) -> TranspileResult {
    let analysis = StaticInitAnalysis::process(program, options);
    let mut cycle: Vec<UnitId> = Vec::new();
    let order = analysis.global.topological_sort(|unit| cycle.push(unit));

    if !cycle.is_empty() {
        let members: Vec<&str> = cycle
            .iter()
            .map(|&u| program.unit(u).file_name.as_str())
            .collect();
        reporter.report(Problem::new(
            ProblemKind::CycleInStaticInitializers,
            None,
            format!(
                "cycle detected in static initializer dependencies: {}",
                members.join(" -> ")
            ),
        ));
        return TranspileResult::default();
    }

    // The overload plan is computed over the same program regardless of
    // order; resolving it after the sort keeps the failure path cheap.
    let plan = OverloadPlan::process(program, facts, reporter);

    let permutation: Vec<usize> = order.iter().map(|u| u.0 as usize).collect();
    debug_assert!(
        {
            let mut check = permutation.clone();
            check.sort_unstable();
            check == (0..program.unit_count()).collect::<Vec<_>>()
        },
        "permutation must be a bijection over unit indices"
    );
    debug!(?permutation, "bundle permutation");

    let mut files = Vec::new();
    if let Some(file) =
        create_bundle(program, options, facts, &plan, reporter, &order, false)
    {
        files.push(file);
    }
    if options.generate_definitions
        && let Some(file) = create_bundle(program, options, facts, &plan, reporter, &order, true)
    {
        files.push(file);
    }

    TranspileResult {
        files,
        bundle: Some(BundleInfo { order, permutation }),
    }
}

/// Concatenate the selected units, in sorted order, into one output file.
/// `declarations` selects the declaration-only bundle.
fn create_bundle(
    program: &Program,
    options: &TranspileOptions,
    facts: &GlobalFacts,
    plan: &OverloadPlan,
    reporter: &mut dyn ProblemReporter,
    order: &[UnitId],
    declarations: bool,
) -> Option<EmittedFile> {
    let mut code = String::new();
    let mut maps = Vec::new();
    let mut line_count = 0u32;

    for &unit_id in order {
        let unit = program.unit(unit_id);
        if unit.is_declaration_unit() != declarations {
            continue;
        }
        let mut printer = Printer::new(program, unit_id, facts, plan, options, &mut *reporter);
        if printer.print_unit().is_err() {
            warn!(file = %unit.file_name, "omitting unit with unresolved input from bundle");
            continue;
        }
        let lines = printer.line_count();
        let (unit_code, mut map) = printer.into_output();
        if unit_code.trim().is_empty() {
            continue;
        }
        map.shift_output_positions(line_count, code.len() as u32);
        code.push_str(&unit_code);
        line_count += lines;
        maps.push(UnitSourceMap {
            unit: unit_id,
            source_file: unit.file_name.clone(),
            map,
        });
    }

    if code.trim().is_empty() {
        return None;
    }
    let name = if declarations { "bundle.d.ts" } else { "bundle.ts" };
    info!(name, "created bundle file");
    Some(EmittedFile {
        relative_path: name.to_string(),
        code,
        maps,
    })
}

/// Persist every produced file (and its source map, when requested) under
/// `out_dir`.
pub fn write_output(
    result: &TranspileResult,
    out_dir: &Path,
    options: &TranspileOptions,
) -> std::io::Result<()> {
    for file in &result.files {
        let path = out_dir.join(&file.relative_path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, &file.code)?;
        if options.emit_source_maps {
            let maps: Vec<serde_json::Value> = file
                .maps
                .iter()
                .map(|m| {
                    serde_json::json!({
                        "sourceFile": m.source_file,
                        "entries": m.map.entries(),
                    })
                })
                .collect();
            let payload = serde_json::json!({ "maps": maps });
            let text = serde_json::to_string_pretty(&payload).map_err(std::io::Error::other)?;
            let map_path = out_dir.join(format!("{}.map.json", file.relative_path));
            std::fs::write(map_path, text)?;
        }
    }
    Ok(())
}
