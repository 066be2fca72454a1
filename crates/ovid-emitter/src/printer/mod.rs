//! Speculative tree printer.
//!
//! Walks one resolved unit node-by-node and appends target-language text to
//! its own writer. Three mechanisms live here, shared by the declaration and
//! expression emission in the submodules:
//!
//! - **Node entry/exit**: every node entry optionally adjusts emitted blank
//!   lines so the output line matches the node's source line, pushes the
//!   current output position onto the position stack, and appends one
//!   source map entry. Entries are appended in source traversal order.
//! - **Speculation**: an emission closure can be run transactionally; when
//!   it abandons, the buffer, line, column, position stack and source map
//!   are restored to the checkpoint and the caller emits a fallback. This
//!   is an explicit checkpoint/restore over the writer, not exception
//!   unwinding.
//! - **Unit abort**: a resolution gap is fatal to the unit being printed and
//!   to nothing else; it propagates as [`UnitAbort`] to the top-level caller
//!   without ever throwing past it.
//!
//! The printer mutates only its own writer, stack and map — the shared
//! facts/overload tables are read-only.

mod declarations;
mod expressions;

use crate::source_writer::SourceWriter;
use ovid_analysis::{GlobalFacts, OverloadPlan};
use ovid_common::{
    Position, Problem, ProblemKind, ProblemReporter, SourceMap, SourcePosition, TranspileOptions,
};
use ovid_model::{Program, UnitId};

/// Marker for a condition fatal to the current unit's emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitAbort;

pub(crate) type EmitResult = Result<(), UnitAbort>;

pub struct Printer<'p, 'r> {
    pub(crate) program: &'p Program,
    pub(crate) unit: UnitId,
    pub(crate) facts: &'p GlobalFacts,
    pub(crate) plan: &'p OverloadPlan,
    pub(crate) options: &'p TranspileOptions,
    pub(crate) reporter: &'r mut dyn ProblemReporter,
    pub(crate) writer: SourceWriter,
    position_stack: Vec<Position>,
    pub source_map: SourceMap,
}

impl<'p, 'r> Printer<'p, 'r> {
    pub fn new(
        program: &'p Program,
        unit: UnitId,
        facts: &'p GlobalFacts,
        plan: &'p OverloadPlan,
        options: &'p TranspileOptions,
        reporter: &'r mut dyn ProblemReporter,
    ) -> Self {
        Self {
            program,
            unit,
            facts,
            plan,
            options,
            reporter,
            writer: SourceWriter::new(options.preserve_source_line_numbers),
            position_stack: Vec::new(),
            source_map: SourceMap::new(),
        }
    }

    /// Print the whole unit. On success the buffer holds syntactically
    /// complete target-language text; on [`UnitAbort`] the unit's output
    /// must be discarded (the problem has already been reported).
    pub fn print_unit(&mut self) -> EmitResult {
        let unit = self.program.unit(self.unit);
        let segments = self.namespace_segments();
        let types = unit.types.clone();

        self.open_namespaces(&segments);
        for ty in types {
            self.emit_type(ty)?;
        }
        self.close_namespaces(&segments);

        if !self.writer.is_empty() && self.writer.last_char() != Some('\n') {
            self.writer.newline();
        }
        Ok(())
    }

    pub fn output(&self) -> &str {
        self.writer.output()
    }

    pub fn writer(&self) -> &SourceWriter {
        &self.writer
    }

    /// Append text to the output (no newlines). Custom emission strategies
    /// layered on top of the printer go through this and
    /// [`write_line`](Self::write_line) so line/column accounting stays
    /// exact.
    pub fn write(&mut self, text: &str) {
        self.writer.write(text);
    }

    /// Append a logical line break (a space in line-preserving mode).
    pub fn write_line(&mut self) {
        self.writer.write_line();
    }

    /// Append a hard newline.
    pub fn new_line(&mut self) {
        self.writer.newline();
    }

    /// Lines occupied by the finished output (the trailing newline added by
    /// [`print_unit`](Self::print_unit) is not a line of content).
    pub fn line_count(&self) -> u32 {
        self.writer.current_line().saturating_sub(1)
    }

    pub fn into_output(self) -> (String, SourceMap) {
        (self.writer.into_output(), self.source_map)
    }

    // =========================================================================
    // Node entry / exit
    // =========================================================================

    /// Enter a node at the given source position: align output lines when
    /// line preservation is on, push the begin position, record one source
    /// map entry.
    pub(crate) fn enter(&mut self, pos: Position) {
        if self.options.preserve_source_line_numbers {
            self.adjust_line(pos);
        }
        let output_pos = self.writer.position();
        self.position_stack.push(output_pos);
        self.source_map.add_entry(pos, output_pos);
    }

    pub(crate) fn exit(&mut self) {
        self.position_stack.pop();
    }

    fn adjust_line(&mut self, pos: Position) {
        let target = pos.line;
        while self.writer.current_line() < target {
            self.writer.newline();
        }
        while self.writer.current_line() > target
            && self.writer.current_line() > 1
            && self.writer.last_char() == Some('\n')
        {
            self.writer.trim_trailing_newline();
        }
        if self.writer.current_line() != target {
            let file = self.program.unit(self.unit).file_name.clone();
            self.reporter.report(Problem::new(
                ProblemKind::LineAlignment,
                Some(SourcePosition::new(file, pos)),
                format!(
                    "cannot align output line {} with source line {}",
                    self.writer.current_line(),
                    target
                ),
            ));
        }
    }

    // =========================================================================
    // Speculation
    // =========================================================================

    /// Run `f` transactionally. `Ok(true)` commits what `f` emitted;
    /// `Ok(false)` rolls the writer, position stack and source map back to
    /// the checkpoint so the caller can emit a fallback. A unit abort
    /// propagates unchanged — its output is discarded wholesale anyway.
    pub fn speculate<F>(&mut self, f: F) -> Result<bool, UnitAbort>
    where
        F: FnOnce(&mut Self) -> Result<bool, UnitAbort>,
    {
        let checkpoint = self.writer.position();
        let map_len = self.source_map.len();
        let stack_len = self.position_stack.len();
        if f(self)? {
            return Ok(true);
        }
        self.writer.truncate_to(&checkpoint);
        self.source_map.truncate(map_len);
        self.position_stack.truncate(stack_len);
        Ok(false)
    }

    // =========================================================================
    // Namespace wrapping
    // =========================================================================

    /// Target namespace segments of this unit.
    fn namespace_segments(&self) -> Vec<String> {
        self.program
            .unit(self.unit)
            .target_segments()
            .map(str::to_string)
            .collect()
    }

    fn open_namespaces(&mut self, segments: &[String]) {
        for (depth, segment) in segments.iter().enumerate() {
            if depth == 0 {
                self.writer.write(&format!("var {segment};"));
                self.writer.write_line();
            }
            self.writer.print_indent();
            self.writer.write(&format!("(function ({segment}) {{"));
            self.writer.write_line();
            self.writer.increase_indent();
            if let Some(next) = segments.get(depth + 1) {
                self.writer.print_indent();
                self.writer.write(&format!("var {next};"));
                self.writer.write_line();
            }
        }
    }

    fn close_namespaces(&mut self, segments: &[String]) {
        for depth in (0..segments.len()).rev() {
            let segment = &segments[depth];
            self.writer.decrease_indent();
            self.writer.print_indent();
            if depth == 0 {
                self.writer
                    .write(&format!("}})({segment} || ({segment} = {{}}));"));
            } else {
                let parent = &segments[depth - 1];
                self.writer.write(&format!(
                    "}})({segment} = {parent}.{segment} || ({parent}.{segment} = {{}}));"
                ));
            }
            self.writer.write_line();
        }
    }

    /// The alias generated code inside the wrappers exports through, if any.
    pub(crate) fn namespace_alias(&self) -> Option<String> {
        self.namespace_segments().last().cloned()
    }

    // =========================================================================
    // Problem reporting
    // =========================================================================

    pub(crate) fn report_unresolved(&mut self, name: &str, pos: Position) {
        let file = self.program.unit(self.unit).file_name.clone();
        self.reporter.report(Problem::new(
            ProblemKind::UnresolvedSymbol,
            Some(SourcePosition::new(file, pos)),
            format!("unresolved symbol '{name}'; the unit cannot be emitted"),
        ));
    }
}
