//! Expression and statement emission.

use super::{EmitResult, Printer, UnitAbort};
use ovid_model::{ExprId, ExprKind, Literal, MemberId};

impl Printer<'_, '_> {
    /// Emit a method or initializer body: a block's statements are emitted
    /// directly (the surrounding braces belong to the declaration), any
    /// other node is a single statement.
    pub(crate) fn emit_body(&mut self, body: ExprId) -> EmitResult {
        if let ExprKind::Block(stmts) = &self.program.expr(body).kind {
            let stmts = stmts.clone();
            for stmt in stmts {
                self.emit_statement(stmt)?;
            }
            return Ok(());
        }
        self.emit_statement(body)
    }

    pub(crate) fn emit_statement(&mut self, id: ExprId) -> EmitResult {
        let is_block = matches!(self.program.expr(id).kind, ExprKind::Block(_));
        self.writer.print_indent();
        self.emit_expr(id)?;
        if !is_block {
            self.writer.write(";");
        }
        self.writer.write_line();
        Ok(())
    }

    /// Emit one expression node: enter (line alignment + source map entry),
    /// print, exit.
    pub(crate) fn emit_expr(&mut self, id: ExprId) -> EmitResult {
        let pos = self.program.expr(id).pos;
        self.enter(pos);
        let result = self.emit_expr_inner(id);
        self.exit();
        result
    }

    fn emit_expr_inner(&mut self, id: ExprId) -> EmitResult {
        let kind = self.program.expr(id).kind.clone();
        match kind {
            ExprKind::Literal(lit) => {
                let text = literal_text(&lit);
                self.writer.write(&text);
                Ok(())
            }
            ExprKind::LocalRef(name) => {
                self.writer.write(&name);
                Ok(())
            }
            ExprKind::This => {
                self.writer.write("this");
                Ok(())
            }
            ExprKind::TypeLiteral(ty) => {
                let name = self.program.target_qualified_name(ty);
                self.writer.write(&name);
                Ok(())
            }
            ExprKind::FieldRead { receiver, field } => {
                self.emit_field_access(receiver, field, false)
            }
            ExprKind::Call {
                receiver,
                method,
                args,
            } => {
                let member = self.program.member(method);
                let name = self.plan.output_name(self.program, method);
                if member.is_static() {
                    let owner = self.program.target_qualified_name(member.owner);
                    self.writer.write(&format!("{owner}.{name}("));
                } else {
                    match receiver {
                        Some(r) => self.emit_expr(r)?,
                        None => self.writer.write("this"),
                    }
                    self.writer.write(&format!(".{name}("));
                }
                self.emit_arg_list(&args)?;
                self.writer.write(")");
                Ok(())
            }
            ExprKind::New { ty, args } => {
                let name = self.program.target_qualified_name(ty);
                self.writer.write(&format!("new {name}("));
                self.emit_arg_list(&args)?;
                self.writer.write(")");
                Ok(())
            }
            ExprKind::Binary { op, lhs, rhs } => {
                self.emit_expr(lhs)?;
                self.writer.write(&format!(" {} ", op.as_str()));
                self.emit_expr(rhs)
            }
            ExprKind::Assign { target, value } => {
                // A write to a lazy static goes to the backing slot, never
                // through the accessor.
                if let ExprKind::FieldRead { receiver, field } =
                    self.program.expr(target).kind.clone()
                {
                    let target_pos = self.program.expr(target).pos;
                    self.enter(target_pos);
                    let result = self.emit_field_access(receiver, field, true);
                    self.exit();
                    result?;
                } else {
                    self.emit_expr(target)?;
                }
                self.writer.write(" = ");
                self.emit_expr(value)
            }
            ExprKind::Return(value) => {
                self.writer.write("return");
                if let Some(v) = value {
                    self.writer.space();
                    self.emit_expr(v)?;
                }
                Ok(())
            }
            ExprKind::Local { name, init } => {
                self.writer.write(&format!("var {name}"));
                if let Some(init) = init {
                    self.writer.write(" = ");
                    self.emit_expr(init)?;
                }
                Ok(())
            }
            ExprKind::Block(stmts) => {
                self.writer.write("{");
                self.writer.write_line();
                self.writer.increase_indent();
                for stmt in stmts {
                    self.emit_statement(stmt)?;
                }
                self.writer.decrease_indent();
                self.writer.print_indent();
                self.writer.write("}");
                Ok(())
            }
            ExprKind::Unresolved { name } => {
                let pos = self.program.expr(id).pos;
                self.report_unresolved(&name, pos);
                Err(UnitAbort)
            }
        }
    }

    /// Member access. Reads of a lazy static go through the `_$LI$`
    /// accessor; writes (`lvalue`) and non-lazy statics use the plain slot.
    pub(crate) fn emit_field_access(
        &mut self,
        receiver: Option<ExprId>,
        field: MemberId,
        lvalue: bool,
    ) -> EmitResult {
        let member = self.program.member(field);
        let name = self.facts.field_output_name(member, field).to_string();
        if member.is_static() {
            let owner = self.program.target_qualified_name(member.owner);
            if !lvalue && self.facts.is_lazy_static(field) {
                self.writer.write(&format!("{owner}.{name}_$LI$()"));
            } else {
                self.writer.write(&format!("{owner}.{name}"));
            }
            return Ok(());
        }
        match receiver {
            Some(r) => self.emit_expr(r)?,
            None => self.writer.write("this"),
        }
        self.writer.write(&format!(".{name}"));
        Ok(())
    }

    // =========================================================================
    // Argument lists
    // =========================================================================

    /// Print a comma-separated argument list. When line preservation is off
    /// the inline layout is speculative: if the line grows past the width
    /// limit the attempt is rolled back and the arguments re-emitted one
    /// per line.
    pub(crate) fn emit_arg_list(&mut self, args: &[ExprId]) -> EmitResult {
        if args.is_empty() {
            return Ok(());
        }
        if self.options.preserve_source_line_numbers || args.len() == 1 {
            return self.emit_args_inline(args);
        }
        let args_vec = args.to_vec();
        let limit = self.options.max_line_width;
        let committed = self.speculate(|p| {
            p.emit_args_inline(&args_vec)?;
            Ok(p.writer.current_column() <= limit)
        })?;
        if !committed {
            self.emit_args_wrapped(&args_vec)?;
        }
        Ok(())
    }

    fn emit_args_inline(&mut self, args: &[ExprId]) -> EmitResult {
        for (i, &arg) in args.iter().enumerate() {
            if i > 0 {
                self.writer.write(", ");
            }
            self.emit_expr(arg)?;
        }
        Ok(())
    }

    fn emit_args_wrapped(&mut self, args: &[ExprId]) -> EmitResult {
        self.writer.newline();
        self.writer.increase_indent();
        for (i, &arg) in args.iter().enumerate() {
            self.writer.print_indent();
            self.emit_expr(arg)?;
            if i + 1 < args.len() {
                self.writer.write(",");
            }
            self.writer.newline();
        }
        self.writer.decrease_indent();
        self.writer.print_indent();
        Ok(())
    }
}

fn literal_text(lit: &Literal) -> String {
    match lit {
        Literal::Null => "null".to_string(),
        Literal::Bool(b) => b.to_string(),
        Literal::Int(i) => i.to_string(),
        Literal::Double(d) => d.to_string(),
        Literal::Str(s) => format!("\"{}\"", escape_string(s)),
    }
}

fn escape_string(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
