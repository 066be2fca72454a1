//! Declaration emission: classes, interfaces, members.
//!
//! Classes lower to the constructor-function IIFE shape, methods land on
//! `prototype`, statics become assignments after the body. Inheritance goes
//! through the `__extends` runtime helper; interface identity tracking and
//! the lazy-static runtime are likewise external contracts — this module
//! only emits the call sites.

use super::{EmitResult, Printer};
use ovid_analysis::DispatchStrategy;
use ovid_model::{MemberId, TypeDecl, TypeId, TypeKind};

impl Printer<'_, '_> {
    pub(crate) fn emit_type(&mut self, ty: TypeId) -> EmitResult {
        match self.program.type_decl(ty).kind {
            TypeKind::Class => self.emit_class(ty),
            TypeKind::Interface => self.emit_interface(ty),
        }
    }

    // =========================================================================
    // Classes
    // =========================================================================

    fn emit_class(&mut self, ty: TypeId) -> EmitResult {
        let decl = self.program.type_decl(ty).clone();
        let name = decl.name.clone();
        self.enter(decl.pos);

        self.writer.print_indent();
        if decl.superclass.is_some() {
            self.writer.write(&format!("var {name} = (function (_super) {{"));
        } else {
            self.writer.write(&format!("var {name} = (function () {{"));
        }
        self.writer.write_line();
        self.writer.increase_indent();
        if decl.superclass.is_some() {
            self.writer.print_indent();
            self.writer.write(&format!("__extends({name}, _super);"));
            self.writer.write_line();
        }

        self.emit_constructor(&decl)?;
        self.emit_members(&decl)?;
        self.emit_default_method_copies(ty, &decl)?;

        self.writer.print_indent();
        self.writer.write(&format!("return {name};"));
        self.writer.write_line();
        self.writer.decrease_indent();
        self.writer.print_indent();
        match decl.superclass {
            Some(sup) => {
                let sup_name = self.program.target_qualified_name(sup);
                self.writer.write(&format!("}}({sup_name}));"));
            }
            None => self.writer.write("}());"),
        }
        self.writer.write_line();
        self.emit_namespace_export(&name);
        self.exit();
        Ok(())
    }

    /// The emitted constructor is always synthesized at the top of the
    /// class body: instance field initializers first (at their own source
    /// lines), then the explicit constructor body if the source declares
    /// one. A superclass is forwarded all arguments up front; the front end
    /// already validated the source-side super call.
    fn emit_constructor(&mut self, decl: &TypeDecl) -> EmitResult {
        let program = self.program;
        let name = decl.name.clone();
        let ctors: Vec<MemberId> = decl
            .members
            .iter()
            .copied()
            .filter(|&m| {
                let member = program.member(m);
                member.is_method() && member.name == name
            })
            .collect();

        let params = if ctors.len() == 1 {
            param_names(program.member(ctors[0]).params())
        } else {
            // Overloaded constructors dispatch on arity; the function
            // signature stays empty and branches bind from `arguments`.
            String::new()
        };

        self.writer.print_indent();
        self.writer.write(&format!("function {name}({params}) {{"));
        self.writer.write_line();
        self.writer.increase_indent();

        if decl.superclass.is_some() {
            self.writer.print_indent();
            self.writer.write("_super.apply(this, arguments);");
            self.writer.write_line();
        }

        // Instance field initializers, in declaration order.
        for &id in &decl.members {
            let member = program.member(id);
            if !member.is_field() || member.is_static() {
                continue;
            }
            let Some(init) = member.field_initializer() else {
                continue;
            };
            let field_name = self.facts.field_output_name(member, id).to_string();
            self.enter(member.pos);
            self.writer.print_indent();
            self.writer.write(&format!("this.{field_name} = "));
            self.emit_expr(init)?;
            self.writer.write(";");
            self.writer.write_line();
            self.exit();
        }

        match ctors.len() {
            0 => {}
            1 => {
                let ctor = program.member(ctors[0]);
                if let Some(body) = ctor.body() {
                    self.enter(ctor.pos);
                    self.emit_body(body)?;
                    self.exit();
                }
            }
            _ => self.emit_dispatch_branches(&ctors, None)?,
        }

        self.writer.decrease_indent();
        self.writer.print_indent();
        self.writer.write("}");
        self.writer.write_line();
        Ok(())
    }

    /// Members other than instance fields and constructors, in declaration
    /// order so output lines track source lines.
    fn emit_members(&mut self, decl: &TypeDecl) -> EmitResult {
        let program = self.program;
        let class_name = decl.name.clone();
        for &id in &decl.members {
            let member = program.member(id);
            if member.is_field() {
                if member.is_static() {
                    self.emit_static_field(&class_name, id)?;
                }
                continue;
            }
            if member.is_static_block() {
                self.emit_static_block(id)?;
                continue;
            }
            if member.name == class_name {
                continue; // constructors already emitted
            }
            match self.plan.strategy(id).cloned() {
                Some(DispatchStrategy::ArityDispatch { root }) => {
                    if root == id {
                        self.emit_dispatcher(decl, id)?;
                    }
                }
                Some(DispatchStrategy::Mangled(mangled)) => {
                    self.emit_plain_method(&class_name, id, &mangled)?;
                }
                None => {
                    let name = member.name.clone();
                    self.emit_plain_method(&class_name, id, &name)?;
                }
            }
        }
        Ok(())
    }

    fn emit_plain_method(&mut self, class_name: &str, id: MemberId, out_name: &str) -> EmitResult {
        let member = self.program.member(id);
        // Abstract and native methods have no output of their own.
        let Some(body) = member.body() else {
            return Ok(());
        };
        let receiver = if member.is_static() {
            class_name.to_string()
        } else {
            format!("{class_name}.prototype")
        };
        let params = param_names(member.params());
        let pos = member.pos;

        self.enter(pos);
        self.writer.print_indent();
        self.writer
            .write(&format!("{receiver}.{out_name} = function ({params}) {{"));
        self.writer.write_line();
        self.writer.increase_indent();
        self.emit_body(body)?;
        self.writer.decrease_indent();
        self.writer.print_indent();
        self.writer.write("};");
        self.writer.write_line();
        self.exit();
        Ok(())
    }

    /// One function under the declared name, dispatching on argument count.
    /// Emitted at the first-declared overload; the remaining members of the
    /// group are folded into its branches.
    fn emit_dispatcher(&mut self, decl: &TypeDecl, root: MemberId) -> EmitResult {
        let program = self.program;
        let member = program.member(root);
        let name = member.name.clone();
        let is_static = member.is_static();
        let group: Vec<MemberId> = decl
            .members
            .iter()
            .copied()
            .filter(|&m| {
                let candidate = program.member(m);
                candidate.is_method() && candidate.name == name
            })
            .collect();

        let receiver = if is_static {
            decl.name.clone()
        } else {
            format!("{}.prototype", decl.name)
        };
        // A superclass carrying the same dispatch group handles arities this
        // type does not declare.
        let fall_through = (!is_static
            && decl.superclass.is_some()
            && self
                .plan
                .inherited_group_kind(program, program.member(root).owner, &name)
                .is_some())
        .then(|| name.clone());

        self.enter(member.pos);
        self.writer.print_indent();
        self.writer
            .write(&format!("{receiver}.{name} = function () {{"));
        self.writer.write_line();
        self.writer.increase_indent();
        self.emit_dispatch_branches(&group, fall_through.as_deref())?;
        self.writer.decrease_indent();
        self.writer.print_indent();
        self.writer.write("};");
        self.writer.write_line();
        self.exit();
        Ok(())
    }

    /// The `if (arguments.length === N)` chain shared by method and
    /// constructor dispatchers.
    pub(crate) fn emit_dispatch_branches(
        &mut self,
        group: &[MemberId],
        fall_through: Option<&str>,
    ) -> EmitResult {
        let program = self.program;
        for (index, &overload) in group.iter().enumerate() {
            let member = program.member(overload);
            let arity = member.params().len();
            let keyword = if index == 0 { "if" } else { "} else if" };
            self.enter(member.pos);
            self.writer.print_indent();
            self.writer
                .write(&format!("{keyword} (arguments.length === {arity}) {{"));
            self.writer.write_line();
            self.writer.increase_indent();
            for (param_index, param) in member.params().iter().enumerate() {
                self.writer.print_indent();
                self.writer
                    .write(&format!("var {} = arguments[{param_index}];", param.name));
                self.writer.write_line();
            }
            if let Some(body) = member.body() {
                self.emit_body(body)?;
            }
            self.writer.decrease_indent();
            self.exit();
        }
        self.writer.print_indent();
        if let Some(name) = fall_through {
            self.writer.write("} else {");
            self.writer.write_line();
            self.writer.increase_indent();
            self.writer.print_indent();
            self.writer
                .write(&format!("return _super.prototype.{name}.apply(this, arguments);"));
            self.writer.write_line();
            self.writer.decrease_indent();
            self.writer.print_indent();
            self.writer.write("}");
        } else {
            self.writer.write("}");
        }
        self.writer.write_line();
        Ok(())
    }

    /// A static field either initializes in place or, when the collector
    /// promoted it, behind the `_$LI$` lazy accessor the runtime convention
    /// expects. Reads elsewhere go through the accessor; the backing slot is
    /// the plain property.
    fn emit_static_field(&mut self, class_name: &str, id: MemberId) -> EmitResult {
        let member = self.program.member(id);
        let lazy = self.facts.is_lazy_static(id);
        let init = member.field_initializer();
        if !lazy && init.is_none() {
            return Ok(());
        }
        let field_name = self.facts.field_output_name(member, id).to_string();
        let pos = member.pos;

        self.enter(pos);
        self.writer.print_indent();
        if lazy {
            match init {
                Some(init) => {
                    self.writer.write(&format!(
                        "{class_name}.{field_name}_$LI$ = function () {{ if ({class_name}.{field_name} == null) {{ {class_name}.{field_name} = "
                    ));
                    self.emit_expr(init)?;
                    self.writer.write(&format!(
                        "; }} return {class_name}.{field_name}; }};"
                    ));
                }
                None => {
                    // Written by a static block; the accessor only reads.
                    self.writer.write(&format!(
                        "{class_name}.{field_name}_$LI$ = function () {{ return {class_name}.{field_name}; }};"
                    ));
                }
            }
        } else if let Some(init) = init {
            self.writer.write(&format!("{class_name}.{field_name} = "));
            self.emit_expr(init)?;
            self.writer.write(";");
        }
        self.writer.write_line();
        self.exit();
        Ok(())
    }

    fn emit_static_block(&mut self, id: MemberId) -> EmitResult {
        let member = self.program.member(id);
        let Some(body) = member.body() else {
            return Ok(());
        };
        let pos = member.pos;
        self.enter(pos);
        self.writer.print_indent();
        self.writer.write("(function () {");
        self.writer.write_line();
        self.writer.increase_indent();
        self.emit_body(body)?;
        self.writer.decrease_indent();
        self.writer.print_indent();
        self.writer.write("})();");
        self.writer.write_line();
        self.exit();
        Ok(())
    }

    /// Copy interface default bodies onto implementers that do not override
    /// them. The interface's `defaults` object is the single shared home of
    /// each body, so identity comparisons keep working.
    fn emit_default_method_copies(&mut self, ty: TypeId, decl: &TypeDecl) -> EmitResult {
        let program = self.program;
        let facts = self.facts;
        for &iface in &decl.interfaces {
            let iface_name = program.target_qualified_name(iface);
            for &dm in facts.default_methods_of(iface) {
                let default_method = program.member(dm);
                if program.find_method(ty, &default_method.name).is_some() {
                    continue;
                }
                self.writer.print_indent();
                self.writer.write(&format!(
                    "{}.prototype.{} = {}.defaults.{};",
                    decl.name, default_method.name, iface_name, default_method.name
                ));
                self.writer.write_line();
            }
        }
        Ok(())
    }

    // =========================================================================
    // Interfaces
    // =========================================================================

    /// Interfaces erase to a carrier object holding their default method
    /// bodies; abstract signatures produce no output. Runtime interface
    /// identity tracking is injected by the external support library.
    fn emit_interface(&mut self, ty: TypeId) -> EmitResult {
        let decl = self.program.type_decl(ty).clone();
        let name = decl.name.clone();
        self.enter(decl.pos);

        self.writer.print_indent();
        self.writer.write(&format!("var {name} = {{ defaults: {{}} }};"));
        self.writer.write_line();

        let defaults: Vec<MemberId> = self.facts.default_methods_of(ty).to_vec();
        for dm in defaults {
            let member = self.program.member(dm);
            let Some(body) = member.body() else {
                continue;
            };
            let method_name = member.name.clone();
            let params = param_names(member.params());
            let pos = member.pos;

            self.enter(pos);
            self.writer.print_indent();
            self.writer.write(&format!(
                "{name}.defaults.{method_name} = function ({params}) {{"
            ));
            self.writer.write_line();
            self.writer.increase_indent();
            self.emit_body(body)?;
            self.writer.decrease_indent();
            self.writer.print_indent();
            self.writer.write("};");
            self.writer.write_line();
            self.exit();
        }

        self.emit_namespace_export(&name);
        self.exit();
        Ok(())
    }

    fn emit_namespace_export(&mut self, name: &str) {
        if let Some(alias) = self.namespace_alias() {
            self.writer.print_indent();
            self.writer.write(&format!("{alias}.{name} = {name};"));
            self.writer.write_line();
        }
    }
}

fn param_names(params: &[ovid_model::Param]) -> String {
    params
        .iter()
        .map(|p| p.name.clone())
        .collect::<Vec<_>>()
        .join(", ")
}
