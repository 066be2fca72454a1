//! Tests for the speculative tree printer.

use ovid_analysis::{GlobalFacts, OverloadPlan};
use ovid_common::{CollectingReporter, ProblemKind, TranspileOptions};
use ovid_emitter::Printer;
use ovid_model::{BinaryOp, Modifiers, Param, Program, ProgramBuilder, TypeRef, UnitId};

fn no_preserve() -> TranspileOptions {
    TranspileOptions {
        preserve_source_line_numbers: false,
        ..TranspileOptions::default()
    }
}

/// Print the first unit of the program and return (output, reporter).
fn print_unit(program: &Program, options: &TranspileOptions) -> (String, CollectingReporter) {
    print_nth_unit(program, UnitId(0), options)
}

fn print_nth_unit(
    program: &Program,
    unit: UnitId,
    options: &TranspileOptions,
) -> (String, CollectingReporter) {
    let facts = GlobalFacts::collect(program, options);
    let mut reporter = CollectingReporter::new();
    let plan = OverloadPlan::process(program, &facts, &mut reporter);
    let mut printer = Printer::new(program, unit, &facts, &plan, options, &mut reporter);
    let output = match printer.print_unit() {
        Ok(()) => printer.output().to_string(),
        Err(_) => String::new(),
    };
    (output, reporter)
}

// =============================================================================
// Class Emission
// =============================================================================

#[test]
fn test_class_emission_shape() {
    let mut b = ProgramBuilder::new();
    let unit = b.add_unit("Foo.x", &[]);
    let foo = b.add_class(unit, "Foo", 1);
    let init = b.lit_int(42, 2);
    b.add_field(foo, "x", TypeRef::int(), Modifiers::empty(), Some(init), 2);
    let n = b.local_ref("n", 4);
    let one = b.lit_int(1, 4);
    let sum = b.binary(BinaryOp::Add, n, one, 4);
    let ret = b.ret(Some(sum), 4);
    let body = b.block(vec![ret], 3);
    b.add_method(
        foo,
        "bar",
        vec![Param::new("n", TypeRef::int())],
        TypeRef::int(),
        Modifiers::empty(),
        Some(body),
        3,
    );
    let lit = b.lit_int(7, 5);
    b.add_field(
        foo,
        "LIMIT",
        TypeRef::int(),
        Modifiers::STATIC | Modifiers::FINAL,
        Some(lit),
        5,
    );
    let program = b.finish();

    let (output, reporter) = print_unit(&program, &no_preserve());
    assert!(reporter.problems.is_empty(), "problems: {:?}", reporter.problems);
    let expected = "\
var Foo = (function () {
    function Foo() {
        this.x = 42;
    }
    Foo.prototype.bar = function (n) {
        return n + 1;
    };
    Foo.LIMIT = 7;
    return Foo;
}());
";
    assert_eq!(output, expected);
}

#[test]
fn test_subclass_goes_through_extends_helper() {
    let mut b = ProgramBuilder::new();
    let unit = b.add_unit("T.x", &[]);
    let base = b.add_class(unit, "Base", 1);
    let sub = b.add_class(unit, "Sub", 3);
    b.set_superclass(sub, base);
    let program = b.finish();

    let (output, _) = print_unit(&program, &no_preserve());
    assert!(output.contains("var Sub = (function (_super) {"), "Output: {output}");
    assert!(output.contains("__extends(Sub, _super);"), "Output: {output}");
    assert!(output.contains("_super.apply(this, arguments);"), "Output: {output}");
    assert!(output.contains("}(Base));"), "Output: {output}");
}

#[test]
fn test_namespace_wrapping_and_export() {
    let mut b = ProgramBuilder::new();
    let unit = b.add_unit("a/b/Foo.x", &["a", "b"]);
    b.add_class(unit, "Foo", 1);
    let program = b.finish();

    let (output, _) = print_unit(&program, &no_preserve());
    assert!(output.contains("var a;"), "Output: {output}");
    assert!(output.contains("(function (a) {"), "Output: {output}");
    assert!(output.contains("(function (b) {"), "Output: {output}");
    assert!(output.contains("b.Foo = Foo;"), "Output: {output}");
    assert!(
        output.contains("})(b = a.b || (a.b = {}));"),
        "Output: {output}"
    );
    assert!(output.contains("})(a || (a = {}));"), "Output: {output}");
}

// =============================================================================
// Lazy Statics
// =============================================================================

#[test]
fn test_lazy_static_accessor_emission() {
    let mut b = ProgramBuilder::new();
    let unit = b.add_unit("Config.x", &[]);
    let config = b.add_class(unit, "Config", 1);
    let init = b.new_expr(config, vec![], 2);
    b.add_field(
        config,
        "INSTANCE",
        TypeRef::Named(config),
        Modifiers::STATIC,
        Some(init),
        2,
    );
    let program = b.finish();

    let (output, _) = print_unit(&program, &no_preserve());
    assert!(
        output.contains(
            "Config.INSTANCE_$LI$ = function () { if (Config.INSTANCE == null) { Config.INSTANCE = new Config(); } return Config.INSTANCE; };"
        ),
        "Output: {output}"
    );
}

#[test]
fn test_lazy_static_read_goes_through_accessor() {
    let mut b = ProgramBuilder::new();
    let unit = b.add_unit("Config.x", &[]);
    let config = b.add_class(unit, "Config", 1);
    let init = b.new_expr(config, vec![], 2);
    let instance = b.add_field(
        config,
        "INSTANCE",
        TypeRef::Named(config),
        Modifiers::STATIC,
        Some(init),
        2,
    );

    let user_unit = b.add_unit("User.x", &[]);
    let user = b.add_class(user_unit, "User", 1);
    let read = b.field_read(instance, 3);
    let ret = b.ret(Some(read), 3);
    let body = b.block(vec![ret], 2);
    b.add_method(user, "get", vec![], TypeRef::Named(config), Modifiers::empty(), Some(body), 2);
    let program = b.finish();

    let (output, _) = print_nth_unit(&program, UnitId(1), &no_preserve());
    assert!(
        output.contains("return Config.INSTANCE_$LI$();"),
        "Output: {output}"
    );
}

#[test]
fn test_lazy_static_write_uses_backing_slot() {
    // A static block writing the field must hit the slot, not the accessor.
    let mut b = ProgramBuilder::new();
    let unit = b.add_unit("Config.x", &[]);
    let config = b.add_class(unit, "Config", 1);
    let field = b.add_field(config, "cache", TypeRef::string(), Modifiers::STATIC, None, 2);
    let target = b.field_read(field, 4);
    let value = b.lit_str("warm", 4);
    let assign = b.assign(target, value, 4);
    let body = b.block(vec![assign], 3);
    b.add_static_block(config, body, 3);
    let program = b.finish();

    let (output, _) = print_unit(&program, &no_preserve());
    assert!(
        output.contains("Config.cache = \"warm\";"),
        "Output: {output}"
    );
    assert!(
        output.contains("Config.cache_$LI$ = function () { return Config.cache; };"),
        "Output: {output}"
    );
    assert!(output.contains("(function () {"), "Output: {output}");
    assert!(output.contains("})();"), "Output: {output}");
}

// =============================================================================
// Field/Method Clashes
// =============================================================================

#[test]
fn test_clashing_field_renamed_at_declaration_and_use() {
    let mut b = ProgramBuilder::new();
    let unit = b.add_unit("Box.x", &[]);
    let bx = b.add_class(unit, "Box", 1);
    let zero = b.lit_int(0, 2);
    let size_field = b.add_field(bx, "size", TypeRef::int(), Modifiers::empty(), Some(zero), 2);
    let read = b.field_read(size_field, 4);
    let ret = b.ret(Some(read), 4);
    let body = b.block(vec![ret], 3);
    b.add_method(bx, "size", vec![], TypeRef::int(), Modifiers::empty(), Some(body), 3);
    let program = b.finish();

    let (output, _) = print_unit(&program, &no_preserve());
    assert!(output.contains("this.__size = 0;"), "Output: {output}");
    assert!(output.contains("return this.__size;"), "Output: {output}");
    assert!(output.contains("Box.prototype.size = function () {"), "Output: {output}");
}

// =============================================================================
// Interfaces and Default Methods
// =============================================================================

#[test]
fn test_interface_defaults_and_copy_into_implementer() {
    let mut b = ProgramBuilder::new();
    let unit = b.add_unit("Greeter.x", &[]);
    let greeter = b.add_interface(unit, "Greeter", 1);
    let lit = b.lit_str("hi", 2);
    let ret = b.ret(Some(lit), 2);
    let body = b.block(vec![ret], 2);
    b.add_method(
        greeter,
        "greet",
        vec![],
        TypeRef::string(),
        Modifiers::DEFAULT,
        Some(body),
        2,
    );

    let person = b.add_class(unit, "Person", 5);
    b.add_implements(person, greeter);

    let robot = b.add_class(unit, "Robot", 8);
    b.add_implements(robot, greeter);
    let lit2 = b.lit_str("beep", 9);
    let ret2 = b.ret(Some(lit2), 9);
    let own_body = b.block(vec![ret2], 9);
    b.add_method(robot, "greet", vec![], TypeRef::string(), Modifiers::empty(), Some(own_body), 9);
    let program = b.finish();

    let (output, _) = print_unit(&program, &no_preserve());
    assert!(output.contains("var Greeter = { defaults: {} };"), "Output: {output}");
    assert!(output.contains("Greeter.defaults.greet = function () {"), "Output: {output}");
    // Person inherits the default body; Robot overrides and must not.
    assert!(
        output.contains("Person.prototype.greet = Greeter.defaults.greet;"),
        "Output: {output}"
    );
    assert!(
        !output.contains("Robot.prototype.greet = Greeter.defaults.greet;"),
        "Output: {output}"
    );
    assert!(output.contains("Robot.prototype.greet = function () {"), "Output: {output}");
}

// =============================================================================
// Overload Emission
// =============================================================================

#[test]
fn test_arity_dispatch_emission() {
    let mut b = ProgramBuilder::new();
    let unit = b.add_unit("Foo.x", &[]);
    let foo = b.add_class(unit, "Foo", 1);
    let zero_lit = b.lit_int(0, 3);
    let zero_ret = b.ret(Some(zero_lit), 3);
    let zero_body = b.block(vec![zero_ret], 2);
    b.add_method(foo, "m", vec![], TypeRef::int(), Modifiers::empty(), Some(zero_body), 2);

    let x = b.local_ref("x", 6);
    let one_ret = b.ret(Some(x), 6);
    let one_body = b.block(vec![one_ret], 5);
    b.add_method(
        foo,
        "m",
        vec![Param::new("x", TypeRef::int())],
        TypeRef::int(),
        Modifiers::empty(),
        Some(one_body),
        5,
    );
    let program = b.finish();

    let (output, reporter) = print_unit(&program, &no_preserve());
    assert!(reporter.problems.is_empty(), "problems: {:?}", reporter.problems);
    assert!(output.contains("Foo.prototype.m = function () {"), "Output: {output}");
    assert!(output.contains("if (arguments.length === 0) {"), "Output: {output}");
    assert!(output.contains("} else if (arguments.length === 1) {"), "Output: {output}");
    assert!(output.contains("var x = arguments[0];"), "Output: {output}");
    // The dispatcher is emitted exactly once.
    assert_eq!(output.matches("Foo.prototype.m = function").count(), 1);
}

#[test]
fn test_mangled_emission_and_call_site() {
    let mut b = ProgramBuilder::new();
    let unit = b.add_unit("Foo.x", &[]);
    let foo = b.add_class(unit, "Foo", 1);
    let body1 = b.block(vec![], 2);
    let by_int = b.add_method(
        foo,
        "m",
        vec![Param::new("x", TypeRef::int())],
        TypeRef::void(),
        Modifiers::empty(),
        Some(body1),
        2,
    );
    let body2 = b.block(vec![], 4);
    b.add_method(
        foo,
        "m",
        vec![Param::new("s", TypeRef::string())],
        TypeRef::void(),
        Modifiers::empty(),
        Some(body2),
        4,
    );
    // A caller resolving to the int overload.
    let arg = b.lit_int(5, 7);
    let call = b.call(by_int, vec![arg], 7);
    let caller_body = b.block(vec![call], 6);
    b.add_method(foo, "run", vec![], TypeRef::void(), Modifiers::empty(), Some(caller_body), 6);
    let program = b.finish();

    let (output, _) = print_unit(&program, &no_preserve());
    assert!(output.contains("Foo.prototype.m$int = function (x) {"), "Output: {output}");
    assert!(output.contains("Foo.prototype.m$String = function (s) {"), "Output: {output}");
    assert!(output.contains("this.m$int(5);"), "Output: {output}");
}

// =============================================================================
// Line Preservation
// =============================================================================

#[test]
fn test_preserve_lines_aligns_members_to_source_lines() {
    let mut b = ProgramBuilder::new();
    let unit = b.add_unit("Foo.x", &[]);
    let foo = b.add_class(unit, "Foo", 1);
    let init = b.lit_int(42, 3);
    b.add_field(foo, "x", TypeRef::int(), Modifiers::empty(), Some(init), 3);
    let one = b.lit_int(1, 6);
    let ret = b.ret(Some(one), 6);
    let body = b.block(vec![ret], 5);
    b.add_method(foo, "bar", vec![], TypeRef::int(), Modifiers::empty(), Some(body), 5);
    let program = b.finish();

    let options = TranspileOptions::default();
    assert!(options.preserve_source_line_numbers);
    let (output, reporter) = print_unit(&program, &options);
    assert!(reporter.problems.is_empty(), "problems: {:?}", reporter.problems);

    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 6, "Output: {output}");
    assert!(lines[0].contains("var Foo = (function () {"), "Output: {output}");
    assert!(lines[2].contains("this.x = 42;"), "Output: {output}");
    assert!(lines[4].contains("Foo.prototype.bar = function () {"), "Output: {output}");
    assert!(lines[5].contains("return 1;"), "Output: {output}");
}

#[test]
fn test_line_alignment_failure_is_warning_not_error() {
    // Two declarations forced onto the same source line: the second member
    // cannot go backwards, so alignment drifts and a warning is reported.
    let mut b = ProgramBuilder::new();
    let unit = b.add_unit("Foo.x", &[]);
    let foo = b.add_class(unit, "Foo", 2);
    let body1 = b.block(vec![], 1);
    b.add_method(foo, "a", vec![], TypeRef::void(), Modifiers::empty(), Some(body1), 1);
    let program = b.finish();

    let (output, reporter) = print_unit(&program, &TranspileOptions::default());
    assert!(!output.is_empty());
    assert!(reporter.has_kind(ProblemKind::LineAlignment), "problems: {:?}", reporter.problems);
    assert_eq!(reporter.error_count(), 0);
}

// =============================================================================
// Rollback Integrity
// =============================================================================

#[test]
fn test_rollback_restores_buffer_line_and_column() {
    let mut b = ProgramBuilder::new();
    let unit = b.add_unit("Foo.x", &[]);
    b.add_class(unit, "Foo", 1);
    let program = b.finish();

    let options = no_preserve();
    let facts = GlobalFacts::collect(&program, &options);
    let mut reporter = CollectingReporter::new();
    let plan = OverloadPlan::process(&program, &facts, &mut reporter);
    let mut printer = Printer::new(&program, UnitId(0), &facts, &plan, &options, &mut reporter);

    printer.write("var before = 1;");
    let checkpoint = printer.writer().position();
    let map_len = printer.source_map.len();

    // Force a fallback on a multi-line sub-emission.
    let committed = printer
        .speculate(|p| {
            p.write("var a = [");
            p.new_line();
            p.write("    1,");
            p.new_line();
            p.write("    2,");
            p.new_line();
            p.write("];");
            Ok(false)
        })
        .expect("speculation itself must not abort");

    assert!(!committed);
    assert_eq!(printer.writer().position(), checkpoint);
    assert_eq!(printer.output(), "var before = 1;");
    assert_eq!(printer.source_map.len(), map_len);

    // The buffer is fully usable after the rollback.
    printer.write(" var after = 2;");
    assert_eq!(printer.output(), "var before = 1; var after = 2;");
}

#[test]
fn test_committed_speculation_keeps_output() {
    let mut b = ProgramBuilder::new();
    let unit = b.add_unit("Foo.x", &[]);
    b.add_class(unit, "Foo", 1);
    let program = b.finish();

    let options = no_preserve();
    let facts = GlobalFacts::collect(&program, &options);
    let mut reporter = CollectingReporter::new();
    let plan = OverloadPlan::process(&program, &facts, &mut reporter);
    let mut printer = Printer::new(&program, UnitId(0), &facts, &plan, &options, &mut reporter);

    let committed = printer
        .speculate(|p| {
            p.write("kept");
            Ok(true)
        })
        .expect("no abort");
    assert!(committed);
    assert_eq!(printer.output(), "kept");
}

#[test]
fn test_wide_argument_list_falls_back_to_wrapped_layout() {
    let mut b = ProgramBuilder::new();
    let unit = b.add_unit("Foo.x", &[]);
    let foo = b.add_class(unit, "Foo", 1);
    let body = b.block(vec![], 2);
    let target = b.add_method(
        foo,
        "take",
        vec![
            Param::new("a", TypeRef::string()),
            Param::new("b", TypeRef::string()),
        ],
        TypeRef::void(),
        Modifiers::STATIC,
        Some(body),
        2,
    );
    let long1 = b.lit_str(&"x".repeat(70), 4);
    let long2 = b.lit_str(&"y".repeat(70), 4);
    let call = b.call(target, vec![long1, long2], 4);
    let caller = b.block(vec![call], 3);
    b.add_method(foo, "run", vec![], TypeRef::void(), Modifiers::empty(), Some(caller), 3);
    let program = b.finish();

    let (output, _) = print_unit(&program, &no_preserve());
    // The inline attempt exceeds the width limit, so each argument lands on
    // its own line.
    let arg_line = output
        .lines()
        .find(|l| l.trim_start().starts_with("\"xxx"))
        .expect("wrapped first argument line");
    assert!(arg_line.trim_end().ends_with(","), "Output: {output}");
    assert!(
        output.lines().any(|l| l.trim_start().starts_with("\"yyy")),
        "Output: {output}"
    );
}

// =============================================================================
// Resolution Gaps
// =============================================================================

#[test]
fn test_unresolved_symbol_aborts_unit() {
    let mut b = ProgramBuilder::new();
    let unit = b.add_unit("Broken.x", &[]);
    let broken = b.add_class(unit, "Broken", 1);
    let gap = b.unresolved("MissingType", 2);
    b.add_field(broken, "f", TypeRef::int(), Modifiers::STATIC, Some(gap), 2);
    let program = b.finish();

    let options = no_preserve();
    let facts = GlobalFacts::collect(&program, &options);
    let mut reporter = CollectingReporter::new();
    let plan = OverloadPlan::process(&program, &facts, &mut reporter);
    let mut printer = Printer::new(&program, UnitId(0), &facts, &plan, &options, &mut reporter);

    assert!(printer.print_unit().is_err());
    assert!(reporter.has_kind(ProblemKind::UnresolvedSymbol), "problems: {:?}", reporter.problems);
}

// =============================================================================
// Source Map
// =============================================================================

#[test]
fn test_source_map_is_monotonic_and_nonempty() {
    let mut b = ProgramBuilder::new();
    let unit = b.add_unit("Foo.x", &[]);
    let foo = b.add_class(unit, "Foo", 1);
    let init = b.lit_int(3, 2);
    b.add_field(foo, "x", TypeRef::int(), Modifiers::empty(), Some(init), 2);
    let x = b.lit_int(9, 4);
    let ret = b.ret(Some(x), 4);
    let body = b.block(vec![ret], 3);
    b.add_method(foo, "get", vec![], TypeRef::int(), Modifiers::empty(), Some(body), 3);
    let program = b.finish();

    for options in [TranspileOptions::default(), no_preserve()] {
        let facts = GlobalFacts::collect(&program, &options);
        let mut reporter = CollectingReporter::new();
        let plan = OverloadPlan::process(&program, &facts, &mut reporter);
        let mut printer = Printer::new(&program, UnitId(0), &facts, &plan, &options, &mut reporter);
        printer.print_unit().expect("unit prints");
        assert!(!printer.source_map.is_empty());
        assert!(printer.source_map.is_monotonic());
    }
}
