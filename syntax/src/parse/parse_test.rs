use crate::ast::Stmt;
use crate::parse;

#[test]
fn parses_classes_with_hierarchy() {
    let src = "class Foo {\n  String foo = \"a\"\n}\nclass Bar extends Foo implements Runnable {\n}";
    let out = parse(src);
    assert_eq!(out.script.classes.len(), 2);

    let foo = &out.script.classes[0];
    assert_eq!(foo.name, "Foo");
    assert_eq!(foo.fields.len(), 1);
    assert_eq!(foo.fields[0].name, "foo");
    assert_eq!(foo.fields[0].declared_type.as_deref(), Some("String"));
    assert_eq!(foo.fields[0].line, 2);

    let bar = &out.script.classes[1];
    assert_eq!(bar.superclass.as_deref(), Some("Foo"));
    assert_eq!(bar.interfaces, vec!["Runnable".to_string()]);
    assert_eq!(bar.start_line, 4);
}

#[test]
fn def_members_are_properties() {
    let out = parse("class C {\n  def tag = 'x'\n  String name\n}");
    let c = &out.script.classes[0];
    assert!(c.fields[0].is_property);
    assert!(!c.fields[1].is_property);
}

#[test]
fn script_methods_and_statements_split() {
    let src = "def helper(a, b = 1) {\n  return a + b\n}\ndef total = helper(2)\n";
    let out = parse(src);
    assert_eq!(out.script.script_methods.len(), 1);
    let helper = &out.script.script_methods[0];
    assert_eq!(helper.params.len(), 2);
    assert!(!helper.params[0].has_default);
    assert!(helper.params[1].has_default);
    assert_eq!(helper.required_param_count(), 1);

    assert_eq!(out.script.statements.len(), 1);
    assert!(matches!(
        &out.script.statements[0],
        Stmt::Decl { name, line: 4, .. } if name == "total"
    ));
}

#[test]
fn typed_parameters_keep_their_types() {
    let out = parse("void run(String name, int count) { }");
    let m = &out.script.script_methods[0];
    assert_eq!(m.params[0].declared_type.as_deref(), Some("String"));
    assert_eq!(m.params[1].declared_type.as_deref(), Some("int"));
    assert_eq!(m.return_type.as_deref(), Some("void"));
}

#[test]
fn method_line_ranges_cover_body() {
    let src = "class C {\n  def run() {\n    def x = 1\n    return x\n  }\n}";
    let out = parse(src);
    let c = &out.script.classes[0];
    let m = &c.methods[0];
    assert_eq!(m.start_line, 2);
    assert_eq!(m.end_line, 5);
    assert!(out.script.find_enclosing_class(3).is_some());
    assert!(out.script.find_enclosing_method(c, 3).is_some());
    assert!(out.script.is_top_level_line(1) || !out.script.is_top_level_line(3));
}

#[test]
fn constructor_is_parsed_as_method() {
    let out = parse("class Job {\n  Job(String name) {\n    this.name = name\n  }\n}");
    let c = &out.script.classes[0];
    assert_eq!(c.methods.len(), 1);
    assert_eq!(c.methods[0].name, "Job");
    assert!(c.methods[0].return_type.is_none());
}

#[test]
fn trailing_dot_still_yields_a_tree() {
    let out = parse("def svc = new Service()\nsvc.");
    assert_eq!(out.script.statements.len(), 2);
    assert!(matches!(&out.script.statements[0], Stmt::Decl { name, .. } if name == "svc"));
}

#[test]
fn trailing_dot_patch_keeps_newline_terminated_positions_in_bounds() {
    let out = parse("def svc = new Service()\nsvc.\n");
    assert_eq!(out.script.statements.len(), 2);
    for d in &out.diagnostics {
        assert!(d.line < 2, "diagnostic line {} out of bounds", d.line);
    }
}

#[test]
fn unclosed_block_diagnostic_stays_on_last_line() {
    let out = parse("class C {\n  def m() {\n");
    assert!(!out.diagnostics.is_empty());
    for d in &out.diagnostics {
        assert!(d.line < 2, "diagnostic line {} out of bounds", d.line);
    }
}

#[test]
fn multiline_call_with_closure_is_one_statement() {
    let src = "stage('build') {\n  sh 'make'\n}\ndef x = 1";
    let out = parse(src);
    // The closure body keeps the trailing decl separate.
    assert!(matches!(
        out.script.statements.last(),
        Some(Stmt::Decl { name, .. }) if name == "x"
    ));
}

#[test]
fn broken_input_produces_diagnostics_not_panics() {
    let out = parse("class {\n  ???\n}");
    assert!(!out.diagnostics.is_empty());
    for d in &out.diagnostics {
        assert!(d.line < 3);
    }
}

#[test]
fn interface_methods_without_bodies() {
    let out = parse("interface Step {\n  String describe()\n}");
    let c = &out.script.classes[0];
    assert_eq!(c.methods.len(), 1);
    assert_eq!(c.methods[0].name, "describe");
    assert!(c.methods[0].body.stmts.is_empty());
}
