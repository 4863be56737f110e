use super::scan;
use super::{Analyzer, ParseResult, SymbolKind};

fn parsed(src: &str) -> ParseResult {
    ParseResult::new(src)
}

fn definition(src: &str, line: u32, col: u32) -> Option<(u32, u32, SymbolKind)> {
    let analyzer = Analyzer::new();
    let parsed = parsed(src);
    analyzer
        .find_definition(&parsed, line, col)
        .map(|loc| (loc.line, loc.column, loc.kind))
}

#[test]
fn brace_depth_ignores_strings_and_comments() {
    let lines = ["def a = \"{ not a brace }\"", "if (a) {", "  // } fake", "  def b = 1", "}"];
    let depths = scan::brace_depth_per_line(&lines);
    assert_eq!(depths, vec![0, 0, 1, 1, 1]);
    assert_eq!(scan::brace_depth_at_end(&lines), 0);
}

#[test]
fn brace_depth_never_negative() {
    let depths = scan::brace_depth_per_line(&["}", "}", "{"]);
    assert_eq!(depths, vec![0, 0, 0]);
    assert_eq!(scan::brace_depth_at_end(&["}", "{"]), 1);
}

#[test]
fn brace_depth_carries_block_comments_across_lines() {
    let lines = ["/* {", "   {", "*/ {"];
    assert_eq!(scan::brace_depth_per_line(&lines), vec![0, 0, 0]);
    assert_eq!(scan::brace_depth_at_end(&lines), 1);
}

#[test]
fn interpolated_var_excludes_one_past_end() {
    let line = "def msg = \"hi $name!\"";
    let dollar = line.find('$').unwrap();
    assert_eq!(scan::interpolated_var_at(line, dollar), Some("name".into()));
    assert_eq!(scan::interpolated_var_at(line, dollar + 4), Some("name".into()));
    // One past the identifier end must not match.
    assert_eq!(scan::interpolated_var_at(line, dollar + 5), None);
}

#[test]
fn second_declaration_wins() {
    let src = "def x = 1\ndef x = 2\nprintln(x)";
    let loc = definition(src, 2, 8).unwrap();
    assert_eq!(loc.0, 1);
    assert_eq!(loc.1, 4);
}

#[test]
fn inherited_field_found_through_hierarchy() {
    let src = "class Foo { String foo = \"a\" }\nclass Bar extends Foo {}\ndef b = new Bar()\nb.foo";
    let loc = definition(src, 3, 3).unwrap();
    assert_eq!(loc.0, 0);
    assert_eq!(loc.2, SymbolKind::Field);
}

#[test]
fn map_literal_key_resolves() {
    let src = "def ctx = [a: 1, b: 2]\nctx.a";
    let loc = definition(src, 1, 4).unwrap();
    assert_eq!((loc.0, loc.1, loc.2), (0, 11, SymbolKind::MapKey));
}

#[test]
fn map_key_last_occurrence_wins() {
    let src = "def ctx = [a: 1, a: 2]\nctx.a";
    let loc = definition(src, 1, 4).unwrap();
    assert_eq!(loc.1, 17);
}

#[test]
fn multiline_map_literal_key() {
    let src = "def cfg = [\n  retries: 3,\n  'timeout': 10\n]\ncfg.timeout";
    let loc = definition(src, 4, 5).unwrap();
    assert_eq!((loc.0, loc.2), (2, SymbolKind::MapKey));
    assert_eq!(loc.1, 3);
}

#[test]
fn comment_position_resolves_nothing() {
    let src = "def x = 1\n// x marks the spot";
    assert_eq!(definition(src, 1, 3), None);
}

#[test]
fn plain_string_position_resolves_nothing() {
    let src = "def x = 1\ndef s = 'x y z'";
    assert_eq!(definition(src, 1, 9), None);
}

#[test]
fn bare_interpolation_resolves_variable() {
    let src = "def name = 'pps'\ndef msg = \"hello $name\"";
    let dollar = "def msg = \"hello $".len() as u32;
    let loc = definition(src, 1, dollar).unwrap();
    assert_eq!(loc.0, 0);
}

#[test]
fn recognized_qualified_access_suppresses_fallback() {
    // `member` exists as a top-level variable, but `thing.member` must not
    // resolve to it.
    let src = "def member = 1\nthing.member";
    assert_eq!(definition(src, 1, 8), None);
}

#[test]
fn property_assignment_is_a_definition_site() {
    let src = "cfg.retries = 3\nprintln(cfg.retries)";
    let loc = definition(src, 1, 13).unwrap();
    assert_eq!((loc.0, loc.2), (0, SymbolKind::PropertyAssignment));
    assert_eq!(loc.1, 4);
}

#[test]
fn this_member_resolves_in_enclosing_class() {
    let src = "class Job {\n  String name\n  def describe() {\n    return this.name\n  }\n}";
    let loc = definition(src, 3, 16).unwrap();
    assert_eq!((loc.0, loc.2), (1, SymbolKind::Field));
}

#[test]
fn local_reference_lands_on_own_declaration() {
    let src = "def run() {\n  def count = 1\n  return count\n}\ndef count = 9";
    let loc = definition(src, 2, 10).unwrap();
    assert_eq!((loc.0, loc.2), (1, SymbolKind::Local));
}

#[test]
fn parameter_resolves_to_signature_line() {
    let src = "def greet(String who) {\n  println(who)\n}";
    let loc = definition(src, 1, 11).unwrap();
    assert_eq!((loc.0, loc.2), (0, SymbolKind::Param));
    assert_eq!(loc.1, 17);
}

#[test]
fn split_declaration_type_refines_member_lookup() {
    let src = "class Svc { def ping() { } }\nSvc\nsvc = new Svc()\nsvc.ping()";
    let loc = definition(src, 3, 5).unwrap();
    assert_eq!((loc.0, loc.2), (0, SymbolKind::Method));
}

#[test]
fn keyword_positions_resolve_nothing() {
    let src = "def x = 1\nreturn x";
    assert_eq!(definition(src, 1, 1), None);
}

#[test]
fn trailing_dot_takes_identifier_to_the_left() {
    let src = "def svc = new Svc()\nsvc.";
    let loc = definition(src, 1, 3).unwrap();
    assert_eq!(loc.0, 0);
}

#[test]
fn constructor_position_prefers_class() {
    let src = "class Report { }\ndef Report = 1\ndef r = new Report()";
    let loc = definition(src, 2, 13).unwrap();
    assert_eq!((loc.0, loc.2), (0, SymbolKind::Class));
}

#[test]
fn definition_requests_are_idempotent() {
    let src = "def x = 1\nprintln(x)";
    let analyzer = Analyzer::new();
    let parsed = parsed(src);
    let first = analyzer.find_definition(&parsed, 1, 8);
    let second = analyzer.find_definition(&parsed, 1, 8);
    assert_eq!(first, second);
}

#[test]
fn out_of_range_positions_resolve_nothing() {
    let src = "def x = 1";
    assert_eq!(definition(src, 5, 0), None);
    assert_eq!(definition(src, 0, 200), None);
}

#[test]
fn overload_scoring_picks_matching_kinds() {
    let src = "class C {\n  def run(Map opts) { }\n  def run(String name, Closure body) { }\n  def go() {\n    run('build') { }\n  }\n}";
    let loc = definition(src, 4, 5).unwrap();
    assert_eq!((loc.0, loc.2), (2, SymbolKind::Method));
}

#[test]
fn arity_penalty_dominates() {
    let src = "class C {\n  def run(a, b, c) { }\n  def run(a) { }\n  def go() {\n    run(1)\n  }\n}";
    let loc = definition(src, 4, 5).unwrap();
    assert_eq!(loc.0, 2);
}

#[test]
fn completions_list_inherited_members() {
    let src = "class Base {\n  String tag\n  def describe() { }\n}\nclass Kid extends Base {\n  def extra() { }\n}\ndef k = new Kid()\nk.";
    let analyzer = Analyzer::new();
    let parsed = parsed(src);
    let items = analyzer.completions(&parsed, 8, 2);
    let labels: Vec<&str> = items.iter().map(|c| c.label.as_str()).collect();
    assert!(labels.contains(&"extra"));
    assert!(labels.contains(&"describe"));
    assert!(labels.contains(&"tag"));
}

#[test]
fn completions_filter_case_insensitively() {
    let src = "class Svc {\n  def restart() { }\n  def reload() { }\n  def stop() { }\n}\ndef s = new Svc()\ns.RE";
    let analyzer = Analyzer::new();
    let parsed = parsed(src);
    let items = analyzer.completions(&parsed, 6, 4);
    let labels: Vec<&str> = items.iter().map(|c| c.label.as_str()).collect();
    assert_eq!(labels, vec!["restart", "reload"]);
    assert_eq!(items[0].replace_start, 2);
    assert_eq!(items[0].replace_end, 4);
}

#[test]
fn completions_summarize_overloads() {
    let src = "class Svc {\n  def run(Map opts) { }\n  def run(String name) { }\n}\ndef s = new Svc()\ns.ru";
    let analyzer = Analyzer::new();
    let parsed = parsed(src);
    let items = analyzer.completions(&parsed, 5, 4);
    assert_eq!(items.len(), 1);
    assert!(items[0].detail.contains("(+1 overload)"));
}

#[test]
fn completions_require_dot_context() {
    let src = "def s = 1\ns";
    let analyzer = Analyzer::new();
    let parsed = parsed(src);
    assert!(analyzer.completions(&parsed, 1, 1).is_empty());
}

#[test]
fn call_arg_kinds_extracted_in_order() {
    let args = scan::extract_call_args("run(retry: 2, 'build', other: 1) { body }", 3);
    let kinds: Vec<scan::ArgKind> = args.iter().map(|a| a.kind).collect();
    assert_eq!(
        kinds,
        vec![scan::ArgKind::Map, scan::ArgKind::Str, scan::ArgKind::Closure]
    );
}

#[test]
fn overload_tie_goes_to_first_declared() {
    let src = "class C {\n  def run(a) { }\n  def run(b) { }\n}\ndef c = new C()\nc.run(1)";
    let loc = definition(src, 5, 2).unwrap();
    assert_eq!((loc.0, loc.2), (1, SymbolKind::Method));
}

#[test]
fn cursor_just_past_member_stays_qualified() {
    let src = "def a = 5\ndef ctx = [a: 1]\nctx.a";
    // End-of-line, one past the member's last character. The map key must
    // win; the unrelated top-level `a` never enters the picture.
    let loc = definition(src, 2, 5).unwrap();
    assert_eq!((loc.0, loc.1, loc.2), (1, 11, SymbolKind::MapKey));
}

#[test]
fn map_key_found_despite_wide_chars_before_qualifier() {
    let src = "m = '\u{1f680}\u{1f680}\u{1f680}\u{1f680}\u{1f680}'; ctx = [port: 8080]\nother = [port: 9090]\nctx.port";
    // The emoji make the qualifier's UTF-16 column diverge from its char
    // index; the key must still come from ctx's own literal.
    let loc = definition(src, 2, 4).unwrap();
    assert_eq!((loc.0, loc.1, loc.2), (0, 25, SymbolKind::MapKey));
}
