//! Parse-pass diagnostics: missing-return-on-all-paths and call-arity.

use std::collections::HashMap;

use crate::ast::{MethodDecl, Script};
use crate::diag::Diagnostic;
use crate::flow::always_returns;
use crate::token::{Span, Token};

pub fn check_script(script: &Script, tokens: &[Token], spans: &[Span]) -> Vec<Diagnostic> {
    let mut diags = Vec::new();
    check_missing_returns(script, &mut diags);
    check_call_arity(script, tokens, spans, &mut diags);
    diags
}

fn check_missing_returns(script: &Script, diags: &mut Vec<Diagnostic>) {
    let methods = script
        .classes
        .iter()
        .flat_map(|c| c.methods.iter())
        .chain(script.script_methods.iter());
    for method in methods {
        let Some(return_type) = method.return_type.as_deref() else {
            continue;
        };
        if return_type == "void" || return_type == "def" {
            continue;
        }
        // Bodiless (abstract/interface) methods have nothing to walk.
        if method.body.stmts.is_empty() {
            continue;
        }
        if !always_returns(&method.body) {
            diags.push(Diagnostic::warning(
                format!(
                    "Method '{}' declares return type '{}' but not all paths return a value",
                    method.name, return_type
                ),
                method.start_line.saturating_sub(1),
                0,
            ));
        }
    }
}

/// Flag implicit-receiver calls (bare name or `this.name`) whose argument
/// count is below every same-scope overload's required count. Qualified
/// cross-object calls are never flagged: the callee's real signature is
/// unknowable without indexing.
fn check_call_arity(script: &Script, tokens: &[Token], spans: &[Span], diags: &mut Vec<Diagnostic>) {
    let script_table = signature_table(script.script_methods.iter());
    let class_tables: Vec<(u32, u32, HashMap<&str, Vec<&MethodDecl>>)> = script
        .classes
        .iter()
        .map(|c| (c.start_line, c.end_line, signature_table(c.methods.iter())))
        .collect();

    for i in 0..tokens.len() {
        let Token::Id(name) = &tokens[i] else { continue };
        if !matches!(tokens.get(i + 1), Some(Token::LParen)) {
            continue;
        }
        if !is_implicit_receiver(tokens, i) {
            continue;
        }
        let line = spans[i].start.line;
        let table = class_tables
            .iter()
            .find(|(start, end, _)| line >= *start && line <= *end)
            .map(|(_, _, t)| t)
            .unwrap_or(&script_table);
        let Some(overloads) = table.get(name.as_str()) else {
            continue;
        };
        // Exclude the declaration sites themselves.
        if overloads.iter().any(|m| m.start_line == line) {
            continue;
        }
        let provided = count_call_args(tokens, i + 1);
        let min_required = overloads
            .iter()
            .map(|m| m.required_param_count())
            .min()
            .unwrap_or(0);
        if provided < min_required {
            diags.push(Diagnostic::warning(
                format!(
                    "Call to '{}' supplies {} argument(s) but at least {} are required",
                    name, provided, min_required
                ),
                spans[i].start.line - 1,
                spans[i].start.column - 1,
            ));
        }
    }
}

fn signature_table<'s>(methods: impl Iterator<Item = &'s MethodDecl>) -> HashMap<&'s str, Vec<&'s MethodDecl>> {
    let mut table: HashMap<&str, Vec<&MethodDecl>> = HashMap::new();
    for m in methods {
        table.entry(m.name.as_str()).or_default().push(m);
    }
    table
}

/// A call at token index `i` is implicit-receiver when the name is not
/// preceded by a qualifying dot (`this.` excepted), a `new`, or the shape of
/// a method declaration (`def`/`void`/`Type` directly before the name).
fn is_implicit_receiver(tokens: &[Token], i: usize) -> bool {
    let mut j = i;
    let prev = loop {
        if j == 0 {
            return true;
        }
        j -= 1;
        if !matches!(tokens[j], Token::Newline) {
            break &tokens[j];
        }
    };
    match prev {
        Token::Dot => {
            // `this.name(...)` stays in scope; any other qualifier leaves it.
            let mut k = j;
            while k > 0 {
                k -= 1;
                if !matches!(tokens[k], Token::Newline) {
                    return matches!(tokens[k], Token::This);
                }
            }
            false
        }
        Token::New | Token::Def | Token::Void | Token::Id(_) => false,
        _ => true,
    }
}

/// Count top-level comma-separated arguments starting at the `(` index.
fn count_call_args(tokens: &[Token], lparen: usize) -> usize {
    let mut depth = 0i32;
    let mut commas = 0usize;
    let mut any_content = false;
    for tok in &tokens[lparen..] {
        match tok {
            Token::LParen | Token::LBracket | Token::LBrace => depth += 1,
            Token::RParen | Token::RBracket | Token::RBrace => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            Token::Comma if depth == 1 => commas += 1,
            Token::Newline => {}
            _ if depth >= 1 => any_content = true,
            _ => {}
        }
    }
    if !any_content && commas == 0 {
        0
    } else {
        commas + 1
    }
}

#[cfg(test)]
mod check_test {
    use crate::diag::Severity;
    use crate::parse;

    #[test]
    fn missing_return_flagged_and_fixed() {
        let out = parse("String f() { if (cond) { return \"y\" } }");
        assert!(out
            .diagnostics
            .iter()
            .any(|d| d.message.contains("'f'") && d.message.contains("not all paths return")));

        let fixed = parse("String f() { if (cond) { return \"y\" } else { return \"n\" } }");
        assert!(!fixed.diagnostics.iter().any(|d| d.message.contains("not all paths")));
    }

    #[test]
    fn void_and_untyped_methods_exempt() {
        let out = parse("void f() { log('x') }\ndef g() { log('y') }");
        assert!(out.diagnostics.is_empty(), "got: {:?}", out.diagnostics);
    }

    #[test]
    fn arity_underflow_flagged() {
        let src = "def needsTwo(a, b) { return a + b }\nneedsTwo(onlyOne)";
        let out = parse(src);
        let diag = out
            .diagnostics
            .iter()
            .find(|d| d.message.contains("needsTwo"))
            .expect("expected arity diagnostic");
        assert!(diag.message.contains("1 argument"));
        assert!(diag.message.contains("at least 2"));
        assert_eq!(diag.severity, Severity::Warning);
        assert_eq!(diag.line, 1);
    }

    #[test]
    fn defaults_reduce_required_count() {
        let out = parse("def f(a, b = 2) { return a + b }\nf(1)");
        assert!(!out.diagnostics.iter().any(|d| d.message.contains("required")));
    }

    #[test]
    fn qualified_calls_never_flagged() {
        let out = parse("def f(a, b) { return a }\nother.f()");
        assert!(!out.diagnostics.iter().any(|d| d.message.contains("required")));
    }

    #[test]
    fn this_receiver_checked() {
        let out = parse("class A {\n  def f(a, b) { return a }\n  def g() { this.f(1) }\n}");
        assert!(out.diagnostics.iter().any(|d| d.message.contains("at least 2")));
    }
}
