pub mod ast;
pub mod check;
pub mod diag;
pub mod flow;
pub mod parse;
pub mod token;

pub use ast::Script;
pub use diag::{Diagnostic, Severity};

/// A parsed script together with every diagnostic the parse pass produced
/// (syntax errors, missing-return warnings, call-arity warnings).
#[derive(Debug, Clone)]
pub struct ParseOutput {
    pub script: Script,
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse `text` and run the parse-time checks.
///
/// A trailing member-access dot at the end of the document (`obj.`) is
/// patched with a synthetic identifier before lexing so a tree still
/// materializes while the user is mid-typing. All positions refer to the
/// original text; the identifier goes right after the dot, before any
/// trailing whitespace, so patched line ranges never exceed the original.
pub fn parse(text: &str) -> ParseOutput {
    let head = text.trim_end();
    let patched;
    let effective = if head.ends_with('.') {
        patched = format!("{}__synthetic__{}", head, &text[head.len()..]);
        patched.as_str()
    } else {
        text
    };

    let lexed = token::Lexer::new(effective).tokenize();
    let mut diagnostics = lexed.diagnostics;
    let (script, mut parse_diags) = parse::Parser::new(&lexed.tokens, &lexed.spans).parse_script();
    diagnostics.append(&mut parse_diags);
    diagnostics.extend(check::check_script(&script, &lexed.tokens, &lexed.spans));
    ParseOutput { script, diagnostics }
}
