//! Scope and hierarchy search: method locals, script-scope variables,
//! classes/methods by name, and the superclass-chain member walk.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use pps_syntax::ast::{Block, ClassDecl, MethodDecl, Stmt};

use super::scan::{self, ArgKind, CallArg};
use super::{ParseResult, SymbolKind, SymbolLocation};

/// How far below a declaration line the multi-line name search may look.
const SPLIT_DECL_LOOKAHEAD: usize = 4;

#[derive(Debug, Clone)]
pub struct LocalVar {
    pub name: String,
    pub declared_type: Option<String>,
    /// 0-based.
    pub line: u32,
    pub column: u32,
    pub kind: SymbolKind,
}

impl LocalVar {
    pub fn to_location(&self) -> SymbolLocation {
        SymbolLocation {
            line: self.line,
            column: self.column,
            text: self.name.clone(),
            kind: self.kind,
        }
    }
}

/// Parameters and body declarations of a method, in declaration order.
/// Declaration columns are recovered textually, not from tree columns: the
/// tree only records lines, and split declarations put the name on a later
/// line than the tree reports.
pub fn collect_local_variables(parsed: &ParseResult, method: &MethodDecl) -> Vec<LocalVar> {
    let mut vars = Vec::new();

    let sig_line = method.start_line.saturating_sub(1) as usize;
    for param in &method.params {
        let column = word_column(parsed.line(sig_line), &param.name).unwrap_or(0);
        vars.push(LocalVar {
            name: param.name.clone(),
            declared_type: param.declared_type.clone(),
            line: sig_line as u32,
            column,
            kind: SymbolKind::Param,
        });
    }

    collect_block_decls(parsed, &method.body, &mut vars);
    vars
}

fn collect_block_decls(parsed: &ParseResult, block: &Block, out: &mut Vec<LocalVar>) {
    for stmt in &block.stmts {
        match stmt {
            Stmt::Decl {
                name,
                declared_type,
                line,
            } => {
                let line0 = line.saturating_sub(1) as usize;
                let (found_line, column) = declaration_column(parsed, line0, name);
                let declared_type = refine_split_declared_type(parsed, line0, declared_type.clone());
                out.push(LocalVar {
                    name: name.clone(),
                    declared_type,
                    line: found_line as u32,
                    column,
                    kind: SymbolKind::Local,
                });
            }
            Stmt::If { then, orelse, .. } => {
                collect_block_decls(parsed, then, out);
                if let Some(orelse) = orelse {
                    collect_block_decls(parsed, orelse, out);
                }
            }
            Stmt::Loop { body, .. } => collect_block_decls(parsed, body, out),
            Stmt::Switch { cases, default, .. } => {
                for case in cases {
                    collect_block_decls(parsed, case, out);
                }
                if let Some(default) = default {
                    collect_block_decls(parsed, default, out);
                }
            }
            Stmt::Try {
                body,
                catches,
                finally,
                ..
            } => {
                collect_block_decls(parsed, body, out);
                for c in catches {
                    collect_block_decls(parsed, c, out);
                }
                if let Some(f) = finally {
                    collect_block_decls(parsed, f, out);
                }
            }
            Stmt::Block(inner) => collect_block_decls(parsed, inner, out),
            _ => {}
        }
    }
}

/// Tiered textual search for a declaration's column: exact `def name` /
/// `Type name` match on the declaration line, else a bounded multi-line
/// scan for the name standing alone (split-declaration formatting), else
/// the first word occurrence on the line.
fn declaration_column(parsed: &ParseResult, line0: usize, name: &str) -> (usize, u32) {
    let line = parsed.line(line0);
    if let Some(col) = decl_keyword_column(line, name) {
        return (line0, col);
    }
    for ahead in 1..=SPLIT_DECL_LOOKAHEAD {
        let idx = line0 + ahead;
        if idx >= parsed.lines.len() {
            break;
        }
        let candidate = parsed.line(idx);
        if candidate.trim() == name {
            let col = candidate.find(name).unwrap_or(0) as u32;
            return (idx, col);
        }
    }
    (line0, word_column(line, name).unwrap_or(0))
}

fn decl_keyword_column(line: &str, name: &str) -> Option<u32> {
    let re = Regex::new(&format!(r"\b(?:def|[A-Za-z_]\w*)\s+({})\b", regex::escape(name))).ok()?;
    re.captures(line)
        .and_then(|c| c.get(1))
        .map(|m| utf16_col(line, m.start()))
}

/// Split-declaration type propagation: when the tree reports the generic
/// fallback type but the previous non-empty line is a bare type token,
/// that token is the real declared type (`Type \n name = ...` formatting).
fn refine_split_declared_type(parsed: &ParseResult, line0: usize, declared: Option<String>) -> Option<String> {
    if declared.is_some() && declared.as_deref() != Some("def") {
        return declared;
    }
    static BARE_TYPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z][A-Za-z0-9_]*$").unwrap());
    let mut idx = line0;
    while idx > 0 {
        idx -= 1;
        let prev = parsed.line(idx).trim();
        if prev.is_empty() {
            continue;
        }
        if BARE_TYPE.is_match(prev) {
            return Some(prev.to_string());
        }
        break;
    }
    declared
}

/// A script-scope variable hit: declaration, bare assignment, or one of the
/// multi-line forms.
#[derive(Debug, Clone)]
pub struct TopLevelVar {
    pub name: String,
    pub declared_type: Option<String>,
    /// 0-based.
    pub line: u32,
    pub column: u32,
}

impl TopLevelVar {
    pub fn to_location(&self) -> SymbolLocation {
        SymbolLocation {
            line: self.line,
            column: self.column,
            text: self.name.clone(),
            kind: SymbolKind::Local,
        }
    }
}

/// The escalating permissiveness ladder for script-scope variable search.
/// Each pass is strictly more permissive than the previous; order is part
/// of the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TopLevelPass {
    StrictDepth,
    TreeAssisted,
    RelaxedColumn,
    AnywhereSafetyNet,
}

const TOP_LEVEL_PASSES: [TopLevelPass; 4] = [
    TopLevelPass::StrictDepth,
    TopLevelPass::TreeAssisted,
    TopLevelPass::RelaxedColumn,
    TopLevelPass::AnywhereSafetyNet,
];

/// Find a script-scope variable by name. Scans from the last line backward
/// within each pass, favoring the most recent assignment; pipeline scripts
/// conventionally configure near the end or re-assign before use.
pub fn find_top_level_variable(parsed: &ParseResult, name: &str) -> Option<TopLevelVar> {
    for pass in TOP_LEVEL_PASSES {
        for idx in (0..parsed.lines.len()).rev() {
            let Some(candidate) = match_var_on_line(parsed, idx, name) else {
                continue;
            };
            let accepted = match pass {
                TopLevelPass::StrictDepth => parsed.depth_at(idx) == 0,
                TopLevelPass::TreeAssisted => parsed.script.is_top_level_line(idx as u32 + 1),
                TopLevelPass::RelaxedColumn => candidate.column == 0,
                TopLevelPass::AnywhereSafetyNet => true,
            };
            if !accepted {
                continue;
            }
            // Guard: the depth/tree filters can mis-skip a later true
            // assignment; an unrestricted re-scan wins if it is later.
            for later in ((idx + 1)..parsed.lines.len()).rev() {
                if let Some(later_candidate) = match_var_on_line(parsed, later, name) {
                    return Some(later_candidate);
                }
            }
            return Some(candidate);
        }
    }
    None
}

/// Recognize `name` as a variable candidate on one line: a `(def|Type)
/// name` declaration, a bare `name =` assignment, or the split multi-line
/// forms. Returns nothing when the trailing character indicates a method or
/// closure definition instead.
fn match_var_on_line(parsed: &ParseResult, idx: usize, name: &str) -> Option<TopLevelVar> {
    let line = parsed.line(idx);
    if !line.contains(name) {
        // The multi-line "name alone" form still requires the name here.
        return None;
    }
    let escaped = regex::escape(name);

    // `(def|TypeName) name`
    if let Ok(re) = Regex::new(&format!(r"\b(def|[A-Za-z_]\w*)\s+({})\b", escaped)) {
        for caps in re.captures_iter(line) {
            let head = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            if head != "def" && scan::is_keyword(head) {
                continue;
            }
            let m = caps.get(2)?;
            if followed_by_call_or_block(line, m.end()) {
                continue;
            }
            let declared_type = (head != "def").then(|| head.to_string());
            return Some(TopLevelVar {
                name: name.to_string(),
                declared_type,
                line: idx as u32,
                column: utf16_col(line, m.start()),
            });
        }
    }

    // Bare `name =` (dynamic assignment without any declaration keyword).
    if let Ok(re) = Regex::new(&format!(r"(^|[^.\w$])({})\s*=($|[^=])", escaped)) {
        if let Some(caps) = re.captures(line) {
            let m = caps.get(2)?;
            return Some(TopLevelVar {
                name: name.to_string(),
                declared_type: None,
                line: idx as u32,
                column: utf16_col(line, m.start()),
            });
        }
    }

    // `name` alone on its line: either preceded by a bare type token
    // (split declaration) or followed by a line starting with `=`.
    if line.trim() == name {
        let column = utf16_col(line, line.find(name).unwrap_or(0));
        if followed_by_call_or_block(line, line.find(name).unwrap_or(0) + name.len()) {
            return None;
        }
        static BARE_TYPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());
        let prev = prev_non_blank(parsed, idx);
        if let Some(prev) = prev {
            let trimmed = prev.trim();
            if BARE_TYPE.is_match(trimmed) && !scan::is_keyword(trimmed) && trimmed != name {
                return Some(TopLevelVar {
                    name: name.to_string(),
                    declared_type: Some(trimmed.to_string()),
                    line: idx as u32,
                    column,
                });
            }
        }
        if let Some(next) = next_non_blank(parsed, idx) {
            if next.trim_start().starts_with('=') && !next.trim_start().starts_with("==") {
                return Some(TopLevelVar {
                    name: name.to_string(),
                    declared_type: None,
                    line: idx as u32,
                    column,
                });
            }
        }
    }

    None
}

/// A `(` or `{` after the name means a method or closure definition.
fn followed_by_call_or_block(line: &str, after: usize) -> bool {
    line[after.min(line.len())..]
        .chars()
        .find(|c| !c.is_whitespace())
        .is_some_and(|c| c == '(' || c == '{')
}

fn prev_non_blank<'p>(parsed: &'p ParseResult, idx: usize) -> Option<&'p str> {
    (0..idx).rev().map(|i| parsed.line(i)).find(|l| !l.trim().is_empty())
}

fn next_non_blank<'p>(parsed: &'p ParseResult, idx: usize) -> Option<&'p str> {
    ((idx + 1)..parsed.lines.len())
        .map(|i| parsed.line(i))
        .find(|l| !l.trim().is_empty())
}

/// Exact-name match against top-level classes, their methods, and
/// script-level methods, in that priority order.
pub fn find_top_level_class_or_method(parsed: &ParseResult, name: &str) -> Option<SymbolLocation> {
    if let Some(class) = parsed.script.find_class(name) {
        return Some(locate_on_line(parsed, class.start_line, name, SymbolKind::Class));
    }
    for class in &parsed.script.classes {
        if let Some(method) = class.methods.iter().find(|m| m.name == name) {
            return Some(locate_on_line(parsed, method.start_line, name, SymbolKind::Method));
        }
    }
    if let Some(method) = parsed.script.script_methods.iter().find(|m| m.name == name) {
        return Some(locate_on_line(parsed, method.start_line, name, SymbolKind::Method));
    }
    None
}

/// Member lookup gate: what a hierarchy search is allowed to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberMode {
    PreferField,
    PreferMethod,
    Any,
}

/// Walk `class` and its superclass chain looking for a member. The walk is
/// cycle-guarded by visited class name, never node identity: placeholder
/// supertypes rebound to concrete declarations can alias the same logical
/// class across distinct nodes.
pub fn find_in_hierarchy(
    parsed: &ParseResult,
    class: &ClassDecl,
    name: &str,
    mode: MemberMode,
    call_args: Option<&[CallArg]>,
) -> Option<SymbolLocation> {
    let mut visited: HashSet<String> = HashSet::new();
    let mut current = Some(class);

    while let Some(class) = current {
        if !visited.insert(class.name.clone()) {
            break;
        }

        for field in &class.fields {
            if field.name != name {
                continue;
            }
            if field.is_property {
                return Some(locate_on_line(parsed, field.line, name, SymbolKind::Property));
            }
        }
        for field in &class.fields {
            if field.name == name && !field.is_property {
                return Some(locate_on_line(parsed, field.line, name, SymbolKind::Field));
            }
        }
        if mode != MemberMode::PreferField {
            let overloads: Vec<&MethodDecl> = class.methods.iter().filter(|m| m.name == name).collect();
            if let Some(best) = pick_overload(&overloads, call_args) {
                return Some(locate_on_line(parsed, best.start_line, name, SymbolKind::Method));
            }
        }

        current = class
            .superclass
            .as_deref()
            .and_then(|sup| parsed.script.find_class(sup));
    }
    None
}

/// Score overloads against inferred argument kinds and return the best.
/// The weights are tuning constants; what matters is that arity mismatch
/// dominates type mismatch. Ties go to the first declared overload.
fn pick_overload<'m>(overloads: &[&'m MethodDecl], call_args: Option<&[CallArg]>) -> Option<&'m MethodDecl> {
    match (overloads.len(), call_args) {
        (0, _) => None,
        (1, _) | (_, None) => Some(overloads[0]),
        (_, Some(args)) => {
            // Strict comparison keeps the first declared overload on ties.
            let mut best: Option<(i32, &'m MethodDecl)> = None;
            for &m in overloads {
                let score = score_overload(m, args);
                if best.map_or(true, |(top, _)| score > top) {
                    best = Some((score, m));
                }
            }
            best.map(|(_, m)| m)
        }
    }
}

fn score_overload(method: &MethodDecl, args: &[CallArg]) -> i32 {
    let mut score = 0i32;
    for (i, arg) in args.iter().enumerate() {
        let Some(param) = method.params.get(i) else { continue };
        if arg_kind_matches(arg.kind, param.declared_type.as_deref()) {
            score += 2;
        } else {
            score -= 1;
        }
        if arg.text == param.name {
            // Coincidental-name bonus.
            score += 1;
        }
    }
    let min = method.required_param_count();
    let max = method.params.len();
    if args.len() < min {
        score -= 10 * (min - args.len()) as i32;
    } else if args.len() > max {
        score -= 10 * (args.len() - max) as i32;
    }
    score
}

fn arg_kind_matches(kind: ArgKind, declared: Option<&str>) -> bool {
    let Some(ty) = declared else { return true };
    match ty {
        "def" | "Object" => true,
        _ => match kind {
            ArgKind::Map => ty.starts_with("Map") || ty.ends_with("Map"),
            ArgKind::Closure => ty.starts_with("Closure"),
            ArgKind::Str => matches!(ty, "String" | "GString" | "CharSequence"),
            ArgKind::Object => false,
        },
    }
}

/// Build a location on a 1-based declaration line, recovering the column
/// textually from the first whole-word occurrence of the symbol.
fn locate_on_line(parsed: &ParseResult, decl_line: u32, name: &str, kind: SymbolKind) -> SymbolLocation {
    let line0 = decl_line.saturating_sub(1) as usize;
    let column = word_column(parsed.line(line0), name).unwrap_or(0);
    SymbolLocation {
        line: line0 as u32,
        column,
        text: name.to_string(),
        kind,
    }
}

/// Column of the first whole-word occurrence of `word`, in UTF-16 units.
pub fn word_column(line: &str, word: &str) -> Option<u32> {
    let re = Regex::new(&format!(r"(^|[^\w$])({})\b", regex::escape(word))).ok()?;
    re.captures(line)
        .and_then(|c| c.get(2))
        .map(|m| utf16_col(line, m.start()))
}

/// Convert a byte offset within a line to a UTF-16 column.
pub fn utf16_col(line: &str, byte_offset: usize) -> u32 {
    line[..byte_offset.min(line.len())].encode_utf16().count() as u32
}
