//! Per-request definition lookup: comment/string gating, qualified access
//! first, then the unqualified fallback chain.

use super::member;
use super::navigate::{self, MemberMode};
use super::scan;
use super::{ParseResult, Resolution, SymbolLocation};

/// Resolve a definition at a 0-based (line, character) position.
pub fn find_definition(
    parsed: &ParseResult,
    line_idx: usize,
    col: usize,
    scan_window: usize,
) -> Option<SymbolLocation> {
    let line = parsed.line(line_idx);
    if line.is_empty() && col > 0 {
        return None;
    }

    if in_line_comment(line, col) {
        return None;
    }
    if scan::is_inside_string(line, col) {
        if scan::is_inside_interpolation(line, col) {
            // `${expr}` content is ordinary code; fall through.
        } else if let Some(name) = scan::interpolated_var_at(line, col) {
            return resolve_unqualified(parsed, line_idx, col, &name);
        } else {
            return None;
        }
    }

    match member::resolve_member_access(parsed, line_idx, col, scan_window) {
        Resolution::Found(loc) => return Some(loc),
        // A recognized qualified access never falls back to unqualified
        // lookup; a same-named symbol elsewhere would be the wrong answer.
        Resolution::RecognizedUnresolved => return None,
        Resolution::NoMatch => {}
    }

    let ident = identifier_at(line, col)?;
    if scan::is_keyword(&ident.text) {
        return None;
    }
    resolve_unqualified_ident(parsed, line_idx, &ident)
}

struct IdentAt {
    text: String,
    /// Character column of the first identifier character.
    start: usize,
    /// One past the last identifier character.
    end: usize,
}

/// The identifier token touching the cursor. A cursor sitting exactly on a
/// dot with nothing resolvable after it takes the identifier to the dot's
/// left instead.
fn identifier_at(line: &str, col: usize) -> Option<IdentAt> {
    let chars: Vec<char> = line.chars().collect();
    let mut probe = col.min(chars.len());

    let is_ident = |c: char| c.is_ascii_alphanumeric() || c == '_' || c == '$';

    if probe >= chars.len() || !is_ident(chars[probe]) {
        if probe > 0 && (chars.get(probe) == Some(&'.') || chars.get(probe.wrapping_sub(1)) == Some(&'.')) {
            let dot = if chars.get(probe) == Some(&'.') { probe } else { probe - 1 };
            if dot == 0 {
                return None;
            }
            probe = dot - 1;
        } else if probe > 0 && chars.get(probe - 1).copied().is_some_and(is_ident) {
            probe -= 1;
        } else {
            return None;
        }
    }
    if !is_ident(*chars.get(probe)?) {
        return None;
    }

    let mut start = probe;
    while start > 0 && is_ident(chars[start - 1]) {
        start -= 1;
    }
    let mut end = probe + 1;
    while end < chars.len() && is_ident(chars[end]) {
        end += 1;
    }
    let text: String = chars[start..end].iter().collect();
    if text.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(IdentAt { text, start, end })
}

fn resolve_unqualified(parsed: &ParseResult, line_idx: usize, _col: usize, name: &str) -> Option<SymbolLocation> {
    if scan::is_keyword(name) {
        return None;
    }
    let ident = IdentAt {
        text: name.to_string(),
        start: 0,
        end: 0,
    };
    resolve_from_scopes(parsed, line_idx, &ident, false, false)
}

fn resolve_unqualified_ident(parsed: &ParseResult, line_idx: usize, ident: &IdentAt) -> Option<SymbolLocation> {
    let line = parsed.line(line_idx);
    let chars: Vec<char> = line.chars().collect();

    let next_code = chars[ident.end.min(chars.len())..]
        .iter()
        .copied()
        .find(|c| !c.is_whitespace());
    let is_call = next_code == Some('(');
    let followed_by_dot = next_code == Some('.');

    let before: String = chars[..ident.start].iter().collect();
    let trimmed = before.trim_end();
    let after_new = trimmed.ends_with("new") && ends_at_word_boundary(trimmed, 3);
    let cast_style = trimmed.ends_with('(') && next_code == Some(')');
    let after_type_keyword = ["as", "extends", "implements"]
        .iter()
        .any(|kw| trimmed.ends_with(kw) && ends_at_word_boundary(trimmed, kw.len()));

    let prefers_class = after_new
        || cast_style
        || after_type_keyword
        || followed_by_dot
        || (starts_uppercase(&ident.text) && parsed.script.find_class(&ident.text).is_some());

    resolve_from_scopes(parsed, line_idx, ident, is_call && !after_new, prefers_class)
}

fn ends_at_word_boundary(text: &str, kw_len: usize) -> bool {
    text.len() == kw_len
        || text[..text.len() - kw_len]
            .chars()
            .next_back()
            .is_some_and(|c| !c.is_ascii_alphanumeric() && c != '_')
}

fn starts_uppercase(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}

/// The ordered unqualified chain: enclosing-method locals, same-class call
/// overloads, enclosing hierarchy members, then top-level variable vs
/// class/method in the order the surrounding context suggests.
fn resolve_from_scopes(
    parsed: &ParseResult,
    line_idx: usize,
    ident: &IdentAt,
    overload_call: bool,
    prefers_class: bool,
) -> Option<SymbolLocation> {
    let name = &ident.text;
    let line1 = line_idx as u32 + 1;

    if let Some(method) = member::enclosing_method(parsed, line_idx) {
        let locals = navigate::collect_local_variables(parsed, method);
        // The declaration nearest above the cursor wins over later
        // same-named declarations in sibling branches.
        let best = locals
            .iter()
            .filter(|v| v.name == *name && v.line as usize <= line_idx)
            .max_by_key(|v| v.line)
            .or_else(|| locals.iter().find(|v| v.name == *name));
        if let Some(var) = best {
            return Some(var.to_location());
        }
    }

    let enclosing_class = parsed.script.find_enclosing_class(line1);
    if overload_call {
        if let Some(class) = enclosing_class {
            let args = scan::extract_call_args(parsed.line(line_idx), ident.end);
            if let Some(loc) =
                navigate::find_in_hierarchy(parsed, class, name, MemberMode::PreferMethod, Some(&args))
            {
                return Some(loc);
            }
        }
    }
    if let Some(class) = enclosing_class {
        if let Some(loc) = navigate::find_in_hierarchy(parsed, class, name, MemberMode::Any, None) {
            return Some(loc);
        }
    }

    if prefers_class {
        navigate::find_top_level_class_or_method(parsed, name)
            .or_else(|| navigate::find_top_level_variable(parsed, name).map(|v| v.to_location()))
    } else {
        navigate::find_top_level_variable(parsed, name)
            .map(|v| v.to_location())
            .or_else(|| navigate::find_top_level_class_or_method(parsed, name))
    }
}

/// Whether `col` sits at or beyond a `//` that begins a comment outside any
/// string literal on this line.
fn in_line_comment(line: &str, col: usize) -> bool {
    let chars: Vec<char> = line.chars().collect();
    let mut quote: Option<char> = None;
    let mut i = 0usize;
    while i < chars.len() && i < col {
        let c = chars[i];
        match quote {
            Some(q) => {
                if c == '\\' {
                    i += 1;
                } else if c == q {
                    quote = None;
                }
            }
            None => {
                if c == '/' && chars.get(i + 1) == Some(&'/') {
                    return true;
                }
                if c == '\'' || c == '"' {
                    quote = Some(c);
                }
            }
        }
        i += 1;
    }
    false
}
