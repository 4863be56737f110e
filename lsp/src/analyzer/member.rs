//! `qualifier.member` resolution. Static inference first (locals, script
//! variables, literal class names), then the dynamic heuristics that treat
//! the qualifier as a map literal or a free-form property bag.

use once_cell::sync::Lazy;
use regex::Regex;

use pps_syntax::ast::MethodDecl;

use super::navigate::{self, MemberMode};
use super::scan;
use super::{ParseResult, Resolution, SymbolKind, SymbolLocation};

static MEMBER_ACCESS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Za-z_$][\w$]*)\s*\.\s*([A-Za-z_$][\w$]*)").unwrap());

static CONSTRUCTOR_CALL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"=\s*new\s+([A-Za-z_]\w*)\s*\(").unwrap());

/// Resolve a member access touching the cursor. `col` is a character index
/// into the line. The cursor counts as touching when it lies within the
/// member name, exactly on the dot, or in the gap between dot and member.
pub fn resolve_member_access(
    parsed: &ParseResult,
    line_idx: usize,
    col: usize,
    scan_window: usize,
) -> Resolution {
    let line = parsed.line(line_idx);

    let Some(access) = member_access_at(line, col) else {
        return Resolution::NoMatch;
    };
    let (qualifier, member) = (&access.qualifier, &access.member);

    let is_call = followed_by_paren(line, access.member_end);
    let mode = if is_call { MemberMode::PreferMethod } else { MemberMode::Any };
    let call_args = is_call.then(|| scan::extract_call_args(line, access.member_end));

    if qualifier == "this" {
        let class = parsed.script.find_enclosing_class(line_idx as u32 + 1);
        if let Some(class) = class {
            if let Some(loc) = navigate::find_in_hierarchy(parsed, class, member, mode, call_args.as_deref()) {
                return Resolution::Found(loc);
            }
        }
        return Resolution::RecognizedUnresolved;
    }

    if let Some(ty) = infer_qualifier_type(parsed, line_idx, qualifier) {
        if let Some(class) = parsed.script.find_class(&ty) {
            if let Some(loc) = navigate::find_in_hierarchy(parsed, class, member, mode, call_args.as_deref()) {
                return Resolution::Found(loc);
            }
        }
    }

    if let Some(loc) = map_literal_key(parsed, qualifier, member) {
        return Resolution::Found(loc);
    }
    if let Some(loc) = property_assignment(parsed, qualifier, member) {
        return Resolution::Found(loc);
    }
    if let Some(loc) = relaxed_map_key(parsed, qualifier, member, scan_window) {
        return Resolution::Found(loc);
    }

    Resolution::RecognizedUnresolved
}

pub struct MemberAccess {
    pub qualifier: String,
    pub member: String,
    pub member_end: usize,
}

/// Find the `qualifier.member` occurrence that the cursor touches, if any.
pub fn member_access_at(line: &str, col: usize) -> Option<MemberAccess> {
    let bytes = char_to_byte(line, col);
    for caps in MEMBER_ACCESS.captures_iter(line) {
        let qual = caps.get(1)?;
        let memb = caps.get(2)?;
        if qual.as_str() == "new" {
            continue;
        }
        let dot = line[qual.end()..memb.start()].find('.').map(|d| qual.end() + d)?;
        // One past the member's last character still counts as touching,
        // matching the tolerance of plain identifier extraction.
        let touches = (bytes >= memb.start() && bytes <= memb.end()) || bytes == dot || (bytes > dot && bytes < memb.start());
        if touches {
            return Some(MemberAccess {
                qualifier: qual.as_str().to_string(),
                member: memb.as_str().to_string(),
                member_end: byte_to_char(line, memb.end()),
            });
        }
    }
    None
}

/// Infer a qualifier's type name: enclosing-method locals first, then
/// script-scope variables, then the qualifier taken literally as a class
/// name (static-style access). Generic declarations are refined by a
/// `= new TypeName(` constructor pattern on the declaration line.
pub fn infer_qualifier_type(parsed: &ParseResult, line_idx: usize, qualifier: &str) -> Option<String> {
    if let Some(method) = enclosing_method(parsed, line_idx) {
        let locals = navigate::collect_local_variables(parsed, method);
        if let Some(var) = locals.iter().rev().find(|v| v.name == qualifier) {
            if let Some(ty) = concrete_type(var.declared_type.as_deref()) {
                return Some(ty);
            }
            if let Some(ty) = constructor_type_on_line(parsed.line(var.line as usize), qualifier) {
                return Some(ty);
            }
            return None;
        }
    }

    if let Some(var) = navigate::find_top_level_variable(parsed, qualifier) {
        if let Some(ty) = concrete_type(var.declared_type.as_deref()) {
            return Some(ty);
        }
        if let Some(ty) = constructor_type_on_line(parsed.line(var.line as usize), qualifier) {
            return Some(ty);
        }
        return None;
    }

    if parsed.script.find_class(qualifier).is_some() {
        return Some(qualifier.to_string());
    }
    None
}

fn concrete_type(declared: Option<&str>) -> Option<String> {
    match declared {
        Some("def") | Some("Object") | None => None,
        Some(ty) => Some(ty.to_string()),
    }
}

fn constructor_type_on_line(line: &str, qualifier: &str) -> Option<String> {
    if !line.contains(qualifier) {
        return None;
    }
    CONSTRUCTOR_CALL
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// The enclosing class method or script-level method containing a 0-based
/// line, if any.
pub fn enclosing_method<'p>(parsed: &'p ParseResult, line_idx: usize) -> Option<&'p MethodDecl> {
    let line1 = line_idx as u32 + 1;
    if let Some(class) = parsed.script.find_enclosing_class(line1) {
        if let Some(method) = parsed.script.find_enclosing_method(class, line1) {
            return Some(method);
        }
    }
    parsed.script.find_enclosing_script_method(line1)
}

/// Heuristic a: the qualifier was assigned a `[...]` map literal; find
/// `member:` at bracket depth 1 inside that literal. Returns the last
/// occurrence when the key repeats.
fn map_literal_key(parsed: &ParseResult, qualifier: &str, member: &str) -> Option<SymbolLocation> {
    let (start_line, start_col) = qualifier_assignment(parsed, qualifier)?;
    let line = parsed.line(start_line);
    let eq = line[char_to_byte(line, start_col)..].find('=')?;
    let eq_col = start_col + line[char_to_byte(line, start_col)..][..eq].chars().count();

    // The literal must open with `[` right after the `=`.
    let mut cursor = MultiLineCursor::new(parsed, start_line, eq_col + 1);
    cursor.skip_whitespace();
    if cursor.peek() != Some('[') {
        return None;
    }

    let mut depth = 0i32;
    let mut last: Option<SymbolLocation> = None;
    while let Some((line_idx, col, c)) = cursor.next_code_char() {
        match c {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            _ if depth == 1 => {
                if let Some((loc, resume)) = key_match_at(parsed, line_idx, col, member) {
                    last = Some(loc);
                    cursor.resume_at(line_idx, resume);
                }
            }
            _ => {}
        }
    }
    last
}

/// Heuristic b: a textual `qualifier.member =` assignment, most recent
/// first, preferring one at lexical top level.
fn property_assignment(parsed: &ParseResult, qualifier: &str, member: &str) -> Option<SymbolLocation> {
    let re = Regex::new(&format!(
        r"(^|[^\w$.])({q})\s*\.\s*({m})\s*=($|[^=])",
        q = regex::escape(qualifier),
        m = regex::escape(member)
    ))
    .ok()?;

    let mut anywhere: Option<SymbolLocation> = None;
    for idx in (0..parsed.lines.len()).rev() {
        let line = parsed.line(idx);
        let Some(caps) = re.captures(line) else { continue };
        let m = caps.get(3)?;
        let loc = SymbolLocation {
            line: idx as u32,
            column: navigate::utf16_col(line, m.start()),
            text: member.to_string(),
            kind: SymbolKind::PropertyAssignment,
        };
        if parsed.depth_at(idx) == 0 {
            return Some(loc);
        }
        if anywhere.is_none() {
            anywhere = Some(loc);
        }
    }
    anywhere
}

/// Heuristic c: bounded forward scan from the qualifier's occurrence for a
/// bare `member:` inside any bracket-depth-1 region. Last resort for
/// literals the strict scan could not anchor.
fn relaxed_map_key(
    parsed: &ParseResult,
    qualifier: &str,
    member: &str,
    scan_window: usize,
) -> Option<SymbolLocation> {
    let start_line = qualifier_assignment(parsed, qualifier)
        .map(|(l, _)| l)
        .or_else(|| {
            let re = Regex::new(&format!(r"\b{}\b", regex::escape(qualifier))).ok()?;
            (0..parsed.lines.len()).rev().find(|&i| re.is_match(parsed.line(i)))
        })?;

    let end = (start_line + scan_window).min(parsed.lines.len());
    let mut depth = 0i32;
    let mut last: Option<SymbolLocation> = None;
    let mut cursor = MultiLineCursor::new(parsed, start_line, 0);
    while let Some((line_idx, col, c)) = cursor.next_code_char() {
        if line_idx >= end {
            break;
        }
        match c {
            '[' => depth += 1,
            ']' => depth = (depth - 1).max(0),
            _ if depth == 1 => {
                if let Some((loc, resume)) = key_match_at(parsed, line_idx, col, member) {
                    last = Some(loc);
                    cursor.resume_at(line_idx, resume);
                }
            }
            _ => {}
        }
    }
    last
}

/// The line and column (char index) of the qualifier's assignment: its
/// script-scope declaration when known, else the last `qualifier =`
/// anywhere.
fn qualifier_assignment(parsed: &ParseResult, qualifier: &str) -> Option<(usize, usize)> {
    if let Some(var) = navigate::find_top_level_variable(parsed, qualifier) {
        // The variable's column is a UTF-16 unit count.
        let line = parsed.line(var.line as usize);
        return Some((var.line as usize, crate::analyzer::utf16_to_char(line, var.column as usize)));
    }
    let re = Regex::new(&format!(r"(^|[^.\w$])({})\s*=($|[^=])", regex::escape(qualifier))).ok()?;
    for idx in (0..parsed.lines.len()).rev() {
        let line = parsed.line(idx);
        if let Some(m) = re.captures(line).and_then(|c| c.get(2)) {
            return Some((idx, byte_to_char(line, m.start())));
        }
    }
    None
}

/// Whether a map key equal to `member` starts at (line, col): a bare
/// identifier or quoted key immediately followed by a colon. Returns the
/// location of the key text and the column just past the colon, so the
/// caller's scan can resume cleanly after a quoted key.
fn key_match_at(
    parsed: &ParseResult,
    line_idx: usize,
    col: usize,
    member: &str,
) -> Option<(SymbolLocation, usize)> {
    let line = parsed.line(line_idx);
    let chars: Vec<char> = line.chars().collect();
    let c = *chars.get(col)?;

    let (key_start, key_end) = if c == '\'' || c == '"' {
        let mut end = col + 1;
        while end < chars.len() && chars[end] != c {
            end += 1;
        }
        (col + 1, end)
    } else if c.is_ascii_alphabetic() || c == '_' {
        if col > 0 && (chars[col - 1].is_ascii_alphanumeric() || chars[col - 1] == '_') {
            return None;
        }
        let mut end = col;
        while end < chars.len() && (chars[end].is_ascii_alphanumeric() || chars[end] == '_') {
            end += 1;
        }
        (col, end)
    } else {
        return None;
    };

    let key: String = chars[key_start..key_end].iter().collect();
    if key != member {
        return None;
    }
    // The colon must follow directly (closing quote skipped for quoted keys).
    let mut after = if c == '\'' || c == '"' { key_end + 1 } else { key_end };
    while after < chars.len() && chars[after] == ' ' {
        after += 1;
    }
    if chars.get(after) != Some(&':') {
        return None;
    }
    let loc = SymbolLocation {
        line: line_idx as u32,
        column: navigate::utf16_col(line, char_to_byte(line, key_start)),
        text: member.to_string(),
        kind: SymbolKind::MapKey,
    };
    Some((loc, after + 1))
}

fn followed_by_paren(line: &str, after_col: usize) -> bool {
    line.chars()
        .skip(after_col)
        .find(|c| !c.is_whitespace())
        .is_some_and(|c| c == '(')
}

/// Character-level cursor over consecutive lines that skips string literal
/// contents and line comments while reporting code characters.
struct MultiLineCursor<'p> {
    parsed: &'p ParseResult,
    line: usize,
    chars: Vec<char>,
    col: usize,
    quote: Option<char>,
}

impl<'p> MultiLineCursor<'p> {
    fn new(parsed: &'p ParseResult, line: usize, col: usize) -> Self {
        let chars = parsed.line(line).chars().collect();
        Self {
            parsed,
            line,
            chars,
            col,
            quote: None,
        }
    }

    fn peek(&mut self) -> Option<char> {
        let saved = (self.line, self.col, self.quote);
        let next = self.next_code_char().map(|(_, _, c)| c);
        (self.line, self.col, self.quote) = saved;
        if self.line < self.parsed.lines.len() {
            self.chars = self.parsed.line(self.line).chars().collect();
        }
        next
    }

    fn skip_whitespace(&mut self) {
        loop {
            let saved = (self.line, self.col, self.quote);
            match self.next_code_char() {
                Some((_, _, c)) if c.is_whitespace() => {}
                Some(_) => {
                    (self.line, self.col, self.quote) = saved;
                    if self.line < self.parsed.lines.len() {
                        self.chars = self.parsed.line(self.line).chars().collect();
                    }
                    return;
                }
                None => return,
            }
        }
    }

    /// Jump to a known-good code position, discarding any string state the
    /// scan entered while the caller was matching a quoted key.
    fn resume_at(&mut self, line: usize, col: usize) {
        if line != self.line {
            self.line = line;
            self.chars = self.parsed.line(line).chars().collect();
        }
        self.col = col.min(self.chars.len());
        self.quote = None;
    }

    /// Next character that is code, with its position. Advances over string
    /// contents (reporting nothing inside them) and stops line consumption
    /// at `//` comments.
    fn next_code_char(&mut self) -> Option<(usize, usize, char)> {
        loop {
            if self.col >= self.chars.len() {
                self.line += 1;
                if self.line >= self.parsed.lines.len() {
                    return None;
                }
                self.chars = self.parsed.line(self.line).chars().collect();
                self.col = 0;
                continue;
            }
            let c = self.chars[self.col];
            match self.quote {
                Some(q) => {
                    if c == '\\' {
                        self.col += 2;
                    } else {
                        self.col += 1;
                        if c == q {
                            self.quote = None;
                        }
                    }
                }
                None => {
                    if c == '/' && self.chars.get(self.col + 1) == Some(&'/') {
                        self.col = self.chars.len();
                        continue;
                    }
                    let at = self.col;
                    self.col += 1;
                    if c == '\'' || c == '"' {
                        // Report the quote so key_match_at can anchor quoted
                        // keys, then skip the literal body.
                        self.quote = Some(c);
                        return Some((self.line, at, c));
                    }
                    return Some((self.line, at, c));
                }
            }
        }
    }
}

fn char_to_byte(line: &str, col: usize) -> usize {
    line.char_indices()
        .nth(col)
        .map(|(b, _)| b)
        .unwrap_or(line.len())
}

fn byte_to_char(line: &str, byte: usize) -> usize {
    line[..byte.min(line.len())].chars().count()
}
