//! Purely lexical line scanners. Everything here answers questions about
//! raw source text without a parse tree, and degrades to "not found" on
//! malformed input rather than failing.

/// Reserved words of the language; definition lookups on these are refused.
const KEYWORDS: &[&str] = &[
    "class", "interface", "extends", "implements", "def", "if", "else", "while", "for", "switch", "case", "default",
    "try", "catch", "finally", "return", "throw", "new", "this", "super", "as", "in", "instanceof", "static", "final",
    "public", "private", "protected", "void", "import", "package", "true", "false", "null",
];

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

/// Heuristic kind of a call argument, inferred from its literal shape.
/// Used only for overload disambiguation, never as a real type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    Map,
    Closure,
    Str,
    Object,
}

#[derive(Debug, Clone)]
pub struct CallArg {
    pub kind: ArgKind,
    pub text: String,
}

/// Carry-over state of the multi-line depth scan: which string/comment
/// construct is still open when a line ends.
#[derive(Debug, Clone, Copy, Default)]
struct ScanCarry {
    depth: u32,
    block_comment: bool,
    triple_quote: Option<char>,
}

/// Brace depth at the *start* of every line, string- and comment-aware.
/// Depth is clamped at zero; it never goes negative on surplus closers.
pub fn brace_depth_per_line(lines: &[&str]) -> Vec<u32> {
    let mut carry = ScanCarry::default();
    let mut depths = Vec::with_capacity(lines.len());
    for line in lines {
        depths.push(carry.depth);
        scan_line(line, &mut carry);
    }
    depths
}

/// Brace depth after the final line (used by tests to validate carry-over).
pub fn brace_depth_at_end(lines: &[&str]) -> u32 {
    let mut carry = ScanCarry::default();
    for line in lines {
        scan_line(line, &mut carry);
    }
    carry.depth
}

fn scan_line(line: &str, carry: &mut ScanCarry) {
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0usize;
    let mut prev_code_char: Option<char> = None;

    while i < chars.len() {
        if carry.block_comment {
            if chars[i] == '*' && chars.get(i + 1) == Some(&'/') {
                carry.block_comment = false;
                i += 2;
            } else {
                i += 1;
            }
            continue;
        }
        if let Some(q) = carry.triple_quote {
            if chars[i] == '\\' {
                i += 2;
            } else if chars[i] == q && chars.get(i + 1) == Some(&q) && chars.get(i + 2) == Some(&q) {
                carry.triple_quote = None;
                i += 3;
            } else {
                i += 1;
            }
            continue;
        }

        let c = chars[i];
        match c {
            '/' if chars.get(i + 1) == Some(&'/') => return,
            '/' if chars.get(i + 1) == Some(&'*') => {
                carry.block_comment = true;
                i += 2;
            }
            '/' if slashy_string_opens(&chars, i, prev_code_char) => {
                i += 1;
                while i < chars.len() {
                    if chars[i] == '\\' {
                        i += 2;
                    } else if chars[i] == '/' {
                        i += 1;
                        break;
                    } else {
                        i += 1;
                    }
                }
            }
            '\'' | '"' => {
                if chars.get(i + 1) == Some(&c) && chars.get(i + 2) == Some(&c) {
                    carry.triple_quote = Some(c);
                    i += 3;
                } else {
                    i += 1;
                    while i < chars.len() {
                        if chars[i] == '\\' {
                            i += 2;
                        } else if chars[i] == c {
                            i += 1;
                            break;
                        } else {
                            i += 1;
                        }
                    }
                }
            }
            '{' => {
                carry.depth += 1;
                prev_code_char = Some(c);
                i += 1;
            }
            '}' => {
                carry.depth = carry.depth.saturating_sub(1);
                prev_code_char = Some(c);
                i += 1;
            }
            _ => {
                if !c.is_whitespace() {
                    prev_code_char = Some(c);
                }
                i += 1;
            }
        }
    }
}

/// A `/` opens a regex-style slashy string only in clear expression position
/// with a closing delimiter on the same line; anything else is division.
fn slashy_string_opens(chars: &[char], i: usize, prev_code_char: Option<char>) -> bool {
    let expression_position = matches!(prev_code_char, None | Some('=') | Some('(') | Some(',') | Some('[') | Some(':'));
    if !expression_position {
        return false;
    }
    let mut j = i + 1;
    while j < chars.len() {
        if chars[j] == '\\' {
            j += 2;
        } else if chars[j] == '/' {
            return true;
        } else {
            j += 1;
        }
    }
    false
}

/// Whether `pos` sits inside a string literal on this line. The opening
/// quote itself is outside; everything up to and including the closing
/// quote is inside. Out-of-range positions are never inside.
pub fn is_inside_string(line: &str, pos: usize) -> bool {
    string_state_at(line, pos).is_some()
}

/// Whether `pos` sits inside a `${...}` interpolation placeholder within a
/// double-quoted string.
pub fn is_inside_interpolation(line: &str, pos: usize) -> bool {
    matches!(string_state_at(line, pos), Some(StringStateAt { in_placeholder: true, .. }))
}

struct StringStateAt {
    in_placeholder: bool,
}

fn string_state_at(line: &str, pos: usize) -> Option<StringStateAt> {
    let chars: Vec<char> = line.chars().collect();
    if pos > chars.len() {
        return None;
    }
    let mut quote: Option<char> = None;
    let mut placeholder_depth = 0u32;
    let mut i = 0usize;
    while i < pos.min(chars.len()) {
        let c = chars[i];
        match quote {
            None => {
                if c == '/' && chars.get(i + 1) == Some(&'/') {
                    return None;
                }
                if c == '\'' || c == '"' {
                    quote = Some(c);
                }
                i += 1;
            }
            Some(q) => {
                if c == '\\' {
                    i += 2;
                    continue;
                }
                if q == '"' && c == '$' && chars.get(i + 1) == Some(&'{') {
                    placeholder_depth += 1;
                    i += 2;
                    continue;
                }
                if placeholder_depth > 0 && c == '}' {
                    placeholder_depth -= 1;
                } else if c == q && placeholder_depth == 0 {
                    quote = None;
                }
                i += 1;
            }
        }
    }
    quote.map(|_| StringStateAt {
        in_placeholder: placeholder_depth > 0,
    })
}

/// For a bare `$name` interpolation, the identifier when the cursor sits on
/// the sigil or within the identifier. A cursor exactly one past the
/// identifier end does not match; that would produce false hits on the
/// delimiter that follows.
pub fn interpolated_var_at(line: &str, pos: usize) -> Option<String> {
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0usize;
    while i < chars.len() {
        if chars[i] == '$'
            && is_inside_string(line, i)
            && chars.get(i + 1).is_some_and(|c| c.is_ascii_alphabetic() || *c == '_')
            && chars.get(i + 1) != Some(&'{')
        {
            let start = i;
            let mut end = i + 1;
            while end < chars.len() && (chars[end].is_ascii_alphanumeric() || chars[end] == '_') {
                end += 1;
            }
            if pos >= start && pos < end {
                return Some(chars[start + 1..end].iter().collect());
            }
            i = end;
        } else {
            i += 1;
        }
    }
    None
}

/// Extract argument kinds for a call whose name ends just before
/// `after_col`. Splits top-level comma-separated arguments naively, folds
/// named map entries into a single leading Map kind, and appends a trailing
/// closure after the closing paren as an extra Closure argument.
pub fn extract_call_args(line: &str, after_col: usize) -> Vec<CallArg> {
    let chars: Vec<char> = line.chars().collect();
    let mut i = after_col.min(chars.len());
    while i < chars.len() && chars[i] != '(' {
        if !chars[i].is_whitespace() {
            return Vec::new();
        }
        i += 1;
    }
    if i >= chars.len() {
        return Vec::new();
    }

    let open = i;
    let mut depth = 0i32;
    let mut close = None;
    let mut arg_texts = Vec::new();
    let mut current = String::new();
    let mut j = open;
    while j < chars.len() {
        let c = chars[j];
        match c {
            '(' | '[' | '{' => {
                depth += 1;
                if depth > 1 {
                    current.push(c);
                }
            }
            ')' | ']' | '}' => {
                depth -= 1;
                if depth == 0 && c == ')' {
                    close = Some(j);
                    break;
                }
                current.push(c);
            }
            ',' if depth == 1 => {
                arg_texts.push(current.trim().to_string());
                current = String::new();
            }
            _ => current.push(c),
        }
        j += 1;
    }
    if !current.trim().is_empty() {
        arg_texts.push(current.trim().to_string());
    }

    let mut args = Vec::new();
    let mut saw_map = false;
    for text in arg_texts {
        let kind = classify_arg(&text);
        if kind == ArgKind::Map {
            if !saw_map {
                saw_map = true;
                args.insert(0, CallArg { kind, text });
            }
            // Further named entries fold into the same map argument.
        } else {
            args.push(CallArg { kind, text });
        }
    }

    // A `{ ... }` immediately after the closing paren is a trailing closure.
    if let Some(close) = close {
        let mut k = close + 1;
        while k < chars.len() && chars[k].is_whitespace() {
            k += 1;
        }
        if chars.get(k) == Some(&'{') {
            args.push(CallArg {
                kind: ArgKind::Closure,
                text: String::new(),
            });
        }
    }
    args
}

fn classify_arg(text: &str) -> ArgKind {
    static NAMED_ENTRY: once_cell::sync::Lazy<regex::Regex> = once_cell::sync::Lazy::new(|| {
        regex::Regex::new(r#"^(?:[A-Za-z_]\w*|'[^']*'|"[^"]*")\s*:"#).unwrap()
    });
    let trimmed = text.trim();
    if NAMED_ENTRY.is_match(trimmed) {
        ArgKind::Map
    } else if trimmed.starts_with('{') {
        ArgKind::Closure
    } else if trimmed.starts_with('\'') || trimmed.starts_with('"') {
        ArgKind::Str
    } else {
        ArgKind::Object
    }
}
