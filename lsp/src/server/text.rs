use tower_lsp::lsp_types::{Position, Range};

use crate::analyzer::SymbolLocation;

/// The identifier whose span covers a UTF-16 position on a line, if any.
pub(crate) fn word_at(line: &str, character: usize) -> Option<String> {
    let chars: Vec<char> = line.chars().collect();
    let mut idx = chars.len();
    let mut units = 0usize;
    for (i, c) in chars.iter().enumerate() {
        if units >= character {
            idx = i;
            break;
        }
        units += c.len_utf16();
    }
    let is_ident = |c: char| c.is_ascii_alphanumeric() || c == '_';

    let mut probe = idx.min(chars.len());
    if probe >= chars.len() || !is_ident(chars[probe]) {
        if probe > 0 && is_ident(chars[probe - 1]) {
            probe -= 1;
        } else {
            return None;
        }
    }
    let mut start = probe;
    while start > 0 && is_ident(chars[start - 1]) {
        start -= 1;
    }
    let mut end = probe + 1;
    while end < chars.len() && is_ident(chars[end]) {
        end += 1;
    }
    let word: String = chars[start..end].iter().collect();
    if word.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(word)
}

/// The range a resolved symbol covers, from its column to column plus the
/// symbol text's UTF-16 length.
pub(crate) fn symbol_range(loc: &SymbolLocation) -> Range {
    let len = loc.text.encode_utf16().count() as u32;
    Range::new(
        Position::new(loc.line, loc.column),
        Position::new(loc.line, loc.column + len),
    )
}
