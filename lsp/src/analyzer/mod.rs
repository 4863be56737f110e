//! The resolution engine: per-document analysis plus the cursor-driven
//! definition and completion lookups built on it.

mod completions;
mod member;
mod navigate;
mod resolve;
pub mod scan;

#[cfg(test)]
mod analyzer_test;

use std::sync::Arc;

use pps_syntax::ast::Script;
use pps_syntax::Diagnostic;

pub use completions::{CompletionEntry, CompletionKind};

/// Default lookahead, in lines, for the relaxed map-key scan. Tunable via
/// client configuration; the value is a bound, not a semantic limit.
pub const DEFAULT_MAP_KEY_SCAN_WINDOW: usize = 200;

/// What a resolved symbol is, attached to every location result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Param,
    Local,
    Field,
    Property,
    Method,
    Class,
    MapKey,
    PropertyAssignment,
}

/// A definition site. Line and column are 0-based; column is measured in
/// UTF-16 code units to match the wire protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolLocation {
    pub line: u32,
    pub column: u32,
    pub text: String,
    pub kind: SymbolKind,
}

/// Three-valued resolution outcome. `RecognizedUnresolved` means a
/// qualified-access pattern covered the cursor but no target was found; it
/// suppresses all further fallback.
#[derive(Debug, Clone)]
pub enum Resolution {
    Found(SymbolLocation),
    RecognizedUnresolved,
    NoMatch,
}

/// Immutable per-version analysis bundle. The tree may come from a patched
/// text copy; `text` and `lines` always hold the original for position
/// fidelity.
pub struct ParseResult {
    pub script: Arc<Script>,
    pub text: String,
    pub lines: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
    depths: Vec<u32>,
}

impl ParseResult {
    pub fn new(text: &str) -> Self {
        let out = pps_syntax::parse(text);
        let lines: Vec<String> = text.lines().map(str::to_string).collect();
        let line_refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let depths = scan::brace_depth_per_line(&line_refs);
        Self {
            script: Arc::new(out.script),
            text: text.to_string(),
            lines,
            diagnostics: out.diagnostics,
            depths,
        }
    }

    /// The 0-based line's text, or empty for out-of-range indices.
    pub fn line(&self, idx: usize) -> &str {
        self.lines.get(idx).map(String::as_str).unwrap_or("")
    }

    /// Brace depth at the start of a 0-based line.
    pub fn depth_at(&self, idx: usize) -> u32 {
        self.depths.get(idx).copied().unwrap_or(0)
    }
}

/// Stateless resolution facade holding only tuning knobs.
#[derive(Debug, Clone)]
pub struct Analyzer {
    map_key_scan_window: usize,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer {
    pub fn new() -> Self {
        Self {
            map_key_scan_window: DEFAULT_MAP_KEY_SCAN_WINDOW,
        }
    }

    pub fn set_map_key_scan_window(&mut self, window: usize) {
        self.map_key_scan_window = window.max(1);
    }

    pub fn parse(&self, text: &str) -> ParseResult {
        ParseResult::new(text)
    }

    /// Definition lookup at a 0-based line and UTF-16 character position.
    pub fn find_definition(&self, parsed: &ParseResult, line: u32, character: u32) -> Option<SymbolLocation> {
        if line as usize >= parsed.lines.len() {
            return None;
        }
        let col = utf16_to_char(parsed.line(line as usize), character as usize);
        resolve::find_definition(parsed, line as usize, col, self.map_key_scan_window)
    }

    /// Qualified-member completions at a 0-based line and UTF-16 character
    /// position.
    pub fn completions(&self, parsed: &ParseResult, line: u32, character: u32) -> Vec<CompletionEntry> {
        if line as usize >= parsed.lines.len() {
            return Vec::new();
        }
        let col = utf16_to_char(parsed.line(line as usize), character as usize);
        completions::completions_at(parsed, line as usize, col)
    }
}

/// Convert a UTF-16 column to a character index, clamping past-the-end
/// positions to the line length.
pub(crate) fn utf16_to_char(line: &str, col_utf16: usize) -> usize {
    let mut units = 0usize;
    for (i, c) in line.chars().enumerate() {
        if units >= col_utf16 {
            return i;
        }
        units += c.len_utf16();
    }
    line.chars().count()
}
